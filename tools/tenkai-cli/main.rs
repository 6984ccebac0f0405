use clap::Parser;
use serde_json::Value;
use std::fs;
use std::time::Instant;
use tenkai::prelude::*;

/// Flattens an editor workflow export into an execution-ready graph
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow JSON file (editor save format or flat API format)
    workflow_path: String,

    /// Write the flat graph here instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Late binding `NODE_ID.PARAM=VALUE`; VALUE is parsed as JSON, falling back to a string
    #[arg(short, long = "set", value_name = "NODE_ID.PARAM=VALUE")]
    set: Vec<String>,

    /// Replace the literal seed of every KSampler / SamplerCustom / RandomNoise node
    #[arg(long)]
    randomize_seeds: bool,

    /// Treat these operator types as routing nodes in addition to the defaults
    #[arg(long = "routing-type", value_name = "TYPE")]
    routing_types: Vec<String>,

    /// Maximum number of subgraph expansion rounds
    #[arg(long, default_value_t = tenkai::flatten::DEFAULT_MAX_EXPANSIONS)]
    max_expansions: usize,

    /// Emit compact JSON
    #[arg(long)]
    compact: bool,

    /// Exit with an error status when flattening reported any non-informational diagnostic
    #[arg(long)]
    strict: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let start = Instant::now();
    let text = fs::read_to_string(&cli.workflow_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to read workflow file '{}': {}",
            cli.workflow_path, e
        ))
    });

    let bindings = build_bindings(&cli);
    let flattener = cli
        .routing_types
        .iter()
        .fold(Flattener::builder(), |builder, t| builder.with_routing_type(t))
        .with_max_expansions(cli.max_expansions)
        .build();

    let flattened = flattener.flatten_str(&text);
    for diagnostic in &flattened.diagnostics {
        eprintln!("  -> {}", diagnostic);
    }
    let failed = cli.strict && flattened.errors().next().is_some();
    let shape = flattened
        .shape
        .map_or_else(|| "unparsable".to_string(), |s| format!("{:?}", s));

    let document = match flattened.output {
        FlatOutput::Graph(mut graph) => {
            let written = bindings.apply(&mut graph);
            log::info!("Applied {} late binding(s)", written);
            graph.to_value()
        }
        FlatOutput::Unrecognized(document) => {
            if !bindings.is_empty() {
                eprintln!("  -> Document format not recognized; late bindings skipped");
            }
            document
        }
    };

    let rendered = if cli.compact {
        serde_json::to_string(&document)
    } else {
        serde_json::to_string_pretty(&document)
    }
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize flat graph: {}", e)));

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path, e))
            });
            eprintln!(
                "Flattened {} workflow into '{}' in {:?}",
                shape,
                path,
                start.elapsed()
            );
        }
        None => println!("{}", rendered),
    }

    if failed {
        exit_with_error("Flattening reported errors (--strict)");
    }
}

fn build_bindings(cli: &Cli) -> LateBindings {
    let mut bindings = cli.set.iter().fold(LateBindings::new(), |bindings, arg| {
        let (node_id, parameter, value) = parse_binding(arg)
            .unwrap_or_else(|| exit_with_error(&format!("Invalid --set value '{}'", arg)));
        bindings.set(node_id, parameter, value)
    });

    if cli.randomize_seeds {
        bindings = bindings
            .randomize_seed("KSampler", "seed")
            .randomize_seed("SamplerCustom", "noise_seed")
            .randomize_seed("RandomNoise", "noise_seed");
    }
    bindings
}

/// Splits `NODE_ID.PARAM=VALUE`.
fn parse_binding(arg: &str) -> Option<(&str, &str, Value)> {
    let (target, raw_value) = arg.split_once('=')?;
    let (node_id, parameter) = target.split_once('.')?;
    if node_id.is_empty() || parameter.is_empty() {
        return None;
    }
    let value = serde_json::from_str(raw_value).unwrap_or_else(|_| Value::from(raw_value));
    Some((node_id, parameter, value))
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
