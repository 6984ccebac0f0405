use crate::error::FlattenError;
use crate::workflow::{FlatGraph, IntoWorkflow, RawWorkflow, Workflow};
use ahash::{AHashMap, AHashSet};
use serde_json::Value;

pub mod detect;
mod expander;
pub mod links;
mod mapper;
mod overrides;
pub mod resolver;
pub mod schema;

pub use detect::{DocumentShape, detect_shape};
pub use expander::{ID_MARGIN, IdAllocator, SubgraphExpander};
use links::LinkTable;
use mapper::WidgetMapper;
use resolver::PassThroughResolver;
use schema::{WidgetSchema, builtin_schema, register_default_schemas};

/// Expansion rounds allowed before a subgraph set is considered recursive.
pub const DEFAULT_MAX_EXPANSIONS: usize = 100;

/// Operator types that only forward a value, or carry none.
pub const DEFAULT_ROUTING_TYPES: [&str; 4] = ["Reroute", "PrimitiveNode", "Note", "MarkdownNote"];

/// What a flattening run produced.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatOutput {
    Graph(FlatGraph),
    /// The document was not recognized and is handed back untouched.
    Unrecognized(Value),
}

/// The result of a flattening run: always some output, plus everything that went wrong.
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened {
    /// The detected layout; `None` when the input was not JSON at all.
    pub shape: Option<DocumentShape>,
    pub output: FlatOutput,
    pub diagnostics: Vec<FlattenError>,
}

impl Flattened {
    fn graph_with(
        shape: Option<DocumentShape>,
        graph: FlatGraph,
        diagnostics: Vec<FlattenError>,
    ) -> Self {
        Self {
            shape,
            output: FlatOutput::Graph(graph),
            diagnostics,
        }
    }

    pub fn graph(&self) -> Option<&FlatGraph> {
        match &self.output {
            FlatOutput::Graph(graph) => Some(graph),
            FlatOutput::Unrecognized(_) => None,
        }
    }

    fn unrecognized(document: &Value, diagnostics: Vec<FlattenError>) -> Self {
        Self {
            shape: Some(DocumentShape::Unrecognized),
            output: FlatOutput::Unrecognized(document.clone()),
            diagnostics,
        }
    }

    pub fn into_graph(self) -> Option<FlatGraph> {
        match self.output {
            FlatOutput::Graph(graph) => Some(graph),
            FlatOutput::Unrecognized(_) => None,
        }
    }

    /// The output as JSON, ready to be sent as the body of a run request.
    pub fn to_value(&self) -> Value {
        match &self.output {
            FlatOutput::Graph(graph) => graph.to_value(),
            FlatOutput::Unrecognized(document) => document.clone(),
        }
    }

    /// Diagnostics other than the informational ones.
    pub fn errors(&self) -> impl Iterator<Item = &FlattenError> {
        self.diagnostics.iter().filter(|d| !d.is_informational())
    }
}

/// Turns workflow documents into flat, execution-ready graphs.
///
/// A `Flattener` is immutable once built and every call works on its own copy of the
/// input, so one instance can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct Flattener {
    schemas: AHashMap<String, WidgetSchema>,
    routing_types: AHashSet<String>,
    max_expansions: usize,
}

pub struct FlattenerBuilder {
    schemas: AHashMap<String, WidgetSchema>,
    routing_types: AHashSet<String>,
    max_expansions: usize,
}

impl FlattenerBuilder {
    pub fn new() -> Self {
        let mut schemas: AHashMap<String, WidgetSchema> = AHashMap::new();
        register_default_schemas(&mut schemas);
        Self {
            schemas,
            routing_types: DEFAULT_ROUTING_TYPES.iter().map(|t| t.to_string()).collect(),
            max_expansions: DEFAULT_MAX_EXPANSIONS,
        }
    }

    /// Maps positional values of `user_type` the same way as the known type `known_type`.
    pub fn with_type_mapping(mut self, user_type: &str, known_type: &str) -> Self {
        let known = self
            .schemas
            .get(known_type)
            .cloned()
            .or_else(|| builtin_schema(known_type));
        if let Some(schema) = known {
            self.schemas
                .insert(user_type.to_string(), schema.renamed(user_type));
        }
        self
    }

    /// Adds or replaces the schema for `schema.operator_type()`.
    pub fn with_schema(mut self, schema: WidgetSchema) -> Self {
        self.schemas
            .insert(schema.operator_type().to_string(), schema);
        self
    }

    /// Treats `operator_type` as a routing node that forwards its first input.
    pub fn with_routing_type(mut self, operator_type: &str) -> Self {
        self.routing_types.insert(operator_type.to_string());
        self
    }

    pub fn with_max_expansions(mut self, rounds: usize) -> Self {
        self.max_expansions = rounds;
        self
    }

    pub fn build(self) -> Flattener {
        Flattener {
            schemas: self.schemas,
            routing_types: self.routing_types,
            max_expansions: self.max_expansions,
        }
    }
}

impl Default for FlattenerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Flattener {
    fn default() -> Self {
        FlattenerBuilder::new().build()
    }
}

impl Flattener {
    pub fn builder() -> FlattenerBuilder {
        FlattenerBuilder::new()
    }

    pub fn schema(&self, operator_type: &str) -> Option<&WidgetSchema> {
        self.schemas.get(operator_type)
    }

    pub fn is_routing_type(&self, operator_type: &str) -> bool {
        self.routing_types.contains(operator_type)
    }

    /// Parses `text` as JSON and flattens it. Invalid JSON yields an empty graph and a
    /// `ParseError` diagnostic.
    pub fn flatten_str(&self, text: &str) -> Flattened {
        match serde_json::from_str::<Value>(text) {
            Ok(document) => self.flatten_value(&document),
            Err(e) => {
                log::error!("Failed to parse workflow document: {}", e);
                Flattened::graph_with(None, FlatGraph::new(), vec![FlattenError::from(e)])
            }
        }
    }

    /// Detects the layout of `document` and flattens it accordingly.
    pub fn flatten_value(&self, document: &Value) -> Flattened {
        let shape = detect_shape(document);
        log::debug!("Detected {:?} workflow document", shape);

        match shape {
            DocumentShape::Flat => match serde_json::from_value::<FlatGraph>(document.clone()) {
                Ok(graph) => Flattened::graph_with(Some(shape), graph, Vec::new()),
                Err(e) => {
                    log::warn!(
                        "Flat workflow document could not be read, using it as-is: {}",
                        e
                    );
                    Flattened::unrecognized(document, vec![FlattenError::from(e)])
                }
            },
            DocumentShape::Nested => {
                let workflow = serde_json::from_value::<RawWorkflow>(document.clone())
                    .map_err(FlattenError::from)
                    .and_then(|raw| raw.into_workflow().map_err(FlattenError::from));
                match workflow {
                    Ok(workflow) => self.flatten_workflow(&workflow),
                    Err(e) => {
                        log::error!("{}", e);
                        Flattened::graph_with(Some(shape), FlatGraph::new(), vec![e])
                    }
                }
            }
            DocumentShape::Unrecognized => {
                log::warn!("Unknown workflow format, attempting to use it as-is");
                Flattened::unrecognized(document, Vec::new())
            }
        }
    }

    /// Expands a copy of `workflow` and maps it to a flat graph. Problems recorded while
    /// the workflow was converted are reported first.
    pub fn flatten_workflow(&self, workflow: &Workflow) -> Flattened {
        let mut workflow = workflow.clone();
        let mut diagnostics: Vec<FlattenError> = workflow
            .warnings
            .iter()
            .cloned()
            .map(FlattenError::from)
            .collect();

        if let Err(e) = self.expand(&mut workflow) {
            log::warn!("{}; continuing with the partially expanded graph", e);
            diagnostics.push(e);
        }

        let graph = self.lower(&workflow, &mut diagnostics);
        Flattened::graph_with(Some(DocumentShape::Nested), graph, diagnostics)
    }

    /// Inlines every subgraph instance of `workflow` in place.
    pub fn expand(&self, workflow: &mut Workflow) -> Result<usize, FlattenError> {
        SubgraphExpander::new(self.max_expansions).expand(workflow)
    }

    /// Maps an already expanded workflow to a flat graph, then applies its override edges.
    pub fn lower(&self, workflow: &Workflow, diagnostics: &mut Vec<FlattenError>) -> FlatGraph {
        let links = LinkTable::new(&workflow.edges);
        let resolver = PassThroughResolver::new(&workflow.nodes, &links, &self.routing_types);

        let mut graph =
            WidgetMapper::new(workflow, &self.schemas, &links, &resolver).map(diagnostics);
        overrides::apply_override_edges(
            &mut graph,
            &workflow.override_edges,
            &resolver,
            diagnostics,
        );
        graph
    }

    /// A resolver over `workflow` using this flattener's routing types.
    pub fn resolver<'a>(
        &'a self,
        workflow: &'a Workflow,
        links: &'a LinkTable<'a>,
    ) -> PassThroughResolver<'a> {
        PassThroughResolver::new(&workflow.nodes, links, &self.routing_types)
    }
}
