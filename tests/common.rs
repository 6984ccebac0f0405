//! Common test utilities for building workflow documents.
use serde_json::{Value, json};

/// Definition ids have to look like the editor's UUIDs.
#[allow(dead_code)]
pub const TEXT_SUBGRAPH: &str = "11111111-2222-3333-4444-555555555555";
#[allow(dead_code)]
pub const OUTER_SUBGRAPH: &str = "aaaaaaaa-0000-0000-0000-000000000001";
#[allow(dead_code)]
pub const INNER_SUBGRAPH: &str = "bbbbbbbb-0000-0000-0000-000000000002";
#[allow(dead_code)]
pub const RECURSIVE_SUBGRAPH: &str = "cccccccc-0000-0000-0000-000000000003";

#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn input(name: &str, data_type: &str, link: Option<i64>) -> Value {
    json!({ "name": name, "type": data_type, "link": link })
}

#[allow(dead_code)]
pub fn output(name: &str, data_type: &str, links: &[i64]) -> Value {
    json!({ "name": name, "type": data_type, "links": links })
}

#[allow(dead_code)]
pub fn node(
    id: i64,
    node_type: &str,
    inputs: Vec<Value>,
    outputs: Vec<Value>,
    widgets: Value,
) -> Value {
    json!({
        "id": id,
        "type": node_type,
        "inputs": inputs,
        "outputs": outputs,
        "widgets_values": widgets,
    })
}

#[allow(dead_code)]
pub fn link(id: i64, from: i64, from_slot: u32, to: i64, to_slot: u32, data_type: &str) -> Value {
    json!([id, from, from_slot, to, to_slot, data_type])
}

/// Two nodes: a checkpoint loader (1) feeding a sampler (2) over edge 10.
///
/// Logic: `2.model <- 1:0`
#[allow(dead_code)]
pub fn create_linked_pair() -> Value {
    json!({
        "nodes": [
            node(
                1,
                "CheckpointLoaderSimple",
                vec![],
                vec![output("MODEL", "MODEL", &[10])],
                json!(["model.safetensors"]),
            ),
            node(2, "KSampler", vec![input("model", "MODEL", Some(10))], vec![], json!([])),
        ],
        "links": [link(10, 1, 0, 2, 0, "MODEL")],
    })
}

/// A -> Reroute -> B: a VAE loader (1) reaching a decoder (3) through a reroute (2).
#[allow(dead_code)]
pub fn create_reroute_chain() -> Value {
    json!({
        "nodes": [
            node(
                1,
                "VAELoader",
                vec![],
                vec![output("VAE", "VAE", &[11])],
                json!(["ae.safetensors"]),
            ),
            node(
                2,
                "Reroute",
                vec![input("", "*", Some(11))],
                vec![output("", "VAE", &[12])],
                json!([]),
            ),
            node(
                3,
                "VAEDecode",
                vec![input("samples", "LATENT", None), input("vae", "VAE", Some(12))],
                vec![],
                json!([]),
            ),
        ],
        "links": [link(11, 1, 0, 2, 0, "VAE"), link(12, 2, 0, 3, 1, "VAE")],
    })
}

/// A subgraph with named input `x` feeding an internal text encoder, whose output is
/// the named output `cond`.
#[allow(dead_code)]
pub fn text_subgraph_definition() -> Value {
    json!({
        "id": TEXT_SUBGRAPH,
        "inputNode": { "id": -10 },
        "outputNode": { "id": -20 },
        "nodes": [
            node(
                1,
                "CLIPTextEncode",
                vec![input("clip", "CLIP", Some(1))],
                vec![output("CONDITIONING", "CONDITIONING", &[2])],
                json!(["a cat"]),
            ),
        ],
        "links": [
            link(1, -10, 0, 1, 0, "CLIP"),
            link(2, 1, 0, -20, 0, "CONDITIONING"),
        ],
        "inputs": [{ "name": "x", "type": "CLIP", "linkIds": [1] }],
        "outputs": [{ "name": "cond", "type": "CONDITIONING", "linkIds": [2] }],
    })
}

/// Main graph `A(1) -> instance(2) -> guider(3)` around the given subgraph type.
#[allow(dead_code)]
pub fn create_instance_workflow(instance_type: &str, definitions: Vec<Value>) -> Value {
    json!({
        "nodes": [
            node(
                1,
                "CLIPLoader",
                vec![],
                vec![output("CLIP", "CLIP", &[5])],
                json!(["clip_l.safetensors", "flux"]),
            ),
            node(
                2,
                instance_type,
                vec![input("x", "CLIP", Some(5))],
                vec![output("cond", "CONDITIONING", &[6])],
                json!([]),
            ),
            node(
                3,
                "CFGGuider",
                vec![input("positive", "CONDITIONING", Some(6))],
                vec![],
                json!([3.5]),
            ),
        ],
        "links": [link(5, 1, 0, 2, 0, "CLIP"), link(6, 2, 0, 3, 0, "CONDITIONING")],
        "definitions": { "subgraphs": definitions },
    })
}

/// An outer subgraph whose only node instantiates an inner subgraph.
#[allow(dead_code)]
pub fn create_nested_workflow() -> Value {
    let outer = json!({
        "id": OUTER_SUBGRAPH,
        "inputNode": { "id": -10 },
        "outputNode": { "id": -20 },
        "nodes": [
            node(
                1,
                INNER_SUBGRAPH,
                vec![input("in", "CLIP", Some(1))],
                vec![output("out", "CONDITIONING", &[2])],
                json!([]),
            ),
        ],
        "links": [
            link(1, -10, 0, 1, 0, "CLIP"),
            link(2, 1, 0, -20, 0, "CONDITIONING"),
        ],
        "inputs": [{ "name": "x", "type": "CLIP", "linkIds": [1] }],
        "outputs": [{ "name": "cond", "type": "CONDITIONING", "linkIds": [2] }],
    });
    let inner = json!({
        "id": INNER_SUBGRAPH,
        "inputNode": { "id": -10 },
        "outputNode": { "id": -20 },
        "nodes": [
            node(
                1,
                "CLIPTextEncode",
                vec![input("clip", "CLIP", Some(1))],
                vec![output("CONDITIONING", "CONDITIONING", &[2])],
                json!(["nested"]),
            ),
        ],
        // Object-form links are accepted inside definitions.
        "links": [
            { "id": 1, "origin_id": -10, "origin_slot": 0, "target_id": 1, "target_slot": 0, "type": "CLIP" },
            { "id": 2, "origin_id": 1, "origin_slot": 0, "target_id": -20, "target_slot": 0, "type": "CONDITIONING" },
        ],
        "inputs": [{ "name": "in", "type": "CLIP", "linkIds": [1] }],
        "outputs": [{ "name": "out", "type": "CONDITIONING", "linkIds": [2] }],
    });
    create_instance_workflow(OUTER_SUBGRAPH, vec![outer, inner])
}

/// A subgraph that contains an instance of itself.
#[allow(dead_code)]
pub fn create_recursive_workflow() -> Value {
    let definition = json!({
        "id": RECURSIVE_SUBGRAPH,
        "inputNode": { "id": -10 },
        "outputNode": { "id": -20 },
        "nodes": [node(1, RECURSIVE_SUBGRAPH, vec![], vec![], json!([]))],
        "links": [],
        "inputs": [],
        "outputs": [],
    });
    json!({
        "nodes": [
            node(1, RECURSIVE_SUBGRAPH, vec![], vec![], json!([])),
            node(2, "SaveImage", vec![input("images", "IMAGE", None)], vec![], json!(["out"])),
        ],
        "links": [],
        "definitions": { "subgraphs": [definition] },
    })
}
