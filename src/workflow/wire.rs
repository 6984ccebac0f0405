//! Serde structs matching the editor's "save" export. They are only used as an
//! intermediate step; see [`IntoWorkflow`](super::IntoWorkflow) for the conversion
//! into the canonical [`Workflow`](super::Workflow) model.
use super::definition::{EdgeId, NodeId, SlotIndex};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct RawWorkflow {
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "edges")]
    pub links: Option<Vec<RawLink>>,
    #[serde(default)]
    pub definitions: Option<RawDefinitions>,
    #[serde(default)]
    pub subgraph_definitions: Option<Vec<RawSubgraph>>,
    #[serde(default)]
    pub extra: Option<RawExtra>,
    /// Kept untyped so one malformed entry cannot reject the whole document.
    #[serde(default)]
    pub override_edges: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDefinitions {
    #[serde(default)]
    pub subgraphs: Option<Vec<RawSubgraph>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawExtra {
    #[serde(default)]
    pub ue_links: Option<Vec<Value>>,
}

/// Node ids are numbers, but some exports write them as numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNodeId {
    Int(NodeId),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub id: RawNodeId,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "widgetsValues")]
    pub widgets_values: Option<Value>,
    #[serde(default)]
    pub inputs: Option<Vec<RawInput>>,
    #[serde(default)]
    pub outputs: Option<Vec<RawOutput>>,
}

#[derive(Debug, Deserialize)]
pub struct RawInput {
    pub name: String,
    #[serde(default, rename = "type")]
    pub data_type: Value,
    #[serde(default)]
    pub link: Option<EdgeId>,
}

#[derive(Debug, Deserialize)]
pub struct RawOutput {
    pub name: String,
    #[serde(default, rename = "type")]
    pub data_type: Value,
    #[serde(default)]
    pub links: Option<Vec<EdgeId>>,
}

/// Links are `[id, from, from_slot, to, to_slot, type]` tuples in the main graph; subgraph
/// definitions may also use the object form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawLink {
    Tuple(EdgeId, NodeId, SlotIndex, NodeId, SlotIndex, Value),
    Object {
        id: EdgeId,
        origin_id: NodeId,
        origin_slot: SlotIndex,
        target_id: NodeId,
        target_slot: SlotIndex,
        #[serde(default, rename = "type")]
        data_type: Value,
    },
}

#[derive(Debug, Deserialize)]
pub struct RawNodeRef {
    pub id: NodeId,
}

#[derive(Debug, Deserialize)]
pub struct RawSubgraph {
    pub id: String,
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub links: Option<Vec<RawLink>>,
    #[serde(rename = "inputNode", alias = "input_node")]
    pub input_node: RawNodeRef,
    #[serde(rename = "outputNode", alias = "output_node")]
    pub output_node: RawNodeRef,
    #[serde(default)]
    pub inputs: Option<Vec<RawPort>>,
    #[serde(default)]
    pub outputs: Option<Vec<RawPort>>,
}

#[derive(Debug, Deserialize)]
pub struct RawPort {
    pub name: String,
    #[serde(default, rename = "type")]
    pub data_type: Value,
    #[serde(default, rename = "linkIds", alias = "link_ids")]
    pub link_ids: Option<Vec<EdgeId>>,
}

#[derive(Debug, Deserialize)]
pub struct RawOverrideEdge {
    pub downstream: RawNodeId,
    pub downstream_slot: SlotIndex,
    pub upstream: RawNodeId,
    pub upstream_slot: SlotIndex,
    #[serde(default, rename = "type")]
    pub data_type: Value,
}
