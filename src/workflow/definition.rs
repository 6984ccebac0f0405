use crate::error::ConversionError;
use serde_json::Value;

pub type NodeId = i64;
pub type EdgeId = i64;
pub type SlotIndex = u32;

/// How a node takes part in flattening, decided once when the document is converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular operator the execution backend knows about.
    Primitive,
    /// The operator type names a subgraph definition present in the document.
    SubgraphInstance(String),
    /// The operator type is shaped like a definition identifier, but no such definition exists.
    OrphanInstance,
}

impl NodeKind {
    pub fn is_primitive(&self) -> bool {
        matches!(self, NodeKind::Primitive)
    }
}

/// The canonical, nested form of a workflow: nodes, edges, and reusable subgraphs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workflow {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<SubgraphDefinition>,
    pub override_edges: Vec<OverrideEdge>,
    /// Recoverable problems found while converting; the offending entries were skipped.
    pub warnings: Vec<ConversionError>,
}

impl Workflow {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn subgraph(&self, id: &str) -> Option<&SubgraphDefinition> {
        self.subgraphs.iter().find(|s| s.id == id)
    }

    /// Returns `true` while at least one node still instantiates a known subgraph.
    pub fn has_subgraph_instances(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| matches!(n.kind, NodeKind::SubgraphInstance(_)))
    }
}

/// A single node of the editor graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub operator_type: String,
    pub kind: NodeKind,
    pub title: Option<String>,
    /// Positional widget values in the order the editor stores them.
    pub widget_values: Vec<Value>,
    pub inputs: Vec<InputSlot>,
    pub outputs: Vec<OutputSlot>,
}

impl Node {
    pub fn input(&self, name: &str) -> Option<&InputSlot> {
        self.inputs.iter().find(|i| i.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputSlot {
    pub name: String,
    pub data_type: String,
    pub link: Option<EdgeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSlot {
    pub name: String,
    pub data_type: String,
    pub links: Vec<EdgeId>,
}

/// A directed connection from an output slot to an input slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_slot: SlotIndex,
    pub target: NodeId,
    pub target_slot: SlotIndex,
    pub data_type: String,
}

/// A reusable graph fragment referenced by instance nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SubgraphDefinition {
    pub id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Virtual node whose outputs are the definition's named inputs.
    pub input_node: NodeId,
    /// Virtual node whose inputs are the definition's named outputs.
    pub output_node: NodeId,
    pub inputs: Vec<BoundaryPort>,
    pub outputs: Vec<BoundaryPort>,
}

impl SubgraphDefinition {
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_boundary(&self, node_id: NodeId) -> bool {
        node_id == self.input_node || node_id == self.output_node
    }
}

/// A named input or output of a subgraph definition.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryPort {
    pub name: String,
    pub data_type: String,
    /// Internal edges attached to this port.
    pub link_ids: Vec<EdgeId>,
}

/// An auxiliary connection declared outside the main edge list.
#[derive(Debug, Clone, PartialEq)]
pub struct OverrideEdge {
    pub downstream: NodeId,
    pub downstream_slot: SlotIndex,
    pub upstream: NodeId,
    pub upstream_slot: SlotIndex,
    pub data_type: String,
}
