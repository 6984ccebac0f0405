use crate::workflow::{EdgeId, NodeId};
use thiserror::Error;

/// Diagnostics raised while flattening a workflow.
///
/// None of these abort a run: the flattener records them next to the best-effort
/// graph it produced so callers can decide whether to proceed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlattenError {
    #[error("Failed to parse workflow document: {0}")]
    ParseError(String),

    #[error(
        "Subgraph expansion stopped after {cap} rounds while expanding definition '{definition_id}'"
    )]
    SubgraphRecursion { definition_id: String, cap: usize },

    #[error(
        "No fresh ids left to expand definition '{definition_id}'; document ids are too close to the integer limit"
    )]
    IdSpaceExhausted { definition_id: String },

    #[error("Input '{input}' of node {node_id} could not be traced to a producing node: {reason}")]
    UnresolvedReference {
        node_id: NodeId,
        input: String,
        reason: UnresolvedReason,
    },

    #[error(
        "Node {node_id} has operator type '{operator_type}' with no widget schema; {dropped} positional value(s) dropped"
    )]
    UnknownOperatorType {
        node_id: NodeId,
        operator_type: String,
        dropped: usize,
    },
}

impl FlattenError {
    /// Whether the diagnostic only reports expected information loss.
    pub fn is_informational(&self) -> bool {
        matches!(self, FlattenError::UnknownOperatorType { .. })
    }
}

/// Why a backward walk through pass-through nodes gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    #[error("pass-through chain loops back to node {0}")]
    Cycle(NodeId),

    #[error("pass-through node {0} has no incoming edge")]
    DeadEnd(NodeId),

    #[error("node {0} does not exist")]
    MissingNode(NodeId),

    #[error("edge {0} does not exist")]
    MissingEdge(EdgeId),
}

/// Errors that can occur when converting an editor export into a `Workflow`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    #[error("Invalid workflow document: {0}")]
    ValidationError(String),

    #[error("Node id {node_id} appears more than once in {scope}")]
    DuplicateNodeId { node_id: NodeId, scope: String },

    #[error("Override edge {index} skipped: {reason}")]
    InvalidOverrideEdge { index: usize, reason: String },
}

impl From<ConversionError> for FlattenError {
    fn from(err: ConversionError) -> Self {
        FlattenError::ParseError(err.to_string())
    }
}

impl From<serde_json::Error> for FlattenError {
    fn from(err: serde_json::Error) -> Self {
        FlattenError::ParseError(err.to_string())
    }
}
