use super::definition::{NodeId, SlotIndex};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A named operator parameter in the execution-ready graph.
///
/// On the wire a reference is the two-element array `["<producer id>", <slot>]`; anything
/// else is a literal.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Parameter {
    Reference(String, SlotIndex),
    Literal(Value),
}

impl Parameter {
    pub fn reference(producer: NodeId, slot: SlotIndex) -> Self {
        Parameter::Reference(producer.to_string(), slot)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Parameter::Reference(..))
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Parameter::Literal(value) => Some(value),
            Parameter::Reference(..) => None,
        }
    }
}

impl From<Value> for Parameter {
    fn from(value: Value) -> Self {
        Parameter::Literal(value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct NodeMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One node of the flat graph: an operator type plus named parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FlatNode {
    #[serde(rename = "class_type")]
    pub operator_type: String,
    #[serde(rename = "inputs", default)]
    pub parameters: BTreeMap<String, Parameter>,
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<NodeMeta>,
    /// Node-level keys the flattener does not interpret, written back as they came.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FlatNode {
    pub fn new(operator_type: impl Into<String>) -> Self {
        Self {
            operator_type: operator_type.into(),
            parameters: BTreeMap::new(),
            meta: None,
            extra: Map::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.meta = Some(NodeMeta {
            title: Some(title.into()),
            extra: Map::new(),
        });
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.as_ref().and_then(|m| m.title.as_deref())
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }
}

/// The execution-ready graph, keyed by stringified node id.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct FlatGraph {
    nodes: BTreeMap<String, FlatNode>,
}

impl FlatGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, node: FlatNode) -> Option<FlatNode> {
        self.nodes.insert(id.into(), node)
    }

    pub fn get(&self, id: &str) -> Option<&FlatNode> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut FlatNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FlatNode)> {
        self.nodes.iter()
    }

    /// Node ids in ascending numeric order, the order the editor assigns them in.
    /// Non-numeric ids sort after numeric ones, lexicographically.
    pub fn ids_in_order(&self) -> Vec<String> {
        self.nodes
            .keys()
            .sorted_by(|a, b| match (a.parse::<NodeId>(), b.parse::<NodeId>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                (Ok(_), Err(_)) => Ordering::Less,
                (Err(_), Ok(_)) => Ordering::Greater,
                (Err(_), Err(_)) => a.cmp(b),
            })
            .cloned()
            .collect()
    }

    /// All nodes of one operator type in ascending id order.
    pub fn ids_of_type(&self, operator_type: &str) -> Vec<String> {
        self.ids_in_order()
            .into_iter()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| n.operator_type == operator_type)
            })
            .collect()
    }

    /// Every reference as `(consumer id, parameter name, producer id, slot)`.
    pub fn references(&self) -> Vec<(&str, &str, &str, SlotIndex)> {
        self.nodes
            .iter()
            .flat_map(|(id, node)| {
                node.parameters.iter().filter_map(move |(name, param)| match param {
                    Parameter::Reference(producer, slot) => {
                        Some((id.as_str(), name.as_str(), producer.as_str(), *slot))
                    }
                    Parameter::Literal(_) => None,
                })
            })
            .collect()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn to_json_string(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

impl FromIterator<(String, FlatNode)> for FlatGraph {
    fn from_iter<T: IntoIterator<Item = (String, FlatNode)>>(iter: T) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}
