//! Per-run parameter overrides applied to an already flattened graph.
//!
//! These are the late-bound values a caller only knows at submission time: the filename
//! an image was uploaded under, the user's prompt, a fresh seed. They run after
//! flattening and never influence it.
use crate::workflow::{FlatGraph, FlatNode, Parameter};
use rand::Rng;
use serde_json::Value;

/// Seeds are drawn uniformly from `0..SEED_RANGE`.
pub const SEED_RANGE: u64 = 1_000_000_000;

/// Which flat nodes a binding applies to.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeSelector {
    /// The node with this id.
    Id(String),
    /// The `occurrence`-th node (zero-based) of this type, in ascending id order.
    NthOfType {
        operator_type: String,
        occurrence: usize,
    },
    /// Every node of this type.
    AllOfType(String),
}

impl NodeSelector {
    fn select(&self, graph: &FlatGraph) -> Vec<String> {
        match self {
            NodeSelector::Id(id) if graph.contains(id) => vec![id.clone()],
            NodeSelector::Id(_) => Vec::new(),
            NodeSelector::NthOfType {
                operator_type,
                occurrence,
            } => graph
                .ids_of_type(operator_type)
                .into_iter()
                .nth(*occurrence)
                .into_iter()
                .collect(),
            NodeSelector::AllOfType(operator_type) => graph.ids_of_type(operator_type),
        }
    }
}

/// What to do to the selected parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BindingAction {
    /// Overwrite unconditionally.
    Set(Value),
    /// Overwrite only an existing empty-string literal.
    FillEmpty(Value),
    /// Replace an existing literal with a fresh random integer.
    RandomizeSeed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub selector: NodeSelector,
    pub parameter: String,
    pub action: BindingAction,
}

/// An ordered list of bindings; later bindings see the effect of earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LateBindings {
    bindings: Vec<Binding>,
}

impl LateBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn set(self, node_id: impl Into<String>, parameter: &str, value: Value) -> Self {
        self.push(Binding {
            selector: NodeSelector::Id(node_id.into()),
            parameter: parameter.to_string(),
            action: BindingAction::Set(value),
        })
    }

    pub fn set_nth_of_type(
        self,
        operator_type: &str,
        occurrence: usize,
        parameter: &str,
        value: Value,
    ) -> Self {
        self.push(Binding {
            selector: NodeSelector::NthOfType {
                operator_type: operator_type.to_string(),
                occurrence,
            },
            parameter: parameter.to_string(),
            action: BindingAction::Set(value),
        })
    }

    pub fn fill_empty_text(self, operator_type: &str, parameter: &str, value: Value) -> Self {
        self.push(Binding {
            selector: NodeSelector::AllOfType(operator_type.to_string()),
            parameter: parameter.to_string(),
            action: BindingAction::FillEmpty(value),
        })
    }

    pub fn randomize_seed(self, operator_type: &str, parameter: &str) -> Self {
        self.push(Binding {
            selector: NodeSelector::AllOfType(operator_type.to_string()),
            parameter: parameter.to_string(),
            action: BindingAction::RandomizeSeed,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Applies every binding using the thread-local RNG. Returns the number of parameters
    /// written.
    pub fn apply(&self, graph: &mut FlatGraph) -> usize {
        self.apply_with_rng(graph, &mut rand::rng())
    }

    pub fn apply_with_rng<R: Rng>(&self, graph: &mut FlatGraph, rng: &mut R) -> usize {
        let mut written = 0;
        for binding in &self.bindings {
            for id in binding.selector.select(graph) {
                let Some(node) = graph.get_mut(&id) else {
                    continue;
                };
                if apply_action(node, &binding.parameter, &binding.action, rng) {
                    log::debug!("Bound '{}' on node {}", binding.parameter, id);
                    written += 1;
                }
            }
        }
        written
    }
}

fn apply_action<R: Rng>(
    node: &mut FlatNode,
    parameter: &str,
    action: &BindingAction,
    rng: &mut R,
) -> bool {
    let current = node.parameters.get(parameter);
    let value = match action {
        BindingAction::Set(value) => value.clone(),
        BindingAction::FillEmpty(value) => match current {
            Some(Parameter::Literal(Value::String(s))) if s.is_empty() => value.clone(),
            _ => return false,
        },
        BindingAction::RandomizeSeed => match current {
            Some(Parameter::Literal(_)) => Value::from(rng.random_range(0..SEED_RANGE)),
            _ => return false,
        },
    };
    node.parameters
        .insert(parameter.to_string(), Parameter::Literal(value));
    true
}
