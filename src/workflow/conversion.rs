use super::definition::*;
use super::wire::*;
use crate::error::ConversionError;
use ahash::AHashSet;
use serde_json::Value;

/// A trait for documents that can be converted into a canonical `Workflow`.
///
/// `RawWorkflow` (the editor's save format) implements it; other exporters can do the
/// same to reuse the flattener without going through JSON.
///
/// # Example
///
/// ```rust,no_run
/// use tenkai::prelude::*;
/// use tenkai::error::ConversionError;
///
/// struct MyGraph { ops: Vec<(i64, String)> }
///
/// impl IntoWorkflow for MyGraph {
///     fn into_workflow(self) -> std::result::Result<Workflow, ConversionError> {
///         let nodes = self
///             .ops
///             .into_iter()
///             .map(|(id, op)| Node {
///                 id,
///                 operator_type: op,
///                 kind: NodeKind::Primitive,
///                 title: None,
///                 widget_values: vec![],
///                 inputs: vec![],
///                 outputs: vec![],
///             })
///             .collect();
///         Ok(Workflow { nodes, ..Default::default() })
///     }
/// }
/// ```
pub trait IntoWorkflow {
    /// Consumes the object and converts it into a `Workflow`.
    fn into_workflow(self) -> Result<Workflow, ConversionError>;
}

impl IntoWorkflow for RawWorkflow {
    fn into_workflow(self) -> Result<Workflow, ConversionError> {
        let raw_subgraphs: Vec<RawSubgraph> = self
            .definitions
            .and_then(|d| d.subgraphs)
            .unwrap_or_default()
            .into_iter()
            .chain(self.subgraph_definitions.unwrap_or_default())
            .collect();

        let definition_ids: AHashSet<String> =
            raw_subgraphs.iter().map(|s| s.id.clone()).collect();

        let nodes = convert_nodes(self.nodes, &definition_ids, "the main graph")?;
        let edges = convert_links(self.links.unwrap_or_default());

        let subgraphs = raw_subgraphs
            .into_iter()
            .map(|raw| convert_subgraph(raw, &definition_ids))
            .collect::<Result<Vec<_>, _>>()?;

        // Override edges are auxiliary; a malformed entry is dropped on its own.
        let mut warnings = Vec::new();
        let override_edges = self
            .extra
            .and_then(|e| e.ue_links)
            .unwrap_or_default()
            .into_iter()
            .chain(self.override_edges.unwrap_or_default())
            .enumerate()
            .filter_map(|(index, raw)| match convert_override_edge(raw) {
                Ok(edge) => Some(edge),
                Err(e) => {
                    let reason = match e {
                        ConversionError::ValidationError(reason) => reason,
                        other => other.to_string(),
                    };
                    let warning = ConversionError::InvalidOverrideEdge { index, reason };
                    log::warn!("{}", warning);
                    warnings.push(warning);
                    None
                }
            })
            .collect();

        Ok(Workflow {
            nodes,
            edges,
            subgraphs,
            override_edges,
            warnings,
        })
    }
}

/// Returns `true` for the 8-4-4-4-12 hexadecimal shape the editor uses for definition ids.
pub fn looks_like_definition_id(tag: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = tag.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Classifies an operator type against the definitions present in the document.
pub fn classify(operator_type: &str, definition_ids: &AHashSet<String>) -> NodeKind {
    if definition_ids.contains(operator_type) {
        NodeKind::SubgraphInstance(operator_type.to_string())
    } else if looks_like_definition_id(operator_type) {
        NodeKind::OrphanInstance
    } else {
        NodeKind::Primitive
    }
}

fn convert_subgraph(
    raw: RawSubgraph,
    definition_ids: &AHashSet<String>,
) -> Result<SubgraphDefinition, ConversionError> {
    let scope = format!("subgraph '{}'", raw.id);
    let nodes = convert_nodes(raw.nodes, definition_ids, &scope)?;
    if nodes
        .iter()
        .any(|n| n.id == raw.input_node.id || n.id == raw.output_node.id)
    {
        // Boundary nodes are virtual; a real node reusing their id would be silently dropped.
        return Err(ConversionError::ValidationError(format!(
            "{} has a node sharing an id with its boundary nodes",
            scope
        )));
    }

    Ok(SubgraphDefinition {
        id: raw.id,
        nodes,
        edges: convert_links(raw.links.unwrap_or_default()),
        input_node: raw.input_node.id,
        output_node: raw.output_node.id,
        inputs: convert_ports(raw.inputs),
        outputs: convert_ports(raw.outputs),
    })
}

fn convert_nodes(
    raw_nodes: Vec<RawNode>,
    definition_ids: &AHashSet<String>,
    scope: &str,
) -> Result<Vec<Node>, ConversionError> {
    let mut seen = AHashSet::new();
    raw_nodes
        .into_iter()
        .map(|raw| {
            let node = convert_node(raw, definition_ids)?;
            if !seen.insert(node.id) {
                return Err(ConversionError::DuplicateNodeId {
                    node_id: node.id,
                    scope: scope.to_string(),
                });
            }
            Ok(node)
        })
        .collect()
}

fn convert_node(raw: RawNode, definition_ids: &AHashSet<String>) -> Result<Node, ConversionError> {
    let widget_values = match raw.widgets_values {
        Some(Value::Array(values)) => values,
        // Object-shaped widget state is editor-specific and has no positional meaning.
        _ => Vec::new(),
    };

    let inputs = raw
        .inputs
        .unwrap_or_default()
        .into_iter()
        .map(|i| InputSlot {
            name: i.name,
            data_type: type_tag(&i.data_type),
            link: i.link,
        })
        .collect();

    let outputs = raw
        .outputs
        .unwrap_or_default()
        .into_iter()
        .map(|o| OutputSlot {
            name: o.name,
            data_type: type_tag(&o.data_type),
            links: o.links.unwrap_or_default(),
        })
        .collect();

    Ok(Node {
        id: node_id(raw.id)?,
        kind: classify(&raw.node_type, definition_ids),
        operator_type: raw.node_type,
        title: raw.title,
        widget_values,
        inputs,
        outputs,
    })
}

fn convert_links(raw_links: Vec<RawLink>) -> Vec<Edge> {
    raw_links
        .into_iter()
        .map(|link| match link {
            RawLink::Tuple(id, source, source_slot, target, target_slot, data_type) => Edge {
                id,
                source,
                source_slot,
                target,
                target_slot,
                data_type: type_tag(&data_type),
            },
            RawLink::Object {
                id,
                origin_id,
                origin_slot,
                target_id,
                target_slot,
                data_type,
            } => Edge {
                id,
                source: origin_id,
                source_slot: origin_slot,
                target: target_id,
                target_slot,
                data_type: type_tag(&data_type),
            },
        })
        .collect()
}

fn convert_ports(raw_ports: Option<Vec<RawPort>>) -> Vec<BoundaryPort> {
    raw_ports
        .unwrap_or_default()
        .into_iter()
        .map(|p| BoundaryPort {
            name: p.name,
            data_type: type_tag(&p.data_type),
            link_ids: p.link_ids.unwrap_or_default(),
        })
        .collect()
}

fn convert_override_edge(raw: Value) -> Result<OverrideEdge, ConversionError> {
    let raw: RawOverrideEdge = serde_json::from_value(raw)
        .map_err(|e| ConversionError::ValidationError(e.to_string()))?;
    Ok(OverrideEdge {
        downstream: node_id(raw.downstream)?,
        downstream_slot: raw.downstream_slot,
        upstream: node_id(raw.upstream)?,
        upstream_slot: raw.upstream_slot,
        data_type: type_tag(&raw.data_type),
    })
}

fn node_id(raw: RawNodeId) -> Result<NodeId, ConversionError> {
    match raw {
        RawNodeId::Int(id) => Ok(id),
        RawNodeId::Text(text) => text.trim().parse().map_err(|_| {
            ConversionError::ValidationError(format!("'{}' is not a numeric node id", text))
        }),
    }
}

fn type_tag(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
