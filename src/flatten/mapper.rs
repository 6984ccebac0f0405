use super::links::LinkTable;
use super::resolver::PassThroughResolver;
use super::schema::WidgetSchema;
use crate::error::FlattenError;
use crate::workflow::{FlatGraph, FlatNode, Node, NodeMeta, Parameter, Workflow};
use ahash::{AHashMap, AHashSet};
use serde_json::Map;
use std::collections::BTreeMap;

/// Projects an expanded workflow onto the flat graph.
pub(super) struct WidgetMapper<'a> {
    workflow: &'a Workflow,
    schemas: &'a AHashMap<String, WidgetSchema>,
    links: &'a LinkTable<'a>,
    resolver: &'a PassThroughResolver<'a>,
}

impl<'a> WidgetMapper<'a> {
    pub(super) fn new(
        workflow: &'a Workflow,
        schemas: &'a AHashMap<String, WidgetSchema>,
        links: &'a LinkTable<'a>,
        resolver: &'a PassThroughResolver<'a>,
    ) -> Self {
        Self {
            workflow,
            schemas,
            links,
            resolver,
        }
    }

    /// Emits one flat node per executable node. Routing nodes and leftover instances are
    /// elided; references through them were already resolved past them.
    pub(super) fn map(&self, diagnostics: &mut Vec<FlattenError>) -> FlatGraph {
        self.workflow
            .nodes
            .iter()
            .filter(|node| !self.resolver.is_pass_through(node))
            .map(|node| (node.id.to_string(), self.map_node(node, diagnostics)))
            .collect()
    }

    fn map_node(&self, node: &Node, diagnostics: &mut Vec<FlattenError>) -> FlatNode {
        let mut parameters: BTreeMap<String, Parameter> = BTreeMap::new();
        let mut linked: AHashSet<&str> = AHashSet::new();

        // Linked inputs first; they always win over positional values.
        for input in &node.inputs {
            let Some(edge) = input.link.and_then(|link| self.links.get(link)) else {
                continue;
            };
            linked.insert(input.name.as_str());

            match self.resolver.resolve(edge.source, edge.source_slot) {
                Ok((producer, slot)) => {
                    parameters.insert(input.name.clone(), Parameter::reference(producer, slot));
                }
                Err(reason) => {
                    log::debug!(
                        "Dropping input '{}' of node {}: {}",
                        input.name,
                        node.id,
                        reason
                    );
                    diagnostics.push(FlattenError::UnresolvedReference {
                        node_id: node.id,
                        input: input.name.clone(),
                        reason,
                    });
                }
            }
        }

        match self.schemas.get(&node.operator_type) {
            Some(schema) => {
                for (name, value) in schema.apply(&node.widget_values) {
                    if linked.contains(name) || parameters.contains_key(name) {
                        continue;
                    }
                    parameters.insert(name.to_string(), Parameter::Literal(value.clone()));
                }
            }
            None if !node.widget_values.is_empty() => {
                log::debug!(
                    "No widget schema for '{}' (node {}), dropping {} value(s)",
                    node.operator_type,
                    node.id,
                    node.widget_values.len()
                );
                diagnostics.push(FlattenError::UnknownOperatorType {
                    node_id: node.id,
                    operator_type: node.operator_type.clone(),
                    dropped: node.widget_values.len(),
                });
            }
            None => {}
        }

        let title = node
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| node.operator_type.clone());

        FlatNode {
            operator_type: node.operator_type.clone(),
            parameters,
            meta: Some(NodeMeta {
                title: Some(title),
                extra: Map::new(),
            }),
            extra: Map::new(),
        }
    }
}
