use super::links::LinkTable;
use crate::error::UnresolvedReason;
use crate::workflow::{Node, NodeId, SlotIndex};
use ahash::{AHashMap, AHashSet};

/// Traces an edge source back through routing nodes to the node that actually produces
/// the value.
pub struct PassThroughResolver<'a> {
    nodes: AHashMap<NodeId, &'a Node>,
    links: &'a LinkTable<'a>,
    routing_types: &'a AHashSet<String>,
}

impl<'a> PassThroughResolver<'a> {
    pub fn new(
        nodes: &'a [Node],
        links: &'a LinkTable<'a>,
        routing_types: &'a AHashSet<String>,
    ) -> Self {
        Self {
            nodes: nodes.iter().map(|n| (n.id, n)).collect(),
            links,
            routing_types,
        }
    }

    /// Whether values only flow through `node` unchanged.
    ///
    /// Subgraph instances and orphaned instances count as well, so nothing resolves to a
    /// node the backend cannot run.
    pub fn is_pass_through(&self, node: &Node) -> bool {
        !node.kind.is_primitive() || self.routing_types.contains(&node.operator_type)
    }

    pub fn node(&self, id: NodeId) -> Option<&'a Node> {
        self.nodes.get(&id).copied()
    }

    /// Returns the real producer for output `slot` of `node_id`.
    pub fn resolve(
        &self,
        node_id: NodeId,
        slot: SlotIndex,
    ) -> Result<(NodeId, SlotIndex), UnresolvedReason> {
        let mut current = (node_id, slot);
        let mut visited = AHashSet::new();

        loop {
            let (id, slot) = current;
            if !visited.insert(id) {
                return Err(UnresolvedReason::Cycle(id));
            }

            let node = self.node(id).ok_or(UnresolvedReason::MissingNode(id))?;
            if !self.is_pass_through(node) {
                return Ok((id, slot));
            }

            // Routing nodes forward their single input.
            let link = node
                .inputs
                .first()
                .and_then(|input| input.link)
                .ok_or(UnresolvedReason::DeadEnd(id))?;
            let edge = self
                .links
                .get(link)
                .ok_or(UnresolvedReason::MissingEdge(link))?;
            current = (edge.source, edge.source_slot);
        }
    }
}
