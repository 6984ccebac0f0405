use crate::error::FlattenError;
use crate::workflow::{
    Edge, EdgeId, Node, NodeId, NodeKind, SlotIndex, SubgraphDefinition, Workflow,
};
use ahash::{AHashMap, AHashSet};

/// Gap left between the largest id found in the document and the first allocated id.
pub const ID_MARGIN: i64 = 1000;

/// Hands out node and edge ids that cannot collide with any id already in a workflow.
///
/// Owned by a single expansion run; every call to `SubgraphExpander::expand` starts a new one.
/// Once the id space above the document's largest id is used up, the allocator returns
/// `None` instead of wrapping around.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    last_node: NodeId,
    last_edge: EdgeId,
}

impl IdAllocator {
    pub fn for_workflow(workflow: &Workflow) -> Self {
        let max_node = workflow
            .nodes
            .iter()
            .map(|n| n.id)
            .chain(
                workflow
                    .override_edges
                    .iter()
                    .flat_map(|o| [o.downstream, o.upstream]),
            )
            .max()
            .unwrap_or(0)
            .max(0);

        // Slots may reference edges missing from the edge list; stay clear of those too.
        let max_edge = workflow
            .edges
            .iter()
            .map(|e| e.id)
            .chain(workflow.nodes.iter().flat_map(|n| {
                n.inputs
                    .iter()
                    .filter_map(|i| i.link)
                    .chain(n.outputs.iter().flat_map(|o| o.links.iter().copied()))
            }))
            .max()
            .unwrap_or(0)
            .max(0);

        Self {
            last_node: max_node.saturating_add(ID_MARGIN),
            last_edge: max_edge.saturating_add(ID_MARGIN),
        }
    }

    pub fn next_node(&mut self) -> Option<NodeId> {
        self.last_node = self.last_node.checked_add(1)?;
        Some(self.last_node)
    }

    pub fn next_edge(&mut self) -> Option<EdgeId> {
        self.last_edge = self.last_edge.checked_add(1)?;
        Some(self.last_edge)
    }
}

/// An edge created from an instance input, and the internal edge it replaces.
struct WiredInput {
    target: NodeId,
    target_slot: SlotIndex,
    internal_edge: EdgeId,
    edge: EdgeId,
}

/// Inlines subgraph instances until none are left.
#[derive(Debug, Clone)]
pub struct SubgraphExpander {
    max_rounds: usize,
}

impl SubgraphExpander {
    pub fn new(max_rounds: usize) -> Self {
        Self { max_rounds }
    }

    /// Expands one instance per round, in node order, so nested definitions unfold layer
    /// by layer. Returns the number of instances inlined.
    ///
    /// When the round cap is hit the workflow is left as it was after the last completed
    /// round and `FlattenError::SubgraphRecursion` is returned.
    pub fn expand(&self, workflow: &mut Workflow) -> Result<usize, FlattenError> {
        let definitions: AHashMap<String, SubgraphDefinition> = workflow
            .subgraphs
            .iter()
            .map(|d| (d.id.clone(), d.clone()))
            .collect();
        let mut ids = IdAllocator::for_workflow(workflow);
        let mut rounds = 0;

        loop {
            let Some((index, definition_id)) =
                workflow
                    .nodes
                    .iter()
                    .enumerate()
                    .find_map(|(i, n)| match &n.kind {
                        NodeKind::SubgraphInstance(id) => Some((i, id.clone())),
                        _ => None,
                    })
            else {
                return Ok(rounds);
            };

            if rounds >= self.max_rounds {
                return Err(FlattenError::SubgraphRecursion {
                    definition_id,
                    cap: self.max_rounds,
                });
            }

            let Some(definition) = definitions.get(&definition_id) else {
                // Built by hand without its definition; nothing to inline.
                workflow.nodes[index].kind = NodeKind::OrphanInstance;
                continue;
            };

            let instance = workflow.nodes.remove(index);
            log::trace!(
                "Expanding subgraph '{}' at node {} (round {})",
                definition_id,
                instance.id,
                rounds + 1
            );
            // Ids are all allocated before the workflow is touched, so on failure putting
            // the instance back restores the last completed round.
            if let Err(e) = inline_instance(workflow, index, &instance, definition, &mut ids) {
                workflow.nodes.insert(index, instance);
                return Err(e);
            }
            rounds += 1;
        }
    }
}

/// Replaces the (already removed) instance at `index` with a fresh copy of `definition`.
fn inline_instance(
    workflow: &mut Workflow,
    index: usize,
    instance: &Node,
    definition: &SubgraphDefinition,
    ids: &mut IdAllocator,
) -> Result<(), FlattenError> {
    let exhausted = || FlattenError::IdSpaceExhausted {
        definition_id: definition.id.clone(),
    };

    // 1. Copy the internal nodes; the boundary nodes stay virtual.
    let mut node_map: AHashMap<NodeId, NodeId> = AHashMap::new();
    let mut inlined: Vec<Node> = definition
        .nodes
        .iter()
        .filter(|n| !definition.is_boundary(n.id))
        .map(|internal| {
            let mut node = internal.clone();
            node.id = ids.next_node().ok_or_else(exhausted)?;
            node_map.insert(internal.id, node.id);
            Ok(node)
        })
        .collect::<Result<_, FlattenError>>()?;

    // 2. Copy purely internal edges.
    let mut edge_map: AHashMap<EdgeId, EdgeId> = AHashMap::new();
    let mut new_edges: Vec<Edge> = Vec::new();
    for edge in &definition.edges {
        if edge.source == definition.input_node || edge.target == definition.output_node {
            continue;
        }
        let (Some(&source), Some(&target)) =
            (node_map.get(&edge.source), node_map.get(&edge.target))
        else {
            continue;
        };
        let id = ids.next_edge().ok_or_else(exhausted)?;
        edge_map.insert(edge.id, id);
        new_edges.push(Edge {
            id,
            source,
            target,
            ..edge.clone()
        });
    }

    // 3. Connect whatever feeds the instance to the internal destinations of each input port.
    let external_sources: AHashMap<EdgeId, (NodeId, SlotIndex)> = instance
        .inputs
        .iter()
        .filter_map(|i| i.link)
        .filter_map(|link| {
            workflow
                .edges
                .iter()
                .find(|e| e.id == link && e.target == instance.id)
                .map(|e| (link, (e.source, e.source_slot)))
        })
        .collect();

    let mut wired: Vec<WiredInput> = Vec::new();
    let mut fanout: Vec<(NodeId, SlotIndex, EdgeId)> = Vec::new();
    for input in &instance.inputs {
        let Some(external_id) = input.link else {
            continue;
        };
        let Some(&(source, source_slot)) = external_sources.get(&external_id) else {
            continue;
        };
        let Some(port) = definition.inputs.iter().find(|p| p.name == input.name) else {
            continue;
        };

        let mut reused = false;
        for internal in port.link_ids.iter().filter_map(|id| definition.edge(*id)) {
            let Some(&target) = node_map.get(&internal.target) else {
                continue;
            };
            // The first destination keeps the external id, extra destinations get their own.
            let id = if reused {
                let id = ids.next_edge().ok_or_else(exhausted)?;
                fanout.push((source, source_slot, id));
                id
            } else {
                reused = true;
                external_id
            };
            new_edges.push(Edge {
                id,
                source,
                source_slot,
                target,
                target_slot: internal.target_slot,
                data_type: internal.data_type.clone(),
            });
            wired.push(WiredInput {
                target,
                target_slot: internal.target_slot,
                internal_edge: internal.id,
                edge: id,
            });
        }
    }

    // 4. Point the inlined slots at the new edges. Slots still naming an internal edge
    //    that was not copied (an unconnected port) are cleared.
    for node in &mut inlined {
        let node_id = node.id;
        let input_count = node.inputs.len();
        for (slot, input) in node.inputs.iter_mut().enumerate() {
            let wire = wired
                .iter()
                .find(|w| w.target == node_id && w.target_slot as usize == slot)
                .or_else(|| {
                    // Slot index past the declared inputs: match on the edge it replaces.
                    wired.iter().find(|w| {
                        w.target == node_id
                            && w.target_slot as usize >= input_count
                            && Some(w.internal_edge) == input.link
                    })
                });
            input.link = match wire {
                Some(w) => Some(w.edge),
                None => input.link.and_then(|old| edge_map.get(&old).copied()),
            };
        }
        for output in &mut node.outputs {
            output.links = output
                .links
                .iter()
                .filter_map(|old| edge_map.get(old).copied())
                .collect();
        }
    }

    // 5. Re-source edges leaving the instance at the internal producer of each output port.
    for edge in workflow.edges.iter_mut().filter(|e| e.source == instance.id) {
        let slot = edge.source_slot as usize;
        let port = match instance.outputs.get(slot) {
            Some(output) => definition.outputs.iter().find(|p| p.name == output.name),
            None => definition.outputs.get(slot),
        };
        let Some(internal) = port
            .and_then(|p| p.link_ids.first())
            .and_then(|id| definition.edge(*id))
        else {
            continue;
        };

        if let Some(&source) = node_map.get(&internal.source) {
            edge.source = source;
            edge.source_slot = internal.source_slot;
            if let Some(output) = inlined
                .iter_mut()
                .find(|n| n.id == source)
                .and_then(|n| n.outputs.get_mut(internal.source_slot as usize))
            {
                output.links.push(edge.id);
            }
        } else if internal.source == definition.input_node {
            // The port forwards one of the instance inputs unchanged.
            let forwarded = definition
                .inputs
                .get(internal.source_slot as usize)
                .and_then(|p| instance.input(&p.name))
                .and_then(|i| i.link)
                .and_then(|link| external_sources.get(&link));
            if let Some(&(source, source_slot)) = forwarded {
                edge.source = source;
                edge.source_slot = source_slot;
            }
        }
    }

    // 6. Splice the copy in where the instance was.
    workflow.nodes.splice(index..index, inlined);
    for (source, source_slot, id) in fanout {
        if let Some(output) = workflow
            .node_mut(source)
            .and_then(|n| n.outputs.get_mut(source_slot as usize))
        {
            output.links.push(id);
        }
    }
    workflow.edges.extend(new_edges);

    // 7. Drop edges that lost an endpoint.
    let live: AHashSet<NodeId> = workflow.nodes.iter().map(|n| n.id).collect();
    workflow
        .edges
        .retain(|e| live.contains(&e.source) && live.contains(&e.target));
    Ok(())
}
