use super::resolver::PassThroughResolver;
use crate::error::FlattenError;
use crate::workflow::{FlatGraph, OverrideEdge, Parameter};

/// Applies the auxiliary override edges on top of the mapped graph.
///
/// Override edges only name a destination slot index, so the parameter they land on is
/// picked by a fixed rule set:
/// - slot 0 of a `SaveImage` node always becomes `images`, replacing any earlier value;
/// - an `IMAGE` edge fills `images` on `PreviewImage` and `image` elsewhere, but only
///   while the node has neither parameter.
///
/// Everything else is ignored.
pub(super) fn apply_override_edges(
    graph: &mut FlatGraph,
    overrides: &[OverrideEdge],
    resolver: &PassThroughResolver<'_>,
    diagnostics: &mut Vec<FlattenError>,
) {
    for edge in overrides {
        let Some(target) = graph.get_mut(&edge.downstream.to_string()) else {
            continue;
        };

        let (producer, slot) = match resolver.resolve(edge.upstream, edge.upstream_slot) {
            Ok(source) => source,
            Err(reason) => {
                log::debug!(
                    "Ignoring override edge {} -> {}: {}",
                    edge.upstream,
                    edge.downstream,
                    reason
                );
                diagnostics.push(FlattenError::UnresolvedReference {
                    node_id: edge.downstream,
                    input: format!("override slot {}", edge.downstream_slot),
                    reason,
                });
                continue;
            }
        };
        let reference = Parameter::reference(producer, slot);

        if target.operator_type == "SaveImage" && edge.downstream_slot == 0 {
            target.parameters.insert("images".to_string(), reference);
        } else if edge.data_type == "IMAGE"
            && !target.parameters.contains_key("image")
            && !target.parameters.contains_key("images")
        {
            let name = if target.operator_type == "PreviewImage" {
                "images"
            } else {
                "image"
            };
            target.parameters.insert(name.to_string(), reference);
        }
    }
}
