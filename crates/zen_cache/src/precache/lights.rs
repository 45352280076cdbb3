//! Stationary light collection
//!
//! Walks the VOB tree and accumulates every non-static point/spot light as
//! a flat [`LightDescriptor`] list plus one bounding box per light. Fire
//! props may embed a whole sub-world of their own; those are loaded through
//! the geometry source and walked with the fire's world position as the new
//! parent offset.
//!
//! The traversal runs on an explicit worklist instead of native recursion,
//! so pathological content cannot exhaust the call stack and the carried
//! parent position is explicit state. Descriptor order is stable for a
//! given world: the renderer later addresses lights by list position.

use crate::assets::GeometrySource;
use crate::foundation::math::{srgb_to_linear, Aabb, Vec3, CM_TO_M};
use crate::precache::artifact::LightDescriptor;
use crate::precache::pipeline::PipelineError;
use crate::precache::progress::{ProgressEvent, ProgressSink, ProgressStage};
use crate::world::{GameVersion, VobKind, VobNode};

/// Known-corrupt fire sub-world shipped with Gothic 1. Loading it produces
/// garbage VOB data, so it is skipped outright. A data workaround for one
/// asset, not a general rule.
pub const CORRUPT_FIRE_SUB_WORLD_G1: &str = "FIREPLACE_HIGH.ZEN";

/// Result of one light-collection pass.
#[derive(Debug, Default)]
pub struct CollectedLights {
    /// Stationary lights in traversal order
    pub lights: Vec<LightDescriptor>,
    /// One bounding box per light, same index
    pub bounds: Vec<Aabb>,
}

/// Worklist entry: a node (borrowed from the world tree or owned after a
/// sub-world load) plus the accumulated parent world position.
enum WorkItem<'a> {
    Borrowed(&'a VobNode, Vec3),
    Owned(VobNode, Vec3),
}

/// Collect all non-static lights reachable from `root_vobs`.
///
/// Parent world positions are accumulated as plain sums of local positions;
/// parent rotation is intentionally not applied (known limitation carried
/// over from the source data handling). A missing embedded sub-world is a
/// logged skip, never an abort.
pub fn collect_lights(
    root_vobs: &[VobNode],
    source: &dyn GeometrySource,
    version: GameVersion,
    progress: &mut dyn ProgressSink,
) -> Result<CollectedLights, PipelineError> {
    let mut collected = CollectedLights::default();
    let mut visited = 0usize;

    // Pre-order: push in reverse so the first sibling pops first.
    let mut stack: Vec<WorkItem<'_>> = root_vobs
        .iter()
        .rev()
        .map(|vob| WorkItem::Borrowed(vob, Vec3::zeros()))
        .collect();

    while let Some(item) = stack.pop() {
        if !progress.step(ProgressEvent {
            stage: ProgressStage::LightCollection,
            item: visited,
        }) {
            return Err(PipelineError::Cancelled);
        }
        visited += 1;

        match item {
            WorkItem::Borrowed(node, parent_pos) => {
                let world_pos = parent_pos + node.local_position;
                // Children go on the stack first so a fire's sub-world
                // roots, pushed by process_node, end up above them and are
                // walked before the fire's own children.
                for child in node.children.iter().rev() {
                    stack.push(WorkItem::Borrowed(child, world_pos));
                }
                process_node(&node.kind, world_pos, source, version, &mut collected, &mut stack);
            }
            WorkItem::Owned(mut node, parent_pos) => {
                let world_pos = parent_pos + node.local_position;
                while let Some(child) = node.children.pop() {
                    stack.push(WorkItem::Owned(child, world_pos));
                }
                process_node(&node.kind, world_pos, source, version, &mut collected, &mut stack);
            }
        }
    }

    Ok(collected)
}

fn process_node<'a>(
    kind: &VobKind,
    world_pos: Vec3,
    source: &dyn GeometrySource,
    version: GameVersion,
    collected: &mut CollectedLights,
    stack: &mut Vec<WorkItem<'a>>,
) {
    match kind {
        VobKind::Light(light) => {
            if light.is_static {
                return;
            }
            let range = light.range_cm * CM_TO_M;
            let descriptor = LightDescriptor {
                position: world_pos,
                range,
                color: [
                    srgb_to_linear(light.color[0]),
                    srgb_to_linear(light.color[1]),
                    srgb_to_linear(light.color[2]),
                    f32::from(light.color[3]) / 255.0,
                ],
            };
            collected.bounds.push(descriptor.bounds());
            collected.lights.push(descriptor);
        }
        VobKind::Fire { sub_world } => {
            if sub_world.is_empty() {
                return;
            }
            if version == GameVersion::Gothic1 && sub_world == CORRUPT_FIRE_SUB_WORLD_G1 {
                log::error!("Skipping known-corrupt fire sub-world '{sub_world}'");
                return;
            }
            match source.load_sub_world(sub_world, version) {
                Some(roots) => {
                    // Sub-world roots are walked before the fire's own
                    // children, offset by the fire's world position.
                    for root in roots.into_iter().rev() {
                        stack.push(WorkItem::Owned(root, world_pos));
                    }
                }
                None => {
                    log::warn!("Fire sub-world '{sub_world}' could not be loaded, skipping");
                }
            }
        }
        VobKind::Generic { .. } => {}
    }
}
