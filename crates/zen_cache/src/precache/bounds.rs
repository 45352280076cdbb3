//! Visual bounds computation
//!
//! Computes an axis-aligned bounding box in meters for any named visual
//! asset. Multi-resolution meshes store an oriented box whose axis vectors
//! arrive in an arbitrary permutation of the world axes; only the identity
//! and the two cyclic rotations occur in shipped data, anything else is a
//! data-integrity failure and degrades to a zero box.

use crate::assets::GeometrySource;
use crate::foundation::math::{Aabb, Axis, Vec3, CM_TO_M};
use crate::precache::context::CacheContext;
use crate::world::{OrientedBounds, VisualData, VisualType};

/// Compute the bounds of a named visual, in meters.
///
/// Returns `None` when the geometry source has no such asset (an expected
/// condition, not an error). A model's box is the union of all sub-mesh
/// boxes plus all attachment boxes.
pub fn compute_visual_bounds(
    source: &dyn GeometrySource,
    visual_type: VisualType,
    name: &str,
) -> Option<Aabb> {
    let data = source.load_visual(visual_type, name)?;

    let bounds = match data {
        VisualData::Mesh { bounds_cm, .. } => bounds_cm.scaled(CM_TO_M),
        VisualData::MultiResolutionMesh { bounds, .. }
        | VisualData::MorphMesh { bounds, .. } => normalize_oriented_bounds(&bounds, name),
        VisualData::Model {
            sub_meshes,
            attachments,
        } => {
            let mut boxes = sub_meshes
                .iter()
                .chain(attachments.iter())
                .map(|obb| normalize_oriented_bounds(obb, name));
            let Some(mut union) = boxes.next() else {
                log::warn!("Model '{name}' has no sub-meshes or attachments");
                return Some(Aabb::zero());
            };
            for b in boxes {
                union.encapsulate(&b);
            }
            union
        }
    };

    Some(bounds)
}

/// Bounds lookup through the per-run cache.
///
/// Computes at most once per unique visual name. A name whose asset is
/// missing stays absent from the cache; repeating the lookup is
/// deterministic either way.
pub(crate) fn cached_visual_bounds(
    ctx: &mut CacheContext,
    source: &dyn GeometrySource,
    visual_type: VisualType,
    name: &str,
) -> Option<Aabb> {
    if let Some(bounds) = ctx.visual_bounds.get(name) {
        return Some(*bounds);
    }
    let bounds = compute_visual_bounds(source, visual_type, name)?;
    ctx.visual_bounds.insert(name.to_string(), bounds);
    Some(bounds)
}

/// Re-map an oriented box to a world-axis-aligned box in meters.
///
/// The source box gives three axis vectors and a half-width per axis. The
/// axis vectors are unit-aligned with the world axes but may be permuted;
/// the half-widths follow the same permutation. Detect which permutation
/// applies and assign each half-width to the world axis its vector points
/// along, then double to full size.
fn normalize_oriented_bounds(obb: &OrientedBounds, name: &str) -> Aabb {
    let Some(permutation) = detect_axis_permutation(&obb.axes) else {
        log::error!(
            "Visual '{name}' has an unrecognized bounding-box axis permutation: {:?}",
            obb.axes
        );
        return Aabb::zero();
    };

    let mut half = Vec3::zeros();
    for (i, world_axis) in permutation.iter().enumerate() {
        let value = obb.half_width[i].abs();
        match world_axis {
            Axis::X => half.x = value,
            Axis::Y => half.y = value,
            Axis::Z => half.z = value,
        }
    }

    Aabb::from_center_size(obb.center * CM_TO_M, half * 2.0 * CM_TO_M)
}

/// World axis each box axis is unit-aligned with, if the triple is the
/// identity or one of the two cyclic rotations.
fn detect_axis_permutation(axes: &[Vec3; 3]) -> Option<[Axis; 3]> {
    const ALIGNMENT: f32 = 0.99;

    let mut mapped = [Axis::X; 3];
    for (i, axis) in axes.iter().enumerate() {
        mapped[i] = if axis.x.abs() >= ALIGNMENT {
            Axis::X
        } else if axis.y.abs() >= ALIGNMENT {
            Axis::Y
        } else if axis.z.abs() >= ALIGNMENT {
            Axis::Z
        } else {
            return None;
        };
    }

    match mapped {
        [Axis::X, Axis::Y, Axis::Z] | [Axis::Y, Axis::Z, Axis::X] | [Axis::Z, Axis::X, Axis::Y] => {
            Some(mapped)
        }
        _ => None,
    }
}
