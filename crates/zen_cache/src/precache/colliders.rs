//! Heuristic collider segmentation for elongated item meshes
//!
//! Approximates a weapon/tool mesh with a short sequence of box and capsule
//! primitives: build a width profile along the object's main axis, cut
//! segments where the profile transitions (handle/guard steps, pommel
//! bulges), then fit one primitive per segment. Collider generation is a
//! best-effort enhancement; missing or degenerate input is a silent skip.

use crate::config::ColliderConfig;
use crate::foundation::math::{Aabb, Axis, Vec3};
use crate::precache::artifact::ColliderPrimitive;
use crate::world::MeshData;

/// Segments whose main-axis extent is more than twice the perpendicular
/// width become capsules, everything stockier becomes a box.
const CAPSULE_ASPECT: f32 = 2.0;

/// Below this overall aspect ratio the mesh is probably not an elongated
/// object and the segmentation heuristic is questionable.
const ELONGATED_ASPECT: f32 = 1.5;

const EPSILON: f32 = 1e-4;

/// Generate collider primitives for one item mesh.
///
/// `bounds` is the mesh's bounding box in meters (usually from the visual
/// bounds cache); positions are object-space meters. Empty mesh data or a
/// degenerate box yields an empty list.
pub fn generate_colliders(
    mesh: &MeshData,
    bounds: &Aabb,
    config: &ColliderConfig,
) -> Vec<ColliderPrimitive> {
    if mesh.positions.is_empty() || mesh.triangles.is_empty() {
        return Vec::new();
    }
    let size = bounds.size();
    if size.x.max(size.y).max(size.z) <= EPSILON {
        return Vec::new();
    }

    // Step 1: orientation.
    let main_axis = bounds.longest_axis();
    let [perp_a, perp_b] = main_axis.perpendicular();
    let length = main_axis.component(&size);
    let max_perp = perp_a.component(&size).max(perp_b.component(&size));
    if length / (max_perp + EPSILON) < ELONGATED_ASPECT {
        log::warn!(
            "Mesh aspect ratio {:.2} below {ELONGATED_ASPECT}, segmentation may be poor",
            length / (max_perp + EPSILON)
        );
    }

    let samples = config.samples.max(1);
    let min_height = main_axis.component(&bounds.min);
    let widths = width_profile(mesh, main_axis, [perp_a, perp_b], min_height, length, samples);

    // Step 3: segment boundaries from profile transitions.
    let boundaries = segment_boundaries(&widths, min_height, length, samples, config);

    // Step 4: one primitive per sufficiently populated segment.
    let min_points = config.min_vertices_per_segment / 3;
    let mut primitives = Vec::new();
    for window in boundaries.windows(2) {
        let (start, end) = (window[0], window[1]);
        let is_last = (end - (min_height + length)).abs() <= EPSILON;
        let members: Vec<Vec3> = mesh
            .positions
            .iter()
            .filter(|p| {
                let h = main_axis.component(p);
                h >= start && (h < end || (is_last && h <= end))
            })
            .copied()
            .collect();
        if members.is_empty() || members.len() < min_points {
            continue;
        }

        let segment_bounds = Aabb::from_points(&members);
        let seg_size = segment_bounds.size();
        let height = main_axis.component(&seg_size);
        let width = perp_a
            .component(&seg_size)
            .max(perp_b.component(&seg_size));

        if height / (width + EPSILON) > CAPSULE_ASPECT {
            primitives.push(ColliderPrimitive::Capsule {
                center: segment_bounds.center(),
                axis: main_axis,
                height,
                radius: width * 0.5,
            });
        } else {
            primitives.push(ColliderPrimitive::Box {
                center: segment_bounds.center(),
                size: seg_size,
            });
        }
    }

    primitives
}

/// Step 2: per-slice width of the mesh along the main axis.
///
/// Each slice's width is the larger of the two perpendicular spans over
/// every vertex inside the slice plus every triangle-edge intersection with
/// the slice planes. A slice no geometry crosses inherits the nearest
/// earlier non-zero width, so the profile has no holes.
fn width_profile(
    mesh: &MeshData,
    main_axis: Axis,
    perp: [Axis; 2],
    min_height: f32,
    length: f32,
    samples: usize,
) -> Vec<f32> {
    let slice_width = length / samples as f32;
    let mut widths = vec![0.0f32; samples];

    for (i, width) in widths.iter_mut().enumerate() {
        let lo = min_height + i as f32 * slice_width;
        let hi = lo + slice_width;
        let last = i + 1 == samples;

        let mut span_a: Option<(f32, f32)> = None;
        let mut span_b: Option<(f32, f32)> = None;
        let mut grow = |point: Vec3| {
            let a = perp[0].component(&point);
            let b = perp[1].component(&point);
            span_a = Some(span_a.map_or((a, a), |(lo, hi)| (lo.min(a), hi.max(a))));
            span_b = Some(span_b.map_or((b, b), |(lo, hi)| (lo.min(b), hi.max(b))));
        };

        for tri in &mesh.triangles {
            // A triangle referencing a missing vertex is skipped, not fatal.
            let (Some(&p0), Some(&p1), Some(&p2)) = (
                mesh.positions.get(tri[0] as usize),
                mesh.positions.get(tri[1] as usize),
                mesh.positions.get(tri[2] as usize),
            ) else {
                continue;
            };
            let points = [p0, p1, p2];
            for p in points {
                let h = main_axis.component(&p);
                if h >= lo && (h < hi || (last && h <= hi)) {
                    grow(p);
                }
            }
            // Edges straddling a slice plane contribute interpolated points.
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                for plane in [lo, hi] {
                    if let Some(p) = edge_plane_intersection(points[a], points[b], main_axis, plane)
                    {
                        grow(p);
                    }
                }
            }
        }

        *width = match (span_a, span_b) {
            (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => (a_hi - a_lo).max(b_hi - b_lo),
            _ => 0.0,
        };
    }

    // Fill empty slices from the nearest earlier non-zero width.
    let mut carry = 0.0f32;
    for width in &mut widths {
        if *width > 0.0 {
            carry = *width;
        } else {
            *width = carry;
        }
    }

    widths
}

/// Linear interpolation of an edge against a main-axis plane, `None` when
/// the edge does not strictly straddle it.
fn edge_plane_intersection(a: Vec3, b: Vec3, axis: Axis, plane: f32) -> Option<Vec3> {
    let ha = axis.component(&a);
    let hb = axis.component(&b);
    if (ha < plane && hb > plane) || (hb < plane && ha > plane) {
        let t = (plane - ha) / (hb - ha);
        Some(a + (b - a) * t)
    } else {
        None
    }
}

/// Step 3: main-axis positions where a new segment starts.
///
/// Triggers: a strict local width minimum (handle/guard transition), a
/// strict local maximum above `2 × width_threshold` (pommel/guard bulge),
/// or an adjacent-sample relative width change above `width_threshold`.
/// Boundaries closer together than `segment_distance × length` are merged
/// keep-first. The returned list always starts at the profile start and
/// ends at its end.
fn segment_boundaries(
    widths: &[f32],
    min_height: f32,
    length: f32,
    samples: usize,
    config: &ColliderConfig,
) -> Vec<f32> {
    let slice_width = length / samples as f32;
    let merge_distance = config.segment_distance * length;
    let bulge_width = 2.0 * config.width_threshold;

    let mut boundaries = vec![min_height];
    for i in 1..samples {
        let prev = widths[i - 1];
        let here = widths[i];
        let next = widths.get(i + 1).copied();

        let local_min = next.is_some_and(|n| here < prev && here < n);
        let local_max = next.is_some_and(|n| here > prev && here > n && here > bulge_width);
        let step_change = (here - prev).abs() / prev.max(EPSILON) > config.width_threshold;

        if local_min || local_max || step_change {
            let position = min_height + i as f32 * slice_width;
            let last_kept = *boundaries.last().unwrap_or(&min_height);
            if position - last_kept >= merge_distance {
                boundaries.push(position);
            }
        }
    }

    // Close the profile; drop an interior boundary that would leave a
    // sliver against the end.
    let end = min_height + length;
    if let Some(&last) = boundaries.last() {
        if boundaries.len() > 1 && end - last < merge_distance {
            boundaries.pop();
        }
    }
    boundaries.push(end);
    boundaries
}
