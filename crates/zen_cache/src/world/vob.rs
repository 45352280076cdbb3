//! VOB scene graph and visual asset data
//!
//! VOBs ("virtual objects") form a tree hanging off the world. The pipeline
//! only distinguishes three shapes of node: lights (feed the stationary
//! light cache), fires (may embed a whole sub-world of their own), and
//! everything else. Each node carries its children explicitly so traversal
//! can run on a worklist instead of the call stack.

use crate::foundation::math::{Aabb, Vec3};

/// Which game's asset set a world belongs to.
///
/// Sub-world lookups differ between the two games, and one Gothic 1 fire
/// asset is known-corrupt and skipped outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameVersion {
    /// Gothic 1
    Gothic1,
    /// Gothic 2 (Night of the Raven)
    #[default]
    Gothic2,
}

/// Point or spot light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightKind {
    /// Radiates in all directions
    Point,
    /// Cone light; treated like a point light for caching purposes
    Spot,
}

/// Light payload of a VOB node.
#[derive(Debug, Clone)]
pub struct VobLight {
    /// Point or spot
    pub kind: LightKind,
    /// Range in centimeters, as stored in the source asset
    pub range_cm: f32,
    /// 8-bit sRGB RGBA color
    pub color: [u8; 4],
    /// Static lights are baked elsewhere and skipped by the collector
    pub is_static: bool,
}

/// Kind of visual asset attached to a VOB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualType {
    /// Plain static mesh
    Mesh,
    /// Multi-resolution (LOD) mesh
    MultiResolutionMesh,
    /// Hierarchical model with attachments
    Model,
    /// Morph-animated mesh
    MorphMesh,
}

/// Visual asset reference carried by a generic VOB.
#[derive(Debug, Clone)]
pub struct VobVisual {
    /// Asset name, the cache key for bounds and colliders
    pub name: String,
    /// Which loader path resolves this asset
    pub visual_type: VisualType,
    /// Items (weapons, tools) additionally get generated colliders
    pub is_item: bool,
}

/// Node payload variants.
#[derive(Debug, Clone)]
pub enum VobKind {
    /// A light source
    Light(VobLight),
    /// A fire prop, optionally embedding a sub-world of its own
    Fire {
        /// Name of the embedded sub-world, empty when the prop has none
        sub_world: String,
    },
    /// Any other object
    Generic {
        /// Optional visual asset reference
        visual: Option<VobVisual>,
    },
}

/// One node of the VOB tree.
#[derive(Debug, Clone)]
pub struct VobNode {
    /// Payload variant
    pub kind: VobKind,
    /// Position relative to the parent node, in meters.
    ///
    /// World positions are accumulated as plain sums of local positions;
    /// parent rotation is intentionally not applied (known limitation of
    /// the source data handling).
    pub local_position: Vec3,
    /// Child nodes
    pub children: Vec<VobNode>,
}

impl VobNode {
    /// Generic node without a visual, positioned at `local_position`.
    pub fn generic(local_position: Vec3) -> Self {
        Self {
            kind: VobKind::Generic { visual: None },
            local_position,
            children: Vec::new(),
        }
    }
}

/// Oriented bounding box as stored in multi-resolution mesh assets.
///
/// The three axis vectors arrive in an arbitrary (but known-finite)
/// permutation of the world axes; the bounds calculator normalizes them.
/// All measurements are centimeters.
#[derive(Debug, Clone)]
pub struct OrientedBounds {
    /// Box center in centimeters
    pub center: Vec3,
    /// The three box axes, unit-aligned with some permutation of X/Y/Z
    pub axes: [Vec3; 3],
    /// Half-width along each of `axes`, in centimeters
    pub half_width: Vec3,
}

/// Raw vertex/triangle data of a visual, used for collider generation.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions in meters, object space
    pub positions: Vec<Vec3>,
    /// Triangle vertex indices into `positions`
    pub triangles: Vec<[u32; 3]>,
}

/// Data returned by the geometry source for one visual asset.
#[derive(Debug, Clone)]
pub enum VisualData {
    /// Plain mesh: axis-aligned box in centimeters, plus raw geometry
    Mesh {
        /// Axis-aligned bounds in centimeters
        bounds_cm: Aabb,
        /// Raw geometry in meters, when available
        mesh: Option<MeshData>,
    },
    /// Multi-resolution mesh: oriented box, plus raw geometry
    MultiResolutionMesh {
        /// Oriented bounds in centimeters
        bounds: OrientedBounds,
        /// Raw geometry in meters, when available
        mesh: Option<MeshData>,
    },
    /// Model: oriented boxes of every sub-mesh and every attachment
    Model {
        /// Sub-mesh bounds in centimeters
        sub_meshes: Vec<OrientedBounds>,
        /// Attachment bounds in centimeters
        attachments: Vec<OrientedBounds>,
    },
    /// Morph mesh: oriented box of the underlying mesh
    MorphMesh {
        /// Oriented bounds in centimeters
        bounds: OrientedBounds,
        /// Raw geometry in meters, when available
        mesh: Option<MeshData>,
    },
}
