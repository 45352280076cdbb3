//! Persisted cache artifact
//!
//! The shapes here are the pipeline's public output contract: the mesh
//! builder consumes chunk polygon-id lists, the renderer binds lights by
//! list position (ordering must stay stable per world), and the spawning
//! code looks up bounds and colliders by visual name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Aabb, Axis, Vec3};

/// One renderable chunk: an ordered list of world-mesh polygon ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldChunk {
    /// Polygon ids, in the order they were folded in
    pub polygon_ids: Vec<u32>,
}

/// Chunks grouped by render bucket. A polygon belongs to exactly one
/// bucket, decided by its material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkSet {
    /// Opaque geometry (DXT1 textures)
    pub opaque: Vec<WorldChunk>,
    /// Alpha-blended geometry
    pub transparent: Vec<WorldChunk>,
    /// Water surfaces
    pub water: Vec<WorldChunk>,
}

impl ChunkSet {
    /// Total number of emitted chunks across all buckets.
    pub fn chunk_count(&self) -> usize {
        self.opaque.len() + self.transparent.len() + self.water.len()
    }

    /// Iterate every chunk in every bucket.
    pub fn iter_all(&self) -> impl Iterator<Item = &WorldChunk> {
        self.opaque
            .iter()
            .chain(self.transparent.iter())
            .chain(self.water.iter())
    }
}

/// One stationary light, in world space and meters.
///
/// The list index of a descriptor doubles as the renderer's shader lookup
/// key, so collection order is part of the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightDescriptor {
    /// World-space position in meters
    pub position: Vec3,
    /// Range in meters
    pub range: f32,
    /// Linear-space RGBA color
    pub color: [f32; 4],
}

impl LightDescriptor {
    /// Bounding box used for chunk intersection tests: a cube of
    /// `2 × range` per axis centered on the light.
    pub fn bounds(&self) -> Aabb {
        let r = self.range * 2.0;
        Aabb::from_center_size(self.position, Vec3::new(r, r, r))
    }
}

/// Collision primitive approximating one segment of an item mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderPrimitive {
    /// Axis-aligned box in object space
    Box {
        /// Segment center
        center: Vec3,
        /// Full segment size
        size: Vec3,
    },
    /// Capsule aligned with the object's main axis
    Capsule {
        /// Segment center
        center: Vec3,
        /// Main axis of the object
        axis: Axis,
        /// Extent along the main axis
        height: f32,
        /// Half the maximum perpendicular width
        radius: f32,
    },
}

/// Everything one pre-caching run produces for a world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldCacheArtifact {
    /// Render chunks per bucket
    pub chunks: ChunkSet,
    /// Stationary lights, order-stable per world
    pub lights: Vec<LightDescriptor>,
    /// Visual name → bounds in meters
    pub visual_bounds: BTreeMap<String, Aabb>,
    /// Visual name → generated collider primitives
    pub colliders: BTreeMap<String, Vec<ColliderPrimitive>>,
}

/// Artifact persistence errors
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl WorldCacheArtifact {
    /// Write the artifact as pretty-printed RON.
    pub fn save_to_file(&self, path: &str) -> Result<(), ArtifactError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ArtifactError::Serialize(e.to_string()))?;
        std::fs::write(path, contents).map_err(ArtifactError::Io)
    }

    /// Load an artifact previously written by [`Self::save_to_file`].
    pub fn load_from_file(path: &str) -> Result<Self, ArtifactError> {
        let contents = std::fs::read_to_string(path).map_err(ArtifactError::Io)?;
        ron::from_str(&contents).map_err(|e| ArtifactError::Parse(e.to_string()))
    }
}
