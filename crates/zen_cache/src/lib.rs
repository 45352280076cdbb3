//! # Zen Cache
//!
//! Static world pre-caching for Gothic 1/2 worlds.
//!
//! ## Features
//!
//! - **Chunk Partitioning**: Merges BSP leaves into render chunks bounded
//!   by distinct-light and polygon counts
//! - **Light Collection**: Flattens the VOB tree (including embedded fire
//!   sub-worlds) into a stable list of stationary light descriptors
//! - **Visual Bounds**: Normalizes per-asset oriented bounding boxes to
//!   world-axis-aligned boxes in meters
//! - **Item Colliders**: Derives box/capsule primitives for elongated item
//!   meshes from a width profile along the longest axis
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zen_cache::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let world = WorldData::default();
//!     let source = InMemoryGeometrySource::new();
//!     let config = CacheConfig::default();
//!
//!     let artifact = run_world_cache(&world, &source, &config, &mut NullProgress)?;
//!     artifact.save_to_file("world_cache.ron")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod foundation;
pub mod precache;
pub mod world;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        assets::{GeometrySource, InMemoryGeometrySource},
        config::{CacheConfig, ColliderConfig, Config},
        foundation::math::{Aabb, Vec3},
        precache::{
            run_world_cache, ChunkSet, ColliderPrimitive, LightDescriptor, NullProgress,
            PipelineError, ProgressEvent, ProgressSink, ProgressStage, WorldCacheArtifact,
            WorldData,
        },
        world::{BspTree, GameVersion, VobNode, WorldMesh},
    };
}
