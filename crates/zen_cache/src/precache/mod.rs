//! Static world pre-caching pipeline
//!
//! Batch preprocessing that runs once per world before anything is
//! rendered: it partitions the BSP tree into render chunks bounded by light
//! and polygon counts, collects stationary light descriptors from the VOB
//! tree, computes bounding boxes for every visual asset, and derives
//! box/capsule collider primitives for elongated item meshes.
//!
//! All four stages are pure functions over already-loaded data; per-item
//! failures degrade to a logged skip and never abort the batch.

mod artifact;
mod bounds;
mod chunks;
mod colliders;
mod context;
mod lights;
mod pipeline;
mod progress;

pub use artifact::{
    ArtifactError, ChunkSet, ColliderPrimitive, LightDescriptor, WorldCacheArtifact, WorldChunk,
};
pub use bounds::compute_visual_bounds;
pub use chunks::partition_world;
pub use colliders::generate_colliders;
pub use context::CacheContext;
pub use lights::{collect_lights, CollectedLights, CORRUPT_FIRE_SUB_WORLD_G1};
pub use pipeline::{run_world_cache, PipelineError, WorldData};
pub use progress::{NullProgress, ProgressEvent, ProgressSink, ProgressStage};
