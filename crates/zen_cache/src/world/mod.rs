//! World data model
//!
//! Read-only source geometry for one game world: the static world mesh with
//! its BSP tree, and the VOB (world object) scene graph. These types are
//! produced by an asset loader and consumed by the pre-caching pipeline;
//! the pipeline never mutates them.

mod mesh;
mod vob;

pub use mesh::{
    BspNode, BspTree, MaterialGroup, Polygon, TextureFormat, WorldMaterial, WorldMesh,
};
pub use vob::{
    GameVersion, LightKind, MeshData, OrientedBounds, VisualData, VisualType, VobKind, VobLight,
    VobNode, VobVisual,
};
