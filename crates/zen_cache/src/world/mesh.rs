//! Static world mesh and BSP tree
//!
//! The world mesh is one large triangle soup partitioned by a BSP tree.
//! Leaf nodes reference polygons through a shared index table; several
//! leaves may reference the same polygon, which is why the partitioner
//! deduplicates via a used-polygon set.

use crate::foundation::math::Aabb;

/// Material group classification carried by the source assets.
///
/// Only `Water` is meaningful to the partitioner; everything else is
/// classified by texture format instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialGroup {
    /// Unclassified material
    Undefined,
    /// Metal surfaces
    Metal,
    /// Stone surfaces
    Stone,
    /// Wood surfaces
    Wood,
    /// Earth/dirt surfaces
    Earth,
    /// Water surfaces, rendered through the water bucket
    Water,
    /// Snow surfaces
    Snow,
}

/// Compressed texture format of a material's base texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// BC1 block compression, no meaningful alpha. Marks opaque geometry.
    Dxt1,
    /// BC2 block compression with explicit alpha
    Dxt3,
    /// BC3 block compression with interpolated alpha
    Dxt5,
    /// Uncompressed 32-bit RGBA
    Rgba8,
}

/// One world-mesh material.
#[derive(Debug, Clone)]
pub struct WorldMaterial {
    /// Base texture name (uppercase asset key)
    pub texture: String,
    /// Material group from the source asset
    pub group: MaterialGroup,
    /// Compressed format of the base texture
    pub texture_format: TextureFormat,
}

/// One world-mesh polygon.
#[derive(Debug, Clone)]
pub struct Polygon {
    /// Index into [`WorldMesh::materials`]
    pub material_index: usize,
    /// Indices into [`WorldMesh::positions`]
    pub position_indices: Vec<u32>,
    /// Portal polygons separate BSP sectors and are never rendered
    pub is_portal: bool,
}

/// One node of the BSP tree.
#[derive(Debug, Clone)]
pub struct BspNode {
    /// World-space bounds of this node
    pub bounds: Aabb,
    /// Start of this node's range in [`BspTree::polygon_indices`]
    pub polygon_index: usize,
    /// Number of entries in the range
    pub polygon_count: usize,
}

/// BSP tree over the world mesh.
#[derive(Debug, Clone, Default)]
pub struct BspTree {
    /// All nodes, inner and leaf
    pub nodes: Vec<BspNode>,
    /// Indices of the leaf nodes, in tree order
    pub leaf_indices: Vec<usize>,
    /// Shared polygon-id table referenced by node ranges
    pub polygon_indices: Vec<u32>,
}

impl BspTree {
    /// Resolve a leaf's polygon-id range, without any deduplication.
    ///
    /// Returns an empty slice for an out-of-range node index rather than
    /// panicking; a malformed tree degrades to missing geometry.
    pub fn leaf_polygon_ids(&self, node_index: usize) -> &[u32] {
        let Some(node) = self.nodes.get(node_index) else {
            return &[];
        };
        let start = node.polygon_index.min(self.polygon_indices.len());
        let end = (node.polygon_index + node.polygon_count).min(self.polygon_indices.len());
        &self.polygon_indices[start..end]
    }
}

/// Immutable source geometry for one world.
#[derive(Debug, Clone, Default)]
pub struct WorldMesh {
    /// Vertex positions, in meters
    pub positions: Vec<crate::foundation::math::Vec3>,
    /// All polygons, indexed by polygon id
    pub polygons: Vec<Polygon>,
    /// All materials
    pub materials: Vec<WorldMaterial>,
}

impl WorldMesh {
    /// Polygon by id, `None` when the id is out of range.
    pub fn polygon(&self, id: u32) -> Option<&Polygon> {
        self.polygons.get(id as usize)
    }

    /// Material of a polygon, `None` when either index is out of range.
    pub fn polygon_material(&self, id: u32) -> Option<&WorldMaterial> {
        self.polygon(id)
            .and_then(|p| self.materials.get(p.material_index))
    }
}
