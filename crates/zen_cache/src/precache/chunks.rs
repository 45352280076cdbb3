//! BSP-tree-to-render-chunk partitioning
//!
//! Merges BSP leaf nodes into render chunks so the renderer can bind a
//! bounded number of light uniforms per draw. Chunks are built per render
//! bucket (opaque/transparent/water) and close when folding the next leaf
//! would push the distinct-light count past the limit, or immediately when
//! a polygon crosses the polygon limit (a safety valve for worlds with too
//! few distinct light regions).
//!
//! Leaves are merged in BSP tree order on the assumption that tree order
//! approximates spatial adjacency. This is a heuristic carried over from
//! the original asset structure, not a proven property of the BSP.

use std::collections::HashSet;

use crate::config::CacheConfig;
use crate::foundation::math::Aabb;
use crate::precache::artifact::{ChunkSet, WorldChunk};
use crate::precache::context::CacheContext;
use crate::precache::pipeline::PipelineError;
use crate::precache::progress::{ProgressEvent, ProgressSink, ProgressStage};
use crate::world::{BspTree, MaterialGroup, TextureFormat, WorldMesh};

/// Render bucket a polygon is classified into. Mutually exclusive per
/// polygon: water by material group, opaque by DXT1 texture format,
/// transparent otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Opaque = 0,
    Transparent = 1,
    Water = 2,
}

/// Running state of one bucket's current chunk.
#[derive(Debug, Default)]
struct Accumulator {
    polygon_ids: Vec<u32>,
    /// Distinct lights whose bounds intersect any leaf folded in so far
    light_count: usize,
    /// Light indices already counted for the current chunk
    counted_lights: HashSet<usize>,
    /// Whether this bucket already received a polygon from the current leaf
    touched_this_leaf: bool,
}

impl Accumulator {
    fn reset(&mut self) -> WorldChunk {
        let chunk = WorldChunk {
            polygon_ids: std::mem::take(&mut self.polygon_ids),
        };
        self.light_count = 0;
        self.counted_lights.clear();
        self.touched_this_leaf = false;
        chunk
    }

    /// How many of the leaf's lights are not yet counted for this chunk.
    fn uncounted(&self, leaf_lights: &[usize]) -> usize {
        leaf_lights
            .iter()
            .filter(|l| !self.counted_lights.contains(l))
            .count()
    }
}

/// Partition the world mesh into render chunks.
///
/// Stage A resolves every leaf's polygon range, excluding portals and
/// polygons already claimed by an earlier leaf (via the run's used-polygon
/// set). Stage B folds the leaves into per-bucket chunks bounded by the
/// configured light and polygon limits. Progress is reported once per leaf
/// in each stage.
pub fn partition_world(
    mesh: &WorldMesh,
    bsp: &BspTree,
    light_bounds: &[Aabb],
    config: &CacheConfig,
    ctx: &mut CacheContext,
    progress: &mut dyn ProgressSink,
) -> Result<ChunkSet, PipelineError> {
    // Stage A: leaf polygon resolution with global deduplication.
    let mut leaf_polygons: Vec<Vec<u32>> = Vec::with_capacity(bsp.leaf_indices.len());
    for (i, &leaf_index) in bsp.leaf_indices.iter().enumerate() {
        if !progress.step(ProgressEvent {
            stage: ProgressStage::ChunkResolve,
            item: i,
        }) {
            return Err(PipelineError::Cancelled);
        }

        let mut resolved = Vec::new();
        for &polygon_id in bsp.leaf_polygon_ids(leaf_index) {
            let Some(polygon) = mesh.polygon(polygon_id) else {
                log::debug!("Leaf {leaf_index} references unknown polygon {polygon_id}");
                continue;
            };
            if polygon.is_portal {
                continue;
            }
            if ctx.used_polygon_ids.insert(polygon_id) {
                resolved.push(polygon_id);
            }
        }
        leaf_polygons.push(resolved);
    }

    // Stage B: sequential merge in BSP leaf order.
    let mut chunks = ChunkSet::default();
    let mut buckets = [
        Accumulator::default(),
        Accumulator::default(),
        Accumulator::default(),
    ];

    for (i, (&leaf_index, polygon_ids)) in
        bsp.leaf_indices.iter().zip(&leaf_polygons).enumerate()
    {
        if !progress.step(ProgressEvent {
            stage: ProgressStage::ChunkMerge,
            item: i,
        }) {
            return Err(PipelineError::Cancelled);
        }

        // Which lights touch this leaf, computed once per leaf.
        let leaf_lights: Vec<usize> = bsp.nodes.get(leaf_index).map_or_else(Vec::new, |node| {
            light_bounds
                .iter()
                .enumerate()
                .filter(|(_, lb)| lb.intersects(&node.bounds))
                .map(|(l, _)| l)
                .collect()
        });

        for acc in &mut buckets {
            acc.touched_this_leaf = false;
        }

        for &polygon_id in polygon_ids {
            let Some(material) = mesh.polygon_material(polygon_id) else {
                log::debug!("Polygon {polygon_id} has no material, skipped");
                continue;
            };
            let bucket = classify(material.group, material.texture_format);
            let acc = &mut buckets[bucket as usize];

            // The leaf's light delta is accounted the first time this
            // bucket sees a polygon from this leaf. Folding the leaf in
            // must never push the distinct-light count past the limit, so
            // the chunk closes *before* the leaf when it would.
            if !acc.touched_this_leaf {
                let delta = acc.uncounted(&leaf_lights);
                if acc.light_count + delta > config.max_lights_per_chunk
                    && !acc.polygon_ids.is_empty()
                {
                    emit(&mut chunks, bucket, acc.reset());
                }
                let mut added = 0;
                for light in leaf_lights.iter().copied() {
                    if acc.counted_lights.insert(light) {
                        added += 1;
                    }
                }
                acc.light_count += added;
                acc.touched_this_leaf = true;
            }

            acc.polygon_ids.push(polygon_id);

            // Safety valve: a chunk may exceed the polygon limit only by
            // the single polygon that crossed it.
            if acc.polygon_ids.len() > config.max_polygons_per_chunk {
                log::info!(
                    "Chunk reached {} polygons (limit {}), closing",
                    acc.polygon_ids.len(),
                    config.max_polygons_per_chunk
                );
                emit(&mut chunks, bucket, acc.reset());
            }
        }
    }

    // Flush pending chunks.
    for bucket in [Bucket::Opaque, Bucket::Transparent, Bucket::Water] {
        let acc = &mut buckets[bucket as usize];
        if !acc.polygon_ids.is_empty() {
            emit(&mut chunks, bucket, acc.reset());
        }
    }

    log::info!(
        "Partitioned {} leaves into {} chunks ({} opaque, {} transparent, {} water)",
        bsp.leaf_indices.len(),
        chunks.chunk_count(),
        chunks.opaque.len(),
        chunks.transparent.len(),
        chunks.water.len()
    );

    Ok(chunks)
}

fn classify(group: MaterialGroup, format: TextureFormat) -> Bucket {
    if group == MaterialGroup::Water {
        Bucket::Water
    } else if format == TextureFormat::Dxt1 {
        Bucket::Opaque
    } else {
        Bucket::Transparent
    }
}

fn emit(chunks: &mut ChunkSet, bucket: Bucket, chunk: WorldChunk) {
    match bucket {
        Bucket::Opaque => chunks.opaque.push(chunk),
        Bucket::Transparent => chunks.transparent.push(chunk),
        Bucket::Water => chunks.water.push(chunk),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::precache::progress::test_support::CountingSink;
    use crate::precache::progress::NullProgress;
    use crate::world::{BspNode, Polygon, WorldMaterial};
    use std::collections::HashSet;

    /// Builds a world where leaf `i` owns `polys_per_leaf` fresh polygons
    /// and sits at x ∈ [2i − 0.5, 2i + 0.5].
    struct WorldBuilder {
        mesh: WorldMesh,
        bsp: BspTree,
        polys_per_leaf: usize,
    }

    impl WorldBuilder {
        fn new(polys_per_leaf: usize) -> Self {
            let mut mesh = WorldMesh::default();
            mesh.materials.push(WorldMaterial {
                texture: "ROCK.TGA".into(),
                group: MaterialGroup::Stone,
                texture_format: TextureFormat::Dxt1,
            });
            Self {
                mesh,
                bsp: BspTree::default(),
                polys_per_leaf,
            }
        }

        fn add_material(&mut self, group: MaterialGroup, format: TextureFormat) -> usize {
            self.mesh.materials.push(WorldMaterial {
                texture: "T.TGA".into(),
                group,
                texture_format: format,
            });
            self.mesh.materials.len() - 1
        }

        fn add_leaf(&mut self) {
            self.add_leaf_with(self.polys_per_leaf, 0, false);
        }

        fn add_leaf_with(&mut self, polys: usize, material_index: usize, portal: bool) {
            let x = 2.0 * self.bsp.leaf_indices.len() as f32;
            let start = self.bsp.polygon_indices.len();
            for _ in 0..polys {
                let id = self.mesh.polygons.len() as u32;
                self.mesh.polygons.push(Polygon {
                    material_index,
                    position_indices: vec![0, 1, 2],
                    is_portal: portal,
                });
                self.bsp.polygon_indices.push(id);
            }
            self.bsp.nodes.push(BspNode {
                bounds: Aabb::new(
                    Vec3::new(x - 0.5, -0.5, -0.5),
                    Vec3::new(x + 0.5, 0.5, 0.5),
                ),
                polygon_index: start,
                polygon_count: polys,
            });
            self.bsp.leaf_indices.push(self.bsp.nodes.len() - 1);
        }

        /// Re-reference an existing polygon id from a new leaf.
        fn add_leaf_sharing(&mut self, polygon_id: u32) {
            let x = 2.0 * self.bsp.leaf_indices.len() as f32;
            let start = self.bsp.polygon_indices.len();
            self.bsp.polygon_indices.push(polygon_id);
            self.bsp.nodes.push(BspNode {
                bounds: Aabb::new(
                    Vec3::new(x - 0.5, -0.5, -0.5),
                    Vec3::new(x + 0.5, 0.5, 0.5),
                ),
                polygon_index: start,
                polygon_count: 1,
            });
            self.bsp.leaf_indices.push(self.bsp.nodes.len() - 1);
        }
    }

    fn light_at(x: f32, range: f32) -> Aabb {
        Aabb::from_center_size(
            Vec3::new(x, 0.0, 0.0),
            Vec3::new(range * 2.0, range * 2.0, range * 2.0),
        )
    }

    fn all_polygon_ids(chunks: &ChunkSet) -> Vec<u32> {
        chunks
            .iter_all()
            .flat_map(|c| c.polygon_ids.iter().copied())
            .collect()
    }

    #[test]
    fn test_two_lights_two_chunks_end_to_end() {
        // Ten leaves, two non-overlapping lights (500 cm and 300 cm
        // ranges), one light per chunk allowed: exactly two opaque chunks,
        // together covering the full deduplicated polygon set.
        let mut builder = WorldBuilder::new(2);
        for _ in 0..10 {
            builder.add_leaf();
        }
        // Leaves 0..=4 fall inside the first light, 6..=9 inside the second.
        let lights = vec![light_at(4.0, 5.0), light_at(15.0, 3.0)];

        let config = CacheConfig {
            max_lights_per_chunk: 1,
            ..CacheConfig::default()
        };
        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &lights,
            &config,
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();

        assert_eq!(chunks.opaque.len(), 2);
        assert!(chunks.transparent.is_empty());
        assert!(chunks.water.is_empty());

        let ids = all_polygon_ids(&chunks);
        assert_eq!(ids.len(), 20);
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(unique.len(), 20);

        // Each chunk is touched by exactly one of the two lights.
        for (chunk, light) in chunks.opaque.iter().zip(&lights) {
            for &id in &chunk.polygon_ids {
                let leaf = (id / 2) as usize;
                let bounds = &builder.bsp.nodes[leaf].bounds;
                let touching = lights.iter().filter(|lb| lb.intersects(bounds)).count();
                assert!(touching <= 1);
                if touching == 1 {
                    assert!(light.intersects(bounds));
                }
            }
        }
    }

    #[test]
    fn test_no_polygon_duplication_across_shared_leaves() {
        let mut builder = WorldBuilder::new(3);
        builder.add_leaf();
        builder.add_leaf();
        // Third leaf re-references polygon 0 of the first leaf.
        builder.add_leaf_sharing(0);

        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &CacheConfig::default(),
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();

        let ids = all_polygon_ids(&chunks);
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(unique.len(), 6);
    }

    #[test]
    fn test_portals_are_excluded() {
        let mut builder = WorldBuilder::new(2);
        builder.add_leaf();
        builder.add_leaf_with(4, 0, true);

        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &CacheConfig::default(),
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();

        assert_eq!(all_polygon_ids(&chunks).len(), 2);
    }

    #[test]
    fn test_buckets_are_mutually_exclusive() {
        let mut builder = WorldBuilder::new(1);
        let water = builder.add_material(MaterialGroup::Water, TextureFormat::Dxt1);
        let alpha = builder.add_material(MaterialGroup::Stone, TextureFormat::Dxt5);
        builder.add_leaf_with(2, 0, false); // opaque
        builder.add_leaf_with(2, water, false); // water despite DXT1
        builder.add_leaf_with(2, alpha, false); // transparent

        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &CacheConfig::default(),
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();

        assert_eq!(chunks.opaque.len(), 1);
        assert_eq!(chunks.water.len(), 1);
        assert_eq!(chunks.transparent.len(), 1);
        let opaque: HashSet<u32> = chunks.opaque[0].polygon_ids.iter().copied().collect();
        let water_ids: HashSet<u32> = chunks.water[0].polygon_ids.iter().copied().collect();
        assert!(opaque.is_disjoint(&water_ids));
    }

    #[test]
    fn test_polygon_limit_closes_after_crossing_polygon() {
        let mut builder = WorldBuilder::new(10);
        builder.add_leaf();

        let config = CacheConfig {
            max_polygons_per_chunk: 4,
            ..CacheConfig::default()
        };
        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &config,
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();

        // Closed at 5 polygons (limit + the triggering one), twice.
        assert_eq!(chunks.opaque.len(), 2);
        assert_eq!(chunks.opaque[0].polygon_ids.len(), 5);
        assert_eq!(chunks.opaque[1].polygon_ids.len(), 5);
    }

    #[test]
    fn test_light_counting_is_set_union() {
        // Three leaves under overlapping lights {0,1}, {1,2}, {2}: the
        // distinct count is 3, so a limit of 3 yields a single chunk.
        let mut builder = WorldBuilder::new(1);
        for _ in 0..3 {
            builder.add_leaf();
        }
        // Leaf centers are x = 0, 2, 4.
        let lights = vec![light_at(0.0, 1.0), light_at(1.0, 2.0), light_at(4.0, 2.0)];

        let config = CacheConfig {
            max_lights_per_chunk: 3,
            ..CacheConfig::default()
        };
        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &lights,
            &config,
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();
        assert_eq!(chunks.opaque.len(), 1);
        assert_eq!(chunks.opaque[0].polygon_ids.len(), 3);
    }

    #[test]
    fn test_empty_world_emits_nothing() {
        let builder = WorldBuilder::new(1);
        let mut ctx = CacheContext::new();
        let chunks = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &CacheConfig::default(),
            &mut ctx,
            &mut NullProgress,
        )
        .unwrap();
        assert_eq!(chunks.chunk_count(), 0);
    }

    #[test]
    fn test_cancellation_between_leaves() {
        let mut builder = WorldBuilder::new(1);
        for _ in 0..5 {
            builder.add_leaf();
        }
        let mut ctx = CacheContext::new();
        let mut sink = CountingSink::cancel_after(3);
        let result = partition_world(
            &builder.mesh,
            &builder.bsp,
            &[],
            &CacheConfig::default(),
            &mut ctx,
            &mut sink,
        );
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }
}
