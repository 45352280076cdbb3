//! Pipeline orchestration
//!
//! One call runs the full pre-caching pass for a world: light collection,
//! chunk partitioning, visual bounds, and item colliders, in that order.
//! The pass is sequential and synchronous; per-item failures degrade to a
//! logged skip, and the only way the pass ends early is the caller
//! cancelling through the progress sink.

use crate::assets::GeometrySource;
use crate::config::CacheConfig;
use crate::precache::artifact::WorldCacheArtifact;
use crate::precache::bounds::cached_visual_bounds;
use crate::precache::chunks::partition_world;
use crate::precache::colliders::generate_colliders;
use crate::precache::context::CacheContext;
use crate::precache::lights::collect_lights;
use crate::precache::progress::{ProgressEvent, ProgressSink, ProgressStage};
use crate::world::{BspTree, GameVersion, VisualData, VobKind, VobNode, WorldMesh};

/// Pipeline errors. Per-item data problems never surface here; they
/// degrade to sentinel values or skips per the error taxonomy.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The progress sink requested cancellation between granular steps
    #[error("pre-caching run cancelled by the progress callback")]
    Cancelled,
}

/// Everything the pipeline needs to know about one world.
#[derive(Debug, Default)]
pub struct WorldData {
    /// Static world geometry
    pub mesh: WorldMesh,
    /// BSP tree over the world mesh
    pub bsp: BspTree,
    /// Root VOB list of the world's scene graph
    pub root_vobs: Vec<VobNode>,
    /// Which game's asset set this world belongs to
    pub version: GameVersion,
}

/// Run the full pre-caching pipeline for one world.
///
/// Stages run in a fixed order because the later ones consume the earlier
/// ones' output: light bounds feed the partitioner, cached visual bounds
/// feed collider generation. All per-run state lives in a fresh
/// [`CacheContext`], so consecutive worlds cannot contaminate each other.
pub fn run_world_cache(
    world: &WorldData,
    source: &dyn GeometrySource,
    config: &CacheConfig,
    progress: &mut dyn ProgressSink,
) -> Result<WorldCacheArtifact, PipelineError> {
    let mut ctx = CacheContext::new();

    let collected = collect_lights(&world.root_vobs, source, world.version, progress)?;
    log::info!("Collected {} stationary lights", collected.lights.len());

    let chunks = partition_world(
        &world.mesh,
        &world.bsp,
        &collected.bounds,
        config,
        &mut ctx,
        progress,
    )?;

    cache_visuals(world, source, config, &mut ctx, progress)?;
    log::info!(
        "Cached bounds for {} visuals, colliders for {}",
        ctx.visual_bounds.len(),
        ctx.colliders.len()
    );

    Ok(WorldCacheArtifact {
        chunks,
        lights: collected.lights,
        visual_bounds: ctx.visual_bounds,
        colliders: ctx.colliders,
    })
}

/// Bounds for every visual-bearing VOB, plus colliders for items.
///
/// Collider generation is best-effort: a visual without mesh data or
/// without cached bounds is silently left without colliders.
fn cache_visuals(
    world: &WorldData,
    source: &dyn GeometrySource,
    config: &CacheConfig,
    ctx: &mut CacheContext,
    progress: &mut dyn ProgressSink,
) -> Result<(), PipelineError> {
    let mut visited = 0usize;
    let mut stack: Vec<&VobNode> = world.root_vobs.iter().rev().collect();

    while let Some(node) = stack.pop() {
        for child in node.children.iter().rev() {
            stack.push(child);
        }
        let VobKind::Generic {
            visual: Some(visual),
        } = &node.kind
        else {
            continue;
        };

        if !progress.step(ProgressEvent {
            stage: ProgressStage::VisualBounds,
            item: visited,
        }) {
            return Err(PipelineError::Cancelled);
        }
        visited += 1;

        let Some(bounds) = cached_visual_bounds(ctx, source, visual.visual_type, &visual.name)
        else {
            log::debug!("No visual data for '{}', skipped", visual.name);
            continue;
        };

        if !visual.is_item || ctx.colliders.contains_key(&visual.name) {
            continue;
        }
        let Some(mesh) = source
            .load_visual(visual.visual_type, &visual.name)
            .and_then(|data| match data {
                VisualData::Mesh { mesh, .. }
                | VisualData::MultiResolutionMesh { mesh, .. }
                | VisualData::MorphMesh { mesh, .. } => mesh,
                VisualData::Model { .. } => None,
            })
        else {
            continue;
        };
        let primitives = generate_colliders(&mesh, &bounds, &config.collider);
        if !primitives.is_empty() {
            ctx.colliders.insert(visual.name.clone(), primitives);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::InMemoryGeometrySource;
    use crate::foundation::math::{Aabb, Vec3};
    use crate::precache::progress::test_support::CountingSink;
    use crate::precache::progress::NullProgress;
    use crate::world::{
        BspNode, LightKind, MaterialGroup, OrientedBounds, Polygon, TextureFormat, VisualType,
        VobLight, VobVisual, WorldMaterial,
    };
    use crate::world::MeshData;

    fn demo_world() -> (WorldData, InMemoryGeometrySource) {
        let mut world = WorldData::default();

        // Two leaves of opaque geometry, two polygons each.
        world.mesh.materials.push(WorldMaterial {
            texture: "STONE.TGA".into(),
            group: MaterialGroup::Stone,
            texture_format: TextureFormat::Dxt1,
        });
        for leaf in 0..2u32 {
            for _ in 0..2 {
                let id = world.mesh.polygons.len() as u32;
                world.mesh.polygons.push(Polygon {
                    material_index: 0,
                    position_indices: vec![0, 1, 2],
                    is_portal: false,
                });
                world.bsp.polygon_indices.push(id);
            }
            let x = leaf as f32 * 10.0;
            world.bsp.nodes.push(BspNode {
                bounds: Aabb::new(Vec3::new(x, 0.0, 0.0), Vec3::new(x + 1.0, 1.0, 1.0)),
                polygon_index: (leaf * 2) as usize,
                polygon_count: 2,
            });
            world.bsp.leaf_indices.push(leaf as usize);
        }

        // One light over the first leaf, one item VOB with mesh data.
        world.root_vobs.push(VobNode {
            kind: VobKind::Light(VobLight {
                kind: LightKind::Point,
                range_cm: 200.0,
                color: [255, 255, 255, 255],
                is_static: false,
            }),
            local_position: Vec3::new(0.5, 0.5, 0.5),
            children: Vec::new(),
        });
        world.root_vobs.push(VobNode {
            kind: VobKind::Generic {
                visual: Some(VobVisual {
                    name: "ITMW_SWORD".into(),
                    visual_type: VisualType::MultiResolutionMesh,
                    is_item: true,
                }),
            },
            local_position: Vec3::zeros(),
            children: Vec::new(),
        });

        let mut source = InMemoryGeometrySource::new();
        source.insert_visual(
            VisualType::MultiResolutionMesh,
            "ITMW_SWORD",
            VisualData::MultiResolutionMesh {
                bounds: OrientedBounds {
                    center: Vec3::new(0.0, 100.0, 0.0),
                    axes: [
                        Vec3::new(1.0, 0.0, 0.0),
                        Vec3::new(0.0, 1.0, 0.0),
                        Vec3::new(0.0, 0.0, 1.0),
                    ],
                    half_width: Vec3::new(10.0, 100.0, 10.0),
                },
                mesh: Some(blade_mesh()),
            },
        );
        (world, source)
    }

    /// Thin vertical tube, 2 m tall and 0.2 m wide.
    fn blade_mesh() -> MeshData {
        let mut mesh = MeshData::default();
        for r in 0..11 {
            let y = 2.0 * r as f32 / 10.0;
            for k in 0..4 {
                let theta = std::f32::consts::TAU * k as f32 / 4.0;
                mesh.positions
                    .push(Vec3::new(0.1 * theta.cos(), y, 0.1 * theta.sin()));
            }
        }
        for r in 0..10u32 {
            for k in 0..4u32 {
                let a = r * 4 + k;
                let b = r * 4 + (k + 1) % 4;
                let c = (r + 1) * 4 + k;
                let d = (r + 1) * 4 + (k + 1) % 4;
                mesh.triangles.push([a, b, c]);
                mesh.triangles.push([b, d, c]);
            }
        }
        mesh
    }

    #[test]
    fn test_full_pipeline_produces_all_artifacts() {
        let (world, source) = demo_world();
        let artifact = run_world_cache(
            &world,
            &source,
            &CacheConfig::default(),
            &mut NullProgress,
        )
        .unwrap();

        assert_eq!(artifact.lights.len(), 1);
        assert_eq!(artifact.chunks.opaque.len(), 1);
        assert_eq!(artifact.chunks.opaque[0].polygon_ids.len(), 4);
        assert!(artifact.visual_bounds.contains_key("ITMW_SWORD"));
        let colliders = &artifact.colliders["ITMW_SWORD"];
        assert!(!colliders.is_empty());
    }

    #[test]
    fn test_missing_visual_is_skipped_silently() {
        let (mut world, _) = demo_world();
        // Swap in an empty source: no visuals resolvable at all.
        let source = InMemoryGeometrySource::new();
        world.root_vobs.push(VobNode {
            kind: VobKind::Generic {
                visual: Some(VobVisual {
                    name: "MISSING".into(),
                    visual_type: VisualType::Mesh,
                    is_item: false,
                }),
            },
            local_position: Vec3::zeros(),
            children: Vec::new(),
        });

        let artifact = run_world_cache(
            &world,
            &source,
            &CacheConfig::default(),
            &mut NullProgress,
        )
        .unwrap();
        assert!(artifact.visual_bounds.is_empty());
        assert!(artifact.colliders.is_empty());
        // The rest of the pipeline still ran.
        assert_eq!(artifact.lights.len(), 1);
    }

    #[test]
    fn test_empty_world_yields_empty_artifact() {
        let world = WorldData::default();
        let source = InMemoryGeometrySource::new();
        let artifact = run_world_cache(
            &world,
            &source,
            &CacheConfig::default(),
            &mut NullProgress,
        )
        .unwrap();
        assert_eq!(artifact.chunks.chunk_count(), 0);
        assert!(artifact.lights.is_empty());
        assert!(artifact.visual_bounds.is_empty());
        assert!(artifact.colliders.is_empty());
    }

    #[test]
    fn test_light_indices_stable_across_runs() {
        let (world, source) = demo_world();
        let config = CacheConfig::default();
        let a = run_world_cache(&world, &source, &config, &mut NullProgress).unwrap();
        let b = run_world_cache(&world, &source, &config, &mut NullProgress).unwrap();
        assert_eq!(a.lights, b.lights);
    }

    #[test]
    fn test_cancellation_surfaces_from_entry_point() {
        let (world, source) = demo_world();
        let mut sink = CountingSink::cancel_after(2);
        let result = run_world_cache(&world, &source, &CacheConfig::default(), &mut sink);
        assert!(matches!(result, Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_progress_covers_all_stages() {
        let (world, source) = demo_world();
        let mut sink = CountingSink::new();
        run_world_cache(&world, &source, &CacheConfig::default(), &mut sink).unwrap();

        let stages: Vec<ProgressStage> = sink.events.iter().map(|e| e.stage).collect();
        assert!(stages.contains(&ProgressStage::LightCollection));
        assert!(stages.contains(&ProgressStage::ChunkResolve));
        assert!(stages.contains(&ProgressStage::ChunkMerge));
        assert!(stages.contains(&ProgressStage::VisualBounds));
    }
}
