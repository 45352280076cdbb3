//! World pre-cache demo
//!
//! Builds a small synthetic world (a strip of BSP leaves, a couple of
//! lights, one item prop), runs the full pre-caching pipeline over it and
//! writes the resulting artifact to `world_cache.ron`. Pass a `.toml` or
//! `.ron` config path as the first argument to override the defaults.

use zen_cache::prelude::*;
use zen_cache::world::{
    BspNode, LightKind, MaterialGroup, MeshData, OrientedBounds, Polygon, TextureFormat,
    VisualData, VisualType, VobKind, VobLight, VobVisual, WorldMaterial,
};

/// Console sink: logs one line per stage change, never cancels.
struct LogProgress {
    current: Option<ProgressStage>,
}

impl ProgressSink for LogProgress {
    fn step(&mut self, event: ProgressEvent) -> bool {
        if self.current != Some(event.stage) {
            log::info!("Stage: {:?}", event.stage);
            self.current = Some(event.stage);
        }
        true
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("World pre-cache demo starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading config from {path}");
            CacheConfig::load_from_file(&path)?
        }
        None => CacheConfig::default(),
    };

    let (world, source) = build_demo_world();
    log::info!(
        "Demo world: {} polygons, {} BSP leaves, {} root VOBs",
        world.mesh.polygons.len(),
        world.bsp.leaf_indices.len(),
        world.root_vobs.len()
    );

    let mut progress = LogProgress { current: None };
    let artifact = run_world_cache(&world, &source, &config, &mut progress)?;

    log::info!(
        "Cached {} chunks ({} opaque, {} transparent, {} water), {} lights, \
         {} visual bounds, {} collider sets",
        artifact.chunks.chunk_count(),
        artifact.chunks.opaque.len(),
        artifact.chunks.transparent.len(),
        artifact.chunks.water.len(),
        artifact.lights.len(),
        artifact.visual_bounds.len(),
        artifact.colliders.len()
    );

    artifact.save_to_file("world_cache.ron")?;
    log::info!("Artifact written to world_cache.ron");
    Ok(())
}

/// A strip of eight stone leaves with two lights over opposite ends, plus
/// one sword-shaped item so the collider path has something to chew on.
fn build_demo_world() -> (WorldData, InMemoryGeometrySource) {
    let mut world = WorldData {
        version: GameVersion::Gothic2,
        ..WorldData::default()
    };

    world.mesh.materials.push(WorldMaterial {
        texture: "STONE_FLOOR.TGA".into(),
        group: MaterialGroup::Stone,
        texture_format: TextureFormat::Dxt1,
    });

    for leaf in 0..8u32 {
        let start = world.bsp.polygon_indices.len();
        for _ in 0..4 {
            let id = world.mesh.polygons.len() as u32;
            world.mesh.polygons.push(Polygon {
                material_index: 0,
                position_indices: vec![0, 1, 2],
                is_portal: false,
            });
            world.bsp.polygon_indices.push(id);
        }
        let x = leaf as f32 * 4.0;
        world.bsp.nodes.push(BspNode {
            bounds: Aabb::new(
                Vec3::new(x - 2.0, 0.0, -2.0),
                Vec3::new(x + 2.0, 4.0, 2.0),
            ),
            polygon_index: start,
            polygon_count: 4,
        });
        world.bsp.leaf_indices.push(leaf as usize);
    }

    for (x, color) in [(0.0_f32, [255, 200, 120, 255]), (28.0, [120, 160, 255, 255])] {
        world.root_vobs.push(VobNode {
            kind: VobKind::Light(VobLight {
                kind: LightKind::Point,
                range_cm: 600.0,
                color,
                is_static: false,
            }),
            local_position: Vec3::new(x, 2.0, 0.0),
            children: Vec::new(),
        });
    }

    world.root_vobs.push(VobNode {
        kind: VobKind::Generic {
            visual: Some(VobVisual {
                name: "ITMW_1H_SWORD_01".into(),
                visual_type: VisualType::MultiResolutionMesh,
                is_item: true,
            }),
        },
        local_position: Vec3::new(14.0, 1.0, 0.0),
        children: Vec::new(),
    });

    let mut source = InMemoryGeometrySource::new();
    source.insert_visual(
        VisualType::MultiResolutionMesh,
        "ITMW_1H_SWORD_01",
        VisualData::MultiResolutionMesh {
            bounds: OrientedBounds {
                center: Vec3::new(0.0, 60.0, 0.0),
                axes: [
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(0.0, 0.0, 1.0),
                ],
                half_width: Vec3::new(8.0, 60.0, 8.0),
            },
            mesh: Some(sword_mesh()),
        },
    );

    (world, source)
}

/// Thin octagonal tube along Y, 1.2 m tall with a wider grip at the base.
fn sword_mesh() -> MeshData {
    let mut mesh = MeshData::default();
    let rings: Vec<(f32, f32)> = (0..=12)
        .map(|r| {
            let y = 1.2 * r as f32 / 12.0;
            let radius = if y < 0.3 { 0.08 } else { 0.03 };
            (y, radius)
        })
        .collect();

    for &(y, radius) in &rings {
        for k in 0..8 {
            let theta = std::f32::consts::TAU * k as f32 / 8.0;
            mesh.positions
                .push(Vec3::new(radius * theta.cos(), y, radius * theta.sin()));
        }
    }
    for r in 0..12u32 {
        for k in 0..8u32 {
            let a = r * 8 + k;
            let b = r * 8 + (k + 1) % 8;
            let c = (r + 1) * 8 + k;
            let d = (r + 1) * 8 + (k + 1) % 8;
            mesh.triangles.push([a, b, c]);
            mesh.triangles.push([b, d, c]);
        }
    }
    mesh
}
