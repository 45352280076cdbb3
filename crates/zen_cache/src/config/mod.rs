//! Configuration system

pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Tunables for collider generation from item meshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColliderConfig {
    /// Relative width change between adjacent samples that starts a new
    /// segment; also scales the local-maximum trigger (`2 × threshold`)
    pub width_threshold: f32,

    /// Nominal minimum points per emitted segment. The effective bound is
    /// `min_vertices_per_segment / 3` with integer division, matching the
    /// tuned behavior of the original collider heuristics
    pub min_vertices_per_segment: usize,

    /// Number of width-profile slices along the main axis
    pub samples: usize,

    /// Minimum boundary spacing as a fraction of total length; closer
    /// boundaries are merged keep-first
    pub segment_distance: f32,
}

impl Default for ColliderConfig {
    fn default() -> Self {
        Self {
            width_threshold: 0.4,
            min_vertices_per_segment: 3,
            samples: 50,
            segment_distance: 0.05,
        }
    }
}

/// Tunables for one world pre-caching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum distinct lights touching one render chunk before it closes
    pub max_lights_per_chunk: usize,

    /// Safety valve for worlds with too few distinct light regions: a chunk
    /// also closes once its polygon count crosses this limit
    pub max_polygons_per_chunk: usize,

    /// Collider-generation tunables
    pub collider: ColliderConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_lights_per_chunk: 16,
            max_polygons_per_chunk: 10_000,
            collider: ColliderConfig::default(),
        }
    }
}

impl Config for CacheConfig {}
