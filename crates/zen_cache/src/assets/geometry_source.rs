//! Geometry source contract
//!
//! Abstracts the asset loader behind the two lookups the caching pipeline
//! actually needs. Absence of an asset is an expected condition and is
//! reported as `None`, never as an error.

use std::collections::HashMap;

use crate::world::{GameVersion, VisualData, VisualType, VobNode};

/// Read-only provider of visual and sub-world data.
pub trait GeometrySource {
    /// Load bounds/geometry data for a named visual asset.
    ///
    /// Returns `None` when no asset of that name and type exists.
    fn load_visual(&self, visual_type: VisualType, name: &str) -> Option<VisualData>;

    /// Load the root VOB list of an embedded sub-world.
    ///
    /// Returns `None` when the sub-world cannot be resolved for the given
    /// game version.
    fn load_sub_world(&self, name: &str, version: GameVersion) -> Option<Vec<VobNode>>;
}

/// HashMap-backed geometry source for tests and demo scenes.
#[derive(Default)]
pub struct InMemoryGeometrySource {
    visuals: HashMap<(VisualType, String), VisualData>,
    sub_worlds: HashMap<String, Vec<VobNode>>,
}

impl InMemoryGeometrySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a visual asset under a name.
    pub fn insert_visual(&mut self, visual_type: VisualType, name: &str, data: VisualData) {
        self.visuals.insert((visual_type, name.to_string()), data);
    }

    /// Register a sub-world's root VOB list under a name.
    pub fn insert_sub_world(&mut self, name: &str, roots: Vec<VobNode>) {
        self.sub_worlds.insert(name.to_string(), roots);
    }
}

impl GeometrySource for InMemoryGeometrySource {
    fn load_visual(&self, visual_type: VisualType, name: &str) -> Option<VisualData> {
        self.visuals.get(&(visual_type, name.to_string())).cloned()
    }

    fn load_sub_world(&self, name: &str, _version: GameVersion) -> Option<Vec<VobNode>> {
        self.sub_worlds.get(name).cloned()
    }
}
