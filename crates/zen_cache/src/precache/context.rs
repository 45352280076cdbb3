//! Per-run pipeline state
//!
//! Everything the stages share (the used-polygon set and the caches keyed
//! by visual name) is owned by one [`CacheContext`] scoped to a single
//! world run. Processing several worlds in sequence uses a fresh context
//! each time, so runs cannot contaminate each other.

use std::collections::{BTreeMap, HashSet};

use crate::foundation::math::Aabb;
use crate::precache::artifact::ColliderPrimitive;

/// Mutable state shared across the stages of one pre-caching run.
///
/// Single-writer by construction: the pipeline is a sequential pass, so no
/// locking is needed. A parallel split of the leaf/VOB iteration space
/// would have to synchronize `used_polygon_ids` and `visual_bounds`.
#[derive(Debug, Default)]
pub struct CacheContext {
    /// Polygon ids already claimed by an emitted or pending chunk.
    /// Multiple BSP leaves can reference the same polygon; this set
    /// guarantees each is drawn at most once.
    pub used_polygon_ids: HashSet<u32>,

    /// Bounds per visual name, populated once per unique name.
    /// Recomputing a name yields the same box, so hits are pure lookups.
    pub visual_bounds: BTreeMap<String, Aabb>,

    /// Generated collider primitives per visual name.
    pub colliders: BTreeMap<String, Vec<ColliderPrimitive>>,
}

impl CacheContext {
    /// Fresh context for one world run.
    pub fn new() -> Self {
        Self::default()
    }
}
