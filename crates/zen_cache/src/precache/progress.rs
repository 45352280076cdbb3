//! Progress reporting and cooperative cancellation
//!
//! The pipeline is one long synchronous pass. Hosts that need to stay
//! responsive get a callback at per-item granularity (per VOB, per BSP
//! leaf, per top-level visual); returning `false` requests cancellation
//! between those granular steps. Nothing mutates pipeline state during a
//! callback, so the hook introduces no reordering.

/// Which stage of the pipeline is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Light collection, one step per visited VOB
    LightCollection,
    /// Chunk partitioning stage A, one step per resolved BSP leaf
    ChunkResolve,
    /// Chunk partitioning stage B, one step per merged BSP leaf
    ChunkMerge,
    /// Bounds/collider pass, one step per top-level visual-bearing VOB
    VisualBounds,
}

/// One granular progress step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Reporting stage
    pub stage: ProgressStage,
    /// Zero-based item index within the stage
    pub item: usize,
}

/// Receiver for progress steps.
pub trait ProgressSink {
    /// Called once per granular item. Return `false` to cancel the run
    /// before the next item is processed.
    fn step(&mut self, event: ProgressEvent) -> bool;
}

/// Default sink: no reporting, never cancels.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn step(&mut self, _event: ProgressEvent) -> bool {
        true
    }
}
