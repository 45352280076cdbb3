//! Asset access layer
//!
//! The pipeline never parses game archives itself; it consumes visuals and
//! embedded sub-worlds through the narrow [`GeometrySource`] contract.

mod geometry_source;

pub use geometry_source::{GeometrySource, InMemoryGeometrySource};
