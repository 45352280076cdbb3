//! Math utilities and types
//!
//! Provides fundamental math types for the world pre-caching pipeline.
//! All pipeline-facing measurements are in meters; the source asset format
//! stores centimeters, so conversion happens at the boundary (see
//! [`CM_TO_M`]).

use serde::{Deserialize, Serialize};

pub use nalgebra::{Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Scale factor from source-asset centimeters to pipeline meters.
pub const CM_TO_M: f32 = 1.0 / 100.0;

/// The three world axes, in tie-break priority order (X > Y > Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// World X axis
    X,
    /// World Y axis
    Y,
    /// World Z axis
    Z,
}

impl Axis {
    /// Unit vector for this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::new(1.0, 0.0, 0.0),
            Self::Y => Vec3::new(0.0, 1.0, 0.0),
            Self::Z => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Component of `v` along this axis.
    pub fn component(self, v: &Vec3) -> f32 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }

    /// The two axes perpendicular to this one.
    pub fn perpendicular(self) -> [Self; 2] {
        match self {
            Self::X => [Self::Y, Self::Z],
            Self::Y => [Self::X, Self::Z],
            Self::Z => [Self::X, Self::Y],
        }
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given full size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        let extents = size * 0.5;
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Zero-sized sentinel box at the origin
    pub fn zero() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the extents (half-size) of the AABB
    pub fn extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size of the AABB
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Grow this AABB to enclose another
    pub fn encapsulate(&mut self, other: &Self) {
        self.min = Vec3::new(
            self.min.x.min(other.min.x),
            self.min.y.min(other.min.y),
            self.min.z.min(other.min.z),
        );
        self.max = Vec3::new(
            self.max.x.max(other.max.x),
            self.max.y.max(other.max.y),
            self.max.z.max(other.max.z),
        );
    }

    /// Smallest AABB enclosing every point, or a zero box for an empty set
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::zero();
        };
        let mut min = *first;
        let mut max = *first;
        for p in &points[1..] {
            min = Vec3::new(min.x.min(p.x), min.y.min(p.y), min.z.min(p.z));
            max = Vec3::new(max.x.max(p.x), max.y.max(p.y), max.z.max(p.z));
        }
        Self { min, max }
    }

    /// Scale both corners uniformly (used for centimeter → meter conversion)
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Longest axis of the box, ties broken X > Y > Z
    pub fn longest_axis(&self) -> Axis {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            Axis::X
        } else if size.y >= size.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }
}

/// sRGB 8-bit channel to linear-space float, standard piecewise transfer curve
pub fn srgb_to_linear(channel: u8) -> f32 {
    let c = f32::from(channel) / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
