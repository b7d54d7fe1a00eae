//! Math utilities and types
//!
//! 2D types on top of nalgebra. Rotations are stored in degrees, matching
//! how scene templates author them.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix3, Vector2};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 2D point type
pub type Point2 = nalgebra::Point2<f32>;

/// 3x3 homogeneous matrix type for 2D transforms
pub type Mat3 = Matrix3<f32>;

/// Transform representing position, rotation, and scale in the plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform2D {
    /// Position relative to the parent
    pub position: Vec2,

    /// Rotation in degrees, counter-clockwise
    pub rotation: f32,

    /// Scale factors
    pub scale: Vec2,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl Transform2D {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder-style rotation setter (degrees)
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Builder-style scale setter
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a homogeneous matrix: translation * rotation * scale
    pub fn to_matrix(&self) -> Mat3 {
        Mat3::new_translation(&self.position)
            * Mat3::new_rotation(self.rotation.to_radians())
            * Mat3::new_nonuniform_scaling(&self.scale)
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point2) -> Point2 {
        self.to_matrix().transform_point(&point)
    }

    /// Move by a delta
    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }
}

/// Largest axis scale encoded in a 2D homogeneous matrix
///
/// Used to scale radii, which stay circular under non-uniform scale.
pub fn max_axis_scale(matrix: &Mat3) -> f32 {
    let sx = matrix.transform_vector(&Vec2::x()).norm();
    let sy = matrix.transform_vector(&Vec2::y()).norm();
    sx.max(sy)
}
