// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use kinesync_geom::{Aabb, Pose, Vec3};

use crate::error::BackendError;

/// Collision shape description supplied at creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Sphere centered on the pose position.
    Sphere {
        /// Radius in meters.
        radius: f32,
    },
    /// Oriented box centered on the pose position.
    Box {
        /// Half extents along the local axes, in meters.
        half_extents: Vec3,
    },
}

impl Shape {
    /// Convenience constructor for a sphere.
    pub const fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Convenience constructor for a box from full edge lengths.
    pub fn cuboid(width: f32, height: f32, length: f32) -> Self {
        Self::Box {
            half_extents: Vec3::new(width * 0.5, height * 0.5, length * 0.5),
        }
    }

    /// Rejects non-finite or non-positive dimensions.
    pub fn validate(&self) -> Result<(), BackendError> {
        match self {
            Self::Sphere { radius } if radius.is_finite() && *radius > 0.0 => Ok(()),
            Self::Sphere { radius } => Err(BackendError::InvalidShape(format!(
                "sphere radius {radius}"
            ))),
            Self::Box { half_extents }
                if half_extents.is_finite() && half_extents.to_array().iter().all(|h| *h > 0.0) =>
            {
                Ok(())
            }
            Self::Box { half_extents } => Err(BackendError::InvalidShape(format!(
                "box half extents {:?}",
                half_extents.to_array()
            ))),
        }
    }

    /// World-space bounds of the shape placed at `pose`.
    pub fn bounds(&self, pose: &Pose) -> Aabb {
        match self {
            Self::Sphere { radius } => {
                Aabb::from_center_half_extents(pose.position(), Vec3::new(*radius, *radius, *radius))
            }
            Self::Box { half_extents } => Aabb::from_oriented_box(pose, *half_extents),
        }
    }
}
