// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::{Quat, Vec3};

/// Rigid pose (position + orientation) used for collidable placement.
///
/// Conventions:
/// - `position` in meters (world space).
/// - `orientation` as a unit quaternion; normalized on construction.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Pose {
    position: Vec3,
    orientation: Quat,
}

impl Pose {
    /// Identity pose (origin, no rotation).
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::identity(),
        }
    }

    /// Creates a pose from components, normalizing the orientation.
    #[must_use]
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation: orientation.normalize(),
        }
    }

    /// Creates an unrotated pose at `position`.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            orientation: Quat::identity(),
        }
    }

    /// Position component.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Orientation component.
    #[must_use]
    pub const fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Returns a copy translated by `delta`.
    #[must_use]
    pub fn translated(&self, delta: &Vec3) -> Self {
        Self {
            position: self.position.add(delta),
            orientation: self.orientation,
        }
    }

    /// Maps a local-space point into world space.
    #[must_use]
    pub fn transform_point(&self, local: &Vec3) -> Vec3 {
        self.orientation.rotate(local).add(&self.position)
    }

    /// Maps a world-space point into this pose's local space.
    #[must_use]
    pub fn inverse_transform_point(&self, world: &Vec3) -> Vec3 {
        self.orientation
            .conjugate()
            .rotate(&world.sub(&self.position))
    }

    /// Rotates a local-space direction into world space.
    #[must_use]
    pub fn transform_direction(&self, local: &Vec3) -> Vec3 {
        self.orientation.rotate(local)
    }

    /// Returns `true` when position and orientation are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}
