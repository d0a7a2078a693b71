// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use crate::math::Vec3;
use crate::types::pose::Pose;

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - `min` components are less than or equal to `max` components.
/// - Values are `f32` and represent meters in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    /// Constructs an AABB from its minimum and maximum corners.
    ///
    /// # Panics
    /// Panics if any component of `min` is greater than its counterpart in `max`.
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        let a = min.to_array();
        let b = max.to_array();
        assert!(
            a[0] <= b[0] && a[1] <= b[1] && a[2] <= b[2],
            "invalid AABB: min > max"
        );
        Self { min, max }
    }

    /// Returns the minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.min.add(&self.max).scale(0.5)
    }

    /// Builds an AABB centered at `center` with half-extents `he`.
    ///
    /// Negative half-extents are folded to their absolute value.
    #[must_use]
    pub fn from_center_half_extents(center: Vec3, he: Vec3) -> Self {
        let he = he.abs();
        Self {
            min: center.sub(&he),
            max: center.add(&he),
        }
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let a_min = self.min.to_array();
        let a_max = self.max.to_array();
        let b_min = other.min.to_array();
        let b_max = other.max.to_array();
        // Inclusive to treat touching faces as overlap for broad-phase pairing.
        !(a_max[0] < b_min[0]
            || a_min[0] > b_max[0]
            || a_max[1] < b_min[1]
            || a_min[1] > b_max[1]
            || a_max[2] < b_min[2]
            || a_min[2] > b_max[2])
    }

    /// Returns the union of two AABBs.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Bounds an oriented box with local half-extents `he` placed at `pose`.
    ///
    /// Uses the absolute rotation basis, so the result tightly bounds the box
    /// for any orientation.
    #[must_use]
    pub fn from_oriented_box(pose: &Pose, he: Vec3) -> Self {
        let he = he.abs();
        let ax = pose.orientation().rotate(&Vec3::UNIT_X).abs();
        let ay = pose.orientation().rotate(&Vec3::UNIT_Y).abs();
        let az = pose.orientation().rotate(&Vec3::UNIT_Z).abs();
        let world_he = ax
            .scale(he.x())
            .add(&ay.scale(he.y()))
            .add(&az.scale(he.z()));
        Self::from_center_half_extents(pose.position(), world_he)
    }
}
