// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Body and static description builders.

use kinesync_backend::{BodyDescription, Shape};
use kinesync_geom::{Pose, Vec3};

/// Resting sphere of `radius` centred at `center`.
pub fn sphere_at(center: Vec3, radius: f32) -> BodyDescription {
    BodyDescription::new(Pose::at(center), Shape::sphere(radius))
}

/// Sphere of `radius` at `center` moving with `velocity`.
pub fn sphere_moving(center: Vec3, radius: f32, velocity: Vec3) -> BodyDescription {
    sphere_at(center, radius).with_velocity(velocity)
}

/// Placement and shape of a flat floor box whose top face sits at `top_y`.
pub fn floor(top_y: f32, half_width: f32) -> (Pose, Shape) {
    let thickness = 1.0;
    (
        Pose::at(Vec3::new(0.0, top_y - thickness * 0.5, 0.0)),
        Shape::cuboid(half_width * 2.0, thickness, half_width * 2.0),
    )
}
