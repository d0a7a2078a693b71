// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use kinesync_geom::Vec3;

/// Environmental force and integration policy applied to every awake body.
pub trait PoseIntegratorCallbacks: Send + Sync {
    /// Returns the velocity after applying external forces for `dt` seconds.
    fn integrate_velocity(&self, velocity: Vec3, dt: f32) -> Vec3;
}

/// Constant external acceleration (e.g. gravity) with optional linear damping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConstantAcceleration {
    /// Acceleration applied to every awake body, in m/s².
    pub acceleration: Vec3,
    /// Fraction of velocity removed per second, in `[0, 1]`.
    pub linear_damping: f32,
}

impl ConstantAcceleration {
    /// Creates a policy with the given acceleration and no damping.
    pub const fn new(acceleration: Vec3) -> Self {
        Self {
            acceleration,
            linear_damping: 0.0,
        }
    }
}

impl PoseIntegratorCallbacks for ConstantAcceleration {
    fn integrate_velocity(&self, velocity: Vec3, dt: f32) -> Vec3 {
        let damping = (1.0 - self.linear_damping * dt).clamp(0.0, 1.0);
        velocity.add(&self.acceleration.scale(dt)).scale(damping)
    }
}
