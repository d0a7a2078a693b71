// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Serializable driver configuration.

use kinesync_backend::{BufferPool, ConstantAcceleration, SleepPolicy};
use kinesync_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Tunables for a [`crate::SimulationDriver`] over the reference backend.
///
/// Missing fields deserialize to their defaults, so partial JSON documents are
/// accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Constant environmental acceleration in m/s² (x, y, z).
    pub gravity: [f32; 3],
    /// Fraction of body velocity removed per second.
    pub linear_damping: f32,
    /// Speed below which a body counts as idle.
    pub sleep_threshold: f32,
    /// Consecutive idle steps before a body becomes a sleep candidate.
    pub steps_to_sleep: u32,
    /// Arena slots reserved up front for bodies.
    pub body_capacity: usize,
    /// Arena slots reserved up front for statics.
    pub static_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        let sleep = SleepPolicy::default();
        Self {
            gravity: [0.0, 0.0, 0.0],
            linear_damping: 0.0,
            sleep_threshold: sleep.linear_threshold,
            steps_to_sleep: sleep.steps_to_sleep,
            body_capacity: 64,
            static_capacity: 16,
        }
    }
}

impl DriverConfig {
    /// Force policy described by this config.
    pub fn integrator(&self) -> ConstantAcceleration {
        ConstantAcceleration {
            acceleration: Vec3::from(self.gravity),
            linear_damping: self.linear_damping,
        }
    }

    /// Sleep thresholds described by this config.
    pub const fn sleep_policy(&self) -> SleepPolicy {
        SleepPolicy {
            linear_threshold: self.sleep_threshold,
            steps_to_sleep: self.steps_to_sleep,
        }
    }

    /// Arena sized per this config.
    pub fn buffer_pool(&self) -> BufferPool {
        BufferPool::with_capacity(self.body_capacity, self.static_capacity)
    }
}
