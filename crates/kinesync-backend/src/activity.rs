// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-body sleep tracking.
//!
//! A body whose speed stays below [`SleepPolicy::linear_threshold`] for
//! [`SleepPolicy::steps_to_sleep`] consecutive timesteps becomes a sleep
//! candidate. At the start of the following timestep every awake candidate is
//! frozen. Clearing the candidate flag between timesteps vetoes that.

use kinesync_geom::Vec3;

/// Thresholds controlling when the backend may freeze a motionless body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SleepPolicy {
    /// Speed (m/s) below which a body counts as idle for a step.
    pub linear_threshold: f32,
    /// Consecutive idle steps before the body becomes a sleep candidate.
    pub steps_to_sleep: u32,
}

impl Default for SleepPolicy {
    fn default() -> Self {
        Self {
            linear_threshold: 0.01,
            steps_to_sleep: 60,
        }
    }
}

/// Activity state of one body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activity {
    /// Whether the body is simulated this step.
    pub awake: bool,
    /// Whether the backend may freeze the body at the next timestep.
    pub sleep_candidate: bool,
    /// Consecutive idle steps observed so far.
    pub idle_steps: u32,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            awake: true,
            sleep_candidate: false,
            idle_steps: 0,
        }
    }
}

impl Activity {
    /// Wakes the body and resets its idle counter.
    pub fn wake(&mut self) {
        self.awake = true;
        self.sleep_candidate = false;
        self.idle_steps = 0;
    }

    /// Records one step of motion at `velocity` and refreshes candidacy.
    pub(crate) fn observe(&mut self, velocity: &Vec3, policy: &SleepPolicy) {
        let threshold_sq = policy.linear_threshold * policy.linear_threshold;
        if velocity.length_squared() < threshold_sq {
            self.idle_steps = self.idle_steps.saturating_add(1);
        } else {
            self.idle_steps = 0;
        }
        self.sleep_candidate = self.idle_steps >= policy.steps_to_sleep;
    }
}
