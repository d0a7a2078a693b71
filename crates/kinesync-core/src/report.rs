// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use kinesync_backend::StepStats;
use kinesync_geom::Tick;

use crate::error::CallbackFailure;
use crate::queue::FlushSummary;

/// Summary of one completed [`crate::SimulationDriver::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Tick that was executed.
    pub tick: Tick,
    /// Sleeping bodies awakened by the wake pass.
    pub woken: usize,
    /// Registered bodies found freed by the backend and queued for removal.
    pub stale: usize,
    /// Contact pairs resolved to entities.
    pub contacts: usize,
    /// Backend counters for the timestep.
    pub stats: StepStats,
    /// Collision callbacks that failed during the timestep.
    pub failures: Vec<CallbackFailure>,
    /// Registry changes applied after the timestep.
    pub flushed: FlushSummary,
}

impl TickReport {
    /// Whether every collision callback succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
