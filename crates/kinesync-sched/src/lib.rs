// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! kinesync scheduler
//!
//! Drives a [`SimulationDriver`] at a fixed cadence on a tokio interval. Each
//! tick advances the simulation by the configured interval, so simulated time
//! does not depend on wall-clock jitter.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use kinesync_backend::{PhysicsBackend, Simulation};
use kinesync_core::{RegistrationHandle, SimulationDriver, TickReport};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// Totals accumulated over one [`Scheduler::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Ticks executed.
    pub ticks: u64,
    /// Contact pairs resolved.
    pub contacts: u64,
    /// Collision callbacks that failed.
    pub callback_failures: u64,
}

/// Fixed-interval tick loop around a simulation driver.
pub struct Scheduler<B: PhysicsBackend = Simulation> {
    driver: SimulationDriver<B>,
    interval: Duration,
    max_ticks: Option<u64>,
    log_every: u64,
}

impl<B: PhysicsBackend> Scheduler<B> {
    /// Creates a scheduler ticking every `interval_ms` milliseconds.
    pub fn new(driver: SimulationDriver<B>, interval_ms: u64) -> Self {
        Self {
            driver,
            interval: Duration::from_millis(interval_ms.max(1)),
            max_ticks: None,
            log_every: 60,
        }
    }

    /// Stops after `ticks` ticks. `0` means unbounded.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = (ticks > 0).then_some(ticks);
        self
    }

    /// Logs a progress line every `ticks` ticks.
    pub fn with_log_every(mut self, ticks: u64) -> Self {
        self.log_every = ticks.max(1);
        self
    }

    /// Producer handle for spawner tasks.
    pub fn handle(&self) -> RegistrationHandle {
        self.driver.handle()
    }

    /// The wrapped driver.
    pub const fn driver(&self) -> &SimulationDriver<B> {
        &self.driver
    }

    /// Mutable access to the wrapped driver.
    pub fn driver_mut(&mut self) -> &mut SimulationDriver<B> {
        &mut self.driver
    }

    /// Consumes the scheduler and returns the driver.
    pub fn into_driver(self) -> SimulationDriver<B> {
        self.driver
    }

    /// Runs the loop until `shutdown` resolves, the tick budget is spent, or a
    /// tick fails.
    #[instrument(skip(self, shutdown), fields(interval = ?self.interval))]
    pub async fn run<F>(&mut self, shutdown: F) -> Result<RunSummary>
    where
        F: Future<Output = ()>,
    {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(max_ticks = ?self.max_ticks, "scheduler started");
        let mut summary = RunSummary::default();
        loop {
            if self.max_ticks.is_some_and(|max| summary.ticks >= max) {
                break;
            }
            tokio::select! {
                biased;
                () = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = interval.tick() => {
                    let report = self.tick()?;
                    summary.ticks += 1;
                    summary.contacts += report.contacts as u64;
                    summary.callback_failures += report.failures.len() as u64;
                }
            }
        }
        info!(
            ticks = summary.ticks,
            contacts = summary.contacts,
            callback_failures = summary.callback_failures,
            "scheduler stopped"
        );
        Ok(summary)
    }

    fn tick(&mut self) -> Result<TickReport> {
        let delta_ms = self.interval.as_millis() as f32;
        let report = self
            .driver
            .step(delta_ms)
            .with_context(|| format!("tick {} failed", self.driver.tick()))?;
        for failure in &report.failures {
            warn!(tick = %report.tick, %failure, "callback failure");
        }
        if (report.tick.index() + 1).is_multiple_of(self.log_every) {
            info!(
                tick = %report.tick,
                live = self.driver.live_count(),
                contacts = report.contacts,
                "tick"
            );
        } else {
            debug!(tick = %report.tick, contacts = report.contacts, "tick");
        }
        Ok(report)
    }
}
