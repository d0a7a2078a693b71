// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The tick-driven simulation driver.
//!
//! One call to [`SimulationDriver::step`] runs, in order:
//! 1. a wake pass over the registry snapshot (stale bodies are queued for
//!    removal, live bodies lose sleep candidacy and are awakened),
//! 2. one backend timestep with a collision resolver borrowing that snapshot,
//! 3. a flush of the pending-mutation queue.
//!
//! Entities registered or released while a tick is in flight only become
//! visible at that tick's flush, i.e. from the next tick on.

use std::sync::Arc;

use kinesync_backend::{
    BodyDescription, CollidableReference, NarrowPhaseCallbacks, PhysicsBackend, Shape, Simulation,
    StaticDescription,
};
use kinesync_geom::{Pose, Tick, Vec3};
use tracing::{debug, error, info, instrument};

use crate::config::DriverConfig;
use crate::entity::PhysicsEntity;
use crate::error::{CallbackFailure, DesyncError, SimulationError};
use crate::object_id::ObjectId;
use crate::queue::{FlushSummary, PendingMutationQueue, RegistrationHandle, RegistrySnapshot};
use crate::report::TickReport;
use crate::resolver::CollisionResolver;

/// Owns a backend and keeps a registry of entities in step with it.
///
/// Dropping the driver disposes the backend and its arena; [`teardown`]
/// does the same explicitly.
///
/// [`teardown`]: SimulationDriver::teardown
pub struct SimulationDriver<B: PhysicsBackend = Simulation> {
    backend: B,
    queue: PendingMutationQueue,
    tick: Tick,
}

impl SimulationDriver<Simulation> {
    /// Builds a driver over a fresh reference simulation configured by `config`.
    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(Simulation::create(
            config.buffer_pool(),
            config.integrator(),
            config.sleep_policy(),
        ))
    }
}

impl Default for SimulationDriver<Simulation> {
    fn default() -> Self {
        Self::from_config(&DriverConfig::default())
    }
}

impl<B: PhysicsBackend> SimulationDriver<B> {
    /// Wraps an existing backend. The registry starts empty.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            queue: PendingMutationQueue::new(),
            tick: Tick::default(),
        }
    }

    /// The owned backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the owned backend.
    ///
    /// Removing collidables through this reference is how external
    /// invalidation reaches the driver; the affected entities are excised at
    /// the next step.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Index of the next tick to run.
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Number of entities in the live registry.
    pub fn live_count(&self) -> usize {
        self.queue.snapshot().len()
    }

    /// The live registry as of the last flush.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.queue.snapshot()
    }

    /// The pending-mutation queue.
    pub const fn queue(&self) -> &PendingMutationQueue {
        &self.queue
    }

    /// Producer handle for registering from other threads.
    pub fn handle(&self) -> RegistrationHandle {
        self.queue.handle()
    }

    /// Queues `entity` for insertion at the next flush.
    pub fn register(&self, entity: Arc<PhysicsEntity>) {
        self.queue.enqueue_add(entity);
    }

    /// Queues `entity` for removal at the next flush.
    pub fn release(&self, entity: &PhysicsEntity) {
        self.queue.enqueue_remove(entity);
    }

    /// Applies pending registrations now, outside a tick.
    pub fn flush(&mut self) -> FlushSummary {
        self.queue.flush()
    }

    /// Creates a static collidable in the backend. The entity is not
    /// registered.
    pub fn create_static(
        &mut self,
        pose: Pose,
        shape: Shape,
        owner: ObjectId,
    ) -> Result<Arc<PhysicsEntity>, SimulationError> {
        let handle = self
            .backend
            .add_static(StaticDescription::new(pose, shape))?;
        debug!(%handle, %owner, "static created");
        Ok(Arc::new(PhysicsEntity::new_static(handle, owner)))
    }

    /// Creates a dynamic body in the backend. The entity is not registered.
    pub fn create_body(
        &mut self,
        description: BodyDescription,
        owner: ObjectId,
    ) -> Result<Arc<PhysicsEntity>, SimulationError> {
        let handle = self.backend.add_body(description)?;
        debug!(%handle, %owner, "body created");
        Ok(Arc::new(PhysicsEntity::new_body(handle, owner)))
    }

    /// Current pose of a body entity, or `None` if it is a static or the
    /// backend has freed it.
    pub fn body_pose(&self, entity: &PhysicsEntity) -> Option<Pose> {
        let handle = entity.body_handle()?;
        if !self.backend.body_exists(handle) {
            return None;
        }
        self.backend.body_pose(handle)
    }

    /// Current velocity of a body entity, liveness-checked like
    /// [`body_pose`](Self::body_pose).
    pub fn body_velocity(&self, entity: &PhysicsEntity) -> Option<Vec3> {
        let handle = entity.body_handle()?;
        if !self.backend.body_exists(handle) {
            return None;
        }
        self.backend.body_velocity(handle)
    }

    /// Resolves a contact pair against the current registry and dispatches
    /// both callbacks, outside a backend timestep.
    ///
    /// Returns the callback failures, or a [`DesyncError`] when either
    /// reference has no registered entity.
    pub fn resolve_collision(
        &self,
        a: CollidableReference,
        b: CollidableReference,
    ) -> Result<Vec<CallbackFailure>, DesyncError> {
        let snapshot = self.queue.snapshot();
        let resolver = CollisionResolver::new(&snapshot, self.tick);
        resolver.resolve_collision(a, b)?;
        Ok(resolver.finish().failures)
    }

    /// Advances the simulation by `delta_ms` milliseconds.
    ///
    /// On [`SimulationError::Desync`] the tick is abandoned: the queue is not
    /// flushed and the tick counter does not advance. The wake pass has
    /// already run; the backend's own state is whatever its `timestep` leaves
    /// behind on error (the reference simulation restores it).
    #[instrument(skip(self), fields(tick = %self.tick))]
    pub fn step(&mut self, delta_ms: f32) -> Result<TickReport, SimulationError> {
        if !delta_ms.is_finite() || delta_ms < 0.0 {
            return Err(SimulationError::InvalidDelta(delta_ms));
        }

        let snapshot = self.queue.snapshot();
        let mut woken = 0;
        let mut stale = 0;
        for entity in snapshot.bodies() {
            let Some(handle) = entity.body_handle() else {
                continue;
            };
            if !self.backend.body_exists(handle) {
                debug!(id = %entity.id(), "stale body queued for removal");
                self.queue.enqueue_remove(entity);
                stale += 1;
                continue;
            }
            self.backend.set_sleep_candidate(handle, false)?;
            if !self.backend.is_awake(handle) {
                self.backend.awaken(handle)?;
                woken += 1;
            }
        }

        let resolver = CollisionResolver::new(&snapshot, self.tick);
        let stats = match self.backend.timestep(delta_ms / 1000.0, &resolver) {
            Ok(stats) => stats,
            Err(desync) => {
                error!(%desync, "collision resolution desynchronized; tick abandoned");
                return Err(desync.into());
            }
        };
        let outcome = resolver.finish();
        let flushed = self.queue.flush();

        let report = TickReport {
            tick: self.tick,
            woken,
            stale,
            contacts: outcome.contacts,
            stats,
            failures: outcome.failures,
            flushed,
        };
        debug!(
            woken,
            stale,
            contacts = report.contacts,
            failures = report.failures.len(),
            added = flushed.added,
            removed = flushed.removed,
            "tick complete"
        );
        self.tick = self.tick.next();
        Ok(report)
    }

    /// Disposes the backend simulation and its arena.
    pub fn teardown(mut self) {
        info!(tick = %self.tick, live = self.live_count(), "tearing down simulation");
        self.backend.dispose();
    }
}

impl<B: PhysicsBackend> Drop for SimulationDriver<B> {
    fn drop(&mut self) {
        self.backend.dispose();
    }
}

impl<B: PhysicsBackend + core::fmt::Debug> core::fmt::Debug for SimulationDriver<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SimulationDriver")
            .field("backend", &self.backend)
            .field("tick", &self.tick)
            .field("live", &self.live_count())
            .field("pending", &self.queue.pending_len())
            .finish()
    }
}
