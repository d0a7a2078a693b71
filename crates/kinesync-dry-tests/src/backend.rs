// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scripted backend fake.
//!
//! [`ScriptedBackend`] performs no physics. Each timestep reports whatever
//! contact pairs the test scripted for it and records the `dt` it received,
//! which lets driver tests provoke desyncs, observe the millisecond-to-second
//! conversion, and exercise the sleep veto deterministically.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kinesync_backend::{
    BackendError, BodyDescription, BodyHandle, CollidableReference, NarrowPhaseCallbacks,
    PhysicsBackend, StaticDescription, StaticHandle, StepStats,
};
use kinesync_geom::{Pose, Vec3};

#[derive(Debug, Clone, Copy)]
struct FakeBody {
    pose: Pose,
    velocity: Vec3,
    awake: bool,
    candidate: bool,
}

/// [`PhysicsBackend`] fake driven by a contact script.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    statics: BTreeMap<StaticHandle, Pose>,
    bodies: BTreeMap<BodyHandle, FakeBody>,
    next_static: u32,
    next_body: u32,
    script: VecDeque<Vec<(CollidableReference, CollidableReference)>>,
    eager_sleep: bool,
    timesteps: Vec<f32>,
    awakened: usize,
    dispose_calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    /// Empty backend with no script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks every awake body as a sleep candidate at the end of each
    /// timestep, and freezes candidates at the start of the next one.
    pub fn with_eager_sleep(mut self) -> Self {
        self.eager_sleep = true;
        self
    }

    /// Queues the contact pairs the next unscripted timestep will report.
    pub fn push_step<I>(&mut self, contacts: I)
    where
        I: IntoIterator<Item = (CollidableReference, CollidableReference)>,
    {
        self.script.push_back(contacts.into_iter().collect());
    }

    /// Freezes a body as the backend's sleeper would.
    pub fn put_to_sleep(&mut self, handle: BodyHandle) {
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.awake = false;
        }
    }

    /// Every `dt` (seconds) passed to [`PhysicsBackend::timestep`].
    pub fn timesteps(&self) -> &[f32] {
        &self.timesteps
    }

    /// Number of successful [`PhysicsBackend::awaken`] calls.
    pub const fn awakened(&self) -> usize {
        self.awakened
    }

    /// Number of [`PhysicsBackend::dispose`] calls.
    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }

    /// Counter of [`PhysicsBackend::dispose`] calls that outlives the backend.
    pub fn dispose_probe(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.dispose_calls)
    }
}

impl PhysicsBackend for ScriptedBackend {
    fn add_static(&mut self, desc: StaticDescription) -> Result<StaticHandle, BackendError> {
        let handle = StaticHandle(self.next_static);
        self.next_static += 1;
        self.statics.insert(handle, desc.pose);
        Ok(handle)
    }

    fn add_body(&mut self, desc: BodyDescription) -> Result<BodyHandle, BackendError> {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            handle,
            FakeBody {
                pose: desc.pose,
                velocity: desc.velocity,
                awake: true,
                candidate: false,
            },
        );
        Ok(handle)
    }

    fn remove_static(&mut self, handle: StaticHandle) -> bool {
        self.statics.remove(&handle).is_some()
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.bodies.remove(&handle).is_some()
    }

    fn static_exists(&self, handle: StaticHandle) -> bool {
        self.statics.contains_key(&handle)
    }

    fn body_exists(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    fn is_awake(&self, handle: BodyHandle) -> bool {
        self.bodies.get(&handle).is_some_and(|b| b.awake)
    }

    fn sleep_candidate(&self, handle: BodyHandle) -> bool {
        self.bodies.get(&handle).is_some_and(|b| b.candidate)
    }

    fn set_sleep_candidate(
        &mut self,
        handle: BodyHandle,
        candidate: bool,
    ) -> Result<(), BackendError> {
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.candidate = candidate;
        Ok(())
    }

    fn awaken(&mut self, handle: BodyHandle) -> Result<(), BackendError> {
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.awake = true;
        body.candidate = false;
        self.awakened += 1;
        Ok(())
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.bodies.get(&handle).map(|b| b.pose)
    }

    fn static_pose(&self, handle: StaticHandle) -> Option<Pose> {
        self.statics.get(&handle).copied()
    }

    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.velocity)
    }

    fn set_body_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), BackendError> {
        let body = self
            .bodies
            .get_mut(&handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.velocity = velocity;
        body.awake = true;
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn static_count(&self) -> usize {
        self.statics.len()
    }

    fn timestep<C>(&mut self, dt: f32, callbacks: &C) -> Result<StepStats, C::Error>
    where
        C: NarrowPhaseCallbacks,
    {
        let mut stats = StepStats::default();
        if self.eager_sleep {
            for body in self.bodies.values_mut() {
                if body.awake && body.candidate {
                    body.awake = false;
                    stats.slept += 1;
                }
            }
        }

        let contacts = self.script.pop_front().unwrap_or_default();
        stats.pairs = contacts.len();
        for (a, b) in contacts {
            stats.contacts += 1;
            callbacks.resolve_collision(a, b)?;
        }

        if self.eager_sleep {
            for body in self.bodies.values_mut().filter(|b| b.awake) {
                body.candidate = true;
            }
        }
        self.timesteps.push(dt);
        Ok(stats)
    }

    fn dispose(&mut self) {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        self.statics.clear();
        self.bodies.clear();
        self.script.clear();
    }
}
