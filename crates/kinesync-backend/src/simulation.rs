// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic reference rigid-body simulation.
//!
//! Timestep phases, in order:
//! 1. Sleeper: awake bodies flagged as sleep candidates are frozen.
//! 2. Integration: awake bodies receive the environmental acceleration and
//!    advance their position.
//! 3. Broad phase: every collidable's world bounds go through the all-pairs
//!    [`AabbTree`]; pairs come back canonically ordered.
//! 4. Narrow phase: each pair involving at least one awake body is tested;
//!    contacts are reported to the callbacks and, unless suppressed, resolved
//!    with positional correction and an inelastic normal impulse.
//! 5. Activity: awake bodies update their idle counters and candidacy.
//!
//! A callback error aborts the step and restores every body to its state
//! before the step began.

use blake3::Hasher;
use kinesync_geom::{AabbTree, BroadPhase, Pose, Vec3};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::activity::{Activity, SleepPolicy};
use crate::backend::{BodyDescription, PhysicsBackend, StaticDescription, StepStats};
use crate::callbacks::NarrowPhaseCallbacks;
use crate::error::BackendError;
use crate::handle::{BodyHandle, CollidableReference, StaticHandle};
use crate::integrator::{ConstantAcceleration, PoseIntegratorCallbacks};
use crate::narrow::{collide, Contact};
use crate::pool::BufferPool;
use crate::shape::Shape;

#[derive(Debug, Clone)]
pub(crate) struct BodyRecord {
    handle: BodyHandle,
    pose: Pose,
    velocity: Vec3,
    shape: Shape,
    inverse_mass: f32,
    activity: Activity,
}

#[derive(Debug, Clone)]
pub(crate) struct StaticRecord {
    handle: StaticHandle,
    pose: Pose,
    shape: Shape,
}

/// Reference implementation of [`PhysicsBackend`].
pub struct Simulation {
    pool: BufferPool,
    body_slots: FxHashMap<BodyHandle, usize>,
    static_slots: FxHashMap<StaticHandle, usize>,
    next_body: u32,
    next_static: u32,
    integrator: Box<dyn PoseIntegratorCallbacks>,
    sleep_policy: SleepPolicy,
    broad: AabbTree<CollidableReference>,
    steps: u64,
    disposed: bool,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::create(
            BufferPool::new(),
            ConstantAcceleration::default(),
            SleepPolicy::default(),
        )
    }
}

impl core::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Simulation")
            .field("bodies", &self.pool.bodies.len())
            .field("statics", &self.pool.statics.len())
            .field("steps", &self.steps)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation over `pool` with the given force policy and sleep
    /// thresholds. The pool is owned by the simulation from here on.
    pub fn create<I>(pool: BufferPool, integrator: I, sleep_policy: SleepPolicy) -> Self
    where
        I: PoseIntegratorCallbacks + 'static,
    {
        Self {
            pool,
            body_slots: FxHashMap::default(),
            static_slots: FxHashMap::default(),
            next_body: 0,
            next_static: 0,
            integrator: Box::new(integrator),
            sleep_policy,
            broad: AabbTree::new(),
            steps: 0,
            disposed: false,
        }
    }

    /// Number of completed timesteps.
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Whether [`PhysicsBackend::dispose`] has run.
    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The arena backing this simulation.
    pub const fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Sleep thresholds in effect.
    pub const fn sleep_policy(&self) -> SleepPolicy {
        self.sleep_policy
    }

    /// Activity record of a body.
    pub fn activity(&self, handle: BodyHandle) -> Option<Activity> {
        self.body(handle).map(|b| b.activity)
    }

    /// Forces a body to sleep immediately, as the sleeper would.
    pub fn put_to_sleep(&mut self, handle: BodyHandle) -> Result<(), BackendError> {
        let body = self
            .body_mut(handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.activity.awake = false;
        body.velocity = Vec3::ZERO;
        Ok(())
    }

    /// BLAKE3 digest of every collidable's state, in handle order.
    ///
    /// Layout per body: handle (u32 LE), position and orientation (f32 LE),
    /// velocity (f32 LE), awake flag (u8). Statics contribute handle and pose.
    /// Two runs fed the same inputs must produce the same digest.
    pub fn state_hash(&self) -> [u8; 32] {
        let mut hasher = Hasher::new();
        hasher.update(&self.steps.to_le_bytes());

        let mut bodies: Vec<&BodyRecord> = self.pool.bodies.iter().collect();
        bodies.sort_by_key(|b| b.handle);
        hasher.update(&(bodies.len() as u64).to_le_bytes());
        for body in bodies {
            hasher.update(&body.handle.0.to_le_bytes());
            hash_pose(&mut hasher, &body.pose);
            for c in body.velocity.to_array() {
                hasher.update(&c.to_le_bytes());
            }
            hasher.update(&[u8::from(body.activity.awake)]);
        }

        let mut statics: Vec<&StaticRecord> = self.pool.statics.iter().collect();
        statics.sort_by_key(|s| s.handle);
        hasher.update(&(statics.len() as u64).to_le_bytes());
        for st in statics {
            hasher.update(&st.handle.0.to_le_bytes());
            hash_pose(&mut hasher, &st.pose);
        }
        hasher.finalize().into()
    }

    fn body(&self, handle: BodyHandle) -> Option<&BodyRecord> {
        let slot = *self.body_slots.get(&handle)?;
        self.pool.bodies.get(slot)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut BodyRecord> {
        let slot = *self.body_slots.get(&handle)?;
        self.pool.bodies.get_mut(slot)
    }

    fn static_record(&self, handle: StaticHandle) -> Option<&StaticRecord> {
        let slot = *self.static_slots.get(&handle)?;
        self.pool.statics.get(slot)
    }

    fn placement(&self, r: CollidableReference) -> Option<(Shape, Pose)> {
        match r {
            CollidableReference::Static(h) => self.static_record(h).map(|s| (s.shape, s.pose)),
            CollidableReference::Body(h) => self.body(h).map(|b| (b.shape, b.pose)),
        }
    }

    fn is_active(&self, r: CollidableReference) -> bool {
        match r {
            CollidableReference::Static(_) => false,
            CollidableReference::Body(h) => self.body(h).is_some_and(|b| b.activity.awake),
        }
    }

    fn inverse_mass(&self, r: CollidableReference) -> f32 {
        match r {
            CollidableReference::Static(_) => 0.0,
            CollidableReference::Body(h) => self.body(h).map_or(0.0, |b| b.inverse_mass),
        }
    }

    /// Runs the timestep phases in place. Callers restore the body slab if
    /// this fails partway.
    fn advance<C>(&mut self, dt: f32, callbacks: &C) -> Result<StepStats, C::Error>
    where
        C: NarrowPhaseCallbacks,
    {
        let mut stats = StepStats::default();

        for body in self.pool.bodies.iter_mut() {
            if body.activity.awake && body.activity.sleep_candidate {
                body.activity.awake = false;
                body.velocity = Vec3::ZERO;
                stats.slept += 1;
            }
        }

        for body in self.pool.bodies.iter_mut().filter(|b| b.activity.awake) {
            body.velocity = self.integrator.integrate_velocity(body.velocity, dt);
            body.pose = body.pose.translated(&body.velocity.scale(dt));
        }

        self.broad.clear();
        for st in self.pool.statics.iter() {
            self.broad
                .upsert(CollidableReference::Static(st.handle), st.shape.bounds(&st.pose));
        }
        for body in self.pool.bodies.iter() {
            self.broad
                .upsert(CollidableReference::Body(body.handle), body.shape.bounds(&body.pose));
        }

        let pairs = self.broad.pairs();
        stats.pairs = pairs.len();
        for (a, b) in pairs {
            if !self.is_active(a) && !self.is_active(b) {
                continue;
            }
            let (Some((shape_a, pose_a)), Some((shape_b, pose_b))) =
                (self.placement(a), self.placement(b))
            else {
                continue;
            };
            let Some(contact) = collide(&shape_a, &pose_a, &shape_b, &pose_b) else {
                continue;
            };
            stats.contacts += 1;
            if !callbacks.resolve_collision(a, b)? {
                self.respond(a, b, &contact);
            }
        }

        let policy = self.sleep_policy;
        for body in self.pool.bodies.iter_mut().filter(|b| b.activity.awake) {
            body.activity.observe(&body.velocity, &policy);
        }
        Ok(stats)
    }

    /// Pushes the pair apart and cancels their approaching normal velocity.
    fn respond(&mut self, a: CollidableReference, b: CollidableReference, contact: &Contact) {
        let ima = self.inverse_mass(a);
        let imb = self.inverse_mass(b);
        let total = ima + imb;
        if total <= 0.0 {
            return;
        }
        let velocity_of = |sim: &Self, r: CollidableReference| match r {
            CollidableReference::Body(h) => sim.body(h).map_or(Vec3::ZERO, |b| b.velocity),
            CollidableReference::Static(_) => Vec3::ZERO,
        };
        let n = contact.normal;
        let approach = velocity_of(self, b).sub(&velocity_of(self, a)).dot(&n);
        let impulse = if approach < 0.0 { -approach / total } else { 0.0 };
        let correction = contact.depth / total;

        for (r, sign, inv) in [(a, -1.0f32, ima), (b, 1.0f32, imb)] {
            let CollidableReference::Body(h) = r else {
                continue;
            };
            if let Some(body) = self.body_mut(h) {
                if !body.activity.awake {
                    body.activity.wake();
                }
                body.pose = body.pose.translated(&n.scale(sign * correction * inv));
                body.velocity = body.velocity.add(&n.scale(sign * impulse * inv));
            }
        }
    }
}

fn hash_pose(hasher: &mut Hasher, pose: &Pose) {
    for c in pose.position().to_array() {
        hasher.update(&c.to_le_bytes());
    }
    for c in pose.orientation().to_array() {
        hasher.update(&c.to_le_bytes());
    }
}

impl PhysicsBackend for Simulation {
    fn add_static(&mut self, desc: StaticDescription) -> Result<StaticHandle, BackendError> {
        if self.disposed {
            return Err(BackendError::Disposed);
        }
        desc.shape.validate()?;
        if !desc.pose.is_finite() {
            return Err(BackendError::NonFinite("pose"));
        }
        let handle = StaticHandle(self.next_static);
        self.next_static += 1;
        let slot = self.pool.statics.insert(StaticRecord {
            handle,
            pose: desc.pose,
            shape: desc.shape,
        });
        self.static_slots.insert(handle, slot);
        trace!(handle = handle.0, "static added");
        Ok(handle)
    }

    fn add_body(&mut self, desc: BodyDescription) -> Result<BodyHandle, BackendError> {
        if self.disposed {
            return Err(BackendError::Disposed);
        }
        desc.shape.validate()?;
        if !desc.pose.is_finite() {
            return Err(BackendError::NonFinite("pose"));
        }
        if !desc.velocity.is_finite() {
            return Err(BackendError::NonFinite("velocity"));
        }
        if !desc.mass.is_finite() || desc.mass <= 0.0 {
            return Err(BackendError::InvalidMass(desc.mass));
        }
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        let slot = self.pool.bodies.insert(BodyRecord {
            handle,
            pose: desc.pose,
            velocity: desc.velocity,
            shape: desc.shape,
            inverse_mass: 1.0 / desc.mass,
            activity: Activity::default(),
        });
        self.body_slots.insert(handle, slot);
        trace!(handle = handle.0, "body added");
        Ok(handle)
    }

    fn remove_static(&mut self, handle: StaticHandle) -> bool {
        self.static_slots
            .remove(&handle)
            .and_then(|slot| self.pool.statics.remove(slot))
            .is_some()
    }

    fn remove_body(&mut self, handle: BodyHandle) -> bool {
        self.body_slots
            .remove(&handle)
            .and_then(|slot| self.pool.bodies.remove(slot))
            .is_some()
    }

    fn static_exists(&self, handle: StaticHandle) -> bool {
        self.static_slots.contains_key(&handle)
    }

    fn body_exists(&self, handle: BodyHandle) -> bool {
        self.body_slots.contains_key(&handle)
    }

    fn is_awake(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.activity.awake)
    }

    fn sleep_candidate(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some_and(|b| b.activity.sleep_candidate)
    }

    fn set_sleep_candidate(
        &mut self,
        handle: BodyHandle,
        candidate: bool,
    ) -> Result<(), BackendError> {
        let body = self
            .body_mut(handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.activity.sleep_candidate = candidate;
        Ok(())
    }

    fn awaken(&mut self, handle: BodyHandle) -> Result<(), BackendError> {
        let body = self
            .body_mut(handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.activity.wake();
        Ok(())
    }

    fn body_pose(&self, handle: BodyHandle) -> Option<Pose> {
        self.body(handle).map(|b| b.pose)
    }

    fn static_pose(&self, handle: StaticHandle) -> Option<Pose> {
        self.static_record(handle).map(|s| s.pose)
    }

    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| b.velocity)
    }

    fn set_body_velocity(
        &mut self,
        handle: BodyHandle,
        velocity: Vec3,
    ) -> Result<(), BackendError> {
        if !velocity.is_finite() {
            return Err(BackendError::NonFinite("velocity"));
        }
        let body = self
            .body_mut(handle)
            .ok_or(BackendError::UnknownBody(handle))?;
        body.velocity = velocity;
        body.activity.wake();
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.pool.bodies.len()
    }

    fn static_count(&self) -> usize {
        self.pool.statics.len()
    }

    /// A callback error rolls every body back to its state before the call;
    /// the step counter does not move.
    fn timestep<C>(&mut self, dt: f32, callbacks: &C) -> Result<StepStats, C::Error>
    where
        C: NarrowPhaseCallbacks,
    {
        let checkpoint = self.pool.bodies.clone();
        match self.advance(dt, callbacks) {
            Ok(stats) => {
                self.steps += 1;
                trace!(
                    step = self.steps,
                    pairs = stats.pairs,
                    contacts = stats.contacts,
                    slept = stats.slept,
                    "timestep complete"
                );
                Ok(stats)
            }
            Err(err) => {
                self.pool.bodies = checkpoint;
                debug!(step = self.steps, "timestep rolled back");
                Err(err)
            }
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        debug!(
            bodies = self.pool.bodies.len(),
            statics = self.pool.statics.len(),
            steps = self.steps,
            "disposing simulation"
        );
        self.body_slots.clear();
        self.static_slots.clear();
        self.broad.clear();
        self.pool.clear();
        self.disposed = true;
    }
}
