// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use kinesync_geom::{Pose, Vec3};

use crate::callbacks::NarrowPhaseCallbacks;
use crate::error::BackendError;
use crate::handle::{BodyHandle, StaticHandle};
use crate::shape::Shape;

/// Creation parameters for a static collidable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticDescription {
    /// World placement.
    pub pose: Pose,
    /// Collision shape.
    pub shape: Shape,
}

impl StaticDescription {
    /// Describes a static `shape` placed at `pose`.
    pub const fn new(pose: Pose, shape: Shape) -> Self {
        Self { pose, shape }
    }
}

/// Creation parameters for a dynamic body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDescription {
    /// Initial world placement.
    pub pose: Pose,
    /// Collision shape.
    pub shape: Shape,
    /// Initial linear velocity in m/s.
    pub velocity: Vec3,
    /// Mass in kilograms; must be finite and positive.
    pub mass: f32,
}

impl BodyDescription {
    /// Describes a resting unit-mass body.
    pub const fn new(pose: Pose, shape: Shape) -> Self {
        Self {
            pose,
            shape,
            velocity: Vec3::ZERO,
            mass: 1.0,
        }
    }

    /// Sets the initial velocity.
    pub const fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the mass.
    pub const fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }
}

/// Counters describing one completed timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Candidate pairs produced by the broad phase.
    pub pairs: usize,
    /// Contacts reported to the narrow-phase callbacks.
    pub contacts: usize,
    /// Bodies frozen by the sleeper at the start of the step.
    pub slept: usize,
}

/// Port through which the synchronization layer drives a rigid-body backend.
///
/// Handles are issued per subtype and never reused by the reference
/// implementation. Queries against a handle that no longer exists return
/// `false`/`None`; mutations return [`BackendError`].
pub trait PhysicsBackend {
    /// Creates a static collidable and returns its handle.
    fn add_static(&mut self, desc: StaticDescription) -> Result<StaticHandle, BackendError>;

    /// Creates a dynamic body and returns its handle.
    fn add_body(&mut self, desc: BodyDescription) -> Result<BodyHandle, BackendError>;

    /// Frees a static. Returns `false` if it did not exist.
    fn remove_static(&mut self, handle: StaticHandle) -> bool;

    /// Frees a body. Returns `false` if it did not exist.
    fn remove_body(&mut self, handle: BodyHandle) -> bool;

    /// Liveness query for a static handle.
    fn static_exists(&self, handle: StaticHandle) -> bool;

    /// Liveness query for a body handle.
    fn body_exists(&self, handle: BodyHandle) -> bool;

    /// Whether the body is currently simulated (`false` when absent).
    fn is_awake(&self, handle: BodyHandle) -> bool;

    /// Whether the body may be frozen at the next timestep (`false` when absent).
    fn sleep_candidate(&self, handle: BodyHandle) -> bool;

    /// Overrides the body's sleep-candidate flag.
    fn set_sleep_candidate(&mut self, handle: BodyHandle, candidate: bool)
        -> Result<(), BackendError>;

    /// Wakes a sleeping body.
    fn awaken(&mut self, handle: BodyHandle) -> Result<(), BackendError>;

    /// Current pose of a body.
    fn body_pose(&self, handle: BodyHandle) -> Option<Pose>;

    /// Pose of a static.
    fn static_pose(&self, handle: StaticHandle) -> Option<Pose>;

    /// Current linear velocity of a body.
    fn body_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    /// Overrides a body's linear velocity (waking it).
    fn set_body_velocity(&mut self, handle: BodyHandle, velocity: Vec3)
        -> Result<(), BackendError>;

    /// Number of live bodies.
    fn body_count(&self) -> usize;

    /// Number of live statics.
    fn static_count(&self) -> usize;

    /// Advances the simulation by `dt` seconds, reporting every contact to
    /// `callbacks`. A callback error aborts the remainder of the step and is
    /// returned unchanged.
    fn timestep<C>(&mut self, dt: f32, callbacks: &C) -> Result<StepStats, C::Error>
    where
        C: NarrowPhaseCallbacks;

    /// Releases every collidable and clears the backing arena. Idempotent.
    fn dispose(&mut self);
}
