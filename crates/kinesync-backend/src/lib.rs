// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! kinesync-backend: the rigid-body backend port and a deterministic reference
//! simulation implementing it.
//!
//! The [`PhysicsBackend`] trait is the seam the synchronization layer drives:
//! handle-returning creation for statics and bodies, a seconds-based
//! `timestep`, per-body activity flags, and a narrow-phase hook
//! ([`NarrowPhaseCallbacks`]) through which contacts are reported as tagged
//! [`CollidableReference`]s.
//!
//! [`Simulation`] is the reference implementation. Its contact response is
//! intentionally small (positional correction plus an inelastic normal
//! impulse); it exists so the layer above can be exercised end to end with
//! reproducible results.

mod activity;
mod backend;
mod callbacks;
mod error;
mod handle;
mod integrator;
mod narrow;
mod pool;
mod shape;
mod simulation;

pub use activity::{Activity, SleepPolicy};
pub use backend::{BodyDescription, PhysicsBackend, StaticDescription, StepStats};
pub use callbacks::{NarrowPhaseCallbacks, NoCallbacks};
pub use error::BackendError;
pub use handle::{BodyHandle, CollidableReference, StaticHandle};
pub use integrator::{ConstantAcceleration, PoseIntegratorCallbacks};
pub use narrow::{collide, Contact};
pub use pool::BufferPool;
pub use shape::Shape;
pub use simulation::Simulation;
