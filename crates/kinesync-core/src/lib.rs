// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! kinesync-core: keeps a set of game-owned physics entities in step with a
//! rigid-body backend.
//!
//! The game-object lifecycle registers and releases [`PhysicsEntity`]s at any
//! time, from any thread, through a [`RegistrationHandle`]. The
//! [`SimulationDriver`] applies those requests only at one point per tick
//! (after the backend timestep), so the backend and the collision resolver
//! always see a stable registry for the duration of a step.
//!
//! Contacts reported by the backend as bare handles are resolved back to
//! entities by `(subtype, handle)` and fanned out to both entities' collision
//! callbacks. A reference that matches nothing is a [`DesyncError`]; a failing
//! callback is recorded in the [`TickReport`] and never stops the tick.

mod config;
mod driver;
mod entity;
mod error;
mod object_id;
mod queue;
mod report;
mod resolver;

pub use config::DriverConfig;
pub use driver::SimulationDriver;
pub use entity::{CallbackError, CollisionCallback, EntityId, EntityKind, PhysicsEntity};
pub use error::{CallbackFailure, CallbackFailureKind, DesyncError, SimulationError};
pub use object_id::{ObjectId, ObjectIdFlags, ObjectIdGenerator};
pub use queue::{FlushSummary, PendingMutationQueue, PendingOp, RegistrationHandle, RegistrySnapshot};
pub use report::TickReport;
