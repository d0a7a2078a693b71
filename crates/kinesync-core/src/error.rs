// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use kinesync_backend::{BackendError, CollidableReference};
use kinesync_geom::Tick;
use thiserror::Error;

use crate::entity::{CallbackError, EntityId};

/// Errors surfaced by the simulation driver.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// The tick delta was negative, NaN, or infinite.
    #[error("invalid tick delta: {0} ms")]
    InvalidDelta(f32),
    /// The backend reported a collidable the registry does not know.
    #[error(transparent)]
    Desync(#[from] DesyncError),
    /// The backend rejected an operation.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

/// Registry and backend disagree about which collidables exist.
///
/// Fatal for the tick that hit it: the tick is abandoned without flushing and
/// pending operations stay queued. A backend that rolls back failed steps,
/// like the reference simulation, is left unchanged, so flushing and stepping
/// again recovers when the missing entity was only pending.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("desync at tick {tick}: collision reference {reference} has no registered entity")]
pub struct DesyncError {
    /// Tick during which resolution failed.
    pub tick: Tick,
    /// The reference that could not be resolved.
    pub reference: CollidableReference,
}

/// How a single collision-callback invocation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackFailureKind {
    /// The callback returned an error.
    #[error("returned error: {0}")]
    Returned(CallbackError),
    /// The callback panicked; carries the panic message when it was a string.
    #[error("panicked: {0}")]
    Panicked(String),
}

/// A recovered collision-callback failure, recorded in the tick report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("callback of {entity} (partner {partner}) {kind}")]
pub struct CallbackFailure {
    /// Entity whose callback failed.
    pub entity: EntityId,
    /// Partner the callback was invoked with.
    pub partner: EntityId,
    /// Failure classification.
    pub kind: CallbackFailureKind,
}
