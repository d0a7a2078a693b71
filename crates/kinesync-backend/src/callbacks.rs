// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use core::convert::Infallible;

use crate::handle::CollidableReference;

/// Narrow-phase hook invoked synchronously for every contact the backend finds
/// during [`crate::PhysicsBackend::timestep`].
///
/// Implementations may be called from whatever thread(s) the backend steps on,
/// hence the `Sync` bound; they must not block.
pub trait NarrowPhaseCallbacks: Sync {
    /// Fatal error type; returning it aborts the remainder of the timestep.
    type Error;

    /// Observes a contact between `a` and `b`.
    ///
    /// Returns `Ok(true)` to suppress the backend's own contact response for
    /// this pair, `Ok(false)` to let the solver handle it normally.
    fn resolve_collision(
        &self,
        a: CollidableReference,
        b: CollidableReference,
    ) -> Result<bool, Self::Error>;
}

/// Callbacks that observe nothing and never suppress a response.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallbacks;

impl NarrowPhaseCallbacks for NoCallbacks {
    type Error = Infallible;

    fn resolve_collision(
        &self,
        _a: CollidableReference,
        _b: CollidableReference,
    ) -> Result<bool, Self::Error> {
        Ok(false)
    }
}
