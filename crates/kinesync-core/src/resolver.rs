// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision resolution: backend references back to entities, then callbacks.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use kinesync_backend::{CollidableReference, NarrowPhaseCallbacks};
use kinesync_geom::Tick;
use tracing::warn;

use crate::entity::PhysicsEntity;
use crate::error::{CallbackFailure, CallbackFailureKind, DesyncError};
use crate::queue::RegistrySnapshot;

/// Narrow-phase adapter handed to the backend for one timestep.
///
/// Borrows the tick's registry snapshot immutably, so resolution can never
/// observe a registry mutated mid-step.
#[derive(Debug)]
pub(crate) struct CollisionResolver<'a> {
    snapshot: &'a RegistrySnapshot,
    tick: Tick,
    contacts: AtomicUsize,
    failures: Mutex<Vec<CallbackFailure>>,
}

/// What a resolver saw over one timestep.
#[derive(Debug, Default)]
pub(crate) struct ResolverOutcome {
    pub(crate) contacts: usize,
    pub(crate) failures: Vec<CallbackFailure>,
}

impl<'a> CollisionResolver<'a> {
    pub(crate) fn new(snapshot: &'a RegistrySnapshot, tick: Tick) -> Self {
        Self {
            snapshot,
            tick,
            contacts: AtomicUsize::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn finish(self) -> ResolverOutcome {
        ResolverOutcome {
            contacts: self.contacts.into_inner(),
            failures: self
                .failures
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn lookup(&self, reference: CollidableReference) -> Result<&'a PhysicsEntity, DesyncError> {
        self.snapshot
            .resolve(reference)
            .map(|entity| &**entity)
            .ok_or(DesyncError {
                tick: self.tick,
                reference,
            })
    }

    fn dispatch(&self, entity: &PhysicsEntity, partner: &PhysicsEntity) {
        let Some(callback) = entity.collision_callback() else {
            return;
        };
        let kind = match panic::catch_unwind(AssertUnwindSafe(|| callback(partner))) {
            Ok(Ok(())) => return,
            Ok(Err(err)) => CallbackFailureKind::Returned(err),
            Err(payload) => CallbackFailureKind::Panicked(panic_message(payload.as_ref())),
        };
        let failure = CallbackFailure {
            entity: entity.id(),
            partner: partner.id(),
            kind,
        };
        warn!(tick = %self.tick, %failure, "collision callback failed");
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(failure);
    }
}

impl NarrowPhaseCallbacks for CollisionResolver<'_> {
    type Error = DesyncError;

    fn resolve_collision(
        &self,
        a: CollidableReference,
        b: CollidableReference,
    ) -> Result<bool, Self::Error> {
        let first = self.lookup(a)?;
        let second = self.lookup(b)?;
        self.contacts.fetch_add(1, Ordering::Relaxed);
        self.dispatch(first, second);
        self.dispatch(second, first);
        Ok(false)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::entity::{CallbackError, EntityId};
    use crate::object_id::ObjectId;
    use crate::queue::PendingMutationQueue;
    use kinesync_backend::{BodyHandle, StaticHandle};

    fn registry(entities: &[Arc<PhysicsEntity>]) -> RegistrySnapshot {
        let mut q = PendingMutationQueue::new();
        for e in entities {
            q.enqueue_add(Arc::clone(e));
        }
        q.flush();
        q.snapshot()
    }

    #[test]
    fn unmatched_reference_is_desync() {
        let snap = registry(&[]);
        let resolver = CollisionResolver::new(&snap, Tick::new(4));
        let err = resolver
            .resolve_collision(
                CollidableReference::Body(BodyHandle(0)),
                CollidableReference::Static(StaticHandle(0)),
            )
            .unwrap_err();
        assert_eq!(err.tick, Tick::new(4));
        assert_eq!(err.reference, CollidableReference::Body(BodyHandle(0)));
    }

    #[test]
    fn same_raw_value_does_not_cross_subtypes() {
        let body = Arc::new(PhysicsEntity::new_body(BodyHandle(5), ObjectId::INVALID));
        let snap = registry(&[body]);
        let resolver = CollisionResolver::new(&snap, Tick::default());
        assert!(resolver
            .resolve_collision(
                CollidableReference::Body(BodyHandle(5)),
                CollidableReference::Static(StaticHandle(5)),
            )
            .is_err());
    }

    #[test]
    fn failures_are_classified() {
        let a = Arc::new(PhysicsEntity::new_body(BodyHandle(0), ObjectId::INVALID));
        let b = Arc::new(PhysicsEntity::new_body(BodyHandle(1), ObjectId::INVALID));
        a.set_collision_callback(|_| Err(CallbackError::new("boom")));
        b.set_collision_callback(|_| panic!("kaboom"));
        let snap = registry(&[Arc::clone(&a), Arc::clone(&b)]);
        let resolver = CollisionResolver::new(&snap, Tick::default());
        let suppressed = resolver
            .resolve_collision(a.id().into(), b.id().into())
            .unwrap();
        assert!(!suppressed);
        let outcome = resolver.finish();
        assert_eq!(outcome.contacts, 1);
        assert_eq!(
            outcome.failures,
            vec![
                CallbackFailure {
                    entity: a.id(),
                    partner: b.id(),
                    kind: CallbackFailureKind::Returned(CallbackError::new("boom")),
                },
                CallbackFailure {
                    entity: EntityId::Body(BodyHandle(1)),
                    partner: EntityId::Body(BodyHandle(0)),
                    kind: CallbackFailureKind::Panicked("kaboom".into()),
                },
            ]
        );
    }
}
