// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision-callback recorders.

use std::sync::{Arc, Mutex, MutexGuard};

use kinesync_core::{CallbackError, EntityId, ObjectId, PhysicsEntity};

/// One recorded collision-callback invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    /// Entity whose callback ran.
    pub entity: EntityId,
    /// Partner it was invoked with.
    pub partner: EntityId,
    /// Owner of the partner.
    pub partner_owner: ObjectId,
}

/// Shared log of collision-callback invocations.
///
/// Clones share the log. Each `attach*` method installs a callback on an
/// entity that appends to the log before doing anything else, so failing and
/// panicking callbacks are recorded too.
#[derive(Debug, Clone, Default)]
pub struct CallbackRecorder {
    log: Arc<Mutex<Vec<Invocation>>>,
}

impl CallbackRecorder {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Invocation>> {
        self.log.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, entity: EntityId, partner: &PhysicsEntity) {
        self.lock().push(Invocation {
            entity,
            partner: partner.id(),
            partner_owner: partner.owner(),
        });
    }

    /// Installs a recording callback that succeeds.
    pub fn attach(&self, entity: &PhysicsEntity) {
        let rec = self.clone();
        let id = entity.id();
        entity.set_collision_callback(move |partner| {
            rec.record(id, partner);
            Ok(())
        });
    }

    /// Installs a recording callback that returns `CallbackError(message)`.
    pub fn attach_failing(&self, entity: &PhysicsEntity, message: &str) {
        let rec = self.clone();
        let id = entity.id();
        let message = message.to_owned();
        entity.set_collision_callback(move |partner| {
            rec.record(id, partner);
            Err(CallbackError::new(message.clone()))
        });
    }

    /// Installs a recording callback that panics with `message`.
    #[allow(clippy::panic)]
    pub fn attach_panicking(&self, entity: &PhysicsEntity, message: &'static str) {
        let rec = self.clone();
        let id = entity.id();
        entity.set_collision_callback(move |partner| {
            rec.record(id, partner);
            panic!("{message}");
        });
    }

    /// Every invocation so far, in call order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.lock().clone()
    }

    /// Invocations of `entity`'s callback.
    pub fn invocations_of(&self, entity: EntityId) -> Vec<Invocation> {
        self.lock()
            .iter()
            .filter(|inv| inv.entity == entity)
            .copied()
            .collect()
    }

    /// Total number of invocations.
    pub fn count(&self) -> usize {
        self.lock().len()
    }

    /// Forgets every recorded invocation.
    pub fn clear(&self) {
        self.lock().clear();
    }
}
