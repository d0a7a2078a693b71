// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Physics entities: typed wrappers around backend handles.

use core::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use kinesync_backend::{BackendError, BodyHandle, CollidableReference, PhysicsBackend, StaticHandle};
use thiserror::Error;

use crate::object_id::ObjectId;

/// Subtype discriminator for a [`PhysicsEntity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// Immovable collidable.
    Static,
    /// Dynamic rigid body.
    Body,
}

/// Identity of a physics entity: the subtype together with its handle.
///
/// Static and body handles are issued from independent spaces, so the raw
/// handle value alone never identifies an entity. Orders statics first, then
/// bodies, each by handle value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityId {
    /// A static collidable.
    Static(StaticHandle),
    /// A dynamic body.
    Body(BodyHandle),
}

impl EntityId {
    /// Subtype of the entity.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Static(_) => EntityKind::Static,
            Self::Body(_) => EntityKind::Body,
        }
    }

    /// Raw handle value within the subtype's space.
    pub const fn raw(self) -> u32 {
        match self {
            Self::Static(h) => h.0,
            Self::Body(h) => h.0,
        }
    }
}

impl From<CollidableReference> for EntityId {
    fn from(value: CollidableReference) -> Self {
        match value {
            CollidableReference::Static(h) => Self::Static(h),
            CollidableReference::Body(h) => Self::Body(h),
        }
    }
}

impl From<EntityId> for CollidableReference {
    fn from(value: EntityId) -> Self {
        match value {
            EntityId::Static(h) => Self::Static(h),
            EntityId::Body(h) => Self::Body(h),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&CollidableReference::from(*self), f)
    }
}

/// Error a collision callback may return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates an error carrying `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message supplied by the callback.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Collision callback: invoked with the partner entity.
pub type CollisionCallback =
    Arc<dyn Fn(&PhysicsEntity) -> Result<(), CallbackError> + Send + Sync + 'static>;

/// One collidable known to the backend, optionally owned by a game object.
///
/// Entities are shared as `Arc<PhysicsEntity>` between the game-object layer
/// and the registry. The callback slot is interior-mutable so owners can
/// install or replace it at any time; the driver clones the callback out of
/// the slot before invoking it.
pub struct PhysicsEntity {
    id: EntityId,
    owner: ObjectId,
    callback: RwLock<Option<CollisionCallback>>,
}

impl PhysicsEntity {
    /// Wraps an existing static handle.
    pub fn new_static(handle: StaticHandle, owner: ObjectId) -> Self {
        Self::new(EntityId::Static(handle), owner)
    }

    /// Wraps an existing body handle.
    pub fn new_body(handle: BodyHandle, owner: ObjectId) -> Self {
        Self::new(EntityId::Body(handle), owner)
    }

    fn new(id: EntityId, owner: ObjectId) -> Self {
        Self {
            id,
            owner,
            callback: RwLock::new(None),
        }
    }

    /// Identity of this entity.
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Subtype of this entity.
    pub const fn kind(&self) -> EntityKind {
        self.id.kind()
    }

    /// Game object owning this entity.
    pub const fn owner(&self) -> ObjectId {
        self.owner
    }

    /// The body handle, if this entity is a body.
    pub const fn body_handle(&self) -> Option<BodyHandle> {
        match self.id {
            EntityId::Body(h) => Some(h),
            EntityId::Static(_) => None,
        }
    }

    /// The static handle, if this entity is a static.
    pub const fn static_handle(&self) -> Option<StaticHandle> {
        match self.id {
            EntityId::Static(h) => Some(h),
            EntityId::Body(_) => None,
        }
    }

    /// Whether the backend still holds this entity's handle.
    pub fn is_alive<B: PhysicsBackend + ?Sized>(&self, backend: &B) -> bool {
        match self.id {
            EntityId::Static(h) => backend.static_exists(h),
            EntityId::Body(h) => backend.body_exists(h),
        }
    }

    /// Sleep-candidate flag of a live body. `None` for statics and dead bodies.
    pub fn sleep_candidate<B: PhysicsBackend + ?Sized>(&self, backend: &B) -> Option<bool> {
        let handle = self.body_handle()?;
        backend
            .body_exists(handle)
            .then(|| backend.sleep_candidate(handle))
    }

    /// Writes the sleep-candidate flag of a body through its handle.
    pub fn set_sleep_candidate<B: PhysicsBackend + ?Sized>(
        &self,
        backend: &mut B,
        candidate: bool,
    ) -> Result<(), BackendError> {
        match self.id {
            EntityId::Body(h) => backend.set_sleep_candidate(h, candidate),
            EntityId::Static(h) => Err(BackendError::UnknownStatic(h)),
        }
    }

    /// Installs (or replaces) the collision callback.
    pub fn set_collision_callback<F>(&self, callback: F)
    where
        F: Fn(&PhysicsEntity) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let mut slot = self.callback.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Arc::new(callback));
    }

    /// Removes the collision callback.
    pub fn clear_collision_callback(&self) {
        let mut slot = self.callback.write().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }

    /// Whether a collision callback is installed.
    pub fn has_collision_callback(&self) -> bool {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn collision_callback(&self) -> Option<CollisionCallback> {
        self.callback
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl fmt::Debug for PhysicsEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsEntity")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("callback", &self.has_collision_callback())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesync_backend::{BodyDescription, Shape, Simulation};
    use kinesync_geom::Pose;

    #[test]
    fn identity_includes_subtype() {
        let s = EntityId::Static(StaticHandle(3));
        let b = EntityId::Body(BodyHandle(3));
        assert_ne!(s, b);
        assert_eq!(s.raw(), b.raw());
        assert!(s < b);
        assert_eq!(s.to_string(), "static:3");
        assert_eq!(b.to_string(), "body:3");
    }

    #[test]
    fn handle_accessors_match_subtype() {
        let s = PhysicsEntity::new_static(StaticHandle(3), ObjectId::INVALID);
        assert_eq!(s.static_handle(), Some(StaticHandle(3)));
        assert_eq!(s.body_handle(), None);
        let b = PhysicsEntity::new_body(BodyHandle(3), ObjectId::INVALID);
        assert_eq!(b.body_handle(), Some(BodyHandle(3)));
        assert_eq!(b.static_handle(), None);
    }

    #[test]
    fn liveness_follows_backend() {
        let mut sim = Simulation::default();
        let handle = sim
            .add_body(BodyDescription::new(Pose::identity(), Shape::sphere(1.0)))
            .unwrap();
        let entity = PhysicsEntity::new_body(handle, ObjectId::INVALID);
        assert!(entity.is_alive(&sim));
        assert_eq!(entity.sleep_candidate(&sim), Some(false));
        entity.set_sleep_candidate(&mut sim, true).unwrap();
        assert_eq!(entity.sleep_candidate(&sim), Some(true));

        sim.remove_body(handle);
        assert!(!entity.is_alive(&sim));
        assert_eq!(entity.sleep_candidate(&sim), None);
    }

    #[test]
    fn callback_slot_can_be_replaced_and_cleared() {
        let entity = PhysicsEntity::new_static(StaticHandle(0), ObjectId::new(9));
        assert!(!entity.has_collision_callback());
        entity.set_collision_callback(|_| Ok(()));
        assert!(entity.has_collision_callback());
        entity.set_collision_callback(|_| Err(CallbackError::new("nope")));
        let cb = entity.collision_callback().unwrap();
        assert_eq!(cb(&entity), Err(CallbackError::new("nope")));
        entity.clear_collision_callback();
        assert!(entity.collision_callback().is_none());
    }
}
