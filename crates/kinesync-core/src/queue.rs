// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pending-mutation queue and the registry snapshots it produces.
//!
//! Producers record Add/Remove intents into a shared pending table at any
//! time. The live registry only changes inside [`PendingMutationQueue::flush`],
//! which publishes a fresh [`RegistrySnapshot`]. Snapshots handed out earlier
//! keep observing the registry as it stood when they were taken.

use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kinesync_backend::CollidableReference;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::entity::{EntityId, EntityKind, PhysicsEntity};

/// Operation waiting for the next flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingOp {
    /// Insert into the live registry.
    Add,
    /// Excise from the live registry.
    Remove,
}

#[derive(Debug)]
enum Pending {
    Add(Arc<PhysicsEntity>),
    Remove,
}

impl Pending {
    const fn op(&self) -> PendingOp {
        match self {
            Self::Add(_) => PendingOp::Add,
            Self::Remove => PendingOp::Remove,
        }
    }
}

#[derive(Debug)]
struct Queued {
    seq: u64,
    pending: Pending,
}

/// Outstanding requests, one per entity, remembering when each entity was
/// first requested.
#[derive(Debug, Default)]
struct PendingTable {
    entries: FxHashMap<EntityId, Queued>,
    next_seq: u64,
}

impl PendingTable {
    /// Records `pending` for `id`. A later request replaces the operation but
    /// keeps the entity's place in line. Returns the replaced operation.
    fn record(&mut self, id: EntityId, pending: Pending) -> Option<PendingOp> {
        match self.entries.entry(id) {
            Entry::Occupied(mut slot) => {
                Some(std::mem::replace(&mut slot.get_mut().pending, pending).op())
            }
            Entry::Vacant(slot) => {
                slot.insert(Queued {
                    seq: self.next_seq,
                    pending,
                });
                self.next_seq += 1;
                None
            }
        }
    }

    fn take(&mut self) -> FxHashMap<EntityId, Queued> {
        std::mem::take(&mut self.entries)
    }
}

#[derive(Debug, Default)]
struct Shared {
    table: Mutex<PendingTable>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PendingTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, entity: Arc<PhysicsEntity>) {
        let id = entity.id();
        let replaced = self.lock().record(id, Pending::Add(entity));
        if let Some(prev) = replaced {
            trace!(%id, replaced = ?prev, "pending add overwrote earlier request");
        }
    }

    fn remove(&self, id: EntityId) {
        let replaced = self.lock().record(id, Pending::Remove);
        if let Some(prev) = replaced {
            trace!(%id, replaced = ?prev, "pending remove overwrote earlier request");
        }
    }
}

/// Immutable view of the live registry for one tick.
///
/// Cloning is cheap (two `Arc` bumps). Iteration follows insertion order.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    entries: Arc<Vec<Arc<PhysicsEntity>>>,
    index: Arc<FxHashMap<EntityId, usize>>,
}

impl RegistrySnapshot {
    fn from_entries(entries: Vec<Arc<PhysicsEntity>>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id(), i))
            .collect();
        Self {
            entries: Arc::new(entries),
            index: Arc::new(index),
        }
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every live entity, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PhysicsEntity>> {
        self.entries.iter()
    }

    /// Live bodies, in insertion order.
    pub fn bodies(&self) -> impl Iterator<Item = &Arc<PhysicsEntity>> {
        self.of_kind(EntityKind::Body)
    }

    /// Live statics, in insertion order.
    pub fn statics(&self) -> impl Iterator<Item = &Arc<PhysicsEntity>> {
        self.of_kind(EntityKind::Static)
    }

    fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Arc<PhysicsEntity>> {
        self.entries.iter().filter(move |e| e.kind() == kind)
    }

    /// Looks up an entity by identity.
    pub fn get(&self, id: EntityId) -> Option<&Arc<PhysicsEntity>> {
        let slot = *self.index.get(&id)?;
        self.entries.get(slot)
    }

    /// Whether `id` is live in this snapshot.
    pub fn contains(&self, id: EntityId) -> bool {
        self.index.contains_key(&id)
    }

    /// Maps a backend collision reference to its entity.
    pub fn resolve(&self, reference: CollidableReference) -> Option<&Arc<PhysicsEntity>> {
        self.get(EntityId::from(reference))
    }
}

/// Counts of registry changes applied by one flush.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Entities inserted into the registry.
    pub added: usize,
    /// Entities excised from the registry.
    pub removed: usize,
    /// Pending entries that changed nothing (Add of a live entity, Remove of an
    /// absent one).
    pub ignored: usize,
}

impl FlushSummary {
    /// Whether the flush left the registry untouched.
    pub const fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Cloneable, thread-safe producer side of a [`PendingMutationQueue`].
#[derive(Debug, Clone)]
pub struct RegistrationHandle {
    shared: Arc<Shared>,
}

impl RegistrationHandle {
    /// Requests that `entity` join the registry at the next flush.
    pub fn register(&self, entity: Arc<PhysicsEntity>) {
        self.shared.add(entity);
    }

    /// Requests that `entity` leave the registry at the next flush.
    pub fn release(&self, entity: &PhysicsEntity) {
        self.shared.remove(entity.id());
    }
}

/// Live registry plus the pending-operation table feeding it.
#[derive(Debug, Default)]
pub struct PendingMutationQueue {
    shared: Arc<Shared>,
    live: RegistrySnapshot,
}

impl PendingMutationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a pending Add, replacing any earlier request for the entity.
    pub fn enqueue_add(&self, entity: Arc<PhysicsEntity>) {
        self.shared.add(entity);
    }

    /// Records a pending Remove, replacing any earlier request for the entity.
    pub fn enqueue_remove(&self, entity: &PhysicsEntity) {
        self.shared.remove(entity.id());
    }

    /// Producer handle sharing this queue's pending table.
    pub fn handle(&self) -> RegistrationHandle {
        RegistrationHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The registry as of the last flush.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.live.clone()
    }

    /// Number of entities with an outstanding operation.
    pub fn pending_len(&self) -> usize {
        self.shared.lock().entries.len()
    }

    /// Whether `id` has an outstanding operation.
    pub fn is_pending(&self, id: EntityId) -> bool {
        self.shared.lock().entries.contains_key(&id)
    }

    /// The outstanding operation for `id`, if any.
    pub fn pending_op(&self, id: EntityId) -> Option<PendingOp> {
        self.shared.lock().entries.get(&id).map(|q| q.pending.op())
    }

    /// Applies every pending operation to the live registry.
    ///
    /// The pending table is swapped out under its lock, so a concurrent
    /// producer's request lands either in this flush or entirely in the next.
    /// Entries apply in the order their entities were first requested since
    /// the last flush; added entities are appended.
    pub fn flush(&mut self) -> FlushSummary {
        let taken = self.shared.lock().take();
        let mut summary = FlushSummary::default();
        if taken.is_empty() {
            return summary;
        }
        let mut drained: Vec<(EntityId, Queued)> = taken.into_iter().collect();
        drained.sort_unstable_by_key(|(_, queued)| queued.seq);

        let mut entries: Vec<Arc<PhysicsEntity>> = self.live.entries.as_ref().clone();
        let mut present: FxHashMap<EntityId, usize> = self.live.index.as_ref().clone();
        let mut removed_any = false;

        for (id, queued) in drained {
            match queued.pending {
                Pending::Add(entity) => {
                    if present.contains_key(&id) {
                        summary.ignored += 1;
                    } else {
                        present.insert(id, entries.len());
                        entries.push(entity);
                        summary.added += 1;
                    }
                }
                Pending::Remove => {
                    if present.remove(&id).is_some() {
                        removed_any = true;
                        summary.removed += 1;
                    } else {
                        summary.ignored += 1;
                    }
                }
            }
        }

        if removed_any {
            entries.retain(|e| present.contains_key(&e.id()));
        }
        if !summary.is_noop() {
            self.live = RegistrySnapshot::from_entries(entries);
        }
        trace!(
            added = summary.added,
            removed = summary.removed,
            ignored = summary.ignored,
            live = self.live.len(),
            "pending mutations flushed"
        );
        summary
    }
}
