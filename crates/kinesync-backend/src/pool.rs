// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Memory arena backing the reference simulation's collidable storage.
//!
//! Freed slots are recycled LIFO so slot assignment is a pure function of the
//! insert/remove sequence. Slots are never exposed as handles: handles are
//! issued monotonically by the simulation and mapped onto slots.

use crate::simulation::{BodyRecord, StaticRecord};

/// Slot arena with a deterministic free list.
#[derive(Debug, Clone)]
pub(crate) struct Slab<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Default for Slab<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Slab<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> usize {
        self.len += 1;
        if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(value);
            return slot;
        }
        self.slots.push(Some(value));
        self.slots.len() - 1
    }

    pub(crate) fn remove(&mut self, slot: usize) -> Option<T> {
        let value = self.slots.get_mut(slot)?.take()?;
        self.free.push(slot);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn get(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot)?.as_mut()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(Option::as_mut)
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.len = 0;
    }
}

/// Arena owning every static and body record of one simulation.
///
/// The driver owns the pool together with the simulation; disposing the
/// simulation clears the pool in the same call.
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    pub(crate) bodies: Slab<BodyRecord>,
    pub(crate) statics: Slab<StaticRecord>,
}

impl BufferPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool with room for `bodies` bodies and `statics` statics.
    pub fn with_capacity(bodies: usize, statics: usize) -> Self {
        Self {
            bodies: Slab::with_capacity(bodies),
            statics: Slab::with_capacity(statics),
        }
    }

    /// Number of live records (bodies plus statics).
    pub const fn allocated(&self) -> usize {
        self.bodies.len() + self.statics.len()
    }

    /// Number of slots ever reserved (live or free).
    pub fn reserved(&self) -> usize {
        self.bodies.capacity() + self.statics.capacity()
    }

    /// Drops every record and releases the free lists.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.statics.clear();
    }
}
