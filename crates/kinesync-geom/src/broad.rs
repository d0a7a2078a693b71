// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Broad-phase interfaces and a minimal reference implementation.
//!
//! Determinism contract (applies to all implementations used here):
//! - Pair identity is canonicalized as `(min_id, max_id)`.
//! - The emitted pair list is strictly sorted lexicographically by that tuple.
//! - Overlap is inclusive on faces (touching AABBs are considered overlapping).

use crate::types::aabb::Aabb;
use std::collections::BTreeMap;

/// Broad-phase interface for inserting proxies and querying overlapping pairs.
///
/// Implementations must return pairs deterministically: the pair `(a, b)` is
/// canonicalized such that `a < b`, and the full list is sorted ascending.
pub trait BroadPhase<K: Ord + Copy> {
    /// Inserts or updates the proxy with the given `id` and `aabb`.
    fn upsert(&mut self, id: K, aabb: Aabb);
    /// Removes a proxy if present.
    fn remove(&mut self, id: K);
    /// Removes every proxy.
    fn clear(&mut self);
    /// Returns a canonical, deterministically-ordered list of overlapping pairs.
    fn pairs(&self) -> Vec<(K, K)>;
}

/// A minimal AABB-based broad-phase using an `O(n^2)` all-pairs sweep.
///
/// Serves as the correctness and determinism baseline: canonical pair
/// identity and ordering, inclusive face overlap.
#[derive(Debug, Clone)]
pub struct AabbTree<K: Ord + Copy> {
    items: BTreeMap<K, Aabb>,
}

impl<K: Ord + Copy> Default for AabbTree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Copy> AabbTree<K> {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Number of proxies currently tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when no proxies are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<K: Ord + Copy> BroadPhase<K> for AabbTree<K> {
    fn upsert(&mut self, id: K, aabb: Aabb) {
        self.items.insert(id, aabb);
    }

    fn remove(&mut self, id: K) {
        self.items.remove(&id);
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn pairs(&self) -> Vec<(K, K)> {
        // BTreeMap iteration is already sorted by key, so every emitted pair
        // is canonical and the outer/inner loop order yields a sorted list.
        let items: Vec<(K, Aabb)> = self.items.iter().map(|(id, aabb)| (*id, *aabb)).collect();
        let mut out: Vec<(K, K)> = Vec::new();
        for (i, (a_id, a_bb)) in items.iter().enumerate() {
            for (b_id, b_bb) in items.iter().skip(i + 1) {
                if a_bb.overlaps(b_bb) {
                    out.push((*a_id, *b_id));
                }
            }
        }
        out
    }
}
