// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Model check of the pending-mutation queue against a plain reference model.

use std::sync::Arc;

use kinesync_backend::{BodyHandle, StaticHandle};
use kinesync_core::{EntityId, ObjectId, PendingMutationQueue, PhysicsEntity};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(EntityId),
    Remove(EntityId),
    Flush,
}

fn entity_id() -> impl Strategy<Value = EntityId> {
    prop_oneof![
        (0u32..4).prop_map(|n| EntityId::Static(StaticHandle(n))),
        (0u32..4).prop_map(|n| EntityId::Body(BodyHandle(n))),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => entity_id().prop_map(Op::Add),
        2 => entity_id().prop_map(Op::Remove),
        1 => Just(Op::Flush),
    ]
}

fn make(id: EntityId) -> Arc<PhysicsEntity> {
    Arc::new(match id {
        EntityId::Static(h) => PhysicsEntity::new_static(h, ObjectId::INVALID),
        EntityId::Body(h) => PhysicsEntity::new_body(h, ObjectId::INVALID),
    })
}

/// Pending requests in first-request order; a repeat overwrites in place.
#[derive(Default)]
struct Model {
    pending: Vec<(EntityId, bool)>,
    live: Vec<EntityId>,
}

impl Model {
    fn request(&mut self, id: EntityId, add: bool) {
        match self.pending.iter_mut().find(|(p, _)| *p == id) {
            Some(slot) => slot.1 = add,
            None => self.pending.push((id, add)),
        }
    }

    fn flush(&mut self) {
        for (id, add) in std::mem::take(&mut self.pending) {
            let present = self.live.contains(&id);
            if add && !present {
                self.live.push(id);
            } else if !add && present {
                self.live.retain(|x| *x != id);
            }
        }
    }
}

proptest! {
    #[test]
    fn queue_matches_model(ops in proptest::collection::vec(op(), 0..64)) {
        let mut queue = PendingMutationQueue::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Add(id) => {
                    queue.enqueue_add(make(id));
                    model.request(id, true);
                }
                Op::Remove(id) => {
                    queue.enqueue_remove(&make(id));
                    model.request(id, false);
                }
                Op::Flush => {
                    let before = queue.snapshot();
                    let before_ids: Vec<EntityId> = before.iter().map(|e| e.id()).collect();
                    queue.flush();
                    model.flush();
                    // Snapshots taken earlier never change.
                    let still: Vec<EntityId> = before.iter().map(|e| e.id()).collect();
                    prop_assert_eq!(still, before_ids);
                }
            }
            prop_assert_eq!(queue.pending_len(), model.pending.len());
            let live: Vec<EntityId> = queue.snapshot().iter().map(|e| e.id()).collect();
            prop_assert_eq!(&live, &model.live);
        }

        let live = queue.snapshot();
        let mut seen = std::collections::BTreeSet::new();
        for e in live.iter() {
            prop_assert!(seen.insert(e.id()), "duplicate {}", e.id());
        }
        prop_assert_eq!(live.bodies().count() + live.statics().count(), live.len());
    }
}
