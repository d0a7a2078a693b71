// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use std::sync::Arc;
use std::thread;

use kinesync_core::{ObjectId, PhysicsEntity, SimulationDriver};
use kinesync_dry_tests::sphere_at;
use kinesync_geom::Vec3;

const PRODUCERS: usize = 4;
const PER_PRODUCER: usize = 16;

#[test]
fn registrations_from_many_threads_all_land() {
    let mut driver = SimulationDriver::default();
    let mut batches: Vec<Vec<Arc<PhysicsEntity>>> = Vec::new();
    for p in 0..PRODUCERS {
        let mut batch = Vec::new();
        for i in 0..PER_PRODUCER {
            // Spread far apart so no contact ever involves an unregistered body.
            let x = ((p * PER_PRODUCER + i) as f32) * 10.0;
            let entity = driver
                .create_body(sphere_at(Vec3::new(x, 0.0, 0.0), 0.5), ObjectId::INVALID)
                .unwrap();
            batch.push(entity);
        }
        batches.push(batch);
    }

    thread::scope(|scope| {
        for batch in &batches {
            let handle = driver.handle();
            scope.spawn(move || {
                for entity in batch {
                    handle.register(Arc::clone(entity));
                    thread::yield_now();
                }
            });
        }
        for _ in 0..8 {
            driver.step(16.0).unwrap();
        }
    });

    driver.step(16.0).unwrap();
    assert_eq!(driver.live_count(), PRODUCERS * PER_PRODUCER);
    assert_eq!(driver.queue().pending_len(), 0);
    for entity in batches.iter().flatten() {
        assert!(driver.snapshot().contains(entity.id()));
    }
}

#[test]
fn release_from_another_thread_lands_at_next_flush() {
    let mut driver = SimulationDriver::default();
    let entity = driver
        .create_body(sphere_at(Vec3::ZERO, 0.5), ObjectId::INVALID)
        .unwrap();
    driver.register(Arc::clone(&entity));
    driver.flush();

    let handle = driver.handle();
    let remote = Arc::clone(&entity);
    thread::spawn(move || handle.release(&remote)).join().unwrap();

    assert!(driver.snapshot().contains(entity.id()));
    let report = driver.step(16.0).unwrap();
    assert_eq!(report.flushed.removed, 1);
    assert!(!driver.snapshot().contains(entity.id()));
}
