// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]

use std::future;
use std::sync::Arc;

use kinesync_backend::CollidableReference;
use kinesync_core::{ObjectId, SimulationDriver};
use kinesync_dry_tests::{sphere_at, CallbackRecorder, ScriptedBackend};
use kinesync_geom::Vec3;
use kinesync_sched::Scheduler;

#[tokio::test]
async fn runs_the_tick_budget_then_stops() {
    let mut sched = Scheduler::new(SimulationDriver::new(ScriptedBackend::new()), 1)
        .with_max_ticks(5)
        .with_log_every(2);
    let summary = sched.run(future::pending()).await.unwrap();
    assert_eq!(summary.ticks, 5);
    assert_eq!(sched.driver().tick().index(), 5);
    let dts = sched.driver().backend().timesteps();
    assert_eq!(dts.len(), 5);
    assert!(dts.iter().all(|dt| (*dt - 0.001).abs() < 1e-6));
}

#[tokio::test]
async fn ready_shutdown_stops_before_the_first_tick() {
    let mut sched = Scheduler::new(SimulationDriver::new(ScriptedBackend::new()), 1);
    let summary = sched.run(future::ready(())).await.unwrap();
    assert_eq!(summary.ticks, 0);
}

#[tokio::test]
async fn runs_resume_where_the_last_one_stopped() {
    let mut sched = Scheduler::new(SimulationDriver::new(ScriptedBackend::new()), 1)
        .with_max_ticks(3);
    sched.run(future::pending()).await.unwrap();
    assert!(sched.driver_mut().flush().is_noop());
    sched.run(future::pending()).await.unwrap();
    assert_eq!(sched.driver().tick().index(), 6);
}

#[tokio::test]
async fn spawner_tasks_register_while_running() {
    let mut driver = SimulationDriver::default();
    let entities: Vec<_> = (0..6)
        .map(|i| {
            driver
                .create_body(
                    sphere_at(Vec3::new(i as f32 * 5.0, 0.0, 0.0), 0.5),
                    ObjectId::INVALID,
                )
                .unwrap()
        })
        .collect();
    let mut sched = Scheduler::new(driver, 1).with_max_ticks(20);

    let handle = sched.handle();
    let spawned = entities.clone();
    let spawner = tokio::spawn(async move {
        for entity in spawned {
            handle.register(entity);
            tokio::task::yield_now().await;
        }
    });
    spawner.await.unwrap();
    sched.run(future::pending()).await.unwrap();

    assert_eq!(sched.driver().live_count(), entities.len());
}

#[tokio::test]
async fn desync_ends_the_run_with_an_error() {
    let mut driver = SimulationDriver::new(ScriptedBackend::new());
    let rec = CallbackRecorder::new();
    let known = driver
        .create_body(sphere_at(Vec3::ZERO, 1.0), ObjectId::INVALID)
        .unwrap();
    let unknown = driver
        .create_body(sphere_at(Vec3::UNIT_X, 1.0), ObjectId::INVALID)
        .unwrap();
    rec.attach(&known);
    driver.register(Arc::clone(&known));
    driver.flush();
    driver.backend_mut().push_step(std::iter::empty());
    driver.backend_mut().push_step([(
        CollidableReference::from(known.id()),
        CollidableReference::from(unknown.id()),
    )]);

    let mut sched = Scheduler::new(driver, 1).with_max_ticks(10);
    let err = sched.run(future::pending()).await.unwrap_err();
    assert!(err.to_string().contains("tick #1"), "{err:#}");
    assert_eq!(sched.driver().tick().index(), 1);
    assert_eq!(rec.count(), 0);
}
