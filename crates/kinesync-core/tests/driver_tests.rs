// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs)]
//! Driver semantics against the scripted backend fake.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use kinesync_backend::{BodyHandle, CollidableReference, PhysicsBackend, Shape, StaticHandle};
use kinesync_core::{
    CallbackFailureKind, CallbackError, EntityId, FlushSummary, ObjectId, PendingOp,
    PhysicsEntity, SimulationDriver, SimulationError,
};
use kinesync_dry_tests::{sphere_at, CallbackRecorder, ScriptedBackend};
use kinesync_geom::{Pose, Tick, Vec3};

type Driver = SimulationDriver<ScriptedBackend>;

fn body(driver: &mut Driver, owner: u64) -> Arc<PhysicsEntity> {
    driver
        .create_body(sphere_at(Vec3::ZERO, 1.0), ObjectId::new(owner))
        .unwrap()
}

fn reference(entity: &PhysicsEntity) -> CollidableReference {
    entity.id().into()
}

#[test]
fn empty_flush_leaves_registry_unchanged() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let a = body(&mut driver, 1);
    driver.register(Arc::clone(&a));
    driver.flush();
    let before: Vec<EntityId> = driver.snapshot().iter().map(|e| e.id()).collect();

    assert_eq!(driver.flush(), FlushSummary::default());
    let after: Vec<EntityId> = driver.snapshot().iter().map(|e| e.id()).collect();
    assert_eq!(before, after);
}

#[test]
fn register_then_release_before_flush_never_appears() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let a = body(&mut driver, 1);
    driver.register(Arc::clone(&a));
    driver.release(&a);
    assert_eq!(driver.queue().pending_op(a.id()), Some(PendingOp::Remove));

    let report = driver.step(16.0).unwrap();
    assert_eq!(report.flushed.added, 0);
    assert!(!driver.snapshot().contains(a.id()));
    assert_eq!(driver.live_count(), 0);
}

#[test]
fn registration_becomes_visible_the_tick_after() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let a = body(&mut driver, 1);
    let handle = a.body_handle().unwrap();
    driver.backend_mut().put_to_sleep(handle);

    driver.register(Arc::clone(&a));
    let first = driver.step(16.0).unwrap();
    assert_eq!(first.woken, 0, "pending entity must not be in the wake pass");
    assert!(!driver.backend().is_awake(handle));
    assert_eq!(first.flushed.added, 1);
    assert!(driver.snapshot().contains(a.id()));

    let second = driver.step(16.0).unwrap();
    assert_eq!(second.woken, 1);
    assert!(driver.backend().is_awake(handle));
}

#[test]
fn pending_entity_is_absent_from_collision_resolution() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let live = body(&mut driver, 1);
    let late = body(&mut driver, 2);
    driver.register(Arc::clone(&live));
    driver.flush();

    driver.register(Arc::clone(&late));
    driver
        .backend_mut()
        .push_step([(reference(&live), reference(&late))]);
    let err = driver.step(16.0).unwrap_err();
    assert_eq!(
        err,
        SimulationError::Desync(kinesync_core::DesyncError {
            tick: Tick::new(0),
            reference: reference(&late),
        })
    );
    // Abandoned tick: nothing flushed, counter unchanged.
    assert!(driver.queue().is_pending(late.id()));
    assert_eq!(driver.tick(), Tick::new(0));

    driver.flush();
    driver
        .backend_mut()
        .push_step([(reference(&live), reference(&late))]);
    let report = driver.step(16.0).unwrap();
    assert_eq!(report.contacts, 1);
}

#[test]
fn stale_bodies_are_excised_and_skip_the_wake_pass() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let a = body(&mut driver, 1);
    let b = body(&mut driver, 2);
    driver.register(Arc::clone(&a));
    driver.register(Arc::clone(&b));
    driver.flush();

    assert!(driver.backend_mut().remove_body(a.body_handle().unwrap()));
    driver.backend_mut().put_to_sleep(b.body_handle().unwrap());
    let report = driver.step(16.0).unwrap();
    assert_eq!(report.stale, 1);
    assert_eq!(report.woken, 1);
    assert_eq!(driver.backend().awakened(), 1);
    assert_eq!(report.flushed.removed, 1);
    assert!(!driver.snapshot().contains(a.id()));
    assert!(driver.snapshot().contains(b.id()));
    assert!(!a.is_alive(driver.backend()));
    assert_eq!(driver.body_pose(&a), None);
    assert_eq!(driver.body_velocity(&a), None);
}

#[test]
fn contact_fans_out_to_both_callbacks_once() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let rec = CallbackRecorder::new();
    let a = body(&mut driver, 11);
    let b = body(&mut driver, 22);
    rec.attach(&a);
    rec.attach(&b);
    driver.register(Arc::clone(&a));
    driver.register(Arc::clone(&b));
    driver.flush();

    driver.backend_mut().push_step([(reference(&a), reference(&b))]);
    let report = driver.step(16.0).unwrap();
    assert!(report.is_clean());
    assert_eq!(report.contacts, 1);

    let of_a = rec.invocations_of(a.id());
    let of_b = rec.invocations_of(b.id());
    assert_eq!(of_a.len(), 1);
    assert_eq!(of_b.len(), 1);
    assert_eq!(of_a[0].partner, b.id());
    assert_eq!(of_a[0].partner_owner, ObjectId::new(22));
    assert_eq!(of_b[0].partner, a.id());
    assert_eq!(of_b[0].partner_owner, ObjectId::new(11));
}

#[test]
fn failing_callbacks_do_not_stop_the_tick() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let rec = CallbackRecorder::new();
    let entities: Vec<_> = (0..4).map(|i| body(&mut driver, i)).collect();
    rec.attach_failing(&entities[0], "refused");
    rec.attach(&entities[1]);
    rec.attach_panicking(&entities[2], "exploded");
    rec.attach(&entities[3]);
    for e in &entities {
        driver.register(Arc::clone(e));
    }
    driver.flush();

    driver.backend_mut().push_step([
        (reference(&entities[0]), reference(&entities[1])),
        (reference(&entities[2]), reference(&entities[3])),
    ]);
    let report = driver.step(16.0).unwrap();
    assert_eq!(report.contacts, 2);
    assert_eq!(rec.count(), 4);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].entity, entities[0].id());
    assert_eq!(report.failures[0].partner, entities[1].id());
    assert_eq!(
        report.failures[0].kind,
        CallbackFailureKind::Returned(CallbackError::new("refused"))
    );
    assert_eq!(report.failures[1].entity, entities[2].id());
    assert_eq!(
        report.failures[1].kind,
        CallbackFailureKind::Panicked("exploded".into())
    );
    assert_eq!(driver.tick(), Tick::new(1));
}

#[test]
fn unmatched_reference_is_a_desync_never_a_guess() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let rec = CallbackRecorder::new();
    let b = body(&mut driver, 1);
    rec.attach(&b);
    driver.register(Arc::clone(&b));
    driver.flush();

    // A static sharing the body's raw handle value must not resolve to it.
    let ghost = CollidableReference::Static(StaticHandle(b.id().raw()));
    driver.backend_mut().push_step([(ghost, reference(&b))]);
    let err = driver.step(16.0).unwrap_err();
    assert!(matches!(
        err,
        SimulationError::Desync(d) if d.reference == ghost
    ));
    assert_eq!(rec.count(), 0);
}

#[test]
fn delta_is_converted_to_seconds() {
    let mut driver = Driver::new(ScriptedBackend::new());
    driver.step(16.6).unwrap();
    driver.step(0.0).unwrap();
    let dts = driver.backend().timesteps();
    assert!((dts[0] - 0.0166).abs() < 1e-6);
    assert!(dts[1].abs() < f32::EPSILON);
}

#[test]
fn invalid_deltas_are_rejected_before_touching_the_backend() {
    let mut driver = Driver::new(ScriptedBackend::new());
    for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -1.0] {
        let err = driver.step(bad).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidDelta(_)));
    }
    assert!(driver.backend().timesteps().is_empty());
    assert_eq!(driver.tick(), Tick::new(0));
}

#[test]
fn registered_bodies_are_kept_awake() {
    let mut driver = Driver::new(ScriptedBackend::new().with_eager_sleep());
    let kept = body(&mut driver, 1);
    let loose = body(&mut driver, 2);
    driver.register(Arc::clone(&kept));
    driver.flush();

    for _ in 0..5 {
        driver.step(16.0).unwrap();
        assert!(driver.backend().is_awake(kept.body_handle().unwrap()));
    }
    assert!(!driver.backend().is_awake(loose.body_handle().unwrap()));
    assert_eq!(kept.sleep_candidate(driver.backend()), Some(true));
}

#[test]
fn direct_resolution_uses_current_registry() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let rec = CallbackRecorder::new();
    let s = driver
        .create_static(Pose::identity(), Shape::sphere(1.0), ObjectId::INVALID)
        .unwrap();
    let b = body(&mut driver, 1);
    rec.attach_failing(&s, "static says no");
    rec.attach(&b);
    driver.register(Arc::clone(&s));
    driver.register(Arc::clone(&b));

    assert!(driver
        .resolve_collision(reference(&s), reference(&b))
        .is_err());
    driver.flush();
    let failures = driver
        .resolve_collision(reference(&s), reference(&b))
        .unwrap();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].entity, s.id());
    assert_eq!(rec.count(), 2);
}

#[test]
fn teardown_and_drop_dispose_the_backend() {
    let backend = ScriptedBackend::new();
    let probe = backend.dispose_probe();
    let driver = Driver::new(backend);
    driver.teardown();
    assert!(probe.load(Ordering::SeqCst) >= 1);

    let backend = ScriptedBackend::new();
    let probe = backend.dispose_probe();
    {
        let _driver = Driver::new(backend);
    }
    assert_eq!(probe.load(Ordering::SeqCst), 1);
}

#[test]
fn body_reads_are_liveness_checked() {
    let mut driver = Driver::new(ScriptedBackend::new());
    let b = driver
        .create_body(
            sphere_at(Vec3::new(1.0, 2.0, 3.0), 0.5).with_velocity(Vec3::UNIT_X),
            ObjectId::INVALID,
        )
        .unwrap();
    assert_eq!(
        driver.body_pose(&b).map(|p| p.position()),
        Some(Vec3::new(1.0, 2.0, 3.0))
    );
    assert_eq!(driver.body_velocity(&b), Some(Vec3::UNIT_X));

    let s = driver
        .create_static(Pose::identity(), Shape::sphere(1.0), ObjectId::INVALID)
        .unwrap();
    assert_eq!(driver.body_pose(&s), None);
    assert!(driver.backend_mut().remove_body(BodyHandle(0)));
    assert_eq!(driver.body_pose(&b), None);
}
