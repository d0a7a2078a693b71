// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene builders shared by the kinesync benchmarks.

use std::sync::Arc;

use kinesync_core::{DriverConfig, ObjectIdFlags, ObjectIdGenerator, PhysicsEntity, SimulationDriver};
use kinesync_dry_tests::{floor, sphere_at};
use kinesync_geom::{Prng, Vec3};

/// Driver holding a floor and `n` registered spheres scattered above it.
///
/// Placement is seeded, so every call with the same `n` and `seed` builds the
/// same scene.
pub fn scattered_scene(n: usize, seed: u64) -> SimulationDriver {
    let config = DriverConfig {
        gravity: [0.0, -9.81, 0.0],
        body_capacity: n,
        ..DriverConfig::default()
    };
    let mut driver = SimulationDriver::from_config(&config);
    let mut rng = Prng::from_seed_u64(seed);
    let mut ids = ObjectIdGenerator::from_seed(seed);
    let spread = (n as f32).sqrt().max(1.0) * 1.5;

    let (pose, shape) = floor(0.0, spread + 2.0);
    if let Ok(ground) = driver.create_static(pose, shape, ids.standalone()) {
        driver.register(ground);
    }
    for _ in 0..n {
        let center = Vec3::new(
            rng.next_f32_range(-spread, spread),
            rng.next_f32_range(1.0, 6.0),
            rng.next_f32_range(-spread, spread),
        );
        let owner = ids.flagged(ObjectIdFlags::SPAWNED);
        if let Ok(entity) = driver.create_body(sphere_at(center, 0.4), owner) {
            entity.set_collision_callback(|_| Ok(()));
            driver.register(entity);
        }
    }
    driver.flush();
    driver
}

/// `n` body entities with synthetic handles, never touching a backend.
pub fn detached_bodies(n: u32) -> Vec<Arc<PhysicsEntity>> {
    (0..n)
        .map(|i| {
            Arc::new(PhysicsEntity::new_body(
                kinesync_backend::BodyHandle(i),
                kinesync_core::ObjectId::INVALID,
            ))
        })
        .collect()
}
