// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Seeded demo population.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use kinesync_backend::{BodyDescription, PhysicsBackend, Shape};
use kinesync_config::PopulationPrefs;
use kinesync_core::{
    DriverConfig, FlushSummary, ObjectIdFlags, ObjectIdGenerator, PhysicsEntity, SimulationDriver,
};
use kinesync_geom::{Pose, Prng, Vec3};
use kinesync_sched::Scheduler;
use tracing::{debug, info};

const FLOOR_THICKNESS: f32 = 1.0;
/// Placement tries per sphere before giving up on the spawn area.
const PLACEMENT_ATTEMPTS: u32 = 64;
/// Extra clearance between spawned spheres, in metres.
const SPAWN_GAP: f32 = 0.05;

/// Entities created for the demo, not yet registered.
pub struct Population {
    pub entities: Vec<Arc<PhysicsEntity>>,
    pub contacts: Arc<AtomicU64>,
}

/// Driver settings used when no `driver` document is saved.
pub fn driver_config() -> DriverConfig {
    DriverConfig {
        gravity: [0.0, -9.81, 0.0],
        linear_damping: 0.05,
        ..DriverConfig::default()
    }
}

/// Picks `prefs.bodies` sphere centres with no two spheres touching.
fn spawn_points(prefs: &PopulationPrefs, rng: &mut Prng) -> Result<Vec<Vec3>> {
    let min_gap = prefs.radius.mul_add(2.0, SPAWN_GAP);
    let mut points: Vec<Vec3> = Vec::new();
    for n in 0..prefs.bodies {
        let placed = (0..PLACEMENT_ATTEMPTS).find_map(|_| {
            let candidate = Vec3::new(
                rng.next_f32_range(-prefs.spread, prefs.spread),
                rng.next_f32_range(prefs.radius * 2.0, prefs.spread + 2.0),
                rng.next_f32_range(-prefs.spread, prefs.spread),
            );
            points
                .iter()
                .all(|p| p.sub(&candidate).length() >= min_gap)
                .then_some(candidate)
        });
        let Some(point) = placed else {
            bail!(
                "no room for sphere {n} of {}: spread {} is too small for radius {}",
                prefs.bodies,
                prefs.spread,
                prefs.radius
            );
        };
        points.push(point);
    }
    Ok(points)
}

/// Creates the floor and the dropped spheres described by `prefs`.
pub fn build<B: PhysicsBackend>(
    driver: &mut SimulationDriver<B>,
    prefs: &PopulationPrefs,
    seed: u64,
) -> Result<Population> {
    let mut rng = Prng::from_seed_u64(seed);
    let mut ids = ObjectIdGenerator::from_seed(seed);
    let contacts = Arc::new(AtomicU64::new(0));
    let mut entities = Vec::new();

    if prefs.floor {
        let half = prefs.radius.mul_add(4.0, prefs.spread);
        let floor = driver.create_static(
            Pose::at(Vec3::new(0.0, -FLOOR_THICKNESS * 0.5, 0.0)),
            Shape::cuboid(half * 2.0, FLOOR_THICKNESS, half * 2.0),
            ids.standalone(),
        )?;
        entities.push(floor);
    }

    for center in spawn_points(prefs, &mut rng)? {
        let owner = ids.flagged(ObjectIdFlags::SPAWNED);
        let entity = driver.create_body(
            BodyDescription::new(Pose::at(center), Shape::sphere(prefs.radius)),
            owner,
        )?;
        let counter = Arc::clone(&contacts);
        entity.set_collision_callback(move |partner| {
            counter.fetch_add(1, Ordering::Relaxed);
            debug!(%owner, partner = %partner.owner(), "contact");
            Ok(())
        });
        entities.push(entity);
    }

    info!(
        bodies = prefs.bodies,
        floor = prefs.floor,
        seed,
        "demo population created"
    );
    Ok(Population { entities, contacts })
}

/// Registers `entities` from a spawner task, then commits them so the first
/// scheduled tick already resolves contacts between them.
pub async fn spawn_and_commit<B>(
    scheduler: &mut Scheduler<B>,
    entities: Vec<Arc<PhysicsEntity>>,
) -> Result<FlushSummary>
where
    B: PhysicsBackend,
{
    let handle = scheduler.handle();
    let spawner = tokio::spawn(async move {
        for entity in entities {
            handle.register(entity);
        }
    });
    spawner.await.context("spawner task failed")?;
    let committed = scheduler.driver_mut().flush();
    info!(added = committed.added, "demo population registered");
    Ok(committed)
}

#[cfg(test)]
mod tests {
    use std::future;

    use super::*;

    #[test]
    fn spawned_spheres_never_overlap() {
        let prefs = PopulationPrefs::default();
        for seed in 1..=8 {
            let points = spawn_points(&prefs, &mut Prng::from_seed_u64(seed)).unwrap();
            assert_eq!(points.len(), prefs.bodies as usize);
            for (i, a) in points.iter().enumerate() {
                for b in &points[i + 1..] {
                    assert!(a.sub(b).length() >= prefs.radius * 2.0, "seed {seed}");
                }
            }
        }
    }

    #[test]
    fn crowded_spawn_area_is_an_error() {
        let prefs = PopulationPrefs {
            bodies: 50,
            radius: 1.0,
            spread: 0.5,
            floor: false,
        };
        let err = spawn_points(&prefs, &mut Prng::from_seed_u64(1)).unwrap_err();
        assert!(err.to_string().contains("no room"), "{err}");
    }

    #[tokio::test]
    async fn demo_population_runs_without_desync() {
        for seed in 1..=8 {
            let mut driver = SimulationDriver::from_config(&driver_config());
            let population = build(&mut driver, &PopulationPrefs::default(), seed).unwrap();
            let expected = population.entities.len();
            let mut scheduler = Scheduler::new(driver, 1).with_max_ticks(5);

            let committed = spawn_and_commit(&mut scheduler, population.entities)
                .await
                .unwrap();
            assert_eq!(committed.added, expected);
            let summary = scheduler.run(future::pending()).await.unwrap();
            assert_eq!(summary.ticks, 5, "seed {seed}");

            // Two and a half simulated seconds: every sphere reaches the floor.
            let mut driver = scheduler.into_driver();
            for _ in 0..150 {
                let report = driver.step(16.0).unwrap();
                assert!(report.failures.is_empty());
            }
            assert_eq!(driver.live_count(), expected);
            assert!(population.contacts.load(Ordering::Relaxed) > 0, "seed {seed}");
        }
    }
}
