// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! kinesync daemon (kinesyncd)
//!
//! Loads saved prefs, builds a seeded demo scene, and runs the simulation
//! driver on a fixed tick until the tick budget is spent or Ctrl-C arrives.
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kinesync_config::{ConfigService, ConfigStore, DaemonPrefs, FsConfigStore};
use kinesync_core::{DriverConfig, SimulationDriver};
use kinesync_sched::Scheduler;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

mod demo;

const DRIVER_KEY: &str = "driver";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Milliseconds between ticks (overrides saved prefs)
    #[clap(short, long)]
    tick_interval: Option<u64>,

    /// Stop after this many ticks; 0 runs until Ctrl-C (overrides saved prefs)
    #[clap(short = 'n', long)]
    max_ticks: Option<u64>,

    /// Seed for object ids and placement (overrides saved prefs)
    #[clap(long)]
    seed: Option<u64>,

    /// Number of demo bodies (overrides saved prefs)
    #[clap(short, long)]
    bodies: Option<u32>,

    /// Directory holding `daemon.json` and `driver.json`
    #[clap(long)]
    config_dir: Option<PathBuf>,

    /// Persist the effective prefs before running
    #[clap(long)]
    save_prefs: bool,

    /// Maximum log level
    #[clap(long, default_value_t = Level::INFO)]
    log_level: Level,
}

/// Loads saved prefs, applies command-line overrides, and saves the result
/// when `--save-prefs` is set.
fn load_settings<S: ConfigStore>(
    config: &ConfigService<S>,
    args: &Args,
) -> Result<(DaemonPrefs, DriverConfig)> {
    let mut prefs: DaemonPrefs = config
        .load_or_default(DaemonPrefs::KEY)
        .context("loading daemon prefs")?;
    let driver_config = config
        .load::<DriverConfig>(DRIVER_KEY)
        .context("loading driver config")?
        .unwrap_or_else(demo::driver_config);

    if let Some(ms) = args.tick_interval {
        prefs.tick_interval_ms = ms;
    }
    if let Some(n) = args.max_ticks {
        prefs.max_ticks = n;
    }
    if let Some(seed) = args.seed {
        prefs.seed = seed;
    }
    if let Some(bodies) = args.bodies {
        prefs.population.bodies = bodies;
    }
    if args.save_prefs {
        config
            .save(DaemonPrefs::KEY, &prefs)
            .context("saving daemon prefs")?;
        config
            .save(DRIVER_KEY, &driver_config)
            .context("saving driver config")?;
        info!("prefs saved");
    }
    Ok((prefs, driver_config))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    info!("Starting kinesync daemon (kinesyncd)...");

    let store = match &args.config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
    .context("opening config store")?;
    info!(dir = %store.base().display(), "config store ready");
    let config = ConfigService::new(store);

    let (prefs, driver_config) = load_settings(&config, &args)?;
    info!(
        tick_interval_ms = prefs.tick_interval_ms,
        max_ticks = prefs.max_ticks,
        seed = prefs.seed,
        "prefs loaded"
    );

    let mut driver = SimulationDriver::from_config(&driver_config);
    let population = demo::build(&mut driver, &prefs.population, prefs.seed)?;

    let mut scheduler =
        Scheduler::new(driver, prefs.tick_interval_ms).with_max_ticks(prefs.max_ticks);

    let contacts = Arc::clone(&population.contacts);
    demo::spawn_and_commit(&mut scheduler, population.entities).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    let outcome = scheduler.run(shutdown).await;

    let driver = scheduler.into_driver();
    let live = driver.live_count();
    driver.teardown();

    match outcome {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                contacts = summary.contacts,
                callback_contacts = contacts.load(Ordering::Relaxed),
                callback_failures = summary.callback_failures,
                live,
                "kinesync daemon finished"
            );
            Ok(())
        }
        Err(e) => {
            error!("simulation stopped: {e:#}");
            Err(e)
        }
    }
}
