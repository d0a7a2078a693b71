// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Saved preferences for the kinesync daemon.

use serde::{Deserialize, Serialize};

/// Daemon preferences, stored under [`DaemonPrefs::KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonPrefs {
    /// Milliseconds between ticks.
    pub tick_interval_ms: u64,
    /// Seed for object ids and demo placement.
    pub seed: u64,
    /// Stop after this many ticks; `0` runs until interrupted.
    pub max_ticks: u64,
    /// Demo population spawned at startup.
    pub population: PopulationPrefs,
}

impl DaemonPrefs {
    /// Store key for the daemon prefs document.
    pub const KEY: &'static str = "daemon";
}

impl Default for DaemonPrefs {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            seed: 0x6b69_6e65,
            max_ticks: 600,
            population: PopulationPrefs::default(),
        }
    }
}

/// Shape of the demo population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationPrefs {
    /// Dynamic spheres dropped above the floor.
    pub bodies: u32,
    /// Sphere radius in metres.
    pub radius: f32,
    /// Half-width of the square spawn area in metres.
    pub spread: f32,
    /// Whether to create a static floor box.
    pub floor: bool,
}

impl Default for PopulationPrefs {
    fn default() -> Self {
        Self {
            bodies: 32,
            radius: 0.5,
            spread: 8.0,
            floor: true,
        }
    }
}
