// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Configuration services for kinesync (storage port, JSON service,
//! filesystem store, daemon prefs).

pub mod config;
pub mod fs;
pub mod prefs;

pub use config::{ConfigError, ConfigService, ConfigStore};
pub use fs::FsConfigStore;
pub use prefs::{DaemonPrefs, PopulationPrefs};
