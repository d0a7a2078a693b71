// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for kinesync crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`backend`] - Scripted [`PhysicsBackend`](kinesync_backend::PhysicsBackend) fake
//! - [`callbacks`] - Collision-callback recorders
//! - [`config`] - In-memory config store fake for testing without filesystem
//! - [`fixtures`] - Body and static description builders

pub mod backend;
pub mod callbacks;
pub mod config;
pub mod fixtures;

pub use backend::ScriptedBackend;
pub use callbacks::{CallbackRecorder, Invocation};
pub use config::InMemoryConfigStore;
pub use fixtures::{floor, sphere_at, sphere_moving};
