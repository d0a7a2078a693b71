// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

use crate::handle::{BodyHandle, StaticHandle};

/// Errors reported by backend operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    /// The body handle does not exist (never issued or already removed).
    #[error("unknown body handle {0}")]
    UnknownBody(BodyHandle),
    /// The static handle does not exist (never issued or already removed).
    #[error("unknown static handle {0}")]
    UnknownStatic(StaticHandle),
    /// Shape dimensions must be finite and strictly positive.
    #[error("invalid shape: {0}")]
    InvalidShape(String),
    /// Body mass must be finite and strictly positive.
    #[error("invalid mass: {0}")]
    InvalidMass(f32),
    /// Pose or velocity contained NaN or infinity.
    #[error("non-finite {0}")]
    NonFinite(&'static str),
    /// The simulation has been disposed and accepts no new collidables.
    #[error("simulation disposed")]
    Disposed,
}
