// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic math helpers covering linear algebra primitives,
//! quaternions, and timeline-friendly pseudo-random numbers.
//!
//! All operations round to `f32` to mirror the backend's float32 mode.

mod prng;
mod quat;
mod vec3;

pub use prng::Prng;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range using float32 rounding.
///
/// # Panics
/// Panics if `min > max`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.max(min).min(max)
}
