// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry primitives for kinesync.

This crate provides:
- Deterministic `f32` math (`Vec3`, `Quat`) and a seedable `Prng`.
- Rigid poses (`Pose`) and axis-aligned bounding boxes (`Aabb`).
- Discrete simulation ticks (`Tick`).
- A minimal broad-phase trait and an all-pairs reference implementation.

Design notes:
- Deterministic: no ambient RNG; ordering of pair outputs is canonical.
- Float32 throughout; operations favor clarity and reproducibility.
"]

/// Broad-phase pairing over keyed AABB proxies.
pub mod broad;
/// Deterministic math helpers (vectors, quaternions, PRNG).
pub mod math;
/// Discrete simulation ticks.
pub mod tick;
/// Foundational geometric types.
pub mod types;

pub use broad::{AabbTree, BroadPhase};
pub use math::{Prng, Quat, Vec3};
pub use tick::Tick;
pub use types::aabb::Aabb;
pub use types::pose::Pose;
