// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Core geometry types used by the backend (pose, AABB).
//!
//! Determinism notes:
//! - Overlap semantics are inclusive on faces to avoid pair churn on contact
//!   boundaries.
//! - Affine math uses `f32` without fused multiply-add.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Rigid poses (position + orientation)."]
pub mod pose;
