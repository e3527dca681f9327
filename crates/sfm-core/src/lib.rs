//! Core math and geometry primitives for `sfm-rs`.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Pt3`, ...),
//! - camera pose helpers for the `[R | t]` world-to-camera convention,
//! - deterministic synthetic observation generators used in tests and
//!   examples.
//!
//! The triangulation and epipolar algorithms built on these primitives live
//! in the `sfm-geom` crate.

/// Linear algebra type aliases and bearing/pose helpers.
pub mod math;
/// Deterministic synthetic observation generation.
pub mod synthetic;

pub use math::*;
