//! Geometric triangulation core for calibrated structure-from-motion.
//!
//! Given unit bearing observations of an unknown scene point from cameras
//! with known poses, the solvers in this crate recover the point's world
//! position and gate the result against geometric degeneracies:
//!
//! - [`triangulate_bearings_dlt`]: N-view algebraic (DLT) triangulation from
//!   `[R | t]` poses and camera-frame bearings.
//! - [`triangulate_bearings_midpoint`]: N-view least-squares closest point to
//!   a bundle of rays, from centers and world-frame bearings.
//! - [`triangulate_two_bearings_midpoint`] and
//!   [`triangulate_two_bearings_midpoint_many`]: closed-form two-ray midpoint,
//!   single pair or batched over correspondences sharing one relative pose.
//! - [`epipolar_angle_two_bearings_many`]: pairwise epipolar angular residual
//!   between two bearing sets.
//! - [`point_refinement`]: iteratively reweighted refinement of an initial
//!   point estimate.
//!
//! Angular thresholds (`threshold`, `min_angle`) are radians throughout.
//! Geometric gate failures and numerical degeneracies are reported as
//! [`Triangulation::Rejected`], never as errors; [`TriangulationError`] is
//! reserved for caller bugs such as mismatched input lengths.

mod epipolar;
mod refinement;
mod triangulation;

pub use epipolar::epipolar_angle_two_bearings_many;
pub use refinement::point_refinement;
pub use triangulation::{
    triangulate_bearings_dlt, triangulate_bearings_midpoint, triangulate_two_bearings_midpoint,
    triangulate_two_bearings_midpoint_many, Triangulation, TriangulationError,
};
