//! Deterministic synthetic observation generation.
//!
//! This module provides small, reusable building blocks for constructing
//! synthetic triangulation problems used in tests and examples:
//! - exact bearings from camera centers toward a ground-truth point,
//! - axis-aligned pose rigs (identity rotation, `[I | -c]`),
//! - two-view bearing pairs under a known relative pose,
//! - deterministic pseudo-random bearing noise.
//!
//! The helpers are intentionally lightweight and deterministic (explicit
//! seeds; stable point ordering), so fixtures built from them are identical
//! across platforms and runs.
//!
//! # Example
//!
//! ```
//! use sfm_core::synthetic::{axis_aligned_poses, bearings_toward, UniformBearingNoise};
//! use sfm_core::Pt3;
//!
//! let centers = vec![Pt3::origin(), Pt3::new(1.0, 0.0, 0.0)];
//! let truth = Pt3::new(0.0, 0.0, 1.0);
//!
//! let bearings = bearings_toward(&truth, &centers);
//! let poses = axis_aligned_poses(&centers);
//! let noisy = UniformBearingNoise { seed: 1, max_abs: 1e-3 }.perturb_bearings(&bearings);
//!
//! assert_eq!(poses.len(), centers.len());
//! assert_eq!(noisy.len(), bearings.len());
//! ```

use crate::math::{pose_from_parts, Mat3, Mat34, Pt3, Vec3};

pub mod noise;

pub use noise::UniformBearingNoise;

/// Exact unit bearings from each camera center toward a single world point.
pub fn bearings_toward(point: &Pt3, centers: &[Pt3]) -> Vec<Vec3> {
    centers.iter().map(|c| (point - c).normalize()).collect()
}

/// Poses `[I | -c]` for cameras with identity rotation at the given centers.
pub fn axis_aligned_poses(centers: &[Pt3]) -> Vec<Mat34> {
    let identity = Mat3::identity();
    centers
        .iter()
        .map(|c| pose_from_parts(&identity, c))
        .collect()
}

/// Two-view bearing pairs for world points seen from a camera at the origin
/// and a second camera at `translation` with rotation `rotation`.
///
/// The relative pose maps frame-2 points into frame 1 as `X₁ = R·X₂ + t`;
/// the returned bearings are expressed in each camera's own frame.
pub fn two_view_bearings(
    points: &[Pt3],
    rotation: &Mat3,
    translation: &Vec3,
) -> (Vec<Vec3>, Vec<Vec3>) {
    let first = points.iter().map(|p| p.coords.normalize()).collect();
    let second = points
        .iter()
        .map(|p| (rotation.transpose() * (p.coords - translation)).normalize())
        .collect();
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::pose_center;

    #[test]
    fn bearings_point_at_target() {
        let truth = Pt3::new(0.0, 0.0, 1.0);
        let centers = vec![Pt3::origin(), Pt3::new(1.0, 0.0, 0.0)];
        let bearings = bearings_toward(&truth, &centers);

        for (bearing, center) in bearings.iter().zip(&centers) {
            assert!((bearing.norm() - 1.0).abs() < 1e-12);
            let along = center + bearing * (truth - center).norm();
            assert!((along - truth).norm() < 1e-12);
        }
    }

    #[test]
    fn axis_aligned_poses_keep_centers() {
        let centers = vec![Pt3::new(0.2, -0.1, 0.4), Pt3::new(-1.0, 0.0, 2.0)];
        for (pose, center) in axis_aligned_poses(&centers).iter().zip(&centers) {
            assert!((pose_center(pose) - center).norm() < 1e-12);
        }
    }

    #[test]
    fn two_view_bearings_are_consistent() {
        let rotation = Mat3::identity();
        let translation = Vec3::new(1.0, 0.0, 0.0);
        let points = vec![Pt3::new(0.0, 0.0, 2.0)];
        let (first, second) = two_view_bearings(&points, &rotation, &translation);

        // Both rays, re-expressed in frame 1, must meet at the point.
        let meet = points[0].coords;
        assert!((first[0] - meet.normalize()).norm() < 1e-12);
        assert!((rotation * second[0] - (meet - translation).normalize()).norm() < 1e-12);
    }
}
