//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental scalar and matrix types used
//! throughout the library, together with small helpers for the
//! `[R | t]` world-to-camera pose convention shared by all solvers.

use nalgebra::{Matrix3, Matrix3x4, Point3, Vector3};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 3×4 camera pose matrix `[R | t]` mapping world points into a camera frame.
pub type Mat34 = Matrix3x4<Real>;

/// Unsigned angle between two direction vectors, in radians.
///
/// The vectors need not be unit length. Degenerate (near-zero) inputs map to
/// an angle of zero so that callers can treat a vanished direction as
/// trivially aligned.
pub fn angle_between_bearings(u: &Vec3, v: &Vec3) -> Real {
    let denom = u.norm() * v.norm();
    if denom <= Real::EPSILON {
        return 0.0;
    }
    (u.dot(v) / denom).clamp(-1.0, 1.0).acos()
}

/// Build the pose `[R | -R·c]` of a camera with rotation `R` and optical
/// center `c` in world coordinates.
pub fn pose_from_parts(rotation: &Mat3, center: &Pt3) -> Mat34 {
    let mut pose = Mat34::zeros();
    pose.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    pose.set_column(3, &-(rotation * center.coords));
    pose
}

/// Recover the optical center `-Rᵀ·t` of a pose `[R | t]`.
pub fn pose_center(pose: &Mat34) -> Pt3 {
    let rotation = pose.fixed_view::<3, 3>(0, 0);
    let translation = pose.column(3);
    Pt3::from(-(rotation.transpose() * translation))
}

/// Rotate a camera-frame direction into the world frame (`Rᵀ·b`).
pub fn pose_rotate_to_world(pose: &Mat34, bearing: &Vec3) -> Vec3 {
    pose.fixed_view::<3, 3>(0, 0).transpose() * bearing
}
