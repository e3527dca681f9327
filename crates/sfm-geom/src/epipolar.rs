//! Pairwise epipolar consistency scoring between two bearing sets.

use nalgebra::DMatrix;
use sfm_core::{Mat3, Real, Vec3};

/// Epipolar-plane normals shorter than this mean the bearing is collinear
/// with the baseline and the residual is defined as zero.
const DEGENERATE_NORMAL_EPS: Real = 1e-12;

/// Pairwise epipolar angular residuals between two bearing sets.
///
/// `bearings1` (length N) are unit directions in the first camera's frame,
/// `bearings2` (length M) in the second's; the relative pose maps frame-2
/// points into frame 1 as `X₁ = R·X₂ + t`. Entry `(i, j)` of the returned
/// N×M matrix is the out-of-plane angle `|asin(B1ᵢ · n̂)|`, where `n̂` is the
/// unit normal of the epipolar plane spanned by the baseline `t` and the
/// rotated bearing `R·B2ⱼ`.
///
/// Matched correspondences score near zero; bearings of distinct scene
/// points score strictly positive. Entries for second-view bearings
/// collinear with the baseline are zero.
pub fn epipolar_angle_two_bearings_many(
    bearings1: &[Vec3],
    bearings2: &[Vec3],
    rotation: &Mat3,
    translation: &Vec3,
) -> DMatrix<Real> {
    let mut angles = DMatrix::<Real>::zeros(bearings1.len(), bearings2.len());
    for (j, bearing2) in bearings2.iter().enumerate() {
        let in_first = rotation * bearing2;
        let normal = translation.cross(&in_first);
        let norm = normal.norm();
        if norm < DEGENERATE_NORMAL_EPS {
            // Collinear with the baseline: the column stays zero.
            continue;
        }
        let normal = normal / norm;
        for (i, bearing1) in bearings1.iter().enumerate() {
            angles[(i, j)] = bearing1.dot(&normal).clamp(-1.0, 1.0).asin().abs();
        }
    }
    angles
}

#[cfg(test)]
mod tests {
    use super::*;
    use sfm_core::Pt3;

    #[test]
    fn matched_bearing_lies_in_epipolar_plane() {
        let truth = Pt3::new(0.3, -0.2, 2.0);
        let rotation = Mat3::identity();
        let translation = Vec3::new(1.0, 0.0, 0.0);

        let bearing1 = truth.coords.normalize();
        let bearing2 = (truth.coords - translation).normalize();

        let angles =
            epipolar_angle_two_bearings_many(&[bearing1], &[bearing2], &rotation, &translation);
        assert_eq!(angles.shape(), (1, 1));
        assert!(angles[(0, 0)] < 1e-12);
    }

    #[test]
    fn baseline_collinear_bearing_scores_zero() {
        let rotation = Mat3::identity();
        let translation = Vec3::new(1.0, 0.0, 0.0);

        let off_plane = Vec3::new(0.0, 1.0, 0.0);
        let collinear = Vec3::new(1.0, 0.0, 0.0);

        let angles =
            epipolar_angle_two_bearings_many(&[off_plane], &[collinear], &rotation, &translation);
        assert_eq!(angles[(0, 0)], 0.0);
    }

    #[test]
    fn mismatched_bearing_scores_positive() {
        let rotation = Mat3::identity();
        let translation = Vec3::new(1.0, 0.0, 0.0);

        let point_a = Pt3::new(0.0, 0.0, 1.0);
        let point_b = Pt3::new(1.0, 2.0, 3.0);
        let bearing1 = point_a.coords.normalize();
        let bearing2 = (point_b.coords - translation).normalize();

        let angles =
            epipolar_angle_two_bearings_many(&[bearing1], &[bearing2], &rotation, &translation);
        assert!(angles[(0, 0)] > 1e-6);
    }
}
