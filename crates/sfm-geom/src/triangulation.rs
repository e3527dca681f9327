//! Gated multi-view triangulation of calibrated bearing observations.
//!
//! Both N-view solvers apply the same acceptance gate around different
//! linear cores: a pairwise parallax check before solving, then per-view
//! positive depth and per-view angular reprojection checks on the solution.
//! The gate, not the arithmetic, is what keeps degenerate geometry
//! (coincident centers, near-parallel rays) from producing numerically
//! plausible but meaningless points.

use log::debug;
use nalgebra::{DMatrix, Vector4};
use sfm_core::{angle_between_bearings, pose_rotate_to_world, Mat3, Mat34, Pt3, Real, Vec3};
use thiserror::Error;

/// Reject a dehomogenized DLT solution whose scale component is this small.
const HOMOGENEOUS_W_EPS: Real = 1e-12;
/// Relative singular-value floor below which a linear system counts as
/// rank-deficient.
const SINGULAR_RATIO_EPS: Real = 1e-10;
/// Determinant floor for the closed-form two-ray solve (parallel rays).
const TWO_VIEW_DET_EPS: Real = 1e-12;
/// Accepted deviation of an input bearing's norm from unit length.
const UNIT_NORM_TOL: Real = 1e-6;

/// Errors reserved for caller bugs.
///
/// Geometric rejection and numerical degeneracy are not errors; they are
/// reported through [`Triangulation::Rejected`].
#[derive(Debug, Error)]
pub enum TriangulationError {
    /// The N-view operations need at least two observations.
    #[error("need at least 2 views, got {0}")]
    TooFewViews(usize),
    /// Positionally paired inputs have different lengths.
    #[error("mismatched input lengths: expected {expected}, got {got}")]
    CountMismatch { expected: usize, got: usize },
    /// An input bearing is too far from unit length to renormalize silently.
    #[error("bearing {index} has norm {norm}, expected unit length")]
    NonUnitBearing { index: usize, norm: Real },
}

/// Outcome of a gated triangulation.
///
/// `Rejected` covers both geometric gate failures and numerical degeneracy;
/// callers are not expected to tell them apart, and no point is exposed on
/// rejection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Triangulation {
    /// The solution passed every acceptance gate.
    Accepted(Pt3),
    /// No usable point was produced.
    Rejected,
}

impl Triangulation {
    /// The accepted point, if any.
    pub fn point(self) -> Option<Pt3> {
        match self {
            Self::Accepted(point) => Some(point),
            Self::Rejected => None,
        }
    }

    /// Whether the solution passed the acceptance gate.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Validate bearing norms and renormalize the slight drift that survives
/// upstream normalization.
pub(crate) fn checked_unit_bearings(
    bearings: &[Vec3],
) -> Result<Vec<Vec3>, TriangulationError> {
    bearings
        .iter()
        .enumerate()
        .map(|(index, bearing)| {
            let norm = bearing.norm();
            if (norm - 1.0).abs() > UNIT_NORM_TOL {
                return Err(TriangulationError::NonUnitBearing { index, norm });
            }
            Ok(bearing / norm)
        })
        .collect()
}

/// True when at least one bearing pair subtends `min_angle` or more.
///
/// Short-circuits on the first qualifying pair.
fn has_sufficient_parallax(bearings_world: &[Vec3], min_angle: Real) -> bool {
    for i in 0..bearings_world.len() {
        for j in 0..i {
            if angle_between_bearings(&bearings_world[i], &bearings_world[j]) >= min_angle {
                return true;
            }
        }
    }
    false
}

/// N-view triangulation by the Direct Linear Transform.
///
/// `poses` are `[R | t]` world-to-camera matrices and `bearings` are unit
/// directions in each camera's own frame. The homogeneous world point is the
/// nullspace of the stacked cross-product constraints, extracted by SVD.
///
/// Acceptance requires, in order: a bearing pair with parallax of at least
/// `min_angle` (checked on world-frame rays `Rᵀ·b`), camera-frame depth of at
/// least `min_depth` in every view, and an angle between each observed
/// bearing and the reprojected direction of at most `threshold` radians.
/// Pass a negative `min_depth` to disable the depth constraint.
pub fn triangulate_bearings_dlt(
    poses: &[Mat34],
    bearings: &[Vec3],
    threshold: Real,
    min_angle: Real,
    min_depth: Real,
) -> Result<Triangulation, TriangulationError> {
    if poses.len() < 2 {
        return Err(TriangulationError::TooFewViews(poses.len()));
    }
    if poses.len() != bearings.len() {
        return Err(TriangulationError::CountMismatch {
            expected: poses.len(),
            got: bearings.len(),
        });
    }
    let bearings = checked_unit_bearings(bearings)?;

    let world_rays: Vec<Vec3> = poses
        .iter()
        .zip(&bearings)
        .map(|(pose, bearing)| pose_rotate_to_world(pose, bearing))
        .collect();
    if !has_sufficient_parallax(&world_rays, min_angle) {
        debug!("dlt: rejected, no bearing pair reaches parallax {min_angle}");
        return Ok(Triangulation::Rejected);
    }

    let homogeneous = match dlt_solve(poses, &bearings) {
        Some(solution) => solution,
        None => return Ok(Triangulation::Rejected),
    };
    let w = homogeneous[3];
    if w.abs() < HOMOGENEOUS_W_EPS || !homogeneous.iter().all(|v| v.is_finite()) {
        debug!("dlt: rejected, homogeneous solution has no finite dehomogenization");
        return Ok(Triangulation::Rejected);
    }
    let dehomogenized = homogeneous / w;
    let point = Pt3::new(dehomogenized[0], dehomogenized[1], dehomogenized[2]);

    for (view, (pose, bearing)) in poses.iter().zip(&bearings).enumerate() {
        let in_camera: Vec3 = pose * dehomogenized;
        if in_camera.z < min_depth {
            debug!("dlt: rejected, view {view} depth {} < {min_depth}", in_camera.z);
            return Ok(Triangulation::Rejected);
        }
        if angle_between_bearings(&in_camera, bearing) > threshold {
            debug!("dlt: rejected, view {view} reprojection exceeds {threshold}");
            return Ok(Triangulation::Rejected);
        }
    }

    Ok(Triangulation::Accepted(point))
}

/// Nullspace of the stacked DLT constraints, or `None` when the design
/// matrix does not pin down a unique homogeneous solution.
fn dlt_solve(poses: &[Mat34], bearings: &[Vec3]) -> Option<Vector4<Real>> {
    let mut design = DMatrix::<Real>::zeros(2 * poses.len(), 4);
    for (i, (pose, b)) in poses.iter().zip(bearings).enumerate() {
        design
            .row_mut(2 * i)
            .copy_from(&(b.x * pose.row(2) - b.z * pose.row(0)));
        design
            .row_mut(2 * i + 1)
            .copy_from(&(b.y * pose.row(2) - b.z * pose.row(1)));
    }

    let svd = design.svd(false, true);
    let v_t = svd.v_t?;
    // Rank below 3 leaves more than one nullspace direction, which happens
    // when coincident centers combine with parallel rays; there is no single
    // candidate to gate.
    if svd.singular_values[2] < SINGULAR_RATIO_EPS * svd.singular_values[0] {
        debug!("dlt: rejected, design matrix is rank-deficient");
        return None;
    }

    let nullvector = v_t.row(v_t.nrows() - 1);
    Some(Vector4::new(
        nullvector[0],
        nullvector[1],
        nullvector[2],
        nullvector[3],
    ))
}

/// N-view triangulation by the least-squares closest point to a ray bundle.
///
/// `centers` are camera optical centers and `bearings` unit directions in
/// the **world** frame. `thresholds` holds one per-view reprojection bound
/// in radians, or a single value broadcast to every view.
///
/// The acceptance gate mirrors [`triangulate_bearings_dlt`], with depth
/// measured as the signed ray parameter `(X - cᵢ)·Bᵢ`. When every center
/// coincides and `min_depth` is negative, the solve is well conditioned for
/// bearings spanning distinct directions and the common center itself is
/// returned as the accepted point.
pub fn triangulate_bearings_midpoint(
    centers: &[Pt3],
    bearings: &[Vec3],
    thresholds: &[Real],
    min_angle: Real,
    min_depth: Real,
) -> Result<Triangulation, TriangulationError> {
    if centers.len() < 2 {
        return Err(TriangulationError::TooFewViews(centers.len()));
    }
    if centers.len() != bearings.len() {
        return Err(TriangulationError::CountMismatch {
            expected: centers.len(),
            got: bearings.len(),
        });
    }
    if thresholds.len() != centers.len() && thresholds.len() != 1 {
        return Err(TriangulationError::CountMismatch {
            expected: centers.len(),
            got: thresholds.len(),
        });
    }
    let bearings = checked_unit_bearings(bearings)?;

    if !has_sufficient_parallax(&bearings, min_angle) {
        debug!("midpoint: rejected, no bearing pair reaches parallax {min_angle}");
        return Ok(Triangulation::Rejected);
    }

    let point = match midpoint_solve(centers, &bearings, None) {
        Some(point) => point,
        None => {
            debug!("midpoint: rejected, normal system is singular");
            return Ok(Triangulation::Rejected);
        }
    };

    for (view, (center, bearing)) in centers.iter().zip(&bearings).enumerate() {
        let ray = point - center;
        let depth = ray.dot(bearing);
        if depth < min_depth {
            debug!("midpoint: rejected, view {view} depth {depth} < {min_depth}");
            return Ok(Triangulation::Rejected);
        }
        let threshold = thresholds[if thresholds.len() == 1 { 0 } else { view }];
        // A vanished ray (point at the center) has no direction to compare;
        // the depth gate owns that case.
        if angle_between_bearings(&ray, bearing) > threshold {
            debug!("midpoint: rejected, view {view} reprojection exceeds {threshold}");
            return Ok(Triangulation::Rejected);
        }
    }

    Ok(Triangulation::Accepted(point))
}

/// Solve the midpoint normal system `Σ wᵢ(I - BᵢBᵢᵀ)·X = Σ wᵢ(I - BᵢBᵢᵀ)·cᵢ`.
///
/// Weights default to one. Returns `None` when the system is rank-deficient,
/// which happens when all rays are parallel.
pub(crate) fn midpoint_solve(
    centers: &[Pt3],
    bearings: &[Vec3],
    weights: Option<&[Real]>,
) -> Option<Pt3> {
    let mut normal = Mat3::zeros();
    let mut rhs = Vec3::zeros();
    for (i, (center, bearing)) in centers.iter().zip(bearings).enumerate() {
        let weight = weights.map_or(1.0, |w| w[i]);
        let b = *bearing;
        let projector = Mat3::identity() - b * b.transpose();
        normal += weight * projector;
        rhs += weight * (projector * center.coords);
    }

    let svd = normal.svd(true, true);
    if svd.singular_values[2] < SINGULAR_RATIO_EPS * svd.singular_values[0] {
        return None;
    }
    svd.solve(&rhs, 0.0).ok().map(Pt3::from)
}

/// Closed-form midpoint of the two rays `(origin1, bearing1)` and
/// `(origin2, bearing2)`.
///
/// Returns the midpoint together with the ray parameters `(s, r)` of the
/// mutually closest points `origin1 + s·bearing1` and `origin2 + r·bearing2`,
/// or `None` when the rays are parallel. Signs of `s` and `r` encode the
/// cheirality of the intersection; callers that require positive depth check
/// them.
pub fn triangulate_two_bearings_midpoint(
    origin1: &Pt3,
    bearing1: &Vec3,
    origin2: &Pt3,
    bearing2: &Vec3,
) -> Option<(Pt3, Real, Real)> {
    let baseline = origin2 - origin1;
    let b11 = bearing1.dot(bearing1);
    let b12 = bearing1.dot(bearing2);
    let b22 = bearing2.dot(bearing2);
    let det = b12 * b12 - b11 * b22;
    if det.abs() < TWO_VIEW_DET_EPS {
        return None;
    }

    let r1 = baseline.dot(bearing1);
    let r2 = baseline.dot(bearing2);
    let s = (b12 * r2 - b22 * r1) / det;
    let r = (b11 * r2 - b12 * r1) / det;

    let on_first = origin1 + s * bearing1;
    let on_second = origin2 + r * bearing2;
    let midpoint = Pt3::from((on_first.coords + on_second.coords) * 0.5);
    Some((midpoint, s, r))
}

/// Batched two-view midpoint over correspondences sharing one relative pose.
///
/// `bearings1` are unit directions in the first camera's frame, `bearings2`
/// in the second's; the pose maps frame-2 points into frame 1 as
/// `X₁ = R·X₂ + t`. Each row is solved in closed form with the first camera
/// at the origin; a row is accepted when both ray parameters are positive
/// (the point lies in front of both cameras). Returned points are in the
/// first camera's frame.
///
/// No reprojection or parallax gate is applied here; compose with
/// [`epipolar_angle_two_bearings_many`](crate::epipolar_angle_two_bearings_many)
/// when correspondence consistency matters.
pub fn triangulate_two_bearings_midpoint_many(
    bearings1: &[Vec3],
    bearings2: &[Vec3],
    rotation: &Mat3,
    translation: &Vec3,
) -> Result<Vec<Triangulation>, TriangulationError> {
    if bearings1.len() != bearings2.len() {
        return Err(TriangulationError::CountMismatch {
            expected: bearings1.len(),
            got: bearings2.len(),
        });
    }
    let bearings1 = checked_unit_bearings(bearings1)?;
    let bearings2 = checked_unit_bearings(bearings2)?;

    let origin1 = Pt3::origin();
    let origin2 = Pt3::from(*translation);
    Ok(bearings1
        .iter()
        .zip(&bearings2)
        .map(|(b1, b2)| {
            let rotated = rotation * b2;
            match triangulate_two_bearings_midpoint(&origin1, b1, &origin2, &rotated) {
                Some((point, s, r)) if s > 0.0 && r > 0.0 => Triangulation::Accepted(point),
                _ => Triangulation::Rejected,
            }
        })
        .collect())
}
