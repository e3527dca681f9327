//! Iteratively reweighted refinement of a triangulated point.

use sfm_core::{Pt3, Real, Vec3};

use crate::triangulation::{checked_unit_bearings, midpoint_solve, TriangulationError};

/// Floor applied to per-ray residuals before inversion into weights.
const WEIGHT_FLOOR: Real = 1e-12;
/// Stop iterating once an update moves the point less than this.
const CONVERGENCE_TOL: Real = 1e-12;

/// Refine a point against a bundle of rays by iteratively reweighted least
/// squares.
///
/// Each iteration weights every observation by the inverse of its current
/// perpendicular distance to the ray `(centers[i], bearings[i])` (clamped at
/// a small floor) and re-solves the midpoint normal system. Iteration stops
/// after `max_iterations` rounds, or earlier once the update stalls or the
/// reweighted system turns singular.
///
/// Unlike the gated triangulators this always returns a point; validating
/// the result is the caller's responsibility.
pub fn point_refinement(
    centers: &[Pt3],
    bearings: &[Vec3],
    initial: &Pt3,
    max_iterations: u32,
) -> Result<Pt3, TriangulationError> {
    if centers.len() < 2 {
        return Err(TriangulationError::TooFewViews(centers.len()));
    }
    if centers.len() != bearings.len() {
        return Err(TriangulationError::CountMismatch {
            expected: centers.len(),
            got: bearings.len(),
        });
    }
    let bearings = checked_unit_bearings(bearings)?;

    let mut point = *initial;
    let mut weights = vec![0.0; centers.len()];
    for _ in 0..max_iterations {
        for ((weight, center), bearing) in weights.iter_mut().zip(centers).zip(&bearings) {
            let offset = point - center;
            let residual = (offset - bearing.dot(&offset) * bearing).norm();
            *weight = residual.max(WEIGHT_FLOOR).recip();
        }

        let Some(next) = midpoint_solve(centers, &bearings, Some(&weights)) else {
            break;
        };
        let step = (next - point).norm();
        point = next;
        if step < CONVERGENCE_TOL {
            break;
        }
    }

    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refinement_restores_exact_intersection() {
        let truth = Pt3::new(0.0, 0.0, 1.0);
        let centers = [Pt3::origin(), Pt3::new(1.0, 0.0, 0.0)];
        let bearings: Vec<Vec3> = centers.iter().map(|c| (truth - c).normalize()).collect();

        let initial = truth + Vec3::new(0.1, 0.2, 0.3);
        let refined = point_refinement(&centers, &bearings, &initial, 10).unwrap();
        assert!((refined - truth).norm() < 1e-6);
    }

    #[test]
    fn refinement_checks_input_lengths() {
        let centers = [Pt3::origin(), Pt3::new(1.0, 0.0, 0.0)];
        let bearings = [Vec3::new(0.0, 0.0, 1.0)];
        let result = point_refinement(&centers, &bearings, &Pt3::origin(), 5);
        assert!(matches!(
            result,
            Err(TriangulationError::CountMismatch {
                expected: 2,
                got: 1
            })
        ));
    }
}
