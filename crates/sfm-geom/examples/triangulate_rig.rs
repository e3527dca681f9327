//! Triangulate a synthetic five-camera rig with both N-view solvers.
//!
//! Generates exact and noise-perturbed bearings toward a ground-truth point,
//! runs DLT and midpoint triangulation with the standard gates, and refines
//! the noisy midpoint estimate.
//!
//! Run with: `cargo run -p sfm-geom --example triangulate_rig`

use anyhow::Result;
use sfm_core::{
    synthetic::{axis_aligned_poses, bearings_toward, UniformBearingNoise},
    Pt3, Real,
};
use sfm_geom::{
    point_refinement, triangulate_bearings_dlt, triangulate_bearings_midpoint, Triangulation,
};

fn report(label: &str, result: Triangulation, truth: &Pt3) {
    match result {
        Triangulation::Accepted(point) => {
            println!("  {label}: accepted, error {:.2e}", (point - truth).norm());
        }
        Triangulation::Rejected => println!("  {label}: rejected"),
    }
}

fn main() -> Result<()> {
    println!("=== Five-camera rig triangulation ===\n");

    let truth = Pt3::new(0.0, 0.0, 1.0);
    let centers: Vec<Pt3> = (0..5)
        .map(|i| Pt3::new(0.1 * i as Real, 0.02 * i as Real, 0.0))
        .collect();

    let bearings = bearings_toward(&truth, &centers);
    let noisy = UniformBearingNoise {
        seed: 1,
        max_abs: 1e-3,
    }
    .perturb_bearings(&bearings);
    let poses = axis_aligned_poses(&centers);

    let threshold = 0.01;
    let min_angle = 2.0_f64.to_radians();
    let min_depth = 1e-6;
    let thresholds = vec![threshold; centers.len()];

    println!("exact bearings:");
    report(
        "dlt     ",
        triangulate_bearings_dlt(&poses, &bearings, threshold, min_angle, min_depth)?,
        &truth,
    );
    report(
        "midpoint",
        triangulate_bearings_midpoint(&centers, &bearings, &thresholds, min_angle, min_depth)?,
        &truth,
    );

    println!("\nbearings with 1e-3 noise:");
    report(
        "dlt     ",
        triangulate_bearings_dlt(&poses, &noisy, threshold, min_angle, min_depth)?,
        &truth,
    );
    let noisy_midpoint =
        triangulate_bearings_midpoint(&centers, &noisy, &thresholds, min_angle, min_depth)?;
    report("midpoint", noisy_midpoint, &truth);

    if let Some(initial) = noisy_midpoint.point() {
        let refined = point_refinement(&centers, &noisy, &initial, 10)?;
        println!("\nrefined noisy midpoint: error {:.2e}", (refined - truth).norm());
    }

    Ok(())
}
