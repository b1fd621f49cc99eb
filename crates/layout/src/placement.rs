//! Point distributions shared by the metaphor engines

use codescape_ivm::Vec3;
use std::f64::consts::{PI, TAU};

/// π × (3 − √5)
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// `count` points spread evenly over a sphere of `radius` around the origin.
///
/// Every point lies exactly on the sphere.
pub fn fibonacci_sphere(count: usize, radius: f64) -> Vec<Vec3> {
    (0..count)
        .map(|k| {
            let y = 1.0 - 2.0 * (k as f64 + 0.5) / count as f64;
            let ring = (1.0 - y * y).max(0.0).sqrt();
            let theta = GOLDEN_ANGLE * k as f64;
            Vec3::new(theta.cos() * ring, y, theta.sin() * ring) * radius
        })
        .collect()
}

/// `count` points evenly spaced on a horizontal circle at height `y`
pub fn ring(count: usize, radius: f64, y: f64) -> Vec<Vec3> {
    (0..count)
        .map(|k| {
            let angle = TAU * k as f64 / count as f64;
            Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
        })
        .collect()
}

/// Unit direction for coincident points, stable for a given pair
pub fn tie_break_direction(i: usize, j: usize) -> Vec3 {
    let angle = GOLDEN_ANGLE * (i * 31 + j) as f64;
    let tilt = (PI * ((i + j) % 7) as f64 / 7.0) - PI / 2.0;
    Vec3::new(angle.cos() * tilt.cos(), tilt.sin(), angle.sin() * tilt.cos())
}

/// Columns of the smallest square grid holding `count` cells
pub fn grid_columns(count: usize) -> usize {
    let mut cols = 1;
    while cols * cols < count {
        cols += 1;
    }
    cols
}
