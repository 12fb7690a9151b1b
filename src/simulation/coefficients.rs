use std::f64::consts::PI;

use rand::RngExt;
use rand_distr::{Distribution, StandardNormal};

use super::signal::create_rng;
use crate::error::Result;
use crate::signal_processing::Coefficients;

const MIN_POLE_RADIUS: f64 = 0.1;
/// Keeps every pole well inside the unit circle
pub const MAX_POLE_RADIUS: f64 = 0.9;

fn convolve(lhs: &[f64], rhs: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; lhs.len() + rhs.len() - 1];
    for (i, &l) in lhs.iter().enumerate() {
        for (j, &r) in rhs.iter().enumerate() {
            out[i + j] += l * r;
        }
    }
    out
}

/// Random stable filter in transfer-function order, `(b, a)` with `a[0] == 1`
///
/// The feedback polynomial is a product of real-pole and conjugate-pair
/// sections with radius below [`MAX_POLE_RADIUS`]; `b` holds `order`
/// Gaussian taps.
pub fn random_stable_transfer_function(order: usize, seed: Option<u64>) -> (Vec<f64>, Vec<f64>) {
    let mut rng = create_rng(seed);

    let mut a = vec![1.0];
    let mut remaining = order.saturating_sub(1);
    while remaining > 0 {
        if remaining >= 2 && rng.random::<bool>() {
            let radius = MIN_POLE_RADIUS + rng.random::<f64>() * (MAX_POLE_RADIUS - MIN_POLE_RADIUS);
            let angle = rng.random::<f64>() * PI;
            a = convolve(&a, &[1.0, -2.0 * radius * angle.cos(), radius * radius]);
            remaining -= 2;
        } else {
            let pole = (2.0 * rng.random::<f64>() - 1.0) * MAX_POLE_RADIUS;
            a = convolve(&a, &[1.0, -pole]);
            remaining -= 1;
        }
    }

    let b = (0..order)
        .map(|_| {
            let v: f64 = StandardNormal.sample(&mut rng);
            0.5 * v
        })
        .collect();

    (b, a)
}

/// [`random_stable_transfer_function`] converted to kernel order
pub fn random_stable_coefficients(order: usize, seed: Option<u64>) -> Result<Coefficients> {
    let (b, a) = random_stable_transfer_function(order, seed);
    Coefficients::from_transfer_function(&b, &a)
}
