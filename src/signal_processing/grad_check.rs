//! Finite-difference verification of input gradients
//!
//! The loss is the weighted sum `L = sum_{n,s} w[n,s] y[n,s]`, so the
//! output gradient handed to `backward` is `w` itself. Each input sample is
//! perturbed by `±epsilon` and the central difference of `L` is compared
//! with the analytical gradient.

use serde::Serialize;
use thiserror::Error;

use super::buffer::SignalBuffer;
use super::filter::DifferentiableFilter;
use crate::config::GradCheckConfig;
use crate::error::LFilterError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error(
        "Gradient mismatch at time {time}, channel {channel}: analytical {analytical} != numerical {numerical} (difference {difference})"
    )]
    GradientMismatch {
        time: usize,
        channel: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error(
        "Non-finite gradient at time {time}, channel {channel}: analytical {analytical}, numerical {numerical}"
    )]
    NonFinite {
        time: usize,
        channel: usize,
        analytical: f64,
        numerical: f64,
    },

    #[error("Filter evaluation failed during gradient check: {0}")]
    Filter(#[from] LFilterError),
}

/// Summary of a passing gradient check
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GradCheckReport {
    pub elements_checked: usize,
    pub max_abs_error: f64,
    pub max_rel_error: f64,
}

/// Compare `filter.backward` against central differences of `filter.forward`
///
/// Stops at the first element outside tolerance.
pub fn check_input_gradient<F>(
    filter: &F,
    x: &SignalBuffer,
    loss_weights: &SignalBuffer,
    config: &GradCheckConfig,
) -> Result<GradCheckReport, GradCheckError>
where
    F: DifferentiableFilter + ?Sized,
{
    x.check_same_shape(loss_weights, "check_input_gradient")?;

    let analytical = filter.backward(loss_weights)?;
    let loss_at = |input: &SignalBuffer| -> Result<f64, GradCheckError> {
        Ok(filter.forward(input)?.dot(loss_weights)?)
    };

    let (num_timesteps, num_channels) = x.shape();
    let mut report = GradCheckReport {
        elements_checked: 0,
        max_abs_error: 0.0,
        max_rel_error: 0.0,
    };
    let mut perturbed = x.clone();

    for n in 0..num_timesteps {
        for s in 0..num_channels {
            let original = x.get(n, s);

            perturbed.set(n, s, original + config.epsilon);
            let loss_plus = loss_at(&perturbed)?;
            perturbed.set(n, s, original - config.epsilon);
            let loss_minus = loss_at(&perturbed)?;
            perturbed.set(n, s, original);

            let numerical = (loss_plus - loss_minus) / (2.0 * config.epsilon);
            let ana = analytical.get(n, s);

            if !numerical.is_finite() || !ana.is_finite() {
                return Err(GradCheckError::NonFinite {
                    time: n,
                    channel: s,
                    analytical: ana,
                    numerical,
                });
            }

            let difference = (ana - numerical).abs();
            let scale = 1.0f64.max(ana.abs()).max(numerical.abs());
            if difference > config.tolerance * scale {
                log::warn!(
                    "gradient mismatch at t={} s={}: analytical={} numerical={}",
                    n,
                    s,
                    ana,
                    numerical
                );
                return Err(GradCheckError::GradientMismatch {
                    time: n,
                    channel: s,
                    analytical: ana,
                    numerical,
                    difference,
                });
            }

            report.elements_checked += 1;
            report.max_abs_error = report.max_abs_error.max(difference);
            report.max_rel_error = report.max_rel_error.max(difference / scale);
        }
    }

    log::debug!(
        "gradient check passed: {} elements, max abs error {:.3e}",
        report.elements_checked,
        report.max_abs_error
    );
    Ok(report)
}
