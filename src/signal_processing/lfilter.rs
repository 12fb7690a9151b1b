//! Forward and adjoint recursions of a causal linear recursive filter
//!
//! Forward:
//!
//! ```text
//! y[n] = sum_{k=0}^{N-1} b[N-1-k] x[n-k] - sum_{k=1}^{N-1} a[N-1-k] y[n-k]
//! ```
//!
//! with zero initial conditions, so terms with `n - k < 0` are dropped.
//! Both passes walk one loop over time and truncate the tap count near the
//! start of the signal instead of running separate transient loops.
//!
//! The adjoint walks time in reverse. At step `n` the output gradient
//! `dL/dy[n]` already holds every feedback contribution from later steps,
//! so it is first pushed back into `dL/dy[n-k]` through the feedback taps
//! and then distributed into `dL/dx[n-k]` through the feedforward taps.

use rayon::prelude::*;

use super::buffer::SignalBuffer;
use super::coefficients::check_lengths;
use crate::error::{LFilterError, Result};

/// Strided view of one channel inside a `[time, channel]` buffer
#[derive(Debug, Clone, Copy)]
struct Lane {
    offset: usize,
    stride: usize,
}

impl Lane {
    const CONTIGUOUS: Lane = Lane {
        offset: 0,
        stride: 1,
    };

    fn channel(s: usize, num_channels: usize) -> Self {
        Self {
            offset: s,
            stride: num_channels,
        }
    }

    #[inline]
    fn at(self, n: usize) -> usize {
        n * self.stride + self.offset
    }
}

/// Number of feedforward taps that reach back no further than `t = 0`.
/// The feedback tap count is always one less.
#[inline]
fn taps_at(n: usize, order: usize) -> usize {
    (n + 1).min(order)
}

/// Filter `x` into `y_out`
///
/// Every element of `y_out` is overwritten, so it does not need to be
/// zeroed beforehand.
///
/// # Errors
/// `InvalidOrder` unless `1 <= order <= num_timesteps`,
/// `CoefficientLengthMismatch` if `b`/`a` disagree with `order`,
/// `ShapeMismatch` if the buffers disagree with each other or with
/// `num_timesteps`. Nothing is written when an error is returned.
pub fn evaluate_forward(
    x: &SignalBuffer,
    y_out: &mut SignalBuffer,
    b: &[f64],
    a: &[f64],
    order: usize,
    num_timesteps: usize,
) -> Result<()> {
    validate_call(x, y_out, b, a, order, num_timesteps, "evaluate_forward")?;

    let num_channels = x.num_channels();
    let input = x.as_slice();
    let output = y_out.as_mut_slice();
    for s in 0..num_channels {
        forward_lane(input, output, Lane::channel(s, num_channels), b, a, num_timesteps);
    }
    Ok(())
}

/// Propagate `dl_dy` back through the filter, accumulating into `dl_dx_out`
///
/// `dl_dx_out` is an accumulator: results are added to whatever it holds.
/// `dl_dy` is consumed: on return it holds the output gradient augmented
/// with all feedback contributions, not the caller's original values.
///
/// # Errors
/// Same preconditions as [`evaluate_forward`].
pub fn evaluate_backward(
    dl_dx_out: &mut SignalBuffer,
    dl_dy: &mut SignalBuffer,
    b: &[f64],
    a: &[f64],
    order: usize,
    num_timesteps: usize,
) -> Result<()> {
    validate_call(dl_dy, dl_dx_out, b, a, order, num_timesteps, "evaluate_backward")?;

    let num_channels = dl_dy.num_channels();
    let grad_x = dl_dx_out.as_mut_slice();
    let grad_y = dl_dy.as_mut_slice();
    for s in 0..num_channels {
        backward_lane(grad_x, grad_y, Lane::channel(s, num_channels), b, a, num_timesteps);
    }
    Ok(())
}

/// Channel-parallel [`evaluate_forward`]
///
/// Each channel is gathered into a contiguous column, filtered on the rayon
/// pool and scattered back. Results are bit-identical to the sequential
/// version.
pub fn evaluate_forward_parallel(
    x: &SignalBuffer,
    y_out: &mut SignalBuffer,
    b: &[f64],
    a: &[f64],
    order: usize,
    num_timesteps: usize,
) -> Result<()> {
    validate_call(x, y_out, b, a, order, num_timesteps, "evaluate_forward_parallel")?;

    let columns: Vec<Vec<f64>> = (0..x.num_channels())
        .into_par_iter()
        .map(|s| {
            let input = x.channel(s);
            let mut output = vec![0.0; num_timesteps];
            forward_lane(&input, &mut output, Lane::CONTIGUOUS, b, a, num_timesteps);
            output
        })
        .collect();

    for (s, column) in columns.iter().enumerate() {
        y_out.set_channel(s, column)?;
    }
    Ok(())
}

/// Channel-parallel [`evaluate_backward`] with the same in/out semantics
pub fn evaluate_backward_parallel(
    dl_dx_out: &mut SignalBuffer,
    dl_dy: &mut SignalBuffer,
    b: &[f64],
    a: &[f64],
    order: usize,
    num_timesteps: usize,
) -> Result<()> {
    validate_call(dl_dy, dl_dx_out, b, a, order, num_timesteps, "evaluate_backward_parallel")?;

    let grad_y_in: &SignalBuffer = dl_dy;
    let grad_x_in: &SignalBuffer = dl_dx_out;
    let columns: Vec<(Vec<f64>, Vec<f64>)> = (0..grad_y_in.num_channels())
        .into_par_iter()
        .map(|s| {
            let mut grad_x = grad_x_in.channel(s);
            let mut grad_y = grad_y_in.channel(s);
            backward_lane(&mut grad_x, &mut grad_y, Lane::CONTIGUOUS, b, a, num_timesteps);
            (grad_x, grad_y)
        })
        .collect();

    for (s, (grad_x, grad_y)) in columns.iter().enumerate() {
        dl_dx_out.set_channel(s, grad_x)?;
        dl_dy.set_channel(s, grad_y)?;
    }
    Ok(())
}

fn validate_call(
    input: &SignalBuffer,
    output: &SignalBuffer,
    b: &[f64],
    a: &[f64],
    order: usize,
    num_timesteps: usize,
    operation: &'static str,
) -> Result<()> {
    if order < 1 || order > num_timesteps {
        return Err(LFilterError::InvalidOrder {
            order,
            num_timesteps,
        });
    }
    check_lengths(b, a, order)?;
    input.check_same_shape(output, operation)?;
    if input.num_timesteps() != num_timesteps {
        return Err(LFilterError::ShapeMismatch {
            expected: vec![num_timesteps, input.num_channels()],
            actual: vec![input.num_timesteps(), input.num_channels()],
            operation,
        });
    }
    Ok(())
}

fn forward_lane(x: &[f64], y: &mut [f64], lane: Lane, b: &[f64], a: &[f64], num_timesteps: usize) {
    let top = b.len() - 1;
    for n in 0..num_timesteps {
        let taps = taps_at(n, b.len());
        let mut acc = 0.0;
        for k in 0..taps {
            acc += b[top - k] * x[lane.at(n - k)];
        }
        for k in 1..taps {
            acc -= a[top - k] * y[lane.at(n - k)];
        }
        y[lane.at(n)] = acc;
    }
}

fn backward_lane(
    dl_dx: &mut [f64],
    dl_dy: &mut [f64],
    lane: Lane,
    b: &[f64],
    a: &[f64],
    num_timesteps: usize,
) {
    let top = b.len() - 1;
    for n in (0..num_timesteps).rev() {
        let taps = taps_at(n, b.len());
        // final: every later step has already pushed its feedback here
        let grad = dl_dy[lane.at(n)];
        for k in 1..taps {
            dl_dy[lane.at(n - k)] -= a[top - k] * grad;
        }
        for k in 0..taps {
            dl_dx[lane.at(n - k)] += b[top - k] * grad;
        }
    }
}
