//! Filter coefficient storage
//!
//! The recursion kernels store taps highest-first: for an order-`N` filter
//! `b[N - 1 - k]` weights `x[n - k]` and `a[N - 1 - k]` weights `y[n - k]`
//! (`k >= 1`). The last feedforward tap is therefore the instantaneous gain
//! and `a` holds `N - 1` entries with the leading (normalised) `1` dropped.
//!
//! Transfer-function vectors in the usual `lfilter(b, a, x)` ordering
//! (`b[0]` weights `x[n]`, `a[0]` weights `y[n]`) are converted with
//! [`Coefficients::from_transfer_function`].

use crate::error::{LFilterError, Result};

/// Validated feedforward/feedback taps in kernel (highest-tap-first) order
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl Coefficients {
    /// Wrap kernel-order vectors
    ///
    /// # Errors
    /// `EmptyCoefficients` if `b` is empty, `CoefficientLengthMismatch` if
    /// `a.len() != b.len() - 1`
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Result<Self> {
        let order = b.len();
        check_lengths(&b, &a, order)?;
        Ok(Self { b, a })
    }

    /// Normalise and reorder transfer-function coefficients
    ///
    /// Both vectors are divided by `a[0]`. The shorter one is zero-padded so
    /// the order is `max(b.len(), a.len())`.
    pub fn from_transfer_function(b: &[f64], a: &[f64]) -> Result<Self> {
        if b.is_empty() || a.is_empty() {
            return Err(LFilterError::EmptyCoefficients);
        }
        let a0 = a[0];
        if a0 == 0.0 || !a0.is_finite() {
            return Err(LFilterError::DegenerateFeedback(a0));
        }

        let order = b.len().max(a.len());
        let mut feedforward = vec![0.0; order];
        for (k, &bk) in b.iter().enumerate() {
            feedforward[order - 1 - k] = bk / a0;
        }
        let mut feedback = vec![0.0; order - 1];
        for (k, &ak) in a.iter().enumerate().skip(1) {
            feedback[order - 1 - k] = ak / a0;
        }

        Self::new(feedforward, feedback)
    }

    /// Pure gain filter, `y[n] = gain * x[n]`
    pub fn gain(gain: f64) -> Self {
        Self {
            b: vec![gain],
            a: Vec::new(),
        }
    }

    /// Number of feedforward taps
    pub fn order(&self) -> usize {
        self.b.len()
    }

    /// Feedforward taps, highest tap first
    pub fn feedforward(&self) -> &[f64] {
        &self.b
    }

    /// Feedback taps, highest tap first
    pub fn feedback(&self) -> &[f64] {
        &self.a
    }

    /// Weight of `x[n]` in `y[n]`
    pub fn instantaneous_gain(&self) -> f64 {
        self.b[self.b.len() - 1]
    }

    /// Back to transfer-function order with `a[0] == 1`
    pub fn to_transfer_function(&self) -> (Vec<f64>, Vec<f64>) {
        let b = self.b.iter().rev().copied().collect();
        let a = std::iter::once(1.0)
            .chain(self.a.iter().rev().copied())
            .collect();
        (b, a)
    }
}

pub(crate) fn check_lengths(b: &[f64], a: &[f64], order: usize) -> Result<()> {
    if order < 1 {
        return Err(LFilterError::EmptyCoefficients);
    }
    if b.len() != order {
        return Err(LFilterError::CoefficientLengthMismatch {
            which: "b",
            expected: order,
            actual: b.len(),
        });
    }
    if a.len() != order - 1 {
        return Err(LFilterError::CoefficientLengthMismatch {
            which: "a",
            expected: order - 1,
            actual: a.len(),
        });
    }
    Ok(())
}
