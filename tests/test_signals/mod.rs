#![allow(dead_code)]

mod reference;

pub use reference::{BUTTER4_A, BUTTER4_B, reference_lfilter};

use lfilter_grad::SignalBuffer;

/// Assert two buffers agree within `tol` scaled by the larger peak
pub fn assert_buffers_close(actual: &SignalBuffer, expected: &SignalBuffer, tol: f64) {
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    let scale = actual.peak().max(expected.peak()).max(1.0);
    let diff = actual.max_abs_diff(expected).unwrap();
    assert!(
        diff <= tol * scale,
        "buffers differ by {} (tolerance {}, scale {})",
        diff,
        tol,
        scale
    );
}
