//! Differentiable linear recursive (IIR) filtering.
//!
//! Forward evaluation runs the difference equation over `[time, channel]`
//! buffers with zero initial state; backward evaluation runs the transposed
//! recursion in reverse time to produce exact input gradients.

pub mod config;
pub mod error;
pub mod signal_processing;
pub mod wav;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{FilterConfig, GradCheckConfig, Parallelism};
pub use error::{LFilterError, Result};
pub use signal_processing::{Coefficients, DifferentiableFilter, LFilter, SignalBuffer, lfilter};
pub use wav::{load_wav, save_wav};
