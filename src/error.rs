use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LFilterError {
    #[error("Shape mismatch in {operation}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: &'static str,
    },

    #[error("Invalid filter order {order} for a signal of {num_timesteps} timesteps")]
    InvalidOrder { order: usize, num_timesteps: usize },

    #[error("Coefficient vector `{which}` has length {actual}, expected {expected}")]
    CoefficientLengthMismatch {
        which: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Feedforward and feedback coefficient vectors must not be empty")]
    EmptyCoefficients,

    #[error("Leading feedback coefficient must be finite and non-zero, got {0}")]
    DegenerateFeedback(f64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WAV I/O error: {0}")]
    Wav(String),
}

pub type Result<T> = std::result::Result<T, LFilterError>;
