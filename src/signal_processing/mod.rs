pub mod buffer;
pub mod coefficients;
pub mod filter;
pub mod grad_check;
pub mod lfilter;

pub use buffer::SignalBuffer;
pub use coefficients::Coefficients;
pub use filter::{DifferentiableFilter, LFilter, lfilter};
pub use grad_check::{GradCheckError, GradCheckReport, check_input_gradient};
pub use lfilter::{
    evaluate_backward, evaluate_backward_parallel, evaluate_forward, evaluate_forward_parallel,
};
