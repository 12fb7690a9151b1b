use super::buffer::SignalBuffer;
use super::coefficients::Coefficients;
use super::lfilter::{
    evaluate_backward, evaluate_backward_parallel, evaluate_forward, evaluate_forward_parallel,
};
use crate::config::{FilterConfig, Parallelism};
use crate::error::Result;

/// A filter that can map output gradients back to input gradients
///
/// Implemented by [`LFilter`]; the gradient checker works against this
/// trait.
pub trait DifferentiableFilter {
    /// Filter a `[time, channel]` signal
    fn forward(&self, x: &SignalBuffer) -> Result<SignalBuffer>;

    /// Gradient of the loss with respect to the input, given the gradient
    /// with respect to the output. `grad_output` is left untouched.
    fn backward(&self, grad_output: &SignalBuffer) -> Result<SignalBuffer>;
}

/// Linear recursive filter with fixed coefficients
///
/// Holds the coefficients between the forward and backward passes, the
/// same way an autograd node saves its tensors for the backward call.
#[derive(Debug, Clone, PartialEq)]
pub struct LFilter {
    coefficients: Coefficients,
    parallelism: Parallelism,
    min_parallel_channels: usize,
}

impl LFilter {
    pub fn new(coefficients: Coefficients) -> Self {
        Self {
            coefficients,
            parallelism: Parallelism::Sequential,
            min_parallel_channels: 4,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Ok(Self::new(config.coefficients()?)
            .with_parallelism(config.parallelism, config.min_parallel_channels))
    }

    pub fn with_parallelism(
        mut self,
        parallelism: Parallelism,
        min_parallel_channels: usize,
    ) -> Self {
        self.parallelism = parallelism;
        self.min_parallel_channels = min_parallel_channels;
        self
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn order(&self) -> usize {
        self.coefficients.order()
    }

    fn runs_parallel(&self, num_channels: usize) -> bool {
        self.parallelism == Parallelism::Channels && num_channels >= self.min_parallel_channels
    }
}

impl DifferentiableFilter for LFilter {
    fn forward(&self, x: &SignalBuffer) -> Result<SignalBuffer> {
        let (num_timesteps, num_channels) = x.shape();
        let parallel = self.runs_parallel(num_channels);
        log::debug!(
            "lfilter forward: order={} timesteps={} channels={} parallel={}",
            self.order(),
            num_timesteps,
            num_channels,
            parallel
        );

        let b = self.coefficients.feedforward();
        let a = self.coefficients.feedback();
        let mut y = x.zeros_like();
        if parallel {
            evaluate_forward_parallel(x, &mut y, b, a, self.order(), num_timesteps)?;
        } else {
            evaluate_forward(x, &mut y, b, a, self.order(), num_timesteps)?;
        }
        Ok(y)
    }

    fn backward(&self, grad_output: &SignalBuffer) -> Result<SignalBuffer> {
        let (num_timesteps, num_channels) = grad_output.shape();
        let parallel = self.runs_parallel(num_channels);
        log::debug!(
            "lfilter backward: order={} timesteps={} channels={} parallel={}",
            self.order(),
            num_timesteps,
            num_channels,
            parallel
        );

        let b = self.coefficients.feedforward();
        let a = self.coefficients.feedback();
        // the kernel accumulates feedback into its output-gradient argument
        let mut grad_y = grad_output.clone();
        let mut grad_x = grad_output.zeros_like();
        if parallel {
            evaluate_backward_parallel(
                &mut grad_x,
                &mut grad_y,
                b,
                a,
                self.order(),
                num_timesteps,
            )?;
        } else {
            evaluate_backward(&mut grad_x, &mut grad_y, b, a, self.order(), num_timesteps)?;
        }
        Ok(grad_x)
    }
}

/// Filter `x` with transfer-function coefficients
///
/// `b[0]` weights `x[n]` and `a[0]` weights `y[n]`; both are normalised by
/// `a[0]`. Filtering runs along the time axis of every channel.
pub fn lfilter(b: &[f64], a: &[f64], x: &SignalBuffer) -> Result<SignalBuffer> {
    LFilter::new(Coefficients::from_transfer_function(b, a)?).forward(x)
}
