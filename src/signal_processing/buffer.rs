use crate::error::{LFilterError, Result};

/// Multi-channel signal stored row-major as `[time, channel]`
///
/// Channel samples for one timestep are contiguous, so the raw storage is
/// the same layout as interleaved audio frames.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignalBuffer {
    data: Vec<f64>,
    num_timesteps: usize,
    num_channels: usize,
}

impl SignalBuffer {
    /// All-zero buffer of the given shape
    pub fn zeros(num_timesteps: usize, num_channels: usize) -> Self {
        Self {
            data: vec![0.0; num_timesteps * num_channels],
            num_timesteps,
            num_channels,
        }
    }

    /// Zero buffer with the same shape as `self`
    pub fn zeros_like(&self) -> Self {
        Self::zeros(self.num_timesteps, self.num_channels)
    }

    /// Single-channel buffer
    pub fn from_samples(samples: Vec<f64>) -> Self {
        Self {
            num_timesteps: samples.len(),
            num_channels: 1,
            data: samples,
        }
    }

    /// Wrap interleaved frames `[x0c0, x0c1, ..., x1c0, ...]`
    pub fn from_interleaved(data: Vec<f64>, num_channels: usize) -> Result<Self> {
        if num_channels == 0 || data.len() % num_channels != 0 {
            return Err(LFilterError::ShapeMismatch {
                expected: vec![data.len() / num_channels.max(1), num_channels],
                actual: vec![data.len()],
                operation: "from_interleaved",
            });
        }
        Ok(Self {
            num_timesteps: data.len() / num_channels,
            num_channels,
            data,
        })
    }

    /// Build from one vector per channel; all channels must have equal length
    pub fn from_channels(channels: &[Vec<f64>]) -> Result<Self> {
        let num_timesteps = channels.first().map_or(0, Vec::len);
        let mut buffer = Self::zeros(num_timesteps, channels.len());
        for (s, channel) in channels.iter().enumerate() {
            buffer.set_channel(s, channel)?;
        }
        Ok(buffer)
    }

    pub fn num_timesteps(&self) -> usize {
        self.num_timesteps
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// `(num_timesteps, num_channels)`
    pub fn shape(&self) -> (usize, usize) {
        (self.num_timesteps, self.num_channels)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, n: usize, s: usize) -> f64 {
        self.data[n * self.num_channels + s]
    }

    pub fn set(&mut self, n: usize, s: usize, value: f64) {
        self.data[n * self.num_channels + s] = value;
    }

    /// Copy out one channel as a contiguous vector
    pub fn channel(&self, s: usize) -> Vec<f64> {
        self.data
            .iter()
            .skip(s)
            .step_by(self.num_channels.max(1))
            .copied()
            .collect()
    }

    /// Overwrite one channel from a contiguous slice
    pub fn set_channel(&mut self, s: usize, samples: &[f64]) -> Result<()> {
        if samples.len() != self.num_timesteps || s >= self.num_channels {
            return Err(LFilterError::ShapeMismatch {
                expected: vec![self.num_timesteps, self.num_channels],
                actual: vec![samples.len(), s + 1],
                operation: "set_channel",
            });
        }
        let stride = self.num_channels;
        for (slot, &value) in self.data.iter_mut().skip(s).step_by(stride).zip(samples) {
            *slot = value;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Multiply every sample by `factor`
    pub fn scale(&mut self, factor: f64) {
        for sample in self.data.iter_mut() {
            *sample *= factor;
        }
    }

    /// `self += alpha * other`
    pub fn add_scaled(&mut self, other: &SignalBuffer, alpha: f64) -> Result<()> {
        self.check_same_shape(other, "add_scaled")?;
        for (lhs, &rhs) in self.data.iter_mut().zip(&other.data) {
            *lhs += alpha * rhs;
        }
        Ok(())
    }

    /// Sum of element-wise products
    pub fn dot(&self, other: &SignalBuffer) -> Result<f64> {
        self.check_same_shape(other, "dot")?;
        Ok(self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum())
    }

    /// Largest absolute element-wise difference
    pub fn max_abs_diff(&self, other: &SignalBuffer) -> Result<f64> {
        self.check_same_shape(other, "max_abs_diff")?;
        Ok(self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max))
    }

    /// Largest absolute sample value
    pub fn peak(&self) -> f64 {
        self.data.iter().map(|x| x.abs()).fold(0.0, f64::max)
    }

    pub(crate) fn check_same_shape(
        &self,
        other: &SignalBuffer,
        operation: &'static str,
    ) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(LFilterError::ShapeMismatch {
                expected: vec![self.num_timesteps, self.num_channels],
                actual: vec![other.num_timesteps, other.num_channels],
                operation,
            });
        }
        Ok(())
    }
}
