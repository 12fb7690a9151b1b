//! Configuration for filter evaluation and gradient checking.
//!
//! Filters are described in transfer-function order, the same layout used by
//! `lfilter(b, a, x)` style APIs:
//!
//! ```toml
//! b = [0.0, 1.0]
//! a = [1.0, -0.5]
//! parallelism = "channels"
//! min_parallel_channels = 4
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LFilterError, Result};
use crate::signal_processing::Coefficients;

/// Comma-separated coefficient list
///
/// # Parsing formats
/// - `0.5, 0.5` - plain list
/// - `[1.0, -0.9]` - optional brackets
///
/// # Example
/// ```
/// use lfilter_grad::config::CoefficientList;
///
/// let a: CoefficientList = "[1.0, -0.9]".parse().unwrap();
/// assert_eq!(a.0, vec![1.0, -0.9]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientList(pub Vec<f64>);

impl fmt::Display for CoefficientList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

impl FromStr for CoefficientList {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(s);

        if inner.trim().is_empty() {
            return Err("coefficient list must not be empty".to_string());
        }

        let values = inner
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.parse::<f64>()
                    .map_err(|_| format!("invalid coefficient: {}", part))
                    .and_then(|v| {
                        if v.is_finite() {
                            Ok(v)
                        } else {
                            Err(format!("coefficient must be finite: {}", part))
                        }
                    })
            })
            .collect::<std::result::Result<Vec<f64>, String>>()?;

        Ok(Self(values))
    }
}

/// How channels are scheduled
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Parallelism {
    /// One channel after another on the calling thread
    #[default]
    Sequential,
    /// Independent channels spread across the rayon pool
    Channels,
}

/// Filter description and execution strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Feedforward coefficients, `b[0]` weights `x[n]`
    pub b: Vec<f64>,
    /// Feedback coefficients, `a[0]` weights `y[n]` and normalises the rest
    pub a: Vec<f64>,
    /// Channel scheduling
    pub parallelism: Parallelism,
    /// Below this channel count `Channels` runs sequentially
    pub min_parallel_channels: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            b: vec![1.0],
            a: vec![1.0],
            parallelism: Parallelism::Sequential,
            min_parallel_channels: 4,
        }
    }
}

impl FilterConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| LFilterError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LFilterError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Normalised kernel-order coefficients
    pub fn coefficients(&self) -> Result<Coefficients> {
        Coefficients::from_transfer_function(&self.b, &self.a)
    }
}

/// Central-difference gradient check settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradCheckConfig {
    /// Perturbation applied to each input sample
    pub epsilon: f64,
    /// Relative tolerance, scaled by `max(1, |analytical|, |numerical|)`
    pub tolerance: f64,
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            tolerance: 1e-6,
        }
    }
}
