use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::signal_processing::SignalBuffer;

/// Seeded ChaCha8 generator, or an entropy-seeded one for `None`
pub fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

/// Single-channel on/off keyed stream, each random bit held for
/// `samples_per_bit` samples
pub fn bit_stream(num_bits: usize, samples_per_bit: usize, seed: Option<u64>) -> SignalBuffer {
    let mut rng = create_rng(seed);
    let mut samples = Vec::with_capacity(num_bits * samples_per_bit);

    for _ in 0..num_bits {
        let level = if rng.random::<bool>() { 1.0 } else { 0.0 };
        samples.extend(std::iter::repeat_n(level, samples_per_bit));
    }

    SignalBuffer::from_samples(samples)
}

/// White Gaussian noise, independent per channel
pub fn gaussian_signal(
    num_timesteps: usize,
    num_channels: usize,
    std_dev: f64,
    seed: Option<u64>,
) -> SignalBuffer {
    let mut rng = create_rng(seed);
    let mut signal = SignalBuffer::zeros(num_timesteps, num_channels);

    for sample in signal.as_mut_slice() {
        let v: f64 = StandardNormal.sample(&mut rng);
        *sample = std_dev * v;
    }

    signal
}
