use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::{LFilterError, Result};
use crate::signal_processing::SignalBuffer;

fn wav_error(e: hound::Error) -> LFilterError {
    LFilterError::Wav(e.to_string())
}

/// Write a signal as 32-bit float WAV, one WAV channel per signal channel
pub fn save_wav<P: AsRef<Path>>(path: P, signal: &SignalBuffer, sample_rate: u32) -> Result<()> {
    let channels = u16::try_from(signal.num_channels())
        .ok()
        .filter(|&c| c > 0)
        .ok_or_else(|| {
            LFilterError::Wav(format!("unsupported channel count {}", signal.num_channels()))
        })?;

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_error)?;

    // row-major storage is already interleaved
    for &sample in signal.as_slice() {
        writer.write_sample(sample as f32).map_err(wav_error)?;
    }

    writer.finalize().map_err(wav_error)?;
    Ok(())
}

/// Read a WAV file into a `[time, channel]` buffer
///
/// Integer PCM is scaled to `[-1, 1)`. Returns the buffer and sample rate.
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<(SignalBuffer, u32)> {
    let mut reader = WavReader::open(path).map_err(wav_error)?;
    let spec = reader.spec();

    let samples: Vec<f64> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<std::result::Result<Vec<f64>, hound::Error>>()
            .map_err(wav_error)?,
        SampleFormat::Int => {
            let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<std::result::Result<Vec<f64>, hound::Error>>()
                .map_err(wav_error)?
        }
    };

    let signal = SignalBuffer::from_interleaved(samples, spec.channels as usize)?;
    Ok((signal, spec.sample_rate))
}
