mod test_signals;

use lfilter_grad::config::{FilterConfig, Parallelism};
use lfilter_grad::signal_processing::{DifferentiableFilter, LFilter, lfilter};
use lfilter_grad::simulation::gaussian_signal;
use lfilter_grad::wav::{load_wav, save_wav};
use test_signals::assert_buffers_close;

fn temp_file(name: &str, ext: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lfilter_grad_it_{}_{}.{}",
        name,
        std::process::id(),
        ext
    ))
}

#[test]
fn test_config_file_drives_filter() {
    let path = temp_file("config", "toml");
    std::fs::write(
        &path,
        "b = [0.0, 1.0]\na = [1.0, -0.5]\nparallelism = \"channels\"\nmin_parallel_channels = 2\n",
    )
    .unwrap();
    let config = FilterConfig::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.parallelism, Parallelism::Channels);
    let filter = LFilter::from_config(&config).unwrap();

    let x = gaussian_signal(100, 3, 1.0, Some(2));
    let y = filter.forward(&x).unwrap();
    let expected = lfilter(&config.b, &config.a, &x).unwrap();
    assert_eq!(y, expected);
}

#[test]
fn test_wav_filter_pipeline() {
    let input_path = temp_file("pipeline_in", "wav");
    let output_path = temp_file("pipeline_out", "wav");

    let mut signal = gaussian_signal(480, 2, 0.25, Some(10));
    // keep values exactly representable after the f32 round trip
    for sample in signal.as_mut_slice() {
        *sample = (*sample as f32) as f64;
    }
    save_wav(&input_path, &signal, 48000).unwrap();

    let (loaded, sample_rate) = load_wav(&input_path).unwrap();
    assert_eq!(sample_rate, 48000);
    assert_eq!(loaded, signal);

    let config = FilterConfig {
        b: vec![0.2, 0.2],
        a: vec![1.0, -0.6],
        ..FilterConfig::default()
    };
    let filtered = LFilter::from_config(&config).unwrap().forward(&loaded).unwrap();
    save_wav(&output_path, &filtered, sample_rate).unwrap();

    let (reloaded, _) = load_wav(&output_path).unwrap();
    let _ = std::fs::remove_file(&input_path);
    let _ = std::fs::remove_file(&output_path);

    // f32 storage
    assert_buffers_close(&reloaded, &filtered, 1e-6);
}

#[test]
fn test_gradient_of_sum_loss() {
    // forward then backward with a loss gradient of ones: each input's
    // gradient is the sum of the impulse response over the remaining horizon
    let filter = LFilter::from_config(&FilterConfig {
        b: vec![1.0],
        a: vec![1.0, -0.5],
        ..FilterConfig::default()
    })
    .unwrap();

    let x = gaussian_signal(8, 1, 1.0, Some(0));
    let _ = filter.forward(&x).unwrap();
    let ones = lfilter_grad::SignalBuffer::from_samples(vec![1.0; 8]);
    let grad = filter.backward(&ones).unwrap();

    for m in 0..8 {
        let remaining = 8 - m;
        let expected: f64 = (0..remaining).map(|k| 0.5f64.powi(k as i32)).sum();
        assert!(
            (grad.get(m, 0) - expected).abs() < 1e-12,
            "m={} got {} expected {}",
            m,
            grad.get(m, 0),
            expected
        );
    }
}
