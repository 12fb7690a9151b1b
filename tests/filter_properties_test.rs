mod test_signals;

use lfilter_grad::config::Parallelism;
use lfilter_grad::signal_processing::{
    Coefficients, DifferentiableFilter, LFilter, SignalBuffer, lfilter,
};
use lfilter_grad::simulation::{
    bit_stream, gaussian_signal, random_stable_coefficients, random_stable_transfer_function,
};
use test_signals::{BUTTER4_A, BUTTER4_B, assert_buffers_close, reference_lfilter};

#[test]
fn test_order_one_is_scaling() {
    let x = gaussian_signal(64, 3, 1.0, Some(11));
    let y = LFilter::new(Coefficients::gain(-1.75)).forward(&x).unwrap();

    let mut expected = x.clone();
    expected.scale(-1.75);
    assert_eq!(y, expected);
}

#[test]
fn test_zero_input_gives_zero_output() {
    for order in 1..=6 {
        let coeffs = random_stable_coefficients(order, Some(order as u64)).unwrap();
        let y = LFilter::new(coeffs).forward(&SignalBuffer::zeros(40, 2)).unwrap();
        assert!(y.as_slice().iter().all(|&v| v == 0.0), "order {}", order);
    }
}

#[test]
fn test_forward_is_linear() {
    let filter = LFilter::new(random_stable_coefficients(4, Some(3)).unwrap());
    let x1 = gaussian_signal(120, 2, 1.0, Some(100));
    let x2 = gaussian_signal(120, 2, 1.0, Some(200));
    let (alpha, beta) = (0.7, -2.3);

    let mut combined = x1.clone();
    combined.scale(alpha);
    combined.add_scaled(&x2, beta).unwrap();
    let y_combined = filter.forward(&combined).unwrap();

    let mut expected = filter.forward(&x1).unwrap();
    expected.scale(alpha);
    expected.add_scaled(&filter.forward(&x2).unwrap(), beta).unwrap();

    assert_buffers_close(&y_combined, &expected, 1e-12);
}

#[test]
fn test_channels_are_independent() {
    let filter = LFilter::new(random_stable_coefficients(3, Some(8)).unwrap());
    let x = gaussian_signal(90, 4, 1.0, Some(21));
    let y = filter.forward(&x).unwrap();

    for s in 0..x.num_channels() {
        let single = SignalBuffer::from_samples(x.channel(s));
        let y_single = filter.forward(&single).unwrap();
        assert_eq!(y.channel(s), y_single.into_vec(), "channel {}", s);
    }
}

#[test]
fn test_unit_delay_scenario() {
    let x = SignalBuffer::from_samples(vec![1.0, 0.0, 0.0, 0.0]);
    let y = lfilter(&[0.0, 1.0], &[1.0, 0.0], &x).unwrap();
    assert_eq!(y.as_slice(), &[0.0, 1.0, 0.0, 0.0]);

    // same filter in kernel order
    let filter = LFilter::new(Coefficients::new(vec![1.0, 0.0], vec![0.0]).unwrap());
    assert_eq!(filter.forward(&x).unwrap(), y);
}

#[test]
fn test_leaky_integrator_scenario() {
    let x = SignalBuffer::from_samples(vec![1.0, 0.0, 0.0, 0.0]);
    let filter = LFilter::new(Coefficients::new(vec![1.0, 0.0], vec![-0.5]).unwrap());
    let y = filter.forward(&x).unwrap();
    assert_eq!(y.as_slice(), &[0.0, 1.0, 0.5, 0.25]);
}

#[test]
fn test_matches_reference_difference_equation() {
    for seed in 0..30u64 {
        let order = 1 + (seed as usize % 6);
        let num_timesteps = order + 5 + (seed as usize * 7) % 60;
        let (b, a) = random_stable_transfer_function(order, Some(seed));
        let x = gaussian_signal(num_timesteps, 1, 1.0, Some(seed + 500));

        let y = lfilter(&b, &a, &x).unwrap();
        let expected = SignalBuffer::from_samples(reference_lfilter(&b, &a, x.as_slice()));
        assert_buffers_close(&y, &expected, 1e-10);
    }
}

#[test]
fn test_unequal_coefficient_lengths_match_reference() {
    let x = gaussian_signal(50, 1, 1.0, Some(4));

    let (b, a) = ([0.5, 0.25, -0.1, 0.05], [1.0, -0.6]);
    let y = lfilter(&b, &a, &x).unwrap();
    let expected = SignalBuffer::from_samples(reference_lfilter(&b, &a, x.as_slice()));
    assert_buffers_close(&y, &expected, 1e-12);

    let (b, a) = ([0.3], [2.0, -0.8, 0.3]);
    let y = lfilter(&b, &a, &x).unwrap();
    let expected = SignalBuffer::from_samples(reference_lfilter(&b, &a, x.as_slice()));
    assert_buffers_close(&y, &expected, 1e-12);
}

#[test]
fn test_butterworth_bit_stream_matches_reference() {
    let stream = bit_stream(10, 8, Some(37));
    let y = lfilter(&BUTTER4_B, &BUTTER4_A, &stream).unwrap();
    let expected =
        SignalBuffer::from_samples(reference_lfilter(&BUTTER4_B, &BUTTER4_A, stream.as_slice()));
    assert_buffers_close(&y, &expected, 1e-12);
}

#[test]
fn test_butterworth_keyed_bits_match_pinned_samples() {
    // bits 1, 0, 1, 1, 0 held for 8 samples each; expected values were
    // evaluated in exact rational arithmetic from the same f64 coefficients
    let samples: Vec<f64> = [1.0, 0.0, 1.0, 1.0, 0.0]
        .iter()
        .flat_map(|&bit| std::iter::repeat_n(bit, 8))
        .collect();
    let y = lfilter(&BUTTER4_B, &BUTTER4_A, &SignalBuffer::from_samples(samples)).unwrap();

    let pinned = [
        (0, 0.0004165992044065786),
        (3, 0.03790644327637617),
        (7, 0.3329685328594802),
        (15, 0.74263175255766),
        (23, 0.2721305522842346),
        (31, 1.0409075553171887),
        (39, 0.7104851682032614),
    ];
    for (n, expected) in pinned {
        let actual = y.get(n, 0);
        assert!(
            (actual - expected).abs() < 1e-12,
            "y[{}] = {}, expected {}",
            n,
            actual,
            expected
        );
    }
}

#[test]
fn test_butterworth_lowpass_has_unit_dc_gain() {
    let step = SignalBuffer::from_samples(vec![1.0; 600]);
    let y = lfilter(&BUTTER4_B, &BUTTER4_A, &step).unwrap();
    let settled = y.as_slice()[599];
    assert!((settled - 1.0).abs() < 1e-6, "settled at {}", settled);
    // lowpass step response starts near zero
    assert!(y.as_slice()[0].abs() < 1e-3);
}

#[test]
fn test_parallel_forward_matches_sequential() {
    let coeffs = random_stable_coefficients(5, Some(77)).unwrap();
    let sequential = LFilter::new(coeffs.clone());
    let parallel = LFilter::new(coeffs).with_parallelism(Parallelism::Channels, 2);

    let x = gaussian_signal(256, 8, 1.0, Some(9));
    assert_eq!(sequential.forward(&x).unwrap(), parallel.forward(&x).unwrap());
}

#[test]
fn test_signal_shorter_than_order_is_rejected() {
    let x = gaussian_signal(3, 1, 1.0, Some(1));
    assert!(lfilter(&BUTTER4_B, &BUTTER4_A, &x).is_err());
}
