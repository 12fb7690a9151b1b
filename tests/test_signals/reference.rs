/// Order-4 Butterworth lowpass, normalised cutoff 0.1 (transfer-function order)
pub const BUTTER4_B: [f64; 5] = [
    0.0004165992044065786,
    0.0016663968176263143,
    0.0024995952264394715,
    0.0016663968176263143,
    0.0004165992044065786,
];
pub const BUTTER4_A: [f64; 5] = [
    1.0,
    -3.180638548874721,
    3.8611943489942133,
    -2.112155355110969,
    0.43826514226197977,
];

/// Direct-form difference equation, written independently of the crate
///
/// `a[0] y[n] = sum_k b[k] x[n-k] - sum_{k>=1} a[k] y[n-k]`
pub fn reference_lfilter(b: &[f64], a: &[f64], x: &[f64]) -> Vec<f64> {
    let mut y = vec![0.0; x.len()];
    for n in 0..x.len() {
        let mut acc = 0.0;
        for (k, &bk) in b.iter().enumerate().take(n + 1) {
            acc += bk * x[n - k];
        }
        for (k, &ak) in a.iter().enumerate().skip(1).take(n) {
            acc -= ak * y[n - k];
        }
        y[n] = acc / a[0];
    }
    y
}
