//! Linear convolution for the reverb path

use std::f64::consts::PI;

/// Below this many multiply-adds the direct form is used.
const DIRECT_LIMIT: usize = 1 << 14;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn add(self, other: Self) -> Self {
        Self::new(self.re + other.re, self.im + other.im)
    }

    fn sub(self, other: Self) -> Self {
        Self::new(self.re - other.re, self.im - other.im)
    }

    fn mul(self, other: Self) -> Self {
        Self::new(
            self.re * other.re - self.im * other.im,
            self.re * other.im + self.im * other.re,
        )
    }
}

/// In-place iterative radix-2 FFT. `data.len()` must be a power of two.
fn fft(data: &mut [Complex], inverse: bool) {
    let n = data.len();
    if n <= 1 {
        return;
    }

    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            data.swap(i, j);
        }
    }

    let sign = if inverse { 1.0 } else { -1.0 };
    let mut len = 2;
    while len <= n {
        let angle = sign * 2.0 * PI / len as f64;
        let step = Complex::new(angle.cos(), angle.sin());
        for chunk in data.chunks_exact_mut(len) {
            let mut w = Complex::new(1.0, 0.0);
            let (lo, hi) = chunk.split_at_mut(len / 2);
            for (a, b) in lo.iter_mut().zip(hi.iter_mut()) {
                let t = b.mul(w);
                *b = a.sub(t);
                *a = a.add(t);
                w = w.mul(step);
            }
        }
        len <<= 1;
    }

    if inverse {
        let scale = 1.0 / n as f64;
        for value in data.iter_mut() {
            value.re *= scale;
            value.im *= scale;
        }
    }
}

/// Full linear convolution; output length is `signal.len() + impulse.len() - 1`.
pub fn convolve(signal: &[f32], impulse: &[f32]) -> Vec<f32> {
    if signal.is_empty() || impulse.is_empty() {
        return Vec::new();
    }
    if signal.len().saturating_mul(impulse.len()) <= DIRECT_LIMIT {
        return convolve_direct(signal, impulse);
    }

    let out_len = signal.len() + impulse.len() - 1;
    let size = out_len.next_power_of_two();

    let mut a: Vec<Complex> = signal
        .iter()
        .map(|s| Complex::new(*s as f64, 0.0))
        .chain(std::iter::repeat(Complex::default()))
        .take(size)
        .collect();
    let mut b: Vec<Complex> = impulse
        .iter()
        .map(|s| Complex::new(*s as f64, 0.0))
        .chain(std::iter::repeat(Complex::default()))
        .take(size)
        .collect();

    fft(&mut a, false);
    fft(&mut b, false);
    for (x, y) in a.iter_mut().zip(&b) {
        *x = x.mul(*y);
    }
    fft(&mut a, true);

    a.into_iter().take(out_len).map(|c| c.re as f32).collect()
}

fn convolve_direct(signal: &[f32], impulse: &[f32]) -> Vec<f32> {
    let mut out = vec![0.0f32; signal.len() + impulse.len() - 1];
    for (i, s) in signal.iter().enumerate() {
        for (j, h) in impulse.iter().enumerate() {
            out[i + j] += s * h;
        }
    }
    out
}

/// Scale an impulse response to unit energy. Silent impulses are returned as-is.
pub fn normalize_impulse(impulse: &[f32]) -> Vec<f32> {
    let energy: f64 = impulse.iter().map(|s| (*s as f64).powi(2)).sum();
    if energy <= f64::EPSILON {
        return impulse.to_vec();
    }
    let scale = (1.0 / energy.sqrt()) as f32;
    impulse.iter().map(|s| s * scale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: &[f32], b: &[f32]) {
        assert_eq!(a.len(), b.len());
        for (i, (x, y)) in a.iter().zip(b).enumerate() {
            assert!((x - y).abs() < 1e-3, "sample {i}: {x} vs {y}");
        }
    }

    #[test]
    fn test_identity_impulse() {
        let signal = [0.1, -0.2, 0.3];
        assert_eq!(convolve(&signal, &[1.0]), signal.to_vec());
    }

    #[test]
    fn test_delay_impulse() {
        assert_eq!(convolve(&[1.0, 2.0], &[0.0, 0.0, 0.5]), vec![0.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(convolve(&[], &[1.0]).is_empty());
        assert!(convolve(&[1.0], &[]).is_empty());
    }

    #[test]
    fn test_fft_path_matches_direct() {
        let signal: Vec<f32> = (0..600).map(|i| ((i as f32) * 0.37).sin()).collect();
        let impulse: Vec<f32> = (0..90).map(|i| (-(i as f32) / 20.0).exp() * 0.3).collect();
        assert!(signal.len() * impulse.len() > DIRECT_LIMIT);

        let fast = convolve(&signal, &impulse);
        let slow = convolve_direct(&signal, &impulse);
        assert_eq!(fast.len(), signal.len() + impulse.len() - 1);
        assert_close(&fast, &slow);
    }

    #[test]
    fn test_normalize_unit_energy() {
        let normalized = normalize_impulse(&[3.0, 4.0]);
        assert_close(&normalized, &[0.6, 0.8]);
        assert_eq!(normalize_impulse(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
