//! Signal primitives shared by every persona generator.
//!
//! RULE: primitives never touch global state. Randomness comes in
//! through the caller's SeededRng, so a generator is a pure function
//! of its stream and the horizon length.

use crate::{
    error::{SimError, SimResult},
    rng::SeededRng,
};

/// Noise ratio used when a generator does not ask for a specific one.
pub const DEFAULT_NOISE_RATIO: f64 = 0.005;

/// Add zero-mean Gaussian noise with σ = `ratio` × mean(|signal|).
pub fn add_gaussian_noise(signal: &[f64], ratio: f64, rng: &mut SeededRng) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let mean_abs = signal.iter().map(|x| x.abs()).sum::<f64>() / signal.len() as f64;
    let std_dev = mean_abs * ratio;
    signal.iter().map(|&x| x + rng.normal(0.0, std_dev)).collect()
}

/// Add `count` transient spikes at distinct random indices.
///
/// Each spike adds `max(signal) × magnitude × (1 + U[0,1))`, with the
/// maximum taken on the unperturbed signal.
pub fn add_spikes(
    signal: &[f64],
    count: usize,
    magnitude: f64,
    rng: &mut SeededRng,
) -> SimResult<Vec<f64>> {
    if count > signal.len() {
        return Err(SimError::SpikeCountExceedsLength {
            spikes: count,
            length: signal.len(),
        });
    }
    let mut out = signal.to_vec();
    if count == 0 {
        return Ok(out);
    }
    let max_val = signal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    for idx in rng.sample_indices(signal.len(), count) {
        out[idx] += max_val * magnitude * (1.0 + rng.next_f64());
    }
    Ok(out)
}

/// Centered rolling sample standard deviation (ddof = 1, min periods 1).
///
/// The window for index `i` is `[i + 1 + (w-1)/2 - w, i + 1 + (w-1)/2)`,
/// shrunk at the edges. A window holding a single observation is
/// undefined and takes the next defined value; if nothing is defined
/// the result is all zeros.
pub fn rolling_volatility(signal: &[f64], window: usize) -> SimResult<Vec<f64>> {
    if window < 2 {
        return Err(SimError::InvalidWindow { window });
    }
    let len = signal.len();
    let offset = (window - 1) / 2;

    let raw: Vec<Option<f64>> = (0..len)
        .map(|i| {
            let end = (i + 1 + offset).min(len);
            let start = (i + 1 + offset).saturating_sub(window);
            window_std(&signal[start..end])
        })
        .collect();

    // Back-fill undefined entries from the next defined one.
    let mut out = vec![0.0; len];
    let mut next_defined: Option<f64> = None;
    for i in (0..len).rev() {
        if let Some(v) = raw[i] {
            next_defined = Some(v);
        }
        out[i] = raw[i].or(next_defined).unwrap_or(0.0);
    }
    Ok(out)
}

/// Sample standard deviation, shifted by the first value so a constant
/// window is exactly zero.
fn window_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let shift = values[0];
    let (sum, sum_sq) = values.iter().fold((0.0, 0.0), |(s, sq), &x| {
        let d = x - shift;
        (s + d, sq + d * d)
    });
    let var = (sum_sq - sum * sum / n as f64) / (n - 1) as f64;
    Some(var.max(0.0).sqrt())
}

/// `n` evenly spaced points from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|k| start + step * k as f64).collect()
        }
    }
}

/// Indices of `[start, end)` that fall inside a signal of `len` samples.
pub fn window(start: usize, end: usize, len: usize) -> std::ops::Range<usize> {
    start.min(len)..end.min(len)
}

/// A half-sine bump of `n` samples: sin over linspace(0, π, n).
pub fn half_sine(n: usize) -> Vec<f64> {
    linspace(0.0, std::f64::consts::PI, n)
        .into_iter()
        .map(f64::sin)
        .collect()
}
