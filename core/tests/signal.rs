//! Signal primitive properties.

use loadgen_core::{
    error::SimError,
    rng::SeededRng,
    signal::{add_gaussian_noise, add_spikes, rolling_volatility},
};

#[test]
fn volatility_of_constant_signal_is_zero() {
    for value in [0.0, 0.1, 475.0, -3.3] {
        let v = rolling_volatility(&vec![value; 96], 5).unwrap();
        assert_eq!(v.len(), 96);
        assert!(v.iter().all(|&x| x == 0.0), "constant {value} gave {v:?}");
    }
}

#[test]
fn volatility_preserves_length_and_is_non_negative() {
    let mut rng = SeededRng::new(3, 0);
    let signal: Vec<f64> = (0..96).map(|_| rng.uniform(-5.0, 5.0)).collect();
    let v = rolling_volatility(&signal, 5).unwrap();
    assert_eq!(v.len(), signal.len());
    assert!(v.iter().all(|x| x.is_finite() && *x >= 0.0));
}

#[test]
fn volatility_rejects_degenerate_window() {
    let err = rolling_volatility(&[1.0, 2.0], 1).unwrap_err();
    assert!(matches!(err, SimError::InvalidWindow { window: 1 }), "got {err:?}");
}

#[test]
fn spikes_touch_exactly_k_indices_within_bounds() {
    let base: Vec<f64> = (0..96).map(|i| 80.0 + i as f64).collect();
    let max_val = base.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let magnitude = 2.5;

    for seed in 0..20 {
        let mut rng = SeededRng::new(seed, 0);
        for k in [0, 1, 2, 10, 96] {
            let spiked = add_spikes(&base, k, magnitude, &mut rng).unwrap();
            let diffs: Vec<f64> = spiked.iter().zip(&base).map(|(s, b)| s - b).collect();
            let changed = diffs.iter().filter(|d| **d != 0.0).count();
            assert_eq!(changed, k, "seed {seed}: expected {k} spikes, got {changed}");
            for d in diffs {
                assert!(
                    (0.0..=max_val * magnitude * 2.0).contains(&d),
                    "spike {d} outside [0, {}]",
                    max_val * magnitude * 2.0
                );
            }
        }
    }
}

#[test]
fn spike_count_is_guarded() {
    let mut rng = SeededRng::new(1, 0);
    let err = add_spikes(&[1.0, 2.0, 3.0], 4, 2.5, &mut rng).unwrap_err();
    assert!(
        matches!(err, SimError::SpikeCountExceedsLength { spikes: 4, length: 3 }),
        "got {err:?}"
    );
}

#[test]
fn noise_scales_with_mean_absolute_value() {
    let mut rng = SeededRng::new(8, 0);
    let signal = vec![-100.0; 20_000];
    let noisy = add_gaussian_noise(&signal, 0.01, &mut rng);
    assert_eq!(noisy.len(), signal.len());

    let residuals: Vec<f64> = noisy.iter().zip(&signal).map(|(n, s)| n - s).collect();
    let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
    let std = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>()
        / (residuals.len() - 1) as f64)
        .sqrt();
    // σ = 0.01 × mean(|−100|) = 1.
    assert!(mean.abs() < 0.05, "noise mean {mean}");
    assert!((std - 1.0).abs() < 0.05, "noise std {std}");
}

#[test]
fn noise_on_zero_signal_is_identity() {
    let mut rng = SeededRng::new(8, 0);
    assert_eq!(add_gaussian_noise(&[0.0; 8], 0.5, &mut rng), vec![0.0; 8]);
    assert!(add_gaussian_noise(&[], 0.5, &mut rng).is_empty());
}
