//! Persona shape tests.
//!
//! Expected values are estimated by averaging many customers of one
//! persona, each drawn from its own stream.

use loadgen_core::{
    config::HORIZON,
    persona::{
        household_baseline, Persona, Profile, ReactivePower, P2_WORK_HOURS, P3_OPEN_HOURS,
        P4_EVENING_HOURS, P5_SOLAR_HOURS,
    },
    rng::RngBank,
};

fn draw_many(persona: Persona, n: u64, seed: u64) -> Vec<Profile> {
    let bank = RngBank::new(seed);
    (1..=n)
        .map(|ordinal| {
            let mut rng = bank.for_customer(ordinal);
            persona.generate(HORIZON, &mut rng).expect("generate")
        })
        .collect()
}

fn mean_p(profiles: &[Profile]) -> Vec<f64> {
    (0..HORIZON)
        .map(|t| profiles.iter().map(|p| p.p[t]).sum::<f64>() / profiles.len() as f64)
        .collect()
}

fn measured(q: &ReactivePower) -> &[f64] {
    match q {
        ReactivePower::Measured(q) => q,
        ReactivePower::Unmeasured => panic!("expected measured Q"),
    }
}

#[test]
fn every_persona_returns_horizon_length_series() {
    for persona in Persona::ALL {
        for profile in draw_many(persona, 5, 1) {
            assert_eq!(profile.p.len(), HORIZON, "{persona} P length");
            assert_eq!(profile.v.len(), HORIZON, "{persona} V length");
            if let ReactivePower::Measured(q) = &profile.q {
                assert_eq!(q.len(), HORIZON, "{persona} Q length");
            }
            assert!(profile.v.iter().all(|v| v.is_finite() && *v >= 0.0));
        }
    }
}

#[test]
fn only_households_leave_q_unmeasured() {
    for persona in Persona::ALL {
        let profile = &draw_many(persona, 1, 2)[0];
        assert_eq!(
            profile.q == ReactivePower::Unmeasured,
            persona.is_residential(),
            "{persona} Q measurement"
        );
    }
}

#[test]
fn p1_stays_near_its_baseline() {
    for profile in draw_many(Persona::P1, 50, 3) {
        // 475 ± 25 jitter, plus noise of σ ≈ 2.4.
        assert!(profile.p.iter().all(|&p| (430.0..520.0).contains(&p)));
        assert!(measured(&profile.q).iter().all(|&q| q.abs() < 12.0));
    }
}

#[test]
fn p2_work_hours_exceed_off_hours() {
    let mean = mean_p(&draw_many(Persona::P2, 300, 4));
    let (start, end) = P2_WORK_HOURS;
    let inside_min = mean[start..end].iter().copied().fold(f64::INFINITY, f64::min);
    let outside_max = mean[..start]
        .iter()
        .chain(&mean[end..])
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(
        inside_min > outside_max,
        "work-hour minimum {inside_min:.1} not above off-hour maximum {outside_max:.1}"
    );
}

#[test]
fn p2_carries_two_violation_spikes() {
    for profile in draw_many(Persona::P2, 30, 5) {
        // A spike adds at least 2.5 × ~300 on top of a ≤ 300 base.
        let spikes = profile.p.iter().filter(|&&p| p > 700.0).count();
        assert_eq!(spikes, 2, "expected two spikes, got {spikes}");
    }
}

#[test]
fn p3_reactive_power_is_confined_to_open_hours() {
    let (start, end) = P3_OPEN_HOURS;
    for profile in draw_many(Persona::P3, 20, 6) {
        let q = measured(&profile.q);
        for t in start..end {
            let ratio = q[t] / profile.p[t];
            assert!((0.25..0.45).contains(&ratio), "t={t}: q/p = {ratio}");
        }
        let outside_max = q[..start].iter().chain(&q[end..]).map(|x| x.abs()).fold(0.0, f64::max);
        // Only noise outside: σ = 0.005 × mean|Q| is well under 1.
        assert!(outside_max < 5.0, "off-hours Q reached {outside_max}");
    }
}

#[test]
fn p4_evening_boost_raises_expected_load() {
    let mean = mean_p(&draw_many(Persona::P4, 200, 7));
    let base = household_baseline(0.4, 0.2, 0.1, HORIZON);
    let (start, end) = P4_EVENING_HOURS;
    for t in start..end {
        // Expected boost is 0.5 × 2.0 = 1.0 kW.
        let lift = mean[t] - base[t];
        assert!((0.7..1.3).contains(&lift), "t={t}: evening lift {lift}");
    }
    for t in (0..start).chain(end..HORIZON) {
        assert!((mean[t] - base[t]).abs() < 0.05, "t={t}: unexpected lift");
    }
}

#[test]
fn p5_solar_window_reduces_load_below_baseline() {
    let mean = mean_p(&draw_many(Persona::P5, 200, 8));
    let base = household_baseline(0.5, 0.3, 0.2, HORIZON);
    let (start, end) = P5_SOLAR_HOURS;

    // The half-sine is zero on both window edges.
    for t in start + 1..end - 1 {
        assert!(mean[t] < base[t] - 0.2, "t={t}: {} not below baseline {}", mean[t], base[t]);
    }
    for t in (0..start).chain(end..HORIZON) {
        assert!((mean[t] - base[t]).abs() < 0.05, "t={t}: solar offset outside window");
    }
    // Midday export: net P goes negative at the solar peak.
    assert!(mean[(start + end) / 2] < 0.0);
}
