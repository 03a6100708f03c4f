//! Persona generators.
//!
//! Each persona draws one synthetic day: a deterministic base shape,
//! stochastic perturbation through the signal primitives, and the
//! rolling volatility of the final P series.

use crate::{
    config::VOLATILITY_WINDOW,
    error::{SimError, SimResult},
    rng::SeededRng,
    signal::{
        add_gaussian_noise, add_spikes, half_sine, linspace, rolling_volatility, window,
        DEFAULT_NOISE_RATIO,
    },
};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Persona {
    P1,
    P2,
    P3,
    P4,
    P5,
}

impl Persona {
    /// Generation order. NEVER reorder: customer ids depend on it.
    pub const ALL: [Persona; 5] = [Self::P1, Self::P2, Self::P3, Self::P4, Self::P5];

    pub fn id(&self) -> &'static str {
        match self {
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
            Self::P4 => "P4",
            Self::P5 => "P5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::P1 => "FDI Good Compliance",
            Self::P2 => "Enterprise Violation",
            Self::P3 => "Shopping Center",
            Self::P4 => "Household (Air Conditioner)",
            Self::P5 => "Household (Solar Power)",
        }
    }

    /// Households report no reactive power of their own.
    pub fn is_residential(&self) -> bool {
        matches!(self, Self::P4 | Self::P5)
    }

    /// Draw one day of P, Q and V for a single customer.
    pub fn generate(&self, length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
        match self {
            Self::P1 => fdi_compliant(length, rng),
            Self::P2 => enterprise_violation(length, rng),
            Self::P3 => shopping_center(length, rng),
            Self::P4 => household_air_conditioner(length, rng),
            Self::P5 => household_solar(length, rng),
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Persona {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == s)
            .ok_or_else(|| SimError::config(format!("unknown persona id '{s}'")))
    }
}

/// Reactive power as produced by a generator.
///
/// `Unmeasured` never reaches a table: the engine re-derives the
/// whole series from P first.
#[derive(Debug, Clone, PartialEq)]
pub enum ReactivePower {
    Measured(Vec<f64>),
    Unmeasured,
}

/// One customer's synthetic day.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub p: Vec<f64>,
    pub q: ReactivePower,
    pub v: Vec<f64>,
}

impl Profile {
    fn finish(p: Vec<f64>, q: ReactivePower) -> SimResult<Self> {
        let v = rolling_volatility(&p, VOLATILITY_WINDOW)?;
        Ok(Self { p, q, v })
    }
}

// ── P1: flat, well-behaved industrial load ─────────────────────────

fn fdi_compliant(length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
    let p: Vec<f64> = (0..length).map(|_| 475.0 + rng.uniform(-25.0, 25.0)).collect();
    let q: Vec<f64> = (0..length).map(|_| rng.uniform(-10.0, 10.0)).collect();
    let p = add_gaussian_noise(&p, DEFAULT_NOISE_RATIO, rng);
    let q = add_gaussian_noise(&q, 0.01, rng);
    Profile::finish(p, ReactivePower::Measured(q))
}

// ── P2: industrial load with violations ────────────────────────────

pub const P2_WORK_HOURS: (usize, usize) = (32, 68);
const P2_SPIKES: usize = 2;
const P2_SPIKE_MAGNITUDE: f64 = 2.5;

fn enterprise_violation(length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
    let work = window(P2_WORK_HOURS.0, P2_WORK_HOURS.1, length);
    let mut p = vec![80.0; length];
    for (slot, bump) in p[work.clone()].iter_mut().zip(half_sine(work.len())) {
        *slot = 200.0 + 100.0 * bump;
    }
    let p = add_spikes(&p, P2_SPIKES, P2_SPIKE_MAGNITUDE, rng)?;

    // Often inductive: Q tracks the spiked P during work hours.
    let factor = rng.uniform(1.0, 1.2);
    let mut q = vec![0.0; length];
    for i in work {
        q[i] = p[i] * factor;
    }

    let p = add_gaussian_noise(&p, DEFAULT_NOISE_RATIO, rng);
    let q = add_gaussian_noise(&q, DEFAULT_NOISE_RATIO, rng);
    Profile::finish(p, ReactivePower::Measured(q))
}

// ── P3: commercial double-peak ─────────────────────────────────────

pub const P3_OPEN_HOURS: (usize, usize) = (36, 88);

fn shopping_center(length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
    let open = window(P3_OPEN_HOURS.0, P3_OPEN_HOURS.1, length);
    let n = open.len();
    let trend = linspace(200.0, 400.0, n);
    let dip = linspace(0.0, 200.0, n);
    let bump = half_sine(n);
    let mut p = vec![120.0; length];
    for (k, i) in open.clone().enumerate() {
        p[i] = trend[k] - dip[k] * bump[k];
    }

    let factor = rng.uniform(0.3, 0.4);
    let mut q = vec![0.0; length];
    for i in open {
        q[i] = p[i] * factor;
    }

    let p = add_gaussian_noise(&p, DEFAULT_NOISE_RATIO, rng);
    let q = add_gaussian_noise(&q, DEFAULT_NOISE_RATIO, rng);
    Profile::finish(p, ReactivePower::Measured(q))
}

// ── Households ─────────────────────────────────────────────────────

pub const P4_EVENING_HOURS: (usize, usize) = (74, 94);
pub const P5_SOLAR_HOURS: (usize, usize) = (36, 64);
const HOUSEHOLD_NOISE_RATIO: f64 = 0.05;
const SOLAR_PEAK: f64 = 4.5;

/// Two slow daily cycles: `mean + amplitude · sin(linspace(0, 4π))`,
/// floored at `floor`.
pub fn household_baseline(mean: f64, amplitude: f64, floor: f64, length: usize) -> Vec<f64> {
    linspace(0.0, 4.0 * std::f64::consts::PI, length)
        .into_iter()
        .map(|x| (mean + amplitude * x.sin()).max(floor))
        .collect()
}

fn household_air_conditioner(length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
    let mut p = household_baseline(0.4, 0.2, 0.1, length);
    // One boost level per household, switched on or off per sample.
    let boost = rng.uniform(1.5, 2.5);
    for i in window(P4_EVENING_HOURS.0, P4_EVENING_HOURS.1, length) {
        if rng.chance(0.5) {
            p[i] += boost;
        }
    }
    let p = add_gaussian_noise(&p, HOUSEHOLD_NOISE_RATIO, rng);
    Profile::finish(p, ReactivePower::Unmeasured)
}

fn household_solar(length: usize, rng: &mut SeededRng) -> SimResult<Profile> {
    let mut p = household_baseline(0.5, 0.3, 0.2, length);
    let solar = window(P5_SOLAR_HOURS.0, P5_SOLAR_HOURS.1, length);
    for (i, output) in solar.clone().zip(half_sine(solar.len())) {
        p[i] -= SOLAR_PEAK * output;
    }
    let p = add_gaussian_noise(&p, HOUSEHOLD_NOISE_RATIO, rng);
    Profile::finish(p, ReactivePower::Unmeasured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_ids_round_trip_through_from_str() {
        for persona in Persona::ALL {
            assert_eq!(persona.id().parse::<Persona>().unwrap(), persona);
        }
        assert!("P6".parse::<Persona>().is_err());
    }

    #[test]
    fn household_baseline_respects_floor() {
        let base = household_baseline(0.4, 0.2, 0.5, 96);
        assert!(base.iter().all(|&x| x >= 0.5));
        assert!(base.iter().any(|&x| x == 0.5), "floor should bind below the mean");
        assert!(base.iter().any(|&x| x > 0.5));
    }
}
