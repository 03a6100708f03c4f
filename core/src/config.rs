use crate::{
    error::{SimError, SimResult},
    persona::Persona,
};
use serde::{Deserialize, Serialize};

/// Samples per synthetic day: 24 hours at 15-minute resolution.
pub const HORIZON: usize = 96;

/// Directory the generator writes to when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "data";

/// Window of the rolling-volatility estimator applied to every P series.
pub const VOLATILITY_WINDOW: usize = 5;

// ── Q backfill ─────────────────────────────────────────────────────

/// Range of the per-customer factor that derives Q from P when the
/// persona leaves Q unmeasured.
pub const BACKFILL_Q_FACTOR: (f64, f64) = (0.1, 0.25);
pub const BACKFILL_Q_NOISE_RATIO: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaCount {
    pub persona: Persona,
    pub count:   usize,
}

/// The fixed parameter set of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub horizon:      usize,
    /// Population per persona, in generation order.
    pub distribution: Vec<PersonaCount>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            horizon: HORIZON,
            distribution: vec![
                PersonaCount { persona: Persona::P1, count: 50 },
                PersonaCount { persona: Persona::P2, count: 80 },
                PersonaCount { persona: Persona::P3, count: 60 },
                PersonaCount { persona: Persona::P4, count: 300 },
                PersonaCount { persona: Persona::P5, count: 60 },
            ],
        }
    }
}

impl DatasetConfig {
    /// Same horizon as the default, with a custom population.
    pub fn with_distribution(distribution: Vec<PersonaCount>) -> Self {
        Self { horizon: HORIZON, distribution }
    }

    pub fn total_customers(&self) -> usize {
        self.distribution.iter().map(|pc| pc.count).sum()
    }

    pub fn total_rows(&self) -> usize {
        self.total_customers() * self.horizon
    }

    /// Reject parameter sets that would silently produce a degenerate dataset.
    pub fn validate(&self) -> SimResult<()> {
        if self.horizon == 0 {
            return Err(SimError::config("horizon must be at least one sample"));
        }
        if self.distribution.is_empty() {
            return Err(SimError::config("persona distribution is empty"));
        }
        for (i, pc) in self.distribution.iter().enumerate() {
            if pc.count == 0 {
                return Err(SimError::config(format!(
                    "population count for {} must be positive",
                    pc.persona
                )));
            }
            if self.distribution[..i].iter().any(|prev| prev.persona == pc.persona) {
                return Err(SimError::config(format!(
                    "{} appears more than once in the distribution",
                    pc.persona
                )));
            }
        }
        Ok(())
    }
}
