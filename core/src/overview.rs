//! Summary statistics behind the dataset overview figure.
//!
//! Everything here is a pure function of the two tables (plus an RNG
//! for picking individual sample customers), so the figure's numbers
//! can be tested without rendering anything.

use crate::{
    persona::Persona,
    rng::SeededRng,
    types::{GroundTruthRow, MeasurementRecord},
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Individual customer curves drawn behind each mean profile.
pub const INDIVIDUAL_SAMPLES: usize = 3;

/// Points on the evaluation grid of the Q density.
pub const DENSITY_GRID_POINTS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    P,
    Q,
    V,
}

impl Column {
    fn read(&self, r: &MeasurementRecord) -> Option<f64> {
        let value = match self {
            Self::P => Some(r.p_value),
            Self::Q => r.q_value,
            Self::V => Some(r.v_value),
        };
        value.filter(|v| v.is_finite())
    }
}

/// Tidy measurements joined to their persona on `customer_id`.
/// Rows without a ground-truth match are dropped (inner join).
pub struct JoinedTables<'a> {
    rows: Vec<(&'a str, &'a MeasurementRecord)>,
}

impl<'a> JoinedTables<'a> {
    pub fn join(ground_truth: &'a [GroundTruthRow], measurements: &'a [MeasurementRecord]) -> Self {
        let persona_of: HashMap<&str, &str> = ground_truth
            .iter()
            .map(|r| (r.customer_id.as_str(), r.persona_id.as_str()))
            .collect();
        let rows = measurements
            .iter()
            .filter_map(|m| persona_of.get(m.customer_id.as_str()).map(|p| (*p, m)))
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Persona ids present in the joined data, sorted.
    pub fn persona_ids(&self) -> Vec<&'a str> {
        let ids: BTreeSet<&str> = self.rows.iter().map(|(p, _)| *p).collect();
        ids.into_iter().collect()
    }

    /// Samples per customer: one past the largest timestamp seen.
    pub fn horizon(&self) -> usize {
        self.rows.iter().map(|(_, m)| m.timestamp + 1).max().unwrap_or(0)
    }

    /// Customers × timestamps matrix of one column for one persona.
    /// `None` if the persona has no rows.
    pub fn pivot(&self, persona_id: &str, column: Column) -> Option<PersonaMatrix> {
        let horizon = self.horizon();
        let mut by_customer: BTreeMap<&str, Vec<Option<f64>>> = BTreeMap::new();
        for (_, m) in self.rows.iter().filter(|(p, _)| *p == persona_id) {
            let row = by_customer
                .entry(m.customer_id.as_str())
                .or_insert_with(|| vec![None; horizon]);
            row[m.timestamp] = column.read(m);
        }
        if by_customer.is_empty() {
            return None;
        }
        let (customers, values) = by_customer
            .into_iter()
            .map(|(c, v)| (c.to_string(), v))
            .unzip();
        Some(PersonaMatrix {
            persona_id: persona_id.to_string(),
            customers,
            values,
        })
    }

    /// Defined Q values of every customer outside the residential personas.
    pub fn commercial_reactive_values(&self) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|(p, _)| !is_residential_id(p))
            .filter_map(|(_, m)| Column::Q.read(m))
            .collect()
    }

    /// Share of rows with an undefined Q, per persona, in percent.
    pub fn missing_q_percentage(&self) -> Vec<(String, f64)> {
        let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for (p, m) in &self.rows {
            let entry = counts.entry(*p).or_default();
            entry.0 += 1;
            if Column::Q.read(m).is_none() {
                entry.1 += 1;
            }
        }
        counts
            .into_iter()
            .map(|(p, (total, missing))| (p.to_string(), 100.0 * missing as f64 / total as f64))
            .collect()
    }
}

fn is_residential_id(persona_id: &str) -> bool {
    persona_id
        .parse::<Persona>()
        .map(|p| p.is_residential())
        .unwrap_or(false)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonaMatrix {
    pub persona_id: String,
    /// Row labels, sorted.
    pub customers:  Vec<String>,
    pub values:     Vec<Vec<Option<f64>>>,
}

impl PersonaMatrix {
    /// Column-wise mean ignoring undefined cells.
    pub fn mean_profile(&self) -> Vec<Option<f64>> {
        let horizon = self.values.first().map_or(0, Vec::len);
        (0..horizon)
            .map(|t| {
                let (sum, n) = self
                    .values
                    .iter()
                    .filter_map(|row| row[t])
                    .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
                (n > 0).then(|| sum / n as f64)
            })
            .collect()
    }

    /// Up to `k` distinct rows picked at random.
    pub fn sample_rows(&self, k: usize, rng: &mut SeededRng) -> Vec<&[Option<f64>]> {
        let k = k.min(self.values.len());
        rng.sample_indices(self.values.len(), k)
            .into_iter()
            .map(|i| self.values[i].as_slice())
            .collect()
    }
}

/// Gaussian kernel density estimate with Scott's bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelDensity {
    values:    Vec<f64>,
    bandwidth: f64,
}

impl KernelDensity {
    /// `None` for fewer than two values or zero spread.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let n = values.len();
        if n < 2 {
            return None;
        }
        let mean = values.iter().sum::<f64>() / n as f64;
        let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let bandwidth = var.sqrt() * (n as f64).powf(-0.2);
        (bandwidth > 0.0 && bandwidth.is_finite()).then(|| Self {
            values: values.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn density(&self, x: f64) -> f64 {
        let norm = 1.0 / (self.values.len() as f64 * self.bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        norm * self
            .values
            .iter()
            .map(|v| {
                let z = (x - v) / self.bandwidth;
                (-0.5 * z * z).exp()
            })
            .sum::<f64>()
    }

    /// Density on `points` evenly spaced x values spanning the data
    /// plus three bandwidths either side.
    pub fn curve(&self, points: usize) -> Vec<(f64, f64)> {
        let (lo, hi) = self
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let pad = 3.0 * self.bandwidth;
        crate::signal::linspace(lo - pad, hi + pad, points)
            .into_iter()
            .map(|x| (x, self.density(x)))
            .collect()
    }
}

/// Mean and sampled individual curves of one persona.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSeries {
    pub persona_id: String,
    pub mean:       Vec<Option<f64>>,
    pub samples:    Vec<Vec<Option<f64>>>,
}

/// Everything the overview figure draws.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub horizon:     usize,
    pub commercial:  Vec<PersonaSeries>,
    pub residential: Vec<PersonaSeries>,
    pub q_density:   Option<Vec<(f64, f64)>>,
    pub missing_q:   Vec<(String, f64)>,
}

impl DatasetOverview {
    pub fn build(
        ground_truth: &[GroundTruthRow],
        measurements: &[MeasurementRecord],
        rng: &mut SeededRng,
    ) -> Self {
        let joined = JoinedTables::join(ground_truth, measurements);
        let mut commercial = Vec::new();
        let mut residential = Vec::new();

        for persona in Persona::ALL {
            let Some(matrix) = joined.pivot(persona.id(), Column::P) else {
                log::debug!("overview: no rows for {persona}, skipping");
                continue;
            };
            let series = PersonaSeries {
                persona_id: matrix.persona_id.clone(),
                mean:       matrix.mean_profile(),
                samples:    matrix
                    .sample_rows(INDIVIDUAL_SAMPLES, rng)
                    .into_iter()
                    .map(<[Option<f64>]>::to_vec)
                    .collect(),
            };
            if persona.is_residential() {
                residential.push(series);
            } else {
                commercial.push(series);
            }
        }

        let q_density = KernelDensity::fit(&joined.commercial_reactive_values())
            .map(|kde| kde.curve(DENSITY_GRID_POINTS));

        Self {
            horizon: joined.horizon(),
            commercial,
            residential,
            q_density,
            missing_q: joined.missing_q_percentage(),
        }
    }

    /// Hour of day for each timestamp.
    pub fn time_axis(&self) -> Vec<f64> {
        let step = 24.0 / self.horizon.max(1) as f64;
        (0..self.horizon).map(|t| t as f64 * step).collect()
    }
}
