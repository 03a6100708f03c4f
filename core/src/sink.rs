//! Row sinks.
//!
//! RULE: the engine never materializes the dataset itself. It streams
//! every row into a DatasetSink, in generation order:
//! one `record_customer` followed by that customer's samples.

use crate::{
    error::SimResult,
    types::{GroundTruthRow, MeasurementRecord, TidyRow},
};

/// The contract every output target must fulfill.
pub trait DatasetSink {
    fn record_customer(&mut self, row: &GroundTruthRow) -> SimResult<()>;

    fn record_sample(&mut self, row: &TidyRow) -> SimResult<()>;
}

/// Keeps both tables in memory. Used by tests and tooling.
#[derive(Debug, Default, Clone)]
pub struct TableBuffer {
    pub ground_truth: Vec<GroundTruthRow>,
    pub tidy:         Vec<TidyRow>,
}

impl TableBuffer {
    pub fn with_capacity(customers: usize, rows: usize) -> Self {
        Self {
            ground_truth: Vec::with_capacity(customers),
            tidy:         Vec::with_capacity(rows),
        }
    }

    /// All samples of one customer, in emission order.
    pub fn samples_for<'a>(&'a self, customer_id: &'a str) -> impl Iterator<Item = &'a TidyRow> {
        self.tidy.iter().filter(move |r| r.customer_id == customer_id)
    }

    pub fn persona_of(&self, customer_id: &str) -> Option<&str> {
        self.ground_truth
            .iter()
            .find(|r| r.customer_id == customer_id)
            .map(|r| r.persona_id.as_str())
    }

    /// The tidy table in the shape the overview statistics consume.
    pub fn measurement_records(&self) -> Vec<MeasurementRecord> {
        self.tidy.iter().map(MeasurementRecord::from).collect()
    }
}

impl DatasetSink for TableBuffer {
    fn record_customer(&mut self, row: &GroundTruthRow) -> SimResult<()> {
        self.ground_truth.push(row.clone());
        Ok(())
    }

    fn record_sample(&mut self, row: &TidyRow) -> SimResult<()> {
        self.tidy.push(row.clone());
        Ok(())
    }
}
