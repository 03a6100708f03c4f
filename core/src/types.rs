//! Shared primitive types and row schemas used across the crate.

use serde::{Deserialize, Serialize};

/// Index of a 15-minute sample within the day, `0..HORIZON`.
pub type Timestamp = usize;

/// A stable customer identifier, e.g. `CUST_0001`.
pub type CustomerId = String;

/// Format the 1-based customer ordinal as a zero-padded id.
pub fn customer_id(ordinal: u64) -> CustomerId {
    format!("CUST_{ordinal:04}")
}

/// One row of `ground_truth.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthRow {
    pub customer_id: CustomerId,
    pub persona_id:  String,
}

/// One row of `input_data_tidy.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TidyRow {
    pub customer_id: CustomerId,
    pub timestamp:   Timestamp,
    pub p_value:     f64,
    pub q_value:     f64,
    pub v_value:     f64,
}

/// A tidy row as read back from disk. `q_value` tolerates empty cells
/// so datasets produced by other tools can still be summarized.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MeasurementRecord {
    pub customer_id: CustomerId,
    pub timestamp:   Timestamp,
    pub p_value:     f64,
    pub q_value:     Option<f64>,
    pub v_value:     f64,
}

impl From<&TidyRow> for MeasurementRecord {
    fn from(row: &TidyRow) -> Self {
        Self {
            customer_id: row.customer_id.clone(),
            timestamp:   row.timestamp,
            p_value:     row.p_value,
            q_value:     Some(row.q_value),
            v_value:     row.v_value,
        }
    }
}
