//! Persona-conditioned load-profile dataset generator.
//!
//! Module map (leaf to root):
//!   - `signal`  : noise, spike and rolling-volatility primitives
//!   - `persona` : the five persona generators
//!   - `engine`  : population construction, dispatch, Q backfill, emission
//!   - `sink`    : row sink trait and the in-memory table buffer
//!   - `store`   : CSV tables on disk (the only module touching files)
//!   - `overview`: summary statistics consumed by the visualizer

pub mod config;
pub mod engine;
pub mod error;
pub mod overview;
pub mod persona;
pub mod rng;
pub mod signal;
pub mod sink;
pub mod store;
pub mod types;
