//! Shared plumbing for the `dataset-gen` and `dataset-viz` binaries.

pub mod cli;
pub mod render;
