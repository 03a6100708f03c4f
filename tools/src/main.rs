//! dataset-gen: synthesize the persona load-profile dataset.
//!
//! Usage:
//!   dataset-gen                     # writes into ./data
//!   dataset-gen out/ --seed 12345

use anyhow::{Context, Result};
use loadgen_core::{
    config::{DatasetConfig, DEFAULT_OUTPUT_DIR},
    engine::DatasetEngine,
    store::write_dataset,
};
use loadgen_tools::cli::CliArgs;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cli = CliArgs::parse(&args)?;
    let output_dir = cli.dir.clone().unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let seed = cli.seed_or_clock();
    let config = DatasetConfig::default();

    println!("Load-profile dataset generator");
    println!("  output:    {output_dir}");
    println!("{}", cli.seed_line("seed", seed));
    println!("  customers: {}", config.total_customers());
    println!();

    let engine = DatasetEngine::new(config, seed)?;
    let (paths, summary) = write_dataset(&engine, &output_dir)
        .with_context(|| format!("failed to write dataset into '{output_dir}'"))?;

    println!("=== DATASET SUMMARY ===");
    for (persona, count) in &summary.per_persona {
        println!("  {persona} {:<28} {count:>5} customers", persona.label());
    }
    println!("  total customers: {}", summary.customers);
    println!("  tidy rows:       {}", summary.rows);
    println!("  -> {}", paths.ground_truth.display());
    println!("  -> {}", paths.tidy.display());
    Ok(())
}
