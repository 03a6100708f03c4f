//! dataset-viz: render `dataset_overview.png` for a generated dataset.
//!
//! Usage:
//!   dataset-viz data/ [--seed N]

use anyhow::{bail, Context, Result};
use loadgen_core::{
    overview::DatasetOverview,
    rng::{RngBank, RngSlot},
    store::load_dataset,
};
use loadgen_tools::{cli::CliArgs, render};
use std::{env, path::Path};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let cli = CliArgs::parse(&args)?;
    let Some(dataset_dir) = cli.dir.as_deref() else {
        bail!("usage: dataset-viz DATASET_DIR [--seed N]");
    };
    let seed = cli.seed_or_clock();

    println!("--- Visualizing dataset in: {dataset_dir} ---");
    println!("{}", cli.seed_line("seed", seed));
    let dataset = match load_dataset(dataset_dir) {
        Ok(dataset) => dataset,
        Err(err) => {
            log::error!("{err}");
            return Err(err).context(format!("cannot visualize '{dataset_dir}'"));
        }
    };

    let mut rng = RngBank::new(seed).for_slot(RngSlot::Overview);
    let overview = DatasetOverview::build(&dataset.ground_truth, &dataset.measurements, &mut rng);

    let out_path = dataset.paths.dir.join(render::OVERVIEW_FILE);
    render::render_overview(&overview, &render::title_for(Path::new(dataset_dir)), &out_path)?;

    println!("Done! Overview image saved to: {}", out_path.display());
    Ok(())
}
