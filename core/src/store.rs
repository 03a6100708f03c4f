//! CSV persistence layer.
//!
//! RULE: Only store.rs talks to the filesystem.
//! The engine streams rows into a sink and never opens files directly.
//!
//! Both tables are written to `*.partial` files and renamed into place
//! only after both are complete. A failed run leaves no new table behind;
//! a ground-truth table from an earlier run is moved aside while
//! publishing and restored if the tidy table cannot be placed.

use crate::{
    engine::{DatasetEngine, DatasetSummary},
    error::{SimError, SimResult},
    sink::DatasetSink,
    types::{GroundTruthRow, MeasurementRecord, TidyRow},
};
use serde::de::DeserializeOwned;
use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

pub const GROUND_TRUTH_FILE: &str = "ground_truth.csv";
pub const TIDY_FILE: &str = "input_data_tidy.csv";
const PARTIAL_SUFFIX: &str = ".partial";
const PREVIOUS_SUFFIX: &str = ".previous";

/// Locations of the two tables inside a dataset directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub dir:          PathBuf,
    pub ground_truth: PathBuf,
    pub tidy:         PathBuf,
}

impl DatasetPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            ground_truth: dir.join(GROUND_TRUTH_FILE),
            tidy:         dir.join(TIDY_FILE),
            dir,
        }
    }

    fn sidecar(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.as_os_str().to_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }
}

/// Streams rows straight into the two CSV files.
pub struct CsvTableWriter {
    ground_truth: csv::Writer<BufWriter<File>>,
    tidy:         csv::Writer<BufWriter<File>>,
}

impl CsvTableWriter {
    pub fn create(ground_truth: &Path, tidy: &Path) -> SimResult<Self> {
        Ok(Self {
            ground_truth: csv::Writer::from_writer(BufWriter::new(File::create(ground_truth)?)),
            tidy:         csv::Writer::from_writer(BufWriter::new(File::create(tidy)?)),
        })
    }

    pub fn flush(&mut self) -> SimResult<()> {
        self.ground_truth.flush()?;
        self.tidy.flush()?;
        Ok(())
    }
}

impl DatasetSink for CsvTableWriter {
    fn record_customer(&mut self, row: &GroundTruthRow) -> SimResult<()> {
        self.ground_truth.serialize(row)?;
        Ok(())
    }

    fn record_sample(&mut self, row: &TidyRow) -> SimResult<()> {
        self.tidy.serialize(row)?;
        Ok(())
    }
}

/// Run the engine and publish both tables into `dir`, creating it if needed.
pub fn write_dataset(
    engine: &DatasetEngine,
    dir: impl AsRef<Path>,
) -> SimResult<(DatasetPaths, DatasetSummary)> {
    let paths = DatasetPaths::in_dir(dir);
    fs::create_dir_all(&paths.dir)?;

    let gt_partial = DatasetPaths::sidecar(&paths.ground_truth, PARTIAL_SUFFIX);
    let tidy_partial = DatasetPaths::sidecar(&paths.tidy, PARTIAL_SUFFIX);

    match publish(engine, &paths, &gt_partial, &tidy_partial) {
        Ok(summary) => Ok((paths, summary)),
        Err(err) => {
            for partial in [&gt_partial, &tidy_partial] {
                if let Err(e) = remove_if_present(partial) {
                    log::warn!("could not remove {}: {e}", partial.display());
                }
            }
            Err(err)
        }
    }
}

fn publish(
    engine: &DatasetEngine,
    paths: &DatasetPaths,
    gt_partial: &Path,
    tidy_partial: &Path,
) -> SimResult<DatasetSummary> {
    let mut writer = CsvTableWriter::create(gt_partial, tidy_partial)?;
    let summary = engine.run(&mut writer)?;
    writer.flush()?;
    drop(writer);

    let previous = DatasetPaths::sidecar(&paths.ground_truth, PREVIOUS_SUFFIX);
    let had_previous = move_aside(&paths.ground_truth, &previous)?;

    match place_tables(paths, gt_partial, tidy_partial) {
        Ok(()) => {
            if had_previous {
                if let Err(e) = remove_if_present(&previous) {
                    log::warn!("could not remove {}: {e}", previous.display());
                }
            }
            Ok(summary)
        }
        Err(err) => {
            if had_previous {
                if let Err(e) = fs::rename(&previous, &paths.ground_truth) {
                    log::error!(
                        "could not restore {} from {}: {e}",
                        paths.ground_truth.display(),
                        previous.display()
                    );
                }
            }
            Err(err.into())
        }
    }
}

/// Rename both partials into place. If the tidy table cannot be placed,
/// the freshly published ground truth is withdrawn again.
fn place_tables(paths: &DatasetPaths, gt_partial: &Path, tidy_partial: &Path) -> io::Result<()> {
    fs::rename(gt_partial, &paths.ground_truth)?;
    if let Err(err) = fs::rename(tidy_partial, &paths.tidy) {
        if let Err(e) = remove_if_present(&paths.ground_truth) {
            log::error!("could not withdraw {}: {e}", paths.ground_truth.display());
        }
        return Err(err);
    }
    Ok(())
}

/// Move `path` to `aside`. Returns false if there was nothing to move.
fn move_aside(path: &Path, aside: &Path) -> io::Result<bool> {
    match fs::rename(path, aside) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Both tables of a dataset directory, as read back from disk.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub paths:        DatasetPaths,
    pub ground_truth: Vec<GroundTruthRow>,
    pub measurements: Vec<MeasurementRecord>,
}

/// Read both tables. Fails with `MissingInput` before reading anything
/// if either file is absent.
pub fn load_dataset(dir: impl AsRef<Path>) -> SimResult<LoadedDataset> {
    let paths = DatasetPaths::in_dir(dir);
    for path in [&paths.tidy, &paths.ground_truth] {
        if !path.is_file() {
            return Err(SimError::MissingInput { path: path.clone() });
        }
    }
    let ground_truth = read_table(&paths.ground_truth)?;
    let measurements = read_table(&paths.tidy)?;
    log::info!(
        "loaded {} customers and {} measurements from {}",
        ground_truth.len(),
        measurements.len(),
        paths.dir.display()
    );
    Ok(LoadedDataset { paths, ground_truth, measurements })
}

fn read_table<T: DeserializeOwned>(path: &Path) -> SimResult<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)?;
    reader
        .deserialize::<T>()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| SimError::MalformedTable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
