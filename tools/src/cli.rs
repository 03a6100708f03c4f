//! Command-line parsing shared by both binaries.
//!
//! Usage:
//!   dataset-gen [OUTPUT_DIR] [--seed N]
//!   dataset-viz DATASET_DIR [--seed N]

use anyhow::{bail, Context, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub dir:  Option<String>,
    pub seed: Option<u64>,
}

impl CliArgs {
    /// Parse `args` as returned by `std::env::args()`, program name first.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut dir = None;
        let mut seed = None;
        let mut rest = args.iter().skip(1);
        while let Some(arg) = rest.next() {
            match arg.as_str() {
                "--seed" => {
                    let raw = rest.next().context("--seed needs a value")?;
                    seed = Some(raw.parse().with_context(|| format!("invalid seed '{raw}'"))?);
                }
                flag if flag.starts_with("--") => bail!("unknown flag '{flag}'"),
                positional => {
                    if dir.is_some() {
                        bail!("unexpected extra argument '{positional}'");
                    }
                    dir = Some(positional.to_string());
                }
            }
        }
        Ok(Self { dir, seed })
    }

    /// The explicit seed, or one taken from the wall clock.
    pub fn seed_or_clock(&self) -> u64 {
        self.seed.unwrap_or_else(clock_seed)
    }

    /// Header line naming the seed in use and where it came from.
    pub fn seed_line(&self, label: &str, seed: u64) -> String {
        let source = if self.seed.is_some() {
            "given"
        } else {
            "from clock, replay with --seed"
        };
        format!("  {:<11}{seed} ({source})", format!("{label}:"))
    }
}

fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
