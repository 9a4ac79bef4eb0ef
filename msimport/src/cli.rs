use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mscosine::ToleranceKind;
use msimport::config::ConfigOverrides;
use msimport::ImportError;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cosine similarity of mass spectra with optimal peak matching", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score two spectrum literals against each other
    Score {
        /// First spectrum, e.g. "100:1 200:3" or "[(100, 1), (200, 3)]"
        #[arg(long)]
        a: String,

        /// Second spectrum
        #[arg(long)]
        b: String,

        #[command(flatten)]
        scoring: ScoringArgs,
    },

    /// Check two precursor masses against a tolerance
    Precursor {
        #[arg(long)]
        query: f32,

        #[arg(long)]
        reference: f32,

        #[arg(long)]
        tolerance: f32,

        /// Tolerance unit, "da" or "ppm"
        #[arg(long, default_value = "da")]
        kind: ToleranceKind,
    },

    /// Score record k of one MGF file against record k of another, one JSON line per pair
    Pairs {
        #[arg(long)]
        query: PathBuf,

        #[arg(long)]
        reference: PathBuf,

        #[command(flatten)]
        scoring: ScoringArgs,

        /// Precursor tolerance (will over-write the config file)
        #[arg(long)]
        precursor_tolerance: Option<f32>,

        /// Precursor tolerance unit (will over-write the config file)
        #[arg(long)]
        precursor_kind: Option<ToleranceKind>,
    },

    /// Print the spectra of an MGF or SDF file as literals
    Print {
        #[arg(long, conflicts_with = "sdf", required_unless_present = "sdf")]
        mgf: Option<PathBuf>,

        #[arg(long)]
        sdf: Option<PathBuf>,

        /// SDF data item holding the peak list
        #[arg(long, default_value = "MASS SPECTRAL PEAKS")]
        field: String,
    },
}

#[derive(Args, Debug)]
pub struct ScoringArgs {
    /// Path to a JSON scoring configuration
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fragment m/z tolerance in Da (will over-write the config file)
    #[arg(long)]
    pub tolerance: Option<f32>,

    /// Exponent on the m/z product (will over-write the config file)
    #[arg(long)]
    pub mz_power: Option<f32>,

    /// Exponent on the intensity product (will over-write the config file)
    #[arg(long)]
    pub intensity_power: Option<f32>,
}

impl ScoringArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            tolerance: self.tolerance,
            mz_power: self.mz_power,
            intensity_power: self.intensity_power,
            ..Default::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("error writing output: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<mscosine::SpectrumError> for CliError {
    fn from(e: mscosine::SpectrumError) -> Self {
        CliError::Import(e.into())
    }
}
