mod cli;

use clap::Parser;
use mscosine::{precursor_mz_match_with, ScoringConfig, Spectrum};
use msimport::config::{load_config, ConfigOverrides};
use msimport::data::{mgf, sdf};
use msimport::MgfRecord;
use rayon::prelude::*;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cli::{Cli, CliError, Command, ScoringArgs};

#[derive(Serialize)]
struct PairResult<'a> {
    index: usize,
    query: Option<&'a str>,
    reference: Option<&'a str>,
    score: Option<f32>,
    matches: Option<usize>,
    precursor_match: Option<bool>,
}

fn resolve_config(args: &ScoringArgs, extra: ConfigOverrides) -> Result<ScoringConfig, CliError> {
    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ScoringConfig::default(),
    };

    let overrides = ConfigOverrides {
        precursor_tolerance: extra.precursor_tolerance,
        precursor_kind: extra.precursor_kind,
        ..args.overrides()
    };

    Ok(overrides.apply(config))
}

fn score_pair<'a>(index: usize, query: &'a MgfRecord, reference: &'a MgfRecord, config: &ScoringConfig) -> PairResult<'a> {
    let result = config.score(&query.spectrum, &reference.spectrum);

    let precursor_match = match (query.pepmass, reference.pepmass) {
        (Some(q), Some(r)) => Some(config.precursor_match(q, r)),
        _ => None,
    };

    PairResult {
        index,
        query: query.title(),
        reference: reference.title(),
        score: result.map(|r| r.score),
        matches: result.map(|r| r.matches),
        precursor_match,
    }
}

fn main() -> Result<(), CliError> {
    // Initialize logging, stdout is reserved for results
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();

    match args.command {
        Command::Score { a, b, scoring } => {
            let config = resolve_config(&scoring, ConfigOverrides::default())?;
            let a: Spectrum = a.parse()?;
            let b: Spectrum = b.parse()?;

            match config.score(&a, &b) {
                Some(result) => println!("{}", serde_json::to_string(&result)?),
                None => {
                    warn!("spectra too large to score");
                    println!("null");
                }
            }
        }

        Command::Precursor { query, reference, tolerance, kind } => {
            println!("{}", precursor_mz_match_with(query, reference, tolerance, kind));
        }

        Command::Pairs { query, reference, scoring, precursor_tolerance, precursor_kind } => {
            let config = resolve_config(
                &scoring,
                ConfigOverrides { precursor_tolerance, precursor_kind, ..Default::default() },
            )?;
            info!("Using scoring config: {:?}", config);

            let queries = mgf::from_path(&query)?;
            let references = mgf::from_path(&reference)?;

            if queries.len() != references.len() {
                warn!(
                    queries = queries.len(),
                    references = references.len(),
                    "record counts differ, scoring the common prefix"
                );
            }

            let results: Vec<PairResult> = queries
                .par_iter()
                .zip(references.par_iter())
                .enumerate()
                .map(|(index, (q, r))| score_pair(index, q, r, &config))
                .collect();

            for result in &results {
                println!("{}", serde_json::to_string(result)?);
            }

            info!("Scored {} pairs", results.len());
        }

        Command::Print { mgf, sdf, field } => {
            let spectra: Vec<(Option<String>, Spectrum)> = match (mgf, sdf) {
                (Some(path), _) => mgf::from_path(&path)?
                    .into_iter()
                    .map(|record| (record.title().map(str::to_string), record.spectrum))
                    .collect(),
                (None, Some(path)) => sdf::from_path(&path, &field)?
                    .into_iter()
                    .filter_map(|record| {
                        let name = record.properties.get("NAME").cloned();
                        record.spectrum.map(|s| (name, s))
                    })
                    .collect(),
                (None, None) => Vec::new(),
            };

            for (name, spectrum) in spectra {
                match name {
                    Some(name) => println!("{}\t{}", name, spectrum),
                    None => println!("{}", spectrum),
                }
            }
        }
    }

    Ok(())
}
