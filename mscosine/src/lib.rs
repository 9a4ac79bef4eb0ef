// data module
pub mod data {
    pub mod spectrum;
    pub mod literal;
}

// similarity module
pub mod similarity {
    pub mod scoring;
    pub mod candidates;
    pub mod assignment;
    pub mod cosine;
    pub mod precursor;
}

pub mod config;
pub mod errors;
pub mod tolerance;

pub use crate::config::ScoringConfig;
pub use crate::data::spectrum::{Peak, Spectrum};
pub use crate::errors::SpectrumError;
pub use crate::similarity::cosine::{cosine_hungarian, cosine_score, CosineScore};
pub use crate::similarity::precursor::{precursor_mz_match, precursor_mz_match_with};
pub use crate::tolerance::{PrecursorTolerance, ToleranceKind};
