use serde::{Deserialize, Serialize};

use crate::data::spectrum::Spectrum;
use crate::similarity::cosine::{cosine_hungarian, CosineScore};
use crate::similarity::precursor::precursor_mz_match;
use crate::similarity::scoring::ScoringParams;
use crate::tolerance::PrecursorTolerance;

/// Configuration for spectrum similarity scoring
///
/// Resolved once by the caller and passed by reference into the scoring and
/// precursor matching functions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Absolute m/z window (Da) within which two fragment peaks may be paired (default: 0.1)
    pub tolerance: f32,
    /// Exponent applied to the product of the paired m/z values (default: 0.0)
    pub mz_power: f32,
    /// Exponent applied to the product of the paired intensities (default: 1.0)
    pub intensity_power: f32,
    /// Precursor mass tolerance (default: 0.01 Da)
    pub precursor: PrecursorTolerance,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            tolerance: 0.1,
            mz_power: 0.0,
            intensity_power: 1.0,
            precursor: PrecursorTolerance::default(),
        }
    }
}

impl ScoringConfig {
    pub fn params(&self) -> ScoringParams {
        ScoringParams::new(self.mz_power, self.intensity_power)
    }

    /// Scores two spectra with the tolerance and exponents of this configuration.
    pub fn score(&self, a: &Spectrum, b: &Spectrum) -> Option<CosineScore> {
        cosine_hungarian(a, b, self.tolerance, &self.params())
    }

    /// Checks two precursor masses against the configured precursor tolerance.
    pub fn precursor_match(&self, query: f32, reference: f32) -> bool {
        precursor_mz_match(query, reference, &self.precursor)
    }
}
