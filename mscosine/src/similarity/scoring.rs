use serde::{Deserialize, Serialize};

use crate::data::spectrum::Spectrum;

/// Exponents of the weighted cosine.
///
/// A peak pair contributes `(mz_a * mz_b)^mz_power * (int_a * int_b)^intensity_power`.
/// With the defaults (0, 1) this is the plain cosine on intensities.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    pub mz_power: f32,
    pub intensity_power: f32,
}

impl ScoringParams {
    pub fn new(mz_power: f32, intensity_power: f32) -> Self {
        ScoringParams { mz_power, intensity_power }
    }

    fn is_plain(&self) -> bool {
        self.mz_power == 0.0 && self.intensity_power == 1.0
    }
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams::new(0.0, 1.0)
    }
}

/// Contribution of one matched peak pair.
#[inline]
pub fn pair_score(
    intensity_a: f32,
    intensity_b: f32,
    mz_a: f32,
    mz_b: f32,
    params: &ScoringParams,
) -> f32 {
    if params.is_plain() {
        intensity_a * intensity_b
    } else if params.mz_power == 0.0 {
        (intensity_a * intensity_b).powf(params.intensity_power)
    } else {
        (mz_a * mz_b).powf(params.mz_power) * (intensity_a * intensity_b).powf(params.intensity_power)
    }
}

/// Score of a spectrum against itself when every peak is paired with itself.
///
/// Used to normalize cross scores into `[0, 1]`.
pub fn self_norm(spectrum: &Spectrum, params: &ScoringParams) -> f32 {
    spectrum
        .peaks()
        .map(|p| {
            if params.is_plain() {
                p.intensity * p.intensity
            } else if params.mz_power == 0.0 {
                p.intensity.powf(2.0 * params.intensity_power)
            } else {
                p.mz.powf(2.0 * params.mz_power) * p.intensity.powf(2.0 * params.intensity_power)
            }
        })
        .sum()
}
