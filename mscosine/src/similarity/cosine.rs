use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::spectrum::Spectrum;
use crate::similarity::assignment::maximum_weight_assignment;
use crate::similarity::candidates::CandidatePairs;
use crate::similarity::scoring::{pair_score, self_norm, ScoringParams};

/// Largest `len(a) * len(b)` a similarity computation will take on.
pub const MAX_CANDIDATE_SPACE: usize = 100_000_000;

/// Result of one cosine similarity computation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CosineScore {
    /// Similarity in `[0, 1]`, or NaN if it could not be computed.
    pub score: f32,
    /// Number of matched peak pairs.
    pub matches: usize,
}

/// Cosine similarity of two spectra under the best one-to-one peak matching.
///
/// Peaks of `a` and `b` are paired when their m/z values differ by at most
/// `tolerance`. Pairs whose peaks take part in no other pair are taken directly,
/// the remaining ambiguous pairs are resolved by an optimal assignment. The summed
/// pair scores are normalized by the geometric mean of both self norms and clamped
/// into `[0, 1]`; a non-finite result becomes NaN.
///
/// Returns `None` when `a.len() * b.len()` exceeds [`MAX_CANDIDATE_SPACE`].
///
/// # Arguments
///
/// * `a` - first spectrum.
/// * `b` - second spectrum.
/// * `tolerance` - absolute m/z tolerance in Da.
/// * `params` - m/z and intensity exponents.
///
/// # Example
///
/// ```rust
/// use mscosine::{cosine_hungarian, Spectrum};
/// use mscosine::similarity::scoring::ScoringParams;
///
/// let a = Spectrum::from_pairs([(100.0, 3.0), (100.3, 2.0)]);
/// let b = Spectrum::from_pairs([(99.9, 2.0), (100.15, 3.0)]);
///
/// let result = cosine_hungarian(&a, &b, 0.2, &ScoringParams::default()).unwrap();
/// assert_eq!(result.matches, 2);
/// assert!((result.score - 12.0 / 13.0).abs() < 1e-6);
/// ```
pub fn cosine_hungarian(
    a: &Spectrum,
    b: &Spectrum,
    tolerance: f32,
    params: &ScoringParams,
) -> Option<CosineScore> {
    match a.len().checked_mul(b.len()) {
        Some(space) if space <= MAX_CANDIDATE_SPACE => {}
        _ => {
            warn!(len_a = a.len(), len_b = b.len(), "candidate space too large, not scoring");
            return None;
        }
    }

    let candidates = CandidatePairs::collect(a.mz(), b.mz(), tolerance);

    let mut score = 0.0f32;
    let mut matches = 0usize;
    let mut deferred = Vec::new();

    for &(i, j) in &candidates.pairs {
        if candidates.is_unambiguous((i, j)) {
            score += pair_score(a.intensity()[i], b.intensity()[j], a.mz()[i], b.mz()[j], params);
            matches += 1;
        } else {
            deferred.push((i, j));
        }
    }

    if !deferred.is_empty() {
        let reduced = ReducedProblem::build(a, b, &deferred, params);

        debug!(
            rows = reduced.scores.nrows(),
            cols = reduced.scores.ncols(),
            fast_path_matches = matches,
            "solving ambiguous peak assignment"
        );

        match maximum_weight_assignment(&reduced.scores, reduced.max) {
            Some(outcome) => {
                score += outcome.score;
                matches += outcome.matches;
            }
            None => {
                return Some(CosineScore { score: f32::NAN, matches });
            }
        }
    }

    Some(CosineScore { score: finalize(score, a, b, params), matches })
}

/// The similarity score alone, with exponents given explicitly.
pub fn cosine_score(
    a: &Spectrum,
    b: &Spectrum,
    tolerance: f32,
    mz_power: f32,
    intensity_power: f32,
) -> Option<f32> {
    cosine_hungarian(a, b, tolerance, &ScoringParams::new(mz_power, intensity_power)).map(|r| r.score)
}

/// Dense score matrix over the ambiguous peaks only.
///
/// Rows are never more than columns. A cell holds `0.0` when its peaks are not
/// a candidate pair, and at least `f32::MIN_POSITIVE` when they are.
struct ReducedProblem {
    scores: DMatrix<f32>,
    max: f32,
}

impl ReducedProblem {
    fn build(a: &Spectrum, b: &Spectrum, deferred: &[(usize, usize)], params: &ScoringParams) -> Self {
        let mut row_of: Vec<Option<usize>> = vec![None; a.len()];
        let mut col_of: Vec<Option<usize>> = vec![None; b.len()];
        let mut rows = 0;
        let mut cols = 0;

        let mut cells = Vec::with_capacity(deferred.len());

        for &(i, j) in deferred {
            let row = *row_of[i].get_or_insert_with(|| {
                rows += 1;
                rows - 1
            });
            let col = *col_of[j].get_or_insert_with(|| {
                cols += 1;
                cols - 1
            });

            let mut s = pair_score(a.intensity()[i], b.intensity()[j], a.mz()[i], b.mz()[j], params);
            if s == 0.0 {
                s = f32::MIN_POSITIVE;
            }
            cells.push((row, col, s));
        }

        let transposed = rows > cols;
        let mut scores = if transposed {
            DMatrix::zeros(cols, rows)
        } else {
            DMatrix::zeros(rows, cols)
        };

        let mut max = 0.0f32;
        for (row, col, s) in cells {
            if s > max {
                max = s;
            }

            if transposed {
                scores[(col, row)] = s;
            } else {
                scores[(row, col)] = s;
            }
        }

        ReducedProblem { scores, max }
    }
}

fn finalize(raw: f32, a: &Spectrum, b: &Spectrum, params: &ScoringParams) -> f32 {
    let score = if raw != 0.0 {
        raw / (self_norm(a, params) * self_norm(b, params)).sqrt()
    } else {
        raw
    };

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        f32::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(peaks: &[(f32, f32)]) -> Spectrum {
        Spectrum::from_pairs(peaks.iter().cloned())
    }

    #[test]
    fn test_identical_spectra() {
        let s = spectrum(&[(100.0, 1.0), (150.0, 3.0), (200.0, 0.5)]);
        let result = cosine_hungarian(&s, &s, 0.1, &ScoringParams::default()).unwrap();

        assert!((result.score - 1.0).abs() < 1e-6);
        assert_eq!(result.matches, 3);
    }

    #[test]
    fn test_optimal_beats_greedy() {
        // greedy pairs 100.0 with 100.15 (9) and leaves 100.3 alone,
        // the best matching pairs 100.0-99.9 and 100.3-100.15 (6 + 6)
        let a = spectrum(&[(100.0, 3.0), (100.3, 2.0)]);
        let b = spectrum(&[(100.15, 3.0), (99.9, 2.0)]);

        let result = cosine_hungarian(&a, &b, 0.2, &ScoringParams::default()).unwrap();
        assert_eq!(result.matches, 2);
        assert!((result.score - 12.0 / 13.0).abs() < 1e-6, "{}", result.score);
    }

    #[test]
    fn test_three_peak_chain() {
        let a = spectrum(&[(10.0, 1.0), (10.1, 1.0), (20.0, 1.0)]);
        let b = spectrum(&[(10.05, 1.0), (10.15, 1.0), (20.0, 1.0)]);

        let result = cosine_hungarian(&a, &b, 0.2, &ScoringParams::default()).unwrap();
        assert_eq!(result.matches, 3);
        assert!((result.score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_is_zero() {
        let a = spectrum(&[(100.0, 1.0), (200.0, 1.0)]);
        let b = spectrum(&[(150.0, 1.0), (250.0, 1.0)]);

        let result = cosine_hungarian(&a, &b, 0.5, &ScoringParams::default()).unwrap();
        assert_eq!(result, CosineScore { score: 0.0, matches: 0 });
    }

    #[test]
    fn test_empty_spectrum() {
        let a = spectrum(&[(100.0, 1.0)]);
        let result = cosine_hungarian(&a, &Spectrum::empty(), 0.5, &ScoringParams::default()).unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_zero_score_edge_still_matches() {
        // the ambiguous peak of b has zero intensity, its edges score exactly 0
        let a = spectrum(&[(100.0, 1.0), (100.1, 1.0), (300.0, 1.0)]);
        let b = spectrum(&[(100.05, 0.0), (300.0, 1.0)]);

        let result = cosine_hungarian(&a, &b, 0.2, &ScoringParams::default()).unwrap();
        assert_eq!(result.matches, 2);
        assert!((result.score - 1.0 / 3.0f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_negative_intensity_left_unmatched() {
        // 100.05 pairing with the -1 peak would only cost score
        let a = spectrum(&[(100.0, 1.0), (100.05, 1.0), (200.0, 1.0)]);
        let b = spectrum(&[(100.01, 2.0), (100.03, -1.0), (200.0, 1.0), (200.05, 1.0)]);

        let result = cosine_hungarian(&a, &b, 0.1, &ScoringParams::default()).unwrap();
        assert_eq!(result.matches, 2);
        assert!((result.score - 3.0 / 21.0f32.sqrt()).abs() < 1e-6, "{}", result.score);
    }

    #[test]
    fn test_more_ambiguous_rows_than_columns() {
        let a = spectrum(&[(99.95, 1.0), (100.0, 2.0), (100.05, 1.0)]);
        let b = spectrum(&[(100.02, 2.0)]);

        let result = cosine_hungarian(&a, &b, 0.1, &ScoringParams::default()).unwrap();
        assert_eq!(result.matches, 1);
        let expected = 4.0 / (6.0f32 * 4.0).sqrt();
        assert!((result.score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_weighted_exponents() {
        let a = spectrum(&[(100.0, 4.0), (200.0, 1.0)]);
        let b = spectrum(&[(100.0, 1.0), (200.0, 4.0)]);

        let plain = cosine_score(&a, &b, 0.1, 0.0, 1.0).unwrap();
        let sqrt = cosine_score(&a, &b, 0.1, 0.0, 0.5).unwrap();

        assert!((plain - 8.0 / 17.0).abs() < 1e-6);
        assert!((sqrt - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_non_finite_becomes_nan() {
        let a = spectrum(&[(100.0, f32::INFINITY)]);
        let result = cosine_hungarian(&a, &a, 0.1, &ScoringParams::default()).unwrap();
        assert!(result.score.is_nan());
    }

    #[test]
    fn test_resource_guard() {
        let a = Spectrum::from_pairs((0..10_001).map(|i| (i as f32, 1.0)));
        let b = a.clone();
        assert!(cosine_hungarian(&a, &b, 0.1, &ScoringParams::default()).is_none());
    }
}
