use crate::tolerance::{PrecursorTolerance, ToleranceKind};

/// Checks whether a query precursor mass matches a reference within a tolerance.
///
/// # Arguments
///
/// * `query` - precursor m/z of the query spectrum.
/// * `reference` - precursor m/z of the reference spectrum.
/// * `tolerance` - window and its unit, see [`PrecursorTolerance::matches`].
///
/// # Example
///
/// ```rust
/// use mscosine::{precursor_mz_match, PrecursorTolerance};
///
/// assert!(precursor_mz_match(100.0, 100.0005, &PrecursorTolerance::dalton(0.001)));
/// assert!(!precursor_mz_match(100.0, 100.0005, &PrecursorTolerance::ppm(1.0)));
/// ```
pub fn precursor_mz_match(query: f32, reference: f32, tolerance: &PrecursorTolerance) -> bool {
    tolerance.matches(query, reference)
}

/// Same as [`precursor_mz_match`] with the tolerance given as a value and unit.
pub fn precursor_mz_match_with(query: f32, reference: f32, value: f32, kind: ToleranceKind) -> bool {
    PrecursorTolerance { kind, value }.matches(query, reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dalton_match() {
        assert!(precursor_mz_match_with(100.0, 100.0005, 0.001, ToleranceKind::Dalton));
        assert!(!precursor_mz_match_with(100.0, 100.002, 0.001, ToleranceKind::Dalton));
    }

    #[test]
    fn test_ppm_match() {
        // 0.0005 / 100.00025 * 1e6 is about 5 ppm
        assert!(!precursor_mz_match_with(100.0, 100.0005, 1.0, ToleranceKind::Ppm));
        assert!(precursor_mz_match_with(100.0, 100.0005, 10.0, ToleranceKind::Ppm));
    }

    #[test]
    fn test_sub_dalton_difference_is_not_truncated() {
        // a difference of 0.6 Da must not round down to 0
        assert!(!precursor_mz_match(500.0, 500.6, &PrecursorTolerance::dalton(0.5)));
    }

    #[test]
    fn test_symmetric() {
        let tol = PrecursorTolerance::ppm(20.0);
        for (q, r) in [(400.0, 400.007), (1200.0, 1200.03), (250.0, 250.0)] {
            assert_eq!(precursor_mz_match(q, r, &tol), precursor_mz_match(r, q, &tol));
        }
    }
}
