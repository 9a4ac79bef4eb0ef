/// All peak pairs of two m/z-sorted spectra whose masses differ by at most a tolerance.
///
/// Alongside the pairs, every peak on each side carries its degree: the number of
/// pairs it takes part in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandidatePairs {
    /// `(index in a, index in b)`, ordered by `a` then `b`.
    pub pairs: Vec<(usize, usize)>,
    pub degree_a: Vec<u32>,
    pub degree_b: Vec<u32>,
}

impl CandidatePairs {
    /// Collects candidate pairs with a sliding window over `mz_b`.
    ///
    /// Both slices must be sorted ascending. The lower bound into `mz_b` only moves
    /// forward, so the work is linear in `mz_a.len() + pairs`.
    ///
    /// # Arguments
    ///
    /// * `mz_a` - m/z values of the first spectrum.
    /// * `mz_b` - m/z values of the second spectrum.
    /// * `tolerance` - maximum absolute m/z difference, in Da.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use mscosine::similarity::candidates::CandidatePairs;
    /// let candidates = CandidatePairs::collect(&[100.0, 100.3], &[100.15, 200.0], 0.2);
    /// assert_eq!(candidates.pairs, vec![(0, 0), (1, 0)]);
    /// assert_eq!(candidates.degree_b, vec![2, 0]);
    /// ```
    pub fn collect(mz_a: &[f32], mz_b: &[f32], tolerance: f32) -> Self {
        let mut degree_a = vec![0u32; mz_a.len()];
        let mut degree_b = vec![0u32; mz_b.len()];
        let mut pairs = Vec::new();

        let mut lowest_idx = 0;

        for (i, &mz) in mz_a.iter().enumerate() {
            let low_bound = mz - tolerance;
            let high_bound = mz + tolerance;

            for (j, &other) in mz_b.iter().enumerate().skip(lowest_idx) {
                if other > high_bound {
                    break;
                }

                if other < low_bound {
                    lowest_idx = j + 1;
                    continue;
                }

                degree_a[i] += 1;
                degree_b[j] += 1;
                pairs.push((i, j));
            }
        }

        CandidatePairs { pairs, degree_a, degree_b }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// A pair is unambiguous when neither of its peaks takes part in any other pair.
    pub fn is_unambiguous(&self, (i, j): (usize, usize)) -> bool {
        self.degree_a[i] == 1 && self.degree_b[j] == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_force(mz_a: &[f32], mz_b: &[f32], tolerance: f32) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in mz_a.iter().enumerate() {
            for (j, b) in mz_b.iter().enumerate() {
                if *b >= a - tolerance && *b <= a + tolerance {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    #[test]
    fn test_disjoint() {
        let candidates = CandidatePairs::collect(&[100.0, 200.0], &[150.0, 250.0], 0.5);
        assert!(candidates.is_empty());
        assert_eq!(candidates.degree_a, vec![0, 0]);
        assert_eq!(candidates.degree_b, vec![0, 0]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(CandidatePairs::collect(&[], &[100.0], 1.0).is_empty());
        assert!(CandidatePairs::collect(&[100.0], &[], 1.0).is_empty());
    }

    #[test]
    fn test_zero_tolerance_exact_match() {
        let candidates = CandidatePairs::collect(&[100.0, 200.0], &[100.0, 200.0], 0.0);
        assert_eq!(candidates.pairs, vec![(0, 0), (1, 1)]);
        assert!(candidates.is_unambiguous((0, 0)));
    }

    #[test]
    fn test_degrees() {
        let mz_a = [10.0, 10.1, 20.0];
        let mz_b = [10.05, 10.15, 20.0];
        let candidates = CandidatePairs::collect(&mz_a, &mz_b, 0.2);

        assert_eq!(candidates.pairs, vec![(0, 0), (0, 1), (1, 0), (1, 1), (2, 2)]);
        assert_eq!(candidates.degree_a, vec![2, 2, 1]);
        assert_eq!(candidates.degree_b, vec![2, 2, 1]);
        assert!(!candidates.is_unambiguous((0, 1)));
        assert!(candidates.is_unambiguous((2, 2)));
    }

    #[test]
    fn test_matches_brute_force() {
        let mz_a = [50.0, 50.4, 51.0, 60.0, 60.2, 60.25, 90.0];
        let mz_b = [49.8, 50.2, 50.5, 59.9, 60.1, 60.3, 75.0, 89.7];

        for tolerance in [0.0, 0.1, 0.3, 0.5, 2.0] {
            let candidates = CandidatePairs::collect(&mz_a, &mz_b, tolerance);
            assert_eq!(candidates.pairs, brute_force(&mz_a, &mz_b, tolerance), "tol {}", tolerance);
        }
    }
}
