use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// How a mass tolerance is expressed.
///
/// Convention: tolerances are always positive half-widths, a tolerance of 0.01 Da
/// on 100.0 means the window (99.99, 100.01).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToleranceKind {
    /// Absolute window in daltons.
    #[serde(rename = "da")]
    Dalton,
    /// Relative window in parts per million of the mean of the two masses.
    #[serde(rename = "ppm")]
    Ppm,
}

impl Display for ToleranceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ToleranceKind::Dalton => write!(f, "da"),
            ToleranceKind::Ppm => write!(f, "ppm"),
        }
    }
}

impl FromStr for ToleranceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "da" | "dalton" => Ok(ToleranceKind::Dalton),
            "ppm" => Ok(ToleranceKind::Ppm),
            other => Err(format!("unknown tolerance kind '{}', expected 'da' or 'ppm'", other)),
        }
    }
}

/// A precursor mass tolerance: a value together with its unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecursorTolerance {
    pub kind: ToleranceKind,
    pub value: f32,
}

impl PrecursorTolerance {
    pub fn dalton(value: f32) -> Self {
        PrecursorTolerance { kind: ToleranceKind::Dalton, value }
    }

    pub fn ppm(value: f32) -> Self {
        PrecursorTolerance { kind: ToleranceKind::Ppm, value }
    }

    /// Returns `true` if `query` and `reference` lie within this tolerance.
    ///
    /// # Tolerance Types
    ///
    /// - `Dalton`: `|reference - query| <= value`
    /// - `Ppm`: `|reference - query| / |mean(reference, query)| * 1e6 <= value`
    ///
    /// # Example
    ///
    /// ```
    /// use mscosine::PrecursorTolerance;
    ///
    /// assert!(PrecursorTolerance::dalton(0.001).matches(100.0, 100.0005));
    /// assert!(!PrecursorTolerance::ppm(1.0).matches(100.0, 100.0005));
    /// ```
    pub fn matches(&self, query: f32, reference: f32) -> bool {
        let diff = (reference - query).abs();

        match self.kind {
            ToleranceKind::Dalton => diff <= self.value,
            ToleranceKind::Ppm => diff / ((reference + query).abs() / 2.0) * 1e6 <= self.value,
        }
    }
}

impl Default for PrecursorTolerance {
    fn default() -> Self {
        PrecursorTolerance::dalton(0.01)
    }
}
