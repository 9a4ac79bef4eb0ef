use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use mscosine::{ScoringConfig, ToleranceKind};

use crate::errors::ImportError;

/// Loads a scoring configuration from a JSON file.
///
/// Fields missing from the file keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<ScoringConfig, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ImportError::io(path, e))?;

    serde_json::from_reader(BufReader::new(file)).map_err(|e| ImportError::Config(e.to_string()))
}

/// Values given on the command line, they win over the configuration file.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub tolerance: Option<f32>,
    pub mz_power: Option<f32>,
    pub intensity_power: Option<f32>,
    pub precursor_tolerance: Option<f32>,
    pub precursor_kind: Option<ToleranceKind>,
}

impl ConfigOverrides {
    pub fn apply(&self, mut config: ScoringConfig) -> ScoringConfig {
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(mz_power) = self.mz_power {
            config.mz_power = mz_power;
        }
        if let Some(intensity_power) = self.intensity_power {
            config.intensity_power = intensity_power;
        }
        if let Some(value) = self.precursor_tolerance {
            config.precursor.value = value;
        }
        if let Some(kind) = self.precursor_kind {
            config.precursor.kind = kind;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_partial_config() {
        let path = std::env::temp_dir().join(format!("msimport-config-{}.json", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            write!(file, r#"{{"tolerance": 0.02, "mz_power": 1.0}}"#).unwrap();
        }

        let config = load_config(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.tolerance, 0.02);
        assert_eq!(config.mz_power, 1.0);
        assert_eq!(config.intensity_power, 1.0);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(load_config("/no/such/config.json"), Err(ImportError::Io { .. })));
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            tolerance: Some(0.5),
            precursor_kind: Some(ToleranceKind::Ppm),
            ..Default::default()
        };

        let config = overrides.apply(ScoringConfig::default());
        assert_eq!(config.tolerance, 0.5);
        assert_eq!(config.mz_power, 0.0);
        assert_eq!(config.precursor.kind, ToleranceKind::Ppm);
        assert_eq!(config.precursor.value, 0.01);
    }
}
