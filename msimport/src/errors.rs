use std::path::Path;

use mscosine::SpectrumError;
use thiserror::Error;

/// Errors raised while reading MGF or SDF input.
///
/// Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed parameter at line {line}")]
    MalformedParameter { line: usize },

    #[error("unexpected line {line}")]
    UnexpectedLine { line: usize },

    #[error("malformed peak at line {line}")]
    MalformedPeak { line: usize },

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("error interpreting the config: {0}")]
    Config(String),

    #[error(transparent)]
    Spectrum(#[from] SpectrumError),
}

impl ImportError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ImportError::Io {
            path: path.as_ref().to_string_lossy().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = ImportError::io("spectra.mgf", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "error reading spectra.mgf: gone");
    }

    #[test]
    fn test_spectrum_error_is_transparent() {
        let err: ImportError = SpectrumError::malformed_literal(3).into();
        assert_eq!(err.to_string(), "malformed spectrum literal at byte 3");
    }
}
