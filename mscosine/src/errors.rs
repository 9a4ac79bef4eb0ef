use thiserror::Error;

/// Errors raised while building or decoding a [`Spectrum`](crate::Spectrum).
///
/// No partially built spectrum is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpectrumError {
    /// The textual literal does not follow either accepted syntax.
    #[error("malformed spectrum literal at byte {position}")]
    MalformedLiteral { position: usize },

    /// The binary payload violates the canonical layout.
    #[error("malformed spectrum binary: {0}")]
    MalformedBinary(String),

    #[error("mz and intensity vectors differ in length ({mz} vs {intensity})")]
    LengthMismatch { mz: usize, intensity: usize },
}

impl SpectrumError {
    pub fn malformed_literal(position: usize) -> Self {
        Self::MalformedLiteral { position }
    }

    pub fn malformed_binary(msg: impl Into<String>) -> Self {
        Self::MalformedBinary(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_literal_error() {
        let err = SpectrumError::malformed_literal(7);
        assert_eq!(err.to_string(), "malformed spectrum literal at byte 7");
    }

    #[test]
    fn test_display_length_mismatch() {
        let err = SpectrumError::LengthMismatch { mz: 3, intensity: 2 };
        assert!(err.to_string().contains("3 vs 2"));
    }
}
