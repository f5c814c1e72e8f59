//! Common error types for Glyphwall components.

use thiserror::Error;

/// Common errors across Glyphwall components
#[derive(Debug, Error)]
pub enum GlyphwallError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Drawing surface could not be written to
    #[error("Surface error: {0}")]
    Surface(String),

    /// Font could not be loaded or has no usable glyphs
    #[error("Font error: {0}")]
    Font(String),

    /// The CAPTCHA alphabet contains no characters
    #[error("Alphabet must contain at least one character")]
    EmptyAlphabet,

    /// Image encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for GlyphwallError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            GlyphwallError::Config("missing key".into()).to_string(),
            "Configuration error: missing key"
        );
        assert_eq!(
            GlyphwallError::EmptyAlphabet.to_string(),
            "Alphabet must contain at least one character"
        );
    }

    #[test]
    fn test_io_conversion() {
        let err: GlyphwallError = std::io::Error::other("disk full").into();
        assert!(matches!(err, GlyphwallError::Io(ref msg) if msg.contains("disk full")));
    }
}
