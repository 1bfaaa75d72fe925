//! Error types for the normalizer, the converter and the engine lifecycle

use std::fmt;

use thiserror::Error;

/// Structural problem found while clustering text for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// A diacritic with no base letter before it
    OrphanDiacritic { mark: char },
    /// Hamza or maddah mark sitting on a letter that cannot carry it
    UnsupportedHamzaCarrier { carrier: char, mark: char },
    /// Two marks on one letter that cannot co-occur (e.g. fatha + kasra, vowel + sukun)
    ConflictingMarks { base: char, first: char, second: char },
    /// Arabic-script letter outside the converter's inventory (presentation
    /// forms and lookalikes the normalizer folds, unsupported extended letters)
    UnsupportedLetter { letter: char },
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedKind::OrphanDiacritic { mark } => {
                write!(f, "diacritic U+{:04X} has no base letter", *mark as u32)
            }
            MalformedKind::UnsupportedHamzaCarrier { carrier, mark } => write!(
                f,
                "mark U+{:04X} cannot sit on '{}' (U+{:04X})",
                *mark as u32, carrier, *carrier as u32
            ),
            MalformedKind::ConflictingMarks {
                base,
                first,
                second,
            } => write!(
                f,
                "marks U+{:04X} and U+{:04X} conflict on '{}'",
                *first as u32, *second as u32, base
            ),
            MalformedKind::UnsupportedLetter { letter } => write!(
                f,
                "letter '{}' (U+{:04X}) is not in the inventory, normalize the text first",
                letter, *letter as u32
            ),
        }
    }
}

/// Errors surfaced by the public API
#[derive(Debug, Error)]
pub enum CodexError {
    /// Input bytes are not valid UTF-8
    #[error("invalid UTF-8 input at byte {valid_up_to}")]
    Encoding { valid_up_to: usize },

    /// Text reached the converter with an invalid letter/diacritic combination
    #[error("malformed input at byte {offset}: {kind}")]
    MalformedInput { offset: usize, kind: MalformedKind },

    /// Engine initialization failed
    #[error("engine initialization failed: {0}")]
    EngineInit(String),

    /// Global API used before `engine_init`
    #[error("engine is not initialized")]
    NotInitialized,

    /// Configuration file could not be read, parsed or written
    #[error("configuration error: {0}")]
    Config(String),
}

impl CodexError {
    /// Status code reported across the C boundary
    pub fn status_code(&self) -> i32 {
        match self {
            CodexError::Encoding { .. } => crate::ffi::CODEX_ERR_ENCODING,
            CodexError::MalformedInput { .. } => crate::ffi::CODEX_ERR_MALFORMED_INPUT,
            CodexError::NotInitialized => crate::ffi::CODEX_ERR_NOT_INITIALIZED,
            CodexError::EngineInit(_) | CodexError::Config(_) => crate::ffi::CODEX_ERR_INIT,
        }
    }

    pub(crate) fn malformed(offset: usize, kind: MalformedKind) -> Self {
        CodexError::MalformedInput { offset, kind }
    }
}

impl From<std::str::Utf8Error> for CodexError {
    fn from(err: std::str::Utf8Error) -> Self {
        CodexError::Encoding {
            valid_up_to: err.valid_up_to(),
        }
    }
}

/// Result type for this crate
pub type Result<T> = std::result::Result<T, CodexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_error_keeps_offset() {
        let bytes = [0xD8, 0xA8, 0xFF, 0xD8];
        let err: CodexError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(matches!(err, CodexError::Encoding { valid_up_to: 2 }));
        assert_eq!(err.status_code(), crate::ffi::CODEX_ERR_ENCODING);
    }

    #[test]
    fn test_malformed_message() {
        let err = CodexError::malformed(0, MalformedKind::OrphanDiacritic { mark: '\u{064E}' });
        assert_eq!(
            err.to_string(),
            "malformed input at byte 0: diacritic U+064E has no base letter"
        );
    }
}
