//! Normalizer result types

use serde::{Deserialize, Serialize};

/// Counters for the fixups applied during one normalization
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixupStats {
    /// Codepoints dropped (tatweel, invisible controls)
    pub removed: usize,
    /// Codepoints folded to a canonical letter (presentation forms, lookalikes)
    pub folded: usize,
    /// Mojibake pairs repaired
    pub repaired: usize,
    /// Digit runs spelled out as words
    pub expanded: usize,
}

impl FixupStats {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Normalization result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationResult {
    /// Normalized text
    pub text: String,
    /// Whether the text differs from the input
    pub changed: bool,
    /// Fixups applied
    pub stats: FixupStats,
    /// Processing time (microseconds)
    pub elapsed_us: u64,
}

impl NormalizationResult {
    /// Result for input that needed no changes
    pub fn unchanged(text: String, elapsed_us: u64) -> Self {
        Self {
            text,
            changed: false,
            stats: FixupStats::default(),
            elapsed_us,
        }
    }
}
