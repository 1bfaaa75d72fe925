//! Text normalizer
//!
//! Combines mojibake repair, per-codepoint fixups, NFC composition and the
//! optional numeral expansion

use std::time::Instant;
use unicode_normalization::UnicodeNormalization;

use crate::config::NormalizerConfig;
use crate::error::Result;
use crate::normalizer::numerals::expand_numerals;
use crate::normalizer::rules::{CharFixups, MojibakeRepair};
use crate::normalizer::types::{FixupStats, NormalizationResult};

/// Upper bound on fixup rounds; real input settles in one or two
const MAX_FIXUP_ROUNDS: usize = 8;

/// Text normalizer (reusable, tables precompiled)
pub struct TextNormalizer {
    config: NormalizerConfig,
    /// Per-codepoint fixups
    fixups: CharFixups,
    /// Latin-1 / Windows-1252 mojibake repair
    mojibake: MojibakeRepair,
}

impl TextNormalizer {
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        Ok(Self {
            config,
            fixups: CharFixups::new(),
            mojibake: MojibakeRepair::new()?,
        })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize text
    pub fn normalize(&self, text: &str) -> String {
        self.normalize_with_report(text).text
    }

    /// Normalize raw bytes; invalid UTF-8 is an encoding error
    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<String> {
        let text = std::str::from_utf8(bytes)?;
        Ok(self.normalize(text))
    }

    /// Normalize text and report what was changed
    pub fn normalize_with_report(&self, text: &str) -> NormalizationResult {
        let start = Instant::now();

        if text.is_empty() {
            return NormalizationResult::unchanged(String::new(), 0);
        }

        let mut stats = FixupStats::default();

        // 1. Mojibake repair + codepoint fixups + NFC, until nothing changes
        let mut current = text.to_string();
        for _ in 0..MAX_FIXUP_ROUNDS {
            let repaired = self.mojibake.repair(&current, &mut stats);
            let fixed = self
                .fixups
                .apply(&repaired, self.config.decompose_ligatures, &mut stats);
            let composed: String = fixed.nfc().collect();
            if composed == current {
                break;
            }
            current = composed;
        }

        // 2. Numeral expansion (optional)
        if self.config.expand_numerals {
            let expanded = expand_numerals(&current, &mut stats);
            current = expanded.nfc().collect();
        }

        let elapsed_us = start.elapsed().as_micros() as u64;
        let changed = current != text;

        if changed {
            tracing::debug!(
                "Normalized {} -> {} chars (removed {}, folded {}, repaired {}, expanded {})",
                text.chars().count(),
                current.chars().count(),
                stats.removed,
                stats.folded,
                stats.repaired,
                stats.expanded
            );
        }

        NormalizationResult {
            text: current,
            changed,
            stats,
            elapsed_us,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodexError;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(NormalizerConfig::default()).unwrap()
    }

    #[test]
    fn test_strips_tatweel() {
        let n = normalizer();
        assert_eq!(n.normalize("\u{0628}\u{0640}\u{0631}"), "\u{0628}\u{0631}");
        assert_eq!(n.normalize("\u{0640}\u{0640}"), "");
    }

    #[test]
    fn test_empty_input() {
        let n = normalizer();
        assert_eq!(n.normalize(""), "");
        let result = n.normalize_with_report("");
        assert!(!result.changed);
    }

    #[test]
    fn test_preserves_clean_text() {
        let n = normalizer();
        let text = "بسم الله الرحمن الرحيم";
        let result = n.normalize_with_report(text);
        assert_eq!(result.text, text);
        assert!(!result.changed);
        assert!(result.stats.is_empty());
    }

    #[test]
    fn test_composes_nfc() {
        let n = normalizer();
        // alef + hamza above composes to U+0623
        assert_eq!(n.normalize("\u{0627}\u{0654}"), "\u{0623}");
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        let inputs = [
            "\u{0628}\u{0640}\u{0631}",
            "\u{00D8}\u{00A8}\u{00D8}\u{00B3}\u{00D9}\u{0085} \u{FE90}",
            "\u{200F}\u{06A9}\u{062A}\u{0627}\u{0628}\u{200E}",
            "\u{0627}\u{0640}\u{0654}",
            "abc 123",
        ];
        for input in inputs {
            let once = n.normalize(input);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", input);
            assert!(!once.contains('\u{0640}'));
        }
    }

    #[test]
    fn test_length_does_not_increase() {
        let n = normalizer();
        let inputs = [
            "\u{0628}\u{0640}\u{0631}",
            "\u{FDF2}\u{FE90}",
            "\u{00D8}\u{00A8}\u{00D8}\u{00B3}",
            "\u{FEFF}مرحبا\u{200D}",
        ];
        for input in inputs {
            assert!(n.normalize(input).chars().count() <= input.chars().count());
        }
    }

    #[test]
    fn test_lam_alef_ligature_is_split() {
        let n = normalizer();
        // كﻼم: one glyph, two letters
        let result = n.normalize_with_report("\u{0643}\u{FEFC}\u{0645}");
        assert_eq!(result.text, "\u{0643}\u{0644}\u{0627}\u{0645}");
        assert_eq!(result.stats.folded, 1);
        assert_eq!(n.normalize("\u{FEFB}"), "\u{0644}\u{0627}");
        assert_eq!(n.normalize(&result.text), result.text);
    }

    #[test]
    fn test_lone_mojibake_pair_is_kept() {
        let n = normalizer();
        assert_eq!(n.normalize("Ø±0.1"), "Ø±0.1");
    }

    #[test]
    fn test_repairs_mojibake_and_reports() {
        let n = normalizer();
        let result = n.normalize_with_report("\u{00D8}\u{00A8}\u{00D8}\u{00B3}\u{00D9}\u{0085}");
        assert_eq!(result.text, "بسم");
        assert!(result.changed);
        assert_eq!(result.stats.repaired, 3);
    }

    #[test]
    fn test_digits_pass_through_by_default() {
        let n = normalizer();
        assert_eq!(n.normalize("٣ كتب"), "٣ كتب");
    }

    #[test]
    fn test_expand_numerals_when_enabled() {
        let n = TextNormalizer::new(NormalizerConfig {
            expand_numerals: true,
            ..Default::default()
        })
        .unwrap();
        let result = n.normalize_with_report("٣ كتب");
        assert_eq!(result.text, "ثَلَاثَة كتب");
        assert_eq!(result.stats.expanded, 1);
    }

    #[test]
    fn test_invalid_utf8_bytes() {
        let n = normalizer();
        let err = n.normalize_bytes(&[0xD8, 0xA8, 0xC3]).unwrap_err();
        assert!(matches!(err, CodexError::Encoding { valid_up_to: 2 }));
        assert_eq!(n.normalize_bytes("بـر".as_bytes()).unwrap(), "بر");
    }
}
