//! Text normalizer - canonicalizes raw Arabic input before conversion
//!
//! ## Steps
//! 1. Mojibake repair (UTF-8 Arabic read as Latin-1 / Windows-1252)
//! 2. Codepoint fixups: tatweel and invisible controls dropped, presentation
//!    forms and lookalike letters folded, lam-alef ligatures split into two
//!    letters (the only default fixup that lengthens the text)
//! 3. NFC composition
//! 4. Steps 1-3 repeat until the text is stable
//! 5. Numeral expansion (optional)

mod engine;
mod numerals;
mod rules;
mod types;

pub use engine::TextNormalizer;
pub use numerals::spell_number;
pub use types::{FixupStats, NormalizationResult};
