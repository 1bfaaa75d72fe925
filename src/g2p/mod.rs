//! Grapheme-to-phoneme conversion for Modern Standard Arabic
//!
//! ## Passes
//! 1. Tokenize into graphemic clusters and words
//! 2. Gemination (shadda)
//! 3. Hamza resolution
//! 4. Taa marbuta
//! 5. Tanween
//! 6. Sun/moon assimilation of the definite article
//! 7. Emphatic spreading
//! 8. Pausal final vowel

mod arena;
mod engine;
mod passes;
mod rules;
mod tokenizer;
mod types;

pub use engine::GraphemeToPhoneme;
pub use passes::{PhonologicalRule, PIPELINE};
pub use rules::RuleTables;
pub use types::{PhonemeCategory, PhonemeToken};
