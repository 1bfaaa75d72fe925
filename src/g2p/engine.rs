//! Grapheme-to-phoneme converter
//!
//! Tokenizes into clusters, builds the arena, runs the rule pipeline and
//! emits tokens

use std::sync::Arc;
use std::time::Instant;

use crate::config::G2pConfig;
use crate::error::Result;
use crate::g2p::arena::Arena;
use crate::g2p::passes::{PassContext, PIPELINE};
use crate::g2p::rules::RuleTables;
use crate::g2p::tokenizer::Tokenizer;
use crate::g2p::types::PhonemeToken;

/// G2P converter (reusable, rule tables shared)
pub struct GraphemeToPhoneme {
    tables: Arc<RuleTables>,
    config: G2pConfig,
}

impl GraphemeToPhoneme {
    pub fn new(tables: Arc<RuleTables>, config: G2pConfig) -> Self {
        Self { tables, config }
    }

    pub fn config(&self) -> &G2pConfig {
        &self.config
    }

    /// Convert normalized text to phoneme tokens.
    ///
    /// `pausal` reads the utterance in pausal form: taa marbuta silent,
    /// no nunation, final short vowel dropped. Fails without partial
    /// output on malformed letter/diacritic combinations.
    pub fn convert(&self, text: &str, pausal: bool) -> Result<Vec<PhonemeToken>> {
        let start = Instant::now();

        if text.is_empty() {
            return Ok(Vec::new());
        }

        // 1. Clusters and words
        let stream = Tokenizer::tokenize(text, &self.tables)?;

        // 2. Article detection + base realization, elided wasl alifs folded
        let mut arena = Arena::build(&stream, &self.tables);
        let clusters = arena.slots.len();

        // 3. Rule passes in precedence order
        let ctx = PassContext {
            tables: &self.tables,
            config: &self.config,
            pausal,
        };
        for rule in PIPELINE {
            rule.apply(&mut arena, &ctx);
        }

        // 4. Emit
        let tokens = arena.emit(&self.config);

        tracing::debug!(
            "Converted {} clusters in {} words to {} tokens (pausal: {}, {}us)",
            clusters,
            stream.words.len(),
            tokens.len(),
            pausal,
            start.elapsed().as_micros()
        );

        Ok(tokens)
    }

    /// Number of graphemic clusters the converter sees in `text`, after the
    /// silent tanween seat, plural alif and elided wasl alif are folded
    pub fn cluster_count(&self, text: &str) -> Result<usize> {
        let stream = Tokenizer::tokenize(text, &self.tables)?;
        Ok(Arena::build(&stream, &self.tables).slots.len())
    }
}
