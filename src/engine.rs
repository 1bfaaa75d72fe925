// src/engine.rs

use std::sync::{Arc, RwLock};

use crate::config::EngineConfig;
use crate::error::{CodexError, Result};
use crate::g2p::{GraphemeToPhoneme, PhonemeToken, RuleTables};
use crate::normalizer::TextNormalizer;

// ============================================================================
// Engine
// ============================================================================

/// Normalizer + converter built from one configuration
pub struct Engine {
    config: EngineConfig,
    normalizer: TextNormalizer,
    converter: GraphemeToPhoneme,
}

impl Engine {
    /// Build the rule tables and both pipeline stages
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let tables = Arc::new(RuleTables::new());
        let normalizer = TextNormalizer::new(config.normalizer.clone())?;
        let converter = GraphemeToPhoneme::new(tables, config.g2p.clone());

        Ok(Self {
            config,
            normalizer,
            converter,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    pub fn normalize_bytes(&self, bytes: &[u8]) -> Result<String> {
        self.normalizer.normalize_bytes(bytes)
    }

    pub fn convert(&self, text: &str, pausal: bool) -> Result<Vec<PhonemeToken>> {
        self.converter.convert(text, pausal)
    }

    /// Normalize then convert
    pub fn phonemize(&self, text: &str, pausal: bool) -> Result<Vec<PhonemeToken>> {
        let normalized = self.normalizer.normalize(text);
        self.converter.convert(&normalized, pausal)
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn converter(&self) -> &GraphemeToPhoneme {
        &self.converter
    }
}

// ============================================================================
// Process-wide lifecycle
// ============================================================================

lazy_static::lazy_static! {
    /// Engine slot shared by the global API and the C ABI
    ///
    /// Callers clone the `Arc` and release the lock before converting.
    static ref ENGINE: RwLock<Option<Arc<Engine>>> = RwLock::new(None);
}

#[cfg(test)]
lazy_static::lazy_static! {
    /// Serializes tests that touch the global engine slot
    pub(crate) static ref LIFECYCLE_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
}

/// Library version, stable for the process lifetime
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Initialize the global engine from the config file. Calling it again
/// while initialized is a no-op.
pub fn engine_init() -> Result<()> {
    if current_engine().is_some() {
        tracing::debug!("Engine already initialized");
        return Ok(());
    }

    let config = EngineConfig::load().map_err(|e| CodexError::EngineInit(e.to_string()))?;
    engine_init_with(config)
}

/// Initialize (or replace) the global engine with an explicit config
pub fn engine_init_with(config: EngineConfig) -> Result<()> {
    let engine = Engine::new(config).map_err(|e| match e {
        CodexError::EngineInit(_) => e,
        other => CodexError::EngineInit(other.to_string()),
    })?;

    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    *slot = Some(Arc::new(engine));

    tracing::info!("Engine {} initialized", engine_version());
    Ok(())
}

/// Release the global engine. Safe to call at any time, any number of times.
pub fn engine_shutdown() {
    let mut slot = ENGINE.write().unwrap_or_else(|e| e.into_inner());
    if slot.take().is_some() {
        tracing::info!("Engine shut down");
    }
}

/// The initialized engine, if any
pub fn current_engine() -> Option<Arc<Engine>> {
    ENGINE.read().unwrap_or_else(|e| e.into_inner()).clone()
}

fn require_engine() -> Result<Arc<Engine>> {
    current_engine().ok_or(CodexError::NotInitialized)
}

/// Normalize with the global engine
pub fn normalize(text: &str) -> Result<String> {
    Ok(require_engine()?.normalize(text))
}

/// Convert with the global engine
pub fn convert(text: &str, pausal: bool) -> Result<Vec<PhonemeToken>> {
    require_engine()?.convert(text, pausal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizerConfig;

    #[test]
    fn test_version_not_empty() {
        assert!(!engine_version().is_empty());
        assert_eq!(engine_version(), engine_version());
    }

    #[test]
    fn test_lifecycle() {
        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        // shutdown before init is fine
        engine_shutdown();
        assert!(matches!(normalize("x"), Err(CodexError::NotInitialized)));
        assert!(matches!(convert("x", false), Err(CodexError::NotInitialized)));

        engine_init_with(EngineConfig::default()).unwrap();
        assert_eq!(normalize("\u{0628}\u{0640}\u{0631}").unwrap(), "\u{0628}\u{0631}");
        assert_eq!(convert("\u{0628}\u{064E}", false).unwrap()[0].symbol, "ba");

        // second init keeps the engine
        engine_init().unwrap();
        assert!(current_engine().is_some());

        engine_shutdown();
        engine_shutdown();
        assert!(current_engine().is_none());
    }

    #[test]
    fn test_invalid_config_fails_init() {
        let mut config = EngineConfig::default();
        config.g2p.long_vowel_multiplier = -1.0;
        let err = Engine::new(config.clone()).err().unwrap();
        assert!(matches!(err, CodexError::Config(_)));

        let _guard = LIFECYCLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let err = engine_init_with(config).unwrap_err();
        assert!(matches!(err, CodexError::EngineInit(_)));
    }

    #[test]
    fn test_phonemize_normalizes_first() {
        let engine = Engine::new(EngineConfig {
            normalizer: NormalizerConfig::default(),
            ..Default::default()
        })
        .unwrap();
        // beh initial form + fatha: the raw presentation form is rejected
        // until the normalizer folds it
        let text = "\u{FE91}\u{064E}\u{0631}";
        assert!(matches!(
            engine.convert(text, false),
            Err(CodexError::MalformedInput { .. })
        ));
        let tokens = engine.phonemize(text, false).unwrap();
        assert_eq!(tokens[0].symbol, "ba");
        assert_eq!(tokens.len(), 2);
    }

    #[test]
    fn test_phonemize_lam_alef_ligature() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        // كﻼم keeps both letters of the ligature
        let tokens = engine.phonemize("\u{0643}\u{FEFC}\u{0645}", false).unwrap();
        let symbols: Vec<&str> = tokens.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, ["k", "l", "aː", "m"]);

        let tokens = engine.phonemize("\u{FEFB}", false).unwrap();
        assert_eq!(tokens.len(), 2);

        // and a keheh is folded to kaf first
        let tokens = engine.phonemize("\u{06A9}\u{062A}\u{0627}\u{0628}", false).unwrap();
        assert_eq!(tokens[0].symbol, "k");
    }
}
