// src/config.rs

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CodexError, Result};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "CODEX_TTS_CONFIG";

// ============================================================================
// Emphatic spreading span
// ============================================================================

/// How far pharyngealization spreads from an emphatic consonant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmphaticSpan {
    /// The emphatic's own token, the vowel-bearing token before it and a
    /// vowel-only token right after it
    Adjacent,
    /// Every token of the phonological word
    #[default]
    Word,
}

// ============================================================================
// Normalizer configuration
// ============================================================================

/// Text normalizer switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NormalizerConfig {
    /// Spell digit runs as Arabic cardinal words (may lengthen the text)
    #[serde(default)]
    pub expand_numerals: bool,
    /// Decompose word ligatures such as ﷲ and ﷺ (may lengthen the text).
    /// Lam-alef ligatures are always split.
    #[serde(default)]
    pub decompose_ligatures: bool,
}

// ============================================================================
// G2P configuration
// ============================================================================

/// Converter policy points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct G2pConfig {
    /// `duration_hint` of a geminated consonant token
    #[serde(default = "default_gemination_multiplier")]
    pub gemination_multiplier: f32,
    /// `duration_hint` of a long-vowel token
    #[serde(default = "default_long_vowel_multiplier")]
    pub long_vowel_multiplier: f32,
    /// Emphatic spreading span
    #[serde(default)]
    pub emphatic_span: EmphaticSpan,
}

fn default_gemination_multiplier() -> f32 {
    2.0
}

fn default_long_vowel_multiplier() -> f32 {
    2.0
}

impl Default for G2pConfig {
    fn default() -> Self {
        Self {
            gemination_multiplier: default_gemination_multiplier(),
            long_vowel_multiplier: default_long_vowel_multiplier(),
            emphatic_span: EmphaticSpan::default(),
        }
    }
}

impl G2pConfig {
    /// Check the multipliers are usable duration overrides
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("gemination_multiplier", self.gemination_multiplier),
            ("long_vowel_multiplier", self.long_vowel_multiplier),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(CodexError::Config(format!(
                    "{} must be a positive finite number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Engine configuration
// ============================================================================

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub g2p: G2pConfig,
}

impl EngineConfig {
    /// Config file location: `$CODEX_TTS_CONFIG`, else `<config dir>/CodexTts/config.json`
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        dirs::config_dir().map(|dir| dir.join("CodexTts").join("config.json"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                tracing::info!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            None => {
                tracing::warn!("Could not resolve a config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::info!("Loading config from {:?}", path);
        let content = std::fs::read_to_string(path)
            .map_err(|e| CodexError::Config(format!("read {:?}: {}", path, e)))?;
        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| CodexError::Config(format!("parse {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.g2p.validate()
    }

    /// Write the config atomically: temp file first, then rename over the target
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CodexError::Config(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| CodexError::Config(format!("create {:?}: {}", parent, e)))?;
            }
        }

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content).map_err(|e| {
            tracing::error!("Failed to write temp config {:?}: {}", temp_path, e);
            CodexError::Config(format!("write {:?}: {}", temp_path, e))
        })?;

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(CodexError::Config(format!("replace {:?}: {}", path, e)));
        }

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
