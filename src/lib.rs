//! Arabic linguistic front end for speech synthesis
//!
//! Raw text goes through the [`normalizer`] (NFC, tatweel removal, encoding
//! fixups) and then the [`g2p`] converter, which produces phoneme tokens
//! with emphasis and duration hints. A process-wide engine backs both the
//! Rust API below and the C ABI in [`ffi`].

pub mod config;
pub mod engine;
pub mod error;
pub mod ffi;
pub mod g2p;
pub mod normalizer;

pub use config::{EmphaticSpan, EngineConfig, G2pConfig, NormalizerConfig};
pub use engine::{
    convert, current_engine, engine_init, engine_init_with, engine_shutdown, engine_version,
    normalize, Engine,
};
pub use error::{CodexError, MalformedKind, Result};
pub use g2p::{GraphemeToPhoneme, PhonemeCategory, PhonemeToken, PhonologicalRule, RuleTables};
pub use normalizer::{FixupStats, NormalizationResult, TextNormalizer};
