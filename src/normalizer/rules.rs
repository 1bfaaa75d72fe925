//! Normalizer fixup tables
//!
//! Invisible artifacts, lookalike letters, presentation forms and the
//! mojibake repair automaton

use std::collections::{HashMap, HashSet};

use aho_corasick::{AhoCorasick, MatchKind};
use unicode_normalization::UnicodeNormalization;

use crate::error::{CodexError, Result};
use crate::normalizer::types::FixupStats;

pub const TATWEEL: char = '\u{0640}';

/// Windows-1252 characters for bytes 0x80..=0x9F (undefined slots keep their C1 code)
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

/// Action for a single codepoint
#[derive(Debug, Clone, PartialEq)]
pub enum Fold {
    Keep,
    Drop,
    Replace(char),
    /// Lam-alef ligature, always split into its two letters
    Split(String),
    /// Word ligature (ﷲ, ﷺ), decomposed only when configured
    Ligature(String),
}

/// Per-codepoint fixups
pub struct CharFixups {
    dropped: HashSet<char>,
    lookalikes: HashMap<char, char>,
}

impl CharFixups {
    pub fn new() -> Self {
        let mut dropped: HashSet<char> = [
            TATWEEL,
            '\u{0000}', // NUL
            '\u{FEFF}', // BOM / ZWNBSP
            '\u{200B}', // zero width space
            '\u{200C}', // ZWNJ
            '\u{200D}', // ZWJ
            '\u{200E}', // LRM
            '\u{200F}', // RLM
            '\u{061C}', // Arabic letter mark
        ]
        .into_iter()
        .collect();
        // bidi embeddings, overrides and isolates
        dropped.extend('\u{202A}'..='\u{202E}');
        dropped.extend('\u{2066}'..='\u{2069}');

        let mut lookalikes = HashMap::from([
            // keheh / swash kaf -> kaf
            ('\u{06A9}', '\u{0643}'),
            ('\u{06AA}', '\u{0643}'),
            // farsi yeh -> yaa
            ('\u{06CC}', '\u{064A}'),
            // heh goal / heh doachashmee / ae -> heh
            ('\u{06C1}', '\u{0647}'),
            ('\u{06BE}', '\u{0647}'),
            ('\u{06D5}', '\u{0647}'),
            // alef with wavy hamza above / below
            ('\u{0672}', '\u{0623}'),
            ('\u{0673}', '\u{0625}'),
        ]);
        // extended (Persian) digits -> Arabic-Indic digits
        for offset in 0..10u32 {
            if let (Some(from), Some(to)) = (
                char::from_u32(0x06F0 + offset),
                char::from_u32(0x0660 + offset),
            ) {
                lookalikes.insert(from, to);
            }
        }

        Self {
            dropped,
            lookalikes,
        }
    }

    /// Decide what happens to one codepoint
    pub fn classify(&self, ch: char) -> Fold {
        if self.dropped.contains(&ch) {
            return Fold::Drop;
        }
        if let Some(&target) = self.lookalikes.get(&ch) {
            return Fold::Replace(target);
        }
        if is_presentation_form(ch) {
            return match fold_presentation_form(ch) {
                Fold::Replace(c) => Fold::Replace(self.lookalikes.get(&c).copied().unwrap_or(c)),
                other => other,
            };
        }
        Fold::Keep
    }

    /// Apply the per-codepoint fixups to a whole string
    pub fn apply(&self, text: &str, decompose_ligatures: bool, stats: &mut FixupStats) -> String {
        let mut result = String::with_capacity(text.len());

        for ch in text.chars() {
            match self.classify(ch) {
                Fold::Keep => result.push(ch),
                Fold::Drop => stats.removed += 1,
                Fold::Replace(c) => {
                    result.push(c);
                    stats.folded += 1;
                }
                Fold::Split(letters) => {
                    result.push_str(&letters);
                    stats.folded += 1;
                }
                Fold::Ligature(expansion) if decompose_ligatures => {
                    result.push_str(&expansion);
                    stats.folded += 1;
                }
                Fold::Ligature(_) => result.push(ch),
            }
        }

        result
    }
}

impl Default for CharFixups {
    fn default() -> Self {
        Self::new()
    }
}

fn is_presentation_form(ch: char) -> bool {
    matches!(ch, '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Lam-alef ligatures (plain, madda, hamza above, hamza below; isolated and final)
fn is_lam_alef(ch: char) -> bool {
    matches!(ch, '\u{FEF5}'..='\u{FEFC}')
}

/// Fold a presentation form through its compatibility decomposition.
///
/// Isolated mark forms decompose to a space or tatweel plus the mark; the
/// carrier is discarded so only the mark survives.
fn fold_presentation_form(ch: char) -> Fold {
    let decomposed: String = std::iter::once(ch).nfkc().collect();
    let folded = decomposed.trim_start_matches(|c: char| c == ' ' || c == TATWEEL);

    let mut chars = folded.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Fold::Drop,
        (Some(c), None) if c == ch => Fold::Keep,
        (Some(c), None) => Fold::Replace(c),
        _ if is_lam_alef(ch) => Fold::Split(folded.to_string()),
        _ => Fold::Ligature(folded.to_string()),
    }
}

/// Shortest run of adjacent mojibake pairs that marks a text as garbled
const MIN_MOJIBAKE_RUN: usize = 2;

/// Repairs Arabic UTF-8 that was decoded as Latin-1 or Windows-1252
/// (e.g. "Ø¨" for "ب")
pub struct MojibakeRepair {
    automaton: AhoCorasick,
    replacements: Vec<char>,
}

impl MojibakeRepair {
    pub fn new() -> Result<Self> {
        let mut patterns: Vec<String> = Vec::new();
        let mut replacements: Vec<char> = Vec::new();

        for ch in '\u{0600}'..='\u{06FF}' {
            let mut buf = [0u8; 4];
            let bytes = ch.encode_utf8(&mut buf).as_bytes();
            let lead = char::from(bytes[0]);
            let latin1 = char::from(bytes[1]);

            patterns.push(format!("{}{}", lead, latin1));
            replacements.push(ch);

            if (0x80..=0x9F).contains(&bytes[1]) {
                let cp1252 = CP1252_HIGH[(bytes[1] - 0x80) as usize];
                if cp1252 != latin1 {
                    patterns.push(format!("{}{}", lead, cp1252));
                    replacements.push(ch);
                }
            }
        }

        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostFirst)
            .build(&patterns)
            .map_err(|e| CodexError::EngineInit(format!("mojibake automaton: {}", e)))?;

        Ok(Self {
            automaton,
            replacements,
        })
    }

    /// Replace every mojibake pair with the Arabic codepoint it encodes.
    ///
    /// Text is only treated as garbled when it holds at least one run of
    /// `MIN_MOJIBAKE_RUN` adjacent pairs; a lone "Ø±" in Latin text stays.
    pub fn repair(&self, text: &str, stats: &mut FixupStats) -> String {
        // every pattern starts with one of Ø Ù Ú Û (lead bytes 0xD8..=0xDB)
        if !text.chars().any(|c| matches!(c, '\u{00D8}'..='\u{00DB}')) {
            return text.to_string();
        }

        let matches: Vec<_> = self.automaton.find_iter(text).collect();
        let longest_run = matches
            .iter()
            .enumerate()
            .fold((0usize, 0usize), |(longest, run), (i, m)| {
                let run = if i > 0 && matches[i - 1].end() == m.start() {
                    run + 1
                } else {
                    1
                };
                (longest.max(run), run)
            })
            .0;
        if longest_run < MIN_MOJIBAKE_RUN {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for m in &matches {
            result.push_str(&text[last..m.start()]);
            result.push(self.replacements[m.pattern().as_usize()]);
            stats.repaired += 1;
            last = m.end();
        }
        result.push_str(&text[last..]);
        result
    }
}
