//! G2P tokenizer
//!
//! Splits text into graphemic clusters (base letter + combining marks) and
//! words. Whitespace separates words; punctuation, digits and non-Arabic
//! text end the current phrase. Arabic-script letters outside the inventory
//! are rejected rather than skipped.

use crate::error::{CodexError, MalformedKind, Result};
use crate::g2p::rules::{LetterClass, RuleTables, ALIF, ALIF_MAQSURA, WAW, YAA};
use crate::g2p::types::{Tanween, Vowel};

pub const FATHATAN: char = '\u{064B}';
pub const DAMMATAN: char = '\u{064C}';
pub const KASRATAN: char = '\u{064D}';
pub const FATHA: char = '\u{064E}';
pub const DAMMA: char = '\u{064F}';
pub const KASRA: char = '\u{0650}';
pub const SHADDA: char = '\u{0651}';
pub const SUKUN: char = '\u{0652}';
pub const MADDA: char = '\u{0653}';
pub const HAMZA_ABOVE: char = '\u{0654}';
pub const HAMZA_BELOW: char = '\u{0655}';
pub const SUPERSCRIPT_ALEF: char = '\u{0670}';

fn vowel_mark(vowel: Vowel) -> char {
    match vowel {
        Vowel::A => FATHA,
        Vowel::I => KASRA,
        Vowel::U => DAMMA,
    }
}

fn tanween_mark(tanween: Tanween) -> char {
    match tanween {
        Tanween::Fath => FATHATAN,
        Tanween::Damm => DAMMATAN,
        Tanween::Kasr => KASRATAN,
    }
}

/// Combining marks of one cluster. Mark order in the text does not matter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Marks {
    pub vowel: Option<Vowel>,
    pub tanween: Option<Tanween>,
    pub sukun: bool,
    pub shadda: bool,
    /// Maddah, hamza above or hamza below
    pub hamza_mark: Option<char>,
    /// Superscript (dagger) alef
    pub dagger_alif: bool,
}

impl Marks {
    /// Record a mark on `base`, rejecting contradictory combinations.
    /// Repeating the same mark is tolerated.
    pub fn add(&mut self, base: char, mark: char) -> std::result::Result<(), MalformedKind> {
        let conflict = |first: char| MalformedKind::ConflictingMarks {
            base,
            first,
            second: mark,
        };

        match mark {
            FATHA | DAMMA | KASRA => {
                let vowel = match mark {
                    FATHA => Vowel::A,
                    DAMMA => Vowel::U,
                    _ => Vowel::I,
                };
                if let Some(existing) = self.vowel.filter(|v| *v != vowel) {
                    return Err(conflict(vowel_mark(existing)));
                }
                if let Some(tanween) = self.tanween {
                    return Err(conflict(tanween_mark(tanween)));
                }
                if self.sukun {
                    return Err(conflict(SUKUN));
                }
                self.vowel = Some(vowel);
            }
            FATHATAN | DAMMATAN | KASRATAN => {
                let tanween = match mark {
                    FATHATAN => Tanween::Fath,
                    DAMMATAN => Tanween::Damm,
                    _ => Tanween::Kasr,
                };
                if let Some(existing) = self.tanween.filter(|t| *t != tanween) {
                    return Err(conflict(tanween_mark(existing)));
                }
                if let Some(vowel) = self.vowel {
                    return Err(conflict(vowel_mark(vowel)));
                }
                if self.sukun {
                    return Err(conflict(SUKUN));
                }
                self.tanween = Some(tanween);
            }
            SUKUN => {
                if let Some(vowel) = self.vowel {
                    return Err(conflict(vowel_mark(vowel)));
                }
                if let Some(tanween) = self.tanween {
                    return Err(conflict(tanween_mark(tanween)));
                }
                if self.shadda {
                    return Err(conflict(SHADDA));
                }
                self.sukun = true;
            }
            SHADDA => {
                if self.sukun {
                    return Err(conflict(SUKUN));
                }
                self.shadda = true;
            }
            MADDA | HAMZA_ABOVE | HAMZA_BELOW => {
                let supported = match mark {
                    HAMZA_ABOVE => matches!(base, ALIF | WAW | YAA | ALIF_MAQSURA),
                    _ => base == ALIF,
                };
                if !supported {
                    return Err(MalformedKind::UnsupportedHamzaCarrier {
                        carrier: base,
                        mark,
                    });
                }
                if let Some(existing) = self.hamza_mark.filter(|m| *m != mark) {
                    return Err(conflict(existing));
                }
                self.hamza_mark = Some(mark);
            }
            SUPERSCRIPT_ALEF => self.dagger_alif = true,
            _ => {}
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Base letter plus its marks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    pub base: char,
    /// Class of the bare base letter
    pub class: LetterClass,
    pub marks: Marks,
    /// Byte offset of the base letter in the input
    pub offset: usize,
    /// Index of the word the cluster belongs to
    pub word: usize,
}

/// Half-open cluster range of one word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Word {
    pub start: usize,
    pub end: usize,
    /// Followed by punctuation or another non-letter
    pub phrase_break_after: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ClusterStream {
    pub clusters: Vec<Cluster>,
    pub words: Vec<Word>,
}

/// Character classes seen by the tokenizer
#[derive(Debug, Clone, Copy, PartialEq)]
enum CharType {
    Letter(LetterClass),
    Mark,
    /// Tatweel, Quranic annotation marks, invisible format controls
    Ignorable,
    Whitespace,
    /// Arabic-script letter with no rule (raw presentation form, keheh, ...)
    Unsupported,
    Other,
}

/// Tokenizer
pub struct Tokenizer;

impl Tokenizer {
    /// Split text into clusters and words
    pub fn tokenize(text: &str, tables: &RuleTables) -> Result<ClusterStream> {
        let mut stream = ClusterStream::default();
        let mut word_start: Option<usize> = None;

        for (offset, ch) in text.char_indices() {
            match Self::classify_char(ch, tables) {
                CharType::Letter(class) => {
                    if word_start.is_none() {
                        word_start = Some(stream.clusters.len());
                    }
                    stream.clusters.push(Cluster {
                        base: ch,
                        class,
                        marks: Marks::default(),
                        offset,
                        word: stream.words.len(),
                    });
                }
                CharType::Mark => {
                    let cluster = match word_start {
                        Some(_) => stream.clusters.last_mut(),
                        None => None,
                    };
                    let Some(cluster) = cluster else {
                        return Err(CodexError::malformed(
                            offset,
                            MalformedKind::OrphanDiacritic { mark: ch },
                        ));
                    };
                    cluster
                        .marks
                        .add(cluster.base, ch)
                        .map_err(|kind| CodexError::malformed(offset, kind))?;
                }
                CharType::Ignorable => {}
                CharType::Unsupported => {
                    return Err(CodexError::malformed(
                        offset,
                        MalformedKind::UnsupportedLetter { letter: ch },
                    ));
                }
                CharType::Whitespace => Self::close_word(&mut stream, &mut word_start, false),
                CharType::Other => {
                    tracing::debug!("Phrase break at byte {} ({:?})", offset, ch);
                    Self::close_word(&mut stream, &mut word_start, true);
                }
            }
        }
        Self::close_word(&mut stream, &mut word_start, false);

        Ok(stream)
    }

    fn close_word(stream: &mut ClusterStream, word_start: &mut Option<usize>, phrase_break: bool) {
        match word_start.take() {
            Some(start) => {
                Self::absorb_seat(&mut stream.clusters, start);
                stream.words.push(Word {
                    start,
                    end: stream.clusters.len(),
                    phrase_break_after: phrase_break,
                });
            }
            None if phrase_break => {
                if let Some(last) = stream.words.last_mut() {
                    last.phrase_break_after = true;
                }
            }
            None => {}
        }
    }

    /// Fold a silent word-final alif into the cluster before it: the seat of
    /// a tanween fatha (كتابًا, كتاباً, هدًى) and the alif after plural waw
    /// (كتبوا)
    fn absorb_seat(clusters: &mut Vec<Cluster>, start: usize) {
        let len = clusters.len();
        if len < start + 2 {
            return;
        }
        let last = clusters[len - 1];
        let prev = clusters[len - 2];
        if !matches!(last.base, ALIF | ALIF_MAQSURA) {
            return;
        }

        let seat_only = last.marks.is_empty();
        let fathatan_only = last.marks
            == Marks {
                tanween: Some(Tanween::Fath),
                ..Marks::default()
            };

        if seat_only && prev.marks.tanween == Some(Tanween::Fath) {
            clusters.pop();
        } else if fathatan_only
            && prev.marks.tanween.is_none()
            && matches!(prev.marks.vowel, None | Some(Vowel::A))
            && !prev.marks.sukun
        {
            clusters.pop();
            if let Some(seated) = clusters.last_mut() {
                seated.marks.vowel = None;
                seated.marks.tanween = Some(Tanween::Fath);
            }
        } else if seat_only
            && last.base == ALIF
            && prev.base == WAW
            && len >= start + 3
            && prev.marks.vowel.is_none()
            && prev.marks.tanween.is_none()
            && !prev.marks.shadda
            && matches!(clusters[len - 3].marks.vowel, None | Some(Vowel::U))
        {
            clusters.pop();
        }
    }

    /// Character classification
    fn classify_char(ch: char, tables: &RuleTables) -> CharType {
        if let Some(class) = tables.letter_class(ch) {
            CharType::Letter(class)
        } else if Self::is_mark(ch) {
            CharType::Mark
        } else if Self::is_ignorable(ch) {
            CharType::Ignorable
        } else if ch.is_whitespace() {
            CharType::Whitespace
        } else if Self::is_arabic_script(ch) && ch.is_alphabetic() {
            CharType::Unsupported
        } else {
            CharType::Other
        }
    }

    fn is_mark(ch: char) -> bool {
        matches!(ch, '\u{064B}'..='\u{0655}' | SUPERSCRIPT_ALEF)
    }

    /// Arabic, Arabic Supplement, Extended-A and both presentation form blocks
    fn is_arabic_script(ch: char) -> bool {
        matches!(ch,
            '\u{0600}'..='\u{06FF}'
            | '\u{0750}'..='\u{077F}'
            | '\u{08A0}'..='\u{08FF}'
            | '\u{FB50}'..='\u{FDFF}'
            | '\u{FE70}'..='\u{FEFC}')
    }

    fn is_ignorable(ch: char) -> bool {
        matches!(ch,
            // tatweel
            '\u{0640}'
            // Quranic annotation and extended Arabic marks
            | '\u{0610}'..='\u{061A}'
            | '\u{0656}'..='\u{065F}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E8}'
            | '\u{06EA}'..='\u{06ED}'
            // combining diacritical marks
            | '\u{0300}'..='\u{036F}'
            // invisible format controls
            | '\u{061C}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Result<ClusterStream> {
        Tokenizer::tokenize(text, &RuleTables::new())
    }

    #[test]
    fn test_clusters_and_words() {
        // كَتَبَ وَلَدٌ
        let stream = tokenize("كَتَبَ وَلَدٌ").unwrap();
        assert_eq!(stream.clusters.len(), 6);
        assert_eq!(stream.words.len(), 2);
        assert_eq!(stream.words[0].end, 3);
        assert_eq!(stream.clusters[0].marks.vowel, Some(Vowel::A));
        assert_eq!(stream.clusters[5].marks.tanween, Some(Tanween::Damm));
        assert_eq!(stream.clusters[3].word, 1);
    }

    #[test]
    fn test_mark_order_irrelevant() {
        let a = tokenize("\u{0628}\u{0651}\u{064E}").unwrap();
        let b = tokenize("\u{0628}\u{064E}\u{0651}").unwrap();
        assert_eq!(a.clusters[0].marks, b.clusters[0].marks);
        assert!(a.clusters[0].marks.shadda);
    }

    #[test]
    fn test_orphan_diacritic() {
        let err = tokenize("\u{064E}\u{0628}").unwrap_err();
        assert!(matches!(
            err,
            CodexError::MalformedInput {
                offset: 0,
                kind: MalformedKind::OrphanDiacritic { mark: '\u{064E}' }
            }
        ));

        // after whitespace there is no base either
        let err = tokenize("\u{0628} \u{064F}").unwrap_err();
        assert!(matches!(err, CodexError::MalformedInput { offset: 3, .. }));
    }

    #[test]
    fn test_unsupported_hamza_carrier() {
        let err = tokenize("\u{0628}\u{0654}").unwrap_err();
        assert!(matches!(
            err,
            CodexError::MalformedInput {
                kind: MalformedKind::UnsupportedHamzaCarrier { carrier: '\u{0628}', .. },
                ..
            }
        ));
    }

    #[test]
    fn test_conflicting_marks() {
        let err = tokenize("\u{0628}\u{064E}\u{0650}").unwrap_err();
        assert!(matches!(
            err,
            CodexError::MalformedInput {
                kind: MalformedKind::ConflictingMarks { first: FATHA, second: KASRA, .. },
                ..
            }
        ));
        assert!(tokenize("\u{0628}\u{0651}\u{0652}").is_err());
        assert!(tokenize("\u{0628}\u{064C}\u{064F}").is_err());
        // repeated mark is fine
        assert!(tokenize("\u{0628}\u{064E}\u{064E}").is_ok());
    }

    #[test]
    fn test_tatweel_is_transparent() {
        let stream = tokenize("\u{0628}\u{0640}\u{064E}").unwrap();
        assert_eq!(stream.clusters.len(), 1);
        assert_eq!(stream.clusters[0].marks.vowel, Some(Vowel::A));
    }

    #[test]
    fn test_tanween_seat_absorbed() {
        // كِتَابًا
        let stream = tokenize("كِتَابًا").unwrap();
        assert_eq!(stream.clusters.len(), 4);
        assert_eq!(stream.clusters[3].marks.tanween, Some(Tanween::Fath));

        // fathatan written on the alif
        let stream = tokenize("\u{0643}\u{062A}\u{0627}\u{0628}\u{0627}\u{064B}").unwrap();
        assert_eq!(stream.clusters.len(), 4);
        assert_eq!(stream.clusters[3].marks.tanween, Some(Tanween::Fath));
    }

    #[test]
    fn test_plural_alif_absorbed() {
        // كَتَبُوا
        let stream = tokenize("كَتَبُوا").unwrap();
        assert_eq!(stream.clusters.len(), 4);
        assert_eq!(stream.clusters[3].base, WAW);
    }

    #[test]
    fn test_phrase_breaks() {
        let stream = tokenize("\u{0628}\u{0631} \u{0628}\u{0631}\u{060C} \u{0628}\u{0631}").unwrap();
        assert_eq!(stream.words.len(), 3);
        assert!(!stream.words[0].phrase_break_after);
        assert!(stream.words[1].phrase_break_after);
        assert!(!stream.words[2].phrase_break_after);
    }

    #[test]
    fn test_unnormalized_letters_are_rejected() {
        // lam-alef ligature inside كﻼم
        let err = tokenize("\u{0643}\u{FEFC}\u{0645}").unwrap_err();
        assert!(matches!(
            err,
            CodexError::MalformedInput {
                offset: 2,
                kind: MalformedKind::UnsupportedLetter { letter: '\u{FEFC}' }
            }
        ));
        // keheh
        assert!(matches!(
            tokenize("\u{06A9}\u{062A}\u{0627}\u{0628}").unwrap_err(),
            CodexError::MalformedInput {
                kind: MalformedKind::UnsupportedLetter { letter: '\u{06A9}' },
                ..
            }
        ));
    }

    #[test]
    fn test_arabic_punctuation_and_digits_break_phrases() {
        // comma, question mark, Arabic-Indic digit
        let stream = tokenize("\u{0628}\u{060C} \u{0628}\u{061F} \u{0663} \u{0628}").unwrap();
        assert_eq!(stream.words.len(), 3);
        assert!(stream.words[0].phrase_break_after);
        assert!(stream.words[1].phrase_break_after);
    }

    #[test]
    fn test_latin_text_yields_no_clusters() {
        let stream = tokenize("hello, world").unwrap();
        assert!(stream.clusters.is_empty());
        assert!(stream.words.is_empty());
    }
}
