//! Phonological rule tables
//!
//! Letter inventory, sun letters, emphatics, article proclitics and the
//! hamza context map. Built once and shared read-only between conversions.

use std::collections::{HashMap, HashSet};

use crate::g2p::tokenizer::{Marks, HAMZA_ABOVE, HAMZA_BELOW, MADDA};
use crate::g2p::types::{Nucleus, Vowel, VowelClass};

pub const HAMZA: char = '\u{0621}';
pub const ALIF_MADDA: char = '\u{0622}';
pub const ALIF_HAMZA_ABOVE: char = '\u{0623}';
pub const WAW_HAMZA: char = '\u{0624}';
pub const ALIF_HAMZA_BELOW: char = '\u{0625}';
pub const YAA_HAMZA: char = '\u{0626}';
pub const ALIF: char = '\u{0627}';
pub const TAA_MARBUTA: char = '\u{0629}';
pub const LAM: char = '\u{0644}';
pub const WAW: char = '\u{0648}';
pub const ALIF_MAQSURA: char = '\u{0649}';
pub const YAA: char = '\u{064A}';
pub const ALIF_WASLA: char = '\u{0671}';

/// Letter that can seat a hamza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HamzaCarrier {
    AlifAbove,
    AlifBelow,
    AlifMadda,
    Waw,
    /// Yaa or alif maqsura seat
    Yaa,
    /// Standalone hamza on the line
    Line,
}

impl HamzaCarrier {
    pub const ALL: [HamzaCarrier; 6] = [
        HamzaCarrier::AlifAbove,
        HamzaCarrier::AlifBelow,
        HamzaCarrier::AlifMadda,
        HamzaCarrier::Waw,
        HamzaCarrier::Yaa,
        HamzaCarrier::Line,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlifKind {
    Plain,
    /// Explicit hamzat al-wasl (U+0671)
    Wasla,
    Maqsura,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glide {
    Waw,
    Yaa,
}

impl Glide {
    pub fn ipa(self) -> &'static str {
        match self {
            Glide::Waw => "w",
            Glide::Yaa => "j",
        }
    }

    /// Long vowel this letter writes when used as a mater
    pub fn vowel(self) -> Vowel {
        match self {
            Glide::Waw => Vowel::U,
            Glide::Yaa => Vowel::I,
        }
    }
}

/// Lexical class of a base letter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LetterClass {
    Consonant { ipa: &'static str },
    Hamza(HamzaCarrier),
    TaaMarbuta,
    Alif(AlifKind),
    /// Waw / yaa: consonant, long vowel or diphthong glide depending on context
    Glide(Glide),
}

/// Read-only rule tables
pub struct RuleTables {
    letters: HashMap<char, LetterClass>,
    sun_letters: HashSet<char>,
    emphatics: HashSet<char>,
    proclitics: HashSet<char>,
    /// Relative pronouns spelled with one lam standing for a geminate
    relative_pronouns: HashSet<&'static str>,
    hamza: HashMap<(HamzaCarrier, VowelClass, VowelClass), Option<Nucleus>>,
}

impl RuleTables {
    pub fn new() -> Self {
        let consonants = [
            ('\u{0628}', "b"),
            ('\u{062A}', "t"),
            ('\u{062B}', "θ"),
            ('\u{062C}', "dʒ"),
            ('\u{062D}', "ħ"),
            ('\u{062E}', "x"),
            ('\u{062F}', "d"),
            ('\u{0630}', "ð"),
            ('\u{0631}', "r"),
            ('\u{0632}', "z"),
            ('\u{0633}', "s"),
            ('\u{0634}', "ʃ"),
            ('\u{0635}', "sˤ"),
            ('\u{0636}', "dˤ"),
            ('\u{0637}', "tˤ"),
            ('\u{0638}', "ðˤ"),
            ('\u{0639}', "ʕ"),
            ('\u{063A}', "ɣ"),
            ('\u{0641}', "f"),
            ('\u{0642}', "q"),
            ('\u{0643}', "k"),
            ('\u{0644}', "l"),
            ('\u{0645}', "m"),
            ('\u{0646}', "n"),
            ('\u{0647}', "h"),
            // loan letters
            ('\u{067E}', "p"),
            ('\u{0686}', "tʃ"),
            ('\u{06A4}', "v"),
            ('\u{06AF}', "g"),
        ];

        let mut letters: HashMap<char, LetterClass> = consonants
            .into_iter()
            .map(|(ch, ipa)| (ch, LetterClass::Consonant { ipa }))
            .collect();
        letters.extend([
            (HAMZA, LetterClass::Hamza(HamzaCarrier::Line)),
            (ALIF_MADDA, LetterClass::Hamza(HamzaCarrier::AlifMadda)),
            (ALIF_HAMZA_ABOVE, LetterClass::Hamza(HamzaCarrier::AlifAbove)),
            (WAW_HAMZA, LetterClass::Hamza(HamzaCarrier::Waw)),
            (ALIF_HAMZA_BELOW, LetterClass::Hamza(HamzaCarrier::AlifBelow)),
            (YAA_HAMZA, LetterClass::Hamza(HamzaCarrier::Yaa)),
            (ALIF, LetterClass::Alif(AlifKind::Plain)),
            (ALIF_WASLA, LetterClass::Alif(AlifKind::Wasla)),
            (ALIF_MAQSURA, LetterClass::Alif(AlifKind::Maqsura)),
            (TAA_MARBUTA, LetterClass::TaaMarbuta),
            (WAW, LetterClass::Glide(Glide::Waw)),
            (YAA, LetterClass::Glide(Glide::Yaa)),
        ]);

        // ت ث د ذ ر ز س ش ص ض ط ظ ل ن
        let sun_letters = [
            '\u{062A}', '\u{062B}', '\u{062F}', '\u{0630}', '\u{0631}', '\u{0632}', '\u{0633}',
            '\u{0634}', '\u{0635}', '\u{0636}', '\u{0637}', '\u{0638}', '\u{0644}', '\u{0646}',
        ]
        .into_iter()
        .collect();

        // ص ض ط ظ
        let emphatics = ['\u{0635}', '\u{0636}', '\u{0637}', '\u{0638}']
            .into_iter()
            .collect();

        // و ف ب ك
        let proclitics = [WAW, '\u{0641}', '\u{0628}', '\u{0643}'].into_iter().collect();

        let relative_pronouns = [
            "\u{0627}\u{0644}\u{0630}\u{064A}",           // الذي
            "\u{0627}\u{0644}\u{062A}\u{064A}",           // التي
            "\u{0627}\u{0644}\u{0630}\u{064A}\u{0646}",   // الذين
        ]
        .into_iter()
        .collect();

        let own_classes = [
            VowelClass::Unmarked,
            VowelClass::Sukun,
            VowelClass::A,
            VowelClass::I,
            VowelClass::U,
        ];
        let prev_classes = [
            VowelClass::Boundary,
            VowelClass::Unmarked,
            VowelClass::Sukun,
            VowelClass::A,
            VowelClass::I,
            VowelClass::U,
        ];
        let mut hamza = HashMap::new();
        for carrier in HamzaCarrier::ALL {
            for prev in prev_classes {
                for own in own_classes {
                    hamza.insert((carrier, prev, own), hamza_vowel(carrier, prev, own));
                }
            }
        }

        Self {
            letters,
            sun_letters,
            emphatics,
            proclitics,
            relative_pronouns,
            hamza,
        }
    }

    /// Class of a base letter, `None` for anything outside the inventory
    pub fn letter_class(&self, ch: char) -> Option<LetterClass> {
        self.letters.get(&ch).copied()
    }

    /// Class once the hamza marks are taken into account
    /// (alif + hamza above behaves like أ, and so on)
    pub fn with_marks(&self, class: LetterClass, marks: &Marks) -> LetterClass {
        match (class, marks.hamza_mark) {
            (LetterClass::Alif(AlifKind::Plain), Some(MADDA)) => {
                LetterClass::Hamza(HamzaCarrier::AlifMadda)
            }
            (LetterClass::Alif(AlifKind::Plain), Some(HAMZA_ABOVE)) => {
                LetterClass::Hamza(HamzaCarrier::AlifAbove)
            }
            (LetterClass::Alif(AlifKind::Plain), Some(HAMZA_BELOW)) => {
                LetterClass::Hamza(HamzaCarrier::AlifBelow)
            }
            (LetterClass::Alif(AlifKind::Maqsura), Some(_))
            | (LetterClass::Glide(Glide::Yaa), Some(_)) => LetterClass::Hamza(HamzaCarrier::Yaa),
            (LetterClass::Glide(Glide::Waw), Some(_)) => LetterClass::Hamza(HamzaCarrier::Waw),
            (class, _) => class,
        }
    }

    pub fn is_sun_letter(&self, ch: char) -> bool {
        self.sun_letters.contains(&ch)
    }

    pub fn is_emphatic(&self, ch: char) -> bool {
        self.emphatics.contains(&ch)
    }

    pub fn is_proclitic(&self, ch: char) -> bool {
        self.proclitics.contains(&ch)
    }

    pub fn is_relative_pronoun(&self, word: &str) -> bool {
        self.relative_pronouns.contains(word)
    }

    /// Vowel after the glottal stop for a hamza in the given context
    pub fn hamza_vowel(
        &self,
        carrier: HamzaCarrier,
        prev: VowelClass,
        own: VowelClass,
    ) -> Option<Nucleus> {
        self.hamza.get(&(carrier, prev, own)).copied().flatten()
    }
}

impl Default for RuleTables {
    fn default() -> Self {
        Self::new()
    }
}

/// Hamza realization rules used to fill the context map
fn hamza_vowel(carrier: HamzaCarrier, prev: VowelClass, own: VowelClass) -> Option<Nucleus> {
    // maddah is always glottal stop + long a
    if carrier == HamzaCarrier::AlifMadda {
        return Some(Nucleus::long(Vowel::A));
    }

    match own {
        VowelClass::A => return Some(Nucleus::short(Vowel::A)),
        VowelClass::I => return Some(Nucleus::short(Vowel::I)),
        VowelClass::U => return Some(Nucleus::short(Vowel::U)),
        VowelClass::Sukun => return None,
        VowelClass::Unmarked | VowelClass::Boundary => {}
    }

    // unvocalized hamza: the seat tells the vowel, unless the seat only
    // echoes the preceding vowel
    match carrier {
        HamzaCarrier::AlifBelow => Some(Nucleus::short(Vowel::I)),
        HamzaCarrier::AlifAbove if prev == VowelClass::A => None,
        HamzaCarrier::AlifAbove => Some(Nucleus::short(Vowel::A)),
        HamzaCarrier::Waw if prev == VowelClass::U => None,
        HamzaCarrier::Waw => Some(Nucleus::short(Vowel::U)),
        HamzaCarrier::Yaa if prev == VowelClass::I => None,
        HamzaCarrier::Yaa => Some(Nucleus::short(Vowel::I)),
        HamzaCarrier::Line if prev == VowelClass::Boundary => Some(Nucleus::short(Vowel::A)),
        HamzaCarrier::Line => None,
        HamzaCarrier::AlifMadda => Some(Nucleus::long(Vowel::A)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun_letters() {
        let tables = RuleTables::new();
        assert_eq!(tables.sun_letters.len(), 14);
        assert!(tables.is_sun_letter('\u{0634}')); // ش
        assert!(tables.is_sun_letter(LAM));
        assert!(!tables.is_sun_letter('\u{0642}')); // ق
        assert!(!tables.is_sun_letter('\u{062C}')); // ج
    }

    #[test]
    fn test_emphatics_are_sun_letters() {
        let tables = RuleTables::new();
        for ch in &tables.emphatics {
            assert!(tables.is_sun_letter(*ch));
        }
    }

    #[test]
    fn test_hamza_map_is_complete() {
        let tables = RuleTables::new();
        assert_eq!(tables.hamza.len(), 6 * 6 * 5);
    }

    #[test]
    fn test_hamza_own_vowel_wins() {
        let tables = RuleTables::new();
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::Waw, VowelClass::U, VowelClass::A),
            Some(Nucleus::short(Vowel::A))
        );
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::AlifAbove, VowelClass::Boundary, VowelClass::Sukun),
            None
        );
    }

    #[test]
    fn test_hamza_unvocalized_seats() {
        let tables = RuleTables::new();
        let u = VowelClass::Unmarked;
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::AlifAbove, VowelClass::Boundary, u),
            Some(Nucleus::short(Vowel::A))
        );
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::AlifAbove, VowelClass::A, u),
            None
        );
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::AlifBelow, VowelClass::Boundary, u),
            Some(Nucleus::short(Vowel::I))
        );
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::Yaa, VowelClass::I, u),
            None
        );
        assert_eq!(tables.hamza_vowel(HamzaCarrier::Line, VowelClass::A, u), None);
        assert_eq!(
            tables.hamza_vowel(HamzaCarrier::AlifMadda, VowelClass::Boundary, u),
            Some(Nucleus::long(Vowel::A))
        );
    }

    #[test]
    fn test_classify_hamza_marks() {
        let tables = RuleTables::new();
        let mut marks = Marks::default();
        marks.add(ALIF, HAMZA_BELOW).unwrap();
        let alif = tables.letter_class(ALIF).unwrap();
        assert_eq!(
            tables.with_marks(alif, &marks),
            LetterClass::Hamza(HamzaCarrier::AlifBelow)
        );
        assert_eq!(tables.with_marks(alif, &Marks::default()), alif);
        assert_eq!(
            tables.letter_class('\u{0628}'),
            Some(LetterClass::Consonant { ipa: "b" })
        );
        assert_eq!(tables.letter_class('a'), None);
    }
}
