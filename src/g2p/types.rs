//! G2P type definitions

use serde::{Deserialize, Serialize};

/// Broad phoneme class of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhonemeCategory {
    /// Consonant onset, optionally followed by its vowel
    Consonant,
    /// Vowel-only token (long vowel letter)
    Vowel,
    /// Glide closing a diphthong (/aw/, /aj/)
    Diphthong,
}

/// One unit of converter output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeToken {
    /// IPA symbol (may span several characters, e.g. "sˤa", "aː")
    pub symbol: String,
    /// Inside an emphatic spreading span
    pub is_emphatic: bool,
    /// 0 = synthesizer default; positive values override the default duration
    pub duration_hint: f32,
    pub category: PhonemeCategory,
}

/// Short vowel quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vowel {
    A,
    I,
    U,
}

impl Vowel {
    pub fn short_ipa(self) -> &'static str {
        match self {
            Vowel::A => "a",
            Vowel::I => "i",
            Vowel::U => "u",
        }
    }

    pub fn long_ipa(self) -> &'static str {
        match self {
            Vowel::A => "aː",
            Vowel::I => "iː",
            Vowel::U => "uː",
        }
    }
}

/// Vowel of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nucleus {
    pub vowel: Vowel,
    pub long: bool,
}

impl Nucleus {
    pub fn short(vowel: Vowel) -> Self {
        Self { vowel, long: false }
    }

    pub fn long(vowel: Vowel) -> Self {
        Self { vowel, long: true }
    }

    pub fn ipa(&self) -> &'static str {
        if self.long {
            self.vowel.long_ipa()
        } else {
            self.vowel.short_ipa()
        }
    }
}

/// Nunation mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tanween {
    Fath,
    Damm,
    Kasr,
}

impl Tanween {
    pub fn vowel(self) -> Vowel {
        match self {
            Tanween::Fath => Vowel::A,
            Tanween::Damm => Vowel::U,
            Tanween::Kasr => Vowel::I,
        }
    }
}

/// Vowel context around a hamza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VowelClass {
    /// Start of the word
    Boundary,
    /// Letter without any vowel mark
    Unmarked,
    Sukun,
    A,
    I,
    U,
}

impl From<Vowel> for VowelClass {
    fn from(vowel: Vowel) -> Self {
        match vowel {
            Vowel::A => VowelClass::A,
            Vowel::I => VowelClass::I,
            Vowel::U => VowelClass::U,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleus_ipa() {
        assert_eq!(Nucleus::short(Vowel::U).ipa(), "u");
        assert_eq!(Nucleus::long(Vowel::I).ipa(), "iː");
        assert_eq!(Tanween::Kasr.vowel(), Vowel::I);
    }

    #[test]
    fn test_token_serializes_snake_case_category() {
        let token = PhonemeToken {
            symbol: "aː".to_string(),
            is_emphatic: false,
            duration_hint: 2.0,
            category: PhonemeCategory::Vowel,
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(json.contains(r#""category":"vowel""#));
    }
}
