//! Conversion arena
//!
//! One slot per graphemic cluster, addressed by index. Building the arena
//! detects definite articles, gives every slot its base realization and
//! folds away the silent hamzat al-wasl; the rule passes then edit slots in
//! place and `emit` turns the surviving slots into tokens.

use crate::config::G2pConfig;
use crate::g2p::rules::{AlifKind, Glide, LetterClass, RuleTables, LAM};
use crate::g2p::tokenizer::{Cluster, ClusterStream, Marks};
use crate::g2p::types::{Nucleus, PhonemeCategory, PhonemeToken, Vowel, VowelClass};

pub const GLOTTAL_STOP: &str = "ʔ";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub base: char,
    pub class: LetterClass,
    pub marks: Marks,
    pub offset: usize,
    pub word: usize,
    pub onset: Option<&'static str>,
    pub nucleus: Option<Nucleus>,
    /// Nunation /n/
    pub coda: Option<&'static str>,
    pub geminate: bool,
    pub emphatic: bool,
    /// Removed from the output by a rule
    pub dropped: bool,
    pub category: PhonemeCategory,
}

impl Slot {
    fn new(cluster: &Cluster, class: LetterClass) -> Self {
        Self {
            base: cluster.base,
            class,
            marks: cluster.marks,
            offset: cluster.offset,
            word: cluster.word,
            onset: None,
            nucleus: None,
            coda: None,
            geminate: false,
            emphatic: false,
            dropped: false,
            category: PhonemeCategory::Consonant,
        }
    }

    /// Surviving slot that is only a vowel (long vowel letter)
    pub fn is_vowel_only(&self) -> bool {
        !self.dropped && self.onset.is_none() && self.nucleus.is_some()
    }

    /// Vowel context this slot leaves for a following hamza
    pub fn vowel_class(&self) -> VowelClass {
        match self.nucleus {
            Some(nucleus) => nucleus.vowel.into(),
            None if self.marks.sukun => VowelClass::Sukun,
            None => VowelClass::Unmarked,
        }
    }

    pub fn symbol(&self) -> String {
        let mut symbol = String::new();
        if let Some(onset) = self.onset {
            symbol.push_str(onset);
        }
        if let Some(nucleus) = self.nucleus {
            symbol.push_str(nucleus.ipa());
        }
        if let Some(coda) = self.coda {
            symbol.push_str(coda);
        }
        symbol
    }
}

/// Definite article found in a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Article {
    /// Conjunction or preposition glued in front (و ف ب ك)
    pub proclitic: Option<usize>,
    /// `None` once the alif is elided inside an utterance
    pub alif: Option<usize>,
    pub lam: usize,
    /// First consonant after the article; `None` when a detached article
    /// has no following word in its phrase
    pub target: Option<usize>,
    /// الذي / التي / الذين: the lam is kept and geminated
    pub relative: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSpan {
    pub start: usize,
    pub end: usize,
    pub phrase_break_after: bool,
    /// First word of the text or of a phrase
    pub utterance_initial: bool,
    pub article: Option<Article>,
}

impl WordSpan {
    pub fn contains(&self, index: usize) -> bool {
        (self.start..self.end).contains(&index)
    }
}

#[derive(Debug, Clone)]
pub struct Arena {
    pub slots: Vec<Slot>,
    pub words: Vec<WordSpan>,
}

impl Arena {
    pub fn build(stream: &ClusterStream, tables: &RuleTables) -> Self {
        let slots = stream
            .clusters
            .iter()
            .map(|cluster| Slot::new(cluster, tables.with_marks(cluster.class, &cluster.marks)))
            .collect();

        let words = stream
            .words
            .iter()
            .enumerate()
            .map(|(i, word)| WordSpan {
                start: word.start,
                end: word.end,
                phrase_break_after: word.phrase_break_after,
                utterance_initial: i == 0 || stream.words[i - 1].phrase_break_after,
                article: None,
            })
            .collect();

        let mut arena = Arena { slots, words };

        for w in 0..arena.words.len() {
            arena.words[w].article = arena.detect_article(w, tables);
        }
        for i in 0..arena.slots.len() {
            arena.realize(i);
        }
        arena.fold_elided_alifs();

        arena
    }

    pub fn prev_in_word(&self, index: usize) -> Option<usize> {
        let word = &self.words[self.slots[index].word];
        (index > word.start).then(|| index - 1)
    }

    pub fn next_in_word(&self, index: usize) -> Option<usize> {
        let word = &self.words[self.slots[index].word];
        (index + 1 < word.end).then(|| index + 1)
    }

    /// Turn the surviving slots into tokens
    pub fn emit(&self, config: &G2pConfig) -> Vec<PhonemeToken> {
        self.slots
            .iter()
            .filter(|slot| !slot.dropped)
            .filter_map(|slot| {
                let symbol = slot.symbol();
                if symbol.is_empty() {
                    tracing::debug!("Empty slot for {:?} at byte {}", slot.base, slot.offset);
                    return None;
                }
                let duration_hint = if slot.geminate {
                    config.gemination_multiplier
                } else if slot.nucleus.is_some_and(|n| n.long) {
                    config.long_vowel_multiplier
                } else {
                    0.0
                };
                Some(PhonemeToken {
                    symbol,
                    is_emphatic: slot.emphatic,
                    duration_hint,
                    category: slot.category,
                })
            })
            .collect()
    }

    // ========================================================================
    // Definite article detection
    // ========================================================================

    fn detect_article(&self, w: usize, tables: &RuleTables) -> Option<Article> {
        let span = self.words[w];
        let len = span.end - span.start;

        // relative pronouns, optionally behind a proclitic
        let spelled: String = self.slots[span.start..span.end]
            .iter()
            .map(|slot| slot.base)
            .collect();
        for proclitic in [false, true] {
            let alif = span.start + proclitic as usize;
            if proclitic && (len < 2 || !self.is_proclitic(span.start, tables)) {
                continue;
            }
            let rest = spelled.chars().skip(proclitic as usize).collect::<String>();
            if tables.is_relative_pronoun(&rest) {
                return Some(Article {
                    proclitic: proclitic.then_some(span.start),
                    alif: Some(alif),
                    lam: alif + 1,
                    target: Some(alif + 2),
                    relative: true,
                });
            }
        }

        // detached: "ال" written as its own word
        if len == 2 && self.is_article_pair(span.start) {
            let target = self
                .words
                .get(w + 1)
                .filter(|_| !span.phrase_break_after)
                .map(|next| next.start);
            if target.is_none() {
                tracing::debug!(
                    "Detached article at byte {} has no following word, /l/ kept",
                    self.slots[span.start].offset
                );
            }
            return Some(Article {
                proclitic: None,
                alif: Some(span.start),
                lam: span.start + 1,
                target,
                relative: false,
            });
        }

        // attached, optionally behind one proclitic
        for proclitic in [false, true] {
            let alif = span.start + proclitic as usize;
            let lam = alif + 1;
            let target = lam + 1;
            if target >= span.end {
                continue;
            }
            if proclitic && !self.is_proclitic(span.start, tables) {
                continue;
            }
            if !self.is_article_pair(alif) {
                continue;
            }

            // short words like والد or الى are not article + stem
            let minimum = if proclitic { 3 } else { 2 };
            let long_enough = span.end - target >= minimum;
            if long_enough || self.slots[lam].marks.sukun || self.slots[target].marks.shadda {
                return Some(Article {
                    proclitic: proclitic.then_some(span.start),
                    alif: Some(alif),
                    lam,
                    target: Some(target),
                    relative: false,
                });
            }
        }

        None
    }

    /// Alif (bare or with fatha) followed by a lam without a vowel
    fn is_article_pair(&self, alif: usize) -> bool {
        let Some(lam) = self.slots.get(alif + 1) else {
            return false;
        };
        let alif = &self.slots[alif];

        let alif_ok = matches!(
            alif.class,
            LetterClass::Alif(AlifKind::Plain) | LetterClass::Alif(AlifKind::Wasla)
        ) && matches!(alif.marks.vowel, None | Some(Vowel::A))
            && alif.marks.tanween.is_none()
            && !alif.marks.shadda
            && !alif.marks.sukun;
        let lam_ok = lam.base == LAM
            && lam.word == alif.word
            && lam.marks.vowel.is_none()
            && lam.marks.tanween.is_none()
            && !lam.marks.shadda;

        alif_ok && lam_ok
    }

    fn is_proclitic(&self, index: usize, tables: &RuleTables) -> bool {
        let slot = &self.slots[index];
        tables.is_proclitic(slot.base)
            && slot.marks.tanween.is_none()
            && !slot.marks.sukun
            && !slot.marks.shadda
    }

    // ========================================================================
    // Base realization
    // ========================================================================

    fn realize(&mut self, i: usize) {
        let slot = self.slots[i];
        match slot.class {
            LetterClass::Consonant { ipa } => {
                self.slots[i].onset = Some(ipa);
                self.slots[i].nucleus = marked_nucleus(&slot.marks);
            }
            // vowel comes from hamza resolution
            LetterClass::Hamza(_) => self.slots[i].onset = Some(GLOTTAL_STOP),
            // onset comes from the taa marbuta pass
            LetterClass::TaaMarbuta => self.slots[i].nucleus = marked_nucleus(&slot.marks),
            LetterClass::Alif(kind) => self.realize_alif(i, kind),
            LetterClass::Glide(glide) => self.realize_glide(i, glide),
        }
    }

    fn realize_alif(&mut self, i: usize, kind: AlifKind) {
        let slot = self.slots[i];
        let word = self.words[slot.word];
        let article_alif = word.article.filter(|a| a.alif == Some(i));
        let word_initial = i == word.start && kind != AlifKind::Maqsura;

        if article_alif.is_some() || word_initial || kind == AlifKind::Wasla {
            // hamzat al-wasl: glottal onset only at the start of an utterance
            if word_initial && word.utterance_initial {
                let default = if article_alif.is_some() {
                    Vowel::A
                } else {
                    Vowel::I
                };
                let vowel = slot.marks.vowel.unwrap_or(default);
                self.slots[i].onset = Some(GLOTTAL_STOP);
                self.slots[i].nucleus = Some(Nucleus::short(vowel));
            } else {
                // folded out of the arena after realization
                self.slots[i].dropped = true;
            }
            return;
        }

        self.make_long_vowel(i, Vowel::A);
    }

    fn realize_glide(&mut self, i: usize, glide: Glide) {
        let marks = self.slots[i].marks;
        let consonantal = marks.vowel.is_some()
            || marks.tanween.is_some()
            || marks.shadda
            || marks.dagger_alif;

        if !consonantal {
            if let Some(p) = self.prev_in_word(i) {
                match self.short_vowel_at(p) {
                    Some(vowel) if vowel == glide.vowel() => {
                        self.make_long_vowel(i, vowel);
                        return;
                    }
                    Some(Vowel::A) => {
                        self.slots[i].onset = Some(glide.ipa());
                        self.slots[i].category = PhonemeCategory::Diphthong;
                        return;
                    }
                    Some(_) => {}
                    None => {
                        // unvocalized text: read the letter as a long vowel
                        let prev = &self.slots[p];
                        if marks.is_empty() && prev.marks.is_empty() && !prev.is_vowel_only() {
                            self.make_long_vowel(i, glide.vowel());
                            return;
                        }
                    }
                }
            }
        }

        self.slots[i].onset = Some(glide.ipa());
        self.slots[i].nucleus = marked_nucleus(&marks);
    }

    /// Remove the wasl alifs elided by `realize_alif` and shift every index
    /// after them. They have no sound and no cluster of their own, like the
    /// tanween seat the tokenizer absorbs.
    fn fold_elided_alifs(&mut self) {
        // realization drops nothing else
        if !self.slots.iter().any(|slot| slot.dropped) {
            return;
        }

        // remap[i]: new index of slot i, or of the next kept slot
        let mut remap = Vec::with_capacity(self.slots.len() + 1);
        let mut kept = 0;
        for slot in &self.slots {
            remap.push(kept);
            if !slot.dropped {
                kept += 1;
            }
        }
        remap.push(kept);

        for word in &mut self.words {
            if let Some(article) = word.article.as_mut() {
                article.alif = article
                    .alif
                    .filter(|&alif| !self.slots[alif].dropped)
                    .map(|alif| remap[alif]);
                article.proclitic = article.proclitic.map(|p| remap[p]);
                article.lam = remap[article.lam];
                article.target = article.target.map(|t| remap[t]);
            }
            word.start = remap[word.start];
            word.end = remap[word.end];
        }

        let elided = self.slots.len() - kept;
        self.slots.retain(|slot| !slot.dropped);
        tracing::debug!("Folded {} elided wasl alif(s)", elided);
    }

    /// Short vowel carried by a slot (a hamza's own mark counts before resolution)
    fn short_vowel_at(&self, index: usize) -> Option<Vowel> {
        let slot = &self.slots[index];
        match (slot.nucleus, slot.class) {
            (Some(nucleus), _) if !nucleus.long => Some(nucleus.vowel),
            (Some(_), _) => None,
            (None, LetterClass::Hamza(_)) => slot.marks.vowel,
            (None, _) => None,
        }
    }

    /// Realize a slot as a long vowel letter, absorbing the matching short
    /// vowel of the cluster before it
    fn make_long_vowel(&mut self, i: usize, vowel: Vowel) {
        if let Some(p) = self.prev_in_word(i) {
            let prev = &mut self.slots[p];
            if prev.nucleus == Some(Nucleus::short(vowel)) {
                prev.nucleus = None;
            }
        }
        let slot = &mut self.slots[i];
        slot.onset = None;
        slot.nucleus = Some(Nucleus::long(vowel));
        slot.category = PhonemeCategory::Vowel;
    }
}

/// Vowel written on a consonant: dagger alef, short vowel or tanween vowel
fn marked_nucleus(marks: &Marks) -> Option<Nucleus> {
    if marks.dagger_alif {
        return Some(Nucleus::long(Vowel::A));
    }
    marks
        .vowel
        .or(marks.tanween.map(|t| t.vowel()))
        .map(Nucleus::short)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::g2p::tokenizer::Tokenizer;

    fn build(text: &str) -> Arena {
        let tables = RuleTables::new();
        let stream = Tokenizer::tokenize(text, &tables).unwrap();
        Arena::build(&stream, &tables)
    }

    fn symbols(arena: &Arena) -> Vec<String> {
        arena
            .slots
            .iter()
            .filter(|s| !s.dropped)
            .map(|s| s.symbol())
            .collect()
    }

    #[test]
    fn test_attached_article() {
        let arena = build("الْقَمَرُ");
        let article = arena.words[0].article.unwrap();
        assert_eq!((article.alif, article.lam, article.target), (Some(0), 1, Some(2)));
        assert!(!article.relative);
    }

    #[test]
    fn test_article_behind_proclitic() {
        // وَالْكِتَابُ
        let arena = build("وَالْكِتَابُ");
        let article = arena.words[0].article.unwrap();
        assert_eq!(article.proclitic, Some(0));
        // the article alif is silent after the proclitic and leaves the arena
        assert_eq!(article.alif, None);
        assert_eq!(article.lam, 1);
        assert_eq!(article.target, Some(2));
        assert_eq!(arena.slots.len(), 6);
        assert_eq!(arena.slots[1].base, LAM);
        assert!(arena.slots.iter().all(|s| !s.dropped));
    }

    #[test]
    fn test_short_words_are_not_articles() {
        // الى (unvocalized "ilaa") and والد
        assert!(build("\u{0627}\u{0644}\u{0649}").words[0].article.is_none());
        assert!(build("\u{0648}\u{0627}\u{0644}\u{062F}").words[0].article.is_none());
    }

    #[test]
    fn test_detached_article() {
        let arena = build("\u{0627}\u{0644} \u{0634}\u{0645}\u{0633}");
        let article = arena.words[0].article.unwrap();
        assert_eq!(article.target, Some(2));

        // nothing follows in the phrase
        let arena = build("\u{0627}\u{0644}\u{060C} \u{0634}\u{0645}\u{0633}");
        assert_eq!(arena.words[0].article.unwrap().target, None);
    }

    #[test]
    fn test_relative_pronoun() {
        let arena = build("\u{0627}\u{0644}\u{0630}\u{064A}");
        assert!(arena.words[0].article.unwrap().relative);
    }

    #[test]
    fn test_long_vowel_absorbs_short_vowel() {
        // كِتَابٌ
        assert_eq!(symbols(&build("كِتَابٌ")), ["ki", "t", "aː", "bu"]);
        // نُور
        assert_eq!(symbols(&build("نُور")), ["n", "uː", "r"]);
    }

    #[test]
    fn test_diphthong_glide() {
        // بَيْت
        let arena = build("بَيْت");
        assert_eq!(symbols(&arena), ["ba", "j", "t"]);
        assert_eq!(arena.slots[1].category, PhonemeCategory::Diphthong);
    }

    #[test]
    fn test_wasl_alif() {
        // utterance start: glottal onset
        assert_eq!(symbols(&build("\u{0627}\u{0633}\u{0645}")), ["ʔi", "s", "m"]);
        // mid utterance: silent, and folded out of the next word
        let arena = build("\u{0628}\u{0650} \u{0627}\u{0633}\u{0645}");
        assert_eq!(symbols(&arena), ["bi", "s", "m"]);
        assert_eq!(arena.slots.len(), 3);
        assert_eq!((arena.words[1].start, arena.words[1].end), (1, 3));
        assert_eq!(arena.slots[1].word, 1);
    }

    #[test]
    fn test_dagger_alif_is_long() {
        // هٰذا
        assert_eq!(symbols(&build("\u{0647}\u{0670}\u{0630}\u{0627}")), ["haː", "ð", "aː"]);
    }
}
