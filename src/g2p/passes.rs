//! Phonological rule passes
//!
//! Each rule is a pure stage over the arena. `PIPELINE` fixes the order:
//! later rules see the effects of earlier ones.

use crate::config::{EmphaticSpan, G2pConfig};
use crate::g2p::arena::Arena;
use crate::g2p::rules::{HamzaCarrier, LetterClass, RuleTables};
use crate::g2p::tokenizer::Marks;
use crate::g2p::types::{Nucleus, PhonemeCategory, Vowel, VowelClass};

/// Per-call inputs shared by every pass
pub struct PassContext<'a> {
    pub tables: &'a RuleTables,
    pub config: &'a G2pConfig,
    pub pausal: bool,
}

/// Rule categories, dispatched by `match`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhonologicalRule {
    Gemination,
    HamzaResolution,
    TaaMarbuta,
    Tanween,
    SunMoonAssimilation,
    EmphaticSpreading,
    PausalFinal,
}

/// Fixed precedence order
pub const PIPELINE: [PhonologicalRule; 7] = [
    PhonologicalRule::Gemination,
    PhonologicalRule::HamzaResolution,
    PhonologicalRule::TaaMarbuta,
    PhonologicalRule::Tanween,
    PhonologicalRule::SunMoonAssimilation,
    PhonologicalRule::EmphaticSpreading,
    PhonologicalRule::PausalFinal,
];

impl PhonologicalRule {
    pub fn apply(self, arena: &mut Arena, ctx: &PassContext) {
        match self {
            PhonologicalRule::Gemination => gemination(arena),
            PhonologicalRule::HamzaResolution => hamza_resolution(arena, ctx.tables),
            PhonologicalRule::TaaMarbuta => taa_marbuta(arena, ctx.pausal),
            PhonologicalRule::Tanween => tanween(arena, ctx.pausal),
            PhonologicalRule::SunMoonAssimilation => sun_moon_assimilation(arena, ctx.tables),
            PhonologicalRule::EmphaticSpreading => {
                emphatic_spreading(arena, ctx.tables, ctx.config.emphatic_span)
            }
            PhonologicalRule::PausalFinal => pausal_final(arena, ctx.pausal),
        }
    }
}

/// Shadda doubles the duration of the cluster's consonant
fn gemination(arena: &mut Arena) {
    for slot in arena.slots.iter_mut().filter(|s| !s.dropped) {
        if slot.marks.shadda {
            slot.geminate = true;
        }
    }
}

fn own_vowel_class(marks: &Marks) -> VowelClass {
    if let Some(vowel) = marks.vowel.or(marks.tanween.map(|t| t.vowel())) {
        vowel.into()
    } else if marks.sukun {
        VowelClass::Sukun
    } else {
        VowelClass::Unmarked
    }
}

/// Glottal stop vowel from (carrier, preceding vowel, own vowel)
fn hamza_resolution(arena: &mut Arena, tables: &RuleTables) {
    for i in 0..arena.slots.len() {
        let slot = arena.slots[i];
        let LetterClass::Hamza(carrier) = slot.class else {
            continue;
        };
        if slot.dropped {
            continue;
        }

        // a long vowel letter right after the hamza carries its vowel
        let before_long_vowel = arena
            .next_in_word(i)
            .is_some_and(|n| arena.slots[n].category == PhonemeCategory::Vowel);
        if before_long_vowel && carrier != HamzaCarrier::AlifMadda {
            arena.slots[i].nucleus = None;
            continue;
        }

        let prev = arena
            .prev_in_word(i)
            .map_or(VowelClass::Boundary, |p| arena.slots[p].vowel_class());
        let own = own_vowel_class(&slot.marks);
        arena.slots[i].nucleus = tables.hamza_vowel(carrier, prev, own);
    }
}

/// Pausal: the cluster is silent; connected speech: /t/
fn taa_marbuta(arena: &mut Arena, pausal: bool) {
    for slot in arena.slots.iter_mut() {
        if slot.dropped || slot.class != LetterClass::TaaMarbuta {
            continue;
        }
        if pausal {
            slot.dropped = true;
        } else {
            slot.onset = Some("t");
        }
    }
}

/// Connected speech: vowel + /n/. Pausal: no /n/, tanween fatha becomes /aː/
fn tanween(arena: &mut Arena, pausal: bool) {
    for slot in arena.slots.iter_mut().filter(|s| !s.dropped) {
        let Some(tanween) = slot.marks.tanween else {
            continue;
        };
        let vowel = tanween.vowel();
        if !pausal {
            slot.nucleus = Some(Nucleus::short(vowel));
            slot.coda = Some("n");
        } else if vowel == Vowel::A {
            slot.nucleus = Some(Nucleus::long(Vowel::A));
            slot.coda = None;
        } else {
            slot.nucleus = Some(Nucleus::short(vowel));
            slot.coda = None;
        }
    }
}

/// Article /l/ before a sun letter is dropped and the letter geminated
fn sun_moon_assimilation(arena: &mut Arena, tables: &RuleTables) {
    for w in 0..arena.words.len() {
        let Some(article) = arena.words[w].article else {
            continue;
        };

        if article.relative {
            arena.slots[article.lam].geminate = true;
            continue;
        }

        let Some(target) = article.target else {
            continue;
        };
        let target_slot = arena.slots[target];
        let consonant = matches!(target_slot.class, LetterClass::Consonant { .. });
        if consonant && tables.is_sun_letter(target_slot.base) {
            tracing::debug!(
                "Article assimilates into {:?} at byte {}",
                target_slot.base,
                target_slot.offset
            );
            arena.slots[article.lam].dropped = true;
            arena.slots[target].geminate = true;
        }
    }
}

/// Mark tokens around ص ض ط ظ as pharyngealized
fn emphatic_spreading(arena: &mut Arena, tables: &RuleTables, span: EmphaticSpan) {
    let sources: Vec<usize> = arena
        .slots
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            !s.dropped
                && matches!(s.class, LetterClass::Consonant { .. })
                && tables.is_emphatic(s.base)
        })
        .map(|(i, _)| i)
        .collect();

    for i in sources {
        match span {
            EmphaticSpan::Word => {
                let word = arena.words[arena.slots[i].word];
                for slot in &mut arena.slots[word.start..word.end] {
                    if !slot.dropped {
                        slot.emphatic = true;
                    }
                }
            }
            EmphaticSpan::Adjacent => {
                arena.slots[i].emphatic = true;
                if let Some(p) = arena.prev_in_word(i) {
                    let prev = &mut arena.slots[p];
                    if !prev.dropped && prev.nucleus.is_some() {
                        prev.emphatic = true;
                    }
                }
                if let Some(n) = arena.next_in_word(i) {
                    if arena.slots[n].is_vowel_only() {
                        arena.slots[n].emphatic = true;
                    }
                }
            }
        }
    }
}

/// Pausal: the last word loses its final short vowel
fn pausal_final(arena: &mut Arena, pausal: bool) {
    if !pausal {
        return;
    }
    let Some(word) = arena.words.last().copied() else {
        return;
    };
    if word.start == word.end {
        return;
    }

    let slot = &mut arena.slots[word.end - 1];
    if slot.dropped || slot.coda.is_some() {
        return;
    }
    if slot.nucleus.is_some_and(|n| !n.long) {
        slot.nucleus = None;
        if slot.onset.is_none() {
            slot.dropped = true;
        }
    }
}
