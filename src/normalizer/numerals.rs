//! Numeral expansion
//!
//! Spells digit runs (ASCII, Arabic-Indic, Extended Arabic-Indic) as vocalized
//! Modern Standard Arabic cardinals. Counted nouns are not inflected: the
//! masculine nominative citation form is used throughout.

use crate::normalizer::types::FixupStats;

/// Runs longer than this are read digit by digit
const MAX_SPELLED_DIGITS: usize = 12;

const ONES: [&str; 10] = [
    "صِفْر",
    "وَاحِد",
    "اِثْنَان",
    "ثَلَاثَة",
    "أَرْبَعَة",
    "خَمْسَة",
    "سِتَّة",
    "سَبْعَة",
    "ثَمَانِيَة",
    "تِسْعَة",
];

/// First element of 11..=19 (index = unit)
const TEEN_UNITS: [&str; 10] = [
    "",
    "أَحَدَ",
    "اِثْنَا",
    "ثَلَاثَةَ",
    "أَرْبَعَةَ",
    "خَمْسَةَ",
    "سِتَّةَ",
    "سَبْعَةَ",
    "ثَمَانِيَةَ",
    "تِسْعَةَ",
];

const TEEN: &str = "عَشَرَ";
const TEN: &str = "عَشَرَة";

const TENS: [&str; 10] = [
    "",
    "",
    "عِشْرُون",
    "ثَلَاثُون",
    "أَرْبَعُون",
    "خَمْسُون",
    "سِتُّون",
    "سَبْعُون",
    "ثَمَانُون",
    "تِسْعُون",
];

const HUNDREDS: [&str; 10] = [
    "",
    "مِئَة",
    "مِئَتَان",
    "ثَلَاثُمِئَة",
    "أَرْبَعُمِئَة",
    "خَمْسُمِئَة",
    "سِتُّمِئَة",
    "سَبْعُمِئَة",
    "ثَمَانِمِئَة",
    "تِسْعُمِئَة",
];

/// (value, singular, dual, plural for 3..=10)
const SCALES: [(u64, &str, &str, &str); 3] = [
    (1_000_000_000, "مِلْيَار", "مِلْيَارَان", "مِلْيَارَات"),
    (1_000_000, "مِلْيُون", "مِلْيُونَان", "مَلَايِين"),
    (1_000, "أَلْف", "أَلْفَان", "آلَاف"),
];

const AND: &str = "وَ";

/// Value of a decimal digit in any of the supported scripts
pub fn digit_value(ch: char) -> Option<u8> {
    let value = match ch {
        '0'..='9' => ch as u32 - '0' as u32,
        '\u{0660}'..='\u{0669}' => ch as u32 - 0x0660,
        '\u{06F0}'..='\u{06F9}' => ch as u32 - 0x06F0,
        _ => return None,
    };
    Some(value as u8)
}

/// Join number parts with the conjunction: "a وَb وَc"
fn join_parts(parts: Vec<String>) -> String {
    let mut result = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            result.push(' ');
            result.push_str(AND);
        }
        result.push_str(&part);
    }
    result
}

fn below_thousand(n: u64) -> Vec<String> {
    let mut parts = Vec::new();
    let hundreds = (n / 100) as usize;
    let rest = n % 100;

    if hundreds > 0 {
        parts.push(HUNDREDS[hundreds].to_string());
    }

    let units = (rest % 10) as usize;
    let tens = (rest / 10) as usize;
    match rest {
        0 => {}
        1..=9 => parts.push(ONES[units].to_string()),
        10 => parts.push(TEN.to_string()),
        11..=19 => parts.push(format!("{} {}", TEEN_UNITS[units], TEEN)),
        _ if units == 0 => parts.push(TENS[tens].to_string()),
        _ => parts.push(format!("{} {}{}", ONES[units], AND, TENS[tens])),
    }

    parts
}

/// Spell a number below one trillion
pub fn spell_number(mut n: u64) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts = Vec::new();
    for (scale, singular, dual, plural) in SCALES {
        let count = n / scale;
        n %= scale;
        match count {
            0 => {}
            1 => parts.push(singular.to_string()),
            2 => parts.push(dual.to_string()),
            3..=10 => parts.push(format!("{} {}", join_parts(below_thousand(count)), plural)),
            _ => parts.push(format!("{} {}", join_parts(below_thousand(count)), singular)),
        }
    }
    parts.extend(below_thousand(n));

    join_parts(parts)
}

fn spell_digits(digits: &[u8]) -> String {
    digits
        .iter()
        .map(|d| ONES[*d as usize])
        .collect::<Vec<_>>()
        .join(" ")
}

fn spell_run(digits: &[u8]) -> String {
    let zero_padded = digits.len() > 1 && digits[0] == 0;
    if zero_padded || digits.len() > MAX_SPELLED_DIGITS {
        return spell_digits(digits);
    }
    let value = digits.iter().fold(0u64, |acc, d| acc * 10 + *d as u64);
    spell_number(value)
}

/// Replace every digit run with its spelled-out form, separated from
/// neighbouring text by single spaces
pub fn expand_numerals(text: &str, stats: &mut FixupStats) -> String {
    if !text.chars().any(|c| digit_value(c).is_some()) {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len() * 4);
    let mut run: Vec<u8> = Vec::new();
    let mut space_pending = false;

    let mut flush = |run: &mut Vec<u8>, result: &mut String, space_pending: &mut bool| {
        if run.is_empty() {
            return;
        }
        if result.chars().last().is_some_and(|c| !c.is_whitespace()) {
            result.push(' ');
        }
        result.push_str(&spell_run(run));
        stats.expanded += 1;
        run.clear();
        *space_pending = true;
    };

    for ch in text.chars() {
        if let Some(d) = digit_value(ch) {
            run.push(d);
            continue;
        }
        flush(&mut run, &mut result, &mut space_pending);
        if space_pending && !ch.is_whitespace() {
            result.push(' ');
        }
        space_pending = false;
        result.push(ch);
    }
    flush(&mut run, &mut result, &mut space_pending);

    result
}
