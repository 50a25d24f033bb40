//! Decide whether a string is English, pinyin or Chinese characters.
//!
//! Classification is purely structural: characters are bucketed by Unicode
//! range, and latin text is checked against a pinyin syllable grammar
//! (initial + final + optional tone digit). No dictionary is consulted, so
//! romanizations that never appear in a lexicon still come back as
//! [`Classification::Py`].
//!
//! # How it works
//! 1. Bucket every character: ideograph, letter (ASCII or toned pinyin
//!    vowel), neutral (whitespace, digits, punctuation) or other.
//! 2. Nothing but neutral characters is an error.
//! 3. The bucket with more characters wins between ideographs and letters;
//!    ties go to ideographs.
//! 4. Latin text is `Py` when every letter run parses as syllables, else `En`.
//!
//! # Example
//! ```
//! use cedict_classify::classify;
//! use cedict_types::Classification;
//!
//! assert_eq!(classify("shiyan").unwrap(), Classification::Py);
//! assert_eq!(classify("test").unwrap(), Classification::En);
//! assert_eq!(classify("实验").unwrap(), Classification::Zh);
//! assert!(classify("   ").is_err());
//! ```

use cedict_types::{Classification, is_ideograph, strip_tone_mark};
use thiserror::Error;

/// Why an input could not be placed in any category.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("input is empty or contains only whitespace, digits and punctuation")]
    Empty,
    #[error("input contains no latin letters or Chinese characters")]
    Unrecognized,
}

/// Longest legal syllable (`zhuang`, `shuang`, `chuang`).
const MAX_SYLLABLE_LEN: usize = 6;

const INITIALS: &[&str] = &[
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r",
    "z", "c", "s", "y", "w",
];

const FINALS: &[&str] = &[
    "a", "o", "e", "i", "u", "v", "ai", "ei", "ao", "ou", "an", "en", "ang", "eng", "ong", "ia",
    "ie", "iao", "iu", "ian", "in", "iang", "ing", "iong", "ua", "uo", "uai", "ui", "uan", "un",
    "uang", "ue", "ve",
];

/// Whole syllables outside the initial + final pattern.
const STANDALONE: &[&str] = &["er", "m", "n", "ng", "hm", "hng"];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum CharClass {
    Ideograph,
    Letter,
    Neutral,
    Other,
}

fn char_class(c: char) -> CharClass {
    if is_ideograph(c) {
        CharClass::Ideograph
    } else if c.is_ascii_alphabetic() || strip_tone_mark(c).is_some() {
        CharClass::Letter
    } else if c.is_whitespace()
        || c.is_ascii_digit()
        || c.is_ascii_punctuation()
        || is_wide_punctuation(c)
    {
        CharClass::Neutral
    } else {
        CharClass::Other
    }
}

fn is_wide_punctuation(c: char) -> bool {
    matches!(c as u32, 0x00B7 | 0x2010..=0x206F | 0x3000..=0x303F | 0xFF00..=0xFFEF)
}

/// Classify `text` as English, pinyin or Chinese.
pub fn classify(text: &str) -> Result<Classification, ClassificationError> {
    let mut ideographs = 0usize;
    let mut letters = 0usize;
    let mut others = 0usize;
    for c in text.chars() {
        match char_class(c) {
            CharClass::Ideograph => ideographs += 1,
            CharClass::Letter => letters += 1,
            CharClass::Neutral => {}
            CharClass::Other => others += 1,
        }
    }

    if ideographs == 0 && letters == 0 {
        return Err(if others == 0 {
            ClassificationError::Empty
        } else {
            ClassificationError::Unrecognized
        });
    }
    if ideographs >= letters {
        return Ok(Classification::Zh);
    }
    if is_pinyin(text) {
        Ok(Classification::Py)
    } else {
        Ok(Classification::En)
    }
}

/// True when every run of letters (with tone digits) in `text` parses as
/// pinyin syllables. Text without any letters is not pinyin.
pub fn is_pinyin(text: &str) -> bool {
    let runs = letter_runs(text);
    !runs.is_empty() && runs.iter().all(|run| syllabify_run(run).is_some())
}

/// Split `text` into syllables, longest syllable first at every position.
///
/// Tone digits stay attached to their syllable and diacritics are folded
/// away (`Xī'ān` -> `["xi", "an"]`, `ni3hao3` -> `["ni3", "hao3"]`). Returns
/// `None` when any run fails to parse.
pub fn syllabify(text: &str) -> Option<Vec<String>> {
    let runs = letter_runs(text);
    if runs.is_empty() {
        return None;
    }
    let mut out = Vec::new();
    for run in &runs {
        out.extend(syllabify_run(run)?);
    }
    Some(out)
}

/// Maximal runs of letters and ASCII digits, lower-cased with tone marks
/// folded. Runs made only of digits are plain numbers and are dropped.
fn letter_runs(text: &str) -> Vec<String> {
    let mut runs = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        if c.is_ascii_alphabetic() || c.is_ascii_digit() {
            current.push(c.to_ascii_lowercase());
        } else if let Some((base, _)) = strip_tone_mark(c) {
            current.push(base);
        } else if !current.is_empty() {
            runs.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs.retain(|run| run.bytes().any(|b| b.is_ascii_alphabetic()));
    runs
}

fn syllabify_run(run: &str) -> Option<Vec<String>> {
    let mut dead = vec![false; run.len() + 1];
    let mut out = Vec::new();
    if parse_from(run, 0, &mut dead, &mut out) {
        Some(out)
    } else {
        None
    }
}

/// Depth-first parse from `pos`, longest syllable first, memoizing positions
/// that cannot reach the end.
fn parse_from(run: &str, pos: usize, dead: &mut [bool], out: &mut Vec<String>) -> bool {
    if pos == run.len() {
        return true;
    }
    if dead[pos] {
        return false;
    }

    let rest = &run[pos..];
    let longest = MAX_SYLLABLE_LEN.min(rest.len());
    for len in (1..=longest).rev() {
        let body = &rest[..len];
        if !is_syllable(body) {
            continue;
        }
        let mut end = pos + len;
        if let Some(b'1'..=b'4') = run.as_bytes().get(end) {
            end += 1;
        }
        out.push(run[pos..end].to_string());
        if parse_from(run, end, dead, out) {
            return true;
        }
        out.pop();
    }

    dead[pos] = true;
    false
}

/// Whether `s` (lower-case ASCII, no tone) is one legal syllable.
pub fn is_syllable(s: &str) -> bool {
    if STANDALONE.contains(&s) {
        return true;
    }
    if s.starts_with(['a', 'o', 'e']) && FINALS.contains(&s) {
        return true;
    }
    INITIALS.iter().any(|initial| {
        s.strip_prefix(initial)
            .is_some_and(|fin| FINALS.contains(&fin) && pairs_with(initial, fin))
    })
}

/// Finals that only follow some initials.
fn pairs_with(initial: &str, fin: &str) -> bool {
    match fin {
        "v" | "ve" => matches!(initial, "n" | "l"),
        "ue" => matches!(initial, "j" | "q" | "x" | "y" | "n" | "l"),
        "i" => !matches!(initial, "f" | "g" | "k" | "h" | "w"),
        _ => true,
    }
}
