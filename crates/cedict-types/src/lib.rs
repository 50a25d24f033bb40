//! Shared types that mirror a CC-CEDICT dictionary record.
//!
//! A [`DictionaryEntry`] keeps the four fields found on every CC-CEDICT line:
//! traditional and simplified headwords, the numbered pinyin reading split
//! into syllables, and the ordered list of english glosses. Both headword
//! fields are always populated, even when the scripts coincide.
//!
//! Pinyin helpers live here as well so that loaders, classifiers and the
//! service all agree on what a "normalized" reading is: [`normalize_pinyin`]
//! folds case, tone digits and tone diacritics away, [`mark_syllable`] goes
//! the other direction and renders `hao3` as `hǎo`.
//!
//! ```rust
//! use cedict_types::{DictionaryEntry, normalize_pinyin};
//!
//! let entry = DictionaryEntry::new("天氣", "天气", ["tian1", "qi4"], ["weather"]);
//! assert_eq!(entry.pinyin_marks(), "tiān qì");
//! assert_eq!(normalize_pinyin("Tiān qì"), "tianqi");
//! ```

use std::fmt;

/// One dictionary record. Immutable once loaded.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DictionaryEntry {
    pub traditional: String,
    pub simplified: String,
    /// Numbered syllables as written in the source (`tian1`, `lu:4`, `de5`).
    pub pinyin: Vec<String>,
    pub english: Vec<String>,
}

impl DictionaryEntry {
    pub fn new<P, E>(traditional: &str, simplified: &str, pinyin: P, english: E) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            traditional: traditional.to_string(),
            simplified: simplified.to_string(),
            pinyin: pinyin.into_iter().map(Into::into).collect(),
            english: english.into_iter().map(Into::into).collect(),
        }
    }

    /// Syllables joined by single spaces, tone numbers kept.
    pub fn pinyin_numbers(&self) -> String {
        self.pinyin.join(" ")
    }

    /// Syllables rendered with tone diacritics (`ni3 hao3` -> `nǐ hǎo`).
    pub fn pinyin_marks(&self) -> String {
        self.pinyin
            .iter()
            .map(|s| mark_syllable(s))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Tone per syllable; neutral and unmarked syllables report 5.
    pub fn tones(&self) -> Vec<u8> {
        self.pinyin
            .iter()
            .map(|s| split_tone(s).1.unwrap_or(5))
            .collect()
    }

    /// True when both headwords are spelled identically.
    pub fn is_script_neutral(&self) -> bool {
        self.simplified == self.traditional
    }

    /// The headword written in `script`.
    pub fn headword(&self, script: Script) -> &str {
        match script {
            Script::Simplified => &self.simplified,
            Script::Traditional => &self.traditional,
        }
    }

    /// Glosses that define the word, skipping `CL:` classifier lists.
    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.english
            .iter()
            .map(String::as_str)
            .filter(|gloss| !gloss.starts_with("CL:"))
    }

    /// Classifiers listed in `CL:` glosses (`CL:個|个[ge4],次[ci4]`).
    pub fn measure_words(&self) -> Vec<MeasureWord> {
        self.english
            .iter()
            .filter_map(|gloss| gloss.strip_prefix("CL:"))
            .flat_map(|list| list.split(','))
            .filter_map(MeasureWord::parse)
            .collect()
    }

    /// True when every definition only points at another spelling
    /// (`variant of 以`, `old variant of 了`).
    pub fn is_variant_only(&self) -> bool {
        let mut definitions = self.definitions().peekable();
        definitions.peek().is_some() && definitions.all(is_variant_gloss)
    }
}

fn is_variant_gloss(gloss: &str) -> bool {
    let gloss = gloss.trim().to_ascii_lowercase();
    gloss.starts_with("variant of ") || gloss.contains(" variant of ")
}

/// A classifier attached to a noun entry.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MeasureWord {
    pub traditional: String,
    pub simplified: String,
    /// Numbered reading (`ge4`).
    pub pinyin: String,
}

impl MeasureWord {
    /// Parse one `TRAD|SIMP[pin1]` or `CHAR[pin1]` item of a `CL:` list.
    pub fn parse(item: &str) -> Option<Self> {
        let (forms, rest) = item.trim().split_once('[')?;
        let pinyin = rest.strip_suffix(']')?.trim();
        let (traditional, simplified) = forms.split_once('|').unwrap_or((forms, forms));
        if traditional.is_empty() || simplified.is_empty() || pinyin.is_empty() {
            return None;
        }
        Some(Self {
            traditional: traditional.to_string(),
            simplified: simplified.to_string(),
            pinyin: pinyin.to_string(),
        })
    }

    pub fn pinyin_marks(&self) -> String {
        self.pinyin
            .split_whitespace()
            .map(mark_syllable)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The two standardized orthographies of written Chinese.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Script {
    Simplified,
    Traditional,
}

impl Script {
    /// The script on the other side of a conversion.
    pub fn other(self) -> Self {
        match self {
            Script::Simplified => Script::Traditional,
            Script::Traditional => Script::Simplified,
        }
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Script::Simplified => "simplified",
            Script::Traditional => "traditional",
        })
    }
}

/// Coarse category of an arbitrary input string.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Classification {
    /// English (or any latin text that does not parse as pinyin).
    En,
    /// Romanized Mandarin.
    Py,
    /// Chinese characters.
    Zh,
}

impl Classification {
    /// Short uppercase code used on the wire (`EN`, `PY`, `ZH`).
    pub fn as_str(self) -> &'static str {
        match self {
            Classification::En => "EN",
            Classification::Py => "PY",
            Classification::Zh => "ZH",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split a numbered syllable into its body and tone (`hao3` -> `("hao", Some(3))`).
///
/// Only a trailing digit 1-5 counts as a tone.
pub fn split_tone(syllable: &str) -> (&str, Option<u8>) {
    match syllable.as_bytes().last() {
        Some(b @ b'1'..=b'5') => (&syllable[..syllable.len() - 1], Some(b - b'0')),
        _ => (syllable, None),
    }
}

/// Decompose a pinyin vowel carrying a tone diacritic (or `ü`) into its
/// lower-case ASCII base and tone. `ü` bases come back as `v`; tone 0 means
/// the vowel carried no mark.
pub fn strip_tone_mark(c: char) -> Option<(char, u8)> {
    let decomposed = match c {
        'ā' | 'Ā' => ('a', 1),
        'á' | 'Á' => ('a', 2),
        'ǎ' | 'Ǎ' => ('a', 3),
        'à' | 'À' => ('a', 4),
        'ē' | 'Ē' => ('e', 1),
        'é' | 'É' => ('e', 2),
        'ě' | 'Ě' => ('e', 3),
        'è' | 'È' => ('e', 4),
        'ī' | 'Ī' => ('i', 1),
        'í' | 'Í' => ('i', 2),
        'ǐ' | 'Ǐ' => ('i', 3),
        'ì' | 'Ì' => ('i', 4),
        'ō' | 'Ō' => ('o', 1),
        'ó' | 'Ó' => ('o', 2),
        'ǒ' | 'Ǒ' => ('o', 3),
        'ò' | 'Ò' => ('o', 4),
        'ū' | 'Ū' => ('u', 1),
        'ú' | 'Ú' => ('u', 2),
        'ǔ' | 'Ǔ' => ('u', 3),
        'ù' | 'Ù' => ('u', 4),
        'ǖ' | 'Ǖ' => ('v', 1),
        'ǘ' | 'Ǘ' => ('v', 2),
        'ǚ' | 'Ǚ' => ('v', 3),
        'ǜ' | 'Ǜ' => ('v', 4),
        'ü' | 'Ü' => ('v', 0),
        _ => return None,
    };
    Some(decomposed)
}

/// Canonical key for pinyin lookups.
///
/// Lower-cases, drops tone digits and diacritics, folds `ü`/`u:`/`v` to `v`
/// and removes every separator, so `Xī'ān`, `xi1 an1` and `xian` all map to
/// `xian`.
pub fn normalize_pinyin(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_ascii_alphabetic() {
            out.push(c.to_ascii_lowercase());
        } else if let Some((base, _)) = strip_tone_mark(c) {
            out.push(base);
        } else if c == ':' && out.ends_with('u') {
            out.pop();
            out.push('v');
        }
    }
    out
}

/// Render a numbered syllable with its tone diacritic.
///
/// The mark goes on `a` or `e` when present, on the `o` of `ou`, otherwise on
/// the last vowel. `u:` and `v` become `ü`. Neutral (5) and toneless
/// syllables are returned without a mark.
pub fn mark_syllable(syllable: &str) -> String {
    let (body, tone) = split_tone(syllable);
    let mut chars: Vec<char> = Vec::with_capacity(body.len());
    let mut iter = body.chars().peekable();
    while let Some(c) = iter.next() {
        match c {
            'u' | 'U' if iter.peek() == Some(&':') => {
                iter.next();
                chars.push(if c == 'U' { 'Ü' } else { 'ü' });
            }
            'v' => chars.push('ü'),
            'V' => chars.push('Ü'),
            _ => chars.push(c),
        }
    }

    let tone = match tone {
        Some(t @ 1..=4) => t,
        _ => return chars.into_iter().collect(),
    };

    let lower: Vec<char> = chars.iter().map(|c| lower_vowel(*c)).collect();
    let target = lower
        .iter()
        .position(|c| *c == 'a')
        .or_else(|| lower.iter().position(|c| *c == 'e'))
        .or_else(|| {
            lower
                .windows(2)
                .position(|w| w[0] == 'o' && w[1] == 'u')
        })
        .or_else(|| lower.iter().rposition(|c| "aeiouü".contains(*c)));

    if let Some(idx) = target
        && let Some(marked) = tone_mark(chars[idx], tone)
    {
        chars[idx] = marked;
    }
    chars.into_iter().collect()
}

fn lower_vowel(c: char) -> char {
    match c {
        'Ü' => 'ü',
        other => other.to_ascii_lowercase(),
    }
}

fn tone_mark(vowel: char, tone: u8) -> Option<char> {
    const TABLE: [(char, [char; 4]); 12] = [
        ('a', ['ā', 'á', 'ǎ', 'à']),
        ('e', ['ē', 'é', 'ě', 'è']),
        ('i', ['ī', 'í', 'ǐ', 'ì']),
        ('o', ['ō', 'ó', 'ǒ', 'ò']),
        ('u', ['ū', 'ú', 'ǔ', 'ù']),
        ('ü', ['ǖ', 'ǘ', 'ǚ', 'ǜ']),
        ('A', ['Ā', 'Á', 'Ǎ', 'À']),
        ('E', ['Ē', 'É', 'Ě', 'È']),
        ('I', ['Ī', 'Í', 'Ǐ', 'Ì']),
        ('O', ['Ō', 'Ó', 'Ǒ', 'Ò']),
        ('U', ['Ū', 'Ú', 'Ǔ', 'Ù']),
        ('Ü', ['Ǖ', 'Ǘ', 'Ǚ', 'Ǜ']),
    ];
    TABLE
        .iter()
        .find(|(base, _)| *base == vowel)
        .map(|(_, marks)| marks[tone as usize - 1])
}

/// Whether `c` is a CJK ideograph (unified, extensions A-G, compatibility, or `〇`).
pub fn is_ideograph(c: char) -> bool {
    matches!(c as u32,
        0x3007
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xF900..=0xFAFF
        | 0x20000..=0x2A6DF
        | 0x2A700..=0x2EBEF
        | 0x2F800..=0x2FA1F
        | 0x30000..=0x3134F)
}
