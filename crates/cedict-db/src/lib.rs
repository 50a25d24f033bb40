//! Load CC-CEDICT dictionaries and index them for lookup.
//!
//! This crate ingests the canonical `cedict_ts.u8` text format, one record per
//! line:
//!
//! ```text
//! 天氣 天气 [tian1 qi4] /weather/
//! ```
//!
//! and builds a [`Lexicon`]: the immutable entry list plus indices keyed by
//! simplified headword, traditional headword, normalized pinyin, english gloss
//! token and whole english gloss. Every index keeps entry ids in load order, so
//! the first-loaded entry always wins ties.
//!
//! Callers choose between memory-mapped files or owned buffers at runtime via
//! [`LoadMode`]; fixtures can skip the filesystem with
//! [`Lexicon::from_cedict_str`].
//!
//! # Example
//! ```no_run
//! use cedict_db::{LoadMode, Lexicon};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lexicon = Lexicon::load_with_mode("/path/to/cedict_ts.u8", LoadMode::Mmap)?;
//! for entry in lexicon.by_pinyin("tianqi") {
//!     println!("{} {}", entry.simplified, entry.english.join("; "));
//! }
//! println!("{:?}", lexicon.segment("今天的天气还可以吧"));
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p cedict-db --example stats -- <cedict_ts.u8>`.

mod segment;

pub use segment::segment_with;

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use cedict_types::{DictionaryEntry, normalize_pinyin};
use memmap2::Mmap;
use tracing::{debug, info};

/// Strategy for reading the dictionary file.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map the file (fast, no upfront copy).
    Mmap,
    /// Read the file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

type EntryId = u32;

/// Longest run of query words matched against whole glosses.
const MAX_GLOSS_PHRASE_WORDS: usize = 4;

/// Words that never select entries on their own inside a longer query.
const STOP_WORDS: &[&str] = &["a", "an", "the", "to", "of"];

/// Immutable dictionary with simplified, traditional, pinyin and english indices.
pub struct Lexicon {
    entries: Vec<DictionaryEntry>,
    /// Lower-cased glosses joined by `/`, one per entry, for substring fallback.
    gloss_text: Vec<String>,
    by_simplified: HashMap<String, Vec<EntryId>>,
    by_traditional: HashMap<String, Vec<EntryId>>,
    by_pinyin: HashMap<String, Vec<EntryId>>,
    by_english: HashMap<String, Vec<EntryId>>,
    /// Whole glosses, normalized by [`gloss_key`].
    by_gloss: HashMap<String, Vec<EntryId>>,
    max_word_len: usize,
}

impl Lexicon {
    /// Load a CC-CEDICT file, memory-mapping it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(path, LoadMode::Mmap)
    }

    /// Load a CC-CEDICT file choosing between mmap and owned buffers at runtime.
    pub fn load_with_mode(path: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("missing CC-CEDICT file: {}", path.display());
        }
        let buffer = load_file(path, mode)?;
        let entries = parse_cedict(buffer.as_slice(), &path.display().to_string())?;
        info!("parsed {} entries from {}", entries.len(), path.display());
        Self::from_entries(entries)
    }

    /// Build from CC-CEDICT text already in memory.
    pub fn from_cedict_str(text: &str) -> Result<Self> {
        let entries = parse_cedict(text.as_bytes(), "<memory>")?;
        Self::from_entries(entries)
    }

    /// Build the indices from an ordered entry list.
    ///
    /// Fails when the list is empty or an entry lacks a headword or gloss.
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Result<Self> {
        if entries.is_empty() {
            anyhow::bail!("dictionary contains no entries");
        }
        if entries.len() > EntryId::MAX as usize {
            anyhow::bail!("dictionary has too many entries ({})", entries.len());
        }

        let start = Instant::now();
        let mut by_simplified: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut by_traditional: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut by_pinyin: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut by_english: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut by_gloss: HashMap<String, Vec<EntryId>> = HashMap::new();
        let mut gloss_text = Vec::with_capacity(entries.len());
        let mut max_word_len = 0usize;

        for (idx, entry) in entries.iter().enumerate() {
            validate_entry(idx, entry)?;
            let id = idx as EntryId;

            push_id(&mut by_simplified, entry.simplified.clone(), id);
            push_id(&mut by_traditional, entry.traditional.clone(), id);

            let pinyin_key = normalize_pinyin(&entry.pinyin.concat());
            if !pinyin_key.is_empty() {
                push_id(&mut by_pinyin, pinyin_key, id);
            }

            // `CL:` classifier lists are not definitions.
            for gloss in entry.definitions() {
                for token in english_tokens(gloss) {
                    push_id(&mut by_english, token, id);
                }
                let key = gloss_key(gloss);
                if !key.is_empty() {
                    push_id(&mut by_gloss, key, id);
                }
            }
            gloss_text.push(entry.definitions().collect::<Vec<_>>().join("/").to_lowercase());

            max_word_len = max_word_len
                .max(entry.simplified.chars().count())
                .max(entry.traditional.chars().count());
        }

        info!(
            "lexicon indexed {} entries in {} ms (max word length {})",
            entries.len(),
            start.elapsed().as_millis(),
            max_word_len
        );
        debug!(
            simplified = by_simplified.len(),
            traditional = by_traditional.len(),
            pinyin = by_pinyin.len(),
            english = by_english.len(),
            glosses = by_gloss.len(),
            "index key counts"
        );

        Ok(Self {
            entries,
            gloss_text,
            by_simplified,
            by_traditional,
            by_pinyin,
            by_english,
            by_gloss,
            max_word_len,
        })
    }

    /// All entries in load order.
    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    /// Entries whose simplified or traditional headword equals `text`.
    ///
    /// Simplified matches come first; an entry matching both is listed once.
    pub fn by_chinese(&self, text: &str) -> Vec<&DictionaryEntry> {
        let key = text.trim();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for ids in [self.by_simplified.get(key), self.by_traditional.get(key)]
            .into_iter()
            .flatten()
        {
            self.collect_unique(ids, &mut seen, &mut out);
        }
        out
    }

    /// Entries whose reading normalizes to the same key as `text`.
    pub fn by_pinyin(&self, text: &str) -> Vec<&DictionaryEntry> {
        let key = normalize_pinyin(text);
        self.by_pinyin
            .get(&key)
            .map(|ids| self.resolve(ids))
            .unwrap_or_default()
    }

    /// Entries matching the english `text`, best matches first.
    ///
    /// Matches are ranked in tiers. Each tier keeps load order and skips
    /// entries already listed by an earlier one:
    ///
    /// 1. a whole gloss equals the query (case, punctuation and parenthesized
    ///    notes ignored, so `to test (machinery etc)` reads as `to test`);
    /// 2. a whole gloss equals the query with a leading `to ` removed or added;
    /// 3. the query word by word: the longest run of up to four words that
    ///    is a whole gloss, else every gloss containing the word, else a
    ///    substring scan over every gloss. Stop words (`to`, `the`, ...) are
    ///    skipped here unless they are the whole query.
    pub fn by_english(&self, text: &str) -> Vec<&DictionaryEntry> {
        let words: Vec<String> = english_tokens(text).collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        if words.is_empty() {
            return out;
        }

        let phrase = words.join(" ");
        let toggled = toggle_infinitive(&phrase);
        for key in [phrase, toggled] {
            if let Some(ids) = self.by_gloss.get(&key) {
                self.collect_unique(ids, &mut seen, &mut out);
            }
        }

        let mut pos = 0;
        while pos < words.len() {
            if let Some(width) = self.collect_gloss_phrase(&words[pos..], &mut seen, &mut out) {
                pos += width;
                continue;
            }
            let word = words[pos].as_str();
            pos += 1;
            if words.len() > 1 && STOP_WORDS.contains(&word) {
                continue;
            }
            match self.by_english.get(word) {
                Some(ids) => self.collect_unique(ids, &mut seen, &mut out),
                None => {
                    for (idx, gloss) in self.gloss_text.iter().enumerate() {
                        if gloss.contains(word) && seen.insert(idx as EntryId) {
                            out.push(&self.entries[idx]);
                        }
                    }
                }
            }
        }
        out
    }

    /// Collect the longest multi-word prefix of `words` that is a whole
    /// gloss, returning how many words it used.
    fn collect_gloss_phrase<'a>(
        &'a self,
        words: &[String],
        seen: &mut HashSet<EntryId>,
        out: &mut Vec<&'a DictionaryEntry>,
    ) -> Option<usize> {
        for width in (2..=words.len().min(MAX_GLOSS_PHRASE_WORDS)).rev() {
            let phrase = words[..width].join(" ");
            let toggled = toggle_infinitive(&phrase);
            let mut matched = false;
            for key in [phrase, toggled] {
                if let Some(ids) = self.by_gloss.get(&key) {
                    self.collect_unique(ids, seen, out);
                    matched = true;
                }
            }
            if matched {
                return Some(width);
            }
        }
        None
    }

    /// Whether `text` is a simplified or traditional headword.
    pub fn contains_word(&self, text: &str) -> bool {
        self.by_simplified.contains_key(text) || self.by_traditional.contains_key(text)
    }

    /// Length in characters of the longest headword in either script.
    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of distinct simplified headwords.
    pub fn simplified_key_count(&self) -> usize {
        self.by_simplified.len()
    }

    /// Number of distinct traditional headwords.
    pub fn traditional_key_count(&self) -> usize {
        self.by_traditional.len()
    }

    /// Number of distinct normalized readings.
    pub fn pinyin_key_count(&self) -> usize {
        self.by_pinyin.len()
    }

    /// Number of distinct gloss tokens.
    pub fn english_token_count(&self) -> usize {
        self.by_english.len()
    }

    /// Number of distinct normalized glosses.
    pub fn gloss_count(&self) -> usize {
        self.by_gloss.len()
    }

    fn resolve(&self, ids: &[EntryId]) -> Vec<&DictionaryEntry> {
        ids.iter().map(|id| &self.entries[*id as usize]).collect()
    }

    fn collect_unique<'a>(
        &'a self,
        ids: &[EntryId],
        seen: &mut HashSet<EntryId>,
        out: &mut Vec<&'a DictionaryEntry>,
    ) {
        for id in ids {
            if seen.insert(*id) {
                out.push(&self.entries[*id as usize]);
            }
        }
    }
}

fn push_id(index: &mut HashMap<String, Vec<EntryId>>, key: String, id: EntryId) {
    let ids = index.entry(key).or_default();
    // Ids arrive in increasing order, so a repeat from the same entry is always last.
    if ids.last() != Some(&id) {
        ids.push(id);
    }
}

fn validate_entry(idx: usize, entry: &DictionaryEntry) -> Result<()> {
    if entry.simplified.is_empty() || entry.traditional.is_empty() {
        anyhow::bail!("entry {} has an empty headword", idx);
    }
    if entry.english.is_empty() {
        anyhow::bail!("entry {} ({}) has no english gloss", idx, entry.simplified);
    }
    Ok(())
}

/// Lower-cased words of a gloss or query: alphanumeric runs with at least one
/// ASCII letter.
fn english_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().any(|c| c.is_ascii_alphabetic()))
        .map(str::to_lowercase)
}

/// A gloss reduced to its words, with parenthesized notes dropped
/// (`To test (machinery etc)` -> `to test`).
fn gloss_key(gloss: &str) -> String {
    let mut depth = 0usize;
    let bare: String = gloss
        .chars()
        .filter(|c| match c {
            '(' => {
                depth += 1;
                false
            }
            ')' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect();
    english_tokens(&bare).collect::<Vec<_>>().join(" ")
}

/// `to run` -> `run`, `run` -> `to run`.
fn toggle_infinitive(phrase: &str) -> String {
    match phrase.strip_prefix("to ") {
        Some(rest) => rest.to_string(),
        None => format!("to {phrase}"),
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

/// Parse CC-CEDICT text into entries, keeping file order.
///
/// `#` comment lines and blank lines are skipped; any other line that does
/// not follow `TRAD SIMP [pin1 yin1] /gloss/.../` aborts with its line number.
pub fn parse_cedict(bytes: &[u8], source: &str) -> Result<Vec<DictionaryEntry>> {
    let mut entries = Vec::new();
    for (lineno, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let line = strip_cr(raw_line);
        let line_str = std::str::from_utf8(line)
            .with_context(|| format!("{}:{} invalid utf-8", source, lineno + 1))?;
        let line_str = line_str.trim_start_matches('\u{feff}').trim();
        if line_str.is_empty() || line_str.starts_with('#') {
            continue;
        }
        let entry = parse_record(line_str).map_err(|reason| {
            anyhow::anyhow!("{}:{} malformed entry ({})", source, lineno + 1, reason)
        })?;
        entries.push(entry);
    }
    Ok(entries)
}

fn parse_record(line: &str) -> Result<DictionaryEntry, &'static str> {
    let (traditional, rest) = line
        .split_once(' ')
        .ok_or("missing simplified headword")?;
    let (simplified, rest) = rest.trim_start().split_once(' ').ok_or("missing pinyin")?;
    let rest = rest
        .trim_start()
        .strip_prefix('[')
        .ok_or("expected '[' before pinyin")?;
    let (pinyin, rest) = rest.split_once(']').ok_or("unterminated pinyin")?;
    let glosses = rest
        .trim()
        .strip_prefix('/')
        .and_then(|g| g.strip_suffix('/'))
        .ok_or("glosses must be wrapped in '/'")?;

    let english: Vec<String> = glosses
        .split('/')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();
    if english.is_empty() {
        return Err("no english glosses");
    }
    if traditional.is_empty() || simplified.is_empty() {
        return Err("empty headword");
    }

    Ok(DictionaryEntry {
        traditional: traditional.to_string(),
        simplified: simplified.to_string(),
        pinyin: pinyin.split_whitespace().map(str::to_string).collect(),
        english,
    })
}

fn strip_cr(line: &[u8]) -> &[u8] {
    if line.ends_with(b"\r") {
        &line[..line.len() - 1]
    } else {
        line
    }
}
