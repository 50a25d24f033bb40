//! Script tables derived from a dictionary: which characters belong to only
//! one orthography, and how to rewrite text from one to the other.
//!
//! [`ScriptTables::build`] scans every entry once. A character seen in some
//! simplified headword but in no traditional headword is simplified-only (and
//! symmetrically); characters used by both scripts belong to neither set.
//! Conversion maps hold every multi-character headword as a phrase, plus a
//! per-character fallback chosen by how often each spelling occurs in
//! compound words.
//!
//! ```rust
//! use cedict_script::ScriptTables;
//! use cedict_types::DictionaryEntry;
//!
//! let entries = vec![
//!     DictionaryEntry::new("漢語", "汉语", ["Han4", "yu3"], ["Chinese language"]),
//!     DictionaryEntry::new("字", "字", ["zi4"], ["character"]),
//! ];
//! let tables = ScriptTables::build(&entries);
//! assert!(tables.is_simplified("汉字"));
//! assert!(!tables.is_traditional("字"));
//! assert_eq!(tables.to_traditional("汉语字"), "漢語字");
//! ```

mod charset;
mod convert;

pub use convert::ConversionMap;

use std::time::Instant;

use cedict_types::{DictionaryEntry, Script};
use tracing::info;

use charset::CharSet;

/// Exclusive character sets and conversion maps for both directions.
pub struct ScriptTables {
    simplified_only: CharSet,
    traditional_only: CharSet,
    to_traditional: ConversionMap,
    to_simplified: ConversionMap,
}

impl ScriptTables {
    /// Derive every table from the entry list, in load order.
    pub fn build(entries: &[DictionaryEntry]) -> Self {
        let start = Instant::now();
        let simplified_chars = entries.iter().flat_map(|e| e.simplified.chars());
        let traditional_chars = entries.iter().flat_map(|e| e.traditional.chars());
        let (simplified_only, traditional_only) =
            CharSet::exclusive_pair(simplified_chars, traditional_chars);

        let to_traditional = ConversionMap::build(entries, Script::Traditional, &traditional_only);
        let to_simplified = ConversionMap::build(entries, Script::Simplified, &simplified_only);

        info!(
            "script tables built in {} ms: {} simplified-only, {} traditional-only chars",
            start.elapsed().as_millis(),
            simplified_only.len(),
            traditional_only.len()
        );
        info!(
            "conversion maps: {} phrases / {} chars to traditional, {} phrases / {} chars to simplified",
            to_traditional.phrase_count(),
            to_traditional.char_count(),
            to_simplified.phrase_count(),
            to_simplified.char_count()
        );

        Self {
            simplified_only,
            traditional_only,
            to_traditional,
            to_simplified,
        }
    }

    /// Which script `text` is written in, if it says.
    ///
    /// `None` when the text has no exclusive characters at all, or has
    /// exclusive characters from both scripts.
    pub fn detect(&self, text: &str) -> Option<Script> {
        let mut simplified = false;
        let mut traditional = false;
        for c in text.chars() {
            simplified |= self.simplified_only.contains(c);
            traditional |= self.traditional_only.contains(c);
            if simplified && traditional {
                return None;
            }
        }
        match (simplified, traditional) {
            (true, false) => Some(Script::Simplified),
            (false, true) => Some(Script::Traditional),
            _ => None,
        }
    }

    /// At least one simplified-only character and no traditional-only ones.
    pub fn is_simplified(&self, text: &str) -> bool {
        self.detect(text) == Some(Script::Simplified)
    }

    /// At least one traditional-only character and no simplified-only ones.
    pub fn is_traditional(&self, text: &str) -> bool {
        self.detect(text) == Some(Script::Traditional)
    }

    /// Whether `c` appears in `script` and never in the other one.
    pub fn is_exclusive(&self, c: char, script: Script) -> bool {
        match script {
            Script::Simplified => self.simplified_only.contains(c),
            Script::Traditional => self.traditional_only.contains(c),
        }
    }

    /// Rewrite `text` into traditional characters.
    pub fn to_traditional(&self, text: &str) -> String {
        self.to_traditional.convert(text)
    }

    /// Rewrite `text` into simplified characters.
    pub fn to_simplified(&self, text: &str) -> String {
        self.to_simplified.convert(text)
    }

    /// Rewrite `text` into `target`.
    pub fn convert(&self, text: &str, target: Script) -> String {
        self.map_to(target).convert(text)
    }

    /// The conversion map producing `target`.
    pub fn map_to(&self, target: Script) -> &ConversionMap {
        match target {
            Script::Traditional => &self.to_traditional,
            Script::Simplified => &self.to_simplified,
        }
    }

    /// Number of simplified-only characters.
    pub fn simplified_only_count(&self) -> usize {
        self.simplified_only.len()
    }

    /// Number of traditional-only characters.
    pub fn traditional_only_count(&self) -> usize {
        self.traditional_only.len()
    }
}
