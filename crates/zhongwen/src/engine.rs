//! The dictionary engine: one context object owning the lexicon and the
//! script tables, built once and read-only afterwards.
//!
//! ```no_run
//! use zhongwen::{Dictionary, LoadMode};
//!
//! # fn main() -> Result<(), zhongwen::EngineError> {
//! let dictionary = Dictionary::from_path("cedict_ts.u8", LoadMode::Mmap);
//! dictionary.initialize()?;
//! let hits = dictionary.query("test")?;
//! println!("{} {}", hits[0].traditional, hits[0].pinyin_marks());
//! println!("{:?}", dictionary.segment("今天的天气还可以吧")?);
//! println!("{}", dictionary.convert_to_traditional("汉语")?);
//! # Ok(()) }
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Instant;

use cedict_classify::ClassificationError;
use cedict_db::{LoadMode, Lexicon};
use cedict_script::ScriptTables;
use cedict_types::{Classification, DictionaryEntry};
use thiserror::Error;
use tracing::{debug, info};

/// Failures surfaced by [`Dictionary`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load dictionary: {0:#}")]
    DataLoad(anyhow::Error),
    #[error("dictionary is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Classification(#[from] ClassificationError),
}

/// Where [`Dictionary::initialize`] reads its entries from.
pub enum DictionarySource {
    /// A CC-CEDICT file on disk.
    Path { path: PathBuf, mode: LoadMode },
    /// CC-CEDICT text already in memory.
    CedictText(String),
    /// Pre-parsed entries, in load order.
    Entries(Vec<DictionaryEntry>),
}

struct Loaded {
    lexicon: Lexicon,
    tables: ScriptTables,
}

/// Lookup, segmentation, conversion, detection and classification over one
/// dictionary.
///
/// Every operation except [`classify`](Self::classify) and the detectors
/// needs a successful [`initialize`](Self::initialize) first. Concurrent
/// initializers are serialized and the data is loaded exactly once.
pub struct Dictionary {
    source: DictionarySource,
    init_lock: Mutex<()>,
    loaded: OnceLock<Loaded>,
}

impl Dictionary {
    pub fn new(source: DictionarySource) -> Self {
        Self {
            source,
            init_lock: Mutex::new(()),
            loaded: OnceLock::new(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>, mode: LoadMode) -> Self {
        Self::new(DictionarySource::Path {
            path: path.into(),
            mode,
        })
    }

    pub fn from_cedict_str(text: impl Into<String>) -> Self {
        Self::new(DictionarySource::CedictText(text.into()))
    }

    /// Load the data and build every index and table.
    ///
    /// Later calls return `Ok(())` without touching the source again. A
    /// failed load leaves the dictionary uninitialized, so it can be retried.
    pub fn initialize(&self) -> Result<(), EngineError> {
        if self.loaded.get().is_some() {
            return Ok(());
        }
        let _guard = self
            .init_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if self.loaded.get().is_some() {
            return Ok(());
        }

        let start = Instant::now();
        let lexicon = match &self.source {
            DictionarySource::Path { path, mode } => Lexicon::load_with_mode(path, *mode),
            DictionarySource::CedictText(text) => Lexicon::from_cedict_str(text),
            DictionarySource::Entries(entries) => Lexicon::from_entries(entries.clone()),
        }
        .map_err(EngineError::DataLoad)?;
        let tables = ScriptTables::build(lexicon.entries());
        info!(
            "dictionary ready in {} ms ({} entries)",
            start.elapsed().as_millis(),
            lexicon.entry_count()
        );

        let _ = self.loaded.set(Loaded { lexicon, tables });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn loaded(&self) -> Result<&Loaded, EngineError> {
        self.loaded.get().ok_or(EngineError::NotInitialized)
    }

    /// The underlying lexicon, for statistics and direct index access.
    pub fn lexicon(&self) -> Result<&Lexicon, EngineError> {
        Ok(&self.loaded()?.lexicon)
    }

    /// General lookup.
    ///
    /// `text` is tried as a simplified, then traditional headword. When
    /// neither matches, the input is classified: pinyin goes to the reading
    /// index (then the glosses if that misses too), English to the glosses,
    /// and Chinese text is segmented and each word looked up in turn.
    /// Input the classifier rejects finds nothing.
    pub fn query(&self, text: &str) -> Result<Vec<&DictionaryEntry>, EngineError> {
        let lexicon = &self.loaded()?.lexicon;
        let found = lexicon.by_chinese(text);
        if !found.is_empty() {
            return Ok(found);
        }
        let routed = match cedict_classify::classify(text) {
            Ok(Classification::Py) => {
                let hits = lexicon.by_pinyin(text);
                if hits.is_empty() {
                    lexicon.by_english(text)
                } else {
                    hits
                }
            }
            Ok(Classification::En) => lexicon.by_english(text),
            Ok(Classification::Zh) => {
                let mut seen = HashSet::new();
                lexicon
                    .segment(text)
                    .into_iter()
                    .flat_map(|word| lexicon.by_chinese(word))
                    .filter(|entry| seen.insert(*entry))
                    .collect()
            }
            Err(err) => {
                debug!("query {text:?} not routed: {err}");
                found
            }
        };
        Ok(routed)
    }

    /// Entries whose simplified or traditional headword is exactly `text`.
    pub fn query_by_chinese(&self, text: &str) -> Result<Vec<&DictionaryEntry>, EngineError> {
        Ok(self.loaded()?.lexicon.by_chinese(text))
    }

    /// Entries read as `text`, ignoring tones, case and separators.
    pub fn query_by_pinyin(&self, text: &str) -> Result<Vec<&DictionaryEntry>, EngineError> {
        Ok(self.loaded()?.lexicon.by_pinyin(text))
    }

    /// Entries whose glosses contain the words of `text`.
    pub fn query_by_english(&self, text: &str) -> Result<Vec<&DictionaryEntry>, EngineError> {
        Ok(self.loaded()?.lexicon.by_english(text))
    }

    /// Split `text` into dictionary words by forward maximum matching.
    pub fn segment<'t>(&self, text: &'t str) -> Result<Vec<&'t str>, EngineError> {
        Ok(self.loaded()?.lexicon.segment(text))
    }

    pub fn convert_to_traditional(&self, text: &str) -> Result<String, EngineError> {
        Ok(self.loaded()?.tables.to_traditional(text))
    }

    pub fn convert_to_simplified(&self, text: &str) -> Result<String, EngineError> {
        Ok(self.loaded()?.tables.to_simplified(text))
    }

    /// True when `text` is unambiguously simplified. Always false before
    /// initialization.
    pub fn is_simplified(&self, text: &str) -> bool {
        match self.loaded.get() {
            Some(loaded) => loaded.tables.is_simplified(text),
            None => {
                debug!("is_simplified called before initialization");
                false
            }
        }
    }

    /// True when `text` is unambiguously traditional. Always false before
    /// initialization.
    pub fn is_traditional(&self, text: &str) -> bool {
        match self.loaded.get() {
            Some(loaded) => loaded.tables.is_traditional(text),
            None => {
                debug!("is_traditional called before initialization");
                false
            }
        }
    }

    /// Classify `text` as English, pinyin or Chinese. Needs no data.
    pub fn classify(&self, text: &str) -> Result<Classification, EngineError> {
        Ok(cedict_classify::classify(text)?)
    }
}
