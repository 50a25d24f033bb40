use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use cedict_db::{LoadMode, Lexicon};

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p cedict-db --example stats -- <path-to-cedict_ts.u8>")?;

    let start = Instant::now();
    let lexicon = Lexicon::load_with_mode(&path, LoadMode::Mmap)
        .with_context(|| format!("loading CC-CEDICT from {}", path.display()))?;
    let elapsed = start.elapsed();

    let mut syllables = 0usize;
    let mut glosses = 0usize;
    let mut neutral = 0usize;
    for entry in lexicon.entries() {
        syllables += entry.pinyin.len();
        glosses += entry.english.len();
        if entry.is_script_neutral() {
            neutral += 1;
        }
    }

    println!("Dictionary: {}", path.display());
    println!("Loaded in  : {} ms", elapsed.as_millis());
    println!("Entries    : {}", lexicon.entry_count());
    println!("Simplified keys : {}", lexicon.simplified_key_count());
    println!("Traditional keys: {}", lexicon.traditional_key_count());
    println!("Pinyin keys     : {}", lexicon.pinyin_key_count());
    println!("English tokens  : {}", lexicon.english_token_count());
    println!("Longest headword: {} chars", lexicon.max_word_len());
    println!("Syllables  : {}", syllables);
    println!("Glosses    : {}", glosses);
    println!("Same in both scripts: {}", neutral);

    // Spot-check a couple of lookups.
    for word in ["天气", "電腦"] {
        println!("'{}' known? {}", word, lexicon.contains_word(word));
    }

    Ok(())
}
