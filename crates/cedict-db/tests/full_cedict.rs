use std::env;
use std::path::PathBuf;

use cedict_db::{LoadMode, Lexicon};

fn cedict_path() -> Option<PathBuf> {
    env::var("CEDICT_PATH").ok().map(PathBuf::from)
}

#[test]
fn loads_full_cc_cedict() {
    let Some(path) = cedict_path() else {
        eprintln!("skipping: CEDICT_PATH not set");
        return;
    };
    let lexicon = Lexicon::load_with_mode(&path, LoadMode::Mmap).expect("load cc-cedict");

    assert!(lexicon.entry_count() > 100_000, "dictionary too small");
    assert!(lexicon.contains_word("天气"));
    assert_eq!(lexicon.by_chinese("天气")[0].english[0], "weather");
    assert_eq!(lexicon.by_pinyin("tianqi")[0].english[0], "weather");
    assert_eq!(lexicon.segment("今天的天气还可以吧")[0], "今天");

    // Whole-gloss matches rank before compounds that merely mention the word.
    let tests = lexicon.by_english("test");
    assert_eq!(tests[0].simplified, "实验");
    assert!(tests.len() > 10);

    let runs = lexicon.by_english("to run");
    assert!(runs.len() < 1_000, "{} hits", runs.len());
    assert!(runs.iter().take(20).any(|e| e.simplified == "执行"));
}
