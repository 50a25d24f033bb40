use std::env;
use std::path::PathBuf;

use cedict_classify::{classify, is_pinyin};
use cedict_db::Lexicon;
use cedict_types::{Classification, normalize_pinyin};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cedict-db")
        .join("tests")
        .join("fixtures")
        .join("cedict_sample.u8")
}

#[test]
fn every_fixture_headword_is_chinese() {
    let lexicon = Lexicon::load(fixture_path()).expect("load fixture");
    for entry in lexicon.entries() {
        assert_eq!(classify(&entry.simplified), Ok(Classification::Zh));
        assert_eq!(classify(&entry.traditional), Ok(Classification::Zh));
    }
}

#[test]
fn every_fixture_reading_is_pinyin() {
    let lexicon = Lexicon::load(fixture_path()).expect("load fixture");
    for entry in lexicon.entries() {
        let toneless = normalize_pinyin(&entry.pinyin.concat());
        assert!(is_pinyin(&toneless), "{toneless}");
        assert!(is_pinyin(&entry.pinyin_marks()), "{}", entry.pinyin_marks());
        assert_eq!(classify(&toneless), Ok(Classification::Py), "{toneless}");
    }
}

#[test]
fn full_dictionary_headwords_classify_as_chinese() {
    let Some(path) = env::var("CEDICT_PATH").ok().map(PathBuf::from) else {
        eprintln!("skipping: CEDICT_PATH not set");
        return;
    };
    let lexicon = Lexicon::load(&path).expect("load cc-cedict");
    let mut total = 0usize;
    let mut chinese = 0usize;
    for entry in lexicon.entries().iter().take(20_000) {
        total += 1;
        if classify(&entry.simplified) == Ok(Classification::Zh) {
            chinese += 1;
        }
    }
    assert!(chinese * 100 / total >= 95, "{chinese}/{total}");
}
