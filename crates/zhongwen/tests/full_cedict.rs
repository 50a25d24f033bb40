use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use zhongwen::{Dictionary, LoadMode};

fn full_dictionary() -> Option<Dictionary> {
    let Some(path) = env::var("CEDICT_PATH").ok().map(PathBuf::from) else {
        eprintln!("skipping: CEDICT_PATH not set");
        return None;
    };
    let dictionary = Dictionary::from_path(path, LoadMode::Mmap);
    dictionary.initialize().expect("load cc-cedict");
    Some(dictionary)
}

#[test]
fn english_queries_rank_exact_glosses_first() {
    let Some(dictionary) = full_dictionary() else {
        return;
    };
    assert_eq!(dictionary.query("test").unwrap()[0].traditional, "實驗");
    assert_eq!(dictionary.query_by_english("test").unwrap()[0].simplified, "实验");
    let runs = dictionary.query("to run").unwrap();
    assert!(runs.len() < 1_000, "{} hits", runs.len());
}

#[test]
fn chinese_sentences_are_looked_up_word_by_word() {
    let Some(dictionary) = full_dictionary() else {
        return;
    };
    let hits = dictionary.query("你好今天的天气还好。").unwrap();
    assert_eq!(hits[0].english[0], "hello");
    assert!(dictionary.query_by_chinese("你好今天的天气还好。").unwrap().is_empty());
}

#[test]
fn converts_everyday_sentences() {
    let Some(dictionary) = full_dictionary() else {
        return;
    };
    assert_eq!(
        dictionary.convert_to_traditional("今天的天气还可以吧").unwrap(),
        "今天的天氣還可以吧"
    );
    assert_eq!(
        dictionary.convert_to_traditional("后来他们发现了").unwrap(),
        "後來他們發現了"
    );
    let hair = dictionary.convert_to_traditional("我的头发还是干的").unwrap();
    assert!(hair.contains("頭髮"), "{hair}");
    assert!(!hair.contains('乹'), "{hair}");
    assert_eq!(dictionary.convert_to_traditional("汉语").unwrap(), "漢語");
    assert_eq!(dictionary.convert_to_simplified("漢語").unwrap(), "汉语");
}

#[test]
fn converted_characters_are_attested_by_some_headword() {
    let Some(dictionary) = full_dictionary() else {
        return;
    };
    let mut attested = HashSet::new();
    for entry in dictionary.lexicon().unwrap().entries() {
        if entry.simplified.chars().count() == entry.traditional.chars().count() {
            attested.extend(entry.simplified.chars().zip(entry.traditional.chars()));
        }
    }
    for text in [
        "今天的天气还可以吧",
        "后来他们发现了",
        "我的头发还是干的",
        "这个问题我们以后再讨论",
        "他了解中国的历史",
    ] {
        let converted = dictionary.convert_to_traditional(text).unwrap();
        assert_eq!(converted.chars().count(), text.chars().count(), "{text}");
        for (from, to) in text.chars().zip(converted.chars()) {
            if from != to {
                assert!(attested.contains(&(from, to)), "{from} -> {to} in {text}");
            }
        }
    }
}
