use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use zhongwen::{Classification, Dictionary, EngineError, LoadMode};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("cedict-db")
        .join("tests")
        .join("fixtures")
        .join("cedict_sample.u8")
}

fn fixture_dictionary() -> Dictionary {
    let dictionary = Dictionary::from_path(fixture_path(), LoadMode::Mmap);
    dictionary.initialize().expect("initialize fixture");
    dictionary
}

#[test]
fn query_finds_english_words() {
    let dictionary = fixture_dictionary();
    let hits = dictionary.query("test").unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].traditional, "實驗");
}

#[test]
fn query_ranks_whole_glosses_before_mentions() {
    let dictionary = fixture_dictionary();
    let hits = dictionary.query("test").unwrap();
    let simplified: Vec<&str> = hits.iter().map(|e| e.simplified.as_str()).collect();
    // 化验 and 口试 load first but only use "test" inside longer glosses.
    assert_eq!(simplified, ["实验", "测试", "化验", "口试"]);
}

#[test]
fn query_matches_english_phrases() {
    let dictionary = fixture_dictionary();
    let hits = dictionary.query("to run").unwrap();
    let simplified: Vec<&str> = hits.iter().map(|e| e.simplified.as_str()).collect();
    assert_eq!(simplified, ["执行", "跑"]);
    assert_eq!(dictionary.query("run").unwrap()[0].simplified, "执行");
    assert_eq!(dictionary.query("set out").unwrap()[0].simplified, "出发");
}

#[test]
fn query_looks_up_each_word_of_a_sentence() {
    let dictionary = fixture_dictionary();
    let hits = dictionary.query("你好今天的天气还好。").unwrap();
    assert_eq!(hits[0].english[0], "hello");
    let words: Vec<&str> = hits.iter().map(|e| e.simplified.as_str()).collect();
    assert_eq!(words, ["你好", "今天", "的", "天气", "还", "还"]);
    assert!(dictionary.query_by_chinese("你好今天的天气还好。").unwrap().is_empty());
}

#[test]
fn entries_expose_measure_words() {
    let dictionary = fixture_dictionary();
    let experiment = dictionary.query_by_chinese("实验").unwrap()[0];
    let measure_words = experiment.measure_words();
    let forms: Vec<(&str, &str)> = measure_words
        .iter()
        .map(|m| (m.simplified.as_str(), m.pinyin.as_str()))
        .collect();
    assert_eq!(forms, [("个", "ge4"), ("次", "ci4")]);
    assert_eq!(measure_words[0].traditional, "個");
    assert!(dictionary.query_by_chinese("天气").unwrap()[0].measure_words().is_empty());
}

#[test]
fn query_by_chinese_matches_either_script() {
    let dictionary = fixture_dictionary();
    let simplified = dictionary.query_by_chinese("天气").unwrap();
    assert_eq!(simplified[0].english[0], "weather");
    let traditional = dictionary.query_by_chinese("天氣").unwrap();
    assert_eq!(traditional[0].simplified, "天气");
    // 还 has two readings; both come back in file order.
    let readings: Vec<_> = dictionary
        .query_by_chinese("还")
        .unwrap()
        .iter()
        .map(|e| e.pinyin_numbers())
        .collect();
    assert_eq!(readings, ["hai2", "huan2"]);
}

#[test]
fn query_by_pinyin_ignores_tones_and_separators() {
    let dictionary = fixture_dictionary();
    for reading in ["tianqi", "tian1 qi4", "Tiān qì", "TIAN1QI4"] {
        let hits = dictionary.query_by_pinyin(reading).unwrap();
        assert_eq!(hits[0].english[0], "weather", "{reading}");
    }
    assert_eq!(dictionary.query_by_pinyin("lv4").unwrap()[0].simplified, "绿");
    assert_eq!(dictionary.query_by_pinyin("lü").unwrap()[0].simplified, "绿");
    assert_eq!(dictionary.query_by_pinyin("Xi'an").unwrap()[0].simplified, "西安");
}

#[test]
fn query_by_english_keeps_load_order() {
    let dictionary = fixture_dictionary();
    let hits = dictionary.query_by_english("test").unwrap();
    assert_eq!(hits[0].simplified, "实验");
    assert_eq!(hits[1].simplified, "测试");
    assert!(dictionary.query_by_english("zeppelin").unwrap().is_empty());
}

#[test]
fn query_routes_pinyin_input() {
    let dictionary = fixture_dictionary();
    assert_eq!(dictionary.query("shiyan").unwrap()[0].simplified, "实验");
    assert_eq!(dictionary.query("ni3 hao3").unwrap()[0].simplified, "你好");
    assert!(dictionary.query("").unwrap().is_empty());
}

#[test]
fn segments_sentences() {
    let dictionary = fixture_dictionary();
    let tokens = dictionary.segment("今天的天气还可以吧").unwrap();
    assert_eq!(tokens, ["今天", "的", "天气", "还", "可以", "吧"]);
    let text = "我的电脑，很好!";
    assert_eq!(dictionary.segment(text).unwrap().concat(), text);
    assert!(dictionary.segment("").unwrap().is_empty());
}

#[test]
fn detects_scripts() {
    let dictionary = fixture_dictionary();
    assert!(dictionary.is_simplified("简体字"));
    assert!(!dictionary.is_simplified("簡體字"));
    assert!(dictionary.is_traditional("繁體字"));
    assert!(!dictionary.is_traditional("繁体字"));
    assert!(!dictionary.is_simplified("hello"));
    assert!(!dictionary.is_traditional("hello"));
}

#[test]
fn converts_between_scripts() {
    let dictionary = fixture_dictionary();
    let traditional = dictionary.convert_to_traditional("汉语").unwrap();
    assert_eq!(traditional, "漢語");
    assert!(dictionary.is_traditional(&traditional));
    let simplified = dictionary.convert_to_simplified("漢語").unwrap();
    assert_eq!(simplified, "汉语");
    assert!(dictionary.is_simplified(&simplified));
}

#[test]
fn classifies_inputs() {
    let dictionary = fixture_dictionary();
    assert_eq!(dictionary.classify("test").unwrap(), Classification::En);
    assert_eq!(dictionary.classify("shiyan").unwrap(), Classification::Py);
    assert_eq!(dictionary.classify("实验").unwrap(), Classification::Zh);
    assert!(matches!(
        dictionary.classify(" "),
        Err(EngineError::Classification(_))
    ));
}

#[test]
fn results_are_deterministic() {
    let a = fixture_dictionary();
    let b = Dictionary::from_path(fixture_path(), LoadMode::Owned);
    b.initialize().unwrap();
    for text in ["test", "天气", "tianqi", "还", "hair"] {
        assert_eq!(a.query(text).unwrap(), b.query(text).unwrap(), "{text}");
    }
    assert_eq!(
        a.convert_to_traditional("我的头发还是干的").unwrap(),
        b.convert_to_traditional("我的头发还是干的").unwrap()
    );
}

#[test]
fn missing_file_reports_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = Dictionary::from_path(dir.path().join("absent.u8"), LoadMode::Mmap);
    let err = dictionary.initialize().unwrap_err();
    assert!(matches!(err, EngineError::DataLoad(_)));
    assert!(err.to_string().contains("missing CC-CEDICT file"));
    assert!(matches!(
        dictionary.query_by_pinyin("tianqi"),
        Err(EngineError::NotInitialized)
    ));
}

#[test]
fn concurrent_initialize_loads_once() {
    let dictionary = Arc::new(Dictionary::from_path(fixture_path(), LoadMode::Owned));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dictionary = Arc::clone(&dictionary);
            thread::spawn(move || dictionary.initialize().is_ok())
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    assert!(dictionary.is_initialized());
    let first = dictionary.lexicon().unwrap() as *const _;
    dictionary.initialize().unwrap();
    let second = dictionary.lexicon().unwrap() as *const _;
    assert_eq!(first, second);
}
