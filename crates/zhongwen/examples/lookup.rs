use std::env;
use std::time::Instant;

use anyhow::{Context, Result};
use zhongwen::{Dictionary, LoadMode};

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let usage = "usage: cargo run -p zhongwen --example lookup -- <path-to-cedict_ts.u8> <text>";
    let path = args.next().context(usage)?;
    let text = args.next().context(usage)?;

    let start = Instant::now();
    let dictionary = Dictionary::from_path(&path, LoadMode::Mmap);
    dictionary.initialize()?;
    println!("Loaded {} in {} ms", path, start.elapsed().as_millis());

    match dictionary.classify(&text) {
        Ok(class) => println!("Classification: {class}"),
        Err(err) => println!("Classification: {err}"),
    }
    println!("Simplified? {}", dictionary.is_simplified(&text));
    println!("Traditional? {}", dictionary.is_traditional(&text));
    println!("Segments: {}", dictionary.segment(&text)?.join(" | "));
    println!("To traditional: {}", dictionary.convert_to_traditional(&text)?);
    println!("To simplified : {}", dictionary.convert_to_simplified(&text)?);

    let hits = dictionary.query(&text)?;
    println!("{} entries:", hits.len());
    for entry in hits.iter().take(10) {
        println!(
            "  {} {} [{}] {}",
            entry.traditional,
            entry.simplified,
            entry.pinyin_marks(),
            entry.definitions().collect::<Vec<_>>().join("; ")
        );
        let measure_words = entry.measure_words();
        if !measure_words.is_empty() {
            let listed: Vec<String> = measure_words
                .iter()
                .map(|m| format!("{} [{}]", m.simplified, m.pinyin_marks()))
                .collect();
            println!("    measure words: {}", listed.join(", "));
        }
    }

    Ok(())
}
