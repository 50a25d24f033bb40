use std::cmp::Reverse;
use std::collections::HashMap;

use cedict_types::{DictionaryEntry, Script};

use crate::charset::CharSet;

/// Rewrites text into one target script.
///
/// Phrases (two characters or more) are tried longest first at every
/// position; anything left over goes through the character map, and
/// characters with no mapping are copied through.
pub struct ConversionMap {
    target: Script,
    phrases: HashMap<String, String>,
    max_phrase_len: usize,
    chars: HashMap<char, char>,
}

/// Evidence that one source character is written as a given target.
#[derive(Default)]
struct Votes {
    /// Positions in regular multi-character entries.
    compound: u32,
    /// A regular single-character entry spells it this way.
    standalone: bool,
    /// Entries whose glosses only say "variant of ...".
    variant: u32,
    first_seen: usize,
}

impl ConversionMap {
    /// Build the map producing `target` from entries in load order.
    ///
    /// Every multi-character entry registers its phrase, including entries
    /// spelled the same in both scripts (`可以`), so common words keep their
    /// characters. The first regular entry to claim a phrase keeps it;
    /// variant-only entries come after all regular ones.
    ///
    /// Each character then takes the target with the most support, compared
    /// in this order: occurrences in regular multi-character entries, a
    /// regular single-character entry, variant-only entries, being the same
    /// character, being exclusive to the target script, loaded first.
    pub(crate) fn build(
        entries: &[DictionaryEntry],
        target: Script,
        target_only: &CharSet,
    ) -> Self {
        let source = target.other();
        let mut phrases: HashMap<String, String> = HashMap::new();
        let mut max_phrase_len = 0usize;
        let mut votes: HashMap<char, HashMap<char, Votes>> = HashMap::new();

        let (regular, variants): (Vec<&DictionaryEntry>, Vec<&DictionaryEntry>) =
            entries.iter().partition(|e| !e.is_variant_only());

        for (entry, variant) in regular
            .into_iter()
            .map(|e| (e, false))
            .chain(variants.into_iter().map(|e| (e, true)))
        {
            let from = entry.headword(source);
            let to = entry.headword(target);
            let from_len = from.chars().count();

            if from_len >= 2 && !phrases.contains_key(from) {
                phrases.insert(from.to_string(), to.to_string());
                max_phrase_len = max_phrase_len.max(from_len);
            }

            match (single_char(from), single_char(to)) {
                (Some(f), Some(t)) => {
                    let tally = tally(&mut votes, f, t);
                    if variant {
                        tally.variant += 1;
                    } else {
                        tally.standalone = true;
                    }
                }
                _ if from_len >= 2 && from_len == to.chars().count() => {
                    for (f, t) in from.chars().zip(to.chars()) {
                        let tally = tally(&mut votes, f, t);
                        if variant {
                            tally.variant += 1;
                        } else {
                            tally.compound += 1;
                        }
                    }
                }
                _ => {}
            }
        }

        let mut chars: HashMap<char, char> = HashMap::new();
        for (f, options) in votes {
            let best = options.into_iter().max_by_key(|(t, v)| {
                (
                    v.compound,
                    v.standalone,
                    v.variant,
                    *t == f,
                    target_only.contains(*t),
                    Reverse(v.first_seen),
                )
            });
            if let Some((t, _)) = best
                && t != f
            {
                chars.insert(f, t);
            }
        }

        Self {
            target,
            phrases,
            max_phrase_len,
            chars,
        }
    }

    /// Script this map writes.
    pub fn target(&self) -> Script {
        self.target
    }

    pub fn phrase_count(&self) -> usize {
        self.phrases.len()
    }

    pub fn char_count(&self) -> usize {
        self.chars.len()
    }

    /// Target spelling of one character, if it has one.
    pub fn map_char(&self, c: char) -> Option<char> {
        self.chars.get(&c).copied()
    }

    /// Rewrite `text`, scanning left to right.
    pub fn convert(&self, text: &str) -> String {
        let bounds = char_boundaries(text);
        let n = bounds.len() - 1;
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < n {
            let longest = self.max_phrase_len.min(n - pos);
            let phrase = (2..=longest).rev().find_map(|len| {
                self.phrases
                    .get(&text[bounds[pos]..bounds[pos + len]])
                    .map(|to| (len, to))
            });
            if let Some((len, to)) = phrase {
                out.push_str(to);
                pos += len;
                continue;
            }

            let piece = &text[bounds[pos]..bounds[pos + 1]];
            match piece.chars().next().and_then(|c| self.map_char(c)) {
                Some(mapped) => out.push(mapped),
                None => out.push_str(piece),
            }
            pos += 1;
        }
        out
    }
}

fn tally(votes: &mut HashMap<char, HashMap<char, Votes>>, from: char, to: char) -> &mut Votes {
    let options = votes.entry(from).or_default();
    let first_seen = options.len();
    options.entry(to).or_insert_with(|| Votes {
        first_seen,
        ..Votes::default()
    })
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

fn char_boundaries(text: &str) -> Vec<usize> {
    let mut bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    bounds.push(text.len());
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(entries: &[DictionaryEntry], target: Script) -> ConversionMap {
        let (simplified_only, traditional_only) = CharSet::exclusive_pair(
            entries.iter().flat_map(|e| e.simplified.chars()),
            entries.iter().flat_map(|e| e.traditional.chars()),
        );
        let target_only = match target {
            Script::Simplified => simplified_only,
            Script::Traditional => traditional_only,
        };
        ConversionMap::build(entries, target, &target_only)
    }

    #[test]
    fn phrase_beats_character_mapping() {
        let entries = vec![
            DictionaryEntry::new("頭髮", "头发", ["tou2", "fa5"], ["hair"]),
            DictionaryEntry::new("頭", "头", ["tou2"], ["head"]),
            DictionaryEntry::new("發", "发", ["fa1"], ["to send out"]),
            DictionaryEntry::new("髮", "发", ["fa4"], ["hair"]),
            DictionaryEntry::new("發現", "发现", ["fa1", "xian4"], ["to find"]),
            DictionaryEntry::new("出發", "出发", ["chu1", "fa1"], ["to set out"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.convert("头发"), "頭髮");
        assert_eq!(map.convert("发"), "發");
        assert_eq!(map.convert("发头发"), "發頭髮");
    }

    #[test]
    fn compound_words_outvote_single_character_readings() {
        let entries = vec![
            DictionaryEntry::new("乾", "干", ["gan1"], ["dry"]),
            DictionaryEntry::new("幹", "干", ["gan4"], ["to do"]),
            DictionaryEntry::new("幹部", "干部", ["gan4", "bu4"], ["cadre"]),
            DictionaryEntry::new("幹活", "干活", ["gan4", "huo2"], ["to work"]),
            DictionaryEntry::new("乾淨", "干净", ["gan1", "jing4"], ["clean"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.map_char('干'), Some('幹'));
        // The phrase still decides inside a known word.
        assert_eq!(map.convert("干净"), "乾淨");
    }

    #[test]
    fn shared_spelling_stays_without_compound_evidence() {
        let entries = vec![
            DictionaryEntry::new("乾", "干", ["gan1"], ["dry"]),
            DictionaryEntry::new("幹", "干", ["gan4"], ["to do"]),
            DictionaryEntry::new("干", "干", ["gan1"], ["shield"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.map_char('干'), None);
        assert_eq!(map.convert("干"), "干");
        let back = build(&entries, Script::Simplified);
        assert_eq!(back.convert("乾幹"), "干干");
    }

    #[test]
    fn rare_variants_do_not_replace_common_characters() {
        let entries = vec![
            DictionaryEntry::new("可以", "可以", ["ke3", "yi3"], ["can"]),
            DictionaryEntry::new("㠯", "以", ["yi3"], ["old variant of 以[yi3]"]),
            DictionaryEntry::new("以", "以", ["yi3"], ["to use"]),
            DictionaryEntry::new("了", "了", ["le5"], ["(completed action marker)"]),
            DictionaryEntry::new("瞭", "了", ["liao3"], ["(of eyes) bright"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.convert("可以"), "可以");
        assert_eq!(map.convert("走了"), "走了");
        assert_eq!(map.convert("以"), "以");
        assert_eq!(map.map_char('了'), None);
        // The other direction still folds both spellings.
        let back = build(&entries, Script::Simplified);
        assert_eq!(back.convert("㠯瞭"), "以了");
    }

    #[test]
    fn variant_entries_claim_phrases_last() {
        let entries = vec![
            DictionaryEntry::new("乾净", "干净", ["gan1", "jing4"], ["variant of 乾淨[gan1 jing4]"]),
            DictionaryEntry::new("乾淨", "干净", ["gan1", "jing4"], ["clean"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.convert("干净"), "乾淨");
        assert_eq!(map.map_char('净'), Some('淨'));
    }

    #[test]
    fn exclusive_target_is_preferred_over_shared_one() {
        // 著 is also a simplified headword, so 着 -> 著 is not exclusive.
        let entries = vec![
            DictionaryEntry::new("著", "着", ["zhao2"], ["to touch"]),
            DictionaryEntry::new("著", "著", ["zhu4"], ["to write"]),
            DictionaryEntry::new("朝", "着", ["zhe5"], ["test reading"]),
            DictionaryEntry::new("箸", "着", ["zhao1"], ["test reading"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.map_char('着'), Some('朝'));
    }

    #[test]
    fn aligned_phrases_fill_missing_characters() {
        let entries = vec![
            DictionaryEntry::new("電腦", "电脑", ["dian4", "nao3"], ["computer"]),
            DictionaryEntry::new("電", "电", ["dian4"], ["electricity"]),
        ];
        let map = build(&entries, Script::Traditional);
        assert_eq!(map.map_char('脑'), Some('腦'));
        assert_eq!(map.convert("脑电"), "腦電");
    }

    #[test]
    fn unmapped_text_passes_through() {
        let map = build(&[], Script::Traditional);
        assert_eq!(map.convert(""), "");
        assert_eq!(map.convert("abc，你好"), "abc，你好");
        assert_eq!(map.target(), Script::Traditional);
    }
}
