//! Forward maximum-matching segmentation.
//!
//! The algorithm only needs a word-membership predicate and the longest word
//! length, so it is written against a callback; [`Lexicon::segment`] plugs in
//! its own simplified/traditional indices.

use crate::Lexicon;

impl Lexicon {
    /// Split `text` into dictionary words, longest match first.
    ///
    /// Tokens borrow from `text` and concatenate back to it exactly.
    /// Characters that start no known multi-character word (punctuation,
    /// whitespace, unknown ideographs) come out as one-character tokens.
    pub fn segment<'t>(&self, text: &'t str) -> Vec<&'t str> {
        segment_with(text, self.max_word_len(), |word| self.contains_word(word))
    }
}

/// Greedy left-to-right segmentation against an arbitrary word predicate.
///
/// At each position the longest prefix of at most `max_word_len` characters
/// (and at least two) accepted by `is_word` is emitted; otherwise the single
/// character is. There is no backtracking.
pub fn segment_with<'t, F>(text: &'t str, max_word_len: usize, is_word: F) -> Vec<&'t str>
where
    F: Fn(&str) -> bool,
{
    let bounds = char_boundaries(text);
    let char_count = bounds.len() - 1;
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < char_count {
        let longest = max_word_len.min(char_count - pos);
        let step = (2..=longest)
            .rev()
            .find(|len| is_word(&text[bounds[pos]..bounds[pos + len]]))
            .unwrap_or(1);
        tokens.push(&text[bounds[pos]..bounds[pos + step]]);
        pos += step;
    }

    tokens
}

/// Byte offset of every character start plus the final `text.len()`.
fn char_boundaries(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(text.len()))
        .collect()
}
