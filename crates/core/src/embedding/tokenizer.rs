//! Lowercasing tokenizer with stop word removal.
//!
//! Splits on non-alphanumeric characters and at letter/digit boundaries, so
//! `"BM25"` yields `bm` and `25`, the way subword vocabularies keep model names
//! and numbers apart. Single-character tokens and common English stop words are
//! discarded. Tokens are byte spans into one lowercased buffer.

use std::collections::HashSet;
use std::sync::LazyLock;

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "an", "and", "are", "as", "at", "be", "but", "by", "do", "does", "for", "if", "in",
        "into", "is", "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then",
        "there", "these", "they", "this", "to", "was", "will", "with",
    ]
    .into_iter()
    .collect()
});

/// Tokenized text: owns the lowercased buffer, provides &str slices via byte spans.
#[derive(Debug)]
pub struct Tokens {
    buffer: String,
    spans: Vec<(u32, u32)>,
}

impl Tokens {
    /// Returns an iterator over the token `&str` slices.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans
            .iter()
            .map(|&(s, e)| &self.buffer[s as usize..e as usize])
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns `true` if there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Distinct tokens.
    pub fn unique(&self) -> HashSet<&str> {
        self.iter().collect()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Alpha,
    Digit,
}

fn classify(c: char) -> Option<CharClass> {
    if c.is_numeric() {
        Some(CharClass::Digit)
    } else if c.is_alphanumeric() {
        Some(CharClass::Alpha)
    } else {
        None
    }
}

/// Tokenize text: lowercase, split on non-alphanumeric and letter/digit
/// transitions, remove stop words and single characters.
pub fn tokenize(text: &str) -> Tokens {
    let buffer = text.to_lowercase();
    let mut spans = Vec::new();
    let mut start: Option<(usize, CharClass)> = None;

    let mut push = |s: usize, e: usize, buf: &str| {
        let token = &buf[s..e];
        if token.chars().count() > 1 && !STOP_WORDS.contains(token) {
            spans.push((s as u32, e as u32));
        }
    };

    for (i, c) in buffer.char_indices() {
        match (start, classify(c)) {
            (None, Some(class)) => start = Some((i, class)),
            (Some((s, prev)), Some(class)) if prev != class => {
                push(s, i, &buffer);
                start = Some((i, class));
            }
            (Some(_), Some(_)) => {}
            (Some((s, _)), None) => {
                push(s, i, &buffer);
                start = None;
            }
            (None, None) => {}
        }
    }
    if let Some((s, _)) = start {
        push(s, buffer.len(), &buffer);
    }

    Tokens { buffer, spans }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_removes_stop_words() {
        let tokens = tokenize("The quick brown fox jumps over the lazy dog");
        let words: Vec<&str> = tokens.iter().collect();
        assert!(!words.contains(&"the"));
        assert_eq!(words, vec!["quick", "brown", "fox", "jumps", "over", "lazy", "dog"]);
    }

    #[test]
    fn test_tokenize_splits_letter_digit_boundary() {
        let words: Vec<String> = tokenize("What is BM25?").iter().map(String::from).collect();
        assert_eq!(words, vec!["what", "bm", "25"]);
    }

    #[test]
    fn test_tokenize_drops_single_characters() {
        let words: Vec<String> = tokenize("a b c vector x2").iter().map(String::from).collect();
        assert_eq!(words, vec!["vector"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ?! -- ").is_empty());
    }

    #[test]
    fn test_tokenize_unicode() {
        let words: Vec<String> = tokenize("Café naïve").iter().map(String::from).collect();
        assert_eq!(words, vec!["café", "naïve"]);
    }
}
