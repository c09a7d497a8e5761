//! Word tokenizer and the normalization/stop-word predicates built on it.
//!
//! Tokenization rule: one token per non-space run plus its trailing
//! whitespace, equivalent to repeatedly matching `(\S+)(\s*)`. `join` is the
//! inverse: concatenating every token's `raw` reproduces the input, except
//! that whitespace preceding the first token and whitespace following the
//! last token is not attached to a token and is therefore not reproduced.
//! This mirrors the teacher's hand-coded character scan (no `regex`
//! dependency is pulled in for a pattern this simple).

use std::collections::HashSet;
use std::sync::OnceLock;

use diffcore_model::Token;

// ---------------------------------------------------------------------------
// tokenize / join
// ---------------------------------------------------------------------------

/// Split `text` into tokens, one per non-space run plus its trailing
/// whitespace.
pub fn tokenize(text: &str) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        // Leading whitespace attaches to no token.
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }

        let word_start = i;
        while i < chars.len() && !chars[i].is_whitespace() {
            i += 1;
        }
        let word: String = chars[word_start..i].iter().collect();

        let ws_start = i;
        while i < chars.len() && chars[i].is_whitespace() {
            i += 1;
        }
        let ws: String = chars[ws_start..i].iter().collect();

        let normalized = normalize_word(&word);
        tokens.push(Token {
            raw: format!("{word}{ws}"),
            word,
            normalized,
        });
    }

    // The final token's trailing whitespace is not part of the join
    // contract: drop it from `raw` (the `word` itself is unaffected).
    if let Some(last) = tokens.last_mut() {
        last.raw = last.word.clone();
    }

    tokens
}

/// Concatenate every token's `raw` form. Inverse of [`tokenize`] modulo
/// whitespace before the first token and after the last.
pub fn join(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.raw.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

const LEADING_STRIP: &[char] = &['\'', '"', '(', '[', '{', '<'];
const TRAILING_STRIP: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"', ')', ']', '}', '>'];

/// Lower-case `word` and strip leading/trailing punctuation from the fixed
/// sets used throughout the pipeline for fuzzy token comparison.
pub fn normalize_word(word: &str) -> String {
    let lowered = word.to_lowercase();
    lowered
        .trim_start_matches(LEADING_STRIP)
        .trim_end_matches(TRAILING_STRIP)
        .to_string()
}

/// True iff `s` contains no alphanumeric character.
pub fn is_pure_punctuation(s: &str) -> bool {
    !s.chars().any(|c| c.is_alphanumeric())
}

// ---------------------------------------------------------------------------
// Stop words
// ---------------------------------------------------------------------------

/// Closed-class English function words: articles, pronouns, auxiliaries,
/// prepositions, conjunctions, and common adverbs. Used by the absorb rules
/// to decide which inline changes are minor.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just",
    "let's", "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out",
    "over", "own", "quite", "rather", "really", "same", "shan't", "she", "she'd", "she'll",
    "she's", "should", "shouldn't", "so", "some", "somewhat", "still", "such", "than", "that",
    "that's", "the", "their", "theirs", "them", "themselves", "then", "there", "there's",
    "these", "they", "they'd", "they'll", "they're", "they've", "this", "those", "through",
    "to", "too", "under", "until", "up", "upon", "us", "very", "was", "wasn't", "we", "we'd",
    "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's", "where",
    "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with", "within",
    "without", "won't", "would", "wouldn't", "yet", "you", "you'd", "you'll", "you're",
    "you've", "your", "yours", "yourself", "yourselves", "also", "however", "thus", "hence",
    "therefore", "indeed", "perhaps", "almost", "already", "always", "ever", "even", "least",
    "less", "much", "many", "several",
];

fn stop_word_set() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Keep only alphabetic characters, lower-cased.
fn letters_only_lower(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphabetic())
        .collect::<String>()
        .to_lowercase()
}

/// True iff every whitespace-split token of `s`, reduced to its letters and
/// lower-cased, is either empty or a member of the stop-word set.
pub fn is_only_stop_words(s: &str) -> bool {
    let set = stop_word_set();
    s.split_whitespace().all(|tok| {
        let reduced = letters_only_lower(tok);
        reduced.is_empty() || set.contains(reduced.as_str())
    })
}
