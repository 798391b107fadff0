use crate::stopwords::Stopwords;
use crate::Term;
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\w+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

fn is_alphanumeric(token: &str) -> bool {
    token.chars().all(char::is_alphanumeric)
}

/// Normalize text into its ordered term sequence: hyphens and slashes split words, NFKC
/// normalization, lowercase, alphanumeric tokens only, stopword removal, then stemming.
/// The index of a term in the returned vector is its position in the document.
pub fn normalize(text: &str, stopwords: &Stopwords) -> Vec<Term> {
    let split = text.replace(|c: char| c == '-' || c == '/', " ");
    let normalized = split.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| is_alphanumeric(token) && !stopwords.contains(token))
        .map(|token| STEMMER.stem(token).into_owned())
        .collect()
}

/// Normalize a single query word. Returns a term only if the word yields exactly one.
pub fn normalize_word(word: &str, stopwords: &Stopwords) -> Option<Term> {
    let mut terms = normalize(word, stopwords);
    if terms.len() == 1 { terms.pop() } else { None }
}
