use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)\w+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the", "to", "be", "for", "from", "in", "a", "into", "by", "or", "and", "that",
        ];
        words.iter().copied().collect()
    };
}

/// Split a line into lowercase tokens: maximal runs of alphanumeric or
/// underscore characters after NFKC folding. Everything else delimits and
/// contributes no empty tokens.
///
/// Shared by ingestion and query evaluation so dictionary keys and lookups
/// agree.
pub fn split_words(text: &str) -> Vec<String> {
    let folded = text.nfkc().collect::<String>().to_lowercase();
    WORD.find_iter(&folded)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Whether a lowercase token enters the dictionary: at least two characters
/// and not a stop word.
pub fn is_indexable(token: &str) -> bool {
    token.chars().count() >= 2 && !is_stopword(token)
}

/// Term normalization applied after filtering. Dictionary keys are its
/// output, so swapping implementations only changes which strings key the
/// index, never the build or query contracts.
pub trait Normalizer {
    fn normalize(&self, token: &str) -> String;
}

/// Pass-through: dictionary keys are the filtered tokens themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, token: &str) -> String {
        token.to_string()
    }
}

/// Porter-style English suffix stripping.
pub struct StemNormalizer {
    stemmer: Stemmer,
}

impl StemNormalizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Default for StemNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for StemNormalizer {
    fn normalize(&self, token: &str) -> String {
        self.stemmer.stem(token).to_string()
    }
}
