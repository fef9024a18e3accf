//! Input normalization: tokenize, drop stop-words, lower-case.
//!
//! The tokenizer and the stop-word list are collaborators behind traits so
//! the orchestrator never depends on a concrete NLP toolkit.

pub mod stopwords;
pub mod tokenizer;

use std::collections::HashSet;

pub use stopwords::{BuiltinStopwords, StopwordSource};
pub use tokenizer::{Tokenizer, WordTokenizer};

use crate::config;

/// Turns translated user text into the form the response table is matched on.
pub struct Normalizer {
    tokenizer: Box<dyn Tokenizer>,
    stopwords: HashSet<String>,
}

impl Normalizer {
    pub fn new(tokenizer: Box<dyn Tokenizer>, stopwords: HashSet<String>) -> Self {
        Self {
            tokenizer,
            stopwords,
        }
    }

    /// Word tokenizer plus the bundled stop-words of the working language.
    pub fn english() -> Self {
        let stopwords = BuiltinStopwords.stopwords(config::WORKING_LANGUAGE);
        Self::new(Box::new(WordTokenizer), stopwords)
    }

    /// Tokenize, discard stop-words (case-insensitive), join with single
    /// spaces, lower-case the result.
    pub fn normalize(&self, text: &str) -> String {
        let kept: Vec<String> = self
            .tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|token| !self.stopwords.contains(&token.to_lowercase()))
            .collect();
        kept.join(" ").to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_lowercases() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("I have a Fever"), "fever");
    }

    #[test]
    fn stopword_check_is_case_insensitive() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("THE Headache"), "headache");
    }

    #[test]
    fn punctuation_survives_as_separate_token() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("What is diabetes?"), "diabetes ?");
    }

    #[test]
    fn keeps_token_order_and_single_spaces() {
        let normalizer = Normalizer::english();
        assert_eq!(
            normalizer.normalize("high   blood\tpressure"),
            "high blood pressure"
        );
    }

    #[test]
    fn only_stopwords_normalizes_to_empty() {
        let normalizer = Normalizer::english();
        assert_eq!(normalizer.normalize("what is it"), "");
    }

    #[test]
    fn custom_collaborators_are_used() {
        struct Whitespace;
        impl Tokenizer for Whitespace {
            fn tokenize(&self, text: &str) -> Vec<String> {
                text.split_whitespace().map(str::to_string).collect()
            }
        }

        let stopwords: HashSet<String> = ["please".to_string()].into_iter().collect();
        let normalizer = Normalizer::new(Box::new(Whitespace), stopwords);
        assert_eq!(normalizer.normalize("Please help, Doctor"), "help, doctor");
    }
}
