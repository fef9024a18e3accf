use std::sync::LazyLock;

use regex::Regex;

/// Word runs (hyphen and apostrophe joined) or any single non-space character.
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+(?:[-']\w+)*|\S").expect("valid tokenizer regex"));

/// Clitics split off the end of a word, Treebank style.
const CLITICS: &[&str] = &["'s", "'m", "'d", "'ll", "'re", "'ve"];

/// Splits text into tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// English word tokenizer.
///
/// Punctuation marks become their own tokens and contractions are split
/// (`don't` → `do` `n't`, `I'm` → `I` `'m`), so stop-word filtering sees
/// the same units an NLP toolkit would produce.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for m in WORD_PATTERN.find_iter(text) {
            split_contraction(m.as_str(), &mut tokens);
        }
        tokens
    }
}

fn split_contraction(word: &str, out: &mut Vec<String>) {
    let lower = word.to_lowercase();

    if lower.len() > 3 && lower.ends_with("n't") && word.is_char_boundary(word.len() - 3) {
        let (stem, clitic) = word.split_at(word.len() - 3);
        out.push(stem.to_string());
        out.push(clitic.to_string());
        return;
    }

    for clitic in CLITICS {
        if lower.len() > clitic.len()
            && lower.ends_with(clitic)
            && word.is_char_boundary(word.len() - clitic.len())
        {
            let (stem, tail) = word.split_at(word.len() - clitic.len());
            out.push(stem.to_string());
            out.push(tail.to_string());
            return;
        }
    }

    out.push(word.to_string());
}
