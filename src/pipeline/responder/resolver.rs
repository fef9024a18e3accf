use serde::Serialize;

use super::table::ResponseTable;
use crate::models::MatchKind;

/// A canned answer and the rule that selected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CannedAnswer<'t> {
    pub key: &'t str,
    pub answer: &'t str,
    pub kind: MatchKind,
}

/// Find the canned answer for already-normalized input.
///
/// 1. Exact key match (case-insensitive) wins outright.
/// 2. Otherwise the first key, in table order, where the input is a
///    substring of the lower-cased key, the lower-cased key is a substring
///    of the input, or the input equals one whitespace token of the key.
///
/// `None` means no match; the caller falls back to generation. Empty input
/// (only stop-words were typed) is a substring of every key, so it gets the
/// first entry of a non-empty table.
pub fn resolve<'t>(table: &'t ResponseTable, normalized_input: &str) -> Option<CannedAnswer<'t>> {
    if let Some((key, answer)) = table.get_exact(normalized_input) {
        return Some(CannedAnswer {
            key,
            answer,
            kind: MatchKind::Exact,
        });
    }

    for (key, answer) in table.iter() {
        let lowered = key.to_lowercase();
        let kind = if lowered.contains(normalized_input) {
            MatchKind::InputWithinKey
        } else if normalized_input.contains(lowered.as_str()) {
            MatchKind::KeyWithinInput
        } else if lowered.split_whitespace().any(|token| token == normalized_input) {
            // Unreachable in practice: a whole token of the key is also a
            // substring of it, so `InputWithinKey` has already matched.
            MatchKind::KeyToken
        } else {
            continue;
        };

        tracing::debug!(key, kind = kind.as_str(), "Fuzzy canned-answer match");
        return Some(CannedAnswer { key, answer, kind });
    }

    None
}
