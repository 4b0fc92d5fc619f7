//! Token type produced by the tokenizer.

use std::borrow::Cow;

use crate::ast::Span;

/// One whitespace-delimited piece of an instruction (or one element of a comma list).
///
/// Tokens borrow from the text they were cut from. `span` is relative to that text; callers add the scalar's
/// absolute offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    /// Exact source slice, quotes included.
    pub raw: &'a str,
    /// Text with quote delimiters removed (borrowed when the token had none).
    pub text: Cow<'a, str>,
    pub span: Span,
    /// Set for list elements preceded by a comma.
    pub had_leading_comma: bool,
}

impl<'a> Token<'a> {
    /// Split `key:value` tokens at the first key separator.
    ///
    /// Returns `None` unless the part before the separator is a plausible key (non-empty, no quotes).
    pub fn key_value(&self) -> Option<(&str, &str)> {
        let (key, value) = self.text.split_once(questline_core::lang::conventions::KEY_SEPARATOR)?;
        let plausible = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
        plausible.then_some((key, value))
    }

    /// Offset of the value part within `raw`, for `key:value` tokens.
    pub fn value_offset_in_raw(&self) -> usize {
        self.raw
            .find(questline_core::lang::conventions::KEY_SEPARATOR)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}
