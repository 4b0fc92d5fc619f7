//! Tokenizer for instruction scalars.
//!
//! Splits an instruction into whitespace-delimited tokens. Quoting groups whitespace into one token:
//! `name:"Grim Reaper"` is a single token whose text is `name:Grim Reaper`.
//!
//! ## Quoting rules
//! - `"` and `'` open a quoted run only at the start of a token or directly after `:` or `,`. A quote inside a
//!   word (`it's`) is literal.
//! - A run ends at the next occurrence of the same quote character.
//! - An unterminated run extends to the end of the text, so the remainder becomes one token.
//!
//! ## Module Structure
//!
//! - `tokens` - The [`Token`] type

pub mod tokens;

use std::borrow::Cow;
use std::iter::FusedIterator;

use questline_core::lang::conventions::{LIST_SEPARATOR, QUOTES};

pub use tokens::Token;

use crate::ast::Span;

/// Lazy, restartable token stream over one instruction.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Rewind to the first token.
    pub fn restart(&mut self) {
        self.pos = 0;
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.source[self.pos..];
        let start = self.pos + (rest.len() - rest.trim_start().len());
        if start >= self.source.len() {
            self.pos = self.source.len();
            return None;
        }

        let (end, text) = scan(self.source, start);
        self.pos = end;
        Some(Token {
            raw: &self.source[start..end],
            text,
            span: Span::new(start, end),
            had_leading_comma: false,
        })
    }
}

impl FusedIterator for Tokenizer<'_> {}

/// Tokenize an instruction.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer::new(source)
}

/// Scan one token starting at `start` (a non-whitespace position).
fn scan(source: &str, start: usize) -> (usize, Cow<'_, str>) {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut quoted = false;
    let mut text = String::new();
    let mut end = source.len();

    for (i, c) in source[start..].char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => text.push(c),
            None if c.is_whitespace() => {
                end = start + i;
                break;
            }
            None if QUOTES.contains(&c) && opens_quote(prev) => {
                quote = Some(c);
                quoted = true;
            }
            None => text.push(c),
        }
        prev = Some(c);
    }

    if quoted {
        (end, Cow::Owned(text))
    } else {
        (end, Cow::Borrowed(&source[start..end]))
    }
}

fn opens_quote(prev: Option<char>) -> bool {
    matches!(prev, None | Some(':') | Some(','))
}

/// Remove quote delimiters from a single token's raw text.
pub fn unquote(raw: &str) -> Cow<'_, str> {
    if raw.is_empty() {
        return Cow::Borrowed(raw);
    }
    let (end, text) = scan(raw, 0);
    if end == raw.len() {
        text
    } else {
        // Whitespace outside quotes: not a single token, keep verbatim.
        Cow::Borrowed(raw)
    }
}

/// Quote a value so it tokenizes back to exactly one token with text `value`.
///
/// ## Returns
/// - The value unchanged when no quoting is needed.
/// - The value wrapped in `"` (or `'` if it contains `"`).
/// - `None` if the value needs quoting but contains both quote characters.
pub fn quote(value: &str) -> Option<Cow<'_, str>> {
    let mut prev = None;
    let needs_quotes = value.is_empty()
        || value.chars().any(|c| {
            let special = c.is_whitespace() || (QUOTES.contains(&c) && opens_quote(prev));
            prev = Some(c);
            special
        });
    if !needs_quotes {
        return Some(Cow::Borrowed(value));
    }
    QUOTES
        .iter()
        .find(|q| !value.contains(**q))
        .map(|q| Cow::Owned(format!("{q}{value}{q}")))
}

/// Split a comma-separated value into list elements.
///
/// Empty elements are kept (`a,,b` yields three elements) so callers can report them.
pub fn split_list(value: &str) -> Vec<Token<'_>> {
    let mut elements = Vec::new();
    let mut start = 0;
    let mut had_leading_comma = false;
    for part in value.split(LIST_SEPARATOR) {
        let end = start + part.len();
        elements.push(Token {
            raw: part,
            text: Cow::Borrowed(part),
            span: Span::new(start, end),
            had_leading_comma,
        });
        start = end + LIST_SEPARATOR.len_utf8();
        had_leading_comma = true;
    }
    elements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).map(|t| t.text.into_owned()).collect()
    }

    #[test]
    fn test_whitespace_splitting() {
        assert_eq!(texts("  give   emerald\tamount:5 "), vec!["give", "emerald", "amount:5"]);
        assert!(texts("   ").is_empty());
        assert!(texts("").is_empty());
    }

    #[test]
    fn test_quoted_runs() {
        let tokens: Vec<_> = tokenize(r#"spawn ZOMBIE 3 name:"Grim Reaper""#).collect();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[3].text, "name:Grim Reaper");
        assert_eq!(tokens[3].raw, r#"name:"Grim Reaper""#);
        assert_eq!(tokens[3].span, Span::new(15, 33));

        assert_eq!(texts("notify 'hello world' x"), vec!["notify", "hello world", "x"]);
    }

    #[test]
    fn test_inner_apostrophe_is_literal() {
        assert_eq!(texts("notify it's fine"), vec!["notify", "it's", "fine"]);
    }

    #[test]
    fn test_unterminated_quote_takes_rest() {
        let tokens: Vec<_> = tokenize("notify \"hello there").collect();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text, "hello there");
        assert_eq!(tokens[1].span.end, 19);
    }

    #[test]
    fn test_restart() {
        let mut tokenizer = tokenize("a b");
        assert_eq!(tokenizer.by_ref().count(), 2);
        assert!(tokenizer.next().is_none());
        tokenizer.restart();
        assert_eq!(tokenizer.next().map(|t| t.span), Some(Span::new(0, 1)));
    }

    #[test]
    fn test_split_list_keeps_empty_elements() {
        let parts = split_list("a,,b");
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].text, "");
        assert_eq!(parts[1].span, Span::new(2, 2));
        assert_eq!(parts[2].span, Span::new(3, 4));
        assert!(!parts[0].had_leading_comma);
        assert!(parts[2].had_leading_comma);
    }

    #[test]
    fn test_quote_and_unquote() {
        assert_eq!(quote("emerald").as_deref(), Some("emerald"));
        assert_eq!(quote("Grim Reaper").as_deref(), Some("\"Grim Reaper\""));
        assert_eq!(quote("say \"hi\"").as_deref(), Some("'say \"hi\"'"));
        assert_eq!(quote("").as_deref(), Some("\"\""));
        assert_eq!(quote("it's \"x\""), None);
        assert_eq!(unquote("\"Grim Reaper\""), "Grim Reaper");
        assert_eq!(unquote("a b"), "a b");
    }
}
