//! Position-tracked nodes shared by the binder, the instruction tree and the resolver.
//!
//! All offsets are **absolute byte offsets** into the containing source file. A node parsed from a scalar that
//! starts at byte 120 carries spans beginning at 120 or later, so editor ranges can be computed without knowing
//! which scalar a node came from.

use std::fmt;

use questline_core::lang::values::ValueType;

/// Half-open byte range `[start, end)` in a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width span at `offset` (placeholders, insertion points).
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    /// `true` if `offset` lies inside the span; the end offset counts as inside so a cursor placed right after a
    /// token still hits it.
    pub fn contains(self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Move the span right by `base` (relative span to absolute).
    pub fn offset(self, base: usize) -> Span {
        Span {
            start: self.start + base,
            end: self.end + base,
        }
    }

    /// Apply a text edit ending at `at` that changed the text length by `delta`: every position at or past `at`
    /// moves, earlier positions stay.
    pub fn shifted(self, at: usize, delta: isize) -> Span {
        Span {
            start: shift_position(self.start, at, delta),
            end: shift_position(self.end, at, delta),
        }
    }
}

pub fn shift_position(position: usize, at: usize, delta: isize) -> usize {
    if position >= at {
        position.saturating_add_signed(delta)
    } else {
        position
    }
}

/// A single replacement in a source file: replace `span` with `new_text`.
///
/// Every mutating operation of the instruction tree returns one of these so the caller can apply it to the file
/// text (or forward it to an editor) and shift unrelated nodes by [`TextEdit::delta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(span: Span, new_text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: new_text.into(),
        }
    }

    /// Length change caused by the edit.
    pub fn delta(&self) -> isize {
        self.new_text.len() as isize - self.span.len() as isize
    }

    /// `true` if applying the edit leaves the text unchanged in length and content.
    pub fn is_noop(&self) -> bool {
        self.span.is_empty() && self.new_text.is_empty()
    }

    /// Apply the edit to `text`.
    ///
    /// Out-of-range or non-boundary spans are ignored and reported as `false`.
    pub fn apply(&self, text: &mut String) -> bool {
        if self.span.end > text.len()
            || self.span.start > self.span.end
            || !text.is_char_boundary(self.span.start)
            || !text.is_char_boundary(self.span.end)
        {
            return false;
        }
        text.replace_range(self.span.start..self.span.end, &self.new_text);
        true
    }
}

/// Whether an argument was bound positionally or by key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgumentRole {
    Mandatory,
    Optional,
}

impl fmt::Display for ArgumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentRole::Mandatory => write!(f, "mandatory"),
            ArgumentRole::Optional => write!(f, "optional"),
        }
    }
}

/// One bound argument.
///
/// ## Notes
/// - `raw` is the exact source text of the argument (quotes, `key:` prefix and all) and `span` covers it.
/// - `value` is the argument value with quoting removed; `value_span` covers the value part of `raw` (after the
///   `key:` prefix for optional arguments).
/// - A placeholder stands in for a missing mandatory argument: empty `raw`, zero-width spans at the insertion
///   point.
/// - `declared` is `false` for surplus tokens that matched no slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentNode {
    pub role: ArgumentRole,
    /// Slot name (mandatory) or key (optional); empty for surplus positional tokens.
    pub slot: String,
    pub value: String,
    pub raw: String,
    pub span: Span,
    pub value_span: Span,
    pub value_type: Option<ValueType>,
    pub is_placeholder: bool,
    pub declared: bool,
    pub diagnostics: Vec<crate::diagnostics::Diagnostic>,
}

impl ArgumentNode {
    pub(crate) fn placeholder(slot: &str, value_type: ValueType, at: usize) -> Self {
        Self {
            role: ArgumentRole::Mandatory,
            slot: slot.to_string(),
            value: String::new(),
            raw: String::new(),
            span: Span::empty(at),
            value_span: Span::empty(at),
            value_type: Some(value_type),
            is_placeholder: true,
            declared: true,
            diagnostics: Vec::new(),
        }
    }

    /// Absolute offset of the first character of `value` inside the source (past an opening quote, if any).
    pub fn value_text_offset(&self) -> usize {
        let value_raw = self
            .raw
            .get(self.value_span.start - self.span.start..)
            .unwrap_or_default();
        match value_raw.chars().next() {
            Some(c) if questline_core::lang::conventions::QUOTES.contains(&c) => self.value_span.start + c.len_utf8(),
            _ => self.value_span.start,
        }
    }

    pub(crate) fn shift(&mut self, at: usize, delta: isize) {
        self.span = self.span.shifted(at, delta);
        self.value_span = self.value_span.shifted(at, delta);
        for diagnostic in &mut self.diagnostics {
            diagnostic.span = diagnostic.span.shifted(at, delta);
        }
    }
}

/// A parsed ID reference such as `!quest-intro.started`.
///
/// ## Notes
/// - `is_absolute` references name their package from the workspace root (`quest-intro.started`).
/// - Relative references ascend `parent_levels` packages (one per leading `_` segment) and then descend into
///   `segments`. A bare `started` is relative with no levels and no segments: the referencing package itself.
/// - `problem` is set when the text is malformed; `bare_id` is empty in that case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdReference {
    pub negated: bool,
    pub is_absolute: bool,
    pub parent_levels: usize,
    pub segments: Vec<String>,
    pub bare_id: String,
    pub span: Span,
    pub problem: Option<&'static str>,
}

impl IdReference {
    /// `true` if the reference names a package explicitly (absolute, ascending or descending).
    pub fn has_package_path(&self) -> bool {
        self.is_absolute || self.parent_levels > 0 || !self.segments.is_empty()
    }

    pub fn is_malformed(&self) -> bool {
        self.problem.is_some()
    }

    /// The span of the bare ID inside the reference text.
    pub fn id_span(&self) -> Span {
        Span::new(self.span.end - self.bare_id.len(), self.span.end)
    }
}

impl fmt::Display for IdReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use questline_core::lang::conventions::{ID_SEPARATOR, NEGATION_PREFIX, PACKAGE_SEPARATOR, PARENT_PACKAGE};

        if self.negated {
            write!(f, "{}", NEGATION_PREFIX)?;
        }
        if self.has_package_path() {
            let mut parts: Vec<&str> = Vec::new();
            if !self.is_absolute {
                parts.extend(std::iter::repeat_n(PARENT_PACKAGE, self.parent_levels));
                if self.parent_levels == 0 {
                    // A leading separator marks descent from the current package.
                    parts.push("");
                }
            }
            parts.extend(self.segments.iter().map(String::as_str));
            write!(f, "{}{}", parts.join(PACKAGE_SEPARATOR.to_string().as_str()), ID_SEPARATOR)?;
        }
        write!(f, "{}", self.bare_id)
    }
}
