//! Diagnostics produced while parsing, binding and resolving instructions.
//!
//! Parsing never fails: every anomaly becomes a [`Diagnostic`] attached to the nearest node. Constructors for the
//! recurring messages live in [`errors`] so wording stays consistent across the binder, the element-list parser
//! and the resolver.

use std::fmt;

use crate::ast::Span;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Stable identifier of a diagnostic, used by tooling (quick fixes, JSON output, suppression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    EmptyInstruction,
    UnknownKind,
    MissingMandatoryArgument,
    UnknownOptionalKey,
    DuplicateOptionalKey,
    UnexpectedArgument,
    InvalidValue,
    EmptyReference,
    MalformedReference,
    PackageNotFound,
    DanglingReference,
    DuplicateName,
    MalformedDocument,
}

impl DiagnosticCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::EmptyInstruction => "empty-instruction",
            DiagnosticCode::UnknownKind => "unknown-kind",
            DiagnosticCode::MissingMandatoryArgument => "missing-mandatory-argument",
            DiagnosticCode::UnknownOptionalKey => "unknown-optional-key",
            DiagnosticCode::DuplicateOptionalKey => "duplicate-optional-key",
            DiagnosticCode::UnexpectedArgument => "unexpected-argument",
            DiagnosticCode::InvalidValue => "invalid-value",
            DiagnosticCode::EmptyReference => "empty-reference",
            DiagnosticCode::MalformedReference => "malformed-reference",
            DiagnosticCode::PackageNotFound => "package-not-found",
            DiagnosticCode::DanglingReference => "dangling-reference",
            DiagnosticCode::DuplicateName => "duplicate-name",
            DiagnosticCode::MalformedDocument => "malformed-document",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A problem located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            span,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message, span)
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

/// 1-based line and column plus the line's text for a byte offset.
pub fn line_info(source: &str, offset: usize) -> (usize, usize, &str) {
    let offset = offset.min(source.len());
    let mut line_num = 1;
    let mut line_start = 0;

    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line_num += 1;
            line_start = i + 1;
        }
    }

    let line_end = source[line_start..]
        .find('\n')
        .map(|i| line_start + i)
        .unwrap_or(source.len());

    let line_text = &source[line_start..line_end];
    let col_num = source[line_start..offset].chars().count() + 1;

    (line_num, col_num, line_text)
}

// ============================================================================
// Diagnostic catalog
// ============================================================================

/// Constructors for the recurring diagnostics.
pub mod errors {
    use super::*;

    pub fn empty_instruction(span: Span) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::EmptyInstruction, "Instruction is empty", span)
            .with_hint("Start the instruction with a kind, e.g. `give emerald`")
    }

    pub fn unknown_kind(singular: &str, kind: &str, span: Span, known: &[&str]) -> Diagnostic {
        let mut diagnostic = Diagnostic::warning(
            DiagnosticCode::UnknownKind,
            format!("Unknown {} kind '{}'", singular, kind),
            span,
        )
        .with_note("Arguments of unknown kinds are kept but not checked");
        if let Some(suggestion) = closest(kind, known) {
            diagnostic = diagnostic.with_hint(format!("Did you mean '{}'?", suggestion));
        }
        diagnostic
    }

    pub fn missing_mandatory_argument(slot: &str, example: &str, at: usize) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::MissingMandatoryArgument,
            format!("Missing mandatory argument '{}'", slot),
            Span::empty(at),
        )
        .with_hint(format!("For example: {}", example))
    }

    pub fn unknown_optional_key(key: &str, span: Span, declared: &[&str]) -> Diagnostic {
        let diagnostic = Diagnostic::warning(
            DiagnosticCode::UnknownOptionalKey,
            format!("Unknown optional argument '{}'", key),
            span,
        );
        if declared.is_empty() {
            diagnostic.with_note("This kind takes no optional arguments")
        } else {
            diagnostic.with_hint(format!("Known keys: {}", declared.join(", ")))
        }
    }

    pub fn misplaced_optional(key: &str, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::UnexpectedArgument,
            format!("Optional argument '{}' is not in the optional argument run", key),
            span,
        )
        .with_hint("Keep all `key:value` arguments together after the positional ones")
    }

    pub fn unexpected_argument(raw: &str, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::UnexpectedArgument,
            format!("Unexpected argument '{}'", raw),
            span,
        )
        .with_hint("Quote values that contain spaces")
    }

    pub fn duplicate_optional_key(key: &str, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::DuplicateOptionalKey,
            format!("Optional argument '{}' is given more than once", key),
            span,
        )
        .with_note("Only the first occurrence is used")
    }

    pub fn invalid_value(slot: &str, expected: &str, reason: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::InvalidValue,
            format!("Invalid value for '{}': {}", slot, reason),
            span,
        )
        .with_note(format!("'{}' takes a {}", slot, expected))
    }

    pub fn empty_reference(span: Span) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::EmptyReference, "Empty ID in reference list", span)
            .with_hint("Remove the extra comma")
    }

    pub fn malformed_reference(text: &str, reason: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::MalformedReference,
            format!("Malformed ID '{}': {}", text, reason),
            span,
        )
        .with_hint("IDs look like `id`, `package-sub.id`, `_.id` or `!id`")
    }

    pub fn package_not_found(package: &str, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::PackageNotFound,
            format!("Package '{}' does not exist", package),
            span,
        )
    }

    pub fn package_above_root(levels: usize, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::PackageNotFound,
            format!("Reference ascends {} package levels past the workspace root", levels),
            span,
        )
    }

    pub fn dangling_reference(singular: &str, id: &str, package: &str, span: Span) -> Diagnostic {
        Diagnostic::warning(
            DiagnosticCode::DanglingReference,
            format!("No {} named '{}' in package '{}'", singular, id, package),
            span,
        )
    }

    pub fn duplicate_name(singular: &str, name: &str, span: Span) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::DuplicateName,
            format!("Duplicate {} name '{}'", singular, name),
            span,
        )
        .with_note("The first definition in the package wins")
    }

    pub fn malformed_document(reason: &str, span: Span) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::MalformedDocument, reason.to_string(), span)
            .with_note("Entries of this file are ignored until it is fixed")
    }

    /// Closest spelling within a small edit distance, for "did you mean" hints.
    fn closest<'a>(word: &str, candidates: &[&'a str]) -> Option<&'a str> {
        candidates
            .iter()
            .map(|c| (edit_distance(word, c), *c))
            .filter(|(d, _)| *d <= 2)
            .min_by_key(|(d, _)| *d)
            .map(|(_, c)| c)
    }

    fn edit_distance(a: &str, b: &str) -> usize {
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for (i, ca) in a.chars().enumerate() {
            let mut cur = vec![i + 1; b.len() + 1];
            for (j, cb) in b.iter().enumerate() {
                let cost = usize::from(ca != *cb);
                cur[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(cur[j] + 1);
            }
            prev = cur;
        }
        prev[b.len()]
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_info_counts_chars() {
        let source = "events:\n  a: give é x\n";
        let offset = source.find('x').unwrap();
        let (line, col, text) = line_info(source, offset);
        assert_eq!(line, 2);
        assert_eq!(col, 13);
        assert_eq!(text, "  a: give é x");
    }

    #[test]
    fn test_severity_and_display() {
        let d = errors::missing_mandatory_argument("location", "100;64;100;world", 8);
        assert!(d.is_error());
        assert_eq!(d.span, Span::empty(8));
        assert_eq!(
            d.to_string(),
            "error[missing-mandatory-argument]: Missing mandatory argument 'location'"
        );
    }
}
