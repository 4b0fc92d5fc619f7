//! Rendering diagnostics for people and for tools.
//!
//! Human output goes through miette's graphical handler, one report per diagnostic with the offending range
//! underlined. JSON output is one object per diagnostic with 1-based line and column numbers.

use std::fmt;
use std::path::Path;

use miette::{GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, SourceCode};
use questline_syntax::diagnostics::{Diagnostic, DiagnosticCode, Severity, line_info};
use serde_json::{Value, json};

use crate::workspace::WorkspaceDiagnostic;

/// A diagnostic bundled with the file it points into, ready for miette.
#[derive(Debug)]
pub struct Report {
    code: DiagnosticCode,
    severity: Severity,
    message: String,
    offset: usize,
    len: usize,
    help: Option<String>,
    source: NamedSource<String>,
}

impl Report {
    pub fn new(diagnostic: &Diagnostic, path: &Path, text: &str) -> Self {
        let offset = diagnostic.span.start.min(text.len());
        let len = diagnostic.span.end.min(text.len()).saturating_sub(offset);
        let help = diagnostic
            .notes
            .iter()
            .map(|note| format!("note: {note}"))
            .chain(diagnostic.hints.iter().cloned())
            .collect::<Vec<_>>();
        Self {
            code: diagnostic.code,
            severity: diagnostic.severity,
            message: diagnostic.message.clone(),
            offset,
            len,
            help: (!help.is_empty()).then(|| help.join("\n")),
            source: NamedSource::new(path.display().to_string(), text.to_string()),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Report {}

impl miette::Diagnostic for Report {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Error => miette::Severity::Error,
            Severity::Warning => miette::Severity::Warning,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help.as_ref().map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.source)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::new_with_span(Some(self.code.to_string()), (self.offset, self.len));
        Some(Box::new(std::iter::once(label)))
    }
}

/// Render diagnostics with source snippets. `color` selects ANSI styling.
pub fn render_human(diagnostics: &[WorkspaceDiagnostic<'_>], color: bool) -> String {
    let theme = if color {
        GraphicalTheme::unicode()
    } else {
        GraphicalTheme::unicode_nocolor()
    };
    let handler = GraphicalReportHandler::new_themed(theme);
    let mut out = String::new();
    for item in diagnostics {
        let report = Report::new(&item.diagnostic, &item.source.path, &item.source.text);
        if handler.render_report(&mut out, &report).is_err() {
            out.push_str(&item.diagnostic.to_string());
        }
        out.push('\n');
    }
    out
}

/// One JSON object per diagnostic.
pub fn render_json(diagnostics: &[WorkspaceDiagnostic<'_>]) -> Value {
    Value::Array(diagnostics.iter().map(diagnostic_json).collect())
}

fn diagnostic_json(item: &WorkspaceDiagnostic<'_>) -> Value {
    let text = item.source.text.as_str();
    let span = item.diagnostic.span;
    let (line, column, _) = line_info(text, span.start.min(text.len()));
    let (end_line, end_column, _) = line_info(text, span.end.min(text.len()));
    json!({
        "package": item.package.to_string(),
        "file": item.source.path.display().to_string(),
        "line": line,
        "column": column,
        "end_line": end_line,
        "end_column": end_column,
        "severity": item.diagnostic.severity.to_string(),
        "code": item.diagnostic.code.as_str(),
        "message": item.diagnostic.message,
        "notes": item.diagnostic.notes,
        "hints": item.diagnostic.hints,
    })
}
