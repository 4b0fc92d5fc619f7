//! Parse ID references (`!quest-intro.started`, `_.done`, `-sub.first`).
//!
//! ## Grammar
//! ```text
//! reference := ["!"] [path "."] id
//! path      := parent ("-" parent)* ["-" segment ("-" segment)*]   relative, ascending
//!            | "-" segment ("-" segment)*                           relative, descending
//!            | segment ("-" segment)*                               absolute
//! parent    := "_"
//! ```
//! A reference without a path names an element in the referencing package.
//!
//! Parsing is total: malformed text yields an [`IdReference`] with an empty `bare_id` and a `problem`, and the
//! caller turns that into a diagnostic.

use questline_core::lang::conventions::{ID_SEPARATOR, NEGATION_PREFIX, PACKAGE_SEPARATOR, PARENT_PACKAGE};
use questline_core::lang::lists::ListKind;

use crate::ast::{ArgumentNode, IdReference, Span};
use crate::diagnostics::{Diagnostic, errors};
use crate::tokenizer::split_list;

/// Parse a reference whose text starts at offset 0.
pub fn parse_reference(text: &str) -> IdReference {
    parse_reference_at(text, 0)
}

/// Parse a reference whose text starts at absolute offset `offset`.
pub fn parse_reference_at(text: &str, offset: usize) -> IdReference {
    let span = Span::new(offset, offset + text.len());
    let (negated, body) = match text.strip_prefix(NEGATION_PREFIX) {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let mut reference = IdReference {
        negated,
        is_absolute: false,
        parent_levels: 0,
        segments: Vec::new(),
        bare_id: String::new(),
        span,
        problem: None,
    };

    let (path, id) = match body.split_once(ID_SEPARATOR) {
        Some((path, id)) => (Some(path), id),
        None => (None, body),
    };

    if let Some(problem) = id_problem(id) {
        reference.problem = Some(problem);
        return reference;
    }

    if let Some(path) = path {
        if let Err(problem) = parse_path(path, &mut reference) {
            reference.problem = Some(problem);
            reference.parent_levels = 0;
            reference.segments.clear();
            reference.is_absolute = false;
            return reference;
        }
    }

    reference.bare_id = id.to_string();
    reference
}

fn id_problem(id: &str) -> Option<&'static str> {
    if id.is_empty() {
        Some("the ID is empty")
    } else if id.contains(ID_SEPARATOR) {
        Some("an ID may contain only one '.'")
    } else if id.starts_with(NEGATION_PREFIX) {
        Some("'!' must come before the package path")
    } else if id.chars().any(|c| c.is_whitespace() || c == ',' || c == ':') {
        Some("IDs cannot contain spaces, ',' or ':'")
    } else {
        None
    }
}

fn parse_path(path: &str, reference: &mut IdReference) -> Result<(), &'static str> {
    if path.is_empty() {
        return Err("the package path before '.' is empty");
    }

    let mut parts = path.split(PACKAGE_SEPARATOR).peekable();
    match parts.peek() {
        Some(&"") => {
            parts.next();
        }
        Some(&PARENT_PACKAGE) => {
            while parts.next_if_eq(&PARENT_PACKAGE).is_some() {
                reference.parent_levels += 1;
            }
        }
        _ => reference.is_absolute = true,
    }

    for part in parts {
        if part.is_empty() {
            return Err("the package path has an empty segment");
        }
        if part == PARENT_PACKAGE {
            return Err("'_' may only appear at the start of a package path");
        }
        reference.segments.push(part.to_string());
    }

    if !reference.is_absolute && reference.parent_levels == 0 && reference.segments.is_empty() {
        return Err("the package path has an empty segment");
    }
    Ok(())
}

/// A reference found in an instruction argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// List kind the reference points into.
    pub target: ListKind,
    /// Slot name or key of the argument holding the reference.
    pub slot: String,
    pub reference: IdReference,
}

/// Parse every reference held by a reference-typed argument.
///
/// Empty list elements are skipped here; [`check_references`] reports them.
pub fn references_in(argument: &ArgumentNode) -> Vec<ReferenceSite> {
    if argument.is_placeholder || !argument.declared {
        return Vec::new();
    }
    let Some(value_type) = argument.value_type else {
        return Vec::new();
    };
    let Some(target) = value_type.referenced_list() else {
        return Vec::new();
    };

    let base = argument.value_text_offset();
    let site = |text: &str, offset: usize| ReferenceSite {
        target,
        slot: argument.slot.clone(),
        reference: parse_reference_at(text, offset),
    };

    match value_type {
        questline_core::lang::values::ValueType::ReferenceList(_) => split_list(&argument.value)
            .into_iter()
            .filter(|element| !element.raw.is_empty())
            .map(|element| site(element.raw, base + element.span.start))
            .collect(),
        _ if argument.value.is_empty() => Vec::new(),
        _ => vec![site(&argument.value, base)],
    }
}

/// Diagnostics for the reference syntax of a reference-typed argument.
pub fn check_references(argument: &ArgumentNode) -> Vec<Diagnostic> {
    let Some(value_type) = argument.value_type else {
        return Vec::new();
    };
    if value_type.referenced_list().is_none() {
        return Vec::new();
    }
    let base = argument.value_text_offset();
    let mut diagnostics = Vec::new();

    if let questline_core::lang::values::ValueType::ReferenceList(_) = value_type {
        for element in split_list(&argument.value) {
            if element.raw.is_empty() {
                diagnostics.push(errors::empty_reference(Span::empty(base + element.span.start)));
            }
        }
    } else if argument.value.is_empty() {
        diagnostics.push(errors::empty_reference(Span::empty(base)));
    }

    for site in references_in(argument) {
        let reference = &site.reference;
        if let Some(problem) = reference.problem {
            let text = argument
                .value
                .get(reference.span.start - base..reference.span.end - base)
                .unwrap_or_default();
            diagnostics.push(errors::malformed_reference(text, problem, reference.span));
        }
    }
    diagnostics
}
