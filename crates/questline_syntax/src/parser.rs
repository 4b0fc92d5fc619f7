//! Parse instruction scalars into [`InstructionNode`]s.

use questline_core::lang::kinds;
use questline_core::lang::lists::{self, ListKind};
use questline_core::lang::patterns::ArgumentPattern;
use questline_core::lang::table::PatternLookup;

use crate::ast::Span;
use crate::binder::bind;
use crate::diagnostics::{DiagnosticCode, errors};
use crate::instruction::InstructionNode;
use crate::tokenizer::{Token, tokenize};

/// Parse a whole instruction scalar (`kind arg arg key:value`).
///
/// `base_offset` is the absolute offset of `source` in its file.
#[tracing::instrument(skip_all, fields(list = %list, offset = base_offset))]
pub fn parse_instruction(
    list: ListKind,
    source: &str,
    base_offset: usize,
    lookup: &dyn PatternLookup,
) -> InstructionNode {
    let Some(kind_token) = tokenize(source).next() else {
        tracing::debug!("empty instruction");
        let at = Span::empty(base_offset);
        return InstructionNode {
            list,
            kind: String::new(),
            kind_span: at,
            known_kind: false,
            pattern: ArgumentPattern::EMPTY,
            mandatory: Vec::new(),
            optional: Vec::new(),
            span: at,
            diagnostics: vec![errors::empty_instruction(at)],
        };
    };

    let kind_span = kind_token.span.offset(base_offset);
    let args = &source[kind_token.span.end..];
    bind_instruction(list, &kind_token.text, kind_span, args, kind_span.end, lookup)
}

/// Build an instruction from an already separated kind and argument string.
///
/// `args_offset` is the absolute offset of `args`; an instruction without arguments gets its placeholders
/// there.
pub fn bind_instruction(
    list: ListKind,
    kind: &str,
    kind_span: Span,
    args: &str,
    args_offset: usize,
    lookup: &dyn PatternLookup,
) -> InstructionNode {
    let tokens: Vec<Token<'_>> = tokenize(args).collect();
    let known = lookup.pattern(list, kind);
    let pattern = known.cloned().unwrap_or(ArgumentPattern::EMPTY);
    let binding = bind(args, &tokens, &pattern, args_offset);

    let mut mandatory = binding.mandatory;
    let mut optional = binding.optional;
    let mut diagnostics = Vec::new();

    if known.is_none() {
        tracing::debug!(kind, "unknown kind, arguments kept unchecked");
        for arg in mandatory.iter_mut().chain(optional.iter_mut()) {
            arg.diagnostics.retain(|d| {
                !matches!(
                    d.code,
                    DiagnosticCode::UnexpectedArgument | DiagnosticCode::UnknownOptionalKey
                )
            });
        }
        let names: Vec<&str> = kinds::kinds(list).iter().map(|info| info.canonical).collect();
        diagnostics.push(errors::unknown_kind(lists::singular(list), kind, kind_span, &names));
    }

    let span = mandatory
        .iter()
        .chain(&optional)
        .filter(|arg| !arg.is_placeholder)
        .fold(kind_span, |span, arg| span.merge(arg.span));

    InstructionNode {
        list,
        kind: kind.to_string(),
        kind_span,
        known_kind: known.is_some(),
        pattern,
        mandatory,
        optional,
        span,
        diagnostics,
    }
}
