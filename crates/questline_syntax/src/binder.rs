//! Bind instruction tokens to the slots of an [`ArgumentPattern`].
//!
//! ## Algorithm
//! 1. Find the optional run. For [`OptionalPosition::Tail`] patterns, scan from the end and take the longest
//!    suffix of tokens that are `key:value` with a declared key; for [`OptionalPosition::Head`], the longest such
//!    prefix. Everything else is the mandatory run.
//! 2. Bind the mandatory run positionally. When the pattern preserves whitespace and the run has more tokens
//!    than slots, the tokens past the first `N - 1` are joined into the last slot using the original source text.
//! 3. Missing slots become zero-width placeholders right after the last consumed token, each with a
//!    `MissingMandatoryArgument` diagnostic at the same offset.
//! 4. Surplus tokens are kept as undeclared arguments: key-shaped ones as optional, the rest as mandatory.
//! 5. Declared, non-placeholder values are checked against their slot's [`ValueType`].
//!
//! The binder never fails; problems are attached to the argument they concern.

use questline_core::lang::patterns::{ArgumentPattern, MandatorySlot, OptionalPosition};
use questline_core::lang::values::{self, ValueType};

use crate::ast::{ArgumentNode, ArgumentRole, Span};
use crate::diagnostics::{Diagnostic, errors};
use crate::reference;
use crate::tokenizer::Token;

/// Result of binding one instruction's tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    /// Declared slots in pattern order (placeholders included), then surplus positional tokens.
    pub mandatory: Vec<ArgumentNode>,
    /// Optional arguments in source order, declared or not.
    pub optional: Vec<ArgumentNode>,
}

impl Binding {
    /// Every diagnostic raised while binding, in source order.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<&Diagnostic> = self
            .mandatory
            .iter()
            .chain(&self.optional)
            .flat_map(|arg| &arg.diagnostics)
            .collect();
        all.sort_by_key(|d| d.span);
        all
    }
}

/// Bind `tokens` (cut from `source`, spans relative to it) against `pattern`.
///
/// `base_offset` is the absolute offset of `source`; every span in the result is absolute. Placeholders for an
/// instruction without arguments land at `base_offset`.
pub fn bind(source: &str, tokens: &[Token<'_>], pattern: &ArgumentPattern, base_offset: usize) -> Binding {
    let is_declared_optional = |token: &Token<'_>| {
        token
            .key_value()
            .is_some_and(|(key, _)| pattern.optional_slot(key).is_some())
    };

    let (mandatory_tokens, optional_tokens) = match pattern.optional_position {
        OptionalPosition::Tail => {
            let split = tokens
                .iter()
                .rposition(|t| !is_declared_optional(t))
                .map_or(0, |i| i + 1);
            (&tokens[..split], &tokens[split..])
        }
        OptionalPosition::Head => {
            let split = tokens
                .iter()
                .position(|t| !is_declared_optional(t))
                .unwrap_or(tokens.len());
            (&tokens[split..], &tokens[..split])
        }
    };

    let cursor = mandatory_tokens
        .last()
        .or(match pattern.optional_position {
            OptionalPosition::Head => optional_tokens.last(),
            OptionalPosition::Tail => None,
        })
        .map_or(0, |t| t.span.end)
        + base_offset;

    let mut binding = Binding::default();
    bind_mandatory(source, mandatory_tokens, pattern, base_offset, cursor, &mut binding);
    bind_optional(optional_tokens, pattern, base_offset, &mut binding);
    binding.optional.sort_by_key(|arg| arg.span.start);

    for arg in binding.mandatory.iter_mut().chain(binding.optional.iter_mut()) {
        if arg.declared && !arg.is_placeholder {
            let checks = check_argument(arg);
            arg.diagnostics.extend(checks);
        }
    }
    binding
}

fn bind_mandatory(
    source: &str,
    tokens: &[Token<'_>],
    pattern: &ArgumentPattern,
    base: usize,
    cursor: usize,
    binding: &mut Binding,
) {
    let slots: &[MandatorySlot] = &pattern.mandatory;

    if pattern.preserve_whitespace_in_last_mandatory && !slots.is_empty() && tokens.len() > slots.len() {
        let last = slots.len() - 1;
        for (slot, token) in slots[..last].iter().zip(tokens) {
            binding.mandatory.push(mandatory_argument(slot, token, base));
        }

        let tail = &tokens[last..];
        let relative = Span::new(tail[0].span.start, tail[tail.len() - 1].span.end);
        let raw = &source[relative.start..relative.end];
        let span = relative.offset(base);
        binding.mandatory.push(ArgumentNode {
            role: ArgumentRole::Mandatory,
            slot: slots[last].name.to_string(),
            value: raw.to_string(),
            raw: raw.to_string(),
            span,
            value_span: span,
            value_type: Some(slots[last].value_type),
            is_placeholder: false,
            declared: true,
            diagnostics: Vec::new(),
        });
        return;
    }

    for (i, token) in tokens.iter().enumerate() {
        match slots.get(i) {
            Some(slot) => binding.mandatory.push(mandatory_argument(slot, token, base)),
            None => surplus_argument(token, pattern, base, binding),
        }
    }

    for slot in slots.iter().skip(tokens.len()) {
        let mut placeholder = ArgumentNode::placeholder(&slot.name, slot.value_type, cursor);
        placeholder
            .diagnostics
            .push(errors::missing_mandatory_argument(&slot.name, &slot.default_value, cursor));
        binding.mandatory.push(placeholder);
    }
}

fn mandatory_argument(slot: &MandatorySlot, token: &Token<'_>, base: usize) -> ArgumentNode {
    let span = token.span.offset(base);
    ArgumentNode {
        role: ArgumentRole::Mandatory,
        slot: slot.name.to_string(),
        value: token.text.to_string(),
        raw: token.raw.to_string(),
        span,
        value_span: span,
        value_type: Some(slot.value_type),
        is_placeholder: false,
        declared: true,
        diagnostics: Vec::new(),
    }
}

fn bind_optional(tokens: &[Token<'_>], pattern: &ArgumentPattern, base: usize, binding: &mut Binding) {
    for token in tokens {
        let Some((key, value)) = token.key_value() else {
            continue;
        };
        let Some(slot) = pattern.optional_slot(key) else {
            continue;
        };

        let mut arg = optional_argument(token, key, value, base);
        let repeated = binding.optional.iter().any(|prev| prev.declared && prev.slot == key);
        if repeated {
            arg.diagnostics.push(errors::duplicate_optional_key(key, arg.span));
        } else {
            arg.declared = true;
            arg.value_type = Some(slot.value_type);
        }
        binding.optional.push(arg);
    }
}

/// An optional argument, undeclared until the caller says otherwise.
fn optional_argument(token: &Token<'_>, key: &str, value: &str, base: usize) -> ArgumentNode {
    let span = token.span.offset(base);
    ArgumentNode {
        role: ArgumentRole::Optional,
        slot: key.to_string(),
        value: value.to_string(),
        raw: token.raw.to_string(),
        span,
        value_span: Span::new(span.start + token.value_offset_in_raw(), span.end),
        value_type: None,
        is_placeholder: false,
        declared: false,
        diagnostics: Vec::new(),
    }
}

fn surplus_argument(token: &Token<'_>, pattern: &ArgumentPattern, base: usize, binding: &mut Binding) {
    if let Some((key, value)) = token.key_value() {
        let mut arg = optional_argument(token, key, value, base);
        let diagnostic = if pattern.optional_slot(key).is_some() {
            errors::misplaced_optional(key, arg.span)
        } else {
            let declared: Vec<&str> = pattern.optional.iter().map(|slot| slot.key.as_ref()).collect();
            errors::unknown_optional_key(key, arg.span, &declared)
        };
        arg.diagnostics.push(diagnostic);
        binding.optional.push(arg);
        return;
    }

    let span = token.span.offset(base);
    binding.mandatory.push(ArgumentNode {
        role: ArgumentRole::Mandatory,
        slot: String::new(),
        value: token.text.to_string(),
        raw: token.raw.to_string(),
        span,
        value_span: span,
        value_type: None,
        is_placeholder: false,
        declared: false,
        diagnostics: vec![errors::unexpected_argument(token.raw, span)],
    });
}

/// Type-check a bound argument's value.
pub fn check_argument(arg: &ArgumentNode) -> Vec<Diagnostic> {
    let Some(value_type) = arg.value_type else {
        return Vec::new();
    };
    match value_type {
        ValueType::Reference(_) | ValueType::ReferenceList(_) => reference::check_references(arg),
        _ => match values::check_scalar(value_type, &arg.value) {
            Ok(()) => Vec::new(),
            Err(reason) => vec![errors::invalid_value(
                &arg.slot,
                &value_type.to_string(),
                reason,
                arg.value_span,
            )],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticCode;
    use crate::tokenizer::tokenize;
    use questline_core::lang::kinds;
    use questline_core::lang::lists::ListKind;

    fn bind_event(kind: &str, args: &str, base: usize) -> Binding {
        let pattern = &kinds::from_str(ListKind::Events, kind).unwrap().pattern;
        let tokens: Vec<_> = tokenize(args).collect();
        bind(args, &tokens, pattern, base)
    }

    fn codes(binding: &Binding) -> Vec<DiagnosticCode> {
        binding.diagnostics().iter().map(|d| d.code).collect()
    }

    #[test]
    fn test_tail_optionals_and_quoting() {
        let b = bind_event("spawn", r#" ZOMBIE 3 name:"Grim Reaper""#, 5);
        assert!(codes(&b).is_empty(), "{:?}", b.diagnostics());
        assert_eq!(b.mandatory.len(), 2);
        assert_eq!(b.mandatory[0].value, "ZOMBIE");
        assert_eq!(b.mandatory[0].span, Span::new(6, 12));
        assert_eq!(b.mandatory[1].value, "3");
        assert_eq!(b.optional.len(), 1);
        assert_eq!(b.optional[0].slot, "name");
        assert_eq!(b.optional[0].value, "Grim Reaper");
        assert_eq!(b.optional[0].span, Span::new(15, 33));
        assert_eq!(b.optional[0].value_span, Span::new(20, 33));
    }

    #[test]
    fn test_missing_argument_gets_placeholder_at_base() {
        let b = bind_event("teleport", "", 8);
        assert_eq!(b.mandatory.len(), 1);
        let placeholder = &b.mandatory[0];
        assert!(placeholder.is_placeholder);
        assert_eq!(placeholder.span, Span::empty(8));
        assert_eq!(placeholder.diagnostics[0].code, DiagnosticCode::MissingMandatoryArgument);
        assert_eq!(placeholder.diagnostics[0].span, Span::empty(8));
    }

    #[test]
    fn test_placeholders_follow_last_consumed_token() {
        let b = bind_event("spawn", " ZOMBIE", 5);
        assert!(b.mandatory[1].is_placeholder);
        assert_eq!(b.mandatory[1].span, Span::empty(12));
    }

    #[test]
    fn test_whitespace_preserving_tail() {
        let b = bind_event("notify", " Hello   there, traveller io:chat", 6);
        assert_eq!(b.mandatory.len(), 1);
        assert_eq!(b.mandatory[0].value, "Hello   there, traveller");
        assert_eq!(b.mandatory[0].span, Span::new(7, 31));
        assert_eq!(b.optional[0].value, "chat");
        assert!(codes(&b).is_empty());
    }

    #[test]
    fn test_optional_looking_text_is_bound_as_optional() {
        // The optional run wins even when the token was meant as message text.
        let b = bind_event("notify", " Switch to io:chat", 6);
        assert_eq!(b.mandatory[0].value, "Switch to");
        assert_eq!(b.optional.len(), 1);
        assert_eq!(b.optional[0].slot, "io");

        let b = bind_event("notify", " io:chat", 6);
        assert!(b.mandatory[0].is_placeholder);
        assert_eq!(codes(&b), vec![DiagnosticCode::MissingMandatoryArgument]);
    }

    #[test]
    fn test_head_optionals() {
        let b = bind_event("sudo", " op:true say hello there", 4);
        assert_eq!(b.optional.len(), 1);
        assert_eq!(b.optional[0].slot, "op");
        assert_eq!(b.mandatory[0].value, "say hello there");
        assert!(codes(&b).is_empty());

        let b = bind_event("sudo", " op:true", 4);
        assert!(b.mandatory[0].is_placeholder);
        assert_eq!(b.mandatory[0].span, Span::empty(12));
    }

    #[test]
    fn test_surplus_tokens_are_kept_undeclared() {
        let b = bind_event("give", " emerald extra foo:1 amount:5", 4);
        assert_eq!(b.mandatory.len(), 2);
        assert!(!b.mandatory[1].declared);
        assert_eq!(b.mandatory[1].value, "extra");
        assert_eq!(b.optional.len(), 2);
        assert_eq!(b.optional[0].slot, "foo");
        assert!(!b.optional[0].declared);
        assert!(b.optional[1].declared);
        assert_eq!(
            codes(&b),
            vec![DiagnosticCode::UnexpectedArgument, DiagnosticCode::UnknownOptionalKey]
        );
    }

    #[test]
    fn test_duplicate_optional_key() {
        let b = bind_event("give", " emerald amount:1 amount:2", 4);
        assert_eq!(b.optional.len(), 2);
        assert!(b.optional[0].declared);
        assert!(!b.optional[1].declared);
        assert_eq!(codes(&b), vec![DiagnosticCode::DuplicateOptionalKey]);
    }

    #[test]
    fn test_value_checks() {
        let b = bind_event("give", " emerald amount:lots", 4);
        assert_eq!(codes(&b), vec![DiagnosticCode::InvalidValue]);
        assert_eq!(b.diagnostics()[0].span, Span::new(20, 24));

        let b = bind_event("folder", " a,,b", 6);
        assert_eq!(codes(&b), vec![DiagnosticCode::EmptyReference]);
        assert_eq!(b.diagnostics()[0].span, Span::empty(9));

        let b = bind_event("folder", " a,b..c", 6);
        assert_eq!(codes(&b), vec![DiagnosticCode::MalformedReference]);
    }
}
