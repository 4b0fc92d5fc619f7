//! The instruction tree: one kind plus its bound arguments, with exact source offsets and in-place edits.
//!
//! Every mutating operation returns the [`TextEdit`] that performs it on the file text. The node updates its own
//! offsets; offsets of *other* nodes in the same file are the caller's concern (see
//! [`InstructionNode::shift`]).
//!
//! ## Notes
//! - Placeholders are never serialized. Filling one inserts ` value` at its offset.
//! - [`InstructionNode::to_text`] writes arguments in source order, so re-parsing the output binds every
//!   argument to the same slot.
//! - Argument edits are checked by binding the edited text again. A value that would land in another slot
//!   (`amount:5` as an item, `text io:chat` as a message) is quoted, or rejected with [`EditError::Ambiguous`].

use std::borrow::Cow;

use questline_core::lang::lists::ListKind;
use questline_core::lang::patterns::{ArgumentPattern, OptionalPosition};
use questline_core::lang::table::PatternLookup;
use questline_core::lang::values::ValueType;

use crate::ast::{ArgumentNode, ArgumentRole, Span, TextEdit, shift_position};
use crate::binder::check_argument;
use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::parser;
use crate::reference::{self, ReferenceSite};
use crate::tokenizer;

/// Select an argument of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentRef<'a> {
    /// Mandatory argument by position.
    Position(usize),
    /// Mandatory argument by slot name.
    Slot(&'a str),
    /// Optional argument by key.
    Key(&'a str),
}

/// Why an edit could not be performed. The node is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("'{kind}' has no mandatory argument '{slot}'")]
    UnknownSlot { kind: String, slot: String },
    #[error("'{kind}' takes {len} mandatory arguments, position {index} is out of range")]
    PositionOutOfRange { kind: String, index: usize, len: usize },
    #[error("'{kind}' has no optional argument '{key}'")]
    UnknownKey { kind: String, key: String },
    #[error("optional argument '{key}' is not set")]
    MissingOptional { key: String },
    #[error("cannot set '{slot}' while the earlier argument '{missing}' is missing")]
    PrecedingSlotMissing { slot: String, missing: String },
    #[error("values cannot span multiple lines")]
    MultilineValue,
    #[error("value needs quoting but contains both quote characters")]
    Unquotable,
    #[error("'{value}' would be read back as a different argument")]
    Ambiguous { value: String },
    #[error("'{0}' is not a valid kind name")]
    InvalidKind(String),
}

/// A parsed instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionNode {
    pub(crate) list: ListKind,
    pub(crate) kind: String,
    pub(crate) kind_span: Span,
    pub(crate) known_kind: bool,
    pub(crate) pattern: ArgumentPattern,
    pub(crate) mandatory: Vec<ArgumentNode>,
    pub(crate) optional: Vec<ArgumentNode>,
    pub(crate) span: Span,
    /// Node-level diagnostics (empty instruction, unknown kind).
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl InstructionNode {
    pub fn list(&self) -> ListKind {
        self.list
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn kind_span(&self) -> Span {
        self.kind_span
    }

    /// `false` for kinds the pattern lookup did not know (arguments are then kept unchecked).
    pub fn is_known_kind(&self) -> bool {
        self.known_kind
    }

    pub fn pattern(&self) -> &ArgumentPattern {
        &self.pattern
    }

    /// From the start of the kind to the end of the last argument.
    pub fn span(&self) -> Span {
        self.span
    }

    pub fn mandatory(&self) -> &[ArgumentNode] {
        &self.mandatory
    }

    /// All optional arguments in source order, including undeclared ones.
    pub fn optional_args(&self) -> &[ArgumentNode] {
        &self.optional
    }

    /// The declared optional argument for `key`.
    pub fn optional(&self, key: &str) -> Option<&ArgumentNode> {
        self.optional.iter().find(|arg| arg.declared && arg.slot == key)
    }

    pub fn has_optional(&self, key: &str) -> bool {
        self.optional(key).is_some()
    }

    pub fn argument(&self, target: ArgumentRef<'_>) -> Option<&ArgumentNode> {
        match target {
            ArgumentRef::Position(index) => self.mandatory.get(index).filter(|arg| arg.declared),
            ArgumentRef::Slot(name) => self.mandatory.iter().find(|arg| arg.declared && arg.slot == name),
            ArgumentRef::Key(key) => self.optional(key),
        }
    }

    /// Every argument in source order (placeholders included).
    pub fn arguments(&self) -> Vec<&ArgumentNode> {
        let mut all: Vec<&ArgumentNode> = self.mandatory.iter().chain(&self.optional).collect();
        all.sort_by_key(|arg| (arg.span.start, !arg.is_placeholder));
        all
    }

    /// The argument under a cursor at `offset`, preferring real tokens over placeholders.
    pub fn argument_at(&self, offset: usize) -> Option<&ArgumentNode> {
        let args = self.arguments();
        args.iter()
            .find(|arg| !arg.is_placeholder && arg.span.contains(offset))
            .or_else(|| args.iter().find(|arg| arg.is_placeholder && arg.span.start == offset))
            .copied()
    }

    /// All diagnostics of the node and its arguments, ordered by position.
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        let mut all: Vec<&Diagnostic> = self
            .diagnostics
            .iter()
            .chain(self.mandatory.iter().chain(&self.optional).flat_map(|arg| &arg.diagnostics))
            .collect();
        all.sort_by_key(|d| d.span);
        all
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics().iter().any(|d| d.is_error())
    }

    /// ID references held by reference-typed arguments.
    pub fn references(&self) -> Vec<ReferenceSite> {
        self.mandatory
            .iter()
            .chain(&self.optional)
            .flat_map(reference::references_in)
            .collect()
    }

    /// Re-serialize the instruction.
    pub fn to_text(&self) -> String {
        let mut text = self.kind.clone();
        for arg in self.arguments() {
            if arg.is_placeholder {
                continue;
            }
            text.push(' ');
            text.push_str(&arg.raw);
        }
        text
    }

    /// Move every offset at or past `at` by `delta`, after an edit elsewhere in the same file.
    pub fn shift(&mut self, at: usize, delta: isize) {
        self.kind_span = self.kind_span.shifted(at, delta);
        self.span = self.span.shifted(at, delta);
        for diagnostic in &mut self.diagnostics {
            diagnostic.span = diagnostic.span.shifted(at, delta);
        }
        for arg in self.mandatory.iter_mut().chain(self.optional.iter_mut()) {
            arg.shift(at, delta);
        }
    }

    // ------------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------------

    /// Replace the kind, discarding every argument.
    ///
    /// The new kind's mandatory slots become placeholders right after it. Setting the current kind is a no-op
    /// edit.
    pub fn set_kind(&mut self, kind: &str, lookup: &dyn PatternLookup) -> Result<TextEdit, EditError> {
        let valid = !kind.is_empty()
            && !kind.chars().any(char::is_whitespace)
            && tokenizer::quote(kind).is_some_and(|quoted| quoted == kind);
        if !valid {
            return Err(EditError::InvalidKind(kind.to_string()));
        }
        if kind == self.kind {
            return Ok(TextEdit::new(Span::empty(self.kind_span.end), ""));
        }

        let edit = TextEdit::new(Span::new(self.kind_span.start, self.span.end), kind);
        let kind_span = Span::new(self.kind_span.start, self.kind_span.start + kind.len());
        *self = parser::bind_instruction(self.list, kind, kind_span, "", kind_span.end, lookup);
        Ok(edit)
    }

    /// Set (or fill in, or add) an argument's value.
    ///
    /// ## Errors
    /// - [`EditError::UnknownSlot`] / [`EditError::PositionOutOfRange`] / [`EditError::UnknownKey`] if the
    ///   pattern has no such slot.
    /// - [`EditError::PrecedingSlotMissing`] when filling a placeholder while an earlier slot is still missing.
    /// - [`EditError::MultilineValue`] and [`EditError::Unquotable`] for values that cannot be written back.
    /// - [`EditError::Ambiguous`] when the written text would bind to a different argument.
    pub fn set_argument(&mut self, target: ArgumentRef<'_>, value: &str) -> Result<TextEdit, EditError> {
        if value.contains(['\n', '\r']) {
            return Err(EditError::MultilineValue);
        }
        match target {
            ArgumentRef::Position(index) => {
                let len = self.pattern.mandatory.len();
                if index >= len {
                    return Err(EditError::PositionOutOfRange {
                        kind: self.kind.clone(),
                        index,
                        len,
                    });
                }
                self.set_mandatory(index, value)
            }
            ArgumentRef::Slot(name) => {
                let index = self
                    .pattern
                    .mandatory_index(name)
                    .ok_or_else(|| EditError::UnknownSlot {
                        kind: self.kind.clone(),
                        slot: name.to_string(),
                    })?;
                self.set_mandatory(index, value)
            }
            ArgumentRef::Key(key) => self.set_optional(key, value),
        }
    }

    fn set_mandatory(&mut self, index: usize, value: &str) -> Result<TextEdit, EditError> {
        if let Some(missing) = self.mandatory[..index].iter().find(|arg| arg.is_placeholder) {
            return Err(EditError::PrecedingSlotMissing {
                slot: self.mandatory[index].slot.clone(),
                missing: missing.slot.clone(),
            });
        }

        let preserving = self.pattern.preserve_whitespace_in_last_mandatory && index + 1 == self.pattern.mandatory.len();
        let verbatim = (preserving && is_verbatim_tail(value)).then(|| value.to_string());
        let quoted = tokenizer::quote(value)
            .map(Cow::into_owned)
            .filter(|quoted| verbatim.as_ref() != Some(quoted));
        if verbatim.is_none() && quoted.is_none() {
            return Err(EditError::Unquotable);
        }

        for raw in verbatim.into_iter().chain(quoted) {
            if let Some(edit) = self.try_write(|node| node.write_mandatory(index, value, raw)) {
                return Ok(edit);
            }
        }
        Err(EditError::Ambiguous { value: value.to_string() })
    }

    fn write_mandatory(&mut self, index: usize, value: &str, raw: String) -> TextEdit {
        let target = &self.mandatory[index];
        let (edit, start) = if target.is_placeholder {
            let at = target.span.start;
            (TextEdit::new(Span::empty(at), format!(" {raw}")), at + 1)
        } else {
            (TextEdit::new(target.span, raw.as_str()), target.span.start)
        };

        self.shift_except(edit.span.end, edit.delta(), Some((ArgumentRole::Mandatory, index)), false);
        let arg = &mut self.mandatory[index];
        arg.span = Span::new(start, start + raw.len());
        arg.value_span = arg.span;
        arg.value = value.to_string();
        arg.raw = raw;
        arg.is_placeholder = false;
        arg.diagnostics = check_argument(arg);
        edit
    }

    fn set_optional(&mut self, key: &str, value: &str) -> Result<TextEdit, EditError> {
        let Some(slot) = self.pattern.optional_slot(key) else {
            return Err(EditError::UnknownKey {
                kind: self.kind.clone(),
                key: key.to_string(),
            });
        };
        let value_type = slot.value_type;
        let quoted = tokenizer::quote(value).ok_or(EditError::Unquotable)?;
        let raw = format!("{key}:{quoted}");
        self.try_write(|node| node.write_optional(key, value, value_type, raw))
            .ok_or_else(|| EditError::Ambiguous { value: value.to_string() })
    }

    fn write_optional(&mut self, key: &str, value: &str, value_type: ValueType, raw: String) -> TextEdit {
        let value_offset = key.len() + 1;

        if let Some(index) = self.optional.iter().position(|arg| arg.declared && arg.slot == key) {
            let start = self.optional[index].span.start;
            let edit = TextEdit::new(self.optional[index].span, raw.as_str());
            self.shift_except(edit.span.end, edit.delta(), Some((ArgumentRole::Optional, index)), false);
            let arg = &mut self.optional[index];
            arg.span = Span::new(start, start + raw.len());
            arg.value_span = Span::new(start + value_offset, arg.span.end);
            arg.value = value.to_string();
            arg.raw = raw;
            arg.diagnostics = check_argument(arg);
            return edit;
        }

        let (at, placeholders_stay) = match self.pattern.optional_position {
            OptionalPosition::Tail => (self.span.end, true),
            OptionalPosition::Head => {
                let at = self
                    .optional
                    .iter()
                    .map(|arg| arg.span.end)
                    .max()
                    .unwrap_or(self.kind_span.end);
                (at, false)
            }
        };
        let edit = TextEdit::new(Span::empty(at), format!(" {raw}"));
        self.shift_except(at, edit.delta(), None, placeholders_stay);

        let start = at + 1;
        let mut arg = ArgumentNode {
            role: ArgumentRole::Optional,
            slot: key.to_string(),
            value: value.to_string(),
            span: Span::new(start, start + raw.len()),
            value_span: Span::new(start + value_offset, start + raw.len()),
            raw,
            value_type: Some(value_type),
            is_placeholder: false,
            declared: true,
            diagnostics: Vec::new(),
        };
        arg.diagnostics = check_argument(&arg);
        self.optional.push(arg);
        self.optional.sort_by_key(|arg| arg.span.start);
        edit
    }

    /// Remove a declared optional argument together with the whitespace before it.
    ///
    /// A later duplicate of the same key, if any, becomes the declared one.
    pub fn remove_optional(&mut self, key: &str) -> Result<TextEdit, EditError> {
        let index = self
            .optional
            .iter()
            .position(|arg| arg.declared && arg.slot == key)
            .ok_or_else(|| EditError::MissingOptional { key: key.to_string() })?;
        let raw = self.optional[index].raw.clone();
        self.try_write(|node| node.drop_optional(index))
            .ok_or(EditError::Ambiguous { value: raw })
    }

    fn drop_optional(&mut self, index: usize) -> TextEdit {
        let removed = self.optional.remove(index);
        let key = removed.slot.as_str();

        let previous_end = self
            .mandatory
            .iter()
            .chain(&self.optional)
            .map(|arg| arg.span.end)
            .filter(|end| *end <= removed.span.start)
            .chain(std::iter::once(self.kind_span.end))
            .max()
            .unwrap_or(self.kind_span.end);
        let edit = TextEdit::new(Span::new(previous_end, removed.span.end), "");
        self.shift_except(edit.span.end, edit.delta(), None, false);

        let value_type = self.pattern.optional_slot(key).map(|slot| slot.value_type);
        if let Some(duplicate) = self.optional.iter_mut().find(|arg| {
            !arg.declared
                && arg.slot == key
                && arg
                    .diagnostics
                    .iter()
                    .any(|d| d.code == DiagnosticCode::DuplicateOptionalKey)
        }) {
            duplicate.declared = true;
            duplicate.value_type = value_type;
            duplicate.diagnostics = check_argument(duplicate);
        }
        edit
    }

    /// Apply `write` to a copy and keep the copy only if its text binds back to the same node.
    fn try_write(&mut self, write: impl FnOnce(&mut Self) -> TextEdit) -> Option<TextEdit> {
        let mut edited = self.clone();
        let edit = write(&mut edited);
        if !edited.reads_back() {
            tracing::debug!(kind = %self.kind, text = %edit.new_text, "edit would not read back");
            return None;
        }
        *self = edited;
        Some(edit)
    }

    fn reads_back(&self) -> bool {
        let Some(args) = self.argument_text() else {
            return false;
        };
        let lookup = FixedPattern(self.known_kind.then_some(&self.pattern));
        let rebound = parser::bind_instruction(self.list, &self.kind, self.kind_span, &args, self.kind_span.end, &lookup);
        rebound == *self
    }

    /// The text after the kind as the argument raws lay it out, with blanks between them.
    fn argument_text(&self) -> Option<String> {
        let mut args: Vec<&ArgumentNode> = self
            .mandatory
            .iter()
            .chain(&self.optional)
            .filter(|arg| !arg.is_placeholder)
            .collect();
        args.sort_by_key(|arg| arg.span.start);

        let mut text = String::new();
        for arg in args {
            let gap = arg.span.start.checked_sub(self.kind_span.end + text.len())?;
            if arg.raw.len() != arg.span.len() {
                return None;
            }
            text.extend(std::iter::repeat_n(' ', gap));
            text.push_str(&arg.raw);
        }
        Some(text)
    }

    /// Shift offsets after a local edit, skipping the edited argument.
    ///
    /// With `placeholders_stay`, placeholders sitting exactly at `at` keep their offset (text was inserted
    /// after them).
    fn shift_except(&mut self, at: usize, delta: isize, except: Option<(ArgumentRole, usize)>, placeholders_stay: bool) {
        self.span.end = shift_position(self.span.end, at, delta);
        let roles = [
            (ArgumentRole::Mandatory, &mut self.mandatory),
            (ArgumentRole::Optional, &mut self.optional),
        ];
        for (role, args) in roles {
            for (i, arg) in args.iter_mut().enumerate() {
                if except == Some((role, i)) {
                    continue;
                }
                if placeholders_stay && arg.is_placeholder && arg.span.start == at {
                    continue;
                }
                arg.shift(at, delta);
            }
        }
    }
}

/// Answers every kind with the pattern a node was bound with.
struct FixedPattern<'p>(Option<&'p ArgumentPattern>);

impl PatternLookup for FixedPattern<'_> {
    fn pattern(&self, _list: ListKind, _kind: &str) -> Option<&ArgumentPattern> {
        self.0
    }
}

/// A free-text tail value that can be written without quotes and still bind back to exactly itself.
fn is_verbatim_tail(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && value.contains(char::is_whitespace)
        && tokenizer::tokenize(value).all(|token| token.raw == token.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_instruction;
    use questline_core::lang::table::Builtins;

    fn event(text: &str) -> InstructionNode {
        parse_instruction(ListKind::Events, text, 0, &Builtins)
    }

    fn apply(text: &str, edit: &TextEdit) -> String {
        let mut text = text.to_string();
        assert!(edit.apply(&mut text));
        text
    }

    #[test]
    fn test_fill_placeholder_right_after_kind() {
        let mut node = event("teleport");
        let edit = node.set_argument(ArgumentRef::Position(0), "1;2;3;world").unwrap();
        assert_eq!(edit, TextEdit::new(Span::empty(8), " 1;2;3;world"));
        let text = apply("teleport", &edit);
        assert_eq!(text, "teleport 1;2;3;world");
        assert!(node.diagnostics().is_empty());
        assert_eq!(node.mandatory()[0].span, Span::new(9, 20));
        assert_eq!(node.to_text(), text);
        assert_eq!(node.span(), Span::new(0, 20));
    }

    #[test]
    fn test_fill_placeholder_before_optionals() {
        let mut node = event("teleport conditions:ready");
        assert_eq!(node.optional("conditions").unwrap().span, Span::new(9, 25));
        let edit = node.set_argument(ArgumentRef::Slot("location"), "1;2;3;world").unwrap();
        let text = apply("teleport conditions:ready", &edit);
        assert_eq!(text, "teleport 1;2;3;world conditions:ready");
        assert_eq!(node.optional("conditions").unwrap().span, Span::new(21, 37));
        assert_eq!(node.to_text(), text);
    }

    #[test]
    fn test_slots_fill_in_order() {
        let mut node = event("spawn");
        assert_eq!(
            node.set_argument(ArgumentRef::Position(1), "3"),
            Err(EditError::PrecedingSlotMissing {
                slot: "count".into(),
                missing: "entity".into()
            })
        );
        let first = node.set_argument(ArgumentRef::Position(0), "ZOMBIE").unwrap();
        let text = apply("spawn", &first);
        assert_eq!(node.mandatory()[1].span, Span::empty(12));
        let second = node.set_argument(ArgumentRef::Position(1), "3").unwrap();
        assert_eq!(apply(&text, &second), "spawn ZOMBIE 3");
        assert_eq!(node.to_text(), "spawn ZOMBIE 3");
    }

    #[test]
    fn test_replace_mandatory_shifts_optionals() {
        let source = r#"spawn ZOMBIE 3 name:"Grim Reaper""#;
        let mut node = event(source);
        let edit = node.set_argument(ArgumentRef::Position(0), "SKELETON").unwrap();
        let text = apply(source, &edit);
        assert_eq!(text, r#"spawn SKELETON 3 name:"Grim Reaper""#);
        let name = node.optional("name").unwrap();
        assert_eq!(&text[name.span.start..name.span.end], r#"name:"Grim Reaper""#);
        assert_eq!(node.span().end, text.len());
    }

    #[test]
    fn test_set_optional_quotes_and_inserts() {
        let mut node = event("spawn ZOMBIE 3");
        let edit = node.set_argument(ArgumentRef::Key("name"), "Grim Reaper").unwrap();
        let text = apply("spawn ZOMBIE 3", &edit);
        assert_eq!(text, r#"spawn ZOMBIE 3 name:"Grim Reaper""#);
        assert_eq!(node.optional("name").unwrap().value, "Grim Reaper");
        assert_eq!(node.to_text(), text);

        let edit = node.set_argument(ArgumentRef::Key("name"), "Bob").unwrap();
        assert_eq!(apply(&text, &edit), "spawn ZOMBIE 3 name:Bob");

        assert!(matches!(
            node.set_argument(ArgumentRef::Key("colour"), "red"),
            Err(EditError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_optional_insert_keeps_placeholder_in_front() {
        let mut node = event("give");
        let edit = node.set_argument(ArgumentRef::Key("amount"), "5").unwrap();
        let text = apply("give", &edit);
        assert_eq!(text, "give amount:5");
        assert_eq!(node.mandatory()[0].span, Span::empty(4));

        let edit = node.set_argument(ArgumentRef::Position(0), "emerald").unwrap();
        let text = apply(&text, &edit);
        assert_eq!(text, "give emerald amount:5");
        assert_eq!(node.optional("amount").unwrap().span, Span::new(13, 21));
    }

    #[test]
    fn test_remove_optional_and_promote_duplicate() {
        let source = "give emerald amount:1 amount:2";
        let mut node = event(source);
        let edit = node.remove_optional("amount").unwrap();
        let text = apply(source, &edit);
        assert_eq!(text, "give emerald amount:2");
        let amount = node.optional("amount").unwrap();
        assert_eq!(amount.value, "2");
        assert_eq!(amount.span, Span::new(13, 21));
        assert!(node.diagnostics().is_empty());

        assert!(matches!(node.remove_optional("notify"), Err(EditError::MissingOptional { .. })));
    }

    #[test]
    fn test_set_kind_resets_arguments() {
        let source = "give emerald amount:5";
        let mut node = event(source);
        let edit = node.set_kind("teleport", &Builtins).unwrap();
        assert_eq!(apply(source, &edit), "teleport");
        assert_eq!(node.kind(), "teleport");
        assert!(node.mandatory()[0].is_placeholder);
        assert_eq!(node.mandatory()[0].span, Span::empty(8));

        assert!(node.set_kind("teleport", &Builtins).unwrap().is_noop());
        assert!(node.set_kind("two words", &Builtins).is_err());
    }

    #[test]
    fn test_preserved_tail_is_written_verbatim() {
        let mut node = event("notify hi");
        let edit = node.set_argument(ArgumentRef::Position(0), "Hello there, traveller").unwrap();
        assert_eq!(apply("notify hi", &edit), "notify Hello there, traveller");
        assert_eq!(node.mandatory()[0].value, "Hello there, traveller");
    }

    #[test]
    fn test_key_value_text_is_not_written_into_a_mandatory_slot() {
        let source = "give emerald";
        let mut node = event(source);
        let before = node.clone();
        assert_eq!(
            node.set_argument(ArgumentRef::Position(0), "amount:5"),
            Err(EditError::Ambiguous { value: "amount:5".into() })
        );
        assert_eq!(node, before);

        let edit = node.set_argument(ArgumentRef::Position(0), "diamond").unwrap();
        let text = apply(source, &edit);
        assert_eq!(parse_instruction(ListKind::Events, &text, 0, &Builtins), node);
    }

    #[test]
    fn test_tail_ending_in_an_optional_is_quoted() {
        let mut node = event("notify hi");
        let edit = node.set_argument(ArgumentRef::Position(0), "Switch to io:chat").unwrap();
        let text = apply("notify hi", &edit);
        assert_eq!(text, r#"notify "Switch to io:chat""#);
        assert_eq!(node.mandatory()[0].value, "Switch to io:chat");
        assert!(node.optional("io").is_none());
        assert_eq!(parse_instruction(ListKind::Events, &text, 0, &Builtins), node);
    }

    #[test]
    fn test_edits_match_a_fresh_parse() {
        let source = "give emerald amount:1 amount:2";
        let mut node = event(source);
        let mut text = source.to_string();
        let edits = [
            node.set_argument(ArgumentRef::Key("conditions"), "a,b").unwrap(),
            node.remove_optional("amount").unwrap(),
            node.set_argument(ArgumentRef::Position(0), "diamond block").unwrap(),
        ];
        for edit in &edits {
            text = apply(&text, edit);
        }
        assert_eq!(text, r#"give "diamond block" amount:2 conditions:a,b"#);
        assert_eq!(parse_instruction(ListKind::Events, &text, 0, &Builtins), node);
    }

    #[test]
    fn test_argument_at_prefers_tokens() {
        let node = event("give emerald amount:5");
        assert_eq!(node.argument_at(7).map(|a| a.slot.as_str()), Some("item"));
        assert_eq!(node.argument_at(15).map(|a| a.slot.as_str()), Some("amount"));
        assert!(node.argument_at(2).is_none());
    }
}
