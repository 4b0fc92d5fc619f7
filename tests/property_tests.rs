//! Property-based tests for instruction parsing and reference resolution
//!
//! These tests use proptest to verify invariants across many randomly
//! generated instructions built from the builtin kinds.

use proptest::prelude::*;

use questline::document::YamlReader;
use questline::model::{Package, PackageName};
use questline::workspace::Workspace;
use questline_core::lang::kinds;
use questline_core::lang::lists::ListKind;
use questline_core::lang::table::Builtins;
use questline_syntax::ast::ArgumentNode;
use questline_syntax::instruction::{ArgumentRef, InstructionNode};
use questline_syntax::parser::parse_instruction;
use questline_syntax::reference::parse_reference;

// =============================================================================
// Strategies
// =============================================================================

fn list_strategy() -> impl Strategy<Value = ListKind> {
    prop::sample::select(ListKind::ALL.to_vec())
}

fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9;.,!_-]{1,6}",
        "(amount|name|conditions|events|delay|io|op|notify|equal|colour):[a-z0-9,._!-]{0,6}",
        "\"[a-z ]{0,6}\"",
        "'[a-z ]{0,6}'",
    ]
}

/// A builtin kind of `list` followed by arbitrary tokens.
fn instruction_strategy() -> impl Strategy<Value = (ListKind, String)> {
    list_strategy().prop_flat_map(|list| {
        let names: Vec<&'static str> = kinds::kinds(list).iter().map(|info| info.canonical).collect();
        (
            Just(list),
            prop::sample::select(names),
            prop::collection::vec(token_strategy(), 0..6),
            prop::sample::select(vec![" ", "  ", "\t"]),
        )
            .prop_map(|(list, kind, tokens, separator)| {
                let mut text = kind.to_string();
                for token in tokens {
                    text.push_str(separator);
                    text.push_str(&token);
                }
                (list, text)
            })
    })
}

/// Edit values, including ones that collide with YAML or with the instruction syntax.
fn value_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        token_strategy(),
        "#[a-z]{1,4}",
        "[a-z]{1,4} #[a-z]{1,4}",
        "[a-z]{1,4}:",
        "[a-z]{1,4}: [a-z]{1,4}",
        "[a-z]{1,4} (io|amount|conditions):[a-z]{1,4}",
        " {0,2}[a-z]{1,4} {1,3}[a-z]{0,4} {0,2}",
    ]
}

#[derive(Debug, Clone)]
enum EntryEdit {
    Position(usize, String),
    Key(&'static str, String),
    Remove(&'static str),
    Kind(&'static str),
}

fn entry_edit_strategy() -> impl Strategy<Value = EntryEdit> {
    let keys = || prop::sample::select(vec!["amount", "notify", "conditions", "io", "name"]);
    let event_kinds: Vec<&'static str> = kinds::kinds(ListKind::Events).iter().map(|info| info.canonical).collect();
    prop_oneof![
        (0usize..3, value_strategy()).prop_map(|(index, value)| EntryEdit::Position(index, value)),
        (keys(), value_strategy()).prop_map(|(key, value)| EntryEdit::Key(key, value)),
        keys().prop_map(EntryEdit::Remove),
        prop::sample::select(event_kinds).prop_map(EntryEdit::Kind),
    ]
}

/// One entry per scalar style.
const EDIT_FILE: &str = "\
events:
  reward: give emerald amount:5
  tp: 'teleport 1;2;3;world'
  say: \"notify hello there io:chat\"
  long: |
    give diamond
    amount:2
  next: kill
conditions:
  ready: tag started
";

// =============================================================================
// Helpers
// =============================================================================

/// Everything about an argument except where it sits.
fn shape(arg: &ArgumentNode) -> (String, String, String, bool, bool, Vec<&'static str>) {
    (
        arg.role.to_string(),
        arg.slot.clone(),
        arg.value.clone(),
        arg.is_placeholder,
        arg.declared,
        arg.diagnostics.iter().map(|d| d.code.as_str()).collect(),
    )
}

fn shapes(node: &InstructionNode) -> Vec<(String, String, String, bool, bool, Vec<&'static str>)> {
    node.arguments().into_iter().map(shape).collect()
}

// =============================================================================
// Instruction Properties
// =============================================================================

proptest! {
    /// Property: parse -> to_text -> parse binds every argument to the same slot with the same value
    #[test]
    fn round_trip_preserves_arguments((list, text) in instruction_strategy()) {
        let node = parse_instruction(list, &text, 0, &Builtins);
        let reparsed = parse_instruction(list, &node.to_text(), 0, &Builtins);
        prop_assert_eq!(shapes(&reparsed), shapes(&node));
        prop_assert_eq!(reparsed.to_text(), node.to_text());
    }

    /// Property: argument ranges are ordered, disjoint, and cover the source up to whitespace
    #[test]
    fn offsets_cover_the_source((list, text) in instruction_strategy(), base in 0usize..500) {
        let node = parse_instruction(list, &text, base, &Builtins);
        let local = |offset: usize| offset - base;

        let mut cursor = local(node.kind_span().end);
        prop_assert_eq!(&text[local(node.kind_span().start)..cursor], node.kind());
        for arg in node.arguments().into_iter().filter(|arg| !arg.is_placeholder) {
            let start = local(arg.span.start);
            let end = local(arg.span.end);
            prop_assert!(start >= cursor, "{:?} overlaps the previous argument", arg.raw);
            prop_assert!(text[cursor..start].chars().all(char::is_whitespace));
            prop_assert_eq!(&text[start..end], arg.raw.as_str());
            prop_assert!(arg.value_span.start >= arg.span.start && arg.value_span.end <= arg.span.end);
            cursor = end;
        }
        prop_assert!(text[cursor..].chars().all(char::is_whitespace));
    }

    /// Property: placeholders are zero-width and always explained by a diagnostic at the same offset
    #[test]
    fn placeholders_carry_diagnostics((list, text) in instruction_strategy()) {
        let node = parse_instruction(list, &text, 0, &Builtins);
        let diagnostics = node.diagnostics();
        for arg in node.arguments() {
            if arg.is_placeholder {
                prop_assert!(arg.span.is_empty());
                prop_assert!(diagnostics.iter().any(|d| d.span == arg.span));
            } else {
                prop_assert!(!arg.span.is_empty());
            }
        }
    }

    /// Property: an accepted edit leaves the package equal to a fresh read of its text, a rejected one
    /// leaves it untouched
    #[test]
    fn package_edits_match_reread(
        edits in prop::collection::vec(
            (prop::sample::select(vec!["reward", "tp", "say", "long", "next"]), entry_edit_strategy()),
            1..6,
        )
    ) {
        let mut package = Package::new(PackageName::parse("quest"), "quest");
        package.add_source("quest/main.yml", EDIT_FILE, &YamlReader, &Builtins);
        prop_assert_eq!(package.list(ListKind::Events).len(), 5);

        for (name, edit) in edits {
            let before = package.clone();
            let result = match &edit {
                EntryEdit::Position(index, value) => {
                    package.set_argument(ListKind::Events, name, ArgumentRef::Position(*index), value)
                }
                EntryEdit::Key(key, value) => package.set_argument(ListKind::Events, name, ArgumentRef::Key(key), value),
                EntryEdit::Remove(key) => package.remove_optional(ListKind::Events, name, key),
                EntryEdit::Kind(kind) => package.set_kind(ListKind::Events, name, kind, &Builtins),
            };
            match result {
                Ok(_) => prop_assert_eq!(
                    &package,
                    &package.reparsed(&YamlReader, &Builtins),
                    "after {:?} on {}:\n{}",
                    edit,
                    name,
                    package.sources()[0].text
                ),
                Err(_) => prop_assert_eq!(&package, &before, "rejected {:?} changed the package", edit),
            }
        }
    }

    /// Property: reference parsing is total and malformed input never yields a bare ID
    #[test]
    fn reference_parsing_is_total(text in "\\PC{0,16}") {
        let reference = parse_reference(&text);
        if reference.is_malformed() {
            prop_assert!(reference.bare_id.is_empty());
        } else {
            prop_assert!(!reference.bare_id.is_empty());
        }
    }

    /// Property: resolution never fails, and references into unknown packages resolve to nothing
    #[test]
    fn resolution_is_total(text in "[a-z_.!-]{0,12}", list in list_strategy()) {
        let mut package = Package::new(PackageName::parse("quest"), "quest");
        package.add_source("quest/main.yml", "events:\n  a: kill\nconditions:\n  b: tag x\n", &YamlReader, &Builtins);
        let mut workspace = Workspace::new(".");
        workspace.insert_package(package);

        let resolver = workspace.resolver();
        let origin = PackageName::parse("quest");
        let reference = parse_reference(&text);
        let resolution = resolver.resolve(&reference, &origin, list);

        let known = resolver
            .target_package(&reference, &origin)
            .is_some_and(|target| workspace.package(&target).is_some());
        if !known {
            prop_assert!(resolution.targets.is_empty());
        }
        if resolution.is_resolved() {
            prop_assert!(resolution.diagnostic.is_none());
            prop_assert_eq!(resolution.targets.len(), 1);
        }
    }
}
