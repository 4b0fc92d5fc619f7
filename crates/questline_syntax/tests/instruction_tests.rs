//! Snapshot tests for instruction parsing.
//!
//! Each snapshot lists the kind, every argument in source order and every diagnostic with its absolute span.
//!
//! Review changes: `cargo insta review`

use std::fmt::Write as _;

use questline_core::lang::lists::ListKind;
use questline_core::lang::table::Builtins;
use questline_syntax::ast::Span;
use questline_syntax::instruction::InstructionNode;
use questline_syntax::parser::parse_instruction;

fn render(node: &InstructionNode) -> String {
    let kind_span = node.kind_span();
    let mut out = format!("{} @{}..{}", node.kind(), kind_span.start, kind_span.end);
    for arg in node.arguments() {
        let state = if arg.is_placeholder {
            " placeholder"
        } else if !arg.declared {
            " undeclared"
        } else {
            ""
        };
        let slot = if arg.slot.is_empty() { "_" } else { arg.slot.as_str() };
        let _ = write!(
            out,
            "\n  {} {} = {:?} @{}..{}{}",
            arg.role, slot, arg.value, arg.span.start, arg.span.end, state
        );
    }
    for diagnostic in node.diagnostics() {
        let _ = write!(
            out,
            "\n  {} {} @{}..{}",
            diagnostic.severity, diagnostic.code, diagnostic.span.start, diagnostic.span.end
        );
    }
    out
}

fn event(source: &str) -> InstructionNode {
    parse_instruction(ListKind::Events, source, 0, &Builtins)
}

#[test]
fn test_quoted_optional_value() {
    insta::assert_snapshot!(render(&event(r#"spawn ZOMBIE 3 name:"Grim Reaper""#)), @r#"
    spawn @0..5
      mandatory entity = "ZOMBIE" @6..12
      mandatory count = "3" @13..14
      optional name = "Grim Reaper" @15..33
    "#);
}

#[test]
fn test_missing_argument_right_after_kind() {
    insta::assert_snapshot!(render(&event("teleport")), @r#"
    teleport @0..8
      mandatory location = "" @8..8 placeholder
      error missing-mandatory-argument @8..8
    "#);
}

#[test]
fn test_free_text_keeps_whitespace() {
    insta::assert_snapshot!(render(&event("notify Hello   world io:chat")), @r#"
    notify @0..6
      mandatory message = "Hello   world" @7..20
      optional io = "chat" @21..28
    "#);
}

#[test]
fn test_head_optionals() {
    insta::assert_snapshot!(render(&event("sudo op:true say  hi")), @r#"
    sudo @0..4
      optional op = "true" @5..12
      mandatory command = "say  hi" @13..20
    "#);
}

#[test]
fn test_surplus_and_invalid_values() {
    insta::assert_snapshot!(render(&event("give emerald extra foo:1 amount:lots")), @r#"
    give @0..4
      mandatory item = "emerald" @5..12
      mandatory _ = "extra" @13..18 undeclared
      optional foo = "1" @19..24 undeclared
      optional amount = "lots" @25..36
      warning unexpected-argument @13..18
      warning unknown-optional-key @19..24
      error invalid-value @32..36
    "#);
}

#[test]
fn test_round_trip_rebinds_identically() {
    for source in [
        r#"spawn ZOMBIE 3 name:"Grim Reaper""#,
        "give emerald extra foo:1 amount:lots",
        "sudo op:true say  hi",
        "notify 'quoted message' io:chat conditions:a,b",
        "folder first,second delay:5 period:1",
    ] {
        let node = event(source);
        let reparsed = event(&node.to_text());
        assert_eq!(render(&reparsed), render(&node), "{source}");
    }
}

#[test]
fn test_references_carry_absolute_offsets() {
    let node = parse_instruction(ListKind::Events, "folder a,_.b,!-sub.c delay:5", 40, &Builtins);
    let refs = node.references();
    assert_eq!(refs.len(), 3);
    assert!(refs.iter().all(|site| site.target == ListKind::Events));

    assert_eq!(refs[0].reference.bare_id, "a");
    assert_eq!(refs[0].reference.span, Span::new(47, 48));

    assert_eq!(refs[1].reference.parent_levels, 1);
    assert_eq!(refs[1].reference.span, Span::new(49, 52));

    let third = &refs[2].reference;
    assert!(third.negated);
    assert!(!third.is_absolute);
    assert_eq!(third.segments, vec!["sub"]);
    assert_eq!(third.span, Span::new(53, 60));
    assert_eq!(third.id_span(), Span::new(59, 60));
}

#[test]
fn test_condition_references_in_events() {
    let node = event("give emerald conditions:!quest-intro.started,ready");
    let refs = node.references();
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0].target, ListKind::Conditions);
    assert_eq!(refs[0].slot, "conditions");
    assert_eq!(refs[0].reference.segments, vec!["quest", "intro"]);
    assert!(node.diagnostics().is_empty());
}
