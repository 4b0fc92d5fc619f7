//! Layering guardrails between the workspace crates.
//!
//! `questline_core` is pure vocabulary and must stay dependency-free. `questline_syntax` parses single
//! instructions and must not pull in the application stack (CLI, rendering, JSON).

/// Dependency names listed in the `[dependencies]` table of a manifest.
fn dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }
        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let manifest = include_str!("../crates/questline_core/Cargo.toml");
    assert_eq!(dependencies(manifest), Vec::<String>::new());
}

#[test]
fn syntax_does_not_depend_on_the_application_stack() {
    let manifest = include_str!("../crates/questline_syntax/Cargo.toml");
    for name in dependencies(manifest) {
        assert!(
            !matches!(name.as_str(), "clap" | "miette" | "serde_json" | "tracing-subscriber" | "questline"),
            "`{name}` must not appear in questline_syntax's [dependencies]"
        );
    }
}
