//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fmt::Write as _;
use std::io::IsTerminal;
use std::path::Path;

use questline_core::lang::lists::ListKind;
use questline_core::lang::table::Builtins;
use questline_syntax::diagnostics::{Severity, line_info};
use questline_syntax::parser::parse_instruction;
use questline_syntax::tokenizer::tokenize;

use super::{CliError, CliResult, ExitCode, OutputFormat};
use crate::document::YamlReader;
use crate::model::PackageName;
use crate::report;
use crate::workspace::Workspace;

fn load(root: &Path) -> CliResult<Workspace> {
    Workspace::load_from_disk(root, &YamlReader, &Builtins).map_err(|e| CliError::failure(format!("Error: {e}")))
}

// ============================================================================
// check
// ============================================================================

/// Load a workspace and print its diagnostics.
pub fn check(root: &Path, format: OutputFormat, deny_warnings: bool) -> CliResult<ExitCode> {
    let workspace = load(root)?;
    let diagnostics = workspace.check();

    match format {
        OutputFormat::Human => print!("{}", report::render_human(&diagnostics, std::io::stdout().is_terminal())),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report::render_json(&diagnostics))
                .map_err(|e| CliError::failure(format!("Error: {e}")))?;
            println!("{json}");
        }
    }

    let errors = diagnostics
        .iter()
        .filter(|d| d.diagnostic.severity == Severity::Error)
        .count();
    let warnings = diagnostics.len() - errors;
    let packages = workspace.packages().count();
    if format == OutputFormat::Human {
        eprintln!("{packages} package(s) checked: {errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 || (deny_warnings && warnings > 0) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// tokens
// ============================================================================

/// Print the tokens and the bound instruction.
pub fn tokens(instruction: &str, list: ListKind) -> CliResult<ExitCode> {
    print!("{}", render_tokens(instruction, list));
    Ok(ExitCode::SUCCESS)
}

/// Token dump followed by the bound arguments and diagnostics.
pub fn render_tokens(instruction: &str, list: ListKind) -> String {
    let mut out = String::new();
    for token in tokenize(instruction) {
        let range = format!("{}..{}", token.span.start, token.span.end);
        let _ = write!(out, "{range:<8}{:?}", token.raw);
        if let Some((key, _)) = token.key_value() {
            let _ = write!(out, " key={key}");
        }
        out.push('\n');
    }

    let node = parse_instruction(list, instruction, 0, &Builtins);
    let known = if node.is_known_kind() { "" } else { " (unknown)" };
    let _ = writeln!(out, "{} {}{}", list, node.kind(), known);
    for arg in node.arguments() {
        let slot = if arg.slot.is_empty() { "_" } else { arg.slot.as_str() };
        let _ = write!(out, "  {} {} = {:?} @{}..{}", arg.role, slot, arg.value, arg.span.start, arg.span.end);
        if arg.is_placeholder {
            out.push_str(" placeholder");
        }
        out.push('\n');
    }
    for diagnostic in node.diagnostics() {
        let _ = writeln!(out, "  {} @{}..{}", diagnostic, diagnostic.span.start, diagnostic.span.end);
    }
    out
}

// ============================================================================
// resolve
// ============================================================================

/// Resolve `id` as if written in `package` and print the targets.
pub fn resolve(root: &Path, package: &str, list: ListKind, id: &str) -> CliResult<ExitCode> {
    let workspace = load(root)?;
    let origin = PackageName::parse(package);
    if workspace.package(&origin).is_none() {
        return Err(CliError::failure(format!("Error: no package named '{package}' under {}", root.display())));
    }

    let resolution = workspace.resolver().resolve_text(id, &origin, list);
    if let Some(diagnostic) = &resolution.diagnostic {
        eprintln!("{diagnostic}");
    }
    for target in &resolution.targets {
        let entry = target.entry;
        let Some(source) = target.package.source(entry.source) else {
            continue;
        };
        let (line, column, _) = line_info(&source.text, entry.name_span.start);
        println!(
            "{}:{}:{}: {}.{} = {}",
            source.path.display(),
            line,
            column,
            target.package.name(),
            target.name,
            entry.instruction.to_text()
        );
    }

    if resolution.is_resolved() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tokens() {
        insta::assert_snapshot!(render_tokens("give emerald amount:lots", ListKind::Events), @r#"
        0..4    "give"
        5..12   "emerald"
        13..24  "amount:lots" key=amount
        events give
          mandatory item = "emerald" @5..12
          optional amount = "lots" @13..24
          error[invalid-value]: Invalid value for 'amount': expected a whole number @20..24
        "#);
    }
}
