#![forbid(unsafe_code)]
//! questline: packages of quest instructions, parsed with exact offsets and cross-referenced.
//!
//! The instruction language itself lives in two sibling crates: `questline_core` holds the vocabulary (list
//! kinds, value types, the builtin kind registry) and `questline_syntax` the tokenizer, binder, instruction tree
//! and reference parser. This crate owns everything above a single instruction: documents, element lists,
//! packages, workspaces, reference resolution, reporting and the CLI.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: Broken internal bookkeeping (an edit that no longer fits its file, a rename that
//!   overwrites an entry) is a `debug_assert!`, never a user-facing error.

pub mod cli;
pub mod document;
pub mod model;
pub mod report;
pub mod resolve;
pub mod workspace;

pub use document::{DocumentReader, YamlReader};
pub use model::{ElementList, ListEntry, ModelError, Package, PackageName};
pub use resolve::SymbolResolver;
pub use workspace::Workspace;
