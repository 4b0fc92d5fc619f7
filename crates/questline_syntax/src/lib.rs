//! Shared syntax frontend for the questline instruction language: tokenizer, argument binder, instruction tree,
//! ID references, diagnostics.
//!
//! An *instruction* is a single scalar such as `give emerald amount:5 conditions:has_tag`. This crate turns that
//! text into a position-tracked [`instruction::InstructionNode`] whose every argument knows its exact source range,
//! so editors can underline, hover and rewrite individual tokens without re-serializing anything else.
//!
//! ## Notes
//! - This crate is “syntax-only”: it does not know about files, packages or reference targets. Element lists and
//!   resolution live in the `questline` crate.
//! - Argument shapes come from `questline_core::lang` through the [`questline_core::lang::table::PatternLookup`]
//!   trait.
//! - Nothing here panics or returns `Err` on malformed *input*; anomalies become [`diagnostics::Diagnostic`]s
//!   attached to the nearest node.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::lists::ListKind;
//! use questline_core::lang::table::Builtins;
//! use questline_syntax::parser;
//!
//! let node = parser::parse_instruction(ListKind::Events, "spawn ZOMBIE 3 name:\"Grim Reaper\"", 0, &Builtins);
//! assert_eq!(node.mandatory()[1].value, "3");
//! assert_eq!(node.optional("name").unwrap().value, "Grim Reaper");
//! ```

pub mod ast;
pub mod binder;
pub mod diagnostics;
pub mod instruction;
pub mod parser;
pub mod reference;
pub mod tokenizer;
