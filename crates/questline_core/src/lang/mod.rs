//! Instruction language vocabulary registries.
//!
//! This module is the “front door” for instruction-level vocabulary: element list kinds, value types, argument
//! patterns and the builtin kind registry.
//!
//! The design goal is to keep per-kind argument shapes in one data table instead of scattering kind-specific
//! parsing branches across the binder.
//!
//! ## Notes
//! - Registries are **pure**: no tokens, no offsets, no IO.
//! - The binder enforces the patterns; registries only describe them.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::kinds;
//! use questline_core::lang::lists::ListKind;
//!
//! let teleport = kinds::from_str(ListKind::Events, "teleport").unwrap();
//! assert_eq!(teleport.pattern.mandatory.len(), 1);
//! assert_eq!(teleport.pattern.mandatory[0].name, "location");
//! ```

pub mod conventions;
pub mod kinds;
pub mod lists;
pub mod patterns;
pub mod table;
pub mod values;
