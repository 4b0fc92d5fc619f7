//! Provide the canonical instruction vocabulary shared by the questline parser and tooling.
//!
//! This crate is intentionally small and dependency-free. It describes *what* an instruction may look like
//! (which kinds exist, which arguments each kind takes and what type those values have) without knowing
//! anything about tokens, offsets or documents.
//!
//! ## Notes
//!
//! - This is a “vocabulary” crate: **no IO**, no global state, no syntax-tree types.
//! - Argument patterns are plain data. The builtin registry lives in `const` tables; callers that need
//!   project-specific kinds build a [`lang::table::PatternTable`] instead.

pub mod lang;
