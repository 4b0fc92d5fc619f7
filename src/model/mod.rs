//! Element lists and packages: the owning side of the instruction model.
//!
//! ## Ownership
//! A [`Package`] owns its source files and its three [`ElementList`]s; each list owns its entries and each entry
//! owns its [`InstructionNode`](questline_syntax::instruction::InstructionNode). Cross-package links are never
//! stored: references are kept as text and resolved on demand by [`crate::resolve::SymbolResolver`].
//!
//! ## Module Structure
//!
//! - `element_list` - Name-keyed instruction lists and the per-file list parser
//! - `package` - Packages, package names, source files and text-preserving edits

pub mod element_list;
pub mod package;

pub use element_list::{ElementList, ListEntry, parse_element_list};
pub use package::{Package, PackageName, SourceFile, SourceId};

use questline_core::lang::lists::ListKind;
use questline_syntax::instruction::EditError;

/// Failure of a model operation. The model is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("{list} already has an entry named '{name}'")]
    DuplicateName { list: ListKind, name: String },
    #[error("{list} has no entry named '{name}'")]
    NotFound { list: ListKind, name: String },
    #[error("'{0}' is not a valid entry name")]
    InvalidName(String),
    #[error("instruction text cannot be written as a plain scalar: {0}")]
    InvalidInstructionText(String),
    #[error("source file {0} is not part of this package")]
    UnknownSource(SourceId),
    #[error("source file {0} has structural errors and cannot be edited")]
    SourceHasErrors(SourceId),
    #[error("the edit cannot be written inside the enclosing YAML scalar")]
    ScalarConflict,
    #[error("the {0} section is written in flow style and cannot take new entries")]
    FlowSection(ListKind),
    #[error(transparent)]
    Edit(#[from] EditError),
}
