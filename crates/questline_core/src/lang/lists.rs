//! Define the element list kinds a package is made of.
//!
//! Every instruction lives in exactly one named list. References always target a list of a known kind, so the
//! list kind doubles as the namespace selector for reference resolution.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::lists::{self, ListKind};
//!
//! assert_eq!(lists::from_section("conditions"), Some(ListKind::Conditions));
//! assert_eq!(lists::section(ListKind::Events), "events");
//! ```

use std::fmt;

/// Stable identifier for every element list kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListKind {
    Events,
    Conditions,
    Objectives,
}

impl ListKind {
    /// All list kinds, in document order.
    pub const ALL: [ListKind; 3] = [ListKind::Events, ListKind::Conditions, ListKind::Objectives];
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(section(*self))
    }
}

/// Metadata for a list kind.
///
/// ## Notes
/// - `section` is the top-level document key holding the list's entries.
/// - `singular` is used in diagnostics ("unknown event 'x'").
#[derive(Debug, Clone, Copy)]
pub struct ListInfo {
    pub id: ListKind,
    pub section: &'static str,
    pub singular: &'static str,
    pub description: &'static str,
}

/// Registry of all list kinds.
pub const LISTS: &[ListInfo] = &[
    ListInfo {
        id: ListKind::Events,
        section: "events",
        singular: "event",
        description: "Actions executed when triggered by conversations, objectives or other events.",
    },
    ListInfo {
        id: ListKind::Conditions,
        section: "conditions",
        singular: "condition",
        description: "Checks that gate events, objectives and conversation options.",
    },
    ListInfo {
        id: ListKind::Objectives,
        section: "objectives",
        singular: "objective",
        description: "Tasks a player completes; completion fires the objective's events.",
    },
];

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: ListKind) -> &'static ListInfo {
    LISTS.iter().find(|l| l.id == id).expect("list info missing")
}

/// Document section name.
pub fn section(id: ListKind) -> &'static str {
    info_for(id).section
}

/// Singular noun used in messages.
pub fn singular(id: ListKind) -> &'static str {
    info_for(id).singular
}

/// Lookup by document section name (case-sensitive).
pub fn from_section(s: &str) -> Option<ListKind> {
    LISTS.iter().find(|l| l.section == s).map(|l| l.id)
}
