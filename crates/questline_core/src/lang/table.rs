//! Map kind names to argument patterns.
//!
//! The binder never consults the builtin registry directly; it goes through [`PatternLookup`]. That keeps kind
//! dispatch data-driven: a project can register its own kinds (or override builtin ones) in a [`PatternTable`]
//! without touching the parser.
//!
//! ## Examples
//! ```rust
//! use questline_core::lang::lists::ListKind;
//! use questline_core::lang::patterns::{ArgumentPattern, slot};
//! use questline_core::lang::table::{Builtins, PatternLookup, PatternTable};
//! use questline_core::lang::values::ValueType;
//!
//! assert!(Builtins.pattern(ListKind::Events, "give").is_some());
//!
//! let mut table = PatternTable::with_builtins();
//! table
//!     .insert(
//!         ListKind::Events,
//!         "firework",
//!         ArgumentPattern::new(vec![slot("effect", ValueType::Text, "BALL")], vec![]),
//!     )
//!     .unwrap();
//! assert!(table.pattern(ListKind::Events, "firework").is_some());
//! ```

use std::collections::HashMap;

use super::kinds;
use super::lists::ListKind;
use super::patterns::{ArgumentPattern, PatternError};

/// Resolve the argument pattern governing a kind.
pub trait PatternLookup {
    /// The pattern for `kind` in `list`, or `None` if the kind is unknown.
    fn pattern(&self, list: ListKind, kind: &str) -> Option<&ArgumentPattern>;
}

/// The builtin kind registry ([`kinds`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct Builtins;

impl PatternLookup for Builtins {
    fn pattern(&self, list: ListKind, kind: &str) -> Option<&ArgumentPattern> {
        kinds::from_str(list, kind).map(|info| &info.pattern)
    }
}

/// A data-driven kind table.
///
/// ## Notes
/// - Aliases of builtin kinds are registered as separate entries by [`PatternTable::with_builtins`], so lookup is
///   a single map probe.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    patterns: HashMap<(ListKind, String), ArgumentPattern>,
}

impl PatternTable {
    /// An empty table: every kind is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table pre-filled with every builtin kind and alias.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        for list in ListKind::ALL {
            for info in kinds::kinds(list) {
                for name in std::iter::once(info.canonical).chain(info.aliases.iter().copied()) {
                    table.patterns.insert((list, name.to_string()), info.pattern.clone());
                }
            }
        }
        table
    }

    /// Register (or replace) the pattern for a kind.
    ///
    /// ## Errors
    /// Returns the [`PatternError`] from [`ArgumentPattern::validate`]; the table is unchanged in that case.
    pub fn insert(
        &mut self,
        list: ListKind,
        kind: impl Into<String>,
        pattern: ArgumentPattern,
    ) -> Result<Option<ArgumentPattern>, PatternError> {
        pattern.validate()?;
        Ok(self.patterns.insert((list, kind.into()), pattern))
    }

    pub fn remove(&mut self, list: ListKind, kind: &str) -> Option<ArgumentPattern> {
        self.patterns.remove(&(list, kind.to_string()))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl PatternLookup for PatternTable {
    fn pattern(&self, list: ListKind, kind: &str) -> Option<&ArgumentPattern> {
        self.patterns.get(&(list, kind.to_string()))
    }
}

impl<T: PatternLookup + ?Sized> PatternLookup for &T {
    fn pattern(&self, list: ListKind, kind: &str) -> Option<&ArgumentPattern> {
        (**self).pattern(list, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::patterns::key;
    use crate::lang::values::ValueType;

    #[test]
    fn test_builtins_are_list_scoped() {
        assert!(Builtins.pattern(ListKind::Events, "teleport").is_some());
        assert!(Builtins.pattern(ListKind::Conditions, "teleport").is_none());
    }

    #[test]
    fn test_with_builtins_includes_aliases() {
        let table = PatternTable::with_builtins();
        assert_eq!(
            table.pattern(ListKind::Events, "tp"),
            table.pattern(ListKind::Events, "teleport")
        );
    }

    #[test]
    fn test_insert_rejects_invalid_pattern_and_keeps_table() {
        let mut table = PatternTable::new();
        let bad = ArgumentPattern::new(
            vec![],
            vec![key("x", ValueType::Text, ""), key("x", ValueType::Text, "")],
        );
        assert!(table.insert(ListKind::Events, "broken", bad).is_err());
        assert!(table.is_empty());
    }
}
