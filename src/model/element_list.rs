//! Name-keyed instruction lists.
//!
//! An [`ElementList`] holds every entry of one list kind (events, conditions or objectives) for one package,
//! gathered from all of the package's source files. Names are unique per list; the first definition wins and
//! later ones are reported as duplicates.

use std::collections::BTreeMap;

use questline_core::lang::conventions::{ID_SEPARATOR, KEY_SEPARATOR, LIST_SEPARATOR, NEGATION_PREFIX, QUOTES};
use questline_core::lang::lists::{self, ListKind};
use questline_core::lang::table::PatternLookup;
use questline_syntax::ast::Span;
use questline_syntax::diagnostics::{Diagnostic, errors};
use questline_syntax::instruction::InstructionNode;
use questline_syntax::parser::parse_instruction;

use super::ModelError;
use super::package::{PackageName, SourceId};
use crate::document::{PathSegment, ScalarEntry, ScalarStyle};

/// One named instruction of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    /// File the entry is defined in.
    pub source: SourceId,
    /// Range of the entry's key in that file.
    pub name_span: Span,
    /// How the instruction scalar is written.
    pub style: ScalarStyle,
    pub instruction: InstructionNode,
}

impl ListEntry {
    pub(crate) fn shift(&mut self, at: usize, delta: isize) {
        self.name_span = self.name_span.shifted(at, delta);
        self.instruction.shift(at, delta);
    }
}

/// Every entry of one list kind in one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementList {
    kind: ListKind,
    package: PackageName,
    entries: BTreeMap<String, ListEntry>,
}

impl ElementList {
    pub fn new(kind: ListKind, package: PackageName) -> Self {
        Self {
            kind,
            package,
            entries: BTreeMap::new(),
        }
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn package(&self) -> &PackageName {
        &self.package
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ListEntry> {
        self.entries.get(name)
    }

    /// The entry together with the list's own copy of its name.
    pub fn get_key_value(&self, name: &str) -> Option<(&str, &ListEntry)> {
        self.entries.get_key_value(name).map(|(name, entry)| (name.as_str(), entry))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ListEntry> {
        self.entries.get_mut(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ListEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Add an entry under a new name.
    ///
    /// ## Errors
    /// [`ModelError::DuplicateName`] if the name is taken; the list is unchanged.
    pub fn insert(&mut self, name: impl Into<String>, entry: ListEntry) -> Result<(), ModelError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ModelError::DuplicateName { list: self.kind, name });
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    /// ## Errors
    /// [`ModelError::NotFound`] if there is no such entry.
    pub fn remove(&mut self, name: &str) -> Result<ListEntry, ModelError> {
        self.entries.remove(name).ok_or_else(|| ModelError::NotFound {
            list: self.kind,
            name: name.to_string(),
        })
    }

    /// Move an entry to a new name. Only the map key changes; the entry's source ranges are the caller's.
    ///
    /// ## Errors
    /// [`ModelError::NotFound`] or [`ModelError::DuplicateName`]; the list is unchanged.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<(), ModelError> {
        if old == new {
            return if self.contains(old) {
                Ok(())
            } else {
                Err(ModelError::NotFound {
                    list: self.kind,
                    name: old.to_string(),
                })
            };
        }
        if self.entries.contains_key(new) {
            return Err(ModelError::DuplicateName {
                list: self.kind,
                name: new.to_string(),
            });
        }
        let entry = self.remove(old)?;
        let previous = self.entries.insert(new.to_string(), entry);
        debug_assert!(previous.is_none(), "rename overwrote '{new}'");
        Ok(())
    }

    /// The entry whose key or instruction covers `offset` in `source`.
    pub fn entry_at(&self, source: SourceId, offset: usize) -> Option<(&str, &ListEntry)> {
        self.iter().find(|(_, entry)| {
            entry.source == source
                && (entry.name_span.contains(offset) || entry.instruction.span().contains(offset))
        })
    }

    /// Entries defined in `source`, in file order.
    pub fn in_source(&self, source: SourceId) -> Vec<(&str, &ListEntry)> {
        let mut found: Vec<_> = self.iter().filter(|(_, entry)| entry.source == source).collect();
        found.sort_by_key(|(_, entry)| entry.name_span.start);
        found
    }

    /// Shift every entry of `source` after an edit ending at `at`, except the entry named `except`.
    pub(crate) fn shift_source(&mut self, source: SourceId, at: usize, delta: isize, except: Option<&str>) {
        for (name, entry) in &mut self.entries {
            if entry.source == source && except != Some(name.as_str()) {
                entry.shift(at, delta);
            }
        }
    }
}

/// Check that `name` can be used as an entry key and referenced from instructions.
///
/// ## Errors
/// [`ModelError::InvalidName`].
pub fn validate_name(name: &str) -> Result<(), ModelError> {
    let reserved = |c: char| {
        c.is_whitespace()
            || c == ID_SEPARATOR
            || c == KEY_SEPARATOR
            || c == LIST_SEPARATOR
            || c == '#'
            || QUOTES.contains(&c)
    };
    if name.is_empty() || name.starts_with(NEGATION_PREFIX) || name.contains(reserved) {
        return Err(ModelError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Build the list of `kind` from one file's scalars.
///
/// Scalars at `kind: { name: instruction }` become entries; everything else is ignored. Returns the list and the
/// duplicate-name diagnostics.
pub fn parse_element_list(
    kind: ListKind,
    package: &PackageName,
    source: SourceId,
    scalars: &[ScalarEntry],
    lookup: &dyn PatternLookup,
) -> (ElementList, Vec<Diagnostic>) {
    let mut list = ElementList::new(kind, package.clone());
    let diagnostics = fill(&mut list, source, scalars, lookup);
    (list, diagnostics)
}

/// Add one file's entries to an existing list.
pub(crate) fn fill(
    list: &mut ElementList,
    source: SourceId,
    scalars: &[ScalarEntry],
    lookup: &dyn PatternLookup,
) -> Vec<Diagnostic> {
    let section = lists::section(list.kind);
    let mut diagnostics = Vec::new();

    for scalar in scalars {
        let [PathSegment::Key(head), PathSegment::Key(name)] = scalar.path.as_slice() else {
            continue;
        };
        if head != section {
            continue;
        }
        if list.contains(name) {
            tracing::debug!(list = %list.kind, name = %name, "duplicate entry ignored");
            diagnostics.push(errors::duplicate_name(lists::singular(list.kind), name, scalar.key_span));
            continue;
        }
        let entry = ListEntry {
            source,
            name_span: scalar.key_span,
            style: scalar.style,
            instruction: parse_instruction(list.kind, &scalar.value, scalar.value_span.start, lookup),
        };
        list.entries.insert(name.clone(), entry);
    }
    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentReader, YamlReader};
    use questline_core::lang::table::Builtins;
    use questline_syntax::diagnostics::DiagnosticCode;

    fn events(text: &str) -> (ElementList, Vec<Diagnostic>) {
        let scalars = YamlReader.read(text).unwrap();
        parse_element_list(ListKind::Events, &PackageName::root(), SourceId(0), &scalars, &Builtins)
    }

    #[test]
    fn test_only_own_section_is_read() {
        let (list, diagnostics) = events("events:\n  a: kill\n  b: give emerald\nconditions:\n  c: tag x\n");
        assert!(diagnostics.is_empty());
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(list.get("b").unwrap().instruction.kind(), "give");
    }

    #[test]
    fn test_first_definition_wins() {
        let text = "events:\n  a: kill\n  a: give emerald\n";
        let (list, diagnostics) = events(text);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get("a").unwrap().instruction.kind(), "kill");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::DuplicateName);
        let span = diagnostics[0].span;
        assert_eq!(&text[span.start..span.end], "a");
        assert_eq!(span.start, text.rfind("a:").unwrap());
    }

    #[test]
    fn test_offsets_point_into_the_file() {
        let text = "events:\n  reward: 'give emerald amount:5'\n";
        let (list, _) = events(text);
        let entry = list.get("reward").unwrap();
        assert_eq!(entry.style, ScalarStyle::SingleQuoted);
        let amount = entry.instruction.optional("amount").unwrap();
        assert_eq!(&text[amount.span.start..amount.span.end], "amount:5");
        assert_eq!(list.entry_at(SourceId(0), amount.span.start).map(|(n, _)| n), Some("reward"));
        assert_eq!(list.entry_at(SourceId(1), amount.span.start), None);
    }

    #[test]
    fn test_block_and_multiline_values() {
        let text = "events:\n  long: |\n    give emerald\n      amount:5\n  items:\n    - kill\n  next: kill\n";
        let (list, diagnostics) = events(text);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["long", "next"]);

        let long = list.get("long").unwrap();
        assert_eq!(long.style, ScalarStyle::Block);
        let amount = long.instruction.optional("amount").unwrap();
        assert_eq!(&text[amount.span.start..amount.span.end], "amount:5");
    }

    #[test]
    fn test_insert_rename_remove() {
        let (mut list, _) = events("events:\n  a: kill\n  b: kill\n");
        let entry = list.get("a").unwrap().clone();

        let err = list.insert("b", entry.clone()).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateName { .. }));
        assert_eq!(list.len(), 2);

        assert!(matches!(list.rename("a", "b"), Err(ModelError::DuplicateName { .. })));
        list.rename("a", "c").unwrap();
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["b", "c"]);

        assert!(matches!(list.remove("a"), Err(ModelError::NotFound { .. })));
        assert_eq!(list.remove("c").unwrap(), entry);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_name_validation() {
        for good in ["reward", "give-diamond", "step_2", "Über"] {
            assert!(validate_name(good).is_ok(), "{good}");
        }
        for bad in ["", "a b", "a.b", "a:b", "a,b", "!a", "a#b", "it's"] {
            assert!(matches!(validate_name(bad), Err(ModelError::InvalidName(_))), "{bad}");
        }
    }
}
