//! Reference resolution across packages.
//!
//! A [`SymbolResolver`] borrows a [`Workspace`] and never stores what it finds: every lookup starts from the
//! reference's coordinates (package path, list kind, bare id), so a target that has been removed or whose
//! package is not loaded simply resolves to nothing.
//!
//! ## Package paths
//! - `id` and `-sub.id` are relative to the referencing package.
//! - each leading `_` segment ascends one level before the remaining segments descend (`_-side.id`).
//! - `quest-intro.id` is absolute from the workspace root.

use questline_core::lang::lists::{self, ListKind};
use questline_syntax::ast::IdReference;
use questline_syntax::diagnostics::{Diagnostic, errors};
use questline_syntax::reference::{ReferenceSite, parse_reference};

use crate::model::{ListEntry, Package, PackageName};
use crate::workspace::Workspace;

/// A resolved entry.
#[derive(Debug, Clone, Copy)]
pub struct Target<'w> {
    pub package: &'w Package,
    pub list: ListKind,
    pub name: &'w str,
    pub entry: &'w ListEntry,
}

/// Outcome of resolving one reference: the matching entries, or a diagnostic saying why there are none.
#[derive(Debug, Clone)]
pub struct Resolution<'w> {
    pub targets: Vec<Target<'w>>,
    pub diagnostic: Option<Diagnostic>,
}

impl Resolution<'_> {
    fn unresolved(diagnostic: Option<Diagnostic>) -> Self {
        Self {
            targets: Vec::new(),
            diagnostic,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !self.targets.is_empty()
    }
}

/// A reference to some entry, found in another entry's instruction.
#[derive(Debug, Clone)]
pub struct Usage<'w> {
    pub package: &'w Package,
    /// List and name of the entry holding the reference.
    pub list: ListKind,
    pub name: &'w str,
    pub site: ReferenceSite,
}

/// Lookup-only view of a workspace.
#[derive(Debug, Clone, Copy)]
pub struct SymbolResolver<'w> {
    workspace: &'w Workspace,
}

impl<'w> SymbolResolver<'w> {
    pub fn new(workspace: &'w Workspace) -> Self {
        Self { workspace }
    }

    /// The package a reference points into, seen from `origin`.
    ///
    /// `None` for malformed references and for paths that ascend past the workspace root.
    pub fn target_package(&self, reference: &IdReference, origin: &PackageName) -> Option<PackageName> {
        if reference.is_malformed() {
            return None;
        }
        if reference.is_absolute {
            return Some(PackageName::new(reference.segments.iter().cloned()));
        }
        Some(origin.ascend(reference.parent_levels)?.join(&reference.segments))
    }

    /// Resolve `reference`, written in package `origin`, against the list `list`.
    ///
    /// Never fails: an unknown package or a missing entry yields no targets and a warning at the reference.
    /// Malformed references yield neither; their problem is reported where they are parsed.
    pub fn resolve(&self, reference: &IdReference, origin: &PackageName, list: ListKind) -> Resolution<'w> {
        if reference.is_malformed() {
            return Resolution::unresolved(None);
        }
        let Some(package_name) = self.target_package(reference, origin) else {
            return Resolution::unresolved(Some(errors::package_above_root(reference.parent_levels, reference.span)));
        };
        let Some(package) = self.workspace.package(&package_name) else {
            tracing::debug!(reference = %reference, package = %package_name, "package not loaded");
            return Resolution::unresolved(Some(errors::package_not_found(&display_name(&package_name), reference.span)));
        };

        match package.list(list).get_key_value(&reference.bare_id) {
            Some((name, entry)) => Resolution {
                targets: vec![Target {
                    package,
                    list,
                    name,
                    entry,
                }],
                diagnostic: None,
            },
            None => Resolution::unresolved(Some(errors::dangling_reference(
                lists::singular(list),
                &reference.bare_id,
                &display_name(&package_name),
                reference.id_span(),
            ))),
        }
    }

    /// Parse and resolve reference text (`!quest-intro.started`).
    pub fn resolve_text(&self, text: &str, origin: &PackageName, list: ListKind) -> Resolution<'w> {
        self.resolve(&parse_reference(text), origin, list)
    }

    /// Every reference in the workspace that resolves to the entry `name` of `list` in `package`.
    pub fn references_to(&self, package: &PackageName, list: ListKind, name: &str) -> Vec<Usage<'w>> {
        let mut usages = Vec::new();
        for origin in self.workspace.packages() {
            for kind in ListKind::ALL {
                for (entry_name, entry) in origin.list(kind).iter() {
                    for site in entry.instruction.references() {
                        let hits = site.target == list
                            && site.reference.bare_id == name
                            && self.target_package(&site.reference, origin.name()).as_ref() == Some(package);
                        if hits {
                            usages.push(Usage {
                                package: origin,
                                list: kind,
                                name: entry_name,
                                site,
                            });
                        }
                    }
                }
            }
        }
        usages
    }
}

fn display_name(name: &PackageName) -> String {
    if name.is_root() {
        "<root>".to_string()
    } else {
        name.to_string()
    }
}
