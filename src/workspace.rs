//! Workspaces: every package under one root directory.
//!
//! Discovery walks the directory tree. A directory holding a `package.yml` marker is a package root; the
//! package's name is its path relative to the workspace root with `-` between the components. Instruction files
//! belong to the innermost package root above them, files under a `conversations/` directory are recorded as
//! conversation files, and hidden directories are skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use questline_core::lang::conventions::{CONVERSATIONS_DIR, PACKAGE_MARKER_FILE, SOURCE_EXTENSION};
use questline_core::lang::lists::ListKind;
use questline_core::lang::table::PatternLookup;
use questline_syntax::diagnostics::{Diagnostic, errors};

use crate::document::DocumentReader;
use crate::model::{Package, PackageName, SourceFile};
use crate::resolve::SymbolResolver;

/// Failure to read the workspace from disk.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("workspace root '{}' is not a directory", path.display())]
    NotADirectory { path: PathBuf },
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A package root found on disk and the files that belong to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    pub name: PackageName,
    pub root: PathBuf,
    pub sources: Vec<PathBuf>,
    pub conversations: Vec<PathBuf>,
}

/// Find every package under `root`, in path order.
///
/// ## Errors
/// [`WorkspaceError`] if `root` is not a directory or a directory cannot be listed.
pub fn discover(root: &Path) -> Result<Vec<DiscoveredPackage>, WorkspaceError> {
    if !root.is_dir() {
        return Err(WorkspaceError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    if root.join(PACKAGE_MARKER_FILE).is_file() {
        tracing::warn!(root = %root.display(), "package marker at the workspace root is ignored");
    }
    let mut packages = Vec::new();
    walk(root, root, None, &mut packages)?;
    Ok(packages)
}

fn walk(
    root: &Path,
    dir: &Path,
    current: Option<usize>,
    packages: &mut Vec<DiscoveredPackage>,
) -> Result<(), WorkspaceError> {
    let mut current = current;
    if dir != root && dir.join(PACKAGE_MARKER_FILE).is_file() {
        packages.push(DiscoveredPackage {
            name: package_name(root, dir),
            root: dir.to_path_buf(),
            sources: Vec::new(),
            conversations: Vec::new(),
        });
        current = Some(packages.len() - 1);
    }

    let io = |source| WorkspaceError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut entries = fs::read_dir(dir)
        .map_err(io)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(io)?;
    entries.sort();

    for path in entries {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if path.is_dir() {
            if !name.starts_with('.') {
                walk(root, &path, current, packages)?;
            }
            continue;
        }
        if path.extension().is_none_or(|ext| ext != SOURCE_EXTENSION) {
            continue;
        }
        let Some(index) = current else {
            tracing::debug!(path = %path.display(), "file outside any package ignored");
            continue;
        };
        let package = &mut packages[index];
        let in_conversations = path
            .strip_prefix(&package.root)
            .is_ok_and(|relative| relative.components().any(|c| c.as_os_str() == CONVERSATIONS_DIR));
        if in_conversations {
            package.conversations.push(path);
        } else {
            package.sources.push(path);
        }
    }
    Ok(())
}

fn package_name(root: &Path, dir: &Path) -> PackageName {
    let relative = dir.strip_prefix(root).unwrap_or(dir);
    PackageName::new(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    )
}

/// A diagnostic together with where it was found.
#[derive(Debug, Clone)]
pub struct WorkspaceDiagnostic<'w> {
    pub package: &'w PackageName,
    pub source: &'w SourceFile,
    pub diagnostic: Diagnostic,
}

/// All packages of a workspace, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    root: PathBuf,
    packages: BTreeMap<PackageName, Package>,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            packages: BTreeMap::new(),
        }
    }

    /// Discover and parse every package under `root`.
    ///
    /// ## Errors
    /// [`WorkspaceError`] for directories or files that cannot be read. Malformed documents are not errors; they
    /// are reported by [`Workspace::check`].
    #[tracing::instrument(skip_all, fields(root = %root.display()))]
    pub fn load_from_disk(
        root: &Path,
        reader: &dyn DocumentReader,
        lookup: &dyn PatternLookup,
    ) -> Result<Self, WorkspaceError> {
        let mut workspace = Workspace::new(root);
        for found in discover(root)? {
            let mut package = Package::new(found.name, found.root);
            for path in found.sources {
                let text = fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
                    path: path.clone(),
                    source,
                })?;
                package.add_source(path, text, reader, lookup);
            }
            for path in found.conversations {
                package.add_conversation(path);
            }
            tracing::debug!(package = %package.name(), files = package.sources().len(), "package loaded");
            workspace.insert_package(package);
        }
        tracing::info!(packages = workspace.packages.len(), "workspace loaded");
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add or replace a package. Returns the replaced one.
    pub fn insert_package(&mut self, package: Package) -> Option<Package> {
        self.packages.insert(package.name().clone(), package)
    }

    pub fn package(&self, name: &PackageName) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn package_mut(&mut self, name: &PackageName) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn resolver(&self) -> SymbolResolver<'_> {
        SymbolResolver::new(self)
    }

    /// Every diagnostic of the workspace: malformed documents, instruction problems, duplicate names and
    /// unresolved references, in package, file and offset order.
    pub fn check(&self) -> Vec<WorkspaceDiagnostic<'_>> {
        let resolver = self.resolver();
        let mut all = Vec::new();

        for package in self.packages.values() {
            let mut found: Vec<(usize, Diagnostic)> = Vec::new();
            for source in package.sources() {
                if let Some(error) = &source.document_error {
                    found.push((source.id.0, errors::malformed_document(&error.to_string(), error.span())));
                }
            }
            found.extend(
                package
                    .diagnostics()
                    .into_iter()
                    .map(|(id, diagnostic)| (id.0, diagnostic.clone())),
            );
            for kind in ListKind::ALL {
                for (_, entry) in package.list(kind).iter() {
                    for site in entry.instruction.references() {
                        let resolution = resolver.resolve(&site.reference, package.name(), site.target);
                        if let Some(diagnostic) = resolution.diagnostic {
                            found.push((entry.source.0, diagnostic));
                        }
                    }
                }
            }

            found.sort_by_key(|(id, d)| (*id, d.span.start, d.span.end));
            all.extend(found.into_iter().filter_map(|(id, diagnostic)| {
                Some(WorkspaceDiagnostic {
                    package: package.name(),
                    source: package.sources().get(id)?,
                    diagnostic,
                })
            }));
        }
        all
    }
}
