//! Packages: a directory of instruction files sharing one namespace.
//!
//! All mutation of a package's files goes through [`Package`]'s edit operations. Each one computes a
//! [`TextEdit`] on a scratch copy first, checks that the result still fits the file, and only then applies it to
//! the text and moves the offsets of every other entry in the same file.

use std::fmt;
use std::path::{Path, PathBuf};

use questline_core::lang::conventions::PACKAGE_SEPARATOR;
use questline_core::lang::lists::{self, ListKind};
use questline_core::lang::table::PatternLookup;
use questline_syntax::ast::{Span, TextEdit};
use questline_syntax::diagnostics::Diagnostic;
use questline_syntax::instruction::{ArgumentRef, EditError, InstructionNode};
use questline_syntax::parser::parse_instruction;

use super::ModelError;
use super::element_list::{self, ElementList, ListEntry, validate_name};
use crate::document::{DocumentError, DocumentReader, ScalarStyle};

/// Dash-separated package path (`quest-intro`). The workspace root package has no segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackageName(Vec<String>);

impl PackageName {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse `a-b-c`. The empty string is the root package.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self(text.split(PACKAGE_SEPARATOR).map(str::to_string).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The package `levels` steps up, or `None` past the root.
    pub fn ascend(&self, levels: usize) -> Option<PackageName> {
        let keep = self.0.len().checked_sub(levels)?;
        Some(Self(self.0[..keep].to_vec()))
    }

    /// Descend into `segments`.
    pub fn join(&self, segments: &[String]) -> PackageName {
        let mut joined = self.0.clone();
        joined.extend(segments.iter().cloned());
        Self(joined)
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(PACKAGE_SEPARATOR.to_string().as_str()))
    }
}

/// Index of a source file within its package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub usize);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An instruction file and its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub id: SourceId,
    pub path: PathBuf,
    pub text: String,
    /// Set when the file could not be read as a document; such a file contributes no entries.
    pub document_error: Option<DocumentError>,
}

/// A package with its files and element lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: PackageName,
    root: PathBuf,
    sources: Vec<SourceFile>,
    conversations: Vec<PathBuf>,
    events: ElementList,
    conditions: ElementList,
    objectives: ElementList,
    /// Duplicate definitions, by file.
    problems: Vec<(SourceId, Diagnostic)>,
}

impl Package {
    pub fn new(name: PackageName, root: impl Into<PathBuf>) -> Self {
        Self {
            events: ElementList::new(ListKind::Events, name.clone()),
            conditions: ElementList::new(ListKind::Conditions, name.clone()),
            objectives: ElementList::new(ListKind::Objectives, name.clone()),
            name,
            root: root.into(),
            sources: Vec::new(),
            conversations: Vec::new(),
            problems: Vec::new(),
        }
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &[SourceFile] {
        &self.sources
    }

    pub fn source(&self, id: SourceId) -> Option<&SourceFile> {
        self.sources.get(id.0)
    }

    /// Conversation files found in the package. They are listed, not parsed.
    pub fn conversations(&self) -> &[PathBuf] {
        &self.conversations
    }

    pub fn add_conversation(&mut self, path: impl Into<PathBuf>) {
        self.conversations.push(path.into());
    }

    pub fn list(&self, kind: ListKind) -> &ElementList {
        match kind {
            ListKind::Events => &self.events,
            ListKind::Conditions => &self.conditions,
            ListKind::Objectives => &self.objectives,
        }
    }

    fn list_mut(&mut self, kind: ListKind) -> &mut ElementList {
        match kind {
            ListKind::Events => &mut self.events,
            ListKind::Conditions => &mut self.conditions,
            ListKind::Objectives => &mut self.objectives,
        }
    }

    pub fn entry(&self, kind: ListKind, name: &str) -> Option<&ListEntry> {
        self.list(kind).get(name)
    }

    /// The entry at `offset` of `source`, searching all lists.
    pub fn entry_at(&self, source: SourceId, offset: usize) -> Option<(ListKind, &str, &ListEntry)> {
        ListKind::ALL.into_iter().find_map(|kind| {
            self.list(kind)
                .entry_at(source, offset)
                .map(|(name, entry)| (kind, name, entry))
        })
    }

    /// Read a file into the package. Entries of earlier files win over later duplicates.
    pub fn add_source(
        &mut self,
        path: impl Into<PathBuf>,
        text: impl Into<String>,
        reader: &dyn DocumentReader,
        lookup: &dyn PatternLookup,
    ) -> SourceId {
        let id = SourceId(self.sources.len());
        let path = path.into();
        let text = text.into();

        let document_error = match reader.read(&text) {
            Ok(scalars) => {
                for kind in ListKind::ALL {
                    let found = element_list::fill(self.list_mut(kind), id, &scalars, lookup);
                    self.problems.extend(found.into_iter().map(|d| (id, d)));
                }
                None
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "file skipped");
                Some(error)
            }
        };

        self.sources.push(SourceFile {
            id,
            path,
            text,
            document_error,
        });
        id
    }

    /// A fresh package read from the current file texts.
    pub fn reparsed(&self, reader: &dyn DocumentReader, lookup: &dyn PatternLookup) -> Package {
        let mut package = Package::new(self.name.clone(), self.root.clone());
        for source in &self.sources {
            package.add_source(source.path.clone(), source.text.clone(), reader, lookup);
        }
        package.conversations = self.conversations.clone();
        package
    }

    /// Every instruction and list diagnostic, by file and position.
    pub fn diagnostics(&self) -> Vec<(SourceId, &Diagnostic)> {
        let mut all: Vec<(SourceId, &Diagnostic)> = self.problems.iter().map(|(id, d)| (*id, d)).collect();
        for kind in ListKind::ALL {
            for (_, entry) in self.list(kind).iter() {
                all.extend(entry.instruction.diagnostics().into_iter().map(|d| (entry.source, d)));
            }
        }
        all.sort_by_key(|(id, d)| (*id, d.span.start, d.span.end));
        all
    }

    // ------------------------------------------------------------------------
    // Instruction edits
    // ------------------------------------------------------------------------

    /// Set a mandatory or optional argument of an entry.
    ///
    /// ## Errors
    /// [`ModelError::NotFound`], [`ModelError::ScalarConflict`] or the instruction's [`EditError`].
    pub fn set_argument(
        &mut self,
        kind: ListKind,
        name: &str,
        target: ArgumentRef<'_>,
        value: &str,
    ) -> Result<TextEdit, ModelError> {
        self.edit_instruction(kind, name, |node| node.set_argument(target, value))
    }

    /// ## Errors
    /// As [`Package::set_argument`].
    pub fn remove_optional(&mut self, kind: ListKind, name: &str, key: &str) -> Result<TextEdit, ModelError> {
        self.edit_instruction(kind, name, |node| node.remove_optional(key))
    }

    /// Replace an entry's kind, dropping its arguments.
    ///
    /// ## Errors
    /// As [`Package::set_argument`].
    pub fn set_kind(
        &mut self,
        kind: ListKind,
        name: &str,
        new_kind: &str,
        lookup: &dyn PatternLookup,
    ) -> Result<TextEdit, ModelError> {
        self.edit_instruction(kind, name, |node| node.set_kind(new_kind, lookup))
    }

    fn edit_instruction(
        &mut self,
        kind: ListKind,
        name: &str,
        op: impl FnOnce(&mut InstructionNode) -> Result<TextEdit, EditError>,
    ) -> Result<TextEdit, ModelError> {
        let entry = self.list(kind).get(name).ok_or_else(|| ModelError::NotFound {
            list: kind,
            name: name.to_string(),
        })?;
        let source = entry.source;
        let mut node = entry.instruction.clone();
        let edit = op(&mut node)?;
        let file = self.sources.get(source.0).ok_or(ModelError::UnknownSource(source))?;
        if !fits_scalar(entry.style, &file.text, entry.instruction.span(), &edit) {
            return Err(ModelError::ScalarConflict);
        }
        if edit.is_noop() {
            return Ok(edit);
        }

        if let Some(entry) = self.list_mut(kind).get_mut(name) {
            entry.instruction = node;
        }
        if self.apply_text(source, &edit) {
            self.shift(source, edit.span.end, edit.delta(), Some((kind, name)));
        }
        tracing::debug!(list = %kind, name, delta = edit.delta(), "instruction edited");
        Ok(edit)
    }

    // ------------------------------------------------------------------------
    // Entry edits
    // ------------------------------------------------------------------------

    /// Add a new entry to `source`, after the last entry of the same list in that file.
    ///
    /// The section header is created at the end of the file if the file has none.
    ///
    /// ## Errors
    /// [`ModelError::InvalidName`], [`ModelError::DuplicateName`], [`ModelError::InvalidInstructionText`],
    /// [`ModelError::UnknownSource`], [`ModelError::SourceHasErrors`] or [`ModelError::FlowSection`].
    pub fn create_entry(
        &mut self,
        kind: ListKind,
        source: SourceId,
        name: &str,
        instruction: &str,
        lookup: &dyn PatternLookup,
    ) -> Result<TextEdit, ModelError> {
        validate_name(name)?;
        if self.list(kind).contains(name) {
            return Err(ModelError::DuplicateName {
                list: kind,
                name: name.to_string(),
            });
        }
        validate_instruction_text(instruction)?;
        let file = self.sources.get(source.0).ok_or(ModelError::UnknownSource(source))?;
        if file.document_error.is_some() {
            return Err(ModelError::SourceHasErrors(source));
        }
        let text = &file.text;
        let section = lists::section(kind);

        let anchor = match self.list(kind).in_source(source).last() {
            Some((_, last)) => {
                let line = line_start(text, last.name_span.start);
                let indent = text[line..last.name_span.start].to_string();
                if !indent.trim().is_empty() {
                    return Err(ModelError::FlowSection(kind));
                }
                Some((line_end(text, last.instruction.span().end), indent))
            }
            None => section_header(text, section).map(|end| (end, "  ".to_string())),
        };

        let (edit, name_start) = match anchor {
            Some((end, indent)) if end < text.len() => {
                let at = end + 1;
                let edit = TextEdit::new(Span::empty(at), format!("{indent}{name}: {instruction}\n"));
                (edit, at + indent.len())
            }
            Some((end, indent)) => {
                let edit = TextEdit::new(Span::empty(end), format!("\n{indent}{name}: {instruction}"));
                (edit, end + 1 + indent.len())
            }
            None => {
                let separator = if text.is_empty() || text.ends_with('\n') { "" } else { "\n" };
                let at = text.len();
                let edit = TextEdit::new(
                    Span::empty(at),
                    format!("{separator}{section}:\n  {name}: {instruction}\n"),
                );
                (edit, at + separator.len() + section.len() + 2 + 2)
            }
        };

        let at_end = edit.span.start == text.len();
        if !self.apply_text(source, &edit) {
            return Ok(edit);
        }
        if !at_end {
            self.shift(source, edit.span.start, edit.delta(), None);
        }

        let value_start = name_start + name.len() + 2;
        let entry = ListEntry {
            source,
            name_span: Span::new(name_start, name_start + name.len()),
            style: ScalarStyle::Plain,
            instruction: parse_instruction(kind, instruction, value_start, lookup),
        };
        self.list_mut(kind).insert(name, entry)?;
        tracing::debug!(list = %kind, name, "entry created");
        Ok(edit)
    }

    /// Rename an entry in place. References to the old name are not touched.
    ///
    /// ## Errors
    /// [`ModelError::InvalidName`], [`ModelError::NotFound`] or [`ModelError::DuplicateName`].
    pub fn rename_entry(&mut self, kind: ListKind, old: &str, new: &str) -> Result<TextEdit, ModelError> {
        validate_name(new)?;
        let entry = self.list(kind).get(old).ok_or_else(|| ModelError::NotFound {
            list: kind,
            name: old.to_string(),
        })?;
        let source = entry.source;
        let edit = TextEdit::new(entry.name_span, new);
        self.list_mut(kind).rename(old, new)?;

        if self.apply_text(source, &edit) {
            self.shift(source, edit.span.end, edit.delta(), None);
        }
        if let Some(entry) = self.list_mut(kind).get_mut(new) {
            entry.name_span = Span::new(edit.span.start, edit.span.start + new.len());
        }
        Ok(edit)
    }

    /// Remove an entry and its whole line.
    ///
    /// ## Errors
    /// [`ModelError::NotFound`] or [`ModelError::UnknownSource`]; the entry is kept in both cases.
    pub fn remove_entry(&mut self, kind: ListKind, name: &str) -> Result<TextEdit, ModelError> {
        let entry = self.list(kind).get(name).ok_or_else(|| ModelError::NotFound {
            list: kind,
            name: name.to_string(),
        })?;
        let source = entry.source;
        let file = self.sources.get(source.0).ok_or(ModelError::UnknownSource(source))?;
        let text = &file.text;
        let start = line_start(text, entry.name_span.start);
        let end = line_end(text, entry.instruction.span().end);
        let end = if end < text.len() { end + 1 } else { end };

        let edit = TextEdit::new(Span::new(start, end), "");
        self.list_mut(kind).remove(name)?;
        if self.apply_text(source, &edit) {
            self.shift(source, edit.span.end, edit.delta(), None);
        }
        tracing::debug!(list = %kind, name, "entry removed");
        Ok(edit)
    }

    // ------------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------------

    fn apply_text(&mut self, source: SourceId, edit: &TextEdit) -> bool {
        let applied = self
            .sources
            .get_mut(source.0)
            .is_some_and(|file| edit.apply(&mut file.text));
        debug_assert!(applied, "edit {:?} does not fit source {source}", edit.span);
        applied
    }

    /// Move every offset of `source` at or past `at`, except those of one entry.
    fn shift(&mut self, source: SourceId, at: usize, delta: isize, except: Option<(ListKind, &str)>) {
        for kind in ListKind::ALL {
            let skip = except.filter(|(k, _)| *k == kind).map(|(_, name)| name);
            self.list_mut(kind).shift_source(source, at, delta, skip);
        }
        for (id, diagnostic) in &mut self.problems {
            if *id == source {
                diagnostic.span = diagnostic.span.shifted(at, delta);
            }
        }
    }
}

/// Characters that change the meaning of a plain scalar when they come first.
const INDICATORS: [char; 19] = [
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`',
];

/// Whether applying `edit` inside the instruction at `region` leaves the enclosing scalar intact.
///
/// Plain scalars are checked as they read after the edit, so text that is harmless alone but ends the scalar
/// next to its neighbours (` #`, `: `) is caught.
fn fits_scalar(style: ScalarStyle, text: &str, region: Span, edit: &TextEdit) -> bool {
    if edit.new_text.contains(['\n', '\r']) {
        return false;
    }
    let (Some(before), Some(after)) = (text.get(region.start..edit.span.start), text.get(edit.span.end..region.end))
    else {
        return false;
    };
    let scalar = format!("{before}{}{after}", edit.new_text);
    match style {
        ScalarStyle::Plain | ScalarStyle::FlowPlain => {
            if before.is_empty() && scalar.starts_with(INDICATORS) {
                return false;
            }
            plain_scalar_safe(&scalar) && (style == ScalarStyle::Plain || !scalar.contains([',', '[', ']', '{', '}']))
        }
        ScalarStyle::SingleQuoted => !edit.new_text.contains('\''),
        ScalarStyle::DoubleQuoted => !edit.new_text.contains(['"', '\\']),
        ScalarStyle::Block => true,
    }
}

/// No comment start (` #`) and no mapping indicator (`:` before whitespace or the end).
fn plain_scalar_safe(scalar: &str) -> bool {
    let mut prev: Option<char> = None;
    let mut chars = scalar.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '#' if prev.is_some_and(char::is_whitespace) => return false,
            ':' if chars.peek().is_none_or(|next| next.is_whitespace()) => return false,
            _ => {}
        }
        prev = Some(c);
    }
    true
}

fn validate_instruction_text(text: &str) -> Result<(), ModelError> {
    let reason = if text.trim().is_empty() {
        Some("it is empty")
    } else if text.contains(['\n', '\r']) {
        Some("it spans multiple lines")
    } else if text.trim() != text {
        Some("it has leading or trailing whitespace")
    } else if text.starts_with(INDICATORS) {
        Some("it starts with a YAML indicator character")
    } else if !plain_scalar_safe(text) {
        Some("it contains ': ' or ' #'")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ModelError::InvalidInstructionText(reason.to_string())),
        None => Ok(()),
    }
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Offset of the newline ending the line that contains `offset`, or the text length.
fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

/// Newline offset (or text end) of the top-level `section:` line opening a block mapping.
fn section_header(text: &str, section: &str) -> Option<usize> {
    let mut header = None;
    let mut start = 0;
    for line in text.split('\n') {
        let end = start + line.len();
        start = end + 1;
        let content = line.strip_suffix('\r').unwrap_or(line);
        let content = content.split(" #").next().unwrap_or(content).trim_end();
        if let Some(found) = header {
            let body = content.trim_start();
            if body.is_empty() || body.starts_with('#') {
                continue;
            }
            if body != "-" && !body.starts_with("- ") {
                return Some(found);
            }
            header = None;
        }
        if content.strip_suffix(':') == Some(section) {
            header = Some(end);
        }
    }
    header
}
