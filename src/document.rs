//! Structured-document boundary: scalars with exact source ranges.
//!
//! Instruction parsing never looks at document structure. A [`DocumentReader`] turns a file into an ordered list
//! of [`ScalarEntry`]s (node path, key range, value range) and the element-list parser works from those.
//!
//! [`YamlReader`] is the reader used by the CLI and the tests. It drives the `yaml-rust2` event parser and takes
//! every scalar's start from the parser's markers. The content range is then measured in the source so that the
//! raw text of the scalar (escapes and line breaks as written) maps back to the file byte for byte.

use std::fmt;

use questline_syntax::ast::Span;
use questline_syntax::diagnostics::line_info;
use tracing::trace;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

/// How a scalar was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    Plain,
    /// Plain scalar inside a flow collection, where `,[]{}` end it.
    FlowPlain,
    SingleQuoted,
    DoubleQuoted,
    /// `|` or `>` block scalar; the content range spans the indented lines.
    Block,
}

impl ScalarStyle {
    /// The quote character enclosing the scalar, if any.
    pub fn quote(self) -> Option<char> {
        match self {
            ScalarStyle::Plain | ScalarStyle::FlowPlain | ScalarStyle::Block => None,
            ScalarStyle::SingleQuoted => Some('\''),
            ScalarStyle::DoubleQuoted => Some('"'),
        }
    }
}

/// One step from a node to its child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// One leaf scalar of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarEntry {
    /// Keys and sequence indexes from the document root down to this scalar.
    pub path: Vec<PathSegment>,
    /// The mapping key; empty at the value start for sequence items.
    pub key_span: Span,
    /// Source text of the scalar content: between the quotes for quoted scalars, escapes unprocessed.
    pub value: String,
    pub value_span: Span,
    pub style: ScalarStyle,
}

impl ScalarEntry {
    /// `events.reward`, `items[2]`.
    pub fn dotted_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.path {
            if matches!(segment, PathSegment::Key(_)) && !out.is_empty() {
                out.push('.');
            }
            out.push_str(&segment.to_string());
        }
        out
    }
}

impl fmt::Display for ScalarEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.dotted_path(), self.value)
    }
}

/// Malformed document structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    #[error("line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        span: Span,
    },
}

impl DocumentError {
    pub fn span(&self) -> Span {
        match self {
            DocumentError::Syntax { span, .. } => *span,
        }
    }

    fn from_scan(text: &str, offsets: &CharOffsets, error: &ScanError) -> Self {
        let start = offsets.byte(error.marker().index());
        let end = text[start..].chars().next().map_or(start, |c| start + c.len_utf8());
        let (line, column, _) = line_info(text, start);
        DocumentError::Syntax {
            line,
            column,
            message: error.info().to_string(),
            span: Span::new(start, end),
        }
    }
}

/// Read a document into leaf scalars.
pub trait DocumentReader {
    /// ## Errors
    /// A [`DocumentError`] for the first structural problem; no partial result is returned.
    fn read(&self, text: &str) -> Result<Vec<ScalarEntry>, DocumentError>;
}

/// YAML reader over the `yaml-rust2` event stream.
///
/// Only the first document of a stream is read. Scalars used as keys of complex keys, aliases and empty
/// (null) values produce no entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlReader;

impl DocumentReader for YamlReader {
    fn read(&self, text: &str) -> Result<Vec<ScalarEntry>, DocumentError> {
        let offsets = CharOffsets::new(text);
        let mut events = EventLog::default();
        Parser::new(text.chars())
            .load(&mut events, false)
            .map_err(|e| DocumentError::from_scan(text, &offsets, &e))?;

        let mut walker = Walker::new(text);
        for (event, index) in events.0 {
            walker.event(event, offsets.byte(index));
        }
        trace!(entries = walker.entries.len(), "read document");
        Ok(walker.entries)
    }
}

#[derive(Default)]
struct EventLog(Vec<(Event, usize)>);

impl MarkedEventReceiver for EventLog {
    fn on_event(&mut self, event: Event, mark: Marker) {
        self.0.push((event, mark.index()));
    }
}

/// Markers count characters; spans count bytes.
struct CharOffsets(Vec<usize>);

impl CharOffsets {
    fn new(text: &str) -> Self {
        CharOffsets(text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect())
    }

    fn byte(&self, char_index: usize) -> usize {
        self.0.get(char_index).or(self.0.last()).copied().unwrap_or(0)
    }
}

enum Key {
    Named(String, Span),
    Ignored,
}

enum Container {
    Mapping { key: Option<Key> },
    Sequence { next: usize },
}

struct Frame {
    container: Container,
    flow: bool,
    /// Whether entering this node pushed a path segment.
    named: bool,
}

/// The role of the next node, decided by the innermost open container.
enum Slot {
    Root,
    Key,
    Ignored,
    Value {
        segment: PathSegment,
        key_span: Option<Span>,
    },
}

struct Walker<'t> {
    text: &'t str,
    frames: Vec<Frame>,
    path: Vec<PathSegment>,
    /// Depth inside a skipped subtree (complex keys, values of ignored keys).
    skip: usize,
    entries: Vec<ScalarEntry>,
}

impl<'t> Walker<'t> {
    fn new(text: &'t str) -> Self {
        Walker {
            text,
            frames: Vec::new(),
            path: Vec::new(),
            skip: 0,
            entries: Vec::new(),
        }
    }

    fn event(&mut self, event: Event, start: usize) {
        if self.skip > 0 {
            match event {
                Event::MappingStart(..) | Event::SequenceStart(..) => self.skip += 1,
                Event::MappingEnd | Event::SequenceEnd => self.skip -= 1,
                _ => {}
            }
            return;
        }
        match event {
            Event::Scalar(value, ..) => self.scalar(value, start),
            Event::Alias(_) => {
                if let Slot::Key = self.slot() {
                    self.set_key(Key::Ignored);
                }
            }
            Event::MappingStart(..) | Event::SequenceStart(..) => {
                let flow = matches!(self.text[start..].chars().next(), Some('{' | '['));
                let container = if matches!(event, Event::MappingStart(..)) {
                    Container::Mapping { key: None }
                } else {
                    Container::Sequence { next: 0 }
                };
                match self.slot() {
                    Slot::Key => {
                        self.set_key(Key::Ignored);
                        self.skip = 1;
                    }
                    Slot::Ignored => self.skip = 1,
                    Slot::Root => self.frames.push(Frame {
                        container,
                        flow,
                        named: false,
                    }),
                    Slot::Value { segment, .. } => {
                        self.path.push(segment);
                        self.frames.push(Frame {
                            container,
                            flow,
                            named: true,
                        });
                    }
                }
            }
            Event::MappingEnd | Event::SequenceEnd => {
                if self.frames.pop().is_some_and(|frame| frame.named) {
                    self.path.pop();
                }
            }
            _ => {}
        }
    }

    fn slot(&mut self) -> Slot {
        let Some(frame) = self.frames.last_mut() else {
            return Slot::Root;
        };
        match &mut frame.container {
            Container::Mapping { key } => match key.take() {
                None => Slot::Key,
                Some(Key::Ignored) => Slot::Ignored,
                Some(Key::Named(name, span)) => Slot::Value {
                    segment: PathSegment::Key(name),
                    key_span: Some(span),
                },
            },
            Container::Sequence { next } => {
                *next += 1;
                Slot::Value {
                    segment: PathSegment::Index(*next - 1),
                    key_span: None,
                }
            }
        }
    }

    fn set_key(&mut self, new_key: Key) {
        if let Some(Frame {
            container: Container::Mapping { key },
            ..
        }) = self.frames.last_mut()
        {
            *key = Some(new_key);
        }
    }

    fn in_flow(&self) -> bool {
        self.frames.iter().any(|frame| frame.flow)
    }

    fn scalar(&mut self, value: String, start: usize) {
        let flow = self.in_flow();
        match self.slot() {
            Slot::Key if is_null(self.text, &value, start) => self.set_key(Key::Ignored),
            Slot::Key => {
                let (span, _) = scalar_extent(self.text, start, flow, None);
                self.set_key(Key::Named(value, span));
            }
            Slot::Value { segment, key_span } => {
                if is_null(self.text, &value, start) {
                    return;
                }
                let parent = match key_span {
                    Some(span) => column(self.text, span.start),
                    None => item_column(self.text, start),
                };
                let (value_span, style) = scalar_extent(self.text, start, flow, Some(parent));
                let mut path = self.path.clone();
                path.push(segment);
                self.entries.push(ScalarEntry {
                    path,
                    key_span: key_span.unwrap_or(Span::empty(value_span.start)),
                    value: self.text[value_span.start..value_span.end].to_string(),
                    value_span,
                    style,
                });
            }
            Slot::Root | Slot::Ignored => {}
        }
    }
}

/// A null value: the parser reports `~` for an empty node and marks wherever the next token starts.
fn is_null(text: &str, value: &str, start: usize) -> bool {
    value == "~" && !text[start..].starts_with(['~', '"', '\''])
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

fn column(text: &str, offset: usize) -> usize {
    offset - line_start(text, offset)
}

/// Column of the `-` introducing a sequence item that starts at `start`.
fn item_column(text: &str, start: usize) -> usize {
    let before = text[line_start(text, start)..start].trim_end_matches([' ', '\t']);
    match before.strip_suffix('-') {
        Some(rest) => rest.len(),
        None => before.len().saturating_sub(1),
    }
}

/// Content range and style of the scalar whose first character is at `start`.
///
/// `parent` is the column of the owning key or `-`; continuation lines of a value must be indented past it.
/// Keys (`parent` is `None`) are single-line.
fn scalar_extent(text: &str, start: usize, flow: bool, parent: Option<usize>) -> (Span, ScalarStyle) {
    let first = text[start..].chars().next();
    if let (Some('|' | '>'), Some(parent)) = (first, parent) {
        return (block_extent(text, start, parent), ScalarStyle::Block);
    }
    match first {
        Some(quote @ ('"' | '\'')) => {
            let body = start + 1;
            let end = closing_quote(&text[body..], quote).map_or(text.len(), |i| body + i);
            let style = if quote == '"' {
                ScalarStyle::DoubleQuoted
            } else {
                ScalarStyle::SingleQuoted
            };
            (Span::new(body, end), style)
        }
        _ => {
            let (mut end, mut stopped) = plain_line(text, start, flow);
            if flow {
                return (Span::new(start, end), ScalarStyle::FlowPlain);
            }
            let Some(parent) = parent else {
                return (Span::new(start, end), ScalarStyle::Plain);
            };
            let mut next = line_end(text, start) + 1;
            while !stopped && next < text.len() {
                let line = &text[next..line_end(text, next)];
                let content = line.trim_start_matches([' ', '\t']);
                let indent = line.len() - content.len();
                if !content.trim().is_empty() {
                    if indent <= parent || content.starts_with('#') {
                        break;
                    }
                    (end, stopped) = plain_line(text, next + indent, false);
                }
                next += line.len() + 1;
            }
            (Span::new(start, end), ScalarStyle::Plain)
        }
    }
}

/// End of the plain-scalar text on one line, and whether the scalar cannot continue on the next line.
fn plain_line(text: &str, from: usize, flow: bool) -> (usize, bool) {
    let mut end = from;
    let mut prev_space = false;
    let mut chars = text[from..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        let stop = match c {
            '\n' => return (end, false),
            ':' => next.is_none_or(|n| n.is_whitespace() || (flow && ",[]{}".contains(n))),
            '#' => prev_space,
            ',' | '[' | ']' | '{' | '}' => flow,
            _ => false,
        };
        if stop {
            return (end, true);
        }
        prev_space = c.is_whitespace();
        if !prev_space {
            end = from + i + c.len_utf8();
        }
    }
    (end, true)
}

/// Indented content lines following a `|` or `>` header.
fn block_extent(text: &str, header: usize, parent: usize) -> Span {
    let header_end = line_end(text, header);
    let mut next = header_end + 1;
    let mut indent_of_block = None;
    let mut content: Option<Span> = None;
    while next < text.len() {
        let line = &text[next..line_end(text, next)];
        let body = line.trim_start_matches(' ');
        let indent = line.len() - body.len();
        if !body.trim().is_empty() {
            let required = *indent_of_block.get_or_insert(indent);
            if indent <= parent || indent < required {
                break;
            }
            let start = content.map_or(next + indent, |span| span.start);
            content = Some(Span::new(start, next + line.trim_end().len()));
        }
        next += line.len() + 1;
    }
    content.unwrap_or(Span::empty(header_end.min(text.len())))
}

/// Index of the closing quote in `body`, honoring `\"` in double quotes and `''` in single quotes.
fn closing_quote(body: &str, quote: char) -> Option<usize> {
    let mut chars = body.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if quote == '"' && c == '\\' {
            chars.next();
        } else if c == quote {
            if quote == '\'' && chars.peek().is_some_and(|(_, next)| *next == '\'') {
                chars.next();
            } else {
                return Some(i);
            }
        }
    }
    None
}
