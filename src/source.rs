//! Source units and ranges used as aggregation keys
//!
//! A [`Source`] is one unit of script text (a file or a function body). The
//! profiler only needs two projections of a [`SourceRange`]: which source unit
//! it belongs to ([`SourceRef`]) and the line it starts on.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, RangeInclusive};
use std::sync::Arc;

/// One unit of script text
#[derive(Debug)]
pub struct Source {
    name: String,
    text: String,
    /// Line number of the first line of `text` within its file (1-based)
    starting_line_no: usize,
    /// Byte offset at which each line begins
    line_starts: Vec<usize>,
}

impl Source {
    /// Create a source unit whose text begins on line 1
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_starting_line(name, text, 1)
    }

    /// Create a source unit whose text begins on `starting_line_no`
    ///
    /// Function bodies extracted from the middle of a file use this so that
    /// reported lines match the file rather than the body.
    pub fn with_starting_line(
        name: impl Into<String>,
        text: impl Into<String>,
        starting_line_no: usize,
    ) -> Self {
        let text = text.into();
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        Self {
            name: name.into(),
            text,
            starting_line_no,
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn starting_line_no(&self) -> usize {
        self.starting_line_no
    }

    /// Number of lines in the text (a trailing newline opens an empty line)
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Line number (file-relative) containing byte `offset`
    ///
    /// Offsets past the end of the text map to the last line.
    pub fn lineno_for_offset(&self, offset: usize) -> usize {
        let index = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert_at) => insert_at - 1,
        };
        self.starting_line_no.saturating_add(index)
    }

    /// Text of the given file-relative line, without its newline
    pub fn line_text(&self, lineno: usize) -> Option<&str> {
        let index = lineno.checked_sub(self.starting_line_no)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.text.len());
        self.text.get(start..end)
    }
}

/// Shared handle to a [`Source`]
///
/// Two handles are equal only when they point at the same source unit, so two
/// distinct units that happen to share a name aggregate separately.
#[derive(Debug, Clone)]
pub struct SourceRef(Arc<Source>);

impl SourceRef {
    pub fn new(source: Source) -> Self {
        Self(Arc::new(source))
    }

    fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl From<Source> for SourceRef {
    fn from(source: Source) -> Self {
        Self::new(source)
    }
}

impl Deref for SourceRef {
    type Target = Source;

    fn deref(&self) -> &Source {
        &self.0
    }
}

impl PartialEq for SourceRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SourceRef {}

impl Hash for SourceRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl PartialOrd for SourceRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourceRef {
    // Address breaks ties so that ordering agrees with identity equality.
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then(self.starting_line_no().cmp(&other.starting_line_no()))
            .then(self.addr().cmp(&other.addr()))
    }
}

/// Byte range within a source unit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceRange {
    source: SourceRef,
    start: usize,
    end: usize,
}

impl SourceRange {
    /// Create a range over `start..end` of `source`
    ///
    /// Offsets are clamped to the text, and `start` never exceeds `end`.
    pub fn new(source: SourceRef, start: usize, end: usize) -> Self {
        let end = end.min(source.text().len());
        let start = start.min(end);
        Self { source, start, end }
    }

    /// Range covering the whole of one file-relative line
    ///
    /// Returns `None` if the line is outside the source unit.
    pub fn for_line(source: SourceRef, lineno: usize) -> Option<Self> {
        let index = lineno.checked_sub(source.starting_line_no())?;
        let start = *source.line_starts.get(index)?;
        let end = start + source.line_text(lineno)?.len();
        Some(Self::new(source, start, end))
    }

    pub fn source(&self) -> &SourceRef {
        &self.source
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Line this range is attributed to: the line it starts on
    pub fn line(&self) -> usize {
        self.source.lineno_for_offset(self.start)
    }

    /// All lines the range touches
    pub fn lines(&self) -> RangeInclusive<usize> {
        let last = if self.end > self.start {
            self.source.lineno_for_offset(self.end - 1)
        } else {
            self.line()
        };
        self.line()..=last
    }

    pub fn text(&self) -> &str {
        self.source.text().get(self.start..self.end).unwrap_or("")
    }
}

impl fmt::Display for SourceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.name(), self.line())
    }
}

/// A unit of executable work that knows where it came from
///
/// The execution engine implements this for its instruction or node type so
/// that spans can be opened around it.
pub trait ProfiledNode {
    fn source_range(&self) -> SourceRange;
}

impl ProfiledNode for SourceRange {
    fn source_range(&self) -> SourceRange {
        self.clone()
    }
}

impl<T: ProfiledNode + ?Sized> ProfiledNode for &T {
    fn source_range(&self) -> SourceRange {
        (**self).source_range()
    }
}
