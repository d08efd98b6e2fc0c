//! Line-addressable text documents.
//!
//! A [`Document`] owns an arena of line texts plus the order those lines
//! appear in. [`Line`] handles point at arena slots, so a handle stays valid
//! while other lines are inserted, removed or moved around it, and its
//! [`Line::index`] is always read from the live order.
//!
//! ```rust
//! use quill_core::domain::Document;
//!
//! let doc = Document::from_text("use a;\nuse c;\n\nfn main() {}");
//! let imports = doc.consecutive("use ").unwrap();
//! imports.last().unwrap().after(["use b;"]).unwrap();
//!
//! assert_eq!(doc.text_array(), ["use a;", "use c;", "use b;", "", "fn main() {}"]);
//! ```

mod collection;
mod line;
mod snippet;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, warn};

pub use collection::{LineCollection, LineOp};
pub use line::{Line, LineMatcher, UntilTarget};
pub use snippet::Snippet;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::text::{EOL, split_lines};

/// Stable handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct LineId(usize);

/// Backing store shared by a document and all of its line handles.
///
/// Slots are append-only. A line removed from `order` keeps its slot, which
/// is what makes it detached rather than dangling.
#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<String>,
    order: Vec<LineId>,
}

pub(crate) type SharedArena = Rc<RefCell<Arena>>;

impl Arena {
    fn alloc(&mut self, text: String) -> LineId {
        self.slots.push(text);
        LineId(self.slots.len() - 1)
    }

    pub(crate) fn position(&self, id: LineId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn text(&self, id: LineId) -> &str {
        &self.slots[id.0]
    }

    pub(crate) fn text_mut(&mut self, id: LineId) -> &mut String {
        &mut self.slots[id.0]
    }

    pub(crate) fn id_at(&self, index: usize) -> Option<LineId> {
        self.order.get(index).copied()
    }

    pub(crate) fn ids(&self, range: std::ops::Range<usize>) -> Vec<LineId> {
        self.order[range].to_vec()
    }

    pub(crate) fn detach(&mut self, id: LineId) -> Option<usize> {
        let position = self.position(id)?;
        self.order.remove(position);
        Some(position)
    }

    pub(crate) fn insert(&mut self, index: usize, id: LineId) {
        self.order.insert(index, id);
    }

    pub(crate) fn set_slot(&mut self, index: usize, id: LineId) {
        self.order[index] = id;
    }

    fn replace_all(&mut self, text: &str) {
        let ids: Vec<LineId> = split_lines(text)
            .into_iter()
            .map(|line| self.alloc(line.to_string()))
            .collect();
        self.order = ids;
    }
}

/// Something that can be inserted into a document.
#[derive(Debug, Clone)]
pub enum NewLine {
    /// Raw text. Embedded line breaks produce several lines.
    Text(String),
    /// An existing line handle. Attached lines of the same document move.
    Line(Line),
}

impl From<&str> for NewLine {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for NewLine {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&String> for NewLine {
    fn from(text: &String) -> Self {
        Self::Text(text.clone())
    }
}

impl From<Line> for NewLine {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<&Line> for NewLine {
    fn from(line: &Line) -> Self {
        Self::Line(line.clone())
    }
}

/// What [`Document::remove`] should take out.
#[derive(Debug, Clone)]
pub enum LineTarget {
    Index(usize),
    Line(Line),
}

impl From<usize> for LineTarget {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<Line> for LineTarget {
    fn from(line: Line) -> Self {
        Self::Line(line)
    }
}

impl From<&Line> for LineTarget {
    fn from(line: &Line) -> Self {
        Self::Line(line.clone())
    }
}

/// Options for [`Document::all_with`].
///
/// The default is an unlimited forward scan over the whole document.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Stop after this many matches.
    pub limit: Option<usize>,
    /// Scan these lines instead of the whole document.
    pub within: Option<LineCollection>,
    /// Scan from the end.
    pub reverse: bool,
}

impl SearchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn within(mut self, lines: LineCollection) -> Self {
        self.within = Some(lines);
        self
    }

    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// An ordered sequence of lines.
///
/// Cloning a `Document` clones the handle: both values see the same lines.
#[derive(Clone, Default)]
pub struct Document {
    arena: SharedArena,
}

impl Document {
    /// An empty document with no lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// A document holding `text` split on line breaks.
    pub fn from_text(text: &str) -> Self {
        let doc = Self::new();
        doc.set_text(text);
        doc
    }

    pub(crate) fn from_arena(arena: SharedArena) -> Self {
        Self { arena }
    }

    /// Whether both handles point at the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.arena, &other.arena)
    }

    // ========================================================================
    // Whole-text access
    // ========================================================================

    /// All lines joined with the platform line separator.
    pub fn text(&self) -> String {
        self.text_array().join(EOL)
    }

    /// Replace every line. Existing handles become detached.
    pub fn set_text(&self, text: &str) -> &Self {
        self.arena.borrow_mut().replace_all(text);
        self
    }

    pub fn text_array(&self) -> Vec<String> {
        let arena = self.arena.borrow();
        arena
            .order
            .iter()
            .map(|id| arena.text(*id).to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.arena.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Positional access
    // ========================================================================

    pub fn lines(&self) -> LineCollection {
        let ids = self.arena.borrow().order.clone();
        self.collect(ids)
    }

    /// The line at `index`, or `None` past the end.
    pub fn line(&self, index: usize) -> Option<Line> {
        let id = self.arena.borrow().id_at(index)?;
        Some(Line::bound(self.arena.clone(), id))
    }

    pub(crate) fn collect(&self, ids: Vec<LineId>) -> LineCollection {
        ids.into_iter()
            .map(|id| Line::bound(self.arena.clone(), id))
            .collect()
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// First line containing `search`, or a stub when nothing matches.
    pub fn find<'a>(&self, search: impl Into<Snippet<'a>>) -> Line {
        self.first_match(search.into(), false)
    }

    /// Alias of [`Document::find`].
    pub fn first<'a>(&self, search: impl Into<Snippet<'a>>) -> Line {
        self.find(search)
    }

    /// Last line containing `search`, or a stub when nothing matches.
    pub fn last<'a>(&self, search: impl Into<Snippet<'a>>) -> Line {
        self.first_match(search.into(), true)
    }

    fn first_match(&self, search: Snippet<'_>, reverse: bool) -> Line {
        let mut options = SearchOptions::default().limit(1);
        options.reverse = reverse;

        match self.all_with(search, options).first() {
            Some(line) => line.clone(),
            None => {
                warn!(search = %search.resolve(), "Unable to find a line matching the search");
                Line::stub()
            }
        }
    }

    pub fn includes<'a>(&self, search: impl Into<Snippet<'a>>) -> bool {
        let search = search.into().resolve();
        let arena = self.arena.borrow();
        arena
            .order
            .iter()
            .any(|id| arena.text(*id).contains(search.as_ref()))
    }

    /// Every line containing `search`, in document order.
    pub fn all<'a>(&self, search: impl Into<Snippet<'a>>) -> LineCollection {
        self.all_with(search, SearchOptions::default())
    }

    pub fn all_with<'a>(
        &self,
        search: impl Into<Snippet<'a>>,
        options: SearchOptions,
    ) -> LineCollection {
        let search = search.into().resolve();
        let limit = options.limit.unwrap_or(usize::MAX);

        let mut candidates = options.within.unwrap_or_else(|| self.lines());
        if options.reverse {
            candidates.reverse();
        }

        candidates
            .into_iter()
            .filter(|line| line.contains(&search))
            .take(limit)
            .collect()
    }

    /// The contiguous run of matching lines starting at the first match.
    pub fn consecutive<'a>(
        &self,
        search: impl Into<Snippet<'a>>,
    ) -> DomainResult<LineCollection> {
        let search = search.into();
        let start = self.find(search);
        if start.is_stub() {
            return Ok(LineCollection::new());
        }
        start.until_last(search.resolve().as_ref())
    }

    /// Replace the first occurrence of `search` in the first matching line.
    pub fn replace<'a, 'b>(
        &self,
        search: impl Into<Snippet<'a>>,
        replacement: impl Into<Snippet<'b>>,
    ) -> &Self {
        let search = search.into();
        let resolved = search.resolve();
        self.find(search).replace(resolved.as_ref(), replacement);
        self
    }

    /// Replace the first occurrence of `search` in every matching line.
    pub fn replace_all<'a, 'b>(
        &self,
        search: impl Into<Snippet<'a>>,
        replacement: impl Into<Snippet<'b>>,
    ) -> &Self {
        let search = search.into();
        let resolved = search.resolve();
        let replacement = replacement.into();
        for line in &self.all(search) {
            line.replace(resolved.as_ref(), replacement);
        }
        self
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Insert lines at `index` and return them.
    ///
    /// Texts with embedded line breaks become several lines. Attached lines
    /// of this document are moved; `index` refers to positions before the
    /// move. Stub lines are skipped.
    ///
    /// # Errors
    ///
    /// - [`DomainError::IndexOutOfBounds`] when `index > len()`
    /// - [`DomainError::ForeignLine`] for a line of another document
    pub fn add<I>(&self, index: usize, items: I) -> DomainResult<LineCollection>
    where
        I: IntoIterator,
        I::Item: Into<NewLine>,
    {
        let items: Vec<NewLine> = items.into_iter().map(Into::into).collect();

        let mut arena = self.arena.borrow_mut();
        let len = arena.len();
        if index > len {
            return Err(DomainError::IndexOutOfBounds { index, len });
        }

        // Validate everything before the order is touched.
        let mut ids: Vec<LineId> = Vec::with_capacity(items.len());
        for item in items {
            match item {
                NewLine::Text(text) => {
                    for piece in split_lines(&text) {
                        ids.push(arena.alloc(piece.to_string()));
                    }
                }
                NewLine::Line(line) => {
                    let Some((line_arena, id)) = line.binding() else {
                        continue;
                    };
                    if !Rc::ptr_eq(line_arena, &self.arena) {
                        return Err(DomainError::ForeignLine);
                    }
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }

        let mut index = index;
        for id in &ids {
            if arena.detach(*id).is_some_and(|position| position < index) {
                index -= 1;
            }
        }

        arena.order.splice(index..index, ids.iter().copied());
        debug!(index, count = ids.len(), "Inserted lines");
        drop(arena);

        Ok(self.collect(ids))
    }

    pub fn prepend<I>(&self, items: I) -> DomainResult<LineCollection>
    where
        I: IntoIterator,
        I::Item: Into<NewLine>,
    {
        self.add(0, items)
    }

    pub fn append<I>(&self, items: I) -> DomainResult<LineCollection>
    where
        I: IntoIterator,
        I::Item: Into<NewLine>,
    {
        self.add(self.len(), items)
    }

    /// Remove one line by index or handle. Removing a stub is a no-op.
    ///
    /// # Errors
    ///
    /// - [`DomainError::IndexOutOfBounds`] for an index past the end
    /// - [`DomainError::DetachedLine`] for a line that was already removed
    /// - [`DomainError::ForeignLine`] for a line of another document
    pub fn remove(&self, target: impl Into<LineTarget>) -> DomainResult<()> {
        let mut arena = self.arena.borrow_mut();
        match target.into() {
            LineTarget::Index(index) => {
                let len = arena.len();
                if index >= len {
                    return Err(DomainError::IndexOutOfBounds { index, len });
                }
                arena.order.remove(index);
            }
            LineTarget::Line(line) => {
                let Some((line_arena, id)) = line.binding() else {
                    return Ok(());
                };
                if !Rc::ptr_eq(line_arena, &self.arena) {
                    return Err(DomainError::ForeignLine);
                }
                arena
                    .detach(id)
                    .ok_or(DomainError::DetachedLine {
                        operation: "remove",
                    })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("lines", &self.text_array())
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.text_array() == other.text_array()
    }
}
