use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use regex::Regex;

use super::{Arena, Document, LineCollection, LineId, NewLine, SharedArena, Snippet};
use crate::domain::casing::substitute;
use crate::domain::error::{Boundary, DomainError, DomainResult};
use crate::domain::text;

/// Handle to one line of a [`Document`].
///
/// A line is in one of three states:
///
/// - **attached**: part of its document's order, every operation works
/// - **detached**: removed from the order; text operations still work on
///   the kept slot, positional operations fail with
///   [`DomainError::DetachedLine`]
/// - **stub**: returned by a search that found nothing; text operations are
///   no-ops and navigation yields more stubs or empty collections
///
/// Equality is identity: two handles are equal when they point at the same
/// slot of the same document.
#[derive(Clone)]
pub struct Line {
    binding: Option<Binding>,
}

#[derive(Clone)]
struct Binding {
    arena: SharedArena,
    id: LineId,
}

impl Line {
    pub(crate) fn bound(arena: SharedArena, id: LineId) -> Self {
        Self {
            binding: Some(Binding { arena, id }),
        }
    }

    /// The no-op line handed out when a search finds nothing.
    pub fn stub() -> Self {
        Self { binding: None }
    }

    /// A line that belongs to no document order, for standalone text edits.
    pub fn detached(text: impl Into<String>) -> Self {
        let arena = Rc::new(RefCell::new(Arena::default()));
        let id = arena.borrow_mut().alloc(text.into());
        Self::bound(arena, id)
    }

    pub(crate) fn binding(&self) -> Option<(&SharedArena, LineId)> {
        self.binding.as_ref().map(|b| (&b.arena, b.id))
    }

    pub fn is_stub(&self) -> bool {
        self.binding.is_none()
    }

    /// The document this line was created in.
    pub fn document(&self) -> Option<Document> {
        self.binding
            .as_ref()
            .map(|b| Document::from_arena(b.arena.clone()))
    }

    // ========================================================================
    // Text
    // ========================================================================

    pub fn text(&self) -> String {
        match &self.binding {
            Some(b) => b.arena.borrow().text(b.id).to_string(),
            None => String::new(),
        }
    }

    /// Overwrite the text. The caller keeps it free of line breaks.
    pub fn set_text(&self, text: impl Into<String>) -> &Self {
        let text = text.into();
        self.edit(|current| *current = text)
    }

    pub(crate) fn contains(&self, needle: &str) -> bool {
        match &self.binding {
            Some(b) => b.arena.borrow().text(b.id).contains(needle),
            None => false,
        }
    }

    fn edit(&self, f: impl FnOnce(&mut String)) -> &Self {
        if let Some(b) = &self.binding {
            f(b.arena.borrow_mut().text_mut(b.id));
        }
        self
    }

    /// Rewrite the placeholders of this line's own text for `name`.
    pub fn name(&self, name: &str) -> &Self {
        self.edit(|current| {
            let named = substitute(current.as_str(), Some(name)).into_owned();
            *current = named;
        })
    }

    /// Replace the first occurrence of `search`.
    pub fn replace<'a>(&self, search: &str, replacement: impl Into<Snippet<'a>>) -> &Self {
        let replacement = replacement.into().resolve();
        self.edit(|current| *current = current.replacen(search, &replacement, 1))
    }

    /// Replace every match of `pattern`; `$1`-style group references expand.
    pub fn replace_regex<'a>(&self, pattern: &Regex, replacement: impl Into<Snippet<'a>>) -> &Self {
        let replacement = replacement.into().resolve();
        self.edit(|current| {
            let replaced = pattern.replace_all(current.as_str(), replacement.as_ref()).into_owned();
            *current = replaced;
        })
    }

    pub fn prepend<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into().resolve();
        self.edit(|current| current.insert_str(0, &prefix))
    }

    pub fn append<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into().resolve();
        self.edit(|current| current.push_str(&suffix))
    }

    /// Prepend `prefix` unless the text already starts with it.
    pub fn left_pad<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into().resolve();
        self.edit(|current| {
            if !current.starts_with(prefix.as_ref()) {
                current.insert_str(0, &prefix);
            }
        })
    }

    /// Append `suffix` unless the text already ends with it.
    pub fn right_pad<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into().resolve();
        self.edit(|current| {
            if !current.ends_with(suffix.as_ref()) {
                current.push_str(&suffix);
            }
        })
    }

    pub fn left_unpad<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into().resolve();
        self.edit(|current| {
            if let Some(rest) = current.strip_prefix(prefix.as_ref()) {
                *current = rest.to_string();
            }
        })
    }

    pub fn right_unpad<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into().resolve();
        self.edit(|current| {
            if let Some(rest) = current.strip_suffix(suffix.as_ref()) {
                *current = rest.to_string();
            }
        })
    }

    // ========================================================================
    // Position
    // ========================================================================

    fn position(&self, operation: &'static str) -> DomainResult<usize> {
        let b = self.binding.as_ref().ok_or(DomainError::StubLine)?;
        b.arena
            .borrow()
            .position(b.id)
            .ok_or(DomainError::DetachedLine { operation })
    }

    /// Current position in the document, looked up on every call.
    pub fn index(&self) -> DomainResult<usize> {
        self.position("index")
    }

    pub fn is_first(&self) -> bool {
        self.index().is_ok_and(|index| index == 0)
    }

    pub fn is_last(&self) -> bool {
        match &self.binding {
            Some(b) => {
                let arena = b.arena.borrow();
                arena
                    .position(b.id)
                    .is_some_and(|index| index + 1 == arena.len())
            }
            None => false,
        }
    }

    fn arena(&self) -> Option<&SharedArena> {
        self.binding.as_ref().map(|b| &b.arena)
    }

    fn sibling(&self, index: usize) -> Line {
        match self.arena() {
            Some(arena) => {
                let id = arena.borrow().id_at(index);
                id.map_or_else(Line::stub, |id| Line::bound(arena.clone(), id))
            }
            None => Line::stub(),
        }
    }

    fn range(&self, range: std::ops::Range<usize>) -> LineCollection {
        match self.arena() {
            Some(arena) => {
                let ids = arena.borrow().ids(range);
                Document::from_arena(arena.clone()).collect(ids)
            }
            None => LineCollection::new(),
        }
    }

    fn len(&self) -> usize {
        self.arena().map_or(0, |arena| arena.borrow().len())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// The line above.
    ///
    /// # Errors
    ///
    /// [`DomainError::Boundary`] on the first line.
    pub fn previous(&self) -> DomainResult<Line> {
        if self.is_stub() {
            return Ok(Line::stub());
        }
        let index = self.position("previous")?;
        if index == 0 {
            return Err(DomainError::Boundary {
                operation: "previous",
                boundary: Boundary::First,
            });
        }
        Ok(self.sibling(index - 1))
    }

    /// The line below.
    ///
    /// # Errors
    ///
    /// [`DomainError::Boundary`] on the last line.
    pub fn next(&self) -> DomainResult<Line> {
        if self.is_stub() {
            return Ok(Line::stub());
        }
        let index = self.position("next")?;
        if index + 1 >= self.len() {
            return Err(DomainError::Boundary {
                operation: "next",
                boundary: Boundary::Last,
            });
        }
        Ok(self.sibling(index + 1))
    }

    pub fn all_previous(&self) -> DomainResult<LineCollection> {
        if self.is_stub() {
            return Ok(LineCollection::new());
        }
        let index = self.position("all_previous")?;
        Ok(self.range(0..index))
    }

    pub fn all_next(&self) -> DomainResult<LineCollection> {
        if self.is_stub() {
            return Ok(LineCollection::new());
        }
        let index = self.position("all_next")?;
        Ok(self.range(index + 1..self.len()))
    }

    // ========================================================================
    // Moving
    // ========================================================================

    /// Swap with the line above.
    pub fn up(&self) -> DomainResult<&Self> {
        if self.is_stub() {
            return Ok(self);
        }
        let index = self.position("up")?;
        if index == 0 {
            return Err(DomainError::Boundary {
                operation: "up",
                boundary: Boundary::First,
            });
        }
        self.move_to(index - 1)
    }

    /// Swap with the line below.
    pub fn down(&self) -> DomainResult<&Self> {
        if self.is_stub() {
            return Ok(self);
        }
        let index = self.position("down")?;
        if index + 1 >= self.len() {
            return Err(DomainError::Boundary {
                operation: "down",
                boundary: Boundary::Last,
            });
        }
        self.move_to(index + 1)
    }

    /// Move this line so it ends up at `index`, keeping its identity.
    ///
    /// # Errors
    ///
    /// [`DomainError::IndexOutOfBounds`] when `index` is not a valid position.
    pub fn move_to(&self, index: usize) -> DomainResult<&Self> {
        let Some(b) = &self.binding else {
            return Ok(self);
        };
        let mut arena = b.arena.borrow_mut();
        let position = arena
            .position(b.id)
            .ok_or(DomainError::DetachedLine { operation: "move" })?;
        let len = arena.len();
        if index >= len {
            return Err(DomainError::IndexOutOfBounds { index, len });
        }
        if position != index {
            arena.detach(b.id);
            arena.insert(index, b.id);
        }
        Ok(self)
    }

    /// Insert lines directly above this one.
    pub fn before<I>(&self, items: I) -> DomainResult<LineCollection>
    where
        I: IntoIterator,
        I::Item: Into<NewLine>,
    {
        let Some(doc) = self.document() else {
            return Ok(LineCollection::new());
        };
        let index = self.position("before")?;
        doc.add(index, items)
    }

    /// Insert lines directly below this one.
    pub fn after<I>(&self, items: I) -> DomainResult<LineCollection>
    where
        I: IntoIterator,
        I::Item: Into<NewLine>,
    {
        let Some(doc) = self.document() else {
            return Ok(LineCollection::new());
        };
        let index = self.position("after")?;
        doc.add(index + 1, items)
    }

    // ========================================================================
    // Ranges
    // ========================================================================

    /// The inclusive run between this line and `target`, in document order.
    ///
    /// `target` is an index, another line, or a predicate. A predicate scans
    /// forward for the first line it accepts and stops at the last line of
    /// the document if none does.
    pub fn until(&self, target: impl UntilTarget) -> DomainResult<LineCollection> {
        if self.is_stub() {
            return Ok(LineCollection::new());
        }
        let start = self.position("until")?;
        let end = target.resolve(self)?;
        let len = self.len();
        if end >= len {
            return Err(DomainError::IndexOutOfBounds { index: end, len });
        }
        Ok(self.range(start.min(end)..start.max(end) + 1))
    }

    /// This line and every following line that still matches, up to the
    /// first line that does not.
    ///
    /// A run that reaches the end of the document includes the last line.
    pub fn until_last(&self, mut matcher: impl LineMatcher) -> DomainResult<LineCollection> {
        let mut last_matching = self.clone();
        for line in self.all_next()? {
            if !matcher.matches(&line) {
                break;
            }
            last_matching = line;
        }
        self.until(&last_matching)
    }

    /// The first following line indented no deeper than this one.
    ///
    /// A blank line has no indentation, so it ends the block. Use
    /// [`Line::enclosing_skipping_blanks`] for blocks with blank lines inside.
    ///
    /// # Errors
    ///
    /// [`DomainError::NoEnclosingLine`] when the document ends first.
    pub fn enclosing(&self) -> DomainResult<Line> {
        self.find_enclosing(false)
    }

    /// Like [`Line::enclosing`], but whitespace-only lines never end the block.
    pub fn enclosing_skipping_blanks(&self) -> DomainResult<Line> {
        self.find_enclosing(true)
    }

    fn find_enclosing(&self, skip_blanks: bool) -> DomainResult<Line> {
        if self.is_stub() {
            return Ok(Line::stub());
        }
        let indentation = self.indentation();
        let depth = indentation.len();

        self.all_next()?
            .into_iter()
            .find(|line| {
                let content = line.text();
                if skip_blanks && content.trim().is_empty() {
                    return false;
                }
                text::indentation(&content).len() <= depth
            })
            .ok_or(DomainError::NoEnclosingLine { indentation })
    }

    /// This line through its enclosing line.
    pub fn until_enclosing(&self) -> DomainResult<LineCollection> {
        let enclosing = self.enclosing()?;
        self.until(&enclosing)
    }

    // ========================================================================
    // Indentation
    // ========================================================================

    pub fn indentation(&self) -> String {
        text::indentation(&self.text()).to_string()
    }

    /// Replace the leading whitespace with `indentation`, or with the
    /// previous line's indentation when `None`.
    pub fn replace_indentation(&self, indentation: Option<&str>) -> DomainResult<&Self> {
        if self.is_stub() {
            return Ok(self);
        }
        let indentation = match indentation {
            Some(indentation) => indentation.to_string(),
            None => self.previous()?.indentation(),
        };
        Ok(self.edit(|current| {
            let body = current.trim_start().to_string();
            *current = format!("{indentation}{body}");
        }))
    }

    /// Prepend the previous line's indentation.
    pub fn indent(&self) -> DomainResult<&Self> {
        if self.is_stub() {
            return Ok(self);
        }
        let indentation = self.previous()?.indentation();
        Ok(self.prepend(indentation.as_str()))
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove this line from its document.
    pub fn remove(&self) -> DomainResult<()> {
        self.remove_many(1)
    }

    /// Remove `amount` lines starting at this one. Runs past the end of the
    /// document stop at the last line.
    pub fn remove_many(&self, amount: usize) -> DomainResult<()> {
        let Some(doc) = self.document() else {
            return Ok(());
        };
        if amount == 0 {
            return Ok(());
        }
        let index = self.position("remove")?;
        let last = index.saturating_add(amount - 1).min(doc.len() - 1);
        for line in self.until(last)? {
            doc.remove(&line)?;
        }
        Ok(())
    }
}

impl PartialEq for Line {
    fn eq(&self, other: &Self) -> bool {
        match (&self.binding, &other.binding) {
            (Some(a), Some(b)) => Rc::ptr_eq(&a.arena, &b.arena) && a.id == b.id,
            (None, None) => true,
            _ => false,
        }
    }
}

impl Eq for Line {}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            Some(_) => f
                .debug_struct("Line")
                .field("index", &self.index().ok())
                .field("text", &self.text())
                .finish(),
            None => f.write_str("Line(stub)"),
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// End point accepted by [`Line::until`].
pub trait UntilTarget {
    /// Resolve to a document index relative to `from`.
    fn resolve(self, from: &Line) -> DomainResult<usize>;
}

impl UntilTarget for usize {
    fn resolve(self, _from: &Line) -> DomainResult<usize> {
        Ok(self)
    }
}

impl UntilTarget for &Line {
    fn resolve(self, from: &Line) -> DomainResult<usize> {
        match (&self.binding, &from.binding) {
            (Some(a), Some(b)) if !Rc::ptr_eq(&a.arena, &b.arena) => Err(DomainError::ForeignLine),
            _ => self.position("until"),
        }
    }
}

impl UntilTarget for Line {
    fn resolve(self, from: &Line) -> DomainResult<usize> {
        (&self).resolve(from)
    }
}

impl<F> UntilTarget for F
where
    F: FnMut(&Line) -> bool,
{
    fn resolve(mut self, from: &Line) -> DomainResult<usize> {
        for line in from.all_next()? {
            if line.is_last() || self(&line) {
                return line.index();
            }
        }
        // Already the last line.
        from.index()
    }
}

/// Test applied by [`Line::until_last`] to each following line.
pub trait LineMatcher {
    fn matches(&mut self, line: &Line) -> bool;
}

impl LineMatcher for &str {
    fn matches(&mut self, line: &Line) -> bool {
        line.contains(*self)
    }
}

impl LineMatcher for String {
    fn matches(&mut self, line: &Line) -> bool {
        line.contains(self.as_str())
    }
}

impl LineMatcher for &String {
    fn matches(&mut self, line: &Line) -> bool {
        line.contains(self.as_str())
    }
}

impl<F> LineMatcher for F
where
    F: FnMut(&Line) -> bool,
{
    fn matches(&mut self, line: &Line) -> bool {
        self(line)
    }
}
