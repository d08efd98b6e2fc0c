use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use super::{Line, Snippet};
use crate::domain::casing::split_words;
use crate::domain::error::{DomainError, DomainResult};

/// An ordered view over lines of one document.
///
/// The collection does not own its lines; it derefs to `[Line]` for indexing,
/// iteration and other slice operations. Text operations are broadcast to
/// every member and return the collection for chaining:
///
/// ```rust
/// use quill_core::domain::Document;
///
/// let doc = Document::from_text("a\nb\nc");
/// doc.lines().prepend("- ").trailing(",");
/// assert_eq!(doc.text_array(), ["- a,", "- b,", "- c"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCollection {
    lines: Vec<Line>,
}

impl LineCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) {
        self.lines.push(line);
    }

    pub fn into_vec(self) -> Vec<Line> {
        self.lines
    }

    pub fn text_array(&self) -> Vec<String> {
        self.lines.iter().map(Line::text).collect()
    }

    // ========================================================================
    // Structural operations
    // ========================================================================

    /// Drop the first and the last member.
    pub fn dive(&mut self) -> &mut Self {
        if !self.lines.is_empty() {
            self.lines.remove(0);
        }
        self.lines.pop();
        self
    }

    /// Grow by the line above the first member and the line below the last.
    ///
    /// # Errors
    ///
    /// - [`DomainError::EmptyCollection`] when there are no members
    /// - [`DomainError::Boundary`] when a member already sits at a document
    ///   boundary
    pub fn surface(&mut self) -> DomainResult<&mut Self> {
        let (Some(first), Some(last)) = (self.lines.first(), self.lines.last()) else {
            return Err(DomainError::EmptyCollection {
                operation: "surface",
            });
        };
        let previous = first.previous()?;
        let next = last.next()?;

        self.lines.insert(0, previous);
        self.lines.push(next);
        Ok(self)
    }

    /// Add members and restore document order.
    ///
    /// Lines already in the collection are not added twice. Detached and
    /// stub members sort to the end.
    pub fn add(&mut self, value: impl Into<LineCollection>) -> &mut Self {
        for line in value.into().lines {
            push_unique(&mut self.lines, line);
        }
        self.lines
            .sort_by_cached_key(|line| line.index().unwrap_or(usize::MAX));
        self
    }

    /// Add the lines produced by `producer`, which receives this collection.
    pub fn add_with<F>(&mut self, producer: F) -> DomainResult<&mut Self>
    where
        F: FnOnce(&LineCollection) -> DomainResult<LineCollection>,
    {
        let produced = producer(self)?;
        Ok(self.add(produced))
    }

    /// Sort the members by text, rearranging the document itself.
    ///
    /// The sorted lines are written back into the document positions the
    /// members occupied, so lines outside the collection do not move. Use
    /// [`LineCollection::sorted`] to reorder only the view.
    ///
    /// # Errors
    ///
    /// - [`DomainError::DetachedLine`] when a member is no longer attached
    /// - [`DomainError::ForeignLine`] when members come from different
    ///   documents
    pub fn sort(&mut self) -> DomainResult<&mut Self> {
        let mut members = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            push_unique(&mut members, line.clone());
        }
        let Some((arena, _)) = members.first().and_then(Line::binding) else {
            return Ok(self);
        };
        let arena = arena.clone();

        let mut slots = Vec::with_capacity(members.len());
        for line in &members {
            let Some((line_arena, _)) = line.binding() else {
                continue;
            };
            if !Rc::ptr_eq(line_arena, &arena) {
                return Err(DomainError::ForeignLine);
            }
            slots.push(line.index().map_err(|_| DomainError::DetachedLine {
                operation: "sort",
            })?);
        }
        slots.sort_unstable();

        let mut by_text = members;
        by_text.sort_by_cached_key(Line::text);

        {
            let mut arena = arena.borrow_mut();
            for (slot, line) in slots.iter().zip(&by_text) {
                if let Some((_, id)) = line.binding() {
                    arena.set_slot(*slot, id);
                }
            }
        }

        self.lines = by_text;
        Ok(self)
    }

    /// A copy of this view sorted by text. The document is left untouched.
    pub fn sorted(&self) -> LineCollection {
        let mut lines = self.lines.clone();
        lines.sort_by_cached_key(Line::text);
        Self { lines }
    }

    /// Right-pad every member but the last with `separator` and strip it from
    /// the last one.
    pub fn trailing(&self, separator: &str) -> &Self {
        if let Some((last, rest)) = self.lines.split_last() {
            for line in rest {
                line.right_pad(separator);
            }
            last.right_unpad(separator);
        }
        self
    }

    // ========================================================================
    // Broadcast
    // ========================================================================

    fn each(&self, f: impl Fn(&Line)) -> &Self {
        self.lines.iter().for_each(f);
        self
    }

    fn try_each(&self, f: impl Fn(&Line) -> DomainResult<()>) -> DomainResult<&Self> {
        for line in &self.lines {
            f(line)?;
        }
        Ok(self)
    }

    pub fn name(&self, name: &str) -> &Self {
        self.each(|line| {
            line.name(name);
        })
    }

    pub fn replace<'a>(&self, search: &str, replacement: impl Into<Snippet<'a>>) -> &Self {
        let replacement = replacement.into();
        self.each(|line| {
            line.replace(search, replacement);
        })
    }

    pub fn prepend<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into();
        self.each(|line| {
            line.prepend(prefix);
        })
    }

    pub fn append<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into();
        self.each(|line| {
            line.append(suffix);
        })
    }

    pub fn left_pad<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into();
        self.each(|line| {
            line.left_pad(prefix);
        })
    }

    pub fn right_pad<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into();
        self.each(|line| {
            line.right_pad(suffix);
        })
    }

    pub fn left_unpad<'a>(&self, prefix: impl Into<Snippet<'a>>) -> &Self {
        let prefix = prefix.into();
        self.each(|line| {
            line.left_unpad(prefix);
        })
    }

    pub fn right_unpad<'a>(&self, suffix: impl Into<Snippet<'a>>) -> &Self {
        let suffix = suffix.into();
        self.each(|line| {
            line.right_unpad(suffix);
        })
    }

    pub fn indent(&self) -> DomainResult<&Self> {
        self.try_each(|line| line.indent().map(|_| ()))
    }

    pub fn replace_indentation(&self, indentation: Option<&str>) -> DomainResult<&Self> {
        self.try_each(|line| line.replace_indentation(indentation).map(|_| ()))
    }

    /// Remove every member from the document.
    pub fn remove(&self) -> DomainResult<&Self> {
        self.try_each(Line::remove)
    }

    /// Broadcast a line operation given by name.
    ///
    /// Method names are matched in any casing (`left_pad`, `leftPad`,
    /// `left-pad`). Placeholders in the arguments are rewritten for `name`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::UnknownMethod`] for a name that is not a line operation
    /// - [`DomainError::InvalidArguments`] for a wrong argument count
    /// - any error of the operation itself, after the members before the
    ///   failing one were already changed
    pub fn invoke<S: AsRef<str>>(
        &self,
        method: &str,
        args: &[S],
        name: Option<&str>,
    ) -> DomainResult<&Self> {
        let op = LineOp::parse(method, args)?;
        self.try_each(|line| op.apply(line, name))
    }
}

impl Deref for LineCollection {
    type Target = [Line];

    fn deref(&self) -> &Self::Target {
        &self.lines
    }
}

impl DerefMut for LineCollection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.lines
    }
}

impl IntoIterator for LineCollection {
    type Item = Line;
    type IntoIter = std::vec::IntoIter<Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.into_iter()
    }
}

impl<'a> IntoIterator for &'a LineCollection {
    type Item = &'a Line;
    type IntoIter = std::slice::Iter<'a, Line>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl FromIterator<Line> for LineCollection {
    fn from_iter<I: IntoIterator<Item = Line>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Line>> for LineCollection {
    fn from(lines: Vec<Line>) -> Self {
        Self { lines }
    }
}

impl From<Line> for LineCollection {
    fn from(line: Line) -> Self {
        Self { lines: vec![line] }
    }
}

impl From<&Line> for LineCollection {
    fn from(line: &Line) -> Self {
        Self {
            lines: vec![line.clone()],
        }
    }
}

impl From<&LineCollection> for LineCollection {
    fn from(lines: &LineCollection) -> Self {
        lines.clone()
    }
}

/// A line operation addressed by name, for broadcasting from data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
    Name(String),
    Replace { search: String, replacement: String },
    Prepend(String),
    Append(String),
    LeftPad(String),
    RightPad(String),
    LeftUnpad(String),
    RightUnpad(String),
    Indent,
    ReplaceIndentation(Option<String>),
    Remove,
}

impl LineOp {
    /// Every method name accepted by [`LineOp::parse`].
    pub const METHODS: &'static [&'static str] = &[
        "name",
        "replace",
        "prepend",
        "append",
        "left_pad",
        "right_pad",
        "left_unpad",
        "right_unpad",
        "indent",
        "replace_indentation",
        "remove",
    ];

    pub fn parse<S: AsRef<str>>(method: &str, args: &[S]) -> DomainResult<Self> {
        let key = split_words(method).join("_");
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();

        let arity = |expected: &str, ok: bool| -> DomainResult<()> {
            if ok {
                Ok(())
            } else {
                Err(DomainError::InvalidArguments {
                    method: key.clone(),
                    expected: expected.to_string(),
                    got: args.len(),
                })
            }
        };
        let single = |make: fn(String) -> LineOp| -> DomainResult<LineOp> {
            arity("1", args.len() == 1)?;
            Ok(make(args[0].to_string()))
        };

        match key.as_str() {
            "name" => single(LineOp::Name),
            "prepend" => single(LineOp::Prepend),
            "append" => single(LineOp::Append),
            "left_pad" => single(LineOp::LeftPad),
            "right_pad" => single(LineOp::RightPad),
            "left_unpad" => single(LineOp::LeftUnpad),
            "right_unpad" => single(LineOp::RightUnpad),
            "replace" => {
                arity("2", args.len() == 2)?;
                Ok(LineOp::Replace {
                    search: args[0].to_string(),
                    replacement: args[1].to_string(),
                })
            }
            "indent" => {
                arity("0", args.is_empty())?;
                Ok(LineOp::Indent)
            }
            "replace_indentation" => {
                arity("0 or 1", args.len() <= 1)?;
                Ok(LineOp::ReplaceIndentation(
                    args.first().map(|s| s.to_string()),
                ))
            }
            "remove" => {
                arity("0", args.is_empty())?;
                Ok(LineOp::Remove)
            }
            _ => Err(DomainError::UnknownMethod {
                name: method.to_string(),
            }),
        }
    }

    /// Apply to one line, rewriting argument placeholders for `name`.
    pub fn apply(&self, line: &Line, name: Option<&str>) -> DomainResult<()> {
        match self {
            LineOp::Name(new_name) => {
                line.name(new_name);
            }
            LineOp::Replace {
                search,
                replacement,
            } => {
                let search = named(search, name).resolve();
                line.replace(&search, named(replacement, name));
            }
            LineOp::Prepend(text) => {
                line.prepend(named(text, name));
            }
            LineOp::Append(text) => {
                line.append(named(text, name));
            }
            LineOp::LeftPad(text) => {
                line.left_pad(named(text, name));
            }
            LineOp::RightPad(text) => {
                line.right_pad(named(text, name));
            }
            LineOp::LeftUnpad(text) => {
                line.left_unpad(named(text, name));
            }
            LineOp::RightUnpad(text) => {
                line.right_unpad(named(text, name));
            }
            LineOp::Indent => {
                line.indent()?;
            }
            LineOp::ReplaceIndentation(indentation) => {
                line.replace_indentation(indentation.as_deref())?;
            }
            LineOp::Remove => line.remove()?,
        }
        Ok(())
    }
}

fn named<'a>(text: &'a str, name: Option<&'a str>) -> Snippet<'a> {
    Snippet::from((text, name))
}

/// Push `line` unless it is a stub or already present (by identity).
fn push_unique(lines: &mut Vec<Line>, line: Line) {
    if !line.is_stub() && !lines.contains(&line) {
        lines.push(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;

    fn doc(lines: &[&str]) -> Document {
        Document::from_text(&lines.join("\n"))
    }

    #[test]
    fn behaves_like_a_slice() {
        let doc = doc(&["a", "b", "c"]);
        let lines = doc.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text(), "b");
        assert_eq!(lines.first().unwrap().text(), "a");
        assert_eq!(lines.last().unwrap().text(), "c");
        let upper: Vec<String> = lines.iter().map(|l| l.text().to_uppercase()).collect();
        assert_eq!(upper, ["A", "B", "C"]);
    }

    #[test]
    fn broadcast_returns_the_collection() {
        let doc = doc(&["a", "b"]);
        let lines = doc.lines();
        lines.prepend("-- ").append(";").left_pad("-- ");
        assert_eq!(doc.text_array(), ["-- a;", "-- b;"]);
    }

    #[test]
    fn named_broadcast() {
        let doc = doc(&["use x;", "use y;"]);
        doc.all("use").append((" // __na me__", "UserProfile"));
        assert_eq!(doc.text_array(), ["use x; // user profile", "use y; // user profile"]);
    }

    #[test]
    fn dive_and_surface_are_inverse() {
        let doc = doc(&["fn a() {", "    x();", "    y();", "}"]);
        let mut block = doc.find("fn a").until_enclosing().unwrap();
        block.dive();
        assert_eq!(block.text_array(), ["    x();", "    y();"]);
        block.surface().unwrap();
        assert_eq!(block.text_array(), ["fn a() {", "    x();", "    y();", "}"]);
        assert!(matches!(block.surface(), Err(DomainError::Boundary { .. })));
    }

    #[test]
    fn dive_on_small_collections() {
        let doc = doc(&["a"]);
        let mut lines = doc.lines();
        lines.dive();
        assert!(lines.is_empty());
        lines.dive();
        assert!(matches!(
            lines.surface(),
            Err(DomainError::EmptyCollection { .. })
        ));
    }

    #[test]
    fn add_keeps_document_order() {
        let doc = doc(&["a", "b", "c", "d"]);
        let mut picked = LineCollection::from(doc.find("d"));
        picked.add(doc.find("b")).add(doc.all("a"));
        assert_eq!(picked.text_array(), ["a", "b", "d"]);
    }

    #[test]
    fn add_with_producer() {
        let doc = doc(&["b", "c"]);
        let mut lines = doc.lines();
        lines
            .add_with(|current| {
                assert_eq!(current.len(), 2);
                doc.prepend(["a"])
            })
            .unwrap();
        assert_eq!(lines.text_array(), ["a", "b", "c"]);
    }

    #[test]
    fn sort_rearranges_the_document() {
        let doc = doc(&["header", "use c;", "use a;", "use b;", "footer"]);
        let mut imports = doc.consecutive("use ").unwrap();
        let slots: Vec<Line> = imports.to_vec();

        imports.sort().unwrap();

        assert_eq!(
            doc.text_array(),
            ["header", "use a;", "use b;", "use c;", "footer"]
        );
        assert_eq!(imports.text_array(), ["use a;", "use b;", "use c;"]);
        for line in &slots {
            assert!(line.index().is_ok());
        }
        assert_eq!(slots[0].index().unwrap(), 3);
    }

    #[test]
    fn sort_keeps_non_members_in_place() {
        let doc = doc(&["z", "keep", "a"]);
        let mut lines = doc.all("z");
        lines.add(doc.find("a"));
        lines.sort().unwrap();
        assert_eq!(doc.text_array(), ["a", "keep", "z"]);
    }

    #[test]
    fn sort_after_add_with_prepended_line() {
        let doc = doc(&["a", "b", "c"]);
        let mut lines = doc.lines();
        lines.add_with(|_| doc.prepend(["d"])).unwrap().sort().unwrap();
        assert_eq!(doc.text_array(), ["a", "b", "c", "d"]);
    }

    #[test]
    fn adding_a_member_twice_keeps_one_copy() {
        let doc = doc(&["b", "a"]);
        let mut lines = doc.lines();
        lines.add(doc.find("b")).add(&doc.find("a"));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.text_array(), ["b", "a"]);

        lines.sort().unwrap();
        assert_eq!(doc.text_array(), ["a", "b"]);
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn sort_ignores_duplicate_members() {
        let doc = doc(&["c", "b", "a"]);
        let b = doc.find("b");
        let mut lines = LineCollection::from(vec![b.clone(), doc.find("c"), b]);
        lines.sort().unwrap();
        assert_eq!(doc.text_array(), ["b", "c", "a"]);
        assert_eq!(lines.text_array(), ["b", "c"]);
    }

    #[test]
    fn sorted_leaves_document_alone() {
        let doc = doc(&["b", "a"]);
        let view = doc.lines().sorted();
        assert_eq!(view.text_array(), ["a", "b"]);
        assert_eq!(doc.text_array(), ["b", "a"]);
    }

    #[test]
    fn trailing_separators() {
        let doc = doc(&["a,", "b", "c,"]);
        doc.lines().trailing(",");
        assert_eq!(doc.text_array(), ["a,", "b,", "c"]);
    }

    #[test]
    fn remove_all_members() {
        let doc = doc(&["keep", "x 1", "x 2"]);
        doc.all("x").remove().unwrap();
        assert_eq!(doc.text_array(), ["keep"]);
    }

    #[test]
    fn invoke_dispatches_by_name() {
        let doc = doc(&["a", "b"]);
        let lines = doc.lines();
        lines.invoke("leftPad", &["> "], None).unwrap();
        lines.invoke("right-pad", &[" __NaMe__"], Some("foo bar")).unwrap();
        assert_eq!(doc.text_array(), ["> a FooBar", "> b FooBar"]);
    }

    #[test]
    fn invoke_rejects_unknown_methods() {
        let doc = doc(&["a"]);
        let err = doc.lines().invoke("explode", &["x"], None).unwrap_err();
        assert_eq!(
            err,
            DomainError::UnknownMethod {
                name: "explode".into()
            }
        );
        assert_eq!(doc.text_array(), ["a"]);
    }

    #[test]
    fn invoke_checks_argument_count() {
        let doc = doc(&["a"]);
        let err = doc.lines().invoke("replace", &["a"], None).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArguments { got: 1, .. }));
    }

    #[test]
    fn line_op_parse_normalises_names() {
        let none: &[&str] = &[];
        assert_eq!(LineOp::parse("indent", none).unwrap(), LineOp::Indent);
        assert_eq!(
            LineOp::parse("replaceIndentation", none).unwrap(),
            LineOp::ReplaceIndentation(None)
        );
        assert_eq!(
            LineOp::parse("RIGHT_UNPAD", &[","]).unwrap(),
            LineOp::RightUnpad(",".into())
        );
    }
}
