use std::borrow::Cow;

use crate::domain::casing::substitute;

/// A text argument that may carry a name for placeholder substitution.
///
/// Plain strings convert without a name and are used verbatim:
///
/// ```rust
/// use quill_core::domain::{Document, Snippet};
///
/// let doc = Document::from_text("mod a;");
/// let line = doc.find("mod a;");
/// line.append(" // plain");
/// line.append(Snippet::named(" // __NaMe__", "user_profile"));
/// assert_eq!(line.text(), "mod a; // plain // UserProfile");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'a> {
    text: &'a str,
    name: Option<&'a str>,
}

impl<'a> Snippet<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, name: None }
    }

    pub fn named(text: &'a str, name: &'a str) -> Self {
        Self {
            text,
            name: Some(name),
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn name(&self) -> Option<&'a str> {
        self.name
    }

    /// The text with every placeholder rewritten for the carried name.
    pub fn resolve(&self) -> Cow<'a, str> {
        substitute(self.text, self.name)
    }
}

impl<'a> From<&'a str> for Snippet<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text)
    }
}

impl<'a> From<&'a String> for Snippet<'a> {
    fn from(text: &'a String) -> Self {
        Self::new(text)
    }
}

impl<'a> From<(&'a str, &'a str)> for Snippet<'a> {
    fn from((text, name): (&'a str, &'a str)) -> Self {
        Self::named(text, name)
    }
}

impl<'a> From<(&'a str, Option<&'a str>)> for Snippet<'a> {
    fn from((text, name): (&'a str, Option<&'a str>)) -> Self {
        Self { text, name }
    }
}
