//! Name pattern substitution.
//!
//! Generators write paths and file content with placeholders that spell the
//! word `name` in the casing they want the real name to appear in:
//!
//! | Placeholder   | `name = "fooBar"` | Convention        |
//! |---------------|-------------------|-------------------|
//! | `__na-me__`   | `foo-bar`         | kebab-case        |
//! | `__na_me__`   | `foo_bar`         | snake_case        |
//! | `__NA_ME__`   | `FOO_BAR`         | SCREAMING_SNAKE   |
//! | `__naMe__`    | `fooBar`          | camelCase         |
//! | `__NaMe__`    | `FooBar`          | PascalCase        |
//! | `__na me__`   | `foo bar`         | lower words       |
//! | `__Na Me__`   | `Foo Bar`         | Title Words       |
//! | `__name__`    | `foobar`          | flat              |
//! | `__na-me__s`  | `foo-bars`        | plural kebab-case |
//! | `_NaMe_s`     | `FooBars`         | plural PascalCase |
//!
//! ## Grammar
//!
//! A placeholder is the word `name` split into the halves `na` and `me`,
//! optionally joined by one of `-`, `_`, ` ` or `.`, and wrapped in either
//! double underscores (`__na-me__`) or single underscores. A trailing `s`
//! pluralises the last word. The single-underscore form is only recognised
//! with its plural marker, so ordinary snake_case text such as `user_name_id`
//! passes through untouched.
//!
//! The letters of each half select the case of the words they stand for:
//! `N`/`n` the first letter of the first word, `A`/`a` its remaining letters,
//! `M`/`m` the first letter of every following word, `E`/`e` their remaining
//! letters.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(_{1,2})([nN][aA])([-_ .]?)([mM][eE])(_{1,2})(s?)")
        .expect("placeholder pattern is a valid regex")
});

/// Substitute every name placeholder in `text` when a name is supplied.
///
/// Returns `text` unchanged when `name` is `None`, empty, or contains no
/// word characters. Malformed placeholders pass through unmodified.
pub fn substitute<'a>(text: &'a str, name: Option<&str>) -> Cow<'a, str> {
    match name {
        Some(name) if !name.is_empty() => casex(text, name),
        _ => Cow::Borrowed(text),
    }
}

/// Rewrite every placeholder in `text` into the matching casing of `name`.
pub fn casex<'a>(text: &'a str, name: &str) -> Cow<'a, str> {
    let words = split_words(name);
    if words.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;
    let mut replaced = false;

    while let Some(caps) = PLACEHOLDER.captures_at(text, cursor) {
        let Some(whole) = caps.get(0) else { break };

        match Placeholder::from_captures(&caps, text) {
            Some((placeholder, end)) => {
                out.push_str(&text[copied..whole.start()]);
                out.push_str(&placeholder.render(&words));
                copied = end;
                cursor = end;
                replaced = true;
            }
            // Underscores are ASCII, so skipping one byte stays on a char boundary.
            None => cursor = whole.start() + 1,
        }
    }

    if !replaced {
        return Cow::Borrowed(text);
    }

    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

/// A parsed placeholder: how to case the words and how to join them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    head: WordCase,
    tail: WordCase,
    separator: Option<char>,
    plural: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WordCase {
    first_upper: bool,
    rest_upper: bool,
}

impl WordCase {
    fn from_half(half: &str) -> Self {
        let mut chars = half.chars();
        Self {
            first_upper: chars.next().is_some_and(char::is_uppercase),
            rest_upper: chars.next().is_some_and(char::is_uppercase),
        }
    }

    fn apply(self, word: &str) -> String {
        let mut chars = word.chars();
        let mut out = String::with_capacity(word.len());
        if let Some(first) = chars.next() {
            if self.first_upper {
                out.extend(first.to_uppercase());
            } else {
                out.extend(first.to_lowercase());
            }
        }
        let rest = chars.as_str();
        if self.rest_upper {
            out.push_str(&rest.to_uppercase());
        } else {
            out.push_str(&rest.to_lowercase());
        }
        out
    }
}

impl Placeholder {
    /// Validate a regex match and return the placeholder with the byte offset
    /// where it really ends (a rejected plural `s` is left in the text).
    fn from_captures(caps: &Captures<'_>, text: &str) -> Option<(Self, usize)> {
        let open = caps.get(1)?.as_str().len();
        let close = caps.get(5)?.as_str().len();
        if open != close {
            return None;
        }

        let mut end = caps.get(0)?.end();
        let mut plural = !caps.get(6)?.as_str().is_empty();
        if plural && text[end..].chars().next().is_some_and(char::is_alphanumeric) {
            plural = false;
            end -= 1;
        }

        if open == 1 && !plural {
            return None;
        }

        let placeholder = Self {
            head: WordCase::from_half(caps.get(2)?.as_str()),
            tail: WordCase::from_half(caps.get(4)?.as_str()),
            separator: caps.get(3).and_then(|m| m.as_str().chars().next()),
            plural,
        };

        Some((placeholder, end))
    }

    fn render(&self, words: &[String]) -> String {
        let last = words.len().saturating_sub(1);
        let mut out = String::new();

        for (i, word) in words.iter().enumerate() {
            let word = if self.plural && i == last {
                Cow::Owned(pluralize(word))
            } else {
                Cow::Borrowed(word.as_str())
            };

            if i == 0 {
                out.push_str(&self.head.apply(&word));
            } else {
                if let Some(sep) = self.separator {
                    out.push(sep);
                }
                out.push_str(&self.tail.apply(&word));
            }
        }

        out
    }
}

// ============================================================================
// Word handling
// ============================================================================

/// Split a string into lowercase words based on casing and separators.
///
/// ## Word Boundary Detection
///
/// 1. **Explicit separators:** `_`, `-`, `.`, whitespace → always split
/// 2. **Case transition (camelCase):** `aB` → split between `a` and `B`
/// 3. **Acronym boundary:** `HTTPRequest` → split between `P` and `R`
///    (detected by `Upper Upper Lower` pattern)
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            // "myApp" → "my" + "App"
            if (c.is_lowercase() || c.is_ascii_digit()) && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            // "HTTPServer" → "HTTP" + "Server"
            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("foot", "feet"),
    ("tooth", "teeth"),
];

const UNCOUNTABLE: &[&str] = &["sheep", "fish", "series", "species", "news", "equipment"];

/// English plural of a single lowercase word.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return word.to_string();
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return (*plural).to_string();
    }

    if ["s", "x", "z", "ch", "sh"].iter().any(|end| word.ends_with(end)) {
        return format!("{word}es");
    }

    if let Some(stem) = word.strip_suffix('y') {
        let before_y = stem.chars().last();
        if before_y.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }

    format!("{word}s")
}
