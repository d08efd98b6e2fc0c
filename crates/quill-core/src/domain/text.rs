//! Plain text helpers shared by the document model and the file layer.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::encoding;

/// Platform line separator used when serialising a document.
#[cfg(windows)]
pub const EOL: &str = "\r\n";
#[cfg(not(windows))]
pub const EOL: &str = "\n";

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("line break pattern is a valid regex"));

/// Number of leading bytes inspected when sniffing for binary content.
const SNIFF_LEN: usize = 8000;

/// Split text on `\r\n` or `\n`.
///
/// An empty string yields a single empty line, mirroring how an empty file
/// still has one (empty) line when opened in an editor.
pub fn split_lines(text: &str) -> Vec<&str> {
    LINE_BREAK.split(text).collect()
}

/// Leading whitespace of a line.
pub fn indentation(text: &str) -> &str {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| i);
    &text[..end]
}

/// Indent every line of `text` by `amount` spaces.
pub fn spaces(amount: usize, text: &str) -> String {
    let pad = " ".repeat(amount);
    split_lines(text)
        .into_iter()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join(EOL)
}

/// Guess whether `bytes` is binary content.
///
/// A NUL byte anywhere in the sniffed prefix is decisive. Content that is not
/// UTF-8 counts as binary when more than 30% of the sniffed bytes are control
/// characters other than common whitespace, or when no detected encoding
/// decodes it losslessly.
pub fn is_binary(bytes: &[u8]) -> bool {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    if sample.is_empty() {
        return false;
    }
    if sample.contains(&0) {
        return true;
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return false,
        // A multi-byte character cut at the sniff boundary.
        Err(e) if e.error_len().is_none() => return false,
        Err(_) => {}
    }

    let suspicious = sample
        .iter()
        .filter(|&&b| b < 0x20 && !matches!(b, b'\n' | b'\r' | b'\t' | 0x0c | 0x08 | 0x1b))
        .count();

    suspicious * 10 > sample.len() * 3 || encoding::decode(bytes).is_none()
}
