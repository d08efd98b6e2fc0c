//! Text encoding detection and lossless conversion.
//!
//! Files are decoded only when re-encoding the decoded text reproduces the
//! original bytes exactly. Anything else is treated as binary and copied
//! byte for byte.

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Encoding a text file was read with, reused when it is written back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    #[default]
    Utf8,
    Utf8Bom,
    /// A single- or multi-byte legacy encoding known to `encoding_rs`
    /// (e.g. "windows-1252").
    Legacy(&'static str),
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf8Bom => write!(f, "UTF-8 BOM"),
            Self::Legacy(name) => write!(f, "{name}"),
        }
    }
}

/// Guess the encoding of raw bytes.
pub fn detect_encoding(bytes: &[u8]) -> TextEncoding {
    if bytes.starts_with(&UTF8_BOM) {
        return TextEncoding::Utf8Bom;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return TextEncoding::Utf8;
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    TextEncoding::Legacy(detector.guess(None, true).name())
}

/// Decode `bytes`, or `None` when they cannot be decoded losslessly.
pub fn decode(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    let encoding = detect_encoding(bytes);
    let text = match encoding {
        TextEncoding::Utf8 => String::from_utf8(bytes.to_vec()).ok()?,
        TextEncoding::Utf8Bom => String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).ok()?,
        TextEncoding::Legacy(name) => {
            let legacy = legacy_encoding(name)?;
            legacy
                .decode_without_bom_handling_and_without_replacement(bytes)?
                .into_owned()
        }
    };

    // Legacy decoders may normalise; only accept an exact round trip.
    match encode(&text, encoding) {
        Some(round_trip) if round_trip == bytes => Some((text, encoding)),
        _ => None,
    }
}

/// Encode `text`, or `None` when a character has no mapping in `encoding`.
pub fn encode(text: &str, encoding: TextEncoding) -> Option<Vec<u8>> {
    match encoding {
        TextEncoding::Utf8 => Some(text.as_bytes().to_vec()),
        TextEncoding::Utf8Bom => {
            let mut bytes = UTF8_BOM.to_vec();
            bytes.extend_from_slice(text.as_bytes());
            Some(bytes)
        }
        TextEncoding::Legacy(name) => {
            let legacy = legacy_encoding(name)?;
            let (encoded, _, had_errors) = legacy.encode(text);
            if had_errors {
                return None;
            }
            Some(encoded.into_owned())
        }
    }
}

/// Encodings that `encoding_rs` can write back in the same form.
fn legacy_encoding(name: &str) -> Option<&'static encoding_rs::Encoding> {
    encoding_rs::Encoding::for_label(name.as_bytes())
        .filter(|encoding| encoding.output_encoding() == *encoding)
}
