//! Charset detection on input and encoding on output.
//!
//! Input bytes are decoded by sniffing a byte order mark, then checking the
//! XML declaration's `encoding` pseudo-attribute, and handing the actual
//! conversion to `encoding_rs`. Output text is encoded the same way, except
//! for UTF-16, which `encoding_rs` only decodes.

use std::fmt;

use tracing::{debug, warn};

use crate::parser::input::pseudo_attribute;

/// An error that occurs during charset detection or conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingError {
    /// A human-readable description of the failure.
    pub message: String,
}

impl EncodingError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "encoding error: {}", self.message)
    }
}

impl std::error::Error for EncodingError {}

/// Text decoded from raw input bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// The document text, without any byte order mark.
    pub text: String,
    /// Canonical name of the charset the bytes were read as.
    pub encoding: &'static str,
    /// Whether the input started with a byte order mark.
    pub had_bom: bool,
}

/// Detects the encoding of an XML byte stream by inspecting the byte order mark.
///
/// Returns the encoding name and the number of BOM bytes to skip. Without a
/// BOM the answer is UTF-8 with nothing to skip.
///
/// # Examples
///
/// ```
/// use xmltrip::encoding::detect_encoding;
///
/// assert_eq!(detect_encoding(b"\xEF\xBB\xBF<a/>"), ("UTF-8", 3));
/// assert_eq!(detect_encoding(b"\xFF\xFE<\x00"), ("UTF-16LE", 2));
/// assert_eq!(detect_encoding(b"<a/>"), ("UTF-8", 0));
/// ```
#[must_use]
pub fn detect_encoding(bytes: &[u8]) -> (&'static str, usize) {
    match bytes {
        [0xEF, 0xBB, 0xBF, ..] => ("UTF-8", 3),
        [0xFE, 0xFF, ..] => ("UTF-16BE", 2),
        [0xFF, 0xFE, ..] => ("UTF-16LE", 2),
        _ => ("UTF-8", 0),
    }
}

/// Looks up an encoding by label, case-insensitively.
fn lookup(label: &str) -> Option<&'static encoding_rs::Encoding> {
    encoding_rs::Encoding::for_label(label.trim().as_bytes())
}

/// Returns `true` if `label` names a charset `encoding_rs` knows.
#[must_use]
pub fn is_known_label(label: &str) -> bool {
    lookup(label).is_some()
}

/// Returns `true` if the named charset is a Unicode encoding that can carry
/// a byte order mark.
#[must_use]
pub fn supports_bom(label: &str) -> bool {
    lookup(label).is_some_and(|e| {
        e == encoding_rs::UTF_8 || e == encoding_rs::UTF_16LE || e == encoding_rs::UTF_16BE
    })
}

/// Decodes `bytes` from the named charset.
///
/// # Errors
///
/// Fails if the label is unknown or the bytes are malformed for it.
pub fn transcode(bytes: &[u8], label: &str) -> Result<(String, &'static str), EncodingError> {
    let encoding =
        lookup(label).ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        return Err(EncodingError::new(format!(
            "malformed byte sequence for encoding {label}"
        )));
    }
    Ok((text.into_owned(), encoding.name()))
}

/// Returns the `encoding` pseudo-attribute of a leading XML declaration.
#[must_use]
pub fn declared_encoding(text: &str) -> Option<String> {
    if !text.starts_with("<?xml") {
        return None;
    }
    let end = text.find("?>")?;
    pseudo_attribute(&text[..end], "encoding")
}

/// Reads a declared encoding straight from bytes in an ASCII-compatible
/// charset that is not valid UTF-8.
fn declared_encoding_ascii(bytes: &[u8]) -> Option<String> {
    let limit = bytes.len().min(200);
    let scan = &bytes[..limit];
    let end = scan.windows(2).position(|w| w == b"?>")?;
    let decl: String = scan[..end]
        .iter()
        .take_while(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect();
    declared_encoding(&format!("{decl}?>"))
}

/// Decodes raw XML bytes to UTF-8 text.
///
/// 1. A byte order mark picks the initial charset and is stripped.
/// 2. Valid UTF-8 input is used as-is unless its declaration names another
///    charset, in which case the bytes are re-read in that charset.
/// 3. A declaration that disagrees with a UTF-16 BOM wins, as long as it
///    is not just the generic `UTF-16` label.
///
/// # Errors
///
/// Fails on malformed bytes or an unknown declared charset.
///
/// # Examples
///
/// ```
/// use xmltrip::encoding::decode_to_utf8;
///
/// let decoded = decode_to_utf8(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>caf\xE9</a>").unwrap();
/// assert!(decoded.text.ends_with("<a>caf\u{e9}</a>"));
/// assert_eq!(decoded.encoding, "windows-1252");
/// ```
pub fn decode_to_utf8(bytes: &[u8]) -> Result<Decoded, EncodingError> {
    let (bom_encoding, bom_skip) = detect_encoding(bytes);
    let content = &bytes[bom_skip..];
    let had_bom = bom_skip > 0;

    let (text, encoding) = if bom_encoding == "UTF-8" {
        match std::str::from_utf8(content) {
            Ok(s) => match declared_encoding(s) {
                Some(declared) if !is_utf8_label(&declared) => transcode(content, &declared)?,
                _ => (s.to_string(), "UTF-8"),
            },
            Err(_) => match declared_encoding_ascii(content) {
                Some(declared) => transcode(content, &declared)?,
                None => return Err(EncodingError::new("input is not valid UTF-8")),
            },
        }
    } else {
        let (initial, name) = transcode(content, bom_encoding)?;
        match declared_encoding(&initial) {
            Some(declared)
                if !declared.eq_ignore_ascii_case("UTF-16")
                    && !declared.eq_ignore_ascii_case(bom_encoding) =>
            {
                debug!(%declared, bom = bom_encoding, "declaration overrides byte order mark");
                transcode(content, &declared)?
            }
            _ => (initial, name),
        }
    };

    Ok(Decoded {
        text,
        encoding,
        had_bom,
    })
}

/// Encodes UTF-8 text into the named charset.
///
/// Characters the target charset cannot represent become numeric character
/// references, which is still well-formed XML.
///
/// # Errors
///
/// Fails if the label is unknown.
///
/// # Examples
///
/// ```
/// use xmltrip::encoding::encode_from_utf8;
///
/// assert_eq!(encode_from_utf8("<a>\u{e9}</a>", "ISO-8859-1").unwrap(), b"<a>\xE9</a>");
/// assert_eq!(encode_from_utf8("<a/>", "UTF-16LE").unwrap()[..2], [b'<', 0]);
/// ```
pub fn encode_from_utf8(text: &str, label: &str) -> Result<Vec<u8>, EncodingError> {
    let encoding =
        lookup(label).ok_or_else(|| EncodingError::new(format!("unsupported encoding: {label}")))?;

    if encoding == encoding_rs::UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == encoding_rs::UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }

    let (bytes, used, had_unmappable) = encoding.encode(text);
    if had_unmappable {
        warn!(
            encoding = used.name(),
            "unmappable characters written as character references"
        );
    }
    Ok(bytes.into_owned())
}

/// Returns `true` if the label is a recognized alias for UTF-8.
fn is_utf8_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}
