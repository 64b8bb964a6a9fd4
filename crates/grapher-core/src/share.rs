//! Share links: the formula list stored in a URL fragment.
//!
//! ```
//! use grapher_core::share::{decode_fragment, encode_fragment};
//!
//! let fragment = encode_fragment(&["x^2", "max(x, 1)"]);
//! assert_eq!(fragment, "#x^2,max(x%2C%201)");
//! assert_eq!(decode_fragment(&fragment).unwrap(), vec!["x^2", "max(x, 1)"]);
//! ```

use std::fmt::Write;

fn needs_escape(c: char) -> bool {
    matches!(c, '%' | ',' | '#') || (c.is_ascii() && c.is_whitespace())
}

fn escape(text: &str, out: &mut String) {
    for c in text.chars() {
        if needs_escape(c) {
            let _ = write!(out, "%{:02X}", c as u32);
        } else {
            out.push(c);
        }
    }
}

fn unescape(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Encode formula texts as a URL fragment, `#` included.
#[must_use]
pub fn encode_fragment<S: AsRef<str>>(texts: &[S]) -> String {
    let mut out = String::from("#");
    for (i, text) in texts.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        escape(text.as_ref(), &mut out);
    }
    out
}

/// Decode a URL fragment (with or without the leading `#`).
///
/// Returns `None` when the fragment is empty. Any percent-encoded sequence
/// is decoded, so fragments rewritten by the browser still round-trip.
#[must_use]
pub fn decode_fragment(fragment: &str) -> Option<Vec<String>> {
    let body = fragment.strip_prefix('#').unwrap_or(fragment);
    if body.is_empty() {
        return None;
    }
    Some(body.split(',').map(unescape).collect())
}
