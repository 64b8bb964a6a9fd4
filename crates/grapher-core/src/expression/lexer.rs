//! Tokenizer for formula text.

use crate::error::{ParseError, ParseErrorKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Caret,
    LParen,
    RParen,
    Pipe,
    Comma,
}

/// A token and the byte range it covers in the source.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            '+' => TokenKind::Plus,
            '-' | '\u{2212}' => TokenKind::Minus,
            '*' | '\u{00d7}' | '\u{00b7}' => TokenKind::Star,
            '/' | '\u{00f7}' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '^' => TokenKind::Caret,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '|' => TokenKind::Pipe,
            ',' => TokenKind::Comma,
            c if c.is_ascii_digit() || c == '.' => {
                let end = scan_number(source, start);
                let invalid = |end: usize| {
                    ParseError::new(
                        ParseErrorKind::InvalidNumber(source[start..end].to_string()),
                        start,
                    )
                };
                // `1.2.3` is one malformed literal, not `1.2` times `.3`.
                if source[end..].starts_with('.') {
                    let rest = source[end..]
                        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
                        .map_or(source.len(), |n| end + n);
                    return Err(invalid(rest));
                }
                while chars.peek().is_some_and(|&(i, _)| i < end) {
                    chars.next();
                }
                let value = source[start..end]
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| invalid(end))?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    start,
                    end,
                });
                continue;
            }
            c if c.is_alphabetic() => {
                let mut end = start;
                while let Some(&(i, ch)) = chars.peek() {
                    if ch.is_alphanumeric() || ch == '_' {
                        end = i + ch.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(source[start..end].to_lowercase()),
                    start,
                    end,
                });
                continue;
            }
            other => {
                return Err(ParseError::new(ParseErrorKind::UnexpectedChar(other), start));
            }
        };

        chars.next();
        tokens.push(Token {
            kind,
            start,
            end: start + c.len_utf8(),
        });
    }

    Ok(tokens)
}

/// End offset of the numeric literal starting at `start`.
///
/// An `e` only opens an exponent when digits follow, so `2e` stays
/// `2` times the constant `e`.
fn scan_number(source: &str, start: usize) -> usize {
    let bytes = source.as_bytes();
    let mut i = start;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}
