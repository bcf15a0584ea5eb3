//! Locating the expressions interpolated into f-strings
//!
//! The parser keeps a string literal (implicit concatenation included) as one token. This module
//! scans such a token and returns the byte ranges of the `{...}` expressions of every part that
//! carries an `f` prefix, so they can be parsed and rewritten on their own. Conversions (`!r`),
//! the debug marker (`=`) and format specs are excluded from the ranges; replacement fields nested
//! inside a format spec are reported as ranges of their own.

use std::ops::Range;

/// Whether a string token has at least one part with an `f` prefix
pub(crate) fn is_fstring(literal: &str) -> bool {
    literal_parts(literal).any(|prefix| prefix.contains(['f', 'F']))
}

/// Byte ranges of the interpolated expressions, in source order
pub(crate) fn interpolation_spans(literal: &str) -> Vec<Range<usize>> {
    let b = literal.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < b.len() {
        match b[i] {
            b'#' => {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || is_quote(c) => {
                let start = i;
                while i < b.len() && b[i].is_ascii_alphabetic() {
                    i += 1;
                }
                if i >= b.len() || !is_quote(b[i]) {
                    continue;
                }
                let interpolated = literal[start..i].contains(['f', 'F']);
                i = scan_body(b, i, interpolated, &mut spans);
            }
            _ => i += 1,
        }
    }
    spans
}

fn literal_parts(literal: &str) -> impl Iterator<Item = &str> {
    let b = literal.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < b.len() {
            if b[i] == b'#' {
                while i < b.len() && b[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            if !(b[i].is_ascii_alphabetic() || is_quote(b[i])) {
                i += 1;
                continue;
            }
            let start = i;
            while i < b.len() && b[i].is_ascii_alphabetic() {
                i += 1;
            }
            if i >= b.len() || !is_quote(b[i]) {
                continue;
            }
            let prefix = &literal[start..i];
            i = skip_quoted(b, i);
            return Some(prefix);
        }
        None
    })
}

fn is_quote(c: u8) -> bool {
    c == b'"' || c == b'\''
}

fn quote_len(b: &[u8], i: usize) -> usize {
    let q = b[i];
    if b.get(i + 1) == Some(&q) && b.get(i + 2) == Some(&q) {
        3
    } else {
        1
    }
}

fn closes(b: &[u8], i: usize, quote: u8, len: usize) -> bool {
    (0..len).all(|k| b.get(i + k) == Some(&quote))
}

/// Skip a quoted literal starting at its opening quote; returns the index past its closing quote
fn skip_quoted(b: &[u8], mut i: usize) -> usize {
    let quote = b[i];
    let len = quote_len(b, i);
    i += len;
    while i < b.len() {
        if b[i] == b'\\' {
            i += 2;
        } else if closes(b, i, quote, len) {
            return i + len;
        } else {
            i += 1;
        }
    }
    b.len()
}

fn scan_body(b: &[u8], mut i: usize, interpolated: bool, spans: &mut Vec<Range<usize>>) -> usize {
    let quote = b[i];
    let len = quote_len(b, i);
    i += len;
    while i < b.len() {
        match b[i] {
            b'\\' => i += 2,
            c if c == quote && closes(b, i, quote, len) => return i + len,
            b'{' if interpolated => {
                if b.get(i + 1) == Some(&b'{') {
                    i += 2;
                } else {
                    i = scan_field(b, i + 1, spans);
                }
            }
            _ => i += 1,
        }
    }
    b.len()
}

/// Scan one replacement field starting just after its `{`; returns the index past its `}`
fn scan_field(b: &[u8], mut i: usize, spans: &mut Vec<Range<usize>>) -> usize {
    let start = i;
    let mut depth = 0usize;
    let end = loop {
        let Some(&c) = b.get(i) else {
            return b.len();
        };
        match c {
            b'\'' | b'"' => {
                i = skip_quoted(b, i);
                continue;
            }
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'}' if depth > 0 => depth -= 1,
            b'}' => break i,
            b'!' if depth == 0 && b.get(i + 1) != Some(&b'=') => break i,
            b':' if depth == 0 => break i,
            b'=' if depth == 0 && is_debug_marker(b, i) => break i,
            _ => {}
        }
        i += 1;
    };
    spans.push(start..end);

    i = end;
    while let Some(&c) = b.get(i) {
        match c {
            b'}' => return i + 1,
            b'{' => i = scan_field(b, i + 1, spans),
            _ => i += 1,
        }
    }
    b.len()
}

/// `{x=}`, `{x = !r}` and friends, as opposed to comparison operators
fn is_debug_marker(b: &[u8], i: usize) -> bool {
    if i > 0 && matches!(b[i - 1], b'=' | b'!' | b'<' | b'>') {
        return false;
    }
    let next = b[i + 1..].iter().find(|c| !c.is_ascii_whitespace());
    matches!(next, Some(b'!' | b':' | b'}'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exprs(literal: &str) -> Vec<&str> {
        interpolation_spans(literal)
            .into_iter()
            .map(|span| &literal[span])
            .collect()
    }

    #[test]
    fn test_plain_fields() {
        assert_eq!(exprs(r#"f"{x} and {y + 1}""#), vec!["x", "y + 1"]);
        assert_eq!(exprs(r#"f'{{literal}} {x}'"#), vec!["x"]);
    }

    #[test]
    fn test_conversion_spec_and_debug_marker() {
        assert_eq!(exprs(r#"f"{x!r:>{width}} {y=} {a != b}""#), vec!["x", "width", "y", "a != b"]);
        assert_eq!(exprs(r#"f"{d['k']:>10}""#), vec!["d['k']"]);
        assert_eq!(exprs(r#"f"{ {'a': 1}['a'] }""#), vec![" {'a': 1}['a'] "]);
    }

    #[test]
    fn test_only_prefixed_parts_are_scanned() {
        let literal = "\"{raw}\" f'{x}'\n    rb\"{y}\"";
        assert_eq!(exprs(literal), vec!["x"]);
        assert!(is_fstring(literal));
        assert!(!is_fstring("'{x}' \"{y}\""));
        assert!(is_fstring("F'''{x}'''"));
    }

    #[test]
    fn test_triple_quoted_body() {
        assert_eq!(exprs("f\"\"\"a \"quoted\" {x}\n{y}\"\"\""), vec!["x", "y"]);
    }
}
