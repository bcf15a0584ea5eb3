//! Literal values carried by instructions and their Python semantics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Python keywords that can never be used as identifiers
const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// A literal or name value
///
/// Serialized untagged, so recipes read naturally: `10`, `2.5`, `true`, `"name"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Whether this value is a usable Python identifier
    pub fn is_identifier(&self) -> bool {
        self.as_str().is_some_and(is_identifier)
    }

    /// Compare against the text of a literal or identifier token of the given kind
    ///
    /// Integers and floats compare numerically. Booleans never equal numbers. Strings compare
    /// against the decoded value of plain and raw string literals, and against identifier names.
    pub fn matches_token(&self, kind: &str, text: &str) -> bool {
        match (self, kind) {
            (Value::Str(name), "identifier") => name == text,
            (Value::Str(s), "string") => decode_string(text).is_some_and(|decoded| &decoded == s),
            (Value::Bool(b), "true") => *b,
            (Value::Bool(b), "false") => !*b,
            (Value::Int(i), "integer") => parse_int(text) == Some(*i as i128),
            (Value::Int(i), "float") => parse_float(text) == Some(*i as f64),
            (Value::Float(f), "integer") => parse_int(text).is_some_and(|n| n as f64 == *f),
            (Value::Float(f), "float") => parse_float(text) == Some(*f),
            _ => false,
        }
    }

    /// Render as Python source for a literal position
    pub fn to_python_literal(&self) -> String {
        match self {
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) if f.is_nan() => "float('nan')".to_string(),
            Value::Float(f) if f.is_infinite() => {
                if *f > 0.0 {
                    "float('inf')".to_string()
                } else {
                    "-float('inf')".to_string()
                }
            }
            Value::Float(f) => format!("{:?}", f),
            Value::Str(s) => quote_string(s),
        }
    }

    /// Grammar kind of the literal produced by [`Value::to_python_literal`]
    pub fn literal_kind(&self) -> &'static str {
        match self {
            Value::Bool(true) => "true",
            Value::Bool(false) => "false",
            Value::Int(_) => "integer",
            Value::Float(f) if f.is_finite() => "float",
            Value::Float(_) => "call",
            Value::Str(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_python_literal()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic());
    valid_start
        && chars.all(|c| c == '_' || c.is_alphanumeric())
        && !KEYWORDS.contains(&name)
}

fn parse_int(text: &str) -> Option<i128> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let cleaned = cleaned.trim_end_matches(['l', 'L']);
    if cleaned.ends_with(['j', 'J']) {
        return None;
    }
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i128::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if cleaned.ends_with(['j', 'J']) {
        return None;
    }
    cleaned.parse().ok()
}

/// Decode a plain or raw string literal; `None` for bytes, f-strings and malformed text
pub fn decode_string(literal: &str) -> Option<String> {
    let quote_start = literal.find(['\'', '"'])?;
    let prefix = literal[..quote_start].to_ascii_lowercase();
    if prefix.chars().any(|c| !matches!(c, 'r' | 'u')) {
        return None;
    }
    let raw = prefix.contains('r');
    let body = &literal[quote_start..];

    let delimiter = ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|d| body.starts_with(d) && body.len() >= 2 * d.len() && body.ends_with(d))?;
    let inner = &body[delimiter.len()..body.len() - delimiter.len()];

    if raw {
        Some(inner.to_string())
    } else {
        Some(unescape(inner))
    }
}

fn unescape(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'a' => out.push('\u{07}'),
            'b' => out.push('\u{08}'),
            'f' => out.push('\u{0c}'),
            'v' => out.push('\u{0b}'),
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits: String = (0..width).filter_map(|_| chars.next_if(|c| c.is_ascii_hexdigit())).collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut digits = next.to_string();
                while digits.len() < 3 {
                    match chars.next_if(|c| ('0'..='7').contains(c)) {
                        Some(d) => digits.push(d),
                        None => break,
                    }
                }
                match u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push('\\');
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Quote a string the way Python's `repr` does
pub fn quote_string(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_matching() {
        assert!(Value::Int(10).matches_token("integer", "10"));
        assert!(Value::Int(10).matches_token("integer", "0xa"));
        assert!(Value::Int(1000).matches_token("integer", "1_000"));
        assert!(Value::Int(2).matches_token("float", "2.0"));
        assert!(Value::Float(2.5).matches_token("float", "2.5"));
        assert!(Value::Float(3.0).matches_token("integer", "3"));
        assert!(!Value::Int(10).matches_token("integer", "10j"));
        assert!(!Value::Int(1).matches_token("true", "True"));
        assert!(Value::Bool(true).matches_token("true", "True"));
        assert!(!Value::Bool(true).matches_token("false", "False"));
    }

    #[test]
    fn test_string_matching() {
        assert!(Value::from("hello").matches_token("string", "'hello'"));
        assert!(Value::from("hello").matches_token("string", "\"\"\"hello\"\"\""));
        assert!(Value::from("a\nb").matches_token("string", "'a\\nb'"));
        assert!(Value::from("a\\nb").matches_token("string", "r'a\\nb'"));
        assert!(!Value::from("hello").matches_token("string", "b'hello'"));
        assert!(!Value::from("hello").matches_token("string", "f'hello'"));
        assert!(Value::from("count").matches_token("identifier", "count"));
        assert!(!Value::Int(1).matches_token("identifier", "count"));
    }

    #[test]
    fn test_decode_escapes() {
        assert_eq!(decode_string("'\\x41\\u00e9\\101'"), Some("Aé\u{41}".to_string()));
        assert_eq!(decode_string("'it\\'s'"), Some("it's".to_string()));
        assert_eq!(decode_string("'\\q'"), Some("\\q".to_string()));
    }

    #[test]
    fn test_python_literal_rendering() {
        assert_eq!(Value::Int(20).to_python_literal(), "20");
        assert_eq!(Value::Float(20.0).to_python_literal(), "20.0");
        assert_eq!(Value::Bool(false).to_python_literal(), "False");
        assert_eq!(Value::from("it's").to_python_literal(), "\"it's\"");
        assert_eq!(Value::from("a'b\"c").to_python_literal(), "'a\\'b\"c'");
        assert_eq!(Value::from("tab\there").to_python_literal(), "'tab\\there'");
        assert_eq!(Value::Float(f64::INFINITY).to_python_literal(), "float('inf')");
    }

    #[test]
    fn test_identifier_rules() {
        assert!(is_identifier("total_2"));
        assert!(is_identifier("_private"));
        assert!(!is_identifier("2fast"));
        assert!(!is_identifier("class"));
        assert!(!is_identifier("a-b"));
        assert!(Value::from("renamed").is_identifier());
        assert!(!Value::Int(3).is_identifier());
    }
}
