//! Scalar literal evaluation of sampled text
//!
//! Sample values are capitalised (first character upper-case, the rest
//! lower-case) and then read as a literal: `True`/`False`, `None`, integers
//! and floats. Anything else is not a literal and sends the column on to
//! date detection.

use once_cell::sync::Lazy;
use regex::Regex;

static DECIMAL_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(0(_?0)*|[1-9](_?[0-9])*)$").unwrap());

static PREFIXED_INT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?0(x(_?[0-9a-f])+|o(_?[0-7])+|b(_?[01])+)$").unwrap()
});

static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[+-]?((([0-9](_?[0-9])*)?\.[0-9](_?[0-9])*|[0-9](_?[0-9])*\.)(e[+-]?[0-9](_?[0-9])*)?|[0-9](_?[0-9])*e[+-]?[0-9](_?[0-9])*)$",
    )
    .unwrap()
});

static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^('[^'\\]*'|"[^"\\]*")$"#).unwrap());

/// Result of reading one sample as a literal
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    None,
    /// A valid literal that does not map to a numeric or boolean column
    /// (quoted text, integers beyond 64 bits)
    Other,
}

/// First character upper-case, the rest lower-case
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Evaluate a capitalised sample; `None` when the text is not a literal
pub fn eval_literal(value: &str) -> Option<Literal> {
    let text = value.trim();
    match text {
        "True" => return Some(Literal::Bool(true)),
        "False" => return Some(Literal::Bool(false)),
        "None" => return Some(Literal::None),
        _ => {}
    }

    if DECIMAL_INT.is_match(text) {
        return Some(
            text.replace('_', "")
                .parse::<i64>()
                .map(Literal::Int)
                .unwrap_or(Literal::Other),
        );
    }
    if PREFIXED_INT.is_match(text) {
        return Some(parse_prefixed(text).map(Literal::Int).unwrap_or(Literal::Other));
    }
    if FLOAT.is_match(text) {
        return text.replace('_', "").parse::<f64>().ok().map(Literal::Float);
    }
    if QUOTED.is_match(text) {
        return Some(Literal::Other);
    }
    None
}

/// Capitalise then evaluate, as the inferrer does for every sample
pub fn eval_sample(value: &str) -> Option<Literal> {
    eval_literal(&capitalize(value))
}

fn parse_prefixed(text: &str) -> Option<i64> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let radix = match body.as_bytes().get(1) {
        Some(b'x') => 16,
        Some(b'o') => 8,
        Some(b'b') => 2,
        _ => return None,
    };
    let digits = body[2..].replace('_', "");
    let magnitude = i64::from_str_radix(&digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
