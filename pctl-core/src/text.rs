//! Operator text helpers
//!
//! One tokenizer serves both the operator command protocol and the
//! sequence language: a line is a verb followed by comma-separated
//! arguments. Keywords compare case-insensitively.

use core::fmt;

use heapless::String;

/// Capacity of an operator input line
pub const LINE_CAPACITY: usize = 128;

/// One line of operator input
pub type Line = String<LINE_CAPACITY>;

/// Split a line into its verb and the remainder after the first comma
pub fn split_verb(line: &str) -> (&str, &str) {
    let line = line.trim();
    match line.split_once(',') {
        Some((verb, rest)) => (verb.trim(), rest.trim()),
        None => (line, ""),
    }
}

/// Iterate the comma-separated arguments of a remainder
///
/// An empty remainder yields no arguments.
pub fn arguments(rest: &str) -> impl Iterator<Item = &str> {
    let rest = rest.trim();
    rest.split(',')
        .map(str::trim)
        .filter(move |_| !rest.is_empty())
}

/// Parse a signed decimal integer
pub fn parse_int(token: &str) -> Option<i32> {
    token.trim().parse().ok()
}

/// Parse a decimal number into thousandths
///
/// `"1.25"` becomes 1250 and `"-0.5"` becomes -500. Digits past the third
/// decimal place are truncated.
pub fn parse_milli(token: &str) -> Option<i32> {
    let token = token.trim();
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };

    let (whole, frac) = match digits.split_once('.') {
        Some((w, f)) => (w, f),
        None => (digits, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let whole: i32 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut fraction = 0i32;
    let mut scale = 100;
    for b in frac.bytes().take(3) {
        fraction += i32::from(b - b'0') * scale;
        scale /= 10;
    }

    let magnitude = whole.checked_mul(1000)?.checked_add(fraction)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Fixed-point display of a milli-unit value with three decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milli(pub i32);

impl fmt::Display for Milli {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:03}", sign, abs / 1000, abs % 1000)
    }
}
