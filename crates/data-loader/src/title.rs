//! Title normalization.
//!
//! MovieLens titles embed the release year: "Heat (1995)". Some also carry
//! alternate titles in parentheses, so the year is the *last* group that is
//! exactly four digits, not the last parenthetical group.

use regex::Regex;
use std::sync::LazyLock;

/// A parenthesized four-digit year. `\d` is Unicode-aware, so "(٢٠٠٠)"
/// is a year too.
static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("year pattern is valid"));

/// A single decimal digit of any script
static DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d$").expect("digit pattern is valid"));

/// Split a raw title into (clean title, year).
///
/// Example: "Othello (Child's Play) (1997)" -> ("Othello (Child's Play)", 1997)
///          "Alien" -> ("Alien", 0)
pub fn normalize_title(raw: &str) -> (String, i32) {
    let Some(caps) = YEAR_PATTERN.captures_iter(raw).last() else {
        return (raw.trim().to_string(), 0);
    };

    let (Some(whole), Some(digits)) = (caps.get(0), caps.get(1)) else {
        return (raw.trim().to_string(), 0);
    };

    let year = digits
        .as_str()
        .chars()
        .fold(0, |year, c| year * 10 + digit_value(c));

    let mut title = String::with_capacity(raw.len());
    title.push_str(&raw[..whole.start()]);
    title.push_str(&raw[whole.end()..]);

    (title.trim().to_string(), year)
}

/// Numeric value of a decimal digit.
///
/// Every script's digits are encoded as runs of ten consecutive code points
/// from zero to nine, so the value is the distance from the start of the
/// run, modulo ten for scripts with several runs back to back.
fn digit_value(c: char) -> i32 {
    if let Some(value) = c.to_digit(10) {
        return value as i32;
    }
    let code = c as u32;
    let mut start = code;
    while let Some(previous) = start.checked_sub(1).and_then(char::from_u32) {
        if !is_digit(previous) {
            break;
        }
        start -= 1;
    }
    ((code - start) % 10) as i32
}

fn is_digit(c: char) -> bool {
    let mut buf = [0u8; 4];
    DIGIT.is_match(c.encode_utf8(&mut buf))
}
