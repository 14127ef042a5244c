//! Monetary amounts. `.` is the decimal separator; `,` may group thousands.
//!
//! Accepted shapes:
//!   -4.50    4.50    +4.50
//!   -$1,234.56    $-1,234.56    - $14.05
//!   (4.50)   ($1,234.56)         accounting-style negative
//!
//! Magnitudes above [`MAX_ABS_AMOUNT`] are rejected.

use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

/// Largest magnitude accepted for a single row. Keeps window sums far below
/// `Decimal::MAX` so aggregation cannot overflow.
pub const MAX_ABS_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x38D7E, 0, false, 0);

static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(?P<lead>[-+])?\s*\$?\s*(?P<inner>[-+])?",
        r"(?P<int>\d{1,3}(?:,\d{3})+|\d*)",
        r"(?P<frac>\.\d+)?$"
    ))
    .expect("amount pattern compiles")
});

/// Parse a cell into a signed decimal, or `None` if it is not a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    let (body, parenthesized) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (inner.trim(), true),
        None => (s, false),
    };

    let caps = AMOUNT_RE.captures(body)?;
    let int = caps.name("int").map(|m| m.as_str()).unwrap_or("");
    let frac = caps.name("frac").map(|m| m.as_str()).unwrap_or("");
    if int.is_empty() && frac.is_empty() {
        return None;
    }

    let signs: Vec<&str> = ["lead", "inner"]
        .iter()
        .filter_map(|n| caps.name(n).map(|m| m.as_str()))
        .collect();
    if signs.len() > 1 || (parenthesized && !signs.is_empty()) {
        return None;
    }
    let negative = parenthesized || signs.first() == Some(&"-");

    let digits = format!(
        "{}{}{}",
        if negative { "-" } else { "" },
        if int.is_empty() { "0".to_string() } else { int.replace(',', "") },
        frac
    );
    Decimal::from_str(&digits)
        .ok()
        .filter(|d| d.abs() <= MAX_ABS_AMOUNT)
}
