//! Transaction dates. Each configured format is tried in order.

use chrono::NaiveDate;

/// Parse `s` with the first format in `formats` that accepts it.
///
/// Impossible dates like "2024-13-40" or "02/30/2024" are rejected rather
/// than rolled over.
pub fn parse_date<S: AsRef<str>>(s: &str, formats: &[S]) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt.as_ref()).ok())
}
