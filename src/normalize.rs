//! Field normalization for scraped listing tables.
//!
//! The pipeline core assumes its inputs are already cleaned; these are the
//! functions that uphold that contract. All of them are pure, never panic on
//! malformed input, and signal an unusable value with `None`.

use chrono::NaiveDate;

const ITALIAN_MONTHS: [&str; 12] = [
    "gennaio",
    "febbraio",
    "marzo",
    "aprile",
    "maggio",
    "giugno",
    "luglio",
    "agosto",
    "settembre",
    "ottobre",
    "novembre",
    "dicembre",
];

/// Normalize a listing title for blocking and similarity scoring
///
/// Lowercases, replaces punctuation with spaces, collapses whitespace and
/// sorts the words alphabetically, so that word-order variants of the same
/// property ("Pensione Stella" vs "Stella Pensione") normalize identically.
pub fn normalize_title(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

/// Normalize a city name: trimmed and lowercased.
pub fn normalize_city(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Parse a scraped price such as `"€ 1.234"`
///
/// Strips the euro sign and thousands separators and trims whitespace.
pub fn parse_price(raw: &str) -> Option<u32> {
    raw.replace('€', "").replace('.', "").trim().parse().ok()
}

/// Parse a scraped review count such as `"1.234 recensioni"`
///
/// The "new on <source>" markers mean the property has no reviews yet and
/// map to 0 rather than an unusable value.
pub fn parse_review_count(raw: &str) -> Option<u32> {
    let lowered = raw.trim().to_lowercase();
    if lowered.starts_with("novità su") {
        return Some(0);
    }
    lowered
        .replace("recensioni", "")
        .replace("recensione", "")
        .replace('.', "")
        .trim()
        .parse()
        .ok()
}

/// Parse a distance-to-center phrase into kilometers
///
/// `"in pieno centro"` is 0 km; `"a 1,2 km dal centro"` is 1.2; distances
/// given in meters, `"a 350 m dal centro"`, are converted to kilometers.
/// Comma decimal separators are accepted.
pub fn parse_distance_center(raw: &str) -> Option<f64> {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if lowered == "in pieno centro" {
        return Some(0.0);
    }

    let numeric: String = lowered
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let value: f64 = numeric.replace(',', ".").parse().ok()?;

    if lowered.contains("km") {
        Some(value)
    } else {
        Some(value / 1000.0)
    }
}

/// Parse a review score, accepting the comma decimal separator ("8,5").
pub fn parse_review_score(raw: &str) -> Option<f64> {
    raw.trim().replace(',', ".").parse().ok()
}

/// Parse a stay date
///
/// Accepts ISO `YYYY-MM-DD` directly; otherwise expects the scraped Italian
/// day-month form ("1 luglio") combined with an explicit year.
pub fn parse_stay_date(raw: &str, year: i32) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    let lowered = trimmed.to_lowercase();
    let mut parts = lowered.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month_name = parts.next()?;
    let month = ITALIAN_MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;

    NaiveDate::from_ymd_opt(year, month, day)
}
