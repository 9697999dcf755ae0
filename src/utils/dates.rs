// src/utils/dates.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

// Two-digit years at or below this pivot resolve to the 2000s.
const TWO_DIGIT_YEAR_PIVOT: u32 = 50;

// --- Regex Patterns (Lazy Static) ---
// 9/13/2029, 09/13/29, 9-13-2029
static NUMERIC_MDY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})\b").expect("Failed to compile NUMERIC_MDY_RE")
});

// 9/2029 (month/year only, no day)
static NUMERIC_MY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})/(\d{4})\b").expect("Failed to compile NUMERIC_MY_RE")
});

// September 13, 2029 / Sep 13 2029
static MONTH_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+(\d{1,2}),?\s+(\d{4})\b",
    )
    .expect("Failed to compile MONTH_NAME_RE")
});

/// Combined pattern for "any date-like token", used to scan prose windows.
pub static DATE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:\d{1,2}[/-]\d{1,2}[/-]\d{2,4}|\d{1,2}/\d{4}|(?:January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)\.?\s+\d{1,2},?\s+\d{4})\b",
    )
    .expect("Failed to compile DATE_TOKEN_RE")
});

fn resolve_year(raw: u32) -> i32 {
    if raw >= 100 {
        raw as i32
    } else if raw <= TWO_DIGIT_YEAR_PIVOT {
        2000 + raw as i32
    } else {
        1900 + raw as i32
    }
}

fn month_number(name: &str) -> Option<u32> {
    let key = name.trim_end_matches('.').to_ascii_lowercase();
    let month = match key.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parses one date-like token in any of the shapes filings use:
/// `M/D/YYYY`, `M/D/YY` (pivot ≤50 → 2000s), `M/YYYY` (first of month),
/// and `Month D, YYYY`. Returns `None` rather than erroring on junk.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();

    if let Some(caps) = NUMERIC_MDY_RE.captures(token) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        let year = resolve_year(caps[3].parse().ok()?);
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = NUMERIC_MY_RE.captures(token) {
        let month: u32 = caps[1].parse().ok()?;
        let year: i32 = caps[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }

    if let Some(caps) = MONTH_NAME_RE.captures(token) {
        let month = month_number(&caps[1])?;
        let day: u32 = caps[2].parse().ok()?;
        let year: i32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parses_full_numeric_dates() {
        assert_eq!(parse_date_token("9/13/2029"), Some(date(2029, 9, 13)));
        assert_eq!(parse_date_token("12-01-2026"), Some(date(2026, 12, 1)));
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_date_token("9/13/29"), Some(date(2029, 9, 13)));
        assert_eq!(parse_date_token("6/30/50"), Some(date(2050, 6, 30)));
        assert_eq!(parse_date_token("6/30/51"), Some(date(1951, 6, 30)));
    }

    #[test]
    fn test_month_year_normalizes_to_first_of_month() {
        assert_eq!(parse_date_token("9/2029"), Some(date(2029, 9, 1)));
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(parse_date_token("September 13, 2029"), Some(date(2029, 9, 13)));
        assert_eq!(parse_date_token("Sep 13 2029"), Some(date(2029, 9, 13)));
    }

    #[test]
    fn test_junk_returns_none() {
        assert_eq!(parse_date_token("13/45/2029"), None);
        assert_eq!(parse_date_token("not a date"), None);
    }
}
