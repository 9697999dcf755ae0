// src/grammar/rates.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::GrammarConfig;

// Below this magnitude a bare spread number reads as a percentage
// ("5.75"); at or above it, as basis points ("575").
const BPS_THRESHOLD: f64 = 30.0;

// --- Regex Patterns (Lazy Static) ---
// Benchmark code, '+', number: "SOFR+575", "S + 5.75%", "EURIBOR + 650".
static REF_SPREAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{1,10})\s*\+\s*(\d+(?:\.\d+)?\s*%?)").expect("Failed to compile REF_SPREAD_RE")
});

static NUMBER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d+(?:\.\d+)?\s*%?").expect("Failed to compile NUMBER_TOKEN_RE")
});

/// Normalizes a rate token to a human-readable percent string. A fractional
/// magnitude ≤ 1.0 is scaled ×100; the trailing `%` marks a value as
/// already normalized, so repeated application is a no-op.
pub fn normalize_percent(token: &str) -> Option<String> {
    let trimmed = token.trim();
    let had_percent = trimmed.ends_with('%');
    let number: f64 = trimmed
        .trim_end_matches('%')
        .trim()
        .replace(',', "")
        .parse()
        .ok()?;
    let value = if !had_percent && number.abs() <= 1.0 {
        number * 100.0
    } else {
        number
    };
    Some(format!("{value:.2}%"))
}

/// Normalizes the number after a benchmark's `+`. Percent-marked values go
/// through [`normalize_percent`]; bare values large enough to be basis
/// points are divided by 100 first.
pub fn normalize_spread(token: &str) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.ends_with('%') {
        return normalize_percent(trimmed);
    }
    let number: f64 = trimmed.replace(',', "").parse().ok()?;
    if number.abs() >= BPS_THRESHOLD {
        Some(format!("{:.2}%", number / 100.0))
    } else {
        normalize_percent(trimmed)
    }
}

/// Resolves a benchmark code against the filer's letter table. Multi-letter
/// codes pass through unchanged; an unmapped single letter stays as written
/// rather than guessing another filer's meaning.
pub fn resolve_benchmark(code: &str, config: &GrammarConfig) -> String {
    if code.chars().count() == 1 {
        for (letter, benchmark) in config.benchmark_letters {
            if code.eq_ignore_ascii_case(letter) {
                return (*benchmark).to_string();
            }
        }
    }
    code.to_string()
}

/// Finds the first `BENCHMARK + number` token and returns the resolved
/// benchmark name with the normalized spread.
pub fn parse_reference_spread(text: &str, config: &GrammarConfig) -> Option<(String, String)> {
    let caps = REF_SPREAD_RE.captures(text)?;
    let benchmark = resolve_benchmark(&caps[1], config);
    let spread = normalize_spread(&caps[2])?;
    Some((benchmark, spread))
}

/// First numeric token in a segment, normalized as a rate.
pub fn first_rate(text: &str) -> Option<String> {
    let m = NUMBER_TOKEN_RE.find(text)?;
    normalize_percent(m.as_str())
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::config;

    #[test]
    fn test_fraction_and_whole_number_normalize_the_same() {
        assert_eq!(normalize_percent("0.0895").as_deref(), Some("8.95%"));
        assert_eq!(normalize_percent("8.95").as_deref(), Some("8.95%"));
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let once = normalize_percent("0.0895").unwrap();
        let twice = normalize_percent(&once).unwrap();
        assert_eq!(once, twice);

        // A genuine sub-1% rate is not rescaled once marked.
        assert_eq!(normalize_percent("0.50%").as_deref(), Some("0.50%"));
    }

    #[test]
    fn test_basis_point_spreads_convert() {
        assert_eq!(normalize_spread("650").as_deref(), Some("6.50%"));
        assert_eq!(normalize_spread("575").as_deref(), Some("5.75%"));
        assert_eq!(normalize_spread("5.75%").as_deref(), Some("5.75%"));
        assert_eq!(normalize_spread("5.75").as_deref(), Some("5.75%"));
    }

    #[test]
    fn test_reference_spread_parsing() {
        let (benchmark, spread) =
            parse_reference_spread("SOFR+575 (1.00% Floor)", &config::DEFAULT).unwrap();
        assert_eq!(benchmark, "SOFR");
        assert_eq!(spread, "5.75%");

        let (benchmark, spread) = parse_reference_spread("E + 6.25%", &config::DEFAULT).unwrap();
        assert_eq!(benchmark, "EURIBOR");
        assert_eq!(spread, "6.25%");
    }

    #[test]
    fn test_unmapped_codes_pass_through() {
        assert_eq!(resolve_benchmark("CDOR", &config::DEFAULT), "CDOR");
        assert_eq!(resolve_benchmark("Q", &config::DEFAULT), "Q");
    }
}
