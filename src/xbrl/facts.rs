// src/xbrl/facts.rs

// --- Imports ---
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::dates::{parse_date_token, DATE_TOKEN_RE};
use crate::utils::error::{Diagnostic, DiagnosticKind};
use crate::utils::text::flatten_fragment_text;
use crate::xbrl::models::{Fact, FactOrigin};

// How far on each side of an inline numeric tag the prose scan reaches.
const DEFAULT_WINDOW: usize = 3000;

// Concept names for facts inferred from prose rather than read off a tag.
pub const DERIVED_REFERENCE_RATE: &str = "derived:ReferenceRate";
pub const DERIVED_SPREAD: &str = "derived:Spread";
pub const DERIVED_FLOOR_RATE: &str = "derived:FloorRate";
pub const DERIVED_PIK_RATE: &str = "derived:PikRate";
pub const DERIVED_ACQUISITION_DATE: &str = "derived:AcquisitionDate";
pub const DERIVED_MATURITY_DATE: &str = "derived:MaturityDate";

// --- Regex Patterns (Lazy Static) ---
// Opening tag of any namespaced element carrying a contextRef. Covers both
// inline facts (<ix:nonFraction name="us-gaap:...">) and plain instance
// facts (<us-gaap:InvestmentOwnedAtCost contextRef="...">). The matching
// closing tag is located by name afterwards; the regex crate has no
// backreferences.
static FACT_OPEN_TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<([\w.-]+:[\w.-]+)\b([^>]*\bcontextRef\s*=\s*"[^"]*"[^>]*)>"#)
        .expect("Failed to compile FACT_OPEN_TAG_RE")
});

static NAME_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bname\s*=\s*"([^"]*)""#).expect("Failed to compile NAME_ATTR_RE")
});
static CONTEXT_REF_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bcontextRef\s*=\s*"([^"]*)""#).expect("Failed to compile CONTEXT_REF_ATTR_RE")
});
static UNIT_REF_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bunitRef\s*=\s*"([^"]*)""#).expect("Failed to compile UNIT_REF_ATTR_RE")
});
static SCALE_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bscale\s*=\s*"(-?\d+)""#).expect("Failed to compile SCALE_ATTR_RE")
});
static SIGN_ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bsign\s*=\s*"-""#).expect("Failed to compile SIGN_ATTR_RE")
});

// Benchmark code followed by '+' and a number: "SOFR+575", "S + 5.75%".
static REF_SPREAD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z]{1,10})\s*\+\s*(\d+(?:\.\d+)?\s*%?)").expect("Failed to compile REF_SPREAD_RE")
});

// "1.00% Floor" / "Floor 1.00%" / "Floor of 1.00%"
static FLOOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+(?:\.\d+)?)\s*%\s*floor\b|\bfloor\b[^%\d]{0,12}(\d+(?:\.\d+)?)\s*%)")
        .expect("Failed to compile FLOOR_RE")
});

// "2.50% PIK" / "PIK 2.50%" / "PIK interest of 2.50%"
static PIK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+(?:\.\d+)?)\s*%\s*PIK\b|\bPIK\b[^%\d]{0,24}(\d+(?:\.\d+)?)\s*%)")
        .expect("Failed to compile PIK_RE")
});

static ACQUISITION_KEYWORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(acquisition|acquired|initial|origination|originated)\b")
        .expect("Failed to compile ACQUISITION_KEYWORD_RE")
});

/// Scans the whole filing for tagged facts grouped by the context they
/// reference, and derives additional facts from prose near each inline
/// numeric tag when no explicit tag exists.
pub struct FactExtractor {
    window: usize,
}

impl Default for FactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FactExtractor {
    pub fn new() -> Self {
        Self { window: DEFAULT_WINDOW }
    }

    #[cfg(test)]
    pub fn with_window(window: usize) -> Self {
        Self { window }
    }

    /// Both direct and inferred facts land in one per-context list; the
    /// record builder decides precedence via [`FactOrigin`].
    pub fn extract(&self, body: &str) -> (HashMap<String, Vec<Fact>>, Vec<Diagnostic>) {
        let mut by_context: HashMap<String, Vec<Fact>> = HashMap::new();
        let mut diagnostics = Vec::new();
        // (context, concept) pairs already inferred, so overlapping windows
        // around neighbouring tags don't stack duplicates.
        let mut inferred: HashSet<(String, String)> = HashSet::new();
        let mut tagged_count = 0usize;

        for caps in FACT_OPEN_TAG_RE.captures_iter(body) {
            let open = caps.get(0).unwrap();
            let tag_name = &caps[1];
            let attrs = &caps[2];

            let Some(context_ref) = attr(CONTEXT_REF_ATTR_RE.captures(attrs)) else {
                continue;
            };

            // Find the matching close tag. Nested facts inside escaped text
            // blocks are picked up by their own opening-tag matches.
            let close_pat = format!("</{tag_name}");
            let Some(rel_close) = body[open.end()..].find(&close_pat) else {
                continue;
            };
            let inner = &body[open.end()..open.end() + rel_close];

            // Inline facts name their concept in an attribute; instance
            // facts are named by the element itself.
            let local = tag_name.rsplit(':').next().unwrap_or(tag_name);
            let is_inline = local.eq_ignore_ascii_case("nonFraction")
                || local.eq_ignore_ascii_case("nonNumeric");
            let concept = if is_inline {
                match attr(NAME_ATTR_RE.captures(attrs)) {
                    Some(name) => name,
                    None => continue,
                }
            } else {
                tag_name.to_string()
            };

            let raw_value = flatten_fragment_text(inner);
            let fact = Fact {
                concept,
                context_ref: context_ref.clone(),
                raw_value,
                unit_ref: attr(UNIT_REF_ATTR_RE.captures(attrs)),
                scale: attr(SCALE_ATTR_RE.captures(attrs)).and_then(|s| s.parse().ok()),
                sign_flipped: SIGN_ATTR_RE.is_match(attrs),
                origin: FactOrigin::Tagged,
            };

            let is_numeric = local.eq_ignore_ascii_case("nonFraction")
                || (!is_inline && parses_as_number(&fact.raw_value));
            by_context.entry(context_ref.clone()).or_default().push(fact);
            tagged_count += 1;

            if is_numeric {
                let window = window_around(body, open.start(), open.end() + rel_close, self.window);
                self.infer_from_window(window, &context_ref, &mut by_context, &mut inferred, &mut diagnostics);
            }
        }

        tracing::info!(
            "Fact scan: {} tagged facts across {} contexts, {} inferred from prose",
            tagged_count,
            by_context.len(),
            inferred.len()
        );
        (by_context, diagnostics)
    }

    fn infer_from_window(
        &self,
        window: &str,
        context_ref: &str,
        by_context: &mut HashMap<String, Vec<Fact>>,
        inferred: &mut HashSet<(String, String)>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut push = |concept: &str, value: String, by_context: &mut HashMap<String, Vec<Fact>>| {
            if inferred.insert((context_ref.to_string(), concept.to_string())) {
                by_context
                    .entry(context_ref.to_string())
                    .or_default()
                    .push(Fact::derived(concept, context_ref, value));
            }
        };

        if let Some(caps) = REF_SPREAD_RE.captures(window) {
            push(DERIVED_REFERENCE_RATE, caps[1].to_string(), by_context);
            push(DERIVED_SPREAD, caps[2].trim().to_string(), by_context);
        }
        if let Some(caps) = FLOOR_RE.captures(window) {
            let value = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if let Some(value) = value {
                push(DERIVED_FLOOR_RATE, format!("{value}%"), by_context);
            }
        }
        if let Some(caps) = PIK_RE.captures(window) {
            let value = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if let Some(value) = value {
                push(DERIVED_PIK_RATE, format!("{value}%"), by_context);
            }
        }

        self.infer_dates(window, context_ref, &mut push, by_context, diagnostics);
    }

    /// Date tie-break: with two or more distinct dates in the window the
    /// earliest is the acquisition and the latest the maturity; a single
    /// date is classified by a nearby keyword and flagged as low-confidence.
    fn infer_dates(
        &self,
        window: &str,
        context_ref: &str,
        push: &mut impl FnMut(&str, String, &mut HashMap<String, Vec<Fact>>),
        by_context: &mut HashMap<String, Vec<Fact>>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let mut dates: Vec<(usize, NaiveDate)> = Vec::new();
        for m in DATE_TOKEN_RE.find_iter(window) {
            if let Some(date) = parse_date_token(m.as_str()) {
                if !dates.iter().any(|(_, d)| *d == date) {
                    dates.push((m.start(), date));
                }
            }
        }

        match dates.len() {
            0 => {}
            1 => {
                let (offset, date) = dates[0];
                let lead_start = offset.saturating_sub(80);
                let lead = slice_at_char_boundaries(window, lead_start, offset);
                let concept = if ACQUISITION_KEYWORD_RE.is_match(lead) {
                    DERIVED_ACQUISITION_DATE
                } else {
                    DERIVED_MATURITY_DATE
                };
                push(concept, date.format("%Y-%m-%d").to_string(), by_context);
                diagnostics.push(Diagnostic::new(
                    Some(context_ref),
                    DiagnosticKind::AmbiguousDateWindow,
                    format!("single date {date} classified as {concept} by keyword"),
                ));
            }
            _ => {
                let earliest = dates.iter().map(|(_, d)| *d).min().unwrap_or_default();
                let latest = dates.iter().map(|(_, d)| *d).max().unwrap_or_default();
                push(DERIVED_ACQUISITION_DATE, earliest.format("%Y-%m-%d").to_string(), by_context);
                push(DERIVED_MATURITY_DATE, latest.format("%Y-%m-%d").to_string(), by_context);
            }
        }
    }
}

fn attr(caps: Option<regex::Captures<'_>>) -> Option<String> {
    caps.map(|c| c[1].to_string())
}

fn parses_as_number(value: &str) -> bool {
    let cleaned = value.replace([',', '$', '(', ')'], "");
    !cleaned.trim().is_empty() && cleaned.trim().parse::<f64>().is_ok()
}

/// Clamps `[start - span, end + span]` to char boundaries of `body`.
fn window_around(body: &str, start: usize, end: usize, span: usize) -> &str {
    let lo = start.saturating_sub(span);
    let hi = (end + span).min(body.len());
    slice_at_char_boundaries(body, lo, hi)
}

fn slice_at_char_boundaries(body: &str, mut lo: usize, mut hi: usize) -> &str {
    while lo > 0 && !body.is_char_boundary(lo) {
        lo -= 1;
    }
    while hi < body.len() && !body.is_char_boundary(hi) {
        hi += 1;
    }
    &body[lo..hi]
}
