// src/grammar/anchored.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::grammar::config::{AnchorField, GrammarConfig};
use crate::grammar::rates;
use crate::grammar::{IdentifierGrammar, ParsedIdentifier};
use crate::utils::dates::{parse_date_token, DATE_TOKEN_RE};
use crate::utils::text::normalize_ws;

// --- Regex Patterns (Lazy Static) ---
// Bracketed/parenthesized numeric footnote references: "(1)", "[2]", "(1, 3)".
static FOOTNOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[(\[]\s*\d{1,2}(?:\s*[,;]\s*\d{1,2})*\s*[)\]]").expect("Failed to compile FOOTNOTE_RE")
});

// Floor/PIK mentions in either order, for identifiers without anchor labels.
static FLOOR_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+(?:\.\d+)?)\s*%\s*floor\b|\bfloor\b[^%\d]{0,12}(\d+(?:\.\d+)?)\s*%)")
        .expect("Failed to compile FLOOR_MENTION_RE")
});
static PIK_MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:(\d+(?:\.\d+)?)\s*%\s*PIK\b|\bPIK\b[^%\d]{0,24}(\d+(?:\.\d+)?)\s*%)")
        .expect("Failed to compile PIK_MENTION_RE")
});

#[derive(Debug, Clone, Copy)]
struct AnchorHit {
    start: usize,
    end: usize,
    field: AnchorField,
}

/// The shared anchor-cascade strategy. Filer dialects differ only in the
/// injected [`GrammarConfig`] tables, so each dialect stays independently
/// testable without duplicating the cascade itself.
pub struct AnchoredGrammar {
    config: GrammarConfig,
}

impl AnchoredGrammar {
    pub fn new(config: &GrammarConfig) -> Self {
        Self { config: config.clone() }
    }

    fn strip_prefixes<'a>(&self, mut text: &'a str) -> &'a str {
        let mut prefixes: Vec<&str> = self.config.leading_prefixes.to_vec();
        prefixes.sort_by_key(|p| std::cmp::Reverse(p.len()));

        loop {
            let before = text;
            for prefix in &prefixes {
                if starts_with_word(text, prefix) {
                    text = text[prefix.len()..].trim_start_matches([' ', ',', ';', ':', '-']);
                }
            }
            if text.len() == before.len() {
                return text;
            }
        }
    }

    /// Finds every anchor occurrence, longest phrase winning on overlap.
    /// Anchors may appear in any subset and any order.
    fn locate_anchors(&self, text: &str) -> Vec<AnchorHit> {
        let lower = text.to_ascii_lowercase();
        let mut hits: Vec<AnchorHit> = Vec::new();

        for (phrase, field) in self.config.anchors {
            let phrase_lower = phrase.to_ascii_lowercase();
            for (start, _) in lower.match_indices(&phrase_lower) {
                let end = start + phrase.len();
                if word_bounded(&lower, start, end) {
                    hits.push(AnchorHit { start, end, field: *field });
                }
            }
        }

        hits.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));
        let mut kept: Vec<AnchorHit> = Vec::new();
        for hit in hits {
            if kept.last().map(|last| hit.start >= last.end).unwrap_or(true) {
                kept.push(hit);
            }
        }
        kept
    }

    fn apply_anchor(&self, field: AnchorField, value: &str, parsed: &mut ParsedIdentifier) {
        match field {
            AnchorField::InvestmentType => {
                let value = normalize_ws(value);
                if !value.is_empty() {
                    parsed.investment_type = Some(value);
                }
            }
            AnchorField::Industry => {
                let value = normalize_ws(value);
                if !value.is_empty() {
                    parsed.industry = Some(value);
                }
            }
            AnchorField::Maturity => {
                if let Some(date) = first_date(value) {
                    parsed.maturity_date = Some(date);
                }
            }
            AnchorField::AcquisitionDate => {
                if let Some(date) = first_date(value) {
                    parsed.acquisition_date = Some(date);
                }
            }
            AnchorField::InterestRate => {
                if let Some(rate) = rates::first_rate(value) {
                    parsed.interest_rate = Some(rate);
                }
            }
            AnchorField::ReferenceRateAndSpread => {
                if let Some((benchmark, spread)) = rates::parse_reference_spread(value, &self.config) {
                    parsed.reference_rate = Some(benchmark);
                    parsed.spread = Some(spread);
                }
            }
        }
    }

    fn parse_head(&self, head: &str, had_anchors: bool, parsed: &mut ParsedIdentifier) {
        let head = trim_separators(head);
        if head.is_empty() {
            return;
        }

        let mut types: Vec<&str> = self.config.investment_types.to_vec();
        types.sort_by_key(|t| std::cmp::Reverse(t.len()));

        for phrase in &types {
            if let Some(start) = find_word_bounded(head, phrase) {
                let end = start + phrase.len();
                parsed.investment_type = Some(head[start..end].to_string());
                let company = if start == 0 { &head[end..] } else { &head[..start] };
                let company = trim_separators(company);
                if !company.is_empty() {
                    parsed.company_name = Some(company.to_string());
                }
                return;
            }
        }

        // With anchors bounding the other segments, whatever leads is the
        // company. Without them, fall back to an entity-suffix scan.
        if had_anchors {
            parsed.company_name = Some(head.to_string());
        } else {
            self.suffix_fallback(head, parsed);
        }
    }

    /// Bounds the company at a known entity suffix; any leading words are
    /// promoted to an industry guess only when the whitelist knows them.
    fn suffix_fallback(&self, head: &str, parsed: &mut ParsedIdentifier) {
        let Some(mut company_end) = self.earliest_suffix_end(head) else {
            return;
        };

        // "Acme Holdings, Inc." - keep consuming trailing suffix tokens.
        loop {
            let rest = head[company_end..].trim_start_matches([' ', ',']);
            let advance = self
                .config
                .entity_suffixes
                .iter()
                .find(|s| rest.starts_with(*s) && word_bounded(rest, 0, s.len()))
                .map(|s| s.len());
            match advance {
                Some(len) => company_end = head.len() - rest.len() + len,
                None => break,
            }
        }

        let mut company = trim_separators(&head[..company_end]);

        let mut terms: Vec<&str> = self.config.industry_terms.to_vec();
        terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
        for term in &terms {
            if starts_with_word(company, term) && company.len() > term.len() {
                parsed.industry = Some(company[..term.len()].to_string());
                company = trim_separators(&company[term.len()..]);
                break;
            }
        }

        if !company.is_empty() {
            parsed.company_name = Some(company.to_string());
        }
    }

    /// First word-bounded suffix occurrence; on position ties the longer
    /// suffix wins, so "Inc." is not truncated to "Inc".
    fn earliest_suffix_end(&self, head: &str) -> Option<usize> {
        let mut best: Option<(usize, usize)> = None;
        for suffix in self.config.entity_suffixes {
            let mut from = 0;
            while let Some(rel) = head[from..].find(suffix) {
                let start = from + rel;
                let end = start + suffix.len();
                if word_bounded(head, start, end) {
                    best = match best {
                        Some((bs, be)) if bs < start || (bs == start && be >= end) => Some((bs, be)),
                        _ => Some((start, end)),
                    };
                    break;
                }
                from = end;
            }
        }
        best.map(|(_, end)| end)
    }
}

impl IdentifierGrammar for AnchoredGrammar {
    fn name(&self) -> &'static str {
        self.config.name
    }

    fn parse(&self, raw: &str) -> ParsedIdentifier {
        let text = FOOTNOTE_RE.replace_all(raw, " ");
        let text = normalize_ws(&text);
        let text = self.strip_prefixes(&text);

        let anchors = self.locate_anchors(text);
        let mut parsed = ParsedIdentifier::default();

        let head_end = anchors.first().map(|a| a.start).unwrap_or(text.len());
        self.parse_head(&text[..head_end], !anchors.is_empty(), &mut parsed);

        for (i, anchor) in anchors.iter().enumerate() {
            let value_end = anchors.get(i + 1).map(|a| a.start).unwrap_or(text.len());
            let value = trim_separators(&text[anchor.end..value_end]);
            self.apply_anchor(anchor.field, value, &mut parsed);
        }

        // Floor and PIK ride along in either order ("1.00% Floor", "Floor
        // of 1.00%") rather than behind a labelled anchor, and a bare
        // benchmark+spread token can appear without its label too.
        if parsed.floor_rate.is_none() {
            parsed.floor_rate = mention_percent(&FLOOR_MENTION_RE, text);
        }
        if parsed.pik_rate.is_none() {
            parsed.pik_rate = mention_percent(&PIK_MENTION_RE, text);
        }
        if parsed.reference_rate.is_none() {
            if let Some((benchmark, spread)) = rates::parse_reference_spread(text, &self.config) {
                parsed.reference_rate = Some(benchmark);
                parsed.spread = Some(spread);
            }
        }

        tracing::trace!(
            "Parsed identifier: company={:?} type={:?}",
            parsed.company_name,
            parsed.investment_type
        );
        parsed
    }
}

fn first_date(value: &str) -> Option<chrono::NaiveDate> {
    DATE_TOKEN_RE
        .find_iter(value)
        .filter_map(|m| parse_date_token(m.as_str()))
        .next()
}

fn mention_percent(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let value = caps.get(1).or_else(|| caps.get(2))?;
    rates::normalize_percent(&format!("{}%", value.as_str()))
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches([' ', ',', ';', ':', '-', '\u{2013}', '\u{2014}'])
}

fn starts_with_word(text: &str, prefix: &str) -> bool {
    match text.get(..prefix.len()) {
        Some(lead) if lead.eq_ignore_ascii_case(prefix) => text[prefix.len()..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true),
        _ => false,
    }
}

fn find_word_bounded(text: &str, phrase: &str) -> Option<usize> {
    let lower = text.to_ascii_lowercase();
    let phrase_lower = phrase.to_ascii_lowercase();
    for (start, _) in lower.match_indices(&phrase_lower) {
        if word_bounded(text, start, start + phrase.len()) {
            return Some(start);
        }
    }
    None
}

fn word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before_ok = start == 0
        || text[..start]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
    let after_ok = end >= text.len()
        || text[end..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
    before_ok && after_ok
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::config;
    use chrono::NaiveDate;

    fn grammar() -> AnchoredGrammar {
        AnchoredGrammar::new(&config::DEFAULT)
    }

    #[test]
    fn test_full_anchor_cascade() {
        let parsed = grammar().parse(
            "First Lien Secured Debt Acme Holdings LLC Maturity 9/13/2029 Industry Business Services Current Coupon 10.07% Basis Point Spread Above Index SOFR+575",
        );

        assert_eq!(parsed.company_name.as_deref(), Some("Acme Holdings LLC"));
        assert_eq!(parsed.investment_type.as_deref(), Some("First Lien Secured Debt"));
        assert_eq!(parsed.maturity_date, NaiveDate::from_ymd_opt(2029, 9, 13));
        assert_eq!(parsed.industry.as_deref(), Some("Business Services"));
        assert_eq!(parsed.interest_rate.as_deref(), Some("10.07%"));
        assert_eq!(parsed.reference_rate.as_deref(), Some("SOFR"));
        assert_eq!(parsed.spread.as_deref(), Some("5.75%"));
    }

    #[test]
    fn test_footnotes_and_prefixes_are_stripped() {
        let parsed = grammar().parse(
            "Debt Investments (1) Term Loan Beta Industries Inc. (2)(3) Maturity 6/2027",
        );

        assert_eq!(parsed.company_name.as_deref(), Some("Beta Industries Inc."));
        assert_eq!(parsed.investment_type.as_deref(), Some("Term Loan"));
        assert_eq!(parsed.maturity_date, NaiveDate::from_ymd_opt(2027, 6, 1));
    }

    #[test]
    fn test_missing_anchors_are_tolerated() {
        let parsed = grammar().parse("Gamma Software Corp. Second Lien Term Loan");

        assert_eq!(parsed.company_name.as_deref(), Some("Gamma Software Corp."));
        assert_eq!(parsed.investment_type.as_deref(), Some("Second Lien Term Loan"));
        assert!(parsed.maturity_date.is_none());
        assert!(parsed.industry.is_none());
    }

    #[test]
    fn test_entity_suffix_fallback_with_industry_guess() {
        let parsed = grammar().parse("Software Delta Systems Inc.");

        assert_eq!(parsed.industry.as_deref(), Some("Software"));
        assert_eq!(parsed.company_name.as_deref(), Some("Delta Systems Inc."));
        assert!(parsed.investment_type.is_none());
    }

    #[test]
    fn test_leading_words_without_whitelist_match_stay_in_company() {
        let parsed = grammar().parse("Blue Widget Co.");

        assert_eq!(parsed.company_name.as_deref(), Some("Blue Widget Co."));
        assert!(parsed.industry.is_none());
    }

    #[test]
    fn test_unresolvable_company_is_left_absent() {
        let parsed = grammar().parse("miscellaneous other assets");
        assert!(parsed.company_name.is_none());
    }

    #[test]
    fn test_unlabelled_floor_and_pik_mentions() {
        let parsed = grammar().parse(
            "Epsilon Partners LP First Lien Term Loan SOFR+650, 1.00% Floor, 2.50% PIK, Maturity 3/2028",
        );

        assert_eq!(parsed.floor_rate.as_deref(), Some("1.00%"));
        assert_eq!(parsed.pik_rate.as_deref(), Some("2.50%"));
        assert_eq!(parsed.maturity_date, NaiveDate::from_ymd_opt(2028, 3, 1));
    }

    #[test]
    fn test_two_digit_maturity_year() {
        let parsed = grammar().parse("Zeta Corp Term Loan Maturity Date 12/31/29");
        assert_eq!(parsed.maturity_date, NaiveDate::from_ymd_opt(2029, 12, 31));
    }
}
