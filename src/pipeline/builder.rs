// src/pipeline/builder.rs

// --- Imports ---
use chrono::NaiveDate;

use crate::grammar::{rates, GrammarConfig, ParsedIdentifier};
use crate::pipeline::enrich::IndustryIndex;
use crate::pipeline::records::InvestmentRecord;
use crate::utils::dates::parse_date_token;
use crate::utils::error::{Diagnostic, DiagnosticKind};
use crate::utils::text::normalize_ws;
use crate::xbrl::facts::{
    DERIVED_ACQUISITION_DATE, DERIVED_FLOOR_RATE, DERIVED_MATURITY_DATE, DERIVED_PIK_RATE,
    DERIVED_REFERENCE_RATE, DERIVED_SPREAD,
};
use crate::xbrl::models::{Fact, FactOrigin, FilingContext};

// Legacy scale fallback: a monetary magnitude at or below this is assumed
// to be reported in thousands. Only consulted when the tag declares no
// scale attribute.
const ASSUME_THOUSANDS_BELOW: f64 = 1_000_000.0;

/// Which record field a tagged concept feeds. Matching is on the local
/// concept name, so both us-gaap and filer-extension namespaces resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConceptField {
    Principal,
    Cost,
    FairValue,
    SharesUnits,
    PercentNetAssets,
    FloorRate,
    PikRate,
    Spread,
    ReferenceRate,
    InterestRate,
    MaturityDate,
    AcquisitionDate,
    BusinessDescription,
}

// Ordering matters: InterestRateFloor must resolve as a floor, and
// PaidInKindInterestRate as PIK, before the generic interest-rate bucket.
fn concept_field(concept: &str) -> Option<ConceptField> {
    let local = concept
        .rsplit(':')
        .next()
        .unwrap_or(concept)
        .to_ascii_lowercase();

    let field = if local.contains("principalamount") {
        ConceptField::Principal
    } else if local.contains("fairvalue") {
        ConceptField::FairValue
    } else if local.contains("cost") {
        ConceptField::Cost
    } else if local.contains("percentofnetassets") {
        ConceptField::PercentNetAssets
    } else if local.contains("shares") || local.contains("balanceunits") {
        ConceptField::SharesUnits
    } else if local.contains("floor") {
        ConceptField::FloorRate
    } else if local.contains("paidinkind") || local.contains("pik") {
        ConceptField::PikRate
    } else if local.contains("basisspread") || local.contains("spread") {
        ConceptField::Spread
    } else if local.contains("referencerate") || local.contains("benchmark") {
        ConceptField::ReferenceRate
    } else if local.contains("interestrate") {
        ConceptField::InterestRate
    } else if local.contains("maturitydate") {
        ConceptField::MaturityDate
    } else if local.contains("acquisitiondate") {
        ConceptField::AcquisitionDate
    } else if local.contains("businessdescription") {
        ConceptField::BusinessDescription
    } else {
        return None;
    };
    Some(field)
}

/// Joins one surviving context, its parsed identifier and its fact list
/// into a candidate record. Tag-sourced values always win over
/// text-derived ones.
pub struct RecordBuilder {
    config: GrammarConfig,
}

impl RecordBuilder {
    pub fn new(config: &GrammarConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn build(
        &self,
        ctx: &FilingContext,
        parsed: &ParsedIdentifier,
        facts: &[Fact],
        industries: &IndustryIndex,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Option<InvestmentRecord> {
        let Some(company_name) = parsed.company_name.clone() else {
            diagnostics.push(Diagnostic::new(
                Some(&ctx.id),
                DiagnosticKind::UnparsableIdentifier,
                format!("no company name in '{}'", ctx.raw_identifier),
            ));
            return None;
        };

        let mut record = InvestmentRecord::new(company_name, ctx.id.clone());
        record.investment_type = parsed.investment_type.clone();
        record.acquisition_date = parsed.acquisition_date;
        record.maturity_date = parsed.maturity_date;
        record.interest_rate = parsed.interest_rate.clone();
        record.reference_rate = parsed.reference_rate.clone();
        record.spread = parsed.spread.clone();
        record.floor_rate = parsed.floor_rate.clone();
        record.pik_rate = parsed.pik_rate.clone();
        record.industry = parsed
            .industry
            .clone()
            .or_else(|| ctx.industry_member.clone())
            .or_else(|| industries.lookup(ctx.instant).map(str::to_string));

        // Text-derived facts fill gaps; tagged facts then overwrite both
        // the identifier parse and any inference.
        for fact in facts.iter().filter(|f| f.origin == FactOrigin::Derived) {
            self.apply_derived(fact, &mut record);
        }
        for fact in facts.iter().filter(|f| f.origin == FactOrigin::Tagged) {
            self.apply_tagged(fact, &mut record, diagnostics);
        }

        if !record.has_financial_magnitude() {
            diagnostics.push(Diagnostic::new(
                Some(&ctx.id),
                DiagnosticKind::NoFinancialMagnitude,
                "no principal, cost or fair value survived extraction",
            ));
            return None;
        }

        // fair value above principal reads as a partially drawn revolver
        if let (Some(principal), Some(fair_value)) = (record.principal_amount, record.fair_value) {
            if fair_value > principal {
                record.commitment_limit = Some(fair_value);
                record.undrawn_commitment = Some(fair_value - principal);
            }
        }

        Some(record)
    }

    fn apply_derived(&self, fact: &Fact, record: &mut InvestmentRecord) {
        let value = fact.raw_value.as_str();
        match fact.concept.as_str() {
            DERIVED_REFERENCE_RATE => {
                if record.reference_rate.is_none() {
                    record.reference_rate = Some(rates::resolve_benchmark(value, &self.config));
                }
            }
            DERIVED_SPREAD => {
                if record.spread.is_none() {
                    record.spread = rates::normalize_spread(value);
                }
            }
            DERIVED_FLOOR_RATE => {
                if record.floor_rate.is_none() {
                    record.floor_rate = rates::normalize_percent(value);
                }
            }
            DERIVED_PIK_RATE => {
                if record.pik_rate.is_none() {
                    record.pik_rate = rates::normalize_percent(value);
                }
            }
            DERIVED_ACQUISITION_DATE => {
                if record.acquisition_date.is_none() {
                    record.acquisition_date = parse_iso(value);
                }
            }
            DERIVED_MATURITY_DATE => {
                if record.maturity_date.is_none() {
                    record.maturity_date = parse_iso(value);
                }
            }
            _ => {}
        }
    }

    fn apply_tagged(&self, fact: &Fact, record: &mut InvestmentRecord, diagnostics: &mut Vec<Diagnostic>) {
        let Some(field) = concept_field(&fact.concept) else {
            return;
        };

        match field {
            ConceptField::Principal => {
                if let Some(v) = self.monetary(fact, diagnostics) {
                    record.principal_amount = Some(v);
                    self.note_currency(fact, record);
                }
            }
            ConceptField::Cost => {
                if let Some(v) = self.monetary(fact, diagnostics) {
                    record.cost = Some(v);
                    self.note_currency(fact, record);
                }
            }
            ConceptField::FairValue => {
                if let Some(v) = self.monetary(fact, diagnostics) {
                    record.fair_value = Some(v);
                    self.note_currency(fact, record);
                }
            }
            ConceptField::SharesUnits => {
                if let Some(v) = self.plain_number(fact, diagnostics) {
                    record.shares_units = Some(v);
                }
            }
            ConceptField::PercentNetAssets => {
                if let Some(v) = self.percent(fact, diagnostics) {
                    record.percent_net_assets = Some(v);
                }
            }
            ConceptField::FloorRate => {
                if let Some(v) = self.percent(fact, diagnostics) {
                    record.floor_rate = Some(v);
                }
            }
            ConceptField::PikRate => {
                if let Some(v) = self.percent(fact, diagnostics) {
                    record.pik_rate = Some(v);
                }
            }
            ConceptField::Spread => {
                if let Some(v) = self.percent(fact, diagnostics) {
                    record.spread = Some(v);
                }
            }
            ConceptField::InterestRate => {
                if let Some(v) = self.percent(fact, diagnostics) {
                    record.interest_rate = Some(v);
                }
            }
            ConceptField::ReferenceRate => {
                let value = normalize_ws(&fact.raw_value);
                if !value.is_empty() {
                    record.reference_rate = Some(rates::resolve_benchmark(&value, &self.config));
                }
            }
            ConceptField::MaturityDate => {
                if let Some(date) = parse_iso(&fact.raw_value) {
                    record.maturity_date = Some(date);
                }
            }
            ConceptField::AcquisitionDate => {
                if let Some(date) = parse_iso(&fact.raw_value) {
                    record.acquisition_date = Some(date);
                }
            }
            ConceptField::BusinessDescription => {
                let value = normalize_ws(&fact.raw_value);
                if !value.is_empty() {
                    record.business_description = Some(value);
                }
            }
        }
    }

    /// Monetary magnitude: declared scale wins; the thousands heuristic is
    /// only a fallback for tags that declare nothing.
    fn monetary(&self, fact: &Fact, diagnostics: &mut Vec<Diagnostic>) -> Option<f64> {
        let mut value = self.coerce(fact, diagnostics)?;
        match fact.scale {
            Some(scale) => value *= 10f64.powi(scale),
            None => {
                if value.abs() <= ASSUME_THOUSANDS_BELOW {
                    value *= 1000.0;
                }
            }
        }
        if fact.sign_flipped {
            value = -value;
        }
        Some(value)
    }

    fn plain_number(&self, fact: &Fact, diagnostics: &mut Vec<Diagnostic>) -> Option<f64> {
        let mut value = self.coerce(fact, diagnostics)?;
        if let Some(scale) = fact.scale {
            value *= 10f64.powi(scale);
        }
        if fact.sign_flipped {
            value = -value;
        }
        Some(value)
    }

    fn percent(&self, fact: &Fact, diagnostics: &mut Vec<Diagnostic>) -> Option<String> {
        let value = self.plain_number(fact, diagnostics)?;
        rates::normalize_percent(&value.to_string())
    }

    fn coerce(&self, fact: &Fact, diagnostics: &mut Vec<Diagnostic>) -> Option<f64> {
        match coerce_number(&fact.raw_value) {
            Some(value) => Some(value),
            None => {
                diagnostics.push(Diagnostic::new(
                    Some(&fact.context_ref),
                    DiagnosticKind::NumericCoercionFailure,
                    format!("'{}' for {}", fact.raw_value, fact.concept),
                ));
                None
            }
        }
    }

    fn note_currency(&self, fact: &Fact, record: &mut InvestmentRecord) {
        if record.currency.is_some() {
            return;
        }
        if let Some(unit) = fact.unit_ref.as_deref().and_then(currency_from_unit) {
            record.currency = Some(unit);
        }
    }
}

fn parse_iso(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_token(value))
}

fn coerce_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let negative = trimmed.starts_with('(') && trimmed.ends_with(')');
    let cleaned: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let value: f64 = cleaned.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// "iso4217:USD", "usd" or "U_USD" → "USD".
fn currency_from_unit(unit_ref: &str) -> Option<String> {
    let code = unit_ref.rsplit([':', '_', '-']).next().unwrap_or(unit_ref);
    if (2..=4).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code.to_ascii_uppercase())
    } else {
        None
    }
}
