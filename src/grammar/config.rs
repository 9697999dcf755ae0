// src/grammar/config.rs
use crate::utils::error::ExtractError;

/// Which structured field an anchor phrase introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorField {
    InvestmentType,
    Industry,
    Maturity,
    AcquisitionDate,
    InterestRate,
    ReferenceRateAndSpread,
}

/// Read-only dialect tables injected into a grammar. Kept per filer rather
/// than module-global: the same benchmark letter means different things for
/// different filers, and sharing the tables would leak one filer's mapping
/// into another's.
#[derive(Debug, Clone)]
pub struct GrammarConfig {
    pub name: &'static str,
    /// Classification boilerplate stripped off the front before segmentation.
    pub leading_prefixes: &'static [&'static str],
    /// Anchor phrases and the fields they introduce. Longer phrases win
    /// when anchors overlap ("Maturity Date" vs "Maturity").
    pub anchors: &'static [(&'static str, AnchorField)],
    /// Recognized investment-type phrases.
    pub investment_types: &'static [&'static str],
    /// Entity suffixes that bound a company name in the fallback scan.
    pub entity_suffixes: &'static [&'static str],
    /// Terms the fallback may promote to an industry guess.
    pub industry_terms: &'static [&'static str],
    /// Single-letter benchmark codes for this filer.
    pub benchmark_letters: &'static [(&'static str, &'static str)],
}

const COMMON_ANCHORS: &[(&str, AnchorField)] = &[
    ("Investment Type", AnchorField::InvestmentType),
    ("Industry", AnchorField::Industry),
    ("Maturity Date", AnchorField::Maturity),
    ("Maturity", AnchorField::Maturity),
    ("Initial Acquisition Date", AnchorField::AcquisitionDate),
    ("Acquisition Date", AnchorField::AcquisitionDate),
    ("Interest Rate", AnchorField::InterestRate),
    ("Current Coupon", AnchorField::InterestRate),
    ("Reference Rate and Spread", AnchorField::ReferenceRateAndSpread),
    ("Basis Point Spread Above Index", AnchorField::ReferenceRateAndSpread),
    ("Spread Above Index", AnchorField::ReferenceRateAndSpread),
];

const COMMON_PREFIXES: &[&str] = &[
    "Debt Investments",
    "Equity Investments",
    "Non-Controlled/Non-Affiliated Investments",
    "Non-Controlled/Affiliated Investments",
    "Control Investments",
    "Affiliate Investments",
    "United States",
    "Investments",
];

const COMMON_INVESTMENT_TYPES: &[&str] = &[
    "First Lien Secured Debt",
    "First Lien Senior Secured Loan",
    "First Lien Term Loan",
    "Second Lien Secured Debt",
    "Second Lien Term Loan",
    "Senior Secured First Lien Debt",
    "Senior Secured Notes",
    "Senior Secured Loan",
    "Senior Secured Bond",
    "Delayed Draw Term Loan",
    "Revolving Credit Facility",
    "Unsecured Notes",
    "Unsecured Debt",
    "Subordinated Debt",
    "Mezzanine Debt",
    "Term Loan",
    "Revolver",
    "Preferred Equity",
    "Preferred Stock",
    "Preferred Units",
    "Common Equity",
    "Common Stock",
    "Common Units",
    "Membership Units",
    "Equity Interest",
    "Warrants",
];

const COMMON_ENTITY_SUFFIXES: &[&str] = &[
    "Inc.",
    "Inc",
    "Incorporated",
    "LLC",
    "L.L.C.",
    "Corp.",
    "Corp",
    "Corporation",
    "Company",
    "Co.",
    "Ltd.",
    "Ltd",
    "Limited",
    "L.P.",
    "LP",
    "Holdings",
    "Partners",
    "Group",
    "plc",
    "S.A.",
    "GmbH",
    "B.V.",
    "AB",
    "AS",
];

const COMMON_INDUSTRY_TERMS: &[&str] = &[
    "Business Services",
    "Consumer Products",
    "Consumer Services",
    "Financial Services",
    "Health Care",
    "Healthcare",
    "Pharmaceuticals",
    "Software",
    "Technology",
    "Telecommunications",
    "Media",
    "Insurance",
    "Banking",
    "Retail",
    "Chemicals",
    "Aerospace",
    "Transportation",
    "Utilities",
    "Energy",
    "Education",
    "Hospitality",
];

/// Generic anchor-style dialect with a broad benchmark map. Used when the
/// caller has no filer-specific registration.
pub static DEFAULT: GrammarConfig = GrammarConfig {
    name: "default",
    leading_prefixes: COMMON_PREFIXES,
    anchors: COMMON_ANCHORS,
    investment_types: COMMON_INVESTMENT_TYPES,
    entity_suffixes: COMMON_ENTITY_SUFFIXES,
    industry_terms: COMMON_INDUSTRY_TERMS,
    benchmark_letters: &[("S", "SOFR"), ("E", "EURIBOR"), ("N", "NIBOR"), ("P", "PRIME"), ("L", "LIBOR")],
};

/// US direct-lending dialect: `S` is SOFR.
pub static US_DIRECT_LENDING: GrammarConfig = GrammarConfig {
    name: "us-direct-lending",
    leading_prefixes: COMMON_PREFIXES,
    anchors: COMMON_ANCHORS,
    investment_types: COMMON_INVESTMENT_TYPES,
    entity_suffixes: COMMON_ENTITY_SUFFIXES,
    industry_terms: COMMON_INDUSTRY_TERMS,
    benchmark_letters: &[("S", "SOFR"), ("E", "EURIBOR"), ("P", "PRIME")],
};

/// Nordic credit dialect: the same `S` letter means STIBOR here.
pub static NORDIC_CREDIT: GrammarConfig = GrammarConfig {
    name: "nordic-credit",
    leading_prefixes: COMMON_PREFIXES,
    anchors: COMMON_ANCHORS,
    investment_types: COMMON_INVESTMENT_TYPES,
    entity_suffixes: COMMON_ENTITY_SUFFIXES,
    industry_terms: COMMON_INDUSTRY_TERMS,
    benchmark_letters: &[("S", "STIBOR"), ("N", "NIBOR"), ("E", "EURIBOR")],
};

/// The registered dialect table for a filer id.
pub fn for_filer(filer: &str) -> Result<&'static GrammarConfig, ExtractError> {
    match filer.trim().to_ascii_lowercase().as_str() {
        "" | "default" => Ok(&DEFAULT),
        "us-direct-lending" => Ok(&US_DIRECT_LENDING),
        "nordic-credit" => Ok(&NORDIC_CREDIT),
        _ => Err(ExtractError::UnknownFiler(
            filer.to_string(),
            "default, us-direct-lending, nordic-credit".to_string(),
        )),
    }
}
