// src/grammar/mod.rs
pub mod anchored;
pub mod config;
pub mod rates;

use chrono::NaiveDate;

use crate::utils::error::ExtractError;

pub use anchored::AnchoredGrammar;
pub use config::GrammarConfig;

/// Best-effort structured extraction from one holding's free-text
/// description. Any field may be absent; absence is not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedIdentifier {
    pub company_name: Option<String>,
    pub industry: Option<String>,
    pub investment_type: Option<String>,
    pub maturity_date: Option<NaiveDate>,
    pub acquisition_date: Option<NaiveDate>,
    pub interest_rate: Option<String>,
    pub reference_rate: Option<String>,
    pub spread: Option<String>,
    pub floor_rate: Option<String>,
    pub pik_rate: Option<String>,
}

/// One filer's way of writing the holding description. Filers use mutually
/// incompatible styles, so each dialect is a substitutable strategy behind
/// this contract, selected by filer id at the pipeline boundary.
pub trait IdentifierGrammar {
    fn name(&self) -> &'static str;
    fn parse(&self, raw: &str) -> ParsedIdentifier;
}

/// Resolves a filer id to its dialect. Unknown filers are a caller error,
/// not something the pipeline guesses its way around.
pub fn for_filer(filer: &str) -> Result<Box<dyn IdentifierGrammar>, ExtractError> {
    let config = config::for_filer(filer)?;
    Ok(Box::new(AnchoredGrammar::new(config)))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_filers_resolve() {
        assert_eq!(for_filer("default").unwrap().name(), "default");
        assert_eq!(for_filer("US-Direct-Lending").unwrap().name(), "us-direct-lending");
    }

    #[test]
    fn test_unknown_filer_is_an_error() {
        assert!(matches!(
            for_filer("mystery-fund"),
            Err(ExtractError::UnknownFiler(_, _))
        ));
    }

    #[test]
    fn test_same_letter_maps_to_different_benchmarks_per_filer() {
        let us = for_filer("us-direct-lending").unwrap();
        let nordic = for_filer("nordic-credit").unwrap();

        let us_parsed = us.parse("Acme Holdings LLC Term Loan Reference Rate and Spread S+575");
        let nordic_parsed = nordic.parse("Acme Holdings LLC Term Loan Reference Rate and Spread S+575");

        assert_eq!(us_parsed.reference_rate.as_deref(), Some("SOFR"));
        assert_eq!(nordic_parsed.reference_rate.as_deref(), Some("STIBOR"));
    }
}
