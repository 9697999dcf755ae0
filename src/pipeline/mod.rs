// src/pipeline/mod.rs
pub mod builder;
pub mod dedup;
pub mod enrich;
pub mod records;
pub mod select;

use crate::grammar::{config, AnchoredGrammar, GrammarConfig, IdentifierGrammar};
use crate::utils::error::{Diagnostic, ExtractError};
use crate::xbrl::{ContextExtractor, FactExtractor};

use builder::RecordBuilder;
use enrich::IndustryIndex;
pub use records::InvestmentRecord;

/// Maps raw investment-type/industry/reference-rate strings onto a
/// canonical vocabulary, applied after the record builder and before
/// output. The canonical tables live outside this crate; the shipped
/// implementation passes records through untouched.
pub trait TaxonomyNormalizer {
    fn normalize(&self, record: &mut InvestmentRecord);
}

pub struct IdentityNormalizer;

impl TaxonomyNormalizer for IdentityNormalizer {
    fn normalize(&self, _record: &mut InvestmentRecord) {}
}

/// The result of one filing's extraction: the surviving records in stable
/// order, plus every non-fatal data-quality finding made along the way.
pub struct Extraction {
    pub records: Vec<InvestmentRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The per-filing extraction pipeline. One instance per filer dialect;
/// no state is shared across filings, so a caller may run one pipeline
/// per thread at filing granularity.
pub struct Pipeline {
    grammar: Box<dyn IdentifierGrammar>,
    config: GrammarConfig,
    normalizer: Box<dyn TaxonomyNormalizer>,
}

impl Pipeline {
    pub fn for_filer(filer: &str) -> Result<Self, ExtractError> {
        let config = config::for_filer(filer)?;
        Ok(Self::new(
            Box::new(AnchoredGrammar::new(config)),
            config.clone(),
            Box::new(IdentityNormalizer),
        ))
    }

    pub fn new(
        grammar: Box<dyn IdentifierGrammar>,
        config: GrammarConfig,
        normalizer: Box<dyn TaxonomyNormalizer>,
    ) -> Self {
        Self { grammar, config, normalizer }
    }

    /// Runs the whole cascade over one raw filing body. Failures inside
    /// the document degrade to diagnostics; only an empty result signals
    /// that no usable schedule was found, and recovering from that (an
    /// HTML-table fallback, say) is the caller's decision.
    pub fn extract(&self, body: &str) -> Extraction {
        let mut scan = ContextExtractor::new().extract(body);
        let (facts, fact_diagnostics) = FactExtractor::new().extract(body);

        let mut diagnostics = std::mem::take(&mut scan.diagnostics);
        diagnostics.extend(fact_diagnostics);

        if scan.contexts.is_empty() {
            tracing::warn!("No investment contexts found; returning empty record set");
            return Extraction { records: Vec::new(), diagnostics };
        }

        let industries = IndustryIndex::build(&scan.contexts, &scan.industry_observations);
        let (surviving, _latest) = select::select_latest_instant(scan.contexts);

        let builder = RecordBuilder::new(&self.config);
        let empty = Vec::new();
        let mut records = Vec::new();
        for ctx in &surviving {
            let parsed = self.grammar.parse(&ctx.raw_identifier);
            let ctx_facts = facts.get(&ctx.id).unwrap_or(&empty);
            if let Some(mut record) = builder.build(ctx, &parsed, ctx_facts, &industries, &mut diagnostics) {
                self.normalizer.normalize(&mut record);
                records.push(record);
            }
        }

        let records = dedup::dedup(records);
        tracing::info!(
            "Extraction finished: {} records, {} diagnostics ({} dialect)",
            records.len(),
            diagnostics.len(),
            self.grammar.name()
        );
        Extraction { records, diagnostics }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_yields_empty_recoverable_result() {
        let pipeline = Pipeline::for_filer("default").unwrap();
        let extraction = pipeline.extract("<html><body>no tagged schedule here</body></html>");
        assert!(extraction.records.is_empty());
    }

    #[test]
    fn test_unknown_filer_fails_construction() {
        assert!(Pipeline::for_filer("nope").is_err());
    }
}
