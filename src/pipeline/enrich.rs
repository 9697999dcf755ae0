// src/pipeline/enrich.rs
use std::collections::HashMap;

use chrono::NaiveDate;

use crate::xbrl::models::{FilingContext, IndustryObservation};

/// Instant date → industry name, built from the industry-axis member found
/// anywhere in a context sharing that instant. The industry dimension is
/// sometimes declared on a sibling context rather than the investment's
/// own, so observations from non-investment contexts feed the map too.
pub struct IndustryIndex {
    by_instant: HashMap<NaiveDate, String>,
}

impl IndustryIndex {
    pub fn build(contexts: &[FilingContext], observations: &[IndustryObservation]) -> Self {
        let mut by_instant = HashMap::new();

        let own = contexts.iter().filter_map(|c| {
            c.industry_member
                .as_ref()
                .map(|industry| (c.instant, industry.clone()))
        });
        let sibling = observations
            .iter()
            .map(|o| (o.instant, o.industry.clone()));

        for (instant, industry) in own.chain(sibling) {
            if let Some(instant) = instant {
                by_instant.entry(instant).or_insert(industry);
            }
        }

        tracing::debug!("Industry index covers {} instants", by_instant.len());
        Self { by_instant }
    }

    pub fn lookup(&self, instant: Option<NaiveDate>) -> Option<&str> {
        instant
            .and_then(|i| self.by_instant.get(&i))
            .map(String::as_str)
    }
}
