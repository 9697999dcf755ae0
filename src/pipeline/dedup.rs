// src/pipeline/dedup.rs
use std::collections::HashSet;

use crate::pipeline::records::InvestmentRecord;

/// Drops records identical on (company, type, maturity, principal, cost,
/// fair value), preserving first-seen order.
pub fn dedup(records: Vec<InvestmentRecord>) -> Vec<InvestmentRecord> {
    let before = records.len();
    let mut seen = HashSet::new();
    let kept: Vec<InvestmentRecord> = records
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect();

    if kept.len() != before {
        tracing::debug!("Deduplication dropped {} of {} records", before - kept.len(), before);
    }
    kept
}
