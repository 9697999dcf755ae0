// src/pipeline/select.rs
use chrono::NaiveDate;

use crate::xbrl::models::FilingContext;

/// Keeps only contexts bound to the most recent instant date. Filings
/// repeat the full schedule for a comparative prior period under the same
/// dimensional structure; without this filter every holding is emitted
/// twice. Contexts carrying no instant at all pass through unfiltered.
pub fn select_latest_instant(contexts: Vec<FilingContext>) -> (Vec<FilingContext>, Option<NaiveDate>) {
    let latest = contexts.iter().filter_map(|c| c.instant).max();
    let Some(latest) = latest else {
        return (contexts, None);
    };

    let before = contexts.len();
    let surviving: Vec<FilingContext> = contexts
        .into_iter()
        .filter(|c| c.instant == Some(latest))
        .collect();
    tracing::info!(
        "Instant selection: kept {} of {} contexts at {}",
        surviving.len(),
        before,
        latest
    );
    (surviving, Some(latest))
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(id: &str, instant: Option<&str>) -> FilingContext {
        FilingContext {
            id: id.to_string(),
            instant: instant.and_then(|s| s.parse().ok()),
            raw_identifier: "Acme Holdings LLC Term Loan".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_prior_period_contexts_are_discarded() {
        let contexts = vec![
            ctx("a", Some("2025-06-30")),
            ctx("b", Some("2025-03-31")),
            ctx("c", Some("2025-06-30")),
        ];

        let (surviving, latest) = select_latest_instant(contexts);
        assert_eq!(latest, "2025-06-30".parse().ok());
        assert_eq!(surviving.len(), 2);
        assert!(surviving.iter().all(|c| c.instant == "2025-06-30".parse().ok()));
    }

    #[test]
    fn test_instantless_contexts_survive_when_no_instant_exists() {
        let contexts = vec![ctx("a", None), ctx("b", None)];
        let (surviving, latest) = select_latest_instant(contexts);
        assert_eq!(latest, None);
        assert_eq!(surviving.len(), 2);
    }

    #[test]
    fn test_instantless_context_is_dropped_when_an_instant_exists() {
        let contexts = vec![ctx("a", Some("2025-06-30")), ctx("b", None)];
        let (surviving, _) = select_latest_instant(contexts);
        assert_eq!(surviving.len(), 1);
        assert_eq!(surviving[0].id, "a");
    }
}
