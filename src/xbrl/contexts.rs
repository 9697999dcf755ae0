// src/xbrl/contexts.rs

// --- Imports ---
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::error::{Diagnostic, DiagnosticKind};
use crate::utils::text::{flatten_fragment_text, humanize_member};
use crate::xbrl::models::{FilingContext, IndustryObservation};

// --- Regex Patterns (Lazy Static) ---
static CONTEXT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(?:[\w.-]+:)?context\b.*?</(?:[\w.-]+:)?context\s*>")
        .expect("Failed to compile CONTEXT_BLOCK_RE")
});

// Strips namespace prefixes from element names so an excised block parses
// as plain XML without its original namespace declarations.
static NS_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<(/?)[A-Za-z_][\w.-]*:").expect("Failed to compile NS_PREFIX_RE")
});

// Entities the HTML carrier document leaves behind that are not valid XML.
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&#160;", " "),
    ("&rsquo;", "'"),
    ("&lsquo;", "'"),
    ("&ldquo;", "\""),
    ("&rdquo;", "\""),
    ("&ndash;", "-"),
    ("&mdash;", "-"),
];

/// Everything one pass over the filing's context blocks yields: the
/// investment-identifier contexts themselves, industry-axis sightings from
/// any context (investment or sibling), and the non-fatal findings.
#[derive(Debug, Default)]
pub struct ContextScan {
    pub contexts: Vec<FilingContext>,
    pub industry_observations: Vec<IndustryObservation>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans a raw filing body for reporting-context blocks and keeps only
/// those whose dimensional membership names an investment-identifier axis.
/// Everything else in the filing describes unrelated financial-statement
/// facts and is skipped silently.
pub struct ContextExtractor;

impl ContextExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, body: &str) -> ContextScan {
        let mut scan = ContextScan::default();
        let mut seen_blocks = 0usize;

        for block in CONTEXT_BLOCK_RE.find_iter(body) {
            seen_blocks += 1;
            self.parse_block(block.as_str(), &mut scan);
        }

        tracing::info!(
            "Context scan: {} blocks seen, {} carry an investment identifier",
            seen_blocks,
            scan.contexts.len()
        );
        scan
    }

    fn parse_block(&self, block: &str, scan: &mut ContextScan) {
        let mut sanitized = NS_PREFIX_RE.replace_all(block, "<$1").to_string();
        for (entity, replacement) in HTML_ENTITIES {
            if sanitized.contains(entity) {
                sanitized = sanitized.replace(entity, replacement);
            }
        }

        let doc = match roxmltree::Document::parse(&sanitized) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("Skipping unparsable context block: {}", e);
                return;
            }
        };
        let root = doc.root_element();

        let id = root.attribute("id").unwrap_or("").to_string();
        let mut ctx = FilingContext {
            id,
            ..Default::default()
        };

        // Temporal anchor
        if let Some(period) = root.descendants().find(|n| n.has_tag_name("period")) {
            for child in period.children().filter(|n| n.is_element()) {
                let value = child.text().unwrap_or("").trim();
                match child.tag_name().name() {
                    "instant" => ctx.instant = parse_iso_date(value),
                    "startDate" => ctx.start = parse_iso_date(value),
                    "endDate" => ctx.end = parse_iso_date(value),
                    _ => {}
                }
            }
        }

        // Dimensional membership
        let mut has_investment_axis = false;
        for member in root
            .descendants()
            .filter(|n| n.has_tag_name("typedMember") || n.has_tag_name("explicitMember"))
        {
            let dimension = member.attribute("dimension").unwrap_or("");
            let value: String = member
                .descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .collect::<Vec<_>>()
                .join(" ");

            if is_investment_axis(dimension) {
                has_investment_axis = true;
                ctx.raw_identifier = flatten_fragment_text(&value);
            } else if is_industry_axis(dimension) {
                let label = humanize_member(value.trim());
                if !label.is_empty() {
                    ctx.industry_member = Some(label);
                }
            }
        }

        // Industry members count even on sibling contexts the rest of the
        // pipeline discards; the enricher joins them back by instant.
        if let Some(industry) = &ctx.industry_member {
            scan.industry_observations.push(IndustryObservation {
                instant: ctx.instant,
                industry: industry.clone(),
            });
        }

        if !has_investment_axis {
            tracing::trace!("Context '{}' has no investment identifier dimension", ctx.id);
            return;
        }
        if ctx.raw_identifier.is_empty() {
            scan.diagnostics.push(Diagnostic::new(
                Some(&ctx.id),
                DiagnosticKind::MissingDimension,
                "investment identifier dimension is present but empty",
            ));
            return;
        }

        scan.contexts.push(ctx);
    }
}

fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let head = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn is_investment_axis(dimension: &str) -> bool {
    let local = dimension.rsplit(':').next().unwrap_or(dimension);
    local.to_ascii_lowercase().contains("investmentidentifier")
}

fn is_industry_axis(dimension: &str) -> bool {
    let local = dimension.rsplit(':').next().unwrap_or(dimension);
    local.to_ascii_lowercase().contains("industry")
}
