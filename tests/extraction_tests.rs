use chrono::NaiveDate;
use soi_extractor::pipeline::Pipeline;
use soi_extractor::utils::error::DiagnosticKind;

fn investment_context(id: &str, instant: &str, identifier: &str) -> String {
    format!(
        r#"<xbrli:context id="{id}">
  <xbrli:entity>
    <xbrli:identifier scheme="http://www.sec.gov/CIK">0001234567</xbrli:identifier>
    <xbrli:segment>
      <xbrldi:typedMember dimension="us-gaap:InvestmentIdentifierAxis">
        <us-gaap:InvestmentIdentifierDomain>{identifier}</us-gaap:InvestmentIdentifierDomain>
      </xbrldi:typedMember>
    </xbrli:segment>
  </xbrli:entity>
  <xbrli:period><xbrli:instant>{instant}</xbrli:instant></xbrli:period>
</xbrli:context>"#
    )
}

fn industry_context(id: &str, instant: &str, member: &str) -> String {
    format!(
        r#"<xbrli:context id="{id}">
  <xbrli:entity>
    <xbrli:identifier scheme="http://www.sec.gov/CIK">0001234567</xbrli:identifier>
    <xbrli:segment>
      <xbrldi:explicitMember dimension="us-gaap:EquitySecuritiesByIndustryAxis">{member}</xbrldi:explicitMember>
    </xbrli:segment>
  </xbrli:entity>
  <xbrli:period><xbrli:instant>{instant}</xbrli:instant></xbrli:period>
</xbrli:context>"#
    )
}

fn money(concept: &str, context: &str, value: &str) -> String {
    format!(
        r#"<td><ix:nonFraction name="{concept}" contextRef="{context}" unitRef="usd" scale="3" decimals="0">{value}</ix:nonFraction></td>"#
    )
}

// Keeps each holding's fact tags outside every other holding's prose
// window, so window inferences cannot bleed between rows.
fn filler() -> String {
    "The accompanying notes are an integral part of these consolidated financial statements. "
        .repeat(40)
}

/// A synthetic filing with a current and a comparative prior period, an
/// industry dimension declared on a sibling context, a holding with no
/// resolvable company name, and a duplicated holding.
fn schedule_fixture() -> String {
    let mut body = String::from("<html><body><ix:header>\n");
    body.push_str(&investment_context(
        "c0",
        "2025-06-30",
        "First Lien Secured Debt Acme Holdings LLC Maturity 9/13/2029 Industry Business Services Current Coupon 10.07% Basis Point Spread Above Index SOFR+575",
    ));
    body.push_str(&investment_context(
        "c1",
        "2025-06-30",
        "Beta Industries Inc. Revolving Credit Facility",
    ));
    body.push_str(&investment_context(
        "c2",
        "2025-03-31",
        "First Lien Secured Debt Acme Holdings LLC Maturity 9/13/2029",
    ));
    body.push_str(&investment_context("c3", "2025-06-30", "miscellaneous other assets"));
    body.push_str(&investment_context(
        "c4",
        "2025-06-30",
        "Beta Industries Inc. Revolving Credit Facility",
    ));
    body.push_str(&industry_context("c5", "2025-06-30", "ck0001:SoftwareMember"));
    body.push_str("</ix:header>\n");

    // Acme row: dates ride in prose next to the tags.
    body.push_str(&filler());
    body.push_str("<tr><td>Funded 3/15/2022, due 9/13/2029.</td>");
    body.push_str(&money("us-gaap:InvestmentOwnedBalancePrincipalAmount", "c0", "5,000"));
    body.push_str(&money("us-gaap:InvestmentOwnedAtCost", "c0", "4,950"));
    body.push_str(&money("us-gaap:InvestmentOwnedAtFairValue", "c0", "4,975"));
    body.push_str("</tr>\n");

    // Beta revolver row: fair value above principal.
    body.push_str(&filler());
    body.push_str("<tr>");
    body.push_str(&money("us-gaap:InvestmentOwnedBalancePrincipalAmount", "c1", "8,000"));
    body.push_str(&money("us-gaap:InvestmentOwnedAtFairValue", "c1", "10,000"));
    body.push_str("</tr>\n");

    // Prior-period Acme row with different amounts; must be filtered out,
    // not merely deduplicated.
    body.push_str(&filler());
    body.push_str("<tr>");
    body.push_str(&money("us-gaap:InvestmentOwnedBalancePrincipalAmount", "c2", "4,800"));
    body.push_str(&money("us-gaap:InvestmentOwnedAtFairValue", "c2", "4,900"));
    body.push_str("</tr>\n");

    // Unresolvable holding with a real fair value.
    body.push_str(&filler());
    body.push_str("<tr>");
    body.push_str(&money("us-gaap:InvestmentOwnedAtFairValue", "c3", "1,000"));
    body.push_str("</tr>\n");

    // Duplicate of the Beta revolver under its own context.
    body.push_str(&filler());
    body.push_str("<tr>");
    body.push_str(&money("us-gaap:InvestmentOwnedBalancePrincipalAmount", "c4", "8,000"));
    body.push_str(&money("us-gaap:InvestmentOwnedAtFairValue", "c4", "10,000"));
    body.push_str("</tr>\n");

    body.push_str("</body></html>");
    body
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn test_extracts_current_period_schedule() {
    let pipeline = Pipeline::for_filer("default").unwrap();
    let extraction = pipeline.extract(&schedule_fixture());

    assert_eq!(extraction.records.len(), 2);

    let acme = &extraction.records[0];
    assert_eq!(acme.company_name, "Acme Holdings LLC");
    assert_eq!(acme.investment_type.as_deref(), Some("First Lien Secured Debt"));
    assert_eq!(acme.industry.as_deref(), Some("Business Services"));
    assert_eq!(acme.maturity_date, Some(date("2029-09-13")));
    assert_eq!(acme.acquisition_date, Some(date("2022-03-15")));
    assert_eq!(acme.interest_rate.as_deref(), Some("10.07%"));
    assert_eq!(acme.reference_rate.as_deref(), Some("SOFR"));
    assert_eq!(acme.spread.as_deref(), Some("5.75%"));
    assert_eq!(acme.principal_amount, Some(5_000_000.0));
    assert_eq!(acme.cost, Some(4_950_000.0));
    assert_eq!(acme.fair_value, Some(4_975_000.0));
    assert_eq!(acme.currency.as_deref(), Some("USD"));
    assert_eq!(acme.commitment_limit, None);

    let beta = &extraction.records[1];
    assert_eq!(beta.company_name, "Beta Industries Inc.");
    assert_eq!(beta.investment_type.as_deref(), Some("Revolving Credit Facility"));
    // industry arrives from the sibling context sharing the instant
    assert_eq!(beta.industry.as_deref(), Some("Software"));
    assert_eq!(beta.maturity_date, None);
    assert_eq!(beta.principal_amount, Some(8_000_000.0));
    assert_eq!(beta.fair_value, Some(10_000_000.0));
    assert_eq!(beta.commitment_limit, Some(10_000_000.0));
    assert_eq!(beta.undrawn_commitment, Some(2_000_000.0));
}

#[test]
fn test_prior_period_and_duplicate_contexts_leave_no_records() {
    let pipeline = Pipeline::for_filer("default").unwrap();
    let extraction = pipeline.extract(&schedule_fixture());

    assert!(extraction.records.iter().all(|r| r.context_ref != "c2"));
    assert!(extraction.records.iter().all(|r| r.context_ref != "c4"));
}

#[test]
fn test_unresolved_company_is_rejected_despite_financial_facts() {
    let pipeline = Pipeline::for_filer("default").unwrap();
    let extraction = pipeline.extract(&schedule_fixture());

    assert!(extraction.records.iter().all(|r| r.context_ref != "c3"));
    assert!(extraction
        .diagnostics
        .iter()
        .any(|d| d.kind == DiagnosticKind::UnparsableIdentifier
            && d.context_ref.as_deref() == Some("c3")));
}

#[test]
fn test_every_record_satisfies_retention_invariant() {
    let pipeline = Pipeline::for_filer("default").unwrap();
    let extraction = pipeline.extract(&schedule_fixture());

    for record in &extraction.records {
        assert!(!record.company_name.is_empty());
        assert!(
            record.principal_amount.is_some()
                || record.cost.is_some()
                || record.fair_value.is_some()
        );
    }
}

#[test]
fn test_filing_without_schedule_yields_empty_result() {
    let pipeline = Pipeline::for_filer("default").unwrap();
    let extraction = pipeline.extract("<html><body><p>Annual report, no tagged schedule.</p></body></html>");

    assert!(extraction.records.is_empty());
}
