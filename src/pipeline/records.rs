// src/pipeline/records.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One extracted holding. This is the only artifact handed to the output
/// boundary; field order here is the stable column order writers rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentRecord {
    pub company_name: String,
    pub industry: Option<String>,
    pub business_description: Option<String>,
    pub investment_type: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub maturity_date: Option<NaiveDate>,
    pub principal_amount: Option<f64>,
    pub cost: Option<f64>,
    pub fair_value: Option<f64>,
    pub interest_rate: Option<String>,
    pub reference_rate: Option<String>,
    pub spread: Option<String>,
    pub floor_rate: Option<String>,
    pub pik_rate: Option<String>,
    pub shares_units: Option<f64>,
    pub percent_net_assets: Option<String>,
    pub currency: Option<String>,
    pub commitment_limit: Option<f64>,
    pub undrawn_commitment: Option<f64>,
    pub context_ref: String,
}

impl InvestmentRecord {
    pub fn new(company_name: String, context_ref: String) -> Self {
        Self {
            company_name,
            industry: None,
            business_description: None,
            investment_type: None,
            acquisition_date: None,
            maturity_date: None,
            principal_amount: None,
            cost: None,
            fair_value: None,
            interest_rate: None,
            reference_rate: None,
            spread: None,
            floor_rate: None,
            pik_rate: None,
            shares_units: None,
            percent_net_assets: None,
            currency: None,
            commitment_limit: None,
            undrawn_commitment: None,
            context_ref,
        }
    }

    pub fn has_financial_magnitude(&self) -> bool {
        self.principal_amount.is_some() || self.cost.is_some() || self.fair_value.is_some()
    }

    /// Key the deduplicator collapses on. Amounts are keyed at cent
    /// precision so float noise cannot split otherwise identical rows.
    pub fn dedup_key(&self) -> String {
        fn amount(value: Option<f64>) -> String {
            value.map(|v| format!("{v:.2}")).unwrap_or_default()
        }
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.company_name,
            self.investment_type.as_deref().unwrap_or(""),
            self.maturity_date.map(|d| d.to_string()).unwrap_or_default(),
            amount(self.principal_amount),
            amount(self.cost),
            amount(self.fair_value),
        )
    }
}
