//! Strategy (campaign line item) domain types shared across crates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ─── Billing ───────────────────────────────────────────────────────────────

/// How the owning project bills its client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BillingModel {
    /// Fixed fee: the whole gross budget is also the platform budget.
    #[serde(rename = "FEE", alias = "flatFee", alias = "flat_fee")]
    FlatFee,
    /// Media resold with an agency margin.
    #[serde(rename = "TD", alias = "tradingDesk", alias = "trading_desk")]
    TradingDesk,
}

impl BillingModel {
    pub fn is_flat_fee(self) -> bool {
        matches!(self, BillingModel::FlatFee)
    }
}

impl std::fmt::Display for BillingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingModel::FlatFee => write!(f, "FEE"),
            BillingModel::TradingDesk => write!(f, "TD"),
        }
    }
}

/// Read-only view of the owning project, supplied to the metrics engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext {
    pub billing_model: BillingModel,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

// ─── Strategy input ────────────────────────────────────────────────────────

/// Raw, user-editable fields of a strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInput {
    pub gross_budget: Decimal,
    #[serde(default)]
    pub agency_percentage: Decimal,
    #[serde(default = "default_platform_percentage")]
    pub platform_percentage: Decimal,
    #[serde(default)]
    pub contracted_delivery: Option<Decimal>,
    #[serde(default)]
    pub spend_to_date: Option<Decimal>,
    #[serde(default)]
    pub delivered_to_date: Option<Decimal>,
    #[serde(default)]
    pub kpi: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

fn default_platform_percentage() -> Decimal {
    Decimal::ONE_HUNDRED
}

impl StrategyInput {
    /// Returns a copy with the percentages a flat-fee project forces
    /// (agency 0, platform 100). Trading-desk inputs are returned as-is.
    pub fn normalized_for(&self, billing_model: BillingModel) -> StrategyInput {
        let mut input = self.clone();
        if billing_model.is_flat_fee() {
            input.agency_percentage = Decimal::ZERO;
            input.platform_percentage = Decimal::ONE_HUNDRED;
        }
        input
    }

    /// Names of the quantity fields that hold a negative value.
    pub fn negative_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.gross_budget < Decimal::ZERO {
            fields.push("grossBudget");
        }
        let optional = [
            ("contractedDelivery", self.contracted_delivery),
            ("spendToDate", self.spend_to_date),
            ("deliveredToDate", self.delivered_to_date),
        ];
        for (name, value) in optional {
            if matches!(value, Some(v) if v < Decimal::ZERO) {
                fields.push(name);
            }
        }
        fields
    }
}

// ─── Derived metrics ───────────────────────────────────────────────────────

/// Point-in-time snapshot of everything derived from a strategy's input
/// and its project context. Absent values serialize as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetrics {
    pub net_budget: Option<Decimal>,
    pub platform_budget: Option<Decimal>,
    pub platform_coefficient: Option<Decimal>,
    pub daily_platform_budget: Option<Decimal>,
    pub delivery_percentage: Option<Decimal>,
    pub cost_per_result: Option<Decimal>,
    pub projected_outcome: Option<Decimal>,
    pub projected_success_rate: Option<Decimal>,
    pub remaining_budget: Option<Decimal>,
    pub days_remaining: Option<i64>,
    pub remaining_per_day: Option<Decimal>,
    pub target_cost_per_result: Option<Decimal>,
    pub gross_spend_to_date: Option<Decimal>,
    pub gross_remaining_budget: Option<Decimal>,
    pub can_lower_margin: Option<bool>,
    pub can_raise_margin: Option<bool>,
}

impl StrategyMetrics {
    /// True when either margin advisory flag is raised.
    pub fn has_margin_advisory(&self) -> bool {
        self.can_lower_margin == Some(true) || self.can_raise_margin == Some(true)
    }
}

// ─── Lifecycle ─────────────────────────────────────────────────────────────

/// Lifecycle status carried by a strategy record. Metrics ignore it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    #[default]
    Planned,
    PendingApproval,
    Active,
    Paused,
    Completed,
    Cancelled,
}
