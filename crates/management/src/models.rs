//! Management domain types — projects, strategies, audit log.

use campaign_core::types::{BillingModel, ProjectContext, StrategyInput, StrategyMetrics, StrategyStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Project ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub client_name: String,
    pub billing_model: BillingModel,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// The subset of the project the metrics engine reads.
    pub fn context(&self) -> ProjectContext {
        ProjectContext {
            billing_model: self.billing_model,
            end_date: self.end_date,
        }
    }
}

// ─── Strategy ──────────────────────────────────────────────────────────────

/// A campaign line item: raw input plus the metrics snapshot computed when
/// it was last written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub platform: Option<String>,
    pub status: StrategyStatus,
    #[serde(flatten)]
    pub input: StrategyInput,
    #[serde(flatten)]
    pub metrics: StrategyMetrics,
    /// Calendar date the pacing metrics were computed against.
    pub metrics_computed_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─── Audit Log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub user: String,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    StatusChange,
    Recompute,
}

// ─── API Request/Response types ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub client_name: String,
    pub billing_model: BillingModel,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    pub name: Option<String>,
    pub client_name: Option<String>,
    pub billing_model: Option<BillingModel>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateProjectRequest {
    /// Whether applying this edit can change stored strategy metrics.
    pub fn touches_context(&self) -> bool {
        self.billing_model.is_some() || self.end_date.is_some()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStrategyRequest {
    pub project_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub status: StrategyStatus,
    #[serde(flatten)]
    pub input: StrategyInput,
}

/// Partial edit of a strategy. Absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStrategyRequest {
    pub name: Option<String>,
    pub platform: Option<String>,
    pub status: Option<StrategyStatus>,
    pub gross_budget: Option<Decimal>,
    pub agency_percentage: Option<Decimal>,
    pub platform_percentage: Option<Decimal>,
    pub contracted_delivery: Option<Decimal>,
    pub spend_to_date: Option<Decimal>,
    pub delivered_to_date: Option<Decimal>,
    pub kpi: Option<String>,
    pub start_date: Option<NaiveDate>,
}

impl UpdateStrategyRequest {
    /// Apply the raw-input part of this edit on top of `input`.
    pub fn merge_into(&self, input: &StrategyInput) -> StrategyInput {
        let mut merged = input.clone();
        if let Some(v) = self.gross_budget { merged.gross_budget = v; }
        if let Some(v) = self.agency_percentage { merged.agency_percentage = v; }
        if let Some(v) = self.platform_percentage { merged.platform_percentage = v; }
        if let Some(v) = self.contracted_delivery { merged.contracted_delivery = Some(v); }
        if let Some(v) = self.spend_to_date { merged.spend_to_date = Some(v); }
        if let Some(v) = self.delivered_to_date { merged.delivered_to_date = Some(v); }
        if let Some(v) = &self.kpi { merged.kpi = Some(v.clone()); }
        if let Some(v) = self.start_date { merged.start_date = Some(v); }
        merged
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: StrategyStatus,
}

/// Compute metrics for an unsaved input against an existing project.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub project_id: Uuid,
    #[serde(flatten)]
    pub input: StrategyInput,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
