//! Strategy create/update flow: load the project context, compute metrics,
//! write raw input and derived fields together, notify.

use crate::models::*;
use crate::notifier::StrategyNotifier;
use crate::store::ManagementStore;
use campaign_core::error::{CampaignError, CampaignResult};
use campaign_core::types::{BillingModel, ProjectContext, StrategyInput, StrategyMetrics, StrategyStatus};
use campaign_metrics::{compute_metrics_as_of, pacing};
use chrono::{NaiveDate, Utc};
use rust_decimal_macros::dec;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source of "today" for pacing metrics.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Current UTC calendar date. Near midnight this can be a day away from
/// the local date; inject another `Clock` where local days matter.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        pacing::today_utc()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

pub struct StrategyService {
    store: Arc<ManagementStore>,
    notifier: Arc<dyn StrategyNotifier>,
    clock: Arc<dyn Clock>,
}

impl StrategyService {
    pub fn new(
        store: Arc<ManagementStore>,
        notifier: Arc<dyn StrategyNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, notifier, clock }
    }

    pub fn store(&self) -> &ManagementStore {
        &self.store
    }

    // ─── Projects ──────────────────────────────────────────────────────────

    pub fn create_project(&self, req: CreateProjectRequest, user: &str) -> Project {
        let project = self.store.create_project(req, user);
        metrics::counter!("management.projects.created").increment(1);
        project
    }

    /// Update a project. When its billing model or end date changes, every
    /// strategy under it is recomputed against the new context.
    ///
    /// Flat-fee forcing is not undone: a project moving from flat fee back to
    /// trading desk keeps its strategies at 0/100 until they are edited.
    pub fn update_project(&self, id: Uuid, req: UpdateProjectRequest, user: &str) -> CampaignResult<Project> {
        let recompute = req.touches_context();
        let previous_model = self.store.get_project(id).map(|p| p.billing_model);
        let project = self
            .store
            .update_project(id, req, user)
            .ok_or(CampaignError::ProjectNotFound(id))?;
        if recompute {
            let strategies = self.recompute_project(id, user)?;
            if previous_model == Some(BillingModel::FlatFee) && !project.billing_model.is_flat_fee() {
                for strategy in &strategies {
                    warn!(
                        project_id = %id,
                        strategy_id = %strategy.id,
                        "Project left flat fee; strategy percentages stay at 0/100 until edited"
                    );
                }
            }
        }
        Ok(project)
    }

    pub fn delete_project(&self, id: Uuid, user: &str) -> CampaignResult<()> {
        if self.store.delete_project(id, user) {
            Ok(())
        } else {
            Err(CampaignError::ProjectNotFound(id))
        }
    }

    // ─── Strategies ────────────────────────────────────────────────────────

    pub fn create_strategy(&self, req: CreateStrategyRequest, user: &str) -> CampaignResult<Strategy> {
        validate(&req.input)?;
        let context = self.load_context(req.project_id)?;
        let today = self.clock.today();
        let input = req.input.normalized_for(context.billing_model);
        let snapshot = compute_metrics_as_of(&input, &context, today);

        let now = Utc::now();
        let strategy = Strategy {
            id: Uuid::new_v4(),
            project_id: req.project_id,
            name: req.name,
            platform: req.platform,
            status: req.status,
            input,
            metrics: snapshot,
            metrics_computed_on: today,
            created_at: now,
            updated_at: now,
        };
        self.store.put_strategy(strategy.clone());
        self.store.log_audit(
            user,
            AuditAction::Create,
            "strategy",
            &strategy.id.to_string(),
            serde_json::json!({"name": &strategy.name, "project_id": strategy.project_id}),
        );

        info!(strategy_id = %strategy.id, project_id = %strategy.project_id, "Strategy stored");
        metrics::counter!("management.strategies.created").increment(1);
        self.record_advisory(&strategy.metrics);
        self.notifier.strategy_created(&strategy);
        Ok(strategy)
    }

    /// Apply a partial edit and recompute every derived field from the
    /// merged input and the project's current context.
    pub fn update_strategy(&self, id: Uuid, req: UpdateStrategyRequest, user: &str) -> CampaignResult<Strategy> {
        let previous = self
            .store
            .get_strategy(id)
            .ok_or(CampaignError::StrategyNotFound(id))?;
        let merged = req.merge_into(&previous.input);
        validate(&merged)?;
        let context = self.load_context(previous.project_id)?;

        let mut strategy = previous.clone();
        if let Some(name) = req.name { strategy.name = name; }
        if let Some(platform) = req.platform { strategy.platform = Some(platform); }
        if let Some(status) = req.status { strategy.status = status; }
        self.apply_metrics(&mut strategy, merged, &context);

        self.store.put_strategy(strategy.clone());
        self.store.log_audit(user, AuditAction::Update, "strategy", &id.to_string(), serde_json::json!({}));
        self.finish_update(&strategy, &previous);
        Ok(strategy)
    }

    pub fn set_status(&self, id: Uuid, status: StrategyStatus, user: &str) -> CampaignResult<Strategy> {
        let previous = self
            .store
            .get_strategy(id)
            .ok_or(CampaignError::StrategyNotFound(id))?;
        let context = self.load_context(previous.project_id)?;

        let mut strategy = previous.clone();
        strategy.status = status;
        self.apply_metrics(&mut strategy, previous.input.clone(), &context);

        self.store.put_strategy(strategy.clone());
        self.store.log_audit(
            user,
            AuditAction::StatusChange,
            "strategy",
            &id.to_string(),
            serde_json::json!({"from": previous.status, "to": status}),
        );
        self.finish_update(&strategy, &previous);
        Ok(strategy)
    }

    pub fn delete_strategy(&self, id: Uuid, user: &str) -> CampaignResult<()> {
        if self.store.delete_strategy(id, user) {
            metrics::counter!("management.strategies.deleted").increment(1);
            Ok(())
        } else {
            Err(CampaignError::StrategyNotFound(id))
        }
    }

    /// Recompute the stored snapshot of every strategy in a project.
    pub fn recompute_project(&self, project_id: Uuid, user: &str) -> CampaignResult<Vec<Strategy>> {
        let context = self.load_context(project_id)?;
        let mut updated = Vec::new();
        for previous in self.store.list_project_strategies(project_id) {
            let mut strategy = previous.clone();
            self.apply_metrics(&mut strategy, previous.input.clone(), &context);
            self.store.put_strategy(strategy.clone());
            self.finish_update(&strategy, &previous);
            updated.push(strategy);
        }
        self.store.log_audit(
            user,
            AuditAction::Recompute,
            "project",
            &project_id.to_string(),
            serde_json::json!({"strategies": updated.len()}),
        );
        info!(project_id = %project_id, strategies = updated.len(), "Project strategies recomputed");
        Ok(updated)
    }

    /// Metrics for an unsaved input. Nothing is stored.
    pub fn preview(&self, project_id: Uuid, input: &StrategyInput) -> CampaignResult<StrategyMetrics> {
        validate(input)?;
        let context = self.load_context(project_id)?;
        let input = input.normalized_for(context.billing_model);
        Ok(compute_metrics_as_of(&input, &context, self.clock.today()))
    }

    /// Populate an empty store with one project per billing model.
    pub fn seed_demo_data(&self, user: &str) -> CampaignResult<()> {
        let today = self.clock.today();
        let td = self.create_project(
            CreateProjectRequest {
                name: "Holiday Retail Push".to_string(),
                client_name: "Northwind Outfitters".to_string(),
                billing_model: BillingModel::TradingDesk,
                start_date: Some(today - chrono::Duration::days(20)),
                end_date: Some(today + chrono::Duration::days(10)),
            },
            user,
        );
        let fee = self.create_project(
            CreateProjectRequest {
                name: "Brand Awareness Q4".to_string(),
                client_name: "Contoso Foods".to_string(),
                billing_model: BillingModel::FlatFee,
                start_date: Some(today - chrono::Duration::days(5)),
                end_date: Some(today + chrono::Duration::days(25)),
            },
            user,
        );

        self.create_strategy(
            CreateStrategyRequest {
                project_id: td.id,
                name: "Prospecting - Programmatic Display".to_string(),
                platform: Some("DV360".to_string()),
                status: StrategyStatus::Active,
                input: StrategyInput {
                    gross_budget: dec!(5000),
                    agency_percentage: dec!(10),
                    platform_percentage: dec!(80),
                    contracted_delivery: Some(dec!(100000)),
                    spend_to_date: Some(dec!(1800)),
                    delivered_to_date: Some(dec!(40000)),
                    kpi: Some("CPM".to_string()),
                    start_date: td.start_date,
                },
            },
            user,
        )?;
        self.create_strategy(
            CreateStrategyRequest {
                project_id: fee.id,
                name: "Paid Social - Video Views".to_string(),
                platform: Some("Meta".to_string()),
                status: StrategyStatus::PendingApproval,
                input: StrategyInput {
                    gross_budget: dec!(12000),
                    agency_percentage: dec!(0),
                    platform_percentage: dec!(100),
                    contracted_delivery: Some(dec!(400000)),
                    spend_to_date: None,
                    delivered_to_date: None,
                    kpi: Some("CPV".to_string()),
                    start_date: fee.start_date,
                },
            },
            user,
        )?;

        info!("Demo projects and strategies seeded");
        Ok(())
    }

    fn load_context(&self, project_id: Uuid) -> CampaignResult<ProjectContext> {
        self.store
            .project_context(project_id)
            .ok_or(CampaignError::ProjectNotFound(project_id))
    }

    fn apply_metrics(&self, strategy: &mut Strategy, input: StrategyInput, context: &ProjectContext) {
        let today = self.clock.today();
        strategy.input = input.normalized_for(context.billing_model);
        strategy.metrics = compute_metrics_as_of(&strategy.input, context, today);
        strategy.metrics_computed_on = today;
        strategy.updated_at = Utc::now();
        debug!(strategy_id = %strategy.id, "Strategy metrics refreshed");
    }

    /// Counters and notification shared by every write that replaces a
    /// stored snapshot.
    fn finish_update(&self, strategy: &Strategy, previous: &Strategy) {
        metrics::counter!("management.strategies.updated").increment(1);
        self.record_advisory(&strategy.metrics);
        self.notifier.strategy_updated(strategy, previous);
    }

    fn record_advisory(&self, snapshot: &StrategyMetrics) {
        if snapshot.has_margin_advisory() {
            metrics::counter!("management.strategies.margin_advisories").increment(1);
        }
    }
}

/// Quantities must be non-negative. Percentages are passed through as given.
fn validate(input: &StrategyInput) -> CampaignResult<()> {
    let negative = input.negative_fields();
    if negative.is_empty() {
        Ok(())
    } else {
        Err(CampaignError::Validation(format!(
            "must not be negative: {}",
            negative.join(", ")
        )))
    }
}
