//! In-memory management store backed by DashMap.
//!
//! Stands in for the relational store: same API surface for development and
//! testing. Concurrent writes to one record are last-writer-wins.

use crate::models::*;
use campaign_core::types::ProjectContext;
use chrono::Utc;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

/// Thread-safe in-memory store for projects, strategies and the audit log.
pub struct ManagementStore {
    projects: DashMap<Uuid, Project>,
    strategies: DashMap<Uuid, Strategy>,
    audit_log: DashMap<Uuid, AuditLogEntry>,
}

impl Default for ManagementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ManagementStore {
    pub fn new() -> Self {
        info!("Management store initialized (in-memory, development mode)");
        Self {
            projects: DashMap::new(),
            strategies: DashMap::new(),
            audit_log: DashMap::new(),
        }
    }

    // ─── Projects ──────────────────────────────────────────────────────────

    pub fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.iter().map(|r| r.value().clone()).collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        projects
    }

    pub fn get_project(&self, id: Uuid) -> Option<Project> {
        self.projects.get(&id).map(|r| r.value().clone())
    }

    /// Billing model and end date of a project, as read by the metrics engine.
    pub fn project_context(&self, id: Uuid) -> Option<ProjectContext> {
        self.projects.get(&id).map(|r| r.value().context())
    }

    pub fn create_project(&self, req: CreateProjectRequest, user: &str) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: req.name,
            client_name: req.client_name,
            billing_model: req.billing_model,
            start_date: req.start_date,
            end_date: req.end_date,
            created_at: now,
            updated_at: now,
        };
        let id = project.id;
        self.projects.insert(id, project.clone());
        self.log_audit(
            user,
            AuditAction::Create,
            "project",
            &id.to_string(),
            serde_json::json!({"name": &project.name, "billing_model": project.billing_model}),
        );
        project
    }

    pub fn update_project(&self, id: Uuid, req: UpdateProjectRequest, user: &str) -> Option<Project> {
        self.projects.get_mut(&id).map(|mut entry| {
            let p = entry.value_mut();
            if let Some(name) = req.name { p.name = name; }
            if let Some(client) = req.client_name { p.client_name = client; }
            if let Some(model) = req.billing_model { p.billing_model = model; }
            if let Some(start) = req.start_date { p.start_date = Some(start); }
            if let Some(end) = req.end_date { p.end_date = Some(end); }
            p.updated_at = Utc::now();
            self.log_audit(user, AuditAction::Update, "project", &id.to_string(), serde_json::json!({}));
            p.clone()
        })
    }

    /// Remove a project together with its strategies.
    pub fn delete_project(&self, id: Uuid, user: &str) -> bool {
        let removed = self.projects.remove(&id).is_some();
        if removed {
            let strategy_ids: Vec<Uuid> = self
                .strategies
                .iter()
                .filter(|r| r.value().project_id == id)
                .map(|r| *r.key())
                .collect();
            for sid in strategy_ids {
                self.strategies.remove(&sid);
            }
            self.log_audit(user, AuditAction::Delete, "project", &id.to_string(), serde_json::json!({}));
        }
        removed
    }

    // ─── Strategies ────────────────────────────────────────────────────────

    pub fn list_strategies(&self) -> Vec<Strategy> {
        let mut strategies: Vec<Strategy> = self.strategies.iter().map(|r| r.value().clone()).collect();
        strategies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        strategies
    }

    pub fn list_project_strategies(&self, project_id: Uuid) -> Vec<Strategy> {
        let mut strategies: Vec<Strategy> = self
            .strategies
            .iter()
            .filter(|r| r.value().project_id == project_id)
            .map(|r| r.value().clone())
            .collect();
        strategies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        strategies
    }

    pub fn get_strategy(&self, id: Uuid) -> Option<Strategy> {
        self.strategies.get(&id).map(|r| r.value().clone())
    }

    /// Insert or replace a strategy record as one write. Returns the
    /// previous record when one was replaced.
    pub fn put_strategy(&self, strategy: Strategy) -> Option<Strategy> {
        self.strategies.insert(strategy.id, strategy)
    }

    pub fn delete_strategy(&self, id: Uuid, user: &str) -> bool {
        let removed = self.strategies.remove(&id).is_some();
        if removed {
            self.log_audit(user, AuditAction::Delete, "strategy", &id.to_string(), serde_json::json!({}));
        }
        removed
    }

    // ─── Audit Log ─────────────────────────────────────────────────────────

    pub fn get_audit_log(&self) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> = self.audit_log.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    pub(crate) fn log_audit(
        &self,
        user: &str,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        details: serde_json::Value,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            user: user.to_string(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
            timestamp: Utc::now(),
        };
        self.audit_log.insert(entry.id, entry);
    }
}
