//! Outbound notifications fired after a strategy is written.
//!
//! Email, in-app and chat delivery live outside this crate; they plug in
//! through [`StrategyNotifier`].

use crate::models::Strategy;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

/// Receives strategy lifecycle events once the write has been stored.
pub trait StrategyNotifier: Send + Sync {
    fn strategy_created(&self, strategy: &Strategy);
    fn strategy_updated(&self, strategy: &Strategy, previous: &Strategy);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyEventKind {
    Created,
    Updated,
}

/// Flattened view of a notification, as a delivery channel would see it.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyEvent {
    pub kind: StrategyEventKind,
    pub strategy_id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub can_lower_margin: Option<bool>,
    pub can_raise_margin: Option<bool>,
    pub at: DateTime<Utc>,
}

impl StrategyEvent {
    fn new(kind: StrategyEventKind, strategy: &Strategy) -> Self {
        Self {
            kind,
            strategy_id: strategy.id,
            project_id: strategy.project_id,
            name: strategy.name.clone(),
            can_lower_margin: strategy.metrics.can_lower_margin,
            can_raise_margin: strategy.metrics.can_raise_margin,
            at: Utc::now(),
        }
    }
}

/// Writes every event to the log; margin advisories at `warn`.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl LogNotifier {
    fn advise(&self, strategy: &Strategy) {
        if strategy.metrics.can_raise_margin == Some(true) {
            warn!(
                strategy_id = %strategy.id,
                projected_success_rate = ?strategy.metrics.projected_success_rate,
                "Strategy under-delivering, consider raising margin"
            );
        } else if strategy.metrics.can_lower_margin == Some(true) {
            warn!(
                strategy_id = %strategy.id,
                projected_success_rate = ?strategy.metrics.projected_success_rate,
                "Strategy over-delivering, margin could be lowered"
            );
        }
    }
}

impl StrategyNotifier for LogNotifier {
    fn strategy_created(&self, strategy: &Strategy) {
        info!(
            strategy_id = %strategy.id,
            project_id = %strategy.project_id,
            name = %strategy.name,
            "Strategy created"
        );
        self.advise(strategy);
    }

    fn strategy_updated(&self, strategy: &Strategy, previous: &Strategy) {
        info!(
            strategy_id = %strategy.id,
            project_id = %strategy.project_id,
            status_changed = strategy.status != previous.status,
            "Strategy updated"
        );
        // Only re-announce an advisory that was not already raised.
        if strategy.metrics.has_margin_advisory()
            && (strategy.metrics.can_lower_margin != previous.metrics.can_lower_margin
                || strategy.metrics.can_raise_margin != previous.metrics.can_raise_margin)
        {
            self.advise(strategy);
        }
    }
}

/// Keeps events in memory. Used by tests and local development.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<StrategyEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StrategyEvent> {
        self.events.lock().clone()
    }
}

impl StrategyNotifier for RecordingNotifier {
    fn strategy_created(&self, strategy: &Strategy) {
        self.events.lock().push(StrategyEvent::new(StrategyEventKind::Created, strategy));
    }

    fn strategy_updated(&self, strategy: &Strategy, _previous: &Strategy) {
        self.events.lock().push(StrategyEvent::new(StrategyEventKind::Updated, strategy));
    }
}
