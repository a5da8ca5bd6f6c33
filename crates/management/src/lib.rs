//! Strategy management backend — projects, strategies and their metrics.
//!
//! Every strategy write goes through [`StrategyService`], which loads the
//! owning project's billing model and end date, runs the metrics engine and
//! stores the input together with the derived snapshot.
//! Data stored in DashMap (development); swap to PostgreSQL for production.

pub mod handlers;
pub mod models;
pub mod notifier;
pub mod router;
pub mod service;
pub mod store;

pub use handlers::ManagementState;
pub use notifier::{LogNotifier, RecordingNotifier, StrategyNotifier};
pub use router::management_router;
pub use service::{Clock, FixedClock, StrategyService, SystemClock};
pub use store::ManagementStore;
