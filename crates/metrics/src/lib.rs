//! Strategy metrics engine — budget splits, pacing, delivery and margin
//! advisories derived from a strategy's raw input and its project context.
//!
//! Everything here is pure: no I/O, no shared state, no errors. A metric that
//! cannot be computed from the given input is `None`.

pub mod engine;
pub mod pacing;

pub use engine::{compute_metrics, compute_metrics_as_of, LOWER_MARGIN_THRESHOLD, RAISE_MARGIN_THRESHOLD};
pub use pacing::{days_remaining, delivery_unit_divisor, strategy_duration_days};
