//! Derives budget, pacing and margin metrics for a single strategy.

use crate::pacing;
use campaign_core::types::{ProjectContext, StrategyInput, StrategyMetrics};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

/// Projected success rate (percent) above which the margin can be lowered.
pub const LOWER_MARGIN_THRESHOLD: Decimal = dec!(150);
/// Projected success rate (percent) below which the margin should be raised.
pub const RAISE_MARGIN_THRESHOLD: Decimal = dec!(100);

/// Compute metrics using today's UTC date for pacing.
pub fn compute_metrics(input: &StrategyInput, context: &ProjectContext) -> StrategyMetrics {
    compute_metrics_as_of(input, context, pacing::today_utc())
}

/// Compute metrics with an explicit "today".
///
/// Absent optional quantities count as zero in arithmetic, but a metric is
/// only produced when the quantities it depends on are positive.
pub fn compute_metrics_as_of(
    input: &StrategyInput,
    context: &ProjectContext,
    today: NaiveDate,
) -> StrategyMetrics {
    let is_flat_fee = context.billing_model.is_flat_fee();
    let gross = input.gross_budget;
    let spend = input.spend_to_date.unwrap_or_default();
    let delivered = input.delivered_to_date.unwrap_or_default();
    let contracted = input.contracted_delivery.unwrap_or_default();

    // --- Budget split ---
    let net_budget = if is_flat_fee {
        Some(gross)
    } else {
        percent_of(gross, input.agency_percentage).and_then(|share| gross.checked_sub(share))
    };
    let platform_budget = if is_flat_fee {
        Some(gross)
    } else {
        net_budget.and_then(|net| percent_of(net, input.platform_percentage))
    };
    let platform_coefficient = if is_flat_fee {
        None
    } else {
        platform_budget.and_then(|platform| ratio(platform, gross))
    };

    // --- Pacing ---
    let duration = pacing::strategy_duration_days(input.start_date, context.end_date);
    let days_remaining = pacing::days_remaining(context.end_date, today);
    let daily_platform_budget = platform_budget
        .zip(duration)
        .and_then(|(platform, days)| ratio(platform, Decimal::from(days)));

    // --- Delivery ---
    let delivery_percentage = if delivered > Decimal::ZERO {
        ratio(delivered, contracted).and_then(as_percent)
    } else {
        None
    };
    let cost_per_result = if delivered > Decimal::ZERO {
        positive(spend).and_then(|spend| ratio(spend, delivered))
    } else {
        None
    };
    // Projections divide once by the raw spend, never by the rounded
    // cost per result, so an exact 100% or 150% stays exact.
    let delivered_budget = platform_budget
        .filter(|_| cost_per_result.is_some())
        .and_then(|platform| platform.checked_mul(delivered));
    let projected_outcome = delivered_budget.and_then(|scaled| ratio(scaled, spend));
    let projected_success_rate = projected_outcome
        .and(delivered_budget)
        .and_then(as_percent)
        .zip(spend.checked_mul(contracted))
        .and_then(|(scaled, denominator)| ratio(scaled, denominator));

    // --- Remaining budget ---
    let remaining_budget = platform_budget.and_then(|platform| platform.checked_sub(spend));
    let remaining_per_day = remaining_budget
        .zip(days_remaining)
        .and_then(|(remaining, days)| ratio(remaining, Decimal::from(days)));

    let divisor = pacing::delivery_unit_divisor(input.kpi.as_deref());
    let target_cost_per_result = platform_budget
        .zip(ratio(contracted, divisor))
        .and_then(|(platform, units)| ratio(platform, units));

    // --- Gross inversion ---
    let gross_spend_to_date = platform_coefficient.and_then(|coefficient| ratio(spend, coefficient));
    let gross_remaining_budget = gross_spend_to_date.and_then(|gross_spend| gross.checked_sub(gross_spend));

    // --- Margin advisories ---
    let (can_lower_margin, can_raise_margin) = match projected_success_rate {
        Some(rate) if !is_flat_fee => (
            Some(rate > LOWER_MARGIN_THRESHOLD),
            Some(rate < RAISE_MARGIN_THRESHOLD),
        ),
        _ => (None, None),
    };

    debug!(
        billing_model = %context.billing_model,
        days_remaining = ?days_remaining,
        projected_success_rate = ?projected_success_rate,
        can_lower_margin = ?can_lower_margin,
        can_raise_margin = ?can_raise_margin,
        "Strategy metrics computed"
    );

    StrategyMetrics {
        net_budget,
        platform_budget,
        platform_coefficient,
        daily_platform_budget,
        delivery_percentage,
        cost_per_result,
        projected_outcome,
        projected_success_rate,
        remaining_budget,
        days_remaining,
        remaining_per_day,
        target_cost_per_result,
        gross_spend_to_date,
        gross_remaining_budget,
        can_lower_margin,
        can_raise_margin,
    }
}

/// `numerator / denominator`, or `None` unless the denominator is positive.
/// Overflow also yields `None`.
fn ratio(numerator: Decimal, denominator: Decimal) -> Option<Decimal> {
    if denominator > Decimal::ZERO {
        numerator.checked_div(denominator)
    } else {
        None
    }
}

/// `value * percentage / 100`. Percentages are not clamped.
fn percent_of(value: Decimal, percentage: Decimal) -> Option<Decimal> {
    value
        .checked_mul(percentage)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
}

fn as_percent(fraction: Decimal) -> Option<Decimal> {
    fraction.checked_mul(Decimal::ONE_HUNDRED)
}

fn positive(value: Decimal) -> Option<Decimal> {
    (value > Decimal::ZERO).then_some(value)
}
