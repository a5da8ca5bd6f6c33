//! End-to-end checks of the strategy metrics engine against realistic
//! line items.

use campaign_core::types::{BillingModel, ProjectContext, StrategyInput};
use campaign_metrics::compute_metrics_as_of;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()
}

fn context(billing_model: BillingModel, end_date: Option<NaiveDate>) -> ProjectContext {
    ProjectContext {
        billing_model,
        end_date,
    }
}

/// Trading-desk CPM line item ten days long with five days left.
fn cpm_line_item() -> (StrategyInput, ProjectContext) {
    let end = today() + Duration::days(5);
    let input = StrategyInput {
        gross_budget: dec!(5000),
        agency_percentage: dec!(10),
        platform_percentage: dec!(80),
        contracted_delivery: Some(dec!(100000)),
        spend_to_date: Some(dec!(1800)),
        delivered_to_date: Some(dec!(40000)),
        kpi: Some("CPM".to_string()),
        start_date: Some(end - Duration::days(10)),
    };
    (input, context(BillingModel::TradingDesk, Some(end)))
}

#[test]
fn cpm_line_item_end_to_end() {
    let (input, ctx) = cpm_line_item();
    let m = compute_metrics_as_of(&input, &ctx, today());

    assert_eq!(m.net_budget, Some(dec!(4500)));
    assert_eq!(m.platform_budget, Some(dec!(3600)));
    assert_eq!(m.platform_coefficient, Some(dec!(0.72)));
    assert_eq!(m.daily_platform_budget, Some(dec!(360)));
    assert_eq!(m.delivery_percentage, Some(dec!(40)));
    assert_eq!(m.cost_per_result, Some(dec!(0.045)));
    assert_eq!(m.projected_outcome, Some(dec!(80000)));
    assert_eq!(m.projected_success_rate, Some(dec!(80)));
    assert_eq!(m.remaining_budget, Some(dec!(1800)));
    assert_eq!(m.days_remaining, Some(5));
    assert_eq!(m.remaining_per_day, Some(dec!(360)));
    assert_eq!(m.target_cost_per_result, Some(dec!(36)));
    assert_eq!(m.gross_spend_to_date, Some(dec!(2500)));
    assert_eq!(m.gross_remaining_budget, Some(dec!(2500)));
    assert_eq!(m.can_raise_margin, Some(true));
    assert_eq!(m.can_lower_margin, Some(false));
    assert!(m.has_margin_advisory());
}

#[test]
fn flat_fee_budgets_coincide() {
    for gross in [dec!(0), dec!(1), dec!(2500.75), dec!(1000000)] {
        let input = StrategyInput {
            gross_budget: gross,
            agency_percentage: dec!(35),
            platform_percentage: dec!(60),
            contracted_delivery: Some(dec!(1000)),
            spend_to_date: Some(dec!(10)),
            delivered_to_date: Some(dec!(100)),
            kpi: None,
            start_date: None,
        };
        let m = compute_metrics_as_of(&input, &context(BillingModel::FlatFee, None), today());

        assert_eq!(m.net_budget, Some(gross));
        assert_eq!(m.platform_budget, Some(gross));
        assert_eq!(m.platform_coefficient, None);
        assert_eq!(m.gross_spend_to_date, None);
        assert_eq!(m.gross_remaining_budget, None);
        assert_eq!(m.can_lower_margin, None);
        assert_eq!(m.can_raise_margin, None);
    }
}

#[test]
fn zero_contracted_delivery_is_never_divided() {
    let (mut input, ctx) = cpm_line_item();
    input.contracted_delivery = Some(Decimal::ZERO);
    let m = compute_metrics_as_of(&input, &ctx, today());

    assert_eq!(m.delivery_percentage, None);
    assert_eq!(m.target_cost_per_result, None);
    assert_eq!(m.projected_success_rate, None);
    assert_eq!(m.can_lower_margin, None);
    assert_eq!(m.can_raise_margin, None);
    // Independent metrics are still populated.
    assert_eq!(m.cost_per_result, Some(dec!(0.045)));
    assert_eq!(m.projected_outcome, Some(dec!(80000)));

    input.contracted_delivery = None;
    let m = compute_metrics_as_of(&input, &ctx, today());
    assert_eq!(m.delivery_percentage, None);
    assert_eq!(m.target_cost_per_result, None);
}

#[test]
fn kpi_switches_delivery_unit() {
    let input = StrategyInput {
        gross_budget: dec!(100),
        agency_percentage: dec!(0),
        platform_percentage: dec!(100),
        contracted_delivery: Some(dec!(50000)),
        spend_to_date: None,
        delivered_to_date: None,
        kpi: Some("CPM".to_string()),
        start_date: None,
    };
    let ctx = context(BillingModel::TradingDesk, None);

    let m = compute_metrics_as_of(&input, &ctx, today());
    assert_eq!(m.platform_budget, Some(dec!(100)));
    assert_eq!(m.target_cost_per_result, Some(dec!(2)));

    for kpi in [Some("CPC"), Some("CPA"), None] {
        let input = StrategyInput {
            kpi: kpi.map(str::to_string),
            ..input.clone()
        };
        let m = compute_metrics_as_of(&input, &ctx, today());
        assert_eq!(m.target_cost_per_result, Some(dec!(0.002)), "kpi {kpi:?}");
    }
}

#[test]
fn days_remaining_never_negative() {
    let (input, _) = cpm_line_item();
    for offset in [-365, -1, 0, 1, 30] {
        let ctx = context(BillingModel::TradingDesk, Some(today() + Duration::days(offset)));
        let m = compute_metrics_as_of(&input, &ctx, today());
        assert_eq!(m.days_remaining, Some(offset.max(0)), "offset {offset}");
        if offset <= 0 {
            assert_eq!(m.remaining_per_day, None);
        }
    }
}

#[test]
fn margin_flags_never_both_true() {
    let (mut input, ctx) = cpm_line_item();
    for spend in [dec!(100), dec!(900), dec!(1200), dec!(1440), dec!(1800), dec!(3000)] {
        input.spend_to_date = Some(spend);
        let m = compute_metrics_as_of(&input, &ctx, today());
        assert!(
            !(m.can_lower_margin == Some(true) && m.can_raise_margin == Some(true)),
            "spend {spend}"
        );
    }
}

#[test]
fn exact_threshold_rates_hold_for_repeating_costs() {
    // One unit of spend over `delivered` results never terminates, so any
    // rounding of the cost per result would nudge the rate off 100 or 150.
    let ctx = context(BillingModel::TradingDesk, None);
    let line_item = |delivered: Decimal, contracted: Decimal| StrategyInput {
        gross_budget: dec!(1000),
        agency_percentage: dec!(0),
        platform_percentage: dec!(100),
        contracted_delivery: Some(contracted),
        spend_to_date: Some(dec!(1)),
        delivered_to_date: Some(delivered),
        kpi: None,
        start_date: None,
    };

    for delivered in [dec!(3), dec!(6), dec!(7), dec!(9), dec!(11), dec!(13)] {
        let m = compute_metrics_as_of(&line_item(delivered, dec!(1000) * delivered), &ctx, today());
        assert_eq!(m.projected_success_rate, Some(dec!(100)), "delivered {delivered}");
        assert_eq!(m.can_raise_margin, Some(false), "delivered {delivered}");
        assert_eq!(m.can_lower_margin, Some(false), "delivered {delivered}");
    }

    for delivered in [dec!(3), dec!(6), dec!(9), dec!(21), dec!(33)] {
        let contracted = dec!(2000) * delivered / dec!(3);
        let m = compute_metrics_as_of(&line_item(delivered, contracted), &ctx, today());
        assert_eq!(m.projected_success_rate, Some(dec!(150)), "delivered {delivered}");
        assert_eq!(m.can_lower_margin, Some(false), "delivered {delivered}");
        assert_eq!(m.can_raise_margin, Some(false), "delivered {delivered}");
    }
}

#[test]
fn repeated_computation_is_identical() {
    let (input, ctx) = cpm_line_item();
    let first = compute_metrics_as_of(&input, &ctx, today());
    let second = compute_metrics_as_of(&input, &ctx, today());

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn missing_values_serialize_as_null() {
    let input = StrategyInput {
        gross_budget: dec!(1000),
        agency_percentage: dec!(0),
        platform_percentage: dec!(100),
        contracted_delivery: None,
        spend_to_date: None,
        delivered_to_date: None,
        kpi: None,
        start_date: None,
    };
    let m = compute_metrics_as_of(&input, &context(BillingModel::FlatFee, None), today());
    let json = serde_json::to_value(&m).unwrap();

    assert!(json["costPerResult"].is_null());
    assert!(json["daysRemaining"].is_null());
    assert!(json["canLowerMargin"].is_null());
    assert!(!json["platformBudget"].is_null());
}
