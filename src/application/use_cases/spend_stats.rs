use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    billing_period::monthly_equivalent_price,
    entities::{plan::Plan, subscription::Subscription},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SpendStats {
    pub active_count: usize,
    #[serde(rename = "total_monthly_spending")]
    pub total_monthly_spend: f64,
}

/// Aggregates the subscriptions that are active at `now`.
///
/// Non-finite monthly prices are counted but not summed, and so is a subscription
/// whose plan could not be resolved.
pub fn compute_spend_stats(items: &[(Subscription, Option<Plan>)], now: DateTime<Utc>) -> SpendStats {
    let mut stats = SpendStats::default();

    for (subscription, plan) in items.iter().filter(|(s, _)| s.is_active_at(now)) {
        stats.active_count += 1;

        let Some(plan) = plan else {
            tracing::warn!(
                subscription_id = %subscription.id,
                plan_id = %subscription.plan_id,
                "Active subscription without a resolvable plan, excluded from spend"
            );
            continue;
        };

        let monthly = monthly_equivalent_price(plan);
        if monthly.is_finite() {
            stats.total_monthly_spend += monthly;
        } else {
            tracing::warn!(
                plan_id = %plan.id,
                price = plan.price,
                "Non-finite monthly price, excluded from spend"
            );
        }
    }

    stats
}
