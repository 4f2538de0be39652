//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    application::use_cases::plan::PlanInput,
    domain::entities::{
        plan::{PeriodType, Plan},
        subscription::{Subscription, SubscriptionStatus},
    },
};

/// Create a test plan with sensible defaults.
pub fn create_test_plan(overrides: impl FnOnce(&mut Plan)) -> Plan {
    let mut plan = Plan {
        id: Uuid::new_v4(),
        name: "Netflix".to_string(),
        description: Some("Streaming service".to_string()),
        price: 9.99,
        duration: 30,
        period_type: PeriodType::Days,
        features: vec!["HD".to_string(), "2 screens".to_string()],
        is_popular: false,
        is_active: true,
        service_icon: None,
        service_type: Some("video".to_string()),
        service_url: Some("https://netflix.com".to_string()),
        created_at: Some(test_datetime()),
        updated_at: Some(test_datetime()),
    };
    overrides(&mut plan);
    plan
}

/// Create a test plan input that passes validation.
pub fn create_test_plan_input(overrides: impl FnOnce(&mut PlanInput)) -> PlanInput {
    let mut input = PlanInput {
        name: "Spotify".to_string(),
        description: None,
        price: 5.0,
        duration: 1,
        period_type: PeriodType::Months,
        features: vec![],
        is_popular: false,
        is_active: true,
        service_icon: None,
        service_type: Some("music".to_string()),
        service_url: None,
    };
    overrides(&mut input);
    input
}

/// Create an active, auto-renewing subscription running from `test_datetime()` for 30 days.
pub fn create_test_subscription(
    user_id: Uuid,
    plan_id: Uuid,
    overrides: impl FnOnce(&mut Subscription),
) -> Subscription {
    let now = test_datetime();

    let mut subscription = Subscription {
        id: Uuid::new_v4(),
        user_id,
        plan_id,
        start_date: now,
        end_date: now + TimeDelta::days(30),
        status: SubscriptionStatus::Active,
        auto_renew: true,
        renewal_date: None,
        cancelled_at: None,
        payment_ref: None,
        version: 0,
        created_at: now,
        updated_at: now,
    };
    overrides(&mut subscription);
    subscription
}

/// Returns a fixed test datetime (2024-01-15 12:00:00 UTC).
pub fn test_datetime() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_apply_overrides() {
        let plan = create_test_plan(|p| p.name = "Custom".to_string());
        assert_eq!(plan.name, "Custom");
        assert!(plan.is_active);

        let sub = create_test_subscription(Uuid::new_v4(), plan.id, |s| s.auto_renew = false);
        assert!(!sub.auto_renew);
        assert_eq!(sub.plan_id, plan.id);
        assert!(sub.end_date > sub.start_date);
    }
}
