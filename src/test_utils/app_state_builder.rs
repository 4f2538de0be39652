//! Test app state builder for HTTP-level testing.
//!
//! `TestAppStateBuilder` creates an `AppState` wired to in-memory repositories
//! and a fixed clock.

use std::sync::Arc;

use axum::http::HeaderValue;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use time::Duration;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    application::jwt,
    domain::{
        entities::{plan::Plan, subscription::Subscription},
        period_label::Locale,
    },
    infra::config::AppConfig,
    test_utils::{FixedClock, InMemoryPlanRepo, InMemorySubscriptionRepo, test_datetime},
    use_cases::{
        plan::PlanUseCases, renewal::RenewalUseCases, subscription::SubscriptionUseCases,
    },
};

const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt";

/// Repositories behind a built `AppState`, for assertions after a request.
pub struct TestRepos {
    pub plans: Arc<InMemoryPlanRepo>,
    pub subscriptions: Arc<InMemorySubscriptionRepo>,
    pub clock: Arc<FixedClock>,
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let plan = create_test_plan(|p| p.price = 5.0);
/// let app_state = TestAppStateBuilder::new().with_plan(plan).build();
/// ```
pub struct TestAppStateBuilder {
    plans: Vec<Plan>,
    subscriptions: Vec<Subscription>,
    now: DateTime<Utc>,
    locale: Locale,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            plans: vec![],
            subscriptions: vec![],
            now: test_datetime(),
            locale: Locale::En,
        }
    }

    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(plan);
        self
    }

    pub fn with_subscription(mut self, subscription: Subscription) -> Self {
        self.subscriptions.push(subscription);
        self
    }

    /// Pin the clock used by the use cases.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_repos().0
    }

    /// Build the AppState and hand back the repositories behind it.
    pub fn build_with_repos(self) -> (AppState, TestRepos) {
        let plans = Arc::new(InMemoryPlanRepo::with_plans(self.plans));
        let subscriptions = Arc::new(InMemorySubscriptionRepo::with_subscriptions(
            self.subscriptions,
        ));
        let clock = Arc::new(FixedClock::at(self.now));

        let plan_use_cases = Arc::new(PlanUseCases::new(plans.clone()));
        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            subscriptions.clone(),
            plans.clone(),
            clock.clone(),
        ));
        let renewal_use_cases = Arc::new(RenewalUseCases::new(
            subscriptions.clone(),
            plans.clone(),
            clock.clone(),
        ));

        let app_state = AppState {
            config: Arc::new(test_config(self.locale)),
            plan_use_cases,
            subscription_use_cases,
            renewal_use_cases,
            clock: clock.clone(),
        };

        (
            app_state,
            TestRepos {
                plans,
                subscriptions,
                clock,
            },
        )
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config(locale: Locale) -> AppConfig {
    AppConfig {
        jwt_secret: SecretString::new(TEST_JWT_SECRET.into()),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        bind_addr: ([127, 0, 0, 1], 0).into(),
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        run_sweeps: false,
        renewal_sweep_interval_secs: 3600,
        expiration_sweep_interval_secs: 3600,
        renewal_lookahead_hours: 24,
        period_label_locale: locale,
        seed_plans: false,
        log_file: None,
    }
}

/// Access token signed with the secret `TestAppStateBuilder` configures.
pub fn test_token(user_id: Uuid, admin: bool) -> String {
    jwt::issue(
        user_id,
        admin,
        &SecretString::new(TEST_JWT_SECRET.into()),
        Duration::hours(1),
    )
    .unwrap()
}
