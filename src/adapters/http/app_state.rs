use std::sync::Arc;

use crate::{
    application::clock::Clock,
    infra::config::AppConfig,
    use_cases::{
        plan::PlanUseCases, renewal::RenewalUseCases, subscription::SubscriptionUseCases,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub plan_use_cases: Arc<PlanUseCases>,
    pub subscription_use_cases: Arc<SubscriptionUseCases>,
    pub renewal_use_cases: Arc<RenewalUseCases>,
    pub clock: Arc<dyn Clock>,
}
