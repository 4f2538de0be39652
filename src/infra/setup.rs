use crate::{
    adapters::http::app_state::AppState,
    application::clock::{Clock, SystemClock},
    infra::{config::AppConfig, error::InfraError, postgres_persistence, seed::seed_catalog},
    use_cases::{
        plan::{PlanRepo, PlanUseCases},
        renewal::RenewalUseCases,
        subscription::{SubscriptionRepo, SubscriptionUseCases},
    },
};
use std::fs::File;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let postgres_arc =
        Arc::new(postgres_persistence(&config.database_url, config.db_max_connections).await?);

    let plan_repo_arc = postgres_arc.clone() as Arc<dyn PlanRepo>;
    let subscription_repo_arc = postgres_arc.clone() as Arc<dyn SubscriptionRepo>;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if config.seed_plans {
        seed_catalog(plan_repo_arc.as_ref())
            .await
            .map_err(InfraError::Seed)?;
    }

    let plan_use_cases = PlanUseCases::new(plan_repo_arc.clone());
    let subscription_use_cases = SubscriptionUseCases::new(
        subscription_repo_arc.clone(),
        plan_repo_arc.clone(),
        clock.clone(),
    );
    let renewal_use_cases =
        RenewalUseCases::new(subscription_repo_arc, plan_repo_arc, clock.clone());

    Ok(AppState {
        config: Arc::new(config),
        plan_use_cases: Arc::new(plan_use_cases),
        subscription_use_cases: Arc::new(subscription_use_cases),
        renewal_use_cases: Arc::new(renewal_use_cases),
        clock,
    })
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "subtrack=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs), only when a path is configured
    let json_layer = log_file.and_then(|path| match File::create(path) {
        Ok(file) => Some(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(true)
                .with_span_list(true)
                .boxed(),
        ),
        Err(e) => {
            eprintln!("cannot create log file {path}: {e}");
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
