use std::time::Duration;

use chrono::TimeDelta;
use dotenvy::dotenv;
use tracing::info;

use subtrack::infra::{
    app::create_app,
    config::AppConfig,
    renewal_worker::{SweepSchedule, run_renewal_loop},
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(config.log_file.as_deref());

    let app_state = init_app_state(config).await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state.clone());

    // Sweeps run on one instance only; others serve requests.
    if app_state.config.run_sweeps {
        let schedule = SweepSchedule {
            renewal_interval: Duration::from_secs(app_state.config.renewal_sweep_interval_secs.max(1)),
            expiration_interval: Duration::from_secs(
                app_state.config.expiration_sweep_interval_secs.max(1),
            ),
            lookahead: TimeDelta::hours(app_state.config.renewal_lookahead_hours),
        };
        let renewal_use_cases = app_state.renewal_use_cases.clone();
        tokio::spawn(async move {
            run_renewal_loop(renewal_use_cases, schedule).await;
        });
    } else {
        info!("Sweeps disabled on this instance");
    }

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
