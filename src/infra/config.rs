use std::net::SocketAddr;

use axum::http::HeaderValue;
use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;

use crate::{
    application::use_cases::renewal::DEFAULT_RENEWAL_LOOKAHEAD_HOURS, domain::period_label::Locale,
};

pub struct AppConfig {
    pub jwt_secret: SecretString,
    pub cors_origin: HeaderValue,
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Whether this process drives the renewal and expiration sweeps.
    /// Enable it on exactly one instance per database.
    pub run_sweeps: bool,
    pub renewal_sweep_interval_secs: u64,
    pub expiration_sweep_interval_secs: u64,
    pub renewal_lookahead_hours: i64,
    pub period_label_locale: Locale,
    /// Insert the starter catalog when the plans table is empty.
    pub seed_plans: bool,
    /// Optional path for structured JSON logs in addition to the console.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret: SecretString = SecretString::new(get_env::<String>("JWT_SECRET").into());

        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .expect("CORS_ORIGIN must be a valid header value");

        let bind_addr: SocketAddr =
            get_env_default("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 8080)));
        let database_url: String = get_env("DATABASE_URL");
        let db_max_connections: u32 = get_env_default("DB_MAX_CONNECTIONS", 5);

        let run_sweeps: bool = get_env_default("RUN_SWEEPS", true);
        let renewal_sweep_interval_secs: u64 = get_env_default("RENEWAL_SWEEP_INTERVAL_SECS", 3600);
        let expiration_sweep_interval_secs: u64 =
            get_env_default("EXPIRATION_SWEEP_INTERVAL_SECS", 3600);
        let renewal_lookahead_hours: i64 = get_env_default("RENEWAL_LOOKAHEAD_HOURS", DEFAULT_RENEWAL_LOOKAHEAD_HOURS);

        let period_label_locale =
            Locale::from_str(&get_env_default("PERIOD_LABEL_LOCALE", String::from("ru")));
        let seed_plans: bool = get_env_default("SEED_PLANS", false);
        let log_file: Option<String> = std::env::var("LOG_FILE").ok().filter(|s| !s.is_empty());

        Self {
            jwt_secret,
            cors_origin,
            bind_addr,
            database_url,
            db_max_connections,
            run_sweeps,
            renewal_sweep_interval_secs,
            expiration_sweep_interval_secs,
            renewal_lookahead_hours,
            period_label_locale,
            seed_plans,
            log_file,
        }
    }
}
