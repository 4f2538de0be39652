pub mod plans;
pub mod subscriptions;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/plans", plans::router())
        .nest("/admin", plans::admin_router())
        .nest("/subscriptions", subscriptions::router())
}
