use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, auth::current_admin},
    app_error::AppResult,
    application::use_cases::plan::PlanInput,
    domain::{
        billing_period::monthly_equivalent_price, entities::plan::Plan,
        period_label::format_period_label,
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_plans))
        .route("/filter", get(filter_plans))
        .route("/service/{name}", get(plans_for_service))
        .route("/{plan_id}", get(get_plan))
        .route("/{plan_id}/related", get(related_plans))
}

/// Mounted under `/admin`.
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/{plan_id}", put(update_plan).delete(delete_plan))
}

/// A plan as shown to clients, with its period label and normalised price.
#[derive(Debug, Serialize)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: Plan,
    pub period_label: String,
    pub monthly_price: f64,
}

impl PlanView {
    pub fn new(plan: Plan, app_state: &AppState) -> Self {
        let rules = app_state.config.period_label_locale.rules();
        Self {
            period_label: format_period_label(&plan, rules),
            monthly_price: monthly_equivalent_price(&plan),
            plan,
        }
    }
}

fn plan_views(plans: Vec<Plan>, app_state: &AppState) -> Vec<PlanView> {
    plans
        .into_iter()
        .map(|p| PlanView::new(p, app_state))
        .collect()
}

async fn list_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plans = app_state.plan_use_cases.list_plans().await?;
    Ok(Json(json!({ "plans": plan_views(plans, &app_state) })))
}

#[derive(Deserialize)]
struct PriceRangeParams {
    min: Option<String>,
    max: Option<String>,
}

/// Unparseable bounds are treated as missing.
async fn filter_plans(
    State(app_state): State<AppState>,
    Query(params): Query<PriceRangeParams>,
) -> AppResult<impl IntoResponse> {
    let min = params.min.as_deref().and_then(|s| s.trim().parse().ok());
    let max = params.max.as_deref().and_then(|s| s.trim().parse().ok());

    let plans = app_state
        .plan_use_cases
        .filter_plans_by_price(min, max)
        .await?;
    Ok(Json(json!({ "plans": plan_views(plans, &app_state) })))
}

async fn plans_for_service(
    State(app_state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let plans = app_state.plan_use_cases.plans_for_service(&name).await?;
    Ok(Json(json!({ "plans": plan_views(plans, &app_state) })))
}

async fn get_plan(
    State(app_state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plan = app_state.plan_use_cases.get_plan(plan_id).await?;
    Ok(Json(json!({ "plan": PlanView::new(plan, &app_state) })))
}

async fn related_plans(
    State(app_state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let plans = app_state.plan_use_cases.related_plans(plan_id).await?;
    Ok(Json(
        json!({ "related_plans": plan_views(plans, &app_state) }),
    ))
}

async fn create_plan(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<PlanInput>,
) -> AppResult<impl IntoResponse> {
    current_admin(&headers, &app_state)?;
    let plan = app_state.plan_use_cases.create_plan(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Plan created successfully",
            "plan": PlanView::new(plan, &app_state),
        })),
    ))
}

async fn update_plan(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(plan_id): Path<Uuid>,
    Json(input): Json<PlanInput>,
) -> AppResult<impl IntoResponse> {
    current_admin(&headers, &app_state)?;
    let plan = app_state.plan_use_cases.update_plan(plan_id, input).await?;
    Ok(Json(json!({
        "message": "Plan updated successfully",
        "plan": PlanView::new(plan, &app_state),
    })))
}

async fn delete_plan(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(plan_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    current_admin(&headers, &app_state)?;
    app_state.plan_use_cases.delete_plan(plan_id).await?;
    Ok(Json(json!({ "message": "Plan deleted successfully" })))
}
