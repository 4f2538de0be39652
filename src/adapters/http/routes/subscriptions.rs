use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
    adapters::http::{app_state::AppState, auth::current_user, routes::plans::PlanView},
    app_error::AppResult,
    application::{clock::Clock, use_cases::subscription::SearchQuery},
    domain::entities::subscription::{Subscription, SubscriptionWithPlan},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_subscriptions).post(subscribe))
        .route("/active", get(list_active_subscriptions))
        .route("/search", get(search_subscriptions))
        .route("/stats", get(spend_stats))
        .route("/provider/{name}", get(subscriptions_by_provider))
        .route("/{subscription_id}", get(get_subscription))
        .route("/{subscription_id}/cancel", put(cancel_subscription))
        .route("/{subscription_id}/auto-renew", put(set_auto_renew))
        .route("/{subscription_id}/renew", put(renew_subscription))
}

/// A subscription with its plan and the read-time lifecycle fields.
#[derive(Debug, Serialize)]
struct SubscriptionView {
    #[serde(flatten)]
    subscription: Subscription,
    plan: PlanView,
    is_active: bool,
    is_expired: bool,
    days_remaining: i64,
}

impl SubscriptionView {
    fn new(item: SubscriptionWithPlan, app_state: &AppState) -> Self {
        let now = app_state.clock.now();
        Self {
            is_active: item.subscription.is_active_at(now),
            is_expired: item.subscription.is_expired_at(now),
            days_remaining: item.subscription.days_remaining_at(now),
            plan: PlanView::new(item.plan, app_state),
            subscription: item.subscription,
        }
    }
}

fn subscription_views(items: Vec<SubscriptionWithPlan>, app_state: &AppState) -> Vec<SubscriptionView> {
    items
        .into_iter()
        .map(|item| SubscriptionView::new(item, app_state))
        .collect()
}

async fn list_all_subscriptions(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let items = app_state
        .subscription_use_cases
        .list_all_subscriptions(user.user_id)
        .await?;
    Ok(Json(
        json!({ "subscriptions": subscription_views(items, &app_state) }),
    ))
}

async fn list_active_subscriptions(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let items = app_state
        .subscription_use_cases
        .list_active_subscriptions(user.user_id)
        .await?;
    Ok(Json(
        json!({ "active_subscriptions": subscription_views(items, &app_state) }),
    ))
}

#[derive(Deserialize)]
struct SearchParams {
    query: Option<String>,
    status: Option<String>,
    sort_by: Option<String>,
}

async fn search_subscriptions(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let query = SearchQuery {
        text: params.query,
        status: params.status,
        sort_by: params.sort_by,
    };
    let items = app_state
        .subscription_use_cases
        .search_subscriptions(user.user_id, query)
        .await?;
    Ok(Json(
        json!({ "subscriptions": subscription_views(items, &app_state) }),
    ))
}

async fn spend_stats(
    State(app_state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let stats = app_state
        .subscription_use_cases
        .spend_stats(user.user_id)
        .await?;
    Ok(Json(json!({ "stats": stats })))
}

async fn subscriptions_by_provider(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let items = app_state
        .subscription_use_cases
        .subscriptions_by_provider(user.user_id, &name)
        .await?;
    Ok(Json(
        json!({ "subscriptions": subscription_views(items, &app_state) }),
    ))
}

#[derive(Deserialize)]
struct SubscribePayload {
    plan_id: Uuid,
    payment_id: Option<String>,
}

async fn subscribe(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<SubscribePayload>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let item = app_state
        .subscription_use_cases
        .subscribe(user.user_id, payload.plan_id, payload.payment_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "subscription": SubscriptionView::new(item, &app_state),
            "message": "Subscription created successfully",
        })),
    ))
}

async fn get_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(subscription_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let item = app_state
        .subscription_use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;
    Ok(Json(
        json!({ "subscription": SubscriptionView::new(item, &app_state) }),
    ))
}

async fn cancel_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(subscription_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let use_cases = &app_state.subscription_use_cases;

    use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;
    use_cases.cancel(subscription_id).await?;
    let item = use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;

    Ok(Json(json!({
        "subscription": SubscriptionView::new(item, &app_state),
        "message": "Subscription cancelled successfully",
    })))
}

#[derive(Deserialize)]
struct AutoRenewPayload {
    auto_renew: bool,
}

async fn set_auto_renew(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(subscription_id): Path<Uuid>,
    Json(payload): Json<AutoRenewPayload>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let use_cases = &app_state.subscription_use_cases;

    use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;
    use_cases
        .set_auto_renew(subscription_id, payload.auto_renew)
        .await?;
    let item = use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;

    Ok(Json(json!({
        "subscription": SubscriptionView::new(item, &app_state),
        "message": "Auto-renewal settings updated successfully",
    })))
}

async fn renew_subscription(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Path(subscription_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &app_state)?;
    let use_cases = &app_state.subscription_use_cases;

    use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;
    use_cases.renew(subscription_id).await?;
    let item = use_cases
        .get_subscription(user.user_id, subscription_id)
        .await?;

    Ok(Json(json!({
        "subscription": SubscriptionView::new(item, &app_state),
        "message": "Subscription renewed successfully",
    })))
}
