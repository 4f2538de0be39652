use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::subscription::{
        SubscriptionFilter, SubscriptionOrder, SubscriptionRepo,
    },
    domain::entities::subscription::Subscription,
};

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Subscription {
    Subscription {
        id: row.get("id"),
        user_id: row.get("user_id"),
        plan_id: row.get("plan_id"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        status: row.get("status"),
        auto_renew: row.get("auto_renew"),
        renewal_date: row.get("renewal_date"),
        cancelled_at: row.get("cancelled_at"),
        payment_ref: row.get("payment_ref"),
        version: row.get("version"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, plan_id, start_date, end_date, status, auto_renew,
    renewal_date, cancelled_at, payment_ref, version, created_at, updated_at
"#;

fn push_subscription_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &SubscriptionFilter) {
    if let Some(user_id) = filter.user_id {
        builder.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(auto_renew) = filter.auto_renew {
        builder.push(" AND auto_renew = ").push_bind(auto_renew);
    }
    if let Some(from) = filter.end_date_from {
        builder.push(" AND end_date >= ").push_bind(from);
    }
    if let Some(to) = filter.end_date_to {
        builder.push(" AND end_date <= ").push_bind(to);
    }
    if let Some(before) = filter.end_date_before {
        builder.push(" AND end_date < ").push_bind(before);
    }
}

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 AND deleted_at IS NULL",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_subscription))
    }

    async fn create(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions (
                id, user_id, plan_id, start_date, end_date, status, auto_renew,
                renewal_date, cancelled_at, payment_ref, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(subscription.id)
        .bind(subscription.user_id)
        .bind(subscription.plan_id)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.status)
        .bind(subscription.auto_renew)
        .bind(subscription.renewal_date)
        .bind(subscription.cancelled_at)
        .bind(&subscription.payment_ref)
        .bind(subscription.version)
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_subscription(&row))
    }

    async fn save(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE subscriptions SET
                start_date = $3, end_date = $4, status = $5, auto_renew = $6,
                renewal_date = $7, cancelled_at = $8, payment_ref = $9,
                updated_at = $10, version = version + 1
            WHERE id = $1 AND version = $2 AND deleted_at IS NULL
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(subscription.id)
        .bind(subscription.version)
        .bind(subscription.start_date)
        .bind(subscription.end_date)
        .bind(subscription.status)
        .bind(subscription.auto_renew)
        .bind(subscription.renewal_date)
        .bind(subscription.cancelled_at)
        .bind(&subscription.payment_ref)
        .bind(subscription.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;

        if let Some(row) = row {
            return Ok(row_to_subscription(&row));
        }

        // Nothing matched: either the row is gone or someone else bumped the version.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(subscription.id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;

        if exists {
            Err(AppError::Conflict)
        } else {
            Err(AppError::SubscriptionNotFound)
        }
    }

    async fn find(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM subscriptions WHERE deleted_at IS NULL",
            SELECT_COLS
        ));
        push_subscription_filters(&mut builder, filter);
        builder.push(match filter.order {
            SubscriptionOrder::CreatedDesc => " ORDER BY created_at DESC, id",
            SubscriptionOrder::EndDateAsc => " ORDER BY end_date ASC, id",
        });

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_subscription).collect())
    }
}
