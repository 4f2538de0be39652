use async_trait::async_trait;
use sqlx::{Row, types::Json};
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::plan::{PlanInput, PlanRepo},
    domain::entities::plan::{PeriodType, Plan},
};

const SELECT_COLS: &str = r#"
    id, name, description, price, duration, period_type, features,
    is_popular, is_active, service_icon, service_type, service_url,
    created_at, updated_at
"#;

fn row_to_plan(row: &sqlx::postgres::PgRow) -> Plan {
    let id: Uuid = row.get("id");
    let features_json: serde_json::Value = row.get("features");
    let features: Vec<String> =
        super::parse_json_with_fallback(&features_json, "features", "plan", &id.to_string());
    let period_type: String = row.get("period_type");

    Plan {
        id,
        name: row.get("name"),
        description: row.get("description"),
        price: row.get("price"),
        duration: row.get("duration"),
        period_type: PeriodType::from_str(&period_type),
        features,
        is_popular: row.get("is_popular"),
        is_active: row.get("is_active"),
        service_icon: row.get("service_icon"),
        service_type: row.get("service_type"),
        service_url: row.get("service_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl PlanRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM plans WHERE id = $1 AND deleted_at IS NULL",
            SELECT_COLS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_plan))
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM plans WHERE id = ANY($1)",
            SELECT_COLS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_plan).collect())
    }

    async fn list(&self) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM plans WHERE deleted_at IS NULL ORDER BY created_at, name",
            SELECT_COLS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_plan).collect())
    }

    async fn list_by_price_range(&self, min: f64, max: f64) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM plans
            WHERE deleted_at IS NULL AND price >= $1 AND price <= $2
            ORDER BY price, name
            "#,
            SELECT_COLS
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_plan).collect())
    }

    async fn list_active_by_name(&self, name: &str) -> AppResult<Vec<Plan>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM plans
            WHERE deleted_at IS NULL AND is_active = TRUE AND name = $1
            ORDER BY duration ASC
            "#,
            SELECT_COLS
        ))
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_plan).collect())
    }

    async fn create(&self, input: &PlanInput) -> AppResult<Plan> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO plans (
                id, name, description, price, duration, period_type, features,
                is_popular, is_active, service_icon, service_type, service_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration)
        .bind(input.period_type.as_str())
        .bind(Json(&input.features))
        .bind(input.is_popular)
        .bind(input.is_active)
        .bind(&input.service_icon)
        .bind(&input.service_type)
        .bind(&input.service_url)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_plan(&row))
    }

    async fn update(&self, id: Uuid, input: &PlanInput) -> AppResult<Option<Plan>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE plans SET
                name = $2, description = $3, price = $4, duration = $5, period_type = $6,
                features = $7, is_popular = $8, is_active = $9, service_icon = $10,
                service_type = $11, service_url = $12, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.price)
        .bind(input.duration)
        .bind(input.period_type.as_str())
        .bind(Json(&input.features))
        .bind(input.is_popular)
        .bind(input.is_active)
        .bind(&input.service_icon)
        .bind(&input.service_type)
        .bind(&input.service_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_plan))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE plans SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM plans WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }
}
