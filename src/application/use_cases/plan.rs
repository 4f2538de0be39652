use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    domain::entities::plan::{PeriodType, Plan},
};

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 999_999.0;

const MAX_NAME_LEN: usize = 100;

/// Fields accepted when an administrator creates or replaces a plan.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub duration: i32,
    #[serde(default)]
    pub period_type: PeriodType,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub service_icon: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub service_url: Option<String>,
}

fn default_active() -> bool {
    true
}

impl PlanInput {
    pub fn validate(&self) -> AppResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return Err(AppError::InvalidInput(
                "Plan name must be 1-100 characters".into(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(AppError::InvalidInput(
                "Price must be a non-negative number".into(),
            ));
        }
        if self.duration <= 0 {
            return Err(AppError::InvalidInput("Duration must be positive".into()));
        }
        Ok(())
    }
}

#[async_trait]
pub trait PlanRepo: Send + Sync {
    /// Live plans only; soft-deleted plans are invisible.
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>>;
    /// Includes soft-deleted plans so existing subscriptions keep resolving.
    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Plan>>;
    async fn list(&self) -> AppResult<Vec<Plan>>;
    async fn list_by_price_range(&self, min: f64, max: f64) -> AppResult<Vec<Plan>>;
    /// Active plans with exactly this name, shortest duration first.
    async fn list_active_by_name(&self, name: &str) -> AppResult<Vec<Plan>>;
    async fn create(&self, input: &PlanInput) -> AppResult<Plan>;
    async fn update(&self, id: Uuid, input: &PlanInput) -> AppResult<Option<Plan>>;
    /// Returns false when no live plan had this id.
    async fn soft_delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count(&self) -> AppResult<i64>;
}

#[derive(Clone)]
pub struct PlanUseCases {
    plan_repo: Arc<dyn PlanRepo>,
}

impl PlanUseCases {
    pub fn new(plan_repo: Arc<dyn PlanRepo>) -> Self {
        Self { plan_repo }
    }

    pub async fn list_plans(&self) -> AppResult<Vec<Plan>> {
        self.plan_repo.list().await
    }

    pub async fn get_plan(&self, id: Uuid) -> AppResult<Plan> {
        self.plan_repo
            .get_by_id(id)
            .await?
            .ok_or(AppError::PlanNotFound)
    }

    /// Missing bounds default to the full catalog range.
    pub async fn filter_plans_by_price(
        &self,
        min: Option<f64>,
        max: Option<f64>,
    ) -> AppResult<Vec<Plan>> {
        let min = min.filter(|v| v.is_finite()).unwrap_or(DEFAULT_MIN_PRICE);
        let max = max.filter(|v| v.is_finite()).unwrap_or(DEFAULT_MAX_PRICE);
        self.plan_repo.list_by_price_range(min, max).await
    }

    /// Other active billing options of the same service.
    pub async fn related_plans(&self, plan_id: Uuid) -> AppResult<Vec<Plan>> {
        let base = self.get_plan(plan_id).await?;
        let mut plans = self.plan_repo.list_active_by_name(&base.name).await?;
        plans.retain(|p| p.id != plan_id);
        Ok(plans)
    }

    pub async fn plans_for_service(&self, name: &str) -> AppResult<Vec<Plan>> {
        self.plan_repo.list_active_by_name(name).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_plan(&self, input: PlanInput) -> AppResult<Plan> {
        input.validate()?;
        let plan = self.plan_repo.create(&input).await?;
        tracing::info!(plan_id = %plan.id, "Plan created");
        Ok(plan)
    }

    #[instrument(skip(self, input))]
    pub async fn update_plan(&self, id: Uuid, input: PlanInput) -> AppResult<Plan> {
        input.validate()?;
        self.plan_repo
            .update(id, &input)
            .await?
            .ok_or(AppError::PlanNotFound)
    }

    #[instrument(skip(self))]
    pub async fn delete_plan(&self, id: Uuid) -> AppResult<()> {
        if !self.plan_repo.soft_delete(id).await? {
            return Err(AppError::PlanNotFound);
        }
        tracing::info!(plan_id = %id, "Plan deleted");
        Ok(())
    }
}
