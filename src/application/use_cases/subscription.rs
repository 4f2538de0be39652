use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::clock::Clock,
    domain::entities::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus, SubscriptionWithPlan},
    },
};

use super::plan::PlanRepo;
use super::spend_stats::{SpendStats, compute_spend_stats};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubscriptionOrder {
    #[default]
    CreatedDesc,
    EndDateAsc,
}

/// Predicate understood by [`SubscriptionRepo::find`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<SubscriptionStatus>,
    pub auto_renew: Option<bool>,
    /// Inclusive lower bound on `end_date`.
    pub end_date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `end_date`.
    pub end_date_to: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `end_date`.
    pub end_date_before: Option<DateTime<Utc>>,
    pub order: SubscriptionOrder,
}

impl SubscriptionFilter {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, sub: &Subscription) -> bool {
        self.user_id.is_none_or(|id| sub.user_id == id)
            && self.status.is_none_or(|s| sub.status == s)
            && self.auto_renew.is_none_or(|a| sub.auto_renew == a)
            && self.end_date_from.is_none_or(|t| sub.end_date >= t)
            && self.end_date_to.is_none_or(|t| sub.end_date <= t)
            && self.end_date_before.is_none_or(|t| sub.end_date < t)
    }
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>>;
    async fn create(&self, subscription: &Subscription) -> AppResult<Subscription>;
    /// Persists a mutated subscription. Fails with `Conflict` when the stored version
    /// no longer matches `subscription.version`; on success the returned copy carries
    /// the bumped version.
    async fn save(&self, subscription: &Subscription) -> AppResult<Subscription>;
    async fn find(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    DateAsc,
    #[default]
    DateDesc,
}

impl SortBy {
    /// Unknown values fall back to newest first.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "price_asc" => SortBy::PriceAsc,
            "price_desc" => SortBy::PriceDesc,
            "date_asc" => SortBy::DateAsc,
            _ => SortBy::DateDesc,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub text: Option<String>,
    pub status: Option<String>,
    pub sort_by: Option<String>,
}

#[derive(Clone)]
pub struct SubscriptionUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    plan_repo: Arc<dyn PlanRepo>,
    clock: Arc<dyn Clock>,
}

impl SubscriptionUseCases {
    pub fn new(
        subscription_repo: Arc<dyn SubscriptionRepo>,
        plan_repo: Arc<dyn PlanRepo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscription_repo,
            plan_repo,
            clock,
        }
    }

    #[instrument(skip(self, payment_ref))]
    pub async fn subscribe(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        payment_ref: Option<String>,
    ) -> AppResult<SubscriptionWithPlan> {
        let plan = self
            .plan_repo
            .get_by_id(plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        let now = self.clock.now();
        let subscription = Subscription::start(user_id, &plan, now, payment_ref, now);
        let subscription = self.subscription_repo.create(&subscription).await?;

        tracing::info!(
            subscription_id = %subscription.id,
            end_date = %subscription.end_date,
            "Subscription created"
        );

        Ok(SubscriptionWithPlan { subscription, plan })
    }

    /// Subscriptions owned by someone else are reported as missing.
    pub async fn get_subscription(
        &self,
        user_id: Uuid,
        subscription_id: Uuid,
    ) -> AppResult<SubscriptionWithPlan> {
        let subscription = self.load(subscription_id).await?;
        if subscription.user_id != user_id {
            return Err(AppError::SubscriptionNotFound);
        }
        let plan = self
            .resolve_plan(subscription.plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;
        Ok(SubscriptionWithPlan { subscription, plan })
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, subscription_id: Uuid) -> AppResult<()> {
        let mut subscription = self.load(subscription_id).await?;
        subscription.cancel(self.clock.now());
        self.subscription_repo.save(&subscription).await?;
        tracing::info!("Subscription cancelled");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn set_auto_renew(&self, subscription_id: Uuid, enabled: bool) -> AppResult<()> {
        let mut subscription = self.load(subscription_id).await?;
        subscription.set_auto_renew(enabled, self.clock.now())?;
        self.subscription_repo.save(&subscription).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn renew(&self, subscription_id: Uuid) -> AppResult<()> {
        let mut subscription = self.load(subscription_id).await?;
        let plan = self
            .resolve_plan(subscription.plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        subscription.renew(&plan, self.clock.now())?;
        let saved = self.subscription_repo.save(&subscription).await?;

        tracing::info!(end_date = %saved.end_date, "Subscription renewed");
        Ok(())
    }

    /// Stored status active, soonest end date first.
    pub async fn list_active_subscriptions(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<SubscriptionWithPlan>> {
        let filter = SubscriptionFilter {
            status: Some(SubscriptionStatus::Active),
            order: SubscriptionOrder::EndDateAsc,
            ..SubscriptionFilter::for_user(user_id)
        };
        self.find_with_plans(&filter).await
    }

    /// Newest first.
    pub async fn list_all_subscriptions(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<SubscriptionWithPlan>> {
        self.find_with_plans(&SubscriptionFilter::for_user(user_id))
            .await
    }

    pub async fn search_subscriptions(
        &self,
        user_id: Uuid,
        query: SearchQuery,
    ) -> AppResult<Vec<SubscriptionWithPlan>> {
        let status = match non_empty(query.status.as_deref()) {
            Some(raw) => Some(SubscriptionStatus::parse(raw).ok_or_else(|| {
                AppError::InvalidInput(format!("Unknown subscription status: {raw}"))
            })?),
            None => None,
        };
        let sort_by = non_empty(query.sort_by.as_deref())
            .map(SortBy::parse)
            .unwrap_or_default();

        let filter = SubscriptionFilter {
            status,
            ..SubscriptionFilter::for_user(user_id)
        };
        let mut items = self.find_with_plans(&filter).await?;

        if let Some(text) = non_empty(query.text.as_deref()) {
            let needle = text.to_lowercase();
            items.retain(|item| item.plan.name.to_lowercase().contains(&needle));
        }

        match sort_by {
            SortBy::PriceAsc => items.sort_by(|a, b| a.plan.price.total_cmp(&b.plan.price)),
            SortBy::PriceDesc => items.sort_by(|a, b| b.plan.price.total_cmp(&a.plan.price)),
            SortBy::DateAsc => items.sort_by_key(|item| item.subscription.created_at),
            SortBy::DateDesc => {
                items.sort_by(|a, b| b.subscription.created_at.cmp(&a.subscription.created_at))
            }
        }

        Ok(items)
    }

    /// The user's subscriptions whose plan name contains `name`, ignoring case.
    pub async fn subscriptions_by_provider(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> AppResult<Vec<SubscriptionWithPlan>> {
        let needle = name.trim().to_lowercase();
        let mut items = self
            .find_with_plans(&SubscriptionFilter::for_user(user_id))
            .await?;
        items.retain(|item| item.plan.name.to_lowercase().contains(&needle));
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn spend_stats(&self, user_id: Uuid) -> AppResult<SpendStats> {
        let subscriptions = self
            .subscription_repo
            .find(&SubscriptionFilter::for_user(user_id))
            .await?;
        let plans = self.plans_by_id(&subscriptions).await?;

        let items: Vec<(Subscription, Option<Plan>)> = subscriptions
            .into_iter()
            .map(|sub| {
                let plan = plans.get(&sub.plan_id).cloned();
                (sub, plan)
            })
            .collect();

        Ok(compute_spend_stats(&items, self.clock.now()))
    }

    async fn load(&self, subscription_id: Uuid) -> AppResult<Subscription> {
        self.subscription_repo
            .get_by_id(subscription_id)
            .await?
            .ok_or(AppError::SubscriptionNotFound)
    }

    async fn resolve_plan(&self, plan_id: Uuid) -> AppResult<Option<Plan>> {
        Ok(self.plan_repo.get_by_ids(&[plan_id]).await?.into_iter().next())
    }

    async fn plans_by_id(&self, subscriptions: &[Subscription]) -> AppResult<HashMap<Uuid, Plan>> {
        let mut ids: Vec<Uuid> = subscriptions.iter().map(|s| s.plan_id).collect();
        ids.sort_unstable();
        ids.dedup();

        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let plans = self.plan_repo.get_by_ids(&ids).await?;
        Ok(plans.into_iter().map(|p| (p.id, p)).collect())
    }

    async fn find_with_plans(
        &self,
        filter: &SubscriptionFilter,
    ) -> AppResult<Vec<SubscriptionWithPlan>> {
        let subscriptions = self.subscription_repo.find(filter).await?;
        let plans = self.plans_by_id(&subscriptions).await?;

        Ok(subscriptions
            .into_iter()
            .filter_map(|subscription| match plans.get(&subscription.plan_id) {
                Some(plan) => Some(SubscriptionWithPlan {
                    plan: plan.clone(),
                    subscription,
                }),
                None => {
                    tracing::warn!(
                        subscription_id = %subscription.id,
                        plan_id = %subscription.plan_id,
                        "Subscription references an unknown plan, skipping"
                    );
                    None
                }
            })
            .collect())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
