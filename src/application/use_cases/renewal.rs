use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::clock::Clock,
    domain::entities::{
        plan::Plan,
        subscription::{Subscription, SubscriptionStatus},
    },
};

use super::{
    plan::PlanRepo,
    subscription::{SubscriptionFilter, SubscriptionOrder, SubscriptionRepo},
};

pub const DEFAULT_RENEWAL_LOOKAHEAD_HOURS: i64 = 24;

/// Outcome of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub matched: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Batch housekeeping over many subscriptions.
///
/// Each sweep selects a snapshot up front and then writes items one by one. A failed
/// item is logged and left for the next run; only a failed selection fails the sweep.
#[derive(Clone)]
pub struct RenewalUseCases {
    subscription_repo: Arc<dyn SubscriptionRepo>,
    plan_repo: Arc<dyn PlanRepo>,
    clock: Arc<dyn Clock>,
}

impl RenewalUseCases {
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

    /// Rolls forward auto-renewing subscriptions that end within `lookahead`.
    #[instrument(skip(self))]
    pub async fn auto_renew_sweep(&self, lookahead: TimeDelta) -> AppResult<SweepReport> {
        let now = self.clock.now();
        let horizon = now
            .checked_add_signed(lookahead)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let filter = SubscriptionFilter {
            status: Some(SubscriptionStatus::Active),
            auto_renew: Some(true),
            end_date_from: Some(now),
            end_date_to: Some(horizon),
            order: SubscriptionOrder::EndDateAsc,
            ..SubscriptionFilter::default()
        };
        let candidates = self.subscription_repo.find(&filter).await?;

        let mut report = SweepReport {
            matched: candidates.len(),
            ..SweepReport::default()
        };
        if candidates.is_empty() {
            return Ok(report);
        }

        let plans = match self.plans_for(&candidates).await {
            Ok(plans) => plans,
            Err(e) => {
                warn!(error = %e, "Failed to resolve plans for renewal, skipping batch");
                report.failed = candidates.len();
                return Ok(report);
            }
        };

        for mut subscription in candidates {
            let Some(plan) = plans.get(&subscription.plan_id) else {
                warn!(
                    subscription_id = %subscription.id,
                    plan_id = %subscription.plan_id,
                    "Plan not found, skipping renewal"
                );
                report.failed += 1;
                continue;
            };

            subscription.roll_forward(plan, now);
            match self.subscription_repo.save(&subscription).await {
                Ok(saved) => {
                    tracing::debug!(
                        subscription_id = %saved.id,
                        end_date = %saved.end_date,
                        "Subscription auto-renewed"
                    );
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(subscription_id = %subscription.id, error = %e, "Failed to save renewal");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            matched = report.matched,
            updated = report.updated,
            failed = report.failed,
            "Auto-renew sweep finished"
        );
        Ok(report)
    }

    /// Marks active subscriptions whose end date has passed as expired.
    #[instrument(skip(self))]
    pub async fn expiration_sweep(&self) -> AppResult<SweepReport> {
        let now = self.clock.now();

        let filter = SubscriptionFilter {
            status: Some(SubscriptionStatus::Active),
            end_date_before: Some(now),
            order: SubscriptionOrder::EndDateAsc,
            ..SubscriptionFilter::default()
        };
        let candidates = self.subscription_repo.find(&filter).await?;

        let mut report = SweepReport {
            matched: candidates.len(),
            ..SweepReport::default()
        };

        for mut subscription in candidates {
            if !subscription.mark_expired(now) {
                continue;
            }
            match self.subscription_repo.save(&subscription).await {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!(subscription_id = %subscription.id, error = %e, "Failed to save expiration");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            matched = report.matched,
            updated = report.updated,
            failed = report.failed,
            "Expiration sweep finished"
        );
        Ok(report)
    }

    async fn plans_for(&self, subscriptions: &[Subscription]) -> AppResult<HashMap<Uuid, Plan>> {
        let mut ids: Vec<Uuid> = subscriptions.iter().map(|s| s.plan_id).collect();
        ids.sort_unstable();
        ids.dedup();
        let plans = self.plan_repo.get_by_ids(&ids).await?;
        Ok(plans.into_iter().map(|p| (p.id, p)).collect())
    }
}
