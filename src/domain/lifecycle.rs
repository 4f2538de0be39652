//! Subscription status transitions.
//!
//! Every transition takes `now` explicitly so callers decide where time comes from.
//! All end dates are derived through [`compute_end_date`]; nothing here sets one directly.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::billing_period::compute_end_date;
use crate::domain::entities::{
    plan::Plan,
    subscription::{Subscription, SubscriptionStatus},
};

const MILLIS_PER_HOUR: i64 = 3_600_000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Auto-renew can only be changed on an active subscription (status: {})", .0.as_str())]
    AutoRenewRequiresActive(SubscriptionStatus),

    #[error("Subscription cannot be renewed from status {}", .0.as_str())]
    RenewNotAllowed(SubscriptionStatus),
}

impl Subscription {
    /// Opens a new active subscription on `plan` starting at `start`.
    pub fn start(
        user_id: Uuid,
        plan: &Plan,
        start: DateTime<Utc>,
        payment_ref: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Subscription {
            id: Uuid::new_v4(),
            user_id,
            plan_id: plan.id,
            start_date: start,
            end_date: compute_end_date(plan, start),
            status: SubscriptionStatus::Active,
            auto_renew: true,
            renewal_date: None,
            cancelled_at: None,
            payment_ref,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Cancels regardless of the current status. Repeated calls re-stamp `cancelled_at`.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Cancelled;
        self.auto_renew = false;
        self.cancelled_at = Some(now);
        self.updated_at = now;
    }

    pub fn set_auto_renew(&mut self, enabled: bool, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        if self.status != SubscriptionStatus::Active {
            return Err(LifecycleError::AutoRenewRequiresActive(self.status));
        }
        self.auto_renew = enabled;
        self.updated_at = now;
        Ok(())
    }

    /// Starts a fresh period. A still-running active period is extended from its end,
    /// anything else restarts from `now`.
    pub fn renew(&mut self, plan: &Plan, now: DateTime<Utc>) -> Result<(), LifecycleError> {
        let new_start = match self.status {
            SubscriptionStatus::Cancelled => {
                return Err(LifecycleError::RenewNotAllowed(self.status));
            }
            SubscriptionStatus::Active if self.end_date > now => self.end_date,
            SubscriptionStatus::Active | SubscriptionStatus::Expired => now,
        };

        self.start_date = new_start;
        self.end_date = compute_end_date(plan, new_start);
        self.status = SubscriptionStatus::Active;
        self.renewal_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Chains the next period directly onto the current end date.
    pub fn roll_forward(&mut self, plan: &Plan, now: DateTime<Utc>) {
        let new_start = self.end_date;
        self.start_date = new_start;
        self.end_date = compute_end_date(plan, new_start);
        self.status = SubscriptionStatus::Active;
        self.renewal_date = Some(now);
        self.updated_at = now;
    }

    /// Moves an overdue active subscription to expired. Returns whether anything changed.
    pub fn mark_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != SubscriptionStatus::Active || now < self.end_date {
            return false;
        }
        self.status = SubscriptionStatus::Expired;
        self.updated_at = now;
        true
    }

    /// Stored status is active and `now` falls inside `[start_date, end_date)`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.start_date <= now && now < self.end_date
    }

    /// Ignores the stored status.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.end_date
    }

    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_active_at(now) {
            return 0;
        }
        let remaining_ms = (self.end_date - now).num_milliseconds();
        let hours = (remaining_ms + MILLIS_PER_HOUR - 1) / MILLIS_PER_HOUR;
        (hours + 23) / 24
    }
}
