//! In-memory implementations of the repository and clock ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{
        clock::Clock,
        use_cases::{
            plan::{PlanInput, PlanRepo},
            subscription::{SubscriptionFilter, SubscriptionOrder, SubscriptionRepo},
        },
    },
    domain::entities::{plan::Plan, subscription::Subscription},
};

// ============================================================================
// FixedClock
// ============================================================================

pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// InMemoryPlanRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPlanRepo {
    pub plans: Mutex<HashMap<Uuid, Plan>>,
    pub deleted: Mutex<HashSet<Uuid>>,
}

impl InMemoryPlanRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: Vec<Plan>) -> Self {
        let map: HashMap<Uuid, Plan> = plans.into_iter().map(|p| (p.id, p)).collect();
        Self {
            plans: Mutex::new(map),
            deleted: Mutex::new(HashSet::new()),
        }
    }

    fn live(&self) -> Vec<Plan> {
        let deleted = self.deleted.lock().unwrap();
        let mut plans: Vec<Plan> = self
            .plans
            .lock()
            .unwrap()
            .values()
            .filter(|p| !deleted.contains(&p.id))
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        plans
    }
}

fn apply_input(plan: &mut Plan, input: &PlanInput) {
    plan.name = input.name.trim().to_string();
    plan.description = input.description.clone();
    plan.price = input.price;
    plan.duration = input.duration;
    plan.period_type = input.period_type;
    plan.features = input.features.clone();
    plan.is_popular = input.is_popular;
    plan.is_active = input.is_active;
    plan.service_icon = input.service_icon.clone();
    plan.service_type = input.service_type.clone();
    plan.service_url = input.service_url.clone();
    plan.updated_at = Some(Utc::now());
}

#[async_trait]
impl PlanRepo for InMemoryPlanRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Plan>> {
        if self.deleted.lock().unwrap().contains(&id) {
            return Ok(None);
        }
        Ok(self.plans.lock().unwrap().get(&id).cloned())
    }

    async fn get_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Plan>> {
        let plans = self.plans.lock().unwrap();
        Ok(ids.iter().filter_map(|id| plans.get(id).cloned()).collect())
    }

    async fn list(&self) -> AppResult<Vec<Plan>> {
        Ok(self.live())
    }

    async fn list_by_price_range(&self, min: f64, max: f64) -> AppResult<Vec<Plan>> {
        Ok(self
            .live()
            .into_iter()
            .filter(|p| p.price >= min && p.price <= max)
            .collect())
    }

    async fn list_active_by_name(&self, name: &str) -> AppResult<Vec<Plan>> {
        let mut plans: Vec<Plan> = self
            .live()
            .into_iter()
            .filter(|p| p.is_active && p.name == name)
            .collect();
        plans.sort_by_key(|p| p.duration);
        Ok(plans)
    }

    async fn create(&self, input: &PlanInput) -> AppResult<Plan> {
        let now = Utc::now();
        let mut plan = Plan {
            id: Uuid::new_v4(),
            name: String::new(),
            description: None,
            price: 0.0,
            duration: 0,
            period_type: Default::default(),
            features: vec![],
            is_popular: false,
            is_active: true,
            service_icon: None,
            service_type: None,
            service_url: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        apply_input(&mut plan, input);
        self.plans.lock().unwrap().insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn update(&self, id: Uuid, input: &PlanInput) -> AppResult<Option<Plan>> {
        if self.deleted.lock().unwrap().contains(&id) {
            return Ok(None);
        }
        let mut plans = self.plans.lock().unwrap();
        Ok(plans.get_mut(&id).map(|plan| {
            apply_input(plan, input);
            plan.clone()
        }))
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<bool> {
        if !self.plans.lock().unwrap().contains_key(&id) {
            return Ok(false);
        }
        Ok(self.deleted.lock().unwrap().insert(id))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.live().len() as i64)
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

#[derive(Default)]
pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, Subscription>>,
    failing_saves: Mutex<HashSet<Uuid>>,
    failing_queries: AtomicBool,
}

impl InMemorySubscriptionRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscriptions(subscriptions: Vec<Subscription>) -> Self {
        let map: HashMap<Uuid, Subscription> =
            subscriptions.into_iter().map(|s| (s.id, s)).collect();
        Self {
            subscriptions: Mutex::new(map),
            ..Self::default()
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Subscription> {
        self.subscriptions.lock().unwrap().get(&id).cloned()
    }

    /// Makes every `save` of this subscription fail with a database error.
    pub fn fail_saves_for(&self, id: Uuid) {
        self.failing_saves.lock().unwrap().insert(id);
    }

    /// Makes every `find` fail with a database error.
    pub fn fail_queries(&self) {
        self.failing_queries.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Subscription>> {
        Ok(self.get(id))
    }

    async fn create(&self, subscription: &Subscription) -> AppResult<Subscription> {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.id, subscription.clone());
        Ok(subscription.clone())
    }

    async fn save(&self, subscription: &Subscription) -> AppResult<Subscription> {
        if self.failing_saves.lock().unwrap().contains(&subscription.id) {
            return Err(AppError::Database("injected save failure".into()));
        }

        let mut subscriptions = self.subscriptions.lock().unwrap();
        let stored = subscriptions
            .get_mut(&subscription.id)
            .ok_or(AppError::SubscriptionNotFound)?;
        if stored.version != subscription.version {
            return Err(AppError::Conflict);
        }

        let mut saved = subscription.clone();
        saved.version += 1;
        *stored = saved.clone();
        Ok(saved)
    }

    async fn find(&self, filter: &SubscriptionFilter) -> AppResult<Vec<Subscription>> {
        if self.failing_queries.load(Ordering::SeqCst) {
            return Err(AppError::Database("injected query failure".into()));
        }

        let mut found: Vec<Subscription> = self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();

        match filter.order {
            SubscriptionOrder::CreatedDesc => {
                found.sort_by(|a, b| b.created_at.cmp(&a.created_at))
            }
            SubscriptionOrder::EndDateAsc => found.sort_by_key(|s| s.end_date),
        }
        Ok(found)
    }
}
