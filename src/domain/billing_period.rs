//! Calendar-aware billing period arithmetic over a [`Plan`].
//!
//! Plans encoded as raw day counts are snapped onto calendar boundaries when the count
//! falls inside one of the canonical billing-cycle tolerance bands, so a "30 day" plan
//! bills on the same day every month instead of drifting.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};

use crate::domain::entities::plan::{PeriodType, Plan};

/// Approximate days per month, used only for price normalisation.
const DAYS_PER_MONTH: f64 = 30.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl BillingCycle {
    pub fn months(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 1,
            BillingCycle::Quarterly => 3,
            BillingCycle::SemiAnnual => 6,
            BillingCycle::Annual => 12,
        }
    }
}

/// Classifies a raw day count into a canonical billing cycle, if it is close enough to one.
pub fn classify_days(duration: i32) -> Option<BillingCycle> {
    match duration {
        28..=31 => Some(BillingCycle::Monthly),
        89..=92 => Some(BillingCycle::Quarterly),
        179..=182 => Some(BillingCycle::SemiAnnual),
        364..=366 => Some(BillingCycle::Annual),
        _ => None,
    }
}

/// Normalises a plan's price to a one-month billing unit.
///
/// Never panics. A non-positive duration falls back to the raw price (months and days)
/// or to a twelfth of it (years). The result can still be non-finite when the price
/// itself is; callers aggregating prices must check `is_finite`.
pub fn monthly_equivalent_price(plan: &Plan) -> f64 {
    let price = plan.price;
    let duration = f64::from(plan.duration);

    match plan.period_type {
        PeriodType::Months if plan.duration <= 0 => price,
        PeriodType::Months => price / duration,
        PeriodType::Years if plan.duration <= 0 => price / MONTHS_PER_YEAR,
        PeriodType::Years => price / (duration * MONTHS_PER_YEAR),
        PeriodType::Days if plan.duration <= 0 => price,
        PeriodType::Days => price * DAYS_PER_MONTH / duration,
    }
}

/// Computes the end of a billing period that starts at `start`.
///
/// The result is never earlier than `start`: negative durations and calendar overflow
/// collapse the period to zero length.
pub fn compute_end_date(plan: &Plan, start: DateTime<Utc>) -> DateTime<Utc> {
    let duration = i64::from(plan.duration);

    let end = match plan.period_type {
        PeriodType::Months => add_months(start, duration),
        PeriodType::Years => duration
            .checked_mul(12)
            .and_then(|months| add_months(start, months)),
        PeriodType::Days => match classify_days(plan.duration) {
            Some(cycle) => add_months(start, cycle.months()),
            None => TimeDelta::try_days(duration).and_then(|d| start.checked_add_signed(d)),
        },
    };

    end.map_or(start, |end| end.max(start))
}

/// Adds calendar months keeping the day of month and time of day.
///
/// A day that does not exist in the target month rolls over into the next one,
/// so Jan 31 + 1 month is Mar 3 (Mar 2 in leap years).
fn add_months(start: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let naive = start.naive_utc();
    let date = naive.date();

    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + months;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;

    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let day_offset = TimeDelta::try_days(i64::from(date.day()) - 1)?;
    let shifted = first.checked_add_signed(day_offset)?;

    Some(shifted.and_time(naive.time()).and_utc())
}
