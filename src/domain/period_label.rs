//! Human-readable billing period labels.
//!
//! Numeral agreement is delegated to [`PluralRules`], so the period arithmetic in
//! [`super::billing_period`] stays locale-agnostic.

use serde::{Deserialize, Serialize};

use super::billing_period::{BillingCycle, classify_days};
use crate::domain::entities::plan::{PeriodType, Plan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralCategory {
    One,
    Few,
    Many,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodUnit {
    Day,
    Month,
    Year,
}

pub trait PluralRules: Send + Sync {
    fn category(&self, n: i64) -> PluralCategory;
    fn word(&self, unit: PeriodUnit, category: PluralCategory) -> &'static str;
}

/// One for 1, few for 2..=4, many for everything else.
pub struct RussianRules;

impl PluralRules for RussianRules {
    fn category(&self, n: i64) -> PluralCategory {
        match n {
            1 => PluralCategory::One,
            2..=4 => PluralCategory::Few,
            _ => PluralCategory::Many,
        }
    }

    fn word(&self, unit: PeriodUnit, category: PluralCategory) -> &'static str {
        match (unit, category) {
            (PeriodUnit::Day, PluralCategory::One) => "день",
            (PeriodUnit::Day, PluralCategory::Few) => "дня",
            (PeriodUnit::Day, PluralCategory::Many) => "дней",
            (PeriodUnit::Month, PluralCategory::One) => "месяц",
            (PeriodUnit::Month, PluralCategory::Few) => "месяца",
            (PeriodUnit::Month, PluralCategory::Many) => "месяцев",
            (PeriodUnit::Year, PluralCategory::One) => "год",
            (PeriodUnit::Year, PluralCategory::Few) => "года",
            (PeriodUnit::Year, PluralCategory::Many) => "лет",
        }
    }
}

/// One for 1, many for everything else.
pub struct EnglishRules;

impl PluralRules for EnglishRules {
    fn category(&self, n: i64) -> PluralCategory {
        if n == 1 {
            PluralCategory::One
        } else {
            PluralCategory::Many
        }
    }

    fn word(&self, unit: PeriodUnit, category: PluralCategory) -> &'static str {
        match (unit, category) {
            (PeriodUnit::Day, PluralCategory::One) => "day",
            (PeriodUnit::Day, _) => "days",
            (PeriodUnit::Month, PluralCategory::One) => "month",
            (PeriodUnit::Month, _) => "months",
            (PeriodUnit::Year, PluralCategory::One) => "year",
            (PeriodUnit::Year, _) => "years",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" | "english" => Locale::En,
            _ => Locale::Ru,
        }
    }

    pub fn rules(&self) -> &'static dyn PluralRules {
        match self {
            Locale::Ru => &RussianRules,
            Locale::En => &EnglishRules,
        }
    }
}

pub fn format_period_label(plan: &Plan, rules: &dyn PluralRules) -> String {
    match plan.period_type {
        PeriodType::Months => calendar_label(rules, PeriodUnit::Month, plan.duration.into()),
        PeriodType::Years => calendar_label(rules, PeriodUnit::Year, plan.duration.into()),
        PeriodType::Days => match classify_days(plan.duration) {
            Some(BillingCycle::Monthly) => calendar_label(rules, PeriodUnit::Month, 1),
            Some(BillingCycle::Quarterly) => calendar_label(rules, PeriodUnit::Month, 3),
            Some(BillingCycle::SemiAnnual) => calendar_label(rules, PeriodUnit::Month, 6),
            Some(BillingCycle::Annual) => calendar_label(rules, PeriodUnit::Year, 1),
            None => format!(
                "{} {}",
                plan.duration,
                rules.word(PeriodUnit::Day, PluralCategory::Many)
            ),
        },
    }
}

/// A single period reads as the bare unit ("month"); anything else carries the numeral.
fn calendar_label(rules: &dyn PluralRules, unit: PeriodUnit, n: i64) -> String {
    if n == 1 {
        return rules.word(unit, PluralCategory::One).to_string();
    }
    format!("{} {}", n, rules.word(unit, rules.category(n)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_plan;

    fn label(period_type: PeriodType, duration: i32, locale: Locale) -> String {
        let plan = create_test_plan(|p| {
            p.period_type = period_type;
            p.duration = duration;
        });
        format_period_label(&plan, locale.rules())
    }

    #[test]
    fn russian_month_labels_agree_with_numeral() {
        assert_eq!(label(PeriodType::Months, 1, Locale::Ru), "месяц");
        assert_eq!(label(PeriodType::Months, 2, Locale::Ru), "2 месяца");
        assert_eq!(label(PeriodType::Months, 4, Locale::Ru), "4 месяца");
        assert_eq!(label(PeriodType::Months, 5, Locale::Ru), "5 месяцев");
        assert_eq!(label(PeriodType::Months, 12, Locale::Ru), "12 месяцев");
    }

    #[test]
    fn russian_year_labels_agree_with_numeral() {
        assert_eq!(label(PeriodType::Years, 1, Locale::Ru), "год");
        assert_eq!(label(PeriodType::Years, 3, Locale::Ru), "3 года");
        assert_eq!(label(PeriodType::Years, 5, Locale::Ru), "5 лет");
    }

    #[test]
    fn english_labels() {
        assert_eq!(label(PeriodType::Months, 1, Locale::En), "month");
        assert_eq!(label(PeriodType::Months, 2, Locale::En), "2 months");
        assert_eq!(label(PeriodType::Months, 5, Locale::En), "5 months");
        assert_eq!(label(PeriodType::Years, 1, Locale::En), "year");
    }

    #[test]
    fn day_counts_use_billing_cycle_bands() {
        assert_eq!(label(PeriodType::Days, 30, Locale::Ru), "месяц");
        assert_eq!(label(PeriodType::Days, 28, Locale::Ru), "месяц");
        assert_eq!(label(PeriodType::Days, 91, Locale::Ru), "3 месяца");
        assert_eq!(label(PeriodType::Days, 181, Locale::Ru), "6 месяцев");
        assert_eq!(label(PeriodType::Days, 365, Locale::Ru), "год");
        assert_eq!(label(PeriodType::Days, 365, Locale::En), "year");
    }

    #[test]
    fn other_day_counts_fall_back_to_days() {
        assert_eq!(label(PeriodType::Days, 10, Locale::Ru), "10 дней");
        assert_eq!(label(PeriodType::Days, 7, Locale::En), "7 days");
    }

    #[test]
    fn zero_duration_uses_many_form() {
        assert_eq!(label(PeriodType::Months, 0, Locale::Ru), "0 месяцев");
        assert_eq!(label(PeriodType::Months, 0, Locale::En), "0 months");
    }

    #[test]
    fn locale_parses_with_russian_default() {
        assert_eq!(Locale::from_str("en"), Locale::En);
        assert_eq!(Locale::from_str("EN-GB"), Locale::En);
        assert_eq!(Locale::from_str("ru"), Locale::Ru);
        assert_eq!(Locale::from_str("de"), Locale::Ru);
    }
}
