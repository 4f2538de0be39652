use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PeriodType {
    Months,
    Years,
    /// Raw day count. Also used when the stored period is empty or unknown.
    #[default]
    Days,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Months => "months",
            PeriodType::Years => "years",
            PeriodType::Days => "days",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "months" | "month" => PeriodType::Months,
            "years" | "year" => PeriodType::Years,
            _ => PeriodType::Days,
        }
    }
}

impl From<String> for PeriodType {
    fn from(s: String) -> Self {
        PeriodType::from_str(&s)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Price for one full period, in the currency's major unit.
    pub price: f64,
    /// Number of `period_type` units per billing period.
    pub duration: i32,
    pub period_type: PeriodType,
    pub features: Vec<String>,
    pub is_popular: bool,
    pub is_active: bool,
    pub service_icon: Option<String>,
    pub service_type: Option<String>,
    pub service_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
