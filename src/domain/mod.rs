pub mod billing_period;
pub mod entities;
pub mod lifecycle;
pub mod period_label;
