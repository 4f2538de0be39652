pub mod app_error;
pub mod clock;
pub mod jwt;
pub mod use_cases;
