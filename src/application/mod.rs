pub mod app_error;
pub mod retry;
pub mod saga;
pub mod use_cases;
pub mod validators;
