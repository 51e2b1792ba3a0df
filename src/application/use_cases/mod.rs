pub mod organization;
pub mod registration;
