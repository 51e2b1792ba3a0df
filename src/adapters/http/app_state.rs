use std::sync::Arc;

use crate::{
    application::use_cases::{
        organization::OrganizationUseCases, registration::RegistrationUseCases,
    },
    infra::{RateLimiterTrait, config::AppConfig},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registration_use_cases: Arc<RegistrationUseCases>,
    pub organization_use_cases: Arc<OrganizationUseCases>,
    pub rate_limiter: Arc<dyn RateLimiterTrait>,
}
