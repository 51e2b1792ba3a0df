use crate::{
    adapters::{http::app_state::AppState, identity::HostedIdentityProvider},
    application::{
        retry::Retry,
        use_cases::{
            organization::{OrganizationRepo, OrganizationUseCases},
            registration::{
                IdentityProvider, RegistrationUseCases, RoleAssignmentRepo, RoleRepo,
                UserProfileRepo, UserRepo,
            },
        },
    },
    infra::{
        RateLimiterTrait, config::AppConfig, postgres_persistence, rate_limit::RedisRateLimiter,
    },
};
use std::fs::File;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let postgres_arc = Arc::new(postgres_persistence(&config.database_url).await?);

    let rate_limiter: Arc<dyn RateLimiterTrait> = Arc::new(
        RedisRateLimiter::new(
            &config.redis_url,
            config.rate_limit_window_secs,
            config.rate_limit_per_ip,
            config.rate_limit_per_email,
        )
        .await?,
    );

    let identity: Arc<dyn IdentityProvider> = Arc::new(HostedIdentityProvider::new(
        config.identity_base_url.clone(),
        config.identity_api_key.clone(),
        config.identity_service_role_key.clone(),
        config.identity_timeout_secs,
    )?);

    let user_repo = postgres_arc.clone() as Arc<dyn UserRepo>;
    let profile_repo = postgres_arc.clone() as Arc<dyn UserProfileRepo>;
    let role_repo = postgres_arc.clone() as Arc<dyn RoleRepo>;
    let role_assignment_repo = postgres_arc.clone() as Arc<dyn RoleAssignmentRepo>;
    let organization_repo = postgres_arc.clone() as Arc<dyn OrganizationRepo>;

    let retry = Retry::new(
        config.provisioning_max_attempts,
        Duration::from_millis(config.provisioning_retry_delay_ms),
    );

    let registration_use_cases = RegistrationUseCases::new(
        identity,
        user_repo,
        profile_repo,
        role_repo,
        role_assignment_repo,
        organization_repo.clone(),
        retry,
    );

    let organization_use_cases = OrganizationUseCases::new(organization_repo);

    Ok(AppState {
        config: Arc::new(config),
        registration_use_cases: Arc::new(registration_use_cases),
        organization_use_cases: Arc::new(organization_use_cases),
        rate_limiter,
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "merchantry_api=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don’t show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
