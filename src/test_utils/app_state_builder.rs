//! Test app state builder for HTTP-level integration testing.
//!
//! Creates a minimal `AppState` backed by in-memory mocks, returning handles
//! to the mocks so tests can script failures and assert on captured state.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;
use url::Url;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        retry::Retry,
        use_cases::{
            organization::OrganizationUseCases, registration::RegistrationUseCases,
        },
    },
    domain::entities::organization::Organization,
    infra::config::AppConfig,
    test_utils::{
        InMemoryOrganizationRepo, InMemoryRateLimiter, InMemoryRoleAssignmentRepo,
        InMemoryRoleRepo, InMemoryUserProfileRepo, InMemoryUserRepo, MockIdentityProvider,
    },
};

/// Mock handles kept by the test after `build()`, for scripting failure
/// modes and asserting on captured state.
pub struct TestHandles {
    pub identity: Arc<MockIdentityProvider>,
    pub users: Arc<InMemoryUserRepo>,
    pub profiles: Arc<InMemoryUserProfileRepo>,
    pub role_assignments: Arc<InMemoryRoleAssignmentRepo>,
}

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let org = create_test_organization(|o| o.name = "Acme".to_string());
/// let (app_state, handles) = TestAppStateBuilder::new()
///     .with_organization(org)
///     .with_taken_email("dup@example.com")
///     .build();
/// ```
pub struct TestAppStateBuilder {
    organizations: Vec<Organization>,
    taken_emails: Vec<String>,
    seed_default_role: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            organizations: Vec::new(),
            taken_emails: Vec::new(),
            seed_default_role: true,
        }
    }

    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations.push(organization);
        self
    }

    pub fn with_taken_email(mut self, email: &str) -> Self {
        self.taken_emails.push(email.to_lowercase());
        self
    }

    pub fn without_default_role(mut self) -> Self {
        self.seed_default_role = false;
        self
    }

    pub fn build(self) -> (AppState, TestHandles) {
        let identity = Arc::new(MockIdentityProvider::new());
        for email in self.taken_emails {
            identity.taken_emails.lock().unwrap().insert(email);
        }

        let users = Arc::new(InMemoryUserRepo::default());
        let profiles = Arc::new(InMemoryUserProfileRepo::default());
        let roles = if self.seed_default_role {
            Arc::new(InMemoryRoleRepo::with_default_role())
        } else {
            Arc::new(InMemoryRoleRepo::default())
        };
        let role_assignments = Arc::new(InMemoryRoleAssignmentRepo::default());
        let organizations = Arc::new(InMemoryOrganizationRepo::with_organizations(
            self.organizations,
        ));

        let registration_use_cases = RegistrationUseCases::new(
            identity.clone(),
            users.clone(),
            profiles.clone(),
            roles,
            role_assignments.clone(),
            organizations.clone(),
            Retry::new(3, Duration::from_millis(1)),
        );

        let organization_use_cases = OrganizationUseCases::new(organizations);

        let app_state = AppState {
            config: Arc::new(test_config()),
            registration_use_cases: Arc::new(registration_use_cases),
            organization_use_cases: Arc::new(organization_use_cases),
            rate_limiter: Arc::new(InMemoryRateLimiter::permissive()),
        };

        (
            app_state,
            TestHandles {
                identity,
                users,
                profiles,
                role_assignments,
            },
        )
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        identity_base_url: Url::parse("http://identity.invalid/auth/v1/").unwrap(),
        identity_api_key: SecretString::new("test-api-key".into()),
        identity_service_role_key: SecretString::new("test-service-role-key".into()),
        identity_timeout_secs: 5,
        rate_limit_window_secs: 60,
        rate_limit_per_ip: u64::MAX,
        rate_limit_per_email: u64::MAX,
        trust_proxy: false,
        provisioning_max_attempts: 3,
        provisioning_retry_delay_ms: 1,
    }
}
