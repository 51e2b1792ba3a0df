//! In-memory mock implementations for the registration and organization
//! repository traits, plus a scriptable identity provider.

use async_trait::async_trait;
use secrecy::SecretString;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::{
        organization::OrganizationRepo,
        registration::{
            AccountMetadata, IdentityProvider, NewBaseUser, NewUserProfile, ProvisionedAccount,
            RoleAssignmentRepo, RoleRepo, Session, UserProfileRepo, UserRepo,
        },
    },
    domain::entities::{
        organization::Organization, role::Role, user::BaseUser, user_profile::UserProfile,
    },
    infra::rate_limit::RateLimiterTrait,
};

// ============================================================================
// MockIdentityProvider
// ============================================================================

/// Scriptable identity provider. Failure modes are toggled through public
/// atomics; calls are captured for assertions.
#[derive(Default)]
pub struct MockIdentityProvider {
    /// Emails that behave as already registered.
    pub taken_emails: Mutex<HashSet<String>>,
    /// Successful signups, email -> account id.
    pub accounts: Mutex<HashMap<String, Uuid>>,
    /// Captured (email, metadata) pairs from sign_up calls.
    pub sign_ups: Mutex<Vec<(String, AccountMetadata)>>,
    /// Account ids deleted via the admin API.
    pub deleted: Mutex<Vec<Uuid>>,
    /// Simulate a provider returning a user object without an id.
    pub return_missing_id: AtomicBool,
    /// Fail the post-registration password sign-in.
    pub fail_sign_in: AtomicBool,
}

impl MockIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        _password: &SecretString,
        metadata: &AccountMetadata,
    ) -> AppResult<ProvisionedAccount> {
        let normalized = email.to_lowercase();
        if self.taken_emails.lock().unwrap().contains(&normalized)
            || self.accounts.lock().unwrap().contains_key(&normalized)
        {
            return Err(AppError::EmailTaken);
        }

        self.sign_ups
            .lock()
            .unwrap()
            .push((normalized.clone(), metadata.clone()));

        if self.return_missing_id.load(Ordering::SeqCst) {
            return Ok(ProvisionedAccount { id: None });
        }

        let id = Uuid::new_v4();
        self.accounts.lock().unwrap().insert(normalized, id);
        Ok(ProvisionedAccount { id: Some(id) })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &SecretString,
    ) -> AppResult<Session> {
        if self.fail_sign_in.load(Ordering::SeqCst) {
            return Err(AppError::Provider("invalid login credentials".into()));
        }
        if !self
            .accounts
            .lock()
            .unwrap()
            .contains_key(&email.to_lowercase())
        {
            return Err(AppError::Provider("invalid login credentials".into()));
        }
        Ok(Session {
            access_token: "test-access-token".to_string(),
            refresh_token: Some("test-refresh-token".to_string()),
            expires_in: Some(3600),
        })
    }

    async fn delete_account(&self, account_id: Uuid) -> AppResult<()> {
        self.deleted.lock().unwrap().push(account_id);
        self.accounts
            .lock()
            .unwrap()
            .retain(|_, id| *id != account_id);
        Ok(())
    }
}

// ============================================================================
// InMemoryUserRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, BaseUser>>,
    /// Remaining inserts to fail with a transient database error.
    pub fail_next_inserts: AtomicU32,
    /// Number of successful inserts.
    pub inserts: AtomicU32,
    /// Make get_by_id materialize a row, simulating a pre-existing record.
    pub auto_create_on_get: AtomicBool,
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BaseUser>> {
        let mut users = self.users.lock().unwrap();
        if self.auto_create_on_get.load(Ordering::SeqCst) {
            let now = chrono::Utc::now().naive_utc();
            users.entry(id).or_insert_with(|| BaseUser {
                id,
                first_name: "Existing".to_string(),
                last_name: "User".to_string(),
                phone: None,
                active: true,
                created_at: Some(now),
                updated_at: Some(now),
            });
        }
        Ok(users.get(&id).cloned())
    }

    async fn insert(&self, user: &NewBaseUser) -> AppResult<BaseUser> {
        if take_failure(&self.fail_next_inserts) {
            return Err(AppError::Database("injected insert failure".into()));
        }
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            return Err(AppError::InvalidInput(
                "A record with this value already exists".into(),
            ));
        }
        let now = chrono::Utc::now().naive_utc();
        let row = BaseUser {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            active: user.active,
            created_at: Some(now),
            updated_at: Some(now),
        };
        users.insert(row.id, row.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.users.lock().unwrap().remove(&id);
        Ok(())
    }
}

// ============================================================================
// InMemoryUserProfileRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryUserProfileRepo {
    pub profiles: Mutex<HashMap<Uuid, UserProfile>>,
    /// Remaining inserts to fail with a transient database error.
    pub fail_next_inserts: AtomicU32,
    /// Number of successful inserts.
    pub inserts: AtomicU32,
    /// Make get_by_id materialize a row, simulating the provider-side
    /// trigger having created the profile.
    pub auto_create_on_get: AtomicBool,
}

#[async_trait]
impl UserProfileRepo for InMemoryUserProfileRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let mut profiles = self.profiles.lock().unwrap();
        if self.auto_create_on_get.load(Ordering::SeqCst) {
            let now = chrono::Utc::now().naive_utc();
            profiles.entry(id).or_insert_with(|| UserProfile {
                id,
                organization_id: Uuid::nil(),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
                phone: None,
                job_title: None,
                created_at: Some(now),
                updated_at: Some(now),
            });
        }
        Ok(profiles.get(&id).cloned())
    }

    async fn insert(&self, profile: &NewUserProfile) -> AppResult<UserProfile> {
        if take_failure(&self.fail_next_inserts) {
            return Err(AppError::Database("injected insert failure".into()));
        }
        let mut profiles = self.profiles.lock().unwrap();
        if profiles.contains_key(&profile.id) {
            return Err(AppError::InvalidInput(
                "A record with this value already exists".into(),
            ));
        }
        let now = chrono::Utc::now().naive_utc();
        let row = UserProfile {
            id: profile.id,
            organization_id: profile.organization_id,
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            job_title: profile.job_title.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        profiles.insert(row.id, row.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.profiles.lock().unwrap().remove(&id);
        Ok(())
    }
}

// ============================================================================
// InMemoryRoleRepo / InMemoryRoleAssignmentRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryRoleRepo {
    pub roles: Mutex<HashMap<String, Role>>,
}

impl InMemoryRoleRepo {
    /// Repo pre-seeded with the well-known "user" role.
    pub fn with_default_role() -> Self {
        let repo = Self::default();
        repo.roles.lock().unwrap().insert(
            "user".to_string(),
            Role {
                id: Uuid::new_v4(),
                name: "user".to_string(),
            },
        );
        repo
    }
}

#[async_trait]
impl RoleRepo for InMemoryRoleRepo {
    async fn get_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self.roles.lock().unwrap().get(name).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryRoleAssignmentRepo {
    pub assignments: Mutex<Vec<(Uuid, Uuid)>>,
    pub fail_inserts: AtomicBool,
}

#[async_trait]
impl RoleAssignmentRepo for InMemoryRoleAssignmentRepo {
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Database("injected insert failure".into()));
        }
        self.assignments.lock().unwrap().push((user_id, role_id));
        Ok(())
    }
}

// ============================================================================
// InMemoryOrganizationRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryOrganizationRepo {
    pub organizations: Mutex<HashMap<Uuid, Organization>>,
}

impl InMemoryOrganizationRepo {
    pub fn with_organizations(organizations: Vec<Organization>) -> Self {
        let map: HashMap<Uuid, Organization> =
            organizations.into_iter().map(|o| (o.id, o)).collect();
        Self {
            organizations: Mutex::new(map),
        }
    }
}

#[async_trait]
impl OrganizationRepo for InMemoryOrganizationRepo {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Organization>> {
        Ok(self.organizations.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Organization>> {
        let mut orgs: Vec<Organization> = self
            .organizations
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();
        orgs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(orgs)
    }
}

// ============================================================================
// InMemoryRateLimiter
// ============================================================================

/// In-memory rate limiter for testing.
/// Uses HashMap to track request counts per key.
pub struct InMemoryRateLimiter {
    counts: Mutex<HashMap<String, u64>>,
    max_per_ip: u64,
    max_per_email: u64,
}

impl InMemoryRateLimiter {
    pub fn new(max_per_ip: u64, max_per_email: u64) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            max_per_ip,
            max_per_email,
        }
    }

    /// Create a permissive rate limiter that never blocks (for most tests).
    pub fn permissive() -> Self {
        Self::new(u64::MAX, u64::MAX)
    }
}

#[async_trait]
impl RateLimiterTrait for InMemoryRateLimiter {
    async fn check_ip(&self, ip: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts.entry(format!("rate:ip:{ip}")).or_insert(0);
        *count += 1;
        if *count > self.max_per_ip {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }

    async fn check_email(&self, email: &str) -> AppResult<()> {
        let mut counts = self.counts.lock().unwrap();
        let count = counts
            .entry(format!("rate:email:{}", email.to_lowercase()))
            .or_insert(0);
        *count += 1;
        if *count > self.max_per_email {
            return Err(AppError::RateLimited);
        }
        Ok(())
    }
}

fn take_failure(remaining: &AtomicU32) -> bool {
    remaining
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_identity_rejects_taken_emails() {
        let identity = MockIdentityProvider::new();
        identity
            .taken_emails
            .lock()
            .unwrap()
            .insert("dup@example.com".to_string());

        let result = identity
            .sign_up(
                "Dup@Example.com",
                &SecretString::new("secret1".into()),
                &AccountMetadata {
                    organization_id: Uuid::new_v4(),
                    first_name: "A".into(),
                    last_name: "B".into(),
                    phone: String::new(),
                    job_title: String::new(),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::EmailTaken)));
    }

    #[tokio::test]
    async fn user_repo_failure_injection_counts_down() {
        let repo = InMemoryUserRepo::default();
        repo.fail_next_inserts.store(1, Ordering::SeqCst);

        let user = NewBaseUser {
            id: Uuid::new_v4(),
            first_name: "A".into(),
            last_name: "B".into(),
            phone: None,
            active: true,
        };

        assert!(repo.insert(&user).await.is_err());
        assert!(repo.insert(&user).await.is_ok());
    }

    #[tokio::test]
    async fn rate_limiter_blocks_above_threshold() {
        let limiter = InMemoryRateLimiter::new(2, 2);

        assert!(limiter.check_ip("1.2.3.4").await.is_ok());
        assert!(limiter.check_ip("1.2.3.4").await.is_ok());
        assert!(matches!(
            limiter.check_ip("1.2.3.4").await,
            Err(AppError::RateLimited)
        ));
        // Other keys are unaffected.
        assert!(limiter.check_ip("5.6.7.8").await.is_ok());
    }
}
