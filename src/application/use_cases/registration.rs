use std::sync::Arc;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::retry::Retry;
use crate::application::saga::Saga;
use crate::application::use_cases::organization::OrganizationRepo;
use crate::application::validators::email_local_part;
use crate::domain::entities::user::BaseUser;
use crate::domain::entities::user_profile::UserProfile;
use crate::domain::entities::role::Role;

/// Well-known role granted to every freshly registered account.
pub const DEFAULT_ROLE: &str = "user";

// ============================================================================
// Ports
// ============================================================================

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &AccountMetadata,
    ) -> AppResult<ProvisionedAccount>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AppResult<Session>;

    /// Admin deletion of a provisioned account. Saga compensation only.
    async fn delete_account(&self, account_id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BaseUser>>;
    async fn insert(&self, user: &NewBaseUser) -> AppResult<BaseUser>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait UserProfileRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>>;
    async fn insert(&self, profile: &NewUserProfile) -> AppResult<UserProfile>;
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

#[async_trait]
pub trait RoleRepo: Send + Sync {
    async fn get_by_name(&self, name: &str) -> AppResult<Option<Role>>;
}

#[async_trait]
pub trait RoleAssignmentRepo: Send + Sync {
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()>;
}

// ============================================================================
// Input / output types
// ============================================================================

#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub job_title: String,
}

/// Opaque key/value bag attached to the account at signup. The identity
/// provider stores it verbatim; a provider-side trigger may use it to
/// pre-create the profile row.
#[derive(Debug, Clone, Serialize)]
pub struct AccountMetadata {
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub job_title: String,
}

/// Signup result as reported by the identity provider. A missing id is a
/// provider contract violation the orchestrator must reject.
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub id: Option<Uuid>,
}

/// Provider-issued session, passed through to the caller opaquely.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewBaseUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUserProfile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
}

/// Non-fatal degradations of a successful registration. Surfaced to the
/// caller so missing roles and failed auto-login are observable instead of
/// silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningWarning {
    RoleNotAssigned,
    SignInFailed,
}

impl ProvisioningWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningWarning::RoleNotAssigned => "role_not_assigned",
            ProvisioningWarning::SignInFailed => "sign_in_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SignIn {
    SignedIn { session: Session },
    LoginRequired,
}

#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub account_id: Uuid,
    pub organization_id: Uuid,
    pub sign_in: SignIn,
    pub warnings: Vec<ProvisioningWarning>,
}

impl RegistrationOutcome {
    /// Where the caller should navigate next. Auto-login failure is not a
    /// registration failure; it redirects to manual login instead.
    pub fn redirect_path(&self) -> String {
        match self.sign_in {
            SignIn::SignedIn { .. } => format!("/dashboard/{}", self.organization_id),
            SignIn::LoginRequired => "/login?registered=true".to_string(),
        }
    }
}

enum Ensured {
    Found,
    Created,
}

// ============================================================================
// Use cases
// ============================================================================

/// Registration orchestrator: account signup, base user row, organization
/// profile, default role, immediate sign-in.
///
/// Steps run strictly in sequence, one network call in flight at a time.
/// Writes are not transactional across the identity provider and the data
/// store; each created record pushes a compensation onto a [`Saga`], which
/// unwinds on terminal failure.
#[derive(Clone)]
pub struct RegistrationUseCases {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepo>,
    profiles: Arc<dyn UserProfileRepo>,
    roles: Arc<dyn RoleRepo>,
    role_assignments: Arc<dyn RoleAssignmentRepo>,
    organizations: Arc<dyn OrganizationRepo>,
    retry: Retry,
}

impl RegistrationUseCases {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepo>,
        profiles: Arc<dyn UserProfileRepo>,
        roles: Arc<dyn RoleRepo>,
        role_assignments: Arc<dyn RoleAssignmentRepo>,
        organizations: Arc<dyn OrganizationRepo>,
        retry: Retry,
    ) -> Self {
        Self {
            identity,
            users,
            profiles,
            roles,
            role_assignments,
            organizations,
            retry,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(
        &self,
        input: RegistrationInput,
        organization_id: Uuid,
    ) -> AppResult<RegistrationOutcome> {
        // The organization is picked before registration begins; an unknown
        // one is terminal and must fail before any account exists.
        self.organizations
            .get_by_id(organization_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let metadata = AccountMetadata {
            organization_id,
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone: input.phone.clone(),
            job_title: input.job_title.clone(),
        };

        let account = self
            .identity
            .sign_up(&input.email, &input.password, &metadata)
            .await?;

        let account_id = account
            .id
            .ok_or_else(|| AppError::Provider("signup returned no account id".into()))?;

        let mut saga = Saga::new();
        {
            let identity = self.identity.clone();
            saga.push("identity account", move || async move {
                if let Err(err) = identity.delete_account(account_id).await {
                    tracing::warn!(error = %err, account_id = %account_id, "Rollback could not delete identity account");
                }
            });
        }

        if let Err(err) = self.ensure_base_user(account_id, &input, &mut saga).await {
            saga.unwind().await;
            return Err(err);
        }

        if let Err(err) = self
            .ensure_profile(account_id, organization_id, &input, &mut saga)
            .await
        {
            saga.unwind().await;
            return Err(err);
        }

        let mut warnings = Vec::new();
        self.assign_default_role(account_id, &mut warnings).await;

        let sign_in = match self
            .identity
            .sign_in_with_password(&input.email, &input.password)
            .await
        {
            Ok(session) => SignIn::SignedIn { session },
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    account_id = %account_id,
                    "Sign-in after registration failed, user must log in manually"
                );
                warnings.push(ProvisioningWarning::SignInFailed);
                SignIn::LoginRequired
            }
        };

        Ok(RegistrationOutcome {
            account_id,
            organization_id,
            sign_in,
            warnings,
        })
    }

    /// Query-then-insert of the `users` row. The insert itself is retried;
    /// exhaustion aborts the whole sequence.
    async fn ensure_base_user(
        &self,
        account_id: Uuid,
        input: &RegistrationInput,
        saga: &mut Saga,
    ) -> AppResult<()> {
        if self.users.get_by_id(account_id).await?.is_some() {
            return Ok(());
        }

        let first_name = if input.first_name.trim().is_empty() {
            email_local_part(&input.email).to_string()
        } else {
            input.first_name.clone()
        };

        let user = NewBaseUser {
            id: account_id,
            first_name,
            last_name: input.last_name.clone(),
            phone: non_empty(&input.phone),
            active: true,
        };

        self.retry
            .run("insert base user", || {
                let users = &self.users;
                let user = &user;
                async move { users.insert(user).await.map(|_| ()) }
            })
            .await
            .map_err(|err| {
                AppError::Provisioning(format!("could not create user record: {err}"))
            })?;

        let users = self.users.clone();
        saga.push("base user record", move || async move {
            if let Err(err) = users.delete(account_id).await {
                tracing::warn!(error = %err, account_id = %account_id, "Rollback could not delete base user record");
            }
        });

        Ok(())
    }

    /// The whole check-then-insert cycle is retried: a provider-side trigger
    /// may create the profile concurrently with signup, so a later attempt
    /// finding the row counts as success.
    async fn ensure_profile(
        &self,
        account_id: Uuid,
        organization_id: Uuid,
        input: &RegistrationInput,
        saga: &mut Saga,
    ) -> AppResult<()> {
        let profile = NewUserProfile {
            id: account_id,
            organization_id,
            email: input.email.clone(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone: non_empty(&input.phone),
            job_title: non_empty(&input.job_title),
        };

        let ensured = self
            .retry
            .run("ensure user profile", || {
                let profiles = &self.profiles;
                let profile = &profile;
                async move {
                    if profiles.get_by_id(account_id).await?.is_some() {
                        return Ok(Ensured::Found);
                    }
                    profiles.insert(profile).await?;
                    Ok(Ensured::Created)
                }
            })
            .await
            .map_err(|err| {
                AppError::Provisioning(format!(
                    "could not create profile for account {account_id}: {err}"
                ))
            })?;

        if let Ensured::Created = ensured {
            let profiles = self.profiles.clone();
            saga.push("user profile", move || async move {
                if let Err(err) = profiles.delete(account_id).await {
                    tracing::warn!(error = %err, account_id = %account_id, "Rollback could not delete user profile");
                }
            });
        }

        Ok(())
    }

    /// Best-effort: a missing role or failed insert degrades the account to
    /// "no role" and is reported as a warning, never as an error.
    async fn assign_default_role(
        &self,
        account_id: Uuid,
        warnings: &mut Vec<ProvisioningWarning>,
    ) {
        let result = async {
            match self.roles.get_by_name(DEFAULT_ROLE).await? {
                Some(role) => self
                    .role_assignments
                    .assign(account_id, role.id)
                    .await
                    .map(|_| true),
                None => Ok(false),
            }
        }
        .await;

        match result {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(
                    role = DEFAULT_ROLE,
                    account_id = %account_id,
                    "Default role not configured, account registered without a role"
                );
                warnings.push(ProvisioningWarning::RoleNotAssigned);
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    role = DEFAULT_ROLE,
                    account_id = %account_id,
                    "Role assignment failed, account registered without a role"
                );
                warnings.push(ProvisioningWarning::RoleNotAssigned);
            }
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
