//! HTTP adapter for the hosted identity provider's auth API.
//!
//! Error classification is primarily driven by the provider's
//! machine-readable `error_code`; matching on message text is kept only as a
//! fallback for older provider versions that omit the code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::registration::{
        AccountMetadata, IdentityProvider, ProvisionedAccount, Session,
    },
    infra::InfraError,
};

pub struct HostedIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: SecretString,
    service_role_key: SecretString,
}

impl HostedIdentityProvider {
    pub fn new(
        base_url: Url,
        api_key: SecretString,
        service_role_key: SecretString,
        timeout_secs: u64,
    ) -> Result<Self, InfraError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(InfraError::HttpClient)?;
        Ok(Self {
            client,
            base_url,
            api_key,
            service_role_key,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("invalid identity endpoint {path}: {e}")))
    }
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a AccountMetadata,
}

#[derive(Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The provider returns either the account object directly or wrapped under
/// `user`, depending on whether email confirmation is enabled.
#[derive(Deserialize)]
struct SignUpResponse {
    id: Option<Uuid>,
    user: Option<AccountBody>,
}

#[derive(Deserialize)]
struct AccountBody {
    id: Uuid,
}

#[derive(Deserialize)]
struct SessionResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Deserialize, Default)]
struct ProviderErrorBody {
    error_code: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

impl ProviderErrorBody {
    fn text(&self) -> &str {
        self.msg
            .as_deref()
            .or(self.message.as_deref())
            .or(self.error_description.as_deref())
            .unwrap_or("")
    }
}

fn classify_signup_error(status: StatusCode, body: &ProviderErrorBody) -> AppError {
    if let Some(code) = body.error_code.as_deref()
        && matches!(code, "user_already_exists" | "email_exists")
    {
        return AppError::EmailTaken;
    }

    // Fallback for providers without machine-readable codes: match the
    // message wording the way the legacy client did. Fragile, so it only
    // runs when no error_code was present.
    if body.error_code.is_none() {
        let text = body.text().to_lowercase();
        if text.contains("already registered") || text.contains("email") {
            return AppError::EmailTaken;
        }
    }

    let text = body.text();
    if text.is_empty() {
        AppError::Provider(format!("signup failed with status {status}"))
    } else {
        AppError::Provider(text.to_string())
    }
}

fn request_error(context: &str, err: reqwest::Error) -> AppError {
    AppError::Provider(format!("{context} request failed: {err}"))
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        metadata: &AccountMetadata,
    ) -> AppResult<ProvisionedAccount> {
        let url = self.endpoint("signup")?;
        let body = SignUpRequest {
            email,
            password: password.expose_secret(),
            data: metadata,
        };

        let response = self
            .client
            .post(url)
            .header("apikey", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error("signup", e))?;

        let status = response.status();
        if !status.is_success() {
            let body: ProviderErrorBody = response.json().await.unwrap_or_default();
            return Err(classify_signup_error(status, &body));
        }

        let body: SignUpResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("malformed signup response: {e}")))?;

        Ok(ProvisionedAccount {
            id: body.id.or(body.user.map(|u| u.id)),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &SecretString,
    ) -> AppResult<Session> {
        let mut url = self.endpoint("token")?;
        url.set_query(Some("grant_type=password"));
        let body = PasswordGrantRequest {
            email,
            password: password.expose_secret(),
        };

        let response = self
            .client
            .post(url)
            .header("apikey", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error("sign-in", e))?;

        let status = response.status();
        if !status.is_success() {
            let body: ProviderErrorBody = response.json().await.unwrap_or_default();
            let text = body.text();
            return Err(AppError::Provider(if text.is_empty() {
                format!("sign-in failed with status {status}")
            } else {
                text.to_string()
            }));
        }

        let session: SessionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Provider(format!("malformed sign-in response: {e}")))?;

        Ok(Session {
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
        })
    }

    async fn delete_account(&self, account_id: Uuid) -> AppResult<()> {
        let url = self.endpoint(&format!("admin/users/{account_id}"))?;

        let response = self
            .client
            .delete(url)
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.service_role_key.expose_secret())
            .send()
            .await
            .map_err(|e| request_error("account deletion", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "account deletion failed with status {status}"
            )));
        }
        Ok(())
    }
}
