//! Registration route. The form submits here after client-side validation;
//! the handler re-checks input shape, then hands off to the orchestrator.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
    application::use_cases::registration::{RegistrationInput, Session, SignIn},
    application::validators::{MIN_PASSWORD_LEN, is_valid_email, is_valid_password},
};

#[derive(Deserialize)]
struct RegisterPayload {
    email: String,
    password: SecretString,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    job_title: String,
    organization_id: Option<Uuid>,
}

#[derive(Serialize)]
struct RegisterResponse {
    account_id: String,
    redirect: String,
    warnings: Vec<&'static str>,
    /// Present only when the post-registration sign-in succeeded.
    session: Option<Session>,
}

/// POST /api/register
async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    let email = payload.email.trim().to_string();
    if !is_valid_email(&email) {
        return Err(AppError::InvalidInput("Invalid email format".into()));
    }
    if !is_valid_password(payload.password.expose_secret()) {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    // The organization is chosen before the form is submitted; without one
    // there is nothing to provision against.
    let organization_id = payload.organization_id.ok_or_else(|| {
        AppError::InvalidInput("An organization must be selected before registering".into())
    })?;

    app_state.rate_limiter.check_email(&email).await?;

    let input = RegistrationInput {
        email,
        password: payload.password,
        first_name: payload.first_name,
        last_name: payload.last_name,
        phone: payload.phone,
        job_title: payload.job_title,
    };

    let outcome = app_state
        .registration_use_cases
        .register(input, organization_id)
        .await?;

    let redirect = outcome.redirect_path();
    let session = match outcome.sign_in {
        SignIn::SignedIn { session } => Some(session),
        SignIn::LoginRequired => None,
    };

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            account_id: outcome.account_id.to_string(),
            redirect,
            warnings: outcome.warnings.iter().map(|w| w.as_str()).collect(),
            session,
        }),
    ))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    use crate::test_utils::{TestAppStateBuilder, create_test_organization};

    fn build_test_router(app_state: AppState) -> Router<()> {
        router().with_state(app_state)
    }

    fn payload(email: &str, organization_id: Uuid) -> serde_json::Value {
        json!({
            "email": email,
            "password": "secret1",
            "first_name": "A",
            "last_name": "B",
            "phone": "",
            "job_title": "",
            "organization_id": organization_id,
        })
    }

    #[tokio::test]
    async fn register_success_returns_201_with_dashboard_redirect() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, handles) = TestAppStateBuilder::new().with_organization(org).build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("a@b.com", org_id))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(
            body["redirect"].as_str(),
            Some(format!("/dashboard/{org_id}").as_str())
        );
        assert!(body["session"]["access_token"].is_string());
        assert_eq!(body["warnings"].as_array().unwrap().len(), 0);

        // One profile row, bound to the chosen organization.
        let profiles = handles.profiles.profiles.lock().unwrap();
        assert_eq!(profiles.len(), 1);
        assert!(profiles.values().all(|p| p.organization_id == org_id));
    }

    #[tokio::test]
    async fn register_invalid_email_returns_400() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, _handles) = TestAppStateBuilder::new().with_organization(org).build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("not-an-email", org_id))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["code"].as_str(), Some("INVALID_INPUT"));
    }

    #[tokio::test]
    async fn register_short_password_returns_400() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, _handles) = TestAppStateBuilder::new().with_organization(org).build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&json!({
                "email": "a@b.com",
                "password": "short",
                "organization_id": org_id,
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_without_organization_returns_400() {
        let (app_state, handles) = TestAppStateBuilder::new().build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&json!({
                "email": "a@b.com",
                "password": "secret1",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        // Terminal precondition: the identity provider was never called.
        assert!(handles.identity.sign_ups.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn register_taken_email_returns_field_level_error() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, _handles) = TestAppStateBuilder::new()
            .with_organization(org)
            .with_taken_email("dup@example.com")
            .build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("dup@example.com", org_id))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["code"].as_str(), Some("EMAIL_TAKEN"));
        assert_eq!(body["field"].as_str(), Some("email"));
    }

    #[tokio::test]
    async fn register_unknown_organization_returns_404() {
        let (app_state, _handles) = TestAppStateBuilder::new().build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("a@b.com", Uuid::new_v4()))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn register_with_failed_sign_in_redirects_to_login() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, handles) = TestAppStateBuilder::new().with_organization(org).build();
        handles.identity.fail_sign_in.store(true, Ordering::SeqCst);

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("a@b.com", org_id))
            .await;

        // Sign-in failure is not a registration failure.
        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["redirect"].as_str(), Some("/login?registered=true"));
        assert!(body["session"].is_null());
        assert_eq!(
            body["warnings"].as_array().unwrap(),
            &vec![json!("sign_in_failed")]
        );
    }

    #[tokio::test]
    async fn register_without_default_role_reports_warning() {
        let org = create_test_organization(|_| {});
        let org_id = org.id;
        let (app_state, _handles) = TestAppStateBuilder::new()
            .with_organization(org)
            .without_default_role()
            .build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .post("/register")
            .json(&payload("a@b.com", org_id))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<serde_json::Value>();
        assert_eq!(
            body["warnings"].as_array().unwrap(),
            &vec![json!("role_not_assigned")]
        );
    }
}
