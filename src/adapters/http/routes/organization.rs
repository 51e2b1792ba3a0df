//! Organization picker routes. Read-only; organizations are provisioned out
//! of band.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    adapters::http::app_state::AppState, app_error::AppResult,
    domain::entities::organization::Organization,
};

#[derive(Serialize)]
struct OrganizationResponse {
    id: String,
    name: String,
    logo_url: Option<String>,
    primary_color: Option<String>,
}

impl From<Organization> for OrganizationResponse {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id.to_string(),
            name: org.name,
            logo_url: org.logo_url,
            primary_color: org.primary_color,
        }
    }
}

/// GET /api/organizations
async fn list_organizations(
    State(app_state): State<AppState>,
) -> AppResult<Json<Vec<OrganizationResponse>>> {
    let organizations = app_state.organization_use_cases.list().await?;
    Ok(Json(
        organizations.into_iter().map(Into::into).collect(),
    ))
}

/// GET /api/organizations/{id}
async fn get_organization(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<OrganizationResponse>> {
    let organization = app_state.organization_use_cases.get(id).await?;
    Ok(Json(organization.into()))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_organizations))
        .route("/{id}", get(get_organization))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    use crate::test_utils::{TestAppStateBuilder, create_test_organization};

    fn build_test_router(app_state: AppState) -> Router<()> {
        Router::new()
            .nest("/organizations", router())
            .with_state(app_state)
    }

    #[tokio::test]
    async fn list_returns_organizations_sorted_by_name() {
        let (app_state, _handles) = TestAppStateBuilder::new()
            .with_organization(create_test_organization(|o| {
                o.name = "Zenith Roofing Supplies".to_string();
            }))
            .with_organization(create_test_organization(|o| {
                o.name = "Acme Aggregates".to_string();
            }))
            .build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server.get("/organizations").await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<serde_json::Value>();
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Acme Aggregates", "Zenith Roofing Supplies"]);
    }

    #[tokio::test]
    async fn get_unknown_organization_returns_404() {
        let (app_state, _handles) = TestAppStateBuilder::new().build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server
            .get(&format!("/organizations/{}", Uuid::new_v4()))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_returns_organization_fields() {
        let org = create_test_organization(|o| {
            o.name = "Harbour Timber".to_string();
            o.logo_url = Some("https://cdn.example.com/harbour.png".to_string());
        });
        let org_id = org.id;

        let (app_state, _handles) = TestAppStateBuilder::new().with_organization(org).build();

        let server = TestServer::new(build_test_router(app_state)).unwrap();

        let response = server.get(&format!("/organizations/{org_id}")).await;
        response.assert_status(StatusCode::OK);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"].as_str(), Some("Harbour Timber"));
        assert_eq!(
            body["logo_url"].as_str(),
            Some("https://cdn.example.com/harbour.png")
        );
    }
}
