use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::organization::OrganizationRepo,
    domain::entities::organization::Organization,
};

fn row_to_organization(row: sqlx::postgres::PgRow) -> Organization {
    Organization {
        id: row.get("id"),
        name: row.get("name"),
        logo_url: row.get("logo_url"),
        primary_color: row.get("primary_color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl OrganizationRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Organization>> {
        let row = sqlx::query(
            "SELECT id, name, logo_url, primary_color, created_at, updated_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_organization))
    }

    async fn list(&self) -> AppResult<Vec<Organization>> {
        let rows = sqlx::query(
            "SELECT id, name, logo_url, primary_color, created_at, updated_at FROM organizations ORDER BY name ASC",
        )
        .fetch_all(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(rows.into_iter().map(row_to_organization).collect())
    }
}
