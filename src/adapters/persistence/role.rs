use async_trait::async_trait;
use sqlx::Row;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::registration::RoleRepo,
    domain::entities::role::Role,
};

fn row_to_role(row: sqlx::postgres::PgRow) -> Role {
    Role {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait]
impl RoleRepo for PostgresPersistence {
    async fn get_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let row = sqlx::query("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(row.map(row_to_role))
    }
}
