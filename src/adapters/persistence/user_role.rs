use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::registration::RoleAssignmentRepo,
};

#[async_trait]
impl RoleAssignmentRepo for PostgresPersistence {
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> AppResult<()> {
        // Re-assigning the same role is a no-op, not a conflict.
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(())
    }
}
