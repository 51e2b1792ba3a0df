use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::registration::{NewBaseUser, UserRepo},
    domain::entities::user::BaseUser,
};

fn row_to_user(row: sqlx::postgres::PgRow) -> BaseUser {
    BaseUser {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        active: row.get("active"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<BaseUser>> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, phone, active, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_user))
    }

    async fn insert(&self, user: &NewBaseUser) -> AppResult<BaseUser> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, phone, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, phone, active, created_at, updated_at
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.active)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_user(row))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
