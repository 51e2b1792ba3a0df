use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::registration::{NewUserProfile, UserProfileRepo},
    domain::entities::user_profile::UserProfile,
};

fn row_to_profile(row: sqlx::postgres::PgRow) -> UserProfile {
    UserProfile {
        id: row.get("id"),
        organization_id: row.get("organization_id"),
        email: row.get("email"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        phone: row.get("phone"),
        job_title: row.get("job_title"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl UserProfileRepo for PostgresPersistence {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<UserProfile>> {
        let row = sqlx::query(
            "SELECT id, organization_id, email, first_name, last_name, phone, job_title, created_at, updated_at FROM user_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row.map(row_to_profile))
    }

    async fn insert(&self, profile: &NewUserProfile) -> AppResult<UserProfile> {
        let row = sqlx::query(
            r#"
            INSERT INTO user_profiles (id, organization_id, email, first_name, last_name, phone, job_title)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, organization_id, email, first_name, last_name, phone, job_title, created_at, updated_at
            "#,
        )
        .bind(profile.id)
        .bind(profile.organization_id)
        .bind(profile.email.to_lowercase())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.job_title)
        .fetch_one(self.pool())
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(row))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
