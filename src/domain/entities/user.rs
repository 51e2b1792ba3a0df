use uuid::Uuid;

/// Business-schema user row, keyed by the identity-provider account id.
/// Exists independently of auth state.
#[derive(Debug, Clone)]
pub struct BaseUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}
