use uuid::Uuid;

/// Binds an account to an organization with contact fields.
/// Exactly one per account; organization_id is a required foreign reference.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}
