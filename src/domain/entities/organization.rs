use uuid::Uuid;

/// Tenant entity that scopes dashboards, campaigns, and profiles.
/// Pre-existing and read-only from this service's perspective.
#[derive(Debug, Clone)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub logo_url: Option<String>,
    pub primary_color: Option<String>,
    pub created_at: Option<chrono::NaiveDateTime>,
    pub updated_at: Option<chrono::NaiveDateTime>,
}
