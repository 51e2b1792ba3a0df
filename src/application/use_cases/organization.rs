use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::organization::Organization;

#[async_trait]
pub trait OrganizationRepo: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Organization>>;
    async fn list(&self) -> AppResult<Vec<Organization>>;
}

/// Read-only organization access backing the pre-registration picker.
/// Organizations are provisioned out of band; this service never writes them.
#[derive(Clone)]
pub struct OrganizationUseCases {
    repo: Arc<dyn OrganizationRepo>,
}

impl OrganizationUseCases {
    pub fn new(repo: Arc<dyn OrganizationRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> AppResult<Vec<Organization>> {
        self.repo.list().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> AppResult<Organization> {
        self.repo.get_by_id(id).await?.ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::test_utils::{InMemoryOrganizationRepo, create_test_organization};

    #[tokio::test]
    async fn get_returns_not_found_for_unknown_id() {
        let use_cases =
            OrganizationUseCases::new(Arc::new(InMemoryOrganizationRepo::default()));

        let result = use_cases.get(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }

    #[tokio::test]
    async fn get_returns_existing_organization() {
        let org = create_test_organization(|o| o.name = "Northgate Timber".to_string());
        let repo = InMemoryOrganizationRepo::with_organizations(vec![org.clone()]);
        let use_cases = OrganizationUseCases::new(Arc::new(repo));

        let found = use_cases.get(org.id).await.unwrap();
        assert_eq!(found.name, "Northgate Timber");
    }
}
