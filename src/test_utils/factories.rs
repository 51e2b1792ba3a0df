//! Test data factories with sensible defaults and override closures.

use secrecy::SecretString;
use uuid::Uuid;

use crate::{
    application::use_cases::registration::RegistrationInput,
    domain::entities::organization::Organization,
};

/// Create a test organization with sensible defaults.
pub fn create_test_organization(
    overrides: impl FnOnce(&mut Organization),
) -> Organization {
    let now = chrono::Utc::now().naive_utc();
    let mut organization = Organization {
        id: Uuid::new_v4(),
        name: "Test Builders Merchant".to_string(),
        logo_url: None,
        primary_color: Some("#1a5dab".to_string()),
        created_at: Some(now),
        updated_at: Some(now),
    };
    overrides(&mut organization);
    organization
}

/// Create a test registration input with sensible defaults.
pub fn create_test_registration_input(
    overrides: impl FnOnce(&mut RegistrationInput),
) -> RegistrationInput {
    let mut input = RegistrationInput {
        email: "new.user@example.com".to_string(),
        password: SecretString::new("secret1".into()),
        first_name: "New".to_string(),
        last_name: "User".to_string(),
        phone: String::new(),
        job_title: String::new(),
    };
    overrides(&mut input);
    input
}
