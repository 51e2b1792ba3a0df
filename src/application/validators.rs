use validator::ValidateEmail;

/// Minimum password length accepted at registration. The identity provider
/// enforces its own minimum; this check fails fast before any network call.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Display-name fallback when no first name was provided: the local part of
/// the email ("jane" for "jane@example.com").
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("test@example.com"));
        assert!(is_valid_email("user.name@domain.co.uk"));
        assert!(is_valid_email("user+tag@example.org"));
        assert!(is_valid_email("  padded@example.com  "));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("   "));
        assert!(!is_valid_email("notanemail"));
        assert!(!is_valid_email("@nodomain.com"));
        assert!(!is_valid_email("spaces in@email.com"));
    }

    #[test]
    fn test_password_length() {
        assert!(is_valid_password("secret1"));
        assert!(is_valid_password("123456"));
        assert!(!is_valid_password("12345"));
        assert!(!is_valid_password(""));
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part("jane@example.com"), "jane");
        assert_eq!(email_local_part("a@b.com"), "a");
        // Degenerate input falls back to the whole string
        assert_eq!(email_local_part("no-at-sign"), "no-at-sign");
    }
}
