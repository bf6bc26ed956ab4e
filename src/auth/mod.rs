pub mod extractors;
pub mod password;
pub mod policy;
pub mod session;

use lazy_static::lazy_static;
use serde::Deserialize;
use validator::Validate;

pub use extractors::{CurrentUser, SESSION_COOKIE};
pub use password::{hash_password, verify_password};
pub use session::SessionResolver;

lazy_static! {
    // Display names may contain anything printable, but no control characters.
    static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[^\p{Cc}]+$").unwrap();
}

/// Payload of a sign-in request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Payload of a registration request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 1 to 100 characters without control characters.
    #[validate(
        length(min = 1, max = 100),
        regex(
            path = "NAME_REGEX",
            message = "Name must not contain control characters"
        )
    )]
    pub name: String,
    #[validate(email)]
    pub email: String,
    /// Must be at least 6 characters long.
    #[validate(length(min = 6))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        let empty_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(empty_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("Alice Liddell", "alice@example.com", "secret1")
            .validate()
            .is_ok());
        assert!(register("Zoë 李", "zoe@example.com", "secret1")
            .validate()
            .is_ok());

        assert!(register("", "alice@example.com", "secret1").validate().is_err());
        assert!(register(&"a".repeat(101), "alice@example.com", "secret1")
            .validate()
            .is_err());
        assert!(register("bad\nname", "alice@example.com", "secret1")
            .validate()
            .is_err());
        assert!(register("Alice", "not-an-email", "secret1").validate().is_err());
        assert!(register("Alice", "alice@example.com", "12345").validate().is_err());
    }
}
