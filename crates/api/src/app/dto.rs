//! Request DTOs and input validation.
//!
//! Validation collects every failed field into ordered `FieldError` triples
//! and raises them as one `RawError::Invalid`, so the caller sees the full
//! list rather than the first failure.

use serde::Deserialize;

use coursedesk_core::FieldError;

use crate::classify::RawError;

#[derive(Debug, Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterUserRequest {
    pub fn validate(&self) -> Result<(), RawError> {
        let mut errors = Vec::new();
        if !looks_like_email(&self.email) {
            errors.push(FieldError::new(
                "email",
                "must be a valid email address",
                "invalid_format",
            ));
        }
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "must not be empty", "required"));
        }
        if self.password.len() < 8 {
            errors.push(FieldError::new(
                "password",
                "must be at least 8 characters",
                "too_short",
            ));
        }
        collect(errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub name: Option<String>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), RawError> {
        let mut errors = Vec::new();
        if let Some(email) = &self.email {
            if !looks_like_email(email) {
                errors.push(FieldError::new(
                    "email",
                    "must be a valid email address",
                    "invalid_format",
                ));
            }
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                errors.push(FieldError::new("name", "must not be empty", "required"));
            }
        }
        collect(errors)
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadAvatarRequest {
    /// Base64-encoded image payload.
    pub content_base64: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

fn looks_like_email(s: &str) -> bool {
    // Deliberately shallow; real deliverability is the mail system's problem.
    s.split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'))
}

fn collect(errors: Vec<FieldError>) -> Result<(), RawError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RawError::Invalid(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_collects_all_failed_fields() {
        let req = RegisterUserRequest {
            email: "nope".to_string(),
            name: "  ".to_string(),
            password: "short".to_string(),
        };
        match req.validate() {
            Err(RawError::Invalid(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "name", "password"]);
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn register_accepts_valid_input() {
        let req = RegisterUserRequest {
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            password: "correct horse".to_string(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn update_ignores_absent_fields() {
        let req = UpdateUserRequest {
            email: None,
            name: None,
        };
        assert!(req.validate().is_ok());
    }
}
