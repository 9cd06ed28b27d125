//! Normalized error model.
//!
//! Every failure that reaches a caller is first normalized into an [`AppError`]:
//! one closed taxonomy of kinds, each pinned to exactly one HTTP status.
//! `operational` marks failures that are expected and safe to describe to the
//! caller; non-operational failures must never leak their internals outside
//! development mode.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across the pipeline.
pub type AppResult<T> = Result<T, AppError>;

/// Message rendered for any non-operational failure outside development mode.
pub const GENERIC_INTERNAL_MESSAGE: &str = "Something went wrong";

/// Closed set of failure kinds.
///
/// The kind alone determines the HTTP status; no handler may introduce a
/// status outside this table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    RateLimited,
    Internal,
}

impl ErrorKind {
    /// Fixed kind → HTTP status table.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Authentication => 401,
            ErrorKind::Authorization => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::RateLimited => 429,
            ErrorKind::Internal => 500,
        }
    }

    /// Stable machine-readable code used in the failure envelope's `error` field.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::Authentication => "authentication_error",
            ErrorKind::Authorization => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Internal => "internal_error",
        }
    }
}

/// One entry in an error's detail list (typically a failed input field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Normalized, classified representation of any failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    /// Ordered per-field detail (empty for most kinds).
    pub details: Vec<FieldError>,
    /// `true` for expected, safe-to-describe conditions; `false` for
    /// unexpected internal faults whose details must not be exposed.
    pub operational: bool,
}

impl AppError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Vec::new(),
            operational: true,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RateLimited, message)
    }

    /// Unexpected internal fault. The only constructor that yields a
    /// non-operational error, and it always carries the generic message.
    pub fn internal() -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: GENERIC_INTERNAL_MESSAGE.to_string(),
            details: Vec::new(),
            operational: false,
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = details;
        self
    }

    /// HTTP status derived from the kind (never stored separately).
    pub fn status(&self) -> u16 {
        self.kind.status()
    }
}
