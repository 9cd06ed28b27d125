//! Error classifier.
//!
//! Handlers never catch and reclassify failures themselves; they let them
//! propagate as [`RawError`] and classification happens once, at the
//! pipeline boundary. `classify` is total: every raw error, including
//! unrecognized ones, resolves to exactly one [`AppError`].

use thiserror::Error;

use coursedesk_auth::TokenError;
use coursedesk_core::{AppError, FieldError};
use coursedesk_infra::{StoreError, codes};

/// A failure as raised somewhere inside a handler, before classification.
///
/// Aggregates every failure source the pipeline knows about; anything else
/// enters through `Other` and classifies as a non-operational internal fault.
#[derive(Debug, Error)]
pub enum RawError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("validation failed")]
    Invalid(Vec<FieldError>),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("uploaded payload too large")]
    UploadTooLarge { limit_bytes: usize },

    /// Already classified by an expected handler branch; passes through.
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Map any raw failure onto the closed taxonomy. First match wins; the
/// dispatch order is fixed and the fallback is a non-operational internal
/// error that never echoes the raw message.
pub fn classify(raw: &RawError) -> AppError {
    match raw {
        RawError::Store(err) => classify_store(err),
        RawError::Invalid(details) => {
            AppError::validation("Validation failed").with_details(details.clone())
        }
        RawError::Token(err) => match err {
            TokenError::Expired => AppError::authentication("Token has expired"),
            TokenError::NotYetValid => AppError::authentication("Token not yet valid"),
            TokenError::Malformed(_) => AppError::authentication("Invalid or malformed token"),
        },
        RawError::UploadTooLarge { .. } => AppError::validation("Uploaded file is too large"),
        RawError::App(err) => err.clone(),
        RawError::Other(_) => AppError::internal(),
    }
}

/// Vendor-code table for the backing store (SQLSTATE).
fn classify_store(err: &StoreError) -> AppError {
    match err {
        StoreError::NotFound => AppError::not_found("Record not found"),
        StoreError::Backend { code, fields, .. } => match code.as_str() {
            codes::UNIQUE_VIOLATION => {
                let details = fields
                    .iter()
                    .map(|f| FieldError::new(f, "must be unique", "unique_violation"))
                    .collect();
                AppError::conflict(format!("Duplicate value for {}", fields.join(", ")))
                    .with_details(details)
            }
            codes::FOREIGN_KEY_VIOLATION => {
                AppError::validation("Referenced record does not exist")
            }
            codes::STRING_DATA_TOO_LONG => AppError::validation("Value too long for field"),
            _ => AppError::internal(),
        },
    }
}
