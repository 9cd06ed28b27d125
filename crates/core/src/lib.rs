//! `coursedesk-core` — shared foundation for the request-outcome pipeline.
//!
//! This crate contains **pure** primitives (no transport or storage concerns):
//! the error taxonomy, typed identifiers, and the public-view projection.

pub mod error;
pub mod id;
pub mod view;

pub use error::{AppError, AppResult, ErrorKind, FieldError, GENERIC_INTERNAL_MESSAGE};
pub use id::EntityId;
pub use view::PublicView;
