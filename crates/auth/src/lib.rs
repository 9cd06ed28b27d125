//! `coursedesk-auth` — authentication boundary.
//!
//! Supplies the pipeline with an already-verified principal. Intentionally
//! decoupled from HTTP and storage: token extraction lives in the API layer,
//! and this crate only decodes/validates claims.

pub mod claims;
pub mod principal;
pub mod validator;

pub use claims::{JwtClaims, TokenError, validate_claims};
pub use principal::{PrincipalId, Role};
pub use validator::{Hs256JwtValidator, JwtValidator};
