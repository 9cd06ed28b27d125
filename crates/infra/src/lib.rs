//! `coursedesk-infra` — persistence boundary.
//!
//! Two collaborators the request pipeline leans on:
//! - [`store`]: the durable key/value-by-id store (ground truth)
//! - [`cache`]: the read-through / write-invalidate TTL cache in front of it

pub mod cache;
pub mod store;

pub use cache::{Clock, DEFAULT_ENTITY_TTL_SECS, ManualClock, SystemClock, TtlCache, entity_key};
pub use store::{EntityStore, InMemoryEntityStore, StoreError, codes};
