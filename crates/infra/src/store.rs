//! Durable store abstraction.
//!
//! The pipeline treats persistence as an opaque key/value-by-id store that
//! either returns a record or a not-found signal. Backend faults surface as
//! vendor codes (SQLSTATE-style strings) that the API-layer classifier maps
//! onto the error taxonomy; nothing in this crate decides HTTP semantics.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use thiserror::Error;

use coursedesk_core::EntityId;

/// Vendor error codes the classifier recognizes (SQLSTATE).
pub mod codes {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const STRING_DATA_TOO_LONG: &str = "22001";
    pub const INTERNAL: &str = "XX000";
}

/// Failure raised by a durable store operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The id does not resolve to a record.
    #[error("record not found")]
    NotFound,

    /// Backend fault carrying a vendor code plus whatever metadata the
    /// backend attaches (e.g. the columns of a violated constraint).
    #[error("backend error {code}: {message}")]
    Backend {
        code: String,
        fields: Vec<String>,
        message: String,
    },
}

impl StoreError {
    pub fn unique_violation(fields: Vec<String>) -> Self {
        let message = format!("unique constraint violated on ({})", fields.join(", "));
        Self::Backend {
            code: codes::UNIQUE_VIOLATION.to_string(),
            fields,
            message,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Backend {
            code: codes::INTERNAL.to_string(),
            fields: Vec::new(),
            message: message.into(),
        }
    }
}

/// Opaque durable store: get/create/update/delete by id, plus offset
/// pagination for list endpoints.
///
/// The store is the entity's ground truth and serializes its own writes;
/// cache consistency is the caller's job (write durable first, then touch
/// the cache).
#[async_trait]
pub trait EntityStore<R>: Send + Sync {
    async fn get(&self, id: EntityId) -> Result<R, StoreError>;
    async fn create(&self, id: EntityId, record: R) -> Result<R, StoreError>;
    async fn update(&self, id: EntityId, record: R) -> Result<R, StoreError>;
    async fn delete(&self, id: EntityId) -> Result<(), StoreError>;
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<R>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}

type UniqueKeyFn<R> = Box<dyn Fn(&R) -> String + Send + Sync>;

/// In-memory store for dev/tests.
///
/// Supports named unique indexes (to reproduce `23505` the way a SQL backend
/// would) and a one-shot scripted failure for exercising fault paths.
pub struct InMemoryEntityStore<R> {
    records: RwLock<HashMap<EntityId, R>>,
    unique_indexes: Vec<(String, UniqueKeyFn<R>)>,
    fail_next: Mutex<Option<StoreError>>,
}

impl<R> InMemoryEntityStore<R> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            unique_indexes: Vec::new(),
            fail_next: Mutex::new(None),
        }
    }

    /// Register a unique index; `field` is reported in the violation metadata.
    pub fn with_unique_index(
        mut self,
        field: impl Into<String>,
        key: impl Fn(&R) -> String + Send + Sync + 'static,
    ) -> Self {
        self.unique_indexes.push((field.into(), Box::new(key)));
        self
    }

    /// Script the next operation to fail with `err` (tests only, but
    /// compiled in: the API black-box tests reach it through the app).
    pub fn fail_next(&self, err: StoreError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(err);
        }
    }

    fn take_scripted_failure(&self) -> Result<(), StoreError> {
        let taken = self.fail_next.lock().ok().and_then(|mut slot| slot.take());
        match taken {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn check_unique(
        &self,
        map: &HashMap<EntityId, R>,
        id: EntityId,
        record: &R,
    ) -> Result<(), StoreError> {
        for (field, key_fn) in &self.unique_indexes {
            let key = key_fn(record);
            let clash = map
                .iter()
                .any(|(other_id, other)| *other_id != id && key_fn(other) == key);
            if clash {
                return Err(StoreError::unique_violation(vec![field.clone()]));
            }
        }
        Ok(())
    }
}

impl<R> Default for InMemoryEntityStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R> EntityStore<R> for InMemoryEntityStore<R>
where
    R: Clone + Send + Sync + 'static,
{
    async fn get(&self, id: EntityId) -> Result<R, StoreError> {
        self.take_scripted_failure()?;
        let map = self
            .records
            .read()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;
        map.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn create(&self, id: EntityId, record: R) -> Result<R, StoreError> {
        self.take_scripted_failure()?;
        let mut map = self
            .records
            .write()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;
        self.check_unique(&map, id, &record)?;
        map.insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, id: EntityId, record: R) -> Result<R, StoreError> {
        self.take_scripted_failure()?;
        let mut map = self
            .records
            .write()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;
        if !map.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        self.check_unique(&map, id, &record)?;
        map.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: EntityId) -> Result<(), StoreError> {
        self.take_scripted_failure()?;
        let mut map = self
            .records
            .write()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<R>, StoreError> {
        self.take_scripted_failure()?;
        let map = self
            .records
            .read()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;

        // UUIDv7 ids are time-ordered, so this is creation order.
        let mut entries: Vec<(&EntityId, &R)> = map.iter().collect();
        entries.sort_by_key(|(id, _)| **id);

        Ok(entries
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.take_scripted_failure()?;
        let map = self
            .records
            .read()
            .map_err(|_| StoreError::internal("store lock poisoned"))?;
        Ok(map.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Doc {
        slug: String,
    }

    fn doc(slug: &str) -> Doc {
        Doc {
            slug: slug.to_string(),
        }
    }

    fn store() -> InMemoryEntityStore<Doc> {
        InMemoryEntityStore::new().with_unique_index("slug", |d: &Doc| d.slug.clone())
    }

    #[tokio::test]
    async fn create_then_get() {
        let s = store();
        let id = EntityId::new();
        s.create(id, doc("intro")).await.unwrap();
        assert_eq!(s.get(id).await.unwrap(), doc("intro"));
    }

    #[tokio::test]
    async fn missing_id_signals_not_found() {
        let s = store();
        assert_eq!(s.get(EntityId::new()).await.unwrap_err(), StoreError::NotFound);
        assert_eq!(
            s.update(EntityId::new(), doc("x")).await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(s.delete(EntityId::new()).await.unwrap_err(), StoreError::NotFound);
    }

    #[tokio::test]
    async fn duplicate_unique_key_raises_vendor_code() {
        let s = store();
        s.create(EntityId::new(), doc("intro")).await.unwrap();
        let err = s.create(EntityId::new(), doc("intro")).await.unwrap_err();
        match err {
            StoreError::Backend { code, fields, .. } => {
                assert_eq!(code, codes::UNIQUE_VIOLATION);
                assert_eq!(fields, vec!["slug".to_string()]);
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_may_keep_its_own_unique_key() {
        let s = store();
        let id = EntityId::new();
        s.create(id, doc("intro")).await.unwrap();
        // Same slug, same record: not a clash with itself.
        s.update(id, doc("intro")).await.unwrap();
    }

    #[tokio::test]
    async fn list_pages_in_creation_order() {
        let s = store();
        for i in 0..5 {
            s.create(EntityId::new(), doc(&format!("doc-{i}"))).await.unwrap();
        }
        let page = s.list(2, 2).await.unwrap();
        assert_eq!(page, vec![doc("doc-2"), doc("doc-3")]);
        assert_eq!(s.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn scripted_failure_fires_once() {
        let s = store();
        let id = EntityId::new();
        s.create(id, doc("intro")).await.unwrap();
        s.fail_next(StoreError::internal("disk on fire"));
        assert!(s.get(id).await.is_err());
        assert!(s.get(id).await.is_ok());
    }
}
