//! Document store abstraction.
//!
//! Every entity is a JSON document keyed by a string id inside a named
//! collection. Writes overwrite the whole document (last write wins).
//! [`memory::InMemoryStore`] backs tests; `postgres::PgDocumentStore`
//! (feature `postgres`) backs the binaries with a JSONB table.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::validation::ValidationErrors;

pub mod index;
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod query;

pub use index::{CompositeIndex, IndexField, IndexFileError, IndexRegistry};
pub use memory::InMemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PgDocumentStore;
pub use query::{Constraint, Cursor, Direction, Operator, Query, SortKey};

/// Errors returned by document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("query on {collection} filtering {fields:?} ordered by {order_by} requires a composite index")]
    MissingIndex {
        collection: String,
        fields: Vec<String>,
        order_by: String,
    },

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Whether the error means the query needs a composite index.
    #[must_use]
    pub const fn is_missing_index(&self) -> bool {
        matches!(self, Self::MissingIndex { .. })
    }
}

/// A document as stored: id plus JSON body (the body never carries `id`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawDocument {
    pub id: String,
    pub data: Value,
}

impl RawDocument {
    #[must_use]
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Deserialize into a typed document, injecting the id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut data = self.data.clone();
        if let Value::Object(map) = &mut data {
            map.insert("id".to_string(), Value::String(self.id.clone()));
        }
        Ok(serde_json::from_value(data)?)
    }
}

/// Storage operations shared by all backends.
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<RawDocument>, StoreError>> + Send;

    /// Run a declarative query.
    fn query(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<RawDocument>, StoreError>> + Send;

    /// Create or overwrite a document.
    fn put(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a document. Returns whether it existed.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Add `by` to a numeric field, treating a missing field as zero.
    fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// A typed document stored in a collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Set timestamps before a write. `existing` is the stored copy, if any.
    fn stamp(&mut self, _now: DateTime<Utc>, _existing: Option<&Self>) {}

    /// Field-level validation run before every admin write.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Slug that must be unique within the collection, if the type has one.
    fn unique_slug(&self) -> Option<&str> {
        None
    }
}

/// A settings document stored under a fixed id.
pub trait Singleton: Serialize + DeserializeOwned + Default + Send + Sync {
    const COLLECTION: &'static str;
    const DOC_ID: &'static str = "global";
}

/// Serialize a document body, dropping the `id` field.
fn encode<T: Serialize>(doc: &T) -> Result<Value, StoreError> {
    let mut data = serde_json::to_value(doc)?;
    if let Value::Object(map) = &mut data {
        map.remove("id");
    }
    Ok(data)
}

/// Fetch and decode one document.
///
/// # Errors
///
/// Returns a store or decode error.
pub async fn get_document<T: Document, S: DocumentStore>(
    store: &S,
    id: &str,
) -> Result<Option<T>, StoreError> {
    store
        .get(T::COLLECTION, id)
        .await?
        .map(|doc| doc.decode())
        .transpose()
}

/// Run a query and decode every result.
///
/// # Errors
///
/// Returns a store or decode error.
pub async fn query_documents<T: Document, S: DocumentStore>(
    store: &S,
    query: &Query,
) -> Result<Vec<T>, StoreError> {
    store
        .query(query)
        .await?
        .iter()
        .map(RawDocument::decode)
        .collect()
}

/// Write a document, generating an id when it has none.
///
/// Returns the id written.
///
/// # Errors
///
/// Returns a store or encode error.
pub async fn save_document<T: Document, S: DocumentStore>(
    store: &S,
    doc: &mut T,
) -> Result<String, StoreError> {
    if doc.id().is_empty() {
        doc.set_id(crate::types::id::new_document_id());
    }
    let id = doc.id().to_string();
    store.put(T::COLLECTION, &id, encode(doc)?).await?;
    Ok(id)
}

/// Delete a document by id.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] if it does not exist.
pub async fn delete_document<T: Document, S: DocumentStore>(
    store: &S,
    id: &str,
) -> Result<(), StoreError> {
    if store.delete(T::COLLECTION, id).await? {
        Ok(())
    } else {
        Err(StoreError::NotFound {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
        })
    }
}

/// Load a singleton, falling back to its default when never saved.
///
/// # Errors
///
/// Returns a store or decode error.
pub async fn get_singleton<T: Singleton, S: DocumentStore>(store: &S) -> Result<T, StoreError> {
    match store.get(T::COLLECTION, T::DOC_ID).await? {
        Some(doc) => Ok(serde_json::from_value(doc.data)?),
        None => Ok(T::default()),
    }
}

/// Load a singleton only if it was saved.
///
/// # Errors
///
/// Returns a store or decode error.
pub async fn find_singleton<T: Singleton, S: DocumentStore>(
    store: &S,
) -> Result<Option<T>, StoreError> {
    store
        .get(T::COLLECTION, T::DOC_ID)
        .await?
        .map(|doc| serde_json::from_value(doc.data).map_err(StoreError::from))
        .transpose()
}

/// Overwrite a singleton.
///
/// # Errors
///
/// Returns a store or encode error.
pub async fn save_singleton<T: Singleton, S: DocumentStore>(
    store: &S,
    value: &T,
) -> Result<(), StoreError> {
    store
        .put(T::COLLECTION, T::DOC_ID, serde_json::to_value(value)?)
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(default)]
        id: String,
        text: String,
    }

    impl Document for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> &str {
            &self.id
        }

        fn set_id(&mut self, id: String) {
            self.id = id;
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
    struct Banner {
        message: String,
    }

    impl Singleton for Banner {
        const COLLECTION: &'static str = "banner";
    }

    #[test]
    fn test_decode_injects_id() {
        let raw = RawDocument::new("n1", json!({ "text": "hi" }));
        let note: Note = raw.decode().unwrap();
        assert_eq!(note.id, "n1");
        assert_eq!(note.text, "hi");
    }

    #[tokio::test]
    async fn test_save_generates_id_and_strips_it_from_body() {
        let store = InMemoryStore::new();
        let mut note = Note {
            id: String::new(),
            text: "hello".to_string(),
        };
        let id = save_document(&store, &mut note).await.unwrap();
        assert_eq!(id.len(), 32);
        assert_eq!(note.id, id);

        let raw = store.get("notes", &id).await.unwrap().unwrap();
        assert!(raw.data.get("id").is_none());

        let loaded: Note = get_document(&store, &id).await.unwrap().unwrap();
        assert_eq!(loaded, note);
    }

    #[tokio::test]
    async fn test_delete_missing_document_is_not_found() {
        let store = InMemoryStore::new();
        let err = delete_document::<Note, _>(&store, "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_singleton_defaults_until_saved() {
        let store = InMemoryStore::new();
        let banner: Banner = get_singleton(&store).await.unwrap();
        assert_eq!(banner, Banner::default());
        assert!(find_singleton::<Banner, _>(&store).await.unwrap().is_none());

        let saved = Banner {
            message: "Sale".to_string(),
        };
        save_singleton(&store, &saved).await.unwrap();
        let banner: Banner = get_singleton(&store).await.unwrap();
        assert_eq!(banner, saved);
    }
}
