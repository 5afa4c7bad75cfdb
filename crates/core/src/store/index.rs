//! Composite index registry.
//!
//! A sort combined with filters on other fields is only served when a
//! matching composite index is registered, otherwise the store rejects the
//! query with [`StoreError::MissingIndex`]. Equality-only queries and sorts
//! without filters never need one.
//!
//! The registry reads the `firestore.indexes.json` layout:
//!
//! ```json
//! {
//!   "indexes": [
//!     {
//!       "collectionGroup": "products",
//!       "queryScope": "COLLECTION",
//!       "fields": [
//!         { "fieldPath": "status", "order": "ASCENDING" },
//!         { "fieldPath": "createdAt", "order": "DESCENDING" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::StoreError;
use super::query::Query;

/// Error reading the composite index file.
#[derive(Debug, thiserror::Error)]
pub enum IndexFileError {
    #[error("failed to read index file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid index file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One field of a composite index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexField {
    pub field_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array_config: Option<String>,
}

/// A composite index over one collection. The last field is the sort field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeIndex {
    pub collection_group: String,
    #[serde(default)]
    pub query_scope: Option<String>,
    pub fields: Vec<IndexField>,
}

impl CompositeIndex {
    /// Build an index from filter fields followed by the sort field.
    #[must_use]
    pub fn new(collection: &str, filter_fields: &[&str], sort_field: &str) -> Self {
        let fields = filter_fields
            .iter()
            .map(|f| IndexField {
                field_path: (*f).to_string(),
                order: Some("ASCENDING".to_string()),
                array_config: None,
            })
            .chain(std::iter::once(IndexField {
                field_path: sort_field.to_string(),
                order: Some("ASCENDING".to_string()),
                array_config: None,
            }))
            .collect();
        Self {
            collection_group: collection.to_string(),
            query_scope: Some("COLLECTION".to_string()),
            fields,
        }
    }

    fn serves(&self, collection: &str, filter_fields: &[&str], sort_field: &str) -> bool {
        let Some((last, leading)) = self.fields.split_last() else {
            return false;
        };
        self.collection_group == collection
            && last.field_path == sort_field
            && leading.len() == filter_fields.len()
            && filter_fields
                .iter()
                .all(|f| leading.iter().any(|l| l.field_path == *f))
    }
}

/// The set of registered composite indexes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRegistry {
    #[serde(default)]
    indexes: Vec<CompositeIndex>,
}

impl IndexRegistry {
    /// Build a registry from a list of indexes.
    #[must_use]
    pub const fn new(indexes: Vec<CompositeIndex>) -> Self {
        Self { indexes }
    }

    /// Parse a `firestore.indexes.json` document.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document does not match the layout.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load the index file at `path`.
    ///
    /// A missing file yields an empty registry: sorted listings then fall
    /// back to unordered queries with a logged degradation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, IndexFileError> {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let registry = Self::from_json(&json)?;
                tracing::info!(
                    path = %path.display(),
                    count = registry.indexes.len(),
                    "Composite indexes loaded"
                );
                Ok(registry)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Index file not found, sorted listings will be served unordered"
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Registered indexes.
    #[must_use]
    pub fn indexes(&self) -> &[CompositeIndex] {
        &self.indexes
    }

    /// Add an index.
    pub fn register(&mut self, index: CompositeIndex) {
        self.indexes.push(index);
    }

    /// Whether a query needs a composite index to be served.
    #[must_use]
    pub fn requires_index(query: &Query) -> bool {
        query.sort_key().is_some_and(|key| {
            query
                .filter_fields()
                .iter()
                .any(|field| *field != key.field)
        })
    }

    /// Check that a query can be served.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingIndex`] when the query combines a sort
    /// with filters on other fields and no registered index covers it.
    pub fn check(&self, query: &Query) -> Result<(), StoreError> {
        let Some(key) = query.sort_key() else {
            return Ok(());
        };
        if !Self::requires_index(query) {
            return Ok(());
        }
        let filter_fields: Vec<&str> = query
            .filter_fields()
            .into_iter()
            .filter(|f| *f != key.field)
            .collect();
        if self
            .indexes
            .iter()
            .any(|idx| idx.serves(query.collection(), &filter_fields, &key.field))
        {
            return Ok(());
        }
        Err(StoreError::MissingIndex {
            collection: query.collection().to_string(),
            fields: filter_fields.into_iter().map(str::to_string).collect(),
            order_by: key.field.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::query::SortKey;

    #[test]
    fn test_missing_index_file_is_empty_registry() {
        let registry = IndexRegistry::load(Path::new("/nonexistent/catalog.indexes.json")).unwrap();
        assert!(registry.indexes().is_empty());
    }

    #[test]
    fn test_bundled_index_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../catalog.indexes.json");
        let registry = IndexRegistry::load(&path).unwrap();
        assert!(!registry.indexes().is_empty());
    }

    fn listing_query() -> Query {
        Query::new("products")
            .where_eq("status", "published")
            .where_eq("categoryId", "dresses")
            .order_by(SortKey::desc("createdAt"))
    }

    #[test]
    fn test_equality_only_and_plain_sort_need_no_index() {
        let registry = IndexRegistry::default();
        let eq_only = Query::new("products").where_eq("status", "published");
        let sort_only = Query::new("products").order_by(SortKey::asc("price"));
        let sort_on_filter = Query::new("faqs")
            .where_eq("order", 1)
            .order_by(SortKey::asc("order"));
        assert!(registry.check(&eq_only).is_ok());
        assert!(registry.check(&sort_only).is_ok());
        assert!(registry.check(&sort_on_filter).is_ok());
    }

    #[test]
    fn test_missing_index_reports_fields() {
        let err = IndexRegistry::default().check(&listing_query()).unwrap_err();
        match err {
            StoreError::MissingIndex {
                collection,
                fields,
                order_by,
            } => {
                assert_eq!(collection, "products");
                assert_eq!(fields, vec!["status", "categoryId"]);
                assert_eq!(order_by, "createdAt");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_registered_index_serves_query_in_any_field_order() {
        let mut registry = IndexRegistry::default();
        registry.register(CompositeIndex::new(
            "products",
            &["categoryId", "status"],
            "createdAt",
        ));
        assert!(registry.check(&listing_query()).is_ok());

        let fewer_filters = Query::new("products")
            .where_eq("status", "published")
            .order_by(SortKey::desc("createdAt"));
        assert!(registry.check(&fewer_filters).is_err());
    }

    #[test]
    fn test_parse_firestore_layout() {
        let json = r#"{
            "indexes": [{
                "collectionGroup": "products",
                "queryScope": "COLLECTION",
                "fields": [
                    { "fieldPath": "status", "order": "ASCENDING" },
                    { "fieldPath": "createdAt", "order": "DESCENDING" }
                ]
            }],
            "fieldOverrides": []
        }"#;
        let registry = IndexRegistry::from_json(json).unwrap();
        assert_eq!(registry.indexes().len(), 1);
        let query = Query::new("products")
            .where_eq("status", "published")
            .order_by(SortKey::desc("createdAt"));
        assert!(registry.check(&query).is_ok());
    }
}
