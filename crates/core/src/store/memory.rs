//! In-memory document store.
//!
//! Evaluates queries with the same rules as the Postgres store, including
//! composite index checks, so pipeline tests exercise the real fallback path.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use serde_json::Value;

use super::index::IndexRegistry;
use super::query::{Direction, Query, lookup, total_cmp};
use super::{DocumentStore, RawDocument, StoreError};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Thread-safe in-memory store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
    indexes: Arc<IndexRegistry>,
}

impl InMemoryStore {
    /// An empty store with no composite indexes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty store serving the given composite indexes.
    #[must_use]
    pub fn with_indexes(indexes: IndexRegistry) -> Self {
        Self {
            collections: Arc::default(),
            indexes: Arc::new(indexes),
        }
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .map_or(0, |c| c.get(collection).map_or(0, BTreeMap::len))
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Collections>, StoreError> {
        self.collections
            .read()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Collections>, StoreError> {
        self.collections
            .write()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    fn evaluate(&self, query: &Query) -> Result<Vec<RawDocument>, StoreError> {
        self.indexes.check(query)?;

        let guard = self.read()?;
        let mut docs: Vec<RawDocument> = guard
            .get(query.collection())
            .into_iter()
            .flat_map(BTreeMap::iter)
            .filter(|(_, data)| query.matches(data))
            .map(|(id, data)| RawDocument::new(id.clone(), data.clone()))
            .collect();
        drop(guard);

        if let Some(key) = query.sort_key() {
            docs.retain(|doc| lookup(&doc.data, &key.field).is_some());
            docs.sort_by(|a, b| compare(a, b, &key.field, key.direction));

            if let Some(cursor) = query.cursor() {
                let Some(sort_value) = &cursor.sort_value else {
                    return Err(StoreError::InvalidCursor(
                        "ordered query needs a cursor with a sort value".to_string(),
                    ));
                };
                docs.retain(|doc| {
                    let value = lookup(&doc.data, &key.field).unwrap_or(&Value::Null);
                    directed(total_cmp(value, sort_value), key.direction)
                        .then_with(|| doc.id.cmp(&cursor.id))
                        == Ordering::Greater
                });
            }
        } else if let Some(cursor) = query.cursor() {
            docs.retain(|doc| doc.id > cursor.id);
        }

        if let Some(limit) = query.page_size() {
            docs.truncate(limit);
        }
        Ok(docs)
    }
}

const fn directed(ordering: Ordering, direction: Direction) -> Ordering {
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn compare(a: &RawDocument, b: &RawDocument, field: &str, direction: Direction) -> Ordering {
    let av = lookup(&a.data, field).unwrap_or(&Value::Null);
    let bv = lookup(&b.data, field).unwrap_or(&Value::Null);
    directed(total_cmp(av, bv), direction).then_with(|| a.id.cmp(&b.id))
}

impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<RawDocument>, StoreError> {
        Ok(self
            .read()?
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| RawDocument::new(id, data.clone())))
    }

    async fn query(&self, query: &Query) -> Result<Vec<RawDocument>, StoreError> {
        self.evaluate(query)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .write()?
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn increment(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        by: i64,
    ) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        let Some(Value::Object(map)) = guard.get_mut(collection).and_then(|docs| docs.get_mut(id))
        else {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        };
        let current = map.get(field).and_then(Value::as_i64).unwrap_or(0);
        map.insert(field.to_string(), Value::from(current.saturating_add(by)));
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::store::index::CompositeIndex;
    use crate::store::query::{Constraint, Cursor, Operator, SortKey};

    async fn seeded(indexes: IndexRegistry) -> InMemoryStore {
        let store = InMemoryStore::with_indexes(indexes);
        let rows = [
            ("a", "published", "dresses", 3000),
            ("b", "published", "tops", 1500),
            ("c", "draft", "dresses", 2000),
            ("d", "published", "dresses", 3000),
            ("e", "published", "dresses", 1000),
        ];
        for (id, status, category, price) in rows {
            store
                .put(
                    "products",
                    id,
                    json!({ "status": status, "categoryId": category, "price": price }),
                )
                .await
                .unwrap();
        }
        store
    }

    fn ids(docs: &[RawDocument]) -> Vec<&str> {
        docs.iter().map(|d| d.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_get_put_delete() {
        let store = InMemoryStore::new();
        assert!(store.get("faqs", "1").await.unwrap().is_none());
        store.put("faqs", "1", json!({ "question": "Q" })).await.unwrap();
        store.put("faqs", "1", json!({ "question": "Q2" })).await.unwrap();
        let doc = store.get("faqs", "1").await.unwrap().unwrap();
        assert_eq!(doc.data["question"], "Q2");
        assert!(store.delete("faqs", "1").await.unwrap());
        assert!(!store.delete("faqs", "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_equality_filters_without_index() {
        let store = seeded(IndexRegistry::default()).await;
        let query = Query::new("products")
            .where_eq("status", "published")
            .where_eq("categoryId", "dresses");
        let docs = store.query(&query).await.unwrap();
        assert_eq!(ids(&docs), vec!["a", "d", "e"]);
    }

    #[tokio::test]
    async fn test_sort_with_filter_requires_index() {
        let query = Query::new("products")
            .where_eq("status", "published")
            .order_by(SortKey::desc("price"));

        let store = seeded(IndexRegistry::default()).await;
        let err = store.query(&query).await.unwrap_err();
        assert!(err.is_missing_index());

        let indexed = seeded(IndexRegistry::new(vec![CompositeIndex::new(
            "products",
            &["status"],
            "price",
        )]))
        .await;
        let docs = indexed.query(&query).await.unwrap();
        assert_eq!(ids(&docs), vec!["a", "d", "b", "e"]);
    }

    #[tokio::test]
    async fn test_ordered_pages_never_repeat() {
        let store = seeded(IndexRegistry::default()).await;
        let query = Query::new("products").order_by(SortKey::asc("price")).limit(2);

        let first = store.query(&query).await.unwrap();
        assert_eq!(ids(&first), vec!["e", "b"]);

        let cursor = Cursor::after(first.last().unwrap(), query.sort_key());
        let second = store.query(&query.clone().start_after(cursor)).await.unwrap();
        assert_eq!(ids(&second), vec!["c", "a"]);

        let cursor = Cursor::after(second.last().unwrap(), query.sort_key());
        let third = store.query(&query.clone().start_after(cursor)).await.unwrap();
        assert_eq!(ids(&third), vec!["d"]);
    }

    #[tokio::test]
    async fn test_unordered_cursor_pages_by_id() {
        let store = seeded(IndexRegistry::default()).await;
        let query = Query::new("products").limit(3);
        let first = store.query(&query).await.unwrap();
        let cursor = Cursor::after(first.last().unwrap(), None);
        let second = store.query(&query.clone().start_after(cursor)).await.unwrap();
        assert_eq!(ids(&second), vec!["d", "e"]);
    }

    #[tokio::test]
    async fn test_ordered_query_rejects_cursor_without_sort_value() {
        let store = seeded(IndexRegistry::default()).await;
        let query = Query::new("products")
            .order_by(SortKey::asc("price"))
            .start_after(Cursor {
                id: "a".to_string(),
                sort_value: None,
            });
        assert!(matches!(
            store.query(&query).await,
            Err(StoreError::InvalidCursor(_))
        ));
    }

    #[tokio::test]
    async fn test_range_filter_and_missing_sort_field() {
        let store = seeded(IndexRegistry::default()).await;
        store.put("products", "z", json!({ "status": "published" })).await.unwrap();

        let cheap = Query::new("products").filter(Constraint::new("price", Operator::Lt, 2000));
        assert_eq!(ids(&store.query(&cheap).await.unwrap()), vec!["b", "e"]);

        let sorted = Query::new("products").order_by(SortKey::asc("price"));
        assert!(!ids(&store.query(&sorted).await.unwrap()).contains(&"z"));
    }

    #[tokio::test]
    async fn test_increment_treats_missing_field_as_zero() {
        let store = seeded(IndexRegistry::default()).await;
        store.increment("products", "a", "viewCount", 1).await.unwrap();
        store.increment("products", "a", "viewCount", 1).await.unwrap();
        let doc = store.get("products", "a").await.unwrap().unwrap();
        assert_eq!(doc.data["viewCount"], 2);
        assert!(store.increment("products", "nope", "viewCount", 1).await.is_err());
    }
}
