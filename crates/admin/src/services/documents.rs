//! Admin writes over the document collections.
//!
//! Every write is a whole-document overwrite. Before it lands the document
//! is validated, its slug is checked for uniqueness within the collection
//! and its references to other documents are checked. Concurrent edits are
//! last-write-wins.

use std::future::Future;

use chrono::Utc;
use elegant_closet_core::models::{Category, ColorOption, Faq, Product, SizeOption};
use elegant_closet_core::store::{
    Document, DocumentStore, Query, SortKey, StoreError, delete_document, get_document,
    query_documents, save_document,
};
use elegant_closet_core::validation::ValidationErrors;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("slug {slug:?} is already used by {collection}/{id}")]
    SlugTaken {
        collection: &'static str,
        slug: String,
        id: String,
    },

    #[error("{0}")]
    InUse(String),
}

/// A collection the admin API manages.
pub trait Managed: Document + Clone + 'static {
    /// Order of the admin list view.
    fn list_order() -> Option<SortKey> {
        None
    }

    /// Checks against other documents, run before every write.
    fn check_references<S: DocumentStore>(
        &self,
        _store: &S,
    ) -> impl Future<Output = Result<(), DocumentError>> + Send {
        async { Ok(()) }
    }

    /// Checks run before a delete.
    fn check_delete<S: DocumentStore>(
        _id: &str,
        _store: &S,
    ) -> impl Future<Output = Result<(), DocumentError>> + Send {
        async { Ok(()) }
    }
}

impl Managed for Product {
    fn list_order() -> Option<SortKey> {
        Some(SortKey::desc("createdAt"))
    }

    async fn check_references<S: DocumentStore>(&self, store: &S) -> Result<(), DocumentError> {
        let mut errors = ValidationErrors::new();
        match get_document::<Category, S>(store, self.category_id.as_str()).await? {
            None => errors.push("categoryId", "unknown category"),
            Some(category) if !category.is_top_level() => {
                errors.push("categoryId", "must be a top-level category");
            }
            Some(_) => {}
        }
        if let Some(sub) = &self.sub_category_id {
            match get_document::<Category, S>(store, sub.as_str()).await? {
                Some(category) if category.parent_id.as_ref() == Some(&self.category_id) => {}
                Some(_) => errors.push("subCategoryId", "must be a child of categoryId"),
                None => errors.push("subCategoryId", "unknown category"),
            }
        }
        Ok(errors.into_result()?)
    }
}

impl Managed for Category {
    fn list_order() -> Option<SortKey> {
        Some(SortKey::asc("order"))
    }

    async fn check_references<S: DocumentStore>(&self, store: &S) -> Result<(), DocumentError> {
        let Some(parent_id) = &self.parent_id else {
            return Ok(());
        };
        let mut errors = ValidationErrors::new();
        match get_document::<Category, S>(store, parent_id.as_str()).await? {
            None => errors.push("parentId", "unknown category"),
            Some(parent) if !parent.is_top_level() => {
                errors.push("parentId", "categories nest at most two levels");
            }
            Some(_) => {}
        }
        if !self.id.is_empty() && !children(store, self.id.as_str()).await?.is_empty() {
            errors.push("parentId", "a category with sub-categories cannot have a parent");
        }
        Ok(errors.into_result()?)
    }

    async fn check_delete<S: DocumentStore>(id: &str, store: &S) -> Result<(), DocumentError> {
        let subs = children(store, id).await?;
        if !subs.is_empty() {
            return Err(DocumentError::InUse(format!(
                "category {id} still has {} sub-categories",
                subs.len()
            )));
        }
        for field in ["categoryId", "subCategoryId"] {
            let query = Query::new(Product::COLLECTION).where_eq(field, id).limit(1);
            if !store.query(&query).await?.is_empty() {
                return Err(DocumentError::InUse(format!(
                    "category {id} is still used by products"
                )));
            }
        }
        Ok(())
    }
}

impl Managed for Faq {
    fn list_order() -> Option<SortKey> {
        Some(SortKey::asc("order"))
    }
}

impl Managed for ColorOption {
    fn list_order() -> Option<SortKey> {
        Some(SortKey::asc("name"))
    }
}

impl Managed for SizeOption {
    fn list_order() -> Option<SortKey> {
        Some(SortKey::asc("order"))
    }
}

async fn children<S: DocumentStore>(store: &S, id: &str) -> Result<Vec<Category>, StoreError> {
    query_documents(store, &Query::new(Category::COLLECTION).where_eq("parentId", id)).await
}

/// Reject `doc` if another document of its collection has the same slug.
///
/// # Errors
///
/// Returns `SlugTaken` naming the other document.
pub async fn ensure_unique_slug<T: Document, S: DocumentStore>(
    store: &S,
    doc: &T,
) -> Result<(), DocumentError> {
    let Some(slug) = doc.unique_slug() else {
        return Ok(());
    };
    let query = Query::new(T::COLLECTION).where_eq("slug", slug).limit(2);
    match store.query(&query).await?.into_iter().find(|d| d.id != doc.id()) {
        Some(other) => Err(DocumentError::SlugTaken {
            collection: T::COLLECTION,
            slug: slug.to_string(),
            id: other.id,
        }),
        None => Ok(()),
    }
}

/// Every check a write runs before it lands: validation, slug uniqueness
/// and references.
///
/// # Errors
///
/// Returns the first failing check.
pub async fn check<T: Managed, S: DocumentStore>(store: &S, doc: &T) -> Result<(), DocumentError> {
    doc.validate()?;
    ensure_unique_slug(store, doc).await?;
    doc.check_references(store).await
}

/// Every document of a collection in its admin order.
///
/// # Errors
///
/// Returns a store error.
pub async fn list<T: Managed, S: DocumentStore>(store: &S) -> Result<Vec<T>, DocumentError> {
    let mut query = Query::new(T::COLLECTION);
    if let Some(key) = T::list_order() {
        query = query.order_by(key);
    }
    Ok(query_documents(store, &query).await?)
}

/// One document.
///
/// # Errors
///
/// Returns `NotFound` if it does not exist.
pub async fn fetch<T: Managed, S: DocumentStore>(store: &S, id: &str) -> Result<T, DocumentError> {
    get_document(store, id).await?.ok_or_else(|| {
        DocumentError::Store(StoreError::NotFound {
            collection: T::COLLECTION.to_string(),
            id: id.to_string(),
        })
    })
}

/// Create a document under a fresh id. Any id in the body is ignored.
///
/// # Errors
///
/// Returns validation, slug, reference or store errors.
#[instrument(skip(store, doc), fields(collection = T::COLLECTION))]
pub async fn create<T: Managed, S: DocumentStore>(
    store: &S,
    mut doc: T,
) -> Result<T, DocumentError> {
    doc.set_id(String::new());
    check(store, &doc).await?;
    doc.stamp(Utc::now(), None);
    let id = save_document(store, &mut doc).await?;
    info!(%id, "Document created");
    Ok(doc)
}

/// Overwrite an existing document.
///
/// # Errors
///
/// Returns `NotFound` if it does not exist, otherwise as [`create`].
#[instrument(skip(store, doc), fields(collection = T::COLLECTION))]
pub async fn update<T: Managed, S: DocumentStore>(
    store: &S,
    id: &str,
    mut doc: T,
) -> Result<T, DocumentError> {
    let existing: T = fetch(store, id).await?;
    doc.set_id(id.to_string());
    check(store, &doc).await?;
    doc.stamp(Utc::now(), Some(&existing));
    save_document(store, &mut doc).await?;
    info!("Document updated");
    Ok(doc)
}

/// Delete a document.
///
/// # Errors
///
/// Returns `NotFound`, `InUse` or a store error.
#[instrument(skip(store), fields(collection = T::COLLECTION))]
pub async fn remove<T: Managed, S: DocumentStore>(store: &S, id: &str) -> Result<(), DocumentError> {
    T::check_delete(id, store).await?;
    delete_document::<T, S>(store, id).await?;
    info!("Document deleted");
    Ok(())
}
