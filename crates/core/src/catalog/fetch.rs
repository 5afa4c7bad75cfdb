//! Remote fetch with the ordered/unordered fallback.
//!
//! [`fetch_page`] runs a query as [`QueryStrategy::OrderedQuery`] first. If
//! the store rejects it for a missing composite index, the same constraints
//! are re-run as [`QueryStrategy::UnorderedQuery`] and the page carries a
//! [`Degradation`] for the caller to surface. Any other error propagates.
//! There are no retries.

use serde::Serialize;
use tracing::{instrument, warn};

use super::pagination::PageTracker;
use crate::store::{Cursor, Document, DocumentStore, Query, RawDocument, SortKey, StoreError};

/// Which tier served a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryStrategy {
    OrderedQuery,
    UnorderedQuery,
}

/// Warning attached to a page served without its requested order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Degradation {
    pub collection: String,
    /// The sort that could not be applied by the store.
    pub dropped_sort: String,
    pub reason: String,
}

impl Degradation {
    /// Short message for banners and API responses.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "Results for {} are not sorted by {} ({})",
            self.collection, self.dropped_sort, self.reason
        )
    }
}

/// One page of decoded records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor after the last record, `None` for an empty page.
    pub next_cursor: Option<Cursor>,
    /// Whether the page was full-sized.
    pub has_more: bool,
    pub strategy: QueryStrategy,
    pub degradation: Option<Degradation>,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }

    /// Opaque token for the next page.
    #[must_use]
    pub fn next_token(&self) -> Option<String> {
        self.next_cursor.as_ref().map(Cursor::encode)
    }
}

fn build_page<T: Document>(
    raw: &[RawDocument],
    query: &Query,
    sort: Option<&SortKey>,
    strategy: QueryStrategy,
    degradation: Option<Degradation>,
) -> Result<Page<T>, StoreError> {
    let items = raw.iter().map(RawDocument::decode).collect::<Result<Vec<T>, _>>()?;
    Ok(Page {
        items,
        next_cursor: raw.last().map(|doc| Cursor::after(doc, sort)),
        has_more: query.page_size().is_some_and(|n| n > 0 && raw.len() == n),
        strategy,
        degradation,
    })
}

/// Fetch one page, falling back to an unordered query on a missing index.
///
/// # Errors
///
/// Returns any store error other than a missing index on the ordered tier,
/// or any error from the unordered tier.
#[instrument(skip(store), fields(query = %query))]
pub async fn fetch_page<T: Document, S: DocumentStore>(
    store: &S,
    query: &Query,
) -> Result<Page<T>, StoreError> {
    let Some(sort) = query.sort_key() else {
        let raw = store.query(query).await?;
        return build_page(&raw, query, None, QueryStrategy::UnorderedQuery, None);
    };

    match store.query(query).await {
        Ok(raw) => build_page(&raw, query, Some(sort), QueryStrategy::OrderedQuery, None),
        Err(err @ StoreError::MissingIndex { .. }) => {
            warn!(
                collection = query.collection(),
                sort = %sort,
                error = %err,
                "Ordered query needs a composite index, falling back to unordered query"
            );
            let degradation = Degradation {
                collection: query.collection().to_string(),
                dropped_sort: sort.to_string(),
                reason: "missing composite index".to_string(),
            };
            let unordered = query.unordered();
            let raw = store.query(&unordered).await?;
            build_page(
                &raw,
                &unordered,
                None,
                QueryStrategy::UnorderedQuery,
                Some(degradation),
            )
        }
        Err(err) => Err(err),
    }
}

/// Page through a query until a short page, up to `max_pages` pages.
///
/// Returns the tracker holding every loaded record and the first
/// degradation seen, if any.
///
/// # Errors
///
/// Returns the first store error. Records loaded before it are discarded.
pub async fn collect_pages<T: Document, S: DocumentStore>(
    store: &S,
    query: &Query,
    max_pages: usize,
) -> Result<(PageTracker<T>, Option<Degradation>), StoreError> {
    let mut tracker = PageTracker::new();
    let mut degradation = None;
    let mut ticket = Some(tracker.begin_initial());
    let mut pages = 0;

    while let Some(current) = ticket {
        let next = match tracker.cursor() {
            Some(cursor) => query.first_page().start_after(cursor.clone()),
            None => query.first_page(),
        };
        let page = fetch_page::<T, S>(store, &next).await?;
        if degradation.is_none() {
            degradation.clone_from(&page.degradation);
        }
        tracker.complete(current, page);
        pages += 1;
        ticket = if pages < max_pages {
            tracker.begin_more()
        } else {
            None
        };
    }
    Ok((tracker, degradation))
}
