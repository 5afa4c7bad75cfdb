//! Contact message triage.

use chrono::Utc;
use elegant_closet_core::catalog::{Degradation, fetch_page};
use elegant_closet_core::models::{ContactMessage, MessageUpdate};
use elegant_closet_core::store::{
    Document, DocumentStore, Query, SortKey, StoreError, delete_document, get_document,
    save_document,
};
use elegant_closet_core::types::MessageStatus;
use tracing::{info, instrument};

/// Messages newest first, optionally only those with `status`.
///
/// Without a matching composite index the store serves the filtered list
/// unordered; it is then sorted here and the degradation is returned.
///
/// # Errors
///
/// Returns a store error.
#[instrument(skip(store))]
pub async fn list<S: DocumentStore>(
    store: &S,
    status: Option<MessageStatus>,
) -> Result<(Vec<ContactMessage>, Option<Degradation>), StoreError> {
    let mut query = Query::new(ContactMessage::COLLECTION);
    if let Some(status) = status {
        query = query.where_eq("status", status.as_str());
    }
    let query = query.order_by(SortKey::desc("createdAt"));

    let page = fetch_page::<ContactMessage, S>(store, &query).await?;
    let mut messages = page.items;
    if page.degradation.is_some() {
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }
    Ok((messages, page.degradation))
}

/// Apply a status and/or priority change.
///
/// # Errors
///
/// Returns `NotFound` if the message does not exist.
#[instrument(skip(store, update))]
pub async fn triage<S: DocumentStore>(
    store: &S,
    id: &str,
    update: &MessageUpdate,
) -> Result<ContactMessage, StoreError> {
    let mut message: ContactMessage =
        get_document(store, id)
            .await?
            .ok_or_else(|| StoreError::NotFound {
                collection: ContactMessage::COLLECTION.to_string(),
                id: id.to_string(),
            })?;
    message.apply(update, Utc::now());
    save_document(store, &mut message).await?;
    info!(status = %message.status, priority = %message.priority, "Message triaged");
    Ok(message)
}

/// Delete a message.
///
/// # Errors
///
/// Returns `NotFound` if the message does not exist.
pub async fn remove<S: DocumentStore>(store: &S, id: &str) -> Result<(), StoreError> {
    delete_document::<ContactMessage, S>(store, id).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use elegant_closet_core::models::NewContactMessage;
    use elegant_closet_core::store::{CompositeIndex, IndexRegistry, InMemoryStore};
    use elegant_closet_core::types::MessagePriority;

    use super::*;

    async fn seed(store: &InMemoryStore) -> Vec<String> {
        let mut ids = Vec::new();
        for (i, subject) in ["Sizing", "Delivery", "Returns"].iter().enumerate() {
            let form = NewContactMessage {
                name: "Nadeesha".to_string(),
                email: "nadeesha@example.com".to_string(),
                phone: None,
                subject: (*subject).to_string(),
                message: "Hello".to_string(),
            };
            let at = Utc::now() - Duration::hours(10 - i64::try_from(i).unwrap());
            let mut message = form.into_message(at).unwrap();
            ids.push(save_document(store, &mut message).await.unwrap());
        }
        ids
    }

    fn subjects(messages: &[ContactMessage]) -> Vec<&str> {
        messages.iter().map(|m| m.subject.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_newest_first_with_and_without_index() {
        let store = InMemoryStore::default();
        let ids = seed(&store).await;
        triage(
            &store,
            &ids[1],
            &MessageUpdate {
                status: Some(MessageStatus::Read),
                priority: None,
            },
        )
        .await
        .unwrap();

        let (all, degradation) = list(&store, None).await.unwrap();
        assert!(degradation.is_none());
        assert_eq!(subjects(&all), vec!["Returns", "Delivery", "Sizing"]);

        let (new, degradation) = list(&store, Some(MessageStatus::New)).await.unwrap();
        assert!(degradation.is_some());
        assert_eq!(subjects(&new), vec!["Returns", "Sizing"]);

        let indexed = InMemoryStore::with_indexes(IndexRegistry::new(vec![CompositeIndex::new(
            ContactMessage::COLLECTION,
            &["status"],
            "createdAt",
        )]));
        seed(&indexed).await;
        let (new, degradation) = list(&indexed, Some(MessageStatus::New)).await.unwrap();
        assert!(degradation.is_none());
        assert_eq!(new.len(), 3);
    }

    #[tokio::test]
    async fn test_triage_and_remove() {
        let store = InMemoryStore::default();
        let ids = seed(&store).await;
        let update = MessageUpdate {
            status: Some(MessageStatus::Replied),
            priority: Some(MessagePriority::High),
        };
        let message = triage(&store, &ids[0], &update).await.unwrap();
        assert_eq!(message.status, MessageStatus::Replied);
        assert_eq!(message.priority, MessagePriority::High);
        assert!(message.replied_at.is_some());

        remove(&store, &ids[0]).await.unwrap();
        assert!(matches!(
            remove(&store, &ids[0]).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            triage(&store, "missing", &update).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
