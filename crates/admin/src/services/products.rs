//! Product creation with hosted images.
//!
//! Order of work for one request:
//!
//! 1. size and type guard on every file
//! 2. product validation, slug uniqueness and category references
//! 3. upload every file to the chosen host
//! 4. write the product with the hosted URLs appended
//!
//! Nothing leaves the server until steps 1 and 2 pass. If any upload fails
//! the product is not written; images uploaded earlier in the same batch
//! stay on the host.

use elegant_closet_core::models::{Product, ProductImage};
use elegant_closet_core::store::{Document, DocumentStore};
use thiserror::Error;
use tracing::{info, instrument};

use super::documents::{self, DocumentError};
use super::uploads::{ImageFile, ImageHost, UploadError, Uploader};

#[derive(Debug, Error)]
pub enum ProductUploadError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Append hosted images after any images the product already lists.
pub fn attach_images(product: &mut Product, urls: Vec<String>) {
    let start = product
        .images
        .iter()
        .map(|img| img.order.saturating_add(1))
        .max()
        .unwrap_or(0);
    for (offset, url) in (0_u32..).zip(urls) {
        product.images.push(ProductImage {
            url,
            alt: product.name.clone(),
            order: start.saturating_add(offset),
        });
    }
}

/// Check the product and files, upload the files, then create the product.
///
/// # Errors
///
/// Returns the first failing file guard, document check, upload or write.
#[instrument(skip_all, fields(%host, files = files.len()))]
pub async fn create_with_images<S: DocumentStore>(
    store: &S,
    uploader: &Uploader,
    mut product: Product,
    host: ImageHost,
    files: &[ImageFile],
) -> Result<Product, ProductUploadError> {
    for file in files {
        file.check()?;
    }
    product.set_id(String::new());
    documents::check(store, &product).await?;

    let urls = uploader.upload_all(host, files).await?;
    attach_images(&mut product, urls);

    let saved = documents::create(store, product).await?;
    info!(id = %saved.id, images = saved.images.len(), "Product created with images");
    Ok(saved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use elegant_closet_core::models::Category;
    use elegant_closet_core::store::InMemoryStore;
    use elegant_closet_core::types::CategoryId;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use serde_json::{Value, json};

    use super::*;
    use crate::config::{ImageHostConfig, UploadConfig};

    type HostState = (Arc<AtomicUsize>, StatusCode);

    async fn respond(
        State((hits, status)): State<HostState>,
        _body: Bytes,
    ) -> (StatusCode, Json<Value>) {
        let n = hits.fetch_add(1, Ordering::SeqCst);
        (
            status,
            Json(json!({ "data": { "url": format!("https://i.ibb.co/{n}.jpg") } })),
        )
    }

    /// Local ImgBB-style host answering every upload with `status`.
    async fn image_host(status: StatusCode) -> (Uploader, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/upload", post(respond))
            .with_state((hits.clone(), status));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let uploader = Uploader::new(UploadConfig {
            chevereto: None,
            imgbb: Some(ImageHostConfig {
                endpoint: format!("http://{addr}/upload"),
                api_key: SecretString::from("test-key"),
            }),
        })
        .unwrap();
        (uploader, hits)
    }

    async fn store_with_category() -> (InMemoryStore, CategoryId) {
        let store = InMemoryStore::default();
        let women = documents::create(
            &store,
            Category {
                name: "Women".to_string(),
                slug: "women".to_string(),
                ..Category::default()
            },
        )
        .await
        .unwrap();
        (store, women.id)
    }

    fn dress(category_id: CategoryId) -> Product {
        Product {
            name: "Linen Wrap Dress".to_string(),
            slug: "linen-wrap-dress".to_string(),
            price: Decimal::from(1000),
            category_id,
            ..Product::default()
        }
    }

    fn photo() -> ImageFile {
        ImageFile {
            file_name: "front.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        }
    }

    #[tokio::test]
    async fn test_uploads_then_creates() {
        let (store, women) = store_with_category().await;
        let (uploader, hits) = image_host(StatusCode::OK).await;

        let saved = create_with_images(
            &store,
            &uploader,
            dress(women),
            ImageHost::Imgbb,
            &[photo(), photo()],
        )
        .await
        .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(saved.images.len(), 2);
        assert!(saved.images.iter().all(|img| img.url.starts_with("https://i.ibb.co/")));
        assert_eq!(store.count(Product::COLLECTION), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_blocks_the_write() {
        let (store, women) = store_with_category().await;
        let (uploader, hits) = image_host(StatusCode::INTERNAL_SERVER_ERROR).await;

        let err = create_with_images(&store, &uploader, dress(women), ImageHost::Imgbb, &[photo()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProductUploadError::Upload(UploadError::Rejected { status: 500, .. })
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(store.count(Product::COLLECTION), 0);
    }

    #[tokio::test]
    async fn test_invalid_product_sends_nothing() {
        let (store, women) = store_with_category().await;
        let (uploader, hits) = image_host(StatusCode::OK).await;

        let mut product = dress(women);
        product.sale_price = Some(Decimal::from(1500));
        let err = create_with_images(&store, &uploader, product, ImageHost::Imgbb, &[photo()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProductUploadError::Document(DocumentError::Validation(ref e)) if e.has("salePrice")
        ));

        let orphan = dress(CategoryId::new("missing"));
        let err = create_with_images(&store, &uploader, orphan, ImageHost::Imgbb, &[photo()])
            .await
            .unwrap_err();
        assert!(matches!(err, ProductUploadError::Document(_)));

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(store.count(Product::COLLECTION), 0);
    }

    #[test]
    fn test_attach_images_continues_order() {
        let mut product = Product {
            name: "Linen Wrap Dress".to_string(),
            images: vec![ProductImage {
                url: "https://img.host/front.jpg".to_string(),
                alt: String::new(),
                order: 3,
            }],
            ..Product::default()
        };
        attach_images(
            &mut product,
            vec!["https://img.host/a.jpg".to_string(), "https://img.host/b.jpg".to_string()],
        );
        let orders: Vec<u32> = product.images.iter().map(|img| img.order).collect();
        assert_eq!(orders, vec![3, 4, 5]);
        assert_eq!(product.images[2].alt, "Linen Wrap Dress");
    }

    #[test]
    fn test_attach_images_to_empty_product() {
        let mut product = Product::default();
        attach_images(&mut product, vec!["https://img.host/a.jpg".to_string()]);
        assert_eq!(product.images[0].order, 0);
    }

    #[test]
    fn test_attach_images_saturates_at_max_order() {
        let mut product = Product {
            images: vec![ProductImage {
                url: "https://img.host/front.jpg".to_string(),
                alt: String::new(),
                order: u32::MAX,
            }],
            ..Product::default()
        };
        attach_images(
            &mut product,
            vec!["https://img.host/a.jpg".to_string(), "https://img.host/b.jpg".to_string()],
        );
        let orders: Vec<u32> = product.images.iter().map(|img| img.order).collect();
        assert_eq!(orders, vec![u32::MAX, u32::MAX, u32::MAX]);
    }
}
