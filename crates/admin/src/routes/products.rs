//! Product creation with image upload.
//!
//! `POST /api/products/upload` takes a multipart body:
//!
//! - `product` - the product JSON
//! - `host` - `chevereto` (default) or `imgbb`
//! - any number of file parts
//!
//! The product is checked before any file is sent; see
//! [`crate::services::products`].

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use elegant_closet_core::models::Product;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::services::products;
use crate::services::uploads::{ImageFile, ImageHost};
use crate::state::AppState;

/// Parsed multipart upload body.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub product: Option<String>,
    pub host: ImageHost,
    pub files: Vec<ImageFile>,
}

/// Read a multipart body into an [`UploadForm`].
///
/// # Errors
///
/// Returns `BadRequest` for a malformed body or an unknown host.
pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if let Some(file_name) = field.file_name().map(String::from) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            form.files.push(ImageFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        match name.as_str() {
            "product" => form.product = Some(text),
            "host" => form.host = text.parse().map_err(AppError::BadRequest)?,
            _ => {}
        }
    }
    Ok(form)
}

/// `POST /api/products/upload`
#[instrument(skip_all)]
pub async fn create_with_images(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>)> {
    let form = read_form(multipart).await?;
    let raw = form
        .product
        .ok_or_else(|| AppError::BadRequest("missing product field".to_string()))?;
    let product: Product = serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("invalid product: {e}")))?;

    let saved = products::create_with_images(
        state.store(),
        state.uploader(),
        product,
        form.host,
        &form.files,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub host: ImageHost,
    pub urls: Vec<String>,
}

/// `POST /api/uploads`: upload files without touching any document.
#[instrument(skip_all)]
pub async fn upload(
    _auth: RequireAdminToken,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let form = read_form(multipart).await?;
    if form.files.is_empty() {
        return Err(AppError::BadRequest("no files".to_string()));
    }
    let urls = state.uploader().upload_all(form.host, &form.files).await?;
    Ok(Json(UploadResponse {
        host: form.host,
        urls,
    }))
}
