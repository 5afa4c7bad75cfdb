//! Unified error handling for admin.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use elegant_closet_core::store::StoreError;
use elegant_closet_core::validation::ValidationErrors;
use serde_json::json;
use thiserror::Error;

use crate::services::documents::DocumentError;
use crate::services::products::ProductUploadError;
use crate::services::rates::RatesError;
use crate::services::uploads::UploadError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Document store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A document or form failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Admin write rejected or failed.
    #[error(transparent)]
    Document(DocumentError),

    /// Image upload failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// Exchange-rate refresh failed.
    #[error("Rates error: {0}")]
    Rates(#[from] RatesError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or wrong bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::Store(err) => Self::Store(err),
            DocumentError::Validation(errors) => Self::Validation(errors),
            other => Self::Document(other),
        }
    }
}

impl From<ProductUploadError> for AppError {
    fn from(err: ProductUploadError) -> Self {
        match err {
            ProductUploadError::Document(err) => err.into(),
            ProductUploadError::Upload(err) => Self::Upload(err),
        }
    }
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => match err {
                StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                StoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
                StoreError::InvalidCursor(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Document(_) => StatusCode::CONFLICT,
            Self::Upload(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::Upload(UploadError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upload(_) | Self::Rates(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server and upstream errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let body = match &self {
            Self::Validation(errors) => json!({ "error": "validation failed", "fields": errors }),
            Self::Store(_) if status.is_server_error() => json!({ "error": "Internal server error" }),
            Self::Internal(_) => json!({ "error": "Internal server error" }),
            Self::Upload(_) | Self::Rates(_) if status.is_server_error() => {
                json!({ "error": "External service error", "detail": self.to_string() })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::uploads::ImageHost;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("products/abc".to_string());
        assert_eq!(err.to_string(), "Not found: products/abc");
    }

    #[test]
    fn test_document_errors_unwrap_to_their_kind() {
        let err = AppError::from(DocumentError::Store(StoreError::NotFound {
            collection: "products".to_string(),
            id: "x".to_string(),
        }));
        assert_eq!(get_status(err), StatusCode::NOT_FOUND);
        let err = AppError::from(DocumentError::SlugTaken {
            collection: "products",
            slug: "wrap".to_string(),
            id: "p1".to_string(),
        });
        assert_eq!(get_status(err), StatusCode::CONFLICT);
    }

    #[test]
    fn test_product_upload_errors_map_to_their_kind() {
        let mut errors = ValidationErrors::new();
        errors.push("salePrice", "must be lower than price");
        let err = AppError::from(ProductUploadError::Document(DocumentError::Validation(errors)));
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
        let err = AppError::from(ProductUploadError::Upload(UploadError::Rejected {
            status: 500,
            body: String::new(),
        }));
        assert_eq!(get_status(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::Store(StoreError::NotFound {
                collection: "faqs".to_string(),
                id: "x".to_string(),
            })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::Backend("down".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Upload(UploadError::TooLarge {
                name: "a.jpg".to_string(),
                size: 6_000_000,
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Upload(UploadError::NotConfigured(ImageHost::Imgbb))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Rates(RatesError::Rejected(500))),
            StatusCode::BAD_GATEWAY
        );
    }
}
