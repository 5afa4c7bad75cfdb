//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use elegant_closet_core::store::PgDocumentStore;
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::services::uploads::{UploadError, Uploader};

const RATES_TIMEOUT: Duration = Duration::from_secs(15);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: PgDocumentStore,
    uploader: Uploader,
    http: reqwest::Client,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: AdminConfig, store: PgDocumentStore) -> Result<Self, UploadError> {
        let uploader = Uploader::new(config.uploads.clone())?;
        let http = reqwest::Client::builder().timeout(RATES_TIMEOUT).build()?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                uploader,
                http,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &PgDocumentStore {
        &self.inner.store
    }

    #[must_use]
    pub fn uploader(&self) -> &Uploader {
        &self.inner.uploader
    }

    /// Client for the exchange-rate API.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        self.inner.store.pool()
    }
}
