//! Image uploads to third-party hosts.
//!
//! Two interchangeable hosts, chosen per request:
//!
//! - Chevereto-compatible: `POST <endpoint>` multipart `key`, `source`,
//!   `format=json`; the URL is at `image.url`.
//! - ImgBB-style: `POST <endpoint>?key=<key>` multipart `image`; the URL is
//!   at `data.url`.
//!
//! Files are checked locally (size and type) before anything is sent.
//! There are no retries.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::try_join_all;
use reqwest::multipart::{Form, Part};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::{ImageHostConfig, UploadConfig};

/// Largest accepted file (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Accepted content types.
pub const ALLOWED_CONTENT_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/webp", "image/gif"];

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the upload path.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{name} is empty")]
    Empty { name: String },

    #[error("{name} is {size} bytes, the limit is {MAX_UPLOAD_BYTES}")]
    TooLarge { name: String, size: usize },

    #[error("{name} has unsupported type {content_type}")]
    UnsupportedType { name: String, content_type: String },

    #[error("image host {0} is not configured")]
    NotConfigured(ImageHost),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected image host response: {0}")]
    Parse(String),
}

impl UploadError {
    /// Whether the file itself was rejected before any request was made.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Empty { .. } | Self::TooLarge { .. } | Self::UnsupportedType { .. }
        )
    }
}

/// Which host to upload to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageHost {
    #[default]
    Chevereto,
    Imgbb,
}

impl ImageHost {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chevereto => "chevereto",
            Self::Imgbb => "imgbb",
        }
    }
}

impl std::fmt::Display for ImageHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageHost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chevereto" => Ok(Self::Chevereto),
            "imgbb" => Ok(Self::Imgbb),
            other => Err(format!("unknown image host: {other}")),
        }
    }
}

/// A file received from the admin client.
#[derive(Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageFile {
    /// Size and type guard.
    ///
    /// # Errors
    ///
    /// Returns the first rule the file breaks.
    pub fn check(&self) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Empty {
                name: self.file_name.clone(),
            });
        }
        if self.bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadError::TooLarge {
                name: self.file_name.clone(),
                size: self.bytes.len(),
            });
        }
        let content_type = self.content_type.to_ascii_lowercase();
        if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(UploadError::UnsupportedType {
                name: self.file_name.clone(),
                content_type: self.content_type.clone(),
            });
        }
        Ok(())
    }

    fn part(&self) -> Result<Part, UploadError> {
        Ok(Part::bytes(self.bytes.clone())
            .file_name(self.file_name.clone())
            .mime_str(&self.content_type)?)
    }
}

/// Pull the hosted URL out of a host response.
///
/// # Errors
///
/// Returns `Parse` if the URL field is missing.
pub fn hosted_url(host: ImageHost, body: &Value) -> Result<String, UploadError> {
    let pointer = match host {
        ImageHost::Chevereto => "/image/url",
        ImageHost::Imgbb => "/data/url",
    };
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(|| UploadError::Parse(format!("{host} response has no {pointer}")))
}

/// Upload client.
#[derive(Clone)]
pub struct Uploader {
    inner: Arc<UploaderInner>,
}

struct UploaderInner {
    client: reqwest::Client,
    config: UploadConfig,
}

impl Uploader {
    /// Create an uploader with the 30 second request timeout.
    ///
    /// # Errors
    ///
    /// Returns `Http` if the client cannot be built.
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder().timeout(UPLOAD_TIMEOUT).build()?;
        Ok(Self {
            inner: Arc::new(UploaderInner { client, config }),
        })
    }

    /// Hosts that have credentials.
    #[must_use]
    pub fn available(&self) -> Vec<ImageHost> {
        let config = &self.inner.config;
        [
            (ImageHost::Chevereto, config.chevereto.is_some()),
            (ImageHost::Imgbb, config.imgbb.is_some()),
        ]
        .into_iter()
        .filter_map(|(host, ok)| ok.then_some(host))
        .collect()
    }

    fn host_config(&self, host: ImageHost) -> Result<&ImageHostConfig, UploadError> {
        let config = &self.inner.config;
        match host {
            ImageHost::Chevereto => config.chevereto.as_ref(),
            ImageHost::Imgbb => config.imgbb.as_ref(),
        }
        .ok_or(UploadError::NotConfigured(host))
    }

    /// Upload one file and return its hosted URL.
    ///
    /// # Errors
    ///
    /// Returns a guard failure, a transport error, or the host's rejection.
    #[instrument(skip(self, file), fields(file = %file.file_name, size = file.bytes.len()))]
    pub async fn upload(&self, host: ImageHost, file: &ImageFile) -> Result<String, UploadError> {
        file.check()?;
        let config = self.host_config(host)?;
        let key = config.api_key.expose_secret();

        let request = match host {
            ImageHost::Chevereto => {
                let form = Form::new()
                    .text("key", key.to_string())
                    .text("format", "json")
                    .part("source", file.part()?);
                self.inner.client.post(&config.endpoint).multipart(form)
            }
            ImageHost::Imgbb => {
                let mut endpoint = url::Url::parse(&config.endpoint)
                    .map_err(|e| UploadError::Parse(format!("bad endpoint: {e}")))?;
                endpoint.query_pairs_mut().append_pair("key", key);
                let form = Form::new().part("image", file.part()?);
                self.inner.client.post(endpoint).multipart(form)
            }
        };

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%host, status = status.as_u16(), "Image host rejected upload");
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let url = hosted_url(host, &body)?;
        info!(%host, %url, "Image uploaded");
        Ok(url)
    }

    /// Upload every file concurrently, in input order.
    ///
    /// All files are checked before any request is made, and the first
    /// failure fails the whole batch.
    ///
    /// # Errors
    ///
    /// Returns the first guard or upload failure.
    pub async fn upload_all(
        &self,
        host: ImageHost,
        files: &[ImageFile],
    ) -> Result<Vec<String>, UploadError> {
        for file in files {
            file.check()?;
        }
        self.host_config(host)?;
        try_join_all(files.iter().map(|file| self.upload(host, file))).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;
    use serde_json::json;

    use super::*;

    fn file(content_type: &str, len: usize) -> ImageFile {
        ImageFile {
            file_name: "dress.jpg".to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0; len],
        }
    }

    #[test]
    fn test_guard() {
        assert!(file("image/jpeg", 1024).check().is_ok());
        assert!(file("IMAGE/PNG", MAX_UPLOAD_BYTES).check().is_ok());
        assert!(matches!(
            file("image/jpeg", MAX_UPLOAD_BYTES + 1).check(),
            Err(UploadError::TooLarge { .. })
        ));
        assert!(matches!(
            file("application/pdf", 10).check(),
            Err(UploadError::UnsupportedType { .. })
        ));
        assert!(matches!(
            file("image/gif", 0).check(),
            Err(UploadError::Empty { .. })
        ));
    }

    #[test]
    fn test_hosted_url() {
        let chevereto = json!({"status_code": 200, "image": {"url": "https://img.host/a.jpg"}});
        assert_eq!(
            hosted_url(ImageHost::Chevereto, &chevereto).unwrap(),
            "https://img.host/a.jpg"
        );
        let imgbb = json!({"data": {"url": "https://i.ibb.co/b.jpg"}, "success": true});
        assert_eq!(
            hosted_url(ImageHost::Imgbb, &imgbb).unwrap(),
            "https://i.ibb.co/b.jpg"
        );
        assert!(matches!(
            hosted_url(ImageHost::Imgbb, &chevereto),
            Err(UploadError::Parse(_))
        ));
    }

    #[test]
    fn test_image_host_from_str() {
        assert_eq!("ImgBB".parse::<ImageHost>().unwrap(), ImageHost::Imgbb);
        assert_eq!(" chevereto ".parse::<ImageHost>().unwrap(), ImageHost::Chevereto);
        assert!("flickr".parse::<ImageHost>().is_err());
    }

    #[tokio::test]
    async fn test_batch_rejects_before_sending() {
        let uploader = Uploader::new(UploadConfig {
            chevereto: None,
            imgbb: Some(ImageHostConfig {
                endpoint: "http://127.0.0.1:9/upload".to_string(),
                api_key: SecretString::from("k"),
            }),
        })
        .unwrap();
        assert_eq!(uploader.available(), vec![ImageHost::Imgbb]);

        let files = vec![file("image/jpeg", 10), file("text/plain", 10)];
        let err = uploader.upload_all(ImageHost::Imgbb, &files).await.unwrap_err();
        assert!(err.is_client_error());

        let err = uploader
            .upload_all(ImageHost::Chevereto, &[file("image/jpeg", 10)])
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured(ImageHost::Chevereto)));
    }
}
