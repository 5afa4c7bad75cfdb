//! Business logic services for admin.
//!
//! # Services
//!
//! - `documents` - Validated writes over the managed collections
//! - `messages` - Contact message triage
//! - `dashboard` - Catalog health summary
//! - `products` - Product creation with hosted images
//! - `uploads` - Image upload to Chevereto or ImgBB
//! - `rates` - Exchange-rate refresh

pub mod dashboard;
pub mod documents;
pub mod messages;
pub mod products;
pub mod rates;
pub mod uploads;

pub use documents::{DocumentError, Managed};
pub use products::ProductUploadError;
pub use rates::RatesError;
pub use uploads::{ImageFile, ImageHost, UploadError, Uploader};
