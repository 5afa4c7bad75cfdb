//! Composite index file check.
//!
//! ```bash
//! ec-cli indexes catalog.indexes.json
//! ```
//!
//! Parses the file the servers load at startup and lists every index, so a
//! typo is caught before a deploy silently degrades sorted listings.

use std::path::Path;

use elegant_closet_core::store::{IndexFileError, IndexRegistry};
use tracing::{info, warn};

/// Parse and summarize an index file.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed.
pub fn check(path: &Path) -> Result<IndexRegistry, IndexFileError> {
    let json = std::fs::read_to_string(path)?;
    let registry = IndexRegistry::from_json(&json)?;

    if registry.indexes().is_empty() {
        warn!(path = %path.display(), "Index file has no indexes");
    }
    for index in registry.indexes() {
        let fields: Vec<&str> = index.fields.iter().map(|f| f.field_path.as_str()).collect();
        info!(collection = %index.collection_group, fields = ?fields, "Index");
    }
    info!(count = registry.indexes().len(), "Index file is valid");
    Ok(registry)
}
