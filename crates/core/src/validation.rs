//! Field-level validation for documents and form submissions.
//!
//! Validation collects every failing field instead of stopping at the first,
//! so a form can highlight all problems at once.

use serde::Serialize;

/// A single failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field name as it appears in the submitted JSON.
    pub field: &'static str,
    /// Human-readable message.
    pub message: String,
}

/// All validation failures for one document or form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{}", format_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn format_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "no validation errors".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Create an empty error set.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failing field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Whether no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The recorded failures.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether a given field has failed.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Require a non-blank string.
    pub fn require(&mut self, field: &'static str, value: &str) {
        if value.trim().is_empty() {
            self.push(field, "is required");
        }
    }

    /// Require a valid slug.
    pub fn require_slug(&mut self, field: &'static str, value: &str) {
        if !is_valid_slug(value) {
            self.push(
                field,
                "must be lowercase letters, digits and single hyphens",
            );
        }
    }

    /// Require an absolute http(s) URL.
    pub fn require_url(&mut self, field: &'static str, value: &str) {
        if !is_valid_url(value) {
            self.push(field, "must be an absolute http(s) URL");
        }
    }

    /// Check an optional URL, ignoring `None` and blank values.
    pub fn optional_url(&mut self, field: &'static str, value: Option<&str>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.require_url(field, url);
        }
    }
}

/// Whether `s` is a URL slug: `a-z`, `0-9` and single inner hyphens.
#[must_use]
pub fn is_valid_slug(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Turn a display name into a slug, e.g. `"Summer Dresses!"` → `"summer-dresses"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Whether `s` parses as an absolute `http` or `https` URL with a host.
#[must_use]
pub fn is_valid_url(s: &str) -> bool {
    url::Url::parse(s.trim())
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// Whether `s` is a `#rgb` or `#rrggbb` hex color.
#[must_use]
pub fn is_valid_hex_color(s: &str) -> bool {
    s.strip_prefix('#').is_some_and(|hex| {
        matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
    })
}
