//! Contact settings (singleton) and contact form messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Document, Singleton};
use crate::types::{Email, MessageId, MessagePriority, MessageStatus};
use crate::validation::ValidationErrors;

/// Opening hours for one day, e.g. `Monday 09:00-18:00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BusinessHours {
    pub day: String,
    #[serde(default)]
    pub open: String,
    #[serde(default)]
    pub close: String,
    #[serde(default)]
    pub closed: bool,
}

impl BusinessHours {
    /// `"09:00 - 18:00"` or `"Closed"`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.closed {
            "Closed".to_string()
        } else {
            format!("{} - {}", self.open, self.close)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
}

impl SocialLinks {
    /// `(network, url)` pairs for every configured link.
    #[must_use]
    pub fn links(&self) -> Vec<(&'static str, &str)> {
        [
            ("Facebook", &self.facebook),
            ("Instagram", &self.instagram),
            ("TikTok", &self.tiktok),
            ("YouTube", &self.youtube),
        ]
        .into_iter()
        .filter_map(|(name, url)| url.as_deref().map(|u| (name, u)))
        .collect()
    }
}

/// Store contact details (singleton `contact_settings/global`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactSettings {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phones: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub business_hours: Vec<BusinessHours>,
    #[serde(default)]
    pub social: SocialLinks,
    /// Number used for WhatsApp order links; digits only or `+94...`.
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_embed_url: Option<String>,
}

impl ContactSettings {
    /// # Errors
    ///
    /// Returns malformed email or URL fields.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.emails.iter().any(|e| Email::parse(e).is_err()) {
            errors.push("emails", "contains an invalid email address");
        }
        errors.optional_url("mapEmbedUrl", self.map_embed_url.as_deref());
        for (_, url) in self.social.links() {
            errors.optional_url("social", Some(url));
        }
        errors.into_result()
    }
}

impl Singleton for ContactSettings {
    const COLLECTION: &'static str = "contact_settings";
}

/// A message submitted through the storefront contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(default)]
    pub id: MessageId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default)]
    pub priority: MessagePriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replied_at: Option<DateTime<Utc>>,
}

impl ContactMessage {
    /// Move to a new triage status. The first transition to `replied`
    /// records `repliedAt`.
    pub fn set_status(&mut self, status: MessageStatus, now: DateTime<Utc>) {
        let now = super::timestamp(now);
        if status == MessageStatus::Replied && self.replied_at.is_none() {
            self.replied_at = Some(now);
        }
        self.status = status;
        self.updated_at = now;
    }

    /// Apply an admin triage update.
    pub fn apply(&mut self, update: &MessageUpdate, now: DateTime<Utc>) {
        if let Some(priority) = update.priority {
            self.priority = priority;
            self.updated_at = super::timestamp(now);
        }
        if let Some(status) = update.status {
            self.set_status(status, now);
        }
    }
}

impl Document for ContactMessage {
    const COLLECTION: &'static str = "contact_messages";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = MessageId::new(id);
    }
}

/// Partial update sent by `PATCH /api/messages/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    #[serde(default)]
    pub status: Option<MessageStatus>,
    #[serde(default)]
    pub priority: Option<MessagePriority>,
}

/// Contact form submission before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub message: String,
}

impl NewContactMessage {
    const MAX_MESSAGE_LEN: usize = 5000;

    /// Validate the submission and build a new, unread message.
    ///
    /// # Errors
    ///
    /// Returns every failing field.
    pub fn into_message(self, now: DateTime<Utc>) -> Result<ContactMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("message", &self.message);
        if self.message.chars().count() > Self::MAX_MESSAGE_LEN {
            errors.push("message", "is too long");
        }
        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.push("email", e.to_string());
                None
            }
        };
        let phone = self
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        if phone
            .as_deref()
            .is_some_and(|p| !p.chars().all(|c| c.is_ascii_digit() || "+-() ".contains(c)))
        {
            errors.push("phone", "may only contain digits, spaces and + - ( )");
        }
        errors.into_result()?;

        let Some(email) = email else {
            return Err(ValidationErrors::new());
        };
        let now = super::timestamp(now);
        Ok(ContactMessage {
            id: MessageId::default(),
            name: self.name.trim().to_string(),
            email,
            phone,
            subject: self.subject.trim().to_string(),
            message: self.message.trim().to_string(),
            status: MessageStatus::New,
            priority: MessagePriority::default(),
            created_at: now,
            updated_at: now,
            replied_at: None,
        })
    }
}
