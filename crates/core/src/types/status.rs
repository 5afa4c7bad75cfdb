//! Status enums for catalog entities and contact messages.
//!
//! All statuses serialize as lowercase strings, matching the values stored in
//! documents and accepted in query strings.

use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display` and `FromStr` for a lowercase string enum.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(concat!("invalid ", stringify!($name), ": {}"), other)),
                }
            }
        }
    };
}

/// Product publication status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Being edited; hidden from the storefront.
    #[default]
    Draft,
    /// Visible on the storefront.
    Published,
    /// Retired; hidden but kept for reference.
    Archived,
}

string_enum!(ProductStatus {
    Draft => "draft",
    Published => "published",
    Archived => "archived",
});

/// Category visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    #[default]
    Active,
    Inactive,
}

string_enum!(CategoryStatus {
    Active => "active",
    Inactive => "inactive",
});

/// Contact message triage status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    #[default]
    New,
    Read,
    Replied,
    Archived,
}

string_enum!(MessageStatus {
    New => "new",
    Read => "read",
    Replied => "replied",
    Archived => "archived",
});

/// Contact message priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessagePriority {
    Low,
    #[default]
    Medium,
    High,
}

string_enum!(MessagePriority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

/// Which hero section layout the home page renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeroVersion {
    /// Full-width rotating slides.
    #[default]
    Carousel,
    /// Static image grid with a single headline.
    Grid,
}

string_enum!(HeroVersion {
    Carousel => "carousel",
    Grid => "grid",
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_through_str() {
        for status in ProductStatus::ALL {
            let parsed: ProductStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, *status);
        }
        assert_eq!("Published".parse::<ProductStatus>(), Ok(ProductStatus::Published));
        assert!("live".parse::<ProductStatus>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&MessageStatus::Replied).unwrap();
        assert_eq!(json, "\"replied\"");
        let priority: MessagePriority = serde_json::from_str("\"high\"").unwrap();
        assert_eq!(priority, MessagePriority::High);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(MessagePriority::High > MessagePriority::Medium);
        assert!(MessagePriority::Medium > MessagePriority::Low);
    }
}
