//! Color and size options offered in the product editor.

use serde::{Deserialize, Serialize};

use crate::store::Document;
use crate::types::{ColorId, SizeId};
use crate::validation::{ValidationErrors, is_valid_hex_color};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    #[serde(default)]
    pub id: ColorId,
    pub name: String,
    /// `#rgb` or `#rrggbb`.
    pub hex: String,
}

impl Document for ColorOption {
    const COLLECTION: &'static str = "colors";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = ColorId::new(id);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        if !is_valid_hex_color(&self.hex) {
            errors.push("hex", "must be a #rgb or #rrggbb color");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SizeOption {
    #[serde(default)]
    pub id: SizeId,
    /// Short code stored on products, e.g. `M` or `UK10`.
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub order: i64,
}

impl Document for SizeOption {
    const COLLECTION: &'static str = "sizes";

    fn id(&self) -> &str {
        self.id.as_str()
    }

    fn set_id(&mut self, id: String) {
        self.id = SizeId::new(id);
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("code", &self.code);
        if self.code.chars().any(char::is_whitespace) {
            errors.push("code", "cannot contain spaces");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_validation() {
        let mut color = ColorOption {
            name: "Crimson".to_string(),
            hex: "#DC143C".to_string(),
            ..ColorOption::default()
        };
        assert!(color.validate().is_ok());
        color.hex = "crimson".to_string();
        assert!(color.validate().is_err());
    }

    #[test]
    fn test_size_code_rejects_spaces() {
        let size = SizeOption {
            code: "X L".to_string(),
            ..SizeOption::default()
        };
        assert!(size.validate().is_err());
    }
}
