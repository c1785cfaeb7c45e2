use std::fmt;

use serde::{Deserialize, Serialize};

/// The semantic type of a variable or action parameter.
///
/// Determines which operators are legal in a condition and how a literal is
/// coerced before it reaches an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Numeric,
    #[serde(alias = "text")]
    String,
    Boolean,
    Select,
    SelectMultiple,
}

impl FieldType {
    pub const ALL: [FieldType; 5] = [
        FieldType::Numeric,
        FieldType::String,
        FieldType::Boolean,
        FieldType::Select,
        FieldType::SelectMultiple,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FieldType::Numeric => "numeric",
            FieldType::String => "string",
            FieldType::Boolean => "boolean",
            FieldType::Select => "select",
            FieldType::SelectMultiple => "select_multiple",
        }
    }

    /// Whether declarations of this type carry a fixed option list.
    #[must_use]
    pub fn has_options(self) -> bool {
        matches!(self, FieldType::Select | FieldType::SelectMultiple)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
