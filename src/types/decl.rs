use serde::{Deserialize, Serialize};

use super::FieldType;

/// One entry of a select option list: a machine name and a display label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub name: String,
    pub label: String,
}

impl SelectOption {
    #[must_use]
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
        }
    }
}

impl From<&str> for SelectOption {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: pretty_label(name),
        }
    }
}

/// Metadata for a named, typed variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl VariableDecl {
    #[must_use]
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_owned(),
            label: pretty_label(name),
            field_type,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn numeric(name: &str) -> Self {
        Self::new(name, FieldType::Numeric)
    }

    #[must_use]
    pub fn string(name: &str) -> Self {
        Self::new(name, FieldType::String)
    }

    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    #[must_use]
    pub fn select(name: &str, options: impl IntoIterator<Item = impl Into<SelectOption>>) -> Self {
        Self::new(name, FieldType::Select).with_options(options)
    }

    #[must_use]
    pub fn select_multiple(
        name: &str,
        options: impl IntoIterator<Item = impl Into<SelectOption>>,
    ) -> Self {
        Self::new(name, FieldType::SelectMultiple).with_options(options)
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        label.clone_into(&mut self.label);
        self
    }

    #[must_use]
    pub fn with_options(
        mut self,
        options: impl IntoIterator<Item = impl Into<SelectOption>>,
    ) -> Self {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `value` names one of the declared options. An empty option list
    /// accepts anything.
    #[must_use]
    pub(crate) fn allows_option(&self, value: &str) -> bool {
        option_listed(&self.options, value)
    }
}

/// Metadata for one parameter of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
}

impl ParamDecl {
    #[must_use]
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_owned(),
            label: pretty_label(name),
            field_type,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn numeric(name: &str) -> Self {
        Self::new(name, FieldType::Numeric)
    }

    #[must_use]
    pub fn string(name: &str) -> Self {
        Self::new(name, FieldType::String)
    }

    #[must_use]
    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    #[must_use]
    pub fn select(name: &str, options: impl IntoIterator<Item = impl Into<SelectOption>>) -> Self {
        let mut decl = Self::new(name, FieldType::Select);
        decl.options = options.into_iter().map(Into::into).collect();
        decl
    }

    #[must_use]
    pub fn select_multiple(
        name: &str,
        options: impl IntoIterator<Item = impl Into<SelectOption>>,
    ) -> Self {
        let mut decl = Self::new(name, FieldType::SelectMultiple);
        decl.options = options.into_iter().map(Into::into).collect();
        decl
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        label.clone_into(&mut self.label);
        self
    }

    /// Whether `value` names one of the declared options. An empty option list
    /// accepts anything.
    #[must_use]
    pub(crate) fn allows_option(&self, value: &str) -> bool {
        option_listed(&self.options, value)
    }
}

fn option_listed(options: &[SelectOption], value: &str) -> bool {
    options.is_empty() || options.iter().any(|o| o.name == value)
}

/// Metadata for a named action and its ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDecl {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub params: Vec<ParamDecl>,
}

impl ActionDecl {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: pretty_label(name),
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: &str) -> Self {
        label.clone_into(&mut self.label);
        self
    }

    /// Append a parameter. Parameters are passed to the handler in this order.
    #[must_use]
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }
}

/// Turn a snake_case identifier into a title-cased label:
/// `current_inventory` becomes `Current Inventory`.
#[must_use]
pub fn pretty_label(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
