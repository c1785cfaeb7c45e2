use std::fmt;

use serde::{Deserialize, Serialize};

use super::FieldType;

/// Comparison operators usable in a condition leaf.
///
/// Which operators are legal depends on the variable's [`FieldType`]; see
/// [`operators_for`](crate::operators_for).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Contains,
    DoesNotContain,
    MatchesRegex,
    StartsWith,
    EndsWith,
    NonEmpty,
    IsTrue,
    IsFalse,
    IsContainedBy,
    SharesAtLeastOneElementWith,
    SharesExactlyWith,
    SharesAllElementsWith,
    SharesNoElementsWith,
}

impl Operator {
    pub const ALL: [Operator; 19] = [
        Operator::EqualTo,
        Operator::NotEqualTo,
        Operator::GreaterThan,
        Operator::GreaterThanOrEqualTo,
        Operator::LessThan,
        Operator::LessThanOrEqualTo,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::MatchesRegex,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::NonEmpty,
        Operator::IsTrue,
        Operator::IsFalse,
        Operator::IsContainedBy,
        Operator::SharesAtLeastOneElementWith,
        Operator::SharesExactlyWith,
        Operator::SharesAllElementsWith,
        Operator::SharesNoElementsWith,
    ];

    /// The wire name used in rule JSON, e.g. `greater_than_or_equal_to`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Operator::EqualTo => "equal_to",
            Operator::NotEqualTo => "not_equal_to",
            Operator::GreaterThan => "greater_than",
            Operator::GreaterThanOrEqualTo => "greater_than_or_equal_to",
            Operator::LessThan => "less_than",
            Operator::LessThanOrEqualTo => "less_than_or_equal_to",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "does_not_contain",
            Operator::MatchesRegex => "matches_regex",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::NonEmpty => "non_empty",
            Operator::IsTrue => "is_true",
            Operator::IsFalse => "is_false",
            Operator::IsContainedBy => "is_contained_by",
            Operator::SharesAtLeastOneElementWith => "shares_at_least_one_element_with",
            Operator::SharesExactlyWith => "shares_exactly_with",
            Operator::SharesAllElementsWith => "shares_all_elements_with",
            Operator::SharesNoElementsWith => "shares_no_elements_with",
        }
    }

    /// Look up an operator by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Display label for authoring tools, e.g. `Greater Than Or Equal To`.
    #[must_use]
    pub fn label(self) -> String {
        super::decl::pretty_label(self.name())
    }

    /// Whether a condition using this operator must carry a `value`.
    #[must_use]
    pub fn takes_literal(self) -> bool {
        !matches!(
            self,
            Operator::IsTrue | Operator::IsFalse | Operator::NonEmpty
        )
    }

    /// The kind of literal an authoring tool should ask for, or `None` when the
    /// operator takes no literal.
    #[must_use]
    pub fn input_type(self, field_type: FieldType) -> Option<FieldType> {
        if !self.takes_literal() {
            return None;
        }
        Some(match (field_type, self) {
            (FieldType::Select, Operator::IsContainedBy) => FieldType::SelectMultiple,
            (FieldType::SelectMultiple, Operator::Contains | Operator::DoesNotContain) => {
                FieldType::Select
            }
            (FieldType::Boolean, _) => FieldType::Boolean,
            (ft, _) => ft,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
