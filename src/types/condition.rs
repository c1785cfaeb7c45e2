use std::fmt;

use super::{Operator, Value};

/// A node of a condition tree.
///
/// Built with [`var()`], [`all()`] and [`any()`], or converted from JSON with
/// [`Condition::from_json`](crate::Condition::from_json).
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// True iff every child is true. An empty group is true.
    All(Vec<Condition>),
    /// True iff at least one child is true. An empty group is false.
    Any(Vec<Condition>),
    /// A single comparison of a variable against a literal.
    Leaf(Leaf),
}

/// `{name, operator, value}`: compare variable `name` against `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub name: String,
    pub operator: Operator,
    /// Absent for operators that take no literal, such as `is_true`.
    pub value: Option<Value>,
}

impl Condition {
    /// Visit every leaf in depth-first, left-to-right order.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        collect_leaves(self, &mut out);
        out
    }
}

fn collect_leaves<'a>(condition: &'a Condition, out: &mut Vec<&'a Leaf>) {
    match condition {
        Condition::All(children) | Condition::Any(children) => {
            for child in children {
                collect_leaves(child, out);
            }
        }
        Condition::Leaf(leaf) => out.push(leaf),
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::All(children) => write_group(f, "ALL", children),
            Condition::Any(children) => write_group(f, "ANY", children),
            Condition::Leaf(leaf) => write!(f, "{leaf}"),
        }
    }
}

fn write_group(f: &mut fmt::Formatter<'_>, keyword: &str, children: &[Condition]) -> fmt::Result {
    write!(f, "{keyword}(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{child}")?;
    }
    f.write_str(")")
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "({} {} {value})", self.name, self.operator),
            None => write!(f, "({} {})", self.name, self.operator),
        }
    }
}

impl From<Leaf> for Condition {
    fn from(leaf: Leaf) -> Self {
        Condition::Leaf(leaf)
    }
}

/// Intermediate builder for leaf conditions.
/// Created by [`var()`]; requires an operator method to produce a [`Condition`].
#[derive(Debug, Clone)]
pub struct VariableExpr {
    name: String,
}

impl VariableExpr {
    /// Build a leaf with any operator. The typed shortcuts below cover the
    /// common cases.
    #[must_use]
    pub fn op(self, operator: Operator, value: Option<Value>) -> Condition {
        Condition::Leaf(Leaf {
            name: self.name,
            operator,
            value,
        })
    }

    fn with(self, operator: Operator, value: impl Into<Value>) -> Condition {
        self.op(operator, Some(value.into()))
    }

    #[must_use]
    pub fn equal_to(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::EqualTo, value)
    }

    #[must_use]
    pub fn not_equal_to(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::NotEqualTo, value)
    }

    #[must_use]
    pub fn greater_than(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::GreaterThan, value)
    }

    #[must_use]
    pub fn greater_than_or_equal_to(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::GreaterThanOrEqualTo, value)
    }

    #[must_use]
    pub fn less_than(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::LessThan, value)
    }

    #[must_use]
    pub fn less_than_or_equal_to(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::LessThanOrEqualTo, value)
    }

    #[must_use]
    pub fn contains(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::Contains, value)
    }

    #[must_use]
    pub fn does_not_contain(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::DoesNotContain, value)
    }

    #[must_use]
    pub fn matches_regex(self, pattern: &str) -> Condition {
        self.with(Operator::MatchesRegex, pattern)
    }

    #[must_use]
    pub fn starts_with(self, prefix: &str) -> Condition {
        self.with(Operator::StartsWith, prefix)
    }

    #[must_use]
    pub fn ends_with(self, suffix: &str) -> Condition {
        self.with(Operator::EndsWith, suffix)
    }

    #[must_use]
    pub fn non_empty(self) -> Condition {
        self.op(Operator::NonEmpty, None)
    }

    #[must_use]
    pub fn is_true(self) -> Condition {
        self.op(Operator::IsTrue, None)
    }

    #[must_use]
    pub fn is_false(self) -> Condition {
        self.op(Operator::IsFalse, None)
    }

    #[must_use]
    pub fn is_contained_by(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::IsContainedBy, value)
    }

    #[must_use]
    pub fn shares_at_least_one_element_with(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::SharesAtLeastOneElementWith, value)
    }

    #[must_use]
    pub fn shares_exactly_with(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::SharesExactlyWith, value)
    }

    #[must_use]
    pub fn shares_all_elements_with(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::SharesAllElementsWith, value)
    }

    #[must_use]
    pub fn shares_no_elements_with(self, value: impl Into<Value>) -> Condition {
        self.with(Operator::SharesNoElementsWith, value)
    }
}

#[must_use]
pub fn var(name: &str) -> VariableExpr {
    VariableExpr {
        name: name.to_owned(),
    }
}

#[must_use]
pub fn all(children: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::All(children.into_iter().collect())
}

#[must_use]
pub fn any(children: impl IntoIterator<Item = Condition>) -> Condition {
    Condition::Any(children.into_iter().collect())
}
