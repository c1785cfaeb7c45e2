use std::collections::HashMap;
use std::fmt;

use super::decl::{SelectOption, VariableDecl};
use super::error::{BoxError, RuleError};
use super::Value;

/// Source of named, typed values for one subject.
///
/// The engine only talks to this trait. Most hosts build a [`VariableSet`] once
/// per subject type and [`bind`](VariableSet::bind) it to each subject; types
/// that already know their variables can implement the trait directly.
///
/// `value` may be expensive. The runner calls it at most once per variable per
/// pass and caches the result, so implementations need no caching of their own.
pub trait VariableProvider {
    /// Every declared variable, in declaration order.
    fn declarations(&self) -> &[VariableDecl];

    fn declaration(&self, name: &str) -> Option<&VariableDecl> {
        self.declarations().iter().find(|d| d.name == name)
    }

    /// Compute the current value of a declared variable.
    ///
    /// # Errors
    ///
    /// Any error is reported as
    /// [`RuleError::VariableEvaluation`] and fails the rule that needed it.
    fn value(&self, name: &str) -> Result<Value, BoxError>;
}

type Accessor<S> = Box<dyn Fn(&S) -> Result<Value, BoxError> + Send + Sync>;

/// Declaration table mapping variable names to typed accessors over `S`.
///
/// Built once per subject type and immutable afterwards; it is `Send + Sync`
/// and can live in a `static`.
///
/// # Example
///
/// ```
/// use rulebook::{VariableProvider, VariableSet, Value};
///
/// struct Product {
///     current_inventory: i64,
/// }
///
/// let variables = VariableSet::<Product>::builder()
///     .numeric("current_inventory", |p| p.current_inventory)
///     .build()
///     .unwrap();
///
/// let product = Product { current_inventory: 30 };
/// let bound = variables.bind(&product);
/// assert_eq!(bound.value("current_inventory").unwrap(), Value::Int(30));
/// ```
pub struct VariableSet<S> {
    decls: Vec<VariableDecl>,
    index: HashMap<String, usize>,
    accessors: Vec<Accessor<S>>,
}

impl<S> VariableSet<S> {
    #[must_use]
    pub fn builder() -> VariableSetBuilder<S> {
        VariableSetBuilder::new()
    }

    #[must_use]
    pub fn declarations(&self) -> &[VariableDecl] {
        &self.decls
    }

    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&VariableDecl> {
        self.index.get(name).map(|&idx| &self.decls[idx])
    }

    /// Bind the table to one subject for evaluation.
    #[must_use]
    pub fn bind<'a>(&'a self, subject: &'a S) -> SubjectVariables<'a, S> {
        SubjectVariables { set: self, subject }
    }
}

impl<S> fmt::Debug for VariableSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableSet")
            .field("decls", &self.decls)
            .finish_non_exhaustive()
    }
}

/// Builder for [`VariableSet`]. Declaration order is preserved.
pub struct VariableSetBuilder<S> {
    decls: Vec<VariableDecl>,
    accessors: Vec<Accessor<S>>,
}

impl<S> Default for VariableSetBuilder<S> {
    fn default() -> Self {
        Self {
            decls: Vec::new(),
            accessors: Vec::new(),
        }
    }
}

impl<S> VariableSetBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable with an infallible accessor.
    #[must_use]
    pub fn variable<V, F>(self, decl: VariableDecl, accessor: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.try_variable(decl, move |subject| Ok(accessor(subject).into()))
    }

    /// Declare a variable whose accessor can fail. Prefer returning a declared
    /// default for missing data; reserve errors for genuine failures.
    #[must_use]
    pub fn try_variable<F>(mut self, decl: VariableDecl, accessor: F) -> Self
    where
        F: Fn(&S) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.decls.push(decl);
        self.accessors.push(Box::new(accessor));
        self
    }

    #[must_use]
    pub fn numeric<V, F>(self, name: &str, accessor: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.variable(VariableDecl::numeric(name), accessor)
    }

    #[must_use]
    pub fn string<V, F>(self, name: &str, accessor: F) -> Self
    where
        V: Into<Value>,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.variable(VariableDecl::string(name), accessor)
    }

    #[must_use]
    pub fn boolean<F>(self, name: &str, accessor: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.variable(VariableDecl::boolean(name), accessor)
    }

    #[must_use]
    pub fn select<V, F>(
        self,
        name: &str,
        options: impl IntoIterator<Item = impl Into<SelectOption>>,
        accessor: F,
    ) -> Self
    where
        V: Into<Value>,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.variable(VariableDecl::select(name, options), accessor)
    }

    #[must_use]
    pub fn select_multiple<V, F>(
        self,
        name: &str,
        options: impl IntoIterator<Item = impl Into<SelectOption>>,
        accessor: F,
    ) -> Self
    where
        V: Into<Value>,
        F: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.variable(VariableDecl::select_multiple(name, options), accessor)
    }

    /// Freeze the table.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateDeclaration`] if two variables share a name.
    pub fn build(self) -> Result<VariableSet<S>, RuleError> {
        let index = index_names(self.decls.iter().map(|d| d.name.as_str()))?;
        Ok(VariableSet {
            decls: self.decls,
            index,
            accessors: self.accessors,
        })
    }
}

pub(crate) fn index_names<'a>(
    names: impl Iterator<Item = &'a str>,
) -> Result<HashMap<String, usize>, RuleError> {
    let mut index = HashMap::new();
    for (i, name) in names.enumerate() {
        if index.insert(name.to_owned(), i).is_some() {
            return Err(RuleError::DuplicateDeclaration {
                name: name.to_owned(),
            });
        }
    }
    Ok(index)
}

/// A [`VariableSet`] bound to one subject. Implements [`VariableProvider`].
pub struct SubjectVariables<'a, S> {
    set: &'a VariableSet<S>,
    subject: &'a S,
}

impl<S> VariableProvider for SubjectVariables<'_, S> {
    fn declarations(&self) -> &[VariableDecl] {
        self.set.declarations()
    }

    fn declaration(&self, name: &str) -> Option<&VariableDecl> {
        self.set.declaration(name)
    }

    fn value(&self, name: &str) -> Result<Value, BoxError> {
        let idx = *self
            .set
            .index
            .get(name)
            .ok_or_else(|| format!("undeclared variable '{name}'"))?;
        (self.set.accessors[idx])(self.subject)
    }
}

impl<S> fmt::Debug for SubjectVariables<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubjectVariables")
            .field("variables", &self.set.decls.len())
            .finish_non_exhaustive()
    }
}
