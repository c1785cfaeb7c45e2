use std::collections::HashMap;
use std::fmt;

use super::decl::ActionDecl;
use super::error::{BoxError, RuleError};
use super::variables::index_names;
use super::Value;

/// Target of the actions a rule triggers.
///
/// The engine validates and coerces parameters against
/// [`declarations`](Self::declarations) before calling
/// [`invoke`](Self::invoke), so implementations receive complete, typed
/// [`Params`].
pub trait ActionProvider {
    /// Every declared action, in declaration order.
    fn declarations(&self) -> &[ActionDecl];

    fn declaration(&self, name: &str) -> Option<&ActionDecl> {
        self.declarations().iter().find(|d| d.name == name)
    }

    /// Run a declared action.
    ///
    /// # Errors
    ///
    /// Any error is reported as [`RuleError::ActionFailed`]. The engine does not
    /// retry.
    fn invoke(&mut self, name: &str, params: &Params) -> Result<(), BoxError>;
}

/// Validated action parameters, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Vec<(String, Value)>,
}

impl Params {
    pub(crate) fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_number)
    }

    #[must_use]
    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    #[must_use]
    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type Handler<T> = Box<dyn Fn(&mut T, &Params) -> Result<(), BoxError> + Send + Sync>;

/// Declaration table mapping action names to handlers over a target `T`.
///
/// Built once per target type; `Send + Sync`.
pub struct ActionSet<T> {
    decls: Vec<ActionDecl>,
    index: HashMap<String, usize>,
    handlers: Vec<Handler<T>>,
}

impl<T> ActionSet<T> {
    #[must_use]
    pub fn builder() -> ActionSetBuilder<T> {
        ActionSetBuilder::new()
    }

    #[must_use]
    pub fn declarations(&self) -> &[ActionDecl] {
        &self.decls
    }

    #[must_use]
    pub fn declaration(&self, name: &str) -> Option<&ActionDecl> {
        self.index.get(name).map(|&idx| &self.decls[idx])
    }

    /// Bind the table to one target for a run.
    pub fn bind<'a>(&'a self, target: &'a mut T) -> TargetActions<'a, T> {
        TargetActions { set: self, target }
    }
}

impl<T> fmt::Debug for ActionSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionSet")
            .field("decls", &self.decls)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ActionSet`].
pub struct ActionSetBuilder<T> {
    decls: Vec<ActionDecl>,
    handlers: Vec<Handler<T>>,
}

impl<T> Default for ActionSetBuilder<T> {
    fn default() -> Self {
        Self {
            decls: Vec::new(),
            handlers: Vec::new(),
        }
    }
}

impl<T> ActionSetBuilder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an action and its handler.
    #[must_use]
    pub fn action<F>(mut self, decl: ActionDecl, handler: F) -> Self
    where
        F: Fn(&mut T, &Params) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.decls.push(decl);
        self.handlers.push(Box::new(handler));
        self
    }

    /// Freeze the table.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::DuplicateDeclaration`] if two actions share a name.
    pub fn build(self) -> Result<ActionSet<T>, RuleError> {
        let index = index_names(self.decls.iter().map(|d| d.name.as_str()))?;
        Ok(ActionSet {
            decls: self.decls,
            index,
            handlers: self.handlers,
        })
    }
}

/// An [`ActionSet`] bound to one target. Implements [`ActionProvider`].
pub struct TargetActions<'a, T> {
    set: &'a ActionSet<T>,
    target: &'a mut T,
}

impl<T> ActionProvider for TargetActions<'_, T> {
    fn declarations(&self) -> &[ActionDecl] {
        self.set.declarations()
    }

    fn declaration(&self, name: &str) -> Option<&ActionDecl> {
        self.set.declaration(name)
    }

    fn invoke(&mut self, name: &str, params: &Params) -> Result<(), BoxError> {
        let idx = *self
            .set
            .index
            .get(name)
            .ok_or_else(|| format!("undeclared action '{name}'"))?;
        (self.set.handlers[idx])(&mut *self.target, params)
    }
}

impl<T> fmt::Debug for TargetActions<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TargetActions")
            .field("actions", &self.set.decls.len())
            .finish_non_exhaustive()
    }
}
