//! Set view over the local variable types of a method.

use std::collections::HashSet;

use crate::metadata::method::MethodDef;

/// The distinct declared types of a method's locals.
///
/// Only presence matters: order and multiplicity of the underlying locals are discarded.
/// A method without locals yields an empty set, for which [`LocalTypes::all`] holds only
/// against an empty requirement.
#[derive(Debug, Clone, Default)]
pub struct LocalTypes<'a> {
    types: HashSet<&'a str>,
}

impl<'a> LocalTypes<'a> {
    /// Collects the local types of `method`
    #[must_use]
    pub fn new(method: &'a MethodDef) -> Self {
        Self {
            types: method.locals.iter().map(String::as_str).collect(),
        }
    }

    /// Returns true if a local of type `full_name` is declared
    #[must_use]
    pub fn exists(&self, full_name: &str) -> bool {
        self.types.contains(full_name)
    }

    /// Returns true if every name in `full_names` is declared at least once.
    ///
    /// Locals not listed in `full_names` are ignored.
    #[must_use]
    pub fn all<S: AsRef<str>>(&self, full_names: &[S]) -> bool {
        full_names.iter().all(|name| self.exists(name.as_ref()))
    }

    /// Returns the names from `full_names` that are not declared
    #[must_use]
    pub fn missing<'n, S: AsRef<str>>(&self, full_names: &'n [S]) -> Vec<&'n str> {
        full_names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name: &&str| !self.exists(name))
            .collect()
    }

    /// Number of distinct local types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the method declares no locals
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
