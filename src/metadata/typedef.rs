//! Type definitions and their methods.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    metadata::{
        method::{MethodDef, MethodDefRc},
        token::Token,
    },
    Result,
};

/// A reference-counted pointer to a [`TypeDef`]
pub type TypeDefRc = Arc<TypeDef>;

/// A type definition.
///
/// Methods keep their declaration order, which is the order the locator scans them in.
/// Nested types are owned by their enclosing type; [`crate::ModuleDef::types`] flattens
/// them into the traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    /// `TypeDef` token identifying this type
    pub token: Token,
    /// Namespace, empty for the global namespace and for nested types
    #[serde(default)]
    pub namespace: String,
    /// Type name, informational only
    #[serde(default)]
    pub name: String,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDefRc>,
    /// Nested types in declaration order
    #[serde(default)]
    pub nested_types: Vec<TypeDefRc>,
}

impl TypeDef {
    /// Returns a builder for a new type definition
    #[must_use]
    pub fn builder() -> TypeDefBuilder {
        TypeDefBuilder::new()
    }

    /// Namespace-qualified name
    #[must_use]
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Looks up a method of this type by token
    #[must_use]
    pub fn method(&self, token: Token) -> Option<&MethodDefRc> {
        self.methods.iter().find(|method| method.token == token)
    }
}

/// Builder for [`TypeDef`].
#[derive(Debug, Clone, Default)]
pub struct TypeDefBuilder {
    token: Option<Token>,
    namespace: Option<String>,
    name: Option<String>,
    methods: Vec<MethodDefRc>,
    nested_types: Vec<TypeDefRc>,
}

impl TypeDefBuilder {
    /// Creates an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type token (required)
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the namespace
    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Sets the type name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a method
    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    /// Appends a nested type
    #[must_use]
    pub fn nested(mut self, nested: TypeDef) -> Self {
        self.nested_types.push(Arc::new(nested));
        self
    }

    /// Builds the type definition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if no token was set, the token is null, or two
    /// methods share a token.
    pub fn build(self) -> Result<TypeDef> {
        let token = self
            .token
            .ok_or_else(|| malformed_error!("TypeDef requires a token"))?;
        if token.is_null() {
            return Err(malformed_error!("TypeDef token cannot be null"));
        }

        for (index, method) in self.methods.iter().enumerate() {
            if self.methods[..index]
                .iter()
                .any(|other| other.token == method.token)
            {
                return Err(malformed_error!(
                    "TypeDef {} declares method {} twice",
                    token,
                    method.token
                ));
            }
        }

        Ok(TypeDef {
            token,
            namespace: self.namespace.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            methods: self.methods,
            nested_types: self.nested_types,
        })
    }
}
