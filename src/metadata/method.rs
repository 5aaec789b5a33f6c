//! Method definitions as seen by the handler locator.
//!
//! A [`MethodDef`] carries exactly what shape matching and locals fingerprinting need: the
//! method attributes (for staticness), the element classes of its return type and parameters,
//! and the declared types of its local variables. Bodies and IL are not part of the model.
//!
//! # Key Types
//! - [`MethodModifiers`]: Method attribute modifier flags
//! - [`MethodDef`] / [`MethodDefRc`]: A method definition and its shared handle
//! - [`MethodDefBuilder`]: Fluent construction, used by model adapters and tests

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    metadata::{locals::LocalTypes, signatures::TypeClass, token::Token},
    Result,
};

/// Bitmask for the modifier bits of `MethodAttributes` (everything but access and vtable layout)
pub const METHOD_MODIFIERS_MASK: u32 = 0xFEF8;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method modifiers
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name+sig, else just by name
        const HIDE_BY_SIG = 0x0080;
        /// Method can only be overriden if also accessible
        const STRICT = 0x0200;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, dpending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
        /// Implementation is forwarded through PInvoke
        const PINVOKE_IMPL = 0x2000;
        /// Method has security associate with it
        const HAS_SECURITY = 0x4000;
        /// Method calls another method containing security code
        const REQUIRE_SEC_OBJECT = 0x8000;
        /// Reserved: shall be zero for conforming implementations
        const UNMANAGED_EXPORT = 0x0008;
    }
}

impl MethodModifiers {
    /// Extract modifier flags from raw method attributes
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_MODIFIERS_MASK)
    }
}

mod modifiers_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::MethodModifiers;

    pub fn serialize<S: Serializer>(
        modifiers: &MethodModifiers,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(modifiers.bits())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<MethodModifiers, D::Error> {
        let raw = u32::deserialize(deserializer)?;
        Ok(MethodModifiers::from_method_flags(raw))
    }
}

fn void_return() -> TypeClass {
    TypeClass::Void
}

/// A reference-counted pointer to a [`MethodDef`]
pub type MethodDefRc = Arc<MethodDef>;

/// A method definition.
///
/// `params` never includes the implicit `this` of instance methods. `locals` holds the fully
/// qualified names of the declared local variable types in declaration order, duplicates
/// included; methods without a body have none.
///
/// In the serialized model the method attributes are stored as the raw `flags` value; only
/// the modifier bits are retained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDef {
    /// `MethodDef` token identifying this method
    pub token: Token,
    /// Method name, informational only
    #[serde(default)]
    pub name: String,
    /// Method modifier flags
    #[serde(
        rename = "flags",
        with = "modifiers_serde",
        default = "MethodModifiers::empty"
    )]
    pub modifiers: MethodModifiers,
    /// Element class of the return type, `void` when absent from the serialized model
    #[serde(default = "void_return")]
    pub return_type: TypeClass,
    /// Element classes of the declared parameters, in order
    #[serde(default)]
    pub params: Vec<TypeClass>,
    /// Declared local variable types, fully qualified
    #[serde(default)]
    pub locals: Vec<String>,
}

impl MethodDef {
    /// Returns a builder for a new method definition
    #[must_use]
    pub fn builder() -> MethodDefBuilder {
        MethodDefBuilder::new()
    }

    /// Returns true if the method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MethodModifiers::STATIC)
    }

    /// Number of declared parameters, excluding `this`
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Returns the element class of parameter `index`, if it exists
    #[must_use]
    pub fn param(&self, index: usize) -> Option<TypeClass> {
        self.params.get(index).copied()
    }

    /// Set view over the declared local variable types
    #[must_use]
    pub fn local_types(&self) -> LocalTypes<'_> {
        LocalTypes::new(self)
    }
}

/// Builder for [`MethodDef`].
///
/// ```rust
/// use vmscope::metadata::{method::MethodDef, signatures::TypeClass, token::Token};
///
/// let method = MethodDef::builder()
///     .token(Token::new(0x0600_0010))
///     .name("Invoke")
///     .returns(TypeClass::Class)
///     .param(TypeClass::Class)
///     .param(TypeClass::Boolean)
///     .local("System.Int32")
///     .build()?;
///
/// assert!(!method.is_static());
/// assert_eq!(method.param_count(), 2);
/// # Ok::<(), vmscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodDefBuilder {
    token: Option<Token>,
    name: Option<String>,
    modifiers: Option<MethodModifiers>,
    return_type: Option<TypeClass>,
    params: Vec<TypeClass>,
    locals: Vec<String>,
}

impl MethodDefBuilder {
    /// Creates an empty builder for an instance method returning `void`
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method token (required)
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the method name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the modifier flags
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.modifiers = Some(modifiers);
        self
    }

    /// Marks the method static
    #[must_use]
    pub fn static_method(mut self) -> Self {
        let modifiers = self.modifiers.unwrap_or(MethodModifiers::empty());
        self.modifiers = Some(modifiers | MethodModifiers::STATIC);
        self
    }

    /// Sets the return element class
    #[must_use]
    pub fn returns(mut self, return_type: TypeClass) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Appends a parameter
    #[must_use]
    pub fn param(mut self, param: TypeClass) -> Self {
        self.params.push(param);
        self
    }

    /// Appends a declared local type
    #[must_use]
    pub fn local(mut self, type_name: impl Into<String>) -> Self {
        self.locals.push(type_name.into());
        self
    }

    /// Appends several declared local types
    #[must_use]
    pub fn locals<I, S>(mut self, type_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locals.extend(type_names.into_iter().map(Into::into));
        self
    }

    /// Builds the method definition.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if no token was set or the token is null.
    pub fn build(self) -> Result<MethodDef> {
        let token = self
            .token
            .ok_or_else(|| malformed_error!("MethodDef requires a token"))?;
        if token.is_null() {
            return Err(malformed_error!("MethodDef token cannot be null"));
        }

        Ok(MethodDef {
            token,
            name: self.name.unwrap_or_default(),
            modifiers: self.modifiers.unwrap_or(MethodModifiers::empty()),
            return_type: self.return_type.unwrap_or_else(void_return),
            params: self.params,
            locals: self.locals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_modifiers_from_flags() {
        // public static hidebysig
        let modifiers = MethodModifiers::from_method_flags(0x0096);
        assert!(modifiers.contains(MethodModifiers::STATIC));
        assert!(modifiers.contains(MethodModifiers::HIDE_BY_SIG));
        // access bits are dropped
        assert_eq!(modifiers.bits() & 0x0007, 0);

        // private hidebysig instance, new slot
        let instance = MethodModifiers::from_method_flags(0x0181);
        assert!(!instance.contains(MethodModifiers::STATIC));
    }

    #[test]
    fn test_builder_defaults() {
        let method = MethodDef::builder()
            .token(Token::new(0x06000001))
            .build()
            .unwrap();

        assert_eq!(method.name, "");
        assert!(!method.is_static());
        assert_eq!(method.return_type, TypeClass::Void);
        assert_eq!(method.param_count(), 0);
        assert!(method.locals.is_empty());
    }

    #[test]
    fn test_builder_full() {
        let method = MethodDef::builder()
            .token(Token::new(0x06000002))
            .name("Run")
            .static_method()
            .returns(TypeClass::Object)
            .param(TypeClass::I4)
            .locals(["System.Int32", "System.Object"])
            .local("System.Type[]")
            .build()
            .unwrap();

        assert!(method.is_static());
        assert_eq!(method.param(0), Some(TypeClass::I4));
        assert_eq!(method.param(1), None);
        assert_eq!(
            method.locals,
            vec!["System.Int32", "System.Object", "System.Type[]"]
        );
    }

    #[test]
    fn test_builder_requires_token() {
        assert!(matches!(
            MethodDef::builder().name("x").build(),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(
            MethodDef::builder().token(Token::new(0)).build(),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_serde_flags() {
        let json = r#"{
            "token": "0x06000003",
            "name": "Dispatch",
            "flags": 150,
            "return_type": "class",
            "params": ["class", "boolean"],
            "locals": ["System.Object"]
        }"#;
        let method: MethodDef = serde_json::from_str(json).unwrap();
        assert!(method.is_static());
        assert_eq!(method.params, vec![TypeClass::Class, TypeClass::Boolean]);

        let minimal: MethodDef = serde_json::from_str(r#"{"token": 100663300}"#).unwrap();
        assert!(!minimal.is_static());
        assert_eq!(minimal.return_type, TypeClass::Void);
        assert!(minimal.params.is_empty());
    }

    #[test]
    fn test_return_type_default_matches_builder() {
        let parsed: MethodDef =
            serde_json::from_str(r#"{"token": "0x06000004", "name": "Run"}"#).unwrap();
        let built = MethodDef::builder()
            .token(Token::new(0x06000004))
            .name("Run")
            .build()
            .unwrap();

        assert_eq!(parsed, built);
        assert_eq!(parsed.return_type, TypeClass::Void);
    }
}
