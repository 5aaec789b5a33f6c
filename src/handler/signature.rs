//! Handler signature predicates.
//!
//! A handler signature is a pair of a shape predicate and a locals fingerprint. Both are
//! total: they inspect a single [`MethodDef`] and never fail.
//!
//! # Known shapes
//!
//! | Shape                          | Versions       | Static | Params          | Return  |
//! |--------------------------------|----------------|--------|-----------------|---------|
//! | [`HandlerShape::Legacy`]        | 3.5.1 and older | no    | `class`, `bool` | `class` |
//! | [`HandlerShape::Parameterless`] | 3.6.0 and newer | no    | none            | any     |
//!
//! The newer release narrowed the arity and widened the types; the locals fingerprint is the
//! same for both.
//!
//! # Extending
//!
//! A new protector release is supported by appending a [`HandlerSignature`] to the
//! [`SignatureSet`], either with a named [`HandlerShape`] or a data-driven
//! [`ShapePattern`]. The locator's scan loop does not change.

use crate::metadata::{method::MethodDef, signatures::TypeClass};

/// Local variable types declared by the VM function handler of every known release.
pub const VMP_HANDLER_LOCALS: [&str; 7] = [
    "System.Object",
    "System.Int32",
    "System.Reflection.MethodInfo",
    "System.Reflection.ParameterInfo[]",
    "System.Type[]",
    "System.Reflection.Emit.DynamicMethod",
    "System.Reflection.Emit.ILGenerator",
];

/// Returns true if `method` has the handler shape of protector 3.5.1 and older.
///
/// Instance method, exactly two parameters, returning a class, first parameter a class and
/// second a boolean.
#[must_use]
pub fn is_legacy_handler(method: &MethodDef) -> bool {
    !method.is_static()
        && method.param_count() == 2
        && method.return_type == TypeClass::Class
        && method.param(0) == Some(TypeClass::Class)
        && method.param(1) == Some(TypeClass::Boolean)
}

/// Returns true if `method` has the handler shape of protector 3.6.0 and newer.
///
/// Instance method without parameters; the return type is not constrained.
#[must_use]
pub fn is_parameterless_handler(method: &MethodDef) -> bool {
    !method.is_static() && method.param_count() == 0
}

/// Returns true if every name in `required` is declared as a local of `method`.
///
/// Additional locals are permitted, order and multiplicity are irrelevant.
#[must_use]
pub fn has_required_locals<S: AsRef<str>>(method: &MethodDef, required: &[S]) -> bool {
    method.local_types().all(required)
}

/// A data-driven shape predicate.
///
/// Every field left at `None` is unconstrained. `params` constrains the arity to its length;
/// a `None` entry accepts any element class at that position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapePattern {
    /// Required staticness
    pub is_static: Option<bool>,
    /// Required return element class
    pub return_type: Option<TypeClass>,
    /// Required parameter list
    pub params: Option<Vec<Option<TypeClass>>>,
}

impl ShapePattern {
    /// Creates an unconstrained pattern, matching every method
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires an instance method
    #[must_use]
    pub fn instance(mut self) -> Self {
        self.is_static = Some(false);
        self
    }

    /// Requires a static method
    #[must_use]
    pub fn static_method(mut self) -> Self {
        self.is_static = Some(true);
        self
    }

    /// Requires the given return element class
    #[must_use]
    pub fn returns(mut self, return_type: TypeClass) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Requires exactly these parameters; `None` entries match any class
    #[must_use]
    pub fn params(mut self, params: Vec<Option<TypeClass>>) -> Self {
        self.params = Some(params);
        self
    }

    /// Evaluates the pattern against `method`
    #[must_use]
    pub fn matches(&self, method: &MethodDef) -> bool {
        if self.is_static.is_some_and(|expected| method.is_static() != expected) {
            return false;
        }

        if self
            .return_type
            .is_some_and(|expected| method.return_type != expected)
        {
            return false;
        }

        match &self.params {
            None => true,
            Some(expected) => {
                expected.len() == method.param_count()
                    && expected
                        .iter()
                        .zip(&method.params)
                        .all(|(want, have)| want.is_none_or(|want| want == *have))
            }
        }
    }
}

/// Shape predicate of a handler signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerShape {
    /// Protector 3.5.1 and older, see [`is_legacy_handler`]
    Legacy,
    /// Protector 3.6.0 and newer, see [`is_parameterless_handler`]
    Parameterless,
    /// Any other shape
    Pattern(ShapePattern),
}

impl HandlerShape {
    /// Evaluates the shape predicate against `method`
    #[must_use]
    pub fn matches(&self, method: &MethodDef) -> bool {
        match self {
            HandlerShape::Legacy => is_legacy_handler(method),
            HandlerShape::Parameterless => is_parameterless_handler(method),
            HandlerShape::Pattern(pattern) => pattern.matches(method),
        }
    }
}

/// A (shape, locals) strategy pair identifying one handler generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSignature {
    name: String,
    shape: HandlerShape,
    locals: Vec<String>,
}

impl HandlerSignature {
    /// Creates a signature from a shape and the locals a matching method must declare
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, shape: HandlerShape, locals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            shape,
            locals: locals.into_iter().map(Into::into).collect(),
        }
    }

    /// Signature of protector 3.5.1 and older
    #[must_use]
    pub fn legacy() -> Self {
        Self::new("legacy", HandlerShape::Legacy, VMP_HANDLER_LOCALS)
    }

    /// Signature of protector 3.6.0 and newer
    #[must_use]
    pub fn parameterless() -> Self {
        Self::new(
            "parameterless",
            HandlerShape::Parameterless,
            VMP_HANDLER_LOCALS,
        )
    }

    /// Signature name, used in events and reports
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shape predicate
    #[must_use]
    pub fn shape(&self) -> &HandlerShape {
        &self.shape
    }

    /// The required locals
    #[must_use]
    pub fn locals(&self) -> &[String] {
        &self.locals
    }

    /// Returns true if `method` satisfies both the shape and the locals fingerprint
    #[must_use]
    pub fn matches(&self, method: &MethodDef) -> bool {
        self.shape.matches(method) && has_required_locals(method, &self.locals)
    }
}

/// Handler signatures in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    signatures: Vec<HandlerSignature>,
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self {
            signatures: vec![HandlerSignature::legacy(), HandlerSignature::parameterless()],
        }
    }
}

impl SignatureSet {
    /// Creates an empty set
    #[must_use]
    pub fn new() -> Self {
        Self {
            signatures: Vec::new(),
        }
    }

    /// Appends a signature with the lowest priority
    pub fn push(&mut self, signature: HandlerSignature) {
        self.signatures.push(signature);
    }

    /// Appends a signature with the lowest priority, builder style
    #[must_use]
    pub fn with(mut self, signature: HandlerSignature) -> Self {
        self.push(signature);
        self
    }

    /// Signature at priority `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HandlerSignature> {
        self.signatures.get(index)
    }

    /// Signatures in priority order
    pub fn iter(&self) -> impl Iterator<Item = &HandlerSignature> {
        self.signatures.iter()
    }

    /// Number of signatures
    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Returns true if the set holds no signatures
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl FromIterator<HandlerSignature> for SignatureSet {
    fn from_iter<T: IntoIterator<Item = HandlerSignature>>(iter: T) -> Self {
        Self {
            signatures: iter.into_iter().collect(),
        }
    }
}
