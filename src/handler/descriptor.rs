//! Result structures of handler discovery.

use std::fmt;

use crate::{
    metadata::{method::MethodDefRc, typedef::TypeDefRc},
    Error, Result,
};

/// A method qualifying as VM function handler, together with its declaring type.
///
/// Produced by [`crate::HandlerLocator::candidates`], one per qualifying type in traversal
/// order.
#[derive(Debug, Clone)]
pub struct HandlerCandidate {
    /// Position of the declaring type in [`crate::ModuleDef::types`]
    pub index: usize,
    /// Declaring type
    pub vm_type: TypeDefRc,
    /// First method of `vm_type` matching a signature
    pub method: MethodDefRc,
    /// Name of the matching signature
    pub signature: String,
}

impl From<HandlerCandidate> for HandlerDescriptor {
    fn from(candidate: HandlerCandidate) -> Self {
        HandlerDescriptor::new(candidate.vm_type, candidate.method, candidate.signature)
    }
}

/// The located VM function handler and the type that declares it.
///
/// Both halves are always present; a descriptor only exists for a successful discovery.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    vm_type: TypeDefRc,
    method: MethodDefRc,
    signature: String,
}

impl HandlerDescriptor {
    /// Creates a descriptor from a type, its handler method and the matching signature name
    #[must_use]
    pub fn new(vm_type: TypeDefRc, method: MethodDefRc, signature: impl Into<String>) -> Self {
        Self {
            vm_type,
            method,
            signature: signature.into(),
        }
    }

    /// The type declaring the handler
    #[must_use]
    pub fn vm_type(&self) -> &TypeDefRc {
        &self.vm_type
    }

    /// The handler method
    #[must_use]
    pub fn method(&self) -> &MethodDefRc {
        &self.method
    }

    /// Name of the signature the handler matched
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Consumes the descriptor, returning the type and the method
    #[must_use]
    pub fn into_parts(self) -> (TypeDefRc, MethodDefRc) {
        (self.vm_type, self.method)
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{} ({} in {}, {})",
            self.vm_type.full_name(),
            self.method.name,
            self.method.token,
            self.vm_type.token,
            self.signature
        )
    }
}

/// The runtime structure consumed by later devirtualization stages.
///
/// Holds the VM type and its function handler. Construction refuses a missing half, so a
/// structure never exists in a partially populated state.
#[derive(Debug, Clone)]
pub struct VmRuntimeStructure {
    vm_type: TypeDefRc,
    function_handler: MethodDefRc,
}

impl VmRuntimeStructure {
    /// Creates the structure from a type and its handler
    #[must_use]
    pub fn new(vm_type: TypeDefRc, function_handler: MethodDefRc) -> Self {
        Self {
            vm_type,
            function_handler,
        }
    }

    /// Creates the structure from optional halves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandlerNotFound`] if either half is absent.
    pub fn from_parts(
        vm_type: Option<TypeDefRc>,
        function_handler: Option<MethodDefRc>,
    ) -> Result<Self> {
        match (vm_type, function_handler) {
            (Some(vm_type), Some(function_handler)) => Ok(Self::new(vm_type, function_handler)),
            _ => Err(Error::HandlerNotFound),
        }
    }

    /// The VM type
    #[must_use]
    pub fn vm_type(&self) -> &TypeDefRc {
        &self.vm_type
    }

    /// The VM function handler
    #[must_use]
    pub fn function_handler(&self) -> &MethodDefRc {
        &self.function_handler
    }
}

impl From<HandlerDescriptor> for VmRuntimeStructure {
    fn from(descriptor: HandlerDescriptor) -> Self {
        let (vm_type, function_handler) = descriptor.into_parts();
        Self::new(vm_type, function_handler)
    }
}
