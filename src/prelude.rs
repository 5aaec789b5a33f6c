//! # vmscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! vmscope library. Import it to get the locator, the metadata model and the result types
//! in one line.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all vmscope operations
pub use crate::Error;

/// The result type used throughout vmscope
pub use crate::Result;

/// Locator configuration
pub use crate::{AmbiguityPolicy, LocatorConfig};

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Handler discovery
pub use crate::handler::{
    HandlerCandidate, HandlerDescriptor, HandlerLocator, RuntimeContext, VmRuntimeStructure,
};

/// Handler signatures
pub use crate::handler::{
    HandlerShape, HandlerSignature, ShapePattern, SignatureSet, VMP_HANDLER_LOCALS,
};

/// Discovery notifications
pub use crate::{Event, EventKind, EventLog};

// ================================================================================================
// Metadata Model
// ================================================================================================

/// Metadata tokens
pub use crate::metadata::token::Token;

/// Element-type classification
pub use crate::metadata::signatures::TypeClass;

/// Methods, types and modules
pub use crate::metadata::{
    method::{MethodDef, MethodDefRc, MethodModifiers},
    module::ModuleDef,
    typedef::{TypeDef, TypeDefRc},
};
