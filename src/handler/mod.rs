//! Handler signatures, discovery and its results.
//!
//! - [`crate::handler::signature`] - Shape predicates, the locals fingerprint and the ordered signature set
//! - [`crate::handler::locator`] - The [`HandlerLocator`] scan
//! - [`crate::handler::descriptor`] - [`HandlerDescriptor`], [`HandlerCandidate`] and [`VmRuntimeStructure`]
//! - [`crate::handler::context`] - The write-once [`RuntimeContext`]

pub mod context;
pub mod descriptor;
pub mod locator;
pub mod signature;

pub use context::RuntimeContext;
pub use descriptor::{HandlerCandidate, HandlerDescriptor, VmRuntimeStructure};
pub use locator::HandlerLocator;
pub use signature::{
    has_required_locals, is_legacy_handler, is_parameterless_handler, HandlerShape,
    HandlerSignature, ShapePattern, SignatureSet, VMP_HANDLER_LOCALS,
};
