//! Read-only metadata model.
//!
//! The model is deliberately small: the locator only needs staticness, arity, the element
//! class of the return type and of each parameter, and the declared types of locals. How the
//! upstream parser derives these from the `#~` tables and signature blobs is not this
//! crate's concern; [`crate::metadata::module::ModuleDump`] is the interchange format it produces.

pub mod locals;
pub mod method;
pub mod module;
pub mod signatures;
pub mod token;
pub mod typedef;
