// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
// - 'metadata/module.rs' uses mmap to map a model dump into memory

//! # vmscope
//!
//! Locates the virtual-machine dispatch routine ("the handler") that VM-based .NET
//! protectors inject into an assembly. Devirtualization needs this method and its owning
//! type before anything else can happen: the handler is what interprets the virtualized
//! bytecode, so every later stage (opcode-table reconstruction, IL rewriting) starts from it.
//!
//! Nothing in the metadata marks the handler explicitly. It is recognized by shape (arity,
//! staticness, the element types of its signature) and by a fingerprint of the local
//! variable types its body declares. Two historical shapes are known and supported:
//!
//! | Signature       | Protector versions | Shape                                          |
//! |-----------------|--------------------|------------------------------------------------|
//! | `legacy`        | 3.5.1 and older    | instance, `class (class, bool)`                |
//! | `parameterless` | 3.6.0 and newer    | instance, no parameters, any return type       |
//!
//! Both require the same set of locals ([`handler::VMP_HANDLER_LOCALS`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vmscope::prelude::*;
//!
//! let module = ModuleDef::from_path("protected.json")?;
//! let events = EventLog::new();
//!
//! let handler = HandlerLocator::default().discover(&module, &events)?;
//! println!(
//!     "handler {} in {}",
//!     handler.method().token,
//!     handler.vm_type().token
//! );
//! # Ok::<(), vmscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - The read-only metadata model handed over by the parser: tokens,
//!   element-type classes, methods, types and modules
//! - [`handler`] - Signature predicates, the handler locator and the result structures
//! - [`EventLog`] - Notification sink for discovery events
//! - [`LocatorConfig`] - Signature list, ambiguity policy and scan mode
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Tie-break rules
//!
//! Discovery is deterministic. Types are visited in [`ModuleDef::types`] order; within a
//! type, signatures are tried in [`SignatureSet`] order and each signature scans every
//! method before the next one is tried. The first type producing a match wins. The
//! parallel scan reduces to the same answer.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use vmscope::prelude::*;
///
/// let module = ModuleDef::from_path("protected.json")?;
/// let candidates = HandlerLocator::default().candidates(&module);
/// # Ok::<(), vmscope::Error>(())
/// ```
pub mod prelude;

/// The metadata model consumed by the locator.
///
/// Parsing the PE file and its metadata streams is the job of an upstream parser. What
/// arrives here is the structured view: types in traversal order, methods with their
/// staticness, parameter and return element classes, and the declared types of their locals.
///
/// # Key Components
///
/// - [`metadata::token::Token`] - Metadata tokens used for identity and reporting
/// - [`metadata::signatures::TypeClass`] - Coarse element-type classification
/// - [`metadata::method::MethodDef`] - A method definition and its locals
/// - [`metadata::typedef::TypeDef`] - A type definition with methods and nested types
/// - [`metadata::module::ModuleDef`] - A module, its traversal order and token index
/// - [`metadata::locals::LocalTypes`] - Set view over a method's local variable types
pub mod metadata;

/// VM function handler discovery.
///
/// # Key Components
///
/// - [`handler::HandlerShape`] / [`handler::HandlerSignature`] / [`handler::SignatureSet`] - Predicates
/// - [`handler::HandlerLocator`] - Walks a module and returns the first matching handler
/// - [`handler::HandlerDescriptor`] - The discovered type/method pair
/// - [`handler::VmRuntimeStructure`] / [`handler::RuntimeContext`] - Downstream result holders
pub mod handler;

mod config;
mod events;

pub use config::{AmbiguityPolicy, LocatorConfig};
pub use error::Error;
pub use events::{Event, EventKind, EventLog};
pub use handler::{
    HandlerCandidate, HandlerDescriptor, HandlerLocator, HandlerShape, HandlerSignature,
    RuntimeContext, SignatureSet, VmRuntimeStructure,
};
pub use metadata::{
    method::{MethodDef, MethodDefRc},
    module::ModuleDef,
    token::Token,
    typedef::{TypeDef, TypeDefRc},
};

/// `vmscope` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
