//! Write-once holder for the discovered runtime structure.

use std::sync::OnceLock;

use crate::{
    events::EventLog,
    handler::{descriptor::VmRuntimeStructure, locator::HandlerLocator},
    metadata::module::ModuleDef,
    Error, Result,
};

/// Shared state of a devirtualization session.
///
/// The runtime structure is assigned at most once. Later stages read it through
/// [`RuntimeContext::runtime`] from any thread.
#[derive(Debug, Default)]
pub struct RuntimeContext {
    runtime: OnceLock<VmRuntimeStructure>,
    events: EventLog,
}

impl RuntimeContext {
    /// Creates an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `locator` over `module` and stores the result.
    ///
    /// Discovery events are staged and only land in the context's own log when this call
    /// performs the assignment or discovery fails; a call that loses a concurrent race leaves
    /// the log untouched, so it never holds more than one [`crate::EventKind::HandlerFound`].
    ///
    /// # Errors
    ///
    /// Returns the discovery error, or [`Error::AlreadyAssigned`] if a structure was stored
    /// before. The stored structure is left untouched in both cases.
    pub fn discover(
        &self,
        locator: &HandlerLocator,
        module: &ModuleDef,
    ) -> Result<&VmRuntimeStructure> {
        if self.is_assigned() {
            return Err(Error::AlreadyAssigned);
        }

        let staged = EventLog::new();
        let descriptor = match locator.discover(module, &staged) {
            Ok(descriptor) => descriptor,
            Err(error) => {
                self.events.merge(&staged);
                return Err(error);
            }
        };

        let runtime = self.set(descriptor.into())?;
        self.events.merge(&staged);
        Ok(runtime)
    }

    /// Stores the runtime structure.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyAssigned`] if a structure was stored before; the first one is
    /// kept.
    pub fn set(&self, runtime: VmRuntimeStructure) -> Result<&VmRuntimeStructure> {
        self.runtime
            .set(runtime)
            .map_err(|_| Error::AlreadyAssigned)?;
        self.runtime.get().ok_or(Error::HandlerNotFound)
    }

    /// The stored runtime structure, if discovery succeeded
    #[must_use]
    pub fn runtime(&self) -> Option<&VmRuntimeStructure> {
        self.runtime.get()
    }

    /// Returns true if a runtime structure has been stored
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.runtime.get().is_some()
    }

    /// Events recorded by [`RuntimeContext::discover`]
    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Clears the stored structure and the event log, e.g. before processing the next module
    pub fn reset(&mut self) {
        self.runtime = OnceLock::new();
        self.events = EventLog::new();
    }
}
