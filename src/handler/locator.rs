//! VM function handler discovery.
//!
//! The [`HandlerLocator`] walks the types of a module in traversal order and returns the
//! first one declaring a method that satisfies a handler signature.

use rayon::prelude::*;

use crate::{
    config::{AmbiguityPolicy, LocatorConfig},
    events::{EventKind, EventLog},
    handler::{
        descriptor::{HandlerCandidate, HandlerDescriptor},
        signature::HandlerSignature,
    },
    metadata::{method::MethodDefRc, module::ModuleDef, typedef::TypeDef},
    Error, Result,
};

/// Locates the VM function handler of a protected module.
///
/// Types are visited in [`ModuleDef::types`] order. For each type the signatures are tried in
/// priority order, and each signature scans every method of the type before the next
/// signature is tried. The first type yielding a match wins.
///
/// # Example
///
/// ```rust,no_run
/// use vmscope::{EventLog, HandlerLocator, ModuleDef};
///
/// let module = ModuleDef::from_path("protected.json")?;
/// let events = EventLog::new();
///
/// let handler = HandlerLocator::default().discover(&module, &events)?;
/// println!("{handler}");
/// # Ok::<(), vmscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct HandlerLocator {
    config: LocatorConfig,
}

impl HandlerLocator {
    /// Creates a locator with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Signatures, ambiguity policy and scan mode.
    #[must_use]
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration of this locator.
    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Finds the handler method of a single type.
    ///
    /// # Arguments
    ///
    /// * `ty` - The type to inspect.
    ///
    /// # Returns
    ///
    /// The first method matching the highest priority signature that matches any method of
    /// `ty`, together with that signature, or `None`.
    pub fn match_type<'s>(&'s self, ty: &TypeDef) -> Option<(MethodDefRc, &'s HandlerSignature)> {
        self.config.signatures.iter().find_map(|signature| {
            ty.methods
                .iter()
                .find(|method| signature.matches(method))
                .map(|method| (method.clone(), signature))
        })
    }

    /// Discovers the VM function handler.
    ///
    /// On success exactly one [`EventKind::HandlerFound`] event carrying both tokens is
    /// recorded. On failure one [`EventKind::HandlerNotFound`] event is recorded instead.
    /// Depending on the [`AmbiguityPolicy`], additional qualifying types are ignored,
    /// reported as [`EventKind::AmbiguousHandler`] warnings, or rejected.
    ///
    /// # Arguments
    ///
    /// * `module` - The module to search.
    /// * `events` - Sink for discovery notifications.
    ///
    /// # Returns
    ///
    /// The handler and the type declaring it.
    ///
    /// # Errors
    ///
    /// - [`Error::HandlerNotFound`] if no type declares a qualifying method
    /// - [`Error::AmbiguousHandler`] if more than one type qualifies under
    ///   [`AmbiguityPolicy::Reject`]
    pub fn discover(&self, module: &ModuleDef, events: &EventLog) -> Result<HandlerDescriptor> {
        let mut found = self.scan(module, self.config.scans_all_types());

        log::debug!(
            "scanned {} types of '{}', {} qualifying",
            module.types().len(),
            module.name(),
            found.len()
        );

        if found.is_empty() {
            events.record(EventKind::HandlerNotFound).message(format!(
                "no type of '{}' declares a VM function handler - unsupported protector version?",
                module.name()
            ));
            return Err(Error::HandlerNotFound);
        }

        match self.config.ambiguity {
            AmbiguityPolicy::FirstMatch => {}
            AmbiguityPolicy::Report => {
                for extra in found.iter().skip(1) {
                    events
                        .record(EventKind::AmbiguousHandler)
                        .vm_type(extra.vm_type.token)
                        .method(extra.method.token)
                        .message(format!(
                            "{} also declares a handler candidate {} ({}), ignored",
                            extra.vm_type.full_name(),
                            extra.method.name,
                            extra.method.token
                        ));
                }
            }
            AmbiguityPolicy::Reject => {
                if found.len() > 1 {
                    let tokens: Vec<_> = found.iter().map(|c| c.vm_type.token).collect();
                    events.record(EventKind::AmbiguousHandler).message(format!(
                        "{} types declare a VM function handler",
                        tokens.len()
                    ));
                    return Err(Error::AmbiguousHandler(tokens));
                }
            }
        }

        found.truncate(1);
        let Some(first) = found.pop() else {
            return Err(Error::HandlerNotFound);
        };

        events
            .record(EventKind::HandlerFound)
            .vm_type(first.vm_type.token)
            .method(first.method.token)
            .message(format!(
                "VM type {} ({}), function handler {} ({}), {} signature",
                first.vm_type.full_name(),
                first.vm_type.token,
                first.method.name,
                first.method.token,
                first.signature
            ));

        Ok(first.into())
    }

    /// Lists every qualifying type and its handler method.
    ///
    /// # Arguments
    ///
    /// * `module` - The module to search.
    ///
    /// # Returns
    ///
    /// One [`HandlerCandidate`] per qualifying type, in traversal order. The first entry is
    /// what [`HandlerLocator::discover`] selects.
    pub fn candidates(&self, module: &ModuleDef) -> Vec<HandlerCandidate> {
        self.scan(module, true)
    }

    fn scan(&self, module: &ModuleDef, all: bool) -> Vec<HandlerCandidate> {
        let types = module.types();

        let candidate = |(index, ty): (usize, &crate::TypeDefRc)| {
            self.match_type(ty)
                .map(|(method, signature)| HandlerCandidate {
                    index,
                    vm_type: ty.clone(),
                    method,
                    signature: signature.name().to_string(),
                })
        };

        match (self.config.parallel, all) {
            (false, false) => types.iter().enumerate().find_map(candidate).into_iter().collect(),
            (false, true) => types.iter().enumerate().filter_map(candidate).collect(),
            (true, false) => types
                .par_iter()
                .enumerate()
                .find_map_first(candidate)
                .into_iter()
                .collect(),
            (true, true) => types.par_iter().enumerate().filter_map(candidate).collect(),
        }
    }
}
