//! Configuration for the handler locator.
//!
//! This module provides [`LocatorConfig`], which selects the handler signatures to match,
//! how structural ambiguity is treated, and whether types are scanned in parallel.

use strum::{Display, EnumString};

use crate::handler::{HandlerSignature, SignatureSet};

/// How the locator treats more than one type containing a qualifying method.
///
/// All policies select the same handler: the first match in traversal order. They differ
/// in how much of the module is scanned and what is reported about the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
pub enum AmbiguityPolicy {
    /// Stop at the first qualifying type (default).
    #[default]
    #[strum(serialize = "first")]
    FirstMatch,

    /// Scan every type; record an [`crate::EventKind::AmbiguousHandler`] warning for each
    /// additional qualifying type and still return the first one.
    #[strum(serialize = "report")]
    Report,

    /// Scan every type; fail with [`crate::Error::AmbiguousHandler`] when more than one
    /// type qualifies.
    #[strum(serialize = "reject")]
    Reject,
}

/// Configuration for the handler locator.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// Handler signatures, in priority order (default: legacy, then parameterless).
    pub signatures: SignatureSet,

    /// Treatment of more than one qualifying type (default: first match).
    pub ambiguity: AmbiguityPolicy,

    /// Evaluate types on the rayon thread pool (default: false).
    ///
    /// Results are reduced to the earliest type in traversal order, so enabling this never
    /// changes which handler is selected.
    pub parallel: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            signatures: SignatureSet::default(),
            ambiguity: AmbiguityPolicy::FirstMatch,
            parallel: false,
        }
    }
}

impl LocatorConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the signature set.
    #[must_use]
    pub fn with_signatures(mut self, signatures: SignatureSet) -> Self {
        self.signatures = signatures;
        self
    }

    /// Appends a signature with the lowest priority.
    #[must_use]
    pub fn with_signature(mut self, signature: HandlerSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    /// Sets the ambiguity policy.
    #[must_use]
    pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }

    /// Enables or disables the parallel scan.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns true if the locator has to scan past the first match.
    #[must_use]
    pub fn scans_all_types(&self) -> bool {
        self.ambiguity != AmbiguityPolicy::FirstMatch
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::handler::HandlerShape;

    #[test]
    fn test_defaults() {
        let config = LocatorConfig::default();
        assert_eq!(config.ambiguity, AmbiguityPolicy::FirstMatch);
        assert!(!config.parallel);
        assert!(!config.scans_all_types());

        let shapes: Vec<&HandlerShape> = config.signatures.iter().map(|s| s.shape()).collect();
        assert_eq!(
            shapes,
            vec![&HandlerShape::Legacy, &HandlerShape::Parameterless]
        );
    }

    #[test]
    fn test_builder_methods() {
        let config = LocatorConfig::new()
            .with_parallel(true)
            .with_ambiguity(AmbiguityPolicy::Reject)
            .with_signatures(SignatureSet::new())
            .with_signature(HandlerSignature::parameterless());

        assert!(config.parallel);
        assert!(config.scans_all_types());
        assert_eq!(config.signatures.len(), 1);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            AmbiguityPolicy::from_str("first").unwrap(),
            AmbiguityPolicy::FirstMatch
        );
        assert_eq!(
            AmbiguityPolicy::from_str("report").unwrap(),
            AmbiguityPolicy::Report
        );
        assert_eq!(AmbiguityPolicy::Reject.to_string(), "reject");
        assert!(AmbiguityPolicy::from_str("all").is_err());
    }
}
