//! Per-transplant state threaded through the transfer functions

use std::collections::HashSet;

use tracing::warn;

use crate::config::TransplantOptions;
use crate::diagnostics::{Diagnostic, DiagnosticKind, Location};
use crate::numbering::NumberingPolicy;

/// Options, target facts and collected diagnostics for one transplant
#[derive(Debug, Clone)]
pub struct TransferContext {
    numbering: NumberingPolicy,
    page_fields: bool,
    defined_numbering: Option<HashSet<String>>,
    location: Option<Location>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for TransferContext {
    fn default() -> Self {
        Self::new(&TransplantOptions::default())
    }
}

impl TransferContext {
    /// Create a context from engine options
    pub fn new(options: &TransplantOptions) -> Self {
        Self {
            numbering: options.numbering,
            page_fields: options.page_fields,
            defined_numbering: None,
            location: None,
            diagnostics: Vec::new(),
        }
    }

    /// Known numbering ids of the target, enabling undefined-id checks
    pub fn with_numbering_definitions(mut self, ids: HashSet<String>) -> Self {
        self.defined_numbering = Some(ids);
        self
    }

    /// Policy for pre-existing numbering on the target
    pub fn numbering_policy(&self) -> NumberingPolicy {
        self.numbering
    }

    /// Whether `PAGE` fields are synthesized
    pub fn page_fields(&self) -> bool {
        self.page_fields
    }

    /// Whether the target defines a numbering id (unknown when no table was given)
    pub fn is_numbering_defined(&self, id: &str) -> Option<bool> {
        self.defined_numbering.as_ref().map(|ids| ids.contains(id))
    }

    /// Set the paragraph subsequent diagnostics refer to
    pub fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// Record a fidelity loss at the current location
    pub fn degrade(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let mut diagnostic = Diagnostic::new(kind, message);
        if let Some(location) = self.location {
            diagnostic = diagnostic.with_location(location);
        }
        warn!(code = diagnostic.code(), "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, keeping its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_attaches_location() {
        let mut ctx = TransferContext::default();
        ctx.degrade(DiagnosticKind::SimplifiedField, "no location yet");
        ctx.set_location(Location::Footer(1));
        ctx.degrade(DiagnosticKind::SimplifiedField, "located");

        let diags = ctx.into_diagnostics();
        assert_eq!(diags[0].location, None);
        assert_eq!(diags[1].location, Some(Location::Footer(1)));
    }

    #[test]
    fn test_numbering_definitions_unknown_by_default() {
        let ctx = TransferContext::default();
        assert_eq!(ctx.is_numbering_defined("1"), None);

        let ctx = ctx.with_numbering_definitions(["1".to_string()].into_iter().collect());
        assert_eq!(ctx.is_numbering_defined("1"), Some(true));
        assert_eq!(ctx.is_numbering_defined("2"), Some(false));
    }

    #[test]
    fn test_options_flow_through() {
        let options = TransplantOptions {
            numbering: NumberingPolicy::Append,
            page_fields: false,
            ..Default::default()
        };
        let ctx = TransferContext::new(&options);
        assert_eq!(ctx.numbering_policy(), NumberingPolicy::Append);
        assert!(!ctx.page_fields());
    }
}
