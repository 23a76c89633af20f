//! Transfer diagnostics
//!
//! A transplant never aborts over partial fidelity. Each place where it
//! knowingly proceeds with less than a faithful copy records a
//! [`Diagnostic`] so callers can surface the loss.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of fidelity loss occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Source and target paragraphs have different run counts
    RunCountMismatch,
    /// A numbering element was added next to an existing one
    DuplicateNumbering,
    /// A field was rebuilt as a bare `PAGE` instruction
    SimplifiedField,
    /// The target has no numbering definition for a transplanted marker
    UndefinedNumbering,
}

impl DiagnosticKind {
    /// Stable short code (e.g., "W001")
    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::RunCountMismatch => "W001",
            DiagnosticKind::DuplicateNumbering => "W002",
            DiagnosticKind::SimplifiedField => "W003",
            DiagnosticKind::UndefinedNumbering => "W004",
        }
    }
}

/// Where in the target a diagnostic applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "part", content = "paragraph", rename_all = "lowercase")]
pub enum Location {
    /// A body paragraph (target index)
    Body(usize),
    /// A paragraph of the first section's header
    Header(usize),
    /// A paragraph of the first section's footer
    Footer(usize),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Body(i) => write!(f, "body paragraph {}", i + 1),
            Location::Header(i) => write!(f, "header paragraph {}", i + 1),
            Location::Footer(i) => write!(f, "footer paragraph {}", i + 1),
        }
    }
}

/// A non-fatal degradation recorded during a transplant
///
/// # Example
///
/// ```
/// use docgraft_ooxml::diagnostics::{Diagnostic, DiagnosticKind, Location};
///
/// let diag = Diagnostic::new(DiagnosticKind::RunCountMismatch, "3 source runs, 1 target run")
///     .with_location(Location::Body(0));
/// assert_eq!(diag.to_string(), "warning[W001]: 3 source runs, 1 target run (body paragraph 1)");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Kind of degradation
    pub kind: DiagnosticKind,

    /// Human-readable message
    pub message: String,

    /// Paragraph the diagnostic refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Short code of the kind
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning[{}]: {}", self.code(), self.message)?;
        if let Some(location) = self.location {
            write!(f, " ({})", location)?;
        }
        Ok(())
    }
}
