//! # docgraft-ooxml
//!
//! Formatting transplant between Word (`.docx`) documents.
//!
//! A styled *source* document lends its formatting to a *target* document
//! that carries similar content. Body paragraphs are paired by position and
//! receive the source's list marker, alignment and run formatting; the
//! first section's header and footer are rebuilt from the source,
//! including page-number fields.
//!
//! This crate provides:
//! - A lossless element tree over OOXML parts ([`xml`])
//! - The run, list, paragraph, section and field transfer steps
//! - The [`Transplanter`] driver and its [`TransplantReport`]
//!
//! ## Example
//!
//! ```no_run
//! use docgraft_ooxml::{Settings, Transplanter, WordDocument};
//!
//! let settings = Settings::load("docgraft.toml")?;
//! let source = WordDocument::open("styled.docx")?;
//! let mut target = WordDocument::open("draft.docx")?;
//!
//! let report = Transplanter::new(settings.transplant).run(&source, &mut target)?;
//! println!("{} paragraphs formatted", report.paragraphs_paired);
//! target.save("draft_formatted.docx")?;
//! # Ok::<(), docgraft_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod field;
pub mod numbering;
pub mod pairing;
pub mod paragraph;
pub mod relationships;
pub mod run;
pub mod section;
pub mod transplant;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_utils;

pub use archive::OoxmlArchive;
pub use config::{OutputSettings, Settings, TransplantOptions};
pub use diagnostics::{Diagnostic, DiagnosticKind, Location};
pub use document::{Section, WordDocument};
pub use error::{DocumentRole, OoxmlError, Result};
pub use numbering::{ListMarker, NumberingPolicy};
pub use pairing::{MatchStrategy, PositionalMatch};
pub use paragraph::Alignment;
pub use relationships::Relationships;
pub use run::FormattingProfile;
pub use section::Slot;
pub use transplant::{TransplantReport, Transplanter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
