//! Document pairing driver
//!
//! # Example
//!
//! ```no_run
//! use docgraft_ooxml::{Transplanter, WordDocument};
//!
//! let source = WordDocument::open("styled.docx")?;
//! let mut target = WordDocument::open("draft.docx")?;
//!
//! let report = Transplanter::default().run(&source, &mut target)?;
//! for diagnostic in &report.diagnostics {
//!     eprintln!("{}", diagnostic);
//! }
//! target.save("draft_formatted.docx")?;
//! # Ok::<(), docgraft_ooxml::OoxmlError>(())
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TransplantOptions;
use crate::context::TransferContext;
use crate::diagnostics::{Diagnostic, Location};
use crate::document::WordDocument;
use crate::error::{DocumentRole, OoxmlError, Result};
use crate::pairing::{MatchStrategy, PositionalMatch};
use crate::paragraph::transfer_paragraph;
use crate::section::{transplant_slot, Slot};

/// Outcome of one transplant
#[derive(Debug, Clone, Default, Serialize)]
pub struct TransplantReport {
    /// Body paragraph pairs that were transferred
    pub paragraphs_paired: usize,
    /// Header paragraphs written (`None` when the header was skipped)
    pub header_paragraphs: Option<usize>,
    /// Footer paragraphs written (`None` when the footer was skipped)
    pub footer_paragraphs: Option<usize>,
    /// Fidelity losses
    pub diagnostics: Vec<Diagnostic>,
}

impl TransplantReport {
    /// Pretty-printed JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Copies formatting from a source document onto targets
pub struct Transplanter {
    options: TransplantOptions,
    strategy: Box<dyn MatchStrategy>,
}

impl Default for Transplanter {
    fn default() -> Self {
        Self::new(TransplantOptions::default())
    }
}

impl Transplanter {
    /// Create a transplanter with positional pairing
    pub fn new(options: TransplantOptions) -> Self {
        Self {
            options,
            strategy: Box::new(PositionalMatch),
        }
    }

    /// Replace the pairing strategy
    pub fn with_strategy(mut self, strategy: impl MatchStrategy + 'static) -> Self {
        self.strategy = Box::new(strategy);
        self
    }

    /// Transfer the source's formatting onto `target` in place
    ///
    /// Both documents are checked for sections before anything changes, so
    /// a structural error leaves the target untouched.
    pub fn run(&self, source: &WordDocument, target: &mut WordDocument) -> Result<TransplantReport> {
        if source.first_section().is_none() {
            return Err(OoxmlError::no_sections(DocumentRole::Source));
        }
        if target.first_section().is_none() {
            return Err(OoxmlError::no_sections(DocumentRole::Target));
        }

        let mut ctx = TransferContext::new(&self.options);
        match target.numbering_definitions() {
            Ok(Some(definitions)) => {
                ctx = ctx.with_numbering_definitions(definitions.into_ids());
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "unreadable numbering part, ids not checked"),
        }

        let source_paragraphs = source.paragraphs();
        let mut target_paragraphs = target.paragraphs_mut();
        let pairs = self
            .strategy
            .pairs(source_paragraphs.len(), target_paragraphs.len());

        let mut paragraphs_paired = 0;
        for (source_index, target_index) in pairs {
            let (Some(from), Some(to)) = (
                source_paragraphs.get(source_index),
                target_paragraphs.get_mut(target_index),
            ) else {
                debug!(source_index, target_index, "pair out of range, skipped");
                continue;
            };
            ctx.set_location(Location::Body(target_index));
            transfer_paragraph(from, to, &mut ctx);
            paragraphs_paired += 1;
        }
        debug!(
            strategy = self.strategy.name(),
            paragraphs_paired, "body transferred"
        );

        let header_paragraphs = if self.options.header {
            Some(transplant_slot(source, target, Slot::Header, &mut ctx)?)
        } else {
            None
        };
        let footer_paragraphs = if self.options.footer {
            Some(transplant_slot(source, target, Slot::Footer, &mut ctx)?)
        } else {
            None
        };

        let diagnostics = ctx.into_diagnostics();
        info!(
            paragraphs_paired,
            diagnostics = diagnostics.len(),
            "transplant complete"
        );

        Ok(TransplantReport {
            paragraphs_paired,
            header_paragraphs,
            footer_paragraphs,
            diagnostics,
        })
    }

    /// Transplant onto several named targets, each independently
    ///
    /// A failing target does not stop the others. Each entry carries the
    /// transformed document, or the error that stopped that target.
    pub fn transplant_many(
        &self,
        source: &WordDocument,
        targets: Vec<(String, WordDocument)>,
    ) -> Vec<(String, Result<(WordDocument, TransplantReport)>)> {
        targets
            .into_iter()
            .map(|(name, mut target)| {
                let result = self.run(source, &mut target).map(|report| (target, report));
                if let Err(e) = &result {
                    debug!(%name, error = %e, "target failed");
                }
                (name, result)
            })
            .collect()
    }
}
