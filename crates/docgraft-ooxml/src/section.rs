//! Section boundary transplant
//!
//! Rebuilds the header or footer of the target's first section from the
//! source's first section. The target slot is emptied of paragraphs and
//! refilled with one new paragraph per source paragraph, so both end up
//! with the same paragraph count.

use std::fmt;

use tracing::debug;

use crate::context::TransferContext;
use crate::diagnostics::{DiagnosticKind, Location};
use crate::document::WordDocument;
use crate::error::{DocumentRole, OoxmlError, Result};
use crate::field::{append_page_field, is_canonical, page_field_instruction};
use crate::paragraph::{plain_text, runs, runs_mut, Alignment};
use crate::relationships::Relationships;
use crate::run::{new_run, FormattingProfile};
use crate::xml::{qualify, XmlElement};

/// A section's header or footer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Header,
    Footer,
}

impl Slot {
    /// Element referencing the part from `w:sectPr`
    pub fn reference_name(self) -> &'static str {
        match self {
            Slot::Header => "headerReference",
            Slot::Footer => "footerReference",
        }
    }

    /// Local name of the part's root element
    pub fn root_name(self) -> &'static str {
        match self {
            Slot::Header => "hdr",
            Slot::Footer => "ftr",
        }
    }

    /// File name stem for new parts (`header` → `word/header1.xml`)
    pub fn part_stem(self) -> &'static str {
        match self {
            Slot::Header => "header",
            Slot::Footer => "footer",
        }
    }

    pub fn relationship_type(self) -> &'static str {
        match self {
            Slot::Header => Relationships::TYPE_HEADER,
            Slot::Footer => Relationships::TYPE_FOOTER,
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Slot::Header => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"
            }
            Slot::Footer => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"
            }
        }
    }

    /// Diagnostic location of the slot's `index`th paragraph
    pub fn location(self, index: usize) -> Location {
        match self {
            Slot::Header => Location::Header(index),
            Slot::Footer => Location::Footer(index),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.part_stem())
    }
}

/// Replace the target's first-section slot with a rebuild of the source's
///
/// Returns the number of paragraphs written. Fails with a structural error,
/// before touching the target, when either document has no sections. A
/// source without a part for the slot counts as an empty slot.
pub fn transplant_slot(
    source: &WordDocument,
    target: &mut WordDocument,
    slot: Slot,
    ctx: &mut TransferContext,
) -> Result<usize> {
    let source_section = source
        .first_section()
        .ok_or_else(|| OoxmlError::no_sections(DocumentRole::Source))?;
    let target_section = target
        .first_section()
        .ok_or_else(|| OoxmlError::no_sections(DocumentRole::Target))?;

    let source_paragraphs = source.slot_paragraphs(&source_section, slot);
    if source_paragraphs.is_empty() && target.slot_part(&target_section, slot).is_none() {
        debug!(%slot, "nothing to transplant");
        return Ok(0);
    }

    let root = target.slot_part_mut_or_create(slot)?;
    let prefix = root.prefix().map(str::to_string);
    let removed = root.remove_children("p");

    for (index, source_paragraph) in source_paragraphs.iter().enumerate() {
        ctx.set_location(slot.location(index));
        root.push(rebuild_paragraph(source_paragraph, prefix.as_deref(), ctx));
    }

    debug!(
        %slot,
        removed,
        written = source_paragraphs.len(),
        "slot transplanted"
    );
    Ok(source_paragraphs.len())
}

/// Build a fresh paragraph carrying the source's text and formatting
fn rebuild_paragraph(
    source: &XmlElement,
    prefix: Option<&str>,
    ctx: &mut TransferContext,
) -> XmlElement {
    let mut paragraph = XmlElement::new(qualify(prefix, "p"));

    let text = plain_text(source);
    if !text.is_empty() {
        paragraph.push(new_run(prefix, &text));
    }

    Alignment::of(source).apply(&mut paragraph);

    let profiles = runs(source).into_iter().map(FormattingProfile::extract);
    for (run, profile) in runs_mut(&mut paragraph).into_iter().zip(profiles) {
        profile.apply(run);
    }

    if ctx.page_fields() {
        if let Some(instruction) = page_field_instruction(source) {
            if !is_canonical(&instruction) {
                ctx.degrade(
                    DiagnosticKind::SimplifiedField,
                    format!("field `{}` rebuilt as PAGE", instruction.trim()),
                );
            }
            append_page_field(&mut paragraph);
        }
    }

    paragraph
}
