//! Paragraph formatting transfer

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::TransferContext;
use crate::diagnostics::DiagnosticKind;
use crate::numbering::ListMarker;
use crate::run::{run_text, FormattingProfile};
use crate::xml::{qualify, XmlElement};

/// Schema order of `w:pPr` children (CT_PPr)
pub const PPR_ORDER: &[&str] = &[
    "pStyle",
    "keepNext",
    "keepLines",
    "pageBreakBefore",
    "framePr",
    "widowControl",
    "numPr",
    "suppressLineNumbers",
    "pBdr",
    "shd",
    "tabs",
    "suppressAutoHyphens",
    "kinsoku",
    "wordWrap",
    "overflowPunct",
    "topLinePunct",
    "autoSpaceDE",
    "autoSpaceDN",
    "bidi",
    "adjustRightInd",
    "snapToGrid",
    "spacing",
    "ind",
    "contextualSpacing",
    "mirrorIndents",
    "suppressOverlap",
    "jc",
    "textDirection",
    "textAlignment",
    "textboxTightWrap",
    "outlineLvl",
    "divId",
    "cnfStyle",
    "rPr",
    "sectPr",
    "pPrChange",
];

/// Horizontal alignment of a paragraph (`w:jc`)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    /// `both`
    Justify,
    Distribute,
    /// Any other `w:jc` value, kept verbatim
    Other(String),
    /// No `w:jc`; the style decides
    #[default]
    Inherit,
}

impl Alignment {
    /// Map a `w:jc/@w:val` value
    pub fn from_val(val: &str) -> Self {
        match val {
            "left" | "start" => Alignment::Left,
            "center" => Alignment::Center,
            "right" | "end" => Alignment::Right,
            "both" => Alignment::Justify,
            "distribute" => Alignment::Distribute,
            other => Alignment::Other(other.to_string()),
        }
    }

    /// The `w:val` to write, or `None` for [`Alignment::Inherit`]
    pub fn as_val(&self) -> Option<&str> {
        match self {
            Alignment::Left => Some("left"),
            Alignment::Center => Some("center"),
            Alignment::Right => Some("right"),
            Alignment::Justify => Some("both"),
            Alignment::Distribute => Some("distribute"),
            Alignment::Other(val) => Some(val),
            Alignment::Inherit => None,
        }
    }

    /// Read a paragraph's alignment
    pub fn of(paragraph: &XmlElement) -> Self {
        paragraph
            .child("pPr")
            .and_then(|ppr| ppr.child("jc"))
            .and_then(|jc| jc.attr("val"))
            .map(Self::from_val)
            .unwrap_or_default()
    }

    /// Overwrite a paragraph's alignment
    pub fn apply(&self, paragraph: &mut XmlElement) {
        match self.as_val() {
            Some(val) => {
                let prefix = paragraph.prefix().map(str::to_string);
                let jc = paragraph
                    .ensure_leading_child("pPr")
                    .ensure_child("jc", PPR_ORDER);
                jc.set_attr(qualify(prefix.as_deref(), "val"), val);
            }
            None => {
                if let Some(ppr) = paragraph.child_mut("pPr") {
                    ppr.remove_children("jc");
                }
            }
        }
    }
}

/// Direct runs of a paragraph, in document order
///
/// Runs nested in `w:hyperlink` are left out; they keep the formatting of
/// their hyperlink style.
pub fn runs(paragraph: &XmlElement) -> Vec<&XmlElement> {
    paragraph.children_named("r").collect()
}

/// Mutable counterpart of [`runs`]
pub fn runs_mut(paragraph: &mut XmlElement) -> Vec<&mut XmlElement> {
    paragraph.elements_mut().filter(|e| e.is("r")).collect()
}

/// Visible text of a paragraph, hyperlink text included
pub fn plain_text(paragraph: &XmlElement) -> String {
    let mut text = String::new();
    for child in paragraph.elements() {
        if child.is("r") {
            text.push_str(&run_text(child));
        } else if child.is("hyperlink") {
            for run in child.children_named("r") {
                text.push_str(&run_text(run));
            }
        }
    }
    text
}

/// Transfer list marker, alignment and run formatting from `source` to `target`
///
/// Runs are paired by position up to the shorter run list. Extra target
/// runs keep their formatting.
pub fn transfer_paragraph(source: &XmlElement, target: &mut XmlElement, ctx: &mut TransferContext) {
    if let Some(marker) = ListMarker::extract(source) {
        if marker.apply(target, ctx.numbering_policy()) {
            ctx.degrade(
                DiagnosticKind::DuplicateNumbering,
                format!(
                    "numbering {} added next to an existing one",
                    marker.numbering_id
                ),
            );
        }
        if ctx.is_numbering_defined(&marker.numbering_id) == Some(false) {
            ctx.degrade(
                DiagnosticKind::UndefinedNumbering,
                format!("target defines no numbering {}", marker.numbering_id),
            );
        }
    }

    Alignment::of(source).apply(target);

    let profiles: Vec<FormattingProfile> = runs(source)
        .into_iter()
        .map(FormattingProfile::extract)
        .collect();
    if profiles.is_empty() {
        return;
    }

    let mut target_runs = runs_mut(target);
    if target_runs.is_empty() {
        return;
    }
    if target_runs.len() != profiles.len() {
        ctx.degrade(
            DiagnosticKind::RunCountMismatch,
            format!(
                "{} source runs, {} target runs",
                profiles.len(),
                target_runs.len()
            ),
        );
    }

    let paired = profiles.len().min(target_runs.len());
    for (run, profile) in target_runs.iter_mut().zip(&profiles) {
        profile.apply(run);
    }
    debug!(paired, "paragraph runs transferred");
}
