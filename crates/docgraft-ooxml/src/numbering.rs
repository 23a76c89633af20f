//! List marker transplant
//!
//! A paragraph is a list item exactly when its properties carry a
//! `w:numPr` element. The marker is copied by value: the target gets a
//! freshly built `w:numPr` that points at the same numbering definition id.
//! Numbering glyphs take their font from the paragraph's runs, so the
//! source's first-run font travels with the marker.

use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

use crate::error::{OoxmlError, Result};
use crate::paragraph::{runs, runs_mut, PPR_ORDER};
use crate::run::{apply_font, font_of};
use crate::xml::{qualify, XmlElement};

/// What to do with a `w:numPr` already present on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberingPolicy {
    /// Remove the existing element before adding the new one
    #[default]
    Replace,
    /// Keep it and add a second one
    Append,
}

/// A paragraph's link to a numbering definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListMarker {
    /// `w:numId` value, copied verbatim
    pub numbering_id: String,
    /// `w:ilvl` value (0 when absent)
    pub indent_level: u32,
    /// Font face of the source's first run
    pub font_name: Option<String>,
    /// Font size of the source's first run, in points
    pub font_size: Option<f32>,
}

/// Check whether a paragraph is a list item
pub fn is_list(paragraph: &XmlElement) -> bool {
    paragraph
        .child("pPr")
        .is_some_and(|ppr| ppr.child("numPr").is_some())
}

impl ListMarker {
    /// Read the marker of a list paragraph
    ///
    /// Returns `None` for non-list paragraphs and for `w:numPr` without a
    /// `w:numId`, whose numbering comes from the paragraph style.
    pub fn extract(paragraph: &XmlElement) -> Option<Self> {
        let num_pr = paragraph.child("pPr")?.child("numPr")?;
        let numbering_id = num_pr.child("numId")?.attr("val")?.to_string();
        let indent_level = num_pr
            .child("ilvl")
            .and_then(|ilvl| ilvl.attr("val"))
            .and_then(|val| val.trim().parse().ok())
            .unwrap_or(0);

        let (font_name, font_size) = runs(paragraph)
            .first()
            .map(|run| font_of(run))
            .unwrap_or((None, None));

        Some(Self {
            numbering_id,
            indent_level,
            font_name,
            font_size,
        })
    }

    /// Attach this marker to a paragraph and apply its font to every run
    ///
    /// Returns `true` when an existing `w:numPr` was left in place next to
    /// the new one (only under [`NumberingPolicy::Append`]).
    pub fn apply(&self, paragraph: &mut XmlElement, policy: NumberingPolicy) -> bool {
        let prefix = paragraph.prefix().map(str::to_string);
        let prefix = prefix.as_deref();
        let ppr = paragraph.ensure_leading_child("pPr");

        let duplicate = match policy {
            NumberingPolicy::Replace => {
                ppr.remove_children("numPr");
                false
            }
            NumberingPolicy::Append => ppr.child("numPr").is_some(),
        };
        ppr.insert_ordered(self.build_num_pr(prefix), PPR_ORDER);

        for run in runs_mut(paragraph) {
            apply_font(run, self.font_name.as_deref(), self.font_size);
        }
        duplicate
    }

    /// Build a `w:numPr` element for this marker
    pub fn build_num_pr(&self, prefix: Option<&str>) -> XmlElement {
        let val = qualify(prefix, "val");
        XmlElement::new(qualify(prefix, "numPr"))
            .with_child(
                XmlElement::new(qualify(prefix, "ilvl"))
                    .with_attr(val.clone(), self.indent_level.to_string()),
            )
            .with_child(
                XmlElement::new(qualify(prefix, "numId"))
                    .with_attr(val, self.numbering_id.clone()),
            )
    }
}

/// The `w:num` ids defined in a numbering part
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    ids: HashSet<String>,
}

impl NumberingDefinitions {
    /// Parse `word/numbering.xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut ids = HashSet::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"num" {
                        let id = e
                            .attributes()
                            .filter_map(|a| a.ok())
                            .find(|a| a.key.local_name().as_ref() == b"numId")
                            .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
                        if let Some(id) = id {
                            ids.insert(id);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { ids })
    }

    /// Check whether an id is defined
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Number of defined ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if no ids are defined
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Consume into the set of ids
    pub fn into_ids(self) -> HashSet<String> {
        self.ids
    }
}
