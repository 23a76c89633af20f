//! Part relationships (`_rels/*.rels`)
//!
//! Sections reference their header and footer parts through relationship
//! IDs in `word/_rels/document.xml.rels`. This module resolves those IDs to
//! package paths and registers new parts when a target needs one.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OoxmlError, Result};

/// OOXML namespace for relationships
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Parsed relationships from a .rels file
///
/// Keeps insertion order so that rewritten files diff cleanly.
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, RelationshipTarget>,
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

/// A relationship target with its type and mode
#[derive(Debug, Clone)]
pub struct RelationshipTarget {
    /// The target path, relative to the owning part's folder
    pub target: String,
    /// The relationship type URI
    pub rel_type: String,
    /// "External" for URLs, None for package parts
    pub target_mode: Option<String>,
}

impl Relationships {
    /// Header part relationship type
    pub const TYPE_HEADER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
    /// Footer part relationship type
    pub const TYPE_FOOTER: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
    /// Numbering definitions relationship type
    pub const TYPE_NUMBERING: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";

    /// Create an empty relationships map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse relationships from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut max_id: u32 = 0;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            if let Some(num) = extract_id_number(&id) {
                                max_id = max_id.max(num);
                            }
                            rels.order.push(id.clone());
                            rels.map.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode,
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OoxmlError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        rels.next_id_counter = max_id + 1;
        Ok(rels)
    }

    /// Add an internal relationship and return the generated ID
    pub fn add(&mut self, target: impl Into<String>, rel_type: impl Into<String>) -> String {
        let mut id = format!("rId{}", self.next_id_counter);
        while self.map.contains_key(&id) {
            self.next_id_counter += 1;
            id = format!("rId{}", self.next_id_counter);
        }
        self.next_id_counter += 1;

        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode: None,
            },
        );
        id
    }

    /// Serialize relationships to OOXML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str("<Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            if let Some(mode) = &rel.target_mode {
                xml.push_str(&format!(r#" TargetMode="{}""#, escape_xml(mode)));
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Get the target for a relationship ID
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Get the full relationship for an ID
    pub fn get_target(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Resolve an ID to a package path, given the folder of the owning part
    ///
    /// External targets resolve to nothing.
    pub fn resolve(&self, id: &str, base_dir: &str) -> Option<String> {
        let rel = self.map.get(id)?;
        if rel.target_mode.as_deref() == Some("External") {
            return None;
        }
        Some(resolve_part_path(base_dir, &rel.target))
    }

    /// First target of a given relationship type
    pub fn first_of_type(&self, rel_type: &str) -> Option<&str> {
        self.iter()
            .find(|(_, rel)| rel.rel_type == rel_type)
            .map(|(_, rel)| rel.target.as_str())
    }

    /// Get the number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if there are no relationships
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over relationships in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }
}

/// Join a relationship target onto the owning part's folder
///
/// Handles absolute targets (`/word/header1.xml`) and `..` segments.
pub fn resolve_part_path(base_dir: &str, target: &str) -> String {
    let joined = match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None if base_dir.is_empty() => target.to_string(),
        None => format!("{}/{}", base_dir.trim_end_matches('/'), target),
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Extract the numeric portion from a relationship ID (e.g., "rId5" -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

/// Escape special XML characters in attribute values
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
