//! Word document package (`.docx`)
//!
//! [`WordDocument`] owns the package archive together with element trees
//! for `word/document.xml` and every header and footer part it references.
//! Trees are edited in place; [`WordDocument::to_bytes`] writes changed
//! parts back into a copy of the archive.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::debug;

use crate::archive::{OoxmlArchive, CONTENT_TYPES_PART, DOCUMENT_PART, DOCUMENT_RELS_PART};
use crate::error::{OoxmlError, Result};
use crate::numbering::NumberingDefinitions;
use crate::relationships::{resolve_part_path, Relationships};
use crate::section::Slot;
use crate::xml::{qualify, XmlDocument, XmlElement};

/// WordprocessingML main namespace
pub const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Namespace of `r:id` attributes
pub const OFFICE_RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Schema order of `w:sectPr` children (CT_SectPr)
const SECTPR_ORDER: &[&str] = &[
    "headerReference",
    "footerReference",
    "footnotePr",
    "endnotePr",
    "type",
    "pgSz",
    "pgMar",
    "paperSrc",
    "pgBorders",
    "lnNumType",
    "pgNumType",
    "cols",
    "formProt",
    "vAlign",
    "noEndnote",
    "titlePg",
    "textDirection",
    "bidi",
    "rtlGutter",
    "docGrid",
    "printerSettings",
    "sectPrChange",
];

/// Folder that `document.xml` relationships are relative to
const DOCUMENT_DIR: &str = "word";

/// A section boundary (`w:sectPr`) and its default header and footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position among the document's sections
    pub index: usize,
    /// Relationship id of the default header
    pub header: Option<String>,
    /// Relationship id of the default footer
    pub footer: Option<String>,
}

impl Section {
    /// Relationship id for a slot
    pub fn reference(&self, slot: Slot) -> Option<&str> {
        match slot {
            Slot::Header => self.header.as_deref(),
            Slot::Footer => self.footer.as_deref(),
        }
    }

    fn from_sect_pr(index: usize, sect_pr: &XmlElement) -> Self {
        Self {
            index,
            header: default_reference(sect_pr, Slot::Header.reference_name()),
            footer: default_reference(sect_pr, Slot::Footer.reference_name()),
        }
    }
}

/// A loaded `.docx` package
#[derive(Debug, Clone)]
pub struct WordDocument {
    archive: OoxmlArchive,
    document: XmlDocument,
    relationships: Relationships,
    parts: BTreeMap<String, XmlDocument>,
    dirty: BTreeSet<String>,
    rels_modified: bool,
}

impl WordDocument {
    /// Open a document from disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_archive(OoxmlArchive::open(path)?)
    }

    /// Load a document from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_archive(OoxmlArchive::from_bytes(bytes)?)
    }

    /// Load a document from an already-read archive
    pub fn from_archive(archive: OoxmlArchive) -> Result<Self> {
        let document = XmlDocument::parse(archive.require(DOCUMENT_PART)?)?;
        if !document.root.is("document") || document.root.child("body").is_none() {
            return Err(OoxmlError::InvalidStructure(format!(
                "{} has no w:document/w:body",
                DOCUMENT_PART
            )));
        }

        let relationships = match archive.get(DOCUMENT_RELS_PART) {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::new(),
        };

        let mut parts = BTreeMap::new();
        for (id, rel) in relationships.iter() {
            let is_slot = rel.rel_type == Relationships::TYPE_HEADER
                || rel.rel_type == Relationships::TYPE_FOOTER;
            if !is_slot {
                continue;
            }
            let Some(path) = relationships.resolve(id, DOCUMENT_DIR) else {
                continue;
            };
            if let Some(xml) = archive.get(&path) {
                let part = XmlDocument::parse(xml)?;
                parts.insert(path, part);
            }
        }
        debug!(parts = parts.len(), "loaded header and footer parts");

        Ok(Self {
            archive,
            document,
            relationships,
            parts,
            dirty: BTreeSet::new(),
            rels_modified: false,
        })
    }

    /// The underlying package
    pub fn archive(&self) -> &OoxmlArchive {
        &self.archive
    }

    /// Relationships of `word/document.xml`
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Body paragraphs (direct `w:p` children of `w:body`)
    pub fn paragraphs(&self) -> Vec<&XmlElement> {
        match self.document.root.child("body") {
            Some(body) => body.children_named("p").collect(),
            None => Vec::new(),
        }
    }

    /// Body paragraphs, mutably
    pub fn paragraphs_mut(&mut self) -> Vec<&mut XmlElement> {
        self.dirty.insert(DOCUMENT_PART.to_string());
        match self.document.root.child_mut("body") {
            Some(body) => body.elements_mut().filter(|e| e.is("p")).collect(),
            None => Vec::new(),
        }
    }

    /// Every section, in document order
    pub fn sections(&self) -> Vec<Section> {
        let Some(body) = self.document.root.child("body") else {
            return Vec::new();
        };

        let in_paragraphs = body
            .children_named("p")
            .filter_map(|p| p.child("pPr").and_then(|ppr| ppr.child("sectPr")));
        in_paragraphs
            .chain(body.child("sectPr"))
            .enumerate()
            .map(|(index, sect_pr)| Section::from_sect_pr(index, sect_pr))
            .collect()
    }

    /// The first section, if the document has any
    pub fn first_section(&self) -> Option<Section> {
        self.sections().into_iter().next()
    }

    /// Package path of a section's header or footer part
    pub fn slot_path(&self, section: &Section, slot: Slot) -> Option<String> {
        let id = section.reference(slot)?;
        self.relationships.resolve(id, DOCUMENT_DIR)
    }

    /// Root element (`w:hdr`/`w:ftr`) of a section's header or footer
    pub fn slot_part(&self, section: &Section, slot: Slot) -> Option<&XmlElement> {
        let path = self.slot_path(section, slot)?;
        self.parts.get(&path).map(|part| &part.root)
    }

    /// Paragraphs of a section's header or footer (empty when it has none)
    pub fn slot_paragraphs(&self, section: &Section, slot: Slot) -> Vec<&XmlElement> {
        match self.slot_part(section, slot) {
            Some(root) => root.children_named("p").collect(),
            None => Vec::new(),
        }
    }

    /// Root of the first section's header or footer, creating the part if needed
    ///
    /// A new part is registered in the document relationships and content
    /// types, and referenced from the first section as its default.
    pub fn slot_part_mut_or_create(&mut self, slot: Slot) -> Result<&mut XmlElement> {
        let section = self
            .first_section()
            .ok_or_else(|| OoxmlError::InvalidStructure("document has no sections".to_string()))?;

        let path = match self.slot_path(&section, slot) {
            Some(path) if self.parts.contains_key(&path) => path,
            Some(path) => {
                // Dangling reference: give it a fresh part
                self.insert_part(&path, slot)?;
                path
            }
            None => self.create_slot_part(slot)?,
        };

        self.dirty.insert(path.clone());
        self.parts
            .get_mut(&path)
            .map(|part| &mut part.root)
            .ok_or_else(|| OoxmlError::MissingFile(path))
    }

    /// Numbering ids defined by the document, if it has a numbering part
    pub fn numbering_definitions(&self) -> Result<Option<NumberingDefinitions>> {
        let path = self
            .relationships
            .first_of_type(Relationships::TYPE_NUMBERING)
            .map(|target| resolve_part_path(DOCUMENT_DIR, target));
        match path.and_then(|path| self.archive.get(&path)) {
            Some(xml) => Ok(Some(NumberingDefinitions::parse(xml)?)),
            None => Ok(None),
        }
    }

    /// Serialize the package with every edited part written back
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut archive = self.archive.clone();
        self.write_parts(&mut archive);
        archive.to_bytes()
    }

    /// Write the package to disk
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut archive = self.archive.clone();
        self.write_parts(&mut archive);
        archive.write_to_file(path)
    }

    fn write_parts(&self, archive: &mut OoxmlArchive) {
        for path in &self.dirty {
            if path == DOCUMENT_PART {
                archive.set(DOCUMENT_PART, self.document.to_bytes());
            } else if let Some(part) = self.parts.get(path) {
                archive.set(path.clone(), part.to_bytes());
            }
        }
        if self.rels_modified {
            archive.set_string(DOCUMENT_RELS_PART, self.relationships.to_xml());
        }
    }

    fn create_slot_part(&mut self, slot: Slot) -> Result<String> {
        let folder = format!("{}/", DOCUMENT_DIR);
        let name = (1..)
            .map(|n| format!("{}{}.xml", slot.part_stem(), n))
            .find(|name| {
                let path = format!("{}{}", folder, name);
                !self.archive.contains(&path) && !self.parts.contains_key(&path)
            })
            .unwrap_or_else(|| format!("{}.xml", slot.part_stem()));
        let path = format!("{}{}", folder, name);

        self.insert_part(&path, slot)?;
        let id = self.relationships.add(name, slot.relationship_type());
        self.rels_modified = true;
        self.add_reference(slot, &id)?;

        debug!(%path, %id, "created {} part", slot);
        Ok(path)
    }

    fn insert_part(&mut self, path: &str, slot: Slot) -> Result<()> {
        let root = XmlElement::new(qualify(Some("w"), slot.root_name()))
            .with_attr("xmlns:w", WORDPROCESSING_NS)
            .with_attr("xmlns:r", OFFICE_RELATIONSHIPS_NS);
        self.parts.insert(path.to_string(), XmlDocument::new(root));
        self.register_content_type(path, slot.content_type())
    }

    fn register_content_type(&mut self, path: &str, content_type: &str) -> Result<()> {
        let mut types = XmlDocument::parse(self.archive.require(CONTENT_TYPES_PART)?)?;
        let part_name = format!("/{}", path);

        let registered = types
            .root
            .children_named("Override")
            .any(|o| o.attr("PartName") == Some(part_name.as_str()));
        if !registered {
            types.root.push(
                XmlElement::new("Override")
                    .with_attr("PartName", part_name)
                    .with_attr("ContentType", content_type),
            );
            self.archive.set(CONTENT_TYPES_PART, types.to_bytes());
        }
        Ok(())
    }

    fn add_reference(&mut self, slot: Slot, id: &str) -> Result<()> {
        let r_prefix = self.ensure_relationships_prefix();
        let sect_pr = self.first_sect_pr_mut().ok_or_else(|| {
            OoxmlError::InvalidStructure("document has no sections".to_string())
        })?;

        let reference = XmlElement::new(sect_pr.qualified(slot.reference_name()))
            .with_attr(sect_pr.qualified("type"), "default")
            .with_attr(qualify(Some(&r_prefix), "id"), id);
        sect_pr.insert_ordered(reference, SECTPR_ORDER);
        self.dirty.insert(DOCUMENT_PART.to_string());
        Ok(())
    }

    /// Prefix bound to the office relationships namespace on the root, declaring `r` if absent
    fn ensure_relationships_prefix(&mut self) -> String {
        let root = &mut self.document.root;
        let declared = root.attributes.iter().find_map(|(key, value)| {
            (value == OFFICE_RELATIONSHIPS_NS)
                .then(|| key.strip_prefix("xmlns:"))
                .flatten()
                .map(str::to_string)
        });
        match declared {
            Some(prefix) => prefix,
            None => {
                root.attributes
                    .push(("xmlns:r".to_string(), OFFICE_RELATIONSHIPS_NS.to_string()));
                "r".to_string()
            }
        }
    }

    fn first_sect_pr_mut(&mut self) -> Option<&mut XmlElement> {
        let body = self.document.root.child_mut("body")?;
        let in_paragraph = body.elements().position(|e| {
            e.is("p") && e.child("pPr").is_some_and(|ppr| ppr.child("sectPr").is_some())
        });
        match in_paragraph {
            Some(index) => body
                .elements_mut()
                .nth(index)?
                .child_mut("pPr")?
                .child_mut("sectPr"),
            None => body.child_mut("sectPr"),
        }
    }
}

/// Id of the default-typed reference, else of the first untyped one
fn default_reference(sect_pr: &XmlElement, reference_name: &str) -> Option<String> {
    let default = sect_pr
        .children_named(reference_name)
        .find(|r| r.attr("type") == Some("default"))
        .or_else(|| {
            sect_pr
                .children_named(reference_name)
                .find(|r| r.attr("type").is_none())
        })?;
    default.attr("id").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DocxBuilder;

    #[test]
    fn test_body_paragraphs_and_sections() {
        let bytes = DocxBuilder::new()
            .paragraph(r#"<w:p><w:r><w:t>One</w:t></w:r></w:p>"#)
            .paragraph(
                r#"<w:p><w:pPr><w:sectPr><w:headerReference w:type="first" r:id="rId10"/></w:sectPr></w:pPr></w:p>"#,
            )
            .header("Header text")
            .build();
        let doc = WordDocument::from_bytes(&bytes).unwrap();

        assert_eq!(doc.paragraphs().len(), 2);

        let sections = doc.sections();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].index, 0);
        assert_eq!(sections[0].header, None);
        assert_eq!(sections[1].header.as_deref(), Some("rIdHeader"));
    }

    #[test]
    fn test_default_reference_prefers_default_type() {
        let xml = br#"<w:sectPr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:headerReference w:type="even" r:id="rId1"/><w:headerReference w:type="default" r:id="rId2"/><w:footerReference r:id="rId3"/></w:sectPr>"#;
        let sect_pr = XmlDocument::parse(xml).unwrap().root;
        assert_eq!(default_reference(&sect_pr, "headerReference").as_deref(), Some("rId2"));
        assert_eq!(default_reference(&sect_pr, "footerReference").as_deref(), Some("rId3"));
    }

    #[test]
    fn test_slot_part_loaded() {
        let bytes = DocxBuilder::new()
            .paragraph(r#"<w:p><w:r><w:t>Body</w:t></w:r></w:p>"#)
            .footer("Footer text")
            .build();
        let doc = WordDocument::from_bytes(&bytes).unwrap();

        let section = doc.first_section().unwrap();
        assert!(doc.slot_part(&section, Slot::Header).is_none());
        let footer = doc.slot_paragraphs(&section, Slot::Footer);
        assert_eq!(footer.len(), 1);
        assert_eq!(footer[0].text(), "Footer text");
    }

    #[test]
    fn test_create_slot_part_registers_everything() {
        let bytes = DocxBuilder::new()
            .paragraph(r#"<w:p><w:r><w:t>Body</w:t></w:r></w:p>"#)
            .build();
        let mut doc = WordDocument::from_bytes(&bytes).unwrap();

        let root = doc.slot_part_mut_or_create(Slot::Header).unwrap();
        assert_eq!(root.name, "w:hdr");

        let saved = WordDocument::from_bytes(&doc.to_bytes().unwrap()).unwrap();
        let section = saved.first_section().unwrap();
        let id = section.header.clone().unwrap();
        assert_eq!(
            saved.relationships().get_target(&id).unwrap().rel_type,
            Relationships::TYPE_HEADER
        );

        let path = saved.slot_path(&section, Slot::Header).unwrap();
        assert_eq!(path, "word/header1.xml");
        assert!(saved.archive().contains(&path));

        let types = saved.archive().get_string(CONTENT_TYPES_PART).unwrap();
        assert!(types.contains("/word/header1.xml"));
        assert!(types.contains(Slot::Header.content_type()));
    }

    #[test]
    fn test_untouched_document_round_trips_unchanged_parts() {
        let bytes = DocxBuilder::new()
            .paragraph(r#"<w:p><w:r><w:t>Body</w:t></w:r></w:p>"#)
            .header("H")
            .build();
        let original = OoxmlArchive::from_bytes(&bytes).unwrap();
        let doc = WordDocument::from_bytes(&bytes).unwrap();
        let saved = OoxmlArchive::from_bytes(&doc.to_bytes().unwrap()).unwrap();

        assert_eq!(saved.get(DOCUMENT_PART), original.get(DOCUMENT_PART));
        assert_eq!(saved.get("word/header1.xml"), original.get("word/header1.xml"));
    }

    #[test]
    fn test_missing_body_is_invalid() {
        let mut archive = OoxmlArchive::new();
        archive.set_string(
            DOCUMENT_PART,
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        );
        let result = WordDocument::from_archive(archive);
        assert!(matches!(result, Err(OoxmlError::InvalidStructure(_))));
    }

    #[test]
    fn test_numbering_definitions() {
        let bytes = DocxBuilder::new()
            .paragraph(r#"<w:p/>"#)
            .numbering(&["1", "2"])
            .build();
        let doc = WordDocument::from_bytes(&bytes).unwrap();
        let defs = doc.numbering_definitions().unwrap().unwrap();
        assert!(defs.contains("2"));

        let bytes = DocxBuilder::new().paragraph(r#"<w:p/>"#).build();
        let doc = WordDocument::from_bytes(&bytes).unwrap();
        assert!(doc.numbering_definitions().unwrap().is_none());
    }
}
