//! Shared test fixtures for docgraft-ooxml
//!
//! [`DocxBuilder`] assembles a small but complete `.docx` in memory: body
//! paragraphs, an optional default header and footer referenced from the
//! body-level `w:sectPr`, and an optional numbering part.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NAMESPACES: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

/// Builder for in-memory DOCX fixtures
#[derive(Debug, Clone)]
pub struct DocxBuilder {
    paragraphs: Vec<String>,
    header: Option<String>,
    footer: Option<String>,
    numbering: Option<Vec<String>>,
    sections: bool,
}

impl Default for DocxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            paragraphs: Vec::new(),
            header: None,
            footer: None,
            numbering: None,
            sections: true,
        }
    }

    /// Append a body paragraph, given as a complete `<w:p>` element
    pub fn paragraph(mut self, xml: &str) -> Self {
        self.paragraphs.push(xml.to_string());
        self
    }

    /// Default header with one plain paragraph
    pub fn header(self, text: &str) -> Self {
        let xml = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text);
        self.header_xml(&xml)
    }

    /// Default header with the given content inside `<w:hdr>`
    pub fn header_xml(mut self, xml: &str) -> Self {
        self.header = Some(xml.to_string());
        self
    }

    /// Default footer with one plain paragraph
    pub fn footer(self, text: &str) -> Self {
        let xml = format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", text);
        self.footer_xml(&xml)
    }

    /// Default footer with the given content inside `<w:ftr>`
    pub fn footer_xml(mut self, xml: &str) -> Self {
        self.footer = Some(xml.to_string());
        self
    }

    /// Add `word/numbering.xml` defining the given `w:numId`s
    pub fn numbering(mut self, ids: &[&str]) -> Self {
        self.numbering = Some(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Leave out the body-level `w:sectPr`
    pub fn without_sections(mut self) -> Self {
        self.sections = false;
        self
    }

    /// Build the DOCX bytes
    pub fn build(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        let mut put = |path: &str, contents: &str| {
            zip.start_file(path, options).unwrap();
            zip.write_all(contents.as_bytes()).unwrap();
        };

        put("[Content_Types].xml", &self.content_types());
        put(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#,
        );
        put("word/_rels/document.xml.rels", &self.document_rels());
        put("word/document.xml", &self.document_xml());

        if let Some(header) = &self.header {
            put("word/header1.xml", &format!("<w:hdr {}>{}</w:hdr>", NAMESPACES, header));
        }
        if let Some(footer) = &self.footer {
            put("word/footer1.xml", &format!("<w:ftr {}>{}</w:ftr>", NAMESPACES, footer));
        }
        if let Some(ids) = &self.numbering {
            put("word/numbering.xml", &numbering_xml(ids));
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        if self.header.is_some() {
            xml.push_str(r#"<Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/>"#);
        }
        if self.footer.is_some() {
            xml.push_str(r#"<Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>"#);
        }
        if self.numbering.is_some() {
            xml.push_str(r#"<Override PartName="/word/numbering.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml"/>"#);
        }
        xml.push_str("</Types>");
        xml
    }

    fn document_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        if self.header.is_some() {
            xml.push_str(r#"<Relationship Id="rIdHeader" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/>"#);
        }
        if self.footer.is_some() {
            xml.push_str(r#"<Relationship Id="rIdFooter" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>"#);
        }
        if self.numbering.is_some() {
            xml.push_str(r#"<Relationship Id="rIdNumbering" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering" Target="numbering.xml"/>"#);
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn document_xml(&self) -> String {
        let mut body = self.paragraphs.concat();
        if self.sections {
            body.push_str("<w:sectPr>");
            if self.header.is_some() {
                body.push_str(r#"<w:headerReference w:type="default" r:id="rIdHeader"/>"#);
            }
            if self.footer.is_some() {
                body.push_str(r#"<w:footerReference w:type="default" r:id="rIdFooter"/>"#);
            }
            body.push_str(r#"<w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#);
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {}><w:body>{}</w:body></w:document>"#,
            NAMESPACES, body
        )
    }
}

fn numbering_xml(ids: &[String]) -> String {
    let nums: String = ids
        .iter()
        .map(|id| format!(r#"<w:num w:numId="{}"><w:abstractNumId w:val="0"/></w:num>"#, id))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering {}><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/><w:lvlText w:val="-"/></w:lvl></w:abstractNum>{}</w:numbering>"#,
        NAMESPACES, nums
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::OoxmlArchive;

    #[test]
    fn test_builder_writes_requested_parts() {
        let bytes = DocxBuilder::new()
            .paragraph("<w:p/>")
            .header("H")
            .numbering(&["1"])
            .build();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();

        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.contains("word/header1.xml"));
        assert!(!archive.contains("word/footer1.xml"));
        assert!(archive.contains("word/numbering.xml"));

        let document = archive.get_string("word/document.xml").unwrap();
        assert!(document.contains("rIdHeader"));
        assert!(document.contains("w:sectPr"));
    }

    #[test]
    fn test_builder_without_sections() {
        let bytes = DocxBuilder::new().paragraph("<w:p/>").without_sections().build();
        let archive = OoxmlArchive::from_bytes(&bytes).unwrap();
        let document = archive.get_string("word/document.xml").unwrap();
        assert!(!document.contains("sectPr"));
    }
}
