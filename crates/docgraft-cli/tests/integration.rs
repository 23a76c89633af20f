//! Integration tests for the docgraft CLI
//!
//! These tests run the apply and inspect commands against DOCX files
//! written to a temporary directory.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use docgraft_cli::{apply_command, inspect_command};
use docgraft_ooxml::paragraph::runs;
use docgraft_ooxml::{Alignment, FormattingProfile, Settings, Slot, WordDocument};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

/// Create a DOCX with the given body paragraphs and a one-paragraph footer
fn create_test_docx(body: &str, footer: &str) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    // [Content_Types].xml
    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/>
</Types>"#).unwrap();

    // _rels/.rels
    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

    // word/_rels/document.xml.rels
    zip.start_file("word/_rels/document.xml.rels", options)
        .unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>
</Relationships>"#).unwrap();

    // word/document.xml
    zip.start_file("word/document.xml", options).unwrap();
    write!(
        zip,
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document {}><w:body>{}<w:sectPr><w:footerReference w:type="default" r:id="rId3"/></w:sectPr></w:body></w:document>"#,
        NS, body
    )
    .unwrap();

    // word/footer1.xml
    zip.start_file("word/footer1.xml", options).unwrap();
    write!(zip, "<w:ftr {}>{}</w:ftr>", NS, footer).unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn styled_source(dir: &Path) -> PathBuf {
    let bytes = create_test_docx(
        r#"<w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:rPr><w:rFonts w:ascii="Georgia" w:hAnsi="Georgia"/><w:b/><w:sz w:val="32"/></w:rPr><w:t>Heading</w:t></w:r></w:p>"#,
        r#"<w:p><w:pPr><w:jc w:val="right"/></w:pPr><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText>PAGE</w:instrText></w:r><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
    );
    write_file(dir, "styled.docx", &bytes)
}

fn plain_target(dir: &Path, name: &str) -> PathBuf {
    let bytes = create_test_docx(
        r#"<w:p><w:r><w:t>My heading</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t>old footer</w:t></w:r></w:p><w:p/>"#,
    );
    write_file(dir, name, &bytes)
}

#[test]
fn test_apply_writes_formatted_targets() {
    let temp = TempDir::new().unwrap();
    let source = styled_source(temp.path());
    let targets = vec![plain_target(temp.path(), "one.docx"), plain_target(temp.path(), "two.docx")];
    let out = temp.path().join("out");

    let outcomes = apply_command(&source, &targets, &out, None, &Settings::default()).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let formatted = out.join("one_formatted.docx");
    assert!(formatted.exists());
    assert!(out.join("two_formatted.docx").exists());

    let doc = WordDocument::open(&formatted).unwrap();
    let paragraph = doc.paragraphs()[0];
    assert_eq!(Alignment::of(paragraph), Alignment::Center);
    let profile = FormattingProfile::extract(runs(paragraph)[0]);
    assert!(profile.bold);
    assert_eq!(profile.font_name.as_deref(), Some("Georgia"));
    assert_eq!(profile.font_size, Some(16.0));

    let section = doc.first_section().unwrap();
    let footer = doc.slot_paragraphs(&section, Slot::Footer);
    assert_eq!(footer.len(), 1);
    assert_eq!(Alignment::of(footer[0]), Alignment::Right);

    // Inputs are left alone
    let original = WordDocument::open(&targets[0]).unwrap();
    assert_eq!(Alignment::of(original.paragraphs()[0]), Alignment::Inherit);
}

#[test]
fn test_apply_continues_past_broken_target() {
    let temp = TempDir::new().unwrap();
    let source = styled_source(temp.path());
    let broken = write_file(temp.path(), "broken.docx", b"not a zip file");
    let targets = vec![broken, plain_target(temp.path(), "good.docx")];

    let outcomes =
        apply_command(&source, &targets, temp.path(), None, &Settings::default()).unwrap();

    let failed: Vec<_> = outcomes.iter().filter(|o| !o.is_ok()).collect();
    assert_eq!(failed.len(), 1);
    assert!(failed[0].target.ends_with("broken.docx"));
    assert!(temp.path().join("good_formatted.docx").exists());
}

#[test]
fn test_apply_bundles_zip_with_custom_suffix() {
    let temp = TempDir::new().unwrap();
    let source = styled_source(temp.path());
    let targets = vec![plain_target(temp.path(), "a.docx"), plain_target(temp.path(), "b.docx")];
    let bundle = temp.path().join("bundle.zip");

    let mut settings = Settings::default();
    settings.output.suffix = "-styled".to_string();
    apply_command(&source, &targets, temp.path(), Some(&bundle), &settings).unwrap();

    let mut archive = ZipArchive::new(fs::File::open(&bundle).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["a-styled.docx", "b-styled.docx"]);

    let mut inner = Vec::new();
    archive
        .by_name("a-styled.docx")
        .unwrap()
        .read_to_end(&mut inner)
        .unwrap();
    assert!(WordDocument::from_bytes(&inner).is_ok());
}

#[test]
fn test_apply_same_stem_targets_get_distinct_outputs() {
    let temp = TempDir::new().unwrap();
    let source = styled_source(temp.path());
    for folder in ["a", "b"] {
        fs::create_dir(temp.path().join(folder)).unwrap();
    }
    let targets = vec![
        plain_target(&temp.path().join("a"), "report.docx"),
        plain_target(&temp.path().join("b"), "report.docx"),
    ];
    let out = temp.path().join("out");

    let outcomes = apply_command(&source, &targets, &out, None, &Settings::default()).unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));
    let outputs: Vec<_> = outcomes.iter().map(|o| o.output.clone().unwrap()).collect();
    assert_eq!(outputs[0], out.join("report_formatted.docx"));
    assert_eq!(outputs[1], out.join("report_formatted-2.docx"));
    for output in &outputs {
        assert!(WordDocument::open(output).is_ok());
    }

    let bundle = temp.path().join("bundle.zip");
    let outcomes =
        apply_command(&source, &targets, &out, Some(&bundle), &Settings::default()).unwrap();
    assert!(outcomes.iter().all(|o| o.is_ok()));

    let archive = ZipArchive::new(fs::File::open(&bundle).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    assert_eq!(names, vec!["report_formatted-2.docx", "report_formatted.docx"]);
}

#[test]
fn test_apply_missing_source() {
    let temp = TempDir::new().unwrap();
    let targets = vec![plain_target(temp.path(), "t.docx")];
    let result = apply_command(
        &temp.path().join("missing.docx"),
        &targets,
        temp.path(),
        None,
        &Settings::default(),
    );
    assert!(result.is_err());
}

#[test]
fn test_inspect_summarizes_document() {
    let temp = TempDir::new().unwrap();
    let source = styled_source(temp.path());

    let summary = inspect_command(&source).unwrap();
    assert_eq!(summary.paragraphs.len(), 1);
    assert_eq!(summary.paragraphs[0].text, "Heading");
    assert_eq!(summary.paragraphs[0].alignment, Alignment::Center);
    assert!(summary.paragraphs[0].runs[0].bold);
    assert_eq!(summary.sections.len(), 1);
    assert_eq!(summary.sections[0].header_paragraphs, 0);
    assert_eq!(summary.sections[0].footer_paragraphs, 1);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["paragraphs"][0]["alignment"], "center");
}
