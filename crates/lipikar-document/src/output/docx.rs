// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DOCX output. A minimal WordprocessingML package: content types, package
// relationships, core properties and a single document part holding one
// `<w:p>` per paragraph.

use std::io::{Cursor, Write};
use std::path::Path;

use lipikar_core::error::{LipikarError, Result};
use tracing::{debug, info, instrument};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use super::{DocumentSink, write_output};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

const DOCUMENT_TAIL: &str = "<w:sectPr/></w:body></w:document>";

/// Word document assembled in memory and written in one go on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocxDocument {
    title: String,
    paragraphs: Vec<String>,
}

impl DocxDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            paragraphs: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Body of `word/document.xml`.
    pub fn document_xml(&self) -> String {
        let mut xml = String::from(DOCUMENT_HEAD);
        for paragraph in &self.paragraphs {
            push_paragraph(&mut xml, paragraph);
        }
        xml.push_str(DOCUMENT_TAIL);
        xml
    }

    fn core_xml(&self) -> String {
        let mut title = String::new();
        push_escaped(&mut title, &self.title);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{title}</dc:title><dc:creator>lipikar</dc:creator></cp:coreProperties>"#
        )
    }

    /// Serialize the package to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            ("docProps/core.xml", self.core_xml()),
            ("word/document.xml", self.document_xml()),
        ];

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(name, options)
                .map_err(|err| LipikarError::Save(format!("failed to start {name}: {err}")))?;
            zip.write_all(body.as_bytes())
                .map_err(|err| LipikarError::Save(format!("failed to write {name}: {err}")))?;
            debug!(part = name, bytes = body.len(), "DOCX part written");
        }
        let cursor = zip
            .finish()
            .map_err(|err| LipikarError::Save(format!("failed to finish DOCX package: {err}")))?;
        Ok(cursor.into_inner())
    }
}

impl DocumentSink for DocxDocument {
    fn append_paragraph(&mut self, text: &str) {
        self.paragraphs.push(text.to_string());
    }

    fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        write_output(path, &bytes)?;
        info!(
            paragraphs = self.paragraphs.len(),
            bytes = bytes.len(),
            "DOCX document saved"
        );
        Ok(())
    }
}

/// Characters allowed in XML 1.0 content.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}')
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars().filter(|c| is_xml_char(*c)) {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Append one paragraph as a single run. Newlines become `<w:br/>`, tabs
/// `<w:tab/>`; carriage returns and invalid characters are dropped.
fn push_paragraph(xml: &mut String, text: &str) {
    let mut run = String::new();
    let mut segment = String::new();

    let flush = |run: &mut String, segment: &mut String| {
        if !segment.is_empty() {
            run.push_str(r#"<w:t xml:space="preserve">"#);
            push_escaped(run, segment);
            run.push_str("</w:t>");
            segment.clear();
        }
    };

    for c in text.chars() {
        match c {
            '\n' => {
                flush(&mut run, &mut segment);
                run.push_str("<w:br/>");
            }
            '\t' => {
                flush(&mut run, &mut segment);
                run.push_str("<w:tab/>");
            }
            '\r' => {}
            c if is_xml_char(c) => segment.push(c),
            _ => {}
        }
    }
    flush(&mut run, &mut segment);

    if run.is_empty() {
        xml.push_str("<w:p/>");
    } else {
        xml.push_str("<w:p><w:r>");
        xml.push_str(&run);
        xml.push_str("</w:r></w:p>");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;

    fn read_part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut body = String::new();
        part.read_to_string(&mut body).unwrap();
        body
    }

    #[test]
    fn one_paragraph_element_per_appended_paragraph() {
        let mut doc = DocxDocument::new("scan");
        doc.append_paragraph("Hello world");
        doc.append_paragraph("cat");
        doc.append_paragraph("[OCR failed for page 3]");

        let xml = doc.document_xml();
        assert_eq!(xml.matches("<w:p>").count(), 3);
        let hello = xml.find("Hello world").unwrap();
        let cat = xml.find(">cat<").unwrap();
        let marker = xml.find("[OCR failed for page 3]").unwrap();
        assert!(hello < cat && cat < marker);
    }

    #[test]
    fn line_breaks_and_tabs_become_run_elements() {
        let mut doc = DocxDocument::new("t");
        doc.append_paragraph("a\tb\r\nc");
        assert!(doc.document_xml().contains(
            r#"<w:p><w:r><w:t xml:space="preserve">a</w:t><w:tab/><w:t xml:space="preserve">b</w:t><w:br/><w:t xml:space="preserve">c</w:t></w:r></w:p>"#
        ));
    }

    #[test]
    fn markup_is_escaped_and_form_feed_dropped() {
        let mut doc = DocxDocument::new("t");
        doc.append_paragraph("x < y & \"z\"\x0c");
        let xml = doc.document_xml();
        assert!(xml.contains("x &lt; y &amp; &quot;z&quot;</w:t>"));
        assert!(!xml.contains('\x0c'));
    }

    #[test]
    fn empty_paragraph_is_still_a_paragraph() {
        let mut doc = DocxDocument::new("t");
        doc.append_paragraph("");
        doc.append_paragraph("\x0c");
        assert_eq!(doc.document_xml().matches("<w:p/>").count(), 2);
        assert_eq!(doc.paragraph_count(), 2);
    }

    #[test]
    fn package_contains_required_parts() {
        let mut doc = DocxDocument::new("Annual <report>");
        doc.append_paragraph("আমার সোনার বাংলা");
        let bytes = doc.to_bytes().unwrap();

        let types = read_part(&bytes, "[Content_Types].xml");
        assert!(types.contains("/word/document.xml"));
        assert!(read_part(&bytes, "_rels/.rels").contains("word/document.xml"));
        assert!(read_part(&bytes, "docProps/core.xml").contains("Annual &lt;report&gt;"));
        assert!(read_part(&bytes, "word/document.xml").contains("আমার সোনার বাংলা"));
    }

    #[test]
    fn save_to_missing_directory_is_a_save_error() {
        let doc = DocxDocument::new("t");
        let err = doc.save(Path::new("/nonexistent/dir/out.docx")).unwrap_err();
        assert!(matches!(err, LipikarError::Save(_)));
    }

    #[test]
    fn save_writes_a_readable_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let mut doc = DocxDocument::new("out");
        doc.append_paragraph("saved");
        doc.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(read_part(&bytes, "word/document.xml").contains("saved"));
    }
}
