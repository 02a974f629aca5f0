//! Fixture builders shared by the integration tests

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

pub const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

pub const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

pub const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#;

/// A letter with placeholders in body text, a table, and a split run
pub fn letter_document() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:pPr><w:jc w:val="left"/></w:pPr><w:r><w:rPr><w:b/></w:rPr><w:t>Dear {{Name}},</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Your order ships to {{City}} on {{Date}}. </w:t></w:r><w:r><w:t>Ref: {{Unknown}}</w:t></w:r></w:p><w:tbl><w:tblPr/><w:tr><w:tc><w:p><w:r><w:t>Customer</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>{{Name}} ({{City}})</w:t></w:r></w:p></w:tc></w:tr></w:tbl><w:p><w:r><w:t>{{Na</w:t></w:r><w:r><w:t>me}}</w:t></w:r></w:p><w:sectPr/></w:body></w:document>"#
        .to_string()
}

/// Build a DOCX package around the given main document part
pub fn docx_bytes(document_xml: &str) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default();
        for (name, content) in [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("word/document.xml", document_xml),
            ("word/styles.xml", STYLES),
        ] {
            zip.start_file(name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }
    cursor.into_inner()
}

pub fn write_template(dir: &Path, document_xml: &str) -> PathBuf {
    let path = dir.join("letter.docx");
    std::fs::write(&path, docx_bytes(document_xml)).unwrap();
    path
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Read one part of a DOCX file as text
pub fn read_part(path: &Path, part: &str) -> String {
    let package = docx_template::DocxPackage::read_from_file(path).unwrap();
    String::from_utf8(package.part(part).unwrap().to_vec()).unwrap()
}

/// Sorted file names in a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
