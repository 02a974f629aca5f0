//! End-to-end tests: data file and template in, one document per row out

mod common;

use common::*;
use docx_template::DocxTemplate;
use mail_merge::{
    generate, read_records, ErrorCategory, GenerateOptions, MailMergeError, MergeEngine, Record,
};

const CONTACTS: &str = "Name,City,Date\nAlice,Paris,2024-01-15\n,,\nBob,Rome,2024-02-01\nCarol,Oslo,2024-03-09\n";

#[test]
fn test_one_document_per_non_blank_row() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let data = write_file(dir.path(), "contacts.csv", CONTACTS);
    let out = dir.path().join("out");

    let records = read_records(&data).unwrap();
    assert_eq!(records.len(), 3);

    let count = generate(&template, &records, &out).unwrap();
    assert_eq!(count, 3);
    assert_eq!(
        file_names(&out),
        vec!["output_1.docx", "output_2.docx", "output_3.docx"]
    );
}

#[test]
fn test_substitution_changes_only_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let document = letter_document();
    let template = write_template(dir.path(), &document);
    let out = dir.path().join("out");

    let record: Record = [("Name", "Alice"), ("City", "Paris"), ("Date", "2024-01-15")]
        .into_iter()
        .collect();
    generate(&template, &[record], &out).unwrap();

    let output = out.join("output_1.docx");
    let expected = document
        .replacen("{{Name}}", "Alice", 2)
        .replacen("{{City}}", "Paris", 2)
        .replace("{{Date}}", "2024-01-15");
    assert_eq!(read_part(&output, "word/document.xml"), expected);
    assert_eq!(read_part(&output, "word/styles.xml"), STYLES);
    assert_eq!(read_part(&output, "_rels/.rels"), ROOT_RELS);
}

#[test]
fn test_unmatched_and_split_placeholders_stay() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let out = dir.path().join("out");

    let record: Record = [("Name", "Alice")].into_iter().collect();
    generate(&template, &[record], &out).unwrap();

    let output = DocxTemplate::open(out.join("output_1.docx")).unwrap();
    let paragraphs = output.paragraphs();
    assert_eq!(paragraphs[0].text(), "Dear Alice,");
    assert_eq!(
        paragraphs[1].text(),
        "Your order ships to {{City}} on {{Date}}. Ref: {{Unknown}}"
    );
    assert_eq!(paragraphs[2].text(), "{{Name}}");
    assert_eq!(output.tables()[0].cell(0, 1).unwrap().text(), "Alice ({{City}})");
}

#[test]
fn test_generation_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let data = write_file(dir.path(), "contacts.csv", CONTACTS);
    let records = read_records(&data).unwrap();

    let first = dir.path().join("first");
    let second = dir.path().join("second");
    generate(&template, &records, &first).unwrap();
    generate(&template, &records, &second).unwrap();

    for name in file_names(&first) {
        let a = std::fs::read(first.join(&name)).unwrap();
        let b = std::fs::read(second.join(&name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

#[test]
fn test_records_do_not_leak_between_documents() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let out = dir.path().join("out");

    let records: Vec<Record> = vec![
        [("Name", "Alice"), ("City", "Paris")].into_iter().collect(),
        [("Name", "Bob")].into_iter().collect(),
    ];
    generate(&template, &records, &out).unwrap();

    let second = DocxTemplate::open(out.join("output_2.docx")).unwrap();
    assert_eq!(second.paragraphs()[0].text(), "Dear Bob,");
    assert!(second.paragraphs()[1].text().contains("{{City}}"));
}

#[test]
fn test_unsupported_extension_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_file(dir.path(), "contacts.txt", CONTACTS);
    let out = dir.path().join("out");

    let err = read_records(&data).unwrap_err();
    assert!(matches!(err, MailMergeError::UnsupportedFormat(_)));
    assert_eq!(err.category(), ErrorCategory::UnsupportedFormat);
    assert!(!out.exists());
}

#[test]
fn test_malformed_template_creates_no_directory() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_file(dir.path(), "broken.docx", "this is not a zip archive");
    let out = dir.path().join("out");

    let record: Record = [("Name", "Alice")].into_iter().collect();
    let err = generate(&template, &[record], &out).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::MalformedTemplate);
    assert!(!out.exists());
}

#[test]
fn test_template_with_broken_xml_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), "<w:document><w:body><w:p></w:body>");
    let out = dir.path().join("out");

    let err = MergeEngine::open(&template, GenerateOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, MailMergeError::MalformedTemplate(_)));
    assert!(!out.exists());
}

#[test]
fn test_failure_keeps_earlier_documents() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let out = dir.path().join("out");
    // A directory where the second document should go makes its save fail
    std::fs::create_dir_all(out.join("output_2.docx")).unwrap();

    let records: Vec<Record> = ["Ann", "Ben", "Cid"]
        .iter()
        .map(|n| [("Name", *n)].into_iter().collect())
        .collect();
    let err = generate(&template, &records, &out).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::IoFailure);
    assert!(out.join("output_1.docx").is_file());
    assert!(!out.join("output_3.docx").exists());
}

#[test]
fn test_custom_prefix_and_progress() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let data = write_file(dir.path(), "contacts.csv", CONTACTS);
    let records = read_records(&data).unwrap();
    let out = dir.path().join("letters");

    let engine = MergeEngine::open(&template, GenerateOptions::default().with_prefix("letter_")).unwrap();
    let mut seen = Vec::new();
    let report = engine
        .generate_with_progress(&records, &out, |p| seen.push(p.current_record))
        .unwrap();

    assert_eq!(seen, vec![1, 2, 3]);
    assert_eq!(report.document_count(), 3);
    assert_eq!(file_names(&out)[0], "letter_1.docx");
}

#[test]
fn test_header_only_csv_produces_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let template = write_template(dir.path(), &letter_document());
    let data = write_file(dir.path(), "contacts.csv", "Name,City\n");
    let out = dir.path().join("out");

    let records = read_records(&data).unwrap();
    assert_eq!(generate(&template, &records, &out).unwrap(), 0);
    assert!(file_names(&out).is_empty());
}
