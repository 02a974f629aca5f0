//! Placeholder substitution
//!
//! A placeholder is a field name wrapped in double curly braces, e.g.
//! `{{Name}}`. Matching is exact and case- and whitespace-sensitive.
//! Substitution works on one text node at a time, so a placeholder whose
//! characters are split across runs is left alone.

use crate::document::{Body, Paragraph, Table};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Lookup of field values by name
pub trait FieldSource {
    /// Value for `name`, or `None` when the field is unknown
    fn field(&self, name: &str) -> Option<&str>;
}

impl FieldSource for HashMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn field(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl<T: FieldSource + ?Sized> FieldSource for &T {
    fn field(&self, name: &str) -> Option<&str> {
        (**self).field(name)
    }
}

/// Replace every known `{{key}}` in `text`.
///
/// Returns the resulting text and the number of replacements. Unknown
/// placeholders stay as they are and inserted values are not rescanned.
pub fn substitute_text<'a, F: FieldSource + ?Sized>(text: &'a str, fields: &F) -> (Cow<'a, str>, usize) {
    let mut out = String::new();
    let mut count = 0;
    let mut copied = 0;
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(OPEN) {
        let open = pos + rel;
        let key_start = open + OPEN.len();
        let Some(key_len) = text[key_start..].find(CLOSE) else {
            break;
        };
        let key = &text[key_start..key_start + key_len];

        match fields.field(key) {
            Some(value) => {
                out.push_str(&text[copied..open]);
                out.push_str(value);
                count += 1;
                copied = key_start + key_len + CLOSE.len();
                pos = copied;
            }
            // `{{{Name}}` still has to match at the second brace
            None => pos = open + 1,
        }
    }

    if count == 0 {
        return (Cow::Borrowed(text), 0);
    }
    out.push_str(&text[copied..]);
    (Cow::Owned(out), count)
}

/// Names of all well-formed placeholders in `text`
pub fn find_placeholders(text: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(OPEN) {
        let open = pos + rel;
        let key_start = open + OPEN.len();
        let Some(key_len) = text[key_start..].find(CLOSE) else {
            break;
        };
        let key = &text[key_start..key_start + key_len];

        if key.contains('{') {
            pos = open + 1;
        } else {
            names.push(key);
            pos = key_start + key_len + CLOSE.len();
        }
    }

    names
}

/// Substitute through a story body: paragraphs first, then every table cell
pub(crate) fn substitute_body<F: FieldSource + ?Sized>(body: &mut Body, fields: &F) -> usize {
    let mut count = 0;
    for paragraph in body.paragraphs_mut() {
        count += substitute_paragraph(paragraph, fields);
    }
    for table in body.tables_mut() {
        count += substitute_table(table, fields);
    }
    count
}

fn substitute_paragraph<F: FieldSource + ?Sized>(paragraph: &mut Paragraph, fields: &F) -> usize {
    let mut count = 0;
    for run in paragraph.runs_mut() {
        for node in run.nodes_mut() {
            let (text, replaced) = substitute_text(node.text(), fields);
            if replaced > 0 {
                let text = text.into_owned();
                node.set_text(text);
                count += replaced;
            }
        }
    }
    count
}

fn substitute_table<F: FieldSource + ?Sized>(table: &mut Table, fields: &F) -> usize {
    let mut count = 0;
    for row in table.rows_mut() {
        for cell in row.cells_mut() {
            for paragraph in cell.paragraphs_mut() {
                count += substitute_paragraph(paragraph, fields);
            }
            for nested in cell.tables_mut() {
                count += substitute_table(nested, fields);
            }
        }
    }
    count
}

/// Collect placeholder names from every text node of a body
pub(crate) fn collect_placeholders(body: &Body, names: &mut BTreeSet<String>) {
    body.for_each_node(&mut |node| {
        names.extend(find_placeholders(node.text()).into_iter().map(str::to_string));
    });
}
