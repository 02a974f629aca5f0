//! WordprocessingML part model
//!
//! A story part (`document.xml`, `headerN.xml`, `footerN.xml`) is parsed
//! into two views that share event indices:
//!
//! - the raw quick-xml event stream, kept so the part can be written back
//!   without disturbing markup the model does not understand
//! - a structured tree of paragraphs, runs and tables whose leaves are the
//!   `<w:t>` text nodes
//!
//! Only text nodes are mutable. On write, modified nodes replace the text
//! events they came from; everything else is emitted as it was read.

use crate::error::{TemplateError, TemplateResult};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{HashMap, HashSet};

/// Character data of one `<w:t>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Index of the text event in the part's event stream
    event: usize,
    /// Index of the enclosing `<w:t>` start event
    start: usize,
    text: String,
    modified: bool,
}

impl TextNode {
    /// Current text of the node
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the text differs from what was read
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Replace the node's text
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.modified = true;
        }
    }
}

/// A run of uniformly formatted text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    nodes: Vec<TextNode>,
}

impl Run {
    /// Text nodes of this run
    pub fn nodes(&self) -> &[TextNode] {
        &self.nodes
    }

    /// Mutable text nodes of this run
    pub fn nodes_mut(&mut self) -> &mut [TextNode] {
        &mut self.nodes
    }

    /// Concatenated text of the run
    pub fn text(&self) -> String {
        self.nodes.iter().map(|n| n.text.as_str()).collect()
    }
}

/// A paragraph: a sequence of runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    runs: Vec<Run>,
}

impl Paragraph {
    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }
}

/// A table cell; may contain paragraphs and nested tables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
}

impl TableCell {
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Paragraph texts joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [TableCell] {
        &mut self.cells
    }
}

/// A table: a grid of rows and cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    rows: Vec<TableRow>,
}

impl Table {
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [TableRow] {
        &mut self.rows
    }

    /// Cell at (row, column), if present
    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.cells.get(col))
    }
}

/// Content of a story root (`w:body`, `w:hdr` or `w:ftr`)
///
/// Paragraphs nested in drawings or content controls are attached to the
/// nearest enclosing body or table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Body {
    paragraphs: Vec<Paragraph>,
    tables: Vec<Table>,
}

impl Body {
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn paragraphs_mut(&mut self) -> &mut [Paragraph] {
        &mut self.paragraphs
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn tables_mut(&mut self) -> &mut [Table] {
        &mut self.tables
    }

    /// Visit every text node, paragraphs first, then tables
    pub fn for_each_node<'a, F: FnMut(&'a TextNode)>(&'a self, f: &mut F) {
        visit_paragraphs(&self.paragraphs, f);
        visit_tables(&self.tables, f);
    }
}

fn visit_paragraphs<'a, F: FnMut(&'a TextNode)>(paragraphs: &'a [Paragraph], f: &mut F) {
    for node in paragraphs.iter().flat_map(|p| &p.runs).flat_map(|r| &r.nodes) {
        f(node);
    }
}

fn visit_tables<'a, F: FnMut(&'a TextNode)>(tables: &'a [Table], f: &mut F) {
    for cell in tables.iter().flat_map(|t| &t.rows).flat_map(|r| &r.cells) {
        visit_paragraphs(&cell.paragraphs, f);
        visit_tables(&cell.tables, f);
    }
}

/// Parse state: one frame per open element
enum Frame {
    Root(Body),
    Paragraph(Paragraph),
    Run(Run),
    Table(Table),
    Row(TableRow),
    Cell(TableCell),
    Text { start: usize },
    Other,
}

impl Frame {
    fn open(name: &[u8], index: usize) -> Self {
        if is_w(name, b"body") || is_w(name, b"hdr") || is_w(name, b"ftr") {
            Frame::Root(Body::default())
        } else if is_w(name, b"p") {
            Frame::Paragraph(Paragraph::default())
        } else if is_w(name, b"r") {
            Frame::Run(Run::default())
        } else if is_w(name, b"t") {
            Frame::Text { start: index }
        } else if is_w(name, b"tbl") {
            Frame::Table(Table::default())
        } else if is_w(name, b"tr") {
            Frame::Row(TableRow::default())
        } else if is_w(name, b"tc") {
            Frame::Cell(TableCell::default())
        } else {
            Frame::Other
        }
    }
}

/// Match a WordprocessingML element by local name, with or without the `w:` prefix
fn is_w(name: &[u8], local: &[u8]) -> bool {
    name == local || (name.len() == local.len() + 2 && name.starts_with(b"w:") && &name[2..] == local)
}

/// Attach a closed frame to its parent on the stack
fn close(frame: Frame, stack: &mut [Frame], root: &mut Option<Body>) {
    match frame {
        Frame::Root(body) => *root = Some(body),
        Frame::Paragraph(paragraph) => {
            if let Some((paragraphs, _)) = nearest_container(stack) {
                paragraphs.push(paragraph);
            }
        }
        Frame::Table(table) => {
            if let Some((_, tables)) = nearest_container(stack) {
                tables.push(table);
            }
        }
        Frame::Run(run) => {
            let parent = stack.iter_mut().rev().find_map(|f| match f {
                Frame::Paragraph(p) => Some(p),
                _ => None,
            });
            if let Some(paragraph) = parent {
                paragraph.runs.push(run);
            }
        }
        Frame::Row(row) => {
            let parent = stack.iter_mut().rev().find_map(|f| match f {
                Frame::Table(t) => Some(t),
                _ => None,
            });
            if let Some(table) = parent {
                table.rows.push(row);
            }
        }
        Frame::Cell(cell) => {
            let parent = stack.iter_mut().rev().find_map(|f| match f {
                Frame::Row(r) => Some(r),
                _ => None,
            });
            if let Some(row) = parent {
                row.cells.push(cell);
            }
        }
        Frame::Text { .. } | Frame::Other => {}
    }
}

fn nearest_container(stack: &mut [Frame]) -> Option<(&mut Vec<Paragraph>, &mut Vec<Table>)> {
    stack.iter_mut().rev().find_map(|f| match f {
        Frame::Root(body) => Some((&mut body.paragraphs, &mut body.tables)),
        Frame::Cell(cell) => Some((&mut cell.paragraphs, &mut cell.tables)),
        _ => None,
    })
}

/// A parsed story part
#[derive(Debug, Clone)]
pub struct DocumentPart {
    raw: Vec<u8>,
    events: Vec<Event<'static>>,
    body: Body,
}

impl DocumentPart {
    /// Parse a story part from its XML bytes
    pub fn parse(xml: &[u8]) -> TemplateResult<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut events: Vec<Event<'static>> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<Body> = None;

        loop {
            let event = reader.read_event_into(&mut buf)?.into_owned();
            let index = events.len();

            match &event {
                Event::Start(e) => stack.push(Frame::open(e.name().as_ref(), index)),
                Event::End(_) => {
                    if let Some(frame) = stack.pop() {
                        close(frame, &mut stack, &mut root);
                    }
                }
                Event::Text(t) => {
                    if let Some(&Frame::Text { start }) = stack.last() {
                        let text = t.unescape()?.into_owned();
                        if let Some(Frame::Run(run)) = stack.iter_mut().rev().nth(1) {
                            run.nodes.push(TextNode {
                                event: index,
                                start,
                                text,
                                modified: false,
                            });
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }

            events.push(event);
            buf.clear();
        }

        let body = root.ok_or_else(|| {
            TemplateError::InvalidStructure("part has no w:body, w:hdr or w:ftr element".to_string())
        })?;

        Ok(Self {
            raw: xml.to_vec(),
            events,
            body,
        })
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Whether any text node has been changed since parsing
    pub fn is_modified(&self) -> bool {
        let mut modified = false;
        self.body.for_each_node(&mut |n| modified |= n.modified);
        modified
    }

    /// Serialize the part. An unmodified part returns its original bytes.
    pub fn to_xml(&self) -> TemplateResult<Vec<u8>> {
        if !self.is_modified() {
            return Ok(self.raw.clone());
        }

        let mut overrides: HashMap<usize, &TextNode> = HashMap::new();
        self.body.for_each_node(&mut |n| {
            if n.modified {
                overrides.insert(n.event, n);
            }
        });
        let preserve: HashSet<usize> = overrides
            .values()
            .filter(|n| needs_space_preserve(first_segment(&n.text)))
            .map(|n| n.start)
            .collect();

        let mut writer = Writer::new(Vec::with_capacity(self.raw.len()));
        for (index, event) in self.events.iter().enumerate() {
            if let Some(node) = overrides.get(&index) {
                let tag = match &self.events[node.start] {
                    Event::Start(start) => String::from_utf8_lossy(start.name().as_ref()).into_owned(),
                    _ => "w:t".to_string(),
                };
                write_text(&mut writer, &node.text, &tag)?;
                continue;
            }

            let result = match event {
                Event::Start(start) if preserve.contains(&index) && !has_space_attr(start) => {
                    let mut start = start.clone();
                    start.push_attribute(("xml:space", "preserve"));
                    writer.write_event(Event::Start(start))
                }
                _ => writer.write_event(event.borrow()),
            };
            result.map_err(|e| TemplateError::Xml(e.to_string()))?;
        }

        Ok(writer.into_inner())
    }
}

/// Write replacement text for one `<w:t>`.
///
/// Line breaks become `<w:br/>` and tabs `<w:tab/>` inside the same run,
/// each followed by a fresh `<w:t>`. Characters XML 1.0 does not allow are
/// dropped.
fn write_text(writer: &mut Writer<Vec<u8>>, text: &str, tag: &str) -> TemplateResult<()> {
    let prefix = tag.strip_suffix('t').unwrap_or("w:");
    let mut segment = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let element = match c {
            '\n' => "br",
            '\r' => {
                chars.next_if_eq(&'\n');
                "br"
            }
            '\t' => "tab",
            c if is_xml_char(c) => {
                segment.push(c);
                continue;
            }
            _ => continue,
        };

        let mut reopen = BytesStart::new(tag);
        reopen.push_attribute(("xml:space", "preserve"));
        for event in [
            Event::Text(BytesText::from_escaped(partial_escape(segment.as_str()))),
            Event::End(BytesEnd::new(tag)),
            Event::Empty(BytesStart::new(format!("{}{}", prefix, element))),
            Event::Start(reopen),
        ] {
            writer
                .write_event(event)
                .map_err(|e| TemplateError::Xml(e.to_string()))?;
        }
        segment.clear();
    }

    writer
        .write_event(Event::Text(BytesText::from_escaped(partial_escape(segment.as_str()))))
        .map_err(|e| TemplateError::Xml(e.to_string()))?;
    Ok(())
}

fn is_xml_char(c: char) -> bool {
    !matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

/// Text up to the first line break or tab
fn first_segment(text: &str) -> &str {
    text.split(['\n', '\r', '\t']).next().unwrap_or_default()
}

fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

fn has_space_attr(start: &BytesStart) -> bool {
    start
        .attributes()
        .filter_map(|a| a.ok())
        .any(|a| a.key.as_ref() == b"xml:space")
}
