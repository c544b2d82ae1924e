mod symbols;

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::error::Error;
use crate::model::{Document, Paragraph, Run, SkippedTable, Table, TableCell, TableRow};

use symbols::symbol_char;

pub(crate) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Nested tables below this level are dropped while reading.
const MAX_XML_TABLE_DEPTH: usize = 128;
/// sdt/customXml/hyperlink-style wrappers are not followed past this level.
const MAX_WRAPPER_DEPTH: usize = 64;

pub(crate) fn parse_hex_color(val: &str) -> Option<[u8; 3]> {
    if val.len() != 6 || !val.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&val[0..2], 16).ok()?;
    let g = u8::from_str_radix(&val[2..4], 16).ok()?;
    let b = u8::from_str_radix(&val[4..6], 16).ok()?;
    Some([r, g, b])
}

pub(crate) fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(crate) fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children().find(|n| is_wml(*n, name))
}

fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

/// Flatten SDT and customXml wrappers: descend into their content and collect effective children.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    push_block_nodes(parent, 0, &mut nodes);
    nodes
}

fn push_block_nodes<'a>(
    parent: roxmltree::Node<'a, 'a>,
    depth: usize,
    out: &mut Vec<roxmltree::Node<'a, 'a>>,
) {
    for child in parent.children() {
        let wrapped = if is_wml(child, "sdt") {
            wml(child, "sdtContent")
        } else if is_wml(child, "customXml") {
            Some(child)
        } else {
            out.push(child);
            continue;
        };
        match wrapped {
            Some(_) if depth >= MAX_WRAPPER_DEPTH => {
                log::warn!(
                    "Content controls nested more than {MAX_WRAPPER_DEPTH} deep; inner content skipped"
                );
            }
            Some(content) => push_block_nodes(content, depth + 1, out),
            None => {}
        }
    }
}

/// Collect w:r nodes of a paragraph in document order, looking through the
/// inline wrappers Word emits around runs. Deleted revisions are skipped.
fn collect_run_nodes<'a>(
    parent: roxmltree::Node<'a, 'a>,
    depth: usize,
    out: &mut Vec<roxmltree::Node<'a, 'a>>,
) {
    for child in parent.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        let wrapped = match child.tag_name().name() {
            "r" => {
                out.push(child);
                continue;
            }
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "customXml" | "moveTo" => Some(child),
            "sdt" => wml(child, "sdtContent"),
            _ => None,
        };
        match wrapped {
            Some(_) if depth >= MAX_WRAPPER_DEPTH => {
                log::warn!(
                    "Inline wrappers nested more than {MAX_WRAPPER_DEPTH} deep; inner runs skipped"
                );
            }
            Some(content) => collect_run_nodes(content, depth + 1, out),
            None => {}
        }
    }
}

fn parse_run(run_node: roxmltree::Node) -> Run {
    let color = wml(run_node, "rPr")
        .and_then(|rpr| wml_attr(rpr, "color"))
        .and_then(parse_hex_color);

    let mut text = String::new();
    for child in run_node.children() {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => {
                if let Some(t) = child.text() {
                    text.push_str(t);
                }
            }
            "tab" | "ptab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            "sym" => {
                let font = child.attribute((WML_NS, "font")).unwrap_or("");
                if let Some(c) = child
                    .attribute((WML_NS, "char"))
                    .and_then(|v| u32::from_str_radix(v, 16).ok())
                    .and_then(|cp| symbol_char(font, cp))
                {
                    text.push(c);
                }
            }
            // instrText and delText never contribute visible text
            _ => {}
        }
    }

    Run { text, color }
}

fn parse_paragraph(para_node: roxmltree::Node) -> Paragraph {
    let mut run_nodes = Vec::new();
    collect_run_nodes(para_node, 0, &mut run_nodes);
    Paragraph {
        runs: run_nodes.into_iter().map(parse_run).collect(),
    }
}

/// Per-document reader state: which top-level table is being read and the
/// nested tables dropped so far.
struct TableReader {
    table_index: usize,
    skipped: Vec<SkippedTable>,
}

impl TableReader {
    fn parse_cell(&mut self, tc: roxmltree::Node, depth: usize) -> TableCell {
        let mut cell = TableCell::default();
        for child in collect_block_nodes(tc) {
            if is_wml(child, "p") {
                cell.paragraphs.push(parse_paragraph(child));
            } else if is_wml(child, "tbl") {
                if depth + 1 > MAX_XML_TABLE_DEPTH {
                    log::warn!(
                        "Table {}: nested table at depth {} dropped by the reader (limit {MAX_XML_TABLE_DEPTH})",
                        self.table_index,
                        depth + 1
                    );
                    self.skipped.push(SkippedTable {
                        table_index: self.table_index,
                        depth: depth + 1,
                        limit: MAX_XML_TABLE_DEPTH,
                    });
                    continue;
                }
                cell.tables.push(self.parse_table(child, depth + 1));
            }
        }
        cell
    }

    fn parse_table(&mut self, tbl: roxmltree::Node, depth: usize) -> Table {
        let mut rows = Vec::new();
        for tr in collect_block_nodes(tbl).into_iter().filter(|n| is_wml(*n, "tr")) {
            let cells = collect_block_nodes(tr)
                .into_iter()
                .filter(|n| is_wml(*n, "tc"))
                .map(|tc| self.parse_cell(tc, depth))
                .collect();
            rows.push(TableRow { cells });
        }
        Table { rows }
    }
}

/// Build the document tree from the XML of `word/document.xml`.
pub(crate) fn parse_document_xml(xml_content: &str) -> Result<Document, Error> {
    let xml = roxmltree::Document::parse(xml_content)?;
    let root = xml.root_element();
    let body = wml(root, "body").ok_or_else(|| Error::InvalidDocx("missing w:body".into()))?;

    let mut reader = TableReader {
        table_index: 0,
        skipped: Vec::new(),
    };
    let mut tables = Vec::new();
    for tbl in collect_block_nodes(body).into_iter().filter(|n| is_wml(*n, "tbl")) {
        reader.table_index = tables.len() + 1;
        tables.push(reader.parse_table(tbl, 0));
    }

    log::debug!(
        "Parsed {} top-level tables (deepest nesting: {}, dropped: {})",
        tables.len(),
        tables.iter().map(Table::nesting_depth).max().unwrap_or(0),
        reader.skipped.len()
    );

    Ok(Document {
        tables,
        skipped_tables: reader.skipped,
    })
}

pub(crate) fn read_zip_text<R: Read + Seek>(
    zip: &mut zip::ZipArchive<R>,
    name: &str,
) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

pub(crate) fn open_archive<R: Read + Seek>(reader: R) -> Result<zip::ZipArchive<R>, Error> {
    zip::ZipArchive::new(reader).map_err(|_| Error::InvalidDocx("file is not a ZIP archive".into()))
}

fn parse_archive<R: Read + Seek>(mut zip: zip::ZipArchive<R>) -> Result<Document, Error> {
    let mut xml_content = String::new();
    zip.by_name("word/document.xml")
        .map_err(|_| Error::InvalidDocx("missing word/document.xml (is this a DOCX file?)".into()))?
        .read_to_string(&mut xml_content)?;
    parse_document_xml(&xml_content)
}

pub fn parse(path: &Path) -> Result<Document, Error> {
    let file = std::fs::File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_archive(open_archive(file)?)
}

pub fn parse_bytes(bytes: &[u8]) -> Result<Document, Error> {
    parse_archive(open_archive(Cursor::new(bytes))?)
}
