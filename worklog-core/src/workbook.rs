//! Minimal xlsx codec: one worksheet of plain string cells.
//!
//! Writing produces a package any spreadsheet application opens (inline
//! strings, no shared string table). Reading accepts what those applications
//! save back: shared strings, inline strings, numbers and booleans.

use crate::error::{Result, WorkLogError};
use crate::markup::to_abc;
use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const DEFAULT_SHEET: &str = "xl/worksheets/sheet1.xml";
const MAX_SHEET_NAME: usize = 31;
/// Spreadsheet limits: columns `A..=XFD`, rows `1..=1048576`.
const MAX_COLUMNS: usize = 16_384;
const MAX_ROWS: usize = 1_048_576;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#;

/// Serializes `rows` (header included, if any) into an xlsx package.
pub fn write_workbook(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{MAIN_NS}" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape(sanitize_sheet_name(sheet_name).as_str())
    );
    let sheet = sheet_xml(rows);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);
    let parts = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", workbook.as_str()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
        (DEFAULT_SHEET, sheet.as_str()),
    ];
    for (path, content) in parts {
        zip.start_file(path, options)?;
        zip.write_all(content.as_bytes())?;
    }
    let bytes = zip.finish()?.into_inner();
    debug!(rows = rows.len(), bytes = bytes.len(), "workbook written");
    Ok(bytes)
}

/// Reads the first worksheet into rows of cell text. Missing cells are empty strings.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| WorkLogError::Workbook(format!("not an xlsx package: {e}")))?;

    let sheet_path = first_sheet_path(&mut archive)?.unwrap_or_else(|| DEFAULT_SHEET.to_string());
    let shared = match read_entry(&mut archive, "xl/sharedStrings.xml")? {
        Some(xml) => parse_shared_strings(&xml).map_err(|e| xml_error("xl/sharedStrings.xml", e))?,
        None => Vec::new(),
    };
    let sheet = read_entry(&mut archive, &sheet_path)?
        .ok_or_else(|| WorkLogError::Workbook(format!("missing worksheet {sheet_path}")))?;
    let rows = parse_sheet(&sheet, &shared).map_err(|e| e.into_workbook_error(&sheet_path))?;
    debug!(rows = rows.len(), sheet = %sheet_path, "workbook read");
    Ok(rows)
}

/// Excel rejects names longer than 31 characters or containing `: \ / ? * [ ]`.
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            ':' | '\\' | '/' | '?' | '*' | '[' | ']' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned
    }
}

/// `0 -> A`, `26 -> AA`.
fn column_name(index: usize) -> String {
    to_abc(index).to_ascii_uppercase()
}

/// Zero-based column of a cell reference such as `AB12`.
fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let number = letters.iter().try_fold(0usize, |acc, b| {
        acc.checked_mul(26)?.checked_add(usize::from(b - b'A' + 1))
    })?;
    Some(number - 1)
}

fn sheet_xml(rows: &[Vec<String>]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}"><sheetData>"#
    );
    for (r, row) in rows.iter().enumerate() {
        let row_number = r + 1;
        xml.push_str(&format!(r#"<row r="{row_number}">"#));
        for (c, value) in row.iter().enumerate() {
            xml.push_str(&format!(
                r#"<c r="{}{row_number}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                column_name(c),
                escape(value.as_str())
            ));
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn read_entry<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(WorkLogError::Workbook(format!("{name}: {e}"))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| WorkLogError::Workbook(format!("{name}: {e}")))?;
    Ok(Some(content))
}

fn xml_error(part: &str, e: quick_xml::Error) -> WorkLogError {
    WorkLogError::Workbook(format!("{part}: {e}"))
}

fn attribute(element: &BytesStart, local_name: &[u8]) -> quick_xml::Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Path of the first `<sheet>` in the workbook, resolved through the workbook relationships.
fn first_sheet_path<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> Result<Option<String>> {
    let Some(workbook) = read_entry(archive, "xl/workbook.xml")? else {
        return Ok(None);
    };
    let Some(rel_id) = first_sheet_rel_id(&workbook).map_err(|e| xml_error("xl/workbook.xml", e))?
    else {
        return Ok(None);
    };
    let Some(rels) = read_entry(archive, "xl/_rels/workbook.xml.rels")? else {
        return Ok(None);
    };
    let target = relationship_target(&rels, &rel_id)
        .map_err(|e| xml_error("xl/_rels/workbook.xml.rels", e))?;
    Ok(target.map(|t| match t.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{t}"),
    }))
}

fn first_sheet_rel_id(workbook: &str) -> quick_xml::Result<Option<String>> {
    let mut reader = Reader::from_str(workbook);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                return attribute(&e, b"id");
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

fn relationship_target(rels: &str, id: &str) -> quick_xml::Result<Option<String>> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if attribute(&e, b"Id")?.as_deref() == Some(id) {
                    return attribute(&e, b"Target");
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Shared string table. Rich-text runs are concatenated, phonetic hints dropped.
fn parse_shared_strings(xml: &str) -> quick_xml::Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    let mut phonetic_depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => phonetic_depth += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(text) if in_text && phonetic_depth == 0 => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) if in_text && phonetic_depth == 0 => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// Cell being read: type attribute, `<v>` text and inline string text.
#[derive(Default)]
struct CellBuf {
    column: usize,
    kind: Option<String>,
    value: String,
    inline: String,
}

impl CellBuf {
    fn resolve(self, shared: &[String]) -> String {
        match self.kind.as_deref() {
            Some("s") => self
                .value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|i| shared.get(i).cloned())
                .unwrap_or_default(),
            Some("inlineStr") => self.inline,
            Some("b") => match self.value.trim() {
                "1" => "TRUE".to_string(),
                _ => "FALSE".to_string(),
            },
            _ => self.value,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum TextTarget {
    None,
    Value,
    Inline,
}

/// Failure while reading a worksheet part.
enum SheetError {
    Xml(quick_xml::Error),
    OutOfRange(String),
}

impl From<quick_xml::Error> for SheetError {
    fn from(e: quick_xml::Error) -> Self {
        SheetError::Xml(e)
    }
}

impl SheetError {
    fn into_workbook_error(self, part: &str) -> WorkLogError {
        match self {
            SheetError::Xml(e) => xml_error(part, e),
            SheetError::OutOfRange(detail) => WorkLogError::Workbook(format!("{part}: {detail}")),
        }
    }
}

fn parse_sheet(xml: &str, shared: &[String]) -> std::result::Result<Vec<Vec<String>>, SheetError> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Option<(usize, Vec<String>)> = None;
    let mut cell: Option<CellBuf> = None;
    let mut target = TextTarget::None;
    let mut phonetic_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row = Some((row_index(&e, rows.len())?, Vec::new())),
                b"c" => {
                    let next = row.as_ref().map_or(0, |(_, cells)| cells.len());
                    cell = Some(start_cell(&e, next)?);
                }
                b"v" => target = TextTarget::Value,
                b"t" if phonetic_depth == 0 => target = TextTarget::Inline,
                b"rPh" => phonetic_depth += 1,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    let index = row_index(&e, rows.len())?;
                    place_row(&mut rows, index, Vec::new());
                }
                b"c" => {
                    if let Some((_, cells)) = row.as_mut() {
                        let empty = start_cell(&e, cells.len())?;
                        place_cell(cells, empty.column, String::new());
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if let Some(buf) = cell.as_mut() {
                    match target {
                        TextTarget::Value => buf.value.push_str(&text.unescape()?),
                        TextTarget::Inline => buf.inline.push_str(&text.unescape()?),
                        TextTarget::None => {}
                    }
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => target = TextTarget::None,
                b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                b"c" => {
                    if let (Some(buf), Some((_, cells))) = (cell.take(), row.as_mut()) {
                        let column = buf.column;
                        place_cell(cells, column, buf.resolve(shared));
                    }
                }
                b"row" => {
                    if let Some((index, cells)) = row.take() {
                        place_row(&mut rows, index, cells);
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rows)
}

/// Zero-based row index from the `r` attribute, or the next row when absent.
fn row_index(element: &BytesStart, next: usize) -> std::result::Result<usize, SheetError> {
    let index = attribute(element, b"r")?
        .and_then(|r| r.trim().parse::<usize>().ok())
        .and_then(|r| r.checked_sub(1))
        .unwrap_or(next);
    if index >= MAX_ROWS {
        return Err(SheetError::OutOfRange(format!(
            "row {} is past the last row {MAX_ROWS}",
            index + 1
        )));
    }
    Ok(index)
}

/// A cell positioned by its `r` reference, or placed after the previous cell.
fn start_cell(element: &BytesStart, next_column: usize) -> std::result::Result<CellBuf, SheetError> {
    let reference = attribute(element, b"r")?;
    let column = match reference.as_deref() {
        Some(r) if r.starts_with(|c: char| c.is_ascii_alphabetic()) => column_index(r)
            .filter(|&column| column < MAX_COLUMNS)
            .ok_or_else(|| SheetError::OutOfRange(format!("cell {r} is past column XFD")))?,
        _ => next_column,
    };
    if column >= MAX_COLUMNS {
        return Err(SheetError::OutOfRange(format!(
            "row has more than {MAX_COLUMNS} cells"
        )));
    }
    Ok(CellBuf {
        column,
        kind: attribute(element, b"t")?,
        ..Default::default()
    })
}

fn place_cell(cells: &mut Vec<String>, column: usize, value: String) {
    if cells.len() <= column {
        cells.resize(column + 1, String::new());
    }
    cells[column] = value;
}

fn place_row(rows: &mut Vec<Vec<String>>, index: usize, cells: Vec<String>) {
    if rows.len() <= index {
        rows.resize(index + 1, Vec::new());
    }
    rows[index] = cells;
}
