//! Minimal xlsx reader: resolves the workbook's active worksheet and returns
//! its cells as typed values. Styles, formulas and dates are not interpreted.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::models::{HallOfFameError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Display form, or `None` for blank cells.
    pub fn display(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(self.to_string())
    }

    /// Integer view of the cell: numbers truncate toward zero, text must
    /// parse as a whole integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            CellValue::Text(s) => s.trim().parse::<i64>().ok(),
            CellValue::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Error(e) => f.write_str(e),
        }
    }
}

static EMPTY_CELL: CellValue = CellValue::Empty;

#[derive(Debug, Clone, PartialEq)]
pub struct Worksheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Widest row, in cells.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

pub struct Workbook<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl Workbook<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Workbook<R> {
    pub fn from_reader(reader: R) -> Result<Self> {
        Ok(Self {
            archive: ZipArchive::new(reader)?,
        })
    }

    /// Reads the sheet selected as active when the workbook was saved,
    /// falling back to the first sheet.
    pub fn active_sheet(&mut self) -> Result<Worksheet> {
        let workbook = self
            .read_part("xl/workbook.xml")?
            .ok_or_else(|| HallOfFameError::WorkbookFormat("missing xl/workbook.xml".to_string()))?;
        let (sheets, active_tab) = parse_sheet_list(&workbook)?;

        let index = if active_tab < sheets.len() { active_tab } else { 0 };
        let sheet = sheets
            .get(index)
            .ok_or_else(|| HallOfFameError::WorkbookFormat("workbook has no sheets".to_string()))?;

        let relationships = match self.read_part("xl/_rels/workbook.xml.rels")? {
            Some(xml) => parse_relationships(&xml)?,
            None => HashMap::new(),
        };
        let part = relationships
            .get(&sheet.relationship)
            .map(|target| resolve_target(target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", index + 1));

        debug!("Reading sheet '{}' from {}", sheet.name, part);

        let shared = match self.read_part("xl/sharedStrings.xml")? {
            Some(xml) => parse_shared_strings(&xml)?,
            None => Vec::new(),
        };

        let xml = self
            .read_part(&part)?
            .ok_or_else(|| HallOfFameError::WorkbookFormat(format!("missing worksheet part {}", part)))?;
        let rows = parse_sheet_rows(&xml, &shared)?;

        Ok(Worksheet::new(sheet.name.clone(), rows))
    }

    fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(Some(bytes))
    }
}

struct SheetEntry {
    name: String,
    relationship: String,
}

fn xml_error(err: impl fmt::Display) -> HallOfFameError {
    HallOfFameError::WorkbookFormat(format!("malformed XML: {}", err))
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn parse_sheet_list(xml: &[u8]) -> Result<(Vec<SheetEntry>, usize)> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();
    let mut active_tab = 0;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"workbookView" => {
                    if let Some(tab) = attribute(&e, b"activeTab")? {
                        active_tab = tab.parse().unwrap_or(0);
                    }
                }
                b"sheet" => {
                    let name = attribute(&e, b"name")?.unwrap_or_default();
                    let relationship = attribute(&e, b"id")?.unwrap_or_default();
                    sheets.push(SheetEntry { name, relationship });
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, active_tab))
}

fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut targets = HashMap::new();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attribute(&e, b"Id")?, attribute(&e, b"Target")?) {
                    targets.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

/// Relationship targets are relative to `xl/` unless rooted.
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(rooted) => rooted.to_string(),
        None => format!("xl/{}", target),
    }
}

fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Phonetic runs carry reading hints, not cell text.
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => in_phonetic = true,
                b"t" if !in_phonetic => in_text = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(xml_error)?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

// Sheet limits of the xlsx format.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

fn out_of_range(what: &str, value: &str) -> HallOfFameError {
    HallOfFameError::WorkbookFormat(format!("{} '{}' is outside the sheet", what, value))
}

/// Splits an `A1`-style reference into zero-based (row, column).
fn parse_cell_ref(reference: &str) -> Result<(usize, usize)> {
    let split = reference
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| out_of_range("cell reference", reference))?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() {
        return Err(out_of_range("cell reference", reference));
    }

    let mut col = 0usize;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(out_of_range("cell reference", reference));
        }
        col = col
            .checked_mul(26)
            .and_then(|n| n.checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1))
            .filter(|n| *n <= MAX_COLUMNS)
            .ok_or_else(|| out_of_range("cell reference", reference))?;
    }

    let row = digits
        .parse::<usize>()
        .ok()
        .filter(|r| (1..=MAX_ROWS).contains(r))
        .ok_or_else(|| out_of_range("cell reference", reference))?;
    Ok((row - 1, col - 1))
}

/// Zero-based row of a `<row>` element; rows without `r` follow the previous one.
fn row_index(element: &BytesStart<'_>, next_row: usize) -> Result<usize> {
    match attribute(element, b"r")? {
        Some(r) => r
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=MAX_ROWS).contains(n))
            .map(|n| n - 1)
            .ok_or_else(|| out_of_range("row", &r)),
        None if next_row < MAX_ROWS => Ok(next_row),
        None => Err(out_of_range("row", &(next_row + 1).to_string())),
    }
}

/// Zero-based column of a `<c>` element; cells without `r` follow the previous one.
fn column_index(element: &BytesStart<'_>, next_col: usize) -> Result<usize> {
    match attribute(element, b"r")? {
        Some(r) => parse_cell_ref(&r).map(|(_, c)| c),
        None if next_col < MAX_COLUMNS => Ok(next_col),
        None => Err(out_of_range("column", &(next_col + 1).to_string())),
    }
}

fn cell_value(kind: Option<&str>, raw: String, shared: &[String]) -> CellValue {
    match kind {
        Some("s") => match raw.trim().parse::<usize>().ok().and_then(|i| shared.get(i)) {
            Some(s) => CellValue::Text(s.clone()),
            None => CellValue::Error(format!("#REF! shared string {}", raw.trim())),
        },
        Some("str") | Some("inlineStr") | Some("d") => CellValue::Text(raw),
        Some("b") => CellValue::Bool(raw.trim() == "1"),
        Some("e") => CellValue::Error(raw),
        _ if raw.trim().is_empty() => CellValue::Empty,
        _ => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(raw),
        },
    }
}

fn place(rows: &mut Vec<Vec<CellValue>>, row: usize, col: usize, value: CellValue) {
    if rows.len() <= row {
        rows.resize_with(row + 1, Vec::new);
    }
    let cells = &mut rows[row];
    if cells.len() <= col {
        cells.resize(col + 1, CellValue::Empty);
    }
    cells[col] = value;
}

fn parse_sheet_rows(xml: &[u8], shared: &[String]) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows: Vec<Vec<CellValue>> = Vec::new();

    let mut row = 0usize;
    let mut next_row = 0usize;
    let mut col = 0usize;
    let mut next_col = 0usize;
    let mut kind: Option<String> = None;
    let mut raw = String::new();
    let mut in_value = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_error)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = row_index(&e, next_row)?;
                    next_row = row + 1;
                    next_col = 0;
                    if rows.len() <= row {
                        rows.resize_with(row + 1, Vec::new);
                    }
                }
                b"c" => {
                    col = column_index(&e, next_col)?;
                    next_col = col + 1;
                    kind = attribute(&e, b"t")?;
                    raw.clear();
                }
                b"rPh" => in_phonetic = true,
                b"v" | b"t" if !in_phonetic => in_value = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = row_index(&e, next_row)?;
                    next_row = row + 1;
                    next_col = 0;
                }
                b"c" => {
                    col = column_index(&e, next_col)?;
                    next_col = col + 1;
                }
                _ => {}
            },
            Event::Text(t) if in_value => {
                raw.push_str(&t.unescape().map_err(xml_error)?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"rPh" => in_phonetic = false,
                b"c" => {
                    let value = cell_value(kind.as_deref(), std::mem::take(&mut raw), shared);
                    if value != CellValue::Empty {
                        place(&mut rows, row, col, value);
                    }
                    kind = None;
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use std::io::Cursor;

    fn open(bytes: Vec<u8>) -> Workbook<Cursor<Vec<u8>>> {
        Workbook::from_reader(Cursor::new(bytes)).unwrap()
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1").unwrap(), (0, 0));
        assert_eq!(parse_cell_ref("G12").unwrap(), (11, 6));
        assert_eq!(parse_cell_ref("AA3").unwrap(), (2, 26));
        assert_eq!(parse_cell_ref("XFD1048576").unwrap(), (1_048_575, 16_383));
        assert!(parse_cell_ref("A0").is_err());
        assert!(parse_cell_ref("12").is_err());
        assert!(parse_cell_ref("XFE1").is_err());
        assert!(parse_cell_ref("A1048577").is_err());
        assert!(parse_cell_ref("ZZZZZZZZZZZZZZZ1").is_err());
    }

    #[test]
    fn test_overlong_references_are_format_errors() {
        let wide = r#"<worksheet><sheetData><row r="1"><c r="ZZZZZZZZZZZZZZZ1"><v>1</v></c></row></sheetData></worksheet>"#;
        let mut workbook = open(xlsx_bytes(&[("Wide", wide.to_string())], None, 0));
        assert!(matches!(
            workbook.active_sheet(),
            Err(HallOfFameError::WorkbookFormat(_))
        ));

        let tall = r#"<worksheet><sheetData><row r="99999999999999999999"><c><v>1</v></c></row></sheetData></worksheet>"#;
        let mut workbook = open(xlsx_bytes(&[("Tall", tall.to_string())], None, 0));
        assert!(matches!(
            workbook.active_sheet(),
            Err(HallOfFameError::WorkbookFormat(_))
        ));
    }

    #[test]
    fn test_inline_string_skips_phonetic_run() {
        let sheet = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>東京</t><rPh sb="0" eb="2"><t>トウキョウ</t></rPh></is></c></row></sheetData></worksheet>"#;
        let mut workbook = open(xlsx_bytes(&[("Cities", sheet.to_string())], None, 0));
        let ws = workbook.active_sheet().unwrap();
        assert_eq!(ws.cell(0, 0), &CellValue::Text("東京".to_string()));
    }

    #[test]
    fn test_reads_shared_inline_bool_and_numeric_cells() {
        let shared = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3"><si><t>Rank</t></si><si><r><t>Brick </t></r><r><t>Baron</t></r><rPh><t>ignored</t></rPh></si><si><t>Tom &amp; Jerry</t></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row r="3"><c r="A3"><v>42</v></c><c r="C3" t="b"><v>1</v></c><c r="D3" t="inlineStr"><is><t>inline</t></is></c><c r="E3" t="s"><v>2</v></c><c r="F3" t="str"><f>A3*2</f><v>84</v></c></row>
        </sheetData></worksheet>"#;

        let mut workbook = open(xlsx_bytes(&[("Collectors", sheet.to_string())], Some(shared), 0));
        let ws = workbook.active_sheet().unwrap();

        assert_eq!(ws.name, "Collectors");
        assert_eq!(ws.rows().len(), 3);
        assert_eq!(ws.cell(0, 0), &CellValue::Text("Rank".to_string()));
        assert_eq!(ws.cell(0, 1), &CellValue::Text("Brick Baron".to_string()));
        assert!(ws.rows()[1].is_empty());
        assert_eq!(ws.cell(2, 0), &CellValue::Number(42.0));
        assert_eq!(ws.cell(2, 1), &CellValue::Empty);
        assert_eq!(ws.cell(2, 2), &CellValue::Bool(true));
        assert_eq!(ws.cell(2, 3), &CellValue::Text("inline".to_string()));
        assert_eq!(ws.cell(2, 4), &CellValue::Text("Tom & Jerry".to_string()));
        assert_eq!(ws.cell(2, 5), &CellValue::Text("84".to_string()));
        assert_eq!(ws.width(), 6);
    }

    #[test]
    fn test_active_tab_selects_sheet() {
        let first = sheet_xml(&[vec![Some("first")]]);
        let second = sheet_xml(&[vec![Some("second")]]);
        let mut workbook = open(xlsx_bytes(&[("One", first), ("Two", second)], None, 1));
        let ws = workbook.active_sheet().unwrap();
        assert_eq!(ws.name, "Two");
        assert_eq!(ws.cell(0, 0), &CellValue::Text("second".to_string()));
    }

    #[test]
    fn test_out_of_range_active_tab_uses_first_sheet() {
        let sheet = sheet_xml(&[vec![Some("only")]]);
        let mut workbook = open(xlsx_bytes(&[("Only", sheet)], None, 7));
        assert_eq!(workbook.active_sheet().unwrap().name, "Only");
    }

    #[test]
    fn test_not_a_zip_archive() {
        assert!(Workbook::from_reader(Cursor::new(b"Rank,Name\n1,x".to_vec())).is_err());
    }

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::Number(400.9).as_integer(), Some(400));
        assert_eq!(CellValue::Number(-5.0).as_integer(), Some(-5));
        assert_eq!(CellValue::Text(" 12 ".to_string()).as_integer(), Some(12));
        assert_eq!(CellValue::Text("12.5".to_string()).as_integer(), None);
        assert_eq!(CellValue::Bool(true).as_integer(), Some(1));
        assert_eq!(CellValue::Empty.as_integer(), None);

        assert_eq!(CellValue::Number(3.0).display(), Some("3".to_string()));
        assert_eq!(CellValue::Number(2.5).display(), Some("2.5".to_string()));
        assert_eq!(CellValue::Text("  ".to_string()).display(), None);
        assert_eq!(CellValue::Empty.display(), None);
    }
}
