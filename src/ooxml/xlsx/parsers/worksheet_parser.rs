//! Parser for Excel worksheet XML files.
//!
//! This module streams a worksheet part (sheet1.xml, sheet2.xml, etc.) with
//! quick-xml and loads its cells into a [`Worksheet`]. The whole document is
//! parsed into a staging area first; the worksheet is only replaced once the
//! parse has succeeded, so a malformed document leaves it untouched.
//!
//! Supported cell types:
//! - absent / `n`: number
//! - `s`: shared string index (must exist in the table)
//! - `b`: boolean
//! - `d`: ISO 8601 date, or a date serial number
//! - `str`: formula string result, interned into the table
//! - `inlineStr`: `<is>` rich text, interned into the table

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::common::{Error, Result};
use crate::ooxml::xlsx::cell::Cell;
use crate::ooxml::xlsx::coordinate::{MAX_COLUMNS, MAX_ROWS, decode, is_valid};
use crate::ooxml::xlsx::dimension::Dimension;
use crate::ooxml::xlsx::shared_strings::SharedStringTable;
use crate::ooxml::xlsx::sheet_format::{SheetFormatProps, parse_bool};
use crate::ooxml::xlsx::worksheet::Worksheet;

use super::{attribute, push_text};

const MS_PER_DAY: f64 = 86_400_000.0;

/// Parsed `t` attribute of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Number,
    SharedString,
    Boolean,
    Date,
    FormulaString,
    InlineString,
}

impl ValueType {
    fn from_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("n") => Some(ValueType::Number),
            Some("s") => Some(ValueType::SharedString),
            Some("b") => Some(ValueType::Boolean),
            Some("d") => Some(ValueType::Date),
            Some("str") => Some(ValueType::FormulaString),
            Some("inlineStr") => Some(ValueType::InlineString),
            Some(_) => None,
        }
    }
}

/// A parsed cell waiting to be committed.
///
/// Text cells are interned only at commit time so that a failed parse does
/// not leave strings behind in the shared table.
#[derive(Debug)]
enum Staged {
    Cell(Cell),
    Text(String),
}

/// The `<c>` element currently being read.
#[derive(Debug)]
struct PendingCell {
    row: u32,
    col: u32,
    value_type: ValueType,
    value: Option<String>,
    inline: Option<String>,
}

/// Where character data is currently going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Inline,
}

/// Everything read from the document, not yet applied to a worksheet.
#[derive(Debug, Default)]
struct ParsedSheet {
    cells: BTreeMap<(u32, u32), Staged>,
    dimension: Dimension,
    sheet_format_props: SheetFormatProps,
    rows: usize,
}

struct WorksheetParser<'a> {
    reader: Reader<&'a [u8]>,
    /// Size of the shared string table when the parse started
    shared_len: usize,
    sheet: ParsedSheet,
    current_row: Option<u32>,
    last_row: u32,
    last_col: u32,
    pending: Option<PendingCell>,
    capture: Capture,
    in_inline: bool,
    in_formula: bool,
    phonetic_depth: usize,
    seen_root: bool,
}

impl<'a> WorksheetParser<'a> {
    fn new(content: &'a str, shared_len: usize) -> Self {
        Self {
            reader: Reader::from_str(content),
            shared_len,
            sheet: ParsedSheet::default(),
            current_row: None,
            last_row: 0,
            last_col: 0,
            pending: None,
            capture: Capture::None,
            in_inline: false,
            in_formula: false,
            phonetic_depth: 0,
            seen_root: false,
        }
    }

    /// Build a diagnostic pointing at the reader's current position.
    fn error(&self, msg: impl std::fmt::Display) -> Error {
        Error::MalformedDocument(format!(
            "worksheet at byte {}: {}",
            self.reader.buffer_position(),
            msg
        ))
    }

    fn parse(mut self) -> Result<ParsedSheet> {
        loop {
            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(Error::MalformedDocument(format!(
                        "worksheet at byte {}: {}",
                        self.reader.error_position(),
                        e
                    )));
                },
            };

            match &event {
                Event::Start(e) => self.start_element(e, false)?,
                Event::Empty(e) => self.start_element(e, true)?,
                Event::End(e) => {
                    let name = e.local_name();
                    self.end_element(name.as_ref())?;
                },
                Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) => {
                    self.text(&event)?;
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !self.seen_root {
            return Err(self.error("missing worksheet element"));
        }
        Ok(self.sheet)
    }

    fn start_element(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<()> {
        let local = e.local_name();
        let name = local.as_ref();

        if !self.seen_root {
            if name != b"worksheet" {
                return Err(self.error(format!(
                    "expected worksheet root, found <{}>",
                    String::from_utf8_lossy(name)
                )));
            }
            self.seen_root = true;
            return Ok(());
        }

        match name {
            b"sheetFormatPr" => {
                self.sheet.sheet_format_props = SheetFormatProps::from_element(e)?;
            },
            b"row" => {
                self.start_row(e)?;
                if empty {
                    self.current_row = None;
                }
            },
            b"c" => {
                self.start_cell(e)?;
                if empty {
                    self.finish_cell()?;
                }
            },
            _ if empty => {},
            b"v" if self.pending.is_some() && !self.in_inline && !self.in_formula => {
                self.capture = Capture::Value;
            },
            b"f" if self.pending.is_some() => self.in_formula = true,
            b"is" if self.pending.is_some() => {
                self.in_inline = true;
                if let Some(cell) = self.pending.as_mut() {
                    cell.inline.get_or_insert_with(String::new);
                }
            },
            b"rPh" if self.in_inline => self.phonetic_depth += 1,
            b"t" if self.in_inline && self.phonetic_depth == 0 => {
                self.capture = Capture::Inline;
            },
            _ => {},
        }

        Ok(())
    }

    fn end_element(&mut self, name: &[u8]) -> Result<()> {
        match name {
            b"row" => self.current_row = None,
            b"c" => self.finish_cell()?,
            b"v" | b"t" => self.capture = Capture::None,
            b"f" => self.in_formula = false,
            b"is" => self.in_inline = false,
            b"rPh" => self.phonetic_depth = self.phonetic_depth.saturating_sub(1),
            _ => {},
        }
        Ok(())
    }

    fn text(&mut self, event: &Event<'_>) -> Result<()> {
        let Some(cell) = self.pending.as_mut() else {
            return Ok(());
        };
        let target = match self.capture {
            Capture::Value => cell.value.get_or_insert_with(String::new),
            Capture::Inline => cell.inline.get_or_insert_with(String::new),
            Capture::None => return Ok(()),
        };
        push_text(target, event)
    }

    fn start_row(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let row: u32 = match attribute(e, b"r")? {
            Some(r) => atoi_simd::parse(r.trim().as_bytes())
                .map_err(|_| self.error(format!("invalid row number {r:?}")))?,
            None => self.last_row.saturating_add(1),
        };
        if row == 0 || row > MAX_ROWS {
            return Err(self.error(format!("row {row} outside 1..={MAX_ROWS}")));
        }

        self.current_row = Some(row);
        self.last_row = row;
        self.last_col = 0;
        self.sheet.rows += 1;
        Ok(())
    }

    fn start_cell(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let Some(row) = self.current_row else {
            return Err(self.error("cell outside of a row"));
        };

        let col = match attribute(e, b"r")? {
            Some(reference) => {
                let (cell_row, col) = decode(&reference).map_err(|err| self.error(err))?;
                if cell_row != row {
                    return Err(
                        self.error(format!("cell {reference} does not belong to row {row}"))
                    );
                }
                col
            },
            None => self.last_col.saturating_add(1),
        };
        if !is_valid(row, col) {
            return Err(self.error(format!("column {col} outside 1..={MAX_COLUMNS}")));
        }

        let type_attr = attribute(e, b"t")?;
        let value_type = ValueType::from_attr(type_attr.as_deref())
            .ok_or_else(|| self.error(format!("unsupported cell type {:?}", type_attr)))?;

        self.last_col = col;
        self.pending = Some(PendingCell {
            row,
            col,
            value_type,
            value: None,
            inline: None,
        });
        self.capture = Capture::None;
        self.in_inline = false;
        self.in_formula = false;
        self.phonetic_depth = 0;
        Ok(())
    }

    fn finish_cell(&mut self) -> Result<()> {
        let Some(cell) = self.pending.take() else {
            return Ok(());
        };
        self.capture = Capture::None;

        let staged = self.convert(&cell)?;
        self.sheet
            .dimension
            .update(cell.row, cell.col)
            .map_err(|err| self.error(err))?;
        self.sheet.cells.insert((cell.row, cell.col), staged);
        Ok(())
    }

    /// Turn the raw payload of a cell into its stored form.
    fn convert(&self, cell: &PendingCell) -> Result<Staged> {
        if cell.value_type == ValueType::InlineString {
            return Ok(match &cell.inline {
                Some(text) => Staged::Text(text.clone()),
                None => Staged::Cell(Cell::Blank),
            });
        }

        let Some(raw) = cell.value.as_deref() else {
            return Ok(Staged::Cell(Cell::Blank));
        };

        let staged = match cell.value_type {
            ValueType::Number => {
                let n = parse_number(raw)
                    .ok_or_else(|| self.error(format!("invalid number {raw:?}")))?;
                Staged::Cell(Cell::Number(n))
            },
            ValueType::Boolean => {
                let b = parse_bool(raw, "cell value").map_err(|err| self.error(err))?;
                Staged::Cell(Cell::Boolean(b))
            },
            ValueType::Date => {
                let dt = parse_date(raw)
                    .ok_or_else(|| self.error(format!("invalid date {raw:?}")))?;
                Staged::Cell(Cell::Date(dt))
            },
            ValueType::SharedString => {
                let index: u32 = atoi_simd::parse(raw.trim().as_bytes())
                    .map_err(|_| self.error(format!("invalid shared string index {raw:?}")))?;
                if index as usize >= self.shared_len {
                    return Err(self.error(format!(
                        "shared string index {index} out of range ({} strings)",
                        self.shared_len
                    )));
                }
                Staged::Cell(Cell::SharedString(index))
            },
            ValueType::FormulaString | ValueType::InlineString => Staged::Text(raw.to_string()),
        };

        Ok(staged)
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    fast_float2::parse::<f64, _>(raw.trim())
        .ok()
        .filter(|n| n.is_finite())
}

/// Parse a `t="d"` payload: ISO 8601 date-time, ISO 8601 date, or serial number.
fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = raw.parse::<NaiveDateTime>() {
        return Some(dt);
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date.and_time(NaiveTime::MIN));
    }
    parse_number(raw).and_then(serial_to_datetime)
}

/// Convert a 1900-system date serial to a date-time.
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let days = serial.trunc();
    let millis = ((serial - days) * MS_PER_DAY).round();

    epoch
        .checked_add_signed(TimeDelta::try_days(days as i64)?)?
        .checked_add_signed(TimeDelta::try_milliseconds(millis as i64)?)
}

impl Worksheet {
    /// Replace the contents of this worksheet with a parsed worksheet part.
    ///
    /// Cells, dimension and sheet format properties are taken from the
    /// document; name and sheet id are kept. `t="s"` indices must exist in
    /// this sheet's shared string table, and text cells are interned into it.
    /// On error the worksheet and the table are left as they were.
    pub fn parse_xml(&mut self, content: &[u8]) -> Result<()> {
        let content = std::str::from_utf8(content)?;
        let parsed = WorksheetParser::new(content, self.shared_strings.len()).parse()?;

        let mut strings = self.shared_strings.lock();
        self.cells.clear();
        self.cells.reserve(parsed.cells.len());
        for ((row, col), staged) in parsed.cells {
            let cell = match staged {
                Staged::Cell(cell) => {
                    if let Cell::SharedString(index) = cell {
                        strings.add_reference(index, row, col);
                    }
                    cell
                },
                Staged::Text(text) => Cell::SharedString(strings.intern(&text, row, col)),
            };
            self.cells.insert((row, col), cell);
        }
        drop(strings);

        self.dimension = parsed.dimension;
        self.sheet_format_props = parsed.sheet_format_props;

        debug!(
            sheet = %self.name,
            rows = parsed.rows,
            cells = self.cells.len(),
            dimension = %self.dimension,
            "parsed worksheet"
        );
        Ok(())
    }

    /// Load a worksheet from its XML part.
    pub fn from_xml(
        name: impl Into<String>,
        sheet_id: u32,
        shared_strings: SharedStringTable,
        content: &[u8],
    ) -> Result<Self> {
        let mut sheet = Worksheet::new(name, sheet_id, shared_strings);
        sheet.parse_xml(content)?;
        Ok(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;

    fn sheet(data: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
        )
    }

    fn load(data: &str, table: &SharedStringTable) -> Result<Worksheet> {
        Worksheet::from_xml("Sheet1", 1, table.clone(), sheet(data).as_bytes())
    }

    #[test]
    fn test_parse_typed_cells() {
        let table = SharedStringTable::new();
        table.add_string("hello");

        let ws = load(
            r#"<row r="2"><c r="A2"><v>42</v></c><c r="B2" t="s"><v>0</v></c><c r="C2" t="b"><v>1</v></c><c r="D2" t="d"><v>2024-01-15T08:30:00</v></c><c r="E2"/></row>"#,
            &table,
        )
        .unwrap();

        assert_eq!(ws.read(2, 1), CellValue::Int(42));
        assert_eq!(ws.read(2, 2), CellValue::String("hello".into()));
        assert_eq!(ws.read(2, 3), CellValue::Bool(true));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        assert_eq!(ws.read(2, 4), CellValue::DateTime(expected));
        assert_eq!(ws.cell(2, 5), Some(&Cell::Blank));
        assert_eq!(ws.compose_dimension(), "A2:E2");
        assert_eq!(table.references(0), vec![(2, 2)]);
    }

    #[test]
    fn test_implicit_coordinates() {
        let table = SharedStringTable::new();
        let ws = load(
            r#"<row><c><v>1</v></c><c><v>2</v></c></row><row><c r="C2"><v>3</v></c><c><v>4</v></c></row>"#,
            &table,
        )
        .unwrap();

        assert_eq!(ws.read(1, 1), CellValue::Int(1));
        assert_eq!(ws.read(1, 2), CellValue::Int(2));
        assert_eq!(ws.read(2, 3), CellValue::Int(3));
        assert_eq!(ws.read(2, 4), CellValue::Int(4));
    }

    #[test]
    fn test_text_cells_are_interned() {
        let table = SharedStringTable::new();
        let ws = load(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><r><t>Bold</t></r><r><t xml:space="preserve"> &amp; more</t></r></is></c><c r="B1" t="str"><f>A1</f><v>cached</v></c></row>"#,
            &table,
        )
        .unwrap();

        assert_eq!(ws.read(1, 1), CellValue::String("Bold & more".into()));
        assert_eq!(ws.read(1, 2), CellValue::String("cached".into()));
        assert_eq!(ws.cell(1, 1), Some(&Cell::SharedString(0)));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_formula_text_is_ignored() {
        let table = SharedStringTable::new();
        let ws = load(r#"<row r="1"><c r="A1"><f>1+1</f><v>2</v></c></row>"#, &table).unwrap();
        assert_eq!(ws.read(1, 1), CellValue::Int(2));
    }

    #[test]
    fn test_sheet_format_props_parsed() {
        let table = SharedStringTable::new();
        let xml = r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetFormatPr defaultRowHeight="18" customHeight="1"/><sheetData/></worksheet>"#;
        let ws = Worksheet::from_xml("S", 1, table, xml.as_bytes()).unwrap();
        assert_eq!(ws.sheet_format_props().default_row_height, 18.0);
        assert!(ws.sheet_format_props().custom_height);
        assert!(ws.is_empty());
        assert_eq!(ws.compose_dimension(), "A1");
    }

    #[test]
    fn test_rejects_malformed_cells() {
        let table = SharedStringTable::new();
        let cases = [
            r#"<row r="1"><c r="A1" t="e"><v>#DIV/0!</v></c></row>"#,
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c></row>"#,
            r#"<row r="1"><c r="A2"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="1A"><v>1</v></c></row>"#,
            r#"<row r="1"><c r="A1"><v>abc</v></c></row>"#,
            r#"<row r="1"><c r="A1" t="b"><v>yes</v></c></row>"#,
            r#"<row r="1"><c r="A1" t="d"><v>someday</v></c></row>"#,
            r#"<row r="0"><c><v>1</v></c></row>"#,
            r#"<row r="1"><c r="A1"><v>1</v></row>"#,
        ];

        for data in cases {
            let err = load(data, &table).unwrap_err();
            assert!(matches!(err, Error::MalformedDocument(_)), "{data}: {err:?}");
        }
        assert!(table.is_empty());
    }

    #[test]
    fn test_rejects_foreign_root() {
        let mut ws = Worksheet::new("S", 1, SharedStringTable::new());
        assert!(ws.parse_xml(b"<sst/>").is_err());
        assert!(ws.parse_xml(b"").is_err());
    }

    #[test]
    fn test_parse_date_forms() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_time(NaiveTime::MIN);
        assert_eq!(parse_date("2024-03-01"), Some(midnight));
        assert_eq!(parse_date("2024-03-01T00:00:00"), Some(midnight));
        assert_eq!(parse_date("45352"), Some(midnight));

        let noon = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(parse_date("45352.5"), Some(noon));
        assert_eq!(parse_date("-1"), None);
    }
}
