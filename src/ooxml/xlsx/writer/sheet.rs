//! Worksheet XML composition.
//!
//! Rows are emitted in ascending order, cells in ascending column order,
//! with span attributes taken from a span computation done at the start of
//! every composition pass.

use std::fmt::Write as FmtWrite;
use std::io;

use chrono::NaiveDateTime;
use tracing::debug;

use crate::common::Result;
use crate::ooxml::xlsx::cell::Cell;
use crate::ooxml::xlsx::coordinate::encode;
use crate::ooxml::xlsx::worksheet::Worksheet;

/// Format used for `t="d"` cell values (ISO 8601, fraction only when non-zero).
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Numbers below this magnitude with no fraction are written as integers.
const INTEGER_LIMIT: f64 = 1e15;

impl Worksheet {
    /// Serialize the worksheet to XML.
    pub fn compose_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(512 + self.cells.len() * 32);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

        write!(xml, r#"<dimension ref="{}"/>"#, self.compose_dimension())?;
        xml.push_str(r#"<sheetViews><sheetView workbookViewId="0"/></sheetViews>"#);
        self.sheet_format_props.write_xml(&mut xml)?;

        if self.cells.is_empty() {
            xml.push_str("<sheetData/>");
        } else {
            xml.push_str("<sheetData>");
            self.write_sheet_data(&mut xml)?;
            xml.push_str("</sheetData>");
        }

        xml.push_str(r#"<pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/>"#);
        xml.push_str("</worksheet>");

        Ok(xml)
    }

    /// Serialize the worksheet into a byte sink, e.g. an archive entry.
    pub fn write_xml<W: io::Write>(&self, mut writer: W) -> Result<()> {
        let xml = self.compose_xml()?;
        writer.write_all(xml.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Write sheet data (rows and cells).
    fn write_sheet_data(&self, xml: &mut String) -> Result<()> {
        let spans = self.calculate_spans();
        let cells = self.sorted_cells();

        let mut current_row = None;
        for ((row, col), cell) in cells {
            if current_row != Some(row) {
                if current_row.is_some() {
                    xml.push_str("</row>");
                }
                write!(xml, r#"<row r="{}""#, row)?;
                if let Some(span) = spans.get(row) {
                    write!(xml, r#" spans="{}""#, span)?;
                }
                xml.push('>');
                current_row = Some(row);
            }

            self.write_cell(xml, &encode(row, col), cell)?;
        }

        if current_row.is_some() {
            xml.push_str("</row>");
        }

        debug!(
            sheet = %self.name,
            rows = spans.len(),
            cells = self.cells.len(),
            dimension = %self.dimension,
            "composed worksheet"
        );
        Ok(())
    }

    /// Write a single cell to XML.
    fn write_cell(&self, xml: &mut String, cell_ref: &str, cell: &Cell) -> Result<()> {
        match cell {
            Cell::Blank => {
                write!(xml, r#"<c r="{}"/>"#, cell_ref)?;
            },
            Cell::Number(n) => {
                write!(xml, r#"<c r="{}"><v>"#, cell_ref)?;
                write_number(xml, *n);
                xml.push_str("</v></c>");
            },
            Cell::Boolean(b) => {
                write!(
                    xml,
                    r#"<c r="{}" t="b"><v>{}</v></c>"#,
                    cell_ref,
                    if *b { "1" } else { "0" }
                )?;
            },
            Cell::Date(dt) => {
                write!(
                    xml,
                    r#"<c r="{}" t="d"><v>{}</v></c>"#,
                    cell_ref,
                    format_date(dt)
                )?;
            },
            Cell::SharedString(index) => {
                write!(xml, r#"<c r="{}" t="s"><v>{}</v></c>"#, cell_ref, index)?;
            },
        }

        Ok(())
    }
}

/// Append the shortest text that parses back to exactly `n`.
fn write_number(xml: &mut String, n: f64) {
    if n.fract() == 0.0 && n.abs() < INTEGER_LIMIT {
        xml.push_str(itoa::Buffer::new().format(n as i64));
    } else {
        xml.push_str(ryu::Buffer::new().format_finite(n));
    }
}

pub(crate) fn format_date(dt: &NaiveDateTime) -> String {
    dt.format(DATE_FORMAT).to_string()
}
