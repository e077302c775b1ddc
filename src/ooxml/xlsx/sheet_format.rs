//! Sheet format properties (`sheetFormatPr`).

use std::fmt::Write as FmtWrite;

use quick_xml::events::BytesStart;

use crate::common::{Error, Result};

/// Default row height in points used by Excel for Calibri 11.
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;
/// Default base column width in characters.
pub const DEFAULT_BASE_COL_WIDTH: u32 = 8;

/// Worksheet-wide row and column defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetFormatProps {
    /// Base column width in characters (padding excluded)
    pub base_col_width: u32,
    /// Default column width, when set explicitly
    pub default_col_width: Option<f64>,
    /// Default row height in points
    pub default_row_height: f64,
    /// Rows use a custom default height
    pub custom_height: bool,
    /// Rows are hidden by default
    pub zero_height: bool,
    /// Rows have a thick top border by default
    pub thick_top: bool,
    /// Rows have a thick bottom border by default
    pub thick_bottom: bool,
    /// Highest row outline level
    pub outline_level_row: u8,
    /// Highest column outline level
    pub outline_level_col: u8,
}

impl Default for SheetFormatProps {
    fn default() -> Self {
        Self {
            base_col_width: DEFAULT_BASE_COL_WIDTH,
            default_col_width: None,
            default_row_height: DEFAULT_ROW_HEIGHT,
            custom_height: false,
            zero_height: false,
            thick_top: false,
            thick_bottom: false,
            outline_level_row: 0,
            outline_level_col: 0,
        }
    }
}

impl SheetFormatProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default row height in points.
    pub fn with_default_row_height(mut self, height: f64) -> Self {
        self.default_row_height = height;
        self.custom_height = height != DEFAULT_ROW_HEIGHT;
        self
    }

    /// Set the default column width in characters.
    pub fn with_default_col_width(mut self, width: f64) -> Self {
        self.default_col_width = Some(width);
        self
    }

    pub fn with_base_col_width(mut self, width: u32) -> Self {
        self.base_col_width = width;
        self
    }

    /// Hide rows unless they are explicitly shown.
    pub fn with_zero_height(mut self, zero_height: bool) -> Self {
        self.zero_height = zero_height;
        self
    }

    pub fn with_outline_levels(mut self, row: u8, col: u8) -> Self {
        self.outline_level_row = row;
        self.outline_level_col = col;
        self
    }

    /// Write the `<sheetFormatPr/>` element.
    ///
    /// `defaultRowHeight` is always written; everything else only when it
    /// differs from the default.
    pub fn write_xml(&self, xml: &mut String) -> Result<()> {
        xml.push_str("<sheetFormatPr");
        if self.base_col_width != DEFAULT_BASE_COL_WIDTH {
            write!(xml, r#" baseColWidth="{}""#, self.base_col_width)?;
        }
        if let Some(width) = self.default_col_width {
            write!(xml, r#" defaultColWidth="{}""#, width)?;
        }
        write!(xml, r#" defaultRowHeight="{}""#, self.default_row_height)?;

        for (flag, name) in [
            (self.custom_height, "customHeight"),
            (self.zero_height, "zeroHeight"),
            (self.thick_top, "thickTop"),
            (self.thick_bottom, "thickBottom"),
        ] {
            if flag {
                write!(xml, r#" {}="1""#, name)?;
            }
        }

        if self.outline_level_row > 0 {
            write!(xml, r#" outlineLevelRow="{}""#, self.outline_level_row)?;
        }
        if self.outline_level_col > 0 {
            write!(xml, r#" outlineLevelCol="{}""#, self.outline_level_col)?;
        }
        xml.push_str("/>");

        Ok(())
    }

    /// Read properties from a `sheetFormatPr` element. Unknown attributes are ignored.
    pub fn from_element(e: &BytesStart<'_>) -> Result<Self> {
        let mut props = SheetFormatProps::default();

        for attr in e.attributes() {
            let attr = attr?;
            let value = std::str::from_utf8(&attr.value)?;
            match attr.key.local_name().as_ref() {
                b"baseColWidth" => props.base_col_width = parse_number(value, "baseColWidth")?,
                b"defaultColWidth" => {
                    props.default_col_width = Some(parse_number(value, "defaultColWidth")?)
                },
                b"defaultRowHeight" => {
                    props.default_row_height = parse_number(value, "defaultRowHeight")?
                },
                b"customHeight" => props.custom_height = parse_bool(value, "customHeight")?,
                b"zeroHeight" => props.zero_height = parse_bool(value, "zeroHeight")?,
                b"thickTop" => props.thick_top = parse_bool(value, "thickTop")?,
                b"thickBottom" => props.thick_bottom = parse_bool(value, "thickBottom")?,
                b"outlineLevelRow" => {
                    props.outline_level_row = parse_number(value, "outlineLevelRow")?
                },
                b"outlineLevelCol" => {
                    props.outline_level_col = parse_number(value, "outlineLevelCol")?
                },
                _ => {},
            }
        }

        Ok(props)
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::malformed(format!("sheetFormatPr {name}={value:?}")))
}

/// Parse an `xsd:boolean` attribute value.
pub(crate) fn parse_bool(value: &str, name: &str) -> Result<bool> {
    match value.trim() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(Error::malformed(format!("{name}={value:?} is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;
    use quick_xml::events::Event;

    fn element(xml: &str) -> SheetFormatProps {
        let mut reader = Reader::from_str(xml);
        match reader.read_event().unwrap() {
            Event::Empty(e) | Event::Start(e) => SheetFormatProps::from_element(&e).unwrap(),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_default_composition() {
        let mut xml = String::new();
        SheetFormatProps::default().write_xml(&mut xml).unwrap();
        assert_eq!(xml, r#"<sheetFormatPr defaultRowHeight="15"/>"#);
    }

    #[test]
    fn test_custom_composition_round_trip() {
        let props = SheetFormatProps::new()
            .with_default_row_height(20.5)
            .with_default_col_width(12.0)
            .with_base_col_width(10)
            .with_outline_levels(2, 1);
        let mut xml = String::new();
        props.write_xml(&mut xml).unwrap();
        assert_eq!(
            xml,
            r#"<sheetFormatPr baseColWidth="10" defaultColWidth="12" defaultRowHeight="20.5" customHeight="1" outlineLevelRow="2" outlineLevelCol="1"/>"#
        );
        assert_eq!(element(&xml), props);
    }

    #[test]
    fn test_zero_height_round_trip() {
        let props = SheetFormatProps::new().with_zero_height(true);
        let mut xml = String::new();
        props.write_xml(&mut xml).unwrap();
        assert_eq!(xml, r#"<sheetFormatPr defaultRowHeight="15" zeroHeight="1"/>"#);
        assert_eq!(element(&xml), props);
    }

    #[test]
    fn test_parse_accepts_xsd_booleans() {
        let props = element(r#"<sheetFormatPr defaultRowHeight="14.4" zeroHeight="true" thickTop="0" x14ac:dyDescent="0.3"/>"#);
        assert_eq!(props.default_row_height, 14.4);
        assert!(props.zero_height);
        assert!(!props.thick_top);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        let mut reader = Reader::from_str(r#"<sheetFormatPr defaultRowHeight="tall"/>"#);
        let Event::Empty(e) = reader.read_event().unwrap() else {
            panic!("expected empty element");
        };
        assert!(SheetFormatProps::from_element(&e).is_err());
    }
}
