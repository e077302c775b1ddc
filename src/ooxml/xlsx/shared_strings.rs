//! Shared strings table for Excel files.
//!
//! Excel stores string cell values once in `xl/sharedStrings.xml` and has
//! cells refer to them by index. Every worksheet of a document interns into
//! the same table, so the table is handed around as a cloneable
//! [`SharedStringTable`] handle that serializes access behind a mutex.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::common::xml::{escape_xml, needs_space_preserve};
use crate::common::{Error, Result};

use super::parsers::push_text;

/// Deduplicated string pool.
#[derive(Debug, Default)]
pub struct SharedStrings {
    /// The actual strings, in index order
    strings: Vec<String>,
    /// Reverse mapping from string to index for deduplication
    string_to_index: HashMap<String, u32>,
    /// Cells that reference each string, parallel to `strings`
    references: Vec<Vec<(u32, u32)>>,
    /// Total number of interned references
    count: usize,
}

impl SharedStrings {
    /// Create a new empty shared strings table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text` on behalf of the cell at (row, col) and return its index.
    ///
    /// If the string already exists, returns the existing index.
    pub fn intern(&mut self, text: &str, row: u32, col: u32) -> u32 {
        let index = self.add_string(text);
        self.references[index as usize].push((row, col));
        self.count += 1;
        tracing::trace!(index, row, col, "interned shared string");
        index
    }

    /// Record that the cell at (row, col) uses the existing string at `index`.
    ///
    /// Returns `false` if there is no such string.
    pub fn add_reference(&mut self, index: u32, row: u32, col: u32) -> bool {
        match self.references.get_mut(index as usize) {
            Some(refs) => {
                refs.push((row, col));
                self.count += 1;
                true
            },
            None => false,
        }
    }

    /// Add a string without recording a cell reference.
    pub fn add_string(&mut self, text: &str) -> u32 {
        if let Some(&index) = self.string_to_index.get(text) {
            return index;
        }
        self.push_entry(text.to_string())
    }

    fn push_entry(&mut self, text: String) -> u32 {
        let index = self.strings.len() as u32;
        self.string_to_index.entry(text.clone()).or_insert(index);
        self.strings.push(text);
        self.references.push(Vec::new());
        index
    }

    /// Get a string by its index.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(|s| s.as_str())
    }

    /// Index of a string, if it has been interned.
    pub fn index_of(&self, text: &str) -> Option<u32> {
        self.string_to_index.get(text).copied()
    }

    /// Cells recorded as referencing the string at `index`.
    pub fn references(&self, index: u32) -> &[(u32, u32)] {
        self.references
            .get(index as usize)
            .map(|r| r.as_slice())
            .unwrap_or(&[])
    }

    /// Get the number of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Total number of references (the `count` attribute).
    pub fn count(&self) -> usize {
        self.count.max(self.strings.len())
    }

    /// Get all strings.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Serialize the shared strings table to XML.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(128 + self.strings.len() * 24);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        write!(
            xml,
            r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            self.count(),
            self.strings.len()
        )?;

        for s in &self.strings {
            if needs_space_preserve(s) {
                write!(xml, r#"<si><t xml:space="preserve">{}</t></si>"#, escape_xml(s))?;
            } else {
                write!(xml, "<si><t>{}</t></si>", escape_xml(s))?;
            }
        }

        xml.push_str("</sst>");

        Ok(xml)
    }

    /// Parse shared strings from `xl/sharedStrings.xml` content.
    ///
    /// Rich-text runs are flattened to their text; phonetic runs are skipped.
    pub fn parse(content: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(content)?;
        let mut reader = Reader::from_str(content);

        let mut table = SharedStrings::new();
        let mut current: Option<String> = None;
        let mut in_text = false;
        let mut phonetic_depth = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| {
                Error::MalformedDocument(format!(
                    "sharedStrings.xml at byte {}: {}",
                    reader.error_position(),
                    e
                ))
            })?;

            match &event {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"si" => current = Some(String::new()),
                    b"rPh" => phonetic_depth += 1,
                    b"t" if current.is_some() && phonetic_depth == 0 => in_text = true,
                    _ => {},
                },
                Event::Empty(e) => {
                    if e.local_name().as_ref() == b"si" {
                        table.push_entry(String::new());
                    }
                },
                Event::End(e) => match e.local_name().as_ref() {
                    b"si" => {
                        if let Some(text) = current.take() {
                            table.push_entry(text);
                        }
                    },
                    b"rPh" => phonetic_depth = phonetic_depth.saturating_sub(1),
                    b"t" => in_text = false,
                    _ => {},
                },
                Event::Text(_) | Event::GeneralRef(_) | Event::CData(_) => {
                    if in_text && let Some(text) = current.as_mut() {
                        push_text(text, &event)?;
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        tracing::debug!(unique = table.len(), "parsed shared strings");
        Ok(table)
    }
}

/// Shared handle to a document's string table.
///
/// Cloning the handle shares the table. Each operation takes the lock for
/// its own duration, so interning from several worksheets is serialized and
/// indices stay unique across the document.
#[derive(Debug, Clone, Default)]
pub struct SharedStringTable {
    inner: Arc<Mutex<SharedStrings>>,
}

impl SharedStringTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing table, e.g. one produced by [`SharedStrings::parse`].
    pub fn from_strings(strings: SharedStrings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(strings)),
        }
    }

    /// Parse `xl/sharedStrings.xml` into a new table.
    pub fn from_xml(content: &[u8]) -> Result<Self> {
        SharedStrings::parse(content).map(Self::from_strings)
    }

    /// Intern `text` for the cell at (row, col) and return its index.
    pub fn intern(&self, text: &str, row: u32, col: u32) -> u32 {
        self.inner.lock().intern(text, row, col)
    }

    /// Add a string without recording a cell reference.
    pub fn add_string(&self, text: &str) -> u32 {
        self.inner.lock().add_string(text)
    }

    /// Get a copy of the string at `index`.
    pub fn get(&self, index: u32) -> Option<String> {
        self.inner.lock().get(index).map(str::to_string)
    }

    /// Index of a string, if it has been interned.
    pub fn index_of(&self, text: &str) -> Option<u32> {
        self.inner.lock().index_of(text)
    }

    /// Cells recorded as referencing the string at `index`.
    pub fn references(&self, index: u32) -> Vec<(u32, u32)> {
        self.inner.lock().references(index).to_vec()
    }

    /// Whether `index` refers to an existing string.
    pub fn contains_index(&self, index: u32) -> bool {
        (index as usize) < self.inner.lock().len()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Total number of references.
    pub fn count(&self) -> usize {
        self.inner.lock().count()
    }

    /// Lock the table for several operations in a row.
    pub fn lock(&self) -> MutexGuard<'_, SharedStrings> {
        self.inner.lock()
    }

    /// Serialize the table to `xl/sharedStrings.xml` content.
    pub fn compose_xml(&self) -> Result<String> {
        self.inner.lock().to_xml()
    }

    /// Whether two handles share the same table.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
