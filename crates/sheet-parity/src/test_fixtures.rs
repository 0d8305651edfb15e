//! Minimal XLSX writer for tests.
//!
//! Produces just enough of an Office Open XML package for calamine to read: content types,
//! relationships, a workbook, and one worksheet per sheet with inline strings. Cells are
//! placed by position, so a leading [`FixtureCell::Empty`] shifts the data right and an empty
//! row shifts it down.
//!
//! Enabled by the `test-fixtures` feature.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

use crate::error::{Result, SheetParityError};

/// One cell of a fixture sheet
#[derive(Debug, Clone, PartialEq)]
pub enum FixtureCell {
    Number(f64),
    Text(String),
    Bool(bool),
    /// No `<c>` element is written
    Empty,
}

impl From<f64> for FixtureCell {
    fn from(value: f64) -> Self {
        FixtureCell::Number(value)
    }
}

impl From<&str> for FixtureCell {
    fn from(value: &str) -> Self {
        FixtureCell::Text(value.to_owned())
    }
}

impl From<bool> for FixtureCell {
    fn from(value: bool) -> Self {
        FixtureCell::Bool(value)
    }
}

/// A named worksheet, rows top to bottom starting at row 1
#[derive(Debug, Clone)]
pub struct FixtureSheet {
    pub name: String,
    pub rows: Vec<Vec<FixtureCell>>,
}

impl FixtureSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<FixtureCell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

const CONTENT_TYPES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Write `sheets` as a workbook at `path`.
///
/// # Errors
///
/// Returns [`SheetParityError::Io`] if the file cannot be created and
/// [`SheetParityError::Serialization`] if the archive cannot be written.
pub fn write_xlsx(path: &Path, sheets: &[FixtureSheet]) -> Result<()> {
    let mut overrides = String::new();
    let mut workbook_sheets = String::new();
    let mut workbook_rels = String::new();
    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        workbook_sheets.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape_xml(&sheet.name)
        ));
        workbook_rels.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }

    let content_types = format!("{CONTENT_TYPES_HEAD}{overrides}</Types>");
    let workbook = format!(
        r#"{XML_DECL}
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{workbook_sheets}</sheets></workbook>"#
    );
    let workbook_rels = format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{workbook_rels}</Relationships>"#
    );

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels),
    ];
    for (i, sheet) in sheets.iter().enumerate() {
        parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), worksheet_xml(&sheet.rows)));
    }

    let mut zip = zip::ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, body) in &parts {
        zip.start_file(name.as_str(), options)
            .map_err(|e| SheetParityError::serialization_with_source(format!("Cannot add {}", name), e))?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish()
        .map_err(|e| SheetParityError::serialization_with_source("Cannot finish fixture archive", e))?;

    Ok(())
}

/// Write a single-sheet workbook named `fixture.xlsx` inside `dir` and return its path.
pub fn single_sheet(dir: &Path, rows: Vec<Vec<FixtureCell>>) -> Result<PathBuf> {
    let path = dir.join("fixture.xlsx");
    write_xlsx(&path, &[FixtureSheet::new("Sheet1", rows)])?;
    Ok(path)
}

fn worksheet_xml(rows: &[Vec<FixtureCell>]) -> String {
    let mut data = String::new();
    for (r, row) in rows.iter().enumerate() {
        let row_no = r + 1;
        data.push_str(&format!(r#"<row r="{row_no}">"#));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(c), row_no);
            match cell {
                FixtureCell::Number(v) => data.push_str(&format!(r#"<c r="{reference}"><v>{v}</v></c>"#)),
                FixtureCell::Text(s) => data.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                    escape_xml(s)
                )),
                FixtureCell::Bool(b) => data.push_str(&format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, u8::from(*b))),
                FixtureCell::Empty => {}
            }
        }
        data.push_str("</row>");
    }
    format!(
        r#"{XML_DECL}
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{data}</sheetData></worksheet>"#
    )
}

/// Zero-based column index to its letter name (`0` → `A`, `26` → `AA`)
pub fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.iter().rev().map(|&b| b as char).collect()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
