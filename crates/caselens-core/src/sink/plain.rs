//! Fallback writer: a minimal workbook assembled with zip and quick-xml.
//!
//! Every cell is an inline string or boolean, so no shared string table or
//! style sheet is needed.

use std::borrow::Cow;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use lazy_static::lazy_static;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::{Captures, Regex};
use zip::write::SimpleFileOptions;
use zip::result::ZipError;
use zip::{CompressionMethod, ZipWriter};

use super::{column_letters, Cell, Sheet, SheetWriter};
use crate::error::SinkError;

const WRITER_NAME: &str = "plain-xlsx";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Results" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;

const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

lazy_static! {
    // Characters XML 1.0 forbids, plus literal "_xHHHH_" runs that a reader would decode
    static ref XSTRING_ESCAPE: Regex = Regex::new(
        r"(?i)_x[0-9a-f]{4}_|[\x00-\x08\x0B\x0C\x0E-\x1F\x{FFFE}\x{FFFF}]"
    ).unwrap();
}

type XmlResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Unformatted workbook writer.
#[derive(Debug, Default)]
pub struct PlainXlsxWriter;

impl PlainXlsxWriter {
    pub fn new() -> Self {
        Self
    }
}

impl SheetWriter for PlainXlsxWriter {
    fn name(&self) -> &'static str {
        WRITER_NAME
    }

    fn write(&self, sheet: &Sheet, path: &Path) -> Result<(), SinkError> {
        let worksheet = worksheet_xml(sheet).map_err(serialize_error)?;

        let file = File::create(path).map_err(|e| SinkError::from_io(path, e))?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, &[u8]); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
            ("_rels/.rels", ROOT_RELS.as_bytes()),
            ("xl/workbook.xml", WORKBOOK.as_bytes()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.as_bytes()),
            ("xl/worksheets/sheet1.xml", &worksheet),
        ];
        for (name, content) in parts {
            zip.start_file(name, options).map_err(|e| zip_error(path, e))?;
            zip.write_all(content).map_err(|e| SinkError::from_io(path, e))?;
        }
        zip.finish().map_err(|e| zip_error(path, e))?;
        Ok(())
    }
}

fn worksheet_xml(sheet: &Sheet) -> XmlResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    writer.write_event(Event::Start(BytesStart::new("worksheet").with_attributes([("xmlns", SHEET_NS)])))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    let header: Vec<Cell> = sheet.columns.iter().map(|c| Cell::Text(c.clone())).collect();
    for (idx, cells) in std::iter::once(&header).chain(&sheet.rows).enumerate() {
        let row_ref = (idx + 1).to_string();
        writer.write_event(Event::Start(BytesStart::new("row").with_attributes([("r", row_ref.as_str())])))?;
        for (col, cell) in cells.iter().enumerate() {
            let cell_ref = format!("{}{}", column_letters(col), row_ref);
            write_cell(&mut writer, &cell_ref, cell)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner())
}

fn write_cell(writer: &mut Writer<Vec<u8>>, cell_ref: &str, cell: &Cell) -> XmlResult<()> {
    match cell {
        Cell::Blank => {}
        Cell::Text(text) => {
            let start = BytesStart::new("c").with_attributes([("r", cell_ref), ("t", "inlineStr")]);
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            writer.write_event(Event::Start(BytesStart::new("t").with_attributes([("xml:space", "preserve")])))?;
            writer.write_event(Event::Text(BytesText::new(&escape_xstring(text))))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        Cell::Bool(flag) => {
            let start = BytesStart::new("c").with_attributes([("r", cell_ref), ("t", "b")]);
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(if *flag { "1" } else { "0" })))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}

/// OOXML string escaping: forbidden characters become `_xHHHH_` and a literal
/// `_xHHHH_` gets its underscore escaped so it reads back unchanged.
fn escape_xstring(text: &str) -> Cow<'_, str> {
    XSTRING_ESCAPE.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        match matched.chars().next() {
            Some('_') => format!("_x005F{matched}"),
            Some(c) => format!("_x{:04X}_", u32::from(c)),
            None => String::new(),
        }
    })
}

fn serialize_error(err: impl std::fmt::Display) -> SinkError {
    SinkError::Serialize {
        writer: WRITER_NAME,
        message: err.to_string(),
    }
}

fn zip_error(path: &Path, err: ZipError) -> SinkError {
    match err {
        ZipError::Io(source) => SinkError::from_io(path, source),
        other => serialize_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    #[test]
    fn test_written_workbook_reads_back() {
        let sheet = Sheet {
            columns: vec!["File Name".to_string(), "Acts: List of Acts".to_string(), "Crime Info: Crime against women".to_string()],
            rows: vec![vec![
                Cell::Text("a & b.pdf".to_string()),
                Cell::Blank,
                Cell::Bool(false),
            ]],
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.xlsx");
        PlainXlsxWriter::new().write(&sheet, &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Results").unwrap();
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("Acts: List of Acts".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("a & b.pdf".to_string())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Bool(false)));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let sheet = Sheet {
            columns: vec!["<File>".to_string()],
            rows: Vec::new(),
        };
        let xml = String::from_utf8(worksheet_xml(&sheet).unwrap()).unwrap();
        assert!(xml.contains("&lt;File&gt;"));
        assert!(xml.contains(r#"<c r="A1" t="inlineStr">"#));
    }

    #[test]
    fn test_control_characters_are_encoded() {
        let sheet = Sheet {
            columns: vec!["File Name".to_string()],
            rows: vec![vec![Cell::Text("a\u{1}b\u{b}c\td_x0041_".to_string())]],
        };
        let xml = String::from_utf8(worksheet_xml(&sheet).unwrap()).unwrap();
        assert!(!xml.contains('\u{1}'));
        assert!(!xml.contains('\u{b}'));
        assert!(xml.contains("a_x0001_b_x000B_c\td_x005F_x0041_"), "{xml}");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control.xlsx");
        PlainXlsxWriter::new().write(&sheet, &path).unwrap();
        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert!(workbook.worksheet_range("Results").is_ok());
    }

    #[test]
    fn test_escape_xstring_leaves_plain_text_borrowed() {
        assert!(matches!(escape_xstring("Appeal allowed\n"), Cow::Borrowed(_)));
        assert_eq!(escape_xstring("\u{FFFE}"), "_xFFFE_");
    }
}
