//! Primary writer, backed by rust_xlsxwriter.

use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use super::{Cell, Sheet, SheetWriter};
use crate::error::SinkError;

const SHEET_NAME: &str = "Results";
const COLUMN_WIDTH: f64 = 30.0;

/// Writes a formatted workbook: bold frozen header, fixed column widths.
#[derive(Debug, Default)]
pub struct XlsxSheetWriter;

impl XlsxSheetWriter {
    pub fn new() -> Self {
        Self
    }

    fn build(&self, sheet: &Sheet) -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        let header = Format::new().set_bold();
        for (col, name) in sheet.columns.iter().enumerate() {
            let col = column(col)?;
            worksheet.write_string_with_format(0, col, name, &header)?;
            worksheet.set_column_width(col, COLUMN_WIDTH)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (idx, cells) in sheet.rows.iter().enumerate() {
            let row = u32::try_from(idx + 1).map_err(|_| XlsxError::RowColumnLimitError)?;
            for (col, cell) in cells.iter().enumerate() {
                let col = column(col)?;
                match cell {
                    Cell::Blank => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row, col, text)?;
                    }
                    Cell::Bool(flag) => {
                        worksheet.write_boolean(row, col, *flag)?;
                    }
                }
            }
        }
        Ok(workbook)
    }
}

fn column(index: usize) -> Result<u16, XlsxError> {
    u16::try_from(index).map_err(|_| XlsxError::RowColumnLimitError)
}

impl SheetWriter for XlsxSheetWriter {
    fn name(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, sheet: &Sheet, path: &Path) -> Result<(), SinkError> {
        let mut workbook = self.build(sheet).map_err(|e| map_error(self.name(), path, e))?;
        workbook.save(path).map_err(|e| map_error(self.name(), path, e))
    }
}

fn map_error(writer: &'static str, path: &Path, err: XlsxError) -> SinkError {
    match err {
        XlsxError::IoError(source) => SinkError::from_io(path, source),
        other => SinkError::Serialize {
            writer,
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{open_workbook, Data, Reader, Xlsx};

    fn sample() -> Sheet {
        Sheet {
            columns: vec!["File Name".to_string(), "Crime Info: Crime against women".to_string()],
            rows: vec![
                vec![Cell::Text("a.pdf".to_string()), Cell::Bool(true)],
                vec![Cell::Text("b.pdf".to_string()), Cell::Blank],
            ],
        }
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        XlsxSheetWriter::new().write(&sample(), &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        let range = workbook.worksheet_range("Results").unwrap();
        assert_eq!(range.get_value((0, 0)), Some(&Data::String("File Name".to_string())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::String("a.pdf".to_string())));
        assert_eq!(range.get_value((1, 1)), Some(&Data::Bool(true)));
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = XlsxSheetWriter::new().write(&sample(), &path).unwrap_err();
        assert!(matches!(err, SinkError::Io { .. }), "{err}");
    }
}
