//! `.xlsx` writer backed by `rust_xlsxwriter`.

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::spec::{EnumCellValue, EnumSheetFormat, SheetConvertError};
use crate::writer::SheetWriter;

/// Single-sheet in-memory workbook.
pub struct XlsxSheetWriter {
    workbook: Workbook,
    sheet_name: String,
}

impl XlsxSheetWriter {
    /// Create a workbook whose only worksheet is named `sheet_name`.
    pub fn new(sheet_name: &str) -> Result<Self, SheetConvertError> {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .set_name(sheet_name)
            .map_err(derive_xlsx_error)?;
        Ok(Self {
            workbook,
            sheet_name: sheet_name.to_string(),
        })
    }
}

impl SheetWriter for XlsxSheetWriter {
    fn format(&self) -> EnumSheetFormat {
        EnumSheetFormat::Xlsx
    }

    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn write_cell(
        &mut self,
        row: u32,
        col: u16,
        value: &EnumCellValue,
    ) -> Result<(), SheetConvertError> {
        let worksheet = self
            .workbook
            .worksheet_from_index(0)
            .map_err(derive_xlsx_error)?;
        match value {
            // Blank cells are simply not stored.
            EnumCellValue::Blank => {}
            EnumCellValue::Boolean(val) => {
                worksheet
                    .write_boolean(row, col, *val)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::Number(val) => {
                worksheet
                    .write_number(row, col, *val)
                    .map_err(derive_xlsx_error)?;
            }
            EnumCellValue::String(val) => {
                worksheet
                    .write_string(row, col, val.as_str())
                    .map_err(derive_xlsx_error)?;
            }
        }
        Ok(())
    }

    fn save_to_buffer(&mut self) -> Result<Vec<u8>, SheetConvertError> {
        self.workbook.save_to_buffer().map_err(derive_xlsx_error)
    }
}

fn derive_xlsx_error(err: XlsxError) -> SheetConvertError {
    SheetConvertError::Write {
        format: EnumSheetFormat::Xlsx,
        message: err.to_string(),
    }
}
