//! `.xls` writer: buffers cells, then lays out a BIFF8 workbook stream and
//! wraps it in an OLE2 compound file.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, Cursor, Write};

use crate::biff::{
    BOF_DT_WORKBOOK_GLOBALS, BOF_DT_WORKSHEET, N_CODEPAGE_UTF16, patch_boundsheet_position,
    write_blank, write_bof, write_boolerr, write_boundsheet, write_codepage, write_dimensions,
    write_eof, write_font, write_labelsst, write_number, write_sst, write_style_normal,
    write_window1, write_window2, write_wsbool, write_xf,
};
use crate::conf::{N_LEN_EXCEL_CELL_TEXT_MAX, N_NCOLS_BIFF8_MAX, N_NROWS_BIFF8_MAX};
use crate::spec::{EnumCellValue, EnumSheetFormat, SheetConvertError};
use crate::writer::SheetWriter;

/// Compound-file stream holding the BIFF8 workbook.
const C_STREAM_NAME_WORKBOOK: &str = "Workbook";
const C_FONT_NAME_DEFAULT: &str = "Arial";
const N_FONT_HEIGHT_TWIPS: u16 = 200;
// Font index 4 is never referenced in BIFF, so four records cover indices 0..=5.
const N_FONT_COUNT: usize = 4;
const N_XF_STYLE_COUNT: usize = 15;
/// Cell XF following the 15 style XFs; every cell uses it.
const N_XF_CELL_DEFAULT: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq)]
enum EnumXlsCell {
    Blank,
    Boolean(bool),
    Number(f64),
    Label(u32),
}

/// Insertion-ordered shared string table.
#[derive(Debug, Default)]
struct SpecSharedStrings {
    strings: Vec<String>,
    dict_idx: HashMap<String, u32>,
}

impl SpecSharedStrings {
    fn intern(&mut self, text: &str) -> u32 {
        if let Some(n_idx) = self.dict_idx.get(text) {
            return *n_idx;
        }
        let n_idx = self.strings.len() as u32;
        self.strings.push(text.to_string());
        self.dict_idx.insert(text.to_string(), n_idx);
        n_idx
    }
}

/// Single-sheet BIFF8 workbook builder.
pub struct XlsSheetWriter {
    sheet_name: String,
    dict_cells: BTreeMap<(u16, u16), EnumXlsCell>,
    sst: SpecSharedStrings,
}

impl XlsSheetWriter {
    /// Create an empty workbook whose only worksheet is named `sheet_name`.
    pub fn new(sheet_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            dict_cells: BTreeMap::new(),
            sst: SpecSharedStrings::default(),
        }
    }

    /// `(row_first, row_last_excl, col_first, col_last_excl)` of used cells.
    fn derive_dimensions(&self) -> (u32, u32, u16, u16) {
        let (Some(&(n_row_first, _)), Some(&(n_row_last, _))) =
            (self.dict_cells.keys().next(), self.dict_cells.keys().next_back())
        else {
            return (0, 0, 0, 0);
        };
        let n_col_first = self.dict_cells.keys().map(|k| k.1).min().unwrap_or(0);
        let n_col_last = self.dict_cells.keys().map(|k| k.1).max().unwrap_or(0);
        (
            u32::from(n_row_first),
            u32::from(n_row_last) + 1,
            n_col_first,
            n_col_last + 1,
        )
    }

    /// Build the raw `Workbook` stream: globals substream, then the worksheet.
    fn build_workbook_stream(&self) -> Result<Vec<u8>, SheetConvertError> {
        let mut out = Vec::new();

        write_bof(&mut out, BOF_DT_WORKBOOK_GLOBALS);
        write_codepage(&mut out, N_CODEPAGE_UTF16);
        write_window1(&mut out);
        for _ in 0..N_FONT_COUNT {
            write_font(&mut out, C_FONT_NAME_DEFAULT, N_FONT_HEIGHT_TWIPS);
        }
        for _ in 0..N_XF_STYLE_COUNT {
            write_xf(&mut out, 0, 0, true);
        }
        write_xf(&mut out, 0, 0, false);
        write_style_normal(&mut out);
        let n_offset_sheet_pos = write_boundsheet(&mut out, &self.sheet_name);

        if !self.sst.strings.is_empty() {
            let n_labels = self
                .dict_cells
                .values()
                .filter(|cell| matches!(cell, EnumXlsCell::Label(_)))
                .count() as u32;
            write_sst(&mut out, &self.sst.strings, n_labels);
        }
        write_eof(&mut out);

        let n_sheet_pos = u32::try_from(out.len()).map_err(|_| SheetConvertError::Write {
            format: EnumSheetFormat::Xls,
            message: "workbook globals exceed 4 GiB".to_string(),
        })?;
        patch_boundsheet_position(&mut out, n_offset_sheet_pos, n_sheet_pos);

        write_bof(&mut out, BOF_DT_WORKSHEET);
        write_wsbool(&mut out);
        let (n_row_first, n_row_last, n_col_first, n_col_last) = self.derive_dimensions();
        write_dimensions(&mut out, n_row_first, n_row_last, n_col_first, n_col_last);

        for (&(n_row, n_col), cell) in &self.dict_cells {
            match cell {
                EnumXlsCell::Blank => write_blank(&mut out, n_row, n_col, N_XF_CELL_DEFAULT),
                EnumXlsCell::Boolean(val) => {
                    write_boolerr(&mut out, n_row, n_col, N_XF_CELL_DEFAULT, *val)
                }
                EnumXlsCell::Number(val) => {
                    write_number(&mut out, n_row, n_col, N_XF_CELL_DEFAULT, *val)
                }
                EnumXlsCell::Label(n_idx) => {
                    write_labelsst(&mut out, n_row, n_col, N_XF_CELL_DEFAULT, *n_idx)
                }
            }
        }

        write_window2(&mut out);
        write_eof(&mut out);
        Ok(out)
    }
}

impl SheetWriter for XlsSheetWriter {
    fn format(&self) -> EnumSheetFormat {
        EnumSheetFormat::Xls
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
        // u16 covers exactly the 65,536 BIFF8 rows.
        let n_row = u16::try_from(row).map_err(|_| SheetConvertError::ExceedsLimits {
            format: EnumSheetFormat::Xls,
            message: format!("row index {row} >= {N_NROWS_BIFF8_MAX}"),
        })?;
        if usize::from(col) >= N_NCOLS_BIFF8_MAX {
            return Err(SheetConvertError::ExceedsLimits {
                format: EnumSheetFormat::Xls,
                message: format!("column index {col} >= {N_NCOLS_BIFF8_MAX}"),
            });
        }

        let cell = match value {
            EnumCellValue::Blank => EnumXlsCell::Blank,
            EnumCellValue::Boolean(val) => EnumXlsCell::Boolean(*val),
            EnumCellValue::Number(val) => EnumXlsCell::Number(*val),
            EnumCellValue::String(val) => {
                // SST lengths are u16 character counts.
                let n_len = val.chars().count();
                if n_len > N_LEN_EXCEL_CELL_TEXT_MAX {
                    return Err(SheetConvertError::ExceedsLimits {
                        format: EnumSheetFormat::Xls,
                        message: format!(
                            "text cell of {n_len} characters > {N_LEN_EXCEL_CELL_TEXT_MAX}"
                        ),
                    });
                }
                EnumXlsCell::Label(self.sst.intern(val))
            }
        };
        self.dict_cells.insert((n_row, col), cell);
        Ok(())
    }

    fn save_to_buffer(&mut self) -> Result<Vec<u8>, SheetConvertError> {
        let v_stream = self.build_workbook_stream()?;
        wrap_compound_file(&v_stream).map_err(|err| SheetConvertError::Write {
            format: EnumSheetFormat::Xls,
            message: format!("compound file: {err}"),
        })
    }
}

/// Wrap the stream in a version 3 (512-byte sector) compound file, the layout
/// `.xls` readers expect.
fn wrap_compound_file(v_stream: &[u8]) -> io::Result<Vec<u8>> {
    let mut comp =
        cfb::CompoundFile::create_with_version(cfb::Version::V3, Cursor::new(Vec::new()))?;
    {
        let mut stream = comp.create_stream(C_STREAM_NAME_WORKBOOK)?;
        stream.write_all(v_stream)?;
        stream.flush()?;
    }
    comp.flush()?;
    Ok(comp.into_inner().into_inner())
}
