//! Writer strategy seam and the format-independent table write.

use tracing::warn;

use crate::spec::{
    EnumCellValue, EnumSheetFormat, SheetConvertError, SpecPayload, SpecSheetReport,
};
use crate::util::{cast_col_num, cast_row_num, derive_misaligned_row_indices};

/// Single-sheet workbook encoder for one output format.
///
/// Cells are addressed 0-based: row 0 is the header row.
pub trait SheetWriter {
    /// Format this writer produces.
    fn format(&self) -> EnumSheetFormat;

    /// Name of the only worksheet.
    fn sheet_name(&self) -> &str;

    /// Place one value. Blank values follow the format's native handling.
    fn write_cell(
        &mut self,
        row: u32,
        col: u16,
        value: &EnumCellValue,
    ) -> Result<(), SheetConvertError>;

    /// Encode the complete workbook file in memory.
    fn save_to_buffer(&mut self) -> Result<Vec<u8>, SheetConvertError>;
}

/// Whether the writer for `format` was compiled in.
pub fn is_writer_available(format: EnumSheetFormat) -> bool {
    match format {
        EnumSheetFormat::Xlsx => cfg!(feature = "xlsx"),
        EnumSheetFormat::Xls => cfg!(feature = "xls"),
    }
}

/// Create the writer strategy for `format` with one sheet named `sheet_name`.
pub fn create_sheet_writer(
    format: EnumSheetFormat,
    sheet_name: &str,
) -> Result<Box<dyn SheetWriter>, SheetConvertError> {
    match format {
        EnumSheetFormat::Xlsx => create_xlsx_writer(sheet_name),
        EnumSheetFormat::Xls => create_xls_writer(sheet_name),
    }
}

#[cfg(feature = "xlsx")]
fn create_xlsx_writer(sheet_name: &str) -> Result<Box<dyn SheetWriter>, SheetConvertError> {
    Ok(Box::new(crate::xlsx::XlsxSheetWriter::new(sheet_name)?))
}

#[cfg(not(feature = "xlsx"))]
fn create_xlsx_writer(_sheet_name: &str) -> Result<Box<dyn SheetWriter>, SheetConvertError> {
    Err(SheetConvertError::WriterUnavailable {
        format: EnumSheetFormat::Xlsx,
        feature: EnumSheetFormat::Xlsx.feature_name(),
    })
}

#[cfg(feature = "xls")]
fn create_xls_writer(sheet_name: &str) -> Result<Box<dyn SheetWriter>, SheetConvertError> {
    Ok(Box::new(crate::xls::XlsSheetWriter::new(sheet_name)))
}

#[cfg(not(feature = "xls"))]
fn create_xls_writer(_sheet_name: &str) -> Result<Box<dyn SheetWriter>, SheetConvertError> {
    Err(SheetConvertError::WriterUnavailable {
        format: EnumSheetFormat::Xls,
        feature: EnumSheetFormat::Xls.feature_name(),
    })
}

/// Write headers into row 0 and `rows` from row 1, preserving order.
///
/// Row lengths are not checked against the header width; mismatches are
/// reported as a warning and written as-is.
pub fn write_payload(
    writer: &mut dyn SheetWriter,
    payload: &SpecPayload,
) -> Result<SpecSheetReport, SheetConvertError> {
    let format = writer.format();
    let derive_limit_error = |message: String| SheetConvertError::ExceedsLimits { format, message };

    let mut report = SpecSheetReport::new(writer.sheet_name(), format);

    for (col_idx, c_header) in payload.headers.iter().enumerate() {
        let n_col = cast_col_num(col_idx).map_err(derive_limit_error)?;
        writer.write_cell(0, n_col, &EnumCellValue::String(c_header.clone()))?;
        report.cnt_cells += 1;
    }

    for (row_idx, row) in payload.rows.iter().enumerate() {
        let n_row = cast_row_num(row_idx + 1).map_err(derive_limit_error)?;
        for (col_idx, value) in row.iter().enumerate() {
            let n_col = cast_col_num(col_idx).map_err(derive_limit_error)?;
            writer.write_cell(n_row, n_col, value)?;
            if !matches!(value, EnumCellValue::Blank) {
                report.cnt_cells += 1;
            }
        }
    }
    report.cnt_rows = payload.height();

    let l_idx_misaligned = derive_misaligned_row_indices(payload);
    if let Some(n_idx_first) = l_idx_misaligned.first() {
        let c_msg = format!(
            "{} of {} rows differ from header width {} (first at data row {}); written as-is",
            l_idx_misaligned.len(),
            payload.rows.len(),
            payload.headers.len(),
            n_idx_first
        );
        warn!(sheet = report.sheet_name.as_str(), "{c_msg}");
        report.warn(c_msg);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    /// Records placements instead of encoding a file.
    #[derive(Default)]
    struct RecordingWriter {
        dict_cells: BTreeMap<(u32, u16), EnumCellValue>,
    }

    impl SheetWriter for RecordingWriter {
        fn format(&self) -> EnumSheetFormat {
            EnumSheetFormat::Xlsx
        }

        fn sheet_name(&self) -> &str {
            "Sheet1"
        }

        fn write_cell(
            &mut self,
            row: u32,
            col: u16,
            value: &EnumCellValue,
        ) -> Result<(), SheetConvertError> {
            self.dict_cells.insert((row, col), value.clone());
            Ok(())
        }

        fn save_to_buffer(&mut self) -> Result<Vec<u8>, SheetConvertError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_write_payload_places_headers_then_rows() {
        let payload: SpecPayload = serde_json::from_str(
            r#"{"headers": ["A", "B"], "rows": [[1, "x"], [2, "y"]]}"#,
        )
        .expect("payload");
        let mut writer = RecordingWriter::default();

        let report = write_payload(&mut writer, &payload).expect("write");

        let s = |v: &str| EnumCellValue::String(v.to_string());
        let l_expected = vec![
            ((0, 0), s("A")),
            ((0, 1), s("B")),
            ((1, 0), EnumCellValue::Number(1.0)),
            ((1, 1), s("x")),
            ((2, 0), EnumCellValue::Number(2.0)),
            ((2, 1), s("y")),
        ];
        assert_eq!(writer.dict_cells.into_iter().collect::<Vec<_>>(), l_expected);
        assert_eq!(report.cnt_rows, 3);
        assert_eq!(report.cnt_cells, 6);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_write_payload_passes_ragged_rows_through() {
        let payload: SpecPayload =
            serde_json::from_str(r#"{"headers": ["A", "B"], "rows": [[1], [null, 2, 3]]}"#)
                .expect("payload");
        let mut writer = RecordingWriter::default();

        let report = write_payload(&mut writer, &payload).expect("write");

        assert_eq!(writer.dict_cells.get(&(2, 2)), Some(&EnumCellValue::Number(3.0)));
        assert_eq!(writer.dict_cells.get(&(2, 0)), Some(&EnumCellValue::Blank));
        assert!(!writer.dict_cells.contains_key(&(1, 1)));
        assert_eq!(report.cnt_cells, 5);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("2 of 2 rows"));
    }

    #[test]
    fn test_write_payload_empty_writes_nothing() {
        let mut writer = RecordingWriter::default();
        let report = write_payload(&mut writer, &SpecPayload::default()).expect("write");

        assert!(writer.dict_cells.is_empty());
        assert_eq!(report.cnt_rows, 0);
        assert_eq!(report.cnt_cells, 0);
    }

    #[test]
    fn test_writer_availability_follows_features() {
        assert_eq!(is_writer_available(EnumSheetFormat::Xlsx), cfg!(feature = "xlsx"));
        assert_eq!(is_writer_available(EnumSheetFormat::Xls), cfg!(feature = "xls"));
    }

    #[cfg(not(feature = "xls"))]
    #[test]
    fn test_create_sheet_writer_reports_missing_xls_writer() {
        let err = create_sheet_writer(EnumSheetFormat::Xls, "Sheet1")
            .err()
            .expect("xls writer disabled");
        assert_eq!(err.exit_code(), 2);
        assert_eq!(
            err.to_string(),
            "dependency missing: xls writer not built (enable the `xls` feature)"
        );
    }

    #[cfg(not(feature = "xlsx"))]
    #[test]
    fn test_create_sheet_writer_reports_missing_xlsx_writer() {
        let err = create_sheet_writer(EnumSheetFormat::Xlsx, "Sheet1")
            .err()
            .expect("xlsx writer disabled");
        assert_eq!(err.exit_code(), 2);
    }
}
