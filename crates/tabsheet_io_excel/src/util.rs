//! Stateless helpers used by the conversion pipeline.

use std::fs;
use std::path::Path;

use crate::conf::{
    N_LEN_EXCEL_CELL_TEXT_MAX, N_NCOLS_BIFF8_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_BIFF8_MAX,
    N_NROWS_EXCEL_MAX,
};
use crate::spec::{
    EnumCellValue, EnumSheetFormat, SheetConvertError, SpecOutputTarget, SpecPayload,
};

////////////////////////////////////////////////////////////////////////////////
// #region TargetResolution

/// Resolve the output format from the path's extension (case-insensitive).
pub fn resolve_output_target(path: &Path) -> Result<SpecOutputTarget, SheetConvertError> {
    let c_ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    EnumSheetFormat::ALL
        .into_iter()
        .find(|format| format.extension() == c_ext)
        .map(|format| SpecOutputTarget {
            path: path.to_path_buf(),
            format,
        })
        .ok_or_else(|| {
            SheetConvertError::UnsupportedExtension(if c_ext.is_empty() {
                String::new()
            } else {
                format!(".{c_ext}")
            })
        })
}

/// Create the parent directory tree of `path` when missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), SheetConvertError> {
    let Some(path_dir) = path.parent() else {
        return Ok(());
    };
    if path_dir.as_os_str().is_empty() || path_dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(path_dir).map_err(|source| SheetConvertError::CreateOutputDir {
        path: path_dir.to_path_buf(),
        source,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region LimitValidation

/// `(max_rows, max_cols)` of one worksheet in `format`.
pub fn derive_grid_limits(format: EnumSheetFormat) -> (usize, usize) {
    match format {
        EnumSheetFormat::Xlsx => (N_NROWS_EXCEL_MAX, N_NCOLS_EXCEL_MAX),
        EnumSheetFormat::Xls => (N_NROWS_BIFF8_MAX, N_NCOLS_BIFF8_MAX),
    }
}

/// Check that the payload fits into a single sheet of `format`.
pub fn validate_payload_limits(
    payload: &SpecPayload,
    format: EnumSheetFormat,
) -> Result<(), SheetConvertError> {
    let (n_rows_max, n_cols_max) = derive_grid_limits(format);

    let n_height = payload.height();
    if n_height > n_rows_max {
        return Err(SheetConvertError::ExceedsLimits {
            format,
            message: format!("{n_height} rows (header included) > {n_rows_max}"),
        });
    }

    let n_width = payload.width();
    if n_width > n_cols_max {
        return Err(SheetConvertError::ExceedsLimits {
            format,
            message: format!("{n_width} columns > {n_cols_max}"),
        });
    }

    let l_texts = payload.headers.iter().map(String::as_str).chain(
        payload.rows.iter().flatten().filter_map(|value| match value {
            EnumCellValue::String(s) => Some(s.as_str()),
            _ => None,
        }),
    );
    for c_text in l_texts {
        let n_len = c_text.chars().count();
        if n_len > N_LEN_EXCEL_CELL_TEXT_MAX {
            return Err(SheetConvertError::ExceedsLimits {
                format,
                message: format!(
                    "text cell of {n_len} characters > {N_LEN_EXCEL_CELL_TEXT_MAX}"
                ),
            });
        }
    }

    Ok(())
}

/// Zero-based indices of data rows whose length differs from the header width.
///
/// Returns nothing when there are no headers to compare against.
pub fn derive_misaligned_row_indices(payload: &SpecPayload) -> Vec<usize> {
    let n_width_header = payload.headers.len();
    if n_width_header == 0 {
        return vec![];
    }
    payload
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row.len() != n_width_header)
        .map(|(idx, _)| idx)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region IndexCasting

/// Narrow a sheet row index.
pub fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

/// Narrow a sheet column index.
pub fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
