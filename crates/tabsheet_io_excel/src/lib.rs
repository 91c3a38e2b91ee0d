//! `tabsheet_io_excel` v1:
//! JSON table payload to single-sheet Excel workbook kernel.
//!
//! Architecture:
//! - `conf`    : constants (sheet name, grid limits, exit codes)
//! - `spec`    : payload/target/report models and errors
//! - `util`    : pure helper functions (target resolution, limit checks)
//! - `writer`  : `SheetWriter` strategy seam and the table write
//! - `convert` : file-to-file conversion pipeline
//! - `xlsx`    : `.xlsx` writer (feature `xlsx`)
//! - `biff`    : BIFF8 record encoders (feature `xls`)
//! - `xls`     : `.xls` writer (feature `xls`)
pub mod conf;
pub mod convert;
pub mod spec;
pub mod util;
pub mod writer;

#[cfg(feature = "xls")]
pub mod biff;
#[cfg(feature = "xls")]
pub mod xls;
#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use conf::{
    C_SHEET_NAME_DEFAULT, N_EXIT_CODE_FAILURE, N_EXIT_CODE_UNSUPPORTED, N_EXIT_CODE_USAGE,
    N_LEN_EXCEL_CELL_TEXT_MAX, N_NCOLS_BIFF8_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_BIFF8_MAX,
    N_NROWS_EXCEL_MAX,
};
pub use convert::{
    convert_payload_file, parse_payload_str, read_payload_file, write_payload_to_file,
};
pub use spec::{
    EnumCellValue, EnumSheetFormat, SheetConvertError, SpecOutputTarget, SpecPayload,
    SpecSheetReport,
};
pub use util::{
    derive_grid_limits, derive_misaligned_row_indices, ensure_parent_dir, resolve_output_target,
    validate_payload_limits,
};
pub use writer::{SheetWriter, create_sheet_writer, is_writer_available, write_payload};
#[cfg(feature = "xls")]
pub use xls::XlsSheetWriter;
#[cfg(feature = "xlsx")]
pub use xlsx::XlsxSheetWriter;
