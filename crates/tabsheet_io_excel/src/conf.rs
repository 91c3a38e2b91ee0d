//! Converter constants: sheet naming, per-format grid limits, exit codes.

/// Name of the single worksheet written by the converter.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Excel worksheet maximum row count (`.xlsx`).
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count (`.xlsx`).
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// BIFF8 worksheet maximum row count (`.xls`).
pub const N_NROWS_BIFF8_MAX: usize = 65_536;
/// BIFF8 worksheet maximum column count (`.xls`).
pub const N_NCOLS_BIFF8_MAX: usize = 256;
/// Maximum number of characters in one text cell (both formats).
pub const N_LEN_EXCEL_CELL_TEXT_MAX: usize = 32_767;

/// Process exit status for usage errors.
pub const N_EXIT_CODE_USAGE: u8 = 1;
/// Process exit status for uncategorized failures (input, I/O, limits).
pub const N_EXIT_CODE_FAILURE: u8 = 1;
/// Process exit status for unsupported extensions and missing writers.
pub const N_EXIT_CODE_UNSUPPORTED: u8 = 2;
