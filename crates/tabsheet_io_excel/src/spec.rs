//! Payload, target, report and error models shared by the writers.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

use crate::conf::{N_EXIT_CODE_FAILURE, N_EXIT_CODE_UNSUPPORTED};

////////////////////////////////////////////////////////////////////////////////
// #region SheetFormat

/// Closed set of output formats, selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumSheetFormat {
    /// Office Open XML workbook (`.xlsx`).
    Xlsx,
    /// Excel 97-2003 BIFF8 workbook (`.xls`).
    Xls,
}

impl EnumSheetFormat {
    /// All supported formats, in resolution order.
    pub const ALL: [EnumSheetFormat; 2] = [EnumSheetFormat::Xlsx, EnumSheetFormat::Xls];

    /// Lower-case extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }

    /// Cargo feature that compiles the writer for this format in.
    pub fn feature_name(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Xls => "xls",
        }
    }
}

impl fmt::Display for EnumSheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output path plus the format resolved from its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecOutputTarget {
    /// Output file path, as given.
    pub path: PathBuf,
    /// Resolved output format.
    pub format: EnumSheetFormat,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValue

/// One decoded payload cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// JSON `null`.
    Blank,
    /// JSON boolean.
    Boolean(bool),
    /// JSON number.
    Number(f64),
    /// JSON string, or compact JSON text of a nested value.
    String(String),
}

impl From<&Value> for EnumCellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Blank,
            Value::Bool(b) => Self::Boolean(*b),
            Value::Number(n) => match n.as_f64() {
                Some(x) => Self::Number(x),
                None => Self::String(n.to_string()),
            },
            Value::String(s) => Self::String(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::String(value.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for EnumCellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from(&value))
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Payload

/// Decoded input document: header row plus data rows.
///
/// Row lengths are not checked against `headers`; short or long rows are
/// written cell by cell at their own positions.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SpecPayload {
    /// Column headers for row 0.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Data rows, written from row 1 onward.
    #[serde(default)]
    pub rows: Vec<Vec<EnumCellValue>>,
}

impl SpecPayload {
    /// Number of sheet rows the payload occupies, header row included.
    pub fn height(&self) -> usize {
        if self.headers.is_empty() && self.rows.is_empty() {
            0
        } else {
            1 + self.rows.len()
        }
    }

    /// Widest row of the payload, header row included.
    pub fn width(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-conversion report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetReport {
    /// Written sheet name.
    pub sheet_name: String,
    /// Written format.
    pub format: EnumSheetFormat,
    /// Sheet rows written, header row included.
    pub cnt_rows: usize,
    /// Non-blank cells written.
    pub cnt_cells: usize,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecSheetReport {
    /// Create an empty report for one sheet.
    pub fn new(sheet_name: &str, format: EnumSheetFormat) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            format,
            cnt_rows: 0,
            cnt_cells: 0,
            warnings: Vec::new(),
        }
    }

    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

impl fmt::Display for SpecSheetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] sheet={} rows={} cells={} warnings={}",
            self.format,
            self.sheet_name,
            self.cnt_rows,
            self.cnt_cells,
            self.warnings.len()
        )
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Conversion failures, one variant per reported category.
#[derive(Debug, Error)]
pub enum SheetConvertError {
    /// Output extension is not one of the supported formats.
    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),

    /// Writer for the resolved format was not compiled in.
    #[error("dependency missing: {format} writer not built (enable the `{feature}` feature)")]
    WriterUnavailable {
        /// Requested format.
        format: EnumSheetFormat,
        /// Cargo feature that would provide it.
        feature: &'static str,
    },

    /// Input file could not be read.
    #[error("failed to read input {}: {source}", .path.display())]
    ReadInput {
        /// Input path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Input file is not valid JSON or has wrong-typed keys.
    #[error("failed to parse input {}: {source}", .path.display())]
    ParseInput {
        /// Input path.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// Input JSON is well-formed but not a payload object.
    #[error("invalid payload in {}: {message}", .path.display())]
    InvalidPayload {
        /// Input path.
        path: PathBuf,
        /// Reason.
        message: String,
    },

    /// Payload does not fit in one sheet of the target format.
    #[error("payload exceeds {format} limits: {message}")]
    ExceedsLimits {
        /// Target format.
        format: EnumSheetFormat,
        /// Offending dimension.
        message: String,
    },

    /// Output parent directory could not be created.
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Writer failed while encoding the workbook.
    #[error("{format} write error: {message}")]
    Write {
        /// Target format.
        format: EnumSheetFormat,
        /// Writer error text.
        message: String,
    },

    /// Encoded workbook could not be written to the output path.
    #[error("failed to write output {}: {source}", .path.display())]
    Persist {
        /// Output path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl SheetConvertError {
    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::UnsupportedExtension(_) | Self::WriterUnavailable { .. } => {
                N_EXIT_CODE_UNSUPPORTED
            }
            Self::ReadInput { .. }
            | Self::ParseInput { .. }
            | Self::InvalidPayload { .. }
            | Self::ExceedsLimits { .. }
            | Self::CreateOutputDir { .. }
            | Self::Write { .. }
            | Self::Persist { .. } => N_EXIT_CODE_FAILURE,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
