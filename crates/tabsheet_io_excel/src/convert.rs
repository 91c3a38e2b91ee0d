//! End-to-end conversion: JSON payload file in, single-sheet workbook out.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, info};

use crate::conf::C_SHEET_NAME_DEFAULT;
use crate::spec::{SheetConvertError, SpecPayload, SpecSheetReport};
use crate::util::{ensure_parent_dir, resolve_output_target, validate_payload_limits};
use crate::writer::{SheetWriter, create_sheet_writer, write_payload};

/// Convert the JSON payload at `file_in` into the workbook at `file_out`.
///
/// The output format is resolved from `file_out`'s extension before the input
/// is touched. The workbook is encoded fully in memory first, so a failure at
/// any step leaves neither the output file nor its parent directory behind.
pub fn convert_payload_file(
    file_in: &Path,
    file_out: &Path,
) -> Result<SpecSheetReport, SheetConvertError> {
    let target = resolve_output_target(file_out)?;
    debug!(path = %target.path.display(), format = %target.format, "Resolved output target");

    let mut writer = create_sheet_writer(target.format, C_SHEET_NAME_DEFAULT)?;
    let payload = read_payload_file(file_in)?;
    write_payload_to_file(writer.as_mut(), &payload, &target.path)
}

/// Read and decode a payload file.
pub fn read_payload_file(file_in: &Path) -> Result<SpecPayload, SheetConvertError> {
    let c_text = fs::read_to_string(file_in).map_err(|source| SheetConvertError::ReadInput {
        path: file_in.to_path_buf(),
        source,
    })?;
    let payload = parse_payload_str(&c_text, file_in)?;
    debug!(
        path = %file_in.display(),
        n_headers = payload.headers.len(),
        n_rows = payload.rows.len(),
        "Decoded payload"
    );
    Ok(payload)
}

/// Decode payload text; `file_in` is only used for error context.
pub fn parse_payload_str(text: &str, file_in: &Path) -> Result<SpecPayload, SheetConvertError> {
    let derive_parse_error = |source| SheetConvertError::ParseInput {
        path: file_in.to_path_buf(),
        source,
    };

    let value: Value = serde_json::from_str(text).map_err(derive_parse_error)?;
    if !value.is_object() {
        return Err(SheetConvertError::InvalidPayload {
            path: file_in.to_path_buf(),
            message: format!("expected a JSON object, got {}", describe_json_kind(&value)),
        });
    }
    serde_json::from_value(value).map_err(derive_parse_error)
}

/// Encode `payload` with `writer` and persist it at `path_out`.
pub fn write_payload_to_file(
    writer: &mut dyn SheetWriter,
    payload: &SpecPayload,
    path_out: &Path,
) -> Result<SpecSheetReport, SheetConvertError> {
    validate_payload_limits(payload, writer.format())?;

    let report = write_payload(writer, payload)?;
    let v_bytes = writer.save_to_buffer()?;

    ensure_parent_dir(path_out)?;
    fs::write(path_out, &v_bytes).map_err(|source| SheetConvertError::Persist {
        path: path_out.to_path_buf(),
        source,
    })?;

    info!(
        path = %path_out.display(),
        n_bytes = v_bytes.len(),
        "{report}"
    );
    Ok(report)
}

fn describe_json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(all(test, feature = "xlsx", feature = "xls"))]
mod tests {
    use std::io::Cursor;
    use std::path::PathBuf;

    use calamine::{Data, Reader, Xls, Xlsx};
    use tempfile::TempDir;

    use super::*;
    use crate::spec::EnumSheetFormat;

    const C_PAYLOAD_SAMPLE: &str = r#"{"headers": ["A", "B"], "rows": [[1, "x"], [2, "y"]]}"#;

    fn write_input(dir: &TempDir, text: &str) -> PathBuf {
        let path_in = dir.path().join("in.json");
        fs::write(&path_in, text).expect("write input");
        path_in
    }

    fn read_xlsx(path: &Path) -> calamine::Range<Data> {
        let v_bytes = fs::read(path).expect("read output");
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(v_bytes)).expect("open xlsx");
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        workbook.worksheet_range("Sheet1").expect("Sheet1")
    }

    fn read_xls(path: &Path) -> calamine::Range<Data> {
        let v_bytes = fs::read(path).expect("read output");
        let mut workbook: Xls<_> = Xls::new(Cursor::new(v_bytes)).expect("open xls");
        assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
        workbook.worksheet_range("Sheet1").expect("Sheet1")
    }

    fn assert_sample_layout(range: &calamine::Range<Data>) {
        let s = |v: &str| Data::String(v.to_string());
        assert_eq!(range.get_value((0, 0)), Some(&s("A")));
        assert_eq!(range.get_value((0, 1)), Some(&s("B")));
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((1, 1)), Some(&s("x")));
        assert_eq!(range.get_value((2, 0)), Some(&Data::Float(2.0)));
        assert_eq!(range.get_value((2, 1)), Some(&s("y")));
    }

    #[test]
    fn test_convert_payload_file_writes_xlsx() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, C_PAYLOAD_SAMPLE);
        let path_out = dir.path().join("nested").join("out.xlsx");

        let report = convert_payload_file(&path_in, &path_out).expect("convert");

        assert_eq!(report.format, EnumSheetFormat::Xlsx);
        assert_eq!(report.sheet_name, "Sheet1");
        assert_eq!(report.cnt_rows, 3);
        assert_sample_layout(&read_xlsx(&path_out));
    }

    #[test]
    fn test_convert_payload_file_writes_xls() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, C_PAYLOAD_SAMPLE);
        let path_out = dir.path().join("out.XLS");

        let report = convert_payload_file(&path_in, &path_out).expect("convert");

        assert_eq!(report.format, EnumSheetFormat::Xls);
        assert_sample_layout(&read_xls(&path_out));
    }

    #[test]
    fn test_convert_payload_file_rejects_csv_without_side_effects() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, C_PAYLOAD_SAMPLE);
        let path_out = dir.path().join("sub").join("out.csv");

        let err = convert_payload_file(&path_in, &path_out).expect_err("csv");

        assert_eq!(err.exit_code(), 2);
        assert!(!path_out.exists());
        assert!(!dir.path().join("sub").exists());
    }

    #[test]
    fn test_convert_payload_file_checks_extension_before_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = convert_payload_file(&dir.path().join("missing.json"), Path::new("out.txt"))
            .expect_err("unsupported");
        assert!(matches!(err, SheetConvertError::UnsupportedExtension(_)));
    }

    #[test]
    fn test_convert_payload_file_empty_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, "{}");

        for c_name in ["empty.xlsx", "empty.xls"] {
            let path_out = dir.path().join(c_name);
            let report = convert_payload_file(&path_in, &path_out).expect("convert");
            assert_eq!(report.cnt_rows, 0);
            assert_eq!(report.cnt_cells, 0);
            assert!(path_out.is_file());
        }
        assert!(read_xlsx(&dir.path().join("empty.xlsx")).is_empty());
        assert!(read_xls(&dir.path().join("empty.xls")).is_empty());
    }

    #[test]
    fn test_convert_payload_file_missing_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_out = dir.path().join("out.xlsx");

        let err =
            convert_payload_file(&dir.path().join("nope.json"), &path_out).expect_err("missing");

        assert!(matches!(err, SheetConvertError::ReadInput { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(!path_out.exists());
    }

    #[test]
    fn test_convert_payload_file_malformed_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, r#"{"headers": ["A""#);
        let path_out = dir.path().join("out.xlsx");

        let err = convert_payload_file(&path_in, &path_out).expect_err("bad json");

        assert!(matches!(err, SheetConvertError::ParseInput { .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(!path_out.exists());
    }

    #[test]
    fn test_parse_payload_str_rejects_non_object() {
        let err = parse_payload_str("[1, 2]", Path::new("in.json")).expect_err("array");
        assert_eq!(
            err.to_string(),
            "invalid payload in in.json: expected a JSON object, got an array"
        );

        let err = parse_payload_str(r#"{"rows": "x"}"#, Path::new("in.json"))
            .expect_err("wrong-typed rows");
        assert!(matches!(err, SheetConvertError::ParseInput { .. }));
    }

    #[test]
    fn test_parse_payload_str_ignores_unknown_keys() {
        let payload =
            parse_payload_str(r#"{"headers": ["A"], "meta": {"v": 1}}"#, Path::new("in.json"))
                .expect("payload");
        assert_eq!(payload.headers, vec!["A".to_string()]);
        assert!(payload.rows.is_empty());
    }

    #[test]
    fn test_convert_payload_file_overwrites_existing_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_out = dir.path().join("out.xlsx");
        fs::write(&path_out, b"stale").expect("seed output");

        let path_in = write_input(&dir, r#"{"headers": ["First"]}"#);
        convert_payload_file(&path_in, &path_out).expect("first run");
        let path_in = write_input(&dir, r#"{"headers": ["Second"]}"#);
        convert_payload_file(&path_in, &path_out).expect("second run");

        let range = read_xlsx(&path_out);
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("Second".to_string()))
        );
    }

    #[test]
    fn test_convert_payload_file_reports_misaligned_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path_in = write_input(&dir, r#"{"headers": ["A", "B"], "rows": [[1], [1, 2, 3]]}"#);
        let path_out = dir.path().join("out.xlsx");

        let report = convert_payload_file(&path_in, &path_out).expect("convert");

        assert_eq!(report.warnings.len(), 1);
        let range = read_xlsx(&path_out);
        assert_eq!(range.get_value((2, 2)), Some(&Data::Float(3.0)));
    }

    #[test]
    fn test_convert_payload_file_limit_error_leaves_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let l_cells = vec!["1"; 300].join(", ");
        let path_in = write_input(&dir, &format!(r#"{{"rows": [[{l_cells}]]}}"#));
        let path_out = dir.path().join("wide").join("out.xls");

        let err = convert_payload_file(&path_in, &path_out).expect_err("too wide");

        assert!(matches!(err, SheetConvertError::ExceedsLimits { .. }));
        assert!(!dir.path().join("wide").exists());

        let path_out = dir.path().join("wide.xlsx");
        convert_payload_file(&path_in, &path_out).expect("fits xlsx");
    }

    #[test]
    fn test_convert_payload_file_large_xls_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let l_rows: Vec<Value> = (0..1_500)
            .map(|idx| serde_json::json!([idx, format!("name-{idx:05}"), idx % 2 == 0]))
            .collect();
        let payload = serde_json::json!({"headers": ["id", "name", "even"], "rows": l_rows});
        let path_in = write_input(&dir, &payload.to_string());
        let path_out = dir.path().join("large.xls");

        let report = convert_payload_file(&path_in, &path_out).expect("convert");
        assert_eq!(report.cnt_rows, 1_501);

        let range = read_xls(&path_out);
        assert_eq!(range.height(), 1_501);
        assert_eq!(range.get_value((0, 1)), Some(&Data::String("name".to_string())));
        for n_idx in [0u32, 59, 60, 80, 999, 1_499] {
            let n_row = n_idx + 1;
            assert_eq!(range.get_value((n_row, 0)), Some(&Data::Float(f64::from(n_idx))));
            assert_eq!(
                range.get_value((n_row, 1)),
                Some(&Data::String(format!("name-{n_idx:05}")))
            );
            assert_eq!(range.get_value((n_row, 2)), Some(&Data::Bool(n_idx % 2 == 0)));
        }
    }
}
