//! `tabsheet` CLI: convert a JSON `{headers, rows}` payload into a
//! single-sheet `.xlsx` or `.xls` workbook.
//!
//! Exit codes: `0` success, `1` usage or uncategorized failure, `2`
//! unsupported output extension or writer not compiled in.
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, error::ErrorKind as ClapErrorKind};
use tabsheet_io_excel::{
    N_EXIT_CODE_FAILURE, N_EXIT_CODE_USAGE, SheetConvertError, SpecSheetReport,
    convert_payload_file,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const C_LOG_FILTER_DEFAULT: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "tabsheet",
    version,
    about = "Convert a JSON {headers, rows} payload into an Excel workbook",
    long_about = "Convert a JSON {headers, rows} payload into a single-sheet Excel workbook.\n\n\
                  The output format follows the output extension: .xlsx or .xls \
                  (case-insensitive). The sheet is named Sheet1; headers fill row 1 and \
                  each entry of rows fills the next row."
)]
struct Cli {
    /// JSON payload file: {"headers": [...], "rows": [[...], ...]}
    #[arg(allow_hyphen_values = true)]
    input_json_path: PathBuf,

    /// Output workbook path (.xlsx or .xls)
    #[arg(allow_hyphen_values = true)]
    output_path: PathBuf,

    /// Extra trailing arguments are accepted and ignored.
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    extra: Vec<OsString>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let if_info = matches!(
                err.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            );
            // Help/version go to stdout, usage errors to stderr.
            let _ = err.print();
            return if if_info {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(N_EXIT_CODE_USAGE)
            };
        }
    };

    init_tracing();

    match run(&cli) {
        Ok(report) => {
            debug!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = writeln!(io::stderr(), "error: {err}");
            ExitCode::from(derive_exit_code(&err))
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| C_LOG_FILTER_DEFAULT.into()),
        )
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<SpecSheetReport> {
    if !cli.extra.is_empty() {
        warn!(n_extra = cli.extra.len(), "Ignoring extra arguments: {:?}", cli.extra);
    }
    let report = convert_payload_file(&cli.input_json_path, &cli.output_path)?;
    for c_warning in &report.warnings {
        debug!(warning = c_warning.as_str(), "Conversion warning");
    }
    Ok(report)
}

fn derive_exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<SheetConvertError>()
        .map_or(N_EXIT_CODE_FAILURE, SheetConvertError::exit_code)
}
