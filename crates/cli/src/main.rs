// bomdiff CLI - headless BOM reconciliation

mod exit_codes;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use bomdiff_core::{BomDocument, ColumnProfile};
use bomdiff_export::{export_audit, export_pair, export_single, output_file_name};
use bomdiff_ingest::ingest_path;
use bomdiff_recon::{
    clean, comparison_stats, reconcile, wire_differences, ComparisonStats, WireReport,
};

use exit_codes::{EXIT_DIFFS, EXIT_EXPORT, EXIT_INGEST, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "bomdiff")]
#[command(about = "Compare bill-of-materials tables and export styled workbooks")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile two BOM documents and write a comparison workbook
    #[command(after_help = "\
Exit code 1 indicates differences: not-found, cross-matched or \
quantity-mismatch rows on either side.

Examples:
  bomdiff compare left.html right.xlsx
  bomdiff compare left.csv right.csv -o result.xlsx
  bomdiff compare left.csv right.csv --json --no-workbook
  bomdiff compare left.csv right.csv --profile columns.toml")]
    Compare {
        /// Left document (HTML, XLSX, XLS or CSV)
        left: PathBuf,

        /// Right document (HTML, XLSX, XLS or CSV)
        right: PathBuf,

        /// Output workbook path (default: derived from the input names)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Emit a machine-readable summary on stdout
        #[arg(long)]
        json: bool,

        /// Column profile TOML (built-in defaults if omitted)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,

        /// Reconcile and report only, write no workbook
        #[arg(long)]
        no_workbook: bool,
    },

    /// Rewrite one document as a clean single-table workbook
    #[command(after_help = "\
Examples:
  bomdiff convert bom.html
  bomdiff convert bom.xls -o bom.xlsx
  bomdiff convert bom.csv --raw")]
    Convert {
        /// Input document (HTML, XLSX, XLS or CSV)
        input: PathBuf,

        /// Output workbook path (default: derived from the input name)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Append the raw-table audit sheet (merged-away rows highlighted)
        #[arg(long)]
        raw: bool,

        /// Emit a machine-readable report on stdout
        #[arg(long)]
        json: bool,

        /// Column profile TOML (built-in defaults if omitted)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },

    /// Report a document's shape without writing anything
    #[command(after_help = "\
Examples:
  bomdiff inspect bom.html
  bomdiff inspect bom.xlsx --raw
  bomdiff inspect bom.csv --json")]
    Inspect {
        /// Input document (HTML, XLSX, XLS or CSV)
        input: PathBuf,

        /// Report the raw table instead of the cleaned one
        #[arg(long)]
        raw: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,

        /// Column profile TOML (built-in defaults if omitted)
        #[arg(long, value_name = "FILE")]
        profile: Option<PathBuf>,
    },
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default())
        .format_timestamp_millis()
        .try_init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            left,
            right,
            output,
            json,
            profile,
            no_workbook,
        } => cmd_compare(&left, &right, output, json, profile.as_deref(), no_workbook),
        Commands::Convert {
            input,
            output,
            raw,
            json,
            profile,
        } => cmd_convert(&input, output, raw, json, profile.as_deref()),
        Commands::Inspect {
            input,
            raw,
            json,
            profile,
        } => cmd_inspect(&input, raw, json, profile.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
struct CliError {
    code: u8,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    fn ingest(msg: impl Into<String>) -> Self {
        Self { code: EXIT_INGEST, message: msg.into(), hint: None }
    }

    fn export(msg: impl Into<String>) -> Self {
        Self { code: EXIT_EXPORT, message: msg.into(), hint: None }
    }

    /// Differences found: an exit status, not a printed error.
    fn diffs() -> Self {
        Self { code: EXIT_DIFFS, message: String::new(), hint: None }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

fn load_profile(path: Option<&Path>) -> Result<ColumnProfile, CliError> {
    let Some(path) = path else {
        return Ok(ColumnProfile::default());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| CliError::usage(format!("{}: {}", path.display(), e)))?;
    let profile = ColumnProfile::from_toml(&content).map_err(|e| {
        CliError::usage(format!("{}: {}", path.display(), e)).with_hint(
            "profile keys: part_number, supplier_part_number, customer_part_number, \
             quantity, kind, compare_tag, header_keywords, wire_types",
        )
    })?;
    log::debug!("loaded column profile from {}", path.display());
    Ok(profile)
}

fn ingest_checked(path: &Path, profile: &ColumnProfile) -> Result<BomDocument, CliError> {
    let doc = ingest_path(path, profile);
    if doc.is_error() {
        return Err(CliError::ingest(format!("{}: {}", doc.name, doc.error)));
    }
    Ok(doc)
}

/// Rows that keep `compare` from exiting 0.
fn difference_count(stats: &ComparisonStats) -> usize {
    stats.not_found + stats.cross_matched + stats.quantity_mismatch
}

fn print_json<T: Serialize>(value: &T) {
    if let Ok(text) = serde_json::to_string_pretty(value) {
        println!("{}", text);
    }
}

// ============================================================================
// compare
// ============================================================================

#[derive(Serialize)]
struct CompareSummary<'a> {
    left: SideSummary<'a>,
    right: SideSummary<'a>,
    wires: &'a WireReport,
    differences: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
}

#[derive(Serialize)]
struct SideSummary<'a> {
    name: &'a str,
    stats: ComparisonStats,
}

fn cmd_compare(
    left: &Path,
    right: &Path,
    output: Option<PathBuf>,
    json: bool,
    profile: Option<&Path>,
    no_workbook: bool,
) -> Result<(), CliError> {
    let profile = load_profile(profile)?;
    let left = ingest_checked(left, &profile)?;
    let right = ingest_checked(right, &profile)?;

    let left = clean(&left, &profile);
    let right = clean(&right, &profile);
    let (left, right) = reconcile(&left, &right, &profile);

    let left_stats = comparison_stats(&left.cleaned);
    let right_stats = comparison_stats(&right.cleaned);
    let wires = wire_differences(&left, &right, &profile);
    let differences = difference_count(&left_stats) + difference_count(&right_stats);

    let output_path = if no_workbook {
        None
    } else {
        let path = output
            .unwrap_or_else(|| PathBuf::from(output_file_name(&[&left.name, &right.name])));
        let bytes =
            export_pair(&left, &right, &profile).map_err(|e| CliError::export(e.to_string()))?;
        std::fs::write(&path, bytes)
            .map_err(|e| CliError::export(format!("{}: {}", path.display(), e)))?;
        Some(path)
    };

    if json {
        print_json(&CompareSummary {
            left: SideSummary { name: &left.name, stats: left_stats },
            right: SideSummary { name: &right.name, stats: right_stats },
            wires: &wires,
            differences,
            output: output_path.as_ref().map(|p| p.display().to_string()),
        });
    } else {
        print_side(&left.name, &left_stats);
        print_side(&right.name, &right_stats);
        if !wires.left.is_empty() || !wires.right.is_empty() {
            eprintln!(
                "wire parts: {} left, {} right",
                wires.left.len(),
                wires.right.len()
            );
        }
        if let Some(path) = &output_path {
            eprintln!("wrote {}", path.display());
        }
    }

    if differences > 0 {
        return Err(CliError::diffs());
    }
    Ok(())
}

fn print_side(name: &str, stats: &ComparisonStats) {
    eprintln!(
        "{}: {} rows | {} not found, {} quantity mismatch, {} cross matched, {} quantity match",
        name,
        stats.total,
        stats.not_found,
        stats.quantity_mismatch,
        stats.cross_matched,
        stats.quantity_match
    );
}

// ============================================================================
// convert
// ============================================================================

#[derive(Serialize)]
struct ConvertReport<'a> {
    name: &'a str,
    rows: usize,
    raw_rows: usize,
    output: String,
}

fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    raw: bool,
    json: bool,
    profile: Option<&Path>,
) -> Result<(), CliError> {
    let profile = load_profile(profile)?;
    let doc = ingest_checked(input, &profile)?;
    let doc = clean(&doc, &profile);

    let rendered = if raw { export_audit(&doc) } else { export_single(&doc) };
    let bytes = rendered.map_err(|e| CliError::export(e.to_string()))?;
    let path = output.unwrap_or_else(|| PathBuf::from(output_file_name(&[&doc.name])));
    std::fs::write(&path, bytes)
        .map_err(|e| CliError::export(format!("{}: {}", path.display(), e)))?;

    if json {
        print_json(&ConvertReport {
            name: &doc.name,
            rows: doc.cleaned.rows.len(),
            raw_rows: doc.raw.rows.len(),
            output: path.display().to_string(),
        });
    } else {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

#[derive(Serialize)]
struct InspectReport<'a> {
    name: &'a str,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    view: &'static str,
    headers: &'a [String],
    rows: usize,
    merged_away: usize,
}

fn cmd_inspect(
    input: &Path,
    raw: bool,
    json: bool,
    profile: Option<&Path>,
) -> Result<(), CliError> {
    let profile = load_profile(profile)?;
    let doc = ingest_path(input, &profile);
    let doc = clean(&doc, &profile);

    let table = if raw { &doc.raw } else { &doc.cleaned };
    let report = InspectReport {
        name: &doc.name,
        status: if doc.is_error() { "error" } else { "success" },
        error: if doc.error.is_empty() { None } else { Some(&doc.error) },
        view: if raw { "raw" } else { "cleaned" },
        headers: &table.headers,
        rows: table.rows.len(),
        merged_away: doc.raw.rows.iter().filter(|r| r.merged_away).count(),
    };

    if json {
        print_json(&report);
    } else {
        println!("name:    {}", report.name);
        println!("status:  {}", report.status);
        if let Some(error) = report.error {
            println!("error:   {}", error);
        }
        println!("columns: {}", report.headers.join(", "));
        println!(
            "rows:    {} ({} raw, {} merged away)",
            report.rows,
            doc.raw.rows.len(),
            report.merged_away
        );
    }

    // The report itself is the product; the exit code still flags bad input.
    if doc.is_error() {
        return Err(CliError { code: EXIT_INGEST, message: String::new(), hint: None });
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn difference_count_ignores_matches() {
        let stats = ComparisonStats {
            not_found: 2,
            cross_matched: 1,
            quantity_mismatch: 3,
            quantity_match: 10,
            total: 16,
        };
        assert_eq!(difference_count(&stats), 6);
    }

    #[test]
    fn missing_profile_flag_uses_defaults() {
        let profile = load_profile(None).unwrap();
        assert_eq!(profile.part_number, "零件号");
    }

    #[test]
    fn profile_load_maps_to_usage_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"part_number = 3").unwrap();
        let err = load_profile(Some(file.path())).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
        assert!(err.hint.is_some());
    }

    #[test]
    fn unreadable_profile_path_is_a_usage_error() {
        let err = load_profile(Some(Path::new("/nonexistent/p.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }
}
