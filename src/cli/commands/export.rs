//! `securevault export`: decrypt every record and write it out.
//!
//! Supported formats:
//! - `json` (default): array of records with id and timestamps
//! - `csv`: `website,username,password,notes` for password entries only

use std::fs;
use std::path::Path;

use crate::cli::output;
use crate::cli::{load_context, open_vault, Cli};
use crate::errors::{Result, VaultError};
use crate::record::PlaintextRecord;
use crate::vault::{ExportedRecord, VAULT_FILE};

/// Execute the `export` command.
pub fn execute(cli: &Cli, format: &str, output_path: Option<&str>) -> Result<()> {
    let (dir, _) = load_context(cli)?;
    let store = open_vault(&dir)?;

    // Any record that fails to decrypt aborts the export.
    let records = store.export_records()?;

    let content = match format {
        "json" => format_as_json(&records)?,
        "csv" => format_as_csv(&records),
        other => {
            return Err(VaultError::CommandFailed(format!(
                "unknown export format '{other}'; use 'json' or 'csv'"
            )));
        }
    };

    match output_path {
        Some(dest) => {
            let dest_path = Path::new(dest);

            // Refuse to clobber the vault's own files.
            let clobbers_vault = dest_path.parent().is_some_and(|p| {
                fs::canonicalize(p).ok() == fs::canonicalize(&dir).ok()
            }) && dest_path
                .file_name()
                .is_some_and(|n| n == VAULT_FILE);
            if clobbers_vault {
                return Err(VaultError::CommandFailed(
                    "refusing to export over the vault file".into(),
                ));
            }

            fs::write(dest_path, &content).map_err(|e| {
                VaultError::CommandFailed(format!("failed to write export file: {e}"))
            })?;

            output::success(&format!(
                "Exported {} record(s) to {dest} (format: {format})",
                records.len()
            ));
            output::warning("The export file contains plaintext passwords.");
        }
        None => {
            // Raw output only, so it can be piped.
            print!("{content}");
        }
    }

    Ok(())
}

/// Format records as a pretty JSON array.
fn format_as_json(records: &[ExportedRecord]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(records)
        .map_err(|e| VaultError::SerializationError(format!("JSON export: {e}")))?;
    json.push('\n');
    Ok(json)
}

/// Format password entries as CSV with a header row.
fn format_as_csv(records: &[ExportedRecord]) -> String {
    use std::fmt::Write;
    let mut out = String::from("website,username,password,notes\n");
    for exported in records {
        if let PlaintextRecord::Password(entry) = &exported.record {
            let _ = writeln!(
                out,
                "{},{},{},{}",
                csv_field(&entry.website),
                csv_field(&entry.username),
                csv_field(&entry.password),
                csv_field(entry.notes.as_deref().unwrap_or_default())
            );
        }
    }
    out
}

/// Quote a field if it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
