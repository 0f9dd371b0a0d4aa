//! Output formatting for CLI results.
//!
//! Two modes:
//! - Human: readable listings, `(error) msg` on failure
//! - Json: one pretty-printed JSON document per command

use std::collections::BTreeMap;

use serde_json::{json, Value};
use sheaf_archive::ComposedArchive;
use sheaf_core::{FileInfo, NodeId, Snapshot};

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

/// Results produced by CLI commands.
#[derive(Debug)]
pub enum Output {
    Log(Vec<Snapshot>),
    Files(Vec<String>),
    Info(FileInfo),
    Branches(BTreeMap<String, NodeId>),
    /// An archive written to a file
    Archive {
        archive: ComposedArchive,
        destination: String,
    },
}

/// Format a command result according to the output mode.
pub fn format_output(output: &Output, mode: OutputMode) -> String {
    match mode {
        OutputMode::Human => format_human(output),
        OutputMode::Json => format_json(output),
    }
}

/// Format an error according to the output mode.
pub fn format_error(err: &str, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "error": err }).to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

// =========================================================================
// JSON mode
// =========================================================================

fn snapshot_value(snapshot: &Snapshot) -> Value {
    json!({
        "rev": snapshot.rev,
        "node": snapshot.id,
        "parents": snapshot.parents,
        "branch": snapshot.branch,
        "author": snapshot.author,
        "date": snapshot.date.to_rfc3339(),
        "message": snapshot.message,
    })
}

fn to_value(output: &Output) -> Value {
    match output {
        Output::Log(snapshots) => Value::Array(snapshots.iter().map(snapshot_value).collect()),
        Output::Files(files) => json!(files),
        Output::Info(info) => json!(info),
        Output::Branches(branches) => json!(branches),
        Output::Archive {
            archive,
            destination,
        } => {
            let headers: BTreeMap<&str, String> = archive.headers().into_iter().collect();
            json!({
                "root": archive.root,
                "format": archive.format.as_str(),
                "file_name": archive.file_name,
                "destination": destination,
                "bytes": archive.len(),
                "checksum": archive.checksum,
                "headers": headers,
                "report": archive.report,
            })
        }
    }
}

fn format_json(output: &Output) -> String {
    serde_json::to_string_pretty(&to_value(output))
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// =========================================================================
// Human mode
// =========================================================================

fn format_human(output: &Output) -> String {
    match output {
        Output::Log(snapshots) => {
            if snapshots.is_empty() {
                return "(empty history)".to_string();
            }
            snapshots
                .iter()
                .map(|s| {
                    format!(
                        "{}:{} [{}] {} {}\n  {}",
                        s.rev,
                        s.short_id(),
                        s.branch,
                        s.date.format("%Y-%m-%d %H:%M:%S %z"),
                        s.author,
                        s.summary()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Output::Files(files) => {
            if files.is_empty() {
                "(empty manifest)".to_string()
            } else {
                files.join("\n")
            }
        }
        Output::Info(info) => format!(
            "path:   {}\nmode:   {}\nsize:   {}\nnode:   {}\nauthor: {}\ndate:   {}\n  {}",
            info.path,
            info.mode.permission_string(),
            info.size,
            info.node.short(),
            info.author,
            info.date.format("%Y-%m-%d %H:%M:%S %z"),
            info.description.lines().next().unwrap_or("")
        ),
        Output::Branches(branches) => branches
            .iter()
            .map(|(name, node)| format!("{:<24} {}", name, node.short()))
            .collect::<Vec<_>>()
            .join("\n"),
        Output::Archive {
            archive,
            destination,
        } => {
            let mut lines = vec![format!(
                "{} ({} bytes, xxh3 {}) -> {}",
                archive.file_name,
                archive.len(),
                archive.checksum,
                destination
            )];
            for sub in &archive.report.included {
                lines.push(format!("  included {} @ {}", sub.path, sub.node.short()));
            }
            for sub in &archive.report.skipped {
                lines.push(format!(
                    "  skipped  {} ({}): {}",
                    sub.path, sub.location, sub.reason
                ));
            }
            for diagnostic in archive.report.diagnostics.warnings() {
                lines.push(format!(
                    "  warning  {}: {}",
                    diagnostic.subject, diagnostic.message
                ));
            }
            lines.join("\n")
        }
    }
}
