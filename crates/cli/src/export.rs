//! CSV export of the audit trail.
//!
//! Format: header `turn,phase,actor,message`, one row per record. Fields
//! containing the delimiter, a quote, or a newline are quoted with embedded
//! quotes doubled.

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use redblue_core::LogRecord;

/// Timestamped default export path in the working directory.
pub fn default_log_path() -> PathBuf {
    PathBuf::from(format!(
        "redblue_log_{}.csv",
        Local::now().format("%Y%m%d%H%M%S")
    ))
}

/// Write the full record sequence to `path`.
pub fn write_csv(records: &[LogRecord], path: &Path) -> Result<()> {
    let mut out = String::from("turn,phase,actor,message\n");
    for record in records {
        out.push_str(&record.turn.to_string());
        out.push(',');
        out.push_str(&escape(&record.phase.to_string()));
        out.push(',');
        out.push_str(&escape(&record.actor.to_string()));
        out.push(',');
        out.push_str(&escape(&record.message));
        out.push('\n');
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
