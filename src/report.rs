// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification report rendering.
//!
//! Reports are a pure function of the [`VerificationResult`]: no clock, no
//! disk and no network access. Timestamps render in UTC so identical input
//! always yields byte-identical output.

use std::fmt::Write as _;
use std::str::FromStr;

use chrono::DateTime;
use serde_json::Value;

use crate::models::VerificationResult;

/// Export format for a verification report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Pretty-printed JSON with the matched document flattened in.
    Structured,
    /// Fixed-order human-readable text block.
    Plain,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Structured => "json",
            ReportFormat::Plain => "txt",
        }
    }

    /// Default export file name.
    pub fn file_name(self) -> String {
        format!("verification-report.{}", self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(ReportFormat::Structured),
            "plain" | "txt" | "text" => Ok(ReportFormat::Plain),
            other => Err(ReportError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("unknown report format: {0}")]
    UnknownFormat(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Render `result` in the requested format.
pub fn generate(result: &VerificationResult, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Structured => structured_report(result),
        ReportFormat::Plain => Ok(plain_report(result)),
    }
}

/// All result fields, plus `filename`, `size`, `timestamp` and `type` of the
/// matched document at the top level. The top-level `timestamp` then holds
/// the save time; the verification time stays available as `verifiedAt`.
fn structured_report(result: &VerificationResult) -> Result<String, ReportError> {
    let mut value = serde_json::to_value(result)?;
    if let Value::Object(map) = &mut value {
        map.insert("verifiedAt".to_string(), Value::from(result.timestamp));
        if let Some(doc) = &result.saved_document {
            map.insert("filename".to_string(), Value::from(doc.filename.clone()));
            map.insert("size".to_string(), Value::from(doc.size));
            map.insert("timestamp".to_string(), Value::from(doc.timestamp));
            map.insert("type".to_string(), Value::from(doc.mime_type.clone()));
        }
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

fn plain_report(result: &VerificationResult) -> String {
    let status = if result.is_match { "MATCH" } else { "MISMATCH" };

    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Verification Result");
    let _ = writeln!(out, "-------------------");
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "Input Hash: {}", result.input_hash);
    let _ = writeln!(out, "Checked Hash: {}", result.current_hash);
    let _ = writeln!(out, "Confidence: {}%", result.confidence);
    let _ = writeln!(out, "Time: {}", format_timestamp(result.timestamp));

    if let Some(doc) = &result.saved_document {
        let _ = writeln!(out, "File Name: {}", doc.filename);
        let _ = writeln!(out, "File Size: {} bytes", doc.size);
        let _ = writeln!(out, "Saved At: {}", format_timestamp(doc.timestamp));
        let _ = writeln!(out, "Type: {}", doc.mime_type);
    }

    if result.is_inconclusive() {
        let _ = writeln!(
            out,
            "Note: the remote verification service could not be reached; this result is inconclusive"
        );
    }
    out
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS UTC`.
///
/// Out-of-range values fall back to the raw number.
pub fn format_timestamp(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => millis.to_string(),
    }
}

/// Human-readable size using 1024-based units (Bytes, KB, MB, GB).
///
/// Values keep at most two decimals with trailing zeros removed:
/// `1536` → `1.5 KB`, `1048576` → `1 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{value:.2}");
    let rendered = rendered.trim_end_matches('0').trim_end_matches('.');
    format!("{rendered} {}", UNITS[unit])
}
