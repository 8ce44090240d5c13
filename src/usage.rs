//! # Usage Module
//!
//! Reads usage entries from the assistant's JSONL logs.
//!
//! ## Key Functions
//!
//! - `find_jsonl_files`: Recursively locates `*.jsonl` files under the data roots
//! - `parse_usage_line`: Turns one log line into a [`UsageEntry`] or rejects it
//! - `load_usage_entries`: Streams every file, deduplicates and sorts by time

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;
use walkdir::WalkDir;

use crate::models::{RawUsage, RawUsageLine, UsageEntry};

/// Parse an instant, accepting RFC 3339 or a zone-less ISO timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|n| n.and_utc())
}

/// Convert a decoded log line into an entry; `None` when it has no usable timestamp.
pub fn usage_entry_from_raw(raw: RawUsageLine) -> Option<UsageEntry> {
    let ts = parse_timestamp(raw.timestamp.as_deref()?)?;

    let RawUsageLine {
        usage,
        message,
        model,
        message_id,
        message_id_camel,
        request_id,
        request_id_camel,
        cost,
        cost_usd,
        ..
    } = raw;

    let (nested_id, nested_model, nested_usage) = match message {
        Some(m) => (m.id, m.model, m.usage),
        None => (None, None, None),
    };

    // An empty top-level object falls back to message.usage
    let usage: RawUsage = match usage {
        Some(u) if !u.is_empty() => u,
        top => nested_usage.or(top).unwrap_or_default(),
    };

    Some(UsageEntry {
        ts,
        input: usage.input_tokens.unwrap_or(0),
        output: usage.output_tokens.unwrap_or(0),
        cache_create: usage.cache_creation_input_tokens.unwrap_or(0),
        cache_read: usage.cache_read_input_tokens.unwrap_or(0),
        // A zero `cost` defers to `costUSD`
        cost_usd: cost.filter(|c| *c != 0.0).or(cost_usd).or(cost),
        model: model.or(nested_model).unwrap_or_default(),
        message_id: message_id.or(message_id_camel).or(nested_id),
        request_id: request_id.or(request_id_camel),
    })
}

/// Decode one JSONL line. Malformed JSON, wrongly typed fields and missing or
/// unparseable timestamps all yield `None`.
pub fn parse_usage_line(line: &str) -> Option<UsageEntry> {
    let t = line.trim();
    if t.is_empty() {
        return None;
    }
    let raw: RawUsageLine = serde_json::from_str(t).ok()?;
    usage_entry_from_raw(raw)
}

/// Read one file line by line, skipping lines already seen under `seen`.
/// Invalid UTF-8 is decoded lossily so one bad line never hides the rest.
pub fn parse_jsonl_file(path: &Path, seen: &mut HashSet<String>) -> Result<Vec<UsageEntry>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut out = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(path = %path.display(), error = %err, "stopped reading file");
                break;
            }
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(entry) = parse_usage_line(&line) else {
            continue;
        };
        match entry.dedup_key() {
            Some(key) if seen.contains(&key) => continue,
            Some(key) => {
                seen.insert(key);
            }
            None => {}
        }
        out.push(entry);
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FileFingerprint {
    name: String,
    size: u64,
    mtime_ms: u128,
}

/// All `*.jsonl` files under `roots`, deduplicated by (name, size, mtime)
/// and ordered oldest first.
pub fn find_jsonl_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: HashSet<FileFingerprint> = HashSet::new();
    let mut files: Vec<(u128, PathBuf)> = Vec::new();

    for root in roots {
        if !root.is_dir() {
            debug!(root = %root.display(), "skipping missing data root");
            continue;
        }
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable path");
                    continue;
                }
            };
            if !entry.file_type().is_file()
                || entry.path().extension().and_then(|e| e.to_str()) != Some("jsonl")
            {
                continue;
            }
            let Ok(meta) = fs::metadata(entry.path()) else {
                continue;
            };
            let mtime_ms = meta
                .modified()
                .ok()
                .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis())
                .unwrap_or(0);
            let fp = FileFingerprint {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len(),
                mtime_ms,
            };
            if seen.insert(fp) {
                files.push((mtime_ms, entry.into_path()));
            }
        }
    }

    files.sort();
    files.into_iter().map(|(_, p)| p).collect()
}

/// Load every entry under `roots`, sorted by timestamp. An empty result is not an error.
pub fn load_usage_entries(roots: &[PathBuf]) -> Vec<UsageEntry> {
    let files = find_jsonl_files(roots);
    let mut seen: HashSet<String> = HashSet::new();
    let mut entries: Vec<UsageEntry> = Vec::new();

    for path in &files {
        match parse_jsonl_file(path, &mut seen) {
            Ok(mut parsed) => entries.append(&mut parsed),
            Err(err) => debug!(path = %path.display(), error = %err, "skipping unreadable file"),
        }
    }
    debug!(files = files.len(), entries = entries.len(), "loaded usage logs");

    entries.sort_by_key(|e| e.ts);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_usage() {
        let e = parse_usage_line(
            r#"{"timestamp":"2024-01-15T10:00:00Z","model":"claude-opus-4","usage":{"input_tokens":100,"output_tokens":50,"cache_creation_input_tokens":7,"cache_read_input_tokens":9},"costUSD":0.25}"#,
        )
        .unwrap();
        assert_eq!(e.input, 100);
        assert_eq!(e.output, 50);
        assert_eq!(e.cache_create, 7);
        assert_eq!(e.cache_read, 9);
        assert_eq!(e.model, "claude-opus-4");
        assert_eq!(e.cost_usd, Some(0.25));
        assert_eq!(e.ts.to_rfc3339(), "2024-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_nested_message_usage() {
        let e = parse_usage_line(
            r#"{"timestamp":"2024-01-15T10:00:00.123Z","requestId":"req_1","message":{"id":"msg_1","model":"claude-sonnet-4","usage":{"input_tokens":3,"output_tokens":4}}}"#,
        )
        .unwrap();
        assert_eq!((e.input, e.output, e.cache_create, e.cache_read), (3, 4, 0, 0));
        assert_eq!(e.model, "claude-sonnet-4");
        assert_eq!(e.message_id.as_deref(), Some("msg_1"));
        assert_eq!(e.request_id.as_deref(), Some("req_1"));
        assert_eq!(e.dedup_key().as_deref(), Some("msg_1:req_1"));
    }

    #[test]
    fn test_empty_top_level_usage_falls_back() {
        let e = parse_usage_line(
            r#"{"timestamp":"2024-01-15T10:00:00Z","usage":{},"message":{"usage":{"input_tokens":11}}}"#,
        )
        .unwrap();
        assert_eq!(e.input, 11);
    }

    #[test]
    fn test_identifier_precedence() {
        let e = parse_usage_line(
            r#"{"timestamp":"2024-01-15T10:00:00Z","message_id":"top","messageId":"camel","request_id":"r_top","requestId":"r_camel","model":"top-model","message":{"id":"nested","model":"nested-model"}}"#,
        )
        .unwrap();
        assert_eq!(e.message_id.as_deref(), Some("top"));
        assert_eq!(e.request_id.as_deref(), Some("r_top"));
        assert_eq!(e.model, "top-model");

        let e = parse_usage_line(
            r#"{"timestamp":"2024-01-15T10:00:00Z","messageId":"camel","message":{"id":"nested"}}"#,
        )
        .unwrap();
        assert_eq!(e.message_id.as_deref(), Some("camel"));
        assert_eq!(e.request_id, None);
        assert_eq!(e.dedup_key(), None);
    }

    #[test]
    fn test_rejects_bad_lines() {
        assert!(parse_usage_line("").is_none());
        assert!(parse_usage_line("   ").is_none());
        assert!(parse_usage_line("not json").is_none());
        assert!(parse_usage_line(r#"{"usage":{"input_tokens":1}}"#).is_none());
        assert!(parse_usage_line(r#"{"timestamp":"yesterday"}"#).is_none());
        assert!(parse_usage_line(r#"{"timestamp":"2024-01-15T10:00:00Z","usage":{"input_tokens":"many"}}"#).is_none());
    }

    #[test]
    fn test_zero_cost_defers_to_cost_usd() {
        let ts = r#""timestamp":"2024-01-15T10:00:00Z""#;
        let e = parse_usage_line(&format!(r#"{{{ts},"cost":0,"costUSD":0.4}}"#)).unwrap();
        assert_eq!(e.cost_usd, Some(0.4));
        let e = parse_usage_line(&format!(r#"{{{ts},"cost":0.1,"costUSD":0.4}}"#)).unwrap();
        assert_eq!(e.cost_usd, Some(0.1));
        let e = parse_usage_line(&format!(r#"{{{ts},"cost":0}}"#)).unwrap();
        assert_eq!(e.cost_usd, Some(0.0));
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_the_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("s.jsonl");
        let mut body = br#"{"timestamp":"2024-01-15T10:00:00Z","usage":{"input_tokens":1}}"#.to_vec();
        body.extend_from_slice(b"\n\xff\xfe{broken\n");
        body.extend_from_slice(br#"{"timestamp":"2024-01-15T11:00:00Z","usage":{"input_tokens":2}}"#);
        fs::write(&path, body).unwrap();

        let entries = parse_jsonl_file(&path, &mut HashSet::new()).unwrap();
        assert_eq!(entries.iter().map(|e| e.input).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_defaults_without_usage() {
        let e = parse_usage_line(r#"{"timestamp":"2024-01-15T10:00:00"}"#).unwrap();
        assert_eq!(e.input + e.output + e.cache_create + e.cache_read, 0);
        assert_eq!(e.model, "");
        assert_eq!(e.cost_usd, None);
    }
}
