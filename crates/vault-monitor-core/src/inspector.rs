//! Backup and log file inspection

use crate::error::Result;
use crate::types::{FileInfo, LogFileInfo};
use chrono::{DateTime, Local};
use glob::Pattern;
use std::fs::Metadata;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::error;

/// Backup artifact patterns
pub const BACKUP_PATTERNS: &[&str] = &["*.sql", "*.sql.gz"];

/// Pattern counted by the status summary
pub const BACKUP_SUMMARY_PATTERN: &str = "*.sql*";

/// Log file pattern
pub const LOG_PATTERN: &str = "*.txt";

/// Number of lines shown in a log preview
pub const PREVIEW_LINES: usize = 5;

pub const PREVIEW_UNAVAILABLE: &str = "Unable to read file";

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Format a byte count as a human readable size with two decimals
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

/// Describe how long ago `modified` was, relative to `now`
pub fn time_ago(modified: DateTime<Local>, now: DateTime<Local>) -> String {
    let elapsed = (now - modified).num_seconds().max(0);
    let days = elapsed / 86_400;
    let seconds = elapsed % 86_400;

    let (count, unit) = if days > 365 {
        (days / 365, "year")
    } else if days > 30 {
        (days / 30, "month")
    } else if days > 0 {
        (days, "day")
    } else if seconds > 3600 {
        (seconds / 3600, "hour")
    } else if seconds > 60 {
        (seconds / 60, "minute")
    } else {
        return "just now".to_string();
    };

    let plural = if count > 1 { "s" } else { "" };
    format!("{} {}{} ago", count, unit, plural)
}

/// Build a [`FileInfo`] snapshot for one file
pub fn file_info(path: &Path) -> Result<FileInfo> {
    let metadata = std::fs::metadata(path)?;
    Ok(file_info_from(path, &metadata, Local::now()))
}

fn file_info_from(path: &Path, metadata: &Metadata, now: DateTime<Local>) -> FileInfo {
    let modified: DateTime<Local> = metadata
        .modified()
        .unwrap_or(SystemTime::UNIX_EPOCH)
        .into();

    FileInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_string_lossy().into_owned(),
        size: metadata.len(),
        size_human: format_bytes(metadata.len()),
        modified,
        modified_ago: time_ago(modified, now),
        permissions: permissions(metadata),
    }
}

#[cfg(unix)]
fn permissions(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    format!("{:03o}", metadata.permissions().mode() & 0o777)
}

#[cfg(not(unix))]
fn permissions(metadata: &Metadata) -> String {
    if metadata.permissions().readonly() {
        "444".to_string()
    } else {
        "644".to_string()
    }
}

/// Paths in `dir` matching `pattern`. Names with a leading dot are matched too.
pub fn matching_paths(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = Pattern::escape(&dir.to_string_lossy());
    let full = Path::new(&escaped).join(pattern);

    let mut paths = Vec::new();
    for entry in glob::glob(&full.to_string_lossy())? {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => error!("Error reading {}: {}", e.path().display(), e),
        }
    }
    Ok(paths)
}

/// Regular files matching any of `patterns`, newest first
fn newest_files(dir: &Path, patterns: &[&str]) -> Result<Vec<(PathBuf, Metadata)>> {
    let mut files = Vec::new();
    for pattern in patterns {
        for path in matching_paths(dir, pattern)? {
            match std::fs::metadata(&path) {
                Ok(metadata) if metadata.is_file() => files.push((path, metadata)),
                Ok(_) => {}
                Err(e) => error!("Error getting file info for {}: {}", path.display(), e),
            }
        }
    }

    files.sort_by_key(|(_, metadata)| {
        std::cmp::Reverse(metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH))
    });
    Ok(files)
}

/// List backup artifacts (`*.sql`, `*.sql.gz`), newest first
pub fn list_backups(dir: &Path) -> Result<Vec<FileInfo>> {
    let now = Local::now();
    Ok(newest_files(dir, BACKUP_PATTERNS)?
        .iter()
        .map(|(path, metadata)| file_info_from(path, metadata, now))
        .collect())
}

/// List at most `limit` log files (`*.txt`), newest first, with a preview of
/// their first lines
pub fn list_logs(dir: &Path, limit: usize) -> Result<Vec<LogFileInfo>> {
    let now = Local::now();
    Ok(newest_files(dir, &[LOG_PATTERN])?
        .iter()
        .take(limit)
        .map(|(path, metadata)| LogFileInfo {
            file: file_info_from(path, metadata, now),
            preview: preview(path).unwrap_or_else(|_| PREVIEW_UNAVAILABLE.to_string()),
        })
        .collect())
}

fn preview(path: &Path) -> std::io::Result<String> {
    let mut reader = BufReader::new(std::fs::File::open(path)?);
    let mut preview = String::new();
    for _ in 0..PREVIEW_LINES {
        if reader.read_line(&mut preview)? == 0 {
            break;
        }
    }
    Ok(preview)
}

/// Count and total size of entries matching the summary pattern. Entries whose
/// metadata cannot be read count towards the total but add no size.
pub fn backup_totals(dir: &Path) -> Result<(usize, u64)> {
    let paths = matching_paths(dir, BACKUP_SUMMARY_PATTERN)?;
    let size = paths
        .iter()
        .filter_map(|path| std::fs::metadata(path).ok())
        .map(|metadata| metadata.len())
        .sum();
    Ok((paths.len(), size))
}
