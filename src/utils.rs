//! Shared utility functions for the database path and timestamps.
//!
//! These functions are reused across the store, CLI and TUI.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use time::OffsetDateTime;

/// Gets the cross-platform database path.
///
/// Returns the path as `{data_dir}/maktaba/knowledge.db` where `data_dir` is:
/// - Linux: `~/.local/share`
/// - macOS: `~/Library/Application Support`
/// - Windows: `C:\Users\<user>\AppData\Roaming`
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn get_database_path() -> Result<PathBuf> {
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;

    Ok(data_dir.join("maktaba").join("knowledge.db"))
}

/// Ensures the parent directory of the database file exists.
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn ensure_database_directory(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create database directory: {}", parent.display())
        })?;
    }
    Ok(())
}

/// Converts a timestamp to Unix milliseconds.
pub fn to_unix_millis(timestamp: OffsetDateTime) -> i64 {
    (timestamp.unix_timestamp_nanos() / 1_000_000) as i64
}

/// Converts Unix milliseconds back to a UTC timestamp.
///
/// # Errors
///
/// Returns an error if the value is outside the supported date range.
pub fn from_unix_millis(millis: i64) -> Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .with_context(|| format!("Timestamp out of range: {millis}"))
}

/// Current time truncated to millisecond precision.
///
/// Stored timestamps round-trip exactly through [`to_unix_millis`].
pub fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use time::macros::datetime;

    #[test]
    fn database_path_ends_with_app_dir() {
        let path = get_database_path().unwrap();
        assert!(path.ends_with("maktaba/knowledge.db"));
    }

    #[test]
    fn ensure_database_directory_creates_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("a").join("b").join("knowledge.db");

        ensure_database_directory(&db_path).unwrap();
        assert!(db_path.parent().unwrap().is_dir());
    }

    #[test]
    fn millis_round_trip() {
        let ts = datetime!(2024-03-10 12:34:56.789 UTC);
        let millis = to_unix_millis(ts);
        assert_eq!(millis, 1_710_074_096_789);
        assert_eq!(from_unix_millis(millis).unwrap(), ts);
    }

    #[test]
    fn from_unix_millis_rejects_out_of_range() {
        assert!(from_unix_millis(i64::MAX).is_err());
    }

    #[test]
    fn now_millis_has_no_sub_millisecond_part() {
        let now = now_millis();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
        assert_eq!(from_unix_millis(to_unix_millis(now)).unwrap(), now);
    }
}
