//! Directory-backed snapshot store.
//!
//! Snapshots are parquet files named
//! `spain_fuel_prices_<timestamp>.parquet`, one per ingestion run; the
//! timestamp is RFC 3339 so lexical order equals chronological order. The
//! directory is usually a mounted bucket, the store never assumes more than
//! list/read/write/rename.

use crate::store::error::StoreError;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tokio::{fs, task};

pub(crate) const SNAPSHOT_PREFIX: &str = "spain_fuel_prices_";
pub(crate) const SNAPSHOT_EXTENSION: &str = ".parquet";

/// An inclusive date window used to select snapshot files by their
/// file-name date.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Window covering the last `days` days up to today (UTC).
    pub fn days_back(days: i64) -> Self {
        let today = Utc::now().date_naive();
        DateWindow {
            start: Some(today - Duration::days(days)),
            end: Some(today),
        }
    }

    fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }
}

/// Extracts the snapshot date from a file name like
/// `spain_fuel_prices_2025-01-15T07:00:00Z.parquet`.
pub(crate) fn snapshot_date(file_name: &str) -> Option<NaiveDate> {
    let rest = file_name.strip_prefix(SNAPSHOT_PREFIX)?;
    let (date_part, tail) = rest.split_at_checked(10)?;
    if !tail.starts_with('T') {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Builds the snapshot file name for an ingestion timestamp.
pub fn snapshot_file_name(timestamp: DateTime<Utc>) -> String {
    format!(
        "{SNAPSHOT_PREFIX}{}{SNAPSHOT_EXTENSION}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// A directory of parquet snapshot files.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Opens a store at `dir`, creating the directory when missing.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| StoreError::StoreDirCreation(dir.clone(), e))?;
        Ok(SnapshotStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All snapshot files, sorted by name (hence by timestamp), optionally
    /// restricted to a date window.
    pub async fn list_snapshots(
        &self,
        window: Option<DateWindow>,
    ) -> Result<Vec<PathBuf>, StoreError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| StoreError::StoreDirRead(self.dir.clone(), e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::StoreDirRead(self.dir.clone(), e))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(SNAPSHOT_EXTENSION) {
                continue;
            }
            let Some(date) = snapshot_date(name) else {
                continue;
            };
            if window.is_none_or(|w| w.contains(date)) {
                files.push(entry.path());
            }
        }
        files.sort();
        info!("Found {} snapshot files in {}", files.len(), self.dir.display());
        Ok(files)
    }

    /// The most recent snapshot, or `None` when the store is empty.
    pub async fn latest_snapshot(&self) -> Result<Option<PathBuf>, StoreError> {
        Ok(self.list_snapshots(None).await?.pop())
    }

    /// Writes a snapshot parquet file for `timestamp`. The file is written to
    /// a temp file first and renamed into place so readers never see a
    /// partial snapshot.
    pub async fn write_snapshot(
        &self,
        mut df: DataFrame,
        timestamp: DateTime<Utc>,
    ) -> Result<PathBuf, StoreError> {
        let path = self.dir.join(snapshot_file_name(timestamp));
        let path_clone = path.clone();
        let dir = self.dir.clone();
        task::spawn_blocking(move || {
            let tmp = tempfile::NamedTempFile::new_in(&dir)
                .map_err(|e| StoreError::ParquetWriteIo(path_clone.clone(), e))?;
            ParquetWriter::new(tmp.as_file())
                .with_compression(ParquetCompression::Snappy)
                .finish(&mut df)
                .map_err(|e| StoreError::ParquetWritePolars(path_clone.clone(), e))?;
            tmp.persist(&path_clone)
                .map_err(|e| StoreError::ParquetWriteIo(path_clone.clone(), e.error))?;
            Ok::<(), StoreError>(())
        })
        .await??;
        info!("Wrote snapshot {}", path.display());
        Ok(path)
    }

    /// Lazily scans one snapshot file.
    pub fn scan(&self, path: &Path) -> Result<LazyFrame, StoreError> {
        LazyFrame::scan_parquet(path, Default::default())
            .map_err(|e| StoreError::ParquetScan(path.to_path_buf(), e))
    }

    /// Lazily scans every snapshot inside `window` into one concatenated
    /// frame. `None` when the window holds no snapshots.
    pub async fn scan_window(
        &self,
        window: DateWindow,
    ) -> Result<Option<LazyFrame>, StoreError> {
        let files = self.list_snapshots(Some(window)).await?;
        if files.is_empty() {
            return Ok(None);
        }
        let frames = files
            .iter()
            .map(|path| self.scan(path))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = concat(frames, UnionArgs::default()).map_err(StoreError::FrameConcat)?;
        Ok(Some(combined))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn write_test_snapshot(store: &SnapshotStore, name: &str) {
        let mut df = df!(
            "zip_code" => ["28001", "28002"],
            "diesel_a_price" => [1.45, 1.50],
        )
        .unwrap();
        let file = std::fs::File::create(store.dir().join(name)).unwrap();
        ParquetWriter::new(file).finish(&mut df).unwrap();
    }

    #[test]
    fn snapshot_date_extraction() {
        assert_eq!(
            snapshot_date("spain_fuel_prices_2025-01-15T07:00:00Z.parquet"),
            NaiveDate::from_ymd_opt(2025, 1, 15)
        );
        assert_eq!(snapshot_date("other_file.parquet"), None);
        assert_eq!(snapshot_date("spain_fuel_prices_garbage.parquet"), None);
    }

    #[test]
    fn snapshot_file_name_is_sortable() {
        let early = Utc.with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2025, 1, 16, 7, 0, 0).unwrap();
        assert!(snapshot_file_name(early) < snapshot_file_name(late));
    }

    #[tokio::test]
    async fn list_latest_and_window() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();

        write_test_snapshot(&store, "spain_fuel_prices_2025-01-10T07:00:00Z.parquet");
        write_test_snapshot(&store, "spain_fuel_prices_2025-01-14T07:00:00Z.parquet");
        write_test_snapshot(&store, "spain_fuel_prices_2025-01-15T07:00:00Z.parquet");
        // Non-snapshot files are ignored.
        std::fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let all = store.list_snapshots(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let latest = store.latest_snapshot().await.unwrap().unwrap();
        assert!(latest
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .contains("2025-01-15"));

        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2025, 1, 14),
            end: NaiveDate::from_ymd_opt(2025, 1, 15),
        };
        let windowed = store.list_snapshots(Some(window)).await.unwrap();
        assert_eq!(windowed.len(), 2);
    }

    #[tokio::test]
    async fn empty_store_has_no_latest() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        assert!(store.latest_snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_then_scan_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        let ts = Utc.with_ymd_and_hms(2025, 1, 15, 7, 0, 0).unwrap();

        let df = df!(
            "zip_code" => ["28001"],
            "diesel_a_price" => [1.459],
        )
        .unwrap();
        let path = store.write_snapshot(df, ts).await.unwrap();

        let scanned = store.scan(&path).unwrap().collect().unwrap();
        assert_eq!(scanned.height(), 1);
        assert_eq!(
            scanned.column("zip_code").unwrap().str().unwrap().get(0),
            Some("28001")
        );
    }

    #[tokio::test]
    async fn scan_window_concatenates() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        write_test_snapshot(&store, "spain_fuel_prices_2025-01-14T07:00:00Z.parquet");
        write_test_snapshot(&store, "spain_fuel_prices_2025-01-15T07:00:00Z.parquet");

        let window = DateWindow {
            start: NaiveDate::from_ymd_opt(2025, 1, 1),
            end: NaiveDate::from_ymd_opt(2025, 1, 31),
        };
        let frame = store.scan_window(window).await.unwrap().unwrap();
        assert_eq!(frame.collect().unwrap().height(), 4);

        let empty_window = DateWindow {
            start: NaiveDate::from_ymd_opt(2024, 1, 1),
            end: NaiveDate::from_ymd_opt(2024, 1, 31),
        };
        assert!(store.scan_window(empty_window).await.unwrap().is_none());
    }
}
