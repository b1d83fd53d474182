//! One-off store migrations.
//!
//! Two maintenance jobs kept from the early life of the dataset: converting
//! legacy CSV snapshots to parquet, and moving a store's snapshots to a new
//! directory. Both are synchronous; they run as CLI commands, not inside the
//! service.

use crate::store::error::StoreError;
use log::info;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn list_with_extension(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::StoreDirRead(dir.to_path_buf(), e))?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StoreError::StoreDirRead(dir.to_path_buf(), e))?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some(extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Converts every `*.csv` snapshot in `dir` to a parquet file with the same
/// stem. Returns the number of converted files.
pub fn migrate_csv_to_parquet(dir: &Path, delete_csv: bool) -> Result<usize, StoreError> {
    let csv_files = list_with_extension(dir, "csv")?;
    if csv_files.is_empty() {
        info!("No CSV files found in {}. Nothing to migrate.", dir.display());
        return Ok(0);
    }
    info!("Found {} CSV file(s) to migrate.", csv_files.len());

    for csv_path in &csv_files {
        let parquet_path = csv_path.with_extension("parquet");
        info!(
            "Converting: {} -> {}",
            csv_path.display(),
            parquet_path.display()
        );

        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(csv_path.clone()))
            .map_err(|e| StoreError::CsvRead(csv_path.clone(), e))?
            .finish()
            .map_err(|e| StoreError::CsvRead(csv_path.clone(), e))?;

        let file = fs::File::create(&parquet_path)
            .map_err(|e| StoreError::ParquetWriteIo(parquet_path.clone(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut df)
            .map_err(|e| StoreError::ParquetWritePolars(parquet_path.clone(), e))?;

        if delete_csv {
            fs::remove_file(csv_path)
                .map_err(|e| StoreError::SnapshotDelete(csv_path.clone(), e))?;
            info!("Deleted original: {}", csv_path.display());
        }
    }
    info!("Migration complete.");
    Ok(csv_files.len())
}

/// Copies every `*.parquet` snapshot from `source` to `destination`.
/// Returns the number of copied files (0 in dry-run mode).
pub fn migrate_store(
    source: &Path,
    destination: &Path,
    delete_source: bool,
    dry_run: bool,
) -> Result<usize, StoreError> {
    let parquet_files = list_with_extension(source, "parquet")?;
    if parquet_files.is_empty() {
        info!(
            "No Parquet files found in {}. Nothing to migrate.",
            source.display()
        );
        return Ok(0);
    }
    info!("Found {} Parquet file(s) to migrate.", parquet_files.len());

    if dry_run {
        for path in &parquet_files {
            info!(
                "Would copy: {} -> {}",
                path.display(),
                destination.join(path.file_name().unwrap_or_default()).display()
            );
        }
        return Ok(0);
    }

    fs::create_dir_all(destination)
        .map_err(|e| StoreError::StoreDirCreation(destination.to_path_buf(), e))?;

    let mut copied = 0;
    for src in &parquet_files {
        let dst = destination.join(src.file_name().unwrap_or_default());
        info!("Copying: {} -> {}", src.display(), dst.display());
        fs::copy(src, &dst).map_err(|e| StoreError::SnapshotCopy {
            src: src.clone(),
            dst: dst.clone(),
            source: e,
        })?;
        copied += 1;

        if delete_source {
            fs::remove_file(src).map_err(|e| StoreError::SnapshotDelete(src.clone(), e))?;
            info!("Deleted source: {}", src.display());
        }
    }
    info!("Migration complete. {copied} file(s) copied.");
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_csv(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "zip_code,diesel_a_price\n28001,1.459\n28002,1.51\n").unwrap();
        path
    }

    #[test]
    fn csv_conversion_creates_parquet() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = write_csv(tmp.path(), "spain_fuel_prices_2024-03-01T07:00:00Z.csv");

        let converted = migrate_csv_to_parquet(tmp.path(), false).unwrap();
        assert_eq!(converted, 1);
        assert!(csv.exists(), "original kept without delete_csv");

        let parquet = csv.with_extension("parquet");
        let df = LazyFrame::scan_parquet(&parquet, Default::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn csv_conversion_can_delete_originals() {
        let tmp = tempfile::tempdir().unwrap();
        let csv = write_csv(tmp.path(), "spain_fuel_prices_2024-03-01T07:00:00Z.csv");
        migrate_csv_to_parquet(tmp.path(), true).unwrap();
        assert!(!csv.exists());
    }

    #[test]
    fn empty_dir_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(migrate_csv_to_parquet(tmp.path(), false).unwrap(), 0);
    }

    #[test]
    fn store_move_copies_and_optionally_deletes() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        let csv = write_csv(src.path(), "spain_fuel_prices_2024-03-01T07:00:00Z.csv");
        migrate_csv_to_parquet(src.path(), true).unwrap();
        let parquet = csv.with_extension("parquet");

        // Dry run copies nothing.
        assert_eq!(migrate_store(src.path(), dst.path(), false, true).unwrap(), 0);
        assert!(dst.path().read_dir().unwrap().next().is_none());

        assert_eq!(migrate_store(src.path(), dst.path(), true, false).unwrap(), 1);
        assert!(!parquet.exists());
        assert!(dst
            .path()
            .join(parquet.file_name().unwrap())
            .exists());
    }
}
