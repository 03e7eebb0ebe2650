//! Pre-write zip backups of the Toolbox database.
//!
//! Every run copies the database to `data_backup_YYYYMMDD_HHMMSS.db3`,
//! wraps the copy in a zip archive, removes the intermediate copy, and
//! prunes archives beyond the retention limit.

use crate::domain::error::{AppError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

const BACKUP_PREFIX: &str = "data_backup_";

#[derive(Debug, Clone)]
pub struct BackupConfig {
    /// Directory where archives are written.
    pub backup_dir: PathBuf,
    /// Newest archives kept when pruning.
    pub max_backups: usize,
}

#[derive(Debug, Clone)]
pub struct BackupResult {
    pub archive_path: PathBuf,
    pub size_bytes: u64,
    pub timestamp: String,
}

/// Create a timestamped zip backup of the database file.
///
/// Fails before anything is written when the source database is missing.
pub fn create_backup(db_path: &Path, config: &BackupConfig) -> Result<BackupResult> {
    if !db_path.is_file() {
        return Err(AppError::NotFound(format!(
            "Database file not found: {}",
            db_path.display()
        )));
    }

    fs::create_dir_all(&config.backup_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create backup dir {}: {e}",
            config.backup_dir.display()
        ))
    })?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
    let stem = format!("{BACKUP_PREFIX}{timestamp}");
    let copy_path = config.backup_dir.join(format!("{stem}.db3"));
    let archive_path = config.backup_dir.join(format!("{stem}.zip"));

    fs::copy(db_path, &copy_path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to copy {} to {}: {e}",
            db_path.display(),
            copy_path.display()
        ))
    })?;

    let result = write_archive(&copy_path, &archive_path, &stem);

    // The raw copy is only an intermediate; the archive is the backup.
    let _ = fs::remove_file(&copy_path);
    let size_bytes = result?;

    prune_old_backups(config)?;

    Ok(BackupResult {
        archive_path,
        size_bytes,
        timestamp,
    })
}

fn write_archive(copy_path: &Path, archive_path: &Path, stem: &str) -> Result<u64> {
    let bytes = fs::read(copy_path)
        .map_err(|e| AppError::IoError(format!("Failed to read backup copy: {e}")))?;

    let file = fs::File::create(archive_path).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create archive {}: {e}",
            archive_path.display()
        ))
    })?;

    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(format!("{stem}.db3"), options)
        .map_err(|e| AppError::IoError(format!("Failed to start zip entry: {e}")))?;
    zip.write_all(&bytes)
        .map_err(|e| AppError::IoError(format!("Failed to write zip entry: {e}")))?;
    zip.finish()
        .map_err(|e| AppError::IoError(format!("Failed to finish archive: {e}")))?;

    fs::metadata(archive_path)
        .map(|meta| meta.len())
        .map_err(|e| AppError::IoError(format!("Failed to stat archive: {e}")))
}

/// Keep the newest `max_backups` archives, delete the rest.
pub fn prune_old_backups(config: &BackupConfig) -> Result<Vec<PathBuf>> {
    let mut deleted = Vec::new();
    if !config.backup_dir.exists() {
        return Ok(deleted);
    }

    let mut archives: Vec<(PathBuf, SystemTime)> = Vec::new();
    for entry in fs::read_dir(&config.backup_dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to read backup dir {}: {e}",
            config.backup_dir.display()
        ))
    })? {
        let entry = entry.map_err(|e| AppError::IoError(format!("Failed dir entry: {e}")))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if !file_name.starts_with(BACKUP_PREFIX) || !file_name.ends_with(".zip") {
            continue;
        }

        let meta = entry
            .metadata()
            .map_err(|e| AppError::IoError(format!("Failed to stat {}: {e}", path.display())))?;
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        archives.push((path, mtime));
    }

    // Newest first.
    archives.sort_by(|a, b| b.1.cmp(&a.1));

    for (path, _) in archives.into_iter().skip(config.max_backups) {
        if fs::remove_file(&path).is_ok() {
            deleted.push(path);
        }
    }

    Ok(deleted)
}
