//! File I/O utilities
//!
//! Atomic JSON writes for configuration files, plus the copy primitives the
//! backup strategies are built on. Copies keep each file's modification time
//! so a fresh backup and the save it was taken from compare as equal.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;

use serde::{de::DeserializeOwned, Serialize};
use walkdir::WalkDir;

use crate::error::GameSaveError;

/// Read JSON from a file, returning a default value if file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, GameSaveError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| GameSaveError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    let reader = BufReader::new(file);
    serde_json::from_reader(reader)
        .map_err(|e| GameSaveError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), GameSaveError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            GameSaveError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory so the rename stays atomic
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| GameSaveError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| GameSaveError::Storage(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| GameSaveError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| GameSaveError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        GameSaveError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Copy one file, overwriting `dest` and keeping the source modification time
pub fn copy_file_preserving_mtime(source: &Path, dest: &Path) -> io::Result<()> {
    let modified = fs::metadata(source)?.modified()?;
    fs::copy(source, dest)?;
    File::options().write(true).open(dest)?.set_modified(modified)
}

/// Recursively clone `source` into `dest`, deleting whatever `dest` held
pub fn copy_dir_replacing(source: &Path, dest: &Path) -> io::Result<()> {
    if !source.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory {} does not exist", source.display()),
        ));
    }

    if dest.exists() {
        fs::remove_dir_all(dest)?;
    }
    fs::create_dir_all(dest)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file_preserving_mtime(entry.path(), &target)?;
        }
    }

    Ok(())
}

/// Modification time of a file, or the newest file below a directory
///
/// Returns `None` when the path does not exist or holds no files.
pub fn newest_modified(path: &Path) -> io::Result<Option<SystemTime>> {
    if !path.exists() {
        return Ok(None);
    }
    if path.is_file() {
        return fs::metadata(path)?.modified().map(Some);
    }

    let mut newest = None;
    for entry in WalkDir::new(path).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            let modified = entry.metadata().map_err(io::Error::from)?.modified()?;
            newest = newest.max(Some(modified));
        }
    }
    Ok(newest)
}
