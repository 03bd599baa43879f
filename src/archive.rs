//! Zip bundling of the output folder
//!
//! A batch with more than one item is handed back as a single archive. The
//! archive contains every file of the output folder except earlier archives,
//! so files left over from previous batches are bundled too.

use crate::error::{Error, Result};
use crate::utils::get_unique_path;
use chrono::Local;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;

/// File name prefix of archives written into the output folder
pub const ARCHIVE_PREFIX: &str = "musics_";

/// Whether a path is an archive this module wrote (`musics_*.zip`)
///
/// Reserved archives are never bundled into a new archive.
pub fn is_reserved_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| {
            name.starts_with(ARCHIVE_PREFIX) && name.to_ascii_lowercase().ends_with(".zip")
        })
}

/// Archive name for the current local time: `musics_YYYYMMDDHHMMSS.zip`
pub fn archive_name() -> String {
    format!("{}{}.zip", ARCHIVE_PREFIX, Local::now().format("%Y%m%d%H%M%S"))
}

/// Files that would go into an archive of `folder`, in a stable order
pub fn payload_files(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() && !is_reserved_archive(entry.path()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Whether `folder` holds at least one file worth returning
///
/// A missing folder has no payload.
pub fn has_payload_files(folder: &Path) -> bool {
    folder.is_dir() && payload_files(folder).is_ok_and(|files| !files.is_empty())
}

/// Bundle every payload file of `folder` into a new archive inside it
///
/// Entry names are the folder-relative paths with `/` separators. Source
/// files are left in place. The blocking work runs on tokio's blocking pool.
///
/// # Errors
///
/// Returns [`Error::NoResults`] when the folder has nothing to bundle, and
/// I/O or archive errors from writing the zip.
pub async fn build_archive(folder: &Path) -> Result<PathBuf> {
    let folder = folder.to_path_buf();
    tokio::task::spawn_blocking(move || write_archive(&folder, &archive_name()))
        .await
        .map_err(|e| Error::Other(format!("archive task failed: {}", e)))?
}

pub(crate) fn write_archive(folder: &Path, name: &str) -> Result<PathBuf> {
    let files = payload_files(folder)?;
    if files.is_empty() {
        return Err(Error::NoResults);
    }

    let archive_path = get_unique_path(&folder.join(name))?;
    let file = File::create(&archive_path)?;
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in &files {
        let entry_name = entry_name(folder, path)?;
        zip.start_file(entry_name, options)?;
        let mut source = File::open(path)?;
        std::io::copy(&mut source, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;

    tracing::info!(
        archive = %archive_path.display(),
        files = files.len(),
        "Archive created"
    );
    Ok(archive_path)
}

fn entry_name(folder: &Path, path: &Path) -> Result<String> {
    let relative = path.strip_prefix(folder).map_err(|_| {
        Error::Other(format!(
            "{} is not inside {}",
            path.display(),
            folder.display()
        ))
    })?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
