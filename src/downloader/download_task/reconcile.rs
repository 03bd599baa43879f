//! Output-path reconciliation: find the file a fetch produced.

use crate::utils::{expected_path, file_extension, sanitize_filename};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Slack for filesystems with coarse modification times
const MTIME_SLACK: Duration = Duration::from_secs(1);

/// Locate the file produced for `title` in `format`
///
/// Candidates, in order:
/// 1. `folder/{sanitized}.{ext}`
/// 2. the newest file in `folder` whose name starts with the sanitized title
///    and ends with `.{ext}`, modified at or after `started` (minus one
///    second), so files written by earlier batches are not picked up
/// 3. the path the fetcher reported, if it is a file inside `folder` with
///    the expected extension
///
/// `ext` is [`file_extension`] of `format`.
pub fn reconcile_output(
    folder: &Path,
    title: &str,
    format: &str,
    reported: Option<&Path>,
    started: SystemTime,
) -> Option<PathBuf> {
    let expected = expected_path(folder, title, format);
    if expected.is_file() {
        return Some(expected);
    }

    if let Some(found) = scan_folder(folder, &sanitize_filename(title), format, started) {
        return Some(found);
    }

    let ext = file_extension(format);
    reported
        .filter(|p| p.is_file() && has_extension(p, ext) && inside_folder(p, folder))
        .map(Path::to_path_buf)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn inside_folder(path: &Path, folder: &Path) -> bool {
    match (path.canonicalize(), folder.canonicalize()) {
        (Ok(path), Ok(folder)) => path.starts_with(folder),
        _ => false,
    }
}

fn scan_folder(folder: &Path, base: &str, format: &str, started: SystemTime) -> Option<PathBuf> {
    let suffix = format!(".{}", file_extension(format));
    let cutoff = started.checked_sub(MTIME_SLACK).unwrap_or(started);

    let entries = match std::fs::read_dir(folder) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(folder = %folder.display(), error = %e, "Cannot scan output folder");
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name();
            let name = name.to_str()?;
            if !name.starts_with(base) || !name.ends_with(&suffix) {
                return None;
            }
            let meta = entry.metadata().ok()?;
            let modified = meta.modified().ok()?;
            (meta.is_file() && modified >= cutoff).then(|| (modified, entry.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}
