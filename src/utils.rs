//! Utility functions for file naming and path manipulation

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Characters that are not allowed in output file names
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum number of rename attempts when resolving file collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Make a title safe to use as a file name
///
/// Every character in `<>:"/\|?*` becomes `-`, then surrounding whitespace
/// is trimmed. Applying it twice gives the same result as applying it once.
///
/// # Examples
///
/// ```
/// use music_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Back in Black"), "AC-DC- Back in Black");
/// assert_eq!(sanitize_filename("  What? "), "What-");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if FORBIDDEN_CHARS.contains(&c) { '-' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Extension of the file written for a requested format
///
/// Codec names map to the container ffmpeg writes them into.
///
/// ```
/// use music_dl::utils::file_extension;
///
/// assert_eq!(file_extension("mp3"), "mp3");
/// assert_eq!(file_extension("vorbis"), "ogg");
/// assert_eq!(file_extension("alac"), "m4a");
/// ```
#[must_use]
pub fn file_extension(format: &str) -> &str {
    match format {
        "vorbis" => "ogg",
        "alac" => "m4a",
        other => other,
    }
}

/// Path a title is expected to land at: `folder/{sanitized}.{ext}`
pub fn expected_path(folder: &Path, title: &str, format: &str) -> PathBuf {
    folder.join(format!(
        "{}.{}",
        sanitize_filename(title),
        file_extension(format)
    ))
}

/// Return the existing file for `title` in `format`, if any
///
/// The check is keyed on the sanitized title plus the format only, so two
/// different queries resolving to the same title share one file.
pub fn existing_download(title: &str, format: &str, folder: &Path) -> Option<PathBuf> {
    let path = expected_path(folder, title, format);
    path.is_file().then_some(path)
}

/// Whether a file for `title` in `format` is already present
pub fn is_downloaded(title: &str, format: &str, folder: &Path) -> bool {
    existing_download(title, format, folder).is_some()
}

/// Whether an item is a direct URL rather than a free-text search
///
/// ```
/// use music_dl::utils::is_url;
///
/// assert!(is_url("https://youtu.be/abc"));
/// assert!(is_url("www.example.com/track"));
/// assert!(!is_url("Song One"));
/// ```
#[must_use]
pub fn is_url(item: &str) -> bool {
    let item = item.trim_start();
    item.starts_with("http://") || item.starts_with("https://") || item.starts_with("www.")
}

/// Validate a requested format and normalize it to lowercase
///
/// The format is used verbatim as a file extension, so only ASCII
/// alphanumerics are accepted.
pub fn normalize_format(format: &str) -> Result<String> {
    let trimmed = format.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::InvalidFormat(format.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// Get a path that does not exist yet, adding ` (n)` before the extension
///
/// # Examples
///
/// ```
/// use music_dl::utils::get_unique_path;
/// use std::path::Path;
///
/// let path = Path::new("/tmp/musics_20240101120000.zip");
/// let unique = get_unique_path(path).unwrap();
/// // If the archive exists, returns /tmp/musics_20240101120000 (1).zip
/// ```
pub fn get_unique_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::Other(format!("cannot extract file stem of {}", path.display())))?;
    let extension = path.extension().and_then(|e| e.to_str());
    let parent = path.parent().ok_or_else(|| {
        Error::Other(format!("cannot extract parent directory of {}", path.display()))
    })?;

    for i in 1..=MAX_RENAME_ATTEMPTS {
        let new_name = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        let new_path = parent.join(new_name);
        if !new_path.exists() {
            return Ok(new_path);
        }
    }

    Err(Error::Other(format!(
        "could not find a unique name for {} after {} attempts",
        path.display(),
        MAX_RENAME_ATTEMPTS
    )))
}

/// MIME type for a file handed back over HTTP, based on its extension
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" | "alac" => "audio/mp4",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        "opus" => "audio/opus",
        "ogg" | "vorbis" => "audio/ogg",
        "webm" => "audio/webm",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn sanitize_replaces_every_forbidden_char() {
        assert_eq!(sanitize_filename(r#"a<b>c:d"e/f\g|h?i*j"#), "a-b-c-d-e-f-g-h-i-j");
    }

    #[test]
    fn sanitize_trims_whitespace() {
        assert_eq!(sanitize_filename("   Song One \t\n"), "Song One");
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("   "), "");
    }

    #[test]
    fn sanitize_keeps_unicode_and_punctuation() {
        assert_eq!(sanitize_filename("Café – Déjà vu (Live)"), "Café – Déjà vu (Live)");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "AC/DC: Highway to Hell",
            "  <<weird>>  ",
            "what?*|",
            " - trailing dash - ",
            "plain",
            "\"quoted\" \\ slashed /",
        ];
        for input in inputs {
            let once = sanitize_filename(input);
            assert_eq!(sanitize_filename(&once), once, "input {input:?}");
            assert!(!once.contains(FORBIDDEN_CHARS));
        }
    }

    #[test]
    fn existing_download_uses_sanitized_title_and_format() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("AC-DC- Thunder.mp3"), b"x").unwrap();

        let found = existing_download("AC/DC: Thunder", "mp3", temp_dir.path());
        assert_eq!(found, Some(temp_dir.path().join("AC-DC- Thunder.mp3")));
        assert!(is_downloaded("AC/DC: Thunder", "mp3", temp_dir.path()));

        assert!(!is_downloaded("AC/DC: Thunder", "wav", temp_dir.path()));
        assert!(!is_downloaded("Other", "mp3", temp_dir.path()));
    }

    #[test]
    fn existing_download_ignores_directories() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("Album.mp3")).unwrap();

        assert!(existing_download("Album", "mp3", temp_dir.path()).is_none());
    }

    #[test]
    fn codec_formats_use_their_container_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Song.ogg"), b"x").unwrap();
        fs::write(temp_dir.path().join("Song.m4a"), b"x").unwrap();

        assert_eq!(
            expected_path(temp_dir.path(), "Song", "vorbis"),
            temp_dir.path().join("Song.ogg")
        );
        assert!(is_downloaded("Song", "vorbis", temp_dir.path()));
        assert!(is_downloaded("Song", "alac", temp_dir.path()));
        assert!(!is_downloaded("Song", "opus", temp_dir.path()));
    }

    #[test]
    fn existing_download_in_missing_folder_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        assert!(!is_downloaded("Song", "mp3", &missing));
    }

    #[test]
    fn url_detection() {
        assert!(is_url("http://example.com"));
        assert!(is_url("  https://www.youtube.com/watch?v=x"));
        assert!(is_url("www.youtube.com/watch?v=x"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("Daft Punk - One More Time"));
        assert!(!is_url("see www.example.com"));
    }

    #[test]
    fn normalize_format_lowercases_and_validates() {
        assert_eq!(normalize_format("MP3").unwrap(), "mp3");
        assert_eq!(normalize_format(" flac ").unwrap(), "flac");
        assert_eq!(normalize_format("m4a").unwrap(), "m4a");

        for bad in ["", "   ", "mp.3", "../mp3", "m p3", "mp3/"] {
            assert!(
                matches!(normalize_format(bad), Err(Error::InvalidFormat(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn unique_path_for_nonexistent_file_is_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("musics_1.zip");

        assert_eq!(get_unique_path(&path).unwrap(), path);
    }

    #[test]
    fn unique_path_adds_increasing_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("musics_1.zip");
        fs::write(&path, "original").unwrap();

        let unique = get_unique_path(&path).unwrap();
        assert_eq!(unique, temp_dir.path().join("musics_1 (1).zip"));

        fs::write(&unique, "first").unwrap();
        let unique2 = get_unique_path(&path).unwrap();
        assert_eq!(unique2, temp_dir.path().join("musics_1 (2).zip"));
    }

    #[test]
    fn unique_path_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bundle");
        fs::write(&path, "original").unwrap();

        assert_eq!(
            get_unique_path(&path).unwrap(),
            temp_dir.path().join("bundle (1)")
        );
    }

    #[test]
    fn media_types() {
        assert_eq!(media_type_for_path(Path::new("a/Song.mp3")), "audio/mpeg");
        assert_eq!(media_type_for_path(Path::new("Song.WAV")), "audio/wav");
        assert_eq!(media_type_for_path(Path::new("Song.flac")), "audio/flac");
        assert_eq!(media_type_for_path(Path::new("musics_1.zip")), "application/zip");
        assert_eq!(
            media_type_for_path(Path::new("Song")),
            "application/octet-stream"
        );
    }
}
