//! Test configuration helpers

use music_dl::{Config, MediaFetcher, MusicDownloader};
use std::sync::Arc;
use tempfile::TempDir;

/// Config whose output folder lives in `temp_dir`
pub fn temp_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.download.output_dir = temp_dir.path().join("musics");
    config.download.max_concurrent_downloads = 3;
    config.tools.search_path = false;
    config
}

/// Downloader around `fetcher`, with the tempdir that must outlive it
pub async fn create_downloader<F>(fetcher: Arc<F>) -> (MusicDownloader, TempDir)
where
    F: MediaFetcher + 'static,
{
    let temp_dir = tempfile::tempdir().unwrap();
    let downloader = MusicDownloader::with_fetcher(temp_config(&temp_dir), fetcher)
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Whether a yt-dlp binary is available for live tests
pub fn has_ytdlp() -> bool {
    dotenvy::dotenv().ok();
    std::env::var_os("MUSIC_DL_YTDLP_PATH").is_some() || which::which("yt-dlp").is_ok()
}

/// Skip the current test if yt-dlp is not installed
#[macro_export]
macro_rules! skip_if_no_ytdlp {
    () => {
        if !$crate::common::has_ytdlp() {
            eprintln!("Skipping test: yt-dlp not found (set MUSIC_DL_YTDLP_PATH or add it to PATH)");
            return;
        }
    };
}
