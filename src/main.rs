//! music-dl server binary.
//!
//! Loads `.env`, reads the optional JSON config named by `MUSIC_DL_CONFIG`,
//! applies `MUSIC_DL_*` overrides and serves the REST API until SIGINT or
//! SIGTERM.

use std::sync::Arc;

use music_dl::{Config, MusicDownloader, run_with_shutdown};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable naming a JSON config file
const CONFIG_ENV: &str = "MUSIC_DL_CONFIG";

#[tokio::main]
async fn main() -> music_dl::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "music_dl=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            tracing::info!(path = %path.to_string_lossy(), "Loading configuration file");
            Config::from_file(path)?
        }
        None => Config::default(),
    };
    config.apply_env()?;

    let downloader = Arc::new(MusicDownloader::new(config).await?);
    run_with_shutdown(downloader).await
}
