//! Application state for the API server

use crate::{Config, MusicDownloader};
use std::sync::Arc;

/// Shared state handed to every route handler
///
/// Cloned per request; both fields are `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// The downloader that runs batches
    pub downloader: Arc<MusicDownloader>,

    /// Configuration the server was started with
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<MusicDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}
