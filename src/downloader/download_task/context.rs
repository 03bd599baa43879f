//! Download task context: the immutable inputs of one item.

use crate::fetcher::MediaFetcher;
use crate::types::{BatchId, DownloadRequest, Event};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Everything a worker needs to process one item.
pub(crate) struct DownloadTaskContext {
    pub(crate) batch_id: BatchId,
    /// Position of the item in the request
    pub(crate) index: usize,
    pub(crate) request: DownloadRequest,
    /// Output folder shared by all workers
    pub(crate) folder: PathBuf,
    pub(crate) fetcher: Arc<dyn MediaFetcher>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    pub(crate) task_timeout: Option<Duration>,
}

impl DownloadTaskContext {
    pub(super) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(super) fn query(&self) -> &str {
        &self.request.item
    }

    pub(super) fn format(&self) -> &str {
        &self.request.format
    }
}
