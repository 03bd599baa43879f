//! Batch orchestration: validate, dispatch to the pool, aggregate.

use futures::future::join_all;
use std::path::Path;
use std::sync::atomic::Ordering;

use crate::archive::{build_archive, has_payload_files};
use crate::error::{Error, Result};
use crate::types::{BatchId, BatchResult, DownloadRequest, DownloadResult, Event};
use crate::utils::normalize_format;

use super::MusicDownloader;
use super::download_task::{DownloadTaskContext, run_download_task};

impl MusicDownloader {
    /// Download a batch of items and bundle the outcome
    ///
    /// Each item is a search query or a direct URL. `format` defaults to the
    /// configured `default_format`. Items run on the shared worker pool; the
    /// call returns once every item has finished.
    ///
    /// - One item: the result is that item's file (or its failure).
    /// - Several items: if the output folder holds at least one file, the
    ///   whole folder is zipped and the archive is returned. Files left over
    ///   from earlier batches are included.
    ///
    /// # Errors
    ///
    /// Fails before dispatching anything on an empty batch, a blank item, an
    /// unusable format, or a pool that is shutting down. Individual item
    /// failures never fail the batch; they are reported in
    /// [`BatchResult::items`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use music_dl::{MusicDownloader, Config};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let downloader = MusicDownloader::new(Config::default()).await?;
    /// let batch = downloader
    ///     .download(vec!["Song One".into(), "Song Two".into()], Some("mp3"))
    ///     .await?;
    /// println!("{} -> {:?}", batch.message, batch.output_path);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(&self, items: Vec<String>, format: Option<&str>) -> Result<BatchResult> {
        let requests = self.validate_batch(items, format)?;
        let folder = self.config.output_dir().clone();
        tokio::fs::create_dir_all(&folder).await?;

        let batch_id = BatchId(self.next_batch_id.fetch_add(1, Ordering::SeqCst));
        let total = requests.len();
        let format = requests[0].format.clone();
        tracing::info!(batch_id = batch_id.0, items = total, format = %format, "Batch started");
        self.emit_event(Event::BatchStarted {
            batch_id,
            items: total,
            format,
        });

        let results = self.dispatch(batch_id, requests, &folder).await;
        let batch = self.aggregate(batch_id, results, &folder).await?;

        tracing::info!(
            batch_id = batch_id.0,
            success = batch.success,
            succeeded = batch.succeeded(),
            failed = batch.failed(),
            "Batch complete"
        );
        self.emit_event(Event::BatchComplete {
            batch_id,
            success: batch.success,
            succeeded: batch.succeeded(),
            failed: batch.failed(),
            output_path: batch.output_path.clone(),
        });
        Ok(batch)
    }

    /// Reject batches that cannot be dispatched
    fn validate_batch(&self, items: Vec<String>, format: Option<&str>) -> Result<Vec<DownloadRequest>> {
        self.pool.ensure_accepting()?;
        if items.is_empty() {
            return Err(Error::EmptyBatch);
        }
        let format = normalize_format(format.unwrap_or(&self.config.download.default_format))?;
        if let Some(index) = items.iter().position(|item| item.trim().is_empty()) {
            return Err(Error::EmptyItem { index });
        }

        Ok(items
            .into_iter()
            .map(|item| DownloadRequest::new(item, format.clone()))
            .collect())
    }

    /// Run every request on the pool and collect results in request order
    async fn dispatch(
        &self,
        batch_id: BatchId,
        requests: Vec<DownloadRequest>,
        folder: &Path,
    ) -> Vec<DownloadResult> {
        let mut pending = Vec::with_capacity(requests.len());
        for (index, request) in requests.into_iter().enumerate() {
            let query = request.item.clone();
            let ctx = DownloadTaskContext {
                batch_id,
                index,
                request,
                folder: folder.to_path_buf(),
                fetcher: self.fetcher.clone(),
                event_tx: self.event_tx.clone(),
                task_timeout: self.config.download.task_timeout,
            };
            pending.push((query, self.pool.spawn(run_download_task(ctx))));
        }

        join_all(pending.into_iter().map(|(query, spawned)| async move {
            match spawned {
                Ok(handle) => match handle.await {
                    Ok(Ok(result)) => result,
                    Ok(Err(e)) => DownloadResult::failed(query, None, e),
                    Err(e) => {
                        tracing::error!(batch_id = batch_id.0, query = %query, error = %e, "Download task panicked");
                        DownloadResult::failed(query, None, format!("download task failed: {}", e))
                    }
                },
                Err(e) => DownloadResult::failed(query, None, e),
            }
        }))
        .await
    }

    /// Turn per-item results into the batch outcome
    async fn aggregate(
        &self,
        batch_id: BatchId,
        results: Vec<DownloadResult>,
        folder: &Path,
    ) -> Result<BatchResult> {
        if let [single] = results.as_slice() {
            let message = match (single.success, single.skipped) {
                (true, true) => "already downloaded".to_string(),
                (true, false) => "downloaded".to_string(),
                (false, _) => single
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "download failed".to_string()),
            };
            return Ok(BatchResult {
                success: single.success,
                output_path: single.output_path.clone(),
                message,
                items: results,
            });
        }

        if !has_payload_files(folder) {
            return Ok(BatchResult {
                success: false,
                output_path: None,
                message: Error::NoResults.to_string(),
                items: results,
            });
        }

        let archive = build_archive(folder).await?;
        self.emit_event(Event::ArchiveCreated {
            batch_id,
            path: archive.clone(),
        });

        let succeeded = results.iter().filter(|r| r.success).count();
        Ok(BatchResult {
            success: true,
            output_path: Some(archive),
            message: format!("{} of {} items downloaded", succeeded, results.len()),
            items: results,
        })
    }
}
