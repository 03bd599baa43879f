//! Download task orchestration: the stage machine for a single item.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::fetcher::output_template;
use crate::types::{DownloadResult, Event, TaskStage};
use crate::utils::{existing_download, expected_path};

use super::context::DownloadTaskContext;
use super::reconcile::reconcile_output;

/// Title used when the fetcher cannot tell what an item resolves to
pub const DEFAULT_TITLE: &str = "track";

/// How far a task got; kept outside the stage future so a timeout can still
/// report the stage and title.
#[derive(Debug)]
struct Progress {
    stage: TaskStage,
    title: Option<String>,
}

impl Progress {
    fn enter(&mut self, stage: TaskStage, ctx: &DownloadTaskContext) {
        tracing::debug!(
            batch_id = ctx.batch_id.0,
            index = ctx.index,
            query = %ctx.query(),
            from = %self.stage,
            to = %stage,
            "Download task stage"
        );
        self.stage = stage;
    }
}

enum Completion {
    Downloaded(PathBuf),
    AlreadyPresent(PathBuf),
}

/// Process one item and describe the outcome.
///
/// Stages:
/// 1. Probing - resolve the title without downloading
/// 2. Checking - reuse a file already in the output folder
/// 3. Fetching - download and transcode
/// 4. Reconciling - locate the produced file
///
/// Every failure, including a timeout, ends up in the returned result.
pub(crate) async fn run_download_task(ctx: DownloadTaskContext) -> DownloadResult {
    let started = SystemTime::now();
    let mut progress = Progress {
        stage: TaskStage::Probing,
        title: None,
    };

    ctx.emit(Event::ItemStarted {
        batch_id: ctx.batch_id,
        index: ctx.index,
        query: ctx.query().to_string(),
    });

    let outcome = match ctx.task_timeout {
        Some(limit) => {
            let timed = tokio::time::timeout(limit, run_stages(&ctx, &mut progress, started)).await;
            timed.unwrap_or_else(|_| {
                Err(Error::Fetch(format!("timed out after {:?}", limit)))
            })
        }
        None => run_stages(&ctx, &mut progress, started).await,
    };

    let failed_stage = progress.stage;
    progress.enter(TaskStage::Done, &ctx);
    let title = progress.title;

    match outcome {
        Ok(Completion::AlreadyPresent(path)) => {
            tracing::info!(
                batch_id = ctx.batch_id.0,
                index = ctx.index,
                query = %ctx.query(),
                path = %path.display(),
                "Already downloaded, skipping"
            );
            ctx.emit(Event::ItemSkipped {
                batch_id: ctx.batch_id,
                index: ctx.index,
                query: ctx.query().to_string(),
                path: path.clone(),
            });
            DownloadResult::already_present(ctx.query(), title.unwrap_or_default(), path)
        }
        Ok(Completion::Downloaded(path)) => {
            tracing::info!(
                batch_id = ctx.batch_id.0,
                index = ctx.index,
                query = %ctx.query(),
                path = %path.display(),
                "Download complete"
            );
            ctx.emit(Event::ItemCompleted {
                batch_id: ctx.batch_id,
                index: ctx.index,
                query: ctx.query().to_string(),
                path: path.clone(),
            });
            DownloadResult::downloaded(ctx.query(), title.unwrap_or_default(), path)
        }
        Err(e) => {
            tracing::warn!(
                batch_id = ctx.batch_id.0,
                index = ctx.index,
                query = %ctx.query(),
                stage = %failed_stage,
                error = %e,
                "Download failed"
            );
            ctx.emit(Event::ItemFailed {
                batch_id: ctx.batch_id,
                index: ctx.index,
                query: ctx.query().to_string(),
                error: e.to_string(),
            });
            DownloadResult::failed(ctx.query(), title, e)
        }
    }
}

async fn run_stages(
    ctx: &DownloadTaskContext,
    progress: &mut Progress,
    started: SystemTime,
) -> Result<Completion> {
    let info = ctx.fetcher.probe(ctx.query()).await?;
    let probed = non_blank(info.title);
    let title = probed
        .clone()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    progress.title = Some(title.clone());

    progress.enter(TaskStage::Checking, ctx);
    if let Some(existing) = existing_download(&title, ctx.format(), &ctx.folder) {
        return Ok(Completion::AlreadyPresent(existing));
    }

    progress.enter(TaskStage::Fetching, ctx);
    let template = output_template(&ctx.folder, &title);
    let fetched = ctx
        .fetcher
        .fetch(ctx.query(), &template, ctx.format())
        .await?;
    // the file keeps the placeholder name; only the reported title changes
    if probed.is_none()
        && let Some(resolved) = non_blank(fetched.resolved_title)
    {
        progress.title = Some(resolved);
    }

    progress.enter(TaskStage::Reconciling, ctx);
    reconcile_output(
        &ctx.folder,
        &title,
        ctx.format(),
        fetched.output_path.as_deref(),
        started,
    )
    .map(Completion::Downloaded)
    .ok_or_else(|| Error::FileNotProduced {
        path: expected_path(&ctx.folder, &title, ctx.format()),
    })
}

fn non_blank(title: Option<String>) -> Option<String> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
