//! Single-item download task.
//!
//! Split into focused submodules:
//! - [`context`] - Per-item inputs shared with the worker
//! - [`orchestration`] - Stage machine (probe, check, fetch, reconcile) and timeout
//! - [`reconcile`] - Locating the file a fetch actually produced

mod context;
mod orchestration;
mod reconcile;


pub(crate) use context::DownloadTaskContext;
pub use orchestration::DEFAULT_TITLE;
pub(crate) use orchestration::run_download_task;
pub use reconcile::reconcile_output;
