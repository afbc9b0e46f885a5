//! # Word Cloud Pipeline
//!
//! Incremental word-frequency aggregation for the search console's word
//! cloud view.
//!
//! ## Pipeline
//!
//! ```text
//! InputSet (records)
//!     │
//!     ├──> Fingerprint Gate (skip when unchanged)
//!     │
//!     ├──> Column Selector (dominant text field)
//!     │
//!     ├──> Extractor/Bounder (≤ 2000 texts, ≤ 5000 chars each)
//!     │
//!     ├──> Batch Dispatcher (batches of 100, failures isolated)
//!     │
//!     └──> Aggregator + Top-K (normalized counts, top 150)
//!            └─> published FrequencyEntry[]
//! ```
//!
//! The [`WordCloudController`] wraps the chain: triggers are debounced and
//! coalesced, at most one run is in flight, and every accepted trigger ends
//! in a terminal state (completed, skipped, superseded or failed).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wordcloud_pipeline::{WordCloudConfig, WordCloudController};
//! use wordcloud_tokenizer::StubTokenizer;
//!
//! #[tokio::main]
//! async fn main() -> wordcloud_pipeline::Result<()> {
//!     let controller = WordCloudController::start(
//!         Arc::new(StubTokenizer::new()),
//!         WordCloudConfig::default(),
//!     )?;
//!     controller.notify(Arc::new(Vec::new())).await?;
//!     Ok(())
//! }
//! ```

mod aggregate;
mod columns;
mod config;
mod controller;
mod dispatch;
mod error;
mod extract;
mod fingerprint;
mod topk;

pub use aggregate::aggregate;
pub use columns::select_column;
pub use config::WordCloudConfig;
pub use controller::{
    PipelineSnapshot, RunOutcome, RunState, RunUpdate, WordCloudController, FAILURE_NOTICE,
};
pub use dispatch::{
    dispatch_batches, BatchFailure, BatchResult, DispatchReport, PROGRESS_AGGREGATED,
    PROGRESS_DISPATCH_CAP, PROGRESS_EXTRACTED, PROGRESS_PUBLISHED, PROGRESS_START,
};
pub use error::{PipelineError, Result};
pub use extract::extract_bounded;
pub use fingerprint::{FingerprintGate, RunFingerprint};
pub use topk::select_top;
