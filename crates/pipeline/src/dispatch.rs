use crate::config::WordCloudConfig;
use log::warn;
use tokio::sync::watch;
use tokio::time::timeout;
use wordcloud_tokenizer::{TokenizeOptions, Tokenizer};

/// Progress milestones of a run, in [0, 100].
pub const PROGRESS_START: u8 = 0;
pub const PROGRESS_EXTRACTED: u8 = 25;
pub const PROGRESS_DISPATCH_CAP: u8 = 90;
pub const PROGRESS_AGGREGATED: u8 = 95;
pub const PROGRESS_PUBLISHED: u8 = 100;

/// A batch that contributed zero tokens because its tokenizer call failed,
/// as opposed to succeeding with nothing to say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub batch_index: usize,
    pub reason: String,
}

/// Per-text token lists on success, typed failure otherwise.
pub type BatchResult = std::result::Result<Vec<Vec<String>>, BatchFailure>;

#[derive(Debug, Default)]
pub struct DispatchReport {
    pub batches: Vec<BatchResult>,
    pub texts_processed: usize,
    /// Dispatch stopped early because a newer run superseded this one.
    pub cancelled: bool,
    pub last_error: Option<String>,
}

impl DispatchReport {
    #[must_use]
    pub fn failed_batches(&self) -> usize {
        self.batches.iter().filter(|batch| batch.is_err()).count()
    }
}

/// Partitions `texts` into contiguous `batch_size` chunks and tokenizes them
/// one at a time, so concurrent load on the external service stays bounded.
///
/// A batch failure (transport error, bad status, malformed response, timeout)
/// is logged and recorded; its texts contribute zero tokens and dispatch
/// moves on to the next batch. Progress is reported after every batch,
/// success or failure, and never exceeds [`PROGRESS_DISPATCH_CAP`]. Between
/// batches the latest scheduled generation is checked; if this run has been
/// superseded, the remaining batches are abandoned.
///
/// Always terminates once every batch has been attempted; an empty `texts`
/// returns immediately without touching progress or the tokenizer.
pub async fn dispatch_batches(
    tokenizer: &dyn Tokenizer,
    texts: &[String],
    config: &WordCloudConfig,
    generation: u64,
    latest_generation: &watch::Receiver<u64>,
    mut on_progress: impl FnMut(u8),
) -> DispatchReport {
    let mut report = DispatchReport::default();
    if texts.is_empty() {
        return report;
    }

    let options = TokenizeOptions {
        cloud: config.cloud,
        max_tokens_per_text: config.max_tokens_per_text,
    };
    let total = texts.len();

    for (batch_index, batch) in texts.chunks(config.batch_size).enumerate() {
        if *latest_generation.borrow() != generation {
            report.cancelled = true;
            break;
        }

        let outcome = match timeout(config.batch_timeout, tokenizer.tokenize(batch, options)).await
        {
            Ok(Ok(response)) => {
                if response.results.len() == batch.len() {
                    Ok(response
                        .results
                        .into_iter()
                        .map(|text_tokens| text_tokens.words)
                        .collect())
                } else {
                    Err(BatchFailure {
                        batch_index,
                        reason: format!(
                            "expected {} token lists, got {}",
                            batch.len(),
                            response.results.len()
                        ),
                    })
                }
            }
            Ok(Err(err)) => Err(BatchFailure {
                batch_index,
                reason: err.to_string(),
            }),
            Err(_) => Err(BatchFailure {
                batch_index,
                reason: format!(
                    "tokenizer call timed out after {}ms",
                    config.batch_timeout.as_millis()
                ),
            }),
        };

        if let Err(failure) = &outcome {
            warn!(
                "word cloud batch {} skipped: {}",
                failure.batch_index, failure.reason
            );
            report.last_error = Some(failure.reason.clone());
        }
        report.batches.push(outcome);
        report.texts_processed += batch.len();
        on_progress(dispatch_progress(report.texts_processed, total));
    }

    report
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn dispatch_progress(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_EXTRACTED;
    }
    let value = f64::from(PROGRESS_EXTRACTED) + (processed as f64 / total as f64) * 65.0;
    value.min(f64::from(PROGRESS_DISPATCH_CAP)).round() as u8
}
