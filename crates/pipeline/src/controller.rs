use crate::aggregate::aggregate;
use crate::columns::select_column;
use crate::config::WordCloudConfig;
use crate::dispatch::{
    dispatch_batches, PROGRESS_AGGREGATED, PROGRESS_EXTRACTED, PROGRESS_PUBLISHED, PROGRESS_START,
};
use crate::error::{PipelineError, Result};
use crate::extract::extract_bounded;
use crate::fingerprint::{FingerprintGate, RunFingerprint};
use crate::topk::select_top;
use log::{error, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;
use wordcloud_protocol::{FrequencyEntry, Record};
use wordcloud_tokenizer::Tokenizer;

/// The one user-facing message for whole-pipeline failures. Per-batch
/// failures stay at log level and are never surfaced individually.
pub const FAILURE_NOTICE: &str = "Failed to generate word cloud";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
}

/// Externally observable pipeline state. All fields are updated together
/// through one watch channel, so a reader never sees a result from one
/// generation paired with progress from another.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub state: RunState,
    pub progress: u8,
    pub generation: u64,
    pub entries: Arc<Vec<FrequencyEntry>>,
    pub last_error: Option<String>,
}

impl PipelineSnapshot {
    fn initial() -> Self {
        Self {
            state: RunState::Idle,
            progress: PROGRESS_START,
            generation: 0,
            entries: Arc::new(Vec::new()),
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    Completed,
    Skipped,
    Superseded,
    Failed,
}

/// Terminal notification for one accepted trigger.
#[derive(Debug, Clone, Serialize)]
pub struct RunUpdate {
    pub generation: u64,
    pub outcome: RunOutcome,
    pub entries: Arc<Vec<FrequencyEntry>>,
    pub duration_ms: u64,
    pub failed_batches: usize,
    pub error: Option<String>,
}

enum ControllerCommand {
    Notify { records: Arc<Vec<Record>> },
    ResetProgress { generation: u64 },
    Shutdown,
}

/// Owns the word cloud pipeline for one UI surface: debounces triggers,
/// gates on the input fingerprint, serializes execution (one run in flight,
/// at most one pending), and guarantees a terminal state on every accepted
/// trigger. Constructed once per surface, torn down on drop.
#[derive(Clone)]
pub struct WordCloudController {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    command_tx: mpsc::Sender<ControllerCommand>,
    update_tx: broadcast::Sender<RunUpdate>,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
}

impl WordCloudController {
    pub fn start(tokenizer: Arc<dyn Tokenizer>, config: WordCloudConfig) -> Result<Self> {
        config.validate()?;

        let (command_tx, command_rx) = mpsc::channel(16);
        let (update_tx, _) = broadcast::channel(32);
        let (snapshot_tx, _) = watch::channel(PipelineSnapshot::initial());

        spawn_controller_loop(
            tokenizer,
            config,
            command_rx,
            command_tx.clone(),
            update_tx.clone(),
            snapshot_tx.clone(),
        );

        Ok(Self {
            inner: Arc::new(ControllerInner {
                command_tx,
                update_tx,
                snapshot_tx,
            }),
        })
    }

    /// Feeds a new input set. Rapid successive calls are coalesced: only the
    /// most recent set is run once the quiet period elapses.
    pub async fn notify(&self, records: Arc<Vec<Record>>) -> Result<()> {
        self.inner
            .command_tx
            .send(ControllerCommand::Notify { records })
            .await
            .map_err(|e| PipelineError::Other(format!("failed to send trigger: {e}")))
    }

    #[must_use]
    pub fn subscribe_updates(&self) -> broadcast::Receiver<RunUpdate> {
        self.inner.update_tx.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> PipelineSnapshot {
        self.inner.snapshot_tx.subscribe().borrow().clone()
    }

    #[must_use]
    pub fn snapshot_stream(&self) -> watch::Receiver<PipelineSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }
}

impl Drop for WordCloudController {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.command_tx.try_send(ControllerCommand::Shutdown);
        }
    }
}

/// Single-slot trailing-edge debounce buffer: only the latest pending input
/// set survives, and the deadline restarts on every trigger.
struct TriggerSlot {
    debounce: Duration,
    pending: Option<Arc<Vec<Record>>>,
    last_trigger: Option<time::Instant>,
}

impl TriggerSlot {
    fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending: None,
            last_trigger: None,
        }
    }

    fn arm(&mut self, records: Arc<Vec<Record>>) {
        self.pending = Some(records);
        self.last_trigger = Some(time::Instant::now());
    }

    fn next_deadline(&self) -> Option<time::Instant> {
        self.pending.as_ref()?;
        self.last_trigger.map(|last| last + self.debounce)
    }

    fn take(&mut self) -> Option<Arc<Vec<Record>>> {
        self.last_trigger = None;
        self.pending.take()
    }
}

struct InFlightRun {
    generation: u64,
    fingerprint: RunFingerprint,
    handle: JoinHandle<RunReport>,
}

struct RunReport {
    generation: u64,
    entries: Vec<FrequencyEntry>,
    failed_batches: usize,
    duration_ms: u64,
}

#[allow(clippy::too_many_lines)]
fn spawn_controller_loop(
    tokenizer: Arc<dyn Tokenizer>,
    config: WordCloudConfig,
    mut command_rx: mpsc::Receiver<ControllerCommand>,
    command_tx: mpsc::Sender<ControllerCommand>,
    update_tx: broadcast::Sender<RunUpdate>,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
) {
    tokio::spawn(async move {
        let mut slot = TriggerSlot::new(config.debounce);
        let mut gate = FingerprintGate::new();
        let mut generation: u64 = 0;
        // Latest scheduled generation; in-flight runs watch this to notice
        // they have been superseded.
        let (latest_tx, latest_rx) = watch::channel(0u64);
        let mut in_flight: Option<InFlightRun> = None;

        loop {
            let deadline = if in_flight.is_none() {
                slot.next_deadline()
            } else {
                None
            };

            tokio::select! {
                Some(cmd) = command_rx.recv() => match cmd {
                    ControllerCommand::Notify { records } => {
                        if let Some(run) = &in_flight {
                            let fingerprint = RunFingerprint::compute(&records);
                            if fingerprint != run.fingerprint {
                                // Newer, different input supersedes the run in
                                // flight; it may finish its current batch but
                                // its result will be discarded.
                                let _ = latest_tx.send(run.generation + 1);
                            }
                        }
                        slot.arm(records);
                    }
                    ControllerCommand::ResetProgress { generation: target } => {
                        if in_flight.is_none() {
                            snapshot_tx.send_modify(|snap| {
                                if snap.generation == target && snap.state == RunState::Idle {
                                    snap.progress = PROGRESS_START;
                                }
                            });
                        }
                    }
                    ControllerCommand::Shutdown => break,
                },
                () = async {
                    if let Some(deadline) = deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if deadline.is_some() => {
                    let Some(records) = slot.take() else { continue };

                    let fingerprint = RunFingerprint::compute(&records);
                    if !gate.should_run_fingerprint(fingerprint.clone()) {
                        info!("word cloud run skipped: input fingerprint unchanged");
                        let entries = snapshot_tx.subscribe().borrow().entries.clone();
                        let _ = update_tx.send(RunUpdate {
                            generation,
                            outcome: RunOutcome::Skipped,
                            entries,
                            duration_ms: 0,
                            failed_batches: 0,
                            error: None,
                        });
                        continue;
                    }

                    generation += 1;
                    let _ = latest_tx.send(generation);
                    snapshot_tx.send_modify(|snap| {
                        snap.state = RunState::Running;
                        snap.progress = PROGRESS_START;
                        snap.generation = generation;
                    });

                    let handle = tokio::spawn(run_cycle(
                        tokenizer.clone(),
                        records,
                        config.clone(),
                        generation,
                        latest_rx.clone(),
                        snapshot_tx.clone(),
                    ));
                    in_flight = Some(InFlightRun { generation, fingerprint, handle });
                },
                joined = async {
                    match in_flight.as_mut() {
                        Some(run) => (&mut run.handle).await,
                        None => std::future::pending().await,
                    }
                } => {
                    let finished = in_flight.take();
                    let superseded = finished
                        .as_ref()
                        .is_some_and(|run| *latest_rx.borrow() != run.generation);

                    match joined {
                        Ok(report) if superseded => {
                            info!(
                                "word cloud run {} superseded after {}ms; result discarded",
                                report.generation, report.duration_ms
                            );
                            // The discarded result leaves the published
                            // snapshot out of date, so the pending trigger
                            // must run even when its input matches the run
                            // that was just thrown away.
                            gate.reset();
                            let entries = snapshot_tx.subscribe().borrow().entries.clone();
                            let _ = update_tx.send(RunUpdate {
                                generation: report.generation,
                                outcome: RunOutcome::Superseded,
                                entries,
                                duration_ms: report.duration_ms,
                                failed_batches: report.failed_batches,
                                error: None,
                            });
                        }
                        Ok(report) => {
                            let entries = Arc::new(report.entries);
                            snapshot_tx.send_modify(|snap| {
                                snap.state = RunState::Idle;
                                snap.progress = PROGRESS_PUBLISHED;
                                snap.generation = report.generation;
                                snap.entries = entries.clone();
                                snap.last_error = None;
                            });
                            info!(
                                "word cloud run {} published {} entries in {}ms ({} failed batches)",
                                report.generation,
                                entries.len(),
                                report.duration_ms,
                                report.failed_batches
                            );
                            let _ = update_tx.send(RunUpdate {
                                generation: report.generation,
                                outcome: RunOutcome::Completed,
                                entries,
                                duration_ms: report.duration_ms,
                                failed_batches: report.failed_batches,
                                error: None,
                            });
                            schedule_progress_reset(
                                command_tx.clone(),
                                config.progress_reset_delay,
                                report.generation,
                            );
                        }
                        Err(join_err) => {
                            // Whole-pipeline failure: publish an empty result
                            // and a single aggregate notification.
                            error!("word cloud run aborted: {join_err}");
                            let run_generation = finished
                                .as_ref()
                                .map_or(generation, |run| run.generation);
                            let entries: Arc<Vec<FrequencyEntry>> = Arc::new(Vec::new());
                            snapshot_tx.send_modify(|snap| {
                                snap.state = RunState::Idle;
                                snap.progress = PROGRESS_START;
                                snap.generation = run_generation;
                                snap.entries = entries.clone();
                                snap.last_error = Some(FAILURE_NOTICE.to_string());
                            });
                            let _ = update_tx.send(RunUpdate {
                                generation: run_generation,
                                outcome: RunOutcome::Failed,
                                entries,
                                duration_ms: 0,
                                failed_batches: 0,
                                error: Some(FAILURE_NOTICE.to_string()),
                            });
                        }
                    }
                },
            }
        }
    });
}

fn schedule_progress_reset(
    command_tx: mpsc::Sender<ControllerCommand>,
    delay: Duration,
    generation: u64,
) {
    tokio::spawn(async move {
        time::sleep(delay).await;
        let _ = command_tx
            .send(ControllerCommand::ResetProgress { generation })
            .await;
    });
}

/// Executes one run: column selection, extraction, dispatch, aggregation,
/// top-k. Publication is the controller's job; this task only reports
/// progress into the shared snapshot (guarded by generation, monotonic).
async fn run_cycle(
    tokenizer: Arc<dyn Tokenizer>,
    records: Arc<Vec<Record>>,
    config: WordCloudConfig,
    generation: u64,
    latest_generation: watch::Receiver<u64>,
    snapshot_tx: watch::Sender<PipelineSnapshot>,
) -> RunReport {
    let started = Instant::now();
    let mut report_progress = |value: u8| {
        snapshot_tx.send_modify(|snap| {
            if snap.generation == generation && value > snap.progress {
                snap.progress = value;
            }
        });
    };

    let column = match &config.column_override {
        Some(column) => Some(column.clone()),
        None => {
            let sample_len = records.len().min(config.sample_size);
            select_column(&records[..sample_len])
        }
    };
    let Some(column) = column else {
        // No text-bearing field at all; a normal empty result, not an error.
        return RunReport {
            generation,
            entries: Vec::new(),
            failed_batches: 0,
            duration_ms: elapsed_ms(started),
        };
    };

    let texts = extract_bounded(&records, &column, &config);
    report_progress(PROGRESS_EXTRACTED);
    if texts.is_empty() {
        return RunReport {
            generation,
            entries: Vec::new(),
            failed_batches: 0,
            duration_ms: elapsed_ms(started),
        };
    }

    let dispatch = dispatch_batches(
        tokenizer.as_ref(),
        &texts,
        &config,
        generation,
        &latest_generation,
        &mut report_progress,
    )
    .await;
    if dispatch.cancelled {
        warn!("word cloud run {generation} cancelled mid-dispatch");
    }

    let frequencies = aggregate(&dispatch.batches, &config);
    report_progress(PROGRESS_AGGREGATED);
    let entries = select_top(&frequencies, config.min_count, config.top_k);

    RunReport {
        generation,
        entries,
        failed_batches: dispatch.failed_batches(),
        duration_ms: elapsed_ms(started),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
