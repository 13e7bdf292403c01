use std::sync::Arc;

use folio_types::{CostBreakdown, Phase, SelectedDocument, StreamEvent, TimingBreakdown};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub const DEFAULT_TOTAL_STEPS: u32 = 3;

/// Answer text shown in place of a partial answer after a failure
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Sorry, I encountered an error while processing your question. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamState {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl StreamState {
    pub fn is_sealed(&self) -> bool {
        matches!(self, StreamState::Succeeded | StreamState::Failed)
    }
}

/// Step indicator shown while the answer is being produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepProgress {
    pub status: String,
    pub step: u32,
    pub total: u32,
    pub step_cost: Option<f64>,
    pub step_time: Option<f64>,
}

impl StepProgress {
    /// Cost/time of the last finished step; zero is a real value and is shown
    pub fn stats_line(&self) -> Option<String> {
        match (self.step_cost, self.step_time) {
            (None, None) => None,
            (Some(cost), None) => Some(format!("${:.4}", cost)),
            (None, Some(time)) => Some(format!("{:.2}s", time)),
            (Some(cost), Some(time)) => Some(format!("${:.4} · {:.2}s", cost, time)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerMetadata {
    pub selected_documents: Vec<SelectedDocument>,
    pub relevant_pages_count: u32,
    pub timing: Option<TimingBreakdown>,
    pub costs: Option<CostBreakdown>,
    pub model: Option<String>,
}

/// Self-consistent view of one streamed exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Incremented on every applied event
    pub version: u64,
    pub state: StreamState,
    /// Cleared once the exchange is sealed
    pub progress: Option<StepProgress>,
    pub content: String,
    pub metadata: AnswerMetadata,
    pub error: Option<String>,
}

impl ProgressSnapshot {
    pub fn initial(total_steps: u32) -> Self {
        Self {
            version: 0,
            state: StreamState::Pending,
            progress: Some(StepProgress {
                status: "Starting...".to_string(),
                step: 0,
                total: total_steps,
                step_cost: None,
                step_time: None,
            }),
            content: String::new(),
            metadata: AnswerMetadata::default(),
            error: None,
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.state.is_sealed()
    }

    pub fn is_streaming(&self) -> bool {
        !self.is_sealed()
    }
}

/// How a finished exchange changes the session-level cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CostUpdate {
    /// Backend reported the running session total
    Replace(f64),
    /// Backend reported only this exchange's cost
    Add(f64),
}

/// Result of folding one event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fold {
    Applied,
    /// Sealed already, or nothing to apply
    Ignored,
    Completed(Option<CostUpdate>),
    Failed,
}

impl Fold {
    pub fn changed(&self) -> bool {
        !matches!(self, Fold::Ignored)
    }
}

/// Running cost of a chat session across exchanges
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionCost {
    pub total: f64,
}

impl SessionCost {
    pub fn apply(&mut self, update: CostUpdate) {
        match update {
            CostUpdate::Replace(total) => self.total = total,
            CostUpdate::Add(cost) => self.total += cost,
        }
    }
}

/// Folds the events of one exchange into a [`ProgressSnapshot`].
///
/// Every applied event produces a fresh snapshot that replaces the previous
/// one wholesale; readers holding an `Arc` to an older snapshot keep seeing
/// it unchanged. Once sealed by `complete` or `error`, further events are
/// ignored.
pub struct ProgressAccumulator {
    model: String,
    current: Arc<ProgressSnapshot>,
    publisher: watch::Sender<Arc<ProgressSnapshot>>,
}

impl ProgressAccumulator {
    /// `model` is the model the request was sent with
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_total_steps(model, DEFAULT_TOTAL_STEPS)
    }

    pub fn with_total_steps(model: impl Into<String>, total_steps: u32) -> Self {
        let current = Arc::new(ProgressSnapshot::initial(total_steps));
        let (publisher, _) = watch::channel(Arc::clone(&current));

        Self {
            model: model.into(),
            current,
            publisher,
        }
    }

    pub fn snapshot(&self) -> Arc<ProgressSnapshot> {
        Arc::clone(&self.current)
    }

    /// Receiver that observes every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<ProgressSnapshot>> {
        self.publisher.subscribe()
    }

    pub fn is_sealed(&self) -> bool {
        self.current.is_sealed()
    }

    pub fn fold(&mut self, event: StreamEvent) -> Fold {
        if self.current.is_sealed() {
            debug!("Ignoring {} event after the exchange was sealed", event.kind());
            return Fold::Ignored;
        }

        let mut next = (*self.current).clone();

        let fold = match event {
            StreamEvent::Status { message, step_number, total_steps, .. } => {
                let previous = next.progress.as_ref();
                let current_step = previous.map(|p| p.step).unwrap_or(0);
                let step = if step_number < current_step {
                    warn!(
                        "Status step went backwards ({} -> {}), keeping {}",
                        current_step, step_number, current_step
                    );
                    current_step
                } else {
                    step_number
                };
                let total = if total_steps > 0 {
                    total_steps
                } else {
                    previous.map(|p| p.total).unwrap_or(DEFAULT_TOTAL_STEPS)
                };

                next.progress = Some(StepProgress {
                    status: message,
                    step,
                    total,
                    step_cost: None,
                    step_time: None,
                });
                next.state = StreamState::InProgress;
                Fold::Applied
            }

            StreamEvent::StepComplete {
                step,
                cost,
                time_taken,
                selected_documents,
                relevant_pages_count,
            } => {
                if let Some(progress) = next.progress.as_mut() {
                    progress.step_cost = cost;
                    progress.step_time = time_taken;
                }

                match Phase::from_step(&step) {
                    Some(Phase::DocumentSelection) => {
                        if let Some(selected) = selected_documents {
                            next.metadata.selected_documents = selected;
                        }
                    }
                    Some(Phase::PageSelection) => {
                        if let Some(count) = relevant_pages_count {
                            next.metadata.relevant_pages_count = count;
                        }
                    }
                    _ => {}
                }
                Fold::Applied
            }

            StreamEvent::Content { content } => {
                next.content.push_str(&content);
                next.state = StreamState::InProgress;
                Fold::Applied
            }

            StreamEvent::Complete {
                timing_breakdown,
                cost_breakdown,
                model,
                session_cost,
            } => {
                let cost = session_cost.map(CostUpdate::Replace).or_else(|| {
                    cost_breakdown
                        .as_ref()
                        .and_then(|c| c.total_cost)
                        .map(CostUpdate::Add)
                });

                next.metadata.timing = timing_breakdown;
                next.metadata.costs = cost_breakdown;
                next.metadata.model = Some(model.unwrap_or_else(|| self.model.clone()));
                next.progress = None;
                next.state = StreamState::Succeeded;

                info!(chars = next.content.len(), "Answer complete");
                Fold::Completed(cost)
            }

            StreamEvent::Error { error } => {
                warn!("Backend reported an error: {}", error);
                seal_failed(&mut next, error);
                Fold::Failed
            }

            StreamEvent::Unknown => Fold::Ignored,
        };

        if fold.changed() {
            self.publish(next);
        }
        fold
    }

    /// Seal as failed because the transport gave up
    pub fn fail(&mut self, reason: impl Into<String>) -> Fold {
        if self.current.is_sealed() {
            return Fold::Ignored;
        }

        let mut next = (*self.current).clone();
        seal_failed(&mut next, reason.into());
        self.publish(next);
        Fold::Failed
    }

    /// The body ended; seal as failed unless a terminal event already arrived
    pub fn finish(&mut self) -> Fold {
        if self.current.is_sealed() {
            return Fold::Ignored;
        }
        warn!("Stream ended without a terminal event");
        self.fail("Stream ended before the answer was complete")
    }

    fn publish(&mut self, mut next: ProgressSnapshot) {
        next.version = self.current.version + 1;
        self.current = Arc::new(next);
        self.publisher.send_replace(Arc::clone(&self.current));
    }
}

fn seal_failed(snapshot: &mut ProgressSnapshot, reason: String) {
    snapshot.error = Some(reason);
    snapshot.content = GENERIC_FAILURE_MESSAGE.to_string();
    snapshot.progress = None;
    snapshot.state = StreamState::Failed;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(message: &str, step: u32) -> StreamEvent {
        StreamEvent::Status {
            step: None,
            message: message.to_string(),
            step_number: step,
            total_steps: 3,
        }
    }

    fn content(text: &str) -> StreamEvent {
        StreamEvent::Content { content: text.to_string() }
    }

    fn complete(total_cost: Option<f64>, session_cost: Option<f64>) -> StreamEvent {
        StreamEvent::Complete {
            timing_breakdown: Some(TimingBreakdown {
                total_time: Some(4.2),
                ..Default::default()
            }),
            cost_breakdown: Some(CostBreakdown {
                total_cost,
                ..Default::default()
            }),
            model: None,
            session_cost,
        }
    }

    #[test]
    fn test_initial_snapshot() {
        let acc = ProgressAccumulator::new("gpt-5-mini");
        let snapshot = acc.snapshot();

        assert_eq!(snapshot.state, StreamState::Pending);
        assert_eq!(snapshot.version, 0);
        let progress = snapshot.progress.as_ref().unwrap();
        assert_eq!(progress.status, "Starting...");
        assert_eq!(progress.step, 0);
        assert_eq!(progress.total, 3);
    }

    #[test]
    fn test_content_accumulates() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("Hello"));
        acc.fold(content(" world"));

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.content, "Hello world");
        assert_eq!(snapshot.state, StreamState::InProgress);
        assert_eq!(snapshot.version, 2);
    }

    #[test]
    fn test_status_leaves_content_alone() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("partial"));
        acc.fold(status("Generating comprehensive answer...", 3));

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.content, "partial");
        assert_eq!(snapshot.progress.as_ref().unwrap().step, 3);
    }

    #[test]
    fn test_content_leaves_step_counters_alone() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(status("Finding relevant pages...", 2));
        let before = acc.snapshot().progress.clone();

        acc.fold(content("text"));
        assert_eq!(acc.snapshot().progress, before);
    }

    #[test]
    fn test_step_never_goes_backwards() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(status("two", 2));
        acc.fold(status("one again", 1));

        let snapshot = acc.snapshot();
        let progress = snapshot.progress.as_ref().unwrap();
        assert_eq!(progress.step, 2);
        assert_eq!(progress.status, "one again");
    }

    #[test]
    fn test_step_complete_merges_phase_results() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(status("Finding relevant documents...", 1));
        acc.fold(StreamEvent::StepComplete {
            step: "document_selection".to_string(),
            cost: Some(0.0),
            time_taken: Some(1.25),
            selected_documents: Some(vec![SelectedDocument {
                id: 3,
                filename: "c.pdf".to_string(),
            }]),
            relevant_pages_count: None,
        });
        acc.fold(StreamEvent::StepComplete {
            step: "page_selection".to_string(),
            cost: Some(0.002),
            time_taken: Some(0.5),
            selected_documents: None,
            relevant_pages_count: Some(7),
        });

        let snapshot = acc.snapshot();
        assert_eq!(snapshot.metadata.selected_documents[0].filename, "c.pdf");
        assert_eq!(snapshot.metadata.relevant_pages_count, 7);
        let progress = snapshot.progress.as_ref().unwrap();
        assert_eq!(progress.step_cost, Some(0.002));
        assert_eq!(progress.step_time, Some(0.5));
    }

    #[test]
    fn test_zero_cost_step_is_displayed() {
        let progress = StepProgress {
            status: "done".to_string(),
            step: 1,
            total: 3,
            step_cost: Some(0.0),
            step_time: Some(0.0),
        };
        assert_eq!(progress.stats_line().as_deref(), Some("$0.0000 · 0.00s"));
    }

    #[test]
    fn test_complete_seals_and_reports_cost() {
        let mut acc = ProgressAccumulator::new("gpt-5-mini");
        acc.fold(content("Answer"));
        let fold = acc.fold(complete(Some(0.03), None));

        assert_eq!(fold, Fold::Completed(Some(CostUpdate::Add(0.03))));
        let snapshot = acc.snapshot();
        assert_eq!(snapshot.state, StreamState::Succeeded);
        assert!(snapshot.progress.is_none());
        assert_eq!(snapshot.metadata.model.as_deref(), Some("gpt-5-mini"));
        assert_eq!(snapshot.metadata.timing.as_ref().unwrap().total_time, Some(4.2));
    }

    #[test]
    fn test_session_total_replaces() {
        let mut acc = ProgressAccumulator::new("m");
        let fold = acc.fold(complete(Some(0.03), Some(1.5)));
        assert_eq!(fold, Fold::Completed(Some(CostUpdate::Replace(1.5))));

        let mut session = SessionCost { total: 0.4 };
        session.apply(CostUpdate::Replace(1.5));
        assert_eq!(session.total, 1.5);
        session.apply(CostUpdate::Add(0.5));
        assert_eq!(session.total, 2.0);
    }

    #[test]
    fn test_nothing_changes_after_complete() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("Done."));
        acc.fold(complete(None, None));
        let sealed = acc.snapshot();

        assert_eq!(acc.fold(content(" more")), Fold::Ignored);
        assert_eq!(acc.fold(status("again", 3)), Fold::Ignored);
        assert_eq!(acc.fold(StreamEvent::Error { error: "late".to_string() }), Fold::Ignored);
        assert_eq!(acc.fold(complete(Some(9.0), None)), Fold::Ignored);
        assert_eq!(acc.fail("transport"), Fold::Ignored);
        assert_eq!(acc.finish(), Fold::Ignored);

        assert_eq!(acc.snapshot(), sealed);
    }

    #[test]
    fn test_error_seals_with_generic_message() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("half an ans"));
        let fold = acc.fold(StreamEvent::Error { error: "LLM timeout".to_string() });

        assert_eq!(fold, Fold::Failed);
        let snapshot = acc.snapshot();
        assert_eq!(snapshot.state, StreamState::Failed);
        assert_eq!(snapshot.content, GENERIC_FAILURE_MESSAGE);
        assert_eq!(snapshot.error.as_deref(), Some("LLM timeout"));
        assert!(snapshot.progress.is_none());

        assert_eq!(acc.fold(content("x")), Fold::Ignored);
        assert_eq!(acc.snapshot(), snapshot);
    }

    #[test]
    fn test_unknown_event_changes_nothing() {
        let mut acc = ProgressAccumulator::new("m");
        assert_eq!(acc.fold(StreamEvent::Unknown), Fold::Ignored);
        assert_eq!(acc.snapshot().version, 0);
    }

    #[test]
    fn test_finish_without_terminal_event() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("partial"));
        assert_eq!(acc.finish(), Fold::Failed);
        assert!(acc.is_sealed());
        assert!(acc.snapshot().error.is_some());
    }

    #[test]
    fn test_old_snapshots_are_not_mutated() {
        let mut acc = ProgressAccumulator::new("m");
        acc.fold(content("a"));
        let held = acc.snapshot();

        acc.fold(content("b"));
        assert_eq!(held.content, "a");
        assert_eq!(acc.snapshot().content, "ab");
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_snapshot() {
        let mut acc = ProgressAccumulator::new("m");
        let mut rx = acc.subscribe();

        acc.fold(content("x"));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().content, "x");
    }
}
