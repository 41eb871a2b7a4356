use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    events::{SelectionId, SubmissionId, WorkflowEvent},
    file_selection::{FileSelectionHandler, ImageFile, ImageReader, SelectedImage},
    prediction::{PredictionResult, Predictor, SubmissionError},
    view::WorkflowView,
    NO_IMAGE_SELECTED_MESSAGE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowPhase {
    Idle,
    ReadyToSubmit,
    Submitting,
    Succeeded(PredictionResult),
    Failed(String),
}

impl WorkflowPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ReadyToSubmit => "ready_to_submit",
            Self::Submitting => "submitting",
            Self::Succeeded(_) => "succeeded",
            Self::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// One prediction request is now in flight.
    Started(SubmissionId),
    /// No image was selected; the phase is now `Failed`.
    Rejected,
    /// A request is already in flight; nothing changed.
    Busy,
}

/// Drives the upload / preview / predict state machine.
///
/// All mutation happens through `&mut self` on one task. Reads and
/// predictions run as spawned tasks whose results come back as
/// [`WorkflowEvent`]s, applied by [`WorkflowController::apply`].
pub struct WorkflowController {
    phase: WorkflowPhase,
    image: Option<SelectedImage>,
    selection: FileSelectionHandler,
    predictor: Arc<dyn Predictor>,
    events_tx: UnboundedSender<WorkflowEvent>,
    events_rx: UnboundedReceiver<WorkflowEvent>,
    last_selection: u64,
    pending_read: Option<SelectionId>,
    last_submission: u64,
    in_flight: Option<SubmissionId>,
}

impl WorkflowController {
    pub fn new(reader: Arc<dyn ImageReader>, predictor: Arc<dyn Predictor>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            phase: WorkflowPhase::Idle,
            image: None,
            selection: FileSelectionHandler::new(reader, events_tx.clone()),
            predictor,
            events_tx,
            events_rx,
            last_selection: 0,
            pending_read: None,
            last_submission: 0,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> &WorkflowPhase {
        &self.phase
    }

    pub fn selected_image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    /// Submit stays disabled until an in-flight request resolves, even when a
    /// newer selection has already moved the phase back to `ReadyToSubmit`.
    pub fn view(&self) -> WorkflowView {
        let mut view = WorkflowView::project(&self.phase, self.image.as_ref());
        if self.in_flight.is_some() {
            view.submit_enabled = false;
        }
        view
    }

    pub fn has_pending_work(&self) -> bool {
        self.pending_read.is_some() || self.in_flight.is_some()
    }

    /// Starts reading `file` without waiting for it. Any read still pending
    /// from an earlier selection is superseded.
    pub fn select_file(&mut self, file: ImageFile) -> SelectionId {
        self.last_selection += 1;
        let selection = SelectionId(self.last_selection);
        if let Some(previous) = self.pending_read.replace(selection) {
            debug!(
                superseded = previous.0,
                selection = selection.0,
                "superseding pending image read"
            );
        }
        // The read task reports through the event channel; its handle is not needed.
        drop(self.selection.select(selection, file));
        selection
    }

    pub fn submit(&mut self) -> SubmitOutcome {
        if let Some(submission) = self.in_flight {
            debug!(
                submission = submission.0,
                "submit ignored while a prediction is in flight"
            );
            return SubmitOutcome::Busy;
        }

        let Some(image) = self.image.clone() else {
            info!("submit requested without a selected image");
            self.transition(WorkflowPhase::Failed(NO_IMAGE_SELECTED_MESSAGE.to_string()));
            return SubmitOutcome::Rejected;
        };

        if matches!(
            self.phase,
            WorkflowPhase::Succeeded(_) | WorkflowPhase::Failed(_)
        ) {
            self.transition(WorkflowPhase::ReadyToSubmit);
        }
        debug_assert_eq!(self.phase, WorkflowPhase::ReadyToSubmit);

        self.last_submission += 1;
        let submission = SubmissionId(self.last_submission);
        self.in_flight = Some(submission);
        self.transition(WorkflowPhase::Submitting);

        let predictor = Arc::clone(&self.predictor);
        let events = self.events_tx.clone();
        let request = tokio::spawn(async move { predictor.predict(&image).await });
        tokio::spawn(async move {
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(submission = submission.0, %err, "prediction task aborted");
                    Err(SubmissionError::unreachable())
                }
            };
            let event = WorkflowEvent::PredictionResolved {
                submission,
                outcome,
            };
            if events.send(event).is_err() {
                debug!(submission = submission.0, "workflow dropped before prediction resolved");
            }
        });

        SubmitOutcome::Started(submission)
    }

    /// Waits for the next completion and applies it. Returns `None` when
    /// nothing is pending.
    pub async fn next_event(&mut self) -> Option<&WorkflowPhase> {
        if !self.has_pending_work() {
            return None;
        }
        let event = self.events_rx.recv().await?;
        self.apply(event);
        Some(&self.phase)
    }

    /// Applies completions until no read or prediction is outstanding.
    pub async fn settle(&mut self) -> &WorkflowPhase {
        while self.next_event().await.is_some() {}
        &self.phase
    }

    pub fn apply(&mut self, event: WorkflowEvent) {
        debug!(event = event.name(), phase = self.phase.name(), "applying workflow event");
        match event {
            WorkflowEvent::ReadCompleted { selection, image } => {
                if self.pending_read != Some(selection) {
                    debug!(selection = selection.0, "discarding stale image read");
                    return;
                }
                self.pending_read = None;
                self.image = Some(image);
                self.transition(WorkflowPhase::ReadyToSubmit);
            }
            WorkflowEvent::ReadFailed { selection, reason } => {
                if self.pending_read != Some(selection) {
                    return;
                }
                self.pending_read = None;
                warn!(selection = selection.0, %reason, "image read failed; keeping previous state");
            }
            WorkflowEvent::PredictionResolved {
                submission,
                outcome,
            } => {
                if self.in_flight != Some(submission) {
                    debug!(submission = submission.0, "discarding unknown prediction");
                    return;
                }
                self.in_flight = None;
                if self.phase != WorkflowPhase::Submitting {
                    debug!(
                        submission = submission.0,
                        phase = self.phase.name(),
                        "prediction superseded by a newer selection"
                    );
                    return;
                }
                match outcome {
                    Ok(result) => self.transition(WorkflowPhase::Succeeded(result)),
                    Err(err) => self.transition(WorkflowPhase::Failed(err.user_message)),
                }
            }
        }
    }

    fn transition(&mut self, next: WorkflowPhase) {
        debug!(from = self.phase.name(), to = next.name(), "workflow transition");
        self.phase = next;
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
