/// Workflow state store
///
/// Owns the single live `WorkflowState` of a compare session and decides
/// every transition. Stages never touch the state directly: they report a
/// `Completion`, and the store answers with the next `Step` to run (or
/// `None` when the run is over).
///
/// Each run gets a `Ticket` carrying the store's generation. `reset()` bumps
/// the generation, so anything still in flight from an earlier run is
/// dropped when it finally completes.

use crate::error::{PickError, TransformError, WorkflowError};
use crate::state::data::{
    AnalysisResult, ComparableSet, EncodedPayload, RawImageHandle, SourceKind, Stage,
    WorkflowState,
};

/// Identifies one workflow instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Next stage to run
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Pick(SourceKind),
    Transform(RawImageHandle),
    Analyze(EncodedPayload),
    Lookup(AnalysisResult),
}

/// Output of a finished stage
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Picked(Result<RawImageHandle, PickError>),
    Transformed(Result<EncodedPayload, TransformError>),
    Analyzed(AnalysisResult),
    LookedUp(ComparableSet),
}

#[derive(Debug, Default)]
pub struct WorkflowStore {
    state: WorkflowState,
    generation: u64,
}

impl WorkflowStore {
    /// New store in `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    /// Start a run. Only allowed from `Idle` or `Failed`.
    pub fn select_source(&mut self, kind: SourceKind) -> Result<(Ticket, Step), WorkflowError> {
        if !self.state.accepts_selection() {
            tracing::debug!(state = self.state.name(), "rejecting source selection");
            return Err(WorkflowError::Busy {
                state: self.state.name(),
            });
        }

        self.generation += 1;
        self.transition(WorkflowState::Picking);
        Ok((Ticket(self.generation), Step::Pick(kind)))
    }

    /// Apply a stage completion and return the next step, if any.
    ///
    /// Completions from a superseded run are dropped silently.
    pub fn apply(&mut self, ticket: Ticket, completion: Completion) -> Option<Step> {
        if ticket.0 != self.generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.generation,
                "dropping stale completion"
            );
            return None;
        }

        let current = std::mem::take(&mut self.state);
        let (next_state, step) = match (current, completion) {
            (WorkflowState::Picking, Completion::Picked(Ok(handle))) => (
                WorkflowState::Transforming(handle.clone()),
                Some(Step::Transform(handle)),
            ),
            // Cancelling is not an error
            (WorkflowState::Picking, Completion::Picked(Err(PickError::UserCancelled))) => {
                (WorkflowState::Idle, None)
            }
            (WorkflowState::Picking, Completion::Picked(Err(error))) => {
                (failed(Stage::Picking, error.to_string()), None)
            }
            (WorkflowState::Transforming(_), Completion::Transformed(Ok(payload))) => (
                WorkflowState::Analyzing(payload.clone()),
                Some(Step::Analyze(payload)),
            ),
            (WorkflowState::Transforming(_), Completion::Transformed(Err(error))) => {
                (failed(Stage::Transforming, error.to_string()), None)
            }
            (WorkflowState::Analyzing(_), Completion::Analyzed(result)) => (
                WorkflowState::LookingUp(result.clone()),
                Some(Step::Lookup(result)),
            ),
            (WorkflowState::LookingUp(result), Completion::LookedUp(set)) => {
                (WorkflowState::Ready(result, set), None)
            }
            (current, completion) => {
                tracing::warn!(
                    state = current.name(),
                    ?completion,
                    "completion does not match the current state"
                );
                self.state = current;
                return None;
            }
        };

        self.transition(next_state);
        step
    }

    /// Back to `Idle` from anywhere; in-flight results become stale
    pub fn reset(&mut self) {
        if self.state.is_busy() {
            tracing::info!(state = self.state.name(), "abandoning in-flight run");
        }
        self.generation += 1;
        self.transition(WorkflowState::Idle);
    }

    fn transition(&mut self, next: WorkflowState) {
        tracing::info!(from = self.state.name(), to = next.name(), "workflow transition");
        self.state = next;
    }
}

fn failed(stage: Stage, message: String) -> WorkflowState {
    WorkflowState::Failed { stage, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boats::lookup::fallback_set;
    use crate::state::data::{PayloadFormat, Provenance};

    fn handle() -> RawImageHandle {
        RawImageHandle::new("/photos/boat.jpg")
    }

    fn payload() -> EncodedPayload {
        EncodedPayload {
            bytes: vec![1, 2, 3],
            width: 800,
            height: 600,
            format: PayloadFormat::Jpeg,
            quality_factor: 0.7,
            source_len: 1000,
        }
    }

    fn analysis() -> AnalysisResult {
        AnalysisResult {
            category: "Yacht".to_string(),
            confidence: 0.85,
            attributes: vec!["White hull".to_string()],
            provenance: Provenance::Real,
        }
    }

    /// Store advanced to `Transforming`
    fn transforming() -> (WorkflowStore, Ticket) {
        let mut store = WorkflowStore::new();
        let (ticket, _) = store.select_source(SourceKind::Library).unwrap();
        store.apply(ticket, Completion::Picked(Ok(handle())));
        (store, ticket)
    }

    #[test]
    fn test_full_run_ends_ready() {
        let mut store = WorkflowStore::new();
        assert_eq!(store.state(), &WorkflowState::Idle);

        let (ticket, step) = store.select_source(SourceKind::Library).unwrap();
        assert_eq!(step, Step::Pick(SourceKind::Library));
        assert_eq!(store.state(), &WorkflowState::Picking);

        let step = store.apply(ticket, Completion::Picked(Ok(handle())));
        assert_eq!(step, Some(Step::Transform(handle())));

        let step = store.apply(ticket, Completion::Transformed(Ok(payload())));
        assert_eq!(step, Some(Step::Analyze(payload())));
        assert_eq!(store.state(), &WorkflowState::Analyzing(payload()));

        let step = store.apply(ticket, Completion::Analyzed(analysis()));
        assert_eq!(step, Some(Step::Lookup(analysis())));

        let step = store.apply(ticket, Completion::LookedUp(fallback_set()));
        assert_eq!(step, None);
        assert_eq!(store.state(), &WorkflowState::Ready(analysis(), fallback_set()));
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut store = WorkflowStore::new();
        let (ticket, _) = store.select_source(SourceKind::Library).unwrap();

        let step = store.apply(ticket, Completion::Picked(Err(PickError::UserCancelled)));

        assert_eq!(step, None);
        assert_eq!(store.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_pick_error_fails_picking() {
        let mut store = WorkflowStore::new();
        let (ticket, _) = store.select_source(SourceKind::Camera).unwrap();

        store.apply(ticket, Completion::Picked(Err(PickError::PermissionDenied)));

        assert!(matches!(
            store.state(),
            WorkflowState::Failed { stage: Stage::Picking, .. }
        ));
    }

    #[test]
    fn test_transform_error_fails_transforming() {
        let (mut store, ticket) = transforming();

        store.apply(
            ticket,
            Completion::Transformed(Err(TransformError::UnsupportedFormat("text".into()))),
        );

        match store.state() {
            WorkflowState::Failed { stage, message } => {
                assert_eq!(*stage, Stage::Transforming);
                assert!(message.contains("Unsupported"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_select_rejected_while_transforming() {
        let (mut store, ticket) = transforming();

        let err = store.select_source(SourceKind::Library).unwrap_err();
        assert_eq!(err, WorkflowError::Busy { state: "transforming" });

        // The in-flight transform still lands
        assert_eq!(store.state(), &WorkflowState::Transforming(handle()));
        let step = store.apply(ticket, Completion::Transformed(Ok(payload())));
        assert_eq!(step, Some(Step::Analyze(payload())));
    }

    #[test]
    fn test_select_allowed_after_failure() {
        let mut store = WorkflowStore::new();
        let (first, _) = store.select_source(SourceKind::Camera).unwrap();
        store.apply(first, Completion::Picked(Err(PickError::DeviceUnavailable)));

        let (second, step) = store.select_source(SourceKind::Library).unwrap();

        assert_ne!(first, second);
        assert_eq!(step, Step::Pick(SourceKind::Library));
        assert_eq!(store.state(), &WorkflowState::Picking);
    }

    #[test]
    fn test_stale_analysis_after_reset_is_dropped() {
        let (mut store, ticket) = transforming();
        store.apply(ticket, Completion::Transformed(Ok(payload())));
        assert!(matches!(store.state(), WorkflowState::Analyzing(_)));

        store.reset();
        let step = store.apply(ticket, Completion::Analyzed(analysis()));

        assert_eq!(step, None);
        assert_eq!(store.state(), &WorkflowState::Idle);
    }

    #[test]
    fn test_stale_result_does_not_touch_new_run() {
        let (mut store, old) = transforming();
        store.reset();
        let (new, _) = store.select_source(SourceKind::Library).unwrap();

        // Old run's transform finishes while the new run is picking
        let step = store.apply(old, Completion::Transformed(Ok(payload())));

        assert_eq!(step, None);
        assert_eq!(store.state(), &WorkflowState::Picking);
        assert_eq!(
            store.apply(new, Completion::Picked(Ok(handle()))),
            Some(Step::Transform(handle()))
        );
    }

    #[test]
    fn test_mismatched_completion_is_ignored() {
        let mut store = WorkflowStore::new();
        let (ticket, _) = store.select_source(SourceKind::Library).unwrap();

        let step = store.apply(ticket, Completion::Analyzed(analysis()));

        assert_eq!(step, None);
        assert_eq!(store.state(), &WorkflowState::Picking);
    }

    #[test]
    fn test_failed_is_terminal_until_reset() {
        let mut store = WorkflowStore::new();
        let (ticket, _) = store.select_source(SourceKind::Library).unwrap();
        store.apply(ticket, Completion::Picked(Err(PickError::PermissionDenied)));

        assert_eq!(store.apply(ticket, Completion::Picked(Ok(handle()))), None);
        assert!(matches!(store.state(), WorkflowState::Failed { .. }));

        store.reset();
        assert_eq!(store.state(), &WorkflowState::Idle);
    }
}
