/// Headless driver for one compare session
///
/// Runs the pipeline step by step against a `WorkflowStore` and publishes
/// every state change on a watch channel. Observers read snapshots; only
/// the session mutates the store.

use tokio::sync::{watch, Mutex};

use crate::error::WorkflowError;
use crate::state::data::{SourceKind, WorkflowState};
use crate::state::pipeline::Pipeline;
use crate::state::workflow::WorkflowStore;

pub struct Session {
    store: Mutex<WorkflowStore>,
    pipeline: Pipeline,
    snapshots: watch::Sender<WorkflowState>,
}

impl Session {
    pub fn new(pipeline: Pipeline) -> Self {
        let (snapshots, _) = watch::channel(WorkflowState::Idle);
        Self {
            store: Mutex::new(WorkflowStore::new()),
            pipeline,
            snapshots,
        }
    }

    /// Run a full pick → transform → analyze → lookup sequence.
    ///
    /// Returns the session state once this run stops advancing: `Ready`,
    /// `Failed`, `Idle` after a cancel, or whatever a `reset()` left behind.
    pub async fn select_source(&self, kind: SourceKind) -> Result<WorkflowState, WorkflowError> {
        let (ticket, mut step) = {
            let mut store = self.store.lock().await;
            let started = store.select_source(kind)?;
            self.publish(&store);
            started
        };

        // The lock is never held while a stage runs
        loop {
            let completion = self.pipeline.execute(step).await;

            let mut store = self.store.lock().await;
            let next = store.apply(ticket, completion);
            self.publish(&store);

            match next {
                Some(next) => step = next,
                None => break,
            }
        }

        Ok(self.snapshot())
    }

    /// Abandon the current run
    pub async fn reset(&self) {
        let mut store = self.store.lock().await;
        store.reset();
        self.publish(&store);
    }

    /// Current state
    pub fn snapshot(&self) -> WorkflowState {
        self.snapshots.borrow().clone()
    }

    /// Receiver that sees every published state
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.snapshots.subscribe()
    }

    fn publish(&self, store: &WorkflowStore) {
        self.snapshots.send_if_modified(|current| {
            if current == store.state() {
                return false;
            }
            *current = store.state().clone();
            true
        });
    }
}
