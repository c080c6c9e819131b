use super::event::{ProgressReporter, UploadEvent, UploadOutcome, UploadState};
use super::job::UploadJob;
use super::monitor::JobRecord;
use super::pipeline::UploadPipeline;
use crate::error::{AutoGitError, Result};
use log::{debug, error};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::{self, JoinHandle};

/// A running upload: the event stream plus the worker's join handle.
pub struct UploadHandle {
    events: UnboundedReceiver<UploadEvent>,
    task: JoinHandle<UploadOutcome>,
}

/// Starts the job on a blocking worker thread.
///
/// The pipeline is built by `factory` on that thread, so clients that own
/// their own runtime (the blocking HTTP client) are created and dropped
/// outside the async executor. Must be called from within a tokio runtime.
pub fn spawn_upload<F>(job: UploadJob, factory: F) -> UploadHandle
where
    F: FnOnce() -> Result<UploadPipeline> + Send + 'static,
{
    let (sender, events) = mpsc::unbounded_channel();
    let reporter = ProgressReporter::new(sender);

    let task = task::spawn_blocking(move || match factory() {
        Ok(pipeline) => pipeline.run(&job, &reporter),
        Err(e) => {
            error!("Could not prepare upload: {}", e);
            reporter.status(format!("Error: {}", e));
            reporter.state(UploadState::Failed);
            let outcome = UploadOutcome::failed(&e);
            reporter.finish(outcome.clone());
            outcome
        }
    });

    UploadHandle { events, task }
}

impl UploadHandle {
    /// Drains events until the worker hangs up, handing each one to
    /// `on_event` before folding it into the returned record.
    pub async fn run_to_completion<C>(mut self, mut on_event: C) -> Result<JobRecord>
    where
        C: FnMut(&UploadEvent),
    {
        let mut record = JobRecord::new();

        while let Some(event) = self.events.recv().await {
            on_event(&event);
            record.apply(event);
        }

        let outcome = self.task.await.map_err(|e| AutoGitError::Worker {
            message: e.to_string(),
        })?;
        debug!("Upload worker joined");

        if record.outcome.is_none() {
            record.outcome = Some(outcome);
        }

        Ok(record)
    }
}
