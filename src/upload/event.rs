use crate::error::{AutoGitError, ErrorCategory};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    Idle,
    Extracting,
    Initializing,
    Staging,
    Committing,
    CreatingRemote,
    Pushing,
    CleaningUp,
    Succeeded,
    Failed,
}

impl UploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadState::Succeeded | UploadState::Failed)
    }
}

impl fmt::Display for UploadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadState::Idle => "idle",
            UploadState::Extracting => "extracting",
            UploadState::Initializing => "initializing",
            UploadState::Staging => "staging",
            UploadState::Committing => "committing",
            UploadState::CreatingRemote => "creating remote",
            UploadState::Pushing => "pushing",
            UploadState::CleaningUp => "cleaning up",
            UploadState::Succeeded => "succeeded",
            UploadState::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UploadOutcome {
    Succeeded {
        url: String,
        message: String,
    },
    Failed {
        message: String,
        category: ErrorCategory,
    },
}

impl UploadOutcome {
    pub fn succeeded(url: String) -> Self {
        UploadOutcome::Succeeded {
            message: format!("Successfully uploaded to {}", url),
            url,
        }
    }

    pub fn failed(error: &AutoGitError) -> Self {
        UploadOutcome::Failed {
            message: error.to_string(),
            category: error.category(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Succeeded { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            UploadOutcome::Succeeded { message, .. } | UploadOutcome::Failed { message, .. } => {
                message
            }
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            UploadOutcome::Succeeded { .. } => 0,
            UploadOutcome::Failed { category, .. } => category.exit_code(),
        }
    }
}

/// One notification from the worker to the interactive surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    State(UploadState),
    Progress(u8),
    Status(String),
    WorkingDirectory(PathBuf),
    Finished(UploadOutcome),
}

/// Sending half of the event channel, owned by the worker.
///
/// Sends never fail the job: if the receiver is gone the events are dropped.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    sender: UnboundedSender<UploadEvent>,
}

impl ProgressReporter {
    pub fn new(sender: UnboundedSender<UploadEvent>) -> Self {
        Self { sender }
    }

    pub fn state(&self, state: UploadState) {
        self.send(UploadEvent::State(state));
    }

    pub fn progress(&self, percent: u8) {
        self.send(UploadEvent::Progress(percent.min(100)));
    }

    pub fn status<S: Into<String>>(&self, message: S) {
        self.send(UploadEvent::Status(message.into()));
    }

    pub fn working_directory(&self, path: PathBuf) {
        self.send(UploadEvent::WorkingDirectory(path));
    }

    pub fn finish(&self, outcome: UploadOutcome) {
        self.send(UploadEvent::Finished(outcome));
    }

    fn send(&self, event: UploadEvent) {
        if self.sender.send(event).is_err() {
            debug!("Upload event dropped, receiver closed");
        }
    }
}
