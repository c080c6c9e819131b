use super::event::{UploadEvent, UploadOutcome, UploadState};
use serde::Serialize;
use std::path::PathBuf;

/// Everything the surface knows about a job, folded from its events.
#[derive(Debug, Clone, Serialize)]
pub struct JobRecord {
    pub state: UploadState,
    pub states: Vec<UploadState>,
    pub progress: u8,
    pub progress_history: Vec<u8>,
    pub log: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub outcome: Option<UploadOutcome>,
}

impl Default for JobRecord {
    fn default() -> Self {
        Self {
            state: UploadState::Idle,
            states: Vec::new(),
            progress: 0,
            progress_history: Vec::new(),
            log: Vec::new(),
            workdir: None,
            outcome: None,
        }
    }
}

impl JobRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: UploadEvent) {
        match event {
            UploadEvent::State(state) => {
                self.state = state;
                self.states.push(state);
            }
            UploadEvent::Progress(percent) => {
                self.progress = percent;
                self.progress_history.push(percent);
            }
            UploadEvent::Status(message) => self.log.push(message),
            UploadEvent::WorkingDirectory(path) => self.workdir = Some(path),
            UploadEvent::Finished(outcome) => self.outcome = Some(outcome),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.log
            .iter()
            .map(String::as_str)
            .filter(|line| line.starts_with("Warning:"))
    }
}
