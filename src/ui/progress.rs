use crate::upload::{UploadEvent, UploadOutcome, UploadState};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Percentage bar for one upload job.
    pub fn create_upload_progress(&self) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(100));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {prefix:.bold} {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        pb.set_message("Waiting for worker...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn suspend<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        if self.enabled {
            self.multi_progress.suspend(f)
        } else {
            f()
        }
    }

    pub fn clear(&self) {
        if self.enabled {
            self.multi_progress.clear().ok();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Mirrors one worker event on the bar.
pub fn update_upload_progress(pb: &ProgressBar, event: &UploadEvent) {
    match event {
        UploadEvent::State(state) if !state.is_terminal() => {
            pb.set_prefix(state_label(*state));
        }
        UploadEvent::Progress(percent) => pb.set_position(u64::from(*percent)),
        UploadEvent::Status(message) => pb.set_message(message.clone()),
        _ => {}
    }
}

pub fn finish_upload_progress(pb: &ProgressBar, outcome: &UploadOutcome, duration: Duration) {
    pb.set_prefix("");
    match outcome {
        UploadOutcome::Succeeded { .. } => {
            let message = format!("Upload complete (completed in {})", format_duration(duration));
            pb.finish_with_message(message);
        }
        UploadOutcome::Failed { .. } => {
            pb.abandon_with_message(format!("Upload failed after {}", format_duration(duration)));
        }
    }
}

fn state_label(state: UploadState) -> String {
    let label = state.to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}
