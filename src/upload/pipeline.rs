use super::event::{ProgressReporter, UploadOutcome, UploadState};
use super::job::UploadJob;
use super::workspace::WorkspaceProvider;
use crate::archive;
use crate::config::GitConfig;
use crate::error::Result;
use crate::remote::{CreateRepositoryRequest, RemoteHost};
use crate::vcs::VersionControl;
use log::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub branch: String,
    pub remote_name: String,
    pub commit_message: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&GitConfig::default())
    }
}

impl From<&GitConfig> for PipelineSettings {
    fn from(config: &GitConfig) -> Self {
        Self {
            branch: config.branch.clone(),
            remote_name: config.remote_name.clone(),
            commit_message: config.commit_message.clone(),
        }
    }
}

/// Turns one archive into a freshly pushed hosted repository.
///
/// The pipeline is consumed by [`UploadPipeline::run`]; every job gets its
/// own version-control handle and working directory.
pub struct UploadPipeline {
    vcs: Box<dyn VersionControl>,
    host: Box<dyn RemoteHost>,
    workspace: Box<dyn WorkspaceProvider>,
    settings: PipelineSettings,
}

impl UploadPipeline {
    pub fn new(
        vcs: Box<dyn VersionControl>,
        host: Box<dyn RemoteHost>,
        workspace: Box<dyn WorkspaceProvider>,
    ) -> Self {
        Self {
            vcs,
            host,
            workspace,
            settings: PipelineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Runs every step in order, then cleans up and reports the outcome.
    ///
    /// Never returns early: a failing step skips the remaining steps but
    /// the working directory is still released and a `Finished` event is
    /// always the last thing sent.
    pub fn run(self, job: &UploadJob, reporter: &ProgressReporter) -> UploadOutcome {
        let UploadPipeline {
            mut vcs,
            host,
            mut workspace,
            settings,
        } = self;

        info!(
            "Uploading {} as {} repository {}",
            job.archive_path().display(),
            job.visibility(),
            job.repository_name()
        );

        let result = execute_steps(
            vcs.as_mut(),
            host.as_ref(),
            workspace.as_mut(),
            &settings,
            job,
            reporter,
        );

        if let Err(ref e) = result {
            error!("Upload failed: {}", e);
            reporter.status(format!("Error: {}", e));
        }

        reporter.state(UploadState::CleaningUp);
        reporter.status("Cleaning up temporary files...");

        // The repository handle keeps files open inside the working directory.
        drop(vcs);

        if let Err(e) = workspace.release() {
            warn!("Failed to clean up temporary directory: {}", e);
            reporter.status(format!(
                "Warning: Failed to clean up temporary directory: {}",
                e
            ));
        }

        let outcome = match result {
            Ok(url) => {
                reporter.progress(100);
                reporter.state(UploadState::Succeeded);
                let outcome = UploadOutcome::succeeded(url);
                reporter.status(outcome.message());
                info!("{}", outcome.message());
                outcome
            }
            Err(e) => {
                reporter.state(UploadState::Failed);
                UploadOutcome::failed(&e)
            }
        };

        reporter.finish(outcome.clone());
        outcome
    }
}

fn execute_steps(
    vcs: &mut dyn VersionControl,
    host: &dyn RemoteHost,
    workspace: &mut dyn WorkspaceProvider,
    settings: &PipelineSettings,
    job: &UploadJob,
    reporter: &ProgressReporter,
) -> Result<String> {
    reporter.state(UploadState::Extracting);
    reporter.status("Creating temporary directory...");
    let workdir = workspace.allocate()?;
    reporter.working_directory(workdir.clone());
    reporter.progress(10);

    reporter.status(format!(
        "Extracting {} to temporary directory...",
        job.archive_path().display()
    ));
    let summary = archive::extract(job.archive_path(), &workdir)?;
    info!("Extracted {}", summary.display_summary());
    reporter.progress(30);

    reporter.state(UploadState::Initializing);
    reporter.status("Initializing Git repository...");
    vcs.init(&workdir)?;
    reporter.progress(40);

    reporter.state(UploadState::Staging);
    reporter.status("Adding files to Git...");
    vcs.add_all()?;
    reporter.progress(50);

    reporter.state(UploadState::Committing);
    reporter.status("Committing files...");
    vcs.commit(&settings.commit_message)?;
    reporter.progress(60);

    reporter.state(UploadState::CreatingRemote);
    reporter.status(format!(
        "Creating GitHub repository: {}...",
        job.repository_name()
    ));
    let created = host.create_repository(&CreateRepositoryRequest {
        name: job.repository_name().to_string(),
        private: job.is_private(),
    })?;
    reporter.progress(70);

    reporter.state(UploadState::Pushing);
    reporter.status("Pushing to GitHub...");
    vcs.add_remote(&settings.remote_name, &created.html_url)?;
    vcs.push(&settings.remote_name, &settings.branch)?;
    reporter.progress(90);

    Ok(created.html_url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AutoGitError, ErrorCategory};
    use crate::remote::CreatedRepository;
    use crate::upload::event::UploadEvent;
    use crate::upload::job::UploadRequest;
    use crate::upload::workspace::TempWorkspace;
    use std::io::Write;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    #[derive(Clone, Default)]
    struct RecordingVcs {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl VersionControl for RecordingVcs {
        fn init(&mut self, workdir: &Path) -> Result<()> {
            assert!(workdir.join("a.txt").exists());
            self.calls.lock().unwrap().push("init".to_string());
            Ok(())
        }

        fn add_all(&mut self) -> Result<()> {
            self.calls.lock().unwrap().push("add_all".to_string());
            Ok(())
        }

        fn commit(&mut self, message: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("commit {}", message));
            Ok(())
        }

        fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("remote {} {}", name, url));
            Ok(())
        }

        fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("push {} {}", remote, branch));
            Ok(())
        }
    }

    struct StaticHost(std::result::Result<String, (u16, String)>);

    impl RemoteHost for StaticHost {
        fn create_repository(&self, _request: &CreateRepositoryRequest) -> Result<CreatedRepository> {
            match &self.0 {
                Ok(url) => Ok(CreatedRepository {
                    html_url: url.clone(),
                }),
                Err((status, message)) => Err(AutoGitError::RemoteApi {
                    status: Some(*status),
                    message: message.clone(),
                }),
            }
        }
    }

    fn zip_job(dir: &Path) -> UploadJob {
        let path = dir.join("project.zip");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file("a.txt", zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"alpha").unwrap();
        writer.finish().unwrap();

        UploadRequest {
            archive_path: Some(path),
            repository_name: "myproj".to_string(),
            username: "octocat".to_string(),
            token: "token".to_string(),
            private: false,
        }
        .validate()
        .unwrap()
    }

    fn collect(mut rx: mpsc::UnboundedReceiver<UploadEvent>) -> Vec<UploadEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_steps_run_in_order() {
        let temp = TempDir::new().unwrap();
        let job = zip_job(temp.path());
        let vcs = RecordingVcs::default();
        let calls = vcs.calls.clone();

        let pipeline = UploadPipeline::new(
            Box::new(vcs),
            Box::new(StaticHost(Ok("https://example.test/octocat/myproj".to_string()))),
            Box::new(TempWorkspace::in_dir(temp.path())),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let outcome = pipeline.run(&job, &ProgressReporter::new(tx));

        assert!(outcome.is_success());
        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                "init",
                "add_all",
                "commit Initial commit",
                "remote origin https://example.test/octocat/myproj",
                "push origin master",
            ]
        );

        let events = collect(rx);
        assert_eq!(events.last(), Some(&UploadEvent::Finished(outcome)));
    }

    #[test]
    fn test_remote_failure_skips_push_and_cleans_up() {
        let temp = TempDir::new().unwrap();
        let job = zip_job(temp.path());
        let vcs = RecordingVcs::default();
        let calls = vcs.calls.clone();

        let pipeline = UploadPipeline::new(
            Box::new(vcs),
            Box::new(StaticHost(Err((422, "Repository creation failed.".to_string())))),
            Box::new(TempWorkspace::in_dir(temp.path())),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let outcome = pipeline.run(&job, &ProgressReporter::new(tx));

        assert_eq!(
            outcome,
            UploadOutcome::Failed {
                message: "Repository creation failed.".to_string(),
                category: ErrorCategory::RemoteApi,
            }
        );
        assert_eq!(calls.lock().unwrap().len(), 3);

        let events = collect(rx);
        let workdir = events
            .iter()
            .find_map(|e| match e {
                UploadEvent::WorkingDirectory(path) => Some(path.clone()),
                _ => None,
            })
            .unwrap();
        assert!(!workdir.exists());
        assert!(events.contains(&UploadEvent::Status(
            "Error: Repository creation failed.".to_string()
        )));
        assert!(!events.contains(&UploadEvent::Progress(100)));
    }

    #[test]
    fn test_settings_from_git_config() {
        let config = GitConfig {
            branch: "main".to_string(),
            remote_name: "upstream".to_string(),
            commit_message: "Import".to_string(),
            ..GitConfig::default()
        };
        let settings = PipelineSettings::from(&config);

        assert_eq!(settings.branch, "main");
        assert_eq!(settings.remote_name, "upstream");
        assert_eq!(settings.commit_message, "Import");
        assert_eq!(PipelineSettings::default().branch, "master");
    }
}
