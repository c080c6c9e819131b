pub mod archive;
pub mod cli;
pub mod config;
pub mod error;
pub mod remote;
pub mod settings;
pub mod ui;
pub mod upload;
pub mod vcs;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, GitConfig, GithubConfig, SettingsConfig};
pub use error::{AutoGitError, ErrorCategory, Result, UserFriendlyError};

// Core functionality re-exports
pub use archive::{default_repository_name, extract, ArchiveFormat, ExtractionSummary};
pub use remote::{CreateRepositoryRequest, CreatedRepository, GithubClient, RemoteHost};
pub use settings::{
    FileSettingsStore, MemorySettingsStore, RememberedUsername, SettingsStore,
};
pub use ui::{OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};
pub use upload::{
    spawn_upload, JobRecord, PipelineSettings, ProgressReporter, TempWorkspace, UploadEvent,
    UploadJob, UploadOutcome, UploadPipeline, UploadRequest, UploadState, WorkspaceProvider,
};
pub use vcs::{Git2Backend, VersionControl};

use log::info;
use std::path::Path;
use std::time::Instant;

/// Main library interface for AutoGit functionality
pub struct AutoGit {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
}

impl AutoGit {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        // Status lines replace the bar outside human mode.
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
        }
    }

    /// Create an AutoGit instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Wires the production collaborators for one job: libgit2, the GitHub
    /// REST client and a temporary working directory.
    ///
    /// Builds a blocking HTTP client, so call it off the async executor.
    pub fn build_pipeline(config: &Config, job: &UploadJob) -> Result<UploadPipeline> {
        let vcs = Git2Backend::from_config(&config.git, job.username(), job.token());
        let host = GithubClient::from_config(&config.github, job.token())?;

        Ok(UploadPipeline::new(
            Box::new(vcs),
            Box::new(host),
            Box::new(TempWorkspace::new()),
        )
        .with_settings(PipelineSettings::from(&config.git)))
    }

    /// Run one upload on a background worker, mirroring its events on the
    /// progress bar and the configured output.
    pub async fn upload(&self, job: UploadJob) -> Result<JobRecord> {
        self.output_formatter.start_operation(&format!(
            "Uploading {} to {}",
            job.archive_path().display(),
            job.repository_name()
        ));

        let start_time = Instant::now();
        let progress_bar = self.progress_manager.create_upload_progress();
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));

        let config = self.config.clone();
        let factory_job = job.clone();
        let handle = spawn_upload(job, move || Self::build_pipeline(&config, &factory_job));

        let record = handle
            .run_to_completion(|event| {
                ui::progress::update_upload_progress(&progress_bar, event);
                if let UploadEvent::Status(message) = event {
                    output.status(message);
                }
            })
            .await?;

        let elapsed = start_time.elapsed();
        if let Some(ref outcome) = record.outcome {
            ui::progress::finish_upload_progress(&progress_bar, outcome, elapsed);
            info!("Upload finished in {:?}: {}", elapsed, outcome.message());
        }
        self.progress_manager.clear();

        self.output_formatter.print_upload_report(&record, elapsed);

        Ok(record)
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn progress_manager(&self) -> &ProgressManager {
        &self.progress_manager
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &AutoGitError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AutoGit {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_autogit_creation() {
        let autogit = AutoGit::new(Config::default(), OutputMode::Human, 1, false);
        assert_eq!(autogit.config().git.branch, "master");

        let quiet = AutoGit::new(Config::default(), OutputMode::Human, 0, true);
        assert!(!quiet.progress_manager().is_enabled());

        let json = AutoGit::new(Config::default(), OutputMode::Json, 0, false);
        assert!(!json.progress_manager().is_enabled());
    }

    #[test]
    fn test_sample_config_generation() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sample.toml");

        AutoGit::generate_sample_config(&config_path).unwrap();

        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[github]"));
        assert!(content.contains("[git]"));
        assert!(content.contains("[settings]"));

        let parsed = Config::load_from_file(&config_path).unwrap();
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn test_build_pipeline_uses_git_settings() {
        let archive = NamedTempFile::new().unwrap();
        let job = UploadRequest {
            archive_path: Some(archive.path().to_path_buf()),
            repository_name: "myproj".to_string(),
            username: "octocat".to_string(),
            token: "token".to_string(),
            private: false,
        }
        .validate()
        .unwrap();

        let mut config = Config::default();
        config.git.branch = "main".to_string();

        let pipeline = AutoGit::build_pipeline(&config, &job).unwrap();
        assert_eq!(pipeline.settings().branch, "main");
    }

    #[test]
    fn test_version_info() {
        assert!(!version_info().is_empty());

        let build_info = build_info();
        assert!(!build_info.version.is_empty());
        assert!(build_info.to_string().starts_with("AutoGit "));
    }
}
