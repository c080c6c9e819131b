use crate::archive::default_repository_name;
use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::upload::UploadRequest;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "autogit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Upload a project archive to a new GitHub repository")]
#[command(
    long_about = "AutoGit extracts a .zip, .tar, .gz or .tgz archive into a temporary \
                  directory, commits its contents to a fresh git repository, creates a \
                  matching repository on GitHub and pushes to it."
)]
#[command(before_help = "🚀 AutoGit - Archive to GitHub Uploader")]
#[command(after_help = "EXAMPLES:\n  \
    autogit project.zip --username octocat\n  \
    autogit release.tar.gz --name my-release --private\n  \
    GITHUB_TOKEN=ghp_xxx autogit site.tgz --dry-run\n  \
    autogit project.zip --config autogit.toml --output-format json")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Archive to upload (.zip, .tar, .gz, .tgz)
    pub archive: Option<PathBuf>,

    /// Repository name (defaults to the archive's file name without its suffix)
    #[arg(short, long)]
    pub name: Option<String>,

    /// GitHub username (remembered between runs)
    #[arg(short, long, env = "GITHUB_USERNAME")]
    pub username: Option<String>,

    /// GitHub personal access token
    #[arg(short, long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Create the repository as private
    #[arg(long)]
    pub private: bool,

    /// Do not remember the username and forget any saved one
    #[arg(long)]
    pub forget_username: bool,

    /// GitHub API base URL
    #[arg(long, help = "GitHub API base URL (for GitHub Enterprise or testing)")]
    pub api_url: Option<String>,

    /// Branch to create and push
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Validate inputs and show the upload plan without running it")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_api_url(self.api_url.clone())
            .with_branch(self.branch.clone())
            .with_forget_username(self.forget_username)
    }

    /// Collects the form fields. Missing values stay empty so that
    /// validation reports them.
    pub fn to_request(&self, remembered_username: Option<String>) -> UploadRequest {
        let repository_name = self
            .name
            .clone()
            .or_else(|| self.archive.as_deref().and_then(default_repository_name))
            .unwrap_or_default();

        let username = self
            .username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or(remembered_username)
            .unwrap_or_default();

        UploadRequest {
            archive_path: self.archive.clone(),
            repository_name,
            username,
            token: self.token.clone().unwrap_or_default(),
            private: self.private,
        }
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
