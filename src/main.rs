use autogit::{
    ArchiveFormat, AutoGit, AutoGitError, Cli, Config, ErrorCategory, FileSettingsStore,
    MemorySettingsStore, OutputFormatter, OutputMode, RememberedUsername, SettingsStore, UploadJob,
    UserFriendlyError,
};
use clap::Parser;
use log::warn;
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let autogit = match AutoGit::from_cli(&cli) {
        Ok(autogit) => autogit,
        Err(e) => {
            print_startup_error(&e);
            return e.category().exit_code();
        }
    };

    let mut settings = open_settings_store();
    let job = match prepare_job(&cli, autogit.config(), settings.as_mut()) {
        Ok(job) => job,
        Err(e) => {
            autogit.handle_error(&e);
            return e.category().exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&autogit, &job);
    }

    match autogit.upload(job).await {
        Ok(record) => match record.outcome {
            Some(outcome) => outcome.exit_code(),
            None => ErrorCategory::Other.exit_code(),
        },
        Err(e) => {
            autogit.handle_error(&e);
            e.category().exit_code()
        }
    }
}

/// Validates the form and, once it is accepted, remembers or forgets the
/// username as configured.
fn prepare_job(
    cli: &Cli,
    config: &Config,
    settings: &mut dyn SettingsStore,
) -> autogit::Result<UploadJob> {
    let mut remembered = RememberedUsername::new(settings);
    let saved = remembered.load().unwrap_or_else(|e| {
        warn!("Could not read remembered username: {}", e);
        None
    });

    let job = cli.to_request(saved).validate()?;

    if let Err(e) = remembered.update(job.username(), config.settings.remember_username) {
        warn!("Could not update remembered username: {}", e);
    }

    Ok(job)
}

fn open_settings_store() -> Box<dyn SettingsStore> {
    match FileSettingsStore::open_default() {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("{}; the username will not be remembered", e);
            Box::new(MemorySettingsStore::new())
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "autogit.toml".to_string());

    match AutoGit::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  autogit <archive> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            ErrorCategory::Config.exit_code()
        }
    }
}

fn handle_dry_run(autogit: &AutoGit, job: &UploadJob) -> i32 {
    let formatter = autogit.output_formatter();

    formatter.info("DRY RUN MODE - Nothing will be uploaded");

    if let Err(e) = ArchiveFormat::detect(job.archive_path()) {
        autogit.handle_error(&e);
        return e.category().exit_code();
    }

    let archive_bytes = std::fs::metadata(job.archive_path())
        .map(|m| m.len())
        .unwrap_or(0);
    formatter.print_upload_plan(job, autogit.config(), archive_bytes);

    formatter.print_separator();
    formatter.success("Dry run completed successfully");
    formatter.info("Run without --dry-run to perform the upload");

    0
}

fn print_startup_error(error: &AutoGitError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

fn setup_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "autogit=warn",
        1 => "autogit=info",
        2 => "autogit=debug",
        _ => "autogit=trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init()
        .ok();
}
