use crate::config::Config;
use crate::error::{AutoGitError, UserFriendlyError};
use crate::upload::{JobRecord, UploadJob, UploadOutcome};
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

impl OutputMode {
    pub fn from_string(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputMode::Json,
            "plain" => OutputMode::Plain,
            _ => OutputMode::Human,
        }
    }
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    /// A status line from the worker. Human mode shows these on the
    /// progress bar, so they only print here when verbose.
    pub fn status(&self, message: &str) {
        match self.mode {
            OutputMode::Human => {
                if self.should_show_message(1) {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  {}", message);
                    }
                }
            }
            OutputMode::Json => {
                if !self.quiet {
                    self.print_json_message("status", message);
                }
            }
            OutputMode::Plain => {
                if !self.quiet {
                    println!("STATUS: {}", message);
                }
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &AutoGitError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// What `--dry-run` would do.
    pub fn print_upload_plan(&self, job: &UploadJob, config: &Config, archive_bytes: u64) {
        match self.mode {
            OutputMode::Human | OutputMode::Plain => {
                self.print_header("Upload Plan");
                println!("Archive:     {} ({})", job.archive_path().display(), format_bytes(archive_bytes));
                println!("Repository:  {} ({})", job.repository_name(), job.visibility());
                println!("Account:     {}", job.username());
                println!("API:         {}", config.github.api_url);
                println!(
                    "Push:        {} -> {}/{}",
                    config.git.branch, config.git.remote_name, config.git.branch
                );
                println!("Commit:      {}", config.git.commit_message);
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "plan",
                    "archive": job.archive_path().display().to_string(),
                    "archive_bytes": archive_bytes,
                    "repository": job.repository_name(),
                    "private": job.is_private(),
                    "username": job.username(),
                    "api_url": config.github.api_url,
                    "branch": config.git.branch,
                    "remote": config.git.remote_name,
                    "commit_message": config.git.commit_message,
                }));
            }
        }
    }

    pub fn print_upload_report(&self, record: &JobRecord, duration: Duration) {
        match self.mode {
            OutputMode::Human => self.print_human_report(record, duration),
            OutputMode::Json => {
                let report = serde_json::json!({
                    "type": "report",
                    "job": record,
                    "duration_ms": duration.as_millis(),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputMode::Plain => self.print_plain_report(record, duration),
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, record: &JobRecord, duration: Duration) {
        if self.quiet {
            if let Some(UploadOutcome::Succeeded { url, .. }) = &record.outcome {
                println!("{}", url);
            }
            return;
        }

        println!();
        self.print_separator();

        match &record.outcome {
            Some(UploadOutcome::Succeeded { url, message }) => {
                self.success(message);
                println!();
                println!(
                    "  Repository: {}",
                    if self.use_colors {
                        style(url).cyan().bold().to_string()
                    } else {
                        url.clone()
                    }
                );
            }
            Some(UploadOutcome::Failed { message, .. }) => {
                self.error(&format!("Upload failed: {}", message));
                println!();
                if let Some(state) = record.states.iter().rev().nth(2) {
                    println!("  Failed while: {}", state);
                }
            }
            None => self.error("Upload ended without a result"),
        }

        println!("  Progress:   {}%", record.progress);
        println!("  Time taken: {}", format_duration(duration));

        let warnings: Vec<&str> = record.warnings().collect();
        if !warnings.is_empty() {
            println!();
            for warning in warnings {
                self.warning(warning.trim_start_matches("Warning: "));
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, record: &JobRecord, duration: Duration) {
        match &record.outcome {
            Some(UploadOutcome::Succeeded { url, .. }) => {
                println!("COMPLETED: Upload");
                println!("URL: {}", url);
            }
            Some(UploadOutcome::Failed { message, .. }) => {
                println!("FAILED: {}", message);
            }
            None => println!("FAILED: no result"),
        }
        println!("Progress: {}", record.progress);
        println!("Duration: {:?}", duration);
        let warnings = record.warnings().count();
        if warnings > 0 {
            println!("Warnings: {}", warnings);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
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

/// Prints through the progress bar so lines do not tear it.
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn status(&self, message: &str) {
        self.suspend_and_print(|f| f.status(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_mode_parsing() {
        assert_eq!(OutputMode::from_string("human"), OutputMode::Human);
        assert_eq!(OutputMode::from_string("JSON"), OutputMode::Json);
        assert_eq!(OutputMode::from_string("plain"), OutputMode::Plain);
        assert_eq!(OutputMode::from_string("invalid"), OutputMode::Human);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_non_human_modes_disable_colors() {
        assert!(!OutputFormatter::new(OutputMode::Json, 0, false).use_colors);
        assert!(!OutputFormatter::new(OutputMode::Plain, 0, false).use_colors);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
