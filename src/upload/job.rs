use crate::error::{AutoGitError, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Raw user input, before validation.
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub archive_path: Option<PathBuf>,
    pub repository_name: String,
    pub username: String,
    pub token: String,
    pub private: bool,
}

impl UploadRequest {
    /// Checks the inputs in the order a user fills them in and returns the
    /// first problem found.
    pub fn validate(self) -> Result<UploadJob> {
        let archive_path = match self.archive_path {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(invalid("Please select an archive file.")),
        };

        if !archive_path.exists() {
            return Err(invalid("Selected archive file does not exist."));
        }

        let repository_name = self.repository_name.trim();
        if repository_name.is_empty() {
            return Err(invalid("Please enter a repository name."));
        }

        let username = self.username.trim();
        if username.is_empty() {
            return Err(invalid("Please enter your GitHub username."));
        }

        if self.token.trim().is_empty() {
            return Err(invalid("Please enter your GitHub token."));
        }

        Ok(UploadJob {
            archive_path,
            repository_name: repository_name.to_string(),
            username: username.to_string(),
            token: self.token.trim().to_string(),
            private: self.private,
        })
    }
}

fn invalid(message: &str) -> AutoGitError {
    AutoGitError::InvalidInput {
        message: message.to_string(),
    }
}

/// A validated, one-shot upload.
#[derive(Clone)]
pub struct UploadJob {
    archive_path: PathBuf,
    repository_name: String,
    username: String,
    token: String,
    private: bool,
}

impl UploadJob {
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn visibility(&self) -> &'static str {
        if self.private {
            "private"
        } else {
            "public"
        }
    }
}

impl fmt::Debug for UploadJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadJob")
            .field("archive_path", &self.archive_path)
            .field("repository_name", &self.repository_name)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .field("private", &self.private)
            .finish()
    }
}
