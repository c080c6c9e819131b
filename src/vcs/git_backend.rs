use super::VersionControl;
use crate::config::GitConfig;
use crate::error::{AutoGitError, Result};
use git2::{
    Cred, IndexAddOption, PushOptions, RemoteCallbacks, Repository, RepositoryInitOptions,
    Signature,
};
use log::{debug, info};
use std::cell::RefCell;
use std::path::Path;

/// libgit2-backed implementation of [`VersionControl`].
pub struct Git2Backend {
    repo: Option<Repository>,
    initial_branch: String,
    author_name: String,
    author_email: String,
    username: String,
    token: String,
}

impl Git2Backend {
    pub fn new<U: Into<String>, T: Into<String>>(username: U, token: T) -> Self {
        let defaults = GitConfig::default();
        Self {
            repo: None,
            initial_branch: defaults.branch,
            author_name: defaults.author_name,
            author_email: defaults.author_email,
            username: username.into(),
            token: token.into(),
        }
    }

    pub fn from_config<U: Into<String>, T: Into<String>>(
        config: &GitConfig,
        username: U,
        token: T,
    ) -> Self {
        Self::new(username, token)
            .with_initial_branch(config.branch.clone())
            .with_author(config.author_name.clone(), config.author_email.clone())
    }

    pub fn with_initial_branch<S: Into<String>>(mut self, branch: S) -> Self {
        self.initial_branch = branch.into();
        self
    }

    pub fn with_author<N: Into<String>, E: Into<String>>(mut self, name: N, email: E) -> Self {
        self.author_name = name.into();
        self.author_email = email.into();
        self
    }

    fn repository(&self) -> Result<&Repository> {
        self.repo.as_ref().ok_or_else(|| AutoGitError::VersionControl {
            message: "Repository has not been initialized".to_string(),
            source: git2::Error::from_str("repository not initialized"),
        })
    }

    /// Prefers the identity from the user's git config.
    fn signature(&self, repo: &Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(signature) => Ok(signature.to_owned()),
            Err(_) => {
                debug!(
                    "No git identity configured, committing as {} <{}>",
                    self.author_name, self.author_email
                );
                Ok(Signature::now(&self.author_name, &self.author_email)?)
            }
        }
    }
}

impl VersionControl for Git2Backend {
    fn init(&mut self, workdir: &Path) -> Result<()> {
        let mut options = RepositoryInitOptions::new();
        options.initial_head(&self.initial_branch);

        let repo = Repository::init_opts(workdir, &options)?;
        info!(
            "Initialized git repository in {} on branch {}",
            workdir.display(),
            self.initial_branch
        );
        self.repo = Some(repo);
        Ok(())
    }

    fn add_all(&mut self) -> Result<()> {
        let repo = self.repository()?;
        let mut index = repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.write()?;
        debug!("Staged {} entries", index.len());
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        let repo = self.repository()?;
        let signature = self.signature(repo)?;

        let mut index = repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;

        let commit_id = repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[])?;
        info!("Created commit {}", commit_id);
        Ok(())
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
        let repo = self.repository()?;
        repo.remote(name, url)?;
        debug!("Added remote {} -> {}", name, url);
        Ok(())
    }

    fn push(&mut self, remote: &str, branch: &str) -> Result<()> {
        let repo = self.repository()?;
        let mut remote = repo.find_remote(remote)?;

        let rejection: RefCell<Option<String>> = RefCell::new(None);
        let username = self.username.clone();
        let token = self.token.clone();

        {
            let mut callbacks = RemoteCallbacks::new();

            callbacks.credentials(move |_url, username_from_url, _allowed_types| {
                Cred::userpass_plaintext(username_from_url.unwrap_or(username.as_str()), &token)
            });

            // The server reports per-reference failures here rather than as an Err
            callbacks.push_update_reference(|refname, status| {
                if let Some(status) = status {
                    *rejection.borrow_mut() = Some(format!("{} rejected: {}", refname, status));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);

            let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
            remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(AutoGitError::VersionControl {
                source: git2::Error::from_str(&message),
                message,
            });
        }

        info!("Pushed {} to {}", branch, remote.url().unwrap_or("remote"));
        Ok(())
    }
}
