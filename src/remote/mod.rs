pub mod github;

pub use github::GithubClient;

use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub private: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRepository {
    /// Web address of the new repository; also used as the push URL.
    pub html_url: String,
}

/// A hosted git platform that can create repositories on the user's behalf.
pub trait RemoteHost: Send {
    fn create_repository(&self, request: &CreateRepositoryRequest) -> Result<CreatedRepository>;
}
