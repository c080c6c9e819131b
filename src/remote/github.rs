use super::{CreateRepositoryRequest, CreatedRepository, RemoteHost};
use crate::config::{GithubConfig, DEFAULT_API_URL};
use crate::error::{AutoGitError, Result};
use log::{debug, info};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Blocking client for the GitHub REST repository-creation endpoint.
pub struct GithubClient {
    client: Client,
    api_url: String,
    token: String,
}

impl GithubClient {
    pub fn new<T: Into<String>>(token: T) -> Result<Self> {
        Self::with_options(DEFAULT_API_URL, token, None)
    }

    pub fn from_config<T: Into<String>>(config: &GithubConfig, token: T) -> Result<Self> {
        Self::with_options(
            &config.api_url,
            token,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn with_options<T: Into<String>>(
        api_url: &str,
        token: T,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        // None also clears the blocking client's built-in 30s default
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AutoGitError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token)).map_err(|_| {
            AutoGitError::InvalidInput {
                message: "GitHub token contains characters that cannot be sent in a header."
                    .to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("autogit/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(headers)
    }
}

impl RemoteHost for GithubClient {
    fn create_repository(&self, request: &CreateRepositoryRequest) -> Result<CreatedRepository> {
        let url = format!("{}/user/repos", self.api_url);
        debug!("POST {} (name={}, private={})", url, request.name, request.private);

        let response = self
            .client
            .post(&url)
            .headers(self.headers()?)
            .json(request)
            .send()
            .map_err(|e| AutoGitError::RemoteApi {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().map_err(|e| AutoGitError::RemoteApi {
            status: Some(status.as_u16()),
            message: e.to_string(),
        })?;

        if status != StatusCode::OK && status != StatusCode::CREATED {
            return Err(AutoGitError::RemoteApi {
                status: Some(status.as_u16()),
                message: platform_message(&body),
            });
        }

        let created: CreatedRepository =
            serde_json::from_str(&body).map_err(|e| AutoGitError::RemoteApi {
                status: Some(status.as_u16()),
                message: format!("Unexpected response from GitHub: {}", e),
            })?;

        info!("Created repository {}", created.html_url);
        Ok(created)
    }
}

/// The `message` field of a JSON error body, or the raw body.
fn platform_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| body.to_string())
}
