//! Retrieval of the source JSON documents.
//!
//! Each configured `name -> url` is fetched with a blocking GET, retried on
//! transport errors and on the configured server statuses with exponential
//! backoff, parsed as JSON, and persisted through `store::save_json`. One
//! failed source does not stop the others; the summary decides the exit code.

use crate::config::{Config, FetchConfig};
use crate::store::save_json;
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;
use std::thread;
use thiserror::Error;
use tracing::{error, info, warn};

const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("accept", "application/json, text/plain, */*"),
    ("accept-language", "zh-CN,zh;q=0.9,en;q=0.8"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("reading response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },
    #[error("response from {url} is not JSON: {source}")]
    NotJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Blocking HTTP client bound to one retry policy.
pub struct Fetcher {
    agent: ureq::Agent,
    policy: FetchConfig,
    headers: Vec<(String, String)>,
}

impl Fetcher {
    pub fn new(policy: &FetchConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(policy.timeout()).build();
        Self {
            agent,
            policy: policy.clone(),
            headers: merged_headers(policy),
        }
    }

    /// GET `url` and parse the body as JSON, retrying per the policy.
    pub fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let mut retry = 0;
        loop {
            match self.attempt(url) {
                Ok(value) => return Ok(value),
                Err(err) if retry < self.policy.retries && self.should_retry(&err) => {
                    retry += 1;
                    let pause = self.policy.backoff(retry);
                    warn!(
                        url,
                        retry,
                        max_retries = self.policy.retries,
                        "{err}; retrying in {:?}",
                        pause
                    );
                    thread::sleep(pause);
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn attempt(&self, url: &str) -> Result<Value, FetchError> {
        let mut request = self.agent.get(url);
        for (name, value) in &self.headers {
            request = request.set(name, value);
        }

        let response = request.call().map_err(|err| match err {
            ureq::Error::Status(status, _) => FetchError::Status {
                url: url.to_string(),
                status,
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            },
        })?;

        let mut body = String::new();
        response
            .into_reader()
            .read_to_string(&mut body)
            .map_err(|source| FetchError::Body {
                url: url.to_string(),
                source,
            })?;
        serde_json::from_str(&body).map_err(|source| FetchError::NotJson {
            url: url.to_string(),
            source,
        })
    }

    fn should_retry(&self, err: &FetchError) -> bool {
        match err {
            FetchError::Status { status, .. } => self.policy.is_retryable_status(*status),
            FetchError::Transport { .. } => true,
            FetchError::Body { .. } | FetchError::NotJson { .. } => false,
        }
    }
}

fn merged_headers(policy: &FetchConfig) -> Vec<(String, String)> {
    let user_agent = format!("catalogmd/{}", env!("CARGO_PKG_VERSION"));
    let mut headers: Vec<(String, String)> = DEFAULT_HEADERS
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain(std::iter::once(("user-agent".to_string(), user_agent)))
        .collect();
    for (name, value) in &policy.headers {
        let lowered = name.to_ascii_lowercase();
        headers.retain(|(existing, _)| *existing != lowered);
        headers.push((lowered, value.clone()));
    }
    headers
}

/// Result of fetching one source.
#[derive(Debug, Clone, Serialize)]
pub struct FetchOutcome {
    pub name: String,
    pub url: String,
    pub saved_to: Option<PathBuf>,
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchSummary {
    pub outcomes: Vec<FetchOutcome>,
}

impl FetchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(FetchOutcome::succeeded)
    }

    /// 0 when every source was saved, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() { 0 } else { 1 }
    }
}

/// Fetch every configured source into `config.save_path`.
pub fn download_all(config: &Config) -> FetchSummary {
    let fetcher = Fetcher::new(&config.fetch);
    let mut summary = FetchSummary::default();

    for (idx, (name, url)) in config.sources.iter().enumerate() {
        if idx > 0 {
            thread::sleep(config.fetch.delay());
        }
        info!(name = %name, url = %url, "downloading");

        let result = fetcher
            .fetch_json(url)
            .map_err(anyhow::Error::from)
            .and_then(|value| save_json(&config.save_path, name, &value));

        let outcome = match result {
            Ok(path) => {
                info!(name = %name, path = %path.display(), "saved");
                FetchOutcome {
                    name: name.clone(),
                    url: url.clone(),
                    saved_to: Some(path),
                    error: None,
                }
            }
            Err(err) => {
                error!(name = %name, "fetch failed: {err:#}");
                FetchOutcome {
                    name: name.clone(),
                    url: url.clone(),
                    saved_to: None,
                    error: Some(format!("{err:#}")),
                }
            }
        };
        summary.outcomes.push(outcome);
    }

    summary
}
