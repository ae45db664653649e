use std::env;
use std::time::Duration;

use async_trait::async_trait;
use drill_core::model::{BatchRequest, Exercise};
use reqwest::Client;
use serde::Serialize;

use super::ExerciseSource;
use crate::error::ExerciseSourceError;

const DEFAULT_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct ExerciseSourceConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ExerciseSourceConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads `DRILL_SOURCE_URL` and `DRILL_SOURCE_TIMEOUT_SECS`.
    /// Returns `None` when no URL is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("DRILL_SOURCE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        let timeout = env::var("DRILL_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Some(Self {
            base_url,
            timeout: Duration::from_secs(timeout),
        })
    }
}

/// Remote exercise generator reached over HTTP.
#[derive(Clone)]
pub struct HttpExerciseSource {
    client: Client,
    config: ExerciseSourceConfig,
}

impl HttpExerciseSource {
    /// # Errors
    ///
    /// Returns `ExerciseSourceError::Http` if the HTTP client cannot be built.
    pub fn new(config: ExerciseSourceConfig) -> Result<Self, ExerciseSourceError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/generate-examples",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    mode: &'a str,
    count: usize,
}

#[async_trait]
impl ExerciseSource for HttpExerciseSource {
    async fn generate(&self, request: &BatchRequest) -> Result<Vec<Exercise>, ExerciseSourceError> {
        let payload = GenerateRequest {
            mode: request.mode().as_str(),
            count: request.count(),
        };

        let response = self.client.post(self.endpoint()).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(ExerciseSourceError::HttpStatus(response.status()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<Vec<Exercise>>(&body)
            .map_err(|e| ExerciseSourceError::Malformed(e.to_string()))
    }
}
