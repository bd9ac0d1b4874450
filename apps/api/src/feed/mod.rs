/// Feed client: fetches job posts from the backend and posts labeled
/// results back.
///
/// All network I/O of the service lives here. Calls are made once; a failed
/// call is reported to the user and the caller decides whether to retry.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::job_post::{FeedJob, FeedResponse, Submission};

const JOB_POSTS_PATH: &str = "Job-Posts";

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Deserialize)]
struct FeedErrorBody {
    error: String,
}

/// Source and sink for job posts. `AppState` carries an `Arc<dyn JobFeed>`
/// so handlers can be exercised without a backend.
#[async_trait]
pub trait JobFeed: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<FeedJob>, FeedError>;

    async fn submit(&self, submission: &Submission) -> Result<(), FeedError>;
}

#[derive(Clone)]
pub struct HttpJobFeed {
    client: Client,
    endpoint: String,
}

impl HttpJobFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), JOB_POSTS_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl JobFeed for HttpJobFeed {
    async fn fetch_jobs(&self) -> Result<Vec<FeedJob>, FeedError> {
        let response = self.client.get(&self.endpoint).send().await?;
        let response = check_status(response).await?;
        let body: FeedResponse = response.json().await?;
        debug!("Fetched {} job post(s) from feed", body.jobs.len());
        Ok(body.jobs)
    }

    async fn submit(&self, submission: &Submission) -> Result<(), FeedError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(submission)
            .send()
            .await?;
        check_status(response).await?;
        debug!(
            "Submitted job post {} ({} tokens)",
            submission.job_id, submission.total_tokens
        );
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FeedError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    warn!("Feed returned {}: {}", status, body);
    Err(FeedError::Api {
        status: status.as_u16(),
        message: error_message(body),
    })
}

/// The save handler answers failures with `{"error": "..."}`.
fn error_message(body: String) -> String {
    serde_json::from_str::<FeedErrorBody>(&body)
        .map(|e| e.error)
        .unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let feed = HttpJobFeed::new("https://feed.example.com/prod/", Duration::from_secs(5))
            .unwrap();
        assert_eq!(feed.endpoint(), "https://feed.example.com/prod/Job-Posts");
    }

    #[test]
    fn test_error_message_prefers_json_error_field() {
        let body = r#"{"error": "S3 bucket name not configured."}"#.to_string();
        assert_eq!(error_message(body), "S3 bucket name not configured.");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_body() {
        assert_eq!(error_message("Bad Gateway".to_string()), "Bad Gateway");
    }
}
