use serde::{Deserialize, Serialize};

use crate::annotation::token_store::{Token, TokenStore};

/// A job post in the working set. Owns its tokens exclusively.
#[derive(Debug, Clone)]
pub struct JobPost {
    pub id: String,
    pub title: String,
    pub company: String,
    pub tokens: TokenStore,
}

/// Envelope returned by `GET /Job-Posts` on the feed backend.
#[derive(Debug, Deserialize)]
pub struct FeedResponse {
    pub jobs: Vec<FeedJob>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedJob {
    #[serde(rename = "Job_ID")]
    pub id: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Company", default)]
    pub company: String,
    #[serde(rename = "Tokens", default)]
    pub tokens: Vec<FeedToken>,
}

/// The preprocessing stage emits bare strings; previously labeled posts come
/// back as objects. Any `id` the feed carries is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedToken {
    Text(String),
    Labeled {
        text: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl From<FeedToken> for Token {
    fn from(token: FeedToken) -> Self {
        match token {
            FeedToken::Text(text) => Token::new(text),
            FeedToken::Labeled { text, label } => {
                Token::new(text).with_label(label.unwrap_or_default())
            }
        }
    }
}

impl From<FeedJob> for JobPost {
    fn from(job: FeedJob) -> Self {
        JobPost {
            id: job.id,
            title: job.title,
            company: job.company,
            tokens: TokenStore::new(job.tokens.into_iter().map(Token::from).collect()),
        }
    }
}

/// Payload posted back to the feed once a job post is labeled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub job_id: String,
    /// The backend names the stored object after this key.
    #[serde(rename = "Title")]
    pub title: String,
    pub tokens: Vec<SubmittedToken>,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedToken {
    pub id: usize,
    pub text: String,
    pub label: String,
}

impl From<&JobPost> for Submission {
    fn from(job: &JobPost) -> Self {
        let tokens: Vec<SubmittedToken> = job
            .tokens
            .iter()
            .map(|t| SubmittedToken {
                id: t.id,
                text: t.text.clone(),
                label: t.label.clone(),
            })
            .collect();
        Submission {
            job_id: job.id.clone(),
            title: job.title.clone(),
            total_tokens: tokens.len(),
            tokens,
        }
    }
}

/// Row in the job list.
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub company: String,
    pub token_count: usize,
    pub is_open: bool,
}
