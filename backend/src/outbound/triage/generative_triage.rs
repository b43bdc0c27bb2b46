//! Reqwest-backed triage adapter for a generative-model API.
//!
//! Sends the grievance title and plain-text description to a
//! `generateContent`-style endpoint and decodes the model's JSON verdict.
//! Models wrap JSON in markdown fences often enough that stripping them is
//! part of the contract here. Callers treat any failure as "no verdict".

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::domain::grievance::Priority;
use crate::domain::ports::triage::{TriageAssist, TriageError, TriageOutcome};

/// Kept short so a slow model degrades to the default verdict instead of
/// stalling the submission.
const DEFAULT_TRIAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Triage adapter performing HTTP POST requests against one model endpoint.
pub struct GenerativeTriage {
    client: Client,
    endpoint: Url,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequestDto<'a> {
    contents: [ContentDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ContentDto<'a> {
    parts: [PartDto<'a>; 1],
}

#[derive(Debug, Serialize)]
struct PartDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponseDto {
    #[serde(default)]
    candidates: Vec<CandidateDto>,
}

#[derive(Debug, Deserialize)]
struct CandidateDto {
    content: CandidateContentDto,
}

#[derive(Debug, Deserialize)]
struct CandidateContentDto {
    #[serde(default)]
    parts: Vec<CandidatePartDto>,
}

#[derive(Debug, Deserialize)]
struct CandidatePartDto {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct VerdictDto {
    priority: String,
    #[serde(default)]
    summary: String,
}

impl GenerativeTriage {
    /// Build an adapter with the default request timeout.
    ///
    /// `endpoint` is the full `generateContent` URL for the chosen model;
    /// the API key is sent as a query parameter per request.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, api_key: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, api_key, DEFAULT_TRIAGE_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

fn build_prompt(title: &str, description: &str) -> String {
    format!(
        "Analyze the following grievance for a college system.\n\
         Title: \"{title}\"\n\
         Description: \"{description}\"\n\
         \n\
         Tasks:\n\
         1. Determine priority (Low, Medium, High). Issues involving safety, \
         harassment, or major infrastructure failure are High.\n\
         2. Generate a very short 1-sentence summary (max 15 words).\n\
         \n\
         Output strictly in this JSON format:\n\
         {{\n  \"priority\": \"High/Medium/Low\",\n  \"summary\": \"The summary text here\"\n}}"
    )
}

fn map_transport_error(error: reqwest::Error) -> TriageError {
    TriageError::transport(error.to_string())
}

fn map_status_error(status: StatusCode) -> TriageError {
    TriageError::transport(format!("status {status}"))
}

/// Drop markdown code fences the model may wrap its JSON in.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_owned()
}

fn extract_verdict_text(body: &[u8]) -> Result<String, TriageError> {
    let response: GenerateResponseDto = serde_json::from_slice(body)
        .map_err(|err| TriageError::malformed(format!("unparseable response: {err}")))?;
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or_else(|| TriageError::malformed("response carries no candidates"))
}

fn parse_verdict(text: &str) -> Result<TriageOutcome, TriageError> {
    let cleaned = strip_fences(text);
    let verdict: VerdictDto = serde_json::from_str(&cleaned)
        .map_err(|err| TriageError::malformed(format!("unparseable verdict: {err}")))?;
    let priority = verdict
        .priority
        .parse::<Priority>()
        .map_err(|err| TriageError::malformed(err.to_string()))?;
    Ok(TriageOutcome {
        priority,
        summary: verdict.summary.trim().to_owned(),
    })
}

#[async_trait]
impl TriageAssist for GenerativeTriage {
    async fn assess(&self, title: &str, description: &str) -> Result<TriageOutcome, TriageError> {
        let prompt = build_prompt(title, description);
        let request = GenerateRequestDto {
            contents: [ContentDto {
                parts: [PartDto { text: &prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status));
        }

        parse_verdict(&extract_verdict_text(body.as_ref())?)
    }
}
