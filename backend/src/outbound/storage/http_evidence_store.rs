//! Reqwest-backed evidence store adapter.
//!
//! Owns transport details only: multipart serialisation, timeout and HTTP
//! error mapping, and decoding the store's JSON answer into an [`Evidence`]
//! reference.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::domain::grievance::Evidence;
use crate::domain::ports::evidence_store::{EvidenceStore, EvidenceStoreError, EvidenceUpload};

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Folder the store files every asset under.
const UPLOAD_FOLDER: &str = "campus-connect";

/// Evidence store adapter performing multipart uploads against one endpoint.
pub struct HttpEvidenceStore {
    client: Client,
    endpoint: Url,
}

#[derive(Debug, Deserialize)]
struct UploadResponseDto {
    public_id: String,
    secure_url: String,
}

impl HttpEvidenceStore {
    /// Build an adapter with the default upload timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::with_timeout(endpoint, DEFAULT_UPLOAD_TIMEOUT)
    }

    /// Build an adapter with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }
}

fn map_transport_error(error: reqwest::Error) -> EvidenceStoreError {
    EvidenceStoreError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EvidenceStoreError {
    let detail = String::from_utf8_lossy(body);
    let detail = detail.trim();
    if detail.is_empty() {
        EvidenceStoreError::rejected(format!("status {status}"))
    } else {
        EvidenceStoreError::rejected(format!("status {status}: {detail}"))
    }
}

fn parse_upload(body: &[u8]) -> Result<Evidence, EvidenceStoreError> {
    let dto: UploadResponseDto = serde_json::from_slice(body)
        .map_err(|err| EvidenceStoreError::rejected(format!("unparseable body: {err}")))?;
    Ok(Evidence {
        asset_id: dto.public_id,
        url: dto.secure_url,
    })
}

#[async_trait]
impl EvidenceStore for HttpEvidenceStore {
    async fn upload(&self, upload: EvidenceUpload) -> Result<Evidence, EvidenceStoreError> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.content_type)
            .map_err(|err| EvidenceStoreError::rejected(format!("bad content type: {err}")))?;
        let form = Form::new().text("folder", UPLOAD_FOLDER).part("file", part);

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        parse_upload(body.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn parses_store_answer_into_evidence() {
        let body = br#"{"public_id":"campus-connect/abc123","secure_url":"https://cdn.example/abc123.jpg","bytes":51200}"#;
        let evidence = parse_upload(body).expect("valid body");
        assert_eq!(evidence.asset_id, "campus-connect/abc123");
        assert_eq!(evidence.url, "https://cdn.example/abc123.jpg");
    }

    #[rstest]
    fn unparseable_answer_is_a_rejection() {
        let err = parse_upload(b"<html>gateway error</html>").expect_err("invalid body");
        assert!(matches!(err, EvidenceStoreError::Rejected { .. }));
    }

    #[rstest]
    fn status_error_includes_body_detail() {
        let err = map_status_error(StatusCode::PAYLOAD_TOO_LARGE, b"file exceeds plan limit");
        assert!(err.to_string().contains("413"));
        assert!(err.to_string().contains("file exceeds plan limit"));
    }

    #[rstest]
    fn status_error_without_body_names_the_status_only() {
        let err = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, b"  ");
        assert_eq!(
            err,
            EvidenceStoreError::rejected("status 500 Internal Server Error")
        );
    }
}
