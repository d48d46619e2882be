//! HTTP client for the converter backend
//!
//! One client speaks all four service areas (files, wizard, features,
//! validation/export); the per-area traits are implemented on it in
//! their own modules. Requests and responses are JSON except for the
//! export archive download.

use crate::services::error::{ErrorBody, ServiceError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("s2i-ui/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Converter backend client
#[derive(Debug, Clone)]
pub struct HttpConverterClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpConverterClient {
    /// Create a client against a backend base URL (no trailing slash)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Session-scoped path helper: `/api/session/{id}{suffix}`
    pub(crate) fn session_path(&self, session_id: &str, suffix: &str) -> String {
        format!("/api/session/{}{}", session_id, suffix)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let response = self.http.post(self.url(path)).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let response = self.http.patch(self.url(path)).json(body).send().await?;
        Self::decode(response).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ServiceError> {
        let response = self.http.delete(self.url(path)).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::error_from(status.as_u16(), response).await)
    }

    /// Upload a single document as multipart form data
    pub(crate) async fn post_document<T: DeserializeOwned>(
        &self,
        path: &str,
        field_name: &'static str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<T, ServiceError> {
        let part = reqwest::multipart::Part::bytes(content).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part(field_name, part);
        let response = self.http.post(self.url(path)).multipart(form).send().await?;
        Self::decode(response).await
    }

    /// Download binary content plus the filename suggested by the server
    pub(crate) async fn get_binary(&self, path: &str) -> Result<(Vec<u8>, Option<String>), ServiceError> {
        let response = self.http.get(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), response).await);
        }
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_disposition_filename);
        let bytes = response.bytes().await?;
        Ok((bytes.to_vec(), filename))
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(status.as_u16(), response).await);
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ServiceError::Payload(e.to_string()))
    }

    async fn error_from(status: u16, response: reqwest::Response) -> ServiceError {
        let body = response
            .text()
            .await
            .ok()
            .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok());
        ServiceError::from_status(status, body)
    }
}

/// Pull `filename="..."` out of a Content-Disposition header
fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let marker = "filename=";
    let index = header.find(marker)?;
    let raw = header[index + marker.len()..].trim();
    let trimmed = raw.trim_matches(|c| c == '"' || c == '\'');
    let name = trimmed.split(';').next().unwrap_or(trimmed).trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
