//! File classification service client
//!
//! Converter endpoints: list files, detect-all, patch one file's
//! classification and level metadata. A manual type change may come
//! back with a learning suggestion the user can accept or dismiss.

use crate::models::{ImportedFile, LearningSuggestion};
use crate::services::client::HttpConverterClient;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Patch body for one file's classification
///
/// Only populated fields are sent, matching the converter's
/// changed-fields-only patch semantics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdoor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_category: Option<String>,
    /// Accept a previously offered learning suggestion
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub apply_learning: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_keyword: Option<String>,
}

/// Result of a file patch: the patched file, the full refreshed list,
/// and an optional inferred classification rule
#[derive(Debug, Clone, Deserialize)]
pub struct FilePatchOutcome {
    pub file: ImportedFile,
    pub files: Vec<ImportedFile>,
    #[serde(default)]
    pub learning_suggestion: Option<LearningSuggestion>,
}

/// File service contract
#[async_trait]
pub trait FileApi: Send + Sync {
    async fn list_files(&self, session_id: &str) -> Result<Vec<ImportedFile>, ServiceError>;

    /// Re-run keyword detection over every file
    async fn detect_all(&self, session_id: &str) -> Result<Vec<ImportedFile>, ServiceError>;

    async fn patch_file(
        &self,
        session_id: &str,
        stem: &str,
        patch: &FilePatch,
    ) -> Result<FilePatchOutcome, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct FilesResponse {
    files: Vec<ImportedFile>,
}

#[async_trait]
impl FileApi for HttpConverterClient {
    async fn list_files(&self, session_id: &str) -> Result<Vec<ImportedFile>, ServiceError> {
        let response: FilesResponse = self
            .get_json(&self.session_path(session_id, "/files"))
            .await?;
        Ok(response.files)
    }

    async fn detect_all(&self, session_id: &str) -> Result<Vec<ImportedFile>, ServiceError> {
        let response: FilesResponse = self
            .post_empty(&self.session_path(session_id, "/detect"))
            .await?;
        Ok(response.files)
    }

    async fn patch_file(
        &self,
        session_id: &str,
        stem: &str,
        patch: &FilePatch,
    ) -> Result<FilePatchOutcome, ServiceError> {
        self.patch_json(
            &self.session_path(session_id, &format!("/files/{}", stem)),
            patch,
        )
        .await
    }
}
