//! Feature service client
//!
//! Lists the session's feature rows (raw, normalized by the review
//! engine), generates the draft set, and issues single and bulk
//! mutations. Every mutation echoes back the canonical updated
//! record(s); bulk calls are one round trip each with no chunking.

use crate::services::client::HttpConverterClient;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Result of a draft generation call
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateOutcome {
    pub status: String,
    #[serde(default)]
    pub generated_feature_count: usize,
    #[serde(default)]
    pub message: String,
}

/// Result of a bulk mutation: how many records the converter touched
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOutcome {
    #[serde(default)]
    pub affected: usize,
}

/// Feature service contract
#[async_trait]
pub trait FeatureApi: Send + Sync {
    /// Raw feature rows for the session, exactly as the converter
    /// returns them
    async fn list_features(&self, session_id: &str) -> Result<Vec<Value>, ServiceError>;

    /// Generate the draft feature set from the confirmed wizard state
    async fn generate_draft(&self, session_id: &str) -> Result<GenerateOutcome, ServiceError>;

    /// Patch one feature's properties; echoes the canonical record
    async fn patch_feature(
        &self,
        session_id: &str,
        feature_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<Value, ServiceError>;

    async fn delete_feature(&self, session_id: &str, feature_id: &str)
        -> Result<(), ServiceError>;

    /// Apply the same properties to many features in one round trip
    async fn bulk_patch(
        &self,
        session_id: &str,
        feature_ids: &[String],
        properties: &Map<String, Value>,
    ) -> Result<BulkOutcome, ServiceError>;

    async fn bulk_delete(
        &self,
        session_id: &str,
        feature_ids: &[String],
    ) -> Result<BulkOutcome, ServiceError>;

    /// Collapse several units into one; the converter materializes a
    /// new id and removes the inputs
    async fn merge_units(
        &self,
        session_id: &str,
        feature_ids: &[String],
        display_name: Option<&str>,
    ) -> Result<Value, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct FeatureCollectionResponse {
    #[serde(default)]
    features: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct PatchFeatureBody<'a> {
    properties: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct BulkPatchBody<'a> {
    feature_ids: &'a [String],
    properties: &'a Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct BulkDeleteBody<'a> {
    feature_ids: &'a [String],
}

#[derive(Debug, Serialize)]
struct MergeUnitsBody<'a> {
    feature_ids: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct FeatureEnvelope {
    feature: Value,
}

#[async_trait]
impl FeatureApi for HttpConverterClient {
    async fn list_features(&self, session_id: &str) -> Result<Vec<Value>, ServiceError> {
        let response: FeatureCollectionResponse = self
            .get_json(&self.session_path(session_id, "/features"))
            .await?;
        Ok(response.features)
    }

    async fn generate_draft(&self, session_id: &str) -> Result<GenerateOutcome, ServiceError> {
        self.post_empty(&self.session_path(session_id, "/generate"))
            .await
    }

    async fn patch_feature(
        &self,
        session_id: &str,
        feature_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<Value, ServiceError> {
        let envelope: FeatureEnvelope = self
            .patch_json(
                &self.session_path(session_id, &format!("/features/{}", feature_id)),
                &PatchFeatureBody { properties },
            )
            .await?;
        Ok(envelope.feature)
    }

    async fn delete_feature(
        &self,
        session_id: &str,
        feature_id: &str,
    ) -> Result<(), ServiceError> {
        self.delete(&self.session_path(session_id, &format!("/features/{}", feature_id)))
            .await
    }

    async fn bulk_patch(
        &self,
        session_id: &str,
        feature_ids: &[String],
        properties: &Map<String, Value>,
    ) -> Result<BulkOutcome, ServiceError> {
        self.post_json(
            &self.session_path(session_id, "/features/bulk-patch"),
            &BulkPatchBody { feature_ids, properties },
        )
        .await
    }

    async fn bulk_delete(
        &self,
        session_id: &str,
        feature_ids: &[String],
    ) -> Result<BulkOutcome, ServiceError> {
        self.post_json(
            &self.session_path(session_id, "/features/bulk-delete"),
            &BulkDeleteBody { feature_ids },
        )
        .await
    }

    async fn merge_units(
        &self,
        session_id: &str,
        feature_ids: &[String],
        display_name: Option<&str>,
    ) -> Result<Value, ServiceError> {
        let envelope: FeatureEnvelope = self
            .post_json(
                &self.session_path(session_id, "/features/merge-units"),
                &MergeUnitsBody { feature_ids, display_name },
            )
            .await?;
        Ok(envelope.feature)
    }
}
