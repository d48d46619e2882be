//! Wizard configuration service client
//!
//! Section-by-section patches against the converter's wizard blob,
//! plus the company code-mapping upload and address search
//! passthroughs.

use crate::models::{
    AddressInput, BuildingInfo, FixtureMapping, LevelItem, OpeningMapping, ProjectInfo,
    UnitMapping, WizardState,
};
use crate::services::client::HttpConverterClient;
use crate::services::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Partial mappings update; only populated sections are sent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening: Option<OpeningMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixture: Option<FixtureMapping>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_confirmed: Option<bool>,
}

/// Summary of an accepted company code-mapping upload
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyMappingsOutcome {
    pub default_category: String,
    pub mappings_count: usize,
    #[serde(default)]
    pub unresolved_count: usize,
}

/// One geocoder hit for address autofill
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddressCandidate {
    pub display_name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub address: AddressInput,
}

/// Wizard service contract
#[async_trait]
pub trait WizardApi: Send + Sync {
    async fn get_wizard(&self, session_id: &str) -> Result<WizardState, ServiceError>;

    async fn patch_project(
        &self,
        session_id: &str,
        project: &ProjectInfo,
    ) -> Result<WizardState, ServiceError>;

    async fn patch_levels(
        &self,
        session_id: &str,
        items: &[LevelItem],
    ) -> Result<WizardState, ServiceError>;

    async fn patch_buildings(
        &self,
        session_id: &str,
        buildings: &[BuildingInfo],
    ) -> Result<WizardState, ServiceError>;

    async fn patch_mappings(
        &self,
        session_id: &str,
        patch: &MappingsPatch,
    ) -> Result<WizardState, ServiceError>;

    async fn patch_footprint(
        &self,
        session_id: &str,
        footprint: &Value,
    ) -> Result<WizardState, ServiceError>;

    /// Upload a company code-mapping document (JSON)
    async fn upload_company_mappings(
        &self,
        session_id: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<CompanyMappingsOutcome, ServiceError>;

    /// Search addresses for project autofill
    async fn search_address(
        &self,
        query: &str,
        language: &str,
    ) -> Result<Vec<AddressCandidate>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct WizardResponse {
    wizard: WizardState,
}

#[derive(Debug, Serialize)]
struct LevelsBody<'a> {
    items: &'a [LevelItem],
}

#[derive(Debug, Serialize)]
struct BuildingsBody<'a> {
    buildings: &'a [BuildingInfo],
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    matches: Vec<AddressCandidate>,
}

#[async_trait]
impl WizardApi for HttpConverterClient {
    async fn get_wizard(&self, session_id: &str) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .get_json(&self.session_path(session_id, "/wizard"))
            .await?;
        Ok(response.wizard)
    }

    async fn patch_project(
        &self,
        session_id: &str,
        project: &ProjectInfo,
    ) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .patch_json(&self.session_path(session_id, "/wizard/project"), project)
            .await?;
        Ok(response.wizard)
    }

    async fn patch_levels(
        &self,
        session_id: &str,
        items: &[LevelItem],
    ) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .patch_json(
                &self.session_path(session_id, "/wizard/levels"),
                &LevelsBody { items },
            )
            .await?;
        Ok(response.wizard)
    }

    async fn patch_buildings(
        &self,
        session_id: &str,
        buildings: &[BuildingInfo],
    ) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .patch_json(
                &self.session_path(session_id, "/wizard/buildings"),
                &BuildingsBody { buildings },
            )
            .await?;
        Ok(response.wizard)
    }

    async fn patch_mappings(
        &self,
        session_id: &str,
        patch: &MappingsPatch,
    ) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .patch_json(&self.session_path(session_id, "/wizard/mappings"), patch)
            .await?;
        Ok(response.wizard)
    }

    async fn patch_footprint(
        &self,
        session_id: &str,
        footprint: &Value,
    ) -> Result<WizardState, ServiceError> {
        let response: WizardResponse = self
            .patch_json(&self.session_path(session_id, "/wizard/footprint"), footprint)
            .await?;
        Ok(response.wizard)
    }

    async fn upload_company_mappings(
        &self,
        session_id: &str,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<CompanyMappingsOutcome, ServiceError> {
        self.post_document(
            &self.session_path(session_id, "/config/company-mappings"),
            "file",
            filename,
            content,
        )
        .await
    }

    async fn search_address(
        &self,
        query: &str,
        language: &str,
    ) -> Result<Vec<AddressCandidate>, ServiceError> {
        let path = format!(
            "/api/geocode/search?q={}&language={}",
            urlencode(query),
            urlencode(language)
        );
        let response: GeocodeResponse = self.get_json(&path).await?;
        Ok(response.matches)
    }
}

/// Minimal percent-encoding for query parameters
fn urlencode(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            b' ' => encoded.push('+'),
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}
