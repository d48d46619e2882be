//! Shared test fixtures: an in-memory fake of the converter backend
//!
//! The fake implements all four service traits over plain mutex state
//! so engines and handlers can be exercised without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use s2i_common::events::EventBus;
use s2i_ui::models::{
    AutofixOutcome, Confidence, ImportedFile, LearningSuggestion, LevelItem, ProjectInfo,
    ValidationReport, WizardState,
};
use s2i_ui::services::{
    AddressCandidate, BulkOutcome, CompanyMappingsOutcome, ExportApi, ExportArchive, FeatureApi,
    FileApi, FilePatch, FilePatchOutcome, GenerateOutcome, MappingsPatch, ServiceError, WizardApi,
};
use s2i_ui::session::store::SessionStore;
use serde_json::{json, Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory converter backend
#[derive(Default)]
pub struct FakeConverter {
    pub files: Mutex<Vec<ImportedFile>>,
    pub wizard: Mutex<WizardState>,
    /// Raw feature rows, exactly as `list_features` returns them
    pub features: Mutex<Vec<Value>>,
    /// Reports returned by successive `validate` calls (last one repeats)
    pub validation_script: Mutex<VecDeque<ValidationReport>>,
    /// Outcomes returned by successive `autofix` calls
    pub autofix_script: Mutex<VecDeque<AutofixOutcome>>,
    /// Suggestion attached to the next file patch response
    pub next_suggestion: Mutex<Option<LearningSuggestion>>,
    /// Force every feature patch to fail with a server error
    pub fail_feature_patch: AtomicBool,
    /// Simulate server-side session eviction
    pub session_gone: AtomicBool,
    /// Bodies of every feature patch issued, in order
    pub patch_log: Mutex<Vec<(String, Map<String, Value>)>>,
    /// Level rows pushed by every wizard levels patch
    pub level_patch_log: Mutex<Vec<Vec<LevelItem>>>,
    pub generate_calls: AtomicUsize,
    pub validate_calls: AtomicUsize,
    pub export_calls: AtomicUsize,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<(), ServiceError> {
        if self.session_gone.load(Ordering::SeqCst) {
            Err(ServiceError::SessionInvalid {
                detail: "Session not found".to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn push_validation(&self, report: ValidationReport) {
        self.validation_script.lock().unwrap().push_back(report);
    }

    pub fn push_autofix(&self, outcome: AutofixOutcome) {
        self.autofix_script.lock().unwrap().push_back(outcome);
    }
}

#[async_trait]
impl FileApi for FakeConverter {
    async fn list_files(&self, _session_id: &str) -> Result<Vec<ImportedFile>, ServiceError> {
        self.guard()?;
        Ok(self.files.lock().unwrap().clone())
    }

    async fn detect_all(&self, _session_id: &str) -> Result<Vec<ImportedFile>, ServiceError> {
        self.guard()?;
        Ok(self.files.lock().unwrap().clone())
    }

    async fn patch_file(
        &self,
        _session_id: &str,
        stem: &str,
        patch: &FilePatch,
    ) -> Result<FilePatchOutcome, ServiceError> {
        self.guard()?;
        let mut files = self.files.lock().unwrap();
        let file = files
            .iter_mut()
            .find(|f| f.stem == stem)
            .ok_or_else(|| ServiceError::SessionInvalid {
                detail: format!("File stem not found: {}", stem),
            })?;
        if let Some(detected_type) = &patch.detected_type {
            file.detected_type = Some(detected_type.clone());
            file.confidence = Confidence::Green;
        }
        if let Some(level) = patch.detected_level {
            file.detected_level = Some(level);
        }
        if let Some(outdoor) = patch.outdoor {
            file.outdoor = outdoor;
        }
        let file = file.clone();
        Ok(FilePatchOutcome {
            file,
            files: files.clone(),
            learning_suggestion: self.next_suggestion.lock().unwrap().take(),
        })
    }
}

#[async_trait]
impl WizardApi for FakeConverter {
    async fn get_wizard(&self, _session_id: &str) -> Result<WizardState, ServiceError> {
        self.guard()?;
        Ok(self.wizard.lock().unwrap().clone())
    }

    async fn patch_project(
        &self,
        _session_id: &str,
        project: &ProjectInfo,
    ) -> Result<WizardState, ServiceError> {
        self.guard()?;
        let mut wizard = self.wizard.lock().unwrap();
        wizard.project = Some(project.clone());
        Ok(wizard.clone())
    }

    async fn patch_levels(
        &self,
        _session_id: &str,
        items: &[LevelItem],
    ) -> Result<WizardState, ServiceError> {
        self.guard()?;
        self.level_patch_log.lock().unwrap().push(items.to_vec());
        let mut wizard = self.wizard.lock().unwrap();
        wizard.levels = items.to_vec();
        Ok(wizard.clone())
    }

    async fn patch_buildings(
        &self,
        _session_id: &str,
        buildings: &[s2i_ui::models::BuildingInfo],
    ) -> Result<WizardState, ServiceError> {
        self.guard()?;
        let mut wizard = self.wizard.lock().unwrap();
        wizard.buildings = buildings.to_vec();
        Ok(wizard.clone())
    }

    async fn patch_mappings(
        &self,
        _session_id: &str,
        patch: &MappingsPatch,
    ) -> Result<WizardState, ServiceError> {
        self.guard()?;
        let mut wizard = self.wizard.lock().unwrap();
        if let Some(unit) = &patch.unit {
            wizard.mappings.unit = unit.clone();
        }
        if let Some(opening) = &patch.opening {
            wizard.mappings.opening = opening.clone();
        }
        if let Some(fixture) = &patch.fixture {
            wizard.mappings.fixture = fixture.clone();
        }
        if let Some(confirmed) = patch.detail_confirmed {
            wizard.mappings.detail_confirmed = confirmed;
        }
        Ok(wizard.clone())
    }

    async fn patch_footprint(
        &self,
        _session_id: &str,
        footprint: &Value,
    ) -> Result<WizardState, ServiceError> {
        self.guard()?;
        let mut wizard = self.wizard.lock().unwrap();
        wizard.footprint = footprint.clone();
        Ok(wizard.clone())
    }

    async fn upload_company_mappings(
        &self,
        _session_id: &str,
        _filename: &str,
        _content: Vec<u8>,
    ) -> Result<CompanyMappingsOutcome, ServiceError> {
        self.guard()?;
        Ok(CompanyMappingsOutcome {
            default_category: "unspecified".to_string(),
            mappings_count: 0,
            unresolved_count: 0,
        })
    }

    async fn search_address(
        &self,
        _query: &str,
        _language: &str,
    ) -> Result<Vec<AddressCandidate>, ServiceError> {
        self.guard()?;
        Ok(Vec::new())
    }
}

#[async_trait]
impl FeatureApi for FakeConverter {
    async fn list_features(&self, _session_id: &str) -> Result<Vec<Value>, ServiceError> {
        self.guard()?;
        Ok(self.features.lock().unwrap().clone())
    }

    async fn generate_draft(&self, _session_id: &str) -> Result<GenerateOutcome, ServiceError> {
        self.guard()?;
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        let generated = vec![
            feature_row("addr-1", "address", json!({"address": "1 Main St", "status": "mapped"})),
            feature_row("bldg-1", "building", json!({"category": "unspecified", "status": "mapped"})),
        ];
        let mut features = self.features.lock().unwrap();
        let count = generated.len();
        features.extend(generated);
        Ok(GenerateOutcome {
            status: "draft".to_string(),
            generated_feature_count: count,
            message: "Draft generation completed".to_string(),
        })
    }

    async fn patch_feature(
        &self,
        _session_id: &str,
        feature_id: &str,
        properties: &Map<String, Value>,
    ) -> Result<Value, ServiceError> {
        self.guard()?;
        if self.fail_feature_patch.load(Ordering::SeqCst) {
            return Err(ServiceError::Server {
                detail: "patch rejected".to_string(),
            });
        }
        self.patch_log
            .lock()
            .unwrap()
            .push((feature_id.to_string(), properties.clone()));

        let mut features = self.features.lock().unwrap();
        let row = features
            .iter_mut()
            .find(|row| row["id"] == feature_id)
            .ok_or_else(|| ServiceError::BadRequest {
                code: "BAD_REQUEST".to_string(),
                detail: format!("unknown feature {}", feature_id),
            })?;
        let merged = row["properties"].as_object_mut().expect("object properties");
        for (key, value) in properties {
            merged.insert(key.clone(), value.clone());
        }
        Ok(row.clone())
    }

    async fn delete_feature(
        &self,
        _session_id: &str,
        feature_id: &str,
    ) -> Result<(), ServiceError> {
        self.guard()?;
        self.features
            .lock()
            .unwrap()
            .retain(|row| row["id"] != feature_id);
        Ok(())
    }

    async fn bulk_patch(
        &self,
        _session_id: &str,
        feature_ids: &[String],
        properties: &Map<String, Value>,
    ) -> Result<BulkOutcome, ServiceError> {
        self.guard()?;
        let mut affected = 0;
        let mut features = self.features.lock().unwrap();
        for row in features.iter_mut() {
            let id = row["id"].as_str().unwrap_or_default().to_string();
            if feature_ids.contains(&id) {
                let merged = row["properties"].as_object_mut().expect("object properties");
                for (key, value) in properties {
                    merged.insert(key.clone(), value.clone());
                }
                affected += 1;
            }
        }
        Ok(BulkOutcome { affected })
    }

    async fn bulk_delete(
        &self,
        _session_id: &str,
        feature_ids: &[String],
    ) -> Result<BulkOutcome, ServiceError> {
        self.guard()?;
        let mut features = self.features.lock().unwrap();
        let before = features.len();
        features.retain(|row| {
            !feature_ids.contains(&row["id"].as_str().unwrap_or_default().to_string())
        });
        Ok(BulkOutcome {
            affected: before - features.len(),
        })
    }

    async fn merge_units(
        &self,
        _session_id: &str,
        feature_ids: &[String],
        display_name: Option<&str>,
    ) -> Result<Value, ServiceError> {
        self.guard()?;
        let mut features = self.features.lock().unwrap();
        features.retain(|row| {
            !feature_ids.contains(&row["id"].as_str().unwrap_or_default().to_string())
        });
        let merged = feature_row(
            "merged-1",
            "unit",
            json!({
                "category": "retail",
                "name": {"en": display_name.unwrap_or("Merged unit")},
                "status": "mapped"
            }),
        );
        features.push(merged.clone());
        Ok(merged)
    }
}

#[async_trait]
impl ExportApi for FakeConverter {
    async fn validate(&self, _session_id: &str) -> Result<ValidationReport, ServiceError> {
        self.guard()?;
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.validation_script.lock().unwrap();
        let report = if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap_or_default()
        };
        Ok(report)
    }

    async fn autofix(
        &self,
        _session_id: &str,
        _apply_destructive: bool,
    ) -> Result<AutofixOutcome, ServiceError> {
        self.guard()?;
        let mut script = self.autofix_script.lock().unwrap();
        script
            .pop_front()
            .ok_or_else(|| ServiceError::Server {
                detail: "no scripted autofix outcome".to_string(),
            })
    }

    async fn export(&self, _session_id: &str) -> Result<ExportArchive, ServiceError> {
        self.guard()?;
        self.export_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ExportArchive {
            bytes: b"PK\x03\x04imdf".to_vec(),
            filename: "venue.imdf.zip".to_string(),
        })
    }
}

// ----------------------------------------------------------------------
// Builders
// ----------------------------------------------------------------------

pub const SESSION_ID: &str = "7b09a2e4-4f3c-4c18-9a53-6f20e254d3a1";

pub fn feature_row(id: &str, feature_type: &str, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "id": id,
        "feature_type": feature_type,
        "geometry": if feature_type == "address" || feature_type == "building" {
            Value::Null
        } else {
            json!({"type": "Polygon", "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]})
        },
        "properties": properties,
    })
}

pub fn imported_file(stem: &str, detected_type: Option<&str>, level: Option<i32>) -> ImportedFile {
    ImportedFile {
        stem: stem.to_string(),
        geometry_type: "Polygon".to_string(),
        feature_count: 4,
        attribute_columns: vec!["CATEGORY".to_string(), "NAME".to_string()],
        detected_type: detected_type.map(String::from),
        detected_level: level,
        confidence: if detected_type.is_some() {
            Confidence::Green
        } else {
            Confidence::Red
        },
        crs_detected: Some("EPSG:4326".to_string()),
        level_name: None,
        short_name: None,
        outdoor: false,
        level_category: "unspecified".to_string(),
        warnings: Vec::new(),
    }
}

/// Wizard state for a fully configured two-file session
pub fn configured_wizard() -> WizardState {
    let mut wizard = WizardState {
        project: Some(ProjectInfo {
            venue_name: "Central Mall".to_string(),
            venue_category: "shoppingcenter".to_string(),
            language: "en".to_string(),
            address: s2i_ui::models::AddressInput {
                address: Some("1 Main St".to_string()),
                locality: "Springfield".to_string(),
                country: "US".to_string(),
                ..Default::default()
            },
        }),
        buildings: vec![s2i_ui::models::BuildingInfo {
            id: "building-1".to_string(),
            file_stems: vec!["unit_a".to_string(), "opening_b".to_string()],
            ..Default::default()
        }],
        ..Default::default()
    };
    wizard.mappings.unit.code_column = Some("CATEGORY".to_string());
    wizard
}

/// Converter preloaded with the classified two-file session
pub fn configured_converter() -> Arc<FakeConverter> {
    let converter = Arc::new(FakeConverter::new());
    *converter.files.lock().unwrap() = vec![
        imported_file("unit_a", Some("unit"), Some(0)),
        imported_file("opening_b", Some("opening"), Some(0)),
    ];
    *converter.wizard.lock().unwrap() = configured_wizard();
    *converter.features.lock().unwrap() = vec![
        feature_row("u1", "unit", json!({"category": "retail", "level_id": "L0", "status": "mapped", "name": {"en": "Coffee"}})),
        feature_row("u2", "unit", json!({"category": "restroom", "level_id": "L0", "status": "mapped"})),
        feature_row("o1", "opening", json!({"category": "pedestrian", "level_id": "L0", "status": "mapped"})),
    ];
    converter
}

/// Store seeded from the converter's current files/wizard state
pub async fn open_store(converter: &Arc<FakeConverter>) -> Arc<SessionStore> {
    let files = converter.files.lock().unwrap().clone();
    let wizard = converter.wizard.lock().unwrap().clone();
    Arc::new(SessionStore::new(
        SESSION_ID,
        files,
        wizard,
        EventBus::new(256),
    ))
}

/// Full engine stack over one fake converter
pub struct TestHarness {
    pub converter: Arc<FakeConverter>,
    pub store: Arc<SessionStore>,
    pub review: Arc<s2i_ui::review::ReviewEngine>,
    pub wizard: s2i_ui::wizard::WizardController,
    pub export: s2i_ui::export::ExportGate,
}

pub async fn harness(converter: Arc<FakeConverter>) -> TestHarness {
    let store = open_store(&converter).await;
    let review = Arc::new(s2i_ui::review::ReviewEngine::new(converter.clone()));
    let wizard = s2i_ui::wizard::WizardController::new(converter.clone(), review.clone());
    let export = s2i_ui::export::ExportGate::new(converter.clone(), review.clone());
    TestHarness {
        converter,
        store,
        review,
        wizard,
        export,
    }
}
