//! Converter backend clients
//!
//! The converter is consumed as four black-box service areas, each
//! behind an `async_trait` seam so engines can be exercised against
//! in-memory fakes. `HttpConverterClient` implements all four against
//! the real backend.

pub mod client;
pub mod error;
pub mod export;
pub mod features;
pub mod files;
pub mod wizard;

pub use client::HttpConverterClient;
pub use error::{ErrorBody, ServiceError};
pub use export::{ExportApi, ExportArchive};
pub use features::{BulkOutcome, FeatureApi, GenerateOutcome};
pub use files::{FileApi, FilePatch, FilePatchOutcome};
pub use wizard::{AddressCandidate, CompanyMappingsOutcome, MappingsPatch, WizardApi};
