pub mod acquisition;
pub mod config;
pub mod credentials;
pub mod models;
pub mod services;
pub mod telemetry;

// Re-export commonly used types for convenience.
pub use acquisition::{AcquisitionError, AcquisitionState, AcquisitionStateMachine, Attempt};
pub use config::AppConfig;
pub use credentials::{Credential, CredentialResolver};
pub use models::{CitationRef, MarketReport, RawResponse};
pub use services::{GenerationService, ReportRequestBuilder, ResponseExtractor};
