use async_trait::async_trait;
use marketbrief::acquisition::AcquisitionStateMachine;
use marketbrief::credentials::{CredentialResolver, FileCredentialStore, StaticEnvironment};
use marketbrief::models::RawResponse;
use marketbrief::services::generation::{GenerationError, GenerationService};
use marketbrief::services::prompt::{ReportRequest, ReportRequestBuilder};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub struct IntegrationHarness {
    workspace: TempDir,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        Self { workspace }
    }

    pub fn credential_path(&self) -> PathBuf {
        self.workspace.path().join("credentials").join("api_key")
    }

    pub fn store(&self) -> FileCredentialStore {
        FileCredentialStore::new(self.credential_path())
    }

    /// Machine backed by this workspace's credential file and a fixed environment value.
    pub fn machine(&self, env_key: Option<&str>) -> AcquisitionStateMachine {
        self.machine_with_timeout(env_key, Duration::from_secs(5))
    }

    pub fn machine_with_timeout(
        &self,
        env_key: Option<&str>,
        timeout: Duration,
    ) -> AcquisitionStateMachine {
        AcquisitionStateMachine::new(
            CredentialResolver::new(self.store(), StaticEnvironment::new(env_key)),
            ReportRequestBuilder::new(),
            timeout,
        )
    }
}

/// Answers every request with the same result.
pub struct StaticService(pub Result<RawResponse, GenerationError>);

impl StaticService {
    pub fn text(text: &str) -> Self {
        Self(Ok(RawResponse::new(text, Vec::new())))
    }

    pub fn rejecting() -> Self {
        Self(Err(GenerationError::Unauthenticated("API_KEY_INVALID".into())))
    }
}

#[async_trait]
impl GenerationService for StaticService {
    async fn generate(&self, _request: &ReportRequest) -> Result<RawResponse, GenerationError> {
        self.0.clone()
    }
}

/// Never answers.
pub struct StalledService;

#[async_trait]
impl GenerationService for StalledService {
    async fn generate(&self, _request: &ReportRequest) -> Result<RawResponse, GenerationError> {
        std::future::pending().await
    }
}

pub fn report_text(date: &str, up_count: u32, narrative: &str) -> String {
    format!(
        "```json\n{{\"date\":\"{date}\",\"sentiment\":{{\"upCount\":{up_count}}},\"hotSectors\":[],\"ladder\":[],\"styleAnalysis\":\"mixed\"}}\n```\n{narrative}"
    )
}

mod credential_persistence;
mod extraction_contract;
mod extraction_properties;
