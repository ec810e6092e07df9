use super::AcquisitionError;
use crate::models::{CitationRef, MarketReport, RawResponse};
use crate::services::dedup::dedupe_citations;
use crate::services::extraction::{FallbackReason, ResponseExtractor};
use crate::services::generation::{GenerationError, GenerationService};
use crate::services::prompt::ReportRequest;
use std::fmt;
use std::time::{Duration, Instant};

/// Monotonically increasing identifier of an acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttemptId(pub(crate) u64);

impl AttemptId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work handed out by the state machine: one call to the generation service.
#[derive(Debug)]
pub struct Attempt {
    pub(crate) id: AttemptId,
    pub(crate) request: ReportRequest,
    pub(crate) timeout: Duration,
}

/// Report recovered by a successful attempt, ready to publish.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredReport {
    pub report: MarketReport,
    /// Deduplicated sources.
    pub citations: Vec<CitationRef>,
    pub raw_text: String,
    /// Set when `report` is a synthesized placeholder.
    pub fallback: Option<FallbackReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptFailure {
    pub error: AcquisitionError,
    pub partial_text: Option<String>,
}

/// Result of [`Attempt::execute`], fed back through `AcquisitionStateMachine::apply`.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptOutcome {
    pub id: AttemptId,
    pub result: Result<AcquiredReport, AttemptFailure>,
}

impl Attempt {
    pub fn id(&self) -> AttemptId {
        self.id
    }

    pub fn request(&self) -> &ReportRequest {
        &self.request
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls the service under the attempt's timeout, then extracts the
    /// report and cleans its citations.
    pub async fn execute(self, service: &dyn GenerationService) -> AttemptOutcome {
        let started = Instant::now();
        tracing::info!(attempt = %self.id, key = %self.request.credential.fingerprint(), "acquisition started");

        let result = match tokio::time::timeout(self.timeout, service.generate(&self.request)).await
        {
            Ok(Ok(raw)) => Ok(acquire(raw)),
            Ok(Err(GenerationError::Unauthenticated(reason))) => {
                tracing::warn!(attempt = %self.id, %reason, "credential rejected by service");
                Err(AttemptFailure {
                    error: AcquisitionError::CredentialMissing,
                    partial_text: None,
                })
            }
            Ok(Err(GenerationError::Failed {
                message,
                partial_text,
            })) => {
                tracing::warn!(attempt = %self.id, %message, "generation failed");
                Err(AttemptFailure {
                    error: AcquisitionError::ServiceFailure { message },
                    partial_text,
                })
            }
            Ok(Err(GenerationError::TimedOut)) | Err(_) => {
                let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(attempt = %self.id, timeout_ms, "generation timed out");
                Err(AttemptFailure {
                    error: AcquisitionError::Timeout { timeout_ms },
                    partial_text: None,
                })
            }
        };

        tracing::debug!(
            attempt = %self.id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "acquisition finished"
        );
        AttemptOutcome {
            id: self.id,
            result,
        }
    }
}

fn acquire(raw: RawResponse) -> AcquiredReport {
    let extraction = ResponseExtractor::new().extract(&raw);
    let citations = dedupe_citations(&raw.citations);
    if let Some(reason) = &extraction.fallback {
        tracing::warn!(%reason, "structured report unavailable, keeping raw text");
    }
    tracing::debug!(
        citations = citations.len(),
        dropped = raw.citations.len() - citations.len(),
        "citations deduplicated"
    );
    AcquiredReport {
        report: extraction.report,
        citations,
        raw_text: raw.text,
        fallback: extraction.fallback,
    }
}
