//! Report acquisition lifecycle.
//!
//! The machine never performs I/O itself. Transitions that need the service
//! hand back an [`Attempt`]; the caller runs it and passes the outcome to
//! [`AcquisitionStateMachine::apply`]. Only the outcome of the attempt the
//! machine is currently waiting on is accepted, so a late answer to an older
//! request can never overwrite newer state.

pub mod attempt;
pub mod error;

pub use attempt::{AcquiredReport, Attempt, AttemptFailure, AttemptId, AttemptOutcome};
pub use error::AcquisitionError;

use crate::credentials::{Credential, CredentialResolver, CredentialSource};
use crate::models::{CitationRef, MarketReport};
use crate::services::generation::GenerationService;
use crate::services::prompt::ReportRequestBuilder;
use std::time::Duration;

/// Application lifecycle as seen by the user. Exactly one is current.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionState {
    NeedsCredential,
    Loading {
        attempt: AttemptId,
    },
    Ready {
        report: MarketReport,
        citations: Vec<CitationRef>,
        raw_text: String,
    },
    Failed {
        error: AcquisitionError,
        partial_text: Option<String>,
    },
}

impl AcquisitionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::NeedsCredential => "needs_credential",
            Self::Loading { .. } => "loading",
            Self::Ready { .. } => "ready",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    pub fn report(&self) -> Option<&MarketReport> {
        match self {
            Self::Ready { report, .. } => Some(report),
            _ => None,
        }
    }
}

pub struct AcquisitionStateMachine {
    resolver: CredentialResolver,
    builder: ReportRequestBuilder,
    timeout: Duration,
    credential: Option<Credential>,
    state: AcquisitionState,
    last_attempt: u64,
}

impl AcquisitionStateMachine {
    /// Creates a machine in `NeedsCredential`; call [`Self::start`] to resolve a key.
    pub fn new(resolver: CredentialResolver, builder: ReportRequestBuilder, timeout: Duration) -> Self {
        Self {
            resolver,
            builder,
            timeout,
            credential: None,
            state: AcquisitionState::NeedsCredential,
            last_attempt: 0,
        }
    }

    pub fn state(&self) -> &AcquisitionState {
        &self.state
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    pub fn resolver(&self) -> &CredentialResolver {
        &self.resolver
    }

    /// Resolves a credential (explicit, stored, environment) and begins loading
    /// when one is found. An explicit value is persisted.
    pub fn start(&mut self, explicit: Option<&str>) -> Option<Attempt> {
        match self.resolver.resolve_with_source(explicit) {
            Some((credential, source)) => {
                tracing::info!(?source, key = %credential.fingerprint(), "credential resolved");
                if source == CredentialSource::Explicit {
                    self.persist(&credential);
                }
                Some(self.begin_attempt(credential))
            }
            None => {
                tracing::info!("no credential configured");
                self.credential = None;
                self.transition(AcquisitionState::NeedsCredential);
                None
            }
        }
    }

    /// Accepts a user-entered key while waiting for one. Blank input is ignored.
    pub fn submit_credential(&mut self, value: &str) -> Option<Attempt> {
        if !matches!(self.state, AcquisitionState::NeedsCredential) {
            tracing::debug!(state = self.state.name(), "credential submission ignored");
            return None;
        }
        let credential = Credential::new(value)?;
        self.persist(&credential);
        Some(self.begin_attempt(credential))
    }

    /// Starts a new attempt from `Ready` or `Failed`. Ignored while loading.
    pub fn refresh(&mut self) -> Option<Attempt> {
        match self.state {
            AcquisitionState::Loading { attempt } => {
                tracing::debug!(%attempt, "refresh ignored while loading");
                None
            }
            AcquisitionState::NeedsCredential => None,
            AcquisitionState::Ready { .. } | AcquisitionState::Failed { .. } => {
                match self.credential.clone() {
                    Some(credential) => Some(self.begin_attempt(credential)),
                    None => {
                        self.transition(AcquisitionState::NeedsCredential);
                        None
                    }
                }
            }
        }
    }

    /// Forgets the key everywhere and drops any held report.
    pub fn clear_credential(&mut self) {
        if let Err(err) = self.resolver.store_mut().clear() {
            tracing::warn!(error = %err, "failed to clear stored credential");
        }
        self.credential = None;
        self.transition(AcquisitionState::NeedsCredential);
    }

    /// Publishes an attempt outcome. Returns `false` when the outcome is stale
    /// (not the attempt currently loading) and was discarded.
    pub fn apply(&mut self, outcome: AttemptOutcome) -> bool {
        let AcquisitionState::Loading { attempt } = self.state else {
            tracing::debug!(attempt = %outcome.id, state = self.state.name(), "discarding outcome, not loading");
            return false;
        };
        if attempt != outcome.id {
            tracing::debug!(attempt = %outcome.id, current = %attempt, "discarding stale outcome");
            return false;
        }

        let next = match outcome.result {
            Ok(acquired) => {
                tracing::info!(
                    %attempt,
                    date = %acquired.report.date,
                    sources = acquired.citations.len(),
                    placeholder = acquired.fallback.is_some(),
                    "report ready"
                );
                AcquisitionState::Ready {
                    report: acquired.report,
                    citations: acquired.citations,
                    raw_text: acquired.raw_text,
                }
            }
            Err(AttemptFailure {
                error: AcquisitionError::CredentialMissing,
                ..
            }) => {
                // Rejected keys stay in the store until the user clears them.
                self.credential = None;
                AcquisitionState::NeedsCredential
            }
            Err(AttemptFailure {
                error,
                partial_text,
            }) => AcquisitionState::Failed {
                error,
                partial_text,
            },
        };
        self.transition(next);
        true
    }

    /// Runs `attempt` against `service` and applies its outcome.
    pub async fn settle(
        &mut self,
        attempt: Attempt,
        service: &dyn GenerationService,
    ) -> &AcquisitionState {
        let outcome = attempt.execute(service).await;
        self.apply(outcome);
        &self.state
    }

    fn begin_attempt(&mut self, credential: Credential) -> Attempt {
        self.last_attempt += 1;
        let id = AttemptId(self.last_attempt);
        let request = self.builder.build(&credential);
        self.credential = Some(credential);
        self.transition(AcquisitionState::Loading { attempt: id });
        Attempt {
            id,
            request,
            timeout: self.timeout,
        }
    }

    fn persist(&mut self, credential: &Credential) {
        if let Err(err) = self.resolver.store_mut().set(credential) {
            tracing::warn!(error = %err, "failed to persist credential");
        }
    }

    fn transition(&mut self, next: AcquisitionState) {
        tracing::info!(from = self.state.name(), to = next.name(), "acquisition state changed");
        self.state = next;
    }
}
