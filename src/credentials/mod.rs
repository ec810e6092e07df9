//! API credential handling.
//!
//! A credential is looked up from, in order: an explicitly supplied value, the
//! persistent store, and the process environment. Absence is an ordinary
//! outcome; callers decide how to ask for a key.

pub mod store;

pub use store::{
    CredentialStore, EnvironmentSource, FileCredentialStore, MemoryCredentialStore,
    ProcessEnvironment, StaticEnvironment,
};

use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque API secret. Never empty; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trims the value; blank input yields `None`.
    pub fn new(value: impl AsRef<str>) -> Option<Self> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Raw secret, for the transport layer only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Short SHA-256 prefix that identifies the key in logs without revealing it.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        format!("{:x}", digest)[..8].to_string()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential({})", self.fingerprint())
    }
}

/// Where a resolved credential came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Explicit,
    Store,
    Environment,
}

/// Ordered lookup over the explicit value, the store and the environment.
pub struct CredentialResolver {
    store: Box<dyn CredentialStore>,
    environment: Box<dyn EnvironmentSource>,
}

impl CredentialResolver {
    pub fn new(
        store: impl CredentialStore + 'static,
        environment: impl EnvironmentSource + 'static,
    ) -> Self {
        Self {
            store: Box::new(store),
            environment: Box::new(environment),
        }
    }

    /// First non-blank value wins. A store read failure counts as absent.
    pub fn resolve(&self, explicit: Option<&str>) -> Option<Credential> {
        self.resolve_with_source(explicit)
            .map(|(credential, _)| credential)
    }

    pub fn resolve_with_source(
        &self,
        explicit: Option<&str>,
    ) -> Option<(Credential, CredentialSource)> {
        if let Some(credential) = explicit.and_then(Credential::new) {
            return Some((credential, CredentialSource::Explicit));
        }
        match self.store.get() {
            Ok(Some(credential)) => return Some((credential, CredentialSource::Store)),
            Ok(None) => {}
            Err(err) => tracing::warn!(error = %err, "credential store read failed"),
        }
        self.environment
            .get()
            .map(|credential| (credential, CredentialSource::Environment))
    }

    pub fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn CredentialStore {
        self.store.as_mut()
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver").finish_non_exhaustive()
    }
}
