/// User-visible acquisition failures. Malformed responses never show up here:
/// the extractor always produces a usable report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    /// No credential, or the service rejected it. Recovered by asking for a key.
    #[error("no usable API credential")]
    CredentialMissing,

    /// Network or service-side error. Recovered by a user-triggered refresh.
    #[error("report service failed: {message}")]
    ServiceFailure { message: String },

    #[error("report service did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },
}

impl AcquisitionError {
    /// Whether a plain refresh can succeed without user input.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::CredentialMissing)
    }
}
