use thiserror::Error;

/// Result type for cluster operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Node indices start at 1.
    #[error("invalid node index: {0}")]
    InvalidNodeIndex(u8),

    /// The readiness marker could not be compiled into a pattern.
    #[error("invalid readiness marker: {0}")]
    InvalidMarker(#[from] regex::Error),

    /// A topology string could not be parsed.
    #[error("invalid topology `{0}`: {1}")]
    InvalidTopology(String, &'static str),

    /// The cluster-management tool failed.
    #[error(transparent)]
    Process(#[from] ccm_process::Error),

    /// The readiness marker never appeared and the policy is to fail.
    #[error("cluster not ready after {attempts} attempts")]
    ReadinessExhausted {
        /// Number of log polls made.
        attempts: u32,
    },
}
