//! Error types for the remote-service contracts

use sfk_record::UpdateError;

/// Document store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Update target does not exist
    #[error("document {collection}/{id} not found")]
    NotFound { collection: String, id: String },

    /// A partial update could not be applied
    #[error("update failed: {0}")]
    Update(#[from] UpdateError),

    /// Document payload could not be (de)serialized
    #[error("document serialization failed: {0}")]
    Serialization(String),

    /// Transport-level failure (network, permission)
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Identity service failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// Anonymous sign-in rejected
    #[error("anonymous sign-in failed: {0}")]
    SignInFailed(String),

    /// Profile mutation attempted without a session
    #[error("no authenticated session")]
    NoSession,
}

/// Study API endpoint failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Endpoint answered with a non-2xx status
    #[error("endpoint {endpoint} answered {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },

    /// Request never reached the endpoint
    #[error("request to {endpoint} failed: {reason}")]
    Transport {
        endpoint: &'static str,
        reason: String,
    },
}
