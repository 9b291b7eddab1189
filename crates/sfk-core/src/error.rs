//! Flow error taxonomy
//!
//! Controllers classify failures here so the surface layer can pick the
//! right participant-facing message. None of these ever abort the flow:
//! the calling controller logs, surfaces and leaves the page retryable.

use crate::forms::ValidationError;
use sfk_record::TokenError;
use sfk_store::{ApiError, IdentityError, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// No authenticated session where one is required
    #[error("no authenticated session")]
    MissingIdentity,

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
