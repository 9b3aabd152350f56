pub mod clock;
pub mod feed;
pub mod images;
pub mod ranking;
pub mod repository;
pub mod session;

/// Error taxonomy for the whole engine.
///
/// `Validation` recovers locally and is shown inline; `RemoteRejection` means
/// the backend declined a mutation; `TransientNetwork` is retried only when
/// the user re-triggers the action; `AuthExpiry` forces a sign-out.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Request rejected by backend: {0}")]
    RemoteRejection(String),
    #[error("Network error: {0}")]
    TransientNetwork(String),
    #[error("Session expired")]
    AuthExpiry,
    #[error("Not found: {0}")]
    NotFound(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
