use thiserror::Error;

/// Internal audit-trail failures. These never cross the authorization
/// boundary: the gate's logger wrapper reports them on the diagnostic
/// channel and continues.
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Audit trail error: {0}")]
    Trail(String),

    #[error("Hash verification failed")]
    HashVerificationFailed,
}

pub type Result<T> = std::result::Result<T, AuditError>;
