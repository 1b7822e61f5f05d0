use thiserror::Error;

/// Failure talking to the remote store. Every variant is recoverable: local
/// state is left unchanged and the operation is safe to retry.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("remote store unreachable: {0}")]
    Unreachable(String),

    #[error("remote request timed out after {0}s")]
    Timeout(u64),

    #[error("remote store failure: {0}")]
    Internal(String),
}

impl RemoteError {
    pub fn is_recoverable(&self) -> bool {
        match self {
            RemoteError::Unreachable(_) | RemoteError::Timeout(_) | RemoteError::Internal(_) => {
                true
            }
        }
    }
}

/// Error type for the sync engine's operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The local store failed; fatal to the operation, nothing was partially
    /// written.
    #[error("local store failure: {0:#}")]
    Local(anyhow::Error),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// The import payload parsed but contained no records.
    #[error("import payload contains no readings")]
    EmptyImport,

    /// The import payload could not be understood; rejected before any store
    /// mutation.
    #[error("malformed import payload: {0}")]
    MalformedImport(String),
}

impl From<anyhow::Error> for SyncError {
    fn from(err: anyhow::Error) -> Self {
        SyncError::Local(err)
    }
}

impl SyncError {
    /// Whether retrying the same call later can succeed without operator
    /// intervention.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SyncError::Remote(err) if err.is_recoverable())
    }
}
