use thiserror::Error;

/// Unified error type for the store and its persistence backends.
///
/// An unconfigured remote is deliberately not represented here: it puts the
/// store into local mode without raising anything.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote service answered but the transactions table is missing.
    #[error("Remote schema is not provisioned")]
    SchemaMissing,
    /// A read from the remote service failed.
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),
    /// An insert or delete was rejected by the remote service.
    #[error("Remote write failed: {0}")]
    RemoteWrite(String),
    /// The local fallback blob could not be deserialized.
    #[error("Cached transactions could not be parsed: {0}")]
    CacheParse(String),
    /// A filesystem or serialization failure outside the cases above.
    #[error("Storage error: {0}")]
    Storage(String),
    /// Input rejected at the store boundary.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::CacheParse(err.to_string())
    }
}
