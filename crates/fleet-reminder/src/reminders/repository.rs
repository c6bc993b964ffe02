use async_trait::async_trait;

use super::domain::{ExpirableRecord, RecordKind};

/// Read-only storage abstraction over one record kind so cycles can be
/// exercised against fakes. Adapters are built by the composition root and
/// injected; nothing in this subsystem holds a global store handle.
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Which record kind this repository lists.
    fn kind(&self) -> RecordKind;

    /// Every record of this kind currently in the store. Called fresh each
    /// cycle; results are never cached across cycles.
    async fn list_all(&self) -> Result<Vec<ExpirableRecord>, RepositoryError>;
}

/// Error enumeration for record store failures. Fatal only to the failing
/// kind's scan within the current cycle, never to the process.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed record data: {0}")]
    Malformed(String),
}
