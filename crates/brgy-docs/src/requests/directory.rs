use super::domain::ResidentSummary;

/// Boundary to the externally-owned resident registry. The lifecycle service
/// consults it exactly once, at submission, to snapshot display fields; the
/// engine never writes back.
pub trait ResidentDirectory: Send + Sync {
    fn summary(&self, resident_id: u64) -> Result<ResidentSummary, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("resident {0} is not on the registry")]
    NotFound(u64),
    #[error("resident registry unavailable: {0}")]
    Unavailable(String),
}
