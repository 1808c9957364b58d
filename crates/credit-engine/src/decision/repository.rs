use super::domain::{DocumentId, EvaluationId, EvaluationRecord};

/// Storage abstraction for the append-only evaluation ledger. The engine
/// assumes nothing about the backing technology; records are written once
/// and never updated.
pub trait EvaluationRepository: Send + Sync {
    fn save(&self, record: EvaluationRecord) -> Result<EvaluationId, RepositoryError>;
    fn find_latest(
        &self,
        document: &DocumentId,
    ) -> Result<Option<EvaluationRecord>, RepositoryError>;
    fn history(&self, document: &DocumentId) -> Result<Vec<EvaluationRecord>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
