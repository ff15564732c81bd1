use replica_api::ReplicaError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// System-of-record недоступен или нездоров, процесс не стартует.
    #[error("startup: {0}")]
    Startup(String),

    /// Bulk load прерван; уже применённые записи остаются в индексе.
    #[error("bulk load aborted after {applied} records: {source}")]
    BulkLoad { applied: usize, source: ReplicaError },

    #[error("{0}")]
    Replica(#[from] ReplicaError),
}
