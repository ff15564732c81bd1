#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("seed file '{path}': {detail}")]
    Seed { path: String, detail: String },

    #[error("gateway: {0}")]
    Gateway(String),

    #[error("{0}")]
    Replica(#[from] replica_api::ReplicaError),

    #[error("{0}")]
    Engine(#[from] replica_engine::EngineError),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
