use std::sync::Arc;

use index_elastic::{ElasticConfig, ElasticIndex};
use index_memory::MemoryIndex;
use replica_api::{ItemIndex, ReplicaError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Memory,
    Elastic,
}

/// Индекс, выбранный один раз при старте. Переключения в runtime нет.
#[derive(Clone)]
pub struct Backend {
    kind: BackendKind,
    index: Arc<dyn ItemIndex>,
}

impl Backend {
    pub fn memory() -> Self {
        Self {
            kind: BackendKind::Memory,
            index: Arc::new(MemoryIndex::new()),
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn index(&self) -> Arc<dyn ItemIndex> {
        self.index.clone()
    }
}

/// Выбрать backend: удалённый индекс, если он сконфигурирован, отвечает
/// на probe и успешно очищается; иначе in-memory.
pub async fn select_backend(preferred: Option<ElasticConfig>) -> Backend {
    let Some(config) = preferred else {
        tracing::info!("no remote index configured, using in-memory backend");
        return Backend::memory();
    };

    let url = config.url.clone();
    match prepare_remote(config).await {
        Ok(remote) => Backend {
            kind: BackendKind::Elastic,
            index: Arc::new(remote),
        },
        Err(e) => {
            tracing::warn!(%url, error = %e, "remote index unavailable, falling back to in-memory backend");
            Backend::memory()
        }
    }
}

async fn prepare_remote(config: ElasticConfig) -> Result<ElasticIndex, ReplicaError> {
    let remote = ElasticIndex::new(config)?;
    remote.probe().await?;
    remote.reset().await?;
    Ok(remote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_remote_configured_selects_memory() {
        let backend = select_backend(None).await;
        assert_eq!(backend.kind(), BackendKind::Memory);
        assert_eq!(backend.index().name(), "memory");
    }

    #[tokio::test]
    async fn unreachable_remote_falls_back_to_memory() {
        let config = ElasticConfig {
            url: "http://127.0.0.1:1".into(),
            request_timeout_ms: 200,
            ..ElasticConfig::default()
        };
        let backend = select_backend(Some(config)).await;
        assert_eq!(backend.kind(), BackendKind::Memory);
    }
}
