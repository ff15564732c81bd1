mod query;
mod store;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use replica_api::{Item, ItemIndex, RecordKey, ReplicaError, VersionedRecord};

pub use query::QueryService;
pub use store::{UpdateOutcome, VersionedStore};

// ═══════════════════════════════════════════════════════════════
//  MemoryIndex
// ═══════════════════════════════════════════════════════════════

/// In-process backend: `VersionedStore` для записи, `QueryService` для
/// чтения. Ни одна операция не уходит в сеть, поэтому ошибок не бывает.
#[derive(Clone)]
pub struct MemoryIndex {
    store: Arc<VersionedStore>,
    queries: QueryService,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::with_store(Arc::new(VersionedStore::new()))
    }

    pub fn with_store(store: Arc<VersionedStore>) -> Self {
        Self {
            queries: QueryService::new(store.clone()),
            store,
        }
    }

    pub fn store(&self) -> &Arc<VersionedStore> {
        &self.store
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }
}

impl ItemIndex for MemoryIndex {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(
        &self,
        key: &RecordKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VersionedRecord>, ReplicaError>> + Send + '_>> {
        let found = self.store.get(key);
        Box::pin(async move { Ok(found) })
    }

    fn update(
        &self,
        candidate: VersionedRecord,
    ) -> Pin<Box<dyn Future<Output = Result<bool, ReplicaError>> + Send + '_>> {
        Box::pin(async move { Ok(self.store.update(candidate).is_applied()) })
    }

    fn get_by_key(
        &self,
        key: &RecordKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Item>, ReplicaError>> + Send + '_>> {
        let found = self.queries.get_by_key(key);
        Box::pin(async move { Ok(found) })
    }

    fn get_by_attribute(
        &self,
        color: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Item>, ReplicaError>> + Send + '_>> {
        let matches = self.queries.get_by_attribute(color);
        Box::pin(async move { Ok(matches) })
    }
}
