use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::{Item, RecordKey, ReplicaError};

/// System-of-record: авторитетный источник записей.
///
/// Steady-state пути используют только `read_items`; остальное:
/// lifecycle (provision/seed) и health gate при старте.
pub trait SystemOfRecord: Send + Sync {
    /// Bulk read: до `limit` документов `{"~id", "~version", "color", "text"}`.
    fn read_items(&self, limit: usize)
        -> Pin<Box<dyn Future<Output = Result<Vec<Value>, ReplicaError>> + Send + '_>>;

    /// Create/update одной записи с audit комментарием.
    fn update_item(&self, key: &RecordKey, item: &Item, comment: &str)
        -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    fn create_table(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    fn drop_table(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    fn table_size(&self) -> Pin<Box<dyn Future<Output = Result<u64, ReplicaError>> + Send + '_>>;

    /// Liveness: сервис отвечает.
    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    /// Readiness: все storage компоненты здоровы.
    fn healthcheck(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;
}
