use std::future::Future;
use std::pin::Pin;

use crate::{Item, RecordKey, ReplicaError, VersionedRecord};

/// Capability interface индекса записей.
///
/// Две реализации: in-process `MemoryIndex` (VersionedStore + QueryService)
/// и удалённый search backend. Выбирается один раз при старте.
///
/// Контракт `update`: кандидат принимается только если его версия строго
/// больше сохранённой (или ключа ещё нет). Stale update это `Ok(false)`,
/// не ошибка.
pub trait ItemIndex: Send + Sync {
    /// Короткое имя backend'а для логов.
    fn name(&self) -> &'static str;

    /// Получить копию записи с версией.
    fn get(&self, key: &RecordKey)
        -> Pin<Box<dyn Future<Output = Result<Option<VersionedRecord>, ReplicaError>> + Send + '_>>;

    /// Optimistic update: `true` если кандидат принят.
    fn update(&self, candidate: VersionedRecord)
        -> Pin<Box<dyn Future<Output = Result<bool, ReplicaError>> + Send + '_>>;

    /// Payload по ключу. `None` означает not found, не ошибку.
    fn get_by_key(&self, key: &RecordKey)
        -> Pin<Box<dyn Future<Output = Result<Option<Item>, ReplicaError>> + Send + '_>>;

    /// Все payload'ы, у которых `color` равен `color` (unset == unset).
    fn get_by_attribute(&self, color: Option<&str>)
        -> Pin<Box<dyn Future<Output = Result<Vec<Item>, ReplicaError>> + Send + '_>>;
}
