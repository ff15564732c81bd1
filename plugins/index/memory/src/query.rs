use std::sync::Arc;

use replica_api::{Item, RecordKey};

use crate::VersionedStore;

/// Read-only фасад над `VersionedStore`.
///
/// Без побочных эффектов, безопасен для любого числа конкурентных
/// читателей параллельно с update'ами. Консистентность eventual:
/// вызов может увидеть частично применённый batch.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<VersionedStore>,
}

impl QueryService {
    pub fn new(store: Arc<VersionedStore>) -> Self {
        Self { store }
    }

    /// Payload по ключу; `None` означает not found.
    pub fn get_by_key(&self, key: &RecordKey) -> Option<Item> {
        self.store.get(key).map(|record| record.item)
    }

    /// Все payload'ы с данным `color`, в порядке обхода store.
    /// Unset ищется как unset: `None` находит записи без цвета.
    pub fn get_by_attribute(&self, color: Option<&str>) -> Vec<Item> {
        self.store
            .values()
            .filter(|record| record.item.matches_color(color))
            .map(|record| record.item)
            .collect()
    }
}
