use std::sync::Arc;

use arc_swap::{ArcSwap, Guard};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use replica_api::{RecordKey, VersionedRecord};

/// Результат `VersionedStore::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Ключа не было, кандидат вставлен.
    Inserted,
    /// Кандидат заменил запись с меньшей версией.
    Replaced,
    /// Версия кандидата <= сохранённой. Ничего не изменено.
    Stale,
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        !matches!(self, UpdateOutcome::Stale)
    }
}

// ═══════════════════════════════════════════════════════════════
//  VersionedStore
// ═══════════════════════════════════════════════════════════════

/// In-memory реплика: key → (payload, version).
///
/// Каждый ключ хранится в отдельном `ArcSwap` слоте. Map блокирует шард только на
/// время вставки нового ключа; замена значения идёт через
/// compare-and-swap по указателю на прочитанную запись, без блокировок.
/// Чтения возвращают независимые копии.
#[derive(Default)]
pub struct VersionedStore {
    slots: DashMap<RecordKey, Arc<ArcSwap<VersionedRecord>>>,
}

impl VersionedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RecordKey) -> Option<VersionedRecord> {
        let slot = self.slot(key)?;
        let current = slot.load();
        Some(VersionedRecord::clone(&current))
    }

    /// Optimistic update.
    ///
    /// 1. Ключа нет → атомарная вставка.
    /// 2. `candidate.version <= current.version` → `Stale`.
    /// 3. Иначе CAS против прочитанного `current`; проиграли гонку, тогда
    ///    перечитать и снова к шагу 2.
    pub fn update(&self, candidate: VersionedRecord) -> UpdateOutcome {
        // Шард блокируется на запись только при промахе.
        let slot = match self.slot(&candidate.key) {
            Some(slot) => slot,
            None => match self.slots.entry(candidate.key.clone()) {
                Entry::Vacant(vacant) => {
                    vacant.insert(Arc::new(ArcSwap::from_pointee(candidate)));
                    return UpdateOutcome::Inserted;
                }
                Entry::Occupied(occupied) => Arc::clone(occupied.get()),
            },
        };

        let candidate = Arc::new(candidate);
        let mut current = slot.load_full();
        let mut attempts: u32 = 0;
        loop {
            if candidate.version <= current.version {
                tracing::debug!(
                    key = %candidate.key,
                    candidate = candidate.version,
                    stored = current.version,
                    "stale update rejected"
                );
                return UpdateOutcome::Stale;
            }

            let previous = slot.compare_and_swap(&current, Arc::clone(&candidate));
            if Arc::ptr_eq(&*previous, &current) {
                if attempts > 0 {
                    tracing::trace!(key = %candidate.key, attempts, "cas won after retries");
                }
                return UpdateOutcome::Replaced;
            }

            // Concurrent writer won; re-evaluate against what it stored.
            current = Guard::into_inner(previous);
            attempts += 1;
        }
    }

    /// Lazy обход копий всех записей. Без cross-key атомарности:
    /// конкурентные update'ы могут быть видны частично.
    pub fn values(&self) -> impl Iterator<Item = VersionedRecord> + '_ {
        self.slots
            .iter()
            .map(|entry| VersionedRecord::clone(&entry.value().load()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, key: &RecordKey) -> Option<Arc<ArcSwap<VersionedRecord>>> {
        self.slots.get(key).map(|entry| Arc::clone(entry.value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replica_api::Item;

    fn key() -> RecordKey {
        RecordKey::parse("7b8d8a82-77b6-4940-95fe-50ed99b23cb2").unwrap()
    }

    fn rec(version: u64, color: &str) -> VersionedRecord {
        VersionedRecord::new(key(), Item::new(color, format!("v{version}")), version)
    }

    #[test]
    fn absent_key_is_inserted_verbatim() {
        let store = VersionedStore::new();
        assert_eq!(store.update(rec(5, "red")), UpdateOutcome::Inserted);
        assert_eq!(store.get(&key()), Some(rec(5, "red")));
    }

    #[test]
    fn equal_and_older_versions_never_win() {
        let store = VersionedStore::new();
        store.update(rec(5, "red"));

        assert_eq!(store.update(rec(5, "blue")), UpdateOutcome::Stale);
        assert_eq!(store.update(rec(4, "green")), UpdateOutcome::Stale);
        assert_eq!(store.get(&key()), Some(rec(5, "red")));
    }

    #[test]
    fn newer_version_replaces() {
        let store = VersionedStore::new();
        store.update(rec(1, "green"));
        assert_eq!(store.update(rec(3, "blue")), UpdateOutcome::Replaced);
        assert_eq!(store.get(&key()).unwrap().version, 3);
    }

    #[test]
    fn reads_are_copies() {
        let store = VersionedStore::new();
        store.update(rec(1, "green"));
        let mut copy = store.get(&key()).unwrap();
        copy.item.color = Some("mutated".into());
        assert_eq!(store.get(&key()).unwrap().item.color.as_deref(), Some("green"));
    }

    #[test]
    fn values_is_restartable() {
        let store = VersionedStore::new();
        store.update(rec(1, "green"));
        let other = RecordKey::parse("00000000-0000-0000-0000-000000000001").unwrap();
        store.update(VersionedRecord::new(other, Item::default(), 0));

        assert_eq!(store.values().count(), 2);
        assert_eq!(store.values().count(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn existing_key_updates_while_a_scan_is_open() {
        let store = VersionedStore::new();
        store.update(rec(1, "green"));

        let mut scan = store.values();
        assert_eq!(scan.next().unwrap().version, 1);
        // Итератор держит read lock шарда; update существующего ключа не ждёт его.
        assert_eq!(store.update(rec(2, "blue")), UpdateOutcome::Replaced);
        assert_eq!(store.update(rec(2, "red")), UpdateOutcome::Stale);
        drop(scan);

        assert_eq!(store.get(&key()).unwrap().item.color.as_deref(), Some("blue"));
    }
}
