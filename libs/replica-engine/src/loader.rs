use std::sync::Arc;

use replica_api::{ItemIndex, ReplicaError, SystemOfRecord, parse_document};

use crate::EngineError;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub fetched: usize,
    pub applied: usize,
    pub stale: usize,
}

/// Начальная загрузка индекса из system-of-record.
///
/// Идёт через тот же `update`, что и change feed, поэтому порядок
/// запуска loader'а и consumer'а не важен: побеждает старшая версия.
pub struct BulkLoader {
    sor: Arc<dyn SystemOfRecord>,
    index: Arc<dyn ItemIndex>,
    limit: usize,
}

impl BulkLoader {
    pub fn new(sor: Arc<dyn SystemOfRecord>, index: Arc<dyn ItemIndex>, limit: usize) -> Self {
        Self { sor, index, limit }
    }

    /// Первая невалидная запись прерывает загрузку. Записи, применённые
    /// до неё, остаются в индексе.
    pub async fn load(&self) -> Result<LoadReport, EngineError> {
        let docs = self.sor.read_items(self.limit).await?;
        let mut report = LoadReport {
            fetched: docs.len(),
            ..LoadReport::default()
        };

        for (position, doc) in docs.iter().enumerate() {
            let record = parse_document(doc).map_err(|e| {
                tracing::error!(position, error = %e, "bulk load: invalid document");
                abort(&report, e)
            })?;
            let applied = self.index.update(record).await.map_err(|e| abort(&report, e))?;
            if applied {
                report.applied += 1;
            } else {
                report.stale += 1;
            }
        }

        tracing::info!(
            fetched = report.fetched,
            applied = report.applied,
            stale = report.stale,
            backend = self.index.name(),
            "bulk load complete"
        );
        Ok(report)
    }
}

fn abort(report: &LoadReport, source: ReplicaError) -> EngineError {
    EngineError::BulkLoad {
        applied: report.applied,
        source,
    }
}
