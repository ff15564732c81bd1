use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use replica_api::{ChangeEvent, ChangeFeed, EVENT_KEY_FIELD, ItemIndex};

use crate::ConsumerConfig;

/// Итог одного poll цикла.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub polled: usize,
    /// Версия кандидата оказалась новее, индекс изменён.
    pub applied: usize,
    /// Устаревшие/дублирующие события: индекс не тронут, но ack отправлен.
    pub stale: usize,
    /// Битые события: без ack, вернутся после ttl.
    pub dropped: usize,
    /// Backend не смог применить update: без ack.
    pub failed: usize,
    pub acked: usize,
    pub ack_failed: bool,
}

// ═══════════════════════════════════════════════════════════════
//  ChangeFeedConsumer: poll → validate → update → acknowledge
// ═══════════════════════════════════════════════════════════════

/// Периодически выкупает события из change feed и применяет их к индексу.
///
/// Доставка at-least-once: событие подтверждается только после того,
/// как индекс принял решение по нему (применил или отверг как stale).
/// Повторная доставка безопасна, `update` идемпотентен по версии.
pub struct ChangeFeedConsumer {
    feed: Arc<dyn ChangeFeed>,
    index: Arc<dyn ItemIndex>,
    config: ConsumerConfig,
}

impl ChangeFeedConsumer {
    pub fn new(feed: Arc<dyn ChangeFeed>, index: Arc<dyn ItemIndex>, config: ConsumerConfig) -> Self {
        Self { feed, index, config }
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Один цикл. Ошибки транспорта не поднимаются наверх: цикл
    /// считается пустым, следующий poll попробует снова.
    pub async fn poll_once(&self) -> CycleReport {
        let mut report = CycleReport::default();

        match self.feed.pending_count().await {
            Ok(pending) => tracing::debug!(pending, "change feed backlog"),
            Err(e) => tracing::debug!(error = %e, "change feed backlog unavailable"),
        }

        let events = match self.feed.poll(self.config.batch_size, self.config.ttl()).await {
            Ok(events) => events,
            Err(e) => {
                tracing::warn!(error = %e, "change feed poll failed");
                return report;
            }
        };
        report.polled = events.len();

        let mut tokens = Vec::with_capacity(events.len());
        for raw in &events {
            let event = match ChangeEvent::parse(raw) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(
                        event_key = ?raw.get(EVENT_KEY_FIELD),
                        error = %e,
                        "dropping invalid change event"
                    );
                    report.dropped += 1;
                    continue;
                }
            };

            let key = event.record.key.clone();
            let version = event.record.version;
            match self.index.update(event.record).await {
                Ok(true) => report.applied += 1,
                Ok(false) => report.stale += 1,
                Err(e) => {
                    tracing::warn!(%key, version, error = %e, "index update failed, event left pending");
                    report.failed += 1;
                    continue;
                }
            }
            tokens.push(event.ack_token);
        }

        if tokens.is_empty() {
            return report;
        }

        match self.feed.acknowledge(&tokens).await {
            Ok(()) => report.acked = tokens.len(),
            Err(e) => {
                // События вернутся после ttl и будут отвергнуты как stale.
                tracing::warn!(count = tokens.len(), error = %e, "acknowledge failed");
                report.ack_failed = true;
            }
        }
        report
    }

    /// Polling loop до отмены токена. Отмена проверяется перед каждой
    /// итерацией и во время паузы между ними.
    pub async fn run(self, token: CancellationToken) {
        let interval = self.config.poll_interval();
        tracing::info!(
            backend = self.index.name(),
            interval_ms = self.config.poll_interval_ms,
            batch_size = self.config.batch_size,
            "change feed consumer started"
        );

        loop {
            if token.is_cancelled() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = token.cancelled() => break,
            }

            let report = self.poll_once().await;
            if report.polled > 0 {
                tracing::debug!(
                    polled = report.polled,
                    applied = report.applied,
                    stale = report.stale,
                    dropped = report.dropped,
                    failed = report.failed,
                    acked = report.acked,
                    "change feed cycle"
                );
            }
        }

        tracing::info!("change feed consumer stopped");
    }
}

/// Запустить consumer фоновой задачей.
pub fn spawn_consumer_task(consumer: ChangeFeedConsumer, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(consumer.run(token))
}
