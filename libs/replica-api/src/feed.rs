use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;

use crate::{ReplicaError, VersionedRecord, parse_document};

pub const EVENT_KEY_FIELD: &str = "eventKey";
pub const CONTENT_FIELD: &str = "content";

/// Change feed system-of-record'а: poll + acknowledge, at-least-once.
///
/// `poll` возвращает события как пришли с провода: валидацией
/// занимается consumer, чтобы одно битое событие не роняло весь batch.
pub trait ChangeFeed: Send + Sync {
    /// Забрать до `limit` pending событий; невыкуплённые вернутся через `ttl`.
    fn poll(&self, limit: usize, ttl: Duration)
        -> Pin<Box<dyn Future<Output = Result<Vec<Value>, ReplicaError>> + Send + '_>>;

    /// Подтвердить обработку. При ошибке события останутся pending.
    fn acknowledge(&self, tokens: &[String])
        -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    /// Приблизительное число pending событий (диагностика).
    fn pending_count(&self)
        -> Pin<Box<dyn Future<Output = Result<u64, ReplicaError>> + Send + '_>>;

    fn subscribe(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;

    fn unsubscribe(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>>;
}

/// Провалидированное событие: ack token + запись для `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub ack_token: String,
    pub record: VersionedRecord,
}

impl ChangeEvent {
    /// `{"eventKey": .., "content": {"~id", "~version", "color", "text"}}`.
    /// `eventKey` одновременно служит ack token'ом.
    pub fn parse(raw: &Value) -> Result<Self, ReplicaError> {
        let ack_token = match raw.get(EVENT_KEY_FIELD) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(other) => {
                return Err(ReplicaError::validation(format!(
                    "'{EVENT_KEY_FIELD}' must be a non-empty string, got {other}"
                )));
            }
            None => {
                return Err(ReplicaError::validation(format!(
                    "missing field '{EVENT_KEY_FIELD}'"
                )));
            }
        };
        let content = raw.get(CONTENT_FIELD).ok_or_else(|| {
            ReplicaError::validation(format!("missing field '{CONTENT_FIELD}'"))
        })?;
        let record = parse_document(content)?;
        Ok(Self { ack_token, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_event_key_as_ack_token() {
        let raw = json!({
            "eventKey": "ev-1",
            "content": {
                "~id": "7B8D8A82-77B6-4940-95FE-50ED99B23CB2",
                "~version": 3,
                "color": "blue",
                "text": "b"
            }
        });
        let ev = ChangeEvent::parse(&raw).unwrap();
        assert_eq!(ev.ack_token, "ev-1");
        assert_eq!(ev.record.version, 3);
        assert_eq!(ev.record.key.as_str(), "7b8d8a82-77b6-4940-95fe-50ed99b23cb2");
    }

    #[test]
    fn missing_event_key_or_content_is_invalid() {
        let no_key = json!({"content": {"~id": "x"}});
        assert!(ChangeEvent::parse(&no_key).unwrap_err().is_validation());

        let no_content = json!({"eventKey": "ev-2"});
        assert!(ChangeEvent::parse(&no_content).unwrap_err().is_validation());
    }
}
