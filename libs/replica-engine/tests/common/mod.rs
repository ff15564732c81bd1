#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::{Value, json};

use replica_api::{ChangeFeed, Item, RecordKey, ReplicaError, SystemOfRecord};

pub const KEY_A: &str = "0b8ee3b4-7a0f-4c2b-9d5e-3f1a2b3c4d5e";
pub const KEY_B: &str = "1c9ff4c5-8b10-4d3c-8e6f-4a2b3c4d5e6f";
pub const KEY_C: &str = "2da005d6-9c21-4e4d-9f70-5b3c4d5e6f70";

pub fn doc(key: &str, version: u64, color: &str, text: &str) -> Value {
    json!({"~id": key, "~version": version, "color": color, "text": text})
}

pub fn event(token: &str, content: Value) -> Value {
    json!({"eventKey": token, "content": content})
}

pub fn key(raw: &str) -> RecordKey {
    RecordKey::parse(raw).unwrap()
}

type Boxed<'a, T> = Pin<Box<dyn Future<Output = Result<T, ReplicaError>> + Send + 'a>>;

// ═══════════════════════════════════════════════════════════════
//  ScriptedFeed
// ═══════════════════════════════════════════════════════════════

/// Change feed, отдающий заранее заданные batch'и по одному на poll.
#[derive(Default)]
pub struct ScriptedFeed {
    batches: Mutex<VecDeque<Result<Vec<Value>, ReplicaError>>>,
    acks: Mutex<Vec<Vec<String>>>,
    polls: Mutex<usize>,
    fail_ack: bool,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_ack() -> Self {
        Self {
            fail_ack: true,
            ..Self::default()
        }
    }

    pub fn push(&self, batch: Vec<Value>) {
        self.batches.lock().unwrap().push_back(Ok(batch));
    }

    pub fn push_error(&self, error: ReplicaError) {
        self.batches.lock().unwrap().push_back(Err(error));
    }

    pub fn acks(&self) -> Vec<Vec<String>> {
        self.acks.lock().unwrap().clone()
    }

    pub fn polls(&self) -> usize {
        *self.polls.lock().unwrap()
    }
}

impl ChangeFeed for ScriptedFeed {
    fn poll(&self, limit: usize, _ttl: Duration) -> Boxed<'_, Vec<Value>> {
        Box::pin(async move {
            *self.polls.lock().unwrap() += 1;
            let next = self.batches.lock().unwrap().pop_front();
            match next {
                Some(Ok(mut batch)) => {
                    batch.truncate(limit);
                    Ok(batch)
                }
                Some(Err(e)) => Err(e),
                None => Ok(Vec::new()),
            }
        })
    }

    fn acknowledge(&self, tokens: &[String]) -> Boxed<'_, ()> {
        let tokens = tokens.to_vec();
        Box::pin(async move {
            if self.fail_ack {
                return Err(ReplicaError::transport("ack endpoint down"));
            }
            self.acks.lock().unwrap().push(tokens);
            Ok(())
        })
    }

    fn pending_count(&self) -> Boxed<'_, u64> {
        Box::pin(async move {
            let pending = self.batches.lock().unwrap().iter().map(|b| b.as_ref().map_or(0, Vec::len)).sum::<usize>();
            Ok(pending as u64)
        })
    }

    fn subscribe(&self) -> Boxed<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn unsubscribe(&self) -> Boxed<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}

// ═══════════════════════════════════════════════════════════════
//  FixedSor
// ═══════════════════════════════════════════════════════════════

/// System-of-record с фиксированным набором документов.
#[derive(Default)]
pub struct FixedSor {
    pub docs: Vec<Value>,
    pub reachable: bool,
    pub healthy: bool,
}

impl FixedSor {
    pub fn with_docs(docs: Vec<Value>) -> Self {
        Self {
            docs,
            reachable: true,
            healthy: true,
        }
    }
}

impl SystemOfRecord for FixedSor {
    fn read_items(&self, limit: usize) -> Boxed<'_, Vec<Value>> {
        Box::pin(async move {
            if !self.reachable {
                return Err(ReplicaError::transport("connection refused"));
            }
            Ok(self.docs.iter().take(limit).cloned().collect())
        })
    }

    fn update_item(&self, _key: &RecordKey, _item: &Item, _comment: &str) -> Boxed<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn create_table(&self) -> Boxed<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn drop_table(&self) -> Boxed<'_, ()> {
        Box::pin(async { Ok(()) })
    }

    fn table_size(&self) -> Boxed<'_, u64> {
        Box::pin(async move { Ok(self.docs.len() as u64) })
    }

    fn ping(&self) -> Boxed<'_, ()> {
        Box::pin(async move {
            if self.reachable {
                Ok(())
            } else {
                Err(ReplicaError::transport("connection refused"))
            }
        })
    }

    fn healthcheck(&self) -> Boxed<'_, ()> {
        Box::pin(async move {
            if self.healthy {
                Ok(())
            } else {
                Err(ReplicaError::transport("databus-foundation unhealthy"))
            }
        })
    }
}

// ═══════════════════════════════════════════════════════════════
//  UnavailableIndex
// ═══════════════════════════════════════════════════════════════

/// Удалённый индекс, который не отвечает ни на один запрос.
pub struct UnavailableIndex;

impl replica_api::ItemIndex for UnavailableIndex {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn get(&self, _key: &RecordKey) -> Boxed<'_, Option<replica_api::VersionedRecord>> {
        Box::pin(async { Err(ReplicaError::transport("index down")) })
    }

    fn update(&self, _candidate: replica_api::VersionedRecord) -> Boxed<'_, bool> {
        Box::pin(async { Err(ReplicaError::transport("index down")) })
    }

    fn get_by_key(&self, _key: &RecordKey) -> Boxed<'_, Option<Item>> {
        Box::pin(async { Err(ReplicaError::transport("index down")) })
    }

    fn get_by_attribute(&self, _color: Option<&str>) -> Boxed<'_, Vec<Item>> {
        Box::pin(async { Err(ReplicaError::transport("index down")) })
    }
}
