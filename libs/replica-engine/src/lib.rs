//! Replication engine: выбор backend'а, начальная загрузка и
//! change feed consumer поверх `replica-api` трейтов.

mod backend;
mod config;
mod consumer;
mod error;
mod health;
mod loader;

pub use backend::{Backend, BackendKind, select_backend};
pub use config::ConsumerConfig;
pub use consumer::{ChangeFeedConsumer, CycleReport, spawn_consumer_task};
pub use error::EngineError;
pub use health::ensure_sor_ready;
pub use loader::{BulkLoader, LoadReport};
