//! HTTP clients for the system-of-record and its change feed.

mod config;
mod databus;
mod http;
mod sor;

pub use config::{DatabusConfig, SorConfig};
pub use databus::DatabusClient;
pub use sor::SorClient;
