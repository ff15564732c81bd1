use serde::Deserialize;

/// `[sor]` секция: адреса и параметры system-of-record.
#[derive(Debug, Clone, Deserialize)]
pub struct SorConfig {
    #[serde(default = "default_url")]
    pub url: String,
    /// Admin порт: `/ping`, `/healthcheck`.
    #[serde(default = "default_admin_url")]
    pub admin_url: String,
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
    /// Максимум документов, читаемых bulk loader'ом.
    #[serde(default = "default_bulk_limit")]
    pub bulk_limit: usize,
    #[serde(default = "default_placement")]
    pub placement: String,
    /// `host:` часть audit строки.
    #[serde(default = "default_audit_host")]
    pub audit_host: String,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_url() -> String {
    "http://localhost:8080".into()
}
fn default_admin_url() -> String {
    "http://localhost:8081".into()
}
fn default_api_key() -> String {
    "local_admin".into()
}
fn default_table() -> String {
    "items".into()
}
fn default_bulk_limit() -> usize {
    1000
}
fn default_placement() -> String {
    "ugc_global:ugc".into()
}
fn default_audit_host() -> String {
    "localhost".into()
}
fn default_request_timeout_ms() -> u64 {
    5000
}

impl Default for SorConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            admin_url: default_admin_url(),
            api_key: default_api_key(),
            table: default_table(),
            bulk_limit: default_bulk_limit(),
            placement: default_placement(),
            audit_host: default_audit_host(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// `[databus]` секция: подписка change feed'а.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabusConfig {
    #[serde(default = "default_subscription")]
    pub subscription: String,
    /// `limit` для оценки размера очереди.
    #[serde(default = "default_pending_limit")]
    pub pending_limit: u64,
}

fn default_subscription() -> String {
    "items-subscription".into()
}
fn default_pending_limit() -> u64 {
    10
}

impl Default for DatabusConfig {
    fn default() -> Self {
        Self {
            subscription: default_subscription(),
            pending_limit: default_pending_limit(),
        }
    }
}
