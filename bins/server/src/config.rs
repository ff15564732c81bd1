use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

pub use index_elastic::ElasticConfig;
pub use replica_engine::ConsumerConfig;
pub use sor_client::{DatabusConfig, SorConfig};

use crate::error::ServerError;

#[derive(Parser)]
#[command(name = "replica-server", about = "Queryable replica of a system-of-record table")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Загрузить реплику, слушать change feed и отвечать на запросы
    Serve(ServeArgs),
    /// Пересоздать таблицу и снять подписку change feed'а
    Provision(ProvisionArgs),
    /// Записать документы из JSON файла в system-of-record
    Seed(SeedArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ServeArgs {
    /// Путь к TOML конфиг файлу
    #[arg(long, default_value = "config.toml", env = "CONFIG_PATH")]
    pub config: String,
}

#[derive(Args, Clone, Debug)]
pub struct ProvisionArgs {
    /// Путь к TOML конфиг файлу
    #[arg(long, default_value = "config.toml", env = "CONFIG_PATH")]
    pub config: String,
}

#[derive(Args, Clone, Debug)]
pub struct SeedArgs {
    /// Путь к TOML конфиг файлу
    #[arg(long, default_value = "config.toml", env = "CONFIG_PATH")]
    pub config: String,
    /// JSON объект `{"<key>": {"color": .., "text": ..}, ...}`
    #[arg(long)]
    pub file: String,
    /// Audit комментарий для каждой записи
    #[arg(long, default_value = "initial-submission")]
    pub comment: String,
    /// Пауза между записями, 0 без паузы
    #[arg(long, default_value_t = 0)]
    pub interval_ms: u64,
}

// ---- TOML Config ----

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    #[serde(default)]
    pub sor: SorConfig,
    #[serde(default)]
    pub databus: DatabusConfig,
    #[serde(default)]
    pub consumer: ConsumerConfig,
    /// Наличие секции означает "предпочесть удалённый индекс".
    #[serde(default)]
    pub elastic: Option<ElasticConfig>,
}

fn default_api_port() -> u16 {
    4567
}

impl ServerConfig {
    pub fn load(path: &str) -> Result<Self, ServerError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config { context: "read", detail: format!("'{path}': {e}") })?;
        toml::from_str(&content)
            .map_err(|e| ServerError::Config { context: "parse", detail: format!("'{path}': {e}") })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(content: &str) -> Result<ServerConfig, ServerError> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        ServerConfig::load(file.path().to_str().unwrap())
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_str("").unwrap();
        assert_eq!(config.api_port, 4567);
        assert_eq!(config.sor.url, "http://localhost:8080");
        assert_eq!(config.sor.table, "items");
        assert_eq!(config.databus.subscription, "items-subscription");
        assert_eq!(config.consumer.poll_interval_ms, 2000);
        assert_eq!(config.consumer.batch_size, 5);
        assert!(config.elastic.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = load_str(
            r#"
            api_port = 9000

            [sor]
            url = "http://sor:8080"
            api_key = "secret"

            [consumer]
            batch_size = 50

            [elastic]
            index = "replica"
            "#,
        )
        .unwrap();
        assert_eq!(config.api_port, 9000);
        assert_eq!(config.sor.url, "http://sor:8080");
        assert_eq!(config.sor.api_key, "secret");
        assert_eq!(config.sor.admin_url, "http://localhost:8081");
        assert_eq!(config.consumer.batch_size, 50);
        assert_eq!(config.consumer.ttl_secs, 10);
        let elastic = config.elastic.unwrap();
        assert_eq!(elastic.index, "replica");
        assert_eq!(elastic.url, "http://localhost:9200");
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = ServerConfig::load("/nonexistent/replica.toml").unwrap_err();
        assert!(matches!(err, ServerError::Config { context: "read", .. }));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let err = load_str("api_port = \"four\"").unwrap_err();
        assert!(matches!(err, ServerError::Config { context: "parse", .. }));
    }
}
