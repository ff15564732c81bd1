use std::future::Future;
use std::pin::Pin;

use replica_api::{Item, RecordKey, ReplicaError, SystemOfRecord};
use serde_json::Value;

use crate::SorConfig;
use crate::http::{build_client, exec, expect_success, is_true, parse_array, parse_count};

/// Storage компоненты, которые должны быть healthy перед стартом.
const HEALTH_COMPONENTS: [&str; 5] = [
    "blob-cassandra",
    "databus-cassandra",
    "deadlocks",
    "queue-cassandra",
    "sor-cassandra",
];

/// HTTP клиент system-of-record.
///
/// Stateless: только endpoint'ы и конфиг, создаётся явно и передаётся
/// компонентам.
pub struct SorClient {
    http: reqwest::Client,
    config: SorConfig,
}

impl SorClient {
    pub fn new(config: SorConfig) -> Result<Self, ReplicaError> {
        Ok(Self {
            http: build_client(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &SorConfig {
        &self.config
    }

    fn table_url(&self) -> String {
        format!("{}/sor/1/{}", self.config.url, self.config.table)
    }

    fn admin_table_url(&self) -> String {
        format!("{}/sor/1/_table/{}", self.config.url, self.config.table)
    }

    fn audit(&self, comment: &str) -> String {
        format!("comment:'{comment}',host:{}", self.config.audit_host)
    }
}

/// json-delta тело: `..` сохраняет остальные поля документа.
fn delta_body(item: &Item) -> String {
    format!(
        "{{..,\"color\":{},\"text\":{}}}",
        Value::from(item.color.clone()),
        Value::from(item.text.clone()),
    )
}

impl SystemOfRecord for SorClient {
    fn read_items(
        &self,
        limit: usize,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self
                .http
                .get(self.table_url())
                .query(&[("limit", limit)]);
            let body = exec(request, &self.config.api_key, "sor read").await?;
            parse_array(&body, "sor read")
        })
    }

    fn update_item(
        &self,
        key: &RecordKey,
        item: &Item,
        comment: &str,
    ) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        let url = format!("{}/{}", self.table_url(), key);
        let audit = self.audit(comment);
        let body = delta_body(item);
        Box::pin(async move {
            let request = self
                .http
                .post(url)
                .query(&[("audit", audit)])
                .header(reqwest::header::CONTENT_TYPE, "application/x.json-delta")
                .body(body);
            let resp = exec(request, &self.config.api_key, "sor update").await?;
            expect_success(&resp, "sor update")
        })
    }

    fn create_table(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let options = format!("placement:'{}'", self.config.placement);
            let body = serde_json::json!({"type": "review", "client": "replica"}).to_string();
            let request = self
                .http
                .put(self.admin_table_url())
                .query(&[("options", options), ("audit", self.audit("initial provisioning"))])
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
            let resp = exec(request, &self.config.api_key, "sor create table").await?;
            expect_success(&resp, "sor create table")
        })
    }

    fn drop_table(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self
                .http
                .delete(self.admin_table_url())
                .query(&[("audit", self.audit("clean-slate"))]);
            let resp = exec(request, &self.config.api_key, "sor drop table").await?;
            expect_success(&resp, "sor drop table")
        })
    }

    fn table_size(&self) -> Pin<Box<dyn Future<Output = Result<u64, ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self
                .http
                .get(format!("{}/size", self.admin_table_url()))
                .query(&[("limit", self.config.bulk_limit)]);
            let body = exec(request, &self.config.api_key, "sor table size").await?;
            parse_count(&body, "sor table size")
        })
    }

    fn ping(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self.http.get(format!("{}/ping", self.config.admin_url));
            let body = exec(request, &self.config.api_key, "sor ping").await?;
            if body.starts_with("pong") {
                Ok(())
            } else {
                Err(ReplicaError::transport(format!("sor ping: unexpected reply '{body}'")))
            }
        })
    }

    fn healthcheck(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self.http.get(format!("{}/healthcheck", self.config.admin_url));
            let body = exec(request, &self.config.api_key, "sor healthcheck").await?;
            let root: Value = serde_json::from_str(&body)
                .map_err(|e| ReplicaError::transport(format!("sor healthcheck: unreadable: {e}")))?;

            let unhealthy: Vec<&str> = HEALTH_COMPONENTS
                .iter()
                .copied()
                .filter(|name| !is_true(root.get(*name).and_then(|c| c.get("healthy"))))
                .collect();
            if unhealthy.is_empty() {
                Ok(())
            } else {
                Err(ReplicaError::transport(format!(
                    "sor healthcheck: unhealthy: {}",
                    unhealthy.join(", ")
                )))
            }
        })
    }
}
