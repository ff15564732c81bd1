use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use replica_api::{Item, ItemIndex, RecordKey, ReplicaError, VersionedRecord};
use reqwest::StatusCode;
use serde_json::{Value, json};

/// Поле для term-поиска по designated attribute (keyword subfield
/// из dynamic mapping).
const ATTRIBUTE_FIELD: &str = "color.keyword";

// ═══════════════════════════════════════════════════════════════
//  ElasticConfig
// ═══════════════════════════════════════════════════════════════

fn default_url() -> String {
    "http://localhost:9200".into()
}
fn default_index() -> String {
    "items".into()
}
fn default_search_size() -> usize {
    100
}
fn default_request_timeout_ms() -> u64 {
    2000
}

/// `[elastic]` секция. Наличие секции = предпочитать удалённый backend.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ElasticConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_index")]
    pub index: String,
    /// Максимум hits в ответе на поиск по атрибуту.
    #[serde(default = "default_search_size")]
    pub search_size: usize,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ElasticConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            index: default_index(),
            search_size: default_search_size(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  ElasticIndex
// ═══════════════════════════════════════════════════════════════

/// Удалённый search backend с тем же контрактом, что и `MemoryIndex`.
///
/// Версия записи передаётся как external version: движок сам отклоняет
/// запись, если сохранённая версия >= кандидата (409), что сохраняет
/// правило "строго бо́льшая версия побеждает".
pub struct ElasticIndex {
    http: reqwest::Client,
    config: ElasticConfig,
}

impl ElasticIndex {
    pub fn new(config: ElasticConfig) -> Result<Self, ReplicaError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| ReplicaError::config(format!("HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    fn doc_url(&self, key: &RecordKey) -> String {
        format!("{}/{}/_doc/{}", self.config.url, self.config.index, key)
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<(StatusCode, Value), ReplicaError> {
        let resp = request
            .send()
            .await
            .map_err(|e| ReplicaError::transport(format!("elastic {what}: {e}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ReplicaError::transport(format!("elastic {what} read: {e}")))?;
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)
                .map_err(|e| ReplicaError::new(format!("elastic {what}: unreadable response: {e}")))?
        };
        Ok((status, value))
    }

    /// Reachability probe: ответ корня должен содержать `name` и `cluster_name`.
    pub async fn probe(&self) -> Result<(), ReplicaError> {
        let (status, root) = self.send(self.http.get(format!("{}/", self.config.url)), "probe").await?;
        match (root.get("name"), root.get("cluster_name")) {
            (Some(name), Some(cluster)) if status.is_success() => {
                tracing::info!(%name, %cluster, url = %self.config.url, "elastic backend reachable");
                Ok(())
            }
            _ => Err(ReplicaError::transport(format!(
                "elastic probe: {status}: missing name/cluster_name"
            ))),
        }
    }

    /// Удалить индекс, чтобы начать с чистого листа. 404 значит индекса не было.
    pub async fn reset(&self) -> Result<(), ReplicaError> {
        let url = format!("{}/{}", self.config.url, self.config.index);
        let (status, root) = self.send(self.http.delete(url), "reset").await?;
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(index = %self.config.index, "elastic index absent, nothing to reset");
            return Ok(());
        }
        if status.is_success() && root.get("acknowledged").and_then(Value::as_bool) == Some(true) {
            Ok(())
        } else {
            Err(ReplicaError::new(format!("elastic reset: {status}: {root}")))
        }
    }

    async fn fetch(&self, key: &RecordKey) -> Result<Option<VersionedRecord>, ReplicaError> {
        let (status, root) = self.send(self.http.get(self.doc_url(key)), "get").await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(ReplicaError::new(format!("elastic get: {status}: {root}")));
        }
        if root.get("found").and_then(Value::as_bool) != Some(true) {
            return Ok(None);
        }
        let version = root.get("_version").and_then(Value::as_u64).ok_or_else(|| {
            ReplicaError::new(format!("elastic get: missing _version for {key}"))
        })?;
        let item = source_item(root.get("_source"));
        Ok(Some(VersionedRecord::new(key.clone(), item, version)))
    }

    async fn put(&self, candidate: VersionedRecord) -> Result<bool, ReplicaError> {
        let version = candidate.version.to_string();
        let request = self
            .http
            .put(self.doc_url(&candidate.key))
            .query(&[("version", version.as_str()), ("version_type", "external")])
            .json(&json!({"color": candidate.item.color, "text": candidate.item.text}));
        let (status, root) = self.send(request, "update").await?;

        if status == StatusCode::CONFLICT {
            tracing::debug!(key = %candidate.key, version = candidate.version, "stale update rejected by elastic");
            return Ok(false);
        }
        match root.get("result").and_then(Value::as_str) {
            Some("created") | Some("updated") if status.is_success() => Ok(true),
            _ => Err(ReplicaError::new(format!("elastic update: {status}: {root}"))),
        }
    }

    async fn search(&self, color: Option<String>) -> Result<Vec<Item>, ReplicaError> {
        let url = format!("{}/{}/_search", self.config.url, self.config.index);
        let request = self
            .http
            .post(url)
            .query(&[("size", self.config.search_size)])
            .json(&attribute_query(color.as_deref()));
        let (status, root) = self.send(request, "search").await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            return Err(ReplicaError::new(format!("elastic search: {status}: {root}")));
        }
        let hits = root
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .ok_or_else(|| ReplicaError::new("elastic search: missing hits.hits"))?;
        Ok(hits.iter().map(|hit| source_item(hit.get("_source"))).collect())
    }
}

/// `term` по keyword полю; unset ищется как отсутствие поля.
fn attribute_query(color: Option<&str>) -> Value {
    match color {
        Some(value) => json!({"query": {"term": {ATTRIBUTE_FIELD: value}}}),
        None => json!({"query": {"bool": {"must_not": {"exists": {"field": "color"}}}}}),
    }
}

fn source_item(source: Option<&Value>) -> Item {
    let field = |name: &str| {
        source
            .and_then(|s| s.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Item {
        color: field("color"),
        text: field("text"),
    }
}

impl ItemIndex for ElasticIndex {
    fn name(&self) -> &'static str {
        "elastic"
    }

    fn get(
        &self,
        key: &RecordKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<VersionedRecord>, ReplicaError>> + Send + '_>> {
        let key = key.clone();
        Box::pin(async move { self.fetch(&key).await })
    }

    fn update(
        &self,
        candidate: VersionedRecord,
    ) -> Pin<Box<dyn Future<Output = Result<bool, ReplicaError>> + Send + '_>> {
        Box::pin(self.put(candidate))
    }

    fn get_by_key(
        &self,
        key: &RecordKey,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Item>, ReplicaError>> + Send + '_>> {
        let key = key.clone();
        Box::pin(async move { Ok(self.fetch(&key).await?.map(|record| record.item)) })
    }

    fn get_by_attribute(
        &self,
        color: Option<&str>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Item>, ReplicaError>> + Send + '_>> {
        let color = color.map(str::to_string);
        Box::pin(self.search(color))
    }
}
