use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use replica_api::{ChangeFeed, ReplicaError};
use serde_json::Value;

use crate::http::{build_client, exec, expect_success, parse_array, parse_count};
use crate::{DatabusConfig, SorConfig};

/// HTTP клиент change feed'а (databus) для одной подписки.
pub struct DatabusClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    table: String,
    config: DatabusConfig,
}

impl DatabusClient {
    pub fn new(sor: &SorConfig, config: DatabusConfig) -> Result<Self, ReplicaError> {
        Ok(Self {
            http: build_client(sor)?,
            base_url: sor.url.clone(),
            api_key: sor.api_key.clone(),
            table: sor.table.clone(),
            config,
        })
    }

    fn subscription_url(&self) -> String {
        format!("{}/bus/1/{}", self.base_url, self.config.subscription)
    }
}

impl ChangeFeed for DatabusClient {
    fn poll(
        &self,
        limit: usize,
        ttl: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Value>, ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self
                .http
                .get(format!("{}/poll", self.subscription_url()))
                .query(&[("ttl", ttl.as_secs()), ("limit", limit as u64)]);
            let body = exec(request, &self.api_key, "databus poll").await?;
            parse_array(&body, "databus poll")
        })
    }

    fn acknowledge(
        &self,
        tokens: &[String],
    ) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        let tokens = tokens.to_vec();
        Box::pin(async move {
            let request = self
                .http
                .post(format!("{}/ack", self.subscription_url()))
                .json(&tokens);
            let resp = exec(request, &self.api_key, "databus ack").await?;
            expect_success(&resp, "databus ack")
        })
    }

    fn pending_count(&self) -> Pin<Box<dyn Future<Output = Result<u64, ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self
                .http
                .get(format!("{}/size", self.subscription_url()))
                .query(&[("limit", self.config.pending_limit)]);
            let body = exec(request, &self.api_key, "databus size").await?;
            parse_count(&body, "databus size")
        })
    }

    fn subscribe(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let condition = format!("intrinsic(\"~table\":\"{}\")", self.table);
            let request = self
                .http
                .put(self.subscription_url())
                .header(reqwest::header::CONTENT_TYPE, "application/x.json-condition")
                .body(condition);
            let resp = exec(request, &self.api_key, "databus subscribe").await?;
            expect_success(&resp, "databus subscribe")
        })
    }

    fn unsubscribe(&self) -> Pin<Box<dyn Future<Output = Result<(), ReplicaError>> + Send + '_>> {
        Box::pin(async move {
            let request = self.http.delete(self.subscription_url());
            let resp = exec(request, &self.api_key, "databus unsubscribe").await?;
            expect_success(&resp, "databus unsubscribe")
        })
    }
}
