use std::time::Duration;

use replica_api::ReplicaError;
use serde_json::Value;

use crate::SorConfig;

pub(crate) const API_KEY_HEADER: &str = "X-BV-API-Key";

pub(crate) fn build_client(config: &SorConfig) -> Result<reqwest::Client, ReplicaError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()
        .map_err(|e| ReplicaError::config(format!("HTTP client: {e}")))
}

/// Отправить запрос с API ключом; non-2xx → transport error с телом ответа.
pub(crate) async fn exec(
    request: reqwest::RequestBuilder,
    api_key: &str,
    what: &str,
) -> Result<String, ReplicaError> {
    let resp = request
        .header(API_KEY_HEADER, api_key)
        .send()
        .await
        .map_err(|e| ReplicaError::transport(format!("{what} request: {e}")))?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ReplicaError::transport(format!("{what} read: {e}")))?;

    tracing::trace!(what, %status, bytes = body.len(), "response");
    if status.is_success() {
        Ok(body)
    } else {
        Err(ReplicaError::transport(format!("{what}: {status}: {body}")))
    }
}

/// `{"success": true}`: принимает bool или строку "true".
pub(crate) fn expect_success(body: &str, what: &str) -> Result<(), ReplicaError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ReplicaError::new(format!("{what}: unreadable response: {e}")))?;
    if is_true(root.get("success")) {
        Ok(())
    } else {
        Err(ReplicaError::new(format!("{what}: not successful: {body}")))
    }
}

pub(crate) fn is_true(node: Option<&Value>) -> bool {
    match node {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Тело: одно целое число (размер таблицы / очереди).
pub(crate) fn parse_count(body: &str, what: &str) -> Result<u64, ReplicaError> {
    body.trim()
        .parse::<u64>()
        .map_err(|e| ReplicaError::new(format!("{what}: expected integer, got '{}': {e}", body.trim())))
}

/// Тело: JSON массив.
pub(crate) fn parse_array(body: &str, what: &str) -> Result<Vec<Value>, ReplicaError> {
    match serde_json::from_str(body) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(ReplicaError::validation(format!(
            "{what}: expected JSON array, got {}",
            kind_of(&other)
        ))),
        Err(e) => Err(ReplicaError::validation(format!("{what}: malformed response: {e}"))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_variants() {
        assert!(expect_success(r#"{"success":true}"#, "t").is_ok());
        assert!(expect_success(r#"{"success":"true"}"#, "t").is_ok());
        assert!(expect_success(r#"{"success":false}"#, "t").is_err());
        assert!(expect_success(r#"{}"#, "t").is_err());
        assert!(expect_success("<html>", "t").is_err());
    }

    #[test]
    fn counts_and_arrays() {
        assert_eq!(parse_count(" 100\n", "size").unwrap(), 100);
        assert!(parse_count("-1", "size").is_err());
        assert_eq!(parse_array("[1,2]", "poll").unwrap().len(), 2);
        assert!(parse_array(r#"{"a":1}"#, "poll").unwrap_err().is_validation());
        assert!(parse_array("", "poll").unwrap_err().is_validation());
    }
}
