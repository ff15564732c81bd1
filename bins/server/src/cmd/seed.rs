use std::time::Duration;

use serde_json::{Map, Value};

use replica_api::{Item, RecordKey, SystemOfRecord};
use sor_client::SorClient;

use crate::config::{SeedArgs, ServerConfig};
use crate::error::ServerError;

pub async fn run(args: SeedArgs) -> Result<(), ServerError> {
    let config = ServerConfig::load(&args.config)?;
    let entries = read_entries(&args.file)?;
    let sor = SorClient::new(config.sor)?;
    let interval = Duration::from_millis(args.interval_ms);

    tracing::info!(file = %args.file, count = entries.len(), comment = %args.comment, "seeding");

    let mut written = 0usize;
    for (position, (raw_key, raw_item)) in entries.iter().enumerate() {
        let (key, item) = parse_entry(raw_key, raw_item).map_err(|detail| {
            tracing::error!(position, written, "seed stopped at invalid entry");
            ServerError::Seed { path: args.file.clone(), detail }
        })?;

        if position > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        sor.update_item(&key, &item, &args.comment).await.inspect_err(|e| {
            tracing::error!(%key, written, error = %e, "seed write failed");
        })?;
        written += 1;
        tracing::debug!(%key, "written");
    }

    tracing::info!(written, "seed complete");
    Ok(())
}

fn read_entries(path: &str) -> Result<Map<String, Value>, ServerError> {
    let seed_error = |detail: String| ServerError::Seed { path: path.to_string(), detail };
    let content = std::fs::read_to_string(path).map_err(|e| seed_error(e.to_string()))?;
    match serde_json::from_str::<Value>(&content).map_err(|e| seed_error(e.to_string()))? {
        Value::Object(entries) => Ok(entries),
        other => Err(seed_error(format!("expected a JSON object, got {other}"))),
    }
}

fn parse_entry(raw_key: &str, raw_item: &Value) -> Result<(RecordKey, Item), String> {
    let key = RecordKey::parse(raw_key).map_err(|e| e.to_string())?;
    if !raw_item.is_object() {
        return Err(format!("{key}: expected an object with color/text"));
    }
    let item = serde_json::from_value(raw_item.clone()).map_err(|e| format!("{key}: {e}"))?;
    Ok((key, item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn entries_keep_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ffffffff-0000-0000-0000-000000000000": {{"color": "red", "text": "z"}},
                "00000000-0000-0000-0000-000000000000": {{"color": "blue", "text": "a"}}}}"#
        )
        .unwrap();

        let entries = read_entries(file.path().to_str().unwrap()).unwrap();
        let keys: Vec<&String> = entries.keys().collect();
        assert_eq!(
            keys,
            ["ffffffff-0000-0000-0000-000000000000", "00000000-0000-0000-0000-000000000000"]
        );
    }

    #[test]
    fn non_object_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let err = read_entries(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ServerError::Seed { .. }));
    }

    #[test]
    fn entry_validation() {
        let (key, item) = parse_entry(
            "7B8D8A82-77B6-4940-95FE-50ED99B23CB2",
            &json!({"color": "blue", "text": "b"}),
        )
        .unwrap();
        assert_eq!(key.as_str(), "7b8d8a82-77b6-4940-95fe-50ed99b23cb2");
        assert_eq!(item, Item::new("blue", "b"));

        let partial = parse_entry("7b8d8a82-77b6-4940-95fe-50ed99b23cb2", &json!({"text": "b"})).unwrap();
        assert_eq!(partial.1.color, None);

        assert!(parse_entry("not-a-key", &json!({"color": "blue"})).is_err());
        assert!(parse_entry("7b8d8a82-77b6-4940-95fe-50ed99b23cb2", &json!("blue")).is_err());
    }
}
