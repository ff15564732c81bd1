use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ReplicaError;

// ════════════════════════════════════════════════════════════════
//  RecordKey
// ════════════════════════════════════════════════════════════════

/// Идентификатор записи в system-of-record.
///
/// Каноническая форма: UUID `8-4-4-4-12` из hex-цифр. Регистр при
/// разборе не важен: ключ нормализуется в нижний регистр, поэтому
/// `ABC…` и `abc…` адресуют одну и ту же запись.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    pub fn parse(raw: &str) -> Result<Self, ReplicaError> {
        if !is_uuid_shaped(raw) {
            return Err(ReplicaError::validation(format!(
                "invalid key '{raw}': expected 8-4-4-4-12 hex digits"
            )));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RecordKey {
    type Err = ReplicaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RecordKey::parse(&raw).map_err(serde::de::Error::custom)
    }
}

fn is_uuid_shaped(s: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let mut parts = s.split('-');
    for len in GROUPS {
        match parts.next() {
            Some(p) if p.len() == len && p.bytes().all(|b| b.is_ascii_hexdigit()) => {}
            _ => return false,
        }
    }
    parts.next().is_none()
}

// ════════════════════════════════════════════════════════════════
//  Item / VersionedRecord
// ════════════════════════════════════════════════════════════════

/// Payload записи: тег категории (`color`) и свободный текст.
/// Оба поля опциональны, `None` сериализуется как `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl Item {
    pub fn new(color: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            color: Some(color.into()),
            text: Some(text.into()),
        }
    }

    /// Сравнение по designated attribute. Два unset значения равны.
    pub fn matches_color(&self, color: Option<&str>) -> bool {
        self.color.as_deref() == color
    }
}

/// Запись + внешняя версия. Версию никогда не генерирует store,
/// она приходит из system-of-record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionedRecord {
    pub key: RecordKey,
    pub item: Item,
    pub version: u64,
}

impl VersionedRecord {
    pub fn new(key: RecordKey, item: Item, version: u64) -> Self {
        Self { key, item, version }
    }
}

// ════════════════════════════════════════════════════════════════
//  Document parsing
// ════════════════════════════════════════════════════════════════

/// Intrinsic field names used by the system-of-record documents.
pub const ID_FIELD: &str = "~id";
pub const VERSION_FIELD: &str = "~version";
pub const COLOR_FIELD: &str = "color";
pub const TEXT_FIELD: &str = "text";

/// Разобрать документ system-of-record (`{"~id", "~version", "color", "text"}`).
///
/// Все четыре поля обязаны присутствовать. `null` в `color` / `text`
/// означает unset, отсутствие поля считается ошибкой валидации.
pub fn parse_document(doc: &Value) -> Result<VersionedRecord, ReplicaError> {
    if !doc.is_object() {
        return Err(ReplicaError::validation("document is not a JSON object"));
    }

    let key = match required(doc, ID_FIELD)? {
        Value::String(s) => RecordKey::parse(s)?,
        other => {
            return Err(ReplicaError::validation(format!(
                "'{ID_FIELD}' must be a string, got {other}"
            )));
        }
    };
    let version = parse_version(required(doc, VERSION_FIELD)?)?;
    let color = optional_text(required(doc, COLOR_FIELD)?, COLOR_FIELD)?;
    let text = optional_text(required(doc, TEXT_FIELD)?, TEXT_FIELD)?;

    Ok(VersionedRecord::new(key, Item { color, text }, version))
}

/// Версия: неотрицательное целое: JSON number или строка из десятичных цифр.
pub fn parse_version(value: &Value) -> Result<u64, ReplicaError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ReplicaError::validation(format!("invalid version {n}"))),
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
            .parse::<u64>()
            .map_err(|e| ReplicaError::validation(format!("invalid version '{s}': {e}"))),
        other => Err(ReplicaError::validation(format!("invalid version {other}"))),
    }
}

fn required<'a>(doc: &'a Value, field: &str) -> Result<&'a Value, ReplicaError> {
    doc.get(field)
        .ok_or_else(|| ReplicaError::validation(format!("missing field '{field}'")))
}

fn optional_text(value: &Value, field: &str) -> Result<Option<String>, ReplicaError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        other => Err(ReplicaError::validation(format!(
            "'{field}' must be a string or null, got {other}"
        ))),
    }
}
