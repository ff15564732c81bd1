use serde::Serialize;

use crate::Item;

/// Ответ query gateway: `{success, payload}` (+ `size` для списков).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse {
    Item { success: bool, payload: Item },
    Items { success: bool, size: usize, payload: Vec<Item> },
    Message { success: bool, payload: String },
}

impl QueryResponse {
    pub const NO_MATCH: &'static str = "no match found";

    pub fn found(item: Item) -> Self {
        Self::Item { success: true, payload: item }
    }

    /// Отсутствие: успешный ответ с сообщением, не ошибка.
    pub fn not_found() -> Self {
        Self::Message { success: true, payload: Self::NO_MATCH.to_string() }
    }

    pub fn lookup(item: Option<Item>) -> Self {
        match item {
            Some(item) => Self::found(item),
            None => Self::not_found(),
        }
    }

    pub fn items(items: Vec<Item>) -> Self {
        Self::Items { success: true, size: items.len(), payload: items }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::Message { success: false, payload: message.into() }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Self::Item { success, .. }
            | Self::Items { success, .. }
            | Self::Message { success, .. } => *success,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shapes() {
        let found = serde_json::to_value(QueryResponse::found(Item::new("blue", "b"))).unwrap();
        assert_eq!(found, json!({"success": true, "payload": {"color": "blue", "text": "b"}}));

        let empty = serde_json::to_value(QueryResponse::items(Vec::new())).unwrap();
        assert_eq!(empty, json!({"success": true, "size": 0, "payload": []}));

        let missing = serde_json::to_value(QueryResponse::lookup(None)).unwrap();
        assert_eq!(missing, json!({"success": true, "payload": "no match found"}));
    }
}
