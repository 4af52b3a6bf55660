//! `fetch_custom_face` - lists the URLs of the account's favourite stickers.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::application::EventCorrelationBridge;
use crate::domain::foundation::DomainError;
use crate::ports::CommandHandler;

pub const FETCH_FAV_EMOJI_LIST: &str = "MsgService/fetchFavEmojiList";

const DEFAULT_COUNT: u32 = 48;

#[derive(Debug, Deserialize)]
struct FetchCustomFacePayload {
    #[serde(default = "default_count")]
    count: u32,
}

fn default_count() -> u32 {
    DEFAULT_COUNT
}

/// Direct call to the host's favourite emoji list.
pub struct FetchCustomFaceHandler {
    bridge: Arc<EventCorrelationBridge>,
}

impl FetchCustomFaceHandler {
    pub fn new(bridge: Arc<EventCorrelationBridge>) -> Self {
        Self { bridge }
    }
}

#[async_trait]
impl CommandHandler for FetchCustomFaceHandler {
    async fn handle(&self, payload: JsonValue) -> Result<JsonValue, DomainError> {
        let payload: FetchCustomFacePayload = if payload.is_null() {
            FetchCustomFacePayload { count: DEFAULT_COUNT }
        } else {
            serde_json::from_value(payload)
                .map_err(|e| DomainError::invalid_payload("count", e.to_string()))?
        };

        let count = match payload.count {
            0 => DEFAULT_COUNT,
            count => count,
        };
        let list = self
            .bridge
            .invoke_direct_default(
                FETCH_FAV_EMOJI_LIST,
                vec![json!(""), json!(count), json!(true), json!(true)],
            )
            .await?;

        let urls: Vec<JsonValue> = list
            .get("emojiInfoList")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| DomainError::invalid_payload("emojiInfoList", "missing from emoji list"))?
            .iter()
            .filter_map(|info| info.get("url").cloned())
            .collect();

        Ok(JsonValue::Array(urls))
    }

    fn action_name(&self) -> &'static str {
        "fetch_custom_face"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::host::InMemoryHostService;
    use crate::domain::foundation::ErrorCode;

    fn handler() -> (Arc<InMemoryHostService>, FetchCustomFaceHandler) {
        let host = Arc::new(InMemoryHostService::new());
        let bridge = Arc::new(EventCorrelationBridge::new(host.clone()));
        (host, FetchCustomFaceHandler::new(bridge))
    }

    #[tokio::test]
    async fn returns_urls_of_emoji_list() {
        let (host, handler) = handler();
        host.register_value(
            FETCH_FAV_EMOJI_LIST,
            json!({"emojiInfoList": [{"url": "http://a"}, {"url": "http://b"}]}),
        );

        let urls = handler.handle(json!({"count": 2})).await.unwrap();

        assert_eq!(urls, json!(["http://a", "http://b"]));
        assert_eq!(host.invocations(FETCH_FAV_EMOJI_LIST)[0][1], json!(2));
    }

    #[tokio::test]
    async fn count_defaults_when_absent() {
        let (host, handler) = handler();
        host.register_value(FETCH_FAV_EMOJI_LIST, json!({"emojiInfoList": []}));

        handler.handle(JsonValue::Null).await.unwrap();
        handler.handle(json!({})).await.unwrap();
        handler.handle(json!({"count": 0})).await.unwrap();

        let invocations = host.invocations(FETCH_FAV_EMOJI_LIST);
        assert_eq!(invocations[0][1], json!(48));
        assert_eq!(invocations[1][1], json!(48));
        assert_eq!(invocations[2][1], json!(48));
    }

    #[tokio::test]
    async fn rejects_non_numeric_count() {
        let (_host, handler) = handler();

        let err = handler.handle(json!({"count": "many"})).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InvalidPayload);
    }

    #[tokio::test]
    async fn host_failure_propagates() {
        let (host, handler) = handler();
        host.register_error(
            FETCH_FAV_EMOJI_LIST,
            DomainError::new(ErrorCode::OperationFailed, "not logged in"),
        );

        let err = handler.handle(json!({})).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::OperationFailed);
    }
}
