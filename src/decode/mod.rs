//! Lenient decoding of server responses whose format is only loosely agreed on.
//!
//! The preview endpoint has been seen to answer with a data URI, a JSON object,
//! JSON wrapped in other text, or bare base64. The listing endpoint sometimes
//! wraps its array in extra text. Both are handled here so the workflows only
//! ever see typed values.

pub mod span;
pub mod strategies;

use base64::Engine;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::CatalogItem;
use crate::http::errors::body_prefix;
pub use span::first_balanced_span;
pub use strategies::{ImageStrategy, DATA_URI_PREFIX};

const LOG_PREFIX_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("could not extract base64 from preview response")]
    NoStrategyMatched { body_prefix: String },
}

/// Base64 text of a cut-out PNG.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CutoutPayload(String);

impl CutoutPayload {
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_data_uri(&self) -> String {
        format!("{DATA_URI_PREFIX}{}", self.0)
    }

    /// Raw PNG bytes.
    pub fn decode_png(&self) -> Result<Vec<u8>, base64::DecodeError> {
        base64::engine::general_purpose::STANDARD.decode(self.0.as_bytes())
    }
}

impl std::fmt::Display for CutoutPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A payload together with the strategy that recovered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub payload: CutoutPayload,
    pub strategy: ImageStrategy,
}

impl DecodedPayload {
    /// Recovered by something other than the preferred strategy.
    pub fn is_fallback(&self) -> bool {
        self.strategy != ImageStrategy::ORDER[0]
    }
}

/// Extract the cut-out payload from a preview body.
///
/// Strategies run in [`ImageStrategy::ORDER`]; the first non-empty result is
/// final and later strategies are not consulted.
pub fn decode_image_payload(text: &str) -> Result<DecodedPayload, DecodeError> {
    let decoded = ImageStrategy::ORDER.iter().find_map(|strategy| {
        strategy.extract(text).map(|payload| DecodedPayload {
            payload: CutoutPayload::new(payload),
            strategy: *strategy,
        })
    });

    match decoded {
        Some(decoded) => {
            debug!(
                strategy = %decoded.strategy,
                payload_len = decoded.payload.as_str().len(),
                "Decoded preview payload"
            );
            Ok(decoded)
        }
        None => {
            warn!(body = %body_prefix(text, LOG_PREFIX_LEN), "No preview decode strategy matched");
            Err(DecodeError::NoStrategyMatched {
                body_prefix: body_prefix(text, LOG_PREFIX_LEN),
            })
        }
    }
}

/// Decode one listing page. Never fails: anything unreadable is an empty page.
pub fn decode_item_page(text: &str) -> Vec<CatalogItem> {
    let candidate = first_balanced_span(text, '[', ']').unwrap_or(text);

    let elements = match serde_json::from_str::<serde_json::Value>(candidate) {
        Ok(serde_json::Value::Array(elements)) => elements,
        Ok(other) => {
            warn!(
                kind = json_kind(&other),
                raw = %body_prefix(text, LOG_PREFIX_LEN),
                "Item page is not a JSON array"
            );
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, raw = %body_prefix(text, LOG_PREFIX_LEN), "Item page is not valid JSON");
            return Vec::new();
        }
    };

    elements
        .into_iter()
        .enumerate()
        .filter_map(|(index, element)| match serde_json::from_value::<CatalogItem>(element) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed catalog item");
                None
            }
        })
        .collect()
}

/// Decode the item echoed back by a successful upload, if readable.
pub fn decode_saved_item(text: &str) -> Option<CatalogItem> {
    let fragment = first_balanced_span(text, '{', '}')?;
    serde_json::from_str(fragment).ok()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_object_preview() {
        let decoded = decode_image_payload(r#"{"png_base64":"Zm9v"}"#).unwrap();
        assert_eq!(decoded.payload.as_str(), "Zm9v");
        assert_eq!(decoded.strategy, ImageStrategy::EmbeddedField);
    }

    #[test]
    fn test_raw_text_preview() {
        let decoded = decode_image_payload("Zm9v").unwrap();
        assert_eq!(decoded.payload.as_str(), "Zm9v");
        assert_eq!(decoded.strategy, ImageStrategy::RawBase64);
        assert!(decoded.is_fallback());
    }

    #[test]
    fn test_data_uri_wins_over_later_strategies() {
        let decoded = decode_image_payload("data:image/png;base64,Zm9v").unwrap();
        assert_eq!(decoded.payload.as_str(), "Zm9v");
        assert_eq!(decoded.strategy, ImageStrategy::DataUri);
        assert!(!decoded.is_fallback());
    }

    #[test]
    fn test_first_match_is_not_overwritten() {
        // Both the regex and the JSON fragment strategies could match; the
        // regex runs first and its value is the one kept.
        let body = r#"{"png_base64":"Zm9v"} {"png_base64":"YmFy"}"#;
        assert_eq!(decode_image_payload(body).unwrap().payload.as_str(), "Zm9v");
    }

    #[test]
    fn test_unrecognised_preview_is_decode_error() {
        let err = decode_image_payload("<html>Bad Gateway</html>").unwrap_err();
        match err {
            DecodeError::NoStrategyMatched { body_prefix } => {
                assert!(body_prefix.contains("Bad Gateway"))
            }
        }
        assert!(decode_image_payload("").is_err());
        assert!(decode_image_payload(r#"{"png_base64":""}"#).is_err());
    }

    #[test]
    fn test_payload_helpers() {
        let payload = CutoutPayload::new("Zm9v");
        assert_eq!(payload.to_data_uri(), "data:image/png;base64,Zm9v");
        assert_eq!(payload.decode_png().unwrap(), b"foo");
    }

    #[test]
    fn test_item_page_inside_extra_text() {
        let items = decode_item_page(
            r#"ok: [{"id":"a","url":"/u/a","thumb_url":"/t/a"},{"id":"b","url":"/u/b","thumb_url":"/t/b"}] (2 items)"#,
        );
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_item_page_wrapped_after_bracket_in_string() {
        let items = decode_item_page(
            r#"{"msg":"see [docs]","items":[{"id":"a","url":"/u","thumb_url":"/t"}]}"#,
        );
        assert_eq!(items, vec![CatalogItem::new("a", "/u", "/t")]);
    }

    #[test]
    fn test_item_page_degrades_to_empty() {
        assert!(decode_item_page("").is_empty());
        assert!(decode_item_page("internal error").is_empty());
        assert!(decode_item_page(r#"{"items":"nope"}"#).is_empty());
        assert!(decode_item_page("[1, 2,").is_empty());
        assert!(decode_item_page("[]").is_empty());
    }

    #[test]
    fn test_item_page_skips_malformed_elements() {
        let items = decode_item_page(
            r#"[{"id":"a","url":"/u/a","thumb_url":"/t/a"},{"id":"b"},{"id":"c","url":"/u/c","thumb_url":"/t/c"}]"#,
        );
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_saved_item_is_optional() {
        let saved = decode_saved_item(
            r#"{"id":"20240501100000","url":"/media/20240501100000.png","thumb_url":"/media/20240501100000_thumb.png","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(saved.id, "20240501100000");
        assert!(decode_saved_item("saved").is_none());
    }
}
