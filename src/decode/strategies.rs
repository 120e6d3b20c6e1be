// Ordered extraction strategies for the preview payload.
// Each strategy is a pure function of the body; the decoder keeps the first hit.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use super::span::first_balanced_span;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

static EMBEDDED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""png_base64"\s*:\s*"((?:[^"\\]|\\.)+)""#).expect("valid png_base64 regex")
});

static BASE64_ALPHABET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+/=]+$").expect("valid base64 regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImageStrategy {
    /// Body starts with `data:image/png;base64,`
    DataUri,
    /// A `"png_base64": "..."` field somewhere in a JSON-like fragment
    EmbeddedField,
    /// The whole trimmed body is base64 text
    RawBase64,
    /// First balanced `{...}` parsed as JSON
    JsonFragment,
}

impl ImageStrategy {
    pub const ORDER: [ImageStrategy; 4] = [
        ImageStrategy::DataUri,
        ImageStrategy::EmbeddedField,
        ImageStrategy::RawBase64,
        ImageStrategy::JsonFragment,
    ];

    /// Non-empty payload text, if this strategy recognizes the body.
    pub fn extract(self, text: &str) -> Option<String> {
        let found = match self {
            ImageStrategy::DataUri => data_uri(text),
            ImageStrategy::EmbeddedField => embedded_field(text),
            ImageStrategy::RawBase64 => raw_base64(text),
            ImageStrategy::JsonFragment => json_fragment(text),
        };
        found.filter(|payload| !payload.is_empty())
    }
}

impl fmt::Display for ImageStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageStrategy::DataUri => "data-uri",
            ImageStrategy::EmbeddedField => "embedded-field",
            ImageStrategy::RawBase64 => "raw-base64",
            ImageStrategy::JsonFragment => "json-fragment",
        };
        f.write_str(name)
    }
}

fn data_uri(text: &str) -> Option<String> {
    text.trim_start()
        .strip_prefix(DATA_URI_PREFIX)
        .map(|rest| rest.trim_end().to_string())
}

fn embedded_field(text: &str) -> Option<String> {
    let raw = EMBEDDED_FIELD.captures(text)?.get(1)?.as_str();
    // Undo JSON string escaping (`\/`, `\uXXXX`) without parsing the whole body
    match serde_json::from_str::<String>(&format!("\"{raw}\"")) {
        Ok(unescaped) => Some(unescaped),
        Err(_) => Some(raw.to_string()),
    }
}

fn raw_base64(text: &str) -> Option<String> {
    let trimmed = text.trim();
    BASE64_ALPHABET
        .is_match(trimmed)
        .then(|| trimmed.to_string())
}

fn json_fragment(text: &str) -> Option<String> {
    let fragment = first_balanced_span(text, '{', '}')?;
    let value: serde_json::Value = serde_json::from_str(fragment).ok()?;
    value
        .get("png_base64")
        .and_then(|field| field.as_str())
        .map(str::to_string)
}
