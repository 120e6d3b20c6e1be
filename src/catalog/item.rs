use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One stored cut-out as listed by `GET /api/items`.
///
/// URLs are server-relative; resolve them against the configured base URL
/// before display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "url")]
    pub display_url: String,
    #[serde(rename = "thumb_url")]
    pub thumbnail_url: String,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl CatalogItem {
    pub fn new(id: &str, display_url: &str, thumbnail_url: &str) -> Self {
        Self {
            id: id.to_string(),
            display_url: display_url.to_string(),
            thumbnail_url: thumbnail_url.to_string(),
            created_at: None,
        }
    }
}

/// Display and thumbnail URLs joined onto the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedUrls {
    pub display_url: String,
    pub thumbnail_url: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

/// RFC 3339, or the `YYYY-MM-DD HH:MM:SS` form SQLite's `datetime()` produces (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_wire_names_map_to_fields() {
        let item: CatalogItem = serde_json::from_str(
            r#"{"id":"a","url":"/u/a","thumb_url":"/t/a","created_at":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(item.id, "a");
        assert_eq!(item.display_url, "/u/a");
        assert_eq!(item.thumbnail_url, "/t/a");
        assert_eq!(
            item.created_at,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_created_at_is_optional_and_lenient() {
        let missing: CatalogItem =
            serde_json::from_str(r#"{"id":"a","url":"/u/a","thumb_url":"/t/a"}"#).unwrap();
        assert_eq!(missing.created_at, None);

        let garbage: CatalogItem = serde_json::from_str(
            r#"{"id":"a","url":"/u/a","thumb_url":"/t/a","created_at":"yesterday"}"#,
        )
        .unwrap();
        assert_eq!(garbage.created_at, None);

        let null: CatalogItem = serde_json::from_str(
            r#"{"id":"a","url":"/u/a","thumb_url":"/t/a","created_at":null}"#,
        )
        .unwrap();
        assert_eq!(null.created_at, None);
    }

    #[test]
    fn test_sqlite_datetime_format_parses_as_utc() {
        assert_eq!(
            parse_timestamp("2024-05-01 10:00:00"),
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let item: CatalogItem =
            serde_json::from_str(r#"{"id":20240501100000,"url":"/u","thumb_url":"/t"}"#).unwrap();
        assert_eq!(item.id, "20240501100000");
    }

    #[test]
    fn test_serializes_back_to_wire_names() {
        let json = serde_json::to_value(CatalogItem::new("a", "/u/a", "/t/a")).unwrap();
        assert_eq!(json, serde_json::json!({"id":"a","url":"/u/a","thumb_url":"/t/a"}));
    }
}
