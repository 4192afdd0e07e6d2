//! Purpose: Define a stable, structured schema for non-fatal extraction notices.
//! Exports: `Notice`, `notice_json`, `now_rfc3339`.
//! Role: Shared contract helper for diagnostics (non-error events).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub path: String,
    pub doc: usize,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("path".to_string(), json!(notice.path));
    inner.insert("doc".to_string(), json!(notice.doc));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Current wall-clock time as RFC3339 UTC; empty when the clock cannot format.
pub fn now_rfc3339() -> String {
    use time::format_description::well_known::Rfc3339;
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{Notice, notice_json, now_rfc3339};
    use serde_json::{Map, Value};

    #[test]
    fn notice_json_has_required_fields() {
        let mut details = Map::new();
        details.insert("shape".to_string(), Value::from("object"));

        let notice = Notice {
            kind: "shape".to_string(),
            time: "2026-02-01T00:00:00Z".to_string(),
            path: "/a".to_string(),
            doc: 3,
            message: "ignoring object value".to_string(),
            details,
        };

        let value = notice_json(&notice);
        let obj = value
            .get("notice")
            .and_then(|v| v.as_object())
            .expect("notice object");

        assert_eq!(obj.get("kind").and_then(|v| v.as_str()), Some("shape"));
        assert_eq!(
            obj.get("time").and_then(|v| v.as_str()),
            Some("2026-02-01T00:00:00Z")
        );
        assert_eq!(obj.get("path").and_then(|v| v.as_str()), Some("/a"));
        assert_eq!(obj.get("doc").and_then(|v| v.as_u64()), Some(3));
        assert_eq!(
            obj.get("message").and_then(|v| v.as_str()),
            Some("ignoring object value")
        );
        assert!(obj.get("details").and_then(|v| v.as_object()).is_some());
    }

    #[test]
    fn now_rfc3339_looks_like_a_timestamp() {
        let now = now_rfc3339();
        assert!(now.contains('T'));
        assert!(now.ends_with('Z') || now.contains('+'));
    }
}
