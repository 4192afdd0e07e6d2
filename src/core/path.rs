//! Purpose: Compile and resolve pointer-style path expressions against parsed documents.
//! Exports: `PathExpr`.
//! Role: Small addressing layer over `serde_json::Value`; compile once, resolve per document.
//! Invariants: Compile failures are usage errors; resolution never fails, it yields `None`.
//! Invariants: Resolution is pure and borrows from the document only.

use serde_json::Value;

use crate::core::error::{Error, ErrorKind};

/// A compiled JSON Pointer (RFC 6901): `""` addresses the whole document,
/// otherwise `/`-delimited segments with `~0` → `~` and `~1` → `/` escapes.
/// A segment that parses as a base-10 index addresses array elements.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PathExpr {
    raw: String,
    segments: Vec<String>,
}

impl PathExpr {
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.is_empty() {
            return Ok(Self {
                raw: String::new(),
                segments: Vec::new(),
            });
        }
        if !raw.starts_with('/') {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("path expression must start with '/'")
                .with_path_expr(raw)
                .with_hint("Use a JSON Pointer like /user/name; the empty string addresses the whole document."));
        }

        let segments = raw
            .split('/')
            .skip(1)
            .map(|segment| unescape_segment(raw, segment))
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn resolve<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut current = root;
        for segment in &self.segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => {
                    let index: usize = segment.parse().ok()?;
                    items.get(index)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

fn unescape_segment(raw: &str, segment: &str) -> Result<String, Error> {
    if !segment.contains('~') {
        return Ok(segment.to_string());
    }
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("invalid escape in path expression")
                    .with_path_expr(raw)
                    .with_hint("Only ~0 (tilde) and ~1 (slash) escapes are defined."));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::PathExpr;
    use crate::core::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn empty_pointer_addresses_whole_document() {
        let expr = PathExpr::parse("").expect("parse");
        let doc = json!({"a": 1});
        assert_eq!(expr.resolve(&doc), Some(&doc));
    }

    #[test]
    fn resolves_nested_keys_and_array_indexes() {
        let expr = PathExpr::parse("/a/b/1").expect("parse");
        let doc = json!({"a": {"b": [10, 20, 30]}});
        assert_eq!(expr.resolve(&doc), Some(&json!(20)));
    }

    #[test]
    fn numeric_segments_match_object_keys_first() {
        let expr = PathExpr::parse("/0").expect("parse");
        let doc = json!({"0": "zero"});
        assert_eq!(expr.resolve(&doc), Some(&json!("zero")));
    }

    #[test]
    fn missing_paths_resolve_to_none() {
        let doc = json!({"a": {"b": 1}});
        assert_eq!(PathExpr::parse("/a/x").expect("parse").resolve(&doc), None);
        assert_eq!(PathExpr::parse("/a/b/c").expect("parse").resolve(&doc), None);
        assert_eq!(PathExpr::parse("/a/7").expect("parse").resolve(&doc), None);
    }

    #[test]
    fn escapes_are_unescaped() {
        let expr = PathExpr::parse("/a~1b/c~0d").expect("parse");
        let doc = json!({"a/b": {"c~d": 5}});
        assert_eq!(expr.resolve(&doc), Some(&json!(5)));
    }

    #[test]
    fn empty_segment_is_a_valid_key() {
        let expr = PathExpr::parse("/").expect("parse");
        let doc = json!({"": "blank"});
        assert_eq!(expr.resolve(&doc), Some(&json!("blank")));
    }

    #[test]
    fn missing_leading_slash_is_usage_error() {
        let err = PathExpr::parse("a/b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn bad_escape_is_usage_error() {
        let err = PathExpr::parse("/a~2b").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = PathExpr::parse("/a~").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
