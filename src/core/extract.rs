//! Purpose: Turn one raw document into one row of optional scalar cells.
//! Exports: `Extraction`, `extract_row`.
//! Role: Per-document extraction step feeding the batch column store.
//! Invariants: The row always has exactly one cell per path expression;
//! a malformed document yields an all-absent row, never a partial one.
//! Invariants: Unsupported shapes become absent cells plus one notice each;
//! extraction never fails.

use serde_json::{Map, Value};

use crate::core::path::PathExpr;
use crate::json::parse;
use crate::notice::{Notice, now_rfc3339};

#[derive(Debug)]
pub struct Extraction {
    pub row: Vec<Option<String>>,
    pub notices: Vec<Notice>,
    pub parsed: bool,
}

/// Extract the cells for `doc` (the `index`-th document of the batch) against
/// every compiled path expression, in order.
pub fn extract_row(index: usize, doc: &str, paths: &[PathExpr]) -> Extraction {
    let value = match parse::document(doc) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(
                doc = index,
                category = parse::categorize_error(&err).label(),
                "document failed to parse; emitting absent row"
            );
            return Extraction {
                row: vec![None; paths.len()],
                notices: Vec::new(),
                parsed: false,
            };
        }
    };

    let mut row = Vec::with_capacity(paths.len());
    let mut notices = Vec::new();
    for path in paths {
        match scalar_cell(path.resolve(&value)) {
            Ok(cell) => row.push(Some(cell)),
            Err(shape) => {
                tracing::debug!(doc = index, path = path.as_str(), shape, "ignoring value");
                notices.push(shape_notice(index, path, shape));
                row.push(None);
            }
        }
    }

    Extraction {
        row,
        notices,
        parsed: true,
    }
}

/// Canonical textual form of a resolved leaf, or the name of the shape that
/// cannot be represented as a scalar cell.
fn scalar_cell(resolved: Option<&Value>) -> Result<String, &'static str> {
    match resolved {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(Value::Null) => Err("null"),
        Some(Value::Array(_)) => Err("array"),
        Some(Value::Object(_)) => Err("object"),
        None => Err("missing"),
    }
}

fn shape_notice(index: usize, path: &PathExpr, shape: &'static str) -> Notice {
    let mut details = Map::new();
    details.insert("shape".to_string(), Value::from(shape));
    Notice {
        kind: "shape".to_string(),
        time: now_rfc3339(),
        path: path.as_str().to_string(),
        doc: index,
        message: format!("ignoring {shape} value"),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::extract_row;
    use crate::core::path::PathExpr;

    fn paths(exprs: &[&str]) -> Vec<PathExpr> {
        exprs
            .iter()
            .map(|expr| PathExpr::parse(expr).expect("path"))
            .collect()
    }

    #[test]
    fn strings_are_kept_verbatim() {
        let paths = paths(&["/name"]);
        let out = extract_row(0, r#"{"name":"ada"}"#, &paths);
        assert!(out.parsed);
        assert_eq!(out.row, vec![Some("ada".to_string())]);
        assert!(out.notices.is_empty());
    }

    #[test]
    fn numbers_and_booleans_render_canonically() {
        let paths = paths(&["/n", "/f", "/t"]);
        let out = extract_row(0, r#"{"n":42,"f":2.5,"t":true}"#, &paths);
        assert_eq!(
            out.row,
            vec![
                Some("42".to_string()),
                Some("2.5".to_string()),
                Some("true".to_string()),
            ]
        );
    }

    #[test]
    fn malformed_document_yields_all_absent_row() {
        let paths = paths(&["/a", "/b"]);
        let out = extract_row(1, "not json", &paths);
        assert!(!out.parsed);
        assert_eq!(out.row, vec![None, None]);
        assert!(out.notices.is_empty());
    }

    #[test]
    fn unsupported_shapes_become_absent_with_one_notice_each() {
        let paths = paths(&["/obj", "/arr", "/nul", "/gone"]);
        let out = extract_row(
            2,
            r#"{"obj":{"x":1},"arr":[1],"nul":null,"other":0}"#,
            &paths,
        );
        assert!(out.parsed);
        assert_eq!(out.row, vec![None, None, None, None]);
        assert_eq!(out.notices.len(), 4);

        let shapes: Vec<&str> = out
            .notices
            .iter()
            .map(|notice| notice.details["shape"].as_str().expect("shape"))
            .collect();
        assert_eq!(shapes, vec!["object", "array", "null", "missing"]);
        assert_eq!(out.notices[0].doc, 2);
        assert_eq!(out.notices[0].path, "/obj");
        assert_eq!(out.notices[0].kind, "shape");
    }

    #[test]
    fn paths_resolve_independently() {
        let paths = paths(&["/a", "/a/x", "/a"]);
        let out = extract_row(0, r#"{"a":{"x":"deep"}}"#, &paths);
        // The composite at /a is absent, but /a/x still resolves through it.
        assert_eq!(out.row[0], None);
        assert_eq!(out.row[1].as_deref(), Some("deep"));
        assert_eq!(out.row[2], None);
    }
}
