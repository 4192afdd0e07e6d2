//! Purpose: Provide the internal runtime JSON decode entrypoints.
//! Exports: `document`, `from_str`, `ParseFailureCategory`, `categorize_error`.
//! Role: Parser boundary that centralizes simd-json usage details.
//! Invariants: Input buffers are copied once to satisfy simd-json's mutable-slice API.
//! Invariants: Category labels are stable once published; diagnostics rely on them.
//! Notes: Error mapping is done by callsites so domain context stays explicit.

use serde::de::DeserializeOwned;
use serde_json::Value;

pub(crate) fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, simd_json::Error> {
    let mut bytes = input.as_bytes().to_vec();
    simd_json::serde::from_slice(&mut bytes)
}

/// Decode one raw document into the tree value model.
pub(crate) fn document(input: &str) -> Result<Value, simd_json::Error> {
    from_str(input)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum ParseFailureCategory {
    Syntax,
    NumericRange,
    Utf8,
    DepthLimit,
    Unknown,
}

impl ParseFailureCategory {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::NumericRange => "numeric-range",
            Self::Utf8 => "utf8",
            Self::DepthLimit => "depth-limit",
            Self::Unknown => "unknown",
        }
    }
}

pub(crate) fn categorize_error(err: &simd_json::Error) -> ParseFailureCategory {
    categorize_message(&err.to_string())
}

pub(crate) fn categorize_message(message: &str) -> ParseFailureCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("utf-8") || lower.contains("utf8") {
        return ParseFailureCategory::Utf8;
    }
    if lower.contains("out of range") || lower.contains("overflow") {
        return ParseFailureCategory::NumericRange;
    }
    if lower.contains("recursion") || lower.contains("depth") || lower.contains("nesting") {
        return ParseFailureCategory::DepthLimit;
    }
    if lower.contains("syntax")
        || lower.contains("expected")
        || lower.contains("unexpected")
        || lower.contains("invalid")
        || lower.contains("eof")
        || lower.contains("empty")
    {
        return ParseFailureCategory::Syntax;
    }
    ParseFailureCategory::Unknown
}
