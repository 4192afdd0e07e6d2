//! Purpose: Read JSONL document batches for the CLI with explicit, testable limits.
//! Exports: `ReadConfig`, `read_documents`.
//! Role: Input layer used by `main`; isolates line handling from command logic.
//! Invariants: No unbounded buffering; per-record buffering is capped.
//! Invariants: Oversized records stay in the batch as malformed documents
//! rather than being dropped, so the batch keeps one entry per record.

use std::io::{BufRead, Read};

use bstr::ByteSlice;

use gleaner::core::error::{Error, ErrorKind};

#[derive(Copy, Clone, Debug)]
pub struct ReadConfig {
    pub max_record_bytes: usize,
    pub max_snippet_bytes: usize,
}

impl ReadConfig {
    pub fn new() -> Self {
        Self {
            max_record_bytes: 1024 * 1024,
            max_snippet_bytes: 120,
        }
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read one document per line. Blank lines are skipped; lines over the record
/// cap are replaced with an empty (and therefore malformed) document and the
/// remainder of the line is discarded.
pub fn read_documents<R: BufRead>(mut reader: R, config: ReadConfig) -> Result<Vec<String>, Error> {
    let mut docs = Vec::new();
    let mut buf = Vec::new();
    let cap = config.max_record_bytes as u64;

    loop {
        buf.clear();
        let read = reader
            .by_ref()
            .take(cap + 1)
            .read_until(b'\n', &mut buf)
            .map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read input")
                    .with_doc_index(docs.len())
                    .with_source(err)
            })?;
        if read == 0 {
            break;
        }

        let ended = buf.last() == Some(&b'\n');
        let content_len = if ended { buf.len() - 1 } else { buf.len() };
        if content_len > config.max_record_bytes {
            let snippet_len = buf.len().min(config.max_snippet_bytes);
            tracing::warn!(
                line = docs.len() + 1,
                snippet = %buf[..snippet_len].to_str_lossy(),
                "record exceeds size cap; treating as malformed"
            );
            if !ended {
                discard_rest_of_line(&mut reader)?;
            }
            docs.push(String::new());
            continue;
        }

        while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
            buf.pop();
        }
        if buf.iter().all(|byte| byte.is_ascii_whitespace()) {
            continue;
        }
        docs.push(buf.to_str_lossy().into_owned());
    }

    Ok(docs)
}

fn discard_rest_of_line<R: BufRead>(reader: &mut R) -> Result<(), Error> {
    loop {
        let available = reader.fill_buf().map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read input")
                .with_source(err)
        })?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|byte| *byte == b'\n') {
            Some(newline) => {
                reader.consume(newline + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ReadConfig, read_documents};
    use std::io::Cursor;

    #[test]
    fn reads_one_document_per_line() {
        let input = "{\"a\":1}\n\n{\"a\":2}\r\n  \nnot json\n";
        let docs = read_documents(Cursor::new(input), ReadConfig::new()).expect("read");
        assert_eq!(docs, vec![r#"{"a":1}"#, r#"{"a":2}"#, "not json"]);
    }

    #[test]
    fn last_line_without_newline_is_kept() {
        let docs = read_documents(Cursor::new("{\"a\":1}"), ReadConfig::new()).expect("read");
        assert_eq!(docs, vec![r#"{"a":1}"#]);
    }

    #[test]
    fn oversized_record_becomes_malformed_placeholder() {
        let mut config = ReadConfig::new();
        config.max_record_bytes = 8;
        let long = format!("{{\"a\":\"{}\"}}\n{{\"b\":2}}\n", "x".repeat(64));
        let docs = read_documents(Cursor::new(long), config).expect("read");
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], "");
        assert_eq!(docs[1], r#"{"b":2}"#);
    }

    #[test]
    fn empty_input_yields_empty_batch() {
        let docs = read_documents(Cursor::new(""), ReadConfig::new()).expect("read");
        assert!(docs.is_empty());
    }
}
