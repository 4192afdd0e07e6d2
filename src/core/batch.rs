//! Purpose: Drive extraction over a document batch and reduce the finished columns.
//! Exports: `Plan`, `BatchOutcome`, `BatchStats`.
//! Role: The only orchestration in the core; compile once, run per batch.
//! Invariants: `compile` rejects contract violations (mismatched lists, unknown
//! reducers, invalid paths); `run` never fails and never drops a document index.
//! Invariants: `run_parallel` produces byte-identical outcomes to `run`;
//! document order, not completion order, decides column indexes.

use rayon::prelude::*;

use crate::core::column::ColumnSet;
use crate::core::error::{Error, ErrorKind};
use crate::core::extract::{Extraction, extract_row};
use crate::core::path::PathExpr;
use crate::core::reduce::{Aggregate, ReduceFn, Registry};
use crate::notice::Notice;

#[derive(Clone, Debug)]
pub struct Plan {
    paths: Vec<PathExpr>,
    reducers: Vec<ReduceFn>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BatchStats {
    pub docs_total: u64,
    pub docs_ok: u64,
    pub docs_malformed: u64,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub results: Vec<Aggregate>,
    pub notices: Vec<Notice>,
    pub stats: BatchStats,
}

impl Plan {
    /// Compile the positionally-paired path and reducer lists against a
    /// registry. List-length mismatches, unknown reducer names, and invalid
    /// path expressions are caller contract errors; nothing is truncated or
    /// substituted.
    pub fn compile<P, R>(registry: &Registry, paths: &[P], reducers: &[R]) -> Result<Self, Error>
    where
        P: AsRef<str>,
        R: AsRef<str>,
    {
        if paths.len() != reducers.len() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "{} path expressions but {} reducers",
                    paths.len(),
                    reducers.len()
                ))
                .with_hint("Each path expression needs exactly one reducer, in the same order."));
        }

        let compiled = paths
            .iter()
            .map(|path| PathExpr::parse(path.as_ref()))
            .collect::<Result<Vec<_>, Error>>()?;

        let resolved = reducers
            .iter()
            .map(|name| {
                registry.get(name.as_ref()).ok_or_else(|| {
                    let known: Vec<&str> = registry.names().collect();
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("unknown reducer `{}`", name.as_ref()))
                        .with_hint(format!("Known reducers: {}.", known.join(", ")))
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self {
            paths: compiled,
            reducers: resolved,
        })
    }

    pub fn width(&self) -> usize {
        self.paths.len()
    }

    /// Single-threaded batch pass: extract every document in submission
    /// order, then reduce each completed column.
    pub fn run<I, D>(&self, docs: I) -> BatchOutcome
    where
        I: IntoIterator<Item = D>,
        D: AsRef<str>,
    {
        let mut columns = ColumnSet::new(self.width());
        let mut notices = Vec::new();
        let mut stats = BatchStats::default();
        for (index, doc) in docs.into_iter().enumerate() {
            let extraction = extract_row(index, doc.as_ref(), &self.paths);
            absorb(&mut columns, &mut notices, &mut stats, extraction);
        }

        let results = self
            .reducers
            .iter()
            .enumerate()
            .map(|(index, reducer)| reducer(columns.column(index)))
            .collect();

        BatchOutcome {
            results,
            notices,
            stats,
        }
    }

    /// Parallel batch pass. Extraction fans out across documents; the indexed
    /// collect reassembles rows in submission order before they touch the
    /// column store, so column index N always belongs to document N.
    /// Reduction then runs per column over the finished, read-only store.
    pub fn run_parallel<D>(&self, docs: &[D]) -> BatchOutcome
    where
        D: AsRef<str> + Sync,
    {
        let extractions: Vec<Extraction> = docs
            .par_iter()
            .enumerate()
            .map(|(index, doc)| extract_row(index, doc.as_ref(), &self.paths))
            .collect();

        let mut columns = ColumnSet::new(self.width());
        let mut notices = Vec::new();
        let mut stats = BatchStats::default();
        for extraction in extractions {
            absorb(&mut columns, &mut notices, &mut stats, extraction);
        }

        let results = self
            .reducers
            .par_iter()
            .enumerate()
            .map(|(index, reducer)| reducer(columns.column(index)))
            .collect();

        BatchOutcome {
            results,
            notices,
            stats,
        }
    }
}

fn absorb(
    columns: &mut ColumnSet,
    notices: &mut Vec<Notice>,
    stats: &mut BatchStats,
    extraction: Extraction,
) {
    stats.docs_total += 1;
    if extraction.parsed {
        stats.docs_ok += 1;
    } else {
        stats.docs_malformed += 1;
    }
    notices.extend(extraction.notices);
    columns.push_row(extraction.row);
}
