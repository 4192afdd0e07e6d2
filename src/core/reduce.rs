//! Purpose: Name-addressed pure reducers that summarize one column into one aggregate.
//! Exports: `Aggregate`, `ReduceFn`, `Registry`.
//! Role: Immutable reducer catalog passed into the batch driver; no global state.
//! Invariants: Reducers are pure functions of the column; builtin edge behavior
//! is contract (sentinel extremes for empty `max`/`min`, NaN for empty `avg`).
//! Invariants: Numeric reducers silently skip cells that do not parse as base-10 i64.

use std::collections::BTreeMap;

use serde_json::Value;

/// One reducer result. `any` yields `Text` or `Absent`; `count`/`sum`/`max`/
/// `min` yield `Int`; `avg` yields `Float`.
#[derive(Clone, Debug, PartialEq)]
pub enum Aggregate {
    Absent,
    Text(String),
    Int(i64),
    Float(f64),
}

impl Aggregate {
    /// JSON rendering for output envelopes. Non-finite floats become `null`
    /// (serde_json cannot represent them), as does `Absent`.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Absent => Value::Null,
            Self::Text(text) => Value::from(text.clone()),
            Self::Int(value) => Value::from(*value),
            Self::Float(value) => Value::from(*value),
        }
    }
}

pub type ReduceFn = fn(&[Option<String>]) -> Aggregate;

/// Immutable catalog of named reducers, built once and passed by reference.
/// Tests construct local registries via `empty` + `register`.
#[derive(Clone, Debug)]
pub struct Registry {
    entries: BTreeMap<String, ReduceFn>,
}

impl Registry {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// The six builtin reducers: any, count, sum, max, min, avg.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("any", reduce_any);
        registry.register("count", reduce_count);
        registry.register("sum", reduce_sum);
        registry.register("max", reduce_max);
        registry.register("min", reduce_min);
        registry.register("avg", reduce_avg);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, reducer: ReduceFn) {
        self.entries.insert(name.into(), reducer);
    }

    pub fn get(&self, name: &str) -> Option<ReduceFn> {
        self.entries.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn reduce_any(cells: &[Option<String>]) -> Aggregate {
    for cell in cells {
        if let Some(text) = cell {
            return Aggregate::Text(text.clone());
        }
    }
    Aggregate::Absent
}

fn reduce_count(cells: &[Option<String>]) -> Aggregate {
    Aggregate::Int(cells.iter().filter(|cell| cell.is_some()).count() as i64)
}

fn reduce_sum(cells: &[Option<String>]) -> Aggregate {
    Aggregate::Int(wrapping_sum(&integer_cells(cells)))
}

fn reduce_max(cells: &[Option<String>]) -> Aggregate {
    let mut best = i64::MIN;
    for value in integer_cells(cells) {
        if value > best {
            best = value;
        }
    }
    Aggregate::Int(best)
}

fn reduce_min(cells: &[Option<String>]) -> Aggregate {
    let mut best = i64::MAX;
    for value in integer_cells(cells) {
        if value < best {
            best = value;
        }
    }
    Aggregate::Int(best)
}

fn reduce_avg(cells: &[Option<String>]) -> Aggregate {
    let values = integer_cells(cells);
    // 0.0 / 0.0 on an empty column: NaN by contract, not an error.
    Aggregate::Float(wrapping_sum(&values) as f64 / values.len() as f64)
}

/// Cells parseable as base-10 signed 64-bit integers, in column order.
/// Everything else (absent cells included) is skipped.
fn integer_cells(cells: &[Option<String>]) -> Vec<i64> {
    cells
        .iter()
        .flatten()
        .filter_map(|text| text.parse::<i64>().ok())
        .collect()
}

fn wrapping_sum(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, value| acc.wrapping_add(*value))
}
