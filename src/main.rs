//! Purpose: `gleaner` CLI entry point: select fields from a JSONL batch, aggregate, print.
//! Role: Binary crate root; parses args, runs one batch, emits JSON on stdout.
//! Invariants: The stdout envelope is stable; notices only ever go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::fs::File;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use clap::{CommandFactory, Parser, error::ErrorKind as ClapErrorKind};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod input;

use gleaner::core::batch::{BatchOutcome, Plan};
use gleaner::core::error::{Error, ErrorKind, to_exit_code};
use gleaner::core::reduce::Registry;
use gleaner::notice::notice_json;
use input::{ReadConfig, read_documents};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "gleaner",
    version,
    about = "Extract and aggregate fields across JSONL document batches",
    after_help = r#"EXAMPLES
  $ gleaner -s /price=sum -s /price=count orders.jsonl
  $ cat events.jsonl | gleaner -s /user/id=any -s /latency_ms=avg

Reducers: any, count, sum, max, min, avg. Malformed lines stay in the batch
as absent entries; values that are not strings, numbers, or booleans are
reported as notices on stderr and treated as absent.
"#
)]
struct Cli {
    /// Field selection as `<pointer>=<reducer>`; repeat to add columns.
    /// Output order follows argument order.
    #[arg(short = 's', long = "select", value_name = "POINTER=REDUCER")]
    select: Vec<String>,

    /// Input JSONL file (one document per line); reads stdin when omitted.
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Extract documents on all cores; results are identical to sequential runs.
    #[arg(long)]
    parallel: bool,

    /// Suppress non-fatal notices on stderr.
    #[arg(short, long)]
    quiet: bool,

    /// Per-record size cap in bytes for input lines.
    #[arg(long, value_name = "BYTES", default_value_t = 1024 * 1024)]
    max_record_bytes: usize,

    /// Emit shell completions and exit.
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                return Ok(RunOutcome::ok());
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(err.to_string().lines().next().unwrap_or("invalid arguments"))
                    .with_hint("Run `gleaner --help` for usage."));
            }
        },
    };

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::aot::generate(shell, &mut cmd, "gleaner", &mut io::stdout());
        return Ok(RunOutcome::ok());
    }

    let (paths, reducers) = parse_selections(&cli.select)?;
    let registry = Registry::builtin();
    let plan = Plan::compile(&registry, &paths, &reducers)?;

    let mut config = ReadConfig::new();
    config.max_record_bytes = cli.max_record_bytes;
    let docs = match &cli.input {
        Some(path) => {
            let file = File::open(path).map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message(format!("failed to open {}", path.display()))
                    .with_source(err)
            })?;
            read_documents(BufReader::new(file), config)?
        }
        None => read_documents(io::stdin().lock(), config)?,
    };

    let outcome = if cli.parallel {
        plan.run_parallel(&docs)
    } else {
        plan.run(docs.iter())
    };

    if !cli.quiet {
        for notice in &outcome.notices {
            eprintln!("{}", notice_json(notice));
        }
    }

    println!("{}", envelope_json(&paths, &reducers, &outcome));
    Ok(RunOutcome::with_code(0))
}

fn parse_selections(selections: &[String]) -> Result<(Vec<String>, Vec<String>), Error> {
    if selections.is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("at least one --select is required")
            .with_hint("Use --select '<pointer>=<reducer>', e.g. --select /price=sum."));
    }

    let mut paths = Vec::with_capacity(selections.len());
    let mut reducers = Vec::with_capacity(selections.len());
    for selection in selections {
        let Some((path, reducer)) = selection.split_once('=') else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid selection `{selection}`"))
                .with_hint("Selections take the form <pointer>=<reducer>, e.g. /price=sum."));
        };
        paths.push(path.to_string());
        reducers.push(reducer.to_string());
    }
    Ok((paths, reducers))
}

fn envelope_json(paths: &[String], reducers: &[String], outcome: &BatchOutcome) -> Value {
    let results: Vec<Value> = paths
        .iter()
        .zip(reducers)
        .zip(&outcome.results)
        .map(|((path, reducer), aggregate)| {
            json!({
                "path": path,
                "reduce": reducer,
                "value": aggregate.to_json(),
            })
        })
        .collect();

    json!({
        "results": results,
        "stats": {
            "docs": {
                "total": outcome.stats.docs_total,
                "ok": outcome.stats.docs_ok,
                "malformed": outcome.stats.docs_malformed,
            }
        }
    })
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("error: {err}");
        if let Some(hint) = err.hint() {
            eprintln!("  hint: {hint}");
        }
        return;
    }
    eprintln!("{}", error_json(err));
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(err.kind_label()));
    inner.insert(
        "message".to_string(),
        json!(err.message().unwrap_or("unexpected error")),
    );
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path_expr) = err.path_expr() {
        inner.insert("path".to_string(), json!(path_expr));
    }
    if let Some(doc_index) = err.doc_index() {
        inner.insert("doc".to_string(), json!(doc_index));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::{envelope_json, parse_selections};
    use gleaner::core::batch::Plan;
    use gleaner::core::error::ErrorKind;
    use gleaner::core::reduce::Registry;

    #[test]
    fn selections_split_on_first_equals() {
        let specs = vec!["/a=sum".to_string(), "/b=c=any".to_string()];
        let (paths, reducers) = parse_selections(&specs).expect("parse");
        assert_eq!(paths, vec!["/a", "/b"]);
        assert_eq!(reducers, vec!["sum", "c=any"]);
    }

    #[test]
    fn empty_selections_are_usage_errors() {
        let err = parse_selections(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn malformed_selection_is_usage_error() {
        let err = parse_selections(&["/a".to_string()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn envelope_carries_results_and_stats() {
        let registry = Registry::builtin();
        let paths = vec!["/a".to_string()];
        let reducers = vec!["sum".to_string()];
        let plan = Plan::compile(&registry, &paths, &reducers).expect("plan");
        let outcome = plan.run([r#"{"a":1}"#, r#"{"a":2}"#]);

        let envelope = envelope_json(&paths, &reducers, &outcome);
        assert_eq!(envelope["results"][0]["path"], "/a");
        assert_eq!(envelope["results"][0]["reduce"], "sum");
        assert_eq!(envelope["results"][0]["value"], 3);
        assert_eq!(envelope["stats"]["docs"]["total"], 2);
        assert_eq!(envelope["stats"]["docs"]["malformed"], 0);
    }
}
