//! Hand-rolled argument parsing for the driver's legacy surface.
//!
//! The flag syntax uses single-dash long names (`-min_w 0.5`), which rules
//! out derive-style parsers; arguments are consumed positionally with a
//! trailing flag loop instead. Parsing happens before any corpus I/O so a
//! malformed invocation fails with usage text and nothing else.

use crate::config::ExperimentConfig;
use crate::error::ConfigError;
use crate::overlap::{Bound, OverlapSpec, ResultCardinality};

pub const USAGE: &str = "\
Usage:
  table_matcher run s <r_id> <s_id> <num_res> [<day>] [bounds]
  table_matcher run m <first_id> <num_cand> <num_res> [<day>] [-d <day2>] [bounds]
  table_matcher env-template [path]

  mode        s: evaluate one explicit pair verbosely, no result logs
              m: evaluate a batch window of the candidate sequence
  num_res     o: first largest overlap only   a: all tied largest overlaps
  <day>       required for the dated corpora, forbidden for wikipedia
  -d <day2>   compare <day> against <day2> (cross-day, dated corpora only;
              in single mode the right-hand table reads from <day2>)

  bounds (absolute if >= 1, ratio of the smaller table if in (0, 1)):
  -min_w V  -max_w V  -min_h V  -max_h V  -a V (minimum area)

The corpus is selected through TABLE_MATCHER_DATASET (stock | flight |
wikipedia) and related TABLE_MATCHER_* variables; see env-template.";

/// What to evaluate: one explicit pair or a window of the batch sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Single { r_id: String, s_id: String },
    Batch { first_id: usize, num_cand: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    pub mode: RunMode,
    pub cardinality: ResultCardinality,
    pub day: Option<String>,
    pub day2: Option<String>,
    pub bounds: OverlapSpec,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(RunArgs),
    EnvTemplate { path: String },
}

fn usage(msg: impl Into<String>) -> ConfigError {
    ConfigError::Usage(msg.into())
}

/// Parse the command line (program name excluded) against the configured
/// corpus.
pub fn parse(config: &ExperimentConfig, argv: &[String]) -> Result<Command, ConfigError> {
    match argv.first().map(String::as_str) {
        Some("env-template") => {
            let path = argv
                .get(1)
                .cloned()
                .unwrap_or_else(|| ".env.template".to_string());
            if argv.len() > 2 {
                return Err(usage("env-template takes at most one argument"));
            }
            Ok(Command::EnvTemplate { path })
        }
        Some("run") => parse_run(config, &argv[1..]).map(Command::Run),
        Some(other) => Err(usage(format!("unknown command: {}", other))),
        None => Err(usage("missing command")),
    }
}

fn parse_run(config: &ExperimentConfig, argv: &[String]) -> Result<RunArgs, ConfigError> {
    let mut it = argv.iter();

    let mode_tag = it.next().ok_or_else(|| usage("missing mode"))?;
    let a = it.next().ok_or_else(|| usage("missing pair arguments"))?;
    let b = it.next().ok_or_else(|| usage("missing pair arguments"))?;
    let num_res = it.next().ok_or_else(|| usage("missing num_res"))?;

    let mode = match mode_tag.as_str() {
        "s" => {
            if config.dataset.is_dated() {
                // Dated corpora address tables by ordinal.
                parse_usize(a, "r_id")?;
                parse_usize(b, "s_id")?;
            }
            RunMode::Single {
                r_id: a.clone(),
                s_id: b.clone(),
            }
        }
        "m" => RunMode::Batch {
            first_id: parse_usize(a, "first_id")?,
            num_cand: parse_usize(b, "num_cand")?,
        },
        other => return Err(usage(format!("unknown mode: {}", other))),
    };

    let cardinality = match num_res.as_str() {
        "o" => ResultCardinality::First,
        "a" => ResultCardinality::All,
        other => return Err(usage(format!("unknown num_res: {}", other))),
    };

    // The day positional belongs to the dated corpora only.
    let mut rest: Vec<&String> = it.collect();
    let day = if config.dataset.is_dated() {
        if rest.is_empty() || rest[0].starts_with('-') {
            return Err(usage("this corpus requires a day argument"));
        }
        let day = rest.remove(0).clone();
        config.validate_day(&day)?;
        Some(day)
    } else {
        if rest.first().is_some_and(|t| !t.starts_with('-')) {
            return Err(usage("the snapshot corpus takes no day argument"));
        }
        None
    };

    let mut day2 = None;
    let mut bounds = OverlapSpec::default();
    let mut flags = rest.into_iter();
    while let Some(flag) = flags.next() {
        let value = flags
            .next()
            .ok_or_else(|| usage(format!("flag {} requires a value", flag)))?;
        match flag.as_str() {
            "-d" => {
                if !config.dataset.is_dated() {
                    return Err(usage("-d applies to the dated corpora only"));
                }
                config.validate_day(value)?;
                day2 = Some(value.clone());
            }
            "-min_w" => bounds.min_w = Some(parse_bound(value, "-min_w")?),
            "-max_w" => bounds.max_w = Some(parse_bound(value, "-max_w")?),
            "-min_h" => bounds.min_h = Some(parse_bound(value, "-min_h")?),
            "-max_h" => bounds.max_h = Some(parse_bound(value, "-max_h")?),
            "-a" => bounds.min_a = Some(parse_bound(value, "-a")?),
            other => return Err(usage(format!("unknown flag: {}", other))),
        }
    }

    Ok(RunArgs {
        mode,
        cardinality,
        day,
        day2,
        bounds,
    })
}

fn parse_usize(s: &str, field: &'static str) -> Result<usize, ConfigError> {
    s.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("not a non-negative integer: {}", s),
    })
}

fn parse_bound(s: &str, flag: &'static str) -> Result<Bound, ConfigError> {
    let value: f64 = s.parse().map_err(|_| ConfigError::InvalidValue {
        field: flag,
        reason: format!("not a number: {}", s),
    })?;
    Bound::from_flag(value, flag)
}
