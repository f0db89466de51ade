//! Driver pipeline: enumerate the candidate window, resolve tables through
//! the cache, prefilter, invoke the oracle and append the result logs.
//!
//! Execution is strictly sequential. Throughput comes from running several
//! processes on disjoint windows of the same candidate sequence, which is
//! why everything here is deterministic given the configuration and an
//! unchanged corpus.

pub mod summary;

use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::candidates::CandidateSequence;
use crate::cli::{RunArgs, RunMode};
use crate::config::ExperimentConfig;
use crate::corpus::{snapshot, Corpus, TableCache};
use crate::error::ConfigError;
use crate::export::{BatchLogs, CandidateRecord};
use crate::models::{Candidate, TableRef};
use crate::normalize;
use crate::overlap::{self, Overlap, OverlapOracle};
use crate::similarity;
use summary::RunSummary;

const PROGRESS_EVERY: usize = 50;

/// Progress marks at the window start and every fifty candidates after it.
fn progress_due(offset: usize) -> bool {
    offset % PROGRESS_EVERY == 0
}

#[derive(Debug)]
pub struct RunOutcome {
    pub summary: RunSummary,
    /// Overlaps of the last evaluated candidate. In single-pair mode that is
    /// the result of the one comparison requested.
    pub overlaps: Vec<Overlap>,
}

/// Evaluate one run invocation end to end.
pub fn run(
    config: &ExperimentConfig,
    args: &RunArgs,
    oracle: &dyn OverlapOracle,
) -> Result<RunOutcome> {
    let corpus = Corpus::open(config)?;
    let candidates = enumerate(config, &corpus, args)?;

    // Batch windows log; the single-pair probe reports through the log
    // output only.
    let mut logs = match args.mode {
        RunMode::Batch { first_id, .. } => {
            let dir = config.batch_results_dir(args.day.as_deref(), args.day2.is_some());
            Some(BatchLogs::create(&dir, first_id)?)
        }
        RunMode::Single { .. } => None,
    };
    let verbose = logs.is_none();

    let mut summary = RunSummary::new();
    let started = Instant::now();
    let total = candidates.len();
    let min_tokens = config.dataset.min_tokens();
    let min_distinct = config.dataset.min_distinct_per_column();
    let mut cache = TableCache::new();
    let mut last_overlaps = Vec::new();

    info!(
        "evaluating {} candidate(s) from the {} corpus",
        total,
        config.dataset.name()
    );

    for (n, cand) in candidates.iter().enumerate() {
        if progress_due(n) {
            info!("processed {}/{} candidates", n, total);
        }

        let r_raw = corpus.load(&cand.left, &mut cache)?;
        let s_raw = corpus.load(&cand.right, &mut cache)?;
        let r_cols = normalize::normalize(&r_raw, min_distinct);
        let s_cols = normalize::normalize(&s_raw, min_distinct);
        let stats = similarity::token_similarity(&r_cols, &s_cols);

        // Admissibility gate: an undersized side disqualifies the pair
        // outright, with no log rows at all.
        if let Some(min) = min_tokens {
            if stats.r_tokens < min || stats.s_tokens < min {
                summary.skipped += 1;
                if verbose {
                    info!(
                        "skipping {} vs {}: token counts {} and {} below {}",
                        cand.left.id, cand.right.id, stats.r_tokens, stats.s_tokens, min
                    );
                }
                continue;
            }
        }

        let (r_w, r_h, r_a) = normalize::dimensions(&r_cols);
        let (s_w, s_h, s_a) = normalize::dimensions(&s_cols);
        if verbose {
            info!(
                "comparing {} ({}x{}) vs {} ({}x{}), jsim {}",
                cand.left.id,
                r_w,
                r_h,
                cand.right.id,
                s_w,
                s_h,
                stats
                    .jaccard
                    .map(|j| format!("{:.4}", j))
                    .unwrap_or_else(|| "n/a".into()),
            );
        }

        if let Some(logs) = logs.as_mut() {
            logs.append_candidate(&CandidateRecord {
                id: cand.index,
                r_id: cand.left.id.to_string(),
                r_w,
                r_h,
                r_a,
                r_tokens: stats.r_tokens,
                s_id: cand.right.id.to_string(),
                s_w,
                s_h,
                s_a,
                s_tokens: stats.s_tokens,
                jsim: stats.jaccard,
            })?;
        }

        let (overlaps, metrics) = overlap::evaluate(
            oracle,
            &r_cols,
            &s_cols,
            &args.bounds,
            args.cardinality,
            verbose,
        );
        if let Some(logs) = logs.as_mut() {
            logs.append_run(cand.index, &metrics)?;
        }
        summary.comparisons += 1;
        last_overlaps = overlaps;
    }

    summary.elapsed = started.elapsed();
    summary.log();
    Ok(RunOutcome {
        summary,
        overlaps: last_overlaps,
    })
}

/// Build the candidate window for this invocation.
fn enumerate(
    config: &ExperimentConfig,
    corpus: &Corpus,
    args: &RunArgs,
) -> Result<Vec<Candidate>> {
    match &args.mode {
        RunMode::Single { r_id, s_id } => {
            let seq = match &args.day {
                Some(day) => {
                    // The right side reads from day2 when given, so one
                    // cross-day pair can be probed verbosely.
                    let s_day = args.day2.as_deref().unwrap_or(day);
                    CandidateSequence::single(
                        TableRef::dated(parse_ordinal(r_id, "r_id")?, day),
                        TableRef::dated(parse_ordinal(s_id, "s_id")?, s_day),
                    )
                }
                None => CandidateSequence::single(
                    TableRef::snapshot(r_id),
                    TableRef::snapshot(s_id),
                ),
            };
            Ok(seq.window(0, 1)?)
        }
        RunMode::Batch { first_id, num_cand } => {
            let seq = match (&args.day, corpus) {
                (Some(day), Corpus::Daily(_)) => {
                    // Ordinals index the configured source list on both
                    // sides, so the sequence is the same for every day and a
                    // cross-day self pair is the same source twice.
                    let n = config.dataset.sources().len();
                    match &args.day2 {
                        Some(day2) => CandidateSequence::cross_day(n, day, day2)?,
                        None => CandidateSequence::same_day(n, day)?,
                    }
                }
                (None, Corpus::Snapshot(_)) => {
                    let pairs = snapshot::read_candidate_pairs(&config.candidate_file)
                        .with_context(|| {
                            format!(
                                "failed to load candidate pair set {}",
                                config.candidate_file.display()
                            )
                        })?;
                    CandidateSequence::from_pair_set(pairs)
                }
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "day",
                        reason: "day selection does not match the configured corpus".into(),
                    }
                    .into())
                }
            };
            Ok(seq.window(*first_id, *num_cand)?)
        }
    }
}

fn parse_ordinal(s: &str, field: &'static str) -> Result<usize, ConfigError> {
    s.parse().map_err(|_| ConfigError::InvalidValue {
        field,
        reason: format!("not a non-negative integer: {}", s),
    })
}
