//! Bundled largest-overlap detector: seed-and-extend search over the lattice
//! of column mappings. Values are compared as opaque strings and rows count
//! with multiset semantics, so row order never affects the outcome.

use std::collections::HashMap;
use std::time::Instant;

use log::info;

use super::{DetectionMetrics, Overlap, OverlapOracle, ResolvedBounds, ResultCardinality};

/// How the mapping lattice is explored. Exhaustive search visits every
/// extendable mapping; beam search keeps only the `bw` tallest candidates at
/// each level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    Exhaustive,
    Beam(usize),
}

impl SearchStrategy {
    pub fn tag(&self) -> &'static str {
        match self {
            SearchStrategy::Exhaustive => "e",
            SearchStrategy::Beam(_) => "a",
        }
    }

    pub fn beam_width(&self) -> Option<usize> {
        match self {
            SearchStrategy::Exhaustive => None,
            SearchStrategy::Beam(bw) => Some(*bw),
        }
    }
}

pub struct LatticeDetector {
    strategy: SearchStrategy,
}

impl LatticeDetector {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self { strategy }
    }

    pub fn exhaustive() -> Self {
        Self::new(SearchStrategy::Exhaustive)
    }
}

impl Default for LatticeDetector {
    fn default() -> Self {
        Self::exhaustive()
    }
}

/// A single-column pairing and the size of its shared value multiset. Seeds
/// are the atoms every wider mapping is assembled from.
struct Seed {
    r_col: usize,
    s_col: usize,
    height: usize,
}

/// A partially explored mapping. `last_seed` points into the seed list so
/// each seed combination is generated exactly once.
struct SearchNode {
    pairs: Vec<(usize, usize)>,
    last_seed: usize,
    height: usize,
}

/// Size of the multiset intersection of two columns.
fn column_intersection(r: &[String], s: &[String]) -> usize {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in r {
        *counts.entry(v.as_str()).or_insert(0) += 1;
    }
    let mut shared = 0;
    for v in s {
        if let Some(c) = counts.get_mut(v.as_str()) {
            if *c > 0 {
                *c -= 1;
                shared += 1;
            }
        }
    }
    shared
}

/// Height of a mapping: the multiset intersection of the row tuples each side
/// projects onto the mapped columns.
fn mapping_height(
    r_columns: &[Vec<String>],
    s_columns: &[Vec<String>],
    pairs: &[(usize, usize)],
) -> usize {
    let r_h = pairs
        .first()
        .map(|&(i, _)| r_columns[i].len())
        .unwrap_or(0);
    let s_h = pairs
        .first()
        .map(|&(_, j)| s_columns[j].len())
        .unwrap_or(0);
    let mut counts: HashMap<Vec<&str>, usize> = HashMap::new();
    for k in 0..r_h {
        let tuple: Vec<&str> = pairs
            .iter()
            .map(|&(i, _)| r_columns[i][k].as_str())
            .collect();
        *counts.entry(tuple).or_insert(0) += 1;
    }
    let mut shared = 0;
    for k in 0..s_h {
        let tuple: Vec<&str> = pairs
            .iter()
            .map(|&(_, j)| s_columns[j][k].as_str())
            .collect();
        if let Some(c) = counts.get_mut(&tuple) {
            if *c > 0 {
                *c -= 1;
                shared += 1;
            }
        }
    }
    shared
}

impl OverlapOracle for LatticeDetector {
    fn detect(
        &self,
        r_columns: &[Vec<String>],
        s_columns: &[Vec<String>],
        bounds: &ResolvedBounds,
        cardinality: ResultCardinality,
        verbose: bool,
    ) -> (Vec<Overlap>, DetectionMetrics) {
        let total = Instant::now();
        let mut metrics = DetectionMetrics::default();

        // Widening a mapping can only shrink its height, so seeds below the
        // height floor can never appear in a reportable overlap.
        let min_h = bounds.min_h.max(1);

        let phase = Instant::now();
        let mut seeds: Vec<Seed> = Vec::new();
        for (i, r_col) in r_columns.iter().enumerate() {
            for (j, s_col) in s_columns.iter().enumerate() {
                let height = column_intersection(r_col, s_col);
                if height >= min_h {
                    seeds.push(Seed {
                        r_col: i,
                        s_col: j,
                        height,
                    });
                }
            }
        }
        seeds.sort_by(|a, b| {
            b.height
                .cmp(&a.height)
                .then(a.r_col.cmp(&b.r_col))
                .then(a.s_col.cmp(&b.s_col))
        });
        metrics.seeds = Some(seeds.len());
        metrics.seed_init_time = Some(phase.elapsed().as_secs_f64());

        if seeds.is_empty() {
            // Nothing to extend. Later phases never run and their fields
            // stay unset.
            if verbose {
                info!("no seeds, search skipped");
            }
            return (Vec::new(), metrics);
        }

        metrics.algo = Some(self.strategy.tag());
        metrics.bw = self.strategy.beam_width();

        let max_width = r_columns.len().min(s_columns.len()).min(bounds.max_w);

        let phase = Instant::now();
        let mut level: Vec<SearchNode> = seeds
            .iter()
            .enumerate()
            .map(|(idx, s)| SearchNode {
                pairs: vec![(s.r_col, s.s_col)],
                last_seed: idx,
                height: s.height,
            })
            .collect();
        metrics.setup_time = Some(phase.elapsed().as_secs_f64());

        let mut gen_cands = level.len();
        let mut gen_time = 0.0;
        let mut ver_cands = 0usize;
        let mut ver_time = 0.0;

        let mut best_area = 0usize;
        let mut results: Vec<Overlap> = Vec::new();

        let mut width = 1usize;
        while width <= max_width && !level.is_empty() {
            // Verify the level. Single-column heights were already computed
            // during seed initialization.
            let phase = Instant::now();
            let mut survivors = Vec::new();
            for mut node in level {
                ver_cands += 1;
                if width > 1 {
                    node.height = mapping_height(r_columns, s_columns, &node.pairs);
                }
                if node.height < min_h {
                    continue;
                }
                let area = width * node.height;
                if width >= bounds.min_w && node.height <= bounds.max_h && area >= bounds.min_a {
                    if area > best_area {
                        best_area = area;
                        results.clear();
                    }
                    if area == best_area && area > 0 {
                        let mut pairs = node.pairs.clone();
                        pairs.sort();
                        results.push(Overlap {
                            column_pairs: pairs,
                            height: node.height,
                        });
                    }
                }
                survivors.push(node);
            }
            ver_time += phase.elapsed().as_secs_f64();

            if width == max_width {
                break;
            }

            // Extend. Branches whose best reachable area cannot match the
            // current maximum are dropped first.
            let phase = Instant::now();
            survivors.retain(|n| n.height * max_width >= best_area);
            if let SearchStrategy::Beam(bw) = self.strategy {
                survivors.sort_by(|a, b| b.height.cmp(&a.height).then(a.pairs.cmp(&b.pairs)));
                survivors.truncate(bw);
            }
            let mut next = Vec::new();
            for node in &survivors {
                for (idx, seed) in seeds.iter().enumerate().skip(node.last_seed + 1) {
                    if node
                        .pairs
                        .iter()
                        .any(|&(i, j)| i == seed.r_col || j == seed.s_col)
                    {
                        continue;
                    }
                    let mut pairs = node.pairs.clone();
                    pairs.push((seed.r_col, seed.s_col));
                    next.push(SearchNode {
                        pairs,
                        last_seed: idx,
                        height: 0,
                    });
                }
            }
            gen_cands += next.len();
            gen_time += phase.elapsed().as_secs_f64();
            level = next;
            width += 1;
        }

        metrics.gen_cands = Some(gen_cands);
        metrics.gen_time = Some(gen_time);
        metrics.ver_cands = Some(ver_cands);
        metrics.ver_time = Some(ver_time);
        metrics.o_num = Some(results.len());
        match results.first() {
            Some(top) => {
                metrics.o_w = Some(top.width());
                metrics.o_h = Some(top.height);
                metrics.o_a = Some(top.area());
            }
            None => {
                metrics.o_w = Some(0);
                metrics.o_h = Some(0);
                metrics.o_a = Some(0);
            }
        }
        metrics.total_time = Some(total.elapsed().as_secs_f64());

        if verbose {
            info!(
                "found {} largest overlap(s) with area {}",
                results.len(),
                best_area
            );
            for o in &results {
                info!(
                    "  overlap w={} h={} columns={:?}",
                    o.width(),
                    o.height,
                    o.column_pairs
                );
            }
        }

        if cardinality == ResultCardinality::First {
            results.truncate(1);
        }
        (results, metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|c| c.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    fn unbounded() -> ResolvedBounds {
        ResolvedBounds {
            min_w: 0,
            max_w: usize::MAX,
            min_h: 0,
            max_h: usize::MAX,
            min_a: 0,
        }
    }

    #[test]
    fn test_identical_single_column() {
        let r = cols(&[&["a", "b", "c"]]);
        let s = cols(&[&["a", "b", "c"]]);
        let (overlaps, metrics) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::All,
            false,
        );
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].column_pairs, vec![(0, 0)]);
        assert_eq!(overlaps[0].height, 3);
        assert_eq!(metrics.o_a, Some(3));
    }

    #[test]
    fn test_copied_two_column_block() {
        // Columns 0 and 1 of R reappear as columns 1 and 2 of S with the
        // rows shuffled; column 2 of R has no counterpart.
        let r = cols(&[
            &["x1", "x2", "x3"],
            &["y1", "y2", "y3"],
            &["q", "q", "q"],
        ]);
        let s = cols(&[
            &["z", "z", "z"],
            &["x3", "x1", "x2"],
            &["y3", "y1", "y2"],
        ]);
        let (overlaps, metrics) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::All,
            false,
        );
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].column_pairs, vec![(0, 1), (1, 2)]);
        assert_eq!(overlaps[0].height, 3);
        assert_eq!(metrics.o_w, Some(2));
        assert_eq!(metrics.o_h, Some(3));
        assert_eq!(metrics.o_a, Some(6));
    }

    #[test]
    fn test_disjoint_tables_exit_before_search() {
        let r = cols(&[&["a", "b"]]);
        let s = cols(&[&["x", "y"]]);
        let (overlaps, metrics) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::All,
            false,
        );
        assert!(overlaps.is_empty());
        assert_eq!(metrics.seeds, Some(0));
        assert!(metrics.seed_init_time.is_some());
        assert_eq!(metrics.algo, None);
        assert_eq!(metrics.setup_time, None);
        assert_eq!(metrics.o_num, None);
        assert_eq!(metrics.total_time, None);
    }

    #[test]
    fn test_min_height_excludes_thin_matches() {
        let r = cols(&[&["a", "b", "p"]]);
        let s = cols(&[&["a", "q", "r"]]);
        let mut bounds = unbounded();
        bounds.min_h = 2;
        let (overlaps, metrics) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &bounds,
            ResultCardinality::All,
            false,
        );
        assert!(overlaps.is_empty());
        assert_eq!(metrics.seeds, Some(0));
    }

    #[test]
    fn test_min_area_leaves_empty_result_with_zeroed_summary() {
        let r = cols(&[&["a", "b"]]);
        let s = cols(&[&["a", "c"]]);
        let mut bounds = unbounded();
        bounds.min_a = 5;
        let (overlaps, metrics) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &bounds,
            ResultCardinality::All,
            false,
        );
        assert!(overlaps.is_empty());
        assert_eq!(metrics.o_num, Some(0));
        assert_eq!(metrics.o_w, Some(0));
        assert_eq!(metrics.o_h, Some(0));
        assert_eq!(metrics.o_a, Some(0));
        assert!(metrics.total_time.is_some());
    }

    #[test]
    fn test_first_cardinality_truncates_but_counts_all_ties() {
        // Two disjoint single-column overlaps of equal area and no viable
        // two-column extension.
        let r = cols(&[&["a", "b"], &["c", "d"]]);
        let s = cols(&[&["a", "b"], &["d", "c"]]);
        let (all, metrics_all) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::All,
            false,
        );
        assert_eq!(all.len(), 2);
        assert_eq!(metrics_all.o_num, Some(2));

        let (first, metrics_first) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::First,
            false,
        );
        assert_eq!(first.len(), 1);
        assert_eq!(metrics_first.o_num, Some(2));
        assert_eq!(first[0], all[0]);
    }

    #[test]
    fn test_beam_search_finds_dominant_block() {
        let r = cols(&[
            &["x1", "x2", "x3", "x4"],
            &["y1", "y2", "y3", "y4"],
        ]);
        let s = cols(&[
            &["x1", "x2", "x3", "x4"],
            &["y1", "y2", "y3", "y4"],
        ]);
        let (overlaps, metrics) = LatticeDetector::new(SearchStrategy::Beam(2)).detect(
            &r,
            &s,
            &unbounded(),
            ResultCardinality::All,
            false,
        );
        assert_eq!(overlaps.len(), 1);
        assert_eq!(overlaps[0].column_pairs, vec![(0, 0), (1, 1)]);
        assert_eq!(metrics.algo, Some("a"));
        assert_eq!(metrics.bw, Some(2));
    }

    #[test]
    fn test_detection_is_deterministic() {
        let r = cols(&[
            &["a", "b", "c"],
            &["d", "e", "f"],
            &["a", "e", "c"],
        ]);
        let s = cols(&[
            &["c", "a", "b"],
            &["f", "d", "e"],
            &["c", "a", "e"],
        ]);
        let det = LatticeDetector::exhaustive();
        let (first, _) = det.detect(&r, &s, &unbounded(), ResultCardinality::All, false);
        let (second, _) = det.detect(&r, &s, &unbounded(), ResultCardinality::All, false);
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_width_caps_search() {
        let r = cols(&[&["a", "b"], &["c", "d"]]);
        let s = cols(&[&["a", "b"], &["c", "d"]]);
        let mut bounds = unbounded();
        bounds.max_w = 1;
        let (overlaps, _) = LatticeDetector::exhaustive().detect(
            &r,
            &s,
            &bounds,
            ResultCardinality::All,
            false,
        );
        assert!(overlaps.iter().all(|o| o.width() == 1));
    }
}
