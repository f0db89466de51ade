//! Overlap evaluation driver: constraint resolution and the oracle seam.
//!
//! The detection algorithm itself is opaque to the pipeline; it is invoked as
//! a pure function behind [`OverlapOracle`] and its structured output and
//! timing breakdown are relayed into the run-metrics record unchanged.

pub mod detector;

pub use detector::LatticeDetector;

use crate::error::ConfigError;
use crate::normalize;

/// A geometric constraint value, tagged at parse time.
///
/// Flag values of 1 or more are absolute cell counts; values strictly between
/// 0 and 1 are ratios against the smaller input's corresponding dimension (or
/// area, for the area bound). Exactly 1.0 is absolute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Absolute(usize),
    Ratio(f64),
}

impl Bound {
    pub fn from_flag(value: f64, flag: &'static str) -> Result<Self, ConfigError> {
        if value <= 0.0 {
            Err(ConfigError::NonPositiveBound { flag, value })
        } else if value < 1.0 {
            Ok(Bound::Ratio(value))
        } else {
            Ok(Bound::Absolute(value as usize))
        }
    }

    /// Resolve against the reference dimension of the smaller input.
    pub fn resolve(&self, base: usize) -> usize {
        match self {
            Bound::Absolute(n) => *n,
            Bound::Ratio(f) => (f * base as f64).floor() as usize,
        }
    }
}

/// The overlap constraints as given on the command line. Unset maxima are
/// unbounded; unset minima are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapSpec {
    pub min_w: Option<Bound>,
    pub max_w: Option<Bound>,
    pub min_h: Option<Bound>,
    pub max_h: Option<Bound>,
    pub min_a: Option<Bound>,
}

/// Constraints with every ratio resolved to an absolute cell count for one
/// concrete table pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBounds {
    pub min_w: usize,
    pub max_w: usize,
    pub min_h: usize,
    pub max_h: usize,
    pub min_a: usize,
}

impl OverlapSpec {
    /// Resolve ratios against the smaller of the two inputs: width ratios
    /// against `min(r_w, s_w)`, height ratios against `min(r_h, s_h)`, the
    /// area ratio against `min(r_a, s_a)`.
    pub fn resolve(
        &self,
        r_dims: (usize, usize, usize),
        s_dims: (usize, usize, usize),
    ) -> ResolvedBounds {
        let (r_w, r_h, r_a) = r_dims;
        let (s_w, s_h, s_a) = s_dims;
        let base_w = r_w.min(s_w);
        let base_h = r_h.min(s_h);
        let base_a = r_a.min(s_a);
        ResolvedBounds {
            min_w: self.min_w.map(|b| b.resolve(base_w)).unwrap_or(0),
            max_w: self.max_w.map(|b| b.resolve(base_w)).unwrap_or(usize::MAX),
            min_h: self.min_h.map(|b| b.resolve(base_h)).unwrap_or(0),
            max_h: self.max_h.map(|b| b.resolve(base_h)).unwrap_or(usize::MAX),
            min_a: self.min_a.map(|b| b.resolve(base_a)).unwrap_or(0),
        }
    }
}

/// Whether the caller wants only the first discovered largest overlap or the
/// full maximal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCardinality {
    First,
    All,
}

/// A maximal shared cell block: a set of column pairings and the number of
/// rows on which every paired column agrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    /// Pairs of (column in R, column in S), in ascending R-column order.
    pub column_pairs: Vec<(usize, usize)>,
    pub height: usize,
}

impl Overlap {
    pub fn width(&self) -> usize {
        self.column_pairs.len()
    }

    pub fn area(&self) -> usize {
        self.width() * self.height
    }
}

/// Timing and size breakdown of one oracle invocation. Every field is
/// optional: when the oracle short-circuits before a phase runs, that phase's
/// fields stay unset and serialize as empty log fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionMetrics {
    pub seeds: Option<usize>,
    pub seed_init_time: Option<f64>,
    pub algo: Option<&'static str>,
    pub bw: Option<usize>,
    pub setup_time: Option<f64>,
    pub gen_cands: Option<usize>,
    pub gen_time: Option<f64>,
    pub ver_cands: Option<usize>,
    pub ver_time: Option<f64>,
    pub o_num: Option<usize>,
    pub o_w: Option<usize>,
    pub o_h: Option<usize>,
    pub o_a: Option<usize>,
    pub total_time: Option<f64>,
}

/// The external largest-overlap oracle. Pure: same inputs, same outputs.
/// A panic inside an implementation propagates uncaught and kills the batch.
pub trait OverlapOracle {
    fn detect(
        &self,
        r_columns: &[Vec<String>],
        s_columns: &[Vec<String>],
        bounds: &ResolvedBounds,
        cardinality: ResultCardinality,
        verbose: bool,
    ) -> (Vec<Overlap>, DetectionMetrics);
}

/// Resolve the constraints for one concrete pair and invoke the oracle.
pub fn evaluate(
    oracle: &dyn OverlapOracle,
    r_columns: &[Vec<String>],
    s_columns: &[Vec<String>],
    spec: &OverlapSpec,
    cardinality: ResultCardinality,
    verbose: bool,
) -> (Vec<Overlap>, DetectionMetrics) {
    let bounds = spec.resolve(
        normalize::dimensions(r_columns),
        normalize::dimensions(s_columns),
    );
    oracle.detect(r_columns, s_columns, &bounds, cardinality, verbose)
}
