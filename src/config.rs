use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Days with a scraped snapshot, per dated corpus.
pub const STOCK_DAYS: &[&str] = &[
    "01", "04", "05", "06", "07", "08", "11", "12", "13", "14", "15", "18", "19", "20", "21",
    "22", "25", "26", "27", "28", "29",
];

pub const FLIGHT_DAYS: &[&str] = &[
    "2011-12-01", "2011-12-02", "2011-12-03", "2011-12-04", "2011-12-05", "2011-12-07",
    "2011-12-08", "2011-12-09", "2011-12-10", "2011-12-11", "2011-12-12", "2011-12-13",
    "2011-12-14", "2011-12-15", "2011-12-16", "2011-12-17", "2011-12-18", "2011-12-19",
    "2011-12-20", "2011-12-22", "2011-12-24", "2011-12-25", "2011-12-26", "2011-12-27",
    "2011-12-28", "2011-12-29", "2011-12-30", "2011-12-31", "2012-01-01", "2012-01-02",
    "2012-01-03",
];

/// Scraped sources, in the canonical order ordinal table ids follow.
pub const STOCK_SOURCES: &[&str] = &[
    "advfn", "barchart", "barrons", "bloomberg", "boston-com", "bostonmerchant",
    "business-insider", "chron", "cio-com", "cnn-money", "easystockalterts",
    "eresearch-fidelity-com", "finance-abc7-com", "finance-abc7chicago-com",
    "financial-content", "finapps-forbes-com", "finviz", "fool", "foxbusiness",
    "google-finance", "howthemarketworks", "hpcwire", "insidestocks", "investopedia",
    "investorguide", "marketintellisearch", "marketwatch", "minyanville", "msn-money",
    "nasdaq-com", "optimum", "paidcontent", "pc-quote", "personal-wealth-biz",
    "predictwallstreet", "raymond-james", "renewable-energy-world", "scroli",
    "screamingmedia", "simple-stock-quotes", "smartmoney", "stocknod", "stockpickr",
    "stocksmart", "stocktwits", "streetinsider-com", "thecramerreport", "thestree",
    "tickerspy", "tmx-quotemedia", "updown", "wallstreetsurvivor", "yahoo-finance",
    "ycharts-com", "zacks",
];

pub const FLIGHT_SOURCES: &[&str] = &[
    "CO", "aa", "airtravelcenter", "allegiantair", "boston", "businesstravellogue", "den",
    "dfw", "flightarrival", "flightaware", "flightexplorer", "flights", "flightstats",
    "flightview", "flightwise", "flylouisville", "flytecomm", "foxbusiness", "gofox",
    "helloflight", "iad", "ifly", "mco", "mia", "myrateplan", "mytripandmore", "orbitz",
    "ord", "panynj", "phl", "quicktrip", "sfo", "travelocity", "ua", "usatoday", "weather",
    "world-flight-tracker", "wunderground",
];

/// Corpus family under analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dataset {
    Stock,
    Flight,
    Wikipedia,
}

impl Dataset {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "stock" => Ok(Dataset::Stock),
            "flight" => Ok(Dataset::Flight),
            "wikipedia" => Ok(Dataset::Wikipedia),
            other => Err(ConfigError::UnknownDataset(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Stock => "stock",
            Dataset::Flight => "flight",
            Dataset::Wikipedia => "wikipedia",
        }
    }

    pub fn is_dated(&self) -> bool {
        !matches!(self, Dataset::Wikipedia)
    }

    pub fn days(&self) -> &'static [&'static str] {
        match self {
            Dataset::Stock => STOCK_DAYS,
            Dataset::Flight => FLIGHT_DAYS,
            Dataset::Wikipedia => &[],
        }
    }

    pub fn sources(&self) -> &'static [&'static str] {
        match self {
            Dataset::Stock => STOCK_SOURCES,
            Dataset::Flight => FLIGHT_SOURCES,
            Dataset::Wikipedia => &[],
        }
    }

    /// Hard admissibility gate on token counts before the oracle runs.
    /// Only the snapshot corpus applies one.
    pub fn min_tokens(&self) -> Option<usize> {
        match self {
            Dataset::Wikipedia => Some(10),
            _ => None,
        }
    }

    /// Minimum distinct values a normalized column must carry to be kept.
    /// Dated corpora drop near-constant columns; the snapshot keeps all.
    pub fn min_distinct_per_column(&self) -> Option<usize> {
        match self {
            Dataset::Wikipedia => None,
            _ => Some(4),
        }
    }
}

/// Scrape variant of the stock corpus. The flight corpus only exists clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Raw,
    Clean,
}

impl Variant {
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s {
            "raw" => Ok(Variant::Raw),
            "clean" => Ok(Variant::Clean),
            other => Err(ConfigError::InvalidValue {
                field: "variant",
                reason: format!("unsupported: {}", other),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Raw => "raw",
            Variant::Clean => "clean",
        }
    }
}

/// Resolved experiment configuration, built once at startup from the
/// environment (optionally seeded from a `.env` file).
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub dataset: Dataset,
    pub variant: Variant,
    pub data_dir: PathBuf,
    pub results_dir: PathBuf,
    pub candidate_file: PathBuf,
}

impl ExperimentConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let dataset = match std::env::var("TABLE_MATCHER_DATASET") {
            Ok(v) => Dataset::parse(&v)?,
            Err(_) => Dataset::Flight,
        };
        // Variant only applies to the stock corpus.
        let variant = match (dataset, std::env::var("TABLE_MATCHER_VARIANT")) {
            (Dataset::Stock, Ok(v)) => Variant::parse(&v)?,
            _ => Variant::Clean,
        };
        let data_dir = PathBuf::from(
            std::env::var("TABLE_MATCHER_DATA_DIR").unwrap_or_else(|_| "datasets".into()),
        );
        let results_dir = PathBuf::from(
            std::env::var("TABLE_MATCHER_RESULTS_DIR").unwrap_or_else(|_| "results".into()),
        );
        let candidate_file = std::env::var("TABLE_MATCHER_CANDIDATE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("wikipedia").join("candidates.json.gz"));
        Ok(Self {
            dataset,
            variant,
            data_dir,
            results_dir,
            candidate_file,
        })
    }

    /// Directory holding the per-source artifacts for one day.
    pub fn day_dir(&self, day: &str) -> PathBuf {
        self.data_dir
            .join(self.dataset.name())
            .join(self.variant.name())
            .join(day)
    }

    /// Path of the snapshot document store.
    pub fn snapshot_store_path(&self) -> PathBuf {
        self.data_dir.join("wikipedia").join("tables.db")
    }

    /// Directory the partitioned result logs of a batch are written under.
    /// Same-day and cross-day batches are kept apart so restarted sweeps of
    /// either kind never collide.
    pub fn batch_results_dir(&self, day: Option<&str>, cross_day: bool) -> PathBuf {
        match day {
            Some(d) => {
                let kind = if cross_day { "next_day" } else { "single_day" };
                self.results_dir
                    .join(self.dataset.name())
                    .join(kind)
                    .join(format!("{}_tables", self.variant.name()))
                    .join(d)
            }
            None => self.results_dir.join(self.dataset.name()),
        }
    }

    pub fn validate_day(&self, day: &str) -> Result<(), ConfigError> {
        if self.dataset.days().contains(&day) {
            Ok(())
        } else {
            Err(ConfigError::UnknownDay(day.to_string()))
        }
    }
}

/// Artifact file name for one source of a dated corpus.
pub fn artifact_file_name(source: &str) -> String {
    format!("{}.json.gz", source)
}

pub fn artifact_path(day_dir: &Path, source: &str) -> PathBuf {
    day_dir.join(artifact_file_name(source))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_parse() {
        assert_eq!(Dataset::parse("stock").unwrap(), Dataset::Stock);
        assert_eq!(Dataset::parse("flight").unwrap(), Dataset::Flight);
        assert_eq!(Dataset::parse("wikipedia").unwrap(), Dataset::Wikipedia);
        assert!(Dataset::parse("weather").is_err());
    }

    #[test]
    fn test_policies_per_dataset() {
        assert_eq!(Dataset::Wikipedia.min_tokens(), Some(10));
        assert_eq!(Dataset::Stock.min_tokens(), None);
        assert_eq!(Dataset::Flight.min_distinct_per_column(), Some(4));
        assert_eq!(Dataset::Wikipedia.min_distinct_per_column(), None);
    }

    #[test]
    fn test_batch_results_dir_layout() {
        let cfg = ExperimentConfig {
            dataset: Dataset::Flight,
            variant: Variant::Clean,
            data_dir: PathBuf::from("datasets"),
            results_dir: PathBuf::from("results"),
            candidate_file: PathBuf::from("unused"),
        };
        assert_eq!(
            cfg.batch_results_dir(Some("2011-12-01"), false),
            PathBuf::from("results/flight/single_day/clean_tables/2011-12-01")
        );
        assert_eq!(
            cfg.batch_results_dir(Some("2011-12-01"), true),
            PathBuf::from("results/flight/next_day/clean_tables/2011-12-01")
        );
        let snap = ExperimentConfig {
            dataset: Dataset::Wikipedia,
            ..cfg
        };
        assert_eq!(
            snap.batch_results_dir(None, false),
            PathBuf::from("results/wikipedia")
        );
    }
}
