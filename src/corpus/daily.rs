use flate2::read::GzDecoder;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::config::{artifact_path, ExperimentConfig};
use crate::error::LoadError;
use crate::models::RawTable;

/// Header rows per scraped table. The scrapes carry exactly one header row.
const NUM_HEADER_ROWS: usize = 1;

/// Adapter over one dated corpus: per-day directories holding one
/// gzip-compressed JSON artifact per source.
pub struct DailyCorpus {
    config: ExperimentConfig,
}

impl DailyCorpus {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Path of the artifact behind (day, ordinal), if the ordinal is in
    /// range. Ordinals index the configured source list, never a per-day
    /// directory listing, so a given ordinal names the same source on every
    /// day and cross-day pairs line up source against source.
    pub fn resolve(&self, day: &str, ordinal: usize) -> Option<PathBuf> {
        let dir = self.config.day_dir(day);
        self.config
            .dataset
            .sources()
            .get(ordinal)
            .map(|source| artifact_path(&dir, source))
    }

    /// Deserialize one table artifact. A source that was not scraped on this
    /// day surfaces as `LoadError::Missing`; the batch aborts rather than
    /// silently pairing some other table. First call per table per run; later
    /// access goes through the cache.
    pub fn load(&self, day: &str, ordinal: usize) -> Result<RawTable, LoadError> {
        let path = self
            .resolve(day, ordinal)
            .ok_or_else(|| LoadError::Missing(self.config.day_dir(day).join(ordinal.to_string())))?;
        read_artifact(&path)
    }
}

/// Read a gzip-compressed JSON row array into a `RawTable`.
pub fn read_artifact(path: &Path) -> Result<RawTable, LoadError> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::Missing(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let reader = BufReader::new(GzDecoder::new(file));
    let rows: Vec<Vec<String>> =
        serde_json::from_reader(reader).map_err(|source| LoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    let num_columns = rows.first().map(|r| r.len()).unwrap_or(0);
    Ok(RawTable {
        rows,
        num_columns,
        num_header_rows: NUM_HEADER_ROWS,
    })
}

/// Write one table artifact in the corpus format. Used by ingestion tooling
/// and tests; the driver itself only reads.
pub fn write_artifact(path: &Path, rows: &[Vec<String>]) -> Result<(), std::io::Error> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    serde_json::to_writer(&mut encoder, rows)?;
    encoder.finish()?;
    Ok(())
}
