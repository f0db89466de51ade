//! Corpus adapters: resolve a `TableRef` to a `RawTable` through the
//! per-process cache, regardless of the physical storage behind it.

pub mod cache;
pub mod daily;
pub mod snapshot;

use std::rc::Rc;

use crate::config::ExperimentConfig;
use crate::error::LoadError;
use crate::models::{RawTable, TableId, TableRef};
pub use cache::{CacheKey, TableCache};
pub use daily::DailyCorpus;
pub use snapshot::SnapshotStore;

pub enum Corpus {
    Daily(DailyCorpus),
    Snapshot(SnapshotStore),
}

impl Corpus {
    /// Open the corpus named by the configuration. For dated corpora this is
    /// free; the snapshot opens its document store.
    pub fn open(config: &ExperimentConfig) -> Result<Self, LoadError> {
        if config.dataset.is_dated() {
            Ok(Corpus::Daily(DailyCorpus::new(config.clone())))
        } else {
            Ok(Corpus::Snapshot(SnapshotStore::open(
                &config.snapshot_store_path(),
            )?))
        }
    }

    /// Resolve a table reference through the cache, deserializing on first
    /// use. Load failures are fatal to the batch; the caller does not retry.
    pub fn load(
        &self,
        table: &TableRef,
        cache: &mut TableCache,
    ) -> Result<Rc<RawTable>, LoadError> {
        match (self, &table.id) {
            (Corpus::Daily(corpus), TableId::Ordinal(ordinal)) => {
                let day = table
                    .day
                    .clone()
                    .ok_or_else(|| LoadError::WrongCorpus(table.id.to_string()))?;
                let key = CacheKey::Dated {
                    day: day.clone(),
                    ordinal: *ordinal,
                };
                cache.get_or_load(key, || corpus.load(&day, *ordinal))
            }
            (Corpus::Snapshot(store), TableId::Key(key)) => {
                let cache_key = CacheKey::Document(key.clone());
                cache.get_or_load(cache_key, || store.load(key))
            }
            _ => Err(LoadError::WrongCorpus(table.id.to_string())),
        }
    }
}
