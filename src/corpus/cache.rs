use std::collections::HashMap;
use std::rc::Rc;

use crate::error::LoadError;
use crate::models::RawTable;

/// Cache key for a loaded table.
///
/// Always composite for dated corpora: numeric ordinals may coincide across
/// distinct days, so the partition is part of the key. For a same-day sweep
/// the partition is constant and the key degenerates to the plain ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Dated { day: String, ordinal: usize },
    Document(String),
}

/// Per-process table cache. A table deserializes at most once per key;
/// every later lookup is a pure cache hit. Single-threaded by design, so no
/// locking is involved.
#[derive(Default)]
pub struct TableCache {
    map: HashMap<CacheKey, Rc<RawTable>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Return the cached table for `key`, loading it with `load` on first use.
    pub fn get_or_load<F>(&mut self, key: CacheKey, load: F) -> Result<Rc<RawTable>, LoadError>
    where
        F: FnOnce() -> Result<RawTable, LoadError>,
    {
        if let Some(hit) = self.map.get(&key) {
            return Ok(Rc::clone(hit));
        }
        let table = Rc::new(load()?);
        self.map.insert(key, Rc::clone(&table));
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(marker: &str) -> RawTable {
        RawTable {
            rows: vec![vec![marker.to_string()]],
            num_columns: 1,
            num_header_rows: 0,
        }
    }

    #[test]
    fn test_loads_once_per_key() {
        let mut cache = TableCache::new();
        let mut loads = 0;
        for _ in 0..3 {
            let key = CacheKey::Dated {
                day: "01".into(),
                ordinal: 7,
            };
            cache
                .get_or_load(key, || {
                    loads += 1;
                    Ok(table("t"))
                })
                .unwrap();
        }
        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_same_ordinal_distinct_days_do_not_collide() {
        let mut cache = TableCache::new();
        let a = cache
            .get_or_load(
                CacheKey::Dated {
                    day: "01".into(),
                    ordinal: 0,
                },
                || Ok(table("day1")),
            )
            .unwrap();
        let b = cache
            .get_or_load(
                CacheKey::Dated {
                    day: "04".into(),
                    ordinal: 0,
                },
                || Ok(table("day4")),
            )
            .unwrap();
        assert_eq!(a.rows[0][0], "day1");
        assert_eq!(b.rows[0][0], "day4");
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_load_error_is_not_cached() {
        let mut cache = TableCache::new();
        let key = CacheKey::Document("k".into());
        let err = cache.get_or_load(key.clone(), || {
            Err(LoadError::MissingDocument("k".into()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
        // A later successful load still works.
        cache.get_or_load(key, || Ok(table("ok"))).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
