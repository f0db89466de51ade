use flate2::read::GzDecoder;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LoadError;
use crate::models::RawTable;

/// Adapter over the snapshot corpus: a SQLite document store keyed by table
/// id, each document carrying the JSON row array plus layout metadata.
pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        if !path.is_file() {
            return Err(LoadError::Missing(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory store with the corpus schema. Test seam.
    pub fn open_in_memory() -> Result<Self, LoadError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Create (or open) a store file and ensure the schema exists. Used by
    /// ingestion tooling and tests; the driver itself only opens read-style.
    pub fn create(path: &Path) -> Result<Self, LoadError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Fetch one table document by key.
    pub fn load(&self, key: &str) -> Result<RawTable, LoadError> {
        let row = self
            .conn
            .query_row(
                "SELECT content, num_columns, num_header_rows FROM tables WHERE id = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()?;
        let (content, num_columns, num_header_rows) =
            row.ok_or_else(|| LoadError::MissingDocument(key.to_string()))?;
        let rows: Vec<Vec<String>> =
            serde_json::from_str(&content).map_err(|source| LoadError::Corrupt {
                path: key.into(),
                source,
            })?;
        Ok(RawTable {
            rows,
            num_columns: num_columns as usize,
            num_header_rows: num_header_rows as usize,
        })
    }

    /// Insert one document. Used by ingestion tooling and tests.
    pub fn insert(&self, key: &str, table: &RawTable) -> Result<(), LoadError> {
        let content = serde_json::to_string(&table.rows).map_err(|source| LoadError::Corrupt {
            path: key.into(),
            source,
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO tables(id, content, num_columns, num_header_rows)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                key,
                content,
                table.num_columns as i64,
                table.num_header_rows as i64
            ],
        )?;
        Ok(())
    }
}

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tables (
    id              TEXT PRIMARY KEY,
    content         TEXT NOT NULL,
    num_columns     INTEGER NOT NULL,
    num_header_rows INTEGER NOT NULL
);
";

/// Load the externally supplied near-duplicate pair set: a gzip-compressed
/// JSON array of `[left, right]` key pairs. The set carries no order of its
/// own; the enumerator sorts it before indexing.
pub fn read_candidate_pairs(path: &Path) -> Result<Vec<(String, String)>, LoadError> {
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
    let pairs: Vec<(String, String)> =
        serde_json::from_reader(reader).map_err(|source| LoadError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(rows: &[&[&str]]) -> RawTable {
        RawTable {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            num_columns: rows.first().map(|r| r.len()).unwrap_or(0),
            num_header_rows: 1,
        }
    }

    #[test]
    fn test_insert_and_load() {
        let store = SnapshotStore::open_in_memory().unwrap();
        let t = doc(&[&["h"], &["a"], &["b"]]);
        store.insert("37871234-0", &t).unwrap();
        let back = store.load("37871234-0").unwrap();
        assert_eq!(back.rows, t.rows);
        assert_eq!(back.num_header_rows, 1);
    }

    #[test]
    fn test_missing_document() {
        let store = SnapshotStore::open_in_memory().unwrap();
        assert!(matches!(
            store.load("absent"),
            Err(LoadError::MissingDocument(_))
        ));
    }

    #[test]
    fn test_candidate_pairs_round_trip() {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("candidates.json.gz");
        let f = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(f, Compression::default());
        enc.write_all(br#"[["b","c"],["a","z"]]"#).unwrap();
        enc.finish().unwrap();

        let pairs = read_candidate_pairs(&path).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("b".to_string(), "c".to_string()));
    }

    #[test]
    fn test_missing_candidate_file() {
        assert!(matches!(
            read_candidate_pairs(Path::new("/nonexistent/cands.json.gz")),
            Err(LoadError::Missing(_))
        ));
    }
}
