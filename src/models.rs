use serde::{Deserialize, Serialize};

/// Identifier of a table within its corpus.
///
/// Dated corpora address tables by ordinal position in the per-day listing;
/// the snapshot corpus uses opaque document-store keys. The two spaces are
/// never coerced into each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableId {
    Ordinal(usize),
    Key(String),
}

impl std::fmt::Display for TableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableId::Ordinal(n) => write!(f, "{}", n),
            TableId::Key(k) => write!(f, "{}", k),
        }
    }
}

/// Reference to a concrete table: identifier plus corpus partition.
/// `day` is `None` for the snapshot corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub id: TableId,
    pub day: Option<String>,
}

impl TableRef {
    pub fn dated(id: usize, day: &str) -> Self {
        Self {
            id: TableId::Ordinal(id),
            day: Some(day.to_string()),
        }
    }

    pub fn snapshot(key: &str) -> Self {
        Self {
            id: TableId::Key(key.to_string()),
            day: None,
        }
    }
}

/// A table as stored: ordered rows of cells, plus the metadata needed to
/// normalize it. Owned by the cache once loaded; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
    pub num_columns: usize,
    pub num_header_rows: usize,
}

/// One enumerated pair under evaluation. `index` is the position in the
/// deterministic candidate sequence and the unit of batch resumability.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub index: usize,
    pub left: TableRef,
    pub right: TableRef,
}
