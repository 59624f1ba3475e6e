//! Read-only access to the pose-graph store.
//!
//! The store is an SQLite database with two joined tables:
//!
//! | Table | Columns used |
//! |-------|--------------|
//! | `Node` | `id INTEGER`, `pose BLOB` (48 bytes) |
//! | `Data` | `id INTEGER`, `scan BLOB` (zlib), `scan_info BLOB` |
//!
//! Rows are visited in ascending node id, skipping nodes without a pose or
//! scan. A build walks the store twice, so sources must yield the same rows
//! on every visit.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::error::{MapError, Result};

const NODE_QUERY: &str = "\
SELECT n.id, n.pose, d.scan, d.scan_info
FROM Node n
JOIN Data d ON d.id = n.id
WHERE d.scan IS NOT NULL AND n.pose IS NOT NULL
ORDER BY n.id";

const COUNT_QUERY: &str = "\
SELECT COUNT(*)
FROM Node n
JOIN Data d ON d.id = n.id
WHERE d.scan IS NOT NULL AND n.pose IS NOT NULL";

/// One joined node row, still in serialized form.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    /// Node id
    pub id: i64,
    /// Map-from-node pose blob
    pub pose: Vec<u8>,
    /// Compressed scan payload
    pub scan: Vec<u8>,
    /// Scan info blob carrying the local transform at its tail
    pub scan_info: Option<Vec<u8>>,
}

/// A source of node rows in ascending id order.
pub trait NodeSource {
    /// Visit up to `limit` rows, stopping at the first visitor error.
    fn visit_nodes(
        &self,
        limit: Option<usize>,
        visitor: &mut dyn FnMut(NodeRecord) -> Result<()>,
    ) -> Result<()>;
}

/// SQLite-backed pose-graph store.
pub struct PoseGraphStore {
    conn: Connection,
    path: PathBuf,
}

impl PoseGraphStore {
    /// Open a store read-only.
    ///
    /// A missing file is reported as [`MapError::StoreUnavailable`] rather
    /// than letting SQLite create an empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MapError::StoreUnavailable(path.to_path_buf()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        // Some builds reject query_only on read-only handles.
        if let Err(e) = conn.execute_batch("PRAGMA query_only=ON;") {
            log::debug!("query_only pragma not applied: {}", e);
        }

        log::debug!("Opened pose-graph store {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of nodes carrying both a pose and a scan.
    pub fn node_count(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(COUNT_QUERY, [], |row| row.get(0))?;
        Ok(count.max(0) as usize)
    }
}

impl NodeSource for PoseGraphStore {
    fn visit_nodes(
        &self,
        limit: Option<usize>,
        visitor: &mut dyn FnMut(NodeRecord) -> Result<()>,
    ) -> Result<()> {
        let sql = match limit {
            Some(_) => format!("{} LIMIT ?1", NODE_QUERY),
            None => NODE_QUERY.to_string(),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = match limit {
            Some(n) => stmt.query([n as i64])?,
            None => stmt.query([])?,
        };

        while let Some(row) = rows.next()? {
            let record = NodeRecord {
                id: row.get(0)?,
                pose: row.get(1)?,
                scan: row.get(2)?,
                scan_info: row.get(3)?,
            };
            visitor(record)?;
        }
        Ok(())
    }
}

/// In-memory node source, mostly for tests and tooling.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    records: Vec<NodeRecord>,
}

impl MemorySource {
    /// Create a source with rows sorted by id.
    ///
    /// Rows are delivered as stored. An empty pose or scan blob reaches the
    /// decoders and fails there, as a zero-length blob in SQLite would.
    pub fn new(mut records: Vec<NodeRecord>) -> Self {
        records.sort_by_key(|r| r.id);
        Self { records }
    }

    /// Append a row, keeping id order.
    pub fn push(&mut self, record: NodeRecord) {
        let at = self.records.partition_point(|r| r.id <= record.id);
        self.records.insert(at, record);
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl NodeSource for MemorySource {
    fn visit_nodes(
        &self,
        limit: Option<usize>,
        visitor: &mut dyn FnMut(NodeRecord) -> Result<()>,
    ) -> Result<()> {
        let rows = self
            .records
            .iter()
            .take(limit.unwrap_or(usize::MAX));
        for record in rows {
            visitor(record.clone())?;
        }
        Ok(())
    }
}

impl<S: NodeSource + ?Sized> NodeSource for &S {
    fn visit_nodes(
        &self,
        limit: Option<usize>,
        visitor: &mut dyn FnMut(NodeRecord) -> Result<()>,
    ) -> Result<()> {
        (**self).visit_nodes(limit, visitor)
    }
}
