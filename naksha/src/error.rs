//! Error types for Naksha

use std::path::PathBuf;
use std::sync::Arc;

/// Result type alias
pub type Result<T> = std::result::Result<T, MapError>;

/// Map build error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A pose or scan blob does not have the expected layout
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// A scan payload could not be decompressed
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    /// The grid implied by bounds and resolution exceeds the cell ceiling
    #[error(
        "Grid too big: {width}x{height} = {cells} cells (limit {max_cells}). \
         Increase resolution or reduce bounds (z_range/limit_nodes/stride)"
    )]
    OversizedGrid {
        /// Computed width in cells
        width: usize,
        /// Computed height in cells
        height: usize,
        /// `width * height`
        cells: u128,
        /// Configured ceiling
        max_cells: u64,
    },

    /// The pose-graph store file does not exist
    #[error("Map unavailable: store not found at {}", .0.display())]
    StoreUnavailable(PathBuf),

    /// SQLite error
    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding or decoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Metadata sidecar error
    #[error("Metadata error: {0}")]
    Metadata(#[from] serde_yaml::Error),

    /// Build parameters rejected before any work was done
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Build aborted through its cancel token
    #[error("Build cancelled")]
    Cancelled,

    /// Failure of a cached build, handed to every caller that awaited it
    #[error(transparent)]
    Shared(Arc<MapError>),
}

impl MapError {
    /// Prefix a record-level error with the node it came from.
    pub fn for_node(self, node_id: i64) -> Self {
        match self {
            MapError::MalformedRecord(msg) => {
                MapError::MalformedRecord(format!("node {}: {}", node_id, msg))
            }
            MapError::CorruptPayload(msg) => {
                MapError::CorruptPayload(format!("node {}: {}", node_id, msg))
            }
            other => other,
        }
    }

    /// The underlying error, looking through [`MapError::Shared`].
    pub fn root(&self) -> &MapError {
        match self {
            MapError::Shared(inner) => inner.root(),
            other => other,
        }
    }

    /// True for the "map unavailable" boundary condition.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.root(), MapError::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_node_prefixes_record_errors() {
        let err = MapError::MalformedRecord("13 floats".to_string()).for_node(42);
        assert_eq!(err.to_string(), "Malformed record: node 42: 13 floats");

        let err = MapError::CorruptPayload("bad header".to_string()).for_node(7);
        assert_eq!(err.to_string(), "Corrupt payload: node 7: bad header");

        let err = MapError::Cancelled.for_node(1);
        assert!(matches!(err, MapError::Cancelled));
    }

    #[test]
    fn test_oversized_message_carries_dimensions() {
        let err = MapError::OversizedGrid {
            width: 4001,
            height: 3001,
            cells: 4001 * 3001,
            max_cells: 1_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("4001x3001"));
        assert!(msg.contains("1000000"));
    }

    #[test]
    fn test_shared_error_is_transparent() {
        let inner = Arc::new(MapError::CorruptPayload("node 3: bad header".to_string()));
        let err = MapError::Shared(inner);
        assert_eq!(err.to_string(), "Corrupt payload: node 3: bad header");
        assert!(matches!(err.root(), MapError::CorruptPayload(_)));
        assert!(!err.is_unavailable());

        let err = MapError::Shared(Arc::new(MapError::StoreUnavailable(PathBuf::from("a.db"))));
        assert!(err.is_unavailable());
    }
}
