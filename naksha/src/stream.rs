//! Per-node scan streaming.
//!
//! [`ScanStream`] runs the per-node part of the pipeline:
//!
//! ```text
//! NodeRecord ──► decode_pose / decode_local_transform
//!            ──► ScanExtractor (zlib, f32 records, cap)
//!            ──► FrameTransformer (map frame, finite, height band)
//!            ──► visitor(&[Point3])
//! ```
//!
//! Only one node's points are alive at a time. Both build passes call
//! [`ScanStream::for_each_scan`] on the same stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;

use crate::cloud::ScanExtractor;
use crate::core::Point3;
use crate::decode::{decode_local_transform, decode_pose};
use crate::error::{MapError, Result};
use crate::frame::FrameTransformer;
use crate::store::NodeSource;

/// Cooperative cancellation flag, checked between nodes.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// True once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counters for one pass over the store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Rows returned by the source
    pub rows: usize,
    /// Rows kept after striding
    pub nodes: usize,
    /// Map-frame points delivered to the visitor
    pub points: usize,
}

/// Streams map-frame point clouds out of a node source.
pub struct ScanStream<S> {
    source: S,
    extractor: ScanExtractor,
    transformer: FrameTransformer,
    limit_nodes: Option<usize>,
    stride: usize,
    cancel: CancelToken,
}

impl<S: NodeSource> ScanStream<S> {
    /// Create a stream over every node, with no cap or height filter.
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: ScanExtractor::default(),
            transformer: FrameTransformer::default(),
            limit_nodes: None,
            stride: 1,
            cancel: CancelToken::new(),
        }
    }

    /// Set the scan extractor.
    pub fn with_extractor(mut self, extractor: ScanExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Set the frame transformer.
    pub fn with_transformer(mut self, transformer: FrameTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Read at most `limit` rows from the source.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit_nodes = limit;
        self
    }

    /// Keep every `stride`-th row (by position in the query result).
    /// A stride of 0 is treated as 1.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = stride.max(1);
        self
    }

    /// Attach a cancel token.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one pass, handing each node's non-empty map-frame cloud to
    /// `visitor`.
    ///
    /// Any record error aborts the pass; there is no partial result.
    pub fn for_each_scan<R, F>(&self, rng: &mut R, mut visitor: F) -> Result<PassStats>
    where
        R: Rng + ?Sized,
        F: FnMut(&[Point3]),
    {
        let mut stats = PassStats::default();
        let mut index = 0usize;

        self.source.visit_nodes(self.limit_nodes, &mut |record| {
            if self.cancel.is_cancelled() {
                return Err(MapError::Cancelled);
            }
            let position = index;
            index += 1;
            stats.rows += 1;
            if position % self.stride != 0 {
                return Ok(());
            }
            stats.nodes += 1;

            let pose = decode_pose(&record.pose).map_err(|e| e.for_node(record.id))?;
            let local = decode_local_transform(record.scan_info.as_deref());
            let points = self
                .extractor
                .extract(&record.scan, &mut *rng)
                .map_err(|e| e.for_node(record.id))?;

            let map_points = self.transformer.to_map_frame(&points, &local, &pose);
            log::trace!(
                "node {}: {} raw points, {} in map frame",
                record.id,
                points.len(),
                map_points.len()
            );
            if !map_points.is_empty() {
                stats.points += map_points.len();
                visitor(&map_points);
            }
            Ok(())
        })?;

        Ok(stats)
    }
}
