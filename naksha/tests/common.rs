//! Test utilities for Naksha integration tests.
//!
//! Builds real SQLite pose-graph stores in temporary directories.

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::ZlibEncoder;
use naksha::Transform3D;
use naksha::cloud::compress_scan;
use naksha::decode::encode_pose;
use rusqlite::{Connection, params};
use tempfile::TempDir;

const SCHEMA: &str = "
CREATE TABLE Node (id INTEGER PRIMARY KEY, pose BLOB);
CREATE TABLE Data (id INTEGER PRIMARY KEY, scan BLOB, scan_info BLOB);";

/// Header bytes placed before the local transform in `scan_info`.
const SCAN_INFO_HEADER: [u8; 20] = [7; 20];

/// A pose-graph store in a temporary directory.
pub struct StoreFixture {
    dir: TempDir,
    path: PathBuf,
    conn: Connection,
}

impl StoreFixture {
    /// Create an empty store with the Node/Data schema.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rtabmap.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Self { dir, path, conn }
    }

    /// Store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temporary directory holding the store, usable for outputs.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Add a node with a pose and sensor-frame points, no local transform.
    pub fn add_node(&self, id: i64, pose: &Transform3D, points: &[[f32; 4]]) {
        let scan = compress_scan(points).unwrap();
        self.add_raw(id, Some(&encode_pose(pose)), Some(&scan), None);
    }

    /// Add a node whose scan_info carries a local transform.
    pub fn add_node_with_local(
        &self,
        id: i64,
        pose: &Transform3D,
        local: &Transform3D,
        points: &[[f32; 4]],
    ) {
        let scan = compress_scan(points).unwrap();
        let mut info = SCAN_INFO_HEADER.to_vec();
        info.extend(encode_pose(local));
        self.add_raw(id, Some(&encode_pose(pose)), Some(&scan), Some(&info));
    }

    /// Insert raw blobs; `None` stores SQL NULL.
    pub fn add_raw(
        &self,
        id: i64,
        pose: Option<&[u8]>,
        scan: Option<&[u8]>,
        scan_info: Option<&[u8]>,
    ) {
        self.conn
            .execute("INSERT INTO Node (id, pose) VALUES (?1, ?2)", params![id, pose])
            .unwrap();
        self.conn
            .execute(
                "INSERT INTO Data (id, scan, scan_info) VALUES (?1, ?2, ?3)",
                params![id, scan, scan_info],
            )
            .unwrap();
    }
}

/// zlib-compress arbitrary bytes.
pub fn zlib(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Four points at the corners of a square of the given half-size.
pub fn square_corners(half: f32) -> Vec<[f32; 4]> {
    vec![
        [-half, -half, 0.0, 0.0],
        [half, -half, 0.0, 0.0],
        [-half, half, 0.0, 0.0],
        [half, half, 0.0, 0.0],
    ]
}

/// Points along the walls of an axis-aligned room centered on the origin.
pub fn room_walls(width: f32, depth: f32, spacing: f32) -> Vec<[f32; 4]> {
    let mut points = Vec::new();
    let nx = (width / spacing) as usize;
    let ny = (depth / spacing) as usize;
    let (hx, hy) = (width / 2.0, depth / 2.0);
    for i in 0..=nx {
        let x = -hx + i as f32 * spacing;
        points.push([x, -hy, 0.3, 0.0]);
        points.push([x, hy, 0.3, 0.0]);
    }
    for j in 0..=ny {
        let y = -hy + j as f32 * spacing;
        points.push([-hx, y, 0.3, 0.0]);
        points.push([hx, y, 0.3, 0.0]);
    }
    points
}

/// Store with a robot driving along X through a 6×4 m room.
pub fn room_store(nodes: usize) -> StoreFixture {
    let fixture = StoreFixture::new();
    for i in 0..nodes {
        // Each node sees the same walls from a different pose, expressed
        // back in its own frame.
        let x = i as f32 * 0.2;
        let pose = Transform3D::from_translation(x, 0.0, 0.0);
        let points: Vec<[f32; 4]> = room_walls(6.0, 4.0, 0.1)
            .into_iter()
            .map(|[px, py, pz, e]| [px - x, py, pz, e])
            .collect();
        fixture.add_node(i as i64 + 1, &pose, &points);
    }
    fixture
}
