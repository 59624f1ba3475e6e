//! MapCache lifecycle against files on disk.

mod common;

use std::fs;
use std::sync::Barrier;

use common::{StoreFixture, room_store};
use naksha::export;
use naksha::{BuildConfig, CacheState, MapCache, MapError};

fn config() -> BuildConfig {
    BuildConfig {
        resolution: 0.1,
        seed: Some(3),
        ..BuildConfig::default()
    }
}

fn cache_for(fixture: &StoreFixture, image_name: &str) -> MapCache {
    MapCache::new(
        fixture.path(),
        fixture.dir().join("instance").join(image_name),
        config(),
    )
}

#[test]
fn test_builds_once_then_reuses() {
    let fixture = room_store(4);
    let cache = cache_for(&fixture, "map_occupancy.png");
    assert_eq!(cache.state(), CacheState::Empty);

    let first = cache.get_or_build().unwrap();
    assert_eq!(cache.build_count(), 1);
    assert_eq!(cache.state(), CacheState::Ready(first));
    assert!(cache.image_path().is_file());
    assert!(export::sidecar_path(cache.image_path()).is_file());

    let second = cache.get_or_build().unwrap();
    assert_eq!(second, first);
    assert_eq!(cache.build_count(), 1);
}

#[test]
fn test_rebuilds_after_image_removed() {
    let fixture = room_store(4);
    let cache = cache_for(&fixture, "map_occupancy.png");

    let first = cache.get_or_build().unwrap();
    fs::remove_file(cache.image_path()).unwrap();

    let second = cache.get_or_build().unwrap();
    assert_eq!(cache.build_count(), 2);
    assert_eq!(second, first);
    assert!(cache.image_path().is_file());
}

#[test]
fn test_invalidate_forces_rebuild() {
    let fixture = room_store(2);
    let cache = cache_for(&fixture, "map_occupancy.png");
    cache.get_or_build().unwrap();

    cache.invalidate();
    // Existing files are adopted again rather than rebuilt.
    cache.get_or_build().unwrap();
    assert_eq!(cache.build_count(), 1);

    cache.invalidate();
    fs::remove_file(export::sidecar_path(cache.image_path())).unwrap();
    cache.get_or_build().unwrap();
    assert_eq!(cache.build_count(), 2);
}

#[test]
fn test_fresh_cache_adopts_existing_map() {
    let fixture = room_store(3);
    let built = cache_for(&fixture, "map_occupancy.png")
        .get_or_build()
        .unwrap();

    let fresh = cache_for(&fixture, "map_occupancy.png");
    assert_eq!(fresh.get_or_build().unwrap(), built);
    assert_eq!(fresh.build_count(), 0);
}

#[test]
fn test_mismatched_sidecar_triggers_rebuild() {
    let fixture = room_store(3);
    let cache = cache_for(&fixture, "map_occupancy.png");
    let built = cache.get_or_build().unwrap();

    let mut wrong = built;
    wrong.width += 1;
    export::write_sidecar(&wrong, cache.image_path()).unwrap();

    let fresh = cache_for(&fixture, "map_occupancy.png");
    assert_eq!(fresh.get_or_build().unwrap(), built);
    assert_eq!(fresh.build_count(), 1);
}

#[test]
fn test_missing_store_reports_unavailable() {
    let fixture = StoreFixture::new();
    let cache = MapCache::new(
        fixture.dir().join("nope.db"),
        fixture.dir().join("map_occupancy.png"),
        config(),
    );

    let err = cache.get_or_build().unwrap_err();
    assert!(matches!(err, MapError::StoreUnavailable(_)));
    assert!(err.to_string().contains("Map unavailable"));
    assert_eq!(cache.state(), CacheState::Empty);
    assert!(!cache.image_path().exists());
}

#[test]
fn test_failed_build_leaves_cache_empty() {
    let fixture = StoreFixture::new();
    let pose = naksha::decode::encode_pose(&naksha::Transform3D::identity());
    fixture.add_raw(1, Some(&pose), Some(b"garbage"), None);
    let cache = cache_for(&fixture, "map_occupancy.png");

    let err = cache.get_or_build().unwrap_err();
    assert!(matches!(err.root(), MapError::CorruptPayload(_)), "{}", err);
    assert_eq!(cache.state(), CacheState::Empty);
    assert!(!cache.image_path().exists());

    // Retried on the next request.
    assert!(cache.get_or_build().is_err());
    assert_eq!(cache.build_count(), 2);
}

#[test]
fn test_concurrent_requests_share_one_build() {
    let fixture = room_store(6);
    let cache = cache_for(&fixture, "map_occupancy.png");

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cache.get_or_build())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.build_count(), 1);
    let first = results[0].as_ref().unwrap();
    for result in &results {
        assert_eq!(result.as_ref().unwrap(), first);
    }
}

#[test]
fn test_pgm_output() {
    let fixture = room_store(2);
    let cache = cache_for(&fixture, "map.pgm");
    let meta = cache.get_or_build().unwrap();

    let bytes = fs::read(cache.image_path()).unwrap();
    assert!(bytes.starts_with(b"P5"));
    let sidecar = fs::read_to_string(export::sidecar_path(cache.image_path())).unwrap();
    assert!(sidecar.contains("image: map.pgm"));
    assert_eq!(
        image::image_dimensions(cache.image_path()).unwrap(),
        (meta.width as u32, meta.height as u32)
    );
}

#[test]
fn test_concurrent_requests_share_one_failure() {
    // A long valid prefix keeps the build running while the others queue up.
    let fixture = room_store(150);
    let pose = naksha::decode::encode_pose(&naksha::Transform3D::identity());
    fixture.add_raw(1_000, Some(&pose), Some(b"garbage"), None);
    let cache = cache_for(&fixture, "map_occupancy.png");
    let start = Barrier::new(8);

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    start.wait();
                    cache.get_or_build()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.build_count(), 1);
    for result in &results {
        let err = result.as_ref().unwrap_err();
        assert!(matches!(err.root(), MapError::CorruptPayload(_)), "{}", err);
        assert!(err.to_string().contains("node 1000"));
    }
    assert_eq!(cache.state(), CacheState::Empty);

    // A request after the failure retries.
    assert!(cache.get_or_build().is_err());
    assert_eq!(cache.build_count(), 2);
}
