//! Lazily built, file-backed map cache.
//!
//! [`MapCache::get_or_build`] returns the metadata of the exported map,
//! building it on first use. The build runs again only after the image
//! file disappears or [`MapCache::invalidate`] is called.
//!
//! Concurrent callers are serialized on one mutex: the first caller moves
//! the cache to [`CacheState::Building`] and releases the lock while the
//! passes run; later callers wait on a condvar and share the outcome,
//! success or failure. A request arriving after a failed build retries.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::builder::{BuildConfig, MapBuilder};
use crate::error::{MapError, Result};
use crate::export::{self, MapMetadata};
use crate::store::PoseGraphStore;
use crate::stream::CancelToken;

/// Cache lifecycle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CacheState {
    /// No map known
    Empty,
    /// A build is in progress
    Building,
    /// Map exported with this metadata
    Ready(MapMetadata),
}

/// Lock-protected cache contents.
struct Slot {
    state: CacheState,
    /// Incremented when a build starts
    generation: u64,
    /// Error of the most recent failed build, tagged with its generation
    failure: Option<(u64, Arc<MapError>)>,
}

/// Builds the map from a store on demand and remembers the result.
pub struct MapCache {
    store_path: PathBuf,
    image_path: PathBuf,
    config: BuildConfig,
    cancel: CancelToken,
    slot: Mutex<Slot>,
    done: Condvar,
    builds: AtomicUsize,
}

/// Returns the cache to `Empty` and wakes waiters if a build unwinds.
struct BuildingGuard<'a> {
    cache: &'a MapCache,
    armed: bool,
}

impl Drop for BuildingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.cache.slot.lock().state = CacheState::Empty;
            self.cache.done.notify_all();
        }
    }
}

impl MapCache {
    /// Create an empty cache.
    pub fn new(
        store_path: impl Into<PathBuf>,
        image_path: impl Into<PathBuf>,
        config: BuildConfig,
    ) -> Self {
        Self {
            store_path: store_path.into(),
            image_path: image_path.into(),
            config,
            cancel: CancelToken::new(),
            slot: Mutex::new(Slot {
                state: CacheState::Empty,
                generation: 0,
                failure: None,
            }),
            done: Condvar::new(),
            builds: AtomicUsize::new(0),
        }
    }

    /// Attach a cancel token passed to every build.
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Store path.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Exported image path.
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Current state.
    pub fn state(&self) -> CacheState {
        self.slot.lock().state
    }

    /// Number of builds started by this cache.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    /// Forget the cached metadata so the next request rebuilds.
    ///
    /// Has no effect on a build already in progress.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock();
        if matches!(slot.state, CacheState::Ready(_)) {
            slot.state = CacheState::Empty;
        }
    }

    /// Metadata of the exported map, building it if needed.
    ///
    /// Fails with [`MapError::StoreUnavailable`] when a build is needed and
    /// the store file does not exist. A failed build leaves the cache empty
    /// and its error reaches every caller that was waiting on it as
    /// [`MapError::Shared`].
    pub fn get_or_build(&self) -> Result<MapMetadata> {
        let mut slot = self.slot.lock();
        loop {
            let state = slot.state;
            match state {
                CacheState::Ready(meta) if self.image_path.is_file() => return Ok(meta),
                CacheState::Ready(_) => {
                    log::info!(
                        "Map image {} is gone; rebuilding",
                        self.image_path.display()
                    );
                    slot.state = CacheState::Empty;
                }
                CacheState::Building => {
                    let awaited = slot.generation;
                    while slot.state == CacheState::Building && slot.generation == awaited {
                        self.done.wait(&mut slot);
                    }
                    if let Some((generation, error)) = &slot.failure
                        && *generation == awaited
                    {
                        return Err(MapError::Shared(Arc::clone(error)));
                    }
                }
                CacheState::Empty => {
                    if let Some(meta) = export::load_existing(&self.image_path) {
                        log::info!("Using existing map {}", self.image_path.display());
                        slot.state = CacheState::Ready(meta);
                        return Ok(meta);
                    }
                    break;
                }
            }
        }

        if !self.store_path.is_file() {
            log::warn!(
                "Map unavailable: store not found at {}",
                self.store_path.display()
            );
            return Err(MapError::StoreUnavailable(self.store_path.clone()));
        }

        slot.generation += 1;
        let generation = slot.generation;
        slot.state = CacheState::Building;
        drop(slot);

        let mut guard = BuildingGuard {
            cache: self,
            armed: true,
        };
        let result = self.build_and_export();

        let mut slot = self.slot.lock();
        let result = match result {
            Ok(meta) => {
                slot.state = CacheState::Ready(meta);
                slot.failure = None;
                Ok(meta)
            }
            Err(e) => {
                log::warn!("Map build failed: {}", e);
                let shared = Arc::new(e);
                slot.state = CacheState::Empty;
                slot.failure = Some((generation, Arc::clone(&shared)));
                Err(MapError::Shared(shared))
            }
        };
        guard.armed = false;
        self.done.notify_all();
        result
    }

    fn build_and_export(&self) -> Result<MapMetadata> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        log::info!("Generating map from {}", self.store_path.display());

        let store = PoseGraphStore::open(&self.store_path)?;
        let report = MapBuilder::new(store, self.config.clone())
            .with_cancel(self.cancel.clone())
            .build()?;
        let meta = export::export_map(&report.grid, &self.image_path)?;

        log::info!(
            "Map generated: {}x{}, origin=({}, {})",
            meta.width,
            meta.height,
            meta.origin_x,
            meta.origin_y
        );
        Ok(meta)
    }
}
