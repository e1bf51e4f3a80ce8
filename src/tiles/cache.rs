use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::loader::ImageFetcher;
use crate::core::config::ImageCacheConfig;
use crate::prelude::{Arc, HashMap, HashSet, VecDeque};
use crate::runtime::{self, AsyncSpawner};
use crate::Result;

/// Host hook asking for one more animation frame.
///
/// The cache calls it while loads are outstanding; the host answers by
/// calling [`ImageCache::handle_frame`] on the next frame.
pub trait FrameScheduler {
    fn request_frame(&self);
}

type Completion<I> = (String, Result<I>);

/// Load queue and slot count shared between the cache and its running loads
#[derive(Debug, Default)]
struct LoadSlots {
    queue: VecDeque<String>,
    in_flight: usize,
    limit: Option<usize>,
}

impl LoadSlots {
    /// Takes a free slot for the next queued path, if there is both
    fn claim(&mut self) -> Option<String> {
        if let Some(limit) = self.limit {
            if self.in_flight >= limit {
                return None;
            }
        }
        let path = self.queue.pop_front()?;
        self.in_flight += 1;
        Some(path)
    }

    /// Frees the slot of a finished load and passes it to the next queued path
    fn hand_off(&mut self) -> Option<String> {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.claim()
    }
}

/// Everything a running load needs to report back and start its successor
struct Loader<F: ImageFetcher> {
    base_url: Arc<str>,
    fetcher: Arc<F>,
    spawner: Arc<dyn AsyncSpawner>,
    slots: Arc<Mutex<LoadSlots>>,
    tx: Sender<Completion<F::Image>>,
}

impl<F: ImageFetcher> Clone for Loader<F> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            fetcher: self.fetcher.clone(),
            spawner: self.spawner.clone(),
            slots: self.slots.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<F: ImageFetcher> Loader<F> {
    fn slots(&self) -> MutexGuard<'_, LoadSlots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts loads for queued paths while slots are free
    fn start_queued(&self) {
        while let Some(path) = self.claim() {
            self.start(path);
        }
    }

    fn claim(&self) -> Option<String> {
        self.slots().claim()
    }

    fn hand_off(&self) -> Option<String> {
        self.slots().hand_off()
    }

    /// Spawns the load of a path that already holds a slot. When it
    /// finishes, the slot goes straight to the next queued path.
    fn start(&self, path: String) {
        let url = self.url_for(&path);
        let loader = self.clone();
        log::debug!("loading {}", url);

        runtime::spawn(self.spawner.as_ref(), async move {
            let result = loader.fetcher.fetch(&url).await;
            // The cache may be gone by now; the result is dropped with it.
            let _ = loader.tx.send((path, result));
            if let Some(next) = loader.hand_off() {
                loader.start(next);
            }
        });
    }
}

/// Deduplicated, concurrency-capped tile image cache.
///
/// Images are keyed by their `zoom/x/y` path and never evicted. Loads run
/// on the spawner and hand their slot to the next queued path as soon as
/// they finish. Their results come back over a channel that is drained once
/// per frame in [`ImageCache::handle_frame`].
pub struct ImageCache<F: ImageFetcher> {
    config: ImageCacheConfig,
    loader: Loader<F>,
    scheduler: Arc<dyn FrameScheduler>,
    images: HashMap<String, F::Image>,
    /// Paths queued, in flight or finished but not yet drained
    pending: HashSet<String>,
    failed: HashSet<String>,
    frame_requested: bool,
    rx: Receiver<Completion<F::Image>>,
}

impl<F: ImageFetcher> ImageCache<F> {
    pub fn new(
        base_url: impl Into<String>,
        config: ImageCacheConfig,
        fetcher: Arc<F>,
        spawner: Arc<dyn AsyncSpawner>,
        scheduler: Arc<dyn FrameScheduler>,
    ) -> Self {
        let (tx, rx) = unbounded();
        let base_url: String = base_url.into();
        let slots = LoadSlots {
            limit: config.concurrent_load_limit,
            ..LoadSlots::default()
        };
        Self {
            config,
            loader: Loader {
                base_url: base_url.into(),
                fetcher,
                spawner,
                slots: Arc::new(Mutex::new(slots)),
                tx,
            },
            scheduler,
            images: HashMap::default(),
            pending: HashSet::default(),
            failed: HashSet::default(),
            frame_requested: false,
            rx,
        }
    }

    /// Cached image for `path`, without side effects
    pub fn get(&self, path: &str) -> Option<F::Image> {
        self.images.get(path).cloned()
    }

    /// Cached image for `path`; on a miss, schedules a load unless one is
    /// already queued or in flight, or the path failed before.
    pub fn request(&mut self, path: &str) -> Option<F::Image> {
        if let Some(image) = self.images.get(path) {
            return Some(image.clone());
        }
        if self.pending.contains(path) || self.failed.contains(path) {
            return None;
        }

        self.pending.insert(path.to_string());
        self.loader.slots().queue.push_back(path.to_string());
        self.loader.start_queued();
        if self.queued() > 0 {
            log::debug!("queued {} behind {} loads", path, self.in_flight());
        }
        self.schedule_frame();
        None
    }

    /// Animation-frame callback.
    ///
    /// Drains finished loads and returns `true` if any image became
    /// available since the previous frame. Keeps requesting frames only
    /// while work is outstanding.
    pub fn handle_frame(&mut self) -> bool {
        self.frame_requested = false;
        let mut loaded = 0;

        while let Ok((path, result)) = self.rx.try_recv() {
            self.pending.remove(&path);
            match result {
                Ok(image) => {
                    log::debug!("loaded {}", path);
                    self.images.insert(path, image);
                    loaded += 1;
                }
                Err(e) => {
                    log::warn!("failed to load {}: {}", path, e);
                    self.failed.insert(path);
                }
            }
        }

        if loaded > 0 {
            log::debug!("{} images loaded this frame", loaded);
        }
        self.schedule_frame();
        loaded > 0
    }

    fn schedule_frame(&mut self) {
        if !self.frame_requested && self.is_busy() {
            self.frame_requested = true;
            self.scheduler.request_frame();
        }
    }

    /// Full URL of a tile path
    pub fn url_for(&self, path: &str) -> String {
        self.loader.url_for(path)
    }

    pub fn base_url(&self) -> &str {
        &self.loader.base_url
    }

    pub fn config(&self) -> &ImageCacheConfig {
        &self.config
    }

    /// Whether loads are queued, in flight or waiting to be drained
    pub fn is_busy(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn in_flight(&self) -> usize {
        self.loader.slots().in_flight
    }

    pub fn queued(&self) -> usize {
        self.loader.slots().queue.len()
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.pending.contains(path)
    }

    pub fn has_failed(&self, path: &str) -> bool {
        self.failed.contains(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.images.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
