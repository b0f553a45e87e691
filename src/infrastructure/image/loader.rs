//! Async image loading orchestrator.
//!
//! Implements a three-tier lookup: Memory -> Disk -> Network

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{RwLock, Semaphore, mpsc};
use tracing::{debug, error, info, warn};

use crate::domain::entities::{ImageId, ImageSource, LoadedImage};
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort, ImageLoaderPort};

use super::disk_cache::DiskImageCache;
use super::memory_cache::MemoryImageCache;

/// Downloaded images wider than this are resized before caching.
const MAX_DECODED_WIDTH: u32 = 1024;

/// Message sent when an image finishes loading.
#[derive(Debug, Clone)]
pub struct ImageLoadedEvent {
    /// The image ID.
    pub id: ImageId,
    /// The loaded image, or the failure reason.
    pub result: Result<LoadedImage, String>,
}

/// Configuration for the image loader.
#[derive(Debug, Clone)]
pub struct ImageLoaderConfig {
    /// Maximum images in memory cache.
    pub memory_cache_size: usize,
    /// Maximum disk cache size in bytes.
    pub disk_cache_size: u64,
    /// Maximum concurrent downloads.
    pub max_concurrent_downloads: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ImageLoaderConfig {
    fn default() -> Self {
        Self {
            memory_cache_size: 64,
            disk_cache_size: 100 * 1024 * 1024,
            max_concurrent_downloads: 4,
            timeout_secs: 30,
        }
    }
}

/// Orchestrates image loading from memory, disk, and network.
pub struct ImageLoader {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    pending_loads: Arc<RwLock<HashSet<ImageId>>>,
    request_tx: mpsc::UnboundedSender<LoaderCommand>,
    config: ImageLoaderConfig,
    http_client: reqwest::Client,
}

#[derive(Debug)]
enum LoaderCommand {
    Load { id: ImageId, url: String },
    Cancel { id: ImageId },
    CancelAll,
}

impl std::fmt::Debug for ImageLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// State for the background worker loop.
struct WorkerState {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    pending_loads: Arc<RwLock<HashSet<ImageId>>>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    http_client: reqwest::Client,
    semaphore: Arc<Semaphore>,
    request_rx: mpsc::UnboundedReceiver<LoaderCommand>,
}

impl ImageLoader {
    /// Creates a new image loader with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new(
        config: ImageLoaderConfig,
        event_tx: &mpsc::UnboundedSender<ImageLoadedEvent>,
        disk_cache: Arc<DiskImageCache>,
    ) -> CacheResult<Self> {
        let memory_cache = Arc::new(MemoryImageCache::new(config.memory_cache_size));

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CacheError::NetworkError(format!("Failed to create HTTP client: {e}")))?;

        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let semaphore = Arc::new(Semaphore::new(config.max_concurrent_downloads));
        let pending_loads = Arc::new(RwLock::new(HashSet::new()));

        let worker_state = WorkerState {
            memory_cache: memory_cache.clone(),
            disk_cache: disk_cache.clone(),
            pending_loads: pending_loads.clone(),
            event_tx: event_tx.clone(),
            http_client: http_client.clone(),
            semaphore,
            request_rx,
        };

        tokio::spawn(Self::run_worker_loop(worker_state));

        Ok(Self {
            memory_cache,
            disk_cache,
            pending_loads,
            request_tx,
            config,
            http_client,
        })
    }

    /// Worker loop to handle download requests and throttling.
    async fn run_worker_loop(mut state: WorkerState) {
        let mut queue: std::collections::VecDeque<(ImageId, String)> =
            std::collections::VecDeque::new();

        loop {
            tokio::select! {
                cmd = state.request_rx.recv() => {
                    match cmd {
                        Some(LoaderCommand::Load { id, url }) => {
                            if !queue.iter().any(|(qid, _)| *qid == id) {
                                queue.push_front((id, url));
                            }
                        }
                        Some(LoaderCommand::Cancel { id }) => {
                            queue.retain(|(qid, _)| *qid != id);
                            let mut pending = state.pending_loads.write().await;
                            pending.remove(&id);
                        }
                        Some(LoaderCommand::CancelAll) => {
                            queue.clear();
                            let mut pending = state.pending_loads.write().await;
                            pending.clear();
                        }
                        None => break,
                    }
                }
                Ok(permit) = state.semaphore.clone().acquire_owned(), if !queue.is_empty() => {
                    if let Some((id, url)) = queue.pop_front() {
                        let handle = ImageLoaderHandle {
                            memory_cache: state.memory_cache.clone(),
                            disk_cache: state.disk_cache.clone(),
                            pending_loads: state.pending_loads.clone(),
                            event_tx: state.event_tx.clone(),
                            http_client: state.http_client.clone(),
                        };

                        tokio::spawn(async move {
                            {
                                let mut pending = handle.pending_loads.write().await;
                                if pending.contains(&id) {
                                    return;
                                }
                                pending.insert(id.clone());
                            }

                            let result = handle.load_image(&id, &url).await;

                            {
                                let mut pending = handle.pending_loads.write().await;
                                pending.remove(&id);
                            }

                            let event = ImageLoadedEvent {
                                id: id.clone(),
                                result,
                            };
                            let _ = handle.event_tx.send(event);
                            drop(permit);
                        });
                    }
                }
            }
        }
    }

    /// Creates a loader with default configuration.
    ///
    /// # Errors
    /// Returns error if disk cache or HTTP client cannot be created.
    pub async fn with_defaults(
        event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    ) -> CacheResult<Self> {
        let disk_cache = Arc::new(DiskImageCache::default_location().await?);
        Self::new(ImageLoaderConfig::default(), &event_tx, disk_cache)
    }

    /// Checks memory cache synchronously (non-promoting peek).
    pub async fn check_memory_cache(&self, id: &ImageId) -> Option<Arc<image::DynamicImage>> {
        self.memory_cache.peek(id).await
    }

    /// Returns true if an image is currently loading.
    pub async fn is_loading(&self, id: &ImageId) -> bool {
        let pending = self.pending_loads.read().await;
        pending.contains(id)
    }

    /// Returns the number of pending loads.
    pub async fn pending_count(&self) -> usize {
        let pending = self.pending_loads.read().await;
        pending.len()
    }

    /// Cancels all pending loads.
    pub fn cancel_all(&self) {
        if let Err(e) = self.request_tx.send(LoaderCommand::CancelAll) {
            error!("Failed to send cancel all request: {}", e);
        }
    }

    /// Downloads image bytes from a URL.
    async fn download(&self, url: &str) -> CacheResult<Bytes> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(CacheError::NetworkError(format!(
                "HTTP {}: {}",
                response.status(),
                response.status().canonical_reason().unwrap_or("Unknown")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CacheError::NetworkError(format!("Failed to read body: {e}")))?;

        Ok(bytes)
    }

    /// Returns memory cache statistics.
    #[must_use]
    pub fn memory_cache_stats(&self) -> super::memory_cache::CacheStats {
        self.memory_cache.stats()
    }

    /// Clears all caches.
    pub async fn clear_all(&self) {
        self.memory_cache.clear().await;
        if let Err(e) = self.disk_cache.clear().await {
            warn!(error = %e, "Failed to clear disk cache");
        }
        info!("Cleared all image caches");
    }
}

#[async_trait::async_trait]
impl ImageLoaderPort for ImageLoader {
    async fn load(&self, id: &ImageId, url: &str) -> CacheResult<LoadedImage> {
        if let Some(img) = self.memory_cache.get(id).await {
            return Ok(LoadedImage {
                id: id.clone(),
                image: img,
                source: ImageSource::MemoryCache,
            });
        }

        if let Some(img) = self.disk_cache.get(id).await {
            self.memory_cache.put(id.clone(), img.clone()).await;
            return Ok(LoadedImage {
                id: id.clone(),
                image: img,
                source: ImageSource::DiskCache,
            });
        }

        debug!(id = %id, url = %url, "Downloading image from network");

        let bytes = self.download(url).await?;

        let disk_cache = self.disk_cache.clone();
        let id_for_disk = id.clone();
        let bytes_for_disk = bytes.clone();
        tokio::spawn(async move {
            if let Err(e) = disk_cache.put_bytes(&id_for_disk, &bytes_for_disk).await {
                warn!(id = %id_for_disk, error = %e, "Failed to cache to disk");
            }
        });

        let decoded = tokio::task::spawn_blocking(move || decode_and_scale(&bytes))
            .await
            .map_err(|e| CacheError::DecodeError(format!("Decode task panicked: {e}")))?
            .map_err(|e| CacheError::DecodeError(format!("Failed to decode image: {e}")))?;

        let img = Arc::new(decoded);

        self.memory_cache.put(id.clone(), img.clone()).await;

        Ok(LoadedImage {
            id: id.clone(),
            image: img,
            source: ImageSource::Network,
        })
    }

    fn request(&self, id: ImageId, url: String) {
        if let Err(e) = self.request_tx.send(LoaderCommand::Load { id, url }) {
            error!("Failed to send load request: {}", e);
        }
    }

    fn cancel(&self, id: &ImageId) {
        if let Err(e) = self
            .request_tx
            .send(LoaderCommand::Cancel { id: id.clone() })
        {
            error!("Failed to send cancel request: {}", e);
        }
        debug!(id = %id, "Cancelled image load");
    }
}

/// Internal handle for async loading tasks.
struct ImageLoaderHandle {
    memory_cache: Arc<MemoryImageCache>,
    disk_cache: Arc<DiskImageCache>,
    pending_loads: Arc<RwLock<HashSet<ImageId>>>,
    event_tx: mpsc::UnboundedSender<ImageLoadedEvent>,
    http_client: reqwest::Client,
}

impl ImageLoaderHandle {
    async fn load_image(&self, id: &ImageId, url: &str) -> Result<LoadedImage, String> {
        if let Some(img) = self.memory_cache.get(id).await {
            return Ok(LoadedImage {
                id: id.clone(),
                image: img,
                source: ImageSource::MemoryCache,
            });
        }

        if let Some(img) = self.disk_cache.get(id).await {
            self.memory_cache.put(id.clone(), img.clone()).await;
            return Ok(LoadedImage {
                id: id.clone(),
                image: img,
                source: ImageSource::DiskCache,
            });
        }

        debug!(id = %id, "Downloading image: {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("Request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("HTTP {}", response.status()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read body: {e}"))?;

        let bytes_for_decode = bytes.clone();
        let decoded = tokio::task::spawn_blocking(move || decode_and_scale(&bytes_for_decode))
            .await
            .map_err(|e| format!("Decode task panicked: {e}"))?
            .map_err(|e| format!("Decode failed: {e}"))?;

        let img = Arc::new(decoded);

        self.memory_cache.put(id.clone(), img.clone()).await;

        let disk_cache = self.disk_cache.clone();
        let id_clone = id.clone();
        let bytes_for_disk = bytes.clone();
        tokio::spawn(async move {
            if let Err(e) = disk_cache.put_bytes(&id_clone, &bytes_for_disk).await {
                warn!(id = %id_clone, error = %e, "Failed to cache to disk");
            }
        });

        debug!(id = %id, source = "network", "Image loaded successfully");

        Ok(LoadedImage {
            id: id.clone(),
            image: img,
            source: ImageSource::Network,
        })
    }
}

fn decode_and_scale(bytes: &[u8]) -> Result<image::DynamicImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?;

    if img.width() > MAX_DECODED_WIDTH {
        Ok(img.resize(
            MAX_DECODED_WIDTH,
            MAX_DECODED_WIDTH,
            image::imageops::FilterType::Lanczos3,
        ))
    } else {
        Ok(img)
    }
}
