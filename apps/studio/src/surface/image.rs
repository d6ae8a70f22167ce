//! Image slots referenced by surface nodes and the loader that fills them.
//!
//! A node holds an `ImageHandle`; the slot behind it starts `Pending` and settles
//! exactly once into `Loaded` or `Failed`. Loading starts when the renderer first
//! references a source, the same way a browser starts fetching on mount.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use image::RgbaImage;
use parking_lot::Mutex;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Keeps re-renders from refetching the same photo; cleared wholesale when full.
const MAX_CACHED_IMAGES: usize = 16;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("invalid data URL")]
    InvalidDataUrl,

    #[error("unsupported image source '{0}'")]
    UnsupportedSource(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image request returned status {0}")]
    Status(u16),

    #[error("image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image decode task failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone)]
pub enum ImageState {
    Pending,
    Loaded(Arc<RgbaImage>),
    Failed(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Handles
// ────────────────────────────────────────────────────────────────────────────

/// Read side of an image slot. Cheap to clone; every clone observes the same slot.
#[derive(Clone)]
pub struct ImageHandle {
    src: Arc<str>,
    state: watch::Receiver<ImageState>,
}

/// Write side of a pending slot. Dropping it without completing fails the slot.
pub struct ImageCompleter {
    tx: watch::Sender<ImageState>,
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let preview: String = self.src.chars().take(48).collect();
        f.debug_struct("ImageHandle").field("src", &preview).finish()
    }
}

impl ImageHandle {
    pub fn pending(src: &str) -> (ImageHandle, ImageCompleter) {
        let (tx, rx) = watch::channel(ImageState::Pending);
        (
            ImageHandle {
                src: Arc::from(src),
                state: rx,
            },
            ImageCompleter { tx },
        )
    }

    pub fn loaded(src: &str, image: RgbaImage) -> ImageHandle {
        Self::settled_with(src, ImageState::Loaded(Arc::new(image)))
    }

    pub fn failed(src: &str, reason: impl Into<String>) -> ImageHandle {
        Self::settled_with(src, ImageState::Failed(reason.into()))
    }

    fn settled_with(src: &str, state: ImageState) -> ImageHandle {
        let (_tx, rx) = watch::channel(state);
        ImageHandle {
            src: Arc::from(src),
            state: rx,
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn current(&self) -> ImageState {
        self.state.borrow().clone()
    }

    pub fn is_complete(&self) -> bool {
        !matches!(*self.state.borrow(), ImageState::Pending)
    }

    /// Resolves once the slot leaves `Pending`. Never errors: a slot whose writer
    /// went away without completing reports `Failed`.
    pub async fn settled(&self) -> ImageState {
        let mut rx = self.state.clone();
        let state = match rx
            .wait_for(|state| !matches!(state, ImageState::Pending))
            .await
        {
            Ok(state) => state.clone(),
            Err(_) => ImageState::Failed("image loader went away before completing".to_string()),
        };
        state
    }
}

impl ImageCompleter {
    pub fn complete(self, image: RgbaImage) {
        self.tx.send_replace(ImageState::Loaded(Arc::new(image)));
    }

    pub fn fail(self, reason: impl Into<String>) {
        self.tx.send_replace(ImageState::Failed(reason.into()));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fetching
// ────────────────────────────────────────────────────────────────────────────

/// Retrieves the encoded bytes behind an image source.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, src: &str) -> Result<Bytes, ImageError>;
}

/// Decodes `data:` URLs in-process and fetches http(s) sources over the network.
#[derive(Clone, Default)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, src: &str) -> Result<Bytes, ImageError> {
        if src.starts_with("data:") {
            return decode_data_url(src);
        }
        if !(src.starts_with("http://") || src.starts_with("https://")) {
            let shown: String = src.chars().take(32).collect();
            return Err(ImageError::UnsupportedSource(shown));
        }

        let response = self.client.get(src).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::Status(status.as_u16()));
        }
        Ok(response.bytes().await?)
    }
}

/// Extracts the payload of a base64 `data:` URL.
pub fn decode_data_url(src: &str) -> Result<Bytes, ImageError> {
    let rest = src.strip_prefix("data:").ok_or(ImageError::InvalidDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(ImageError::InvalidDataUrl)?;
    if !meta.ends_with(";base64") {
        return Err(ImageError::InvalidDataUrl);
    }
    STANDARD
        .decode(payload.trim())
        .map(Bytes::from)
        .map_err(|_| ImageError::InvalidDataUrl)
}

/// Encodes bytes as a base64 `data:` URL with the given MIME type.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

// ────────────────────────────────────────────────────────────────────────────
// Loader
// ────────────────────────────────────────────────────────────────────────────

/// Starts image loads and hands out handles to their slots, one slot per source.
#[derive(Clone)]
pub struct ImageLoader {
    fetcher: Arc<dyn ImageFetcher>,
    cache: Arc<Mutex<HashMap<String, ImageHandle>>>,
}

impl ImageLoader {
    pub fn new(fetcher: Arc<dyn ImageFetcher>) -> Self {
        Self {
            fetcher,
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the slot for `src`, spawning the fetch + decode on first use.
    /// Must be called from within a Tokio runtime.
    pub fn load(&self, src: &str) -> ImageHandle {
        let mut cache = self.cache.lock();
        if let Some(handle) = cache.get(src) {
            return handle.clone();
        }
        if cache.len() >= MAX_CACHED_IMAGES {
            debug!("image cache full, clearing");
            cache.clear();
        }

        let (handle, completer) = ImageHandle::pending(src);
        cache.insert(src.to_string(), handle.clone());
        drop(cache);

        let fetcher = Arc::clone(&self.fetcher);
        let src = src.to_string();
        tokio::spawn(async move {
            match fetch_and_decode(fetcher.as_ref(), &src).await {
                Ok(image) => {
                    debug!(width = image.width(), height = image.height(), "image loaded");
                    completer.complete(image);
                }
                Err(e) => {
                    let shown: String = src.chars().take(64).collect();
                    warn!(src = %shown, error = %e, "image failed to load");
                    completer.fail(e.to_string());
                }
            }
        });

        handle
    }
}

async fn fetch_and_decode(fetcher: &dyn ImageFetcher, src: &str) -> Result<RgbaImage, ImageError> {
    let bytes = fetcher.fetch(src).await?;
    // Decoding is CPU-bound; keep it off the async workers.
    tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|img| img.to_rgba8()))
        .await
        .map_err(|e| ImageError::Join(e.to_string()))?
        .map_err(ImageError::Decode)
}

/// Decodes `data:` URLs and fails every remote source, for tests that must
/// not touch the network.
#[cfg(test)]
pub(crate) struct InlineOnlyFetcher;

#[cfg(test)]
#[async_trait]
impl ImageFetcher for InlineOnlyFetcher {
    async fn fetch(&self, src: &str) -> Result<Bytes, ImageError> {
        if src.starts_with("data:") {
            decode_data_url(src)
        } else {
            Err(ImageError::Status(404))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([10, 20, 30, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    struct FailingFetcher;

    #[async_trait]
    impl ImageFetcher for FailingFetcher {
        async fn fetch(&self, _src: &str) -> Result<Bytes, ImageError> {
            Err(ImageError::Status(404))
        }
    }

    #[test]
    fn test_data_url_round_trip() {
        let bytes = png_bytes();
        let url = encode_data_url("image/png", &bytes);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap().as_ref(), bytes.as_slice());
    }

    #[test]
    fn test_data_url_without_base64_is_rejected() {
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(ImageError::InvalidDataUrl)
        ));
    }

    #[tokio::test]
    async fn test_loader_decodes_inline_image() {
        let loader = ImageLoader::new(Arc::new(HttpImageFetcher::default()));
        let handle = loader.load(&encode_data_url("image/png", &png_bytes()));
        match handle.settled().await {
            ImageState::Loaded(img) => assert_eq!(img.dimensions(), (2, 2)),
            other => panic!("expected loaded image, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_loader_reports_failure_without_erroring() {
        let loader = ImageLoader::new(Arc::new(FailingFetcher));
        let handle = loader.load("https://example.invalid/photo.png");
        assert!(matches!(handle.settled().await, ImageState::Failed(_)));
        assert!(handle.is_complete());
    }

    #[tokio::test]
    async fn test_loader_reuses_slot_for_same_source() {
        let loader = ImageLoader::new(Arc::new(FailingFetcher));
        let a = loader.load("https://example.invalid/a.png");
        let b = loader.load("https://example.invalid/a.png");
        a.settled().await;
        assert!(b.is_complete());
    }

    #[tokio::test]
    async fn test_dropped_completer_fails_slot() {
        let (handle, completer) = ImageHandle::pending("x");
        drop(completer);
        assert!(matches!(handle.settled().await, ImageState::Failed(_)));
    }

    #[tokio::test]
    async fn test_settled_handle_keeps_its_state_after_writer_is_gone() {
        let handle = ImageHandle::loaded("x", RgbaImage::new(3, 1));
        match handle.settled().await {
            ImageState::Loaded(img) => assert_eq!(img.dimensions(), (3, 1)),
            other => panic!("expected loaded image, got {other:?}"),
        }
        let failed = ImageHandle::failed("y", "404");
        assert!(matches!(failed.settled().await, ImageState::Failed(r) if r == "404"));
    }

    #[tokio::test]
    async fn test_pending_slot_resolves_when_completed() {
        let (handle, completer) = ImageHandle::pending("x");
        assert!(!handle.is_complete());
        let waiter = tokio::spawn({
            let handle = handle.clone();
            async move { handle.settled().await }
        });
        completer.complete(RgbaImage::new(1, 1));
        assert!(matches!(waiter.await.unwrap(), ImageState::Loaded(_)));
    }
}
