//! Image resolution for export.
//!
//! Exports need the pixels (raster) or at least the natural size (layout) of
//! every image the tree references. An [`ImageSource`] supplies them; the
//! HTTP implementation keeps decoded images in a shared cache so repeated
//! exports of the same signature download each URL once.

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

use crate::error::SignetError;
use crate::form::URL_SCHEMES;
use crate::render::RenderTree;

/// Largest response body accepted for one image.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
/// Largest decoded image side, in pixels.
pub const MAX_IMAGE_SIDE: u32 = 4096;
/// Decoded images kept by [`HttpImageSource`] before the least recently
/// used one is dropped.
pub const MAX_CACHED_IMAGES: usize = 256;

/// Somewhere decoded images can be fetched from.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, SignetError>;

    /// Drop cached entries not used within `max_idle`. Returns how many
    /// were removed.
    async fn evict_idle(&self, _max_idle: Duration) -> usize {
        0
    }
}

/// Decoded images keyed by URL.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
    images: HashMap<String, DynamicImage>,
}

impl ImageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: impl Into<String>, image: DynamicImage) {
        self.images.insert(url.into(), image);
    }

    pub fn get(&self, url: &str) -> Option<&DynamicImage> {
        self.images.get(url)
    }

    /// Natural `(width, height)` of a resolved image.
    pub fn dimensions(&self, url: &str) -> Option<(u32, u32)> {
        self.images.get(url).map(|i| i.dimensions())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Fetch every distinct image URL in `tree`. Failures are logged and left
/// out of the set, so the sinks draw a placeholder instead.
pub async fn resolve_images(tree: &RenderTree, source: &dyn ImageSource) -> ImageSet {
    let mut set = ImageSet::new();
    let mut seen = Vec::new();

    for image in tree.images() {
        if seen.contains(&image.src) {
            continue;
        }
        seen.push(image.src.clone());

        match source.fetch(&image.src).await {
            Ok(decoded) => set.insert(image.src.clone(), decoded),
            Err(e) => warn!(url = %image.src, error = %e, "image unavailable, using placeholder"),
        }
    }

    debug!(requested = seen.len(), resolved = set.len(), "resolved images");
    set
}

/// A cached download.
#[derive(Debug, Clone)]
pub struct CachedImage {
    pub image: DynamicImage,
    pub last_accessed: Instant,
}

impl CachedImage {
    fn new(image: DynamicImage) -> Self {
        Self {
            image,
            last_accessed: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }
}

/// Downloads images over HTTP(S) and caches the decoded result.
#[derive(Debug, Clone)]
pub struct HttpImageSource {
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CachedImage>>>,
}

impl HttpImageSource {
    pub fn new() -> Result<Self, SignetError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("signet/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SignetError::Image(format!("HTTP client error: {}", e)))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn cached(&self) -> usize {
        self.cache.read().await.len()
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, SignetError> {
        {
            let mut cache = self.cache.write().await;
            if let Some(entry) = cache.get_mut(url) {
                entry.touch();
                return Ok(entry.image.clone());
            }
        }

        let parsed = Url::parse(url)
            .map_err(|e| SignetError::Image(format!("Invalid image URL {}: {}", url, e)))?;
        if !URL_SCHEMES.contains(&parsed.scheme()) {
            return Err(SignetError::Image(format!(
                "Refusing to fetch {}: unsupported scheme '{}'",
                url,
                parsed.scheme()
            )));
        }

        let mut response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SignetError::Image(format!("Failed to download {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(SignetError::Image(format!(
                "Failed to download {}: HTTP {}",
                url,
                response.status()
            )));
        }
        if response
            .content_length()
            .is_some_and(|len| len > MAX_IMAGE_BYTES as u64)
        {
            return Err(too_large(url));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| SignetError::Image(format!("Failed to read image data: {}", e)))?
        {
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(too_large(url));
            }
            bytes.extend_from_slice(&chunk);
        }

        let image = decode_limited(&bytes)
            .map_err(|e| SignetError::Image(format!("Failed to decode {}: {}", url, e)))?;

        insert_bounded(
            &mut *self.cache.write().await,
            url,
            image.clone(),
            MAX_CACHED_IMAGES,
        );

        Ok(image)
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut cache = self.cache.write().await;
        let before = cache.len();
        cache.retain(|_, v| now.duration_since(v.last_accessed) < max_idle);
        before - cache.len()
    }
}

fn too_large(url: &str) -> SignetError {
    SignetError::Image(format!("Image {} exceeds {} bytes", url, MAX_IMAGE_BYTES))
}

/// Decode with dimension and allocation limits.
fn decode_limited(bytes: &[u8]) -> Result<DynamicImage, image::ImageError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_SIDE);
    limits.max_image_height = Some(MAX_IMAGE_SIDE);
    limits.max_alloc = Some(256 * 1024 * 1024);

    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.limits(limits);
    reader.decode()
}

/// Insert into the cache, dropping the least recently used entry when full.
fn insert_bounded(
    cache: &mut HashMap<String, CachedImage>,
    url: &str,
    image: DynamicImage,
    capacity: usize,
) {
    if cache.len() >= capacity && !cache.contains_key(url) {
        let oldest = cache
            .iter()
            .min_by_key(|(_, entry)| entry.last_accessed)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            cache.remove(&key);
        }
    }
    cache.insert(url.to_string(), CachedImage::new(image));
}

/// In-memory source for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticImageSource {
    images: HashMap<String, DynamicImage>,
}

impl StaticImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, image: DynamicImage) -> Self {
        self.images.insert(url.into(), image);
        self
    }
}

#[async_trait]
impl ImageSource for StaticImageSource {
    async fn fetch(&self, url: &str) -> Result<DynamicImage, SignetError> {
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| SignetError::Image(format!("no image for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Asset, SignatureModel};
    use crate::render::render;
    use image::RgbaImage;
    use url::Url;

    fn asset(url: &str) -> Asset {
        Asset {
            url: Url::parse(url).unwrap(),
            alt_text: "alt".into(),
        }
    }

    #[tokio::test]
    async fn test_resolve_skips_failures() {
        let mut model = SignatureModel::named("Ada");
        model.image = Some(asset("https://x.test/photo.png"));
        model.icons = vec![asset("https://x.test/gone.png")];
        let tree = render(&model);

        let source = StaticImageSource::new().with(
            "https://x.test/photo.png",
            DynamicImage::ImageRgba8(RgbaImage::new(40, 20)),
        );
        let set = resolve_images(&tree, &source).await;

        assert_eq!(set.len(), 1);
        assert_eq!(set.dimensions("https://x.test/photo.png"), Some((40, 20)));
        assert!(set.get("https://x.test/gone.png").is_none());
    }

    #[tokio::test]
    async fn test_resolve_deduplicates_urls() {
        let mut model = SignatureModel::named("Ada");
        model.icons = vec![asset("https://x.test/i.png"), asset("https://x.test/i.png")];
        let tree = render(&model);

        let source = StaticImageSource::new().with(
            "https://x.test/i.png",
            DynamicImage::ImageRgba8(RgbaImage::new(25, 25)),
        );
        assert_eq!(resolve_images(&tree, &source).await.len(), 1);
    }

    #[tokio::test]
    async fn test_http_source_evicts_idle_entries() {
        let source = HttpImageSource::new().unwrap();
        source.cache.write().await.insert(
            "https://x.test/a.png".into(),
            CachedImage::new(DynamicImage::ImageRgba8(RgbaImage::new(1, 1))),
        );
        assert_eq!(source.evict_idle(Duration::from_secs(60)).await, 0);
        assert_eq!(source.evict_idle(Duration::ZERO).await, 1);
        assert_eq!(source.cached().await, 0);
    }

    #[tokio::test]
    async fn test_http_source_serves_cached() {
        let source = HttpImageSource::new().unwrap();
        source.cache.write().await.insert(
            "https://x.test/a.png".into(),
            CachedImage::new(DynamicImage::ImageRgba8(RgbaImage::new(3, 2))),
        );
        let image = source.fetch("https://x.test/a.png").await.unwrap();
        assert_eq!(image.dimensions(), (3, 2));
    }

    #[tokio::test]
    async fn test_http_source_refuses_other_schemes() {
        let source = HttpImageSource::new().unwrap();
        for url in ["ftp://x.test/a.png", "file:///etc/passwd"] {
            let err = source.fetch(url).await.unwrap_err();
            assert!(err.to_string().contains("unsupported scheme"), "{err}");
        }
    }

    #[test]
    fn test_decode_rejects_oversized_dimensions() {
        let mut png = Vec::new();
        DynamicImage::ImageLuma8(image::GrayImage::new(MAX_IMAGE_SIDE + 1, 1))
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        assert!(decode_limited(&png).is_err());

        let mut small = Vec::new();
        DynamicImage::ImageLuma8(image::GrayImage::new(4, 4))
            .write_to(&mut Cursor::new(&mut small), image::ImageFormat::Png)
            .unwrap();
        assert_eq!(decode_limited(&small).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn test_cache_drops_least_recently_used() {
        let mut cache = HashMap::new();
        let pixel = || DynamicImage::ImageRgba8(RgbaImage::new(1, 1));
        insert_bounded(&mut cache, "https://x.test/a.png", pixel(), 2);
        insert_bounded(&mut cache, "https://x.test/b.png", pixel(), 2);
        if let Some(entry) = cache.get_mut("https://x.test/a.png") {
            entry.last_accessed += Duration::from_secs(1);
        }
        insert_bounded(&mut cache, "https://x.test/c.png", pixel(), 2);

        assert_eq!(cache.len(), 2);
        assert!(cache.contains_key("https://x.test/a.png"));
        assert!(!cache.contains_key("https://x.test/b.png"));
    }
}
