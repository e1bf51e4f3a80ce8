use async_trait::async_trait;

use crate::Result;

/// Fetches and decodes one tile image.
///
/// Implementations must be shareable across tasks: the cache clones an
/// `Arc` of the fetcher into every load it starts.
#[async_trait]
pub trait ImageFetcher: Send + Sync + 'static {
    type Image: Clone + Send + 'static;

    async fn fetch(&self, url: &str) -> Result<Self::Image>;
}

#[cfg(feature = "http")]
pub use http::{decode_tile, HttpImageFetcher};

#[cfg(feature = "http")]
mod http {
    use super::*;
    use crate::rendering::TileImage;
    use crate::MapError;
    use image::RgbaImage;
    use once_cell::sync::Lazy;
    use std::sync::Arc;
    use std::time::Duration;

    /// Shared async HTTP client for tile fetching
    pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
        reqwest::Client::builder()
            .user_agent(concat!("tileview/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(16)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("falling back to default http client: {}", e);
                reqwest::Client::new()
            })
    });

    impl TileImage for Arc<RgbaImage> {
        fn width(&self) -> u32 {
            RgbaImage::width(self)
        }

        fn height(&self) -> u32 {
            RgbaImage::height(self)
        }
    }

    /// Decodes PNG or JPEG bytes into an RGBA buffer
    pub fn decode_tile(bytes: &[u8]) -> Result<Arc<RgbaImage>> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| MapError::Decode(e.to_string()))?;
        Ok(Arc::new(decoded.to_rgba8()))
    }

    /// Downloads tiles over HTTP and decodes them off the frame loop
    #[derive(Debug, Clone)]
    pub struct HttpImageFetcher {
        timeout: Duration,
    }

    impl HttpImageFetcher {
        pub fn new() -> Self {
            Self {
                timeout: Duration::from_secs(10),
            }
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }
    }

    impl Default for HttpImageFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ImageFetcher for HttpImageFetcher {
        type Image = Arc<RgbaImage>;

        async fn fetch(&self, url: &str) -> Result<Self::Image> {
            let response = HTTP_CLIENT.get(url).timeout(self.timeout).send().await?;

            if !response.status().is_success() {
                return Err(MapError::Http(format!(
                    "HTTP {} for {}",
                    response.status(),
                    url
                )));
            }

            let bytes = response.bytes().await?;
            if bytes.is_empty() {
                return Err(MapError::Load(format!("empty response body for {}", url)));
            }
            log::debug!("downloaded {} ({} bytes)", url, bytes.len());
            decode_tile(&bytes)
        }
    }

}
