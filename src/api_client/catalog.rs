//! Album lookups against the catalog API, read through the response cache.

use crate::api_client::{ApiError, CatalogEndpoints, HttpTransport};
use crate::foundation::cache::{CacheStore, CachedResponse};
use crate::foundation::utils::{fill_artwork_template, image_dimensions};
use std::io;

/// Fetches album metadata and covers for one storefront with one token.
pub struct CatalogClient<'a> {
    transport: &'a dyn HttpTransport,
    cache: &'a dyn CacheStore,
    endpoints: &'a CatalogEndpoints,
    token: String,
    storefront: String,
    clean_request: bool,
}

impl<'a> CatalogClient<'a> {
    pub fn new(
        transport: &'a dyn HttpTransport,
        cache: &'a dyn CacheStore,
        endpoints: &'a CatalogEndpoints,
        token: &str,
        storefront: &str,
    ) -> Self {
        Self {
            transport,
            cache,
            endpoints,
            token: token.to_string(),
            storefront: storefront.to_string(),
            clean_request: false,
        }
    }

    /// Skips cache reads; fresh results are still written back.
    pub fn clean_request(mut self, clean_request: bool) -> Self {
        self.clean_request = clean_request;
        self
    }

    /// Returns the catalog response for an album.
    ///
    /// The cached response is used unless `clean_request` is set. Otherwise a
    /// single GET is made; only a status 200 response is stored in the cache.
    /// A non-200 status is returned as is, the caller decides what it means.
    ///
    /// # Arguments
    ///
    /// * `album_id` - The catalog id of the album.
    ///
    pub async fn fetch_album(&self, album_id: &str) -> Result<CachedResponse, ApiError> {
        if !self.clean_request {
            match self.cache.read_response(album_id) {
                Ok(Some(cached)) => {
                    log::debug!("Using cached response for album {}", album_id);
                    return Ok(cached);
                }
                Ok(None) => {}
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    log::warn!("Ignoring unreadable cache entry for {}: {}", album_id, e);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let url = self.endpoints.album_url(&self.storefront, album_id);
        let reply = self.transport.get_catalog(&url, &self.token).await?;

        let response = CachedResponse {
            status: reply.status,
            json: reply.body,
        };

        if response.is_success() {
            self.cache.write_response(album_id, &response)?;
        }

        Ok(response)
    }

    /// Returns the album cover at the requested size.
    ///
    /// The image is downloaded when it is not cached yet, when
    /// `clean_request` is set, or when the cached image has a different size.
    /// It is stored under the album id.
    pub async fn fetch_cover(
        &self,
        album_id: &str,
        url_template: &str,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, ApiError> {
        if !self.clean_request {
            if let Some(image) = self.cache.read_cover(album_id)? {
                match image_dimensions(&image) {
                    Some(size) if size != (width, height) => {
                        log::debug!(
                            "Cached cover for album {} is {}x{}, downloading {}x{}",
                            album_id,
                            size.0,
                            size.1,
                            width,
                            height
                        );
                    }
                    _ => {
                        log::debug!("Using cached cover for album {}", album_id);
                        return Ok(image);
                    }
                }
            }
        }

        let url = fill_artwork_template(url_template, width, height);
        let image = self.transport.get_bytes(&url).await?;
        self.cache.write_cover(album_id, &image)?;

        Ok(image)
    }
}
