use crate::api_client::ApiError;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, ORIGIN};
use reqwest::{Client, StatusCode};
use serde_json::Value;

/// Base URLs the client talks to. Tests point these at nothing and mock the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEndpoints {
    pub api_root: String,
    pub web_player_url: String,
    pub origin: String,
}

impl Default for CatalogEndpoints {
    fn default() -> Self {
        Self {
            api_root: "https://api.music.apple.com/v1/catalog".to_string(),
            web_player_url: "https://music.apple.com".to_string(),
            origin: "https://music.apple.com".to_string(),
        }
    }
}

impl CatalogEndpoints {
    /// Returns the URL of an album in a storefront.
    ///
    /// # Examples
    ///
    /// ```
    /// use ammg::api_client::CatalogEndpoints;
    ///
    /// let endpoints = CatalogEndpoints::default();
    /// assert_eq!(
    ///     endpoints.album_url("us", "1681177202"),
    ///     "https://api.music.apple.com/v1/catalog/us/albums/1681177202"
    /// );
    /// ```
    pub fn album_url(&self, storefront: &str, album_id: &str) -> String {
        format!("{}/{}/albums/{}", self.api_root, storefront, album_id)
    }

    /// Resolves a script path found in the web player page against its URL.
    pub fn script_url(&self, script_path: &str) -> String {
        if script_path.starts_with("http://") || script_path.starts_with("https://") {
            script_path.to_string()
        } else {
            format!(
                "{}/{}",
                self.web_player_url.trim_end_matches('/'),
                script_path.trim_start_matches('/')
            )
        }
    }
}

/// Status and decoded body of a catalog request. The body is only decoded
/// for status 200.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Option<Value>,
}

/// The HTTP requests the tool makes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Authenticated catalog GET.
    async fn get_catalog(&self, url: &str, token: &str) -> Result<HttpReply, ApiError>;
    /// Plain GET returning the body as text.
    async fn get_text(&self, url: &str) -> Result<String, ApiError>;
    /// Plain GET returning the raw body.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError>;
}

/// [`HttpTransport`] backed by a `reqwest` client.
pub struct ReqwestTransport {
    client: Client,
    origin: String,
}

impl ReqwestTransport {
    pub fn new(endpoints: &CatalogEndpoints) -> Self {
        Self {
            client: Client::new(),
            origin: endpoints.origin.clone(),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_catalog(&self, url: &str, token: &str) -> Result<HttpReply, ApiError> {
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ORIGIN, &self.origin)
            .send()
            .await?;

        let status = response.status();
        let body = if status == StatusCode::OK {
            Some(response.json::<Value>().await?)
        } else {
            log::warn!("{} answered with status {}", url, status);
            None
        };

        Ok(HttpReply {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        log::debug!("GET {}", url);
        let mut response = self.client.get(url).send().await?.error_for_status()?;

        let mut data = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }
}
