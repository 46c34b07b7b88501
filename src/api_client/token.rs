//! Bearer token acquisition.
//!
//! The catalog API accepts the developer token embedded in the web player's
//! bundled script. It is scraped once, persisted in the config file and reused
//! until a trial request says it no longer works.

use crate::api_client::{ApiError, CatalogEndpoints, HttpTransport};
use crate::configuration::{load_app_config, save_app_config, AppConfig};
use async_trait::async_trait;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Album requested to check whether a stored token is still accepted.
pub const VALIDATION_ALBUM_ID: &str = "1681177202";
pub const VALIDATION_STOREFRONT: &str = "us";

static SCRIPT_PATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^"]*index.[a-z0-9]*.js"#).expect("valid regex"));

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"eyJhbGciOiJFUzI1NiIsInR5cCI6IkpXVCIsImtpZCI6IldlYlBsYXlLaWQifQ[^"]+"#)
        .expect("valid regex")
});

/// Anything able to hand out a bearer token for the catalog API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Result<String, ApiError>;
}

/// Token provider scraping the web player when no usable token is stored.
pub struct WebTokenProvider<'a> {
    transport: &'a dyn HttpTransport,
    endpoints: &'a CatalogEndpoints,
    config_file: PathBuf,
    check_token: bool,
}

impl<'a> WebTokenProvider<'a> {
    /// # Arguments
    ///
    /// * `transport` - Used for the scrape and the validation request.
    /// * `endpoints` - Where the web player and the API live.
    /// * `config_file` - Where the token is read from and persisted to.
    /// * `check_token` - Whether a stored token is validated before use.
    ///
    pub fn new(
        transport: &'a dyn HttpTransport,
        endpoints: &'a CatalogEndpoints,
        config_file: PathBuf,
        check_token: bool,
    ) -> Self {
        Self {
            transport,
            endpoints,
            config_file,
            check_token,
        }
    }

    async fn is_valid(&self, token: &str) -> Result<bool, ApiError> {
        let url = self
            .endpoints
            .album_url(VALIDATION_STOREFRONT, VALIDATION_ALBUM_ID);
        let reply = self.transport.get_catalog(&url, token).await?;
        Ok(reply.status == 200)
    }

    async fn scrape_token(&self) -> Result<String, ApiError> {
        let page = self.transport.get_text(&self.endpoints.web_player_url).await?;
        let script_path = extract_script_path(&page).ok_or_else(|| {
            ApiError::TokenScrapeFailure("no index script in the web player page".to_string())
        })?;

        let script_url = self.endpoints.script_url(script_path);
        log::debug!("Looking for a token in {}", script_url);
        let script = self.transport.get_text(&script_url).await?;

        extract_token(&script)
            .map(str::to_string)
            .ok_or_else(|| {
                ApiError::TokenScrapeFailure(format!("no token found in {}", script_url))
            })
    }
}

#[async_trait]
impl TokenProvider for WebTokenProvider<'_> {
    async fn bearer_token(&self) -> Result<String, ApiError> {
        let stored = load_app_config(&self.config_file).token;

        if !stored.is_empty() {
            if !self.check_token {
                return Ok(stored);
            }
            if self.is_valid(&stored).await? {
                log::debug!("Stored token is valid");
                return Ok(stored);
            }
            log::info!("Stored token was rejected, fetching a new one");
        }

        let token = self.scrape_token().await?;
        save_app_config(
            &self.config_file,
            &AppConfig {
                token: token.clone(),
            },
        )?;

        Ok(token)
    }
}

/// Finds the path of the web player's main script in its HTML page.
pub fn extract_script_path(page: &str) -> Option<&str> {
    SCRIPT_PATH_PATTERN.find(page).map(|m| m.as_str())
}

/// Finds the first embedded developer token in a script.
pub fn extract_token(script: &str) -> Option<&str> {
    TOKEN_PATTERN.find(script).map(|m| m.as_str())
}
