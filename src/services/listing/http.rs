//! Listing backend that talks to a jQuery File Tree style HTTP endpoint

use super::{parse_listing, DirectoryFetcher, Listing, ListingError, ListingParams};
use crate::primitives::path_utils::request_dir;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Default request timeout for listing calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches listings with `GET <script>?dir=...&group=...`
///
/// ureq is blocking, so every call runs on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    script: Url,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a fetcher for an absolute endpoint URL
    ///
    /// # Errors
    ///
    /// Returns [`ListingError::Url`] if `script` is not an absolute URL.
    pub fn new(script: &str) -> Result<Self, ListingError> {
        Self::with_base(script, None)
    }

    /// Create a fetcher, resolving a relative `script` against `base`
    ///
    /// Host pages usually configure the script as a site-relative path
    /// (`/apps/chooser/jqueryFileTree.php`); the base supplies the origin.
    pub fn with_base(script: &str, base: Option<&str>) -> Result<Self, ListingError> {
        let script = match base {
            Some(base) => Url::parse(base)
                .and_then(|base| base.join(script))
                .map_err(|e| ListingError::Url(format!("{} (base {}): {}", script, base, e)))?,
            None => Url::parse(script).map_err(|e| ListingError::Url(format!("{}: {}", script, e)))?,
        };
        Ok(Self {
            script,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn script(&self) -> &Url {
        &self.script
    }

    fn fetch_blocking(
        script: &Url,
        timeout: Duration,
        query: &[(&'static str, String)],
    ) -> Result<Listing, ListingError> {
        let mut request = ureq::get(script.as_str()).timeout(timeout);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let response = request.call().map_err(|e| match e {
            ureq::Error::Status(status, response) => ListingError::Http {
                status,
                url: response.get_url().to_string(),
            },
            ureq::Error::Transport(transport) => ListingError::Transport(transport.to_string()),
        })?;

        let body = response.into_string()?;
        parse_listing(&body)
    }
}

#[async_trait]
impl DirectoryFetcher for HttpFetcher {
    async fn list_children(
        &self,
        path: &str,
        params: &ListingParams,
    ) -> Result<Listing, ListingError> {
        let query = params.query_pairs(request_dir(path));
        let script = self.script.clone();
        let timeout = self.timeout;

        tracing::debug!("GET {} dir={:?}", script, request_dir(path));
        tokio::task::spawn_blocking(move || Self::fetch_blocking(&script, timeout, &query))
            .await
            .map_err(|_| ListingError::Cancelled)?
    }
}
