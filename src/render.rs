//! Rendering collaborator: turns a store URL into a queryable page.
//!
//! [`Renderer`] is the seam between the run loop and whatever loads pages.
//! [`HttpRenderer`] fetches server-rendered HTML with `reqwest` and parses it
//! with `scraper`; a browser-driven implementation would plug in behind the
//! same trait and do its scrolling and popup dismissal inside `render`.

use crate::error::RenderError;
use crate::page::{HtmlPage, PageAccessor};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Desktop Chrome user agent sent by default.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default bound on a single page load.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads store pages.
///
/// Runs are driven on a single task, so implementations are not required to
/// return `Send` futures.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    type Page: PageAccessor;

    /// Load `url` and return the fully rendered page.
    async fn render(&self, url: &str) -> Result<Self::Page, RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Fetches pages over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Client`] if the TLS backend or client cannot be
    /// initialised. Callers treat this as fatal for the whole run.
    pub fn new(settings: &RenderSettings) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()
            .map_err(RenderError::Client)?;
        info!(timeout = ?settings.timeout, "HTTP renderer ready");
        Ok(Self { client })
    }
}

impl Renderer for HttpRenderer {
    type Page = HtmlPage;

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn render(&self, url: &str) -> Result<HtmlPage, RenderError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| http_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| http_error(url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched store page"
        );
        Ok(HtmlPage::parse(&body))
    }
}

fn http_error(url: &str, source: reqwest::Error) -> RenderError {
    if source.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
        }
    } else {
        RenderError::Http {
            url: url.to_string(),
            source,
        }
    }
}
