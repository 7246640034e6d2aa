//! HTTP transport for release listings and archive downloads.
//!
//! Provides a trait-based abstraction over blocking GET requests so that
//! resolvers can be exercised without network access.

use std::path::Path;
use std::time::Duration;

/// Media type requested from the GitHub REST API.
const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// User agent sent with every request; the GitHub API rejects anonymous agents.
const USER_AGENT: &str = concat!("boilerpl8/", env!("CARGO_PKG_VERSION"));

/// Trait for fetching remote resources.
///
/// # Examples
///
/// ```
/// use boilerpl8::fetch::UreqClient;
/// use std::time::Duration;
///
/// let client = UreqClient::new(Duration::from_secs(30));
/// // Use client.get_text("https://api.github.com/...") in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait HttpClient {
    /// GET `url` and return the body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not UTF-8.
    fn get_text(&self, url: &str) -> Result<String, DownloadError>;

    /// GET `url` and stream the body into `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or the file write fails.
    fn download_to_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError>;
}

/// Errors arising from HTTP transfers.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("download failed for {url}: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// I/O error writing the downloaded file.
    #[error("I/O error writing download: {0}")]
    Io(#[from] std::io::Error),
}

/// Blocking HTTP client backed by `ureq`.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: ureq::Agent,
    timeout: Option<Duration>,
}

impl UreqClient {
    /// Creates a client whose requests time out after `timeout`. A zero
    /// duration disables the timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let timeout = effective_timeout(timeout);
        let config = ureq::Agent::config_builder().timeout_global(timeout).build();
        Self {
            agent: ureq::Agent::new_with_config(config),
            timeout,
        }
    }

    /// The global per-request timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

fn effective_timeout(timeout: Duration) -> Option<Duration> {
    (!timeout.is_zero()).then_some(timeout)
}

impl HttpClient for UreqClient {
    fn get_text(&self, url: &str) -> Result<String, DownloadError> {
        log::debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        response
            .into_body()
            .read_to_string()
            .map_err(|e| DownloadError::Http {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    fn download_to_file(&self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        log::debug!("GET {url} -> {}", dest.display());
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let mut file = std::fs::File::create(dest)?;
        std::io::copy(&mut response.into_body().as_reader(), &mut file)?;
        Ok(())
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(404) => DownloadError::NotFound {
            url: url.to_owned(),
        },
        other => DownloadError::Http {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
