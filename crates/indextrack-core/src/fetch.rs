//! Fetch boundary: the contract between the view layer and whatever
//! retrieves a price history.
//!
//! | Implementation | Upstream |
//! |----------------|----------|
//! | [`YahooFetcher`](crate::adapters::YahooFetcher) | Yahoo Finance chart API |
//! | [`ProxyFetcher`](crate::adapters::ProxyFetcher) | indextrack history proxy |
//!
//! Every failure is classified into a [`FailureKind`]. Consumers show all
//! kinds the same way ("no data, retry"); the kind is kept for logging.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::{Series, Symbol};

/// Browser-like agent; the chart API rejects unknown clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub const PROXY_BASE_URL: &str = "http://localhost:3001";

/// Failure classification at the fetch boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No response arrived (connect error, timeout, broken body).
    Network,
    /// The upstream answered with a non-2xx status or reported an error.
    Provider,
    /// The payload could not be decoded into a series.
    Parse,
}

impl FailureKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Provider => "provider",
            Self::Parse => "parse",
        }
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured fetch failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    kind: FailureKind,
    message: String,
    status: Option<u16>,
}

impl FetchFailure {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Network,
            message: message.into(),
            status: None,
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Provider,
            message: message.into(),
            status: None,
        }
    }

    pub fn provider_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Provider,
            message: message.into(),
            status: Some(status),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Parse,
            message: message.into(),
            status: None,
        }
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Upstream HTTP status, when one was received.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FailureKind::Network => "fetch.network",
            FailureKind::Provider => "fetch.provider",
            FailureKind::Parse => "fetch.parse",
        }
    }
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchFailure {}

impl From<HttpError> for FetchFailure {
    fn from(error: HttpError) -> Self {
        Self::network(error.message())
    }
}

/// What to fetch: a symbol and an optional first day of the range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub range_start: Option<Date>,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            range_start: None,
        }
    }

    pub fn with_range_start(mut self, range_start: Option<Date>) -> Self {
        self.range_start = range_start;
        self
    }
}

/// Transport settings shared by the fetcher implementations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn yahoo() -> Self {
        Self::with_base_url(YAHOO_BASE_URL)
    }

    pub fn proxy() -> Self {
        Self::with_base_url(PROXY_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            timeout_ms: 10_000,
            user_agent: String::from(DEFAULT_USER_AGENT),
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub(crate) fn request(&self, url: impl Into<String>) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("user-agent", self.user_agent.as_str())
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::yahoo()
    }
}

/// Retrieves a raw price history for one symbol.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, FetchFailure>> + Send + 'a>>;
}

/// Run `request` and hand back any response, mapping transport errors to
/// [`FailureKind::Network`]. Status handling is left to the caller.
pub(crate) async fn send(
    client: &dyn HttpClient,
    request: HttpRequest,
) -> Result<HttpResponse, FetchFailure> {
    let url = request.url.clone();
    client.execute(request).await.map_err(|error| {
        tracing::warn!(%url, kind = ?error.kind(), "transport error: {}", error.message());
        FetchFailure::from(error)
    })
}
