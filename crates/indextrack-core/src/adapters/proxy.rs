use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::fetch::{send, FetchConfig, FetchFailure, Fetcher, HistoryRequest};
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::{format_calendar_date, Series};

/// Fetches history through the indextrack proxy (`/api/history/{symbol}`).
#[derive(Clone)]
pub struct ProxyFetcher {
    http_client: Arc<dyn HttpClient>,
    config: FetchConfig,
}

impl Default for ProxyFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::proxy())
    }
}

impl ProxyFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: FetchConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    fn history_url(&self, request: &HistoryRequest) -> String {
        let mut url = format!(
            "{}/api/history/{}",
            self.config.base_url,
            urlencoding::encode(request.symbol.as_str())
        );
        if let Some(start) = request.range_start {
            url.push_str("?period1=");
            url.push_str(&format_calendar_date(start));
        }
        url
    }

    async fn fetch_history(&self, request: HistoryRequest) -> Result<Series, FetchFailure> {
        let url = self.history_url(&request);
        tracing::debug!(symbol = %request.symbol, %url, "requesting proxied history");

        let response = send(self.http_client.as_ref(), self.config.request(url)).await?;

        if !response.is_success() {
            let detail = serde_json::from_str::<ProxyError>(&response.body)
                .map(|payload| payload.error)
                .unwrap_or_else(|_| String::from("no error detail"));
            return Err(FetchFailure::provider_status(
                response.status,
                format!("history proxy returned status {}: {detail}", response.status),
            ));
        }

        Series::from_json(&response.body)
            .map_err(|e| FetchFailure::parse(format!("failed to parse history payload: {e}")))
    }
}

impl Fetcher for ProxyFetcher {
    fn fetch<'a>(
        &'a self,
        request: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, FetchFailure>> + Send + 'a>> {
        Box::pin(self.fetch_history(request))
    }
}

#[derive(Debug, Deserialize)]
struct ProxyError {
    error: String,
}
