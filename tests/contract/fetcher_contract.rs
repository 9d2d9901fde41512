use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use indextrack_core::{
    FailureKind, FetchConfig, Fetcher, HistoryRequest, HttpClient, HttpError, HttpRequest,
    HttpResponse, ProxyFetcher, Symbol, YahooFetcher,
};
use time::macros::date;

const YAHOO_CHART: &str = r#"{"chart":{"result":[{
    "meta":{"currency":"USD","symbol":"^GSPC","exchangeName":"SNP","instrumentType":"INDEX",
            "regularMarketPrice":5137.08,"regularMarketTime":1709326800},
    "timestamp":[1709130600,1709217000,1709303400],
    "indicators":{"quote":[{"open":[5067.2,5085.4,5098.5],"high":[5077.3,5104.9,5140.3],
                            "low":[5058.3,5061.9,5094.1],"close":[5069.7,5096.2,5137.0],
                            "volume":[3600000000,4700000000,null]}]}
}],"error":null}}"#;

const PROXY_HISTORY: &str = r#"{
    "meta":{"currency":"USD","symbol":"^GSPC","regularMarketPrice":5137.08,
            "regularMarketTime":1709326800},
    "quotes":[
        {"date":"2024-02-28T14:30:00.000Z","open":5067.2,"high":5077.3,"low":5058.3,"close":5069.7,"volume":3600000000},
        {"date":"2024-02-29T14:30:00.000Z","open":5085.4,"high":5104.9,"low":5061.9,"close":5096.2,"volume":4700000000},
        {"date":"2024-03-01T14:30:00.000Z","open":5098.5,"high":5140.3,"low":5094.1,"close":5137.0,"volume":null}
    ]
}"#;

/// Replays one canned outcome and records requested URLs.
struct CannedHttpClient {
    outcome: Result<HttpResponse, HttpError>,
    urls: Mutex<Vec<String>>,
}

impl CannedHttpClient {
    fn new(outcome: Result<HttpResponse, HttpError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            urls: Mutex::new(Vec::new()),
        })
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().expect("url log").clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.urls.lock().expect("url log").push(request.url);
        let outcome = self.outcome.clone();
        Box::pin(async move { outcome })
    }
}

#[derive(Clone, Copy)]
enum FetcherKind {
    Yahoo,
    Proxy,
}

impl FetcherKind {
    const ALL: [Self; 2] = [Self::Yahoo, Self::Proxy];

    fn name(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
            Self::Proxy => "proxy",
        }
    }

    fn success_body(self) -> &'static str {
        match self {
            Self::Yahoo => YAHOO_CHART,
            Self::Proxy => PROXY_HISTORY,
        }
    }

    fn build(self, client: Arc<CannedHttpClient>) -> Box<dyn Fetcher> {
        let config = FetchConfig::with_base_url("http://upstream.test");
        match self {
            Self::Yahoo => Box::new(YahooFetcher::with_http_client(client, config)),
            Self::Proxy => Box::new(ProxyFetcher::with_http_client(client, config)),
        }
    }
}

fn gspc() -> HistoryRequest {
    HistoryRequest::new(Symbol::parse("^GSPC").expect("valid symbol"))
}

#[tokio::test]
async fn every_fetcher_returns_meta_and_bars_on_success() {
    for kind in FetcherKind::ALL {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(kind.success_body())));
        let fetcher = kind.build(client.clone());

        let series = fetcher
            .fetch(gspc())
            .await
            .unwrap_or_else(|error| panic!("{} fetch failed: {error}", kind.name()));

        assert_eq!(series.meta.symbol, "^GSPC", "{}: meta symbol", kind.name());
        assert_eq!(series.meta.currency.as_deref(), Some("USD"));
        assert_eq!(series.len(), 3, "{}: bar count", kind.name());
        assert_eq!(series.quotes[2].volume, 0, "{}: null volume", kind.name());
        assert_eq!(
            series.latest().map(|bar| bar.date.to_string()),
            Some(String::from("2024-03-01T14:30:00.000Z")),
            "{}: latest bar",
            kind.name()
        );
        assert_eq!(client.urls().len(), 1, "{}: one request", kind.name());
    }
}

#[tokio::test]
async fn transport_errors_are_network_failures() {
    for kind in FetcherKind::ALL {
        let client = CannedHttpClient::new(Err(HttpError::connect("connection refused")));
        let fetcher = kind.build(client);

        let failure = fetcher
            .fetch(gspc())
            .await
            .expect_err("transport error must fail the fetch");

        assert_eq!(failure.kind(), FailureKind::Network, "{}", kind.name());
        assert_eq!(failure.status(), None, "{}", kind.name());
    }
}

#[tokio::test]
async fn non_success_statuses_are_provider_failures() {
    for kind in FetcherKind::ALL {
        let client = CannedHttpClient::new(Ok(HttpResponse::new(
            500,
            r#"{"error":"Failed to fetch stock data"}"#,
        )));
        let fetcher = kind.build(client);

        let failure = fetcher
            .fetch(gspc())
            .await
            .expect_err("500 must fail the fetch");

        assert_eq!(failure.kind(), FailureKind::Provider, "{}", kind.name());
        assert_eq!(failure.status(), Some(500), "{}", kind.name());
        assert_eq!(failure.code(), "fetch.provider");
    }
}

#[tokio::test]
async fn undecodable_bodies_are_parse_failures() {
    for kind in FetcherKind::ALL {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json("<html>rate limited</html>")));
        let fetcher = kind.build(client);

        let failure = fetcher
            .fetch(gspc())
            .await
            .expect_err("html body must fail the fetch");

        assert_eq!(failure.kind(), FailureKind::Parse, "{}", kind.name());
    }
}

#[tokio::test]
async fn symbols_are_percent_encoded_in_the_request_path() {
    for kind in FetcherKind::ALL {
        let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(kind.success_body())));
        let fetcher = kind.build(client.clone());

        fetcher.fetch(gspc()).await.expect("fetch succeeds");

        let urls = client.urls();
        assert!(
            urls[0].contains("%5EGSPC"),
            "{}: symbol should be encoded in {}",
            kind.name(),
            urls[0]
        );
    }
}

#[tokio::test]
async fn range_start_reaches_the_upstream() {
    let request = gspc().with_range_start(Some(date!(2024 - 01 - 01)));

    let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(YAHOO_CHART)));
    YahooFetcher::with_http_client(client.clone(), FetchConfig::with_base_url("http://y.test"))
        .fetch(request.clone())
        .await
        .expect("yahoo fetch");
    assert!(client.urls()[0].contains("period1=1704067200&"));

    let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(PROXY_HISTORY)));
    ProxyFetcher::with_http_client(client.clone(), FetchConfig::with_base_url("http://p.test"))
        .fetch(request)
        .await
        .expect("proxy fetch");
    assert_eq!(
        client.urls()[0],
        "http://p.test/api/history/%5EGSPC?period1=2024-01-01"
    );
}
