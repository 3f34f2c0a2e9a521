use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::ParseError;

/// Why a single endpoint attempt failed
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Malformed(#[from] ParseError),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

/// One failed attempt against one endpoint
#[derive(Debug)]
pub struct EndpointFailure {
    pub endpoint: String,
    pub error: AttemptError,
}

/// Explorer fetch errors, reported once every endpoint has been tried
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(
        "all {count} explorer endpoints failed for `{path}`: {summary}",
        count = .failures.len(),
        summary = summarize(.failures)
    )]
    AllEndpointsExhausted {
        path: String,
        failures: Vec<EndpointFailure>,
    },

    #[error(
        "malformed response for `{path}` from every endpoint: {summary}",
        summary = summarize(.failures)
    )]
    MalformedResponse {
        path: String,
        failures: Vec<EndpointFailure>,
    },

    #[error("invalid explorer endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    /// Number of endpoint attempts behind this error.
    pub fn attempts(&self) -> usize {
        match self {
            FetchError::AllEndpointsExhausted { failures, .. }
            | FetchError::MalformedResponse { failures, .. } => failures.len(),
            _ => 0,
        }
    }
}

fn summarize(failures: &[EndpointFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.endpoint, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Ordered list of explorer base URLs with fetch-with-fallback.
///
/// Every fetch starts at the primary endpoint and walks the mirrors in order
/// until one returns a body that parses. The timeout applies to each attempt,
/// so one fetch can take up to `timeout * endpoints` in the worst case.
#[derive(Debug, Clone)]
pub struct EndpointResolver {
    client: Client,
    endpoints: Vec<Url>,
    timeout: Duration,
}

impl EndpointResolver {
    /// Creates a resolver over `endpoints`, first one primary.
    pub fn new<S: AsRef<str>>(endpoints: &[S], timeout: Duration) -> Result<Self, FetchError> {
        if endpoints.is_empty() {
            return Err(FetchError::InvalidEndpoint(
                "no explorer endpoints configured".to_string(),
            ));
        }

        let endpoints = endpoints
            .iter()
            .map(|raw| normalize_endpoint(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mempool-ticker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            endpoints,
            timeout,
        })
    }

    /// Creates a resolver from a comma-separated endpoint list.
    pub fn from_list(list: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoints: Vec<&str> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        Self::new(&endpoints, timeout)
    }

    /// Configured base URLs, primary first.
    pub fn endpoints(&self) -> &[Url] {
        &self.endpoints
    }

    /// Per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches `path` relative to each endpoint in turn and parses the body.
    ///
    /// A transport error, a non-success status or a body `parse` rejects all
    /// count as a failed attempt and move on to the next mirror.
    pub async fn fetch<T, F>(&self, path: &str, parse: F) -> Result<T, FetchError>
    where
        F: Fn(&str) -> Result<T, ParseError>,
    {
        let mut failures = Vec::new();

        for endpoint in &self.endpoints {
            match self.attempt(endpoint, path, &parse).await {
                Ok(value) => {
                    if !failures.is_empty() {
                        info!(
                            "Fetched `{}` from mirror {} after {} failed attempt(s)",
                            path,
                            endpoint,
                            failures.len()
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    warn!("Explorer {} failed for `{}`: {}", endpoint, path, error);
                    failures.push(EndpointFailure {
                        endpoint: endpoint.to_string(),
                        error,
                    });
                }
            }
        }

        let path = path.to_string();
        if failures
            .iter()
            .all(|f| matches!(f.error, AttemptError::Malformed(_)))
        {
            Err(FetchError::MalformedResponse { path, failures })
        } else {
            Err(FetchError::AllEndpointsExhausted { path, failures })
        }
    }

    async fn attempt<T, F>(&self, endpoint: &Url, path: &str, parse: &F) -> Result<T, AttemptError>
    where
        F: Fn(&str) -> Result<T, ParseError>,
    {
        let url = endpoint
            .join(path)
            .map_err(|e| AttemptError::InvalidUrl(format!("{endpoint}{path}: {e}")))?;

        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Status(status));
        }

        let body = response.text().await?;
        Ok(parse(&body)?)
    }
}

fn normalize_endpoint(raw: &str) -> Result<Url, FetchError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let url = Url::parse(&base).map_err(|e| FetchError::InvalidEndpoint(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(FetchError::InvalidEndpoint(format!(
            "{raw}: unsupported scheme `{scheme}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::explorer::models::parse_tip_height;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_endpoints_are_normalized() {
        let resolver =
            EndpointResolver::from_list(" https://mempool.space/api ,https://mirror.example/api/", TIMEOUT)
                .unwrap();
        let endpoints: Vec<&str> = resolver.endpoints().iter().map(Url::as_str).collect();
        assert_eq!(
            endpoints,
            vec!["https://mempool.space/api/", "https://mirror.example/api/"]
        );
    }

    #[test]
    fn test_rejects_bad_endpoints() {
        assert!(matches!(
            EndpointResolver::from_list("", TIMEOUT),
            Err(FetchError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            EndpointResolver::from_list("not a url", TIMEOUT),
            Err(FetchError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            EndpointResolver::from_list("ftp://mempool.space/api", TIMEOUT),
            Err(FetchError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn test_primary_is_used_first() {
        let primary = MockServer::start().await;
        let mirror = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/blocks/tip/height"))
            .respond_with(ResponseTemplate::new(200).set_body_string("850000"))
            .expect(1)
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("1"))
            .expect(0)
            .mount(&mirror)
            .await;

        let resolver = EndpointResolver::new(
            &[format!("{}/api", primary.uri()), format!("{}/api", mirror.uri())],
            TIMEOUT,
        )
        .unwrap();

        let height = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap();
        assert_eq!(height, 850_000);
    }

    #[tokio::test]
    async fn test_falls_back_on_status_and_malformed_body() {
        let down = MockServer::start().await;
        let garbled = MockServer::start().await;
        let healthy = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&down)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&garbled)
            .await;
        Mock::given(method("GET"))
            .and(path("/blocks/tip/height"))
            .respond_with(ResponseTemplate::new(200).set_body_string("850001"))
            .expect(1)
            .mount(&healthy)
            .await;

        let resolver =
            EndpointResolver::new(&[down.uri(), garbled.uri(), healthy.uri()], TIMEOUT).unwrap();

        let height = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap();
        assert_eq!(height, 850_001);
    }

    #[tokio::test]
    async fn test_slow_primary_times_out_to_mirror() {
        let slow = MockServer::start().await;
        let healthy = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("1")
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&slow)
            .await;
        Mock::given(method("GET"))
            .and(path("/blocks/tip/height"))
            .respond_with(ResponseTemplate::new(200).set_body_string("850002"))
            .expect(1)
            .mount(&healthy)
            .await;

        let timeout = Duration::from_millis(300);
        let resolver = EndpointResolver::new(&[slow.uri(), healthy.uri()], timeout).unwrap();

        let started = std::time::Instant::now();
        let height = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap();

        assert_eq!(height, 850_002);
        // One timed-out attempt, not the primary's full delay
        let elapsed = started.elapsed();
        assert!(elapsed >= timeout, "finished in {elapsed:?}");
        assert!(elapsed < timeout * 4, "finished in {elapsed:?}");
    }

    #[tokio::test]
    async fn test_timeout_applies_to_each_attempt() {
        let slow = [MockServer::start().await, MockServer::start().await];
        let healthy = MockServer::start().await;

        for server in &slow {
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_string("1")
                        .set_delay(Duration::from_secs(10)),
                )
                .expect(1)
                .mount(server)
                .await;
        }
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("850003"))
            .mount(&healthy)
            .await;

        let timeout = Duration::from_millis(300);
        let resolver =
            EndpointResolver::new(&[slow[0].uri(), slow[1].uri(), healthy.uri()], timeout)
                .unwrap();

        let started = std::time::Instant::now();
        let height = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap();

        // Two full timeouts elapse before the third endpoint answers
        assert_eq!(height, 850_003);
        assert!(started.elapsed() >= timeout * 2);
    }

    #[tokio::test]
    async fn test_exhaustion_tries_every_endpoint() {
        let servers = [
            MockServer::start().await,
            MockServer::start().await,
            MockServer::start().await,
        ];
        for server in &servers {
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(500))
                .expect(1)
                .mount(server)
                .await;
        }

        let uris: Vec<String> = servers.iter().map(MockServer::uri).collect();
        let resolver = EndpointResolver::new(&uris, TIMEOUT).unwrap();

        let err = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::AllEndpointsExhausted { .. }));
        assert_eq!(err.attempts(), 3);
        assert!(err.to_string().contains("all 3 explorer endpoints failed"));
    }

    #[tokio::test]
    async fn test_malformed_everywhere_is_reported_as_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"height\": \"tall\"}"))
            .mount(&server)
            .await;

        let resolver = EndpointResolver::new(&[server.uri()], TIMEOUT).unwrap();
        let err = resolver
            .fetch("blocks/tip/height", parse_tip_height)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::MalformedResponse { .. }));
        assert_eq!(err.attempts(), 1);
    }

    #[tokio::test]
    async fn test_each_fetch_restarts_at_primary() {
        let primary = MockServer::start().await;
        let mirror = MockServer::start().await;

        // First call fails on the primary, second call succeeds there
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("10"))
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("20"))
            .expect(1)
            .mount(&mirror)
            .await;

        let resolver = EndpointResolver::new(&[primary.uri(), mirror.uri()], TIMEOUT).unwrap();

        let first = resolver.fetch("blocks/tip/height", parse_tip_height).await.unwrap();
        let second = resolver.fetch("blocks/tip/height", parse_tip_height).await.unwrap();
        assert_eq!(first, 20);
        assert_eq!(second, 10);
    }
}
