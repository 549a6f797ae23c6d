use crate::feed::Story;
use futures::future::BoxFuture;
use futures::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// The public Hacker News index. The term is appended verbatim (after encoding).
pub const DEFAULT_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search?query=";

const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed search response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Insecure search endpoint: HTTPS required (except localhost for testing)")]
    InvalidEndpoint,
}

/// Anything that can answer a search term with stories.
///
/// The orchestrator only sees this trait, so tests can hand it an in-memory
/// source instead of a live HTTP client.
pub trait StorySource: Send + Sync {
    fn search<'a>(&'a self, term: &'a str) -> BoxFuture<'a, Result<Vec<Story>, SearchError>>;
}

/// Body shape of the search endpoint. Only `hits` is read.
#[derive(Deserialize)]
struct SearchResponse {
    hits: Vec<Story>,
}

/// HTTP client for the search endpoint.
#[derive(Clone)]
pub struct SearchClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl SearchClient {
    /// Create a client for `endpoint`.
    ///
    /// Only `https://` endpoints are accepted, plus plain HTTP on
    /// localhost/127.0.0.1 for mock servers. `timeout` of `None` means a hung
    /// request stays pending.
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SearchError> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("https://") {
            let is_localhost = endpoint.starts_with("http://127.0.0.1")
                || endpoint.starts_with("http://localhost");
            if !is_localhost {
                tracing::error!(endpoint = %endpoint, "Rejecting non-HTTPS search endpoint");
                return Err(SearchError::InvalidEndpoint);
            }
            tracing::warn!(endpoint = %endpoint, "Using non-HTTPS search endpoint (localhost only)");
        }

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint base followed by the form-encoded term.
    pub fn request_url(&self, term: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
        format!("{}{}", self.endpoint, encoded)
    }

    /// The limit covers the whole exchange, body included.
    async fn fetch(&self, term: &str) -> Result<Vec<Story>, SearchError> {
        let url = self.request_url(term);
        tracing::debug!(url = %url, "Searching stories");

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.exchange(&url))
                .await
                .map_err(|_| SearchError::Timeout(limit))?,
            None => self.exchange(&url).await,
        }
    }

    async fn exchange(&self, url: &str) -> Result<Vec<Story>, SearchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(SearchError::HttpStatus(response.status().as_u16()));
        }

        let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        Ok(parsed.hits)
    }
}

impl StorySource for SearchClient {
    fn search<'a>(&'a self, term: &'a str) -> BoxFuture<'a, Result<Vec<Story>, SearchError>> {
        Box::pin(self.fetch(term))
    }
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, SearchError> {
    // Fast path: trust Content-Length when present
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(SearchError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(SearchError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SearchClient {
        let endpoint = format!("{}/api/v1/search?query=", server.uri());
        SearchClient::new(reqwest::Client::new(), endpoint, None).unwrap()
    }

    #[test]
    fn test_request_url_appends_encoded_term() {
        let client = SearchClient::new(reqwest::Client::new(), DEFAULT_ENDPOINT, None).unwrap();
        assert_eq!(
            client.request_url("React"),
            "https://hn.algolia.com/api/v1/search?query=React"
        );
        assert_eq!(
            client.request_url("rust & go"),
            "https://hn.algolia.com/api/v1/search?query=rust+%26+go"
        );
    }

    #[test]
    fn test_http_endpoint_rejected() {
        let result = SearchClient::new(reqwest::Client::new(), "http://evil.com/search?q=", None);
        assert!(matches!(result, Err(SearchError::InvalidEndpoint)));
    }

    #[test]
    fn test_localhost_endpoint_allowed() {
        let result = SearchClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9999/search?q=",
            None,
        );
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_search_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/search"))
            .and(query_param("query", "React"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"hits":[{"objectID":"0","title":"React","url":"https://reactjs.org",
                   "author":"jordan","num_comments":3,"points":4}],"nbHits":1}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let stories = client_for(&server).search("React").await.unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(&*stories[0].title, "React");
        assert_eq!(stories[0].points, 4);
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let result = client_for(&server).search("React").await;
        assert!(matches!(result, Err(SearchError::HttpStatus(503))));
    }

    #[tokio::test]
    async fn test_search_missing_hits_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"results":[]}"#))
            .mount(&server)
            .await;

        let result = client_for(&server).search("React").await;
        assert!(matches!(result, Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_non_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = client_for(&server).search("React").await;
        assert!(matches!(result, Err(SearchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_search_oversize_body_rejected() {
        let server = MockServer::start().await;
        let body = format!(r#"{{"hits":[],"pad":"{}"}}"#, "x".repeat(MAX_RESPONSE_SIZE));
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let result = client_for(&server).search("React").await;
        assert!(matches!(result, Err(SearchError::ResponseTooLarge(_))));
    }

    #[tokio::test]
    async fn test_search_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"hits":[]}"#)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let endpoint = format!("{}/api/v1/search?query=", server.uri());
        let client =
            SearchClient::new(reqwest::Client::new(), endpoint, Some(Duration::from_millis(200)))
                .unwrap();
        let result = client.search("React").await;
        assert!(matches!(result, Err(SearchError::Timeout(_))));
    }

    #[test]
    fn test_timeout_message_keeps_sub_second_limit() {
        let err = SearchError::Timeout(Duration::from_millis(300));
        assert_eq!(err.to_string(), "Request timed out after 300ms");
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"hits\":")
                .await
                .unwrap();
            socket.flush().await.unwrap();
            // Headers are out; the rest of the body never comes
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let endpoint = format!("http://127.0.0.1:{}/api/v1/search?query=", port);
        let limit = Duration::from_millis(300);
        let client = SearchClient::new(reqwest::Client::new(), endpoint, Some(limit)).unwrap();

        let result = tokio::time::timeout(Duration::from_secs(3), client.search("React"))
            .await
            .expect("search still pending after the configured limit");
        assert!(matches!(result, Err(SearchError::Timeout(d)) if d == limit));
        server.abort();
    }
}
