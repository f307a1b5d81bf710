//! HTTP fetch of the source page.
//!
//! ### Limits
//! - Request timeout from config (default: 20s)
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//!
//! ### Decoding
//! - The body is always decoded as UTF-8, replacing invalid sequences,
//!   whatever charset the server announces.

pub mod url;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, header};

pub use self::url::{UrlError, parse_source_url};

use vitis_core::{AppConfig, Error, Fetcher};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "vitis/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "vitis/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.fetch_timeout(),
            ..Default::default()
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The final URL after redirects
    pub final_url: Url,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
}

impl FetchResponse {
    /// Body decoded as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Whether the server announced HTML. A missing header counts as HTML.
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_none_or(|ct| ct.to_ascii_lowercase().contains("html"))
    }
}

/// HTTP fetch client with size and time limits.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL, returning raw bytes and metadata.
    ///
    /// Fails on transport errors, non-success statuses, timeouts and bodies
    /// larger than `max_bytes`.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::FetchTimeout(format!("{url}: {e}"))
                } else {
                    Error::HttpError(format!("network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpError(format!("status {} from {url}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{url}: {e}"))
            } else {
                Error::HttpError(format!("failed to read response: {}", e))
            }
        })?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(%url, %final_url, bytes = bytes.len(), "fetched source");

        Ok(FetchResponse { final_url, content_type, bytes })
    }
}

/// The export page as a `Fetcher`: one fixed URL, fetched whole.
pub struct HttpSource {
    client: FetchClient,
    url: Url,
}

impl HttpSource {
    pub fn new(client: FetchClient, url: &str) -> Result<Self, Error> {
        let url = parse_source_url(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { client, url })
    }

    /// Build the client and source from application config.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(FetchClient::new(FetchConfig::from(config))?, &config.source_url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Fetcher for HttpSource {
    async fn fetch_raw(&self) -> Result<String, Error> {
        let response = self.client.fetch(&self.url).await?;
        if response.final_url != self.url {
            tracing::info!(from = %self.url, to = %response.final_url, "source redirected");
        }
        if !response.is_html() {
            tracing::warn!(
                url = %response.final_url,
                content_type = response.content_type.as_deref().unwrap_or_default(),
                "source did not announce HTML"
            );
        }
        Ok(response.text())
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const HTML: &str = "Content-Type: text/html; charset=iso-8859-1\r\n";

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(status_line: &'static str, headers: &'static str, body: Vec<u8>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\n{headers}Content-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/index.php?opcao=opt_06")
    }

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "vitis/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "test/1".into(), max_bytes: 1024, fetch_timeout_ms: 500, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "test/1");
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.timeout, Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_http_source_rejects_bad_url() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        assert!(matches!(HttpSource::new(client, "ftp://example.com"), Err(Error::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_fetch_raw_decodes_utf8() {
        let url = serve_once("200 OK", HTML, "<td>Países Baixos</td>".as_bytes().to_vec()).await;
        let source = HttpSource::new(FetchClient::new(FetchConfig::default()).unwrap(), &url).unwrap();

        let body = source.fetch_raw().await.unwrap();

        assert_eq!(body, "<td>Países Baixos</td>");
        assert_eq!(source.describe(), url);
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let url = serve_once("503 Service Unavailable", HTML, b"down".to_vec()).await;
        let source = HttpSource::new(FetchClient::new(FetchConfig::default()).unwrap(), &url).unwrap();

        let err = source.fetch_raw().await.unwrap_err();

        assert!(matches!(err, Error::HttpError(ref msg) if msg.contains("503")));
        assert!(err.is_upstream());
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let url = serve_once("200 OK", HTML, vec![b'x'; 64]).await;
        let config = FetchConfig { max_bytes: 16, ..Default::default() };
        let source = HttpSource::new(FetchClient::new(config).unwrap(), &url).unwrap();

        assert!(matches!(source.fetch_raw().await, Err(Error::FetchTooLarge(_))));
    }

    #[tokio::test]
    async fn test_fetch_keeps_response_metadata() {
        let url = serve_once("200 OK", HTML, b"<table></table>".to_vec()).await;
        let client = FetchClient::new(FetchConfig::default()).unwrap();

        let response = client.fetch(&parse_source_url(&url).unwrap()).await.unwrap();

        assert_eq!(response.final_url.as_str(), url);
        assert_eq!(response.content_type.as_deref(), Some("text/html; charset=iso-8859-1"));
        assert!(response.is_html());
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect_to_final_url() {
        let target = serve_once("200 OK", HTML, b"<table></table>".to_vec()).await;
        let location: &'static str = Box::leak(format!("Location: {target}\r\n").into_boxed_str());
        let start = serve_once("302 Found", location, Vec::new()).await;
        let source = HttpSource::new(FetchClient::new(FetchConfig::default()).unwrap(), &start).unwrap();

        let response = source.client.fetch(source.url()).await.unwrap();

        assert_eq!(response.final_url.as_str(), target);
        assert_ne!(response.final_url, *source.url());
    }

    #[test]
    fn test_is_html() {
        let response = |content_type: Option<&str>| FetchResponse {
            final_url: Url::parse("http://example.com/").unwrap(),
            content_type: content_type.map(str::to_string),
            bytes: Bytes::new(),
        };
        assert!(response(Some("text/html; charset=iso-8859-1")).is_html());
        assert!(response(Some("application/XHTML+xml")).is_html());
        assert!(response(None).is_html());
        assert!(!response(Some("application/json")).is_html());
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{addr}/");
        let source = HttpSource::new(FetchClient::new(FetchConfig::default()).unwrap(), &url).unwrap();

        assert!(matches!(source.fetch_raw().await, Err(Error::HttpError(_))));
    }
}
