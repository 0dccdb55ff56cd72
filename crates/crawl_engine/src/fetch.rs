use std::io;
use std::time::Duration;

use bytes::Bytes;
use crawl_logging::{crawl_debug, crawl_trace};
use futures_util::{StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_TYPE, REFERER};
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::{Document, FailureKind, FetchError};

/// Desktop Chrome identity presented on every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Whole-request limit for HTML documents. Media streams are not bounded by it.
    pub request_timeout: Duration,
    /// Idle limit between body reads, applied to every request.
    pub read_timeout: Duration,
    pub redirect_limit: usize,
    pub max_document_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            redirect_limit: 10,
            max_document_bytes: 5 * 1024 * 1024,
            allowed_content_types: vec![
                "text/html".to_string(),
                "application/xhtml+xml".to_string(),
            ],
        }
    }
}

/// Cookie-bearing HTTP client shared by every request of a crawl.
///
/// Cloning is cheap and clones share the connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl HttpTransport {
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(settings.user_agent.clone())
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// GETs `url` and parses the body as HTML.
    ///
    /// A `referer` that is `None` or empty sends no `Referer` header.
    pub async fn get_document(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<Document, FetchError> {
        let response = self
            .request(url, referer)?
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;

        let max_bytes = self.settings.max_document_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            body.extend_from_slice(&chunk);
        }

        crawl_debug!("fetched {} ({} bytes)", final_url, body.len());
        Document::from_bytes(final_url, &body, content_type.as_deref())
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    /// GETs `url` only for its side effects (cookies, redirects) and drains the body.
    ///
    /// Returns the final URL after redirects.
    pub async fn visit(&self, url: &str, referer: Option<&str>) -> Result<String, FetchError> {
        let response = self
            .request(url, referer)?
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        let final_url = response.url().to_string();
        response.bytes().await.map_err(map_reqwest_error)?;
        Ok(final_url)
    }

    /// GETs `url` and hands back the unread body for streaming.
    pub async fn get_stream(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<MediaStream, FetchError> {
        let response = self
            .request(url, referer)?
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = check_status(response)?;
        crawl_trace!(
            "media stream opened {} ({:?} bytes)",
            response.url(),
            response.content_length()
        );
        Ok(MediaStream { response })
    }

    fn request(
        &self,
        url: &str,
        referer: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{url}: {err}")))?;
        let mut request = self.client.get(parsed);
        if let Some(referer) = referer.filter(|r| !r.is_empty()) {
            request = request.header(REFERER, referer);
        }
        Ok(request)
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

/// Status-checked response whose body has not been read yet.
#[derive(Debug)]
pub struct MediaStream {
    response: reqwest::Response,
}

impl MediaStream {
    pub fn final_url(&self) -> &str {
        self.response.url().as_str()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Adapts the body into an `AsyncRead` without buffering it.
    pub fn into_reader(self) -> impl AsyncRead + Send {
        let body = self
            .response
            .bytes_stream()
            .map_err(io::Error::other);
        StreamReader::<_, Bytes>::new(body)
    }
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(FetchError::new(
            FailureKind::HttpStatus(status.as_u16()),
            format!("{} returned {status}", response.url()),
        ))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    if err.is_builder() {
        return FetchError::new(FailureKind::InvalidUrl, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
