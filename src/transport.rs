//! HTTP transport seam.
//!
//! The pagination and rate-limit logic talk to the network through the
//! [`Transport`] trait, so they can be exercised against scripted responses
//! in tests. [`HttpTransport`] is the reqwest-backed implementation used in
//! production; it owns one `reqwest::Client` (and its connection pool),
//! reused across all pages of an invocation and torn down on drop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, AUTHORIZATION, USER_AGENT};

use crate::error::{Error, Result};

// Header values the desktop client sends; the endpoint is undocumented and
// rejects requests that look too unlike it.
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 \
     (KHTML, like Gecko) discord/1.0.175 Chrome/120.0.6099.268 Electron/28.2.1 Safari/537.36";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,pl;q=0.9,ru;q=0.8";

/// A raw transport response: HTTP status plus the body text.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One GET request against the search endpoint.
///
/// Implementations carry their own credentials and fixed headers; callers
/// supply only the url and query parameters.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<RawResponse> {
        (**self).get(url, params).await
    }
}

/// Production transport over reqwest.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport carrying the fixed header set and authorization
    /// token.
    ///
    /// A SOCKS proxy url and a plain HTTP proxy url are both accepted;
    /// reqwest routes `socks…://` urls through its dedicated SOCKS
    /// connector. No proxy means a direct connection.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if the token contains characters invalid in
    /// an HTTP header or the proxy url does not parse.
    pub fn new(token: &str, proxy: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        let mut auth = HeaderValue::from_str(token).map_err(|_| {
            Error::Configuration("token contains characters invalid in a header".to_string())
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers);

        if let Some(url) = proxy {
            let proxy = reqwest::Proxy::all(url)
                .map_err(|e| Error::Configuration(format!("invalid proxy url '{}': {}", url, e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, params: &[(String, String)]) -> Result<RawResponse> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
