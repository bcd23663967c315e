//! The search client and its pagination engine.
//!
//! [`SearchClient`] drives repeated GET requests against the guild
//! message-search endpoint, advancing an offset until the server-reported
//! total is exhausted or a caller-specified amount is reached. One engine
//! serves both retrieval styles: [`SearchClient::pages`] hands out an
//! incremental [`Pages`] paginator, and [`SearchClient::search`] drains it
//! eagerly into a [`SearchResults`].
//!
//! # Pagination
//!
//! The page size is fixed at 25 by the endpoint. Request *n* (1-based)
//! carries `offset = base + 25·(n−1)`:
//!
//! | Mode | base | First request |
//! |------|------|---------------|
//! | Default | 0 | no `offset` parameter |
//! | Custom offset (caller supplied one) | the caller's offset | carries `offset=base` |
//!
//! # Example
//!
//! ```rust,no_run
//! # use discord_search::{SearchClient, SearchFilters, SearchOptions};
//! # async fn run() -> discord_search::Result<()> {
//! let client = SearchClient::new("user token")?;
//! let filters = SearchFilters::new().guild_id(81384788765712384).text("deploy");
//! let results = client.search(&filters, &SearchOptions::default()).await?;
//! println!("{} of {}", results.len(), results.total_results);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};
use crate::filters::SearchFilters;
use crate::models::{Projection, ResultPage, SearchResults};
use crate::request;
use crate::transport::{HttpTransport, Transport};

/// Results per page; fixed by the endpoint.
pub const PAGE_SIZE: u64 = 25;

const DEFAULT_HOST: &str = "canary.discord.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_MAX_RATE_LIMIT_RETRIES: u32 = 10;

/// Per-invocation options orthogonal to the filters.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Cap on the number of hits to fetch; `None` fetches everything.
    pub amount: Option<u64>,
    /// Id-only or full-record output.
    pub projection: Projection,
}

/// Client for the guild message-search endpoint.
///
/// Owns the transport (and its connection pool) for its lifetime; drop the
/// client to tear the pool down.
pub struct SearchClient {
    transport: Box<dyn Transport>,
    host: String,
    max_rate_limit_retries: u32,
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("host", &self.host)
            .field("max_rate_limit_retries", &self.max_rate_limit_retries)
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    /// A client with default settings: direct connection, 30 s timeout.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::builder(token).build()
    }

    pub fn builder(token: impl Into<String>) -> SearchClientBuilder {
        SearchClientBuilder {
            token: token.into(),
            host: DEFAULT_HOST.to_string(),
            proxy: None,
            timeout: DEFAULT_TIMEOUT,
            max_rate_limit_retries: DEFAULT_MAX_RATE_LIMIT_RETRIES,
            transport: None,
        }
    }

    /// Start an incremental search: a finite, non-restartable sequence of
    /// pages, each annotated with the latest known total. No request is
    /// issued until the first [`Pages::next_page`] call.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] for invalid filters or `amount == Some(0)`.
    pub fn pages(&self, filters: &SearchFilters, options: &SearchOptions) -> Result<Pages<'_>> {
        if options.amount == Some(0) {
            return Err(Error::Configuration(
                "amount must be greater than zero".to_string(),
            ));
        }
        let query = filters.to_query_parameters()?;
        let url = self.endpoint_url(query.guild_id);
        Ok(Pages {
            client: self,
            url,
            params: query.params,
            base_offset: query.base_offset,
            projection: options.projection,
            amount: options.amount,
            requests_issued: 0,
            retrieved: 0,
            remaining: None,
            done: false,
        })
    }

    /// Eager search: collect all pages into one [`SearchResults`].
    pub async fn search(
        &self,
        filters: &SearchFilters,
        options: &SearchOptions,
    ) -> Result<SearchResults> {
        let mut pages = self.pages(filters, options)?;
        let mut results = SearchResults::default();
        while let Some(page) = pages.next_page().await? {
            results.total_results = page.total_results;
            results.hits.extend(page.hits);
        }
        Ok(results)
    }

    fn endpoint_url(&self, guild_id: u64) -> String {
        // A host override may carry its own scheme (mock servers are http).
        if self.host.contains("://") {
            format!("{}/api/v9/guilds/{}/messages/search", self.host, guild_id)
        } else {
            format!(
                "https://{}/api/v9/guilds/{}/messages/search",
                self.host, guild_id
            )
        }
    }
}

/// Builder for [`SearchClient`].
pub struct SearchClientBuilder {
    token: String,
    host: String,
    proxy: Option<String>,
    timeout: Duration,
    max_rate_limit_retries: u32,
    transport: Option<Box<dyn Transport>>,
}

impl SearchClientBuilder {
    /// API host, with or without a scheme. Defaults to `canary.discord.com`.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Proxy url (`socks5://…` or `http://…`).
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Per-request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How many `retry_after` waits to honor per request before giving up
    /// with [`Error::RateLimited`]. Defaults to 10.
    pub fn max_rate_limit_retries(mut self, retries: u32) -> Self {
        self.max_rate_limit_retries = retries;
        self
    }

    /// Inject a custom transport instead of the reqwest-backed one. The
    /// token and proxy settings are ignored when this is set.
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// # Errors
    ///
    /// [`Error::Configuration`] for an unusable token or proxy url.
    pub fn build(self) -> Result<SearchClient> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(
                &self.token,
                self.proxy.as_deref(),
                self.timeout,
            )?),
        };
        Ok(SearchClient {
            transport,
            host: self.host,
            max_rate_limit_retries: self.max_rate_limit_retries,
        })
    }
}

/// Incremental paginator handed out by [`SearchClient::pages`].
///
/// Finite and not restartable: once `next_page` returns `Ok(None)` the
/// invocation is over.
pub struct Pages<'a> {
    client: &'a SearchClient,
    url: String,
    params: Vec<(String, String)>,
    base_offset: Option<u64>,
    projection: Projection,
    amount: Option<u64>,
    requests_issued: u64,
    retrieved: u64,
    remaining: Option<u64>,
    done: bool,
}

impl Pages<'_> {
    /// Fetch the next page, or `None` once the invocation is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<ResultPage>> {
        if self.done {
            return Ok(None);
        }

        let mut params = self.params.clone();
        let offset = match self.base_offset {
            Some(base) => Some(base + PAGE_SIZE * self.requests_issued),
            None if self.requests_issued > 0 => Some(PAGE_SIZE * self.requests_issued),
            None => None,
        };
        if let Some(offset) = offset {
            params.push(("offset".to_string(), offset.to_string()));
        }

        let payload = request::execute(
            self.client.transport.as_ref(),
            &self.url,
            &params,
            self.client.max_rate_limit_retries,
        )
        .await?;
        let mut page = ResultPage::from_payload(&payload, self.projection)?;
        self.requests_issued += 1;

        // Trim the final page so the accumulation never exceeds the amount.
        if let Some(amount) = self.amount {
            let left = (amount - self.retrieved) as usize;
            if page.hits.len() > left {
                page.hits.truncate(left);
            }
        }

        let got = page.hits.len() as u64;
        self.retrieved += got;

        // Remaining count is seeded from the first page's total and
        // decremented by each page's contribution.
        let remaining = self.remaining.get_or_insert(page.total_results);
        *remaining = remaining.saturating_sub(got);

        debug!(
            request = self.requests_issued,
            got,
            total = page.total_results,
            remaining = *remaining,
            "fetched search page"
        );

        let amount_met = self.amount.is_some_and(|amount| self.retrieved >= amount);
        // An empty page with a nonzero remaining count means the server
        // overstated the total; stop instead of spinning.
        if *remaining == 0 || amount_met || got == 0 {
            self.done = true;
        }

        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Hit;
    use crate::transport::testing::ScriptedTransport;
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn page_body(total: u64, ids: std::ops::Range<u64>) -> Value {
        let messages: Vec<Value> = ids
            .map(|id| json!([{"id": id.to_string(), "content": format!("msg {}", id)}]))
            .collect();
        json!({"total_results": total, "messages": messages})
    }

    fn client_with(bodies: Vec<Value>) -> (SearchClient, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::with_bodies(bodies));
        let client = SearchClient::builder("token")
            .transport(Box::new(Arc::clone(&transport)))
            .build()
            .unwrap();
        (client, transport)
    }

    fn filters() -> SearchFilters {
        SearchFilters::new().guild_id(1).text("query")
    }

    #[tokio::test]
    async fn test_eager_fetch_collects_all_pages_in_order() {
        let (client, _) = client_with(vec![
            page_body(52, 0..25),
            page_body(52, 25..50),
            page_body(52, 50..52),
        ]);

        let results = client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results.total_results, 52);
        assert_eq!(results.len(), 52);
        let ids = results.into_ids();
        let expected: Vec<String> = (0..52).map(|id| id.to_string()).collect();
        assert_eq!(ids, expected, "page order and id order preserved");
    }

    #[tokio::test]
    async fn test_default_mode_offsets() {
        let (client, transport) = client_with(vec![
            page_body(52, 0..25),
            page_body(52, 25..50),
            page_body(52, 50..52),
        ]);

        client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.param(0, "offset"), None, "first request bare");
        assert_eq!(transport.param(1, "offset"), Some("25".to_string()));
        assert_eq!(transport.param(2, "offset"), Some("50".to_string()));
    }

    #[tokio::test]
    async fn test_custom_offset_mode_advances_from_base() {
        let (client, transport) = client_with(vec![
            page_body(500, 0..25),
            page_body(500, 25..50),
            page_body(500, 50..75),
        ]);

        let filters = SearchFilters::new().guild_id(1).text("query").offset(324);
        let options = SearchOptions {
            amount: Some(75),
            ..Default::default()
        };
        client.search(&filters, &options).await.unwrap();

        assert_eq!(transport.param(0, "offset"), Some("324".to_string()));
        assert_eq!(transport.param(1, "offset"), Some("349".to_string()));
        assert_eq!(transport.param(2, "offset"), Some("374".to_string()));
    }

    #[tokio::test]
    async fn test_amount_trims_first_page_and_stops() {
        let (client, transport) = client_with(vec![page_body(52, 0..25)]);

        let options = SearchOptions {
            amount: Some(5),
            ..Default::default()
        };
        let results = client.search(&filters(), &options).await.unwrap();

        assert_eq!(results.len(), 5);
        assert_eq!(results.total_results, 52);
        let ids = results.into_ids();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);

        assert_eq!(transport.request_count(), 1, "no request past the cap");
    }

    #[tokio::test]
    async fn test_amount_spanning_pages() {
        let (client, transport) = client_with(vec![page_body(100, 0..25), page_body(100, 25..50)]);

        let options = SearchOptions {
            amount: Some(30),
            ..Default::default()
        };
        let results = client.search(&filters(), &options).await.unwrap();

        assert_eq!(results.len(), 30);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_page_is_not_duplicated() {
        let bodies = vec![
            json!({"retry_after": 1.5}),
            page_body(2, 0..2),
        ];
        let (client, transport) = client_with(bodies);

        let results = client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results.into_ids(), vec!["0", "1"]);
        assert_eq!(transport.request_count(), 2);
        // The reissued request is identical, offset included.
        let recorded = transport.recorded_requests();
        assert_eq!(recorded[0], recorded[1]);
    }

    #[tokio::test]
    async fn test_incremental_pages_annotated_with_total() {
        let (client, _) = client_with(vec![page_body(27, 0..25), page_body(27, 25..27)]);

        let mut pages = client.pages(&filters(), &SearchOptions::default()).unwrap();
        let first = pages.next_page().await.unwrap().unwrap();
        assert_eq!(first.total_results, 27);
        assert_eq!(first.hits.len(), 25);
        let second = pages.next_page().await.unwrap().unwrap();
        assert_eq!(second.hits.len(), 2);
        assert!(pages.next_page().await.unwrap().is_none());
        assert!(pages.next_page().await.unwrap().is_none(), "not restartable");
    }

    #[tokio::test]
    async fn test_empty_page_with_overstated_total_terminates() {
        let (client, transport) = client_with(vec![
            page_body(60, 0..25),
            json!({"total_results": 60, "messages": []}),
        ]);

        let results = client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();

        assert_eq!(results.len(), 25);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_single_short_page() {
        let (client, transport) = client_with(vec![page_body(3, 0..3)]);
        let results = client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_results() {
        let (client, _) = client_with(vec![json!({"total_results": 0, "messages": []})]);
        let results = client
            .search(&filters(), &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.is_empty());
        assert_eq!(results.total_results, 0);
    }

    #[test]
    fn test_builder_surfaces_bad_token_as_configuration_error() {
        let err = SearchClient::builder("two\nlines").build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {:?}", err);
    }

    #[test]
    fn test_builder_surfaces_bad_proxy_as_configuration_error() {
        let err = SearchClient::builder("token")
            .proxy("not a proxy url")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_zero_amount_is_configuration_error() {
        let (client, _) = client_with(vec![]);
        let options = SearchOptions {
            amount: Some(0),
            ..Default::default()
        };
        let err = client.search(&filters(), &options).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_record_projection_flows_through() {
        let (client, _) = client_with(vec![page_body(2, 0..2)]);
        let options = SearchOptions {
            projection: Projection::Records,
            ..Default::default()
        };
        let results = client.search(&filters(), &options).await.unwrap();
        assert!(matches!(results.hits[0], Hit::Record(_)));
        assert_eq!(results.into_records().len(), 2);
    }
}
