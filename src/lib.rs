//! # discord-search
//!
//! An async client for Discord's private guild message-search endpoint,
//! driven by a user authentication token. It translates a set of named
//! filters into wire query parameters, drives paginated GET requests with
//! rate-limit backoff, and assembles message ids or full message records up
//! to a requested amount or exhaustively.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use discord_search::{SearchClient, SearchFilters, SearchOptions, SortMode};
//!
//! # async fn run() -> discord_search::Result<()> {
//! let client = SearchClient::new(std::env::var("DISCORD_TOKEN").unwrap())?;
//!
//! let filters = SearchFilters::new()
//!     .guild_id(81384788765712384)
//!     .text("release notes")
//!     .sort(SortMode::New);
//!
//! // Eager: everything at once.
//! let results = client.search(&filters, &SearchOptions::default()).await?;
//! for id in results.into_ids() {
//!     println!("{id}");
//! }
//!
//! // Incremental: one page at a time.
//! let mut pages = client.pages(&filters, &SearchOptions::default())?;
//! while let Some(page) = pages.next_page().await? {
//!     println!("page of {} (total {})", page.hits.len(), page.total_results);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`filters`] | Typed filter configuration and wire-parameter translation |
//! | [`snowflake`] | Date to snowflake id conversion |
//! | [`client`] | Pagination engine: incremental pages and eager search |
//! | [`models`] | Result pages, hit projection, accumulated results |
//! | [`transport`] | Transport trait and the reqwest implementation |
//! | [`error`] | Error taxonomy |
//!
//! Rate-limit `retry_after` directives are honored transparently, one
//! in-flight request at a time, with a bounded retry budget per request.
//! HTTP 401/403 surface immediately as [`Error::Authorization`].

pub mod client;
pub mod error;
pub mod filters;
pub mod models;
mod request;
pub mod snowflake;
pub mod transport;

pub use client::{Pages, SearchClient, SearchClientBuilder, SearchOptions, PAGE_SIZE};
pub use error::{Error, Result};
pub use filters::{HasKind, QueryParameters, SearchFilters, SortMode};
pub use models::{Hit, Projection, ResultPage, SearchResults};
pub use transport::{HttpTransport, RawResponse, Transport};
