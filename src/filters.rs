//! Search filter configuration and wire-parameter translation.
//!
//! [`SearchFilters`] is a typed configuration struct with one optional field
//! per recognized filter; there is no stringly-typed dispatch, so unknown
//! filter names are a compile error instead of a runtime warning. Building
//! the wire parameters validates the two invariants the endpoint enforces:
//! a guild id is mandatory, and at least one filter beyond the default
//! `include_nsfw` flag must be set.
//!
//! # Example
//!
//! ```rust
//! use discord_search::SearchFilters;
//!
//! let filters = SearchFilters::new()
//!     .guild_id(81384788765712384)
//!     .text("release notes")
//!     .pinned(true);
//! let query = filters.to_query_parameters().unwrap();
//! assert_eq!(query.guild_id, 81384788765712384);
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use tracing::warn;

use crate::error::{Error, Result};
use crate::snowflake;

/// Content kinds accepted by the `has` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HasKind {
    Link,
    Embed,
    File,
    Video,
    Image,
    Sound,
    Sticker,
}

impl HasKind {
    /// The wire value for this content kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            HasKind::Link => "link",
            HasKind::Embed => "embed",
            HasKind::File => "file",
            HasKind::Video => "video",
            HasKind::Image => "image",
            HasKind::Sound => "sound",
            HasKind::Sticker => "sticker",
        }
    }
}

impl fmt::Display for HasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HasKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "link" => Ok(HasKind::Link),
            "embed" => Ok(HasKind::Embed),
            "file" => Ok(HasKind::File),
            "video" => Ok(HasKind::Video),
            "image" => Ok(HasKind::Image),
            "sound" => Ok(HasKind::Sound),
            "sticker" => Ok(HasKind::Sticker),
            other => Err(format!(
                "unknown content kind '{}'. Use link, embed, file, video, image, sound, or sticker.",
                other
            )),
        }
    }
}

/// Result ordering. A single enum field makes the sort filters mutually
/// exclusive by construction: setting a new mode replaces the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Most relevant first (`relevance`/`desc`).
    Relevant,
    /// Newest first (`timestamp`/`desc`).
    New,
    /// Oldest first (`timestamp`/`asc`).
    Old,
}

impl SortMode {
    fn sort_by(&self) -> &'static str {
        match self {
            SortMode::Relevant => "relevance",
            SortMode::New | SortMode::Old => "timestamp",
        }
    }

    fn sort_order(&self) -> &'static str {
        match self {
            SortMode::Relevant | SortMode::New => "desc",
            SortMode::Old => "asc",
        }
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "relevant" => Ok(SortMode::Relevant),
            "new" => Ok(SortMode::New),
            "old" => Ok(SortMode::Old),
            other => Err(format!(
                "unknown sort mode '{}'. Use relevant, new, or old.",
                other
            )),
        }
    }
}

/// Named filters for one search invocation.
///
/// All setters are builder-style and consuming. `include_nsfw` defaults to
/// `true`; everything else is unset.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    guild_id: Option<u64>,
    text: Option<String>,
    from_user: Option<u64>,
    in_channel: Option<u64>,
    mentions: Option<u64>,
    has: Option<HasKind>,
    before: Option<NaiveDate>,
    during: Option<NaiveDate>,
    after: Option<NaiveDate>,
    pinned: Option<bool>,
    include_nsfw: bool,
    sort: Option<SortMode>,
    offset: Option<u64>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            guild_id: None,
            text: None,
            from_user: None,
            in_channel: None,
            mentions: None,
            has: None,
            before: None,
            during: None,
            after: None,
            pinned: None,
            include_nsfw: true,
            sort: None,
            offset: None,
        }
    }
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// The guild to search in. Required.
    pub fn guild_id(mut self, id: u64) -> Self {
        self.guild_id = Some(id);
        self
    }

    /// Free-text content to search for.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Only messages authored by this user id.
    pub fn from_user(mut self, id: u64) -> Self {
        self.from_user = Some(id);
        self
    }

    /// Only messages in this channel id.
    pub fn in_channel(mut self, id: u64) -> Self {
        self.in_channel = Some(id);
        self
    }

    /// Only messages mentioning this user id.
    pub fn mentions(mut self, id: u64) -> Self {
        self.mentions = Some(id);
        self
    }

    /// Only messages containing this kind of content.
    pub fn has(mut self, kind: HasKind) -> Self {
        self.has = Some(kind);
        self
    }

    /// Only messages before this date (midnight UTC).
    pub fn before(mut self, date: NaiveDate) -> Self {
        self.before = Some(date);
        self
    }

    /// Only messages during this date: expands to a `min_id`/`max_id` pair
    /// spanning one day before and one day after. Overrides `before`/`after`
    /// for those two wire keys.
    pub fn during(mut self, date: NaiveDate) -> Self {
        self.during = Some(date);
        self
    }

    /// Only messages after this date (midnight UTC).
    pub fn after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    /// Only pinned (or only unpinned) messages.
    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    /// Whether to include messages from nsfw channels. Defaults to `true`.
    pub fn include_nsfw(mut self, include: bool) -> Self {
        self.include_nsfw = include;
        self
    }

    /// Result ordering. Setting a mode replaces any previously set one.
    pub fn sort(mut self, mode: SortMode) -> Self {
        self.sort = Some(mode);
        self
    }

    /// Starting result offset. Switches pagination to custom-offset mode:
    /// every request carries `offset`, advancing from this base.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Translate the filters into wire-ready query parameters.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if no guild id is set, or if nothing besides
    /// the default `include_nsfw` flag is set.
    pub fn to_query_parameters(&self) -> Result<QueryParameters> {
        let guild_id = self
            .guild_id
            .ok_or_else(|| Error::Configuration("no guild id provided".to_string()))?;

        let mut params: Vec<(String, String)> = Vec::new();
        push(&mut params, "include_nsfw", bool_param(self.include_nsfw));

        if let Some(text) = &self.text {
            if text.is_empty() {
                warn!("skipping empty text filter");
            } else {
                push(&mut params, "content", text.clone());
            }
        }
        if let Some(id) = self.from_user {
            push(&mut params, "author_id", id.to_string());
        }
        if let Some(id) = self.in_channel {
            push(&mut params, "channel_id", id.to_string());
        }
        if let Some(id) = self.mentions {
            push(&mut params, "mentions", id.to_string());
        }
        if let Some(kind) = self.has {
            push(&mut params, "has", kind.as_str());
        }
        if let Some(pinned) = self.pinned {
            push(&mut params, "pinned", bool_param(pinned));
        }

        if let Some(date) = self.during {
            if self.before.is_some() || self.after.is_some() {
                warn!("during filter overrides before/after date bounds");
            }
            push(
                &mut params,
                "min_id",
                snowflake::from_date(date - Duration::days(1)),
            );
            push(
                &mut params,
                "max_id",
                snowflake::from_date(date + Duration::days(1)),
            );
        } else {
            if let Some(date) = self.before {
                push(&mut params, "max_id", snowflake::from_date(date));
            }
            if let Some(date) = self.after {
                push(&mut params, "min_id", snowflake::from_date(date));
            }
        }

        if let Some(mode) = self.sort {
            push(&mut params, "sort_by", mode.sort_by());
            push(&mut params, "sort_order", mode.sort_order());
        }

        // The base offset counts as an effective parameter but is carried
        // separately: the paginator appends the running offset per request.
        let effective = params.len() + usize::from(self.offset.is_some());
        if effective <= 1 {
            return Err(Error::Configuration(
                "at least one filter besides include_nsfw must be set".to_string(),
            ));
        }

        Ok(QueryParameters {
            guild_id,
            params,
            base_offset: self.offset,
        })
    }
}

/// Wire-ready parameter set for one invocation.
#[derive(Debug, Clone)]
pub struct QueryParameters {
    /// The guild id, part of the endpoint path rather than the query string.
    pub guild_id: u64,
    /// Query string pairs, excluding the pagination offset.
    pub params: Vec<(String, String)>,
    /// Caller-supplied starting offset, if pagination is caller-controlled.
    pub base_offset: Option<u64>,
}

fn push(params: &mut Vec<(String, String)>, key: &str, value: impl Into<String>) {
    params.push((key.to_string(), value.into()));
}

// The endpoint tolerates Python-style capitalized booleans; keep the exact
// strings the original client sends.
fn bool_param(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
