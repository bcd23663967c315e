//! Result pages, hit projection, and accumulated results.
//!
//! The endpoint returns each match as a context group: a list of related
//! messages where only the first element is the actual hit. [`ResultPage`]
//! extracts those first elements and projects them to either compact ids or
//! full records per [`Projection`].

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// How raw message records are projected into hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Keep only the message id of each hit.
    #[default]
    Ids,
    /// Keep the full message record of each hit.
    Records,
}

/// One projected search hit.
///
/// Serializes untagged: an id as a bare string, a record as the message
/// object itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Hit {
    Id(String),
    Record(Value),
}

impl Hit {
    /// The message id, regardless of projection. `None` only for a record
    /// without an `id` field.
    pub fn id(&self) -> Option<&str> {
        match self {
            Hit::Id(id) => Some(id),
            Hit::Record(record) => record.get("id").and_then(Value::as_str),
        }
    }
}

/// One page of search results, annotated with the server-reported total.
#[derive(Debug, Clone)]
pub struct ResultPage {
    /// Total matches across all pages, as reported with this page.
    pub total_results: u64,
    /// Projected hits on this page, in server order.
    pub hits: Vec<Hit>,
}

impl ResultPage {
    /// Parse a raw search payload into a page of projected hits.
    ///
    /// Takes the first element of each context group. Empty groups are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedResponse`] if `total_results` or `messages` is
    /// absent, a context group is not an array, or (in id projection) a hit
    /// has no string `id` field.
    pub fn from_payload(payload: &Value, projection: Projection) -> Result<Self> {
        let total_results = payload
            .get("total_results")
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                Error::MalformedResponse("missing or non-integer total_results".to_string())
            })?;

        let groups = payload
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::MalformedResponse("missing messages array".to_string()))?;

        let mut hits = Vec::with_capacity(groups.len());
        for group in groups {
            let group = group.as_array().ok_or_else(|| {
                Error::MalformedResponse("message context group is not an array".to_string())
            })?;
            let Some(first) = group.first() else {
                warn!("skipping empty message context group");
                continue;
            };
            match projection {
                Projection::Ids => {
                    let id = first.get("id").and_then(Value::as_str).ok_or_else(|| {
                        Error::MalformedResponse("message without a string id field".to_string())
                    })?;
                    hits.push(Hit::Id(id.to_string()));
                }
                Projection::Records => hits.push(Hit::Record(first.clone())),
            }
        }

        Ok(Self {
            total_results,
            hits,
        })
    }
}

/// All hits accumulated by an eager search, in page order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchResults {
    /// Total matches reported by the server (may exceed `hits.len()` when
    /// an amount cap was applied).
    pub total_results: u64,
    pub hits: Vec<Hit>,
}

impl SearchResults {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Extract message ids, in order. Records without an `id` field are
    /// dropped.
    pub fn into_ids(self) -> Vec<String> {
        self.hits
            .into_iter()
            .filter_map(|hit| hit.id().map(str::to_string))
            .collect()
    }

    /// Extract full records, in order. Id-only hits are dropped.
    pub fn into_records(self) -> Vec<Value> {
        self.hits
            .into_iter()
            .filter_map(|hit| match hit {
                Hit::Record(record) => Some(record),
                Hit::Id(_) => None,
            })
            .collect()
    }
}
