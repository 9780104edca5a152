//! Card catalog collaborator: search, fuzzy name resolution, and per-card
//! refresh against the Scryfall REST API.
//!
//! Catalog failures are never fatal to the engine: callers fall back to the
//! stored snapshot, and batch import records a per-line error instead of
//! aborting.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config;
use crate::error::Result;
use crate::models::CardSnapshot;

// ---------------------------------------------------------------------------
// CardCatalog
// ---------------------------------------------------------------------------

pub trait CardCatalog {
    /// Full-text search. Zero results is `Ok(vec![])`, not an error.
    fn search(&self, query: &str) -> Result<Vec<CardSnapshot>>;

    /// Resolve a single card by exact-or-fuzzy name.
    fn named(&self, name: &str) -> Result<Option<CardSnapshot>>;

    /// Fetch one card by catalog id, for live refresh of a stored snapshot.
    fn by_id(&self, id: &str) -> Result<Option<CardSnapshot>>;
}

// ---------------------------------------------------------------------------
// ScryfallCatalog
// ---------------------------------------------------------------------------

/// Blocking HTTP client for the Scryfall card API.
pub struct ScryfallCatalog {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<CardSnapshot>,
}

impl ScryfallCatalog {
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base_url: config::SCRYFALL_API.to_string(),
        })
    }

    /// Point the client at a different API root (tests, mirrors).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Default free-text queries to paper printings unless the query already
    /// carries a game filter.
    fn normalize_query(raw: &str) -> String {
        let q = raw.trim();
        if q.is_empty() || q.contains("game:") {
            q.to_string()
        } else {
            format!("{} game:paper", q)
        }
    }
}

impl CardCatalog for ScryfallCatalog {
    fn search(&self, query: &str) -> Result<Vec<CardSnapshot>> {
        let normalized = Self::normalize_query(query);
        if normalized.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/cards/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("q", normalized.as_str()),
                ("unique", "cards"),
                ("order", "name"),
            ])
            .send()?;
        // Scryfall reports an empty result set as 404.
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let resp = resp.error_for_status()?;
        let mut body: SearchResponse = resp.json()?;
        body.data.truncate(config::SEARCH_RESULT_CAP);
        Ok(body.data)
    }

    fn named(&self, name: &str) -> Result<Option<CardSnapshot>> {
        let url = format!("{}/cards/named", self.base_url);
        let resp = self.client.get(&url).query(&[("fuzzy", name)]).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        Ok(Some(resp.json()?))
    }

    fn by_id(&self, id: &str) -> Result<Option<CardSnapshot>> {
        let url = format!("{}/cards/{}", self.base_url, id);
        let resp = self.client.get(&url).send()?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp.error_for_status()?;
        Ok(Some(resp.json()?))
    }
}
