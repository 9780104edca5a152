use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::models::CardSnapshot;

// ---------------------------------------------------------------------------
// Deck — Root entity owning zones and entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub format: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            format: config::DEFAULT_FORMAT.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Zone — Named column of entries with a persistent display order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub deck_id: String,
    pub name: String,
    /// Unique within the deck.
    pub display_order: u32,
}

impl Zone {
    pub fn new(deck_id: &str, name: impl Into<String>, display_order: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            deck_id: deck_id.to_string(),
            name: name.into(),
            display_order,
        }
    }

    /// Whether this is the distinguished Commander zone.
    pub fn is_commander(&self) -> bool {
        self.name.eq_ignore_ascii_case(config::COMMANDER_ZONE)
    }
}

// ---------------------------------------------------------------------------
// Entry — (card snapshot, quantity, sort position) in exactly one zone
// ---------------------------------------------------------------------------

/// Invariants: `qty >= 1` (an entry decremented to zero is deleted), and
/// within any zone the `sort_order` values form a dense 0-based sequence
/// after every committed mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub deck_id: String,
    pub zone_id: String,
    pub qty: u32,
    pub sort_order: u32,
    /// This entry's own copy of the catalog record, not shared.
    pub card: CardSnapshot,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Local edit counter. A catalog refresh that raced with a newer local
    /// edit is detected (and discarded) by comparing revisions.
    #[serde(default)]
    pub revision: u64,
}

impl Entry {
    pub fn new(deck_id: &str, zone_id: &str, card: CardSnapshot, qty: u32, sort_order: u32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            deck_id: deck_id.to_string(),
            zone_id: zone_id.to_string(),
            qty,
            sort_order,
            card,
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.revision += 1;
    }
}
