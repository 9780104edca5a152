//! Single-writer editing session for one deck.
//!
//! The session owns the in-memory [`DeckState`] and the two collaborators:
//! a [`DeckStore`] for persistence and a [`CardCatalog`] for lookups. Every
//! mutation is applied optimistically to local state first, then its effects
//! are persisted; a persistence failure rolls the state back to its
//! pre-mutation value and surfaces as [`DeckboardError::Persistence`].
//!
//! Remote changes (another session of the same user) arrive as change
//! notifications carrying the store's change sequence. Notifications at or
//! below the sequence this session last wrote are echoes of its own
//! mutations and are discarded; anything newer triggers a full reload that
//! replaces local state.

use log::{debug, warn};

use crate::catalog::CardCatalog;
use crate::config;
use crate::decklist::{self, DecklistLine};
use crate::error::{DeckboardError, Result};
use crate::legality::{self, CommanderPolicy, DeckAudit};
use crate::models::{CardSnapshot, Deck, Zone};
use crate::reorder::DropTarget;
use crate::state::{DeckMutation, DeckState};
use crate::stats::DeckStats;
use crate::store::DeckStore;

// ---------------------------------------------------------------------------
// ImportReport
// ---------------------------------------------------------------------------

/// Outcome of a batch decklist import. Lines that fail to resolve or place
/// are collected here; the rest of the import proceeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Parsed (merged) lines in the input.
    pub lines: usize,
    /// Lines that resolved and were placed.
    pub added: usize,
    pub errors: Vec<ImportError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportError {
    pub name: String,
    pub message: String,
}

// ---------------------------------------------------------------------------
// DeckSession
// ---------------------------------------------------------------------------

pub struct DeckSession<S: DeckStore, C: CardCatalog> {
    store: S,
    catalog: C,
    policy: CommanderPolicy,
    state: Option<DeckState>,
    /// Store change sequence as of this session's last successful write.
    synced_seq: u64,
}

impl<S: DeckStore, C: CardCatalog> DeckSession<S, C> {
    pub fn new(store: S, catalog: C) -> Self {
        Self {
            store,
            catalog,
            policy: CommanderPolicy::default(),
            state: None,
            synced_seq: 0,
        }
    }

    /// Choose what happens when a commander is set while one is designated.
    pub fn with_commander_policy(mut self, policy: CommanderPolicy) -> Self {
        self.policy = policy;
        self
    }

    // -- Accessors ---------------------------------------------------------

    pub fn state(&self) -> Result<&DeckState> {
        self.state
            .as_ref()
            .ok_or_else(|| DeckboardError::Invariant("no deck open in this session".to_string()))
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    // -- Deck lifecycle ----------------------------------------------------

    /// Create a deck seeded with the default zones and open it.
    pub fn create_deck(&mut self, name: &str) -> Result<&DeckState> {
        let state = DeckState::seeded(Deck::new(name));
        self.store
            .insert_deck(state.deck())
            .map_err(persistence)?;
        for zone in state.zones() {
            self.store.insert_zone(zone).map_err(persistence)?;
        }
        self.synced_seq = self.store.change_seq();
        self.state = Some(state);
        self.state()
    }

    /// Load a deck with its zones and entries. A deck found without zones is
    /// seeded with the defaults on the spot.
    pub fn open_deck(&mut self, deck_id: &str) -> Result<&DeckState> {
        let deck = self
            .store
            .get_deck(deck_id)?
            .ok_or_else(|| DeckboardError::NotFound(format!("deck {}", deck_id)))?;

        let mut zones = self.store.list_zones(deck_id)?;
        if zones.is_empty() {
            for (idx, name) in config::DEFAULT_ZONES.iter().enumerate() {
                let zone = Zone::new(deck_id, *name, idx as u32);
                self.store.insert_zone(&zone).map_err(persistence)?;
                zones.push(zone);
            }
        }

        let entries = self.store.list_entries(deck_id)?;
        self.synced_seq = self.store.change_seq();
        self.state = Some(DeckState::from_parts(deck, zones, entries));
        self.state()
    }

    pub fn list_decks(&self) -> Result<Vec<Deck>> {
        self.store.list_decks()
    }

    /// Delete a deck and everything it owns. Closes the session's state if
    /// it was the open deck.
    pub fn delete_deck(&mut self, deck_id: &str) -> Result<()> {
        self.store.delete_deck(deck_id).map_err(persistence)?;
        if self
            .state
            .as_ref()
            .is_some_and(|s| s.deck().id == deck_id)
        {
            self.state = None;
        }
        Ok(())
    }

    /// Replace local state with a fresh load from the store.
    pub fn reload(&mut self) -> Result<&DeckState> {
        let deck_id = self.state()?.deck().id.clone();
        self.open_deck(&deck_id)
    }

    /// React to a change notification carrying the store's change sequence.
    ///
    /// Returns `true` if the notification was foreign and a reload happened,
    /// `false` if it was an echo of this session's own write.
    pub fn handle_remote_change(&mut self, seq: u64) -> Result<bool> {
        if seq <= self.synced_seq {
            debug!("ignoring change notification {} (own write)", seq);
            return Ok(false);
        }
        self.reload()?;
        Ok(true)
    }

    // -- Mutations ---------------------------------------------------------

    /// Add one copy of a card, auto-classified into its default zone when
    /// `zone_id` is `None`.
    pub fn add_card(&mut self, card: CardSnapshot, zone_id: Option<&str>) -> Result<()> {
        self.commit(DeckMutation::AddCard {
            card,
            zone_id: zone_id.map(str::to_string),
            qty: 1,
        })
    }

    pub fn set_commander(&mut self, card: CardSnapshot) -> Result<()> {
        self.commit(DeckMutation::SetCommander {
            card,
            policy: self.policy,
        })
    }

    pub fn increment(&mut self, entry_id: &str) -> Result<()> {
        self.commit(DeckMutation::IncrementQty {
            entry_id: entry_id.to_string(),
        })
    }

    pub fn decrement(&mut self, entry_id: &str) -> Result<()> {
        self.commit(DeckMutation::DecrementQty {
            entry_id: entry_id.to_string(),
        })
    }

    pub fn remove(&mut self, entry_id: &str) -> Result<()> {
        self.commit(DeckMutation::RemoveEntry {
            entry_id: entry_id.to_string(),
        })
    }

    pub fn move_entry(
        &mut self,
        entry_id: &str,
        dest_zone_id: &str,
        target: DropTarget,
    ) -> Result<()> {
        self.commit(DeckMutation::MoveEntry {
            entry_id: entry_id.to_string(),
            dest_zone_id: dest_zone_id.to_string(),
            target,
        })
    }

    /// Apply optimistically, persist, roll back on persistence failure.
    fn commit(&mut self, mutation: DeckMutation) -> Result<()> {
        let current = self.state()?;
        let (next, writes) = current.apply(&mutation)?;

        let previous = self.state.replace(next);
        match self.store.apply(&writes) {
            Ok(()) => {
                self.synced_seq = self.store.change_seq();
                Ok(())
            }
            Err(e) => {
                warn!("persistence failed, rolling back: {}", e);
                self.state = previous;
                Err(persistence(e))
            }
        }
    }

    // -- Catalog-backed operations -----------------------------------------

    /// Re-fetch an entry's snapshot from the catalog.
    ///
    /// Returns `true` if the snapshot was replaced. A lookup failure falls
    /// back to the stored snapshot, and a response that raced with a newer
    /// local edit of the same entry is discarded.
    pub fn refresh_snapshot(&mut self, entry_id: &str) -> Result<bool> {
        let (card_id, revision) = {
            let entry = self.state()?.entry(entry_id).ok_or_else(|| {
                DeckboardError::Invariant(format!("refresh of unknown entry {}", entry_id))
            })?;
            (entry.card.id.clone(), entry.revision)
        };

        let fetched = match self.catalog.by_id(&card_id) {
            Ok(Some(card)) => card,
            Ok(None) => {
                debug!("catalog has no record for {}; keeping snapshot", card_id);
                return Ok(false);
            }
            Err(e) => {
                warn!("catalog refresh failed for {}: {}; keeping snapshot", card_id, e);
                return Ok(false);
            }
        };

        match self.state()?.entry(entry_id) {
            Some(entry) if entry.revision == revision => {}
            _ => {
                debug!("discarding stale catalog response for entry {}", entry_id);
                return Ok(false);
            }
        }

        self.commit(DeckMutation::RefreshSnapshot {
            entry_id: entry_id.to_string(),
            card: fetched,
        })?;
        Ok(true)
    }

    /// Import decklist text, resolving each line against the catalog and
    /// placing cards into their default zones.
    ///
    /// A line that fails to resolve or place is recorded and skipped; the
    /// import never aborts part-way.
    pub fn import_decklist(&mut self, text: &str) -> Result<ImportReport> {
        self.state()?;
        let lines = decklist::parse_decklist(text);
        let mut report = ImportReport {
            lines: lines.len(),
            ..Default::default()
        };

        for DecklistLine { qty, name } in lines {
            match self.catalog.named(&name) {
                Ok(Some(card)) => {
                    let result = self.commit(DeckMutation::AddCard {
                        card,
                        zone_id: None,
                        qty,
                    });
                    match result {
                        Ok(()) => report.added += 1,
                        Err(e) => report.errors.push(ImportError {
                            name,
                            message: e.to_string(),
                        }),
                    }
                }
                Ok(None) => report.errors.push(ImportError {
                    name,
                    message: "not found in catalog".to_string(),
                }),
                Err(e) => report.errors.push(ImportError {
                    name,
                    message: e.to_string(),
                }),
            }
        }

        Ok(report)
    }

    // -- Derived views -----------------------------------------------------

    pub fn stats(&self) -> Result<DeckStats> {
        Ok(DeckStats::compute(self.state()?))
    }

    pub fn audit(&self) -> Result<DeckAudit> {
        Ok(legality::audit(self.state()?))
    }

    pub fn decklist_text(&self) -> Result<String> {
        Ok(decklist::build_decklist_text(self.state()?))
    }
}

fn persistence(e: DeckboardError) -> DeckboardError {
    match e {
        DeckboardError::Persistence(_) => e,
        other => DeckboardError::Persistence(other.to_string()),
    }
}
