//! Persistence collaborator contract and the in-memory reference store.
//!
//! The engine core never talks to a transport directly: state transitions
//! produce [`StoreWrite`] effects and the session driver executes them
//! against a [`DeckStore`]. Any backend exposing these CRUD, ordered-list,
//! and subscribe operations can sit behind the trait.

use std::collections::BTreeMap;

use crate::error::{DeckboardError, Result};
use crate::models::{CardSnapshot, Deck, Entry, Zone};
use crate::reorder::Reposition;

// ---------------------------------------------------------------------------
// StoreWrite — Unit of persistence produced by a state transition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    InsertZone(Zone),
    InsertEntry(Entry),
    UpdateQty { entry_id: String, qty: u32 },
    UpdateSnapshot { entry_id: String, card: CardSnapshot },
    DeleteEntry { entry_id: String },
    Reposition(Reposition),
}

/// Callback invoked when a deck's records change, with the store's change
/// sequence number at the time of the write. Used to drive reloads.
pub type ChangeListener = Box<dyn FnMut(u64) + Send>;

// ---------------------------------------------------------------------------
// DeckStore
// ---------------------------------------------------------------------------

pub trait DeckStore {
    fn insert_deck(&mut self, deck: &Deck) -> Result<()>;
    fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>>;
    fn list_decks(&self) -> Result<Vec<Deck>>;
    /// Deletes the deck and cascades to its zones and entries.
    fn delete_deck(&mut self, deck_id: &str) -> Result<()>;

    fn insert_zone(&mut self, zone: &Zone) -> Result<()>;
    /// Zones of a deck ordered by display order.
    fn list_zones(&self, deck_id: &str) -> Result<Vec<Zone>>;

    fn insert_entry(&mut self, entry: &Entry) -> Result<()>;
    fn update_entry_qty(&mut self, entry_id: &str, qty: u32) -> Result<()>;
    fn update_entry_snapshot(&mut self, entry_id: &str, card: &CardSnapshot) -> Result<()>;
    fn delete_entry(&mut self, entry_id: &str) -> Result<()>;
    fn reposition_entry(&mut self, entry_id: &str, zone_id: &str, sort_order: u32) -> Result<()>;
    /// Entries of a deck ordered by sort position.
    fn list_entries(&self, deck_id: &str) -> Result<Vec<Entry>>;

    /// Execute a batch of writes in order. Not transactional by default;
    /// callers treat any failure as a failure of the whole batch and roll
    /// back their optimistic state.
    fn apply(&mut self, writes: &[StoreWrite]) -> Result<()> {
        for write in writes {
            match write {
                StoreWrite::InsertZone(zone) => self.insert_zone(zone)?,
                StoreWrite::InsertEntry(entry) => self.insert_entry(entry)?,
                StoreWrite::UpdateQty { entry_id, qty } => self.update_entry_qty(entry_id, *qty)?,
                StoreWrite::UpdateSnapshot { entry_id, card } => {
                    self.update_entry_snapshot(entry_id, card)?
                }
                StoreWrite::DeleteEntry { entry_id } => self.delete_entry(entry_id)?,
                StoreWrite::Reposition(r) => {
                    self.reposition_entry(&r.entry_id, &r.zone_id, r.sort_order)?
                }
            }
        }
        Ok(())
    }

    /// Register a listener for changes to one deck's records. Stores without
    /// a push channel may ignore this.
    fn subscribe(&mut self, _deck_id: &str, _listener: ChangeListener) -> Result<()> {
        Ok(())
    }

    /// Monotonic counter bumped on every committed write. Lets a session
    /// tell its own write echoes apart from foreign changes.
    fn change_seq(&self) -> u64 {
        0
    }
}

// ---------------------------------------------------------------------------
// MemoryStore — HashMap-backed reference implementation
// ---------------------------------------------------------------------------

/// In-memory [`DeckStore`] used in tests and for offline drafting. Fires
/// change listeners synchronously on every write.
#[derive(Default)]
pub struct MemoryStore {
    decks: BTreeMap<String, Deck>,
    zones: BTreeMap<String, Zone>,
    entries: BTreeMap<String, Entry>,
    listeners: Vec<(String, ChangeListener)>,
    seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&mut self, deck_id: &str) {
        self.seq += 1;
        let seq = self.seq;
        for (subscribed, listener) in &mut self.listeners {
            if subscribed == deck_id {
                listener(seq);
            }
        }
    }

    fn entry_deck(&self, entry_id: &str) -> Result<String> {
        self.entries
            .get(entry_id)
            .map(|e| e.deck_id.clone())
            .ok_or_else(|| DeckboardError::NotFound(format!("entry {}", entry_id)))
    }
}

impl DeckStore for MemoryStore {
    fn insert_deck(&mut self, deck: &Deck) -> Result<()> {
        self.decks.insert(deck.id.clone(), deck.clone());
        let id = deck.id.clone();
        self.notify(&id);
        Ok(())
    }

    fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        Ok(self.decks.get(deck_id).cloned())
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        let mut decks: Vec<Deck> = self.decks.values().cloned().collect();
        decks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(decks)
    }

    fn delete_deck(&mut self, deck_id: &str) -> Result<()> {
        self.decks.remove(deck_id);
        self.zones.retain(|_, z| z.deck_id != deck_id);
        self.entries.retain(|_, e| e.deck_id != deck_id);
        self.notify(deck_id);
        Ok(())
    }

    fn insert_zone(&mut self, zone: &Zone) -> Result<()> {
        self.zones.insert(zone.id.clone(), zone.clone());
        let deck_id = zone.deck_id.clone();
        self.notify(&deck_id);
        Ok(())
    }

    fn list_zones(&self, deck_id: &str) -> Result<Vec<Zone>> {
        let mut zones: Vec<Zone> = self
            .zones
            .values()
            .filter(|z| z.deck_id == deck_id)
            .cloned()
            .collect();
        zones.sort_by_key(|z| z.display_order);
        Ok(zones)
    }

    fn insert_entry(&mut self, entry: &Entry) -> Result<()> {
        self.entries.insert(entry.id.clone(), entry.clone());
        let deck_id = entry.deck_id.clone();
        self.notify(&deck_id);
        Ok(())
    }

    fn update_entry_qty(&mut self, entry_id: &str, qty: u32) -> Result<()> {
        let deck_id = self.entry_deck(entry_id)?;
        if let Some(entry) = self.entries.get_mut(entry_id) {
            entry.qty = qty;
            entry.touch();
        }
        self.notify(&deck_id);
        Ok(())
    }

    fn update_entry_snapshot(&mut self, entry_id: &str, card: &CardSnapshot) -> Result<()> {
        let deck_id = self.entry_deck(entry_id)?;
        if let Some(entry) = self.entries.get_mut(entry_id) {
            entry.card = card.clone();
            entry.touch();
        }
        self.notify(&deck_id);
        Ok(())
    }

    fn delete_entry(&mut self, entry_id: &str) -> Result<()> {
        if let Some(entry) = self.entries.remove(entry_id) {
            let deck_id = entry.deck_id;
            self.notify(&deck_id);
        }
        Ok(())
    }

    fn reposition_entry(&mut self, entry_id: &str, zone_id: &str, sort_order: u32) -> Result<()> {
        let deck_id = self.entry_deck(entry_id)?;
        if let Some(entry) = self.entries.get_mut(entry_id) {
            entry.zone_id = zone_id.to_string();
            entry.sort_order = sort_order;
            entry.touch();
        }
        self.notify(&deck_id);
        Ok(())
    }

    fn list_entries(&self, deck_id: &str) -> Result<Vec<Entry>> {
        let mut entries: Vec<Entry> = self
            .entries
            .values()
            .filter(|e| e.deck_id == deck_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    fn subscribe(&mut self, deck_id: &str, listener: ChangeListener) -> Result<()> {
        self.listeners.push((deck_id.to_string(), listener));
        Ok(())
    }

    fn change_seq(&self) -> u64 {
        self.seq
    }
}
