//! In-memory deck state and its pure transition function.
//!
//! [`DeckState`] is a value object: `apply` never mutates in place, it
//! returns a new state plus the [`StoreWrite`] effects needed to persist the
//! change. The driver executes the effects and keeps the old state around
//! for rollback. Ordering invariants (dense 0-based sort positions per zone,
//! no zero-quantity entries, at most two commander-zone entries) hold after
//! every committed transition.

use std::collections::HashMap;

use serde::Serialize;

use crate::config;
use crate::error::{DeckboardError, Result};
use crate::facts::{self, ColorSet};
use crate::legality::{self, CommanderPolicy};
use crate::models::{CardSnapshot, Deck, Entry, Zone};
use crate::reorder::{self, DropTarget};
use crate::store::StoreWrite;

// ---------------------------------------------------------------------------
// DeckMutation
// ---------------------------------------------------------------------------

/// A proposed change to deck state. Legality is evaluated inside `apply`;
/// a denied mutation leaves the state untouched.
#[derive(Debug, Clone)]
pub enum DeckMutation {
    /// Add `qty` copies into a zone, or into the card's default zone when
    /// `zone_id` is `None`. Merges into an existing same-card entry in the
    /// same zone as a quantity increment.
    AddCard {
        card: CardSnapshot,
        zone_id: Option<String>,
        qty: u32,
    },
    /// Install a commander, applying the configured replacement policy when
    /// the Commander zone is already occupied.
    SetCommander {
        card: CardSnapshot,
        policy: CommanderPolicy,
    },
    IncrementQty { entry_id: String },
    /// Decrementing to zero deletes the entry.
    DecrementQty { entry_id: String },
    /// Always allowed; never re-validates the rest of the deck.
    RemoveEntry { entry_id: String },
    /// Drag-and-drop move, planned by the reorder module.
    MoveEntry {
        entry_id: String,
        dest_zone_id: String,
        target: DropTarget,
    },
    /// Replace an entry's stored snapshot with a freshly fetched catalog
    /// record. Staleness is the caller's concern.
    RefreshSnapshot {
        entry_id: String,
        card: CardSnapshot,
    },
}

// ---------------------------------------------------------------------------
// DeckState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckState {
    deck: Deck,
    zones: Vec<Zone>,
    entries: Vec<Entry>,
}

impl DeckState {
    /// Fresh state for a new deck, seeded with the default zone set.
    pub fn seeded(deck: Deck) -> Self {
        let zones = config::DEFAULT_ZONES
            .iter()
            .enumerate()
            .map(|(idx, name)| Zone::new(&deck.id, *name, idx as u32))
            .collect();
        Self {
            deck,
            zones,
            entries: Vec::new(),
        }
    }

    /// Assemble state from records loaded out of a store. Zones are kept in
    /// display order.
    pub fn from_parts(deck: Deck, mut zones: Vec<Zone>, entries: Vec<Entry>) -> Self {
        zones.sort_by_key(|z| z.display_order);
        Self {
            deck,
            zones,
            entries,
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Entries in deck iteration order (global sort position, then age).
    pub fn entries(&self) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        entries
    }

    pub fn entry(&self, entry_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == entry_id)
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.id == zone_id)
    }

    pub fn zone_by_name(&self, name: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.name.eq_ignore_ascii_case(name))
    }

    /// The distinguished Commander zone, if the deck has one.
    pub fn commander_zone(&self) -> Option<&Zone> {
        self.zones.iter().find(|z| z.is_commander())
    }

    /// Entries of one zone, ordered by sort position.
    pub fn entries_in_zone(&self, zone_id: &str) -> Vec<&Entry> {
        let mut entries: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.zone_id == zone_id)
            .collect();
        entries.sort_by_key(|e| e.sort_order);
        entries
    }

    /// The designated commander entries: whatever occupies the Commander
    /// zone (0, 1, or 2 entries).
    pub fn commander_entries(&self) -> Vec<&Entry> {
        match self.commander_zone() {
            Some(zone) => self.entries_in_zone(&zone.id),
            None => Vec::new(),
        }
    }

    /// Deck color identity: the union over all commander-zone entries.
    /// Empty while no commander is designated (restriction inactive).
    pub fn color_identity(&self) -> ColorSet {
        self.commander_entries()
            .iter()
            .flat_map(|e| facts::color_identity(&e.card))
            .collect()
    }

    /// Total quantity across the deck for a folded card name. Saturates at
    /// `u32::MAX` rather than overflowing on absurd unlimited-copy counts.
    pub fn name_total(&self, folded_name: &str) -> u32 {
        self.entries
            .iter()
            .filter(|e| facts::normalize_name(&e.card.name) == folded_name)
            .fold(0u32, |total, e| total.saturating_add(e.qty))
    }

    /// Quantity totals for every folded card name in the deck.
    pub fn name_totals(&self) -> HashMap<String, u32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            let total = totals
                .entry(facts::normalize_name(&entry.card.name))
                .or_insert(0u32);
            *total = total.saturating_add(entry.qty);
        }
        totals
    }

    /// Zone a card lands in when none is given: its type classification, the
    /// Maybe zone when that classification has no zone here, else the first
    /// zone.
    pub fn resolve_zone_for(&self, card: &CardSnapshot) -> Option<&Zone> {
        self.zone_by_name(facts::classify_default_zone(card))
            .or_else(|| self.zone_by_name("Maybe"))
            .or_else(|| self.zones.first())
    }

    // -- Invariant check ---------------------------------------------------

    /// Verify the structural invariants. Violations are defects, not user
    /// errors.
    pub fn check_invariants(&self) -> Result<()> {
        for zone in &self.zones {
            let entries = self.entries_in_zone(&zone.id);
            for (idx, entry) in entries.iter().enumerate() {
                if entry.sort_order != idx as u32 {
                    return Err(DeckboardError::Invariant(format!(
                        "zone {} has sort_order {} at index {}",
                        zone.name, entry.sort_order, idx
                    )));
                }
            }
        }
        if let Some(entry) = self.entries.iter().find(|e| e.qty == 0) {
            return Err(DeckboardError::Invariant(format!(
                "entry {} has quantity zero",
                entry.id
            )));
        }
        if self.commander_entries().len() > config::MAX_COMMANDERS {
            return Err(DeckboardError::Invariant(
                "Commander zone holds more than two entries".to_string(),
            ));
        }
        Ok(())
    }

    // -- Transition --------------------------------------------------------

    /// Evaluate and apply a mutation, returning the successor state and the
    /// writes that persist it. The receiver is untouched; on any error no
    /// partial successor escapes.
    pub fn apply(&self, mutation: &DeckMutation) -> Result<(DeckState, Vec<StoreWrite>)> {
        match mutation {
            DeckMutation::AddCard { card, zone_id, qty } => self.apply_add(card, zone_id.as_deref(), *qty),
            DeckMutation::SetCommander { card, policy } => self.apply_set_commander(card, *policy),
            DeckMutation::IncrementQty { entry_id } => self.apply_increment(entry_id),
            DeckMutation::DecrementQty { entry_id } => self.apply_decrement(entry_id),
            DeckMutation::RemoveEntry { entry_id } => self.apply_remove(entry_id),
            DeckMutation::MoveEntry {
                entry_id,
                dest_zone_id,
                target,
            } => self.apply_move(entry_id, dest_zone_id, target),
            DeckMutation::RefreshSnapshot { entry_id, card } => {
                self.apply_refresh(entry_id, card)
            }
        }
    }

    fn apply_refresh(
        &self,
        entry_id: &str,
        card: &CardSnapshot,
    ) -> Result<(DeckState, Vec<StoreWrite>)> {
        self.require_entry(entry_id)?;
        let mut next = self.clone();
        let entry = next
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .expect("entry existed in source state");
        entry.card = card.clone();
        entry.touch();
        let write = StoreWrite::UpdateSnapshot {
            entry_id: entry.id.clone(),
            card: card.clone(),
        };
        Ok((next, vec![write]))
    }

    fn apply_add(
        &self,
        card: &CardSnapshot,
        zone_id: Option<&str>,
        qty: u32,
    ) -> Result<(DeckState, Vec<StoreWrite>)> {
        if qty == 0 {
            return Err(DeckboardError::Invariant(
                "cannot add zero copies".to_string(),
            ));
        }
        let zone_id = match zone_id {
            Some(id) => self
                .zone(id)
                .map(|z| z.id.clone())
                .ok_or_else(|| DeckboardError::Invariant(format!("unknown zone {}", id)))?,
            None => self
                .resolve_zone_for(card)
                .map(|z| z.id.clone())
                .ok_or_else(|| DeckboardError::Invariant("deck has no zones".to_string()))?,
        };

        legality::check_placement(self, card, &zone_id, qty)?;

        let mut next = self.clone();
        let mut writes = Vec::new();

        let existing = next
            .entries
            .iter_mut()
            .find(|e| e.zone_id == zone_id && e.card.id == card.id);
        match existing {
            Some(entry) => {
                entry.qty = entry.qty.saturating_add(qty);
                entry.touch();
                writes.push(StoreWrite::UpdateQty {
                    entry_id: entry.id.clone(),
                    qty: entry.qty,
                });
            }
            None => {
                let sort_order = next.entries_in_zone(&zone_id).len() as u32;
                let entry = Entry::new(&next.deck.id, &zone_id, card.clone(), qty, sort_order);
                writes.push(StoreWrite::InsertEntry(entry.clone()));
                next.entries.push(entry);
            }
        }

        Ok((next, writes))
    }

    fn apply_set_commander(
        &self,
        card: &CardSnapshot,
        policy: CommanderPolicy,
    ) -> Result<(DeckState, Vec<StoreWrite>)> {
        let commander_zone = self
            .commander_zone()
            .ok_or_else(|| DeckboardError::NotFound("no Commander zone in this deck".to_string()))?
            .clone();

        if !facts::is_commander_eligible(card) {
            return Err(legality::DenyReason::NotCommanderEligible.into());
        }

        let mut next = self.clone();
        let mut writes = Vec::new();

        // Re-installing the sitting commander is a no-op.
        if self
            .entries_in_zone(&commander_zone.id)
            .iter()
            .any(|e| e.card.id == card.id)
        {
            return Ok((self.clone(), Vec::new()));
        }

        let occupants: Vec<String> = next
            .entries_in_zone(&commander_zone.id)
            .iter()
            .map(|e| e.id.clone())
            .collect();

        if !occupants.is_empty() {
            match policy {
                CommanderPolicy::Deny => {
                    return Err(legality::DenyReason::CommanderSlotOccupied.into());
                }
                CommanderPolicy::Displace => {
                    let fallback_id = next.ensure_zone(config::FALLBACK_ZONE, &mut writes);
                    let mut append_at = next.entries_in_zone(&fallback_id).len() as u32;
                    for id in &occupants {
                        let entry = next
                            .entries
                            .iter_mut()
                            .find(|e| e.id == *id)
                            .ok_or_else(|| {
                                DeckboardError::Invariant(format!("displaced entry {} vanished", id))
                            })?;
                        entry.zone_id = fallback_id.clone();
                        entry.sort_order = append_at;
                        entry.touch();
                        writes.push(StoreWrite::Reposition(reorder::Reposition {
                            entry_id: entry.id.clone(),
                            zone_id: fallback_id.clone(),
                            sort_order: append_at,
                        }));
                        append_at += 1;
                    }
                }
            }
        }

        // Copy limit against the post-displacement state: the new commander
        // may already be in the deck elsewhere.
        legality::check_placement(&next, card, &commander_zone.id, 1)?;

        let entry = Entry::new(&next.deck.id, &commander_zone.id, card.clone(), 1, 0);
        writes.push(StoreWrite::InsertEntry(entry.clone()));
        next.entries.push(entry);

        Ok((next, writes))
    }

    fn apply_increment(&self, entry_id: &str) -> Result<(DeckState, Vec<StoreWrite>)> {
        let entry = self.require_entry(entry_id)?;
        legality::check_placement(self, &entry.card, &entry.zone_id, 1)?;

        let mut next = self.clone();
        let entry = next
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .expect("entry existed in source state");
        entry.qty = entry.qty.saturating_add(1);
        entry.touch();
        let write = StoreWrite::UpdateQty {
            entry_id: entry.id.clone(),
            qty: entry.qty,
        };
        Ok((next, vec![write]))
    }

    fn apply_decrement(&self, entry_id: &str) -> Result<(DeckState, Vec<StoreWrite>)> {
        let entry = self.require_entry(entry_id)?;
        if entry.qty <= 1 {
            return self.apply_remove(entry_id);
        }
        let mut next = self.clone();
        let entry = next
            .entries
            .iter_mut()
            .find(|e| e.id == entry_id)
            .expect("entry existed in source state");
        entry.qty -= 1;
        entry.touch();
        let write = StoreWrite::UpdateQty {
            entry_id: entry.id.clone(),
            qty: entry.qty,
        };
        Ok((next, vec![write]))
    }

    fn apply_remove(&self, entry_id: &str) -> Result<(DeckState, Vec<StoreWrite>)> {
        let entry = self.require_entry(entry_id)?;
        let zone_id = entry.zone_id.clone();
        let removed_order = entry.sort_order;

        let mut next = self.clone();
        next.entries.retain(|e| e.id != entry_id);

        let mut writes = vec![StoreWrite::DeleteEntry {
            entry_id: entry_id.to_string(),
        }];

        // Close the gap the removal left behind.
        for entry in next
            .entries
            .iter_mut()
            .filter(|e| e.zone_id == zone_id && e.sort_order > removed_order)
        {
            entry.sort_order -= 1;
            entry.touch();
            writes.push(StoreWrite::Reposition(reorder::Reposition {
                entry_id: entry.id.clone(),
                zone_id: zone_id.clone(),
                sort_order: entry.sort_order,
            }));
        }

        Ok((next, writes))
    }

    fn apply_move(
        &self,
        entry_id: &str,
        dest_zone_id: &str,
        target: &DropTarget,
    ) -> Result<(DeckState, Vec<StoreWrite>)> {
        let entry = self.require_entry(entry_id)?;
        legality::check_move(self, entry_id, &entry.card, dest_zone_id)?;

        let plan = reorder::plan_move(self, entry_id, dest_zone_id, target)?;

        let mut next = self.clone();
        let mut writes = Vec::with_capacity(plan.len());
        for update in plan {
            let entry = next
                .entries
                .iter_mut()
                .find(|e| e.id == update.entry_id)
                .ok_or_else(|| {
                    DeckboardError::Invariant(format!("planned entry {} vanished", update.entry_id))
                })?;
            entry.zone_id = update.zone_id.clone();
            entry.sort_order = update.sort_order;
            entry.touch();
            writes.push(StoreWrite::Reposition(update));
        }

        Ok((next, writes))
    }

    // -- Internal helpers --------------------------------------------------

    fn require_entry(&self, entry_id: &str) -> Result<&Entry> {
        self.entry(entry_id)
            .ok_or_else(|| DeckboardError::Invariant(format!("unknown entry {}", entry_id)))
    }

    /// Find a zone by name or create it after the current last position.
    fn ensure_zone(&mut self, name: &str, writes: &mut Vec<StoreWrite>) -> String {
        if let Some(zone) = self.zone_by_name(name) {
            return zone.id.clone();
        }
        let next_order = self
            .zones
            .iter()
            .map(|z| z.display_order + 1)
            .max()
            .unwrap_or(0);
        let zone = Zone::new(&self.deck.id, name, next_order);
        let id = zone.id.clone();
        writes.push(StoreWrite::InsertZone(zone.clone()));
        self.zones.push(zone);
        id
    }
}
