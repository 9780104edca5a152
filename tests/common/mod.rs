//! Shared test fixtures for the deckboard integration tests.
//!
//! Provides card snapshot builders, a `StubCatalog` resolving names from a
//! fixed card pool, a `FlakyStore` wrapper that can be told to fail writes,
//! and `open_session()` which creates a seeded deck over a `MemoryStore`.
#![allow(dead_code)]

use std::collections::HashMap;

use deckboard::catalog::CardCatalog;
use deckboard::models::{CardPrices, CardSnapshot};
use deckboard::store::{ChangeListener, DeckStore};
use deckboard::{
    Deck, DeckSession, DeckState, DeckboardError, Entry, MemoryStore, Result, Zone,
};

// ---------------------------------------------------------------------------
// Snapshot builders
// ---------------------------------------------------------------------------

/// Build a snapshot with the fields the engine cares about. The catalog id
/// is derived from the name so fixtures are stable across tests.
pub fn snap(
    name: &str,
    type_line: &str,
    mana_cost: &str,
    cmc: f64,
    identity: &[&str],
    oracle: &str,
) -> CardSnapshot {
    CardSnapshot {
        id: format!("id-{}", name.to_lowercase().replace(' ', "-")),
        name: name.to_string(),
        mana_cost: (!mana_cost.is_empty()).then(|| mana_cost.to_string()),
        cmc: Some(cmc),
        type_line: Some(type_line.to_string()),
        oracle_text: (!oracle.is_empty()).then(|| oracle.to_string()),
        color_identity: identity.iter().map(|s| s.to_string()).collect(),
        set_code: Some("tst".to_string()),
        set_name: Some("Test Set".to_string()),
        rarity: Some("rare".to_string()),
        prices: None,
        image_uris: None,
        card_faces: None,
        tags: Default::default(),
    }
}

pub fn with_usd_price(mut card: CardSnapshot, usd: &str) -> CardSnapshot {
    card.prices = Some(CardPrices {
        usd: Some(usd.to_string()),
        ..Default::default()
    });
    card
}

pub fn sol_ring() -> CardSnapshot {
    with_usd_price(
        snap("Sol Ring", "Artifact", "{1}", 1.0, &[], "{T}: Add {C}{C}."),
        "1.50",
    )
}

pub fn forest() -> CardSnapshot {
    snap("Forest", "Basic Land — Forest", "", 0.0, &["G"], "({T}: Add {G}.)")
}

pub fn island() -> CardSnapshot {
    snap("Island", "Basic Land — Island", "", 0.0, &["U"], "({T}: Add {U}.)")
}

pub fn counterspell() -> CardSnapshot {
    snap(
        "Counterspell",
        "Instant",
        "{U}{U}",
        2.0,
        &["U"],
        "Counter target spell.",
    )
}

pub fn lightning_bolt() -> CardSnapshot {
    snap(
        "Lightning Bolt",
        "Instant",
        "{R}",
        1.0,
        &["R"],
        "Lightning Bolt deals 3 damage to any target.",
    )
}

pub fn divination() -> CardSnapshot {
    snap(
        "Divination",
        "Sorcery",
        "{2}{U}",
        3.0,
        &["U"],
        "Draw two cards.",
    )
}

pub fn cultivate() -> CardSnapshot {
    snap(
        "Cultivate",
        "Sorcery",
        "{2}{G}",
        3.0,
        &["G"],
        "Search your library for up to two basic land cards, reveal those cards, \
         and put one onto the battlefield tapped and the other into your hand.",
    )
}

/// Legendary creature with a {U}{B} identity, used as the default commander.
pub fn yuriko() -> CardSnapshot {
    snap(
        "Yuriko, the Tiger's Shadow",
        "Legendary Creature — Human Ninja",
        "{1}{U}{B}",
        3.0,
        &["U", "B"],
        "Commander ninjutsu {U}{B}",
    )
}

/// Legendary creature with a {U}{B}{R} identity.
pub fn grixis_commander() -> CardSnapshot {
    snap(
        "Nicol Bolas, the Ravager",
        "Legendary Creature — Elder Dragon",
        "{1}{U}{B}{R}",
        4.0,
        &["U", "B", "R"],
        "Flying",
    )
}

pub fn partner_red() -> CardSnapshot {
    snap(
        "Rograkh, Son of Rohgahh",
        "Legendary Creature — Kobold Warrior",
        "{0}",
        0.0,
        &["R"],
        "Partner",
    )
}

pub fn partner_white() -> CardSnapshot {
    snap(
        "Ardenn, Intrepid Archaeologist",
        "Legendary Creature — Kor Scout",
        "{2}{W}",
        3.0,
        &["W"],
        "Partner",
    )
}

pub fn seven_dwarves() -> CardSnapshot {
    snap(
        "Seven Dwarves",
        "Creature — Dwarf",
        "{R}",
        1.0,
        &["R"],
        "A deck can have up to seven cards named Seven Dwarves.",
    )
}

pub fn nazgul() -> CardSnapshot {
    snap(
        "Nazgûl",
        "Creature — Wraith Knight",
        "{2}{B}",
        3.0,
        &["B"],
        "A deck can have up to nine cards named Nazgûl.",
    )
}

pub fn petitioners() -> CardSnapshot {
    snap(
        "Persistent Petitioners",
        "Creature — Human Advisor",
        "{1}{U}",
        2.0,
        &["U"],
        "A deck can have any number of cards named Persistent Petitioners.",
    )
}

pub fn vehicle() -> CardSnapshot {
    snap(
        "Smuggler's Copter",
        "Artifact — Vehicle",
        "{2}",
        2.0,
        &[],
        "Flying. Crew 1",
    )
}

pub fn background() -> CardSnapshot {
    snap(
        "Raised by Giants",
        "Legendary Enchantment — Background",
        "{4}{G}",
        5.0,
        &["G"],
        "Doctor's companion (This card can be your commander.)",
    )
}

// ---------------------------------------------------------------------------
// StubCatalog — resolves names against a fixed pool
// ---------------------------------------------------------------------------

pub struct StubCatalog {
    by_name: HashMap<String, CardSnapshot>,
}

impl StubCatalog {
    pub fn new(pool: &[CardSnapshot]) -> Self {
        let by_name = pool
            .iter()
            .map(|c| (deckboard::facts::normalize_name(&c.name), c.clone()))
            .collect();
        Self { by_name }
    }

    pub fn empty() -> Self {
        Self::new(&[])
    }
}

impl CardCatalog for StubCatalog {
    fn search(&self, query: &str) -> Result<Vec<CardSnapshot>> {
        let needle = deckboard::facts::normalize_name(query);
        Ok(self
            .by_name
            .values()
            .filter(|c| deckboard::facts::normalize_name(&c.name).contains(&needle))
            .cloned()
            .collect())
    }

    fn named(&self, name: &str) -> Result<Option<CardSnapshot>> {
        Ok(self
            .by_name
            .get(&deckboard::facts::normalize_name(name))
            .cloned())
    }

    fn by_id(&self, id: &str) -> Result<Option<CardSnapshot>> {
        Ok(self.by_name.values().find(|c| c.id == id).cloned())
    }
}

// ---------------------------------------------------------------------------
// FlakyStore — MemoryStore wrapper that can fail writes on demand
// ---------------------------------------------------------------------------

pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: bool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: false,
        }
    }

    fn gate(&self) -> Result<()> {
        if self.fail_writes {
            Err(DeckboardError::Persistence("simulated outage".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DeckStore for FlakyStore {
    fn insert_deck(&mut self, deck: &Deck) -> Result<()> {
        self.gate()?;
        self.inner.insert_deck(deck)
    }

    fn get_deck(&self, deck_id: &str) -> Result<Option<Deck>> {
        self.inner.get_deck(deck_id)
    }

    fn list_decks(&self) -> Result<Vec<Deck>> {
        self.inner.list_decks()
    }

    fn delete_deck(&mut self, deck_id: &str) -> Result<()> {
        self.gate()?;
        self.inner.delete_deck(deck_id)
    }

    fn insert_zone(&mut self, zone: &Zone) -> Result<()> {
        self.gate()?;
        self.inner.insert_zone(zone)
    }

    fn list_zones(&self, deck_id: &str) -> Result<Vec<Zone>> {
        self.inner.list_zones(deck_id)
    }

    fn insert_entry(&mut self, entry: &Entry) -> Result<()> {
        self.gate()?;
        self.inner.insert_entry(entry)
    }

    fn update_entry_qty(&mut self, entry_id: &str, qty: u32) -> Result<()> {
        self.gate()?;
        self.inner.update_entry_qty(entry_id, qty)
    }

    fn update_entry_snapshot(&mut self, entry_id: &str, card: &CardSnapshot) -> Result<()> {
        self.gate()?;
        self.inner.update_entry_snapshot(entry_id, card)
    }

    fn delete_entry(&mut self, entry_id: &str) -> Result<()> {
        self.gate()?;
        self.inner.delete_entry(entry_id)
    }

    fn reposition_entry(&mut self, entry_id: &str, zone_id: &str, sort_order: u32) -> Result<()> {
        self.gate()?;
        self.inner.reposition_entry(entry_id, zone_id, sort_order)
    }

    fn list_entries(&self, deck_id: &str) -> Result<Vec<Entry>> {
        self.inner.list_entries(deck_id)
    }

    fn subscribe(&mut self, deck_id: &str, listener: ChangeListener) -> Result<()> {
        self.inner.subscribe(deck_id, listener)
    }

    fn change_seq(&self) -> u64 {
        self.inner.change_seq()
    }
}

// ---------------------------------------------------------------------------
// Session helpers
// ---------------------------------------------------------------------------

/// A session over a fresh deck seeded with the default zones, with the given
/// card pool available through the catalog.
pub fn open_session(pool: &[CardSnapshot]) -> DeckSession<MemoryStore, StubCatalog> {
    let mut session = DeckSession::new(MemoryStore::new(), StubCatalog::new(pool));
    session.create_deck("Test Deck").unwrap();
    session
}

/// Zone id for a zone name in the session's open deck.
pub fn zone_id(state: &DeckState, name: &str) -> String {
    state
        .zone_by_name(name)
        .unwrap_or_else(|| panic!("no zone named {}", name))
        .id
        .clone()
}

/// Entry id of the first entry whose card has the given name.
pub fn entry_id_by_name(state: &DeckState, name: &str) -> String {
    state
        .entries()
        .iter()
        .find(|e| e.card.name == name)
        .unwrap_or_else(|| panic!("no entry named {}", name))
        .id
        .clone()
}

/// Sort orders of a zone's entries, in zone order.
pub fn orders(state: &DeckState, zone_id: &str) -> Vec<u32> {
    state
        .entries_in_zone(zone_id)
        .iter()
        .map(|e| e.sort_order)
        .collect()
}

/// Card names of a zone's entries, in zone order.
pub fn names(state: &DeckState, zone_id: &str) -> Vec<String> {
    state
        .entries_in_zone(zone_id)
        .iter()
        .map(|e| e.card.name.clone())
        .collect()
}
