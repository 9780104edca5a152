//! Commander deckbuilding engine.
//!
//! Maintains a deck as named zones (columns) of ordered card entries and
//! enforces the format's deckbuilding rules as cards are added, moved, and
//! counted: singleton copy limits, commander eligibility, and color-identity
//! containment. Aggregate statistics (mana curve, pip distribution, rough
//! ramp/draw counts, price total) are recomputed on every change.
//!
//! Persistence and card lookup are collaborators behind the [`DeckStore`]
//! and [`CardCatalog`] traits; the engine itself is pure state plus
//! transition functions.
//!
//! # Quick start
//!
//! ```no_run
//! use deckboard::{CardCatalog, DeckSession, MemoryStore, ScryfallCatalog};
//!
//! let catalog = ScryfallCatalog::new().unwrap();
//! let mut session = DeckSession::new(MemoryStore::new(), catalog);
//! session.create_deck("Atraxa Superfriends").unwrap();
//!
//! // Resolve a card and drop it into its default zone
//! let results = session.catalog().search("sol ring").unwrap();
//! session.add_card(results[0].clone(), None).unwrap();
//!
//! println!("{}", session.decklist_text().unwrap());
//! ```

pub mod catalog;
pub mod config;
pub mod decklist;
pub mod error;
pub mod facts;
pub mod legality;
pub mod models;
pub mod reorder;
pub mod session;
pub mod state;
pub mod stats;
pub mod store;

pub use catalog::{CardCatalog, ScryfallCatalog};
pub use error::{DeckboardError, Result};
pub use legality::{CommanderPolicy, DeckAudit, DenyReason};
pub use models::{CardSnapshot, Deck, Entry, Zone};
pub use reorder::DropTarget;
pub use session::{DeckSession, ImportReport};
pub use state::{DeckMutation, DeckState};
pub use stats::DeckStats;
pub use store::{DeckStore, MemoryStore, StoreWrite};
