pub const SCRYFALL_API: &str = "https://api.scryfall.com";

/// Deck format recorded on newly created decks.
pub const DEFAULT_FORMAT: &str = "commander";

/// Zones seeded into every new deck, in display order.
pub const DEFAULT_ZONES: [&str; 9] = [
    "Commander",
    "Creatures",
    "Instants",
    "Sorceries",
    "Artifacts",
    "Enchantments",
    "Planeswalkers",
    "Lands",
    "Maybe",
];

/// Name of the distinguished zone governing commander designation.
/// Matched case-insensitively against zone display names.
pub const COMMANDER_ZONE: &str = "Commander";

/// Zone a displaced commander is parked in. Created on demand.
pub const FALLBACK_ZONE: &str = "Sideboard";

/// A Commander zone holds at most this many designated entries
/// (partner / background pairs).
pub const MAX_COMMANDERS: usize = 2;

/// Cap on card search results surfaced per query.
pub const SEARCH_RESULT_CAP: usize = 40;
