//! Pure derivations over a [`CardSnapshot`]: color identity, mana value and
//! pips, type classification, commander eligibility, and copy limits.
//!
//! `detect_ramp` and `detect_draw` are keyword heuristics over free-form
//! rules text. They are best-effort classifiers, not authoritative: false
//! positives and negatives are expected and acceptable.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::models::CardSnapshot;

// ---------------------------------------------------------------------------
// Color — Mana-color symbol
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    W,
    U,
    B,
    R,
    G,
    C,
}

impl Color {
    pub const ALL: [Color; 6] = [Color::W, Color::U, Color::B, Color::R, Color::G, Color::C];

    /// Parse a single mana symbol component ("w", "U", ...). Unrecognized
    /// symbols (numerics, "X", "P", "S", ...) return `None`.
    pub fn from_symbol(sym: &str) -> Option<Color> {
        match sym.trim() {
            "W" | "w" => Some(Color::W),
            "U" | "u" => Some(Color::U),
            "B" | "b" => Some(Color::B),
            "R" | "r" => Some(Color::R),
            "G" | "g" => Some(Color::G),
            "C" | "c" => Some(Color::C),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Color::W => "W",
            Color::U => "U",
            Color::B => "B",
            Color::R => "R",
            Color::G => "G",
            Color::C => "C",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of mana-color symbols. Empty means colorless.
pub type ColorSet = BTreeSet<Color>;

/// Short display label for a color set: "WU", or "C" when empty.
pub fn color_label(colors: &ColorSet) -> String {
    if colors.is_empty() {
        return "C".to_string();
    }
    Color::ALL
        .iter()
        .filter(|c| colors.contains(c))
        .map(Color::as_str)
        .collect()
}

/// The card's declared color identity as a typed set. Unrecognized symbols
/// from the catalog are ignored.
pub fn color_identity(card: &CardSnapshot) -> ColorSet {
    card.color_identity
        .iter()
        .filter_map(|s| Color::from_symbol(s))
        .collect()
}

// ---------------------------------------------------------------------------
// Mana value and pips
// ---------------------------------------------------------------------------

/// Numeric mana value; 0 when the catalog reports none.
pub fn mana_value(card: &CardSnapshot) -> f64 {
    card.cmc.unwrap_or(0.0)
}

/// Per-color pip counts parsed from a bracketed mana cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPips {
    pub w: u32,
    pub u: u32,
    pub b: u32,
    pub r: u32,
    pub g: u32,
    pub c: u32,
}

impl ManaPips {
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::W => self.w,
            Color::U => self.u,
            Color::B => self.b,
            Color::R => self.r,
            Color::G => self.g,
            Color::C => self.c,
        }
    }

    fn bump(&mut self, color: Color) {
        match color {
            Color::W => self.w += 1,
            Color::U => self.u += 1,
            Color::B => self.b += 1,
            Color::R => self.r += 1,
            Color::G => self.g += 1,
            Color::C => self.c += 1,
        }
    }

    /// Accumulate `other` scaled by a quantity.
    pub fn add_scaled(&mut self, other: &ManaPips, qty: u32) {
        self.w += other.w * qty;
        self.u += other.u * qty;
        self.b += other.b * qty;
        self.r += other.r * qty;
        self.g += other.g * qty;
        self.c += other.c * qty;
    }

    pub fn total(&self) -> u32 {
        self.w + self.u + self.b + self.r + self.g + self.c
    }
}

/// Parse a mana cost like `"{2}{W/U}{B}"` into pip counts.
///
/// Numeric tokens contribute no pips. Hybrid tokens (slash-separated)
/// contribute one pip to each recognized component, so `{W/U}` counts one
/// white and one blue while `{2/U}` counts only blue. Unrecognized symbols
/// ("X", "P", snow, ...) are ignored silently.
pub fn parse_mana_pips(mana_cost: &str) -> ManaPips {
    let mut pips = ManaPips::default();
    let mut rest = mana_cost;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let inner = &rest[open + 1..open + close];
        rest = &rest[open + close + 1..];

        if !inner.is_empty() && inner.chars().all(|ch| ch.is_ascii_digit()) {
            continue;
        }
        for part in inner.split('/') {
            if let Some(color) = Color::from_symbol(part) {
                pips.bump(color);
            }
        }
    }
    pips
}

// ---------------------------------------------------------------------------
// Type classification
// ---------------------------------------------------------------------------

fn type_line_lower(card: &CardSnapshot) -> String {
    card.type_line.as_deref().unwrap_or("").to_lowercase()
}

fn oracle_lower(card: &CardSnapshot) -> String {
    card.oracle_text.as_deref().unwrap_or("").to_lowercase()
}

pub fn is_land(card: &CardSnapshot) -> bool {
    type_line_lower(card).contains("land")
}

pub fn is_basic_land(card: &CardSnapshot) -> bool {
    let t = type_line_lower(card);
    t.contains("basic") && t.contains("land")
}

/// Default placement zone for a card, by type-line substring.
///
/// The vehicle check must precede the artifact check: vehicles are also
/// artifacts. The returned name may not exist as a zone in a given deck
/// ("Vehicles"); placement resolution falls back in that case.
pub fn classify_default_zone(card: &CardSnapshot) -> &'static str {
    let t = type_line_lower(card);
    if t.contains("land") {
        "Lands"
    } else if t.contains("creature") {
        "Creatures"
    } else if t.contains("instant") {
        "Instants"
    } else if t.contains("sorcery") {
        "Sorceries"
    } else if t.contains("vehicle") {
        "Vehicles"
    } else if t.contains("artifact") {
        "Artifacts"
    } else if t.contains("enchantment") {
        "Enchantments"
    } else if t.contains("planeswalker") {
        "Planeswalkers"
    } else {
        "Maybe"
    }
}

/// A legendary creature or planeswalker, or a card whose rules text grants
/// commander eligibility explicitly.
pub fn is_commander_eligible(card: &CardSnapshot) -> bool {
    let t = type_line_lower(card);
    if t.contains("legendary") && (t.contains("creature") || t.contains("planeswalker")) {
        return true;
    }
    oracle_lower(card).contains("can be your commander")
}

// ---------------------------------------------------------------------------
// Copy limits (Commander singleton)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyLimit {
    Limited(u32),
    Unlimited,
}

impl CopyLimit {
    /// Whether a total of `total` copies stays within the limit.
    pub fn permits(&self, total: u32) -> bool {
        match self {
            CopyLimit::Unlimited => true,
            CopyLimit::Limited(n) => total <= *n,
        }
    }
}

impl fmt::Display for CopyLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyLimit::Unlimited => f.write_str("unlimited"),
            CopyLimit::Limited(n) => write!(f, "{}", n),
        }
    }
}

/// Named cards whose printed rules text raises the copy limit to a specific
/// number rather than removing it. Keys are folded names.
const LIMIT_EXCEPTIONS: [(&str, u32); 2] = [("seven dwarves", 7), ("nazgul", 9)];

/// Maximum total quantity allowed for this card by name across the deck.
///
/// Basic lands and cards carrying the any-number-of-copies clause are
/// unlimited; a small allow list raises the limit for named exceptions;
/// everything else is singleton.
pub fn copy_limit(card: &CardSnapshot) -> CopyLimit {
    if is_basic_land(card) {
        return CopyLimit::Unlimited;
    }
    if oracle_lower(card).contains("a deck can have any number of cards named") {
        return CopyLimit::Unlimited;
    }
    let folded = normalize_name(&card.name);
    for (name, limit) in LIMIT_EXCEPTIONS {
        if folded == name {
            return CopyLimit::Limited(limit);
        }
    }
    CopyLimit::Limited(1)
}

// ---------------------------------------------------------------------------
// Ramp / draw heuristics
// ---------------------------------------------------------------------------

/// Rough mana-acceleration detector: mana abilities, treasure tokens, and
/// land tutoring. Heuristic only.
pub fn detect_ramp(card: &CardSnapshot) -> bool {
    let text = oracle_lower(card);
    if text.is_empty() {
        return false;
    }
    if text.contains("add {") {
        return true;
    }
    if text.contains("create a treasure") || text.contains("treasure token") {
        return true;
    }
    if text.contains("search your library") && text.contains("land") {
        return true;
    }
    if text.contains("put a land card") && text.contains("onto the battlefield") {
        return true;
    }
    false
}

/// Rough card-advantage detector. Heuristic only.
pub fn detect_draw(card: &CardSnapshot) -> bool {
    let text = oracle_lower(card);
    if text.is_empty() {
        return false;
    }
    if text.contains("draw a card")
        || text.contains("draw two cards")
        || text.contains("draw three cards")
    {
        return true;
    }
    text.contains("whenever") && text.contains("draw")
}

// ---------------------------------------------------------------------------
// Name folding
// ---------------------------------------------------------------------------

/// Case- and diacritic-insensitive grouping key for card names.
///
/// Used everywhere duplicates are detected or copy limits are summed, so
/// "Nazgûl" and "nazgul" count as the same card.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
