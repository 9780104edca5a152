//! Plain-text decklist export and import.
//!
//! The interchange shape is one line per entry, `<qty> <name>`, in deck
//! iteration order and not grouped by zone. External combo-detection and
//! deck-analysis tools consume exactly this shape. Import accepts the same
//! lines with optional quantity and an optional trailing "x" ("1 Sol Ring",
//! "2x Swamp", "Arcane Signet").

use crate::facts::normalize_name;
use crate::state::DeckState;

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Render the deck's entries as decklist text, omitting zero-quantity rows.
pub fn build_decklist_text(state: &DeckState) -> String {
    state
        .entries()
        .iter()
        .filter(|e| e.qty > 0 && !e.card.name.is_empty())
        .map(|e| format!("{} {}", e.qty, e.card.name))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// One parsed decklist line after duplicate merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecklistLine {
    pub qty: u32,
    pub name: String,
}

/// Parse decklist text into `(qty, name)` lines.
///
/// Lines sharing a folded name are merged into one with summed quantity,
/// keeping first-seen spelling and order. Blank lines and zero-quantity
/// results are dropped.
pub fn parse_decklist(text: &str) -> Vec<DecklistLine> {
    let mut lines: Vec<DecklistLine> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for raw in text.lines() {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Some((qty, name)) = parse_line(raw) else {
            continue;
        };
        let key = normalize_name(&name);
        match index.get(&key) {
            Some(&i) => lines[i].qty += qty,
            None => {
                index.insert(key, lines.len());
                lines.push(DecklistLine { qty, name });
            }
        }
    }

    lines.retain(|l| l.qty > 0);
    lines
}

/// Split one line into quantity and name. A line with no parseable quantity
/// prefix is a bare name with quantity 1; a quantity with nothing after it
/// is skipped.
fn parse_line(line: &str) -> Option<(u32, String)> {
    let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        let rest = &line[digits.len()..];
        // A quantity with no name after it is not a card line.
        if rest.trim().is_empty() {
            return None;
        }
        if let Ok(qty) = digits.parse::<u32>() {
            // "2x Name" / "2 x Name"
            let trimmed = rest.trim_start();
            if let Some(after_x) = trimmed.strip_prefix(&['x', 'X'][..]) {
                if after_x.starts_with(char::is_whitespace) {
                    let name = after_x.trim().to_string();
                    if !name.is_empty() {
                        return Some((qty, name));
                    }
                }
            }
            // "2 Name" — quantity must be separated by whitespace.
            if rest.starts_with(char::is_whitespace) {
                let name = trimmed.to_string();
                if !name.is_empty() {
                    return Some((qty, name));
                }
            }
        }
    }
    Some((1, line.to_string()))
}
