//! Commander deckbuilding legality: per-mutation gating and the read-only
//! deck-wide audit.
//!
//! Every proposed add, increment, or move is checked here before any state
//! changes. Decrement and removal are always allowed and never re-validate
//! the rest of the deck; stale color-identity or copy-limit status after a
//! commander change is surfaced passively by [`audit`], not auto-corrected.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::config;
use crate::facts::{self, color_label, ColorSet, CopyLimit};
use crate::models::CardSnapshot;
use crate::state::DeckState;

// ---------------------------------------------------------------------------
// DenyReason
// ---------------------------------------------------------------------------

/// Why a proposed placement was rejected. Always recoverable: nothing was
/// mutated, and the message is suitable for direct display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DenyReason {
    NotCommanderEligible,
    CommanderSlotOccupied,
    ColorIdentityViolation {
        card_colors: ColorSet,
        deck_colors: ColorSet,
    },
    CopyLimitExceeded {
        name: String,
        limit: u32,
        attempted: u32,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::NotCommanderEligible => write!(
                f,
                "that card is not commander-eligible (must be a legendary creature/planeswalker \
                 or say \"can be your commander\")"
            ),
            DenyReason::CommanderSlotOccupied => {
                write!(f, "the Commander zone is full; remove a commander first")
            }
            DenyReason::ColorIdentityViolation {
                card_colors,
                deck_colors,
            } => write!(
                f,
                "illegal color identity: {} is not allowed in {}",
                color_label(card_colors),
                color_label(deck_colors)
            ),
            DenyReason::CopyLimitExceeded {
                name,
                limit,
                attempted,
            } => write!(
                f,
                "too many copies of \"{}\": {} of {} allowed",
                name, attempted, limit
            ),
        }
    }
}

/// What to do when a commander is set while one is already designated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommanderPolicy {
    /// Reject the new commander outright.
    Deny,
    /// Park the previous commander entries in the fallback zone, then install
    /// the new one. The displaced entries keep quantity and snapshot.
    #[default]
    Displace,
}

// ---------------------------------------------------------------------------
// Per-mutation checks
// ---------------------------------------------------------------------------

/// Gate an add-or-increment of `added_qty` copies of `card` into `zone_id`.
///
/// Checks run in a fixed order: commander-zone eligibility and occupancy,
/// then color identity, then the deck-wide copy limit.
pub fn check_placement(
    state: &DeckState,
    card: &CardSnapshot,
    zone_id: &str,
    added_qty: u32,
) -> Result<(), DenyReason> {
    let into_commander = state
        .zone(zone_id)
        .map(|z| z.is_commander())
        .unwrap_or(false);

    if into_commander {
        check_commander_admission(state, card, None)?;
    } else if !state.commander_entries().is_empty() {
        check_color_identity(state, card)?;
    }

    check_copy_limit(state, card, added_qty)
}

/// Gate moving an existing entry into `dest_zone_id`. The moving entry is
/// excluded from the commander occupancy count; copy totals are unchanged by
/// a move, so the copy limit is not re-checked.
pub fn check_move(
    state: &DeckState,
    entry_id: &str,
    card: &CardSnapshot,
    dest_zone_id: &str,
) -> Result<(), DenyReason> {
    let into_commander = state
        .zone(dest_zone_id)
        .map(|z| z.is_commander())
        .unwrap_or(false);

    if into_commander {
        check_commander_admission(state, card, Some(entry_id))?;
    } else if !state.commander_entries().is_empty() {
        check_color_identity(state, card)?;
    }
    Ok(())
}

/// Commander-zone admission: the card must be eligible, and the zone holds at
/// most [`config::MAX_COMMANDERS`] entries (partner pairs).
fn check_commander_admission(
    state: &DeckState,
    card: &CardSnapshot,
    moving_entry: Option<&str>,
) -> Result<(), DenyReason> {
    if !facts::is_commander_eligible(card) {
        return Err(DenyReason::NotCommanderEligible);
    }
    let occupants = state
        .commander_entries()
        .iter()
        .filter(|e| Some(e.id.as_str()) != moving_entry)
        .filter(|e| e.card.id != card.id)
        .count();
    if occupants >= config::MAX_COMMANDERS {
        return Err(DenyReason::CommanderSlotOccupied);
    }
    Ok(())
}

/// Subset test against the deck's color identity. The empty set is always a
/// subset, so colorless cards pass regardless of the commander.
fn check_color_identity(state: &DeckState, card: &CardSnapshot) -> Result<(), DenyReason> {
    let deck_colors = state.color_identity();
    let card_colors = facts::color_identity(card);
    if card_colors.is_subset(&deck_colors) {
        Ok(())
    } else {
        Err(DenyReason::ColorIdentityViolation {
            card_colors,
            deck_colors,
        })
    }
}

fn check_copy_limit(
    state: &DeckState,
    card: &CardSnapshot,
    added_qty: u32,
) -> Result<(), DenyReason> {
    let limit = facts::copy_limit(card);
    let key = facts::normalize_name(&card.name);
    let attempted = state.name_total(&key).saturating_add(added_qty);
    if limit.permits(attempted) {
        Ok(())
    } else {
        let CopyLimit::Limited(n) = limit else {
            unreachable!()
        };
        Err(DenyReason::CopyLimitExceeded {
            name: card.name.clone(),
            limit: n,
            attempted,
        })
    }
}

// ---------------------------------------------------------------------------
// Deck-wide audit
// ---------------------------------------------------------------------------

/// One entry whose placement violates color identity or commander-zone rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorFinding {
    pub entry_id: String,
    pub name: String,
    pub reason: String,
}

/// One card name whose summed quantity exceeds its copy limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyFinding {
    pub name: String,
    pub total: u32,
    pub limit: u32,
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckAudit {
    pub color_findings: Vec<ColorFinding>,
    pub copy_findings: Vec<CopyFinding>,
}

impl DeckAudit {
    pub fn is_clean(&self) -> bool {
        self.color_findings.is_empty() && self.copy_findings.is_empty()
    }
}

/// Read-only pass over the full entry set.
///
/// Finds non-commander entries whose colors fall outside the deck identity,
/// commander-zone entries that are ineligible or hold more than one copy,
/// and names whose total quantity exceeds the copy limit. This is how the UI
/// surfaces "fix" actions; it never mutates state.
pub fn audit(state: &DeckState) -> DeckAudit {
    let mut out = DeckAudit::default();
    let commander_zone_id = state.commander_zone().map(|z| z.id.clone());
    let commander_set = !state.commander_entries().is_empty();
    let deck_colors = state.color_identity();

    // Copy totals grouped by folded name.
    let mut by_name: BTreeMap<String, (String, u32, CopyLimit, Vec<String>)> = BTreeMap::new();

    for entry in state.entries() {
        let card = &entry.card;
        if card.name.trim().is_empty() {
            continue;
        }

        if commander_zone_id.as_deref() == Some(entry.zone_id.as_str()) {
            if !facts::is_commander_eligible(card) {
                out.color_findings.push(ColorFinding {
                    entry_id: entry.id.clone(),
                    name: card.name.clone(),
                    reason: "Not commander-eligible.".to_string(),
                });
            }
            if entry.qty > 1 {
                out.copy_findings.push(CopyFinding {
                    name: card.name.clone(),
                    total: entry.qty,
                    limit: 1,
                    entry_ids: vec![entry.id.clone()],
                });
            }
            // Commander copies count toward the deck-wide total; the fix
            // list only names rows outside the Commander zone.
            let slot = by_name
                .entry(facts::normalize_name(&card.name))
                .or_insert_with(|| (card.name.clone(), 0, facts::copy_limit(card), Vec::new()));
            slot.1 = slot.1.saturating_add(entry.qty);
            continue;
        }

        if commander_set {
            let colors = facts::color_identity(card);
            if !colors.is_subset(&deck_colors) {
                out.color_findings.push(ColorFinding {
                    entry_id: entry.id.clone(),
                    name: card.name.clone(),
                    reason: format!(
                        "Color identity {} not allowed in {}.",
                        color_label(&colors),
                        color_label(&deck_colors)
                    ),
                });
            }
        }

        let slot = by_name
            .entry(facts::normalize_name(&card.name))
            .or_insert_with(|| (card.name.clone(), 0, facts::copy_limit(card), Vec::new()));
        slot.1 = slot.1.saturating_add(entry.qty);
        slot.3.push(entry.id.clone());
    }

    for (_, (name, total, limit, entry_ids)) in by_name {
        if let CopyLimit::Limited(n) = limit {
            if total > n && !entry_ids.is_empty() {
                out.copy_findings.push(CopyFinding {
                    name,
                    total,
                    limit: n,
                    entry_ids,
                });
            }
        }
    }

    out
}
