//! Drag-and-drop move planning.
//!
//! Given the moved entry, its destination zone, and a drop target, computes
//! the minimal set of `(entry, zone, sort_order)` updates that restore the
//! dense 0-based ordering invariant in every zone the move touches. Legality
//! is the caller's concern and is evaluated before planning; a plan is never
//! partially applied.

use serde::Serialize;

use crate::error::{DeckboardError, Result};
use crate::state::DeckState;

// ---------------------------------------------------------------------------
// DropTarget / Reposition
// ---------------------------------------------------------------------------

/// Where the dragged entry was dropped inside the destination zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Dropped onto a specific entry: insert at that entry's index.
    Entry(String),
    /// Dropped onto the zone itself: append at the end.
    ZoneEnd,
}

/// One persisted ordering update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reposition {
    pub entry_id: String,
    pub zone_id: String,
    pub sort_order: u32,
}

// ---------------------------------------------------------------------------
// plan_move
// ---------------------------------------------------------------------------

/// Plan the ordering updates for moving `entry_id` into `dest_zone_id`.
///
/// A same-zone move is a remove-and-reinsert within one list; a cross-zone
/// move removes from the source list and inserts into the destination list.
/// Only rows whose `(zone, sort_order)` actually change are emitted.
pub fn plan_move(
    state: &DeckState,
    entry_id: &str,
    dest_zone_id: &str,
    target: &DropTarget,
) -> Result<Vec<Reposition>> {
    let entry = state.entry(entry_id).ok_or_else(|| {
        DeckboardError::Invariant(format!("move of unknown entry {}", entry_id))
    })?;
    if state.zone(dest_zone_id).is_none() {
        return Err(DeckboardError::Invariant(format!(
            "move into unknown zone {}",
            dest_zone_id
        )));
    }

    let source_zone_id = entry.zone_id.clone();
    let same_zone = source_zone_id == dest_zone_id;

    let source_ids: Vec<String> = state
        .entries_in_zone(&source_zone_id)
        .iter()
        .map(|e| e.id.clone())
        .collect();
    let active_index = source_ids
        .iter()
        .position(|id| id == entry_id)
        .ok_or_else(|| {
            DeckboardError::Invariant(format!(
                "entry {} not present in its own zone {}",
                entry_id, source_zone_id
            ))
        })?;

    let mut dest_ids: Vec<String> = if same_zone {
        source_ids.clone()
    } else {
        state
            .entries_in_zone(dest_zone_id)
            .iter()
            .map(|e| e.id.clone())
            .collect()
    };

    let target_index = match target {
        DropTarget::ZoneEnd => dest_ids.len(),
        DropTarget::Entry(over_id) => dest_ids
            .iter()
            .position(|id| id == over_id)
            .unwrap_or(dest_ids.len()),
    };

    let mut updates = Vec::new();

    if same_zone {
        // Remove at the old index, reinsert so the entry lands at the target
        // index of the resulting list.
        let moved = dest_ids.remove(active_index);
        let insert_at = target_index.min(dest_ids.len());
        dest_ids.insert(insert_at, moved);
        collect_changes(state, &dest_ids, dest_zone_id, &mut updates);
    } else {
        let mut remaining = source_ids;
        remaining.remove(active_index);
        let insert_at = target_index.min(dest_ids.len());
        dest_ids.insert(insert_at, entry_id.to_string());
        collect_changes(state, &remaining, &source_zone_id, &mut updates);
        collect_changes(state, &dest_ids, dest_zone_id, &mut updates);
    }

    Ok(updates)
}

/// Emit a reposition for every entry whose dense index or zone assignment
/// differs from its current state.
fn collect_changes(
    state: &DeckState,
    ordered_ids: &[String],
    zone_id: &str,
    updates: &mut Vec<Reposition>,
) {
    for (idx, id) in ordered_ids.iter().enumerate() {
        let Some(entry) = state.entry(id) else {
            continue;
        };
        let sort_order = idx as u32;
        if entry.sort_order != sort_order || entry.zone_id != zone_id {
            updates.push(Reposition {
                entry_id: id.clone(),
                zone_id: zone_id.to_string(),
                sort_order,
            });
        }
    }
}
