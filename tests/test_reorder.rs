mod common;

use deckboard::reorder::plan_move;
use deckboard::store::StoreWrite;
use deckboard::{Deck, DeckMutation, DeckState, DeckboardError, DropTarget};

/// Three creatures in the Creatures zone, in insertion order Alpha, Bravo,
/// Charlie.
fn three_creatures() -> DeckState {
    let mut state = DeckState::seeded(Deck::new("Reorder Deck"));
    for name in ["Alpha", "Bravo", "Charlie"] {
        let card = common::snap(name, "Creature — Soldier", "{1}", 1.0, &[], "");
        let (next, _) = state
            .apply(&DeckMutation::AddCard {
                card,
                zone_id: None,
                qty: 1,
            })
            .unwrap();
        state = next;
    }
    state
}

// ---------------------------------------------------------------------------
// Same-zone moves
// ---------------------------------------------------------------------------

#[test]
fn test_move_first_to_zone_end() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let alpha = common::entry_id_by_name(&state, "Alpha");

    let (next, writes) = state
        .apply(&DeckMutation::MoveEntry {
            entry_id: alpha,
            dest_zone_id: zone.clone(),
            target: DropTarget::ZoneEnd,
        })
        .unwrap();

    assert_eq!(common::names(&next, &zone), ["Bravo", "Charlie", "Alpha"]);
    assert_eq!(common::orders(&next, &zone), [0, 1, 2]);
    // Every row shifted, so every row is written.
    assert_eq!(writes.len(), 3);
    next.check_invariants().unwrap();
}

#[test]
fn test_move_onto_specific_entry() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let bravo = common::entry_id_by_name(&state, "Bravo");
    let charlie = common::entry_id_by_name(&state, "Charlie");

    let (next, _) = state
        .apply(&DeckMutation::MoveEntry {
            entry_id: charlie,
            dest_zone_id: zone.clone(),
            target: DropTarget::Entry(bravo),
        })
        .unwrap();

    assert_eq!(common::names(&next, &zone), ["Alpha", "Charlie", "Bravo"]);
    assert_eq!(common::orders(&next, &zone), [0, 1, 2]);
}

#[test]
fn test_move_to_own_position_is_empty_plan() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let charlie = common::entry_id_by_name(&state, "Charlie");

    let plan = plan_move(&state, &charlie, &zone, &DropTarget::ZoneEnd).unwrap();
    assert!(plan.is_empty());

    let (next, writes) = state
        .apply(&DeckMutation::MoveEntry {
            entry_id: charlie,
            dest_zone_id: zone,
            target: DropTarget::ZoneEnd,
        })
        .unwrap();
    assert!(writes.is_empty());
    assert_eq!(next, state);
}

#[test]
fn test_plan_emits_only_changed_rows() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let bravo = common::entry_id_by_name(&state, "Bravo");

    // Bravo to the end: only Bravo and Charlie change position.
    let plan = plan_move(&state, &bravo, &zone, &DropTarget::ZoneEnd).unwrap();
    assert_eq!(plan.len(), 2);
    assert!(plan.iter().all(|r| r.entry_id != common::entry_id_by_name(&state, "Alpha")));
}

// ---------------------------------------------------------------------------
// Cross-zone moves
// ---------------------------------------------------------------------------

#[test]
fn test_cross_zone_move_appends_and_compacts_source() {
    let state = three_creatures();
    let creatures = common::zone_id(&state, "Creatures");
    let maybe = common::zone_id(&state, "Maybe");
    let bravo = common::entry_id_by_name(&state, "Bravo");

    let (next, _) = state
        .apply(&DeckMutation::MoveEntry {
            entry_id: bravo.clone(),
            dest_zone_id: maybe.clone(),
            target: DropTarget::ZoneEnd,
        })
        .unwrap();

    assert_eq!(common::names(&next, &creatures), ["Alpha", "Charlie"]);
    assert_eq!(common::orders(&next, &creatures), [0, 1]);
    assert_eq!(common::names(&next, &maybe), ["Bravo"]);
    assert_eq!(next.entry(&bravo).unwrap().zone_id, maybe);
    next.check_invariants().unwrap();
}

#[test]
fn test_cross_zone_move_onto_entry_inserts_before_it() {
    let state = three_creatures();
    let maybe = common::zone_id(&state, "Maybe");

    // Seed the destination with two entries.
    let mut state = state;
    for name in ["Delta", "Echo"] {
        let card = common::snap(name, "Sorcery", "{1}", 1.0, &[], "");
        let (next, _) = state
            .apply(&DeckMutation::AddCard {
                card,
                zone_id: Some(maybe.clone()),
                qty: 1,
            })
            .unwrap();
        state = next;
    }

    let alpha = common::entry_id_by_name(&state, "Alpha");
    let echo = common::entry_id_by_name(&state, "Echo");
    let (next, _) = state
        .apply(&DeckMutation::MoveEntry {
            entry_id: alpha,
            dest_zone_id: maybe.clone(),
            target: DropTarget::Entry(echo),
        })
        .unwrap();

    assert_eq!(common::names(&next, &maybe), ["Delta", "Alpha", "Echo"]);
    assert_eq!(common::orders(&next, &maybe), [0, 1, 2]);
}

// ---------------------------------------------------------------------------
// Removal compaction
// ---------------------------------------------------------------------------

#[test]
fn test_removal_closes_the_gap() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let bravo = common::entry_id_by_name(&state, "Bravo");

    let (next, writes) = state
        .apply(&DeckMutation::RemoveEntry { entry_id: bravo })
        .unwrap();

    assert_eq!(common::names(&next, &zone), ["Alpha", "Charlie"]);
    assert_eq!(common::orders(&next, &zone), [0, 1]);
    // One delete plus one reposition for Charlie.
    assert_eq!(writes.len(), 2);
    assert!(matches!(writes[0], StoreWrite::DeleteEntry { .. }));
    next.check_invariants().unwrap();
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn test_unknown_entry_and_zone_are_invariant_errors() {
    let state = three_creatures();
    let zone = common::zone_id(&state, "Creatures");
    let alpha = common::entry_id_by_name(&state, "Alpha");

    let err = plan_move(&state, "missing", &zone, &DropTarget::ZoneEnd).unwrap_err();
    assert!(matches!(err, DeckboardError::Invariant(_)));

    let err = plan_move(&state, &alpha, "missing", &DropTarget::ZoneEnd).unwrap_err();
    assert!(matches!(err, DeckboardError::Invariant(_)));
}
