//! Aggregate deck statistics, recomputed in full on every state change.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::facts;
use crate::state::DeckState;

/// The mana-curve bucket labels, low to high.
pub const CURVE_BUCKETS: [&str; 7] = ["0", "1", "2", "3", "4", "5", "6+"];

/// Summary statistics over the full entry set.
///
/// Ramp and draw counts come from the keyword heuristics in [`facts`] and
/// are rough by design. The price total uses each snapshot's first available
/// price field and treats missing prices as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckStats {
    pub total_cards: u32,
    pub land_count: u32,
    pub spell_count: u32,
    /// Mean mana value over non-land entries; 0 when the deck has no spells.
    pub average_mana_value: f64,
    /// Non-land quantities bucketed by rounded mana value. Every bucket key
    /// is present, zero when empty.
    pub curve: BTreeMap<String, u32>,
    /// Colored-pip totals over non-land entries, scaled by quantity.
    pub pips: facts::ManaPips,
    pub ramp_count: u32,
    pub draw_count: u32,
    pub estimated_price_total: f64,
}

impl DeckStats {
    pub fn compute(state: &DeckState) -> Self {
        let entries = state.entries();

        let total_cards: u32 = entries.iter().map(|e| e.qty).sum();
        let land_count: u32 = entries
            .iter()
            .filter(|e| facts::is_land(&e.card))
            .map(|e| e.qty)
            .sum();
        let spell_count = total_cards - land_count;

        let mut curve: BTreeMap<String, u32> = CURVE_BUCKETS
            .iter()
            .map(|b| (b.to_string(), 0))
            .collect();
        let mut pips = facts::ManaPips::default();
        let mut mv_sum = 0.0;

        for entry in entries.iter().filter(|e| !facts::is_land(&e.card)) {
            let mv = facts::mana_value(&entry.card);
            mv_sum += mv * entry.qty as f64;
            *curve
                .get_mut(curve_bucket(mv))
                .expect("bucket keys are pre-seeded") += entry.qty;
            if let Some(cost) = entry.card.mana_cost.as_deref() {
                pips.add_scaled(&facts::parse_mana_pips(cost), entry.qty);
            }
        }

        let average_mana_value = if spell_count > 0 {
            mv_sum / spell_count as f64
        } else {
            0.0
        };

        let ramp_count = entries
            .iter()
            .filter(|e| facts::detect_ramp(&e.card))
            .map(|e| e.qty)
            .sum();
        let draw_count = entries
            .iter()
            .filter(|e| facts::detect_draw(&e.card))
            .map(|e| e.qty)
            .sum();

        let estimated_price_total = entries
            .iter()
            .map(|e| e.card.preferred_price().unwrap_or(0.0) * e.qty as f64)
            .sum();

        Self {
            total_cards,
            land_count,
            spell_count,
            average_mana_value,
            curve,
            pips,
            ramp_count,
            draw_count,
            estimated_price_total,
        }
    }
}

/// Curve bucket for a mana value: rounded, with everything at six or above
/// pooled into "6+".
pub fn curve_bucket(mana_value: f64) -> &'static str {
    let rounded = mana_value.round().max(0.0) as u32;
    match rounded {
        0 => "0",
        1 => "1",
        2 => "2",
        3 => "3",
        4 => "4",
        5 => "5",
        _ => "6+",
    }
}
