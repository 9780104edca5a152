use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// CardSnapshot — Immutable attribute bag captured when a card is added
// ---------------------------------------------------------------------------

/// The slice of a catalog card record a deck entry keeps for offline display
/// and analytics. Treated as read-only once stored; refreshed only by
/// re-fetching the card from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Catalog id of the card this snapshot was taken from.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    /// Numeric mana value ("converted mana cost").
    #[serde(default)]
    pub cmc: Option<f64>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    /// Mana-color symbols constraining commander placement. Empty = colorless.
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default, rename = "set")]
    pub set_code: Option<String>,
    #[serde(default)]
    pub set_name: Option<String>,
    #[serde(default)]
    pub rarity: Option<String>,
    #[serde(default)]
    pub prices: Option<CardPrices>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    /// Free-form user labels ("own", "proxy", ...). Not catalog data.
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl CardSnapshot {
    /// Display image for the card, falling back to the first face that has one.
    pub fn image_url(&self) -> Option<&str> {
        if let Some(uris) = &self.image_uris {
            if let Some(normal) = uris.normal.as_deref() {
                return Some(normal);
            }
        }
        self.card_faces
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find_map(|f| f.image_uris.as_ref().and_then(|u| u.normal.as_deref()))
    }

    /// First available price in preference order: usd, usd_foil, usd_etched,
    /// eur, tix. Returns `None` when no field parses as a number.
    pub fn preferred_price(&self) -> Option<f64> {
        let p = self.prices.as_ref()?;
        [&p.usd, &p.usd_foil, &p.usd_etched, &p.eur, &p.tix]
            .into_iter()
            .find_map(|field| field.as_deref().and_then(|s| s.parse::<f64>().ok()))
    }
}

// ---------------------------------------------------------------------------
// CardPrices — Catalog price fields (numeric strings, possibly absent)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardPrices {
    #[serde(default)]
    pub usd: Option<String>,
    #[serde(default)]
    pub usd_foil: Option<String>,
    #[serde(default)]
    pub usd_etched: Option<String>,
    #[serde(default)]
    pub eur: Option<String>,
    #[serde(default)]
    pub tix: Option<String>,
}

// ---------------------------------------------------------------------------
// ImageUris / CardFace
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageUris {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub normal: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// One face of a multi-faced card. Only the fields the board needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFace {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}
