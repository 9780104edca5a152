pub mod card;
pub mod deck;

pub use card::{CardFace, CardPrices, CardSnapshot, ImageUris};
pub use deck::{Deck, Entry, Zone};
