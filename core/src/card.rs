use serde::Serialize;

use crate::CardId;

/// Opaque matching token, two cards of a deck share each symbol. Wraps the glyph the renderer shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Symbol(&'static str);

impl Symbol {
    pub(crate) const fn new(glyph: &'static str) -> Self {
        Self(glyph)
    }

    pub const fn glyph(self) -> &'static str {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub symbol: Symbol,
    pub is_flipped: bool,
    pub is_matched: bool,
}

impl Card {
    pub const fn new(id: CardId, symbol: Symbol) -> Self {
        Self {
            id,
            symbol,
            is_flipped: false,
            is_matched: false,
        }
    }

    /// Whether the face is showing, matched cards stay face up.
    pub const fn is_face_up(self) -> bool {
        self.is_flipped || self.is_matched
    }

    /// Whether a player may still pick this card.
    pub const fn is_selectable(self) -> bool {
        !self.is_flipped && !self.is_matched
    }

    pub fn matches(&self, other: &Card) -> bool {
        self.id != other.id && self.symbol == other.symbol
    }
}
