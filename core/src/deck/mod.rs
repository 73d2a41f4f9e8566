use crate::*;
pub use random::*;

mod random;

/// Glyphs dealt in catalog order, the first `pair_count` are used for a difficulty.
pub const EMOJI_SYMBOLS: &[&str] = &[
    "😀", "🎮", "🌟", "🎨", "🎵", "🎪", "🎭", "🚀", //
    "🍕", "🌈", "🏆", "🍦", "🎸", "🎯", "🧠", "🐱", //
    "🦄", "🎁", "🌮", "🍔", "🏀", "⚽", "🏄‍♂️", "🎤", //
    "🎬", "🎹", "🧩", "🎲", "🍎", "🍓", "🚲", "🎠", //
];

/// A validated list of distinct symbols, large enough for every difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SymbolCatalog {
    symbols: &'static [&'static str],
}

impl SymbolCatalog {
    pub fn new(symbols: &'static [&'static str]) -> Result<Self> {
        let required = Difficulty::HARDEST.pair_count();
        if symbols.len() < required {
            return Err(GameError::CatalogTooSmall {
                required,
                available: symbols.len(),
            });
        }

        for (index, symbol) in symbols.iter().enumerate() {
            if symbols[..index].contains(symbol) {
                return Err(GameError::DuplicateSymbol { index });
            }
        }

        Ok(Self { symbols })
    }

    pub fn emoji() -> Result<Self> {
        Self::new(EMOJI_SYMBOLS)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// First `count` symbols of the catalog.
    pub fn take(&self, count: usize) -> impl Iterator<Item = Symbol> + use<> {
        let symbols = self.symbols;
        symbols
            .iter()
            .take(count)
            .map(|&glyph| Symbol::new(glyph))
    }
}

pub trait DeckGenerator {
    fn generate(self, difficulty: Difficulty) -> Vec<Card>;
}

/// Builds a shuffled deck from the emoji catalog.
pub fn build_deck(difficulty: Difficulty, seed: u64) -> Result<Vec<Card>> {
    let catalog = SymbolCatalog::emoji()?;
    Ok(RandomDeckGenerator::new(seed, catalog).generate(difficulty))
}

/// Unshuffled pairs, ids `2k` and `2k + 1` carry the k-th symbol.
pub fn ordered_pairs(catalog: &SymbolCatalog, difficulty: Difficulty) -> Vec<Card> {
    catalog
        .take(difficulty.pair_count())
        .enumerate()
        .flat_map(|(k, symbol)| {
            let id = (k * 2) as CardId;
            [Card::new(id, symbol), Card::new(id + 1, symbol)]
        })
        .collect()
}
