use rand::prelude::*;

use super::*;

/// Deals the catalog pairs for a difficulty and shuffles them with a seeded generator.
#[derive(Clone, Debug, PartialEq)]
pub struct RandomDeckGenerator {
    seed: u64,
    catalog: SymbolCatalog,
}

impl RandomDeckGenerator {
    pub fn new(seed: u64, catalog: SymbolCatalog) -> Self {
        Self { seed, catalog }
    }
}

impl DeckGenerator for RandomDeckGenerator {
    fn generate(self, difficulty: Difficulty) -> Vec<Card> {
        let mut cards = ordered_pairs(&self.catalog, difficulty);
        let mut rng = SmallRng::seed_from_u64(self.seed);
        shuffle(&mut cards, &mut rng);
        log::debug!(
            "dealt {} cards for {} with seed {}",
            cards.len(),
            difficulty,
            self.seed
        );
        cards
    }
}

/// Fisher-Yates, every permutation is equally likely given a uniform source.
pub fn shuffle<T>(items: &mut [T], rng: &mut SmallRng) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}
