//! Symbol-to-species mapping used to instantiate entities from plans.

use crate::entity::{Entity, Species};
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use terrarium_core::EnergyConfig;

/// Maps plan symbols to the species they instantiate.
///
/// The blank symbol is implicit and always means an empty cell; it cannot
/// be bound to a species.
#[derive(Debug, Clone, Default)]
pub struct Legend {
    entries: BTreeMap<char, Species>,
}

impl Legend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a symbol to a species, replacing any previous binding
    pub fn insert(&mut self, glyph: char, species: Species) {
        self.entries.insert(glyph, species);
    }

    /// Legend for the lifelike ruleset: walls, plants, and plant eaters
    pub fn lifelike() -> Self {
        let mut legend = Self::new();
        legend.insert('#', Species::Wall);
        legend.insert('*', Species::Plant);
        legend.insert('o', Species::Herbivore);
        legend
    }

    /// Legend for the basic ruleset: walls and wandering critters
    pub fn basic() -> Self {
        let mut legend = Self::new();
        legend.insert('#', Species::Wall);
        legend.insert('o', Species::Critter);
        legend
    }

    /// Species bound to a symbol, if any
    pub fn species(&self, glyph: char) -> Option<Species> {
        self.entries.get(&glyph).copied()
    }

    /// Instantiate a fresh entity for a symbol.
    ///
    /// Returns `None` for symbols outside the legend.
    pub fn spawn(
        &self,
        glyph: char,
        config: &EnergyConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<Entity> {
        let species = self.species(glyph)?;
        Some(Entity::spawn(species, glyph, config, rng))
    }
}
