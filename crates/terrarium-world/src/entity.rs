//! Entity variants and their decision rules.

use crate::view::View;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use terrarium_core::{Action, Direction, EnergyConfig, EntityId, EMPTY_GLYPH, PLANT_GLYPH};

/// Species tag used by legends to construct entities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Wall,
    Plant,
    Herbivore,
    Critter,
}

/// Variant-specific state
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Inert; permanently occupies its cell
    Wall,
    /// Stationary energy producer
    Plant { energy: f32 },
    /// Mobile plant eater
    Herbivore {
        energy: f32,
        facing: Direction,
        hungry: bool,
    },
    /// Wanderer that bounces off obstacles; keeps no energy account
    Critter { facing: Direction },
}

/// An occupant of one grid cell.
///
/// The id is assigned once at creation and identifies the entity for the
/// rest of its life; the glyph is the symbol it was instantiated from and
/// is what other entities perceive and what rendering emits.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub glyph: char,
    pub kind: EntityKind,
}

impl Entity {
    /// Construct a default-initialized entity of the given species
    pub fn spawn(
        species: Species,
        glyph: char,
        config: &EnergyConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let kind = match species {
            Species::Wall => EntityKind::Wall,
            Species::Plant => EntityKind::Plant {
                energy: config.plant_initial_energy,
            },
            Species::Herbivore => EntityKind::Herbivore {
                energy: config.herbivore_initial_energy,
                facing: random_direction(rng),
                hungry: true,
            },
            Species::Critter => EntityKind::Critter {
                facing: random_direction(rng),
            },
        };

        Self {
            id: EntityId::new(),
            glyph,
            kind,
        }
    }

    /// Whether this entity takes part in turn scheduling
    pub fn is_active(&self) -> bool {
        !matches!(self.kind, EntityKind::Wall)
    }

    /// Whether this entity counts as a creature in the census
    pub fn is_creature(&self) -> bool {
        matches!(
            self.kind,
            EntityKind::Herbivore { .. } | EntityKind::Critter { .. }
        )
    }

    /// Whether this entity counts as a plant in the census
    pub fn is_plant(&self) -> bool {
        matches!(self.kind, EntityKind::Plant { .. })
    }

    /// Current energy, for variants that keep an energy account
    pub fn energy(&self) -> Option<f32> {
        match self.kind {
            EntityKind::Plant { energy } => Some(energy),
            EntityKind::Herbivore { energy, .. } => Some(energy),
            EntityKind::Wall | EntityKind::Critter { .. } => None,
        }
    }

    /// Adjust the energy account; no-op for variants without one
    pub fn add_energy(&mut self, amount: f32) {
        match &mut self.kind {
            EntityKind::Plant { energy } => *energy += amount,
            EntityKind::Herbivore { energy, .. } => *energy += amount,
            EntityKind::Wall | EntityKind::Critter { .. } => {}
        }
    }

    /// Choose this turn's action. Deciding may update facing and hunger.
    pub fn decide(
        &mut self,
        view: &View<'_>,
        config: &EnergyConfig,
        rng: &mut ChaCha8Rng,
    ) -> Option<Action> {
        match &mut self.kind {
            EntityKind::Wall => None,
            EntityKind::Plant { energy } => decide_plant(*energy, view, config, rng),
            EntityKind::Herbivore {
                energy,
                facing,
                hungry,
            } => decide_herbivore(*energy, facing, hungry, view, config, rng),
            EntityKind::Critter { facing } => decide_critter(facing, view, rng),
        }
    }
}

fn decide_plant(
    energy: f32,
    view: &View<'_>,
    config: &EnergyConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Action> {
    if energy > config.plant_reproduce_threshold {
        if let Some(direction) = view.find(EMPTY_GLYPH, rng) {
            return Some(Action::Reproduce { direction });
        }
    }

    if energy < config.plant_grow_ceiling {
        return Some(Action::Grow);
    }

    None
}

fn decide_herbivore(
    energy: f32,
    facing: &mut Direction,
    hungry: &mut bool,
    view: &View<'_>,
    config: &EnergyConfig,
    rng: &mut ChaCha8Rng,
) -> Option<Action> {
    let space = view.find(EMPTY_GLYPH, rng);

    if energy > config.herbivore_reproduce_threshold {
        if let Some(direction) = space {
            *hungry = false;
            return Some(Action::Reproduce { direction });
        }
    }

    if energy < config.herbivore_hunger_threshold {
        *hungry = true;
    }

    if *hungry {
        if let Some(direction) = view.find(PLANT_GLYPH, rng) {
            return Some(Action::Eat { direction });
        }
    }

    if view.look(*facing) == EMPTY_GLYPH && rng.gen_bool(f64::from(config.move_probability)) {
        return Some(Action::Move { direction: *facing });
    }

    if let Some(direction) = space {
        *facing = direction;
        return Some(Action::Move { direction });
    }

    None
}

fn decide_critter(
    facing: &mut Direction,
    view: &View<'_>,
    rng: &mut ChaCha8Rng,
) -> Option<Action> {
    if view.look(*facing) != EMPTY_GLYPH {
        *facing = view.find(EMPTY_GLYPH, rng).unwrap_or(Direction::South);
    }

    Some(Action::Move { direction: *facing })
}

fn random_direction(rng: &mut ChaCha8Rng) -> Direction {
    Direction::all()[rng.gen_range(0..8)]
}
