//! World state and the per-turn action-resolution protocol.

use crate::entity::Entity;
use crate::grid::Grid;
use crate::layout;
use crate::legend::Legend;
use crate::view::View;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use terrarium_core::{
    Action, Coordinate, Direction, EntityId, Error, Result, Ruleset, SimConfig, EMPTY_GLYPH,
};
use tracing::{debug, info, trace};

/// Population counts for one moment in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Census {
    pub creatures: usize,
    pub plants: usize,
}

/// A bounded grid of entities plus the rules that drive them.
///
/// Each call to [`World::turn`] advances the simulation by one discrete
/// step under the configured ruleset.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    legend: Legend,
    config: SimConfig,
    rng: ChaCha8Rng,
    turns: u64,
}

impl World {
    /// Build a world on a freshly generated valley, with the legend
    /// implied by the configured ruleset
    pub fn generate(config: &SimConfig) -> Result<Self> {
        let legend = match config.ruleset {
            Ruleset::Basic => Legend::basic(),
            Ruleset::Lifelike => Legend::lifelike(),
        };

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let rows = layout::generate_valley(&config.valley, &mut rng)?;
        Self::assemble(&rows, legend, config, rng)
    }

    /// Build a world from a textual plan
    pub fn from_plan(plan: &str, legend: Legend, config: &SimConfig) -> Result<Self> {
        Self::from_rows(&layout::rows_from_plan(plan), legend, config)
    }

    /// Build a world from pre-split plan rows
    pub fn from_rows(rows: &[String], legend: Legend, config: &SimConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::assemble(rows, legend, config, rng)
    }

    fn assemble(
        rows: &[String],
        legend: Legend,
        config: &SimConfig,
        mut rng: ChaCha8Rng,
    ) -> Result<Self> {
        let (width, height) = layout::validate_rows(rows)?;
        let mut grid = Grid::new(width, height);

        for (y, line) in rows.iter().enumerate() {
            for (x, symbol) in line.chars().enumerate() {
                if symbol == EMPTY_GLYPH {
                    continue;
                }
                let Some(entity) = legend.spawn(symbol, &config.energy, &mut rng) else {
                    return Err(Error::UnknownSymbol(symbol));
                };
                grid.put(Coordinate::new(x as i32, y as i32), entity);
            }
        }

        info!(
            width,
            height,
            seed = config.seed,
            ruleset = ?config.ruleset,
            "World assembled"
        );

        Ok(Self {
            grid,
            legend,
            config: config.clone(),
            rng,
            turns: 0,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Number of completed turns
    pub fn turn_count(&self) -> u64 {
        self.turns
    }

    /// Advance the simulation by one turn.
    ///
    /// Cells are scanned top to bottom, left to right, and every active
    /// entity gets at most one action. An entity that moved ahead of the
    /// scan is not processed again; an entity born ahead of the scan acts
    /// in its birth turn.
    pub fn turn(&mut self) {
        self.turns += 1;

        // Collect coordinates up front so resolution can mutate the grid
        let coordinates: Vec<Coordinate> = self.grid.coordinates().collect();
        let mut acted: HashSet<EntityId> = HashSet::new();

        for coordinate in coordinates {
            let id = match self.grid.get(coordinate) {
                Some(entity) if entity.is_active() => entity.id,
                _ => continue,
            };
            if !acted.insert(id) {
                continue;
            }
            self.process_entity(coordinate);
        }

        trace!(turn = self.turns, "Turn complete");
    }

    /// Let the entity at `origin` decide and resolve one action
    fn process_entity(&mut self, origin: Coordinate) {
        let Some(mut entity) = self.grid.take(origin) else {
            return;
        };

        // The occupant is out of the grid while deciding; a view never
        // reads its own cell, so the vacancy is unobservable.
        let action = {
            let view = View::new(&self.grid, origin);
            entity.decide(&view, &self.config.energy, &mut self.rng)
        };

        let mut place_at = origin;
        let handled = match self.config.ruleset {
            Ruleset::Basic => self.resolve_basic(&entity, origin, &mut place_at, action),
            Ruleset::Lifelike => self.resolve_lifelike(&mut entity, origin, &mut place_at, action),
        };

        if !handled && self.config.ruleset == Ruleset::Lifelike {
            entity.add_energy(-self.config.energy.idle_decay);
            if let Some(energy) = entity.energy() {
                if energy <= 0.0 {
                    debug!(
                        event = "starved",
                        id = ?entity.id,
                        glyph = %entity.glyph,
                        turn = self.turns,
                        "Entity ran out of energy"
                    );
                    return;
                }
            }
        }

        self.grid.put(place_at, entity);
    }

    /// Movement-only resolution; energy is never touched
    fn resolve_basic(
        &self,
        entity: &Entity,
        origin: Coordinate,
        place_at: &mut Coordinate,
        action: Option<Action>,
    ) -> bool {
        match action {
            Some(Action::Move { direction }) => {
                let Some(dest) = self.open_destination(origin, direction) else {
                    trace!(id = ?entity.id, ?direction, turn = self.turns, "Move blocked");
                    return false;
                };
                *place_at = dest;
                true
            }
            _ => false,
        }
    }

    fn resolve_lifelike(
        &mut self,
        entity: &mut Entity,
        origin: Coordinate,
        place_at: &mut Coordinate,
        action: Option<Action>,
    ) -> bool {
        match action {
            Some(Action::Grow) => self.resolve_grow(entity),
            Some(Action::Move { direction }) => {
                self.resolve_move(entity, origin, place_at, direction)
            }
            Some(Action::Eat { direction }) => self.resolve_eat(entity, origin, direction),
            Some(Action::Reproduce { direction }) => {
                self.resolve_reproduce(entity, origin, direction)
            }
            None => false,
        }
    }

    fn resolve_grow(&self, entity: &mut Entity) -> bool {
        entity.add_energy(self.config.energy.grow_amount);
        true
    }

    fn resolve_move(
        &self,
        entity: &mut Entity,
        origin: Coordinate,
        place_at: &mut Coordinate,
        direction: Direction,
    ) -> bool {
        let Some(dest) = self.open_destination(origin, direction) else {
            trace!(id = ?entity.id, ?direction, turn = self.turns, "Move blocked");
            return false;
        };

        if entity.energy().is_some_and(|e| e <= self.config.energy.move_min_energy) {
            trace!(id = ?entity.id, turn = self.turns, "Move failed: too little energy");
            return false;
        }

        entity.add_energy(-self.config.energy.move_cost);
        *place_at = dest;
        true
    }

    fn resolve_eat(&mut self, entity: &mut Entity, origin: Coordinate, direction: Direction) -> bool {
        let Some(dest) = self.destination(origin, direction) else {
            trace!(id = ?entity.id, ?direction, turn = self.turns, "Eat failed: nothing there");
            return false;
        };

        // Only targets with an energy account are edible; walls are not
        let meal = self.grid.get(dest).and_then(Entity::energy);
        let Some(meal) = meal else {
            trace!(id = ?entity.id, ?direction, turn = self.turns, "Eat failed: nothing edible");
            return false;
        };

        entity.add_energy(meal);
        self.grid.take(dest);
        trace!(id = ?entity.id, gained = meal, turn = self.turns, "Ate");
        true
    }

    fn resolve_reproduce(
        &mut self,
        entity: &mut Entity,
        origin: Coordinate,
        direction: Direction,
    ) -> bool {
        let Some(dest) = self.open_destination(origin, direction) else {
            trace!(
                id = ?entity.id,
                ?direction,
                turn = self.turns,
                "Reproduce failed: destination blocked"
            );
            return false;
        };

        let Some(offspring) = self.legend.spawn(entity.glyph, &self.config.energy, &mut self.rng)
        else {
            trace!(
                id = ?entity.id,
                glyph = %entity.glyph,
                turn = self.turns,
                "Reproduce failed: symbol not in the legend"
            );
            return false;
        };

        let cost = 2.0 * offspring.energy().unwrap_or(0.0);
        if entity.energy().is_some_and(|e| e <= cost) {
            trace!(
                id = ?entity.id,
                cost,
                turn = self.turns,
                "Reproduce failed: too little energy"
            );
            return false;
        }

        entity.add_energy(-cost);
        debug!(
            event = "born",
            parent = ?entity.id,
            offspring = ?offspring.id,
            glyph = %entity.glyph,
            turn = self.turns,
            "Entity reproduced"
        );
        self.grid.put(dest, offspring);
        true
    }

    /// Target cell of an action, if it lies inside the grid
    fn destination(&self, origin: Coordinate, direction: Direction) -> Option<Coordinate> {
        let dest = origin.step(direction);
        self.grid.is_inside(dest).then_some(dest)
    }

    /// Target cell of an action, only if inside the grid and unoccupied
    fn open_destination(&self, origin: Coordinate, direction: Direction) -> Option<Coordinate> {
        let dest = self.destination(origin, direction)?;
        self.grid.get(dest).is_none().then_some(dest)
    }

    pub fn census(&self) -> Census {
        let mut census = Census {
            creatures: 0,
            plants: 0,
        };
        for (_, entity) in self.grid.iter() {
            if entity.is_creature() {
                census.creatures += 1;
            } else if entity.is_plant() {
                census.plants += 1;
            }
        }
        census
    }

    pub fn creature_count(&self) -> usize {
        self.census().creatures
    }

    pub fn plant_count(&self) -> usize {
        self.census().plants
    }

    /// Render the grid as newline-terminated rows of symbols
    pub fn render(&self) -> String {
        let mut output =
            String::with_capacity((self.grid.width as usize + 1) * self.grid.height as usize);
        for y in 0..self.grid.height {
            for x in 0..self.grid.width {
                let symbol = match self.grid.get(Coordinate::new(x, y)) {
                    Some(entity) => entity.glyph,
                    None => EMPTY_GLYPH,
                };
                output.push(symbol);
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashMap};
    use terrarium_core::ValleyConfig;

    fn sim_config(seed: u64, ruleset: Ruleset) -> SimConfig {
        SimConfig {
            seed,
            ruleset,
            ..Default::default()
        }
    }

    fn lifelike_world(rows: &[&str]) -> World {
        let rows: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
        World::from_rows(&rows, Legend::lifelike(), &sim_config(0, Ruleset::Lifelike)).unwrap()
    }

    fn close(actual: f32, expected: f32) -> bool {
        (actual - expected).abs() < 1e-4
    }

    fn total_energy(world: &World) -> f32 {
        world.grid().iter().filter_map(|(_, e)| e.energy()).sum()
    }

    #[test]
    fn test_assembly_and_render_round_trip() {
        let world = World::from_plan(
            "####\n#o*#\n####",
            Legend::lifelike(),
            &sim_config(0, Ruleset::Lifelike),
        )
        .unwrap();

        assert_eq!(world.render(), "####\n#o*#\n####\n");
        assert_eq!(
            world.census(),
            Census {
                creatures: 1,
                plants: 1,
            }
        );
    }

    #[test]
    fn test_unknown_symbol_is_rejected() {
        let err = World::from_plan(
            "##\nx#",
            Legend::lifelike(),
            &sim_config(0, Ruleset::Lifelike),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSymbol('x')));
    }

    #[test]
    fn test_ragged_plan_is_rejected() {
        let err = World::from_plan(
            "###\n##\n###",
            Legend::lifelike(),
            &sim_config(0, Ruleset::Lifelike),
        )
        .unwrap_err();
        assert!(matches!(err, Error::RaggedLayout { row: 1, .. }));
    }

    #[test]
    fn test_plant_grows_by_the_configured_amount() {
        let mut world = lifelike_world(&["###", "#*#", "###"]);
        world.turn();

        let plant = world.grid().get(Coordinate::new(1, 1)).unwrap();
        assert_eq!(plant.energy(), Some(8.0));
        assert_eq!(world.turn_count(), 1);
    }

    #[test]
    fn test_saturated_boxed_in_plant_decays() {
        let mut world = lifelike_world(&["###", "#*#", "###"]);
        if let Some(plant) = world.grid.get_mut(Coordinate::new(1, 1)) {
            plant.kind = EntityKind::Plant { energy: 20.0 };
        }
        world.turn();

        let plant = world.grid().get(Coordinate::new(1, 1)).unwrap();
        assert!(close(plant.energy().unwrap(), 19.9));
    }

    #[test]
    fn test_move_costs_energy_and_acts_once_per_turn() {
        let mut world = lifelike_world(&["#####", "#o  #", "#####"]);
        world.turn();

        // The only open direction from the start cell is east
        assert!(world.grid().get(Coordinate::new(1, 1)).is_none());
        let eater = world.grid().get(Coordinate::new(2, 1)).unwrap();
        assert!(close(eater.energy().unwrap(), 19.7));

        // Moving ahead of the scan must not earn a second action
        assert!(world.grid().get(Coordinate::new(3, 1)).is_none());
    }

    #[test]
    fn test_move_needs_spare_energy() {
        let mut world = lifelike_world(&["#####", "#o  #", "#####"]);
        if let Some(eater) = world.grid.get_mut(Coordinate::new(1, 1)) {
            eater.kind = EntityKind::Herbivore {
                energy: 0.9,
                facing: Direction::East,
                hungry: false,
            };
        }
        world.turn();

        // Too weak to move, so the failed turn costs the idle decay
        let eater = world.grid().get(Coordinate::new(1, 1)).unwrap();
        assert!(close(eater.energy().unwrap(), 0.8));
    }

    #[test]
    fn test_blocked_and_outward_moves_are_unhandled() {
        let mut world = lifelike_world(&["o"]);
        let mut mover = world.grid.take(Coordinate::new(0, 0)).unwrap();
        let mut place_at = Coordinate::new(0, 0);

        // Off the edge
        let handled = world.resolve_lifelike(
            &mut mover,
            Coordinate::new(0, 0),
            &mut place_at,
            Some(Action::Move {
                direction: Direction::North,
            }),
        );
        assert!(!handled);
        assert_eq!(place_at, Coordinate::new(0, 0));

        // Into a wall
        let mut world = lifelike_world(&["###", "#o#", "###"]);
        let mut mover = world.grid.take(Coordinate::new(1, 1)).unwrap();
        let mut place_at = Coordinate::new(1, 1);
        let handled = world.resolve_lifelike(
            &mut mover,
            Coordinate::new(1, 1),
            &mut place_at,
            Some(Action::Move {
                direction: Direction::North,
            }),
        );
        assert!(!handled);
        assert_eq!(place_at, Coordinate::new(1, 1));
    }

    #[test]
    fn test_eating_transfers_the_whole_meal() {
        let mut world = lifelike_world(&["####", "#o*#", "####"]);
        if let Some(plant) = world.grid.get_mut(Coordinate::new(2, 1)) {
            plant.kind = EntityKind::Plant { energy: 5.0 };
        }
        let before = total_energy(&world);
        world.turn();

        let eater = world.grid().get(Coordinate::new(1, 1)).unwrap();
        assert_eq!(eater.energy(), Some(25.0));
        assert!(world.grid().get(Coordinate::new(2, 1)).is_none());
        assert_eq!(world.plant_count(), 0);

        // Eating moves energy, it does not create or destroy it
        assert!(close(total_energy(&world), before));
    }

    #[test]
    fn test_walls_are_not_edible() {
        let mut world = lifelike_world(&["###", "#o#", "###"]);
        let mut eater = world.grid.take(Coordinate::new(1, 1)).unwrap();
        let mut place_at = Coordinate::new(1, 1);

        let handled = world.resolve_lifelike(
            &mut eater,
            Coordinate::new(1, 1),
            &mut place_at,
            Some(Action::Eat {
                direction: Direction::North,
            }),
        );
        assert!(!handled);
        assert_eq!(eater.energy(), Some(20.0));
        assert!(world.grid.get(Coordinate::new(1, 0)).is_some());
    }

    #[test]
    fn test_reproduction_needs_twice_the_offspring_energy() {
        let mut world = lifelike_world(&["###", "#*#", "# #"]);
        let mut parent = world.grid.take(Coordinate::new(1, 1)).unwrap();
        let mut place_at = Coordinate::new(1, 1);

        parent.kind = EntityKind::Plant { energy: 14.0 };
        let handled = world.resolve_lifelike(
            &mut parent,
            Coordinate::new(1, 1),
            &mut place_at,
            Some(Action::Reproduce {
                direction: Direction::South,
            }),
        );
        assert!(!handled);
        assert_eq!(parent.energy(), Some(14.0));
        assert!(world.grid.get(Coordinate::new(1, 2)).is_none());

        parent.kind = EntityKind::Plant { energy: 16.0 };
        let handled = world.resolve_lifelike(
            &mut parent,
            Coordinate::new(1, 1),
            &mut place_at,
            Some(Action::Reproduce {
                direction: Direction::South,
            }),
        );
        assert!(handled);
        assert_eq!(parent.energy(), Some(1.0));

        let offspring = world.grid.get(Coordinate::new(1, 2)).unwrap();
        assert!(offspring.is_plant());
        assert_eq!(offspring.energy(), Some(7.5));
    }

    #[test]
    fn test_offspring_born_ahead_of_the_scan_acts_this_turn() {
        let mut world = lifelike_world(&["###", "#*#", "# #"]);
        if let Some(plant) = world.grid.get_mut(Coordinate::new(1, 1)) {
            plant.kind = EntityKind::Plant { energy: 16.0 };
        }
        world.turn();

        let parent = world.grid().get(Coordinate::new(1, 1)).unwrap();
        assert_eq!(parent.energy(), Some(1.0));

        // The newborn landed on a cell the scan had not reached yet, so
        // it already took its first action and grew
        let offspring = world.grid().get(Coordinate::new(1, 2)).unwrap();
        assert_eq!(offspring.energy(), Some(8.0));
    }

    #[test]
    fn test_herbivore_reproduction_splits_the_family_energy() {
        let mut world = lifelike_world(&["#####", "# o #", "#####"]);
        if let Some(eater) = world.grid.get_mut(Coordinate::new(2, 1)) {
            eater.kind = EntityKind::Herbivore {
                energy: 70.0,
                facing: Direction::North,
                hungry: true,
            };
        }
        world.turn();

        assert_eq!(world.creature_count(), 2);
        let parent = world.grid().get(Coordinate::new(2, 1)).unwrap();
        assert_eq!(parent.energy(), Some(30.0));
        assert!(matches!(
            parent.kind,
            EntityKind::Herbivore { hungry: false, .. }
        ));

        let offspring_energy: f32 = world
            .grid()
            .iter()
            .filter(|(coordinate, _)| *coordinate != Coordinate::new(2, 1))
            .filter_map(|(_, e)| e.energy())
            .sum();
        assert!(offspring_energy > 19.0 && offspring_energy <= 20.0);
    }

    #[test]
    fn test_starvation_removes_the_entity() {
        let mut world = lifelike_world(&["###", "#o#", "###"]);
        if let Some(eater) = world.grid.get_mut(Coordinate::new(1, 1)) {
            eater.kind = EntityKind::Herbivore {
                energy: 0.05,
                facing: Direction::North,
                hungry: false,
            };
        }
        world.turn();

        assert!(world.grid().get(Coordinate::new(1, 1)).is_none());
        assert_eq!(world.creature_count(), 0);
    }

    #[test]
    fn test_boxed_in_herbivore_starves_to_extinction() {
        let mut config = sim_config(0, Ruleset::Lifelike);
        config.energy.move_probability = 0.0;
        let rows: Vec<String> = ["###", "#o#", "###"].iter().map(|r| r.to_string()).collect();
        let mut world = World::from_rows(&rows, Legend::lifelike(), &config).unwrap();

        let mut last = world
            .grid()
            .get(Coordinate::new(1, 1))
            .and_then(Entity::energy)
            .unwrap();
        for _ in 0..250 {
            world.turn();
            match world.grid().get(Coordinate::new(1, 1)).and_then(Entity::energy) {
                Some(energy) => {
                    assert!(energy < last);
                    last = energy;
                }
                None => break,
            }
        }

        assert_eq!(world.creature_count(), 0);
    }

    #[test]
    fn test_basic_critter_bounces_down_a_corridor() {
        let mut world = World::from_plan(
            "#####\n#o  #\n#####",
            Legend::basic(),
            &sim_config(3, Ruleset::Basic),
        )
        .unwrap();

        // One open cell at a time forces the walk east, then back west
        let expected = [(2, 1), (3, 1), (2, 1), (1, 1), (2, 1), (3, 1)];
        for (turn, &(x, y)) in expected.iter().enumerate() {
            world.turn();
            let found = world
                .grid()
                .iter()
                .find(|(_, e)| e.is_creature())
                .map(|(coordinate, _)| coordinate);
            assert_eq!(found, Some(Coordinate::new(x, y)), "turn {}", turn + 1);
        }

        // Wanderers keep no energy account and never starve
        let (_, critter) = world.grid().iter().find(|(_, e)| e.is_creature()).unwrap();
        assert_eq!(critter.energy(), None);
    }

    #[test]
    fn test_generated_world_matches_the_configured_counts() {
        let config = SimConfig::default();
        let world = World::generate(&config).unwrap();

        assert_eq!(world.grid().width, 52);
        assert_eq!(world.grid().height, 22);
        assert_eq!(world.creature_count(), 15);
        assert_eq!(world.plant_count(), 25);
    }

    #[test]
    fn test_same_seed_reproduces_the_same_history() {
        let config = SimConfig {
            seed: 7,
            ..Default::default()
        };
        let mut first = World::generate(&config).unwrap();
        let mut second = World::generate(&config).unwrap();
        assert_eq!(first.render(), second.render());

        for _ in 0..10 {
            first.turn();
            second.turn();
            assert_eq!(first.render(), second.render());
            assert_eq!(first.census(), second.census());
        }
    }

    fn small_valley(seed: u64) -> SimConfig {
        let mut counts = BTreeMap::new();
        counts.insert('#', 4);
        counts.insert('o', 4);
        counts.insert('*', 8);

        SimConfig {
            seed,
            valley: ValleyConfig {
                width: 12,
                height: 6,
                counts,
            },
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn prop_growth_is_the_only_energy_source(seed in 0u64..500) {
            let mut world = World::generate(&small_valley(seed)).unwrap();

            for _ in 0..5 {
                let before = total_energy(&world);
                let plants = world.plant_count();
                world.turn();
                prop_assert!(total_energy(&world) <= before + 0.5 * plants as f32 + 1e-3);
            }
        }

        #[test]
        fn prop_walls_are_permanent(seed in 0u64..500) {
            let mut world = World::generate(&small_valley(seed)).unwrap();
            let walls = world.grid().iter().filter(|(_, e)| !e.is_active()).count();

            for _ in 0..10 {
                world.turn();
            }
            prop_assert_eq!(
                world.grid().iter().filter(|(_, e)| !e.is_active()).count(),
                walls
            );
        }

        #[test]
        fn prop_survivors_stay_put_or_step_once(seed in 0u64..200) {
            let mut world = World::generate(&small_valley(seed)).unwrap();

            for _ in 0..8 {
                let before: HashMap<EntityId, Coordinate> =
                    world.grid().iter().map(|(c, e)| (e.id, c)).collect();
                world.turn();

                let mut seen = HashSet::new();
                for (coordinate, entity) in world.grid().iter() {
                    prop_assert!(seen.insert(entity.id));
                    prop_assert!(entity.energy().map_or(true, |e| e > 0.0));
                    if let Some(&origin) = before.get(&entity.id) {
                        prop_assert!((origin.x - coordinate.x).abs() <= 1);
                        prop_assert!((origin.y - coordinate.y).abs() <= 1);
                    }
                }
            }
        }
    }
}
